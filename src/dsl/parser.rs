//! Parser for the netlist DSL.

use std::collections::BTreeMap;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{LogicError, Result};

/// Parser for netlist DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();
        let mut open: Option<CircuitDef> = None;

        while self.current.kind != TokenKind::Eof {
            // Skip empty lines
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
                continue;
            }

            match &self.current.kind {
                TokenKind::Directive => self.parse_directive(&mut ast, &mut open)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    match open.as_mut() {
                        Some(circuit) => circuit.components.push(component),
                        None => implicit_circuit(&mut ast).components.push(component),
                    }
                }
                _ => {
                    return Err(LogicError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(LogicError::parse(
                        self.current.line,
                        format!("unexpected trailing token: {:?}", self.current.text),
                    ))
                }
            }
        }

        if let Some(circuit) = open {
            return Err(LogicError::parse(
                circuit.line,
                format!("circuit '{}' is missing '.end'", circuit.name),
            ));
        }
        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Consume an identifier or number as a plain word.
    fn expect_word(&mut self, what: &str) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            _ => Err(LogicError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.text),
            )),
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn parse_directive(&mut self, ast: &mut NetlistAst, open: &mut Option<CircuitDef>) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".circuit" | ".subckt" => {
                if let Some(outer) = open {
                    return Err(LogicError::parse(
                        line,
                        format!("'.circuit' inside circuit '{}'; close it with '.end' first", outer.name),
                    ));
                }
                let name = self.expect_word("circuit name")?;
                *open = Some(CircuitDef::new(name, line));
            }
            ".end" | ".ends" => {
                let circuit = open
                    .take()
                    .ok_or_else(|| LogicError::parse(line, "'.end' without '.circuit'"))?;
                ast.circuits.push(circuit);
            }
            ".top" => {
                ast.top = Some(self.expect_word("circuit name")?);
            }
            ".probe" => {
                while !self.at_line_end() {
                    ast.probes.push(self.expect_word("net name")?);
                }
            }
            _ => {
                return Err(LogicError::parse(line, format!("unknown directive: {}", directive)));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let kind = self.current.text.to_ascii_uppercase();
        let line = self.current.line;
        self.advance()?;

        let name = self.expect_word("component name")?;
        let mut params = BTreeMap::new();
        if kind == "REF" {
            let target = self.expect_word("target circuit")?;
            params.insert("target".to_string(), target);
        }

        let mut nets = Vec::new();
        let mut in_params = false;
        while !self.at_line_end() {
            let word = self.expect_word("net or parameter")?;
            if self.current.kind == TokenKind::Equals {
                self.advance()?;
                let value = self.expect_word("parameter value")?;
                params.insert(word.to_lowercase(), value);
                in_params = true;
            } else if in_params {
                return Err(LogicError::invalid_component(
                    &name,
                    line,
                    format!("net '{}' after parameters", word),
                ));
            } else {
                nets.push(word);
            }
        }

        Ok(ComponentDef {
            kind,
            name,
            nets,
            params,
            line,
        })
    }
}

fn implicit_circuit(ast: &mut NetlistAst) -> &mut CircuitDef {
    let idx = match ast.circuits.iter().position(|c| c.name == IMPLICIT_CIRCUIT && c.line == 0) {
        Some(idx) => idx,
        None => {
            ast.circuits.push(CircuitDef::new(IMPLICIT_CIRCUIT, 0));
            ast.circuits.len() - 1
        }
    };
    &mut ast.circuits[idx]
}
