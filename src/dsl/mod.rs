//! DSL (Domain Specific Language) parser for netlists.
//!
//! This module provides a SPICE-inspired text-based language for describing
//! logic circuits and libraries of sub-circuits. The DSL is line-oriented and
//! human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = '.' directive_name { argument }
//! component   = type name net* { key '=' value }
//! reference   = "REF" name target net* { key '=' value }
//!
//! directive_name = "circuit" | "end" | "top" | "probe"
//! net         = word | "_"
//! value       = number [unit_suffix] | "0x" hex | "0b" bits | word
//! ```
//!
//! Nets list a component's inputs first, then its outputs, in pin order. A
//! `_` leaves the pin unconnected. Each net may have at most one driver.
//!
//! # Directives
//!
//! | Directive | Description | Syntax |
//! |-----------|-------------|--------|
//! | .circuit | Open a named circuit | `.circuit <name>` |
//! | .end | Close the open circuit | `.end` |
//! | .top | Select the circuit to simulate | `.top <name>` |
//! | .probe | Nets to report | `.probe <net>...` |
//!
//! Lines outside any `.circuit` block belong to an implicit circuit named
//! `main`.
//!
//! # Example
//!
//! ```text
//! # Half adder used twice
//! .circuit half_adder
//! IN   a     a      x=0 y=0
//! IN   b     b      x=0 y=1
//! XOR  sum   a b s
//! AND  carry a b c
//! OUT  s_out s      x=4 y=0
//! OUT  c_out c      x=4 y=1
//! .end
//!
//! SWITCH sa  a  state=1
//! SWITCH sb  b
//! REF    ha1 half_adder a b s c
//! .probe s c
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::LogicError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
