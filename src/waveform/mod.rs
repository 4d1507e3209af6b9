//! Waveform output for the CLI frontend.
//!
//! Writes probed values as tab-separated text: a header row naming each
//! probe, then one row per sample with the simulated time first.

use std::io::Write;

use crate::engine::Simulator;
use crate::error::{LogicError, Result, SimFault};
use crate::value::Signal;

/// Tabular writer for probe samples.
pub struct WaveformWriter<W: Write> {
    out: W,
    probes: Vec<String>,
    header_written: bool,
}

impl<W: Write> WaveformWriter<W> {
    pub fn new(out: W, probes: Vec<String>) -> Self {
        Self {
            out,
            probes,
            header_written: false,
        }
    }

    pub fn probes(&self) -> &[String] {
        &self.probes
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line).map_err(|e| LogicError::OutputError {
            message: e.to_string(),
        })
    }

    /// Write one row. The header goes out before the first row.
    pub fn write_row(&mut self, time: f64, values: &[Signal]) -> Result<()> {
        if !self.header_written {
            let mut header = String::from("time");
            for probe in &self.probes {
                header.push('\t');
                header.push_str(probe);
            }
            self.write_line(&header)?;
            self.header_written = true;
        }

        let mut row = format!("{}", time);
        for value in values {
            row.push('\t');
            row.push_str(&value.to_string());
        }
        self.write_line(&row)
    }

    /// Probe every column on `simulator` and write the row.
    pub fn sample(&mut self, simulator: &Simulator) -> Result<()> {
        let values = self
            .probes
            .iter()
            .map(|name| simulator.probe(name))
            .collect::<Result<Vec<_>>>()?;
        self.write_row(simulator.now(), &values)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(|e| LogicError::OutputError {
            message: e.to_string(),
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Sample the initial state, then advance `steps` times by `dt`, sampling
/// after each step. Returns the faults seen along the way.
pub fn record<W: Write>(
    simulator: &mut Simulator,
    writer: &mut WaveformWriter<W>,
    steps: usize,
    dt: f64,
) -> Result<Vec<SimFault>> {
    let mut faults = simulator.propagate().faults;
    writer.sample(simulator)?;
    for _ in 0..steps {
        let report = simulator.advance(dt)?;
        for fault in report.faults {
            if !faults.contains(&fault) {
                faults.push(fault);
            }
        }
        writer.sample(simulator)?;
    }
    writer.flush()?;
    Ok(faults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_clock_divider() {
        let mut sim = Simulator::from_netlist(
            "\
CLOCK clk c freq=100
NOT inv q nq
DFF ff nq c q _
",
        )
        .unwrap();
        let mut writer = WaveformWriter::new(Vec::new(), vec!["c".to_string(), "q".to_string()]);
        let faults = record(&mut sim, &mut writer, 4, 5.0).unwrap();
        assert!(faults.is_empty());

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time\tc\tq");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("0\t"));
    }

    #[test]
    fn test_unknown_probe_fails() {
        let sim = Simulator::from_netlist("SWITCH s a\n").unwrap();
        let mut writer = WaveformWriter::new(Vec::new(), vec!["nope".to_string()]);
        assert!(matches!(writer.sample(&sim), Err(LogicError::UnknownNet { .. })));
    }
}
