//! Observability side-channels. Not required for correctness: the codec
//! never consults a sink to make a decision, only to record one.

use crate::symbol::Symbol;
use std::io::{self, Write};

/// A sink that observes every symbol clocked onto or sampled off of the
/// simulated bus. Implementations must not be able to influence decoding —
/// [`crate::line::LineDriver`] only ever calls `on_symbol`, never reads
/// state back from a sink.
pub trait TraceSink {
    /// Records one symbol-time.
    fn on_symbol(&mut self, sym: Symbol);
}

/// Four D+/D- lines per symbol, one line per sub-tick sample, of
/// `"<D+>,<D->"`, with `J = 1,0`, `K = 0,1`, `SE0 = 0,0`.
pub struct CsvTraceSink<W: Write> {
    out: W,
}

impl<W: Write> CsvTraceSink<W> {
    /// Wraps `out`, which receives one CSV line pair per sub-tick.
    pub fn new(out: W) -> Self {
        CsvTraceSink { out }
    }

    fn line_for(sym: Symbol) -> Option<&'static str> {
        match sym {
            Symbol::J => Some("1,0\n"),
            Symbol::K => Some("0,1\n"),
            Symbol::SE0 => Some("0,0\n"),
            // SE1 is never driven outbound and has no defined CSV encoding.
            Symbol::SE1 => None,
        }
    }
}

impl<W: Write> TraceSink for CsvTraceSink<W> {
    fn on_symbol(&mut self, sym: Symbol) {
        if let Some(line) = Self::line_for(sym) {
            for _ in 0..4 {
                // Best-effort: a trace sink failing to write must never
                // propagate into a decode/transfer error.
                let _ = self.out.write_all(line.as_bytes());
            }
        }
    }
}

impl<W: Write> io::Write for CsvTraceSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_sink_emits_four_lines_per_symbol() {
        let mut buf = Vec::new();
        {
            let mut sink = CsvTraceSink::new(&mut buf);
            sink.on_symbol(Symbol::J);
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "1,0\n".repeat(4));
    }
}
