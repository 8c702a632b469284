//! Human-readable session dump. Read-only.

use core::fmt::{self, Write};

use crate::link::codec::Codec;

use super::queue::MessageQueue;
use super::resync::ResyncStrategy;
use super::{Session, Working};

/// Bytes per hex line.
const HEX_LINE: usize = 32;

impl<C: Codec, R: ResyncStrategy> Session<C, R> {
    /// Write the dump into `out`.
    pub fn write_dump(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "--- Session {} ---", self.id)?;
        writeln!(
            out,
            "  state:          {} (prev {})",
            self.state.label(),
            self.prev_state.label()
        )?;
        match &self.peer {
            Some(peer) => writeln!(out, "  peer:           {peer}")?,
            None => writeln!(out, "  peer:           (unknown)")?,
        }
        writeln!(
            out,
            "  parse failures: {}/{}",
            self.parse_failures.count(),
            self.parse_failures.threshold()
        )?;
        writeln!(
            out,
            "  ack failures:   {}/{}",
            self.ack_failures.count(),
            self.ack_failures.threshold()
        )?;
        writeln!(out, "  resyncs:        {}", self.resync_count)?;

        let s = &self.stats;
        writeln!(
            out,
            "  stats:          built={} retired={} purged={} received={} dup={} bytes_in={} bytes_out={}",
            s.built, s.retired, s.purged, s.received, s.duplicates, s.bytes_in, s.bytes_out
        )?;

        match self.working {
            Working::Idle => writeln!(out, "  working:        idle")?,
            Working::Parsing {
                declared: Some(len),
                buffered,
            } => writeln!(out, "  working:        parsing {buffered}/{len} bytes")?,
            Working::Parsing {
                declared: None,
                buffered,
            } => writeln!(out, "  working:        parsing header ({buffered} bytes)")?,
        }

        write!(out, "  relay:         ")?;
        if self.relay.is_empty() {
            write!(out, " (none)")?;
        }
        for code in self.relay.iter() {
            write!(out, " 0x{:04x}({})", code.0, code.label())?;
        }
        writeln!(out)?;

        writeln!(out, "  rx buffer ({} bytes):", self.rx.len())?;
        for line in self.rx.chunks(HEX_LINE) {
            write!(out, "   ")?;
            for b in line {
                write!(out, " {b:02x}")?;
            }
            writeln!(out)?;
        }

        write_queue(out, "outbound", &self.outbound, self.config.max_queue_print)?;
        write_queue(out, "inbound", &self.inbound, self.config.max_queue_print)
    }

    /// The dump as a `String`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = self.write_dump(&mut out);
        out
    }
}

fn write_queue(
    out: &mut impl Write,
    name: &str,
    queue: &MessageQueue,
    max_print: usize,
) -> fmt::Result {
    writeln!(out, "  {name} ({}):", queue.len())?;
    for msg in queue.iter().take(max_print) {
        writeln!(out, "    {msg}")?;
    }
    if queue.len() > max_print {
        writeln!(out, "    ... and {} more", queue.len() - max_print)?;
    }
    Ok(())
}
