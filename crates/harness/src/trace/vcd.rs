//! Value Change Dump (IEEE 1364) writer.
//!
//! Produces the minimal dialect every waveform viewer reads: a header
//! declaring the variables, an initial `$dumpvars` block, then a stream of
//! `#timestamp` / value-change lines. Timestamps are in simulated
//! microseconds (`$timescale 1 us`). The writer enforces non-decreasing
//! timestamps on its output; a stamp older than the last one written is
//! clamped rather than emitted out of order.

use std::io::{self, Write};

/// Handle to one declared variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarId(usize);

/// First character of the VCD identifier-code alphabet.
const CODE_BASE: u8 = b'!';
/// Size of the identifier-code alphabet (printable ASCII `!`..=`~`).
const CODE_RADIX: usize = 94;

struct VarDef {
    name: String,
    width: u8,
    code: String,
}

/// Streaming VCD writer over any byte sink.
pub struct VcdWriter<W: Write> {
    out: W,
    vars: Vec<VarDef>,
    header_written: bool,
    last_stamp: Option<u64>,
}

impl<W: Write> VcdWriter<W> {
    /// Wraps a sink. Nothing is written until [`Self::write_header`].
    pub const fn new(out: W) -> Self {
        Self {
            out,
            vars: Vec::new(),
            header_written: false,
            last_stamp: None,
        }
    }

    /// Declares a variable; declaration order is header order.
    ///
    /// Only meaningful before the header is written; later declarations are
    /// recorded but never reach the file.
    pub fn declare(&mut self, name: &str, width: u8) -> VarId {
        debug_assert!(!self.header_written, "declare after header");
        let id = VarId(self.vars.len());
        self.vars.push(VarDef {
            name: name.to_owned(),
            width,
            code: identifier_code(id.0),
        });
        id
    }

    /// Number of declared variables.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Writes the declaration header and the initial `$dumpvars` block.
    ///
    /// All declared values start unknown (`x`); the first recorded change on
    /// each variable establishes its real value. Writing the header twice is
    /// a no-op.
    pub fn write_header(&mut self, scope: &str) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.out, "$version lanternsim $end")?;
        writeln!(self.out, "$timescale 1 us $end")?;
        writeln!(self.out, "$scope module {scope} $end")?;
        for var in &self.vars {
            writeln!(
                self.out,
                "$var wire {} {} {} $end",
                var.width, var.code, var.name
            )?;
        }
        writeln!(self.out, "$upscope $end")?;
        writeln!(self.out, "$enddefinitions $end")?;
        writeln!(self.out, "$dumpvars")?;
        for var in &self.vars {
            if var.width == 1 {
                writeln!(self.out, "x{}", var.code)?;
            } else {
                writeln!(self.out, "bx {}", var.code)?;
            }
        }
        writeln!(self.out, "$end")?;
        self.header_written = true;
        Ok(())
    }

    /// Records one value change at the given microsecond stamp.
    ///
    /// Emits a `#stamp` line only when the stamp moves; stamps are clamped
    /// to be non-decreasing.
    pub fn change(&mut self, stamp: u64, var: VarId, value: u32) -> io::Result<()> {
        let stamp = self.last_stamp.map_or(stamp, |last| stamp.max(last));
        if self.last_stamp != Some(stamp) {
            writeln!(self.out, "#{stamp}")?;
            self.last_stamp = Some(stamp);
        }
        let def = &self.vars[var.0];
        if def.width == 1 {
            writeln!(self.out, "{}{}", value & 1, def.code)?;
        } else {
            writeln!(self.out, "b{value:b} {}", def.code)?;
        }
        Ok(())
    }

    /// Flushes the sink so the artifact on disk is complete.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> std::fmt::Debug for VcdWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VcdWriter")
            .field("vars", &self.vars.len())
            .field("header_written", &self.header_written)
            .field("last_stamp", &self.last_stamp)
            .finish_non_exhaustive()
    }
}

/// Maps a variable index to a short identifier code over `!`..=`~`.
fn identifier_code(mut index: usize) -> String {
    let mut code = String::new();
    loop {
        let digit = (index % CODE_RADIX) as u8;
        code.push(char::from(CODE_BASE + digit));
        index /= CODE_RADIX;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    code
}
