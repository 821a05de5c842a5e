//! Diagnostics: formatted dumps of handle metadata, raw block contents and
//! run descriptors. Debug/test aid, not a stable machine-readable format.
//!
//! The `dump_*` variants write into any caller-supplied [`fmt::Write`] sink;
//! the `print_*` wrappers go to stdout and honor [`Options::quiet`].
//!
//! [`Options::quiet`]: crate::Options

use std::fmt::{self, Write};

use crate::search::BitRun;
use crate::span::BitSpan;

impl fmt::Display for BitRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {{ value: {}, start: {}, length: {} }}",
            self.value as u8, self.start, self.length
        )
    }
}

impl<'a> BitSpan<'a> {
    /// Write the handle metadata into `out`.
    pub fn dump_meta(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(
            out,
            "bitspan {{ length: {}, blocks: {}/{}, ones: {}, zeros: {} }}",
            self.len(),
            self.active_blocks(),
            self.capacity_blocks(),
            self.ones(),
            self.zeros()
        )
    }

    /// Write the active raw block words into `out` as hex, four per line.
    pub fn dump_blocks(&self, out: &mut impl Write) -> fmt::Result {
        for (i, chunk) in self.blocks().chunks(4).enumerate() {
            write!(out, "{:>6}:", i * 4)?;
            for block in chunk {
                write!(out, " {:016x}", block)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Print handle metadata to stdout (suppressed in quiet mode).
    pub fn print_meta(&self) {
        if self.options().quiet {
            return;
        }
        let mut s = String::new();
        if self.dump_meta(&mut s).is_ok() {
            print!("{}", s);
        }
    }

    /// Print raw block contents to stdout (suppressed in quiet mode).
    pub fn print_blocks(&self) {
        if self.options().quiet {
            return;
        }
        let mut s = String::new();
        if self.dump_blocks(&mut s).is_ok() {
            print!("{}", s);
        }
    }
}
