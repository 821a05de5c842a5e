//! Bit and run search.
//!
//! Forward and backward scans for the first set/clear bit and for the first
//! maximal run ("continuous group") of set/clear bits, each resumable from a
//! skip offset. All searches are read-only and never touch the population
//! counters; a scan that finds nothing reports `Ok(None)`.
//!
//! Block-at-a-time fast paths skip all-zero (respectively all-one) blocks;
//! `trailing_zeros`/`leading_zeros` finish inside the differing block. The
//! final block is masked by the tail so excess bits never match.

use serde::{Deserialize, Serialize};

use crate::error::{BitSpanError, Result};
use crate::layout::{bit_in_block, block_index, low_mask, Block, BITS_PER_BLOCK, BLOCK_MAX};
use crate::span::BitSpan;

/// A maximal contiguous run of equal-valued bits located by a search.
///
/// `start` is always the lower-index end of the run, regardless of which
/// direction the search walked. Ephemeral: produced by run searches, never
/// stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRun {
    /// The bit value the run consists of.
    pub value: bool,
    /// Bit index of the lower-index end of the run.
    pub start: usize,
    /// Number of bits in the run.
    pub length: usize,
}

impl<'a> BitSpan<'a> {
    /// First set bit at or after `skip_to`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitspan::{BitSpan, Fill};
    ///
    /// let mut buf = [0u64; 1];
    /// let mut span = BitSpan::init(&mut buf, Some(5), Fill::Zero).unwrap();
    /// span.set(0, true).unwrap();
    /// span.set(2, true).unwrap();
    /// assert_eq!(span.first_set_bit(0).unwrap(), Some(0));
    /// assert_eq!(span.first_set_bit(1).unwrap(), Some(2));
    /// assert_eq!(span.first_set_bit(3).unwrap(), None);
    /// ```
    pub fn first_set_bit(&self, skip_to: usize) -> Result<Option<usize>> {
        self.scan_forward(skip_to, true)
    }

    /// First clear bit at or after `skip_to`.
    pub fn first_clear_bit(&self, skip_to: usize) -> Result<Option<usize>> {
        self.scan_forward(skip_to, false)
    }

    /// First set bit at or before `skip_to`, scanning toward index 0.
    pub fn first_set_bit_back(&self, skip_to: usize) -> Result<Option<usize>> {
        self.scan_backward(skip_to, true)
    }

    /// First clear bit at or before `skip_to`, scanning toward index 0.
    pub fn first_clear_bit_back(&self, skip_to: usize) -> Result<Option<usize>> {
        self.scan_backward(skip_to, false)
    }

    /// First maximal run of set bits starting at or after `skip_to`.
    pub fn first_set_run(&self, skip_to: usize) -> Result<Option<BitRun>> {
        self.run_forward(skip_to, true)
    }

    /// First maximal run of clear bits starting at or after `skip_to`.
    pub fn first_clear_run(&self, skip_to: usize) -> Result<Option<BitRun>> {
        self.run_forward(skip_to, false)
    }

    /// First maximal run of set bits ending at or before `skip_to`, scanning
    /// backward. The returned `start` is still the lower-index end.
    pub fn first_set_run_back(&self, skip_to: usize) -> Result<Option<BitRun>> {
        self.run_backward(skip_to, true)
    }

    /// First maximal run of clear bits ending at or before `skip_to`,
    /// scanning backward.
    pub fn first_clear_run_back(&self, skip_to: usize) -> Result<Option<BitRun>> {
        self.run_backward(skip_to, false)
    }

    fn ensure_skip(&self, skip_to: usize) -> Result<()> {
        self.check_shape()?;
        if self.options().checked && skip_to >= self.len() {
            return Err(BitSpanError::InvalidArgument(format!(
                "skip offset {} beyond length {}",
                skip_to,
                self.len()
            )));
        }
        debug_assert!(skip_to < self.len(), "skip offset out of bounds");
        Ok(())
    }

    /// Block `bi` prepared for scanning: complemented for clear-bit
    /// searches, tail-masked when it is the final block.
    #[inline]
    fn scan_word(&self, bi: usize, want: bool) -> Block {
        let mut word = self.blocks()[bi];
        if !want {
            word = !word;
        }
        if bi == self.active_blocks() - 1 {
            word &= self.tail_mask();
        }
        word
    }

    fn scan_forward(&self, skip_to: usize, want: bool) -> Result<Option<usize>> {
        self.ensure_skip(skip_to)?;
        let last = self.active_blocks() - 1;
        let mut bi = block_index(skip_to);
        // mask off bits before the skip offset within its block
        let mut word = self.scan_word(bi, want) & !low_mask(bit_in_block(skip_to));
        loop {
            if word != 0 {
                return Ok(Some(bi * BITS_PER_BLOCK + word.trailing_zeros() as usize));
            }
            if bi == last {
                return Ok(None);
            }
            bi += 1;
            word = self.scan_word(bi, want);
        }
    }

    fn scan_backward(&self, skip_to: usize, want: bool) -> Result<Option<usize>> {
        self.ensure_skip(skip_to)?;
        let mut bi = block_index(skip_to);
        // mask off bits above the skip offset within its block
        let mut word = self.scan_word(bi, want) & low_mask(bit_in_block(skip_to) + 1);
        loop {
            if word != 0 {
                let top = BITS_PER_BLOCK - 1 - word.leading_zeros() as usize;
                return Ok(Some(bi * BITS_PER_BLOCK + top));
            }
            if bi == 0 {
                return Ok(None);
            }
            bi -= 1;
            word = self.scan_word(bi, want);
        }
    }

    fn run_forward(&self, skip_to: usize, want: bool) -> Result<Option<BitRun>> {
        let start = match self.scan_forward(skip_to, want)? {
            Some(bit) => bit,
            None => return Ok(None),
        };
        let mut end = start + 1;
        while end < self.len() {
            // uniform whole blocks extend the run 64 bits at a time
            if bit_in_block(end) == 0 && end + BITS_PER_BLOCK <= self.len() {
                let word = self.blocks()[block_index(end)];
                if word == if want { BLOCK_MAX } else { 0 } {
                    end += BITS_PER_BLOCK;
                    continue;
                }
            }
            if self.storage_bit(end) != want {
                break;
            }
            end += 1;
        }
        Ok(Some(BitRun {
            value: want,
            start,
            length: end - start,
        }))
    }

    fn run_backward(&self, skip_to: usize, want: bool) -> Result<Option<BitRun>> {
        let hi = match self.scan_backward(skip_to, want)? {
            Some(bit) => bit,
            None => return Ok(None),
        };
        let mut lo = hi;
        while lo > 0 {
            // a full uniform block below extends the run 64 bits at a time
            if bit_in_block(lo) == 0 && lo >= BITS_PER_BLOCK {
                let word = self.blocks()[block_index(lo - 1)];
                if word == if want { BLOCK_MAX } else { 0 } {
                    lo -= BITS_PER_BLOCK;
                    continue;
                }
            }
            if self.storage_bit(lo - 1) != want {
                break;
            }
            lo -= 1;
        }
        Ok(Some(BitRun {
            value: want,
            start: lo,
            length: hi - lo + 1,
        }))
    }
}
