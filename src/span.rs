//! BitSpan - a bitmap handle over caller-owned block storage.
//!
//! A [`BitSpan`] borrows a contiguous run of 64-bit blocks supplied by the
//! caller and tracks a logical bit length plus live population counts. The
//! engine never allocates or frees storage; growing and shrinking rebind the
//! handle over memory the caller provides.
//!
//! # Design
//!
//! - Storage is a `&mut [u64]` slice; all "pointer" movement from the original
//!   design becomes index arithmetic over it.
//! - `length` is the logical bit count; bits of the final block at positions
//!   `>= length` are excess bits and are normalized to 0 by every full-width
//!   mutating operation.
//! - `ones + zeros == length` holds at every public call boundary. It may
//!   transiently break inside an operation but never observably.
//! - `last` is the index of the block holding bit `length - 1`. A handle
//!   whose `last` disagrees with `length` is corrupted, never repaired.
//!
//! # Examples
//!
//! ```
//! use bitspan::{BitSpan, Fill};
//!
//! let mut buf = [0u64; 2];
//! let mut span = BitSpan::init(&mut buf, Some(100), Fill::Zero).unwrap();
//! span.set(5, true).unwrap();
//! span.set(99, true).unwrap();
//! assert_eq!(span.ones(), 2);
//! assert_eq!(span.zeros(), 98);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BitSpanError, Result};
use crate::layout::{
    bit_in_block, block_count, block_index, low_mask, Block, BITS_PER_BLOCK, BLOCK_MAX,
};

/// Initial fill for memory coming under a span's control.
///
/// Replaces the sentinel "default value > 1" convention of the original
/// design with an explicit tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    /// Write all-zero bits.
    Zero,
    /// Write all-one bits (within the logical length).
    One,
    /// Leave memory exactly as supplied. Used when restoring a span from
    /// persisted bytes; the caller must invoke [`BitSpan::recount`] before
    /// relying on the population counters.
    Untouched,
}

/// Construction-time configuration.
///
/// Models the two independent build toggles of the original engine:
/// `checked = false` skips every input-validation and invariant check
/// (invalid input then trips `debug_assert!` or slice panics instead of
/// returning errors - the trusted/performance mode), and `quiet = true`
/// suppresses the convenience `print_*` diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Validate arguments and handle invariants on every public operation.
    pub checked: bool,
    /// Suppress stdout diagnostics (`print_meta`, `print_blocks`).
    pub quiet: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            checked: true,
            quiet: false,
        }
    }
}

/// A bitmap view over externally owned, contiguous block storage.
///
/// The borrowed slice is the caller's buffer in full; the span uses the
/// first `block_count(length)` blocks and treats any remainder as dormant
/// capacity available to [`BitSpan::grow`].
#[derive(Debug)]
pub struct BitSpan<'a> {
    /// Caller-owned storage. Never reallocated from inside the engine.
    blocks: &'a mut [Block],
    /// Logical bit count, `1 <= length <= blocks.len() * 64`.
    length: usize,
    /// Index of the block holding bit `length - 1`.
    last: usize,
    /// Count of set bits within `[0, length)`.
    ones: usize,
    /// Count of clear bits within `[0, length)`.
    zeros: usize,
    opts: Options,
}

impl<'a> BitSpan<'a> {
    /// Bind a span to caller memory with default options (checked mode).
    ///
    /// `length` of `None` derives the logical extent from the slice itself;
    /// `Some(n)` uses `n` bits, which must fit the slice. Exactly one of the
    /// two must pin the extent, so an empty slice or `Some(0)` is an
    /// `InvalidArgument`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitspan::{BitSpan, Fill};
    ///
    /// let mut buf = [0u64; 4];
    /// let span = BitSpan::init(&mut buf, None, Fill::Zero).unwrap();
    /// assert_eq!(span.len(), 256);
    /// ```
    pub fn init(blocks: &'a mut [Block], length: Option<usize>, fill: Fill) -> Result<Self> {
        Self::with_options(blocks, length, fill, Options::default())
    }

    /// Bind a span to caller memory with explicit [`Options`].
    pub fn with_options(
        blocks: &'a mut [Block],
        length: Option<usize>,
        fill: Fill,
        opts: Options,
    ) -> Result<Self> {
        if opts.checked {
            if blocks.is_empty() && length.is_none() {
                return Err(BitSpanError::InvalidArgument(
                    "neither buffer extent nor length determines the span".into(),
                ));
            }
            if length == Some(0) {
                return Err(BitSpanError::InvalidArgument(
                    "span length must be nonzero".into(),
                ));
            }
        }
        debug_assert!(length != Some(0), "span length must be nonzero");

        let length = match length {
            Some(n) => n,
            None => blocks.len() * BITS_PER_BLOCK,
        };
        if opts.checked && block_count(length) > blocks.len() {
            return Err(BitSpanError::InvalidArgument(format!(
                "length {} needs {} blocks but buffer has {}",
                length,
                block_count(length),
                blocks.len()
            )));
        }
        debug_assert!(block_count(length) <= blocks.len(), "buffer too small");

        let last = block_index(length - 1);
        let mut span = Self {
            blocks,
            length,
            last,
            ones: 0,
            zeros: 0,
            opts,
        };
        match fill {
            Fill::Zero => {
                span.blocks[..=last].fill(0);
                span.zeros = length;
            }
            Fill::One => {
                span.blocks[..=last].fill(BLOCK_MAX);
                span.mask_tail();
                span.ones = length;
            }
            // Pre-populated buffer from persisted state; counts stay stale
            // until the caller recounts.
            Fill::Untouched => {}
        }
        Ok(span)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Logical bit count of the span.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Spans always hold at least one bit.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Running count of set bits.
    #[inline]
    pub fn ones(&self) -> usize {
        self.ones
    }

    /// Running count of clear bits.
    #[inline]
    pub fn zeros(&self) -> usize {
        self.zeros
    }

    /// Number of blocks currently holding logical bits.
    #[inline]
    pub fn active_blocks(&self) -> usize {
        self.last + 1
    }

    /// Total blocks in the caller's buffer, including dormant capacity.
    #[inline]
    pub fn capacity_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Read-only access to the active block storage.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks[..=self.last]
    }

    /// The configuration this span was constructed with.
    #[inline]
    pub fn options(&self) -> Options {
        self.opts
    }

    // =========================================================================
    // Invariant checks
    // =========================================================================

    /// Check the structural invariant: `last` is exactly the block holding
    /// bit `length - 1` and lies within the buffer.
    pub(crate) fn check_shape(&self) -> Result<()> {
        if !self.opts.checked {
            return Ok(());
        }
        if self.length == 0 || self.last >= self.blocks.len() {
            return Err(BitSpanError::CorruptedState(format!(
                "last block {} outside buffer of {} blocks (length {})",
                self.last,
                self.blocks.len(),
                self.length
            )));
        }
        if self.last != block_index(self.length - 1) {
            return Err(BitSpanError::CorruptedState(format!(
                "last block {} does not hold final bit of length {}",
                self.last, self.length
            )));
        }
        Ok(())
    }

    /// Check the population invariant `ones + zeros == length`.
    pub(crate) fn check_counts(&self) -> Result<()> {
        if !self.opts.checked {
            return Ok(());
        }
        if self.ones + self.zeros != self.length {
            return Err(BitSpanError::CorruptedState(format!(
                "ones {} + zeros {} != length {}",
                self.ones, self.zeros, self.length
            )));
        }
        Ok(())
    }

    /// Full entry validation for operations that rely on both invariants.
    pub(crate) fn validate(&self) -> Result<()> {
        self.check_shape()?;
        self.check_counts()
    }

    // =========================================================================
    // Core Mutators
    // =========================================================================

    /// Clear every logical bit and set the counters exactly.
    pub fn zero(&mut self) -> Result<()> {
        self.check_shape()?;
        let last = self.last;
        self.blocks[..=last].fill(0);
        self.ones = 0;
        self.zeros = self.length;
        Ok(())
    }

    /// Set every logical bit, masking the excess tail back to zero, and set
    /// the counters exactly.
    pub fn one(&mut self) -> Result<()> {
        self.check_shape()?;
        let last = self.last;
        self.blocks[..=last].fill(BLOCK_MAX);
        self.mask_tail();
        self.ones = self.length;
        self.zeros = 0;
        Ok(())
    }

    /// Re-derive `ones`/`zeros` from storage.
    ///
    /// Normalizes the final block's excess bits to 0 before counting, so the
    /// result is always consistent with `length` regardless of stale bits
    /// beyond it. This is the authoritative invariant-restoring operation;
    /// every bulk block-level mutation ends with it.
    pub fn recount(&mut self) -> Result<()> {
        self.check_shape()?;
        self.recount_blocks();
        Ok(())
    }

    /// Read the bit at `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitspan::{BitSpan, Fill};
    ///
    /// let mut buf = [0u64; 1];
    /// let mut span = BitSpan::init(&mut buf, Some(5), Fill::Zero).unwrap();
    /// span.set(2, true).unwrap();
    /// assert!(span.get(2).unwrap());
    /// assert!(!span.get(1).unwrap());
    /// assert!(span.get(5).is_err());
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Result<bool> {
        if self.opts.checked && index >= self.length {
            return Err(BitSpanError::IndexOutOfBounds {
                index,
                length: self.length,
            });
        }
        debug_assert!(index < self.length, "bit index out of bounds");
        Ok((self.blocks[block_index(index)] >> bit_in_block(index)) & 1 == 1)
    }

    /// Write the bit at `index`, adjusting `ones`/`zeros` by exactly one if
    /// and only if the stored value actually changed. A no-op write never
    /// perturbs the counters.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        if self.opts.checked && index >= self.length {
            return Err(BitSpanError::IndexOutOfBounds {
                index,
                length: self.length,
            });
        }
        debug_assert!(index < self.length, "bit index out of bounds");
        let bi = block_index(index);
        let mask = 1u64 << bit_in_block(index);
        let old = self.blocks[bi] & mask != 0;
        if old != value {
            self.blocks[bi] ^= mask;
            if value {
                self.ones += 1;
                self.zeros -= 1;
            } else {
                self.ones -= 1;
                self.zeros += 1;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Resize Operations
    // =========================================================================

    /// Extend the logical length over newly supplied memory.
    ///
    /// `new_blocks` is `Some` only when the caller relocated the buffer; the
    /// new slice is assumed to already carry the old content (realloc
    /// semantics). `new_length` must be strictly larger than the current
    /// length and fit the target capacity. The region
    /// `[old_length, new_length)` is initialized per `fill`, then the
    /// counters are recounted. Memory allocation itself is the caller's job;
    /// this only touches metadata and the bytes it is given.
    pub fn grow(
        &mut self,
        new_blocks: Option<&'a mut [Block]>,
        new_length: usize,
        fill: Fill,
    ) -> Result<()> {
        self.validate()?;
        if self.opts.checked {
            if new_length <= self.length {
                return Err(BitSpanError::InvalidArgument(format!(
                    "grow target {} not strictly larger than length {}",
                    new_length, self.length
                )));
            }
            let cap = new_blocks
                .as_ref()
                .map(|b| b.len())
                .unwrap_or(self.blocks.len());
            if block_count(new_length) > cap {
                return Err(BitSpanError::InvalidArgument(format!(
                    "grow target {} needs {} blocks but buffer has {}",
                    new_length,
                    block_count(new_length),
                    cap
                )));
            }
        }
        debug_assert!(new_length > self.length, "grow target must be larger");

        if let Some(blocks) = new_blocks {
            debug_assert!(block_count(new_length) <= blocks.len(), "buffer too small");
            self.blocks = blocks;
        }
        let old_length = self.length;
        self.length = new_length;
        self.last = block_index(new_length - 1);
        self.paint_range(old_length, new_length, fill);
        self.recount_blocks();
        Ok(())
    }

    /// Truncate the logical length.
    ///
    /// `new_length` must be strictly smaller (and nonzero). The abandoned
    /// tail - the newly-excess bits of the new last block and every block
    /// through the old last block - is always zero-wiped; shrink has no fill
    /// choice. Ends with a recount.
    pub fn shrink(&mut self, new_length: usize) -> Result<()> {
        self.validate()?;
        if self.opts.checked && (new_length == 0 || new_length >= self.length) {
            return Err(BitSpanError::InvalidArgument(format!(
                "shrink target {} not strictly smaller than length {} (or zero)",
                new_length, self.length
            )));
        }
        debug_assert!(
            new_length >= 1 && new_length < self.length,
            "shrink target must be smaller and nonzero"
        );

        let abandoned_end = (self.last + 1) * BITS_PER_BLOCK;
        self.length = new_length;
        self.last = block_index(new_length - 1);
        self.paint_range(new_length, abandoned_end, Fill::Zero);
        self.recount_blocks();
        Ok(())
    }

    /// Copy only the handle metadata (`length`, last block, `ones`, `zeros`)
    /// from `src`. No data movement, no validation; used when relocating a
    /// handle's bookkeeping without touching the underlying storage. A
    /// mismatched destination buffer surfaces later as `CorruptedState`.
    pub fn copy_meta_from(&mut self, src: &BitSpan<'_>) {
        self.length = src.length;
        self.last = src.last;
        self.ones = src.ones;
        self.zeros = src.zeros;
    }

    /// Copy bit content from `src` into this span's existing buffer.
    ///
    /// When this span is at least as long as `src`, all of `src`'s content
    /// is copied and the remaining tail `[src.len(), self.len())` is painted
    /// per `fill`. When it is shorter, the copy is refused with
    /// `OperationFailed` - leaving both spans untouched - unless
    /// `allow_truncate` is set, in which case only the blocks that fit are
    /// copied and the tail is re-masked. Always ends with a recount of this
    /// span.
    pub fn copy_from(&mut self, src: &BitSpan<'_>, allow_truncate: bool, fill: Fill) -> Result<()> {
        self.validate()?;
        src.validate()?;

        if self.length >= src.length {
            let n = src.last + 1;
            if fill == Fill::Untouched && bit_in_block(src.length) != 0 {
                // Partial boundary block: keep this span's bits past
                // src.length instead of clobbering them with src's excess.
                let m = low_mask(bit_in_block(src.length - 1) + 1);
                let merged = (src.blocks[n - 1] & m) | (self.blocks[n - 1] & !m);
                self.blocks[..n - 1].copy_from_slice(&src.blocks[..n - 1]);
                self.blocks[n - 1] = merged;
            } else {
                self.blocks[..n].copy_from_slice(&src.blocks[..n]);
                self.paint_range(src.length, self.length, fill);
            }
        } else {
            if !allow_truncate {
                return Err(BitSpanError::OperationFailed(
                    "destination shorter than source and truncation disallowed".into(),
                ));
            }
            let n = self.last + 1;
            self.blocks[..n].copy_from_slice(&src.blocks[..n]);
        }
        self.recount_blocks();
        Ok(())
    }

    // =========================================================================
    // Crate-internal storage helpers
    // =========================================================================

    /// Mask for the valid bits of the final block.
    #[inline]
    pub(crate) fn tail_mask(&self) -> Block {
        low_mask(self.length - self.last * BITS_PER_BLOCK)
    }

    /// Number of excess bits in the final block.
    #[inline]
    pub(crate) fn excess_bits(&self) -> usize {
        (self.last + 1) * BITS_PER_BLOCK - self.length
    }

    /// Normalize the excess tail bits to 0.
    #[inline]
    pub(crate) fn mask_tail(&mut self) {
        let m = self.tail_mask();
        self.blocks[self.last] &= m;
    }

    /// Recount without entry validation; callers have already checked shape.
    pub(crate) fn recount_blocks(&mut self) {
        self.mask_tail();
        let ones: usize = self.blocks[..=self.last]
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum();
        self.ones = ones;
        self.zeros = self.length - ones;
    }

    /// Swap the population counters. Exact only immediately after a
    /// whole-span complement with a normalized tail.
    #[inline]
    pub(crate) fn swap_counts(&mut self) {
        std::mem::swap(&mut self.ones, &mut self.zeros);
    }

    /// Mutable access to the active block storage.
    #[inline]
    pub(crate) fn active_mut(&mut self) -> &mut [Block] {
        let last = self.last;
        &mut self.blocks[..=last]
    }

    /// Raw storage bit read, addressed over `[0, active_blocks * 64)`.
    #[inline]
    pub(crate) fn storage_bit(&self, pos: usize) -> bool {
        (self.blocks[block_index(pos)] >> bit_in_block(pos)) & 1 == 1
    }

    /// Raw storage bit write; does not touch the counters.
    #[inline]
    pub(crate) fn set_storage_bit(&mut self, pos: usize, value: bool) {
        let mask = 1u64 << bit_in_block(pos);
        if value {
            self.blocks[block_index(pos)] |= mask;
        } else {
            self.blocks[block_index(pos)] &= !mask;
        }
    }

    /// Paint the bit range `[start, end)` per `fill` using block-level masks.
    /// `Fill::Untouched` leaves the range alone. Does not touch the counters.
    pub(crate) fn paint_range(&mut self, start: usize, end: usize, fill: Fill) {
        if start >= end || fill == Fill::Untouched {
            return;
        }
        let first = block_index(start);
        let last = block_index(end - 1);
        for bi in first..=last {
            let lo = if bi == first { bit_in_block(start) } else { 0 };
            let hi = if bi == last {
                bit_in_block(end - 1) + 1
            } else {
                BITS_PER_BLOCK
            };
            let mask = low_mask(hi) & !low_mask(lo);
            match fill {
                Fill::One => self.blocks[bi] |= mask,
                Fill::Zero => self.blocks[bi] &= !mask,
                Fill::Untouched => unreachable!(),
            }
        }
    }

    /// Overwrite the whole logical range per `fill` and resynchronize the
    /// counters. `Fill::Untouched` changes no data but still normalizes the
    /// tail and recounts.
    pub(crate) fn fill_whole(&mut self, fill: Fill) {
        match fill {
            Fill::Zero => {
                let last = self.last;
                self.blocks[..=last].fill(0);
                self.ones = 0;
                self.zeros = self.length;
            }
            Fill::One => {
                let last = self.last;
                self.blocks[..=last].fill(BLOCK_MAX);
                self.mask_tail();
                self.ones = self.length;
                self.zeros = 0;
            }
            Fill::Untouched => self.recount_blocks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_zero() {
        let mut buf = [BLOCK_MAX; 2];
        let span = BitSpan::init(&mut buf, Some(100), Fill::Zero).unwrap();
        assert_eq!(span.len(), 100);
        assert_eq!(span.zeros(), 100);
        assert_eq!(span.ones(), 0);
        assert_eq!(span.active_blocks(), 2);
    }

    #[test]
    fn test_init_one_masks_tail() {
        let mut buf = [0u64; 2];
        let span = BitSpan::init(&mut buf, Some(70), Fill::One).unwrap();
        assert_eq!(span.ones(), 70);
        assert_eq!(span.zeros(), 0);
        // 6 valid bits in the second block, excess normalized to 0
        assert_eq!(span.blocks()[1], low_mask(6));
    }

    #[test]
    fn test_init_untouched_needs_recount() {
        let mut buf = [0b1011u64];
        let mut span = BitSpan::init(&mut buf, Some(8), Fill::Untouched).unwrap();
        assert_eq!(span.ones(), 0); // stale until recount
        span.recount().unwrap();
        assert_eq!(span.ones(), 3);
        assert_eq!(span.zeros(), 5);
    }

    #[test]
    fn test_init_rejects_ambiguous_extent() {
        let mut buf: [u64; 0] = [];
        assert!(BitSpan::init(&mut buf, None, Fill::Zero).is_err());
        let mut buf = [0u64; 1];
        assert!(BitSpan::init(&mut buf, Some(0), Fill::Zero).is_err());
        let mut buf = [0u64; 1];
        assert!(BitSpan::init(&mut buf, Some(65), Fill::Zero).is_err());
    }

    #[test]
    fn test_set_get_counts() {
        let mut buf = [0u64; 1];
        let mut span = BitSpan::init(&mut buf, Some(10), Fill::Zero).unwrap();
        span.set(3, true).unwrap();
        assert!(span.get(3).unwrap());
        assert_eq!(span.ones(), 1);
        // no-op write must not perturb counts
        span.set(3, true).unwrap();
        assert_eq!(span.ones(), 1);
        span.set(3, false).unwrap();
        assert_eq!(span.ones(), 0);
        assert_eq!(span.zeros(), 10);
    }

    #[test]
    fn test_zero_one_recount_invariant() {
        let mut buf = [0u64; 3];
        let mut span = BitSpan::init(&mut buf, Some(130), Fill::Zero).unwrap();
        span.one().unwrap();
        assert_eq!(span.ones() + span.zeros(), span.len());
        span.zero().unwrap();
        assert_eq!(span.ones() + span.zeros(), span.len());
        span.recount().unwrap();
        assert_eq!(span.ones(), 0);
    }

    #[test]
    fn test_paint_range_cross_block() {
        let mut buf = [0u64; 2];
        let mut span = BitSpan::init(&mut buf, Some(128), Fill::Zero).unwrap();
        span.paint_range(60, 70, Fill::One);
        span.recount_blocks();
        assert_eq!(span.ones(), 10);
        for i in 0..128 {
            assert_eq!(span.get(i).unwrap(), (60..70).contains(&i));
        }
    }

    #[test]
    fn test_unchecked_mode_skips_validation() {
        let mut buf = [0u64; 1];
        let opts = Options {
            checked: false,
            quiet: true,
        };
        let mut span = BitSpan::with_options(&mut buf, Some(10), Fill::Zero, opts).unwrap();
        span.set(4, true).unwrap();
        assert!(span.get(4).unwrap());
        assert!(span.validate().is_ok());
    }
}
