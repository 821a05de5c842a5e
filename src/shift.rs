//! Shift and rotate engine.
//!
//! Bit-granularity left/right shifting with fill-value semantics, and true
//! wrap-around rotation, both in place over the span's own storage with O(1)
//! extra memory - no auxiliary buffer is ever allocated.
//!
//! # Non-wrapping shifts
//!
//! An offset decomposes into whole blocks plus a remainder. Whole-block moves
//! and the remainder stitch across block boundaries happen in one pass
//! ordered so no not-yet-read block is clobbered (descending toward higher
//! indices, ascending toward lower ones). The vacated edge is painted with
//! the fill value; `Fill::Untouched` restores the original bits of the
//! vacated region instead.
//!
//! # Wrap-around rotation
//!
//! Whole blocks rotate with a cyclic "ferris wheel" swap
//! ([`rotate_blocks_left`]): repeatedly swap the leading and trailing
//! `min(p, n - p)` blocks of the active range and shrink the range from
//! whichever end was fully placed, until it collapses. Because the logical
//! length need not fill the final block, block rotation drags the excess-bit
//! gap into the seam; a storage-wide twist by `remainder + excess` bits
//! followed by a gap-close stitch restores a contiguous logical string with
//! the excess region back at the top.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{bit_in_block, block_index, low_mask, Block, BITS_PER_BLOCK, BLOCK_MAX};
use crate::span::{BitSpan, Fill};

/// Direction of a shift or rotation, in bit-index terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftDirection {
    /// Toward lower bit indices.
    Left,
    /// Toward higher bit indices.
    Right,
}

impl<'a> BitSpan<'a> {
    /// Shift or rotate the span by `offset` bits.
    ///
    /// With `wrap_around` unset this is a non-wrapping shift: bits leaving
    /// the span are lost and the vacated edge is painted per `fill`. With it
    /// set, the span rotates and `fill` is ignored (rotation preserves the
    /// population exactly). Offsets are normalized internally, never
    /// rejected; `offset == 0` is a validated no-op. Fails with
    /// `CorruptedState` if the handle invariants do not hold at entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitspan::{BitSpan, Fill, ShiftDirection};
    ///
    /// let mut buf = [0u64; 1];
    /// let mut span = BitSpan::init(&mut buf, Some(8), Fill::Zero).unwrap();
    /// span.set(0, true).unwrap();
    /// span.shift(3, ShiftDirection::Right, Fill::Zero, false).unwrap();
    /// assert!(span.get(3).unwrap());
    /// assert_eq!(span.ones(), 1);
    /// ```
    pub fn shift(
        &mut self,
        offset: usize,
        direction: ShiftDirection,
        fill: Fill,
        wrap_around: bool,
    ) -> Result<()> {
        self.validate()?;
        if wrap_around {
            self.rotate_impl(offset, direction)
        } else {
            match direction {
                ShiftDirection::Right => self.shift_right_impl(offset, fill),
                ShiftDirection::Left => self.shift_left_impl(offset, fill),
            }
        }
    }

    /// Non-wrapping shift toward higher indices.
    pub fn shift_right(&mut self, offset: usize, fill: Fill) -> Result<()> {
        self.shift(offset, ShiftDirection::Right, fill, false)
    }

    /// Non-wrapping shift toward lower indices.
    pub fn shift_left(&mut self, offset: usize, fill: Fill) -> Result<()> {
        self.shift(offset, ShiftDirection::Left, fill, false)
    }

    /// Rotation toward higher indices; wrapped bits reappear at index 0.
    pub fn rotate_right(&mut self, offset: usize) -> Result<()> {
        self.shift(offset, ShiftDirection::Right, Fill::Zero, true)
    }

    /// Rotation toward lower indices; wrapped bits reappear at the top.
    pub fn rotate_left(&mut self, offset: usize) -> Result<()> {
        self.shift(offset, ShiftDirection::Left, Fill::Zero, true)
    }

    fn shift_right_impl(&mut self, offset: usize, fill: Fill) -> Result<()> {
        if offset == 0 {
            return Ok(());
        }
        let nb = self.active_blocks();
        let wb = offset / BITS_PER_BLOCK;
        let rem = offset % BITS_PER_BLOCK;
        if wb >= nb {
            self.fill_whole(fill);
            return Ok(());
        }

        let b = self.active_mut();
        let saved_origin = b[wb];
        // Whole-block move and remainder stitch in one descending pass;
        // sources sit at lower indices and are read before being written.
        for i in ((wb + 1)..nb).rev() {
            b[i] = if rem == 0 {
                b[i - wb]
            } else {
                (b[i - wb] << rem) | (b[i - wb - 1] >> (BITS_PER_BLOCK - rem))
            };
        }
        // Boundary block: shifted origin bits above, fill in the vacated
        // low remainder positions.
        if rem == 0 {
            if wb > 0 {
                b[wb] = b[0];
            }
        } else {
            let vacated = match fill {
                Fill::Zero => 0,
                Fill::One => low_mask(rem),
                Fill::Untouched => saved_origin & low_mask(rem),
            };
            b[wb] = (b[0] << rem) | vacated;
        }
        // Fully vacated blocks at the origin end.
        for i in 0..wb {
            match fill {
                Fill::Zero => b[i] = 0,
                Fill::One => b[i] = BLOCK_MAX,
                Fill::Untouched => {}
            }
        }
        self.recount_blocks();
        Ok(())
    }

    fn shift_left_impl(&mut self, offset: usize, fill: Fill) -> Result<()> {
        if offset == 0 {
            return Ok(());
        }
        if offset >= self.len() {
            self.fill_whole(fill);
            return Ok(());
        }
        let nb = self.active_blocks();
        let wb = offset / BITS_PER_BLOCK;
        let rem = offset % BITS_PER_BLOCK;
        let first_vacated = self.len() - offset;
        let vb = block_index(first_vacated);
        let vo = bit_in_block(first_vacated);

        let b = self.active_mut();
        let saved_boundary = if vo > 0 { b[vb] } else { 0 };
        // Full destination blocks, ascending; sources sit at higher indices.
        for i in 0..vb {
            b[i] = if rem == 0 {
                b[i + wb]
            } else {
                (b[i + wb] >> rem) | (b[i + wb + 1] << (BITS_PER_BLOCK - rem))
            };
        }
        // Boundary block: shifted bits below the vacancy, fill above. The
        // spilled high source block exists only while the remainder stays
        // within the tail's excess allowance; both regimes are explicit.
        if vo > 0 {
            let src = if rem == 0 {
                b[vb + wb]
            } else if vb + wb + 1 < nb {
                (b[vb + wb] >> rem) | (b[vb + wb + 1] << (BITS_PER_BLOCK - rem))
            } else {
                b[vb + wb] >> rem
            };
            let vacated = match fill {
                Fill::Zero => 0,
                Fill::One => !low_mask(vo),
                Fill::Untouched => saved_boundary & !low_mask(vo),
            };
            b[vb] = (src & low_mask(vo)) | vacated;
        }
        // Fully vacated blocks at the far end.
        let start = if vo > 0 { vb + 1 } else { vb };
        for i in start..nb {
            match fill {
                Fill::Zero => b[i] = 0,
                Fill::One => b[i] = BLOCK_MAX,
                Fill::Untouched => {}
            }
        }
        self.recount_blocks();
        Ok(())
    }

    fn rotate_impl(&mut self, offset: usize, direction: ShiftDirection) -> Result<()> {
        let len = self.len();
        let mut k = offset % len;
        if direction == ShiftDirection::Left {
            // left rotation is the complementary right rotation
            k = (len - k) % len;
        }
        if k == 0 {
            return Ok(());
        }
        let excess = self.excess_bits();
        let wb = k / BITS_PER_BLOCK;
        let rem = k % BITS_PER_BLOCK;
        {
            let b = self.active_mut();
            if wb > 0 {
                rotate_blocks_right(b, wb);
            }
            // Block rotation dragged the excess-bit gap into the seam; a
            // storage-wide twist by rem + excess lines every bit up except
            // for that gap, which lands at [k, k + excess).
            storage_rotate_right(b, rem + excess);
        }
        if excess > 0 {
            self.close_gap(k, excess);
        }
        self.recount_blocks();
        Ok(())
    }

    /// Squeeze `gap` zero bits sitting at storage positions `[k, k + gap)`
    /// out through the tail, restoring the excess region to the top.
    fn close_gap(&mut self, k: usize, gap: usize) {
        let storage_bits = self.active_blocks() * BITS_PER_BLOCK;
        for p in k..storage_bits - gap {
            let v = self.storage_bit(p + gap);
            self.set_storage_bit(p, v);
        }
        for p in storage_bits - gap..storage_bits {
            self.set_storage_bit(p, false);
        }
    }
}

/// In-place block rotation toward higher indices by `m` positions.
pub(crate) fn rotate_blocks_right(blocks: &mut [Block], m: usize) {
    if blocks.is_empty() {
        return;
    }
    let n = blocks.len();
    let m = m % n;
    if m == 0 {
        return;
    }
    rotate_blocks_left(blocks, n - m);
}

/// In-place block rotation toward lower indices by `p` positions, using the
/// cyclic pairwise-region swap: swap the leading and trailing `min(p, n-p)`
/// blocks of the active range, then shrink the range from whichever end was
/// fully placed, alternating until the range collapses. O(1) extra memory.
pub(crate) fn rotate_blocks_left(blocks: &mut [Block], mut p: usize) {
    if blocks.is_empty() {
        return;
    }
    let mut lo = 0;
    let mut hi = blocks.len();
    p %= blocks.len();
    loop {
        let n = hi - lo;
        if p == 0 || p == n {
            return;
        }
        let q = n - p;
        let m = p.min(q);
        for i in 0..m {
            blocks.swap(lo + i, hi - m + i);
        }
        if p < q {
            // trailing m blocks are final
            hi -= m;
        } else if p > q {
            // leading m blocks are final
            lo += m;
            p -= m;
        } else {
            return;
        }
    }
}

/// Bit rotation of the whole storage string (block-aligned extent) toward
/// higher bit positions: at most one whole-block rotation plus one carry
/// chain.
pub(crate) fn storage_rotate_right(blocks: &mut [Block], t: usize) {
    if blocks.is_empty() {
        return;
    }
    let n = blocks.len();
    let t = t % (n * BITS_PER_BLOCK);
    if t == 0 {
        return;
    }
    let whole = t / BITS_PER_BLOCK;
    if whole > 0 {
        rotate_blocks_right(blocks, whole);
    }
    let r = t % BITS_PER_BLOCK;
    if r > 0 {
        let carry = blocks[n - 1] >> (BITS_PER_BLOCK - r);
        for i in (1..n).rev() {
            blocks[i] = (blocks[i] << r) | (blocks[i - 1] >> (BITS_PER_BLOCK - r));
        }
        blocks[0] = (blocks[0] << r) | carry;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_blocks_left_matches_std() {
        for n in 1..=9usize {
            for p in 0..n {
                let mut ours: Vec<Block> = (0..n as u64).collect();
                let mut oracle = ours.clone();
                rotate_blocks_left(&mut ours, p);
                oracle.rotate_left(p);
                assert_eq!(ours, oracle, "n={} p={}", n, p);
            }
        }
    }

    #[test]
    fn test_rotate_blocks_right_matches_std() {
        for n in 1..=9usize {
            for m in 0..2 * n {
                let mut ours: Vec<Block> = (100..100 + n as u64).collect();
                let mut oracle = ours.clone();
                rotate_blocks_right(&mut ours, m);
                oracle.rotate_right(m % n);
                assert_eq!(ours, oracle, "n={} m={}", n, m);
            }
        }
    }

    #[test]
    fn test_storage_rotate_right_single_block() {
        let mut blocks = [0b1011u64];
        storage_rotate_right(&mut blocks, 2);
        assert_eq!(blocks[0], 0b1011u64.rotate_left(2));
    }

    #[test]
    fn test_storage_rotate_right_carries_across_blocks() {
        let mut blocks = [1u64 << 63, 0];
        storage_rotate_right(&mut blocks, 1);
        assert_eq!(blocks, [0, 1]);

        let mut blocks = [0u64, 1 << 63];
        storage_rotate_right(&mut blocks, 1);
        assert_eq!(blocks, [1, 0]);
    }

    #[test]
    fn test_storage_rotate_right_whole_plus_remainder() {
        // t >= 64 takes the whole-block branch plus a carry chain
        let mut blocks = [0xDEADBEEFu64, 0x12345678, 0xCAFEBABE];
        let mut expect = blocks;
        storage_rotate_right(&mut blocks, 67);
        expect.rotate_right(1);
        storage_rotate_right(&mut expect, 3);
        assert_eq!(blocks, expect);
    }
}
