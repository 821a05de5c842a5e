//! Boolean algebra across spans.
//!
//! [`and`], [`or`] and [`xor`] combine two source spans elementwise into a
//! result span; the operation is defined over however many complete blocks
//! are common to all three buffers. [`BitSpan::complement`] is the in-place
//! NOT with an O(1) counter swap.

use crate::error::{BitSpanError, Result};
use crate::span::BitSpan;

#[inline]
fn elementwise(
    a: &BitSpan<'_>,
    b: &BitSpan<'_>,
    out: &mut BitSpan<'_>,
    enforce_same_size: bool,
    op: impl Fn(u64, u64) -> u64,
) -> Result<()> {
    a.validate()?;
    b.validate()?;
    out.validate()?;
    if enforce_same_size && (a.len() != b.len() || b.len() != out.len()) {
        return Err(BitSpanError::InvalidArgument(format!(
            "operand lengths differ: {} / {} / {}",
            a.len(),
            b.len(),
            out.len()
        )));
    }

    let n = a
        .active_blocks()
        .min(b.active_blocks())
        .min(out.active_blocks());
    let dst = out.active_mut();
    for i in 0..n {
        dst[i] = op(a.blocks()[i], b.blocks()[i]);
    }
    // Edge and excess bits of the result are normalized against the
    // result's own length, regardless of the sources' excess bits.
    out.recount_blocks();
    Ok(())
}

/// `out = a & b` over the blocks common to all three spans, then recount.
///
/// With `enforce_same_size` set, fails with `InvalidArgument` unless all
/// three logical lengths are identical.
pub fn and(
    a: &BitSpan<'_>,
    b: &BitSpan<'_>,
    out: &mut BitSpan<'_>,
    enforce_same_size: bool,
) -> Result<()> {
    elementwise(a, b, out, enforce_same_size, |x, y| x & y)
}

/// `out = a | b` over the blocks common to all three spans, then recount.
pub fn or(
    a: &BitSpan<'_>,
    b: &BitSpan<'_>,
    out: &mut BitSpan<'_>,
    enforce_same_size: bool,
) -> Result<()> {
    elementwise(a, b, out, enforce_same_size, |x, y| x | y)
}

/// `out = a ^ b` over the blocks common to all three spans, then recount.
pub fn xor(
    a: &BitSpan<'_>,
    b: &BitSpan<'_>,
    out: &mut BitSpan<'_>,
    enforce_same_size: bool,
) -> Result<()> {
    elementwise(a, b, out, enforce_same_size, |x, y| x ^ y)
}

impl<'a> BitSpan<'a> {
    /// In-place bitwise NOT.
    ///
    /// Complements every block, re-masks the excess tail and swaps the
    /// population counters in O(1). The counter swap is exact only when the
    /// excess bits were already normalized to 0, so that is verified at
    /// entry rather than assumed: a dirty tail reports `CorruptedState`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitspan::{BitSpan, Fill};
    ///
    /// let mut buf = [0u64; 1];
    /// let mut span = BitSpan::init(&mut buf, Some(10), Fill::Zero).unwrap();
    /// span.set(3, true).unwrap();
    /// span.complement().unwrap();
    /// assert_eq!(span.ones(), 9);
    /// assert!(!span.get(3).unwrap());
    /// ```
    pub fn complement(&mut self) -> Result<()> {
        self.validate()?;
        if self.options().checked {
            let last = self.active_blocks() - 1;
            if self.blocks()[last] & !self.tail_mask() != 0 {
                return Err(BitSpanError::CorruptedState(
                    "excess tail bits not normalized before complement".into(),
                ));
            }
        }
        debug_assert_eq!(
            self.blocks()[self.active_blocks() - 1] & !self.tail_mask(),
            0,
            "excess tail bits not normalized before complement"
        );

        for block in self.active_mut() {
            *block = !*block;
        }
        self.mask_tail();
        self.swap_counts();
        Ok(())
    }
}
