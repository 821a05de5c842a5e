//! Block layout and addressing.
//!
//! Pure arithmetic mapping a global bit index to (block index, bit-within-block)
//! and back, for a fixed block width of 64 bits. No state, no failure modes;
//! callers bounds-check indices against their own logical length.

/// Block type for bit storage (64-bit unsigned integer).
pub type Block = u64;

/// Number of bits per block.
pub const BITS_PER_BLOCK: usize = 64;

/// Maximum block value (all bits set).
pub const BLOCK_MAX: Block = Block::MAX;

/// Get block index from global bit position.
#[inline(always)]
pub const fn block_index(bit: usize) -> usize {
    bit >> 6 // bit / 64
}

/// Get bit index within its block from global bit position.
#[inline(always)]
pub const fn bit_in_block(bit: usize) -> usize {
    bit & 63 // bit % 64
}

/// Number of blocks needed to hold `n_bits` bits.
#[inline(always)]
pub const fn block_count(n_bits: usize) -> usize {
    (n_bits + BITS_PER_BLOCK - 1) / BITS_PER_BLOCK
}

/// Create a bitmask with the `n` lowest bits set.
#[inline(always)]
pub const fn low_mask(n: usize) -> Block {
    if n == 0 {
        0
    } else if n >= BITS_PER_BLOCK {
        BLOCK_MAX
    } else {
        BLOCK_MAX >> (BITS_PER_BLOCK - n)
    }
}
