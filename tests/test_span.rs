//! Tests for the BitSpan handle: lifecycle, core mutators, single-bit
//! access, metadata copies and the handle invariants.

use bitspan::{BitSpan, BitSpanError, Fill, Options};

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_init_from_slice_extent() {
    let mut buf = [0u64; 4];
    let span = BitSpan::init(&mut buf, None, Fill::Zero).unwrap();
    assert_eq!(span.len(), 256);
    assert_eq!(span.active_blocks(), 4);
    assert_eq!(span.zeros(), 256);
}

#[test]
fn test_init_with_spare_capacity() {
    let mut buf = [0u64; 4];
    let span = BitSpan::init(&mut buf, Some(70), Fill::Zero).unwrap();
    assert_eq!(span.len(), 70);
    assert_eq!(span.active_blocks(), 2);
    assert_eq!(span.capacity_blocks(), 4);
}

#[test]
fn test_init_one_fill_counts_logical_bits_only() {
    let mut buf = [0u64; 2];
    let span = BitSpan::init(&mut buf, Some(100), Fill::One).unwrap();
    // tail beyond length is not counted
    assert_eq!(span.ones(), 100);
    assert_eq!(span.zeros(), 0);
}

#[test]
fn test_init_untouched_preserves_persisted_bytes() {
    let mut buf = [0xFF00FF00FF00FF00u64, 0x3];
    let mut span = BitSpan::init(&mut buf, Some(66), Fill::Untouched).unwrap();
    span.recount().unwrap();
    assert_eq!(span.ones(), 34);
    assert_eq!(span.zeros(), 32);
    assert!(span.get(65).unwrap());
}

#[test]
fn test_init_invalid_arguments() {
    let mut empty: [u64; 0] = [];
    assert!(matches!(
        BitSpan::init(&mut empty, None, Fill::Zero),
        Err(BitSpanError::InvalidArgument(_))
    ));

    let mut buf = [0u64; 1];
    assert!(matches!(
        BitSpan::init(&mut buf, Some(0), Fill::Zero),
        Err(BitSpanError::InvalidArgument(_))
    ));

    let mut buf = [0u64; 1];
    assert!(matches!(
        BitSpan::init(&mut buf, Some(100), Fill::Zero),
        Err(BitSpanError::InvalidArgument(_))
    ));
}

// =============================================================================
// Core Mutators
// =============================================================================

#[test]
fn test_zero_one_exact_counts() {
    let mut buf = [0u64; 3];
    let mut span = BitSpan::init(&mut buf, Some(150), Fill::Zero).unwrap();

    span.one().unwrap();
    assert_eq!(span.ones(), 150);
    assert_eq!(span.zeros(), 0);

    span.zero().unwrap();
    assert_eq!(span.ones(), 0);
    assert_eq!(span.zeros(), 150);
}

#[test]
fn test_one_masks_excess_tail() {
    let mut buf = [0u64; 2];
    let mut span = BitSpan::init(&mut buf, Some(70), Fill::Zero).unwrap();
    span.one().unwrap();
    // only 6 valid bits in the last block
    assert_eq!(span.blocks()[1], 0b111111);
}

#[test]
fn test_recount_resynchronizes_after_stale_bytes() {
    let mut buf = [0u64; 1];
    let mut span = BitSpan::init(&mut buf, Some(8), Fill::Untouched).unwrap();
    // counts are stale until the caller recounts
    assert_eq!(span.ones() + span.zeros(), 0);
    span.recount().unwrap();
    assert_eq!(span.ones() + span.zeros(), 8);
}

// =============================================================================
// Single-bit read/write
// =============================================================================

#[test]
fn test_write_read_consistency() {
    let mut buf = [0u64; 2];
    let mut span = BitSpan::init(&mut buf, Some(128), Fill::Zero).unwrap();
    for i in 0..128 {
        span.set(i, i % 3 == 0).unwrap();
        assert_eq!(span.get(i).unwrap(), i % 3 == 0);
    }
    assert_eq!(span.ones() + span.zeros(), 128);
}

#[test]
fn test_duplicate_write_does_not_change_counts() {
    let mut buf = [0u64; 1];
    let mut span = BitSpan::init(&mut buf, Some(16), Fill::Zero).unwrap();
    span.set(7, true).unwrap();
    let (ones, zeros) = (span.ones(), span.zeros());
    span.set(7, true).unwrap();
    assert_eq!((span.ones(), span.zeros()), (ones, zeros));
}

#[test]
fn test_out_of_range_access() {
    let mut buf = [0u64; 1];
    let mut span = BitSpan::init(&mut buf, Some(10), Fill::Zero).unwrap();
    assert!(matches!(
        span.get(10),
        Err(BitSpanError::IndexOutOfBounds {
            index: 10,
            length: 10
        })
    ));
    assert!(span.set(64, true).is_err());
}

// Concrete scenario: length 5 on a single block, pattern 10101.
#[test]
fn test_five_bit_scenario() {
    let mut buf = [0u64; 1];
    let mut span = BitSpan::init(&mut buf, Some(5), Fill::Zero).unwrap();
    span.set(0, true).unwrap();
    span.set(2, true).unwrap();
    span.set(4, true).unwrap();

    assert!(!span.get(1).unwrap());
    assert_eq!(span.ones(), 3);
    assert_eq!(span.zeros(), 2);
    assert_eq!(span.first_set_bit(0).unwrap(), Some(0));
    assert_eq!(span.first_set_bit(1).unwrap(), Some(2));
    assert_eq!(span.first_clear_bit(0).unwrap(), Some(1));
    // storage beyond the 5 logical bits stays zero
    assert_eq!(span.blocks()[0], 0b10101);
}

// =============================================================================
// Metadata copy
// =============================================================================

#[test]
fn test_copy_meta_from() {
    let mut src_buf = [0u64; 2];
    let mut dst_buf = [0u64; 2];
    let mut src = BitSpan::init(&mut src_buf, Some(90), Fill::Zero).unwrap();
    src.set(3, true).unwrap();

    let mut dst = BitSpan::init(&mut dst_buf, Some(128), Fill::Zero).unwrap();
    dst.copy_meta_from(&src);
    assert_eq!(dst.len(), 90);
    assert_eq!(dst.ones(), 1);
    assert_eq!(dst.zeros(), 89);
    // metadata only: no data moved
    assert!(!dst.get(3).unwrap());
}

#[test]
fn test_copy_meta_from_oversized_source_corrupts_handle() {
    let mut src_buf = [0u64; 4];
    let mut dst_buf = [0u64; 1];
    let src = BitSpan::init(&mut src_buf, Some(250), Fill::Zero).unwrap();
    let mut dst = BitSpan::init(&mut dst_buf, Some(64), Fill::Zero).unwrap();

    // metadata for 250 bits cannot fit a one-block buffer; the mismatch is
    // not caught here but on the next validated operation
    dst.copy_meta_from(&src);
    assert!(matches!(
        dst.recount(),
        Err(BitSpanError::CorruptedState(_))
    ));
    assert!(matches!(
        dst.shift_right(1, Fill::Zero),
        Err(BitSpanError::CorruptedState(_))
    ));
}

// =============================================================================
// Invariant preservation
// =============================================================================

#[test]
fn test_invariants_across_operation_sequence() {
    let mut buf = [0u64; 3];
    let mut span = BitSpan::init(&mut buf, Some(130), Fill::Zero).unwrap();

    for i in (0..130).step_by(7) {
        span.set(i, true).unwrap();
        assert_eq!(span.ones() + span.zeros(), span.len());
    }
    span.one().unwrap();
    assert_eq!(span.ones() + span.zeros(), span.len());
    span.complement().unwrap();
    assert_eq!(span.ones() + span.zeros(), span.len());
    span.shift_right(13, Fill::One).unwrap();
    assert_eq!(span.ones() + span.zeros(), span.len());
    span.rotate_left(29).unwrap();
    assert_eq!(span.ones() + span.zeros(), span.len());
    span.recount().unwrap();
    assert_eq!(span.ones() + span.zeros(), span.len());
}

// =============================================================================
// Unchecked mode
// =============================================================================

#[test]
fn test_unchecked_mode_valid_inputs_behave_identically() {
    let opts = Options {
        checked: false,
        quiet: true,
    };
    let mut buf = [0u64; 2];
    let mut span = BitSpan::with_options(&mut buf, Some(100), Fill::Zero, opts).unwrap();
    span.set(42, true).unwrap();
    assert!(span.get(42).unwrap());
    span.rotate_right(10).unwrap();
    assert!(span.get(52).unwrap());
    assert_eq!(span.ones(), 1);
}
