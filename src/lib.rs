//! Bitspan - Fixed-Layout Bitmap Engine over Caller-Owned Memory
//!
//! Bitspan is a dense bit-vector built from fixed-width 64-bit blocks. It
//! supports in-place shifting and rotation, boolean algebra, bit and
//! run-length search (forward and backward), and growth/shrink over
//! caller-supplied memory - all without any internal allocation, while
//! maintaining running population counts as an invariant.
//!
//! # Key Characteristics
//!
//! - Storage is always a caller-owned `&mut [u64]`; the engine never
//!   allocates, reallocates or frees
//! - `ones + zeros == length` holds at every public call boundary
//! - In-place wrap-around rotation with O(1) extra memory
//! - Excess bits beyond the logical length are normalized to zero by every
//!   full-width mutating operation
//! - Single-threaded and unsynchronized; callers embedding a span in a
//!   multi-threaded host must serialize access externally
//!
//! # Architecture
//!
//! - **layout**: pure block/bit index arithmetic
//! - **span**: the [`BitSpan`] handle - lifecycle, core mutators, resize
//! - **logic**: AND/OR/XOR across spans, in-place complement
//! - **shift**: non-wrapping shifts with fill semantics and true rotation
//! - **search**: first set/clear bit and run searches, resumable via skip
//!   offsets
//! - **dump**: diagnostic dumps into pluggable sinks
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use bitspan::{BitSpan, Fill};
//!
//! let mut buf = [0u64; 2];
//! let mut span = BitSpan::init(&mut buf, Some(100), Fill::Zero).unwrap();
//! span.set(10, true).unwrap();
//! span.set(20, true).unwrap();
//!
//! assert_eq!(span.ones(), 2);
//! assert_eq!(span.first_set_bit(11).unwrap(), Some(20));
//! ```
//!
//! ## Rotation round-trip
//!
//! ```
//! use bitspan::{BitSpan, Fill};
//!
//! let mut buf = [0u64; 2];
//! let mut span = BitSpan::init(&mut buf, Some(90), Fill::Zero).unwrap();
//! span.set(0, true).unwrap();
//! span.set(89, true).unwrap();
//!
//! span.rotate_right(17).unwrap();
//! span.rotate_left(17).unwrap();
//! assert!(span.get(0).unwrap() && span.get(89).unwrap());
//! assert_eq!(span.ones(), 2);
//! ```
//!
//! # Safety
//!
//! Validation is a construction-time choice ([`Options::checked`]): the
//! default checked mode reports invalid arguments and corrupted handles as
//! errors before any mutation; the unchecked mode skips every check and
//! relies on `debug_assert!`, trading safety for speed in trusted hosts.

// Module declarations
pub mod dump;
pub mod error;
pub mod layout;
pub mod logic;
pub mod search;
pub mod shift;
pub mod span;

// Re-exports for convenient access
pub use error::{BitSpanError, Result};
pub use layout::{bit_in_block, block_count, block_index, Block, BITS_PER_BLOCK, BLOCK_MAX};
pub use logic::{and, or, xor};
pub use search::BitRun;
pub use shift::ShiftDirection;
pub use span::{BitSpan, Fill, Options};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const NAME: &str = "Bitspan";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
