//! # swath-core: multi-way aggregation of sparse compressed bit-vectors
//!
//! `swath-core` computes logical combinations - OR, AND, fused AND-SUB,
//! and SHIFT-RIGHT-AND - over groups of up to 256 sparse bit-vectors in
//! a single block-aligned streaming pass, dramatically faster than
//! chaining pairwise operations.
//!
//! ## Overview
//!
//! Bit-vectors partition a 2^36-bit address space into 65,536-bit
//! blocks behind a two-level directory. Each block is stored in the
//! cheapest of four forms: nothing (all-zeros), a sentinel (all-ones),
//! a GAP run-length list, or a dense array. The aggregation engine
//! walks the block grid once and, per coordinate:
//!
//! 1. **Sorts** every source's block into dense and GAP buckets,
//!    or short-circuits outright when a uniform block makes the
//!    outcome a *golden block* (all-ones under OR, all-zeros under
//!    AND).
//! 2. **Reduces** the buckets through batched kernels (5-way/3-way/
//!    2-way OR folds; digest-pruned AND/SUB) into one scratch block.
//! 3. **Commits** the result to the target directory in row-major
//!    order, as a sentinel when possible.
//!
//! A 64-bit *digest* tracks which 1,024-bit slices of the scratch
//! block are still live; AND/SUB folds stop the instant it hits zero.
//! The shift-AND drivers additionally thread a 1-bit carry per source
//! across block boundaries to evaluate positional queries.
//!
//! ## Quick start
//!
//! ```
//! use swath_core::{Aggregator, BitVector};
//!
//! let mut a = BitVector::new();
//! let mut b = BitVector::new();
//! let mut c = BitVector::new();
//! for bv in [&mut a, &mut b, &mut c] {
//!     bv.set(42);
//! }
//! b.set(100_000);
//!
//! let mut agg = Aggregator::new();
//! agg.add(&a).unwrap();
//! agg.add(&b).unwrap();
//! agg.add(&c).unwrap();
//!
//! let mut result = BitVector::new();
//! agg.combine_and(&mut result);
//! assert!(result.get(42));
//! assert!(!result.get(100_000));
//! ```
//!
//! ## Module organization
//!
//! - [`block`] - the dense block type, word-wise kernels, digests, GAP
//!   run-length blocks, and the shift-carry kernels.
//! - [`vector`] - the two-level-directory container the engine
//!   consumes and produces.
//! - [`aggregate`] - the engine: argument groups, sorter, reducers,
//!   drivers, and the horizontal reference reductions.
//!
//! ## Concurrency
//!
//! An aggregator is strictly single-threaded: operations run to
//! completion on the calling thread with no suspension points. Sources
//! are borrowed shared, the target exclusively; independent
//! aggregators may run concurrently on disjoint targets.

#![no_std]
#![deny(missing_docs)]

extern crate alloc;

pub mod aggregate;
pub mod block;
pub mod vector;

pub use aggregate::{Aggregator, Error, MAX_CAP};
pub use block::{BitBlock, Digest, BLOCK_BITS};
pub use vector::{BitVector, BlockKind, MAX_BITS, SUB_COUNT, TOP_COUNT};
