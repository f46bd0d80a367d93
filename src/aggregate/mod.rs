//! Multi-way aggregation engine.
//!
//! [`Aggregator`] evaluates one logical combination - OR, AND, fused
//! AND-SUB, or SHIFT-RIGHT-AND - over up to [`MAX_CAP`] bit-vectors in
//! a single block-aligned pass. Per (i, j) block coordinate the sorter
//! classifies every source's block, the reducer folds the survivors
//! through batched kernels into one scratch block, and the driver
//! commits the outcome to the target in row-major order. Uniform
//! blocks short-circuit without materialization, and a 64-bit digest
//! kills AND/SUB folds the moment a block goes empty.

mod arena;
pub mod horizontal;
mod reduce;
mod shift;
mod sort;

use arena::Arena;

use crate::block::{ops, BLOCK_BITS};
use crate::vector::{BitVector, BlockPool, PoolGuard, SUB_COUNT};

/// Maximum number of source vectors per argument group.
pub const MAX_CAP: usize = 256;

/// Aggregation errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// An argument group is already at [`MAX_CAP`].
    CapacityExceeded,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::CapacityExceeded => write!(f, "argument group capacity exceeded"),
        }
    }
}

impl core::error::Error for Error {}

/// Multi-way aggregator over borrowed bit-vectors.
///
/// Sources are attached to two argument groups: group 0 is the
/// positive operand set (OR / AND / shift-AND), group 1 is the
/// subtraction set of the fused AND-SUB. The aggregator owns a scratch
/// arena allocated once at construction and reused across operations;
/// it holds no other state between operations, so it can be
/// reconfigured and reused freely.
///
/// Sources are accessed read-only and the target exclusively - the
/// borrow checker enforces both, including that a target can never
/// alias a source. Operations are synchronous and single-threaded;
/// run independent aggregators for parallelism.
///
/// ```
/// use swath_core::{Aggregator, BitVector};
///
/// let mut a = BitVector::new();
/// let mut b = BitVector::new();
/// a.set(3);
/// a.set(70_000);
/// b.set(70_000);
///
/// let mut agg = Aggregator::new();
/// agg.add(&a).unwrap();
/// agg.add(&b).unwrap();
///
/// let mut res = BitVector::new();
/// agg.combine_and(&mut res);
/// assert_eq!(res.ones().collect::<Vec<_>>(), [70_000]);
/// ```
pub struct Aggregator<'a> {
    group0: alloc::vec::Vec<&'a BitVector>,
    group1: alloc::vec::Vec<&'a BitVector>,
    arena: Arena<'a>,
    pool: BlockPool,
}

impl Default for Aggregator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator with an empty configuration and a fully
    /// allocated scratch arena.
    pub fn new() -> Self {
        Self {
            group0: alloc::vec::Vec::with_capacity(MAX_CAP),
            group1: alloc::vec::Vec::with_capacity(MAX_CAP),
            arena: Arena::new(),
            pool: BlockPool::new(),
        }
    }

    /// Attaches a source to group 0 (the positive operand set).
    /// Returns the new group size.
    pub fn add(&mut self, bv: &'a BitVector) -> Result<usize, Error> {
        if self.group0.len() >= MAX_CAP {
            return Err(Error::CapacityExceeded);
        }
        self.group0.push(bv);
        Ok(self.group0.len())
    }

    /// Attaches a source to group 1 (the AND-SUB subtraction set).
    /// Returns the new group size.
    pub fn add_sub(&mut self, bv: &'a BitVector) -> Result<usize, Error> {
        if self.group1.len() >= MAX_CAP {
            return Err(Error::CapacityExceeded);
        }
        self.group1.push(bv);
        Ok(self.group1.len())
    }

    /// Forgets all attached sources; the arena is retained.
    pub fn reset(&mut self) {
        self.group0.clear();
        self.group1.clear();
    }

    /// OR of group 0 into `target`. An empty group clears the target.
    pub fn combine_or(&mut self, target: &mut BitVector) {
        or_many(target, &self.group0, &mut self.arena);
    }

    /// AND of group 0 into `target`. An empty group clears the target.
    pub fn combine_and(&mut self, target: &mut BitVector) {
        and_many(target, &self.group0, &mut self.arena);
    }

    /// Fused `AND(group 0) AND NOT OR(group 1)` into `target`.
    ///
    /// Returns `true` if anything was found. With `any`, stops after
    /// the first non-empty block is committed (the target then holds a
    /// partial result).
    pub fn combine_and_sub(&mut self, target: &mut BitVector, any: bool) -> bool {
        and_sub_many(target, &self.group0, &self.group1, &mut self.arena, any)
    }

    /// First bit index of `AND(group 0) AND NOT OR(group 1)`, without
    /// materializing a target.
    pub fn find_first_and_sub(&mut self) -> Option<u64> {
        find_first_many(&self.group0, &self.group1, &mut self.arena)
    }

    /// `(bv0 >> 1) & (bv1 >> 1) & …` over group 0 into `target`, with
    /// inter-block carry.
    ///
    /// Returns `true` iff the target has any set bit afterwards. With
    /// `any`, returns as soon as the first non-empty block is
    /// committed.
    pub fn combine_shift_right_and(&mut self, target: &mut BitVector, any: bool) -> bool {
        shift::shift_and_many(target, &self.group0, &mut self.arena, any)
    }

    /// In-place fused `target = (target >> 1) & mask`.
    ///
    /// Returns `true` iff the target has any set bit afterwards. The
    /// aggregator's block pool is lent to the target for the duration
    /// of the call to absorb the free/allocate churn of shifting
    /// content through the directory.
    pub fn shift_right_and(&mut self, target: &mut BitVector, mask: &BitVector) -> bool {
        let mut guard = PoolGuard::install(&mut self.pool, target);
        shift::shift_mask_in_place(guard.target(), mask)
    }

    // ------------------------------------------------------------------
    // Slice-based entry points (group configuration bypassed).
    // ------------------------------------------------------------------

    /// OR of `srcs` into `target`.
    pub fn combine_or_of(&mut self, target: &mut BitVector, srcs: &[&'a BitVector]) {
        or_many(target, srcs, &mut self.arena);
    }

    /// AND of `srcs` into `target`.
    pub fn combine_and_of(&mut self, target: &mut BitVector, srcs: &[&'a BitVector]) {
        and_many(target, srcs, &mut self.arena);
    }

    /// Fused AND-SUB of the two source slices into `target`.
    pub fn combine_and_sub_of(
        &mut self,
        target: &mut BitVector,
        and_srcs: &[&'a BitVector],
        sub_srcs: &[&'a BitVector],
        any: bool,
    ) -> bool {
        and_sub_many(target, and_srcs, sub_srcs, &mut self.arena, any)
    }

    /// First bit index of the fused AND-SUB of the two source slices.
    pub fn find_first_and_sub_of(
        &mut self,
        and_srcs: &[&'a BitVector],
        sub_srcs: &[&'a BitVector],
    ) -> Option<u64> {
        find_first_many(and_srcs, sub_srcs, &mut self.arena)
    }

    /// Multi-way shift-right-AND of `srcs` into `target`.
    pub fn combine_shift_right_and_of(
        &mut self,
        target: &mut BitVector,
        srcs: &[&'a BitVector],
        any: bool,
    ) -> bool {
        shift::shift_and_many(target, srcs, &mut self.arena, any)
    }
}

// ----------------------------------------------------------------------
// Drivers: walk the (i, j) grid and invoke sorter + reducer per block.
// ----------------------------------------------------------------------

fn or_many<'a>(target: &mut BitVector, srcs: &[&'a BitVector], ar: &mut Arena<'a>) {
    debug_assert!(srcs.len() <= MAX_CAP);
    if srcs.is_empty() {
        target.clear();
        return;
    }
    let top_blocks = resize_target(target, srcs, true);
    for i in 0..top_blocks {
        let j_max = effective_sub_range(i, srcs);
        for j in 0..j_max {
            reduce::or_block(target, srcs, i, j, ar);
        }
    }
}

fn and_many<'a>(target: &mut BitVector, srcs: &[&'a BitVector], ar: &mut Arena<'a>) {
    debug_assert!(srcs.len() <= MAX_CAP);
    if srcs.is_empty() {
        target.clear();
        return;
    }
    let top_blocks = resize_target(target, srcs, true);
    for i in 0..top_blocks {
        let j_max = effective_sub_range(i, srcs);
        for j in 0..j_max {
            reduce::and_block(target, srcs, i, j, ar);
        }
    }
}

fn and_sub_many<'a>(
    target: &mut BitVector,
    and_srcs: &[&'a BitVector],
    sub_srcs: &[&'a BitVector],
    ar: &mut Arena<'a>,
    any: bool,
) -> bool {
    debug_assert!(and_srcs.len() <= MAX_CAP && sub_srcs.len() <= MAX_CAP);
    if and_srcs.is_empty() {
        target.clear();
        return false;
    }
    let top_blocks = resize_target(target, and_srcs, true).max(resize_target(target, sub_srcs, false));

    let mut global_found = false;
    for i in 0..top_blocks {
        let mut j_max = effective_sub_range(i, and_srcs);
        if !sub_srcs.is_empty() {
            j_max = j_max.max(effective_sub_range(i, sub_srcs));
        }
        for j in 0..j_max {
            let digest = reduce::and_sub_block(and_srcs, sub_srcs, i, j, ar);
            if digest != 0 {
                target.store_block(i, j, &ar.scratch);
                if any {
                    return true;
                }
                global_found = true;
            }
        }
    }
    global_found
}

fn find_first_many<'a>(
    and_srcs: &[&'a BitVector],
    sub_srcs: &[&'a BitVector],
    ar: &mut Arena<'a>,
) -> Option<u64> {
    debug_assert!(and_srcs.len() <= MAX_CAP && sub_srcs.len() <= MAX_CAP);
    if and_srcs.is_empty() {
        return None;
    }
    let top_blocks = effective_top_blocks(and_srcs).max(effective_top_blocks(sub_srcs));

    for i in 0..top_blocks {
        let mut j_max = effective_sub_range(i, and_srcs);
        if !sub_srcs.is_empty() {
            j_max = j_max.max(effective_sub_range(i, sub_srcs));
        }
        for j in 0..j_max {
            let digest = reduce::and_sub_block(and_srcs, sub_srcs, i, j, ar);
            if digest != 0 {
                debug_assert!(!ops::is_all_zero(&ar.scratch));
                if let Some(bit) = ops::find_first(&ar.scratch) {
                    let base = (i * SUB_COUNT + j) as u64 * BLOCK_BITS as u64;
                    return Some(base + bit as u64);
                }
            }
        }
    }
    None
}

/// Maximum top-directory size across sources - the pure half of target
/// harmonization, usable without a target.
fn effective_top_blocks(srcs: &[&BitVector]) -> usize {
    srcs.iter().map(|bv| bv.top_size()).max().unwrap_or(0)
}

/// Harmonizes `target` with the sources: optionally clears it, grows
/// its top directory to the largest source's, and raises its bit
/// length to the longest source's. Returns the working top-block
/// count.
fn resize_target(target: &mut BitVector, srcs: &[&BitVector], init_clear: bool) -> usize {
    if init_clear {
        target.clear();
    }
    let mut top_blocks = target.top_size();
    let mut len = target.len();
    for &bv in srcs {
        if bv.top_size() > top_blocks {
            target.reserve_top(bv.top_size());
            top_blocks = bv.top_size();
        }
        if bv.len() > len {
            len = bv.len();
        }
    }
    target.resize(len);
    top_blocks
}

/// Effective sub-block range for row `i`: one past the highest
/// non-null slot across sources, so the drivers never probe the empty
/// tail of a row.
fn effective_sub_range(i: usize, srcs: &[&BitVector]) -> usize {
    let mut max_slot = 1;
    for &bv in srcs {
        if let Some(h) = bv.highest_slot(i) {
            if h > max_slot {
                max_slot = h;
            }
        }
    }
    debug_assert!(max_slot < SUB_COUNT);
    max_slot + 1
}
