//! Recycling pool for dense blocks, and the scoped guard that lends an
//! aggregator's pool to a target vector.
//!
//! `shift_right_and` repeatedly frees and reallocates 8 KiB blocks as
//! content shifts through the directory; routing those through a free
//! list instead of the global allocator removes the churn without
//! changing semantics.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::block::{ops, BitBlock};

use super::BitVector;

/// Free list of dense blocks.
#[derive(Default)]
pub struct BlockPool {
    free: Vec<Box<BitBlock>>,
}

impl BlockPool {
    /// Creates an empty pool.
    pub const fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Number of blocks currently pooled.
    #[inline]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// `true` if the pool holds no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Hands out a zeroed block, recycling one if available.
    pub(crate) fn alloc_zeroed(&mut self) -> Box<BitBlock> {
        match self.free.pop() {
            Some(mut b) => {
                ops::fill_block(&mut b, false);
                b
            }
            None => Box::new(BitBlock::ZERO),
        }
    }

    /// Hands out a block whose content the caller will fully overwrite.
    pub(crate) fn alloc_raw(&mut self) -> Box<BitBlock> {
        self.free.pop().unwrap_or_else(|| Box::new(BitBlock::ZERO))
    }

    /// Returns a block to the free list.
    pub(crate) fn recycle(&mut self, blk: Box<BitBlock>) {
        self.free.push(blk);
    }
}

/// Scoped pool loan: installs `home` on `bv` for the guard's lifetime
/// and restores the previous pool on drop - on every exit path,
/// including panics.
pub struct PoolGuard<'a> {
    home: &'a mut BlockPool,
    bv: &'a mut BitVector,
}

impl<'a> PoolGuard<'a> {
    /// Swaps `home` in as `bv`'s block pool.
    pub fn install(home: &'a mut BlockPool, bv: &'a mut BitVector) -> Self {
        core::mem::swap(home, &mut bv.pool);
        Self { home, bv }
    }

    /// The guarded target vector.
    #[inline]
    pub fn target(&mut self) -> &mut BitVector {
        self.bv
    }
}

impl Drop for PoolGuard<'_> {
    fn drop(&mut self) {
        core::mem::swap(self.home, &mut self.bv.pool);
    }
}
