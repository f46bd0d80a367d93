//! The two-level sparse bit-vector container.
//!
//! A [`BitVector`] partitions its address space into a top directory of
//! up to [`TOP_COUNT`] rows; each present row holds [`SUB_COUNT`]
//! slots; each slot is a [`BlockEntry`] - all-zeros, all-ones, a dense
//! block, or a GAP block. The aggregation engine consumes this
//! container through the narrow directory interface (`block`,
//! `store_block`, `set_ones_block`, `zero_block`, `deoptimize_block`,
//! `reserve_top`, `highest_slot`); everything else here is operand
//! construction and observation.

mod entry;
mod logic;
mod pool;

pub use entry::{BlockEntry, BlockKind, BlockRef};
pub use pool::{BlockPool, PoolGuard};

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::block::gap::{GapBlock, GAP_MAX_RUNS};
use crate::block::{ops, BitBlock, BLOCK_BITS};

/// Maximum number of top-directory rows.
pub const TOP_COUNT: usize = 1024;

/// Number of block slots per top-directory row.
pub const SUB_COUNT: usize = 1024;

/// Total addressable blocks (2^20).
pub const TOTAL_BLOCKS: usize = TOP_COUNT * SUB_COUNT;

/// Total addressable bits (2^36).
pub const MAX_BITS: u64 = (TOTAL_BLOCKS as u64) * (BLOCK_BITS as u64);

type SubDir = Box<[BlockEntry; SUB_COUNT]>;

fn new_subdir() -> SubDir {
    Box::new(core::array::from_fn(|_| BlockEntry::Zero))
}

/// Splits a bit index into (top row, sub slot, block-local bit).
#[inline]
pub fn split_index(idx: u64) -> (usize, usize, u32) {
    let nblock = (idx / BLOCK_BITS as u64) as usize;
    (
        nblock / SUB_COUNT,
        nblock % SUB_COUNT,
        (idx % BLOCK_BITS as u64) as u32,
    )
}

/// A sparse bit-vector over a 2^36-bit address space.
pub struct BitVector {
    top: Vec<Option<SubDir>>,
    len: u64,
    pool: BlockPool,
}

impl Default for BitVector {
    fn default() -> Self {
        Self::new()
    }
}

impl BitVector {
    /// Creates an empty vector of length 0.
    pub fn new() -> Self {
        Self {
            top: Vec::new(),
            len: 0,
            pool: BlockPool::new(),
        }
    }

    /// Logical bit length (one past the highest addressed bit).
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// `true` if the logical length is 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` iff any bit is set.
    pub fn any(&self) -> bool {
        self.top.iter().flatten().any(|sub| {
            sub.iter().any(|e| match e {
                BlockEntry::Zero => false,
                BlockEntry::Ones => true,
                BlockEntry::Bits(b) => !ops::is_all_zero(b),
                BlockEntry::Gap(g) => g.count_ones() != 0,
            })
        })
    }

    /// Total number of set bits.
    pub fn count_ones(&self) -> u64 {
        self.top
            .iter()
            .flatten()
            .flat_map(|sub| sub.iter())
            .map(|e| e.count_ones() as u64)
            .sum()
    }

    /// Tests bit `idx`. Bits at or beyond [`Self::len`] read as 0.
    pub fn get(&self, idx: u64) -> bool {
        if idx >= self.len {
            return false;
        }
        let (i, j, bit) = split_index(idx);
        self.block(i, j).test(bit)
    }

    /// Sets bit `idx`, extending the logical length to cover it.
    ///
    /// # Panics
    /// Panics if `idx >= MAX_BITS`.
    pub fn set(&mut self, idx: u64) {
        assert!(idx < MAX_BITS);
        if idx >= self.len {
            self.len = idx + 1;
        }
        let (i, j, bit) = split_index(idx);
        match self.block(i, j) {
            BlockRef::Ones => return,
            BlockRef::Gap(g) if g.test(bit) => return,
            _ => {}
        }
        self.deoptimize_block(i, j).set(bit);
    }

    /// Sets bits `from..=to`, extending the logical length.
    ///
    /// Fully covered blocks become all-ones sentinel slots without
    /// allocation.
    ///
    /// # Panics
    /// Panics if `from > to` or `to >= MAX_BITS`.
    pub fn set_range(&mut self, from: u64, to: u64) {
        assert!(from <= to && to < MAX_BITS);
        if to >= self.len {
            self.len = to + 1;
        }
        let first_nb = (from / BLOCK_BITS as u64) as usize;
        let last_nb = (to / BLOCK_BITS as u64) as usize;
        for nb in first_nb..=last_nb {
            let base = (nb as u64) * BLOCK_BITS as u64;
            let lo = from.max(base) - base;
            let hi = to.min(base + BLOCK_BITS as u64 - 1) - base;
            let (i, j) = (nb / SUB_COUNT, nb % SUB_COUNT);
            if lo == 0 && hi == BLOCK_BITS as u64 - 1 {
                self.set_ones_block(i, j);
            } else if self.block_kind(i, j) != BlockKind::Ones {
                let blk = self.deoptimize_block(i, j);
                ops::set_bit_range(blk, lo as u32, hi as u32);
            }
        }
    }

    /// Drops all blocks; length is unchanged.
    pub fn clear(&mut self) {
        for row in self.top.iter_mut() {
            *row = None;
        }
    }

    /// Changes the logical length. Shrinking clears bits at or beyond
    /// the new length.
    pub fn resize(&mut self, new_len: u64) {
        debug_assert!(new_len <= MAX_BITS);
        if new_len >= self.len {
            self.len = new_len;
            return;
        }
        self.len = new_len;
        let boundary_nb = (new_len / BLOCK_BITS as u64) as usize;
        let keep = (new_len % BLOCK_BITS as u64) as u32;
        for i in 0..self.top.len() {
            if self.top[i].is_none() {
                continue;
            }
            for j in 0..SUB_COUNT {
                let nb = i * SUB_COUNT + j;
                if nb < boundary_nb {
                    continue;
                }
                if nb > boundary_nb || keep == 0 {
                    self.zero_block(i, j);
                } else if self.block_kind(i, j) != BlockKind::Zero {
                    let blk = self.deoptimize_block(i, j);
                    ops::clear_bit_range(blk, keep, BLOCK_BITS - 1);
                }
            }
        }
    }

    /// Compresses block storage: dense blocks become all-zeros,
    /// all-ones, or GAP slots where the content allows it.
    pub fn optimize(&mut self) {
        let BitVector { top, pool, .. } = self;
        for sub in top.iter_mut().flatten() {
            for slot in sub.iter_mut() {
                if let BlockEntry::Bits(b) = slot {
                    let replacement = if ops::is_all_zero(b) {
                        Some(BlockEntry::Zero)
                    } else if ops::is_all_ones(b) {
                        Some(BlockEntry::Ones)
                    } else {
                        GapBlock::from_bits(b, GAP_MAX_RUNS).map(BlockEntry::Gap)
                    };
                    if let Some(new_entry) = replacement {
                        let old = core::mem::replace(slot, new_entry);
                        if let BlockEntry::Bits(b) = old {
                            pool.recycle(b);
                        }
                    }
                }
            }
        }
    }

    /// Iterator over the positions of set bits, in ascending order.
    pub fn ones(&self) -> Ones<'_> {
        Ones {
            bv: self,
            next_block: 0,
            cur: BlockCursor::Drained,
        }
    }

    // ------------------------------------------------------------------
    // Directory interface consumed by the aggregation engine.
    // ------------------------------------------------------------------

    /// Number of allocated top-directory rows.
    #[inline]
    pub fn top_size(&self) -> usize {
        self.top.len()
    }

    /// Grows the top directory to at least `n` rows.
    ///
    /// # Panics
    /// Panics if `n > TOP_COUNT`.
    pub fn reserve_top(&mut self, n: usize) {
        assert!(n <= TOP_COUNT);
        if n > self.top.len() {
            self.top.resize_with(n, || None);
        }
    }

    /// Borrowed view of the block at (i, j); absent rows and slots read
    /// as all-zeros.
    #[inline]
    pub fn block(&self, i: usize, j: usize) -> BlockRef<'_> {
        match self.top.get(i) {
            Some(Some(sub)) => sub[j].as_ref(),
            _ => BlockRef::Zero,
        }
    }

    /// Discriminant of the block at (i, j).
    #[inline]
    pub fn block_kind(&self, i: usize, j: usize) -> BlockKind {
        match self.top.get(i) {
            Some(Some(sub)) => sub[j].kind(),
            _ => BlockKind::Zero,
        }
    }

    /// `true` if row `i` is present in the top directory.
    #[inline]
    pub fn has_row(&self, i: usize) -> bool {
        matches!(self.top.get(i), Some(Some(_)))
    }

    /// Highest slot index in row `i` holding a non-zero entry, or
    /// `None` if the row is absent or entirely zero.
    pub fn highest_slot(&self, i: usize) -> Option<usize> {
        let sub = self.top.get(i)?.as_ref()?;
        (0..SUB_COUNT)
            .rev()
            .find(|&j| !matches!(sub[j], BlockEntry::Zero))
    }

    /// Makes (i, j) an all-ones sentinel slot.
    pub fn set_ones_block(&mut self, i: usize, j: usize) {
        self.reserve_top(i + 1);
        let BitVector { top, pool, .. } = self;
        let slot = &mut top[i].get_or_insert_with(new_subdir)[j];
        if let BlockEntry::Bits(b) = core::mem::replace(slot, BlockEntry::Ones) {
            pool.recycle(b);
        }
    }

    /// Copies `src` into a dense block at (i, j), replacing whatever
    /// was there.
    pub fn store_block(&mut self, i: usize, j: usize, src: &BitBlock) {
        self.reserve_top(i + 1);
        let BitVector { top, pool, .. } = self;
        let slot = &mut top[i].get_or_insert_with(new_subdir)[j];
        match slot {
            BlockEntry::Bits(b) => ops::copy_block(b, src),
            _ => {
                let mut b = pool.alloc_raw();
                ops::copy_block(&mut b, src);
                *slot = BlockEntry::Bits(b);
            }
        }
    }

    /// Makes (i, j) an all-zeros slot, recycling a dense block if one
    /// was allocated there.
    pub fn zero_block(&mut self, i: usize, j: usize) {
        let BitVector { top, pool, .. } = self;
        if let Some(Some(sub)) = top.get_mut(i) {
            let slot = &mut sub[j];
            if let BlockEntry::Bits(b) = core::mem::replace(slot, BlockEntry::Zero) {
                pool.recycle(b);
            }
        }
    }

    /// Materializes (i, j) as a dense block and returns it mutably:
    /// zeros and ones are expanded, GAP blocks are decompressed,
    /// existing dense blocks are returned as-is.
    pub fn deoptimize_block(&mut self, i: usize, j: usize) -> &mut BitBlock {
        self.reserve_top(i + 1);
        let BitVector { top, pool, .. } = self;
        let slot = &mut top[i].get_or_insert_with(new_subdir)[j];
        match slot {
            BlockEntry::Bits(_) => {}
            BlockEntry::Zero => *slot = BlockEntry::Bits(pool.alloc_zeroed()),
            BlockEntry::Ones => {
                let mut b = pool.alloc_raw();
                ops::fill_block(&mut b, true);
                *slot = BlockEntry::Bits(b);
            }
            BlockEntry::Gap(_) => {
                let old = core::mem::replace(slot, BlockEntry::Zero);
                let BlockEntry::Gap(g) = old else {
                    unreachable!()
                };
                let mut b = pool.alloc_zeroed();
                g.or_into(&mut b);
                *slot = BlockEntry::Bits(b);
            }
        }
        match slot {
            BlockEntry::Bits(b) => b,
            _ => unreachable!(),
        }
    }
}

impl Clone for BitVector {
    fn clone(&self) -> Self {
        Self {
            top: self.top.clone(),
            len: self.len,
            pool: BlockPool::new(),
        }
    }
}

impl PartialEq for BitVector {
    /// Logical bit-content equality; storage forms (zero / ones / GAP /
    /// dense) and directory sizes are normalized away.
    fn eq(&self, other: &Self) -> bool {
        let tops = self.top.len().max(other.top.len());
        let mut ta = Box::new(BitBlock::ZERO);
        let mut tb = Box::new(BitBlock::ZERO);
        for i in 0..tops {
            if !self.has_row(i) && !other.has_row(i) {
                continue;
            }
            for j in 0..SUB_COUNT {
                let a = self.block(i, j);
                let b = other.block(i, j);
                match (a.kind(), b.kind()) {
                    (BlockKind::Zero, BlockKind::Zero) | (BlockKind::Ones, BlockKind::Ones) => {
                        continue
                    }
                    _ => {}
                }
                a.expand_into(&mut ta);
                b.expand_into(&mut tb);
                if ta.words != tb.words {
                    return false;
                }
            }
        }
        true
    }
}

impl Eq for BitVector {}

impl core::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .field("top_size", &self.top.len())
            .field("count_ones", &self.count_ones())
            .finish()
    }
}

/// Iterator over set-bit positions; see [`BitVector::ones`].
pub struct Ones<'a> {
    bv: &'a BitVector,
    next_block: usize,
    cur: BlockCursor<'a>,
}

enum BlockCursor<'a> {
    Drained,
    Bits {
        blk: &'a BitBlock,
        base: u64,
        k: usize,
        w: u64,
    },
    Span {
        next: u64,
        end: u64,
    },
    Gap {
        base: u64,
        runs: crate::block::gap::GapRuns<'a>,
        span: Option<(u64, u64)>,
    },
}

impl<'a> Ones<'a> {
    /// Advances `next_block` to the next non-zero slot and loads a
    /// cursor for it; `false` when the directory is exhausted.
    fn load_next_block(&mut self) -> bool {
        loop {
            let i = self.next_block / SUB_COUNT;
            if i >= self.bv.top.len() {
                return false;
            }
            if !self.bv.has_row(i) {
                self.next_block = (i + 1) * SUB_COUNT;
                continue;
            }
            let j = self.next_block % SUB_COUNT;
            let base = (self.next_block as u64) * BLOCK_BITS as u64;
            self.next_block += 1;
            match self.bv.block(i, j) {
                BlockRef::Zero => continue,
                BlockRef::Ones => {
                    self.cur = BlockCursor::Span {
                        next: base,
                        end: base + BLOCK_BITS as u64 - 1,
                    };
                    return true;
                }
                BlockRef::Bits(blk) => {
                    self.cur = BlockCursor::Bits {
                        blk,
                        base,
                        k: 0,
                        w: blk.words[0],
                    };
                    return true;
                }
                BlockRef::Gap(g) => {
                    self.cur = BlockCursor::Gap {
                        base,
                        runs: g.runs(),
                        span: None,
                    };
                    return true;
                }
            }
        }
    }
}

impl Iterator for Ones<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            match &mut self.cur {
                BlockCursor::Drained => {
                    if !self.load_next_block() {
                        return None;
                    }
                }
                BlockCursor::Bits { blk, base, k, w } => {
                    while *w == 0 {
                        *k += 1;
                        if *k >= blk.words.len() {
                            break;
                        }
                        *w = blk.words[*k];
                    }
                    if *w == 0 {
                        self.cur = BlockCursor::Drained;
                        continue;
                    }
                    let b = w.trailing_zeros() as u64;
                    *w &= *w - 1;
                    return Some(*base + (*k as u64) * 64 + b);
                }
                BlockCursor::Span { next, end } => {
                    if next <= end {
                        let v = *next;
                        *next += 1;
                        return Some(v);
                    }
                    self.cur = BlockCursor::Drained;
                }
                BlockCursor::Gap { base, runs, span } => {
                    if let Some((next, end)) = span {
                        if next <= end {
                            let v = *next;
                            *next += 1;
                            return Some(v);
                        }
                        *span = None;
                    }
                    match runs.next() {
                        Some((s, e, true)) => {
                            *span = Some((*base + s as u64, *base + e as u64));
                        }
                        Some((_, _, false)) => {}
                        None => self.cur = BlockCursor::Drained,
                    }
                }
            }
        }
    }
}
