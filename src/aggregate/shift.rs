//! Shift-AND drivers.
//!
//! Two variants share the shift kernels: the multi-way sweep that
//! evaluates `(bv0 >> 1) & (bv1 >> 1) & …` into a target through the
//! scratch block, carrying one bit per source across block boundaries,
//! and the in-place form that shifts a target vector and ANDs it with
//! a single mask vector, de-optimizing compressed target blocks lazily.

use crate::block::{ops, shift, BitBlock, BLOCK_BITS, BLOCK_WORDS};
use crate::vector::{BitVector, BlockKind, BlockRef, MAX_BITS, SUB_COUNT, TOP_COUNT, TOTAL_BLOCKS};

use super::arena::Arena;
use super::{resize_target, MAX_CAP};

/// Multi-way shift-right-AND sweep over `srcs` into `target`.
///
/// Returns `true` iff the target has any set bit afterwards; with
/// `any`, returns as soon as the first non-empty block is committed.
pub(crate) fn shift_and_many<'a>(
    target: &mut BitVector,
    srcs: &[&'a BitVector],
    ar: &mut Arena<'a>,
    any: bool,
) -> bool {
    debug_assert!(srcs.len() <= MAX_CAP);
    if srcs.is_empty() {
        target.clear();
        return false;
    }
    let top_blocks = resize_target(target, srcs, true);

    ar.carry_overs[..srcs.len()].fill(0);

    for i in 0..TOP_COUNT {
        if i > top_blocks && !any_carry(&ar.carry_overs[..srcs.len()]) {
            break; // nothing left to carry forward
        }
        for j in 0..SUB_COUNT {
            let found = shift_and_block(target, srcs, i, j, ar);
            if found && any {
                return true;
            }
        }
    }
    target.any()
}

/// One (i, j) step of the multi-way sweep. Returns `true` iff a
/// non-empty block was committed.
fn shift_and_block<'a>(
    target: &mut BitVector,
    srcs: &[&'a BitVector],
    i: usize,
    j: usize,
    ar: &mut Arena<'a>,
) -> bool {
    let Arena {
        scratch, carry_overs, ..
    } = ar;
    let blk: &mut BitBlock = scratch;

    // source 0 is copied in, not shifted
    let mut acc = true;
    match srcs[0].block(i, j) {
        BlockRef::Bits(b) => ops::copy_block(blk, b),
        BlockRef::Ones => ops::fill_block(blk, true),
        BlockRef::Gap(g) => {
            ops::fill_block(blk, false);
            g.or_into(blk);
        }
        BlockRef::Zero => {
            ops::fill_block(blk, false);
            acc = false;
        }
    }
    carry_overs[0] = 0;

    for (k, &bv) in srcs.iter().enumerate().skip(1) {
        let co = carry_overs[k] as u64;
        if !acc && co == 0 {
            continue; // a zero block shifts to zero
        }
        let co_out;
        match bv.block(i, j) {
            BlockRef::Bits(b) => {
                let (c, a) = shift::shift_r1_and(blk, b, co);
                co_out = c;
                acc = a;
            }
            BlockRef::Ones => {
                // AND is a no-op, shift only
                let (c, a) = shift::shift_r1(blk, co);
                co_out = c;
                acc = a;
            }
            BlockRef::Gap(g) => {
                let (c, a) = shift::shift_r1(blk, co);
                co_out = c;
                if a {
                    g.and_into(blk);
                    acc = !ops::is_all_zero(blk);
                } else {
                    acc = false;
                }
            }
            BlockRef::Zero => {
                // result is zero; the carry out is still produced by
                // the (skipped) shift
                co_out = blk.words[BLOCK_WORDS - 1] >> 63;
                if acc {
                    ops::fill_block(blk, false);
                }
                acc = false;
            }
        }
        carry_overs[k] = co_out as u8;
    }

    if !acc {
        return false;
    }
    if i * SUB_COUNT + j == TOTAL_BLOCKS - 1 {
        // the top addressable bit would shift out of range
        blk.clear(BLOCK_BITS - 1);
        if ops::is_all_zero(blk) {
            return false;
        }
    }
    target.store_block(i, j, blk);
    true
}

/// In-place `target = (target >> 1) & mask`.
///
/// Returns `true` iff the target has any set bit afterwards.
pub(crate) fn shift_mask_in_place(target: &mut BitVector, mask: &BitVector) -> bool {
    if mask.top_size() == 0 {
        // mask is empty: everything ANDs to zero
        target.clear();
        return false;
    }
    if target.top_size() == 0 {
        return false;
    }
    if target.len() < MAX_BITS {
        let new_len = target.len() + 1;
        target.resize(new_len);
    }

    let mut carry: u64 = 0;
    let mut any = false;

    for i in 0..TOP_COUNT {
        if i >= target.top_size() && carry == 0 {
            break;
        }
        if !target.has_row(i) {
            // a whole missing row shifts to zero; the pending carry can
            // only land on bit 0 of the row's first block
            if carry != 0 {
                if mask.block(i, 0).test(0) {
                    let blk = target.deoptimize_block(i, 0);
                    blk.words[0] |= 1;
                    any = true;
                }
                carry = 0;
            }
            continue;
        }

        let mut j = 0;
        while j < SUB_COUNT {
            let kind = target.block_kind(i, j);

            if kind == BlockKind::Zero {
                if carry != 0 {
                    if mask.block(i, j).test(0) {
                        let blk = target.deoptimize_block(i, j);
                        blk.words[0] |= 1;
                        any = true;
                    }
                    carry = 0;
                }
                // no carry pending: skip to the row's next present block
                j += 1;
                while j < SUB_COUNT && target.block_kind(i, j) == BlockKind::Zero {
                    j += 1;
                }
                continue;
            }

            // predicted outcomes that avoid de-optimization
            if kind == BlockKind::Ones {
                match mask.block_kind(i, j) {
                    BlockKind::Ones if carry != 0 => {
                        // 1 shifted into all-ones under an all-ones
                        // mask: still all-ones, carry out 1
                        any = true;
                        j += 1;
                        continue;
                    }
                    _ => {}
                }
            }
            if mask.block_kind(i, j) == BlockKind::Zero {
                // result is zero; carry out is the target's top bit
                carry = match target.block(i, j) {
                    BlockRef::Ones => 1,
                    BlockRef::Bits(b) => b.words[BLOCK_WORDS - 1] >> 63,
                    BlockRef::Gap(g) => g.test(BLOCK_BITS - 1) as u64,
                    BlockRef::Zero => 0,
                };
                target.zero_block(i, j);
                j += 1;
                continue;
            }

            // de-optimize lazily; Ones/Gap targets materialize here
            let blk = target.deoptimize_block(i, j);
            let mut acc;
            match mask.block(i, j) {
                BlockRef::Bits(m) => {
                    let (c, a) = shift::shift_r1_and(blk, m, carry);
                    carry = c;
                    acc = a;
                }
                BlockRef::Ones => {
                    let (c, a) = shift::shift_r1(blk, carry);
                    carry = c;
                    acc = a;
                }
                BlockRef::Gap(g) => {
                    let (c, a) = shift::shift_r1(blk, carry);
                    carry = c;
                    if a {
                        g.and_into(blk);
                        acc = !ops::is_all_zero(blk);
                    } else {
                        acc = false;
                    }
                }
                BlockRef::Zero => unreachable!(), // handled above
            }
            if i * SUB_COUNT + j == TOTAL_BLOCKS - 1 {
                blk.clear(BLOCK_BITS - 1);
                if acc {
                    acc = !ops::is_all_zero(blk);
                }
            }
            if acc {
                any = true;
            } else {
                target.zero_block(i, j); // release the emptied block
            }
            j += 1;
        }
    }
    any
}

fn any_carry(carry_overs: &[u8]) -> bool {
    carry_overs.iter().any(|&c| c != 0)
}
