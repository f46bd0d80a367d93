//! Per-block reducers: fold the sorted bucket lists into the scratch
//! block and commit the outcome for one (i, j) coordinate.
//!
//! OR folds run through the batched 5-way/3-way/2-way kernels and bail
//! out the moment the scratch block saturates. AND and SUB folds carry
//! a digest and bail out the moment it dies. Golden outcomes commit a
//! sentinel (or nothing) without materializing a block.

use crate::block::{ops, Digest, FULL_BLOCK};
use crate::vector::BitVector;

use super::arena::Arena;
use super::sort::{self, AndSorted, OrSorted};

/// OR-reduces all sources at (i, j) into the target.
pub(crate) fn or_block<'a>(
    target: &mut BitVector,
    srcs: &[&'a BitVector],
    i: usize,
    j: usize,
    ar: &mut Arena<'a>,
) {
    match sort::sort_or(srcs, i, j, ar) {
        OrSorted::AllOnes => target.set_ones_block(i, j), // golden block
        OrSorted::Args => {
            if ar.bit_args.is_empty() && ar.gap_args.is_empty() {
                return; // all sources zero here
            }
            let mut all_one = fold_or_bits(ar);
            if !all_one && !ar.gap_args.is_empty() {
                all_one = fold_or_gaps(ar);
            }
            if all_one {
                target.set_ones_block(i, j);
            } else {
                target.store_block(i, j, &ar.scratch);
            }
        }
    }
}

/// AND-reduces all sources at (i, j) into the target.
pub(crate) fn and_block<'a>(
    target: &mut BitVector,
    srcs: &[&'a BitVector],
    i: usize,
    j: usize,
    ar: &mut Arena<'a>,
) {
    debug_assert!(!srcs.is_empty());
    match sort::sort_and(srcs, i, j, ar) {
        AndSorted::AllZero => {} // golden block: target stays unset
        AndSorted::Args => {
            let mut digest = fold_and_bits(ar);
            if digest == 0 {
                return;
            }
            if !ar.gap_args.is_empty() {
                digest = fold_and_gaps(ar, digest);
            }
            if digest != 0 {
                target.store_block(i, j, &ar.scratch);
            }
        }
    }
}

/// Fused AND-SUB reduction at (i, j): AND over `and_srcs`, then SUB of
/// `sub_srcs`, all in the scratch block. Returns the final digest; the
/// caller commits `scratch` iff it is non-zero.
pub(crate) fn and_sub_block<'a>(
    and_srcs: &[&'a BitVector],
    sub_srcs: &[&'a BitVector],
    i: usize,
    j: usize,
    ar: &mut Arena<'a>,
) -> Digest {
    debug_assert!(!and_srcs.is_empty());
    match sort::sort_and(and_srcs, i, j, ar) {
        AndSorted::AllZero => return 0,
        AndSorted::Args => {}
    }
    let mut digest = fold_and_bits(ar);
    if digest == 0 {
        return 0;
    }
    if !ar.gap_args.is_empty() {
        digest = fold_and_gaps(ar, digest);
        if digest == 0 {
            return 0;
        }
    }
    if !sub_srcs.is_empty() {
        match sort::sort_or(sub_srcs, i, j, ar) {
            OrSorted::AllOnes => return 0, // everything subtracted
            OrSorted::Args => {}
        }
        digest = fold_sub_bits(ar, digest);
        if digest == 0 {
            return 0;
        }
        if !ar.gap_args.is_empty() {
            digest = fold_sub_gaps(ar, digest);
        }
    }
    digest
}

/// OR-folds the dense bucket list into `scratch` through the batched
/// kernels. Returns `true` the moment the result saturates.
fn fold_or_bits(ar: &mut Arena<'_>) -> bool {
    let Arena { scratch, bit_args, .. } = ar;
    let blk = &mut **scratch;
    let args = &bit_args[..];
    let len = args.len();

    let mut k = 0;
    if len > 0 {
        ops::copy_block(blk, args[0]);
        k = 1;
    } else {
        ops::fill_block(blk, false);
    }

    // batch 4 sources per 5-way call, then 2 per 3-way, then singles
    let rem = len - k;
    let stop = k + (rem - rem % 4);
    while k < stop {
        if ops::or_5way(blk, args[k], args[k + 1], args[k + 2], args[k + 3]) {
            return true;
        }
        k += 4;
    }
    let rem = len - k;
    let stop = k + (rem - rem % 2);
    while k < stop {
        if ops::or_3way(blk, args[k], args[k + 1]) {
            return true;
        }
        k += 2;
    }
    while k < len {
        if ops::or_into(blk, args[k]) {
            return true;
        }
        k += 1;
    }
    false
}

/// OR-folds the GAP bucket list into `scratch`; returns `true` if the
/// block saturated.
fn fold_or_gaps(ar: &mut Arena<'_>) -> bool {
    let Arena { scratch, gap_args, .. } = ar;
    for g in gap_args.iter() {
        g.or_into(scratch);
    }
    ops::is_all_ones(scratch)
}

/// AND-folds the dense bucket list into `scratch`, maintaining the digest.
fn fold_and_bits(ar: &mut Arena<'_>) -> Digest {
    let Arena { scratch, bit_args, .. } = ar;
    let blk = &mut **scratch;
    let args = &bit_args[..];

    let mut digest = match args.len() {
        0 => {
            ops::fill_block(blk, true);
            return crate::block::DIGEST_FULL;
        }
        1 => {
            ops::copy_block(blk, args[0]);
            return ops::digest_of(blk);
        }
        _ => ops::and_2way(blk, args[0], args[1], crate::block::DIGEST_FULL),
    };
    for &a in &args[2..] {
        if core::ptr::eq(a, &FULL_BLOCK) {
            continue; // AND with all-ones is a no-op
        }
        digest = ops::and_digest(blk, a, digest);
        if digest == 0 {
            break;
        }
    }
    digest
}

/// AND-folds the GAP bucket list into `scratch`, updating the digest after
/// each expansion.
fn fold_and_gaps(ar: &mut Arena<'_>, mut digest: Digest) -> Digest {
    debug_assert!(digest != 0);
    let Arena { scratch, gap_args, .. } = ar;
    for g in gap_args.iter() {
        g.and_into(scratch);
        digest = ops::digest_update(scratch, digest);
        if digest == 0 {
            debug_assert!(ops::is_all_zero(scratch));
            break;
        }
    }
    digest
}

/// SUB-folds the dense bucket list out of `scratch`, maintaining the
/// digest.
fn fold_sub_bits(ar: &mut Arena<'_>, mut digest: Digest) -> Digest {
    let Arena { scratch, bit_args, .. } = ar;
    let blk = &mut **scratch;
    for &a in bit_args.iter() {
        if core::ptr::eq(a, &FULL_BLOCK) {
            digest = 0; // a saturated subtrahend clears everything
            break;
        }
        digest = ops::sub_digest(blk, a, digest);
        if digest == 0 {
            break;
        }
    }
    digest
}

/// SUB-folds the GAP bucket list out of `scratch`, updating the digest
/// after each expansion.
fn fold_sub_gaps(ar: &mut Arena<'_>, mut digest: Digest) -> Digest {
    debug_assert!(digest != 0);
    let Arena { scratch, gap_args, .. } = ar;
    for g in gap_args.iter() {
        g.sub_into(scratch);
        digest = ops::digest_update(scratch, digest);
        if digest == 0 {
            debug_assert!(ops::is_all_zero(scratch));
            break;
        }
    }
    digest
}
