//! Block sorter: classifies every source's block at one (i, j)
//! coordinate into the arena's dense and GAP bucket lists, or
//! short-circuits on a golden outcome.

use crate::block::FULL_BLOCK;
use crate::vector::{BitVector, BlockRef};

use super::arena::Arena;

/// Outcome of an OR-directed sort.
pub(crate) enum OrSorted {
    /// Some source block is all-ones: the output at this (i, j) is
    /// all-ones regardless of the remaining sources.
    AllOnes,
    /// Bucket lists populated (possibly empty - then the output is
    /// all-zeros).
    Args,
}

/// Outcome of an AND-directed sort.
pub(crate) enum AndSorted {
    /// Some source block is all-zeros: the output at this (i, j) is
    /// all-zeros regardless of the remaining sources.
    AllZero,
    /// Bucket lists populated; uniform all-ones sources appear in the
    /// dense list as the canonical [`FULL_BLOCK`].
    Args,
}

pub(crate) fn sort_or<'a>(
    srcs: &[&'a BitVector],
    i: usize,
    j: usize,
    ar: &mut Arena<'a>,
) -> OrSorted {
    ar.bit_args.clear();
    ar.gap_args.clear();
    for &bv in srcs {
        match bv.block(i, j) {
            BlockRef::Zero => {}
            BlockRef::Gap(g) => ar.gap_args.push(g),
            BlockRef::Bits(b) => ar.bit_args.push(b),
            BlockRef::Ones => {
                ar.bit_args.clear();
                ar.gap_args.clear();
                return OrSorted::AllOnes;
            }
        }
    }
    OrSorted::Args
}

pub(crate) fn sort_and<'a>(
    srcs: &[&'a BitVector],
    i: usize,
    j: usize,
    ar: &mut Arena<'a>,
) -> AndSorted {
    ar.bit_args.clear();
    ar.gap_args.clear();
    for &bv in srcs {
        match bv.block(i, j) {
            BlockRef::Zero => {
                ar.bit_args.clear();
                ar.gap_args.clear();
                return AndSorted::AllZero;
            }
            BlockRef::Gap(g) => ar.gap_args.push(g),
            BlockRef::Bits(b) => ar.bit_args.push(b),
            // canonicalize so the fold kernels can dereference
            BlockRef::Ones => ar.bit_args.push(&FULL_BLOCK),
        }
    }
    AndSorted::Args
}
