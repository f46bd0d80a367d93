//! Horizontal (naive pairwise) reference reductions.
//!
//! These fold one source at a time with the container's pairwise
//! operators - the slow path the multi-way engine is measured and
//! verified against. Kept public: equivalence tests and benches both
//! compare against them.

use crate::vector::BitVector;

/// Pairwise OR of `srcs` into `target`.
pub fn or_horizontal(target: &mut BitVector, srcs: &[&BitVector]) {
    if srcs.is_empty() {
        target.clear();
        return;
    }
    *target = srcs[0].clone();
    for &bv in &srcs[1..] {
        *target |= bv;
    }
}

/// Pairwise AND of `srcs` into `target`.
pub fn and_horizontal(target: &mut BitVector, srcs: &[&BitVector]) {
    if srcs.is_empty() {
        target.clear();
        return;
    }
    *target = srcs[0].clone();
    for &bv in &srcs[1..] {
        *target &= bv;
    }
}

/// Pairwise AND of `and_srcs` minus pairwise OR of `sub_srcs`, into
/// `target`.
pub fn and_sub_horizontal(target: &mut BitVector, and_srcs: &[&BitVector], sub_srcs: &[&BitVector]) {
    and_horizontal(target, and_srcs);
    for &bv in sub_srcs {
        *target -= bv;
    }
}
