//! Property-based tests for the shift-AND drivers.
//!
//! Verified invariants:
//! - In-place shift-AND equals the positional model:
//!   `target'[b] = target[b-1] ∧ mask[b]`, with bit −1 reading 0
//! - The multi-way sweep equals chaining the in-place form over the
//!   source list (the staircase semantics of the fused operator)
//! - Carries cross block boundaries; annihilated blocks leak nothing

use std::collections::BTreeSet;

use proptest::prelude::*;
use swath_core::{Aggregator, BitVector};

use crate::common::{bv_from, model};

/// Bits across a few blocks, weighted toward block edges so carries
/// actually happen.
fn bits() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(
        prop_oneof![
            (0u64..4, 0u64..65_536).prop_map(|(blk, off)| blk * 65_536 + off),
            (0u64..4).prop_map(|blk| blk * 65_536 + 65_535),
            (1u64..4).prop_map(|blk| blk * 65_536),
        ],
        0..50,
    )
}

fn optimized(bits: &[u64], opt: bool) -> BitVector {
    let mut bv = bv_from(bits);
    if opt {
        bv.optimize();
    }
    bv
}

proptest! {
    #[test]
    fn prop_in_place_matches_positional_model(
        target_bits in bits(),
        mask_bits in bits(),
        opt_t in any::<bool>(),
        opt_m in any::<bool>(),
    ) {
        let mut target = optimized(&target_bits, opt_t);
        let mask = optimized(&mask_bits, opt_m);

        let mut agg = Aggregator::new();
        let found = agg.shift_right_and(&mut target, &mask);

        let mask_set: BTreeSet<u64> = mask_bits.iter().copied().collect();
        let expect: BTreeSet<u64> = target_bits
            .iter()
            .map(|&b| b + 1)
            .filter(|b| mask_set.contains(b))
            .collect();

        prop_assert_eq!(model(&target), expect.clone());
        prop_assert_eq!(found, !expect.is_empty());
    }

    #[test]
    fn prop_multi_way_equals_chained_in_place(
        ops in prop::collection::vec((bits(), any::<bool>()), 1..5),
    ) {
        let vectors: Vec<BitVector> =
            ops.iter().map(|(b, opt)| optimized(b, *opt)).collect();
        let refs: Vec<&BitVector> = vectors.iter().collect();

        let mut agg = Aggregator::new();
        let mut fast = BitVector::new();
        let found = agg.combine_shift_right_and_of(&mut fast, &refs, false);

        // reference: start from source 0, then repeatedly
        // shift-and-mask with each following source
        let mut reference = refs[0].clone();
        for &mask in &refs[1..] {
            agg.shift_right_and(&mut reference, mask);
        }
        // a single operand passes through unshifted on both paths
        prop_assert!(fast == reference, "multi-way diverged from chained in-place");
        prop_assert_eq!(found, reference.any());
    }

    #[test]
    fn prop_two_way_positional_product(a_bits in bits(), m_bits in bits()) {
        // for two operands the staircase collapses to
        // result[b] = v0[b-1] ∧ v1[b]
        let v0 = bv_from(&a_bits);
        let v1 = bv_from(&m_bits);

        let mut agg = Aggregator::new();
        agg.add(&v0).unwrap();
        agg.add(&v1).unwrap();
        let mut res = BitVector::new();
        agg.combine_shift_right_and(&mut res, false);

        let m_set: BTreeSet<u64> = m_bits.iter().copied().collect();
        let expect: BTreeSet<u64> = a_bits
            .iter()
            .map(|&b| b + 1)
            .filter(|b| m_set.contains(b))
            .collect();
        prop_assert_eq!(model(&res), expect);
    }
}
