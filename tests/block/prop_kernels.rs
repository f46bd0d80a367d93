//! Property-based tests for the block kernels.
//!
//! Verified invariants:
//! - Digest monotonicity: AND/SUB/update kernels never set digest bits
//! - Digest correctness: a clear digest bit means an all-zero slice
//! - Batched OR folds equal sequential ORs
//! - Fused shift-AND equals shift followed by AND, carries included
//! - GAP round-trip through dense form preserves content

use proptest::prelude::*;
use swath_core::block::gap::GapBlock;
use swath_core::block::ops::{
    and_2way, and_digest, digest_of, digest_update, or_3way, or_5way, or_into, sub_digest,
};
use swath_core::block::shift::{shift_r1, shift_r1_and};
use swath_core::block::{BitBlock, DIGEST_FULL, DIGEST_WORDS};

fn block_with(bits: &[u32]) -> BitBlock {
    let mut b = BitBlock::ZERO;
    for &bit in bits {
        b.set(bit);
    }
    b
}

fn bits_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..65_536, 0..64)
}

/// Asserts the digest contract: every clear bit covers an all-zero
/// slice and every set bit covers a non-empty slice.
fn assert_digest_exact(blk: &BitBlock, digest: u64) {
    for d in 0..64usize {
        let base = d * DIGEST_WORDS;
        let slice_any = blk.words[base..base + DIGEST_WORDS].iter().any(|&w| w != 0);
        let bit = digest & (1u64 << d) != 0;
        assert_eq!(bit, slice_any, "digest bit {d} disagrees with slice");
    }
}

proptest! {
    #[test]
    fn prop_digest_of_matches_content(bits in bits_strategy()) {
        let blk = block_with(&bits);
        assert_digest_exact(&blk, digest_of(&blk));
    }

    #[test]
    fn prop_and_kernels_monotonic_and_exact(
        a in bits_strategy(),
        b in bits_strategy(),
        c in bits_strategy(),
    ) {
        let ba = block_with(&a);
        let bb = block_with(&b);
        let bc = block_with(&c);

        let mut dst = BitBlock::ZERO;
        let d0 = and_2way(&mut dst, &ba, &bb, DIGEST_FULL);
        assert_digest_exact(&dst, d0);

        let d1 = and_digest(&mut dst, &bc, d0);
        prop_assert_eq!(d1 & !d0, 0, "AND set a digest bit");
        assert_digest_exact(&dst, d1);

        for (k, w) in dst.words.iter().enumerate() {
            prop_assert_eq!(*w, ba.words[k] & bb.words[k] & bc.words[k]);
        }
    }

    #[test]
    fn prop_sub_kernel_monotonic_and_exact(
        a in bits_strategy(),
        b in bits_strategy(),
    ) {
        let mut dst = block_with(&a);
        let bb = block_with(&b);
        let d0 = digest_of(&dst);
        let d1 = sub_digest(&mut dst, &bb, d0);
        prop_assert_eq!(d1 & !d0, 0, "SUB set a digest bit");
        assert_digest_exact(&dst, d1);

        let expect = block_with(&a);
        for (k, w) in dst.words.iter().enumerate() {
            prop_assert_eq!(*w, expect.words[k] & !bb.words[k]);
        }
    }

    #[test]
    fn prop_digest_update_monotonic(bits in bits_strategy(), stale in any::<u64>()) {
        let blk = block_with(&bits);
        let exact = digest_of(&blk);
        // updating a stale digest only clears; live bits survive
        let updated = digest_update(&blk, stale);
        prop_assert_eq!(updated & !stale, 0);
        prop_assert_eq!(updated, stale & exact);
    }

    #[test]
    fn prop_batched_or_equals_sequential(
        srcs in prop::collection::vec(bits_strategy(), 4),
    ) {
        let blocks: Vec<BitBlock> = srcs.iter().map(|s| block_with(s)).collect();

        let mut expect = BitBlock::ZERO;
        for b in &blocks {
            or_into(&mut expect, b);
        }

        let mut got5 = BitBlock::ZERO;
        or_5way(&mut got5, &blocks[0], &blocks[1], &blocks[2], &blocks[3]);
        prop_assert_eq!(&got5.words[..], &expect.words[..]);

        let mut got3 = blocks[0].clone();
        or_3way(&mut got3, &blocks[1], &blocks[2]);
        or_into(&mut got3, &blocks[3]);
        prop_assert_eq!(&got3.words[..], &expect.words[..]);
    }

    #[test]
    fn prop_fused_shift_and(
        src in bits_strategy(),
        mask in bits_strategy(),
        carry in 0u64..2,
    ) {
        let bm = block_with(&mask);

        let mut separate = block_with(&src);
        let (co_a, _) = shift_r1(&mut separate, carry);
        for k in 0..separate.words.len() {
            separate.words[k] &= bm.words[k];
        }

        let mut fused = block_with(&src);
        let (co_b, any) = shift_r1_and(&mut fused, &bm, carry);

        prop_assert_eq!(co_a, co_b);
        prop_assert_eq!(&fused.words[..], &separate.words[..]);
        prop_assert_eq!(any, fused.words.iter().any(|&w| w != 0));
    }

    #[test]
    fn prop_shift_is_position_plus_one(src in bits_strategy(), carry in 0u64..2) {
        let mut blk = block_with(&src);
        let (co, _) = shift_r1(&mut blk, carry);
        prop_assert_eq!(co != 0, src.contains(&65_535));
        for bit in 0..65_536u32 {
            let expect = if bit == 0 {
                carry != 0
            } else {
                src.contains(&(bit - 1))
            };
            if blk.test(bit) != expect {
                prop_assert!(false, "bit {} wrong after shift", bit);
            }
        }
    }

    #[test]
    fn prop_gap_round_trip(bits in bits_strategy()) {
        let blk = block_with(&bits);
        // 64 scattered bits produce at most 129 runs, always within cap
        let g = GapBlock::from_bits(&blk, 512).unwrap();
        let mut back = BitBlock::ZERO;
        g.or_into(&mut back);
        prop_assert_eq!(&back.words[..], &blk.words[..]);
        for &bit in &bits {
            prop_assert!(g.test(bit));
        }
    }
}
