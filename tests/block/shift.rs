//! Directed tests for the shift-right kernels and their carry
//! behavior.

use swath_core::block::ops::{fill_block, is_all_zero};
use swath_core::block::shift::{shift_r1, shift_r1_and};
use swath_core::block::BitBlock;

fn block_with(bits: &[u32]) -> BitBlock {
    let mut b = BitBlock::ZERO;
    for &bit in bits {
        b.set(bit);
    }
    b
}

#[test]
fn shift_moves_bits_up_one_position() {
    let mut b = block_with(&[0, 10, 63, 64, 1_000]);
    let (co, any) = shift_r1(&mut b, 0);
    assert_eq!(co, 0);
    assert!(any);
    for bit in [1, 11, 64, 65, 1_001] {
        assert!(b.test(bit), "bit {bit} expected");
    }
    assert_eq!(b.count_ones(), 5);
}

#[test]
fn shift_carry_in_lands_on_bit_zero() {
    let mut b = BitBlock::ZERO;
    let (co, any) = shift_r1(&mut b, 1);
    assert_eq!(co, 0);
    assert!(any);
    assert!(b.test(0));
    assert_eq!(b.count_ones(), 1);
}

#[test]
fn shift_carry_out_from_top_bit() {
    let mut b = block_with(&[65_535]);
    let (co, any) = shift_r1(&mut b, 0);
    assert_eq!(co, 1);
    assert!(!any);
    assert!(is_all_zero(&b));
}

#[test]
fn shift_crosses_word_boundary() {
    let mut b = block_with(&[63]);
    let (co, _) = shift_r1(&mut b, 0);
    assert_eq!(co, 0);
    assert!(b.test(64));
    assert_eq!(b.count_ones(), 1);
}

#[test]
fn fused_shift_and_equals_shift_then_and() {
    let src = block_with(&[0, 63, 64, 9_999, 65_535]);
    let mask = block_with(&[1, 64, 65, 10_000]);

    let mut separate = src.clone();
    let (co_a, _) = shift_r1(&mut separate, 1);
    for k in 0..separate.words.len() {
        separate.words[k] &= mask.words[k];
    }

    let mut fused = src.clone();
    let (co_b, any) = shift_r1_and(&mut fused, &mask, 1);

    assert_eq!(co_a, co_b);
    assert_eq!(co_b, 1); // bit 65_535 shifted out
    assert_eq!(separate.words, fused.words);
    assert_eq!(any, !is_all_zero(&fused));
}

#[test]
fn fused_carry_out_ignores_mask() {
    // the shift produces the carry even when the mask annihilates the
    // block content
    let src = block_with(&[65_535]);
    let mut b = src.clone();
    let (co, any) = shift_r1_and(&mut b, &BitBlock::ZERO, 0);
    assert_eq!(co, 1);
    assert!(!any);
    assert!(is_all_zero(&b));
}

#[test]
fn full_block_shift_stays_full_under_carry() {
    let mut b = BitBlock::ZERO;
    fill_block(&mut b, true);
    let mask = {
        let mut m = BitBlock::ZERO;
        fill_block(&mut m, true);
        m
    };
    let (co, any) = shift_r1_and(&mut b, &mask, 1);
    assert_eq!(co, 1);
    assert!(any);
    assert_eq!(b.count_ones(), 65_536);
}
