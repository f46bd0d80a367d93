//! Word-wise block kernels: copy/fill, batched OR folds, digest-pruned
//! AND/SUB, digests, uniform checks, range fills.
//!
//! The OR kernels report "result is all-ones" so reducers can turn the
//! rest of a fold into a golden outcome; the AND/SUB kernels take and
//! return a [`Digest`] and only ever clear its bits, skipping slices
//! that are already dead.

use super::{BitBlock, Digest, BLOCK_BITS, BLOCK_WORDS, DIGEST_WORDS};

/// Copies `src` into `dst`.
#[inline]
pub fn copy_block(dst: &mut BitBlock, src: &BitBlock) {
    dst.words.copy_from_slice(&src.words);
}

/// Fills `dst` with all-ones (`ones == true`) or all-zeros.
#[inline]
pub fn fill_block(dst: &mut BitBlock, ones: bool) {
    dst.words.fill(if ones { !0u64 } else { 0u64 });
}

/// `dst |= a`. Returns `true` iff the result is all-ones.
pub fn or_into(dst: &mut BitBlock, a: &BitBlock) -> bool {
    let mut conj = !0u64;
    for k in 0..BLOCK_WORDS {
        let w = dst.words[k] | a.words[k];
        dst.words[k] = w;
        conj &= w;
    }
    conj == !0u64
}

/// `dst |= a | b` (3-way OR). Returns `true` iff the result is all-ones.
pub fn or_3way(dst: &mut BitBlock, a: &BitBlock, b: &BitBlock) -> bool {
    let mut conj = !0u64;
    for k in 0..BLOCK_WORDS {
        let w = dst.words[k] | a.words[k] | b.words[k];
        dst.words[k] = w;
        conj &= w;
    }
    conj == !0u64
}

/// `dst |= a | b | c | d` (5-way OR). Returns `true` iff the result is
/// all-ones.
pub fn or_5way(
    dst: &mut BitBlock,
    a: &BitBlock,
    b: &BitBlock,
    c: &BitBlock,
    d: &BitBlock,
) -> bool {
    let mut conj = !0u64;
    for k in 0..BLOCK_WORDS {
        let w = dst.words[k] | a.words[k] | b.words[k] | c.words[k] | d.words[k];
        dst.words[k] = w;
        conj &= w;
    }
    conj == !0u64
}

/// Initializes `dst = a & b`, pruned by `digest`.
///
/// Slices whose digest bit is clear are zeroed in `dst`, so the digest
/// invariant (clear bit ⇒ all-zero slice) holds for any starting
/// digest. Returns the updated digest.
pub fn and_2way(dst: &mut BitBlock, a: &BitBlock, b: &BitBlock, digest: Digest) -> Digest {
    let mut d_out = digest;
    for d in 0..64u32 {
        let base = (d as usize) * DIGEST_WORDS;
        if digest & (1u64 << d) == 0 {
            dst.words[base..base + DIGEST_WORDS].fill(0);
            continue;
        }
        let mut acc = 0u64;
        for k in base..base + DIGEST_WORDS {
            let w = a.words[k] & b.words[k];
            dst.words[k] = w;
            acc |= w;
        }
        if acc == 0 {
            d_out &= !(1u64 << d);
        }
    }
    d_out
}

/// `dst &= a` over the live digest slices. Returns the updated digest.
pub fn and_digest(dst: &mut BitBlock, a: &BitBlock, digest: Digest) -> Digest {
    let mut d_out = digest;
    let mut live = digest;
    while live != 0 {
        let d = live.trailing_zeros();
        live &= live - 1;
        let base = (d as usize) * DIGEST_WORDS;
        let mut acc = 0u64;
        for k in base..base + DIGEST_WORDS {
            let w = dst.words[k] & a.words[k];
            dst.words[k] = w;
            acc |= w;
        }
        if acc == 0 {
            d_out &= !(1u64 << d);
        }
    }
    d_out
}

/// `dst &= !a` over the live digest slices. Returns the updated digest.
pub fn sub_digest(dst: &mut BitBlock, a: &BitBlock, digest: Digest) -> Digest {
    let mut d_out = digest;
    let mut live = digest;
    while live != 0 {
        let d = live.trailing_zeros();
        live &= live - 1;
        let base = (d as usize) * DIGEST_WORDS;
        let mut acc = 0u64;
        for k in base..base + DIGEST_WORDS {
            let w = dst.words[k] & !a.words[k];
            dst.words[k] = w;
            acc |= w;
        }
        if acc == 0 {
            d_out &= !(1u64 << d);
        }
    }
    d_out
}

/// Computes the digest of `blk` from scratch.
pub fn digest_of(blk: &BitBlock) -> Digest {
    let mut digest = 0u64;
    for d in 0..64u32 {
        let base = (d as usize) * DIGEST_WORDS;
        let mut acc = 0u64;
        for k in base..base + DIGEST_WORDS {
            acc |= blk.words[k];
        }
        if acc != 0 {
            digest |= 1u64 << d;
        }
    }
    digest
}

/// Rechecks the live slices of `digest` against `blk`, clearing bits
/// whose slice went all-zero. Never sets bits.
pub fn digest_update(blk: &BitBlock, digest: Digest) -> Digest {
    let mut d_out = digest;
    let mut live = digest;
    while live != 0 {
        let d = live.trailing_zeros();
        live &= live - 1;
        let base = (d as usize) * DIGEST_WORDS;
        let mut acc = 0u64;
        for k in base..base + DIGEST_WORDS {
            acc |= blk.words[k];
        }
        if acc == 0 {
            d_out &= !(1u64 << d);
        }
    }
    d_out
}

/// `true` iff `blk` has no set bits.
pub fn is_all_zero(blk: &BitBlock) -> bool {
    blk.words.iter().all(|&w| w == 0)
}

/// `true` iff every bit of `blk` is set.
pub fn is_all_ones(blk: &BitBlock) -> bool {
    blk.words.iter().all(|&w| w == !0u64)
}

/// Position of the first (lowest) set bit, or `None` if all-zero.
pub fn find_first(blk: &BitBlock) -> Option<u32> {
    for (k, &w) in blk.words.iter().enumerate() {
        if w != 0 {
            return Some((k as u32) * 64 + w.trailing_zeros());
        }
    }
    None
}

/// Sets bits `from..=to` within `blk` (block-local positions).
pub fn set_bit_range(blk: &mut BitBlock, from: u32, to: u32) {
    debug_assert!(from <= to && to < BLOCK_BITS);
    let (wf, wt) = ((from >> 6) as usize, (to >> 6) as usize);
    let head = !0u64 << (from & 63);
    let tail = !0u64 >> (63 - (to & 63));
    if wf == wt {
        blk.words[wf] |= head & tail;
        return;
    }
    blk.words[wf] |= head;
    for w in &mut blk.words[wf + 1..wt] {
        *w = !0u64;
    }
    blk.words[wt] |= tail;
}

/// Clears bits `from..=to` within `blk` (block-local positions).
pub fn clear_bit_range(blk: &mut BitBlock, from: u32, to: u32) {
    debug_assert!(from <= to && to < BLOCK_BITS);
    let (wf, wt) = ((from >> 6) as usize, (to >> 6) as usize);
    let head = !0u64 << (from & 63);
    let tail = !0u64 >> (63 - (to & 63));
    if wf == wt {
        blk.words[wf] &= !(head & tail);
        return;
    }
    blk.words[wf] &= !head;
    for w in &mut blk.words[wf + 1..wt] {
        *w = 0;
    }
    blk.words[wt] &= !tail;
}
