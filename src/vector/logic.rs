//! Pairwise logical operators on whole vectors.
//!
//! These are the plain one-operand-at-a-time forms (`|=`, `&=`, `-=` as
//! AND-NOT); the multi-way aggregation engine exists precisely to beat
//! chains of these, and the horizontal reference reductions are built
//! from them.

use core::ops::{BitAndAssign, BitOrAssign, SubAssign};

use crate::block::{ops, DIGEST_FULL};

use super::{BitVector, BlockKind, BlockRef, SUB_COUNT};

impl BitOrAssign<&BitVector> for BitVector {
    fn bitor_assign(&mut self, rhs: &BitVector) {
        self.len = self.len.max(rhs.len);
        for i in 0..rhs.top_size() {
            if !rhs.has_row(i) {
                continue;
            }
            for j in 0..SUB_COUNT {
                match rhs.block(i, j) {
                    BlockRef::Zero => {}
                    BlockRef::Ones => self.set_ones_block(i, j),
                    BlockRef::Bits(b) => {
                        if self.block_kind(i, j) != BlockKind::Ones {
                            ops::or_into(self.deoptimize_block(i, j), b);
                        }
                    }
                    BlockRef::Gap(g) => {
                        if self.block_kind(i, j) != BlockKind::Ones {
                            g.or_into(self.deoptimize_block(i, j));
                        }
                    }
                }
            }
        }
    }
}

impl BitAndAssign<&BitVector> for BitVector {
    fn bitand_assign(&mut self, rhs: &BitVector) {
        self.len = self.len.max(rhs.len);
        for i in 0..self.top_size() {
            if !self.has_row(i) {
                continue;
            }
            for j in 0..SUB_COUNT {
                if self.block_kind(i, j) == BlockKind::Zero {
                    continue;
                }
                match rhs.block(i, j) {
                    BlockRef::Zero => self.zero_block(i, j),
                    BlockRef::Ones => {}
                    BlockRef::Bits(b) => {
                        let dst = self.deoptimize_block(i, j);
                        if ops::and_digest(dst, b, DIGEST_FULL) == 0 {
                            self.zero_block(i, j);
                        }
                    }
                    BlockRef::Gap(g) => {
                        let dst = self.deoptimize_block(i, j);
                        g.and_into(dst);
                        if ops::is_all_zero(dst) {
                            self.zero_block(i, j);
                        }
                    }
                }
            }
        }
    }
}

impl SubAssign<&BitVector> for BitVector {
    /// Set subtraction: `self &= !rhs`.
    fn sub_assign(&mut self, rhs: &BitVector) {
        for i in 0..self.top_size() {
            if !self.has_row(i) {
                continue;
            }
            for j in 0..SUB_COUNT {
                if self.block_kind(i, j) == BlockKind::Zero {
                    continue;
                }
                match rhs.block(i, j) {
                    BlockRef::Zero => {}
                    BlockRef::Ones => self.zero_block(i, j),
                    BlockRef::Bits(b) => {
                        let dst = self.deoptimize_block(i, j);
                        if ops::sub_digest(dst, b, DIGEST_FULL) == 0 {
                            self.zero_block(i, j);
                        }
                    }
                    BlockRef::Gap(g) => {
                        let dst = self.deoptimize_block(i, j);
                        g.sub_into(dst);
                        if ops::is_all_zero(dst) {
                            self.zero_block(i, j);
                        }
                    }
                }
            }
        }
    }
}
