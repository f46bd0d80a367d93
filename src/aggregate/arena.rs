//! Scratch arena owned by an aggregator.
//!
//! Allocated once at construction and reused for every operation: one
//! dense scratch block that per-block reductions fold into, the two
//! bucket lists the sorter fills for each (i, j), and the per-source
//! carry bytes for shift-AND. Nothing here survives a single (i, j)
//! step except the carry bytes, which live for one whole shift sweep.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::block::gap::GapBlock;
use crate::block::BitBlock;

use super::MAX_CAP;

pub(crate) struct Arena<'a> {
    /// Scratch block the per-block reducers fold into. Only meaningful
    /// between sorter and reducer within one (i, j) step.
    pub scratch: Box<BitBlock>,
    /// Dense source blocks collected by the sorter for the current
    /// (i, j).
    pub bit_args: Vec<&'a BitBlock>,
    /// GAP source blocks collected by the sorter for the current
    /// (i, j).
    pub gap_args: Vec<&'a GapBlock>,
    /// One 0/1 carry byte per source, for shift-AND sweeps.
    pub carry_overs: [u8; MAX_CAP],
}

impl<'a> Arena<'a> {
    pub fn new() -> Self {
        Self {
            scratch: Box::new(BitBlock::ZERO),
            bit_args: Vec::with_capacity(MAX_CAP),
            gap_args: Vec::with_capacity(MAX_CAP),
            carry_overs: [0; MAX_CAP],
        }
    }
}
