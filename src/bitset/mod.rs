//! Dynamic bitsets over a growable block store.
//!
//! Two types share one representation, a default bit value plus a block array. Every position
//! past the stored blocks reads the default bit.
//!  - [`DynamicBitset`] is finite: its default bit is always `false`, so it can be counted and
//!    iterated.
//!  - [`DualBitset`] carries an explicit default bit. With the default set it represents a
//!    co-finite set ("everything except a finite list"), which supports the bit algebra and
//!    membership queries, but counting and iteration return an error since the result would be
//!    infinite.
//!
//! Both types encode to the pointer-free layout described in [`crate::layout`], and the
//! borrowed [`BitsetView`] reads that layout in place.

use crate::block::{Block, BlockSource};

mod dual;
mod dynamic;
mod iter;
mod ops;
mod view;


pub use dual::DualBitset;
pub use dynamic::DynamicBitset;
pub use iter::SetBits;
pub use view::BitsetView;

/// A common trait for the owning bitsets and the borrowed [`BitsetView`], for applications that
/// want to query them interchangeably.
pub trait BitRead {
    /// The value of every position beyond the stored blocks.
    fn default_bit_value(&self) -> bool;

    /// Return the bit at `pos`. Positions beyond the stored blocks return the default bit.
    fn get(&self, pos: usize) -> bool;

    /// Return the smallest set position that is at least `pos`, or `None` if no such position
    /// exists in the stored blocks.
    ///
    /// The search only covers the stored blocks. For a bitset with the default bit set, every
    /// position past the stored blocks is set as well, which callers must handle themselves.
    fn next_set_bit(&self, pos: usize) -> Option<usize>;

    /// Number of stored blocks
    fn num_blocks(&self) -> usize;
}

#[inline]
pub(crate) fn get_bit<B: Block, S: BlockSource<B> + ?Sized>(
    blocks: &S,
    default_bit_value: bool,
    pos: usize,
) -> bool {
    let index = B::index(pos);
    if index < blocks.block_count() {
        (blocks.block(index) >> B::offset(pos)) & B::one() == B::one()
    } else {
        default_bit_value
    }
}

pub(crate) fn next_set_bit_in<B: Block, S: BlockSource<B> + ?Sized>(
    blocks: &S,
    pos: usize,
) -> Option<usize> {
    let mut index = B::index(pos);
    if index >= blocks.block_count() {
        return None;
    }

    // mask off the bits before `pos` in the first block
    let mut block = blocks.block(index) & (B::ones() << B::offset(pos));
    loop {
        if block != B::zero() {
            return Some((index << B::LOG2_WIDTH) + block.trailing_zeros() as usize);
        }
        index += 1;
        if index >= blocks.block_count() {
            return None;
        }
        block = blocks.block(index);
    }
}
