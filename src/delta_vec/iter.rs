use std::iter::FusedIterator;

use crate::block::{Block, BlockSource};
use crate::int_vec::packing::read_packed;
use crate::layout::ByteBlocks;

/// Iterator over the values of a [`FlexibleDeltaIndexVector`] or a [`FlexibleDeltaIndexView`].
/// A compressed vector is decoded sequentially by keeping the running sum of the deltas.
///
/// [`FlexibleDeltaIndexVector`]: super::FlexibleDeltaIndexVector
/// [`FlexibleDeltaIndexView`]: super::FlexibleDeltaIndexView
#[derive(Clone, Debug)]
pub struct DeltaIter<'a, B> {
    blocks: ByteBlocks<'a, B>,
    // 0 while the blocks hold the values themselves
    bit_width: usize,
    index: usize,
    len: usize,
    sum: B,
}

impl<'a, B: Block> DeltaIter<'a, B> {
    pub(crate) fn new(blocks: ByteBlocks<'a, B>, bit_width: usize, len: usize) -> Self {
        Self {
            blocks,
            bit_width,
            index: 0,
            len,
            sum: B::zero(),
        }
    }
}

impl<B: Block> Iterator for DeltaIter<'_, B> {
    type Item = B;

    fn next(&mut self) -> Option<B> {
        if self.index >= self.len {
            return None;
        }
        let value = if self.bit_width == 0 {
            self.blocks.block(self.index)
        } else {
            let delta = read_packed(&self.blocks, self.index * self.bit_width, self.bit_width);
            // only a corrupted buffer can overflow here
            self.sum.wrapping_add(&delta)
        };
        self.sum = value;
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len - self.index;
        (len, Some(len))
    }
}

impl<B: Block> ExactSizeIterator for DeltaIter<'_, B> {}

impl<B: Block> FusedIterator for DeltaIter<'_, B> {}
