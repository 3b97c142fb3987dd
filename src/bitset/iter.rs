use std::iter::FusedIterator;

use super::next_set_bit_in;
use crate::block::Block;

/// An iterator over the set positions of a finite bitset, in ascending order.
///
/// This struct is created by [`DynamicBitset::iter`] and [`DualBitset::iter`]. It borrows the
/// bitset, so the bitset cannot be modified while the iterator is alive.
///
/// [`DynamicBitset::iter`]: crate::DynamicBitset::iter
/// [`DualBitset::iter`]: crate::DualBitset::iter
#[derive(Clone, Debug)]
pub struct SetBits<'a, B> {
    blocks: &'a [B],
    // next position to inspect, None once the iterator is exhausted
    cursor: Option<usize>,
}

impl<'a, B: Block> SetBits<'a, B> {
    pub(crate) fn new(blocks: &'a [B]) -> Self {
        Self {
            blocks,
            cursor: Some(0),
        }
    }
}

impl<B: Block> Iterator for SetBits<'_, B> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let found = next_set_bit_in(self.blocks, self.cursor?);
        self.cursor = found.and_then(|pos| pos.checked_add(1));
        found
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            Some(pos) => (
                0,
                Some((self.blocks.len() << B::LOG2_WIDTH).saturating_sub(pos)),
            ),
            None => (0, Some(0)),
        }
    }
}

impl<B: Block> FusedIterator for SetBits<'_, B> {}
