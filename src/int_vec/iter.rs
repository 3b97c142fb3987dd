use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::IndexRead;
use crate::block::Block;

/// A double-ended, exact-size iterator over the elements of any [`IndexRead`] container.
/// Elements are decoded on access, so iterating a packed vector never unpacks it.
///
/// Both cursors point to unconsumed elements; `back` is exclusive.
#[derive(Debug)]
pub struct IndexIter<'a, B, V: ?Sized> {
    vec: &'a V,
    front: usize,
    back: usize,
    phantom: PhantomData<B>,
}

impl<'a, B: Block, V: IndexRead<B> + ?Sized> IndexIter<'a, B, V> {
    pub(crate) fn new(vec: &'a V) -> Self {
        Self {
            vec,
            front: 0,
            back: vec.len(),
            phantom: PhantomData,
        }
    }
}

impl<B, V: ?Sized> Clone for IndexIter<'_, B, V> {
    fn clone(&self) -> Self {
        Self {
            vec: self.vec,
            front: self.front,
            back: self.back,
            phantom: PhantomData,
        }
    }
}

impl<B: Block, V: IndexRead<B> + ?Sized> Iterator for IndexIter<'_, B, V> {
    type Item = B;

    fn next(&mut self) -> Option<B> {
        if self.front >= self.back {
            return None;
        }
        let value = self.vec.get_unchecked(self.front);
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }

    /// Returns the exact number of remaining elements. Does not decode anything.
    fn count(self) -> usize {
        self.back - self.front
    }

    /// Returns the last element without decoding the ones before it.
    fn last(mut self) -> Option<B> {
        self.next_back()
    }

    /// Skips `n` elements without decoding them.
    fn nth(&mut self, n: usize) -> Option<B> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<B: Block, V: IndexRead<B> + ?Sized> DoubleEndedIterator for IndexIter<'_, B, V> {
    fn next_back(&mut self) -> Option<B> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.vec.get_unchecked(self.back))
    }

    fn nth_back(&mut self, n: usize) -> Option<B> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<B: Block, V: IndexRead<B> + ?Sized> ExactSizeIterator for IndexIter<'_, B, V> {}

impl<B: Block, V: IndexRead<B> + ?Sized> FusedIterator for IndexIter<'_, B, V> {}
