use std::hash::{Hash, Hasher};
use std::io::Write;

use super::{BitRead, BitsetView, DualBitset, SetBits};
use crate::block::Block;
use crate::error::{FlexError, Result};

/// A finite dynamic bitset. Positions past the stored blocks are always unset, so the set can be
/// counted and iterated.
///
/// The bitset grows on demand: setting a position beyond the stored range appends zero blocks.
/// Its complement is co-finite and therefore a [`DualBitset`].
///
/// # Example
/// ```rust
/// use flex_bits::DynamicBitset;
///
/// let mut bits = DynamicBitset::<u64>::new(10);
/// bits.set(2);
/// bits.set(5);
/// bits.set(9);
///
/// assert_eq!(bits.count(), 3);
/// assert_eq!(bits.iter().collect::<Vec<_>>(), vec![2, 5, 9]);
/// assert_eq!(bits.next_set_bit(6), Some(9));
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "DualBitset<B>",
        into = "DualBitset<B>",
        bound(
            serialize = "B: Block + serde::Serialize",
            deserialize = "B: Block + serde::Deserialize<'de>"
        )
    )
)]
pub struct DynamicBitset<B = u64> {
    // invariant: the default bit of the inner bitset is cleared
    inner: DualBitset<B>,
}

impl<B: Block> DynamicBitset<B> {
    /// Create an empty bitset with `⌈size / W⌉ + 1` zero blocks allocated.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            inner: DualBitset::new(size),
        }
    }

    /// Return whether the bit at `pos` is set. Positions beyond the stored blocks are unset.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> bool {
        self.inner.get(pos)
    }

    /// Set the bit at `pos`, growing the block array if needed.
    pub fn set(&mut self, pos: usize) {
        self.inner.set(pos);
    }

    /// Clear the bit at `pos`, growing the block array if needed.
    pub fn unset(&mut self, pos: usize) {
        self.inner.unset(pos);
    }

    /// Clear all bits by dropping all stored blocks.
    pub fn unset_all(&mut self) {
        self.inner.unset_all();
    }

    /// Drop trailing zero blocks.
    pub fn shrink_to_fit(&mut self) {
        self.inner.shrink_to_fit();
    }

    /// Grow the block array to at least as many blocks as `other` holds. Never shrinks.
    pub fn resize_to_fit(&mut self, other: &Self) {
        self.inner.resize_to_fit(&other.inner);
    }

    /// Return the smallest set position that is at least `pos`, or `None` if there is none.
    #[must_use]
    pub fn next_set_bit(&self, pos: usize) -> Option<usize> {
        self.inner.next_set_bit(pos)
    }

    /// Number of set positions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count_stored()
    }

    /// Whether no position is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.blocks().iter().all(|&b| b == B::zero())
    }

    /// Iterate over the set positions in ascending order.
    #[must_use]
    pub fn iter(&self) -> SetBits<'_, B> {
        SetBits::new(self.inner.blocks())
    }

    /// Replace `self` by the union of `self` and `other`.
    pub fn union_with(&mut self, other: &Self) {
        self.inner.union_with(&other.inner);
    }

    /// Replace `self` by the intersection of `self` and `other`. The result is truncated to the
    /// shorter operand's block count.
    pub fn intersect_with(&mut self, other: &Self) {
        self.inner.intersect_with(&other.inner);
    }

    /// Remove every position set in `other` from `self`.
    pub fn difference_with(&mut self, other: &Self) {
        self.inner.difference_with(&other.inner);
    }

    /// Return the complement, which is a co-finite set.
    #[must_use]
    pub fn complement(&self) -> DualBitset<B> {
        let mut dual = self.inner.clone();
        dual.complement();
        dual
    }

    /// Whether every position set in `other` is also set in `self`.
    #[must_use]
    pub fn is_superseteq(&self, other: &Self) -> bool {
        self.inner.is_superseteq(&other.inner)
    }

    /// Whether no position is set in both `self` and `other`.
    #[must_use]
    pub fn are_disjoint(&self, other: &Self) -> bool {
        self.inner.are_disjoint(&other.inner)
    }

    /// The stored blocks
    #[must_use]
    pub fn blocks(&self) -> &[B] {
        self.inner.blocks()
    }

    /// Number of stored blocks
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.inner.num_blocks()
    }

    /// Returns the number of bytes on the heap for this bitset. Does not include allocated memory
    /// that isn't used.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.inner.heap_size()
    }

    /// Borrow the bitset as a [`DualBitset`] with a cleared default bit.
    #[must_use]
    pub fn as_dual(&self) -> &DualBitset<B> {
        &self.inner
    }

    /// Encode the bitset into its binary layout.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes()
    }

    /// Write the binary layout of the bitset into `writer`, returning the number of bytes
    /// written.
    ///
    /// # Errors
    /// Propagates any error of the writer.
    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<usize> {
        self.inner.write_to(writer)
    }

    /// Decode a finite bitset from the front of `bytes`, copying its blocks.
    ///
    /// # Errors
    /// Returns an error if the buffer cannot be decoded, or
    /// [`FlexError::PreconditionViolation`] if it encodes a co-finite bitset.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        DualBitset::from_bytes(bytes).and_then(Self::try_from)
    }

    /// Borrow `self` as a view over its blocks.
    #[must_use]
    pub fn as_view(&self) -> BitsetView<'_, B> {
        self.inner.as_view()
    }
}

impl<B: Block> BitRead for DynamicBitset<B> {
    fn default_bit_value(&self) -> bool {
        false
    }

    fn get(&self, pos: usize) -> bool {
        self.inner.get(pos)
    }

    fn next_set_bit(&self, pos: usize) -> Option<usize> {
        self.inner.next_set_bit(pos)
    }

    fn num_blocks(&self) -> usize {
        self.inner.num_blocks()
    }
}

impl<B: Block> Default for DynamicBitset<B> {
    fn default() -> Self {
        Self {
            inner: DualBitset::default(),
        }
    }
}

impl<B: Block> PartialEq for DynamicBitset<B> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<B: Block> Eq for DynamicBitset<B> {}

impl<B: Block> Hash for DynamicBitset<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<B: Block> From<DynamicBitset<B>> for DualBitset<B> {
    fn from(bits: DynamicBitset<B>) -> Self {
        bits.inner
    }
}

impl<B: Block> TryFrom<DualBitset<B>> for DynamicBitset<B> {
    type Error = FlexError;

    fn try_from(bits: DualBitset<B>) -> Result<Self> {
        if bits.default_bit_value() {
            return Err(FlexError::PreconditionViolation(
                "a co-finite bitset cannot be converted into a finite one",
            ));
        }
        Ok(Self { inner: bits })
    }
}

impl<'a, B: Block> IntoIterator for &'a DynamicBitset<B> {
    type Item = usize;
    type IntoIter = SetBits<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<B: Block> FromIterator<usize> for DynamicBitset<B> {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut bits = Self::default();
        bits.extend(iter);
        bits
    }
}

impl<B: Block> Extend<usize> for DynamicBitset<B> {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for pos in iter {
            self.set(pos);
        }
    }
}
