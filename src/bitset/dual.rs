use std::cmp::max;
use std::hash::{Hash, Hasher};
use std::io::Write;

use super::{get_bit, next_set_bit_in, BitRead, BitsetView, SetBits};
use crate::block::{Block, BlockStore};
use crate::error::{FlexError, Result};
use crate::layout::{self, BitsetHeader};

/// A dynamic bitset with an explicit default bit value.
///
/// Every position past the stored blocks reads `default_bit_value`. With the default cleared
/// this is an ordinary finite set, with the default set it is a co-finite set: all positions are
/// members except the cleared positions among the stored blocks. Setting or clearing a position
/// past the stored range grows the block array with the default pattern.
///
/// Counting and iterating are only defined for finite sets, so [`count`] and [`iter`] return a
/// [`FlexError::PreconditionViolation`] when the default bit is set. Use [`DynamicBitset`] for
/// sets that are finite by construction.
///
/// # Example
/// ```rust
/// use flex_bits::DualBitset;
///
/// // all positions are set except 3
/// let mut bits = DualBitset::<u64>::with_default(10, true);
/// bits.unset(3);
///
/// assert!(!bits.get(3));
/// assert!(bits.get(1000));
/// assert!(bits.count().is_err());
///
/// let finite = !&bits;
/// assert_eq!(finite.iter().unwrap().collect::<Vec<_>>(), vec![3]);
/// ```
///
/// [`count`]: DualBitset::count
/// [`iter`]: DualBitset::iter
/// [`DynamicBitset`]: crate::DynamicBitset
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DualBitset<B = u64> {
    default_bit_value: bool,
    blocks: BlockStore<B>,
}

impl<B: Block> DualBitset<B> {
    /// Create an empty finite bitset with room for `size` positions.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_default(size, false)
    }

    /// Create a bitset in which every position reads `default_bit_value`, with
    /// `⌈size / W⌉ + 1` blocks allocated.
    #[must_use]
    pub fn with_default(size: usize, default_bit_value: bool) -> Self {
        Self {
            default_bit_value,
            blocks: BlockStore::filled(size.div_ceil(B::WIDTH) + 1, B::pattern(default_bit_value)),
        }
    }

    pub(crate) fn from_parts(default_bit_value: bool, blocks: BlockStore<B>) -> Self {
        Self {
            default_bit_value,
            blocks,
        }
    }

    /// The value of every position beyond the stored blocks.
    #[must_use]
    pub fn default_bit_value(&self) -> bool {
        self.default_bit_value
    }

    /// Whether the set is co-finite, i.e. its default bit is set.
    #[must_use]
    pub fn is_cofinite(&self) -> bool {
        self.default_bit_value
    }

    #[inline]
    fn fill(&self) -> B {
        B::pattern(self.default_bit_value)
    }

    /// Return the bit at `pos`. Positions beyond the stored blocks return the default bit.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> bool {
        get_bit(self.blocks.as_slice(), self.default_bit_value, pos)
    }

    /// Set the bit at `pos`, growing the block array if needed.
    pub fn set(&mut self, pos: usize) {
        let (index, fill) = (B::index(pos), self.fill());
        self.blocks.grow_to(index + 1, fill);
        self.blocks.as_mut_slice()[index] |= B::one() << B::offset(pos);
    }

    /// Clear the bit at `pos`, growing the block array if needed.
    pub fn unset(&mut self, pos: usize) {
        let (index, fill) = (B::index(pos), self.fill());
        self.blocks.grow_to(index + 1, fill);
        self.blocks.as_mut_slice()[index] &= !(B::one() << B::offset(pos));
    }

    /// Drop all stored blocks, so that every position reads the default bit.
    pub fn unset_all(&mut self) {
        self.blocks.clear();
    }

    /// Drop trailing blocks that equal the default pattern. The logical content is unchanged.
    pub fn shrink_to_fit(&mut self) {
        let fill = self.fill();
        self.blocks.trim_trailing(fill);
    }

    /// Grow the block array to at least as many blocks as `other` holds. Never shrinks.
    pub fn resize_to_fit(&mut self, other: &Self) {
        let fill = self.fill();
        self.blocks.grow_to(other.blocks.len(), fill);
    }

    /// Return the smallest set position that is at least `pos` among the stored blocks.
    ///
    /// The infinite tail of a co-finite set is not reported: if the default bit is set, callers
    /// that need the true successor have to treat `pos >= self.num_blocks() * W` themselves.
    #[must_use]
    pub fn next_set_bit(&self, pos: usize) -> Option<usize> {
        next_set_bit_in(self.blocks.as_slice(), pos)
    }

    /// Number of set positions.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the default bit is set, because the count
    /// would be infinite.
    pub fn count(&self) -> Result<usize> {
        if self.default_bit_value {
            return Err(FlexError::PreconditionViolation(
                "cannot count the members of a co-finite bitset",
            ));
        }
        Ok(self.count_stored())
    }

    /// Iterate over the set positions in ascending order.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the default bit is set, because the
    /// sequence would be infinite.
    pub fn iter(&self) -> Result<SetBits<'_, B>> {
        if self.default_bit_value {
            return Err(FlexError::PreconditionViolation(
                "cannot enumerate the members of a co-finite bitset",
            ));
        }
        Ok(SetBits::new(self.blocks.as_slice()))
    }

    pub(crate) fn count_stored(&self) -> usize {
        self.blocks
            .as_slice()
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum()
    }

    /// Flip every position, including the default bit.
    pub fn complement(&mut self) {
        self.default_bit_value = !self.default_bit_value;
        for block in self.blocks.as_mut_slice() {
            *block = !*block;
        }
    }

    /// Replace `self` by the union of `self` and `other`.
    pub fn union_with(&mut self, other: &Self) {
        let len = max(self.blocks.len(), other.blocks.len());
        self.combine(other, len, false, |a, b| a | b);
        self.default_bit_value |= other.default_bit_value;
    }

    /// Replace `self` by the intersection of `self` and `other`.
    ///
    /// Blocks past the stored range of an operand whose default bit is cleared are zero in the
    /// result, so the result is truncated to the shortest such operand.
    pub fn intersect_with(&mut self, other: &Self) {
        let len = intersection_len(
            (self.blocks.len(), self.default_bit_value),
            (other.blocks.len(), other.default_bit_value),
        );
        self.combine(other, len, false, |a, b| a & b);
        self.default_bit_value &= other.default_bit_value;
    }

    /// Replace `self` by `self & !other`.
    ///
    /// If `other`'s default bit is cleared, the blocks of `self` past `other`'s stored range are
    /// left unchanged.
    pub fn difference_with(&mut self, other: &Self) {
        let len = intersection_len(
            (self.blocks.len(), self.default_bit_value),
            (other.blocks.len(), !other.default_bit_value),
        );
        self.combine(other, len, true, |a, b| a & b);
        self.default_bit_value &= !other.default_bit_value;
    }

    /// Resize `self` to `len` blocks and combine them with the blocks of `other` (inverted if
    /// `invert_other` is set), padding both sides with their default patterns.
    fn combine(&mut self, other: &Self, len: usize, invert_other: bool, op: impl Fn(B, B) -> B) {
        let (self_fill, other_fill) = (self.fill(), other.fill());
        self.blocks.resize(len, self_fill);
        for (i, block) in self.blocks.as_mut_slice().iter_mut().enumerate() {
            let rhs = other.blocks.block_or(i, other_fill);
            *block = op(*block, if invert_other { !rhs } else { rhs });
        }
    }

    /// Whether every position set in `other` is also set in `self`.
    #[must_use]
    pub fn is_superseteq(&self, other: &Self) -> bool {
        if other.default_bit_value && !self.default_bit_value {
            return false;
        }
        let (self_fill, other_fill) = (self.fill(), other.fill());
        (0..max(self.blocks.len(), other.blocks.len())).all(|i| {
            other.blocks.block_or(i, other_fill) & !self.blocks.block_or(i, self_fill) == B::zero()
        })
    }

    /// Whether no position is set in both `self` and `other`.
    #[must_use]
    pub fn are_disjoint(&self, other: &Self) -> bool {
        if self.default_bit_value && other.default_bit_value {
            return false;
        }
        let (self_fill, other_fill) = (self.fill(), other.fill());
        (0..max(self.blocks.len(), other.blocks.len())).all(|i| {
            self.blocks.block_or(i, self_fill) & other.blocks.block_or(i, other_fill) == B::zero()
        })
    }

    /// The stored blocks
    #[must_use]
    pub fn blocks(&self) -> &[B] {
        self.blocks.as_slice()
    }

    /// Number of stored blocks
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the number of bytes on the heap for this bitset. Does not include allocated memory
    /// that isn't used.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.blocks.heap_size()
    }

    fn header(&self) -> BitsetHeader {
        BitsetHeader::new::<B>(self.default_bit_value, self.blocks.len())
    }

    /// Encode the bitset into its binary layout.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        layout::encode(&self.header(), self.blocks.as_slice())
    }

    /// Write the binary layout of the bitset into `writer`, returning the number of bytes
    /// written.
    ///
    /// # Errors
    /// Propagates any error of the writer.
    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<usize> {
        layout::write_encoded(writer, &self.header(), self.blocks.as_slice())
    }

    /// Decode a bitset from the front of `bytes`, copying its blocks.
    ///
    /// # Errors
    /// Returns an error if the buffer is too short or the header is malformed or was written with
    /// another block width.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        BitsetView::from_bytes(bytes).map(|view| view.to_bitset())
    }

    /// Borrow `self` as a view over its blocks.
    #[must_use]
    pub fn as_view(&self) -> BitsetView<'_, B> {
        BitsetView::from_slice(self.default_bit_value, self.blocks.as_slice())
    }
}

/// Number of blocks an AND-combination of two operands needs: the blocks past the stored range
/// of an operand with a cleared default bit are all zero and can be dropped.
fn intersection_len(lhs: (usize, bool), rhs: (usize, bool)) -> usize {
    let mut len = max(lhs.0, rhs.0);
    if !lhs.1 {
        len = len.min(lhs.0);
    }
    if !rhs.1 {
        len = len.min(rhs.0);
    }
    len
}

impl<B: Block> BitRead for DualBitset<B> {
    fn default_bit_value(&self) -> bool {
        self.default_bit_value
    }

    fn get(&self, pos: usize) -> bool {
        DualBitset::get(self, pos)
    }

    fn next_set_bit(&self, pos: usize) -> Option<usize> {
        DualBitset::next_set_bit(self, pos)
    }

    fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

impl<B: Block> Default for DualBitset<B> {
    fn default() -> Self {
        Self::from_parts(false, BlockStore::new())
    }
}

/// Two bitsets are equal if they read the same bit at every position, independent of how many
/// blocks each of them stores.
impl<B: Block> PartialEq for DualBitset<B> {
    fn eq(&self, other: &Self) -> bool {
        if self.default_bit_value != other.default_bit_value {
            return false;
        }
        let fill = self.fill();
        (0..max(self.blocks.len(), other.blocks.len()))
            .all(|i| self.blocks.block_or(i, fill) == other.blocks.block_or(i, fill))
    }
}

impl<B: Block> Eq for DualBitset<B> {}

impl<B: Block> Hash for DualBitset<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let fill = self.fill();
        let blocks = self.blocks.as_slice();
        let significant = blocks
            .iter()
            .rposition(|&b| b != fill)
            .map_or(0, |last| last + 1);
        self.default_bit_value.hash(state);
        blocks[..significant].hash(state);
    }
}
