//! A vector of unsigned integers that can be bit-packed once it is fully built.
//!
//! A [`FlexibleIndexVector`] starts out dense, with one element per block, and supports appending
//! and resizing like a `Vec`. Calling [`compress`] determines the smallest bit width that holds
//! every element and repacks the vector in place. Random access stays O(1) in both states, but a
//! compressed vector can no longer be mutated.
//!
//! [`compress`]: FlexibleIndexVector::compress

use std::io::Write;
use std::mem;

use crate::block::{Block, BlockStore};
use crate::error::{FlexError, Result};
use crate::layout::{self, IndexHeader};

pub use iter::IndexIter;
pub use view::FlexibleIndexView;

mod iter;
pub(crate) mod packing;
mod view;

#[cfg(test)]
mod tests;

/// Storage state of the index vectors. A vector is dense while it is being built and packed after
/// compression; the transition happens at most once.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) enum Layout<B> {
    /// One element per block
    Dense(BlockStore<B>),
    /// `bit_width` bits per element
    Packed {
        bit_width: usize,
        blocks: BlockStore<B>,
    },
}

impl<B: Block> Layout<B> {
    pub(crate) fn blocks(&self) -> &BlockStore<B> {
        match self {
            Layout::Dense(blocks) | Layout::Packed { blocks, .. } => blocks,
        }
    }

    pub(crate) fn is_packed(&self) -> bool {
        matches!(self, Layout::Packed { .. })
    }

    /// The dense blocks, or an error if the vector has been compressed.
    pub(crate) fn dense_mut(&mut self) -> Result<&mut BlockStore<B>> {
        match self {
            Layout::Dense(blocks) => Ok(blocks),
            Layout::Packed { .. } => Err(FlexError::PreconditionViolation(
                "a compressed vector cannot be modified",
            )),
        }
    }
}

impl<B: Block> Default for Layout<B> {
    fn default() -> Self {
        Layout::Dense(BlockStore::new())
    }
}

/// Serialized form of both index vectors. Deserialization goes through the vectors' `TryFrom`
/// impls, which check the parts against each other.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
pub(crate) struct VectorParts<B> {
    pub(crate) layout: Layout<B>,
    pub(crate) len: usize,
}

/// Check that `num_blocks` blocks hold exactly `len` elements of `bit_width` bits. A bit width of
/// `W` stands for the dense layout.
pub(crate) fn check_shape<B: Block>(
    bit_width: usize,
    len: usize,
    num_blocks: usize,
) -> Result<()> {
    let expected = match bit_width {
        0 => return Err(FlexError::InvalidHeader("bit width must not be zero")),
        w if w == B::WIDTH => Some(len),
        w if w < B::WIDTH => layout::packed_block_count::<B>(len, w),
        _ => {
            return Err(FlexError::InvalidHeader(
                "bit width exceeds the block width",
            ))
        }
    };
    if expected != Some(num_blocks) {
        return Err(FlexError::InvalidHeader(
            "block count does not match the length and bit width",
        ));
    }
    Ok(())
}

/// Read access to a vector of integers, implemented by the owning [`FlexibleIndexVector`] and the
/// borrowed [`FlexibleIndexView`].
pub trait IndexRead<B: Block> {
    /// Number of elements
    fn len(&self) -> usize;

    /// Whether the vector holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bits per stored element
    fn bit_width(&self) -> usize;

    /// Return the element at `pos`, or `None` if `pos` is out of bounds.
    fn get(&self, pos: usize) -> Option<B> {
        if pos < self.len() {
            Some(self.get_unchecked(pos))
        } else {
            None
        }
    }

    /// Return the element at `pos` without checking it against the length. A position past the
    /// stored blocks panics; a position past the length but inside the last block returns
    /// padding.
    fn get_unchecked(&self, pos: usize) -> B;
}

/// A vector of unsigned integers of type `B`, stored either densely (one element per block) or
/// bit-packed with the smallest width that holds the largest element.
///
/// # Example
/// ```rust
/// use flex_bits::FlexibleIndexVector;
///
/// let mut vec = FlexibleIndexVector::<u64>::new();
/// for v in [1, 3, 2, 4] {
///     vec.push_back(v).unwrap();
/// }
/// assert_eq!(vec.bit_width(), 64);
///
/// vec.compress();
/// assert!(vec.is_compressed());
/// assert_eq!(vec.bit_width(), 3);
/// assert_eq!(vec.get(3), Some(4));
/// assert!(vec.push_back(5).is_err());
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "VectorParts<B>",
        into = "VectorParts<B>",
        bound(
            serialize = "B: Block + serde::Serialize",
            deserialize = "B: Block + serde::Deserialize<'de>"
        )
    )
)]
pub struct FlexibleIndexVector<B = u64> {
    layout: Layout<B>,
    len: usize,
}

impl<B: Block> FlexibleIndexVector<B> {
    /// Create an empty, uncompressed vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layout: Layout::default(),
            len: 0,
        }
    }

    /// Create an uncompressed vector of `len` zeros.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            layout: Layout::Dense(BlockStore::filled(len, B::zero())),
            len,
        }
    }

    /// Append an element.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed.
    pub fn push_back(&mut self, value: B) -> Result<()> {
        self.layout.dense_mut()?.push(value);
        self.len += 1;
        Ok(())
    }

    /// Resize the vector to `len` elements, appending zeros or dropping elements at the end.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        self.resize_with_value(len, B::zero())
    }

    /// Resize the vector to `len` elements, appending copies of `value` or dropping elements at
    /// the end.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed.
    pub fn resize_with_value(&mut self, len: usize, value: B) -> Result<()> {
        self.layout.dense_mut()?.resize(len, value);
        self.len = len;
        Ok(())
    }

    /// Remove every element.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed.
    pub fn clear(&mut self) -> Result<()> {
        self.layout.dense_mut()?.clear();
        self.len = 0;
        Ok(())
    }

    /// Overwrite the element at `pos`.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed, and
    /// [`FlexError::OutOfRange`] if `pos` is not less than the length.
    pub fn set(&mut self, pos: usize, value: B) -> Result<()> {
        let len = self.len;
        let blocks = self.layout.dense_mut()?;
        if pos >= len {
            return Err(FlexError::OutOfRange { index: pos, len });
        }
        blocks.as_mut_slice()[pos] = value;
        Ok(())
    }

    /// Return the element at `pos`, or `None` if `pos` is out of bounds.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<B> {
        if pos < self.len {
            Some(self.get_unchecked(pos))
        } else {
            None
        }
    }

    /// Return the element at `pos`.
    ///
    /// # Errors
    /// Returns [`FlexError::OutOfRange`] if `pos` is not less than the length.
    pub fn at(&self, pos: usize) -> Result<B> {
        self.get(pos).ok_or(FlexError::OutOfRange {
            index: pos,
            len: self.len,
        })
    }

    /// Return the element at `pos` without checking it against the length.
    /// A position past the stored blocks panics; inside the last packed block it returns
    /// padding.
    #[must_use]
    pub fn get_unchecked(&self, pos: usize) -> B {
        match &self.layout {
            Layout::Dense(blocks) => blocks.as_slice()[pos],
            Layout::Packed { bit_width, blocks } => {
                packing::read_packed(blocks.as_slice(), pos * bit_width, *bit_width)
            }
        }
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the vector has been bit-packed
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.layout.is_packed()
    }

    /// Bits per stored element. An uncompressed vector stores one element per block and reports
    /// the block width.
    #[must_use]
    pub fn bit_width(&self) -> usize {
        match &self.layout {
            Layout::Dense(_) => B::WIDTH,
            Layout::Packed { bit_width, .. } => *bit_width,
        }
    }

    /// `floor(log2(bit_width))`
    #[must_use]
    pub fn bit_width_log2(&self) -> usize {
        self.bit_width().ilog2() as usize
    }

    /// Number of elements that fit into a block entirely
    #[must_use]
    pub fn elements_per_block(&self) -> usize {
        B::WIDTH / self.bit_width()
    }

    /// The minimal number of bits needed to represent the largest element. A vector of zeros, or
    /// an empty one, needs one bit.
    #[must_use]
    pub fn determine_bit_width(&self) -> usize {
        match &self.layout {
            Layout::Dense(blocks) => blocks
                .as_slice()
                .iter()
                .fold(B::zero(), |max, &v| max.max(v))
                .bits_needed(),
            Layout::Packed { bit_width, .. } => *bit_width,
        }
    }

    /// Bit-pack the vector with the width returned by [`determine_bit_width`]. Does nothing if the
    /// vector is already compressed, holds at most one element, or needs the full block width.
    /// Afterwards the vector can no longer be modified.
    ///
    /// [`determine_bit_width`]: Self::determine_bit_width
    pub fn compress(&mut self) {
        if self.len <= 1 {
            return;
        }
        let bit_width = self.determine_bit_width();
        let Layout::Dense(values) = &mut self.layout else {
            return;
        };
        if bit_width >= B::WIDTH {
            return;
        }

        let mut blocks = mem::take(values);
        let dense_blocks = blocks.len();
        packing::pack_in_place(&mut blocks, bit_width, |value| value);
        log::debug!(
            "compressed index vector of {} elements to {} bits each, {} -> {} blocks",
            self.len,
            bit_width,
            dense_blocks,
            blocks.len()
        );
        self.layout = Layout::Packed { bit_width, blocks };
    }

    /// Returns an iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> IndexIter<'_, B, Self> {
        IndexIter::new(self)
    }

    /// The stored blocks, one element per block if the vector is uncompressed.
    #[must_use]
    pub fn blocks(&self) -> &[B] {
        self.layout.blocks().as_slice()
    }

    /// Returns the number of bytes on the heap for this vector. Does not include allocated memory
    /// that isn't used.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.layout.blocks().heap_size()
    }

    fn header(&self) -> IndexHeader {
        IndexHeader::new::<B>(self.bit_width(), self.len, self.blocks().len())
    }

    /// Encode the vector into its binary layout.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        layout::encode(&self.header(), self.blocks())
    }

    /// Write the binary layout of the vector into `writer`, returning the number of bytes written.
    ///
    /// # Errors
    /// Propagates errors of the writer.
    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<usize> {
        layout::write_encoded(writer, &self.header(), self.blocks())
    }

    /// Decode a vector from its binary layout, copying the blocks.
    ///
    /// # Errors
    /// Returns an error if the buffer is too short or holds an invalid header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        FlexibleIndexView::from_bytes(bytes).map(|view| view.to_vector())
    }

    /// Borrow the vector as a [`FlexibleIndexView`].
    #[must_use]
    pub fn as_view(&self) -> FlexibleIndexView<'_, B> {
        FlexibleIndexView::from_slice(self.bit_width(), self.len, self.blocks())
    }

    pub(crate) fn from_parts(layout: Layout<B>, len: usize) -> Self {
        Self { layout, len }
    }
}

#[cfg(feature = "serde")]
impl<B: Block> From<FlexibleIndexVector<B>> for VectorParts<B> {
    fn from(vec: FlexibleIndexVector<B>) -> Self {
        Self {
            layout: vec.layout,
            len: vec.len,
        }
    }
}

#[cfg(feature = "serde")]
impl<B: Block> TryFrom<VectorParts<B>> for FlexibleIndexVector<B> {
    type Error = FlexError;

    fn try_from(parts: VectorParts<B>) -> Result<Self> {
        let bit_width = match &parts.layout {
            Layout::Dense(_) => B::WIDTH,
            Layout::Packed { bit_width, .. } if *bit_width < B::WIDTH => *bit_width,
            Layout::Packed { .. } => {
                return Err(FlexError::InvalidHeader(
                    "packed bit width must be below the block width",
                ))
            }
        };
        check_shape::<B>(bit_width, parts.len, parts.layout.blocks().len())?;
        Ok(Self::from_parts(parts.layout, parts.len))
    }
}

impl<B: Block> IndexRead<B> for FlexibleIndexVector<B> {
    fn len(&self) -> usize {
        self.len
    }

    fn bit_width(&self) -> usize {
        FlexibleIndexVector::bit_width(self)
    }

    fn get_unchecked(&self, pos: usize) -> B {
        FlexibleIndexVector::get_unchecked(self, pos)
    }
}

impl<B: Block> Default for FlexibleIndexVector<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two vectors are equal if they hold the same elements, whether compressed or not.
impl<B: Block> PartialEq for FlexibleIndexVector<B> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<B: Block> Eq for FlexibleIndexVector<B> {}

impl<B: Block> From<Vec<B>> for FlexibleIndexVector<B> {
    fn from(values: Vec<B>) -> Self {
        let len = values.len();
        Self::from_parts(Layout::Dense(BlockStore::from_vec(values)), len)
    }
}

impl<B: Block> From<&[B]> for FlexibleIndexVector<B> {
    fn from(values: &[B]) -> Self {
        Self::from(values.to_vec())
    }
}

impl<B: Block> FromIterator<B> for FlexibleIndexVector<B> {
    fn from_iter<T: IntoIterator<Item = B>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, B: Block> IntoIterator for &'a FlexibleIndexVector<B> {
    type Item = B;
    type IntoIter = IndexIter<'a, B, FlexibleIndexVector<B>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
