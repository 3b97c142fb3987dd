//! A vector of non-decreasing unsigned integers that is compressed by storing the differences of
//! consecutive elements.
//!
//! A [`FlexibleDeltaIndexVector`] is built like a [`FlexibleIndexVector`]. Once [`compress`] has
//! been called, it stores the first element followed by the difference of each element to its
//! predecessor, packed with a power-of-two bit width so that every block holds a whole number of
//! deltas. Decoding a compressed vector is sequential only.
//!
//! [`FlexibleIndexVector`]: crate::FlexibleIndexVector
//! [`compress`]: FlexibleDeltaIndexVector::compress

use std::io::Write;
use std::mem;

use crate::block::{Block, BlockStore};
use crate::error::{FlexError, Result};
use crate::int_vec::packing::pack_in_place;
#[cfg(feature = "serde")]
use crate::int_vec::VectorParts;
use crate::int_vec::Layout;
use crate::layout::{self, ByteBlocks, IndexHeader};

pub use iter::DeltaIter;
pub use view::FlexibleDeltaIndexView;

mod iter;
mod view;


/// Bit width needed to store the deltas of `values`, rounded up to a power of two.
///
/// # Errors
/// Returns [`FlexError::InvariantViolation`] with the first position whose value is smaller than
/// its predecessor.
fn delta_bit_width<B: Block>(values: &[B]) -> Result<usize> {
    let mut previous = B::zero();
    let mut max_delta = B::zero();
    for (position, &value) in values.iter().enumerate() {
        if value < previous {
            return Err(FlexError::InvariantViolation { position });
        }
        max_delta = max_delta.max(value - previous);
        previous = value;
    }
    Ok(max_delta.bits_needed().next_power_of_two())
}

/// A vector of non-decreasing unsigned integers of type `B` that can be delta-compressed.
///
/// # Example
/// ```rust
/// use flex_bits::FlexibleDeltaIndexVector;
///
/// let mut vec: FlexibleDeltaIndexVector = [1, 2, 4, 9, 16].into_iter().collect();
/// assert_eq!(vec.bit_width(), 0);
///
/// vec.compress().unwrap();
/// assert_eq!(vec.bit_width(), 4);
/// assert_eq!(vec.elements_per_block(), 16);
/// assert_eq!(vec.iter().collect::<Vec<_>>(), vec![1, 2, 4, 9, 16]);
/// assert!(vec.get(2).is_err());
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
pub struct FlexibleDeltaIndexVector<B = u64> {
    layout: Layout<B>,
    len: usize,
}

impl<B: Block> FlexibleDeltaIndexVector<B> {
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

    /// Append an element. Monotonicity is only checked by [`compress`].
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed.
    ///
    /// [`compress`]: Self::compress
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

    /// Return the element at `pos` of an uncompressed vector.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed, since it can only
    /// be decoded sequentially, and [`FlexError::OutOfRange`] if `pos` is not less than the
    /// length.
    pub fn get(&self, pos: usize) -> Result<B> {
        self.as_slice()?
            .get(pos)
            .copied()
            .ok_or(FlexError::OutOfRange {
                index: pos,
                len: self.len,
            })
    }

    /// The elements of an uncompressed vector.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is compressed.
    pub fn as_slice(&self) -> Result<&[B]> {
        match &self.layout {
            Layout::Dense(values) => Ok(values.as_slice()),
            Layout::Packed { .. } => Err(FlexError::PreconditionViolation(
                "a compressed delta vector can only be decoded sequentially",
            )),
        }
    }

    /// The packed deltas of a compressed vector.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the vector is not compressed.
    pub fn packed_blocks(&self) -> Result<&[B]> {
        match &self.layout {
            Layout::Packed { blocks, .. } => Ok(blocks.as_slice()),
            Layout::Dense(_) => Err(FlexError::PreconditionViolation(
                "the delta vector is not compressed",
            )),
        }
    }

    /// Decode every element into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<B> {
        self.iter().collect()
    }

    /// Returns an iterator over the elements. Works in both states.
    #[must_use]
    pub fn iter(&self) -> DeltaIter<'_, B> {
        DeltaIter::new(
            ByteBlocks::from_blocks(self.layout.blocks().as_slice()),
            self.bit_width(),
            self.len,
        )
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

    /// Whether the vector has been delta-compressed
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.layout.is_packed()
    }

    /// Bits per packed delta, or 0 if the vector is not compressed.
    #[must_use]
    pub fn bit_width(&self) -> usize {
        match &self.layout {
            Layout::Dense(_) => 0,
            Layout::Packed { bit_width, .. } => *bit_width,
        }
    }

    /// `log2(bit_width)`, 0 if the vector is not compressed
    #[must_use]
    pub fn bit_width_log2(&self) -> usize {
        match self.bit_width() {
            0 => 0,
            width => width.trailing_zeros() as usize,
        }
    }

    /// Number of deltas per block, 1 if the vector is not compressed.
    #[must_use]
    pub fn elements_per_block(&self) -> usize {
        if self.is_compressed() {
            B::WIDTH >> self.bit_width_log2()
        } else {
            1
        }
    }

    /// Bit width [`compress`] would choose: the bits needed for the largest difference between
    /// consecutive elements, rounded up to a power of two. The first element is its own delta.
    ///
    /// # Errors
    /// Returns [`FlexError::InvariantViolation`] if the elements are not non-decreasing.
    ///
    /// [`compress`]: Self::compress
    pub fn determine_bit_width(&self) -> Result<usize> {
        match &self.layout {
            Layout::Dense(values) => delta_bit_width(values.as_slice()),
            Layout::Packed { bit_width, .. } => Ok(*bit_width),
        }
    }

    /// Replace the elements by their deltas, packed with the width returned by
    /// [`determine_bit_width`]. Does nothing if the vector is already compressed.
    /// Afterwards the vector can no longer be modified.
    ///
    /// # Errors
    /// Returns [`FlexError::InvariantViolation`] if the elements are not non-decreasing. The vector
    /// is left unchanged in that case.
    ///
    /// [`determine_bit_width`]: Self::determine_bit_width
    pub fn compress(&mut self) -> Result<()> {
        let Layout::Dense(values) = &mut self.layout else {
            return Ok(());
        };
        let bit_width = delta_bit_width(values.as_slice())?;

        let mut blocks = mem::take(values);
        let dense_blocks = blocks.len();
        let mut previous = B::zero();
        pack_in_place(&mut blocks, bit_width, |value| {
            let delta = value - previous;
            previous = value;
            delta
        });
        log::debug!(
            "delta compressed vector of {} elements to {} bits per delta, {} -> {} blocks",
            self.len,
            bit_width,
            dense_blocks,
            blocks.len()
        );
        self.layout = Layout::Packed { bit_width, blocks };
        Ok(())
    }

    /// Returns the number of bytes on the heap for this vector. Does not include allocated memory
    /// that isn't used.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.layout.blocks().heap_size()
    }

    fn header(&self) -> IndexHeader {
        IndexHeader::new::<B>(self.bit_width(), self.len, self.layout.blocks().len())
    }

    /// Encode the vector into its binary layout.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        layout::encode(&self.header(), self.layout.blocks().as_slice())
    }

    /// Write the binary layout of the vector into `writer`, returning the number of bytes written.
    ///
    /// # Errors
    /// Propagates errors of the writer.
    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<usize> {
        layout::write_encoded(writer, &self.header(), self.layout.blocks().as_slice())
    }

    /// Decode a vector from its binary layout, copying the blocks.
    ///
    /// # Errors
    /// Returns an error if the buffer is too short or holds an invalid header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        FlexibleDeltaIndexView::from_bytes(bytes).map(|view| view.to_vector())
    }

    /// Borrow the vector as a [`FlexibleDeltaIndexView`].
    #[must_use]
    pub fn as_view(&self) -> FlexibleDeltaIndexView<'_, B> {
        FlexibleDeltaIndexView::from_slice(
            self.bit_width(),
            self.len,
            self.layout.blocks().as_slice(),
        )
    }

    pub(crate) fn from_parts(layout: Layout<B>, len: usize) -> Self {
        Self { layout, len }
    }
}

#[cfg(feature = "serde")]
impl<B: Block> From<FlexibleDeltaIndexVector<B>> for VectorParts<B> {
    fn from(vec: FlexibleDeltaIndexVector<B>) -> Self {
        Self {
            layout: vec.layout,
            len: vec.len,
        }
    }
}

#[cfg(feature = "serde")]
impl<B: Block> TryFrom<VectorParts<B>> for FlexibleDeltaIndexVector<B> {
    type Error = FlexError;

    fn try_from(parts: VectorParts<B>) -> Result<Self> {
        let bit_width = match &parts.layout {
            Layout::Dense(_) => 0,
            Layout::Packed { bit_width: 0, .. } => {
                return Err(FlexError::InvalidHeader("bit width must not be zero"))
            }
            Layout::Packed { bit_width, .. } => *bit_width,
        };
        check_shape::<B>(bit_width, parts.len, parts.layout.blocks().len())?;
        Ok(Self::from_parts(parts.layout, parts.len))
    }
}

/// Check that `num_blocks` blocks hold exactly `len` deltas of `bit_width` bits. A bit width of 0
/// stands for the dense layout.
pub(crate) fn check_shape<B: Block>(
    bit_width: usize,
    len: usize,
    num_blocks: usize,
) -> Result<()> {
    let expected = if bit_width == 0 {
        Some(len)
    } else if bit_width.is_power_of_two() && bit_width <= B::WIDTH {
        layout::packed_block_count::<B>(len, bit_width)
    } else {
        return Err(FlexError::InvalidHeader(
            "delta bit width must be a power of two no larger than the block width",
        ));
    };
    if expected != Some(num_blocks) {
        return Err(FlexError::InvalidHeader(
            "block count does not match the length and bit width",
        ));
    }
    Ok(())
}

impl<B: Block> Default for FlexibleDeltaIndexVector<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two vectors are equal if they hold the same elements, whether compressed or not.
impl<B: Block> PartialEq for FlexibleDeltaIndexVector<B> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<B: Block> Eq for FlexibleDeltaIndexVector<B> {}

impl<B: Block> From<Vec<B>> for FlexibleDeltaIndexVector<B> {
    fn from(values: Vec<B>) -> Self {
        let len = values.len();
        Self::from_parts(Layout::Dense(BlockStore::from_vec(values)), len)
    }
}

impl<B: Block> From<&[B]> for FlexibleDeltaIndexVector<B> {
    fn from(values: &[B]) -> Self {
        Self::from(values.to_vec())
    }
}

impl<B: Block> FromIterator<B> for FlexibleDeltaIndexVector<B> {
    fn from_iter<T: IntoIterator<Item = B>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, B: Block> IntoIterator for &'a FlexibleDeltaIndexVector<B> {
    type Item = B;
    type IntoIter = DeltaIter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
