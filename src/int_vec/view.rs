use super::packing::read_element;
use super::{check_shape, FlexibleIndexVector, IndexIter, IndexRead, Layout};
use crate::block::{Block, BlockStore};
use crate::error::{FlexError, Result};
use crate::layout::{ByteBlocks, IndexHeader};

/// A read-only [`FlexibleIndexVector`] borrowed from a byte buffer in the layout written by
/// [`FlexibleIndexVector::to_bytes`]. Elements are decoded straight from the buffer, which need
/// not be aligned.
///
/// # Example
/// ```rust
/// use flex_bits::{FlexibleIndexVector, FlexibleIndexView};
///
/// let mut vec: FlexibleIndexVector<u16> = [7, 0, 5, 6].into_iter().collect();
/// vec.compress();
/// let bytes = vec.to_bytes();
///
/// let view = FlexibleIndexView::<u16>::from_bytes(&bytes).unwrap();
/// assert_eq!(view.bit_width(), 3);
/// assert_eq!(view.get(2), Some(5));
/// assert_eq!(view.iter().collect::<Vec<_>>(), vec![7, 0, 5, 6]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FlexibleIndexView<'a, B = u64> {
    bit_width: usize,
    len: usize,
    blocks: ByteBlocks<'a, B>,
}

impl<'a, B: Block> FlexibleIndexView<'a, B> {
    /// Decode the header at the front of `bytes` and borrow the block array following it.
    ///
    /// # Errors
    /// Returns an error if the buffer is too short, the header is malformed or was written with
    /// another block width, or the block count does not match the length and bit width.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let (header, blocks) = IndexHeader::parse::<B>(bytes)?;
        let bit_width = header.bit_width as usize;
        check_shape::<B>(bit_width, header.len(), header.num_blocks as usize)?;

        Ok(Self {
            bit_width,
            len: header.len(),
            blocks,
        })
    }

    pub(crate) fn from_slice(bit_width: usize, len: usize, blocks: &'a [B]) -> Self {
        Self {
            bit_width,
            len,
            blocks: ByteBlocks::from_blocks(blocks),
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

    /// Bits per stored element, the block width if the vector is uncompressed
    #[must_use]
    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Whether the viewed vector is bit-packed
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.bit_width < B::WIDTH
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
    #[must_use]
    pub fn get_unchecked(&self, pos: usize) -> B {
        read_element(&self.blocks, pos, self.bit_width)
    }

    /// Returns an iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> IndexIter<'_, B, Self> {
        IndexIter::new(self)
    }

    /// Number of bytes of the encoding, header included.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        IndexHeader::SIZE + self.blocks.byte_len()
    }

    /// Copy the viewed vector into an owning [`FlexibleIndexVector`], keeping its state.
    #[must_use]
    pub fn to_vector(&self) -> FlexibleIndexVector<B> {
        let blocks = BlockStore::from_vec(self.blocks.to_vec());
        let layout = if self.is_compressed() {
            Layout::Packed {
                bit_width: self.bit_width,
                blocks,
            }
        } else {
            Layout::Dense(blocks)
        };
        FlexibleIndexVector::from_parts(layout, self.len)
    }
}

impl<B: Block> IndexRead<B> for FlexibleIndexView<'_, B> {
    fn len(&self) -> usize {
        self.len
    }

    fn bit_width(&self) -> usize {
        self.bit_width
    }

    fn get_unchecked(&self, pos: usize) -> B {
        FlexibleIndexView::get_unchecked(self, pos)
    }
}
