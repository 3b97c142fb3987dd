use super::{check_shape, DeltaIter, FlexibleDeltaIndexVector};
use crate::block::{Block, BlockStore};
use crate::error::Result;
use crate::int_vec::Layout;
use crate::layout::{ByteBlocks, IndexHeader};

/// A read-only [`FlexibleDeltaIndexVector`] borrowed from a byte buffer in the layout written by
/// [`FlexibleDeltaIndexVector::to_bytes`]. The buffer need not be aligned.
///
/// # Example
/// ```rust
/// use flex_bits::{FlexibleDeltaIndexVector, FlexibleDeltaIndexView};
///
/// let mut vec: FlexibleDeltaIndexVector<u32> = (0..100).map(|i| i * 3).collect();
/// vec.compress().unwrap();
/// let bytes = vec.to_bytes();
///
/// let view = FlexibleDeltaIndexView::<u32>::from_bytes(&bytes).unwrap();
/// assert_eq!(view.bit_width(), 2);
/// assert_eq!(view.iter().nth(10), Some(30));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FlexibleDeltaIndexView<'a, B = u64> {
    bit_width: usize,
    len: usize,
    blocks: ByteBlocks<'a, B>,
}

impl<'a, B: Block> FlexibleDeltaIndexView<'a, B> {
    /// Decode the header at the front of `bytes` and borrow the block array following it.
    ///
    /// # Errors
    /// Returns an error if the buffer is too short, the header is malformed or was written with
    /// another block width, the bit width is not a power of two, or the block count does not
    /// match the length and bit width.
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

    /// Bits per packed delta, or 0 if the vector is not compressed
    #[must_use]
    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Whether the viewed vector is delta-compressed
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.bit_width != 0
    }

    /// Returns an iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> DeltaIter<'a, B> {
        DeltaIter::new(self.blocks, self.bit_width, self.len)
    }

    /// Number of bytes of the encoding, header included.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        IndexHeader::SIZE + self.blocks.byte_len()
    }

    /// Copy the viewed vector into an owning [`FlexibleDeltaIndexVector`], keeping its state.
    #[must_use]
    pub fn to_vector(&self) -> FlexibleDeltaIndexVector<B> {
        let blocks = BlockStore::from_vec(self.blocks.to_vec());
        let layout = if self.is_compressed() {
            Layout::Packed {
                bit_width: self.bit_width,
                blocks,
            }
        } else {
            Layout::Dense(blocks)
        };
        FlexibleDeltaIndexVector::from_parts(layout, self.len)
    }
}
