use super::{get_bit, next_set_bit_in, BitRead, DualBitset};
use crate::block::{Block, BlockSource, BlockStore};
use crate::error::{FlexError, Result};
use crate::layout::{BitsetHeader, ByteBlocks};

/// A read-only bitset borrowed from a byte buffer in the layout written by
/// [`DualBitset::to_bytes`] or [`DynamicBitset::to_bytes`]. Nothing is copied; blocks are
/// decoded on access, so the buffer may be memory-mapped and need not be aligned.
///
/// # Example
/// ```rust
/// use flex_bits::{BitRead, BitsetView, DynamicBitset};
///
/// let bits: DynamicBitset<u32> = [1, 40, 77].into_iter().collect();
/// let bytes = bits.to_bytes();
///
/// let view = BitsetView::<u32>::from_bytes(&bytes).unwrap();
/// assert!(view.get(40));
/// assert!(!view.get(41));
/// assert_eq!(view.next_set_bit(41), Some(77));
/// assert_eq!(view.byte_len(), bytes.len());
/// ```
///
/// [`DynamicBitset::to_bytes`]: crate::DynamicBitset::to_bytes
#[derive(Clone, Copy, Debug)]
pub struct BitsetView<'a, B = u64> {
    default_bit_value: bool,
    blocks: ByteBlocks<'a, B>,
}

impl<'a, B: Block> BitsetView<'a, B> {
    /// Decode the header at the front of `bytes` and borrow the block array following it.
    ///
    /// # Errors
    /// Returns an error if the buffer is too short or the header is malformed or was written with
    /// another block width.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let (header, blocks) = BitsetHeader::parse::<B>(bytes)?;
        Ok(Self {
            default_bit_value: header.default_bit_value == 1,
            blocks,
        })
    }

    pub(crate) fn from_slice(default_bit_value: bool, blocks: &'a [B]) -> Self {
        Self {
            default_bit_value,
            blocks: ByteBlocks::from_blocks(blocks),
        }
    }

    /// The value of every position beyond the stored blocks.
    #[must_use]
    pub fn default_bit_value(&self) -> bool {
        self.default_bit_value
    }

    /// Return the bit at `pos`. Positions beyond the stored blocks return the default bit.
    #[must_use]
    pub fn get(&self, pos: usize) -> bool {
        get_bit(&self.blocks, self.default_bit_value, pos)
    }

    /// Return the smallest set position that is at least `pos` among the stored blocks.
    #[must_use]
    pub fn next_set_bit(&self, pos: usize) -> Option<usize> {
        next_set_bit_in(&self.blocks, pos)
    }

    /// Number of stored blocks
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.block_count()
    }

    /// Number of bytes of the encoding, header included.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        BitsetHeader::SIZE + self.blocks.byte_len()
    }

    /// Number of set positions.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the default bit is set.
    pub fn count(&self) -> Result<usize> {
        self.check_finite()?;
        Ok((0..self.num_blocks())
            .map(|i| self.blocks.block(i).count_ones() as usize)
            .sum())
    }

    /// Iterate over the set positions in ascending order.
    ///
    /// # Errors
    /// Returns [`FlexError::PreconditionViolation`] if the default bit is set.
    pub fn iter(&self) -> Result<impl Iterator<Item = usize> + 'a> {
        self.check_finite()?;
        let blocks = self.blocks;
        Ok(std::iter::successors(
            next_set_bit_in(&blocks, 0),
            move |&pos| next_set_bit_in(&blocks, pos + 1),
        ))
    }

    fn check_finite(&self) -> Result<()> {
        if self.default_bit_value {
            return Err(FlexError::PreconditionViolation(
                "cannot enumerate the members of a co-finite bitset",
            ));
        }
        Ok(())
    }

    /// Copy the viewed bitset into an owning [`DualBitset`].
    #[must_use]
    pub fn to_bitset(&self) -> DualBitset<B> {
        DualBitset::from_parts(
            self.default_bit_value,
            BlockStore::from_vec(self.blocks.to_vec()),
        )
    }
}

impl<B: Block> BitRead for BitsetView<'_, B> {
    fn default_bit_value(&self) -> bool {
        self.default_bit_value
    }

    fn get(&self, pos: usize) -> bool {
        BitsetView::get(self, pos)
    }

    fn next_set_bit(&self, pos: usize) -> Option<usize> {
        BitsetView::next_set_bit(self, pos)
    }

    fn num_blocks(&self) -> usize {
        BitsetView::num_blocks(self)
    }
}
