//! Binary layout of the containers.
//!
//! Every container encodes to a small fixed-size `#[repr(C)]` header followed directly by its
//! block array. The encoding holds no pointers and uses native endianness, so a buffer can be
//! memory-mapped or copied as opaque bytes and read in place by the borrowed views
//! ([`BitsetView`], [`FlexibleIndexView`], [`FlexibleDeltaIndexView`]).
//!
//! Views read their blocks with unaligned loads, so the buffer does not need any particular
//! alignment.
//!
//! [`BitsetView`]: crate::bitset::BitsetView
//! [`FlexibleIndexView`]: crate::int_vec::FlexibleIndexView
//! [`FlexibleDeltaIndexView`]: crate::delta_vec::FlexibleDeltaIndexView

use std::io::Write;
use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

use crate::block::{Block, BlockSource};
use crate::error::{FlexError, Result};

/// Header of an encoded [`DynamicBitset`] or [`DualBitset`].
///
/// [`DynamicBitset`]: crate::DynamicBitset
/// [`DualBitset`]: crate::DualBitset
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BitsetHeader {
    /// Width of a block in bits
    pub block_bits: u8,
    /// Value of every position beyond the stored blocks (0 or 1)
    pub default_bit_value: u8,
    /// Always zero
    pub reserved: [u8; 6],
    /// Number of blocks following the header
    pub num_blocks: u64,
}

impl BitsetHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = size_of::<Self>();

    /// Create the header of a bitset with the given default bit over `num_blocks` blocks of `B`.
    #[must_use]
    pub fn new<B: Block>(default_bit_value: bool, num_blocks: usize) -> Self {
        Self {
            block_bits: B::WIDTH as u8,
            default_bit_value: u8::from(default_bit_value),
            reserved: [0; 6],
            num_blocks: num_blocks as u64,
        }
    }

    /// Parse and validate a header from the front of `bytes`, returning the header and the
    /// block array that follows it.
    pub(crate) fn parse<B: Block>(bytes: &[u8]) -> Result<(Self, ByteBlocks<'_, B>)> {
        let header: Self = read_header(bytes)?;
        check_block_bits::<B>(header.block_bits)?;
        if header.default_bit_value > 1 {
            return Err(FlexError::InvalidHeader("default bit value must be 0 or 1"));
        }
        if header.reserved != [0; 6] {
            return Err(FlexError::InvalidHeader("reserved bytes must be zero"));
        }
        let blocks = ByteBlocks::split(bytes, Self::SIZE, header.num_blocks)?;
        log::trace!(
            "decoded bitset header: {} blocks of {} bits, default {}",
            header.num_blocks,
            header.block_bits,
            header.default_bit_value
        );
        Ok((header, blocks))
    }
}

/// Header of an encoded [`FlexibleIndexVector`] or [`FlexibleDeltaIndexVector`].
///
/// `bit_width_log2` and `elements_per_block_log2` are floor logarithms. For the plain index
/// vector the bit width need not be a power of two, so `elements_per_block` is then the number of
/// elements that fit into a block entirely, and elements may straddle block boundaries.
///
/// [`FlexibleIndexVector`]: crate::FlexibleIndexVector
/// [`FlexibleDeltaIndexVector`]: crate::FlexibleDeltaIndexVector
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct IndexHeader {
    /// Width of a block in bits
    pub block_bits: u8,
    /// Bits per stored element
    pub bit_width: u8,
    /// `floor(log2(bit_width))`, 0 if the bit width is 0
    pub bit_width_log2: u8,
    /// Number of whole elements per block
    pub elements_per_block: u8,
    /// `floor(log2(elements_per_block))`
    pub elements_per_block_log2: u8,
    /// Always zero
    pub reserved: [u8; 3],
    /// Number of logical elements
    pub size: u64,
    /// Number of blocks following the header
    pub num_blocks: u64,
}

impl IndexHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = size_of::<Self>();

    /// Create the header of an index vector with blocks of type `B`.
    #[must_use]
    pub fn new<B: Block>(bit_width: usize, size: usize, num_blocks: usize) -> Self {
        let elements_per_block = if bit_width == 0 {
            1
        } else {
            B::WIDTH / bit_width
        };
        Self {
            block_bits: B::WIDTH as u8,
            bit_width: bit_width as u8,
            bit_width_log2: if bit_width == 0 {
                0
            } else {
                bit_width.ilog2() as u8
            },
            elements_per_block: elements_per_block as u8,
            elements_per_block_log2: elements_per_block.ilog2() as u8,
            reserved: [0; 3],
            size: size as u64,
            num_blocks: num_blocks as u64,
        }
    }

    /// Parse a header from the front of `bytes` and check the fields that do not depend on the
    /// vector variant, returning the header and the block array that follows it.
    pub(crate) fn parse<B: Block>(bytes: &[u8]) -> Result<(Self, ByteBlocks<'_, B>)> {
        let header: Self = read_header(bytes)?;
        check_block_bits::<B>(header.block_bits)?;
        if header.reserved != [0; 3] {
            return Err(FlexError::InvalidHeader("reserved bytes must be zero"));
        }
        if header.bit_width as usize > B::WIDTH {
            return Err(FlexError::InvalidHeader("bit width exceeds the block width"));
        }
        let size = usize::try_from(header.size)
            .map_err(|_| FlexError::InvalidHeader("size does not fit into usize"))?;
        let expected = IndexHeader::new::<B>(header.bit_width as usize, size, 0);
        if header.bit_width_log2 != expected.bit_width_log2
            || header.elements_per_block != expected.elements_per_block
            || header.elements_per_block_log2 != expected.elements_per_block_log2
        {
            return Err(FlexError::InvalidHeader(
                "derived width fields do not match the bit width",
            ));
        }
        let blocks = ByteBlocks::split(bytes, Self::SIZE, header.num_blocks)?;
        log::trace!(
            "decoded index header: {} elements of {} bits in {} blocks of {} bits",
            header.size,
            header.bit_width,
            header.num_blocks,
            header.block_bits
        );
        Ok((header, blocks))
    }

    /// Number of logical elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.size as usize
    }

    /// Whether the encoded vector is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Number of blocks needed to hold `len` elements of `bit_width` bits each, or `None` if the
/// bit count overflows.
#[inline]
pub(crate) fn packed_block_count<B: Block>(len: usize, bit_width: usize) -> Option<usize> {
    len.checked_mul(bit_width).map(|bits| bits.div_ceil(B::WIDTH))
}

fn read_header<H: Pod>(bytes: &[u8]) -> Result<H> {
    let size = size_of::<H>();
    if bytes.len() < size {
        return Err(FlexError::InsufficientBuffer {
            needed: size,
            available: bytes.len(),
        });
    }
    Ok(bytemuck::pod_read_unaligned(&bytes[..size]))
}

fn check_block_bits<B: Block>(block_bits: u8) -> Result<()> {
    if block_bits as usize != B::WIDTH {
        return Err(FlexError::InvalidHeader(
            "block width does not match the requested block type",
        ));
    }
    Ok(())
}

/// Write `header` followed by `blocks` into `writer`, returning the number of bytes written.
pub(crate) fn write_encoded<H: Pod, B: Block, W: Write>(
    mut writer: W,
    header: &H,
    blocks: &[B],
) -> std::io::Result<usize> {
    let header_bytes = bytemuck::bytes_of(header);
    let block_bytes: &[u8] = bytemuck::cast_slice(blocks);
    writer.write_all(header_bytes)?;
    writer.write_all(block_bytes)?;
    Ok(header_bytes.len() + block_bytes.len())
}

/// Encode `header` followed by `blocks` into a fresh buffer.
pub(crate) fn encode<H: Pod, B: Block>(header: &H, blocks: &[B]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(size_of::<H>() + blocks.len() * size_of::<B>());
    bytes.extend_from_slice(bytemuck::bytes_of(header));
    bytes.extend_from_slice(bytemuck::cast_slice(blocks));
    bytes
}

/// A block array borrowed from a byte buffer. Blocks are decoded on access with unaligned loads.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ByteBlocks<'a, B> {
    bytes: &'a [u8],
    phantom: PhantomData<B>,
}

impl<'a, B: Block> ByteBlocks<'a, B> {
    fn split(bytes: &'a [u8], offset: usize, num_blocks: u64) -> Result<Self> {
        let block_bytes = usize::try_from(num_blocks)
            .ok()
            .and_then(|n| n.checked_mul(size_of::<B>()))
            .ok_or(FlexError::InvalidHeader("block count overflows the address space"))?;
        let needed = offset
            .checked_add(block_bytes)
            .ok_or(FlexError::InvalidHeader("block count overflows the address space"))?;
        if bytes.len() < needed {
            return Err(FlexError::InsufficientBuffer {
                needed,
                available: bytes.len(),
            });
        }
        Ok(Self {
            bytes: &bytes[offset..needed],
            phantom: PhantomData,
        })
    }

    pub(crate) fn from_blocks(blocks: &'a [B]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(blocks),
            phantom: PhantomData,
        }
    }

    /// Number of bytes covered by the block array
    pub(crate) fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Copy the blocks into an owned vector.
    pub(crate) fn to_vec(&self) -> Vec<B> {
        self.bytes
            .chunks_exact(size_of::<B>())
            .map(bytemuck::pod_read_unaligned::<B>)
            .collect()
    }
}

impl<B: Block> BlockSource<B> for ByteBlocks<'_, B> {
    #[inline]
    fn block_count(&self) -> usize {
        self.bytes.len() / size_of::<B>()
    }

    #[inline]
    fn block(&self, i: usize) -> B {
        let start = i * size_of::<B>();
        bytemuck::pod_read_unaligned(&self.bytes[start..start + size_of::<B>()])
    }
}
