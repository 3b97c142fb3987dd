//! Fixed-width blocks and the growable block store backing every container.

use std::fmt::Debug;
use std::hash::Hash;
use std::mem::size_of;
use std::ops::{BitAndAssign, BitOrAssign};

use num::traits::{AsPrimitive, WrappingAdd};
use num::{PrimInt, Unsigned};

/// Trait representing an unsigned integer type used as a block of bits, which allows all
/// containers in this crate to be generic over the block width (8, 16, 32 or 64 bits).
///
/// Positions are split into a block index and an in-block offset with shifts and masks, which
/// is why the width must be a power of two.
pub trait Block:
    PrimInt
    + Unsigned
    + BitAndAssign
    + BitOrAssign
    + WrappingAdd
    + AsPrimitive<u64>
    + bytemuck::Pod
    + Default
    + Debug
    + Hash
    + Send
    + Sync
{
    /// Number of bits in a block
    const WIDTH: usize;

    /// `log2(WIDTH)`, used for shift-based indexing
    const LOG2_WIDTH: usize = Self::WIDTH.trailing_zeros() as usize;

    /// Block index of the block containing the bit at `pos`
    #[inline]
    #[must_use]
    fn index(pos: usize) -> usize {
        pos >> Self::LOG2_WIDTH
    }

    /// Bit offset of `pos` within its block
    #[inline]
    #[must_use]
    fn offset(pos: usize) -> usize {
        pos & (Self::WIDTH - 1)
    }

    /// Block with every bit set
    #[inline]
    #[must_use]
    fn ones() -> Self {
        Self::max_value()
    }

    /// The block every position of which reads `bit`.
    #[inline]
    #[must_use]
    fn pattern(bit: bool) -> Self {
        if bit {
            Self::ones()
        } else {
            Self::zero()
        }
    }

    /// Block with the `n` least significant bits set. `n` must not exceed `WIDTH`.
    #[inline]
    #[must_use]
    fn low_mask(n: usize) -> Self {
        debug_assert!(n <= Self::WIDTH);
        if n >= Self::WIDTH {
            Self::ones()
        } else {
            (Self::one() << n) - Self::one()
        }
    }

    /// Number of bits needed to represent this value. Zero still needs one bit.
    #[inline]
    #[must_use]
    fn bits_needed(self) -> usize {
        (Self::WIDTH - self.leading_zeros() as usize).max(1)
    }

    /// Widen the block to a `u64`
    #[inline]
    #[must_use]
    fn as_u64(self) -> u64 {
        self.as_()
    }
}

impl Block for u8 {
    const WIDTH: usize = 8;
}

impl Block for u16 {
    const WIDTH: usize = 16;
}

impl Block for u32 {
    const WIDTH: usize = 32;
}

impl Block for u64 {
    const WIDTH: usize = 64;
}

/// Read access to a sequence of blocks. Implemented by plain slices and by byte buffers that are
/// decoded in place, so the packed decoders can run on both without copying.
pub(crate) trait BlockSource<B: Block> {
    fn block_count(&self) -> usize;

    /// Return the block at index `i`. Panics if `i` is out of bounds.
    fn block(&self, i: usize) -> B;
}

impl<B: Block> BlockSource<B> for [B] {
    #[inline]
    fn block_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn block(&self, i: usize) -> B {
        self[i]
    }
}

/// A growable sequence of blocks. It is the low-level storage shared by all containers of the
/// crate and is never shared between two container instances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockStore<B> {
    blocks: Vec<B>,
}

impl<B: Block> BlockStore<B> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Create a store of `len` blocks, all equal to `fill`.
    #[must_use]
    pub fn filled(len: usize, fill: B) -> Self {
        Self {
            blocks: vec![fill; len],
        }
    }

    pub(crate) fn from_vec(blocks: Vec<B>) -> Self {
        Self { blocks }
    }

    /// Number of blocks
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the store holds no blocks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The stored blocks
    #[must_use]
    pub fn as_slice(&self) -> &[B] {
        &self.blocks
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [B] {
        &mut self.blocks
    }

    /// The stored blocks reinterpreted as native-endian bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// Return the block at `i`, or `fill` if `i` is past the end.
    #[inline]
    #[must_use]
    pub fn block_or(&self, i: usize, fill: B) -> B {
        self.blocks.get(i).copied().unwrap_or(fill)
    }

    /// Append a block.
    pub fn push(&mut self, block: B) {
        self.blocks.push(block);
    }

    /// Grow the store to at least `len` blocks, padding with `fill`. Never shrinks.
    pub fn grow_to(&mut self, len: usize, fill: B) {
        if len > self.blocks.len() {
            self.blocks.resize(len, fill);
        }
    }

    /// Set the length of the store, padding with `fill` or dropping blocks at the end.
    pub fn resize(&mut self, len: usize, fill: B) {
        self.blocks.resize(len, fill);
    }

    /// Drop every block past the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.blocks.truncate(len);
    }

    /// Drop all blocks.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Drop trailing blocks that are equal to `fill`, then release unused capacity.
    pub fn trim_trailing(&mut self, fill: B) {
        let keep = self
            .blocks
            .iter()
            .rposition(|&b| b != fill)
            .map_or(0, |last| last + 1);
        self.blocks.truncate(keep);
        self.blocks.shrink_to_fit();
    }

    /// Returns the number of bytes on the heap for this store. Does not include allocated memory
    /// that isn't used.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.blocks.len() * size_of::<B>()
    }
}
