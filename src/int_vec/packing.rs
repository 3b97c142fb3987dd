//! Bit-packing of fixed-width elements into blocks, shared by both index vector variants.

use crate::block::{Block, BlockSource, BlockStore};

/// Read the `width`-bit element that starts at bit `bit_pos`. If the element straddles a block
/// boundary, its high part is taken from the low bits of the following block.
#[inline]
pub(crate) fn read_packed<B: Block, S: BlockSource<B> + ?Sized>(
    blocks: &S,
    bit_pos: usize,
    width: usize,
) -> B {
    let index = B::index(bit_pos);
    let offset = B::offset(bit_pos);
    let mask = B::low_mask(width);
    let value = (blocks.block(index) >> offset) & mask;

    // number of bits of the element available in the first block
    let available = B::WIDTH - offset;
    if available < width {
        value | ((blocks.block(index + 1) << available) & mask)
    } else {
        value
    }
}

/// Read element `pos` of a vector stored with `width` bits per element. A width of `W` means
/// the vector is stored one element per block.
#[inline]
pub(crate) fn read_element<B: Block, S: BlockSource<B> + ?Sized>(
    blocks: &S,
    pos: usize,
    width: usize,
) -> B {
    if width == B::WIDTH {
        blocks.block(pos)
    } else {
        read_packed(blocks, pos * width, width)
    }
}

/// Repack a store holding one element per block so that every element takes `width` bits,
/// after passing it through `encode`. Packing runs in place: the block being written never
/// lies past the element being read. The store is truncated to the blocks actually written.
///
/// Every encoded element must fit into `width` bits.
pub(crate) fn pack_in_place<B: Block>(
    store: &mut BlockStore<B>,
    width: usize,
    mut encode: impl FnMut(B) -> B,
) {
    debug_assert!(width >= 1 && width <= B::WIDTH);

    let blocks = store.as_mut_slice();
    let mut buffer = B::zero();
    // number of bits of the buffer that are already occupied, always less than W
    let mut used = 0;
    let mut written = 0;

    for i in 0..blocks.len() {
        let value = encode(blocks[i]);
        debug_assert!(value.bits_needed() <= width, "element does not fit the bit width");

        buffer |= value << used;
        let free = B::WIDTH - used;
        if width >= free {
            // the buffer is full, flush it and carry the high part of the element
            blocks[written] = buffer;
            written += 1;
            buffer = if width > free {
                value >> free
            } else {
                B::zero()
            };
            used = width - free;
        } else {
            used += width;
        }
    }

    if used > 0 {
        blocks[written] = buffer;
        written += 1;
    }
    store.truncate(written);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_straddling_elements() {
        let values = [5u8, 6, 2, 0, 7, 1, 3, 4, 7, 7];
        let mut store = BlockStore::from_vec(values.to_vec());
        pack_in_place(&mut store, 3, |v| v);

        // 10 elements of 3 bits need 30 bits, i.e. 4 blocks of 8 bits
        assert_eq!(store.len(), 4);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(read_packed(store.as_slice(), i * 3, 3), v, "mismatch at {}", i);
        }
    }

    #[test]
    fn test_pack_full_width() {
        let values = [u16::MAX, 0, 12345];
        let mut store = BlockStore::from_vec(values.to_vec());
        pack_in_place(&mut store, 16, |v| v);
        assert_eq!(store.as_slice(), &values);
    }

    #[test]
    fn test_pack_with_encoding() {
        let values = [1u64, 2, 4, 9, 16];
        let mut store = BlockStore::from_vec(values.to_vec());
        let mut previous = 0;
        pack_in_place(&mut store, 4, |v| {
            let delta = v - previous;
            previous = v;
            delta
        });

        assert_eq!(store.len(), 1);
        assert_eq!(store.as_slice()[0], 0x7_5_2_1_1);
    }

    #[test]
    fn test_read_element_dense() {
        let blocks = [3u32, 1, 4];
        assert_eq!(read_element(&blocks[..], 2, 32), 4);
        assert_eq!(read_element(&blocks[..], 0, 32), 3);
    }
}
