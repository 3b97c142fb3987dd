use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

/// `len` random values of at most `bits` bits each
fn random_values<B: Block>(rng: &mut StdRng, len: usize, bits: usize) -> Vec<B> {
    (0..len)
        .map(|_| {
            let value = rng.gen::<u64>() & u64::low_mask(bits);
            num::cast(value).unwrap()
        })
        .collect()
}

#[test]
fn test_compress_scenario() {
    let mut vec = FlexibleIndexVector::<u64>::new();
    for v in [1, 3, 2, 4] {
        vec.push_back(v).unwrap();
    }
    assert!(!vec.is_compressed());
    assert_eq!(vec.determine_bit_width(), 3);

    vec.compress();
    assert!(vec.is_compressed());
    assert_eq!(vec.bit_width(), 3);
    assert_eq!(vec.bit_width_log2(), 1);
    assert_eq!(vec.elements_per_block(), 21);
    assert_eq!(vec.blocks().len(), 1);
    assert_eq!(vec.iter().collect::<Vec<_>>(), vec![1, 3, 2, 4]);
}

#[test]
fn test_straddling_elements() {
    // 3 bits per element in 8 bit blocks, so elements 2, 5, 10, ... cross a block boundary
    let values: Vec<u8> = (0..20).map(|i| (i * 5 % 8) as u8).collect();
    let mut vec = FlexibleIndexVector::from(values.clone());
    vec.compress();

    assert_eq!(vec.bit_width(), 3);
    assert_eq!(vec.blocks().len(), 8);
    for (i, &v) in values.iter().enumerate() {
        assert_eq!(vec.get(i), Some(v), "mismatch at {}", i);
    }
}

#[test]
fn test_compress_is_idempotent() {
    let mut vec: FlexibleIndexVector<u32> = [9, 100, 3, 64].into_iter().collect();
    vec.compress();
    let once = vec.clone();
    let blocks = vec.blocks().to_vec();
    vec.compress();

    assert_eq!(vec, once);
    assert_eq!(vec.blocks(), blocks.as_slice());
    assert_eq!(vec.bit_width(), 7);
}

#[test]
fn test_compress_noops() {
    // at most one element
    let mut vec = FlexibleIndexVector::<u64>::new();
    vec.compress();
    assert!(!vec.is_compressed());
    vec.push_back(5).unwrap();
    vec.compress();
    assert!(!vec.is_compressed());
    assert_eq!(vec.bit_width(), 64);

    // full width needed
    let mut vec: FlexibleIndexVector<u16> = [1, u16::MAX, 2].into_iter().collect();
    vec.compress();
    assert!(!vec.is_compressed());
    assert_eq!(vec.bit_width(), 16);
    vec.push_back(3).unwrap();
    assert_eq!(vec.len(), 4);
}

#[test]
fn test_all_zeros_need_one_bit() {
    let mut vec = FlexibleIndexVector::<u64>::with_len(200);
    assert_eq!(vec.determine_bit_width(), 1);
    vec.compress();
    assert_eq!(vec.bit_width(), 1);
    assert_eq!(vec.blocks().len(), 4);
    assert!(vec.iter().all(|v| v == 0));
    assert_eq!(vec.heap_size(), 32);
}

#[test]
fn test_compressed_vector_rejects_mutation() {
    let mut vec: FlexibleIndexVector<u8> = [1, 2, 3].into_iter().collect();
    vec.compress();

    let rejected = FlexError::PreconditionViolation("a compressed vector cannot be modified");
    assert_eq!(vec.push_back(4), Err(rejected));
    assert_eq!(vec.resize(10), Err(rejected));
    assert_eq!(vec.resize_with_value(10, 1), Err(rejected));
    assert_eq!(vec.set(0, 1), Err(rejected));
    assert_eq!(vec.clear(), Err(rejected));
    assert_eq!(vec.len(), 3);
}

#[test]
fn test_dense_mutators() {
    let mut vec = FlexibleIndexVector::<u32>::new();
    vec.resize_with_value(3, 7).unwrap();
    vec.push_back(1).unwrap();
    vec.set(1, 2).unwrap();
    assert_eq!(vec.iter().collect::<Vec<_>>(), vec![7, 2, 7, 1]);
    assert_eq!(
        vec.set(4, 0),
        Err(FlexError::OutOfRange { index: 4, len: 4 })
    );

    vec.resize(2).unwrap();
    assert_eq!(vec.iter().collect::<Vec<_>>(), vec![7, 2]);
    vec.resize(4).unwrap();
    assert_eq!(vec.iter().collect::<Vec<_>>(), vec![7, 2, 0, 0]);

    vec.clear().unwrap();
    assert!(vec.is_empty());
    assert_eq!(vec.iter().next(), None);
}

#[test]
fn test_checked_access() {
    let mut vec: FlexibleIndexVector<u16> = [4, 5, 6].into_iter().collect();
    vec.compress();

    assert_eq!(vec.get(2), Some(6));
    assert_eq!(vec.get(3), None);
    assert_eq!(vec.at(0), Ok(4));
    assert_eq!(vec.at(3), Err(FlexError::OutOfRange { index: 3, len: 3 }));
}

#[test]
#[should_panic]
fn test_unchecked_access_past_blocks() {
    let vec: FlexibleIndexVector<u16> = [4, 5, 6].into_iter().collect();
    let _ = vec.get_unchecked(3);
}

#[test]
fn test_iterator() {
    let values: Vec<u64> = (0..50).map(|i| i * i).collect();
    let mut vec = FlexibleIndexVector::from(values.as_slice());
    vec.compress();

    let mut iter = vec.iter();
    assert_eq!(iter.len(), 50);
    assert_eq!(iter.next(), Some(0));
    assert_eq!(iter.next_back(), Some(49 * 49));
    assert_eq!(iter.nth(2), Some(9));
    assert_eq!(iter.nth_back(1), Some(47 * 47));
    assert_eq!(iter.len(), 43);
    assert_eq!(iter.clone().last(), Some(46 * 46));
    assert_eq!(iter.nth(100), None);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);

    let reversed: Vec<u64> = vec.iter().rev().collect();
    assert!(reversed.iter().rev().eq(values.iter()));
    assert_eq!((&vec).into_iter().count(), 50);
}

#[test]
fn test_equality_across_states() {
    let dense: FlexibleIndexVector<u64> = [10, 20, 30].into_iter().collect();
    let mut packed = dense.clone();
    packed.compress();

    assert_eq!(dense, packed);
    let shorter: FlexibleIndexVector<u64> = [10, 20].into_iter().collect();
    assert_ne!(dense, shorter);
}

fn check_compression<B: Block>(seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for bits in 1..B::WIDTH {
        let len = rng.gen_range(2..300);
        let values: Vec<B> = random_values(&mut rng, len, bits);
        let mut vec = FlexibleIndexVector::from(values.clone());
        let width = vec.determine_bit_width();
        assert!(width <= bits);

        vec.compress();
        assert_eq!(vec.bit_width(), width);
        assert_eq!(vec.blocks().len(), (len * width).div_ceil(B::WIDTH));
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(vec.get(i), Some(v), "mismatch at {} with {} bits", i, width);
        }
        assert!(vec.iter().eq(values.iter().copied()));
    }
}

#[test]
fn test_compression_all_widths() {
    check_compression::<u8>(1);
    check_compression::<u16>(2);
    check_compression::<u32>(3);
    check_compression::<u64>(4);
}

fn check_round_trip<B: Block>(seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<B> = random_values(&mut rng, 77, B::WIDTH / 2 + 1);
    let mut vec = FlexibleIndexVector::from(values);

    for _ in 0..2 {
        let bytes = vec.to_bytes();
        assert_eq!(bytes.len(), IndexHeader::SIZE + vec.heap_size());

        let decoded = FlexibleIndexVector::<B>::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, vec);
        assert_eq!(decoded.is_compressed(), vec.is_compressed());
        assert_eq!(decoded.to_bytes(), bytes);

        let mut written = Vec::new();
        assert_eq!(vec.write_to(&mut written).unwrap(), bytes.len());
        assert_eq!(written, bytes);

        vec.compress();
    }
}

#[test]
fn test_round_trip() {
    check_round_trip::<u8>(5);
    check_round_trip::<u16>(6);
    check_round_trip::<u32>(7);
    check_round_trip::<u64>(8);
}

#[test]
fn test_view_at_unaligned_offset() {
    let mut vec: FlexibleIndexVector<u64> = (0..100).map(|i| i * 3 % 17).collect();
    vec.compress();

    let mut bytes = vec![0xAAu8; 3];
    vec.write_to(&mut bytes).unwrap();
    let view = FlexibleIndexView::<u64>::from_bytes(&bytes[3..]).unwrap();

    assert_eq!(view.byte_len(), bytes.len() - 3);
    assert_eq!(view.len(), 100);
    assert_eq!(view.bit_width(), 5);
    assert!(view.is_compressed());
    assert!(view.iter().eq(vec.iter()));
    assert_eq!(view.at(100), Err(FlexError::OutOfRange { index: 100, len: 100 }));
    assert_eq!(view.to_vector(), vec);
    assert!(vec.as_view().iter().eq(vec.iter()));
}

#[test]
fn test_concatenated_encodings() {
    let first: FlexibleIndexVector<u32> = [1, 2, 3].into_iter().collect();
    let mut second: FlexibleIndexVector<u32> = [40, 50].into_iter().collect();
    second.compress();

    let mut bytes = first.to_bytes();
    second.write_to(&mut bytes).unwrap();

    let view = FlexibleIndexView::<u32>::from_bytes(&bytes).unwrap();
    let rest = &bytes[view.byte_len()..];
    let next = FlexibleIndexView::<u32>::from_bytes(rest).unwrap();
    assert_eq!(view.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(next.iter().collect::<Vec<_>>(), vec![40, 50]);
    assert_eq!(next.byte_len(), rest.len());
}

#[test]
fn test_from_bytes_rejects_inconsistent_header() {
    let mut vec: FlexibleIndexVector<u16> = [1, 2, 3, 4, 5].into_iter().collect();
    vec.compress();
    let mut bytes = vec.to_bytes();

    // fewer elements still fit into the single packed block, more do not
    bytes[8..16].copy_from_slice(&4u64.to_ne_bytes());
    assert!(matches!(
        FlexibleIndexView::<u16>::from_bytes(&bytes),
        Ok(view) if view.len() == 4
    ));
    bytes[8..16].copy_from_slice(&6u64.to_ne_bytes());
    assert!(matches!(
        FlexibleIndexView::<u16>::from_bytes(&bytes),
        Err(FlexError::InvalidHeader(_))
    ));

    assert!(matches!(
        FlexibleIndexView::<u32>::from_bytes(&vec.to_bytes()),
        Err(FlexError::InvalidHeader(_))
    ));
}

#[test]
fn test_shape_check() {
    assert!(check_shape::<u16>(16, 5, 5).is_ok());
    assert!(check_shape::<u16>(3, 5, 1).is_ok());
    assert!(check_shape::<u16>(3, 6, 1).is_err());
    assert!(check_shape::<u16>(16, 5, 4).is_err());
    assert!(check_shape::<u16>(0, 0, 0).is_err());
    assert!(check_shape::<u16>(17, 1, 2).is_err());
    assert!(check_shape::<u64>(60, usize::MAX, 0).is_err());
}

#[cfg(feature = "serde")]
#[test]
fn test_parts_are_checked() {
    let mut vec: FlexibleIndexVector<u16> = [3, 2, 1, 0, 5].into_iter().collect();
    assert_eq!(
        FlexibleIndexVector::try_from(VectorParts::from(vec.clone())),
        Ok(vec.clone())
    );
    vec.compress();
    assert_eq!(
        FlexibleIndexVector::try_from(VectorParts::from(vec.clone())),
        Ok(vec)
    );

    let packed = VectorParts {
        layout: Layout::Packed {
            bit_width: 3,
            blocks: BlockStore::from_vec(vec![0b101_000_001_010_011u16]),
        },
        len: 5,
    };
    let vec = FlexibleIndexVector::try_from(packed).unwrap();
    assert_eq!(vec.iter().collect::<Vec<_>>(), vec![3, 2, 1, 0, 5]);

    let too_long = VectorParts {
        layout: Layout::Dense(BlockStore::from_vec(vec![1u16, 2])),
        len: 5,
    };
    assert!(matches!(
        FlexibleIndexVector::try_from(too_long),
        Err(FlexError::InvalidHeader(_))
    ));

    let too_short = VectorParts {
        layout: Layout::Packed {
            bit_width: 3,
            blocks: BlockStore::from_vec(vec![0u16]),
        },
        len: 6,
    };
    assert!(matches!(
        FlexibleIndexVector::try_from(too_short),
        Err(FlexError::InvalidHeader(_))
    ));

    let full_width = VectorParts {
        layout: Layout::Packed {
            bit_width: 16,
            blocks: BlockStore::from_vec(vec![1u16]),
        },
        len: 1,
    };
    assert!(FlexibleIndexVector::try_from(full_width).is_err());
}

#[test]
fn test_index_read_interface() {
    fn sum<B: Block, V: IndexRead<B>>(vec: &V) -> u64 {
        (0..vec.len()).filter_map(|i| vec.get(i)).map(Block::as_u64).sum()
    }

    let mut vec: FlexibleIndexVector<u8> = [1, 2, 3, 4].into_iter().collect();
    vec.compress();
    let bytes = vec.to_bytes();
    let view = FlexibleIndexView::<u8>::from_bytes(&bytes).unwrap();

    assert_eq!(sum(&vec), 10);
    assert_eq!(sum(&view), 10);
    assert_eq!(IndexRead::bit_width(&view), 3);
    assert!(!IndexRead::is_empty(&vec));
}
