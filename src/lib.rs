#![warn(missing_docs)]

//! This crate provides compact containers for large bit sets and integer sequences, which can be
//! written into a flat binary layout and read back in place without copying.
//!
//! # Data structures
//!  - [Dynamic Bitset][DynamicBitset]: a finite growable bitset supporting iteration over its
//!    members and the usual set algebra.
//!  - [Dual Bitset][DualBitset]: a bitset with an explicit default bit for every position beyond
//!    its storage, so it can also represent co-finite sets such as the complement of a finite set.
//!  - [Flexible Index Vector][FlexibleIndexVector]: a vector of integers that is bit-packed to the
//!    smallest width holding its largest element, with constant time random access.
//!  - [Flexible Delta Index Vector][FlexibleDeltaIndexVector]: a vector of non-decreasing
//!    integers that is bit-packed as the differences of consecutive elements.
//!
//! All containers are generic over the [block type][Block] (`u8`, `u16`, `u32` or `u64`, the
//! default) used for their storage.
//!
//! # Building and compressing
//! The index vectors are built uncompressed and can be mutated like a `Vec`. Calling `compress()`
//! repacks them in place. A compressed vector cannot be mutated anymore; mutators return an
//! error instead.
//!
//! # Binary layout
//! Each container encodes into a small header followed by its blocks (see [`layout`]). The
//! encoding holds no pointers, so it can be memory-mapped. The view types ([`BitsetView`],
//! [`FlexibleIndexView`], [`FlexibleDeltaIndexView`]) read an encoding in place, at any alignment.
//!
//! # Serde
//! The owning containers implement `Serialize` and `Deserialize` if the `serde` feature is
//! enabled.

pub use bitset::{BitRead, BitsetView, DualBitset, DynamicBitset};
pub use block::{Block, BlockStore};
pub use delta_vec::{FlexibleDeltaIndexVector, FlexibleDeltaIndexView};
pub use error::FlexError;
pub use int_vec::{FlexibleIndexVector, FlexibleIndexView, IndexRead};

pub mod bitset;
pub mod block;
pub mod delta_vec;
pub mod error;
pub mod int_vec;
pub mod layout;
