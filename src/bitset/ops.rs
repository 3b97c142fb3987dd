//! Operator overloads for the bit algebra of both bitset types.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub, SubAssign};

use super::{DualBitset, DynamicBitset};
use crate::block::Block;

/// Implements an operator and its assigning variant for a bitset type by delegating to the
/// in-place method `$method`. The right-hand side is always borrowed; the left-hand side is
/// consumed or cloned.
macro_rules! impl_set_operator {
    ($type:ident, $op:ident, $op_fn:ident, $assign:ident, $assign_fn:ident, $method:ident) => {
        impl<B: Block> $assign<&$type<B>> for $type<B> {
            fn $assign_fn(&mut self, rhs: &$type<B>) {
                self.$method(rhs);
            }
        }

        impl<B: Block> $op<&$type<B>> for $type<B> {
            type Output = $type<B>;

            fn $op_fn(mut self, rhs: &$type<B>) -> $type<B> {
                self.$method(rhs);
                self
            }
        }

        impl<B: Block> $op<&$type<B>> for &$type<B> {
            type Output = $type<B>;

            fn $op_fn(self, rhs: &$type<B>) -> $type<B> {
                let mut result = self.clone();
                result.$method(rhs);
                result
            }
        }
    };
}

impl_set_operator!(DualBitset, BitOr, bitor, BitOrAssign, bitor_assign, union_with);
impl_set_operator!(DualBitset, BitAnd, bitand, BitAndAssign, bitand_assign, intersect_with);
impl_set_operator!(DualBitset, Sub, sub, SubAssign, sub_assign, difference_with);

impl_set_operator!(DynamicBitset, BitOr, bitor, BitOrAssign, bitor_assign, union_with);
impl_set_operator!(DynamicBitset, BitAnd, bitand, BitAndAssign, bitand_assign, intersect_with);
impl_set_operator!(DynamicBitset, Sub, sub, SubAssign, sub_assign, difference_with);

impl<B: Block> Not for DualBitset<B> {
    type Output = DualBitset<B>;

    fn not(mut self) -> DualBitset<B> {
        self.complement();
        self
    }
}

impl<B: Block> Not for &DualBitset<B> {
    type Output = DualBitset<B>;

    fn not(self) -> DualBitset<B> {
        !self.clone()
    }
}

// the complement of a finite set is co-finite
impl<B: Block> Not for &DynamicBitset<B> {
    type Output = DualBitset<B>;

    fn not(self) -> DualBitset<B> {
        self.complement()
    }
}

impl<B: Block> Not for DynamicBitset<B> {
    type Output = DualBitset<B>;

    fn not(self) -> DualBitset<B> {
        !DualBitset::from(self)
    }
}
