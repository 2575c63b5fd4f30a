//! Type-safe bitmask combinators
//!
//! Handle-configuration calls take option masks built by OR-ing enumerators
//! together. [`Flags`] keeps that arithmetic type-safe: a mask built from one
//! enumeration cannot be passed where another enumeration's mask is expected,
//! while the raw integer stays one method call away for interop.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr};

/// Maps an enumerator to its underlying bit pattern.
///
/// Implemented by closed option enumerations whose variants are disjoint bit
/// patterns. Disjointness is a caller contract and is not validated at this
/// layer: combining enumerators with overlapping bits silently produces the
/// OR of their patterns.
pub trait Flag: Copy {
    /// The underlying integer type of the enumeration.
    ///
    /// `Bits::default()` must be the all-zero (empty) value, which holds for
    /// every primitive unsigned integer.
    type Bits: Copy
        + Default
        + PartialEq
        + BitOr<Output = Self::Bits>
        + BitAnd<Output = Self::Bits>;

    /// The bit pattern of this enumerator.
    fn bits(self) -> Self::Bits;
}

/// An immutable subset of the bit flags drawn from the enumeration `E`.
///
/// All combinators return new instances; operands are never mutated.
///
/// # Examples
///
/// ```
/// use evwrap::{Flag, Flags};
///
/// #[derive(Clone, Copy)]
/// enum Open {
///     Read = 0x1,
///     Write = 0x2,
/// }
///
/// impl Flag for Open {
///     type Bits = u32;
///     fn bits(self) -> u32 {
///         self as u32
///     }
/// }
///
/// let mode = Flags::new(Open::Read) | Open::Write;
/// assert!(mode.is_set());
/// assert_eq!(mode.bits(), 0x3);
/// ```
pub struct Flags<E: Flag> {
    bits: E::Bits,
    _tag: PhantomData<E>,
}

impl<E: Flag> Flags<E> {
    /// Creates a mask holding a single enumerator.
    pub fn new(flag: E) -> Self {
        Self::from_bits(flag.bits())
    }

    /// Creates a mask from a raw underlying integer.
    ///
    /// The caller asserts that `bits` is an OR-combination of `E`'s declared
    /// patterns.
    pub fn from_bits(bits: E::Bits) -> Self {
        Flags {
            bits,
            _tag: PhantomData,
        }
    }

    /// Creates the empty mask.
    pub fn empty() -> Self {
        Self::from_bits(E::Bits::default())
    }

    /// Returns true iff any flag is set.
    pub fn is_set(self) -> bool {
        self.bits != E::Bits::default()
    }

    /// Returns the raw underlying integer, for APIs expecting a flags word.
    pub fn bits(self) -> E::Bits {
        self.bits
    }
}

impl<E: Flag> From<E> for Flags<E> {
    fn from(flag: E) -> Self {
        Flags::new(flag)
    }
}

impl<E: Flag> Default for Flags<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: Flag> Clone for Flags<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Flag> Copy for Flags<E> {}

impl<E: Flag> PartialEq for Flags<E> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<E: Flag> Eq for Flags<E> {}

impl<E: Flag> fmt::Debug for Flags<E>
where
    E::Bits: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Flags").field(&self.bits).finish()
    }
}

impl<E: Flag> BitOr for Flags<E> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(self.bits | rhs.bits)
    }
}

impl<E: Flag> BitOr<E> for Flags<E> {
    type Output = Self;

    fn bitor(self, rhs: E) -> Self {
        Self::from_bits(self.bits | rhs.bits())
    }
}

impl<E: Flag> BitAnd for Flags<E> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::from_bits(self.bits & rhs.bits)
    }
}

impl<E: Flag> BitAnd<E> for Flags<E> {
    type Output = Self;

    fn bitand(self, rhs: E) -> Self {
        Self::from_bits(self.bits & rhs.bits())
    }
}
