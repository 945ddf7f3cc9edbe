//! Marker traits describing which types may be reinterpreted as the
//! underlying value of an [`AtomicStorage`].
//!
//! A type opts in by implementing [`Repr`] for exactly the storage it is
//! bit-compatible with. This is what ties a type to a single cell width: an
//! `Int32Cell<Fruit>` only exists if `Fruit: Repr<AtomicI32>`.
//!
//! ```
//! use typed_atomic::{atomic::AtomicI32, Bits, Int32Cell, Repr};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! #[repr(transparent)]
//! struct Fruit(i32);
//!
//! // SAFETY: `Fruit` is a transparent `i32`.
//! unsafe impl Repr<AtomicI32> for Fruit {}
//! unsafe impl Bits<AtomicI32> for Fruit {}
//!
//! static FRUIT: Int32Cell<Fruit> = Int32Cell::zeroed();
//! FRUIT.store(Fruit(2));
//! assert_eq!(FRUIT.load(), Fruit(2));
//! ```
//!
//! [`AtomicStorage`]: crate::atomic::AtomicStorage

use core::num::{
    NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI8, NonZeroIsize, NonZeroU16, NonZeroU32,
    NonZeroU64, NonZeroU8, NonZeroUsize,
};

use crate::atomic::{
    AtomicBool, AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicIsize, AtomicStorage, AtomicU16,
    AtomicU32, AtomicU64, AtomicU8, AtomicUsize,
};

/// A type whose values can be reinterpreted as `A::Underlying` and back.
///
/// # Safety
///
/// Implementors must guarantee all of the following:
///
/// - `Self` has the same size as `A::Underlying`. This is also checked at
///   compile time, see [`AtomicCell::SUPPORTED`](crate::AtomicCell::SUPPORTED).
/// - `Self` has no padding or otherwise uninitialized bytes, and every value of
///   `Self` is a valid `A::Underlying`.
/// - The all-zero bit pattern is a valid value of `Self`. It is what a
///   zero-initialized cell loads.
pub unsafe trait Repr<A: AtomicStorage>: Copy {}

/// A [`Repr`] for which *every* value of `A::Underlying` is a valid `Self`.
///
/// Required by the arithmetic and bitwise operations, since those can produce
/// bit patterns no caller ever stored.
///
/// # Safety
///
/// In addition to the [`Repr`] contract, any `A::Underlying` value
/// reinterpreted as `Self` must be a valid `Self`. A `#[repr(transparent)]`
/// newtype over the underlying integer satisfies this. A fieldless
/// `#[repr(i32)]` enum does not.
pub unsafe trait Bits<A: AtomicStorage>: Repr<A> {}

macro_rules! impl_bits {
    ($($a:ty => $($t:ty),+;)+) => {$($(
        unsafe impl Repr<$a> for $t {}
        unsafe impl Bits<$a> for $t {}
    )+)+};
}

impl_bits! {
    AtomicI8 => i8, Option<NonZeroI8>;
    AtomicU8 => u8, Option<NonZeroU8>;
    AtomicI16 => i16, Option<NonZeroI16>;
    AtomicU16 => u16, Option<NonZeroU16>;
    AtomicI32 => i32, Option<NonZeroI32>;
    AtomicU32 => u32, Option<NonZeroU32>;
    AtomicI64 => i64, Option<NonZeroI64>;
    AtomicU64 => u64, Option<NonZeroU64>;
    AtomicIsize => isize, Option<NonZeroIsize>;
    AtomicUsize => usize, Option<NonZeroUsize>;
}

unsafe impl Repr<AtomicBool> for bool {}

// '\0' is the zero pattern; surrogates and values above char::MAX are not chars
unsafe impl Repr<AtomicU32> for char {}
