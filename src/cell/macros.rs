//! `const` constructors for [`AtomicCell`], one per concrete storage.
//!
//! Trait methods cannot be called in `const` context, so these go through the
//! inherent `const fn new` of each `core` atomic instead of
//! [`AtomicStorage::new`].

use super::{into_underlying, AtomicCell};
use crate::{atomic::AtomicStorage, repr::Repr};

macro_rules! impl_const_new {
    ($($a:ty),+ $(,)?) => {$(
        impl<T: Repr<$a>> AtomicCell<T, $a> {
            /// Creates a new atomic cell initialized with `val`.
            #[inline]
            pub const fn new(val: T) -> Self {
                let val = into_underlying::<T, $a>(val);
                Self::from_storage(<$a>::new(val))
            }

            /// Creates a new atomic cell holding the zero bit pattern, which
            /// [`Repr`] guarantees is a valid `T`.
            ///
            /// This is what [`Default::default`] returns, usable in `static`
            /// items.
            #[inline]
            pub const fn zeroed() -> Self {
                let () = Self::ASSERT_SUPPORTED;
                Self::from_storage(<$a>::new(<$a as AtomicStorage>::ZERO))
            }
        }
    )+};
}

impl_const_new! {
    crate::atomic::AtomicUsize,
    crate::atomic::AtomicIsize,
    crate::atomic::AtomicU64,
    crate::atomic::AtomicI64,
    crate::atomic::AtomicU32,
    crate::atomic::AtomicI32,
    crate::atomic::AtomicU16,
    crate::atomic::AtomicI16,
    crate::atomic::AtomicU8,
    crate::atomic::AtomicI8,
    crate::atomic::AtomicBool,
}
