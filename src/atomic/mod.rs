//! The [`AtomicStorage`] and [`AtomicInteger`] traits and their implementations
//! for the `core` atomics.
pub use core::sync::atomic::{
    AtomicBool, AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicIsize, AtomicU16, AtomicU32,
    AtomicU64, AtomicU8, AtomicUsize, Ordering,
};

/// A fixed-width atomic which can be safely shared between threads and used as
/// the backing store of an [`AtomicCell`](crate::AtomicCell).
///
/// Implemented for every `core` integer atomic and for [`AtomicBool`].
pub trait AtomicStorage: Sized + Send + Sync {
    /// The underlying non-atomic type. This has the same in-memory
    /// representation as `Self`.
    type Underlying: Copy + PartialEq;

    /// The all-zero underlying value.
    const ZERO: Self::Underlying;

    /// Creates a new atomic holding `v`.
    fn new(v: Self::Underlying) -> Self;

    /// Consumes the atomic and returns the contained value.
    fn into_inner(self) -> Self::Underlying;

    /// Returns a mutable reference to the underlying value.
    ///
    /// This is safe because the mutable reference guarantees that no other
    /// threads are concurrently accessing the atomic data.
    fn get_mut(&mut self) -> &mut Self::Underlying;

    /// Loads a value from the atomic.
    ///
    /// # Panics
    ///
    /// Panics if `order` is [`Release`](Ordering::Release) or
    /// [`AcqRel`](Ordering::AcqRel).
    fn load(&self, order: Ordering) -> Self::Underlying;

    /// Stores a value into the atomic.
    ///
    /// # Panics
    ///
    /// Panics if `order` is [`Acquire`](Ordering::Acquire) or
    /// [`AcqRel`](Ordering::AcqRel).
    fn store(&self, val: Self::Underlying, order: Ordering);

    /// Stores a value into the atomic, returning the previous value.
    fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;

    /// Stores `new` if the current value is bitwise equal to `current`.
    ///
    /// Returns `Ok(previous)` when the value was written and `Err(actual)`
    /// otherwise.
    fn compare_exchange(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying>;

    /// Like [`AtomicStorage::compare_exchange`], but allowed to fail
    /// spuriously. Only useful inside a retry loop.
    fn compare_exchange_weak(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying>;
}

/// An [`AtomicStorage`] with hardware arithmetic and bitwise read-modify-write
/// operations.
///
/// All three operations wrap on overflow and return the value held before the
/// operation.
pub trait AtomicInteger: AtomicStorage {
    /// Adds to the current value, returning the previous value.
    fn fetch_add(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;

    /// Bitwise "and" with the current value, returning the previous value.
    fn fetch_and(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;

    /// Bitwise "or" with the current value, returning the previous value.
    fn fetch_or(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;

    /// Non-atomic wrapping addition on underlying values, matching what
    /// [`AtomicInteger::fetch_add`] does to the stored value.
    fn wrapping_add(a: Self::Underlying, b: Self::Underlying) -> Self::Underlying;
}

macro_rules! impl_storage {
    ($t1:ty, $t2:ty, $z:expr) => {
        impl AtomicStorage for $t1 {
            type Underlying = $t2;

            const ZERO: Self::Underlying = $z;

            #[inline]
            fn new(val: Self::Underlying) -> Self {
                <$t1>::new(val)
            }

            #[inline]
            fn into_inner(self) -> Self::Underlying {
                <$t1>::into_inner(self)
            }

            #[inline]
            fn get_mut(&mut self) -> &mut Self::Underlying {
                <$t1>::get_mut(self)
            }

            #[inline]
            fn load(&self, order: Ordering) -> Self::Underlying {
                <$t1>::load(self, order)
            }

            #[inline]
            fn store(&self, val: Self::Underlying, order: Ordering) {
                <$t1>::store(self, val, order)
            }

            #[inline]
            fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::swap(self, val, order)
            }

            #[inline]
            fn compare_exchange(
                &self,
                current: Self::Underlying,
                new: Self::Underlying,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self::Underlying, Self::Underlying> {
                <$t1>::compare_exchange(self, current, new, success, failure)
            }

            #[inline]
            fn compare_exchange_weak(
                &self,
                current: Self::Underlying,
                new: Self::Underlying,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self::Underlying, Self::Underlying> {
                <$t1>::compare_exchange_weak(self, current, new, success, failure)
            }
        }
    };
    ($t1:ty, $t2:ty) => { impl_storage!{$t1, $t2, 0} };
}

macro_rules! impl_integer {
    ($t1:ty, $t2:ty) => {
        impl_storage! {$t1, $t2}

        impl AtomicInteger for $t1 {
            #[inline]
            fn fetch_add(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_add(self, val, order)
            }

            #[inline]
            fn fetch_and(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_and(self, val, order)
            }

            #[inline]
            fn fetch_or(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_or(self, val, order)
            }

            #[inline]
            fn wrapping_add(a: Self::Underlying, b: Self::Underlying) -> Self::Underlying {
                a.wrapping_add(b)
            }
        }
    };
}

impl_integer! {AtomicUsize, usize}
impl_integer! {AtomicIsize, isize}
impl_integer! {AtomicU64, u64}
impl_integer! {AtomicI64, i64}
impl_integer! {AtomicU32, u32}
impl_integer! {AtomicI32, i32}
impl_integer! {AtomicU16, u16}
impl_integer! {AtomicI16, i16}
impl_integer! {AtomicU8, u8}
impl_integer! {AtomicI8, i8}
impl_storage! {AtomicBool, bool, false}
