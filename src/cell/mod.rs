use core::{
    marker::PhantomData,
    mem::{align_of, size_of},
};

use const_panic::concat_assert;

use crate::{
    atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicStorage, AtomicU32, AtomicU64},
    repr::Repr,
};

mod generic;
mod macros;

/// Bit-for-bit view of a `T` as the underlying value of `A`.
union TransmuteUnderlying<T: Copy, A: AtomicStorage> {
    value: T,
    underlying: A::Underlying,
}

#[inline]
pub(crate) const fn into_underlying<T: Repr<A>, A: AtomicStorage>(val: T) -> A::Underlying {
    let () = AtomicCell::<T, A>::ASSERT_SUPPORTED;
    // Sizes match, and `Repr` promises every `T` is a valid `A::Underlying`
    unsafe { TransmuteUnderlying::<T, A> { value: val }.underlying }
}

/// This is only safe to call when `val` was produced from a proper `T` value,
/// or is the zero value, or `T: Bits<A>`.
#[inline]
pub(crate) const unsafe fn from_underlying<T: Repr<A>, A: AtomicStorage>(
    val: A::Underlying,
) -> T {
    let () = AtomicCell::<T, A>::ASSERT_SUPPORTED;
    unsafe { TransmuteUnderlying::<T, A> { underlying: val }.value }
}

/// A thread-safe, strongly-typed atomic cell.
///
/// `T` is reinterpreted bit for bit as the underlying value of the atomic
/// storage `A`, and every operation is executed on the storage with
/// [`SeqCst`] ordering. `T` must implement [`Repr<A>`], which ties it to a
/// single storage width.
///
/// The named aliases [`BoolCell`], [`Int32Cell`], [`Int64Cell`],
/// [`Uint32Cell`] and [`Uint64Cell`] cover the common widths.
///
/// A cell is neither `Clone` nor `Copy`. Copying the storage of a cell that is
/// already shared would produce a second, independent cell, so cells are
/// shared by reference instead.
///
/// # Panics
///
/// There is no runtime panic. Using a `T` whose size differs from
/// `A::Underlying` fails to compile:
///
/// ```compile_fail
/// use typed_atomic::{atomic::AtomicU32, Repr, Uint32Cell};
///
/// #[derive(Clone, Copy)]
/// struct Small(u8);
///
/// unsafe impl Repr<AtomicU32> for Small {}
///
/// let a = Uint32Cell::new(Small(1));
/// let _ = a.load();
/// ```
///
/// A type is also tied to the one storage it implements [`Repr`] for, so an
/// `i32`-backed type is not a [`Uint32Cell`] value:
///
/// ```compile_fail
/// use typed_atomic::{atomic::AtomicI32, Repr, Uint32Cell};
///
/// #[derive(Clone, Copy)]
/// #[repr(transparent)]
/// struct Fruit(i32);
///
/// unsafe impl Repr<AtomicI32> for Fruit {}
///
/// let a = Uint32Cell::<Fruit>::zeroed();
/// ```
///
/// [`SeqCst`]: core::sync::atomic::Ordering::SeqCst
#[repr(transparent)]
pub struct AtomicCell<T, A: AtomicStorage> {
    atomic: A,
    _marker: PhantomData<T>,
}

impl<T, A: AtomicStorage> AtomicCell<T, A> {
    const SIZE: usize = size_of::<T>();
    const UNDERLYING_SIZE: usize = size_of::<A::Underlying>();

    /// `true` if the storage can support storing `T`.
    pub const SUPPORTED: bool = Self::SIZE == Self::UNDERLYING_SIZE;

    /// Panics at compile-time if `!SUPPORTED`.
    pub const ASSERT_SUPPORTED: () = Self::assert_size_matches();

    /// `true` if a reference to `A::Underlying` can be viewed as a reference to
    /// `T`.
    pub const REF_SUPPORTED: bool =
        Self::SUPPORTED && align_of::<T>() <= align_of::<A::Underlying>();

    /// Panics at compile-time if `!REF_SUPPORTED`.
    pub const ASSERT_REF_SUPPORTED: () = Self::assert_align_matches();

    const fn assert_size_matches() {
        concat_assert!(
            <AtomicCell<T, A>>::SUPPORTED,
            "value type (size=",
            <AtomicCell<T, A>>::SIZE,
            ") does not match atomic storage (size=",
            <AtomicCell<T, A>>::UNDERLYING_SIZE,
            ")",
        );
    }

    const fn assert_align_matches() {
        Self::assert_size_matches();
        concat_assert!(
            <AtomicCell<T, A>>::REF_SUPPORTED,
            "value type (align=",
            align_of::<T>(),
            ") is over-aligned for atomic storage (align=",
            align_of::<A::Underlying>(),
            ")",
        );
    }

    const fn from_storage(atomic: A) -> Self {
        Self {
            atomic,
            _marker: PhantomData,
        }
    }
}

// SAFETY: a `T` only ever enters or leaves the cell by value through the
// atomic storage, and no `&T` into the cell is handed out through `&self`.
unsafe impl<T: Send, A: AtomicStorage> Send for AtomicCell<T, A> {}
unsafe impl<T: Send, A: AtomicStorage> Sync for AtomicCell<T, A> {}

/// An atomic cell over [`AtomicBool`].
pub type BoolCell<T = bool> = AtomicCell<T, AtomicBool>;

/// An atomic cell over [`AtomicI32`].
pub type Int32Cell<T = i32> = AtomicCell<T, AtomicI32>;

/// An atomic cell over [`AtomicI64`].
pub type Int64Cell<T = i64> = AtomicCell<T, AtomicI64>;

/// An atomic cell over [`AtomicU32`].
pub type Uint32Cell<T = u32> = AtomicCell<T, AtomicU32>;

/// An atomic cell over [`AtomicU64`].
pub type Uint64Cell<T = u64> = AtomicCell<T, AtomicU64>;
