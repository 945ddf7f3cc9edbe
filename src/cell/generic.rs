//! Operations shared by every [`AtomicCell`], written once against the
//! [`AtomicStorage`] and [`AtomicInteger`] traits.

use core::fmt;

use super::{from_underlying, into_underlying, AtomicCell};
use crate::{
    atomic::{AtomicInteger, AtomicStorage, Ordering::SeqCst},
    repr::{Bits, Repr},
};

impl<T: Repr<A>, A: AtomicStorage> AtomicCell<T, A> {
    /// Consumes the cell and returns the contained value.
    ///
    /// This is safe because passing `self` by value guarantees that no other
    /// threads are concurrently accessing the cell.
    pub fn into_inner(self) -> T {
        // The storage only ever holds the bits of a proper `T` value
        unsafe { from_underlying::<T, A>(self.atomic.into_inner()) }
    }

    /// Returns a mutable reference to the contained value.
    ///
    /// This is safe because the mutable reference guarantees that no other
    /// threads are concurrently accessing the cell.
    pub fn get_mut(&mut self) -> &mut T {
        let () = Self::ASSERT_REF_SUPPORTED;
        let v: *mut A::Underlying = self.atomic.get_mut();

        // Size and alignment were checked above, and the storage holds a
        // proper `T` value. Writes through the reference can only store
        // another `T`.
        unsafe { &mut *v.cast::<T>() }
    }

    /// Loads the raw bits held by the cell, without reinterpreting them.
    pub fn load_raw(&self) -> A::Underlying {
        self.atomic.load(SeqCst)
    }

    /// Loads the current value.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_atomic::Uint32Cell;
    ///
    /// let a = Uint32Cell::new(7u32);
    /// assert_eq!(a.load(), 7);
    /// ```
    pub fn load(&self) -> T {
        let raw = self.load_raw();

        // The storage only ever holds the bits of a proper `T` value
        unsafe { from_underlying::<T, A>(raw) }
    }

    /// Stores `val` into the cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_atomic::BoolCell;
    ///
    /// let a = BoolCell::zeroed();
    /// a.store(true);
    /// assert!(a.load());
    /// ```
    pub fn store(&self, val: T) {
        self.atomic.store(into_underlying::<T, A>(val), SeqCst);
    }

    /// Stores `new` into the cell and returns the previous value.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_atomic::Int64Cell;
    ///
    /// let a = Int64Cell::new(-3i64);
    /// assert_eq!(a.swap(4), -3);
    /// assert_eq!(a.load(), 4);
    /// ```
    pub fn swap(&self, new: T) -> T {
        let prev = self.atomic.swap(into_underlying::<T, A>(new), SeqCst);

        // `prev` was swapped out of the storage, so it is a proper `T` value
        unsafe { from_underlying::<T, A>(prev) }
    }

    /// Stores `new` if the bits currently held equal the bits of `old`.
    ///
    /// Returns whether the value was written. A `false` result leaves the cell
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_atomic::Int32Cell;
    ///
    /// let a = Int32Cell::new(1i32);
    /// assert!(!a.compare_and_swap(2, 3));
    /// assert!(a.compare_and_swap(1, 3));
    /// assert_eq!(a.load(), 3);
    /// ```
    pub fn compare_and_swap(&self, old: T, new: T) -> bool {
        self.compare_exchange(old, new).is_ok()
    }

    /// Stores `new` if the bits currently held equal the bits of `current`.
    ///
    /// Returns `Ok(previous)` if the value was written, which is then
    /// bitwise equal to `current`. Returns `Err(actual)` otherwise.
    pub fn compare_exchange(&self, current: T, new: T) -> Result<T, T> {
        self.atomic
            .compare_exchange(
                into_underlying::<T, A>(current),
                into_underlying::<T, A>(new),
                SeqCst,
                SeqCst,
            )
            // Both sides were read out of the storage
            .map(|prev| unsafe { from_underlying::<T, A>(prev) })
            .map_err(|actual| unsafe { from_underlying::<T, A>(actual) })
    }

    /// Fetches the value, and applies a function to it that returns an optional
    /// new value. Returns `Ok(previous_value)` if the function returned
    /// `Some(_)`, else `Err(previous_value)`.
    ///
    /// The function may be called several times if other threads change the
    /// value in the meantime, but its result is stored exactly once.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_atomic::Uint64Cell;
    ///
    /// let a = Uint64Cell::new(7u64);
    /// assert_eq!(a.fetch_update(|_| None), Err(7));
    /// assert_eq!(a.fetch_update(|a| Some(a * 2)), Ok(7));
    /// assert_eq!(a.load(), 14);
    /// ```
    pub fn fetch_update<F>(&self, mut f: F) -> Result<T, T>
    where
        F: FnMut(T) -> Option<T>,
    {
        let mut raw = self.load_raw();
        loop {
            // `raw` is always the latest value read from the storage
            let curr = unsafe { from_underlying::<T, A>(raw) };
            let next = match f(curr) {
                Some(next) => into_underlying::<T, A>(next),
                None => return Err(curr),
            };
            match self.atomic.compare_exchange_weak(raw, next, SeqCst, SeqCst) {
                Ok(_) => return Ok(curr),
                Err(actual) => raw = actual,
            }
        }
    }
}

impl<T: Bits<A>, A: AtomicInteger> AtomicCell<T, A> {
    /// Adds `delta` to the current value, wrapping around on overflow, and
    /// returns the **new** value.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_atomic::Uint32Cell;
    ///
    /// let a = Uint32Cell::new(u32::MAX);
    /// assert_eq!(a.add(2), 1);
    /// ```
    pub fn add(&self, delta: T) -> T {
        let delta = into_underlying::<T, A>(delta);
        let prev = self.atomic.fetch_add(delta, SeqCst);

        // `T: Bits<A>` makes every underlying value a proper `T`
        unsafe { from_underlying::<T, A>(A::wrapping_add(prev, delta)) }
    }

    /// Bitwise "and" with `mask`, returning the **previous** value.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_atomic::Int32Cell;
    ///
    /// let a = Int32Cell::new(0b1100i32);
    /// assert_eq!(a.and(0b1010), 0b1100);
    /// assert_eq!(a.load(), 0b1000);
    /// ```
    pub fn and(&self, mask: T) -> T {
        let prev = self.atomic.fetch_and(into_underlying::<T, A>(mask), SeqCst);
        unsafe { from_underlying::<T, A>(prev) }
    }

    /// Bitwise "or" with `mask`, returning the **previous** value.
    pub fn or(&self, mask: T) -> T {
        let prev = self.atomic.fetch_or(into_underlying::<T, A>(mask), SeqCst);
        unsafe { from_underlying::<T, A>(prev) }
    }
}

impl<T: Repr<A>, A: AtomicStorage> Default for AtomicCell<T, A> {
    /// A cell holding the zero bit pattern.
    ///
    /// Like [`AtomicCell::new`], this does not compile for a mis-sized `T`:
    ///
    /// ```compile_fail
    /// use typed_atomic::{atomic::AtomicU32, Repr, Uint32Cell};
    ///
    /// #[derive(Clone, Copy)]
    /// struct Small(u16);
    ///
    /// unsafe impl Repr<AtomicU32> for Small {}
    ///
    /// let _a: Uint32Cell<Small> = Default::default();
    /// ```
    fn default() -> Self {
        let () = Self::ASSERT_SUPPORTED;
        Self::from_storage(A::new(A::ZERO))
    }
}

impl<T: Repr<A>, A: AtomicStorage> From<T> for AtomicCell<T, A> {
    fn from(val: T) -> Self {
        Self::from_storage(A::new(into_underlying::<T, A>(val)))
    }
}

impl<T: Repr<A> + fmt::Debug, A: AtomicStorage> fmt::Debug for AtomicCell<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.load().fmt(f)
    }
}
