//! [`AnyCell`]: an atomic slot holding one consistently-typed, reference
//! counted value.
//!
//! The slot is an epoch-managed atomic pointer. A null pointer is the empty
//! cell; otherwise it points at the current value together with the
//! [`TypeTag`] fixed by the first store. Replaced slots are retired through
//! `crossbeam_epoch` and freed once no reader can still observe them.

use core::{
    any::{type_name, Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::atomic::Ordering::{Relaxed, SeqCst},
};
use std::sync::Arc;

use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};

/// Runtime identity of a concrete type.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// The tag of `T`.
    pub fn of<T: ?Sized + Any>() -> Self {
        TypeTag {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The [`TypeId`] this tag compares and hashes by.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Best-effort type name. Values stored behind `dyn Any` only report the
    /// trait object, since the concrete name is erased.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.id)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Types that can report the concrete type of a value.
///
/// For sized types this is always the type itself. For `dyn Any` trait
/// objects it is the erased type behind the object, which is what makes the
/// runtime consistency check in [`AnyCell`] necessary.
pub trait Dynamic: 'static {
    /// The tag of the concrete type of `self`.
    fn type_tag(&self) -> TypeTag;
}

impl<T: Any> Dynamic for T {
    #[inline]
    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }
}

macro_rules! impl_dynamic_any {
    ($($t:ty),+ $(,)?) => {$(
        impl Dynamic for $t {
            fn type_tag(&self) -> TypeTag {
                let any: &dyn Any = self;
                TypeTag {
                    id: <dyn Any as Any>::type_id(any),
                    name: type_name::<$t>(),
                }
            }
        }
    )+};
}

impl_dynamic_any! {
    dyn Any,
    dyn Any + Send,
    dyn Any + Send + Sync,
}

struct Slot<T: ?Sized> {
    tag: TypeTag,
    value: Arc<T>,
}

/// Hands a slot that was just unlinked from a cell over to the collector and
/// returns its value. A null `replaced` means `tag` was installed into an
/// empty cell.
unsafe fn retire<T: ?Sized>(
    replaced: Shared<'_, Slot<T>>,
    tag: TypeTag,
    guard: &epoch::Guard,
) -> Option<Arc<T>> {
    match unsafe { replaced.as_ref() } {
        Some(slot) => {
            let value = Arc::clone(&slot.value);
            unsafe { guard.defer_destroy(replaced) };
            Some(value)
        }
        None => {
            #[cfg(feature = "tracing")]
            tracing::trace!(stored = %tag, "AnyCell type established");
            let _ = tag;
            None
        }
    }
}

/// Address comparison that ignores trait object metadata.
fn same_allocation<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const u8 == Arc::as_ptr(b) as *const u8
}

#[cold]
#[track_caller]
fn inconsistent(op: &str, stored: TypeTag, got: TypeTag) -> ! {
    #[cfg(feature = "tracing")]
    tracing::error!(op, stored = %stored, got = %got, "inconsistently typed value for AnyCell");
    panic!("typed_atomic: {op} of inconsistently typed value into AnyCell (stored {stored}, got {got})")
}

/// An atomic cell holding a value of one concrete type.
///
/// Values are stored as `Arc<T>`. The first store fixes the cell's concrete
/// type; every later store, swap or compare-and-swap must use that same type.
/// For a sized `T` this is guaranteed by the compiler. For `dyn Any` cells
/// (the default) it is checked on each write, and a mismatch panics.
///
/// An empty cell loads as `None`. A write never stores "nothing", so once a
/// value is in, the cell stays non-empty until it is dropped.
///
/// All operations are lock-free and sequentially consistent.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use typed_atomic::AnyCell;
///
/// let config: AnyCell = AnyCell::new();
/// assert!(config.load().is_none());
///
/// config.store(Arc::new(String::from("v1")));
/// let prev = config.swap(Arc::new(String::from("v2"))).unwrap();
/// assert_eq!(prev.downcast_ref::<String>().unwrap(), "v1");
/// ```
pub struct AnyCell<T: ?Sized + Dynamic = dyn Any + Send + Sync> {
    slot: Atomic<Slot<T>>,
}

impl<T: ?Sized + Dynamic> AnyCell<T> {
    /// Creates an empty cell.
    pub const fn new() -> Self {
        AnyCell {
            slot: Atomic::null(),
        }
    }

    /// Loads the most recently stored value, or `None` if nothing has been
    /// stored yet.
    pub fn load(&self) -> Option<Arc<T>> {
        let guard = epoch::pin();
        let current = self.slot.load(SeqCst, &guard);

        // The slot cannot be reclaimed while `guard` is pinned
        unsafe { current.as_ref() }.map(|slot| Arc::clone(&slot.value))
    }

    /// The type fixed by the first store, if any.
    pub fn stored_type(&self) -> Option<TypeTag> {
        let guard = epoch::pin();
        let current = self.slot.load(SeqCst, &guard);
        unsafe { current.as_ref() }.map(|slot| slot.tag)
    }

    /// Stores `val` into the cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell already holds a value of a different concrete type.
    #[track_caller]
    pub fn store(&self, val: Arc<T>) {
        self.replace("store", val);
    }

    /// Stores `new` into the cell and returns the previous value, or `None` if
    /// the cell was empty.
    ///
    /// # Panics
    ///
    /// Panics if the cell already holds a value of a different concrete type.
    #[track_caller]
    pub fn swap(&self, new: Arc<T>) -> Option<Arc<T>> {
        self.replace("swap", new)
    }

    #[track_caller]
    fn replace(&self, op: &str, val: Arc<T>) -> Option<Arc<T>> {
        let tag = <T as Dynamic>::type_tag(&val);
        let guard = epoch::pin();
        let mut new = Owned::new(Slot { tag, value: val });
        let mut current = self.slot.load(SeqCst, &guard);
        loop {
            if let Some(slot) = unsafe { current.as_ref() } {
                if slot.tag != tag {
                    inconsistent(op, slot.tag, tag);
                }
            }
            match self.slot.compare_exchange(current, new, SeqCst, SeqCst, &guard) {
                Ok(_) => return unsafe { retire(current, tag, &guard) },
                Err(err) => {
                    current = err.current;
                    new = err.new;
                }
            }
        }
    }

    /// Stores `new` if the current value is equal (`==`) to `old`.
    ///
    /// Returns whether the value was written. An empty cell never matches.
    ///
    /// # Panics
    ///
    /// Panics if `old` and `new` have different concrete types, or if `new`'s
    /// type differs from the type held by the cell.
    #[track_caller]
    pub fn compare_and_swap(&self, old: &T, new: Arc<T>) -> bool
    where
        T: PartialEq,
    {
        let tag = <T as Dynamic>::type_tag(&new);
        let old_tag = <T as Dynamic>::type_tag(old);
        if old_tag != tag {
            inconsistent("compare and swap", old_tag, tag);
        }

        let guard = epoch::pin();
        let mut new = Owned::new(Slot { tag, value: new });
        let mut current = self.slot.load(SeqCst, &guard);
        loop {
            let slot = match unsafe { current.as_ref() } {
                Some(slot) => slot,
                None => return false,
            };
            if slot.tag != tag {
                inconsistent("compare and swap", slot.tag, tag);
            }
            if &*slot.value != old {
                return false;
            }
            match self.slot.compare_exchange(current, new, SeqCst, SeqCst, &guard) {
                Ok(_) => {
                    unsafe { guard.defer_destroy(current) };
                    return true;
                }
                Err(err) => {
                    current = err.current;
                    new = err.new;
                }
            }
        }
    }

    /// Stores `new` if the cell currently holds exactly the allocation `old`
    /// points to, or is empty when `old` is `None`.
    ///
    /// Unlike [`AnyCell::compare_and_swap`] this compares identity, so it
    /// also works for trait objects.
    ///
    /// # Panics
    ///
    /// Same as [`AnyCell::compare_and_swap`].
    #[track_caller]
    pub fn compare_and_swap_ptr(&self, old: Option<&Arc<T>>, new: Arc<T>) -> bool {
        let tag = <T as Dynamic>::type_tag(&new);
        if let Some(old) = old {
            let old_tag = <T as Dynamic>::type_tag(old);
            if old_tag != tag {
                inconsistent("compare and swap", old_tag, tag);
            }
        }

        let guard = epoch::pin();
        let mut new = Owned::new(Slot { tag, value: new });
        let mut current = self.slot.load(SeqCst, &guard);
        loop {
            match (unsafe { current.as_ref() }, old) {
                (None, None) => {}
                (None, Some(_)) => return false,
                (Some(slot), old) => {
                    if slot.tag != tag {
                        inconsistent("compare and swap", slot.tag, tag);
                    }
                    match old {
                        Some(old) if same_allocation(&slot.value, old) => {}
                        _ => return false,
                    }
                }
            }
            match self.slot.compare_exchange(current, new, SeqCst, SeqCst, &guard) {
                Ok(_) => {
                    drop(unsafe { retire(current, tag, &guard) });
                    return true;
                }
                Err(err) => {
                    current = err.current;
                    new = err.new;
                }
            }
        }
    }

    /// Consumes the cell and returns the contained value.
    pub fn into_inner(mut self) -> Option<Arc<T>> {
        self.take()
    }

    fn take(&mut self) -> Option<Arc<T>> {
        // `&mut self` rules out concurrent readers, so no pinning is needed
        let guard = unsafe { epoch::unprotected() };
        let current = self.slot.swap(Shared::null(), Relaxed, guard);
        if current.is_null() {
            return None;
        }
        let slot = unsafe { current.into_owned() }.into_box();
        Some(slot.value)
    }
}

impl<T: ?Sized + Dynamic> Default for AnyCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Dynamic> Drop for AnyCell<T> {
    fn drop(&mut self) {
        drop(self.take());
    }
}

impl<T: ?Sized + Dynamic> fmt::Debug for AnyCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCell")
            .field("stored_type", &self.stored_type())
            .finish_non_exhaustive()
    }
}
