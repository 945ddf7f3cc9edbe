use std::mem;
use std::num::NonZeroU32;
use std::thread;

use typed_atomic::{
    atomic::*, AtomicCell, Bits, BoolCell, Int32Cell, Int64Cell, Repr, Uint32Cell, Uint64Cell,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct Fruit(i32);

impl Fruit {
    const APPLE: Fruit = Fruit(0);
    const BANANA: Fruit = Fruit(1);
    const CHERRY: Fruit = Fruit(2);
}

unsafe impl Repr<AtomicI32> for Fruit {}
unsafe impl Bits<AtomicI32> for Fruit {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
enum Phase {
    Idle,
    Running,
    Done,
}

unsafe impl Repr<AtomicU32> for Phase {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct Ready(bool);

unsafe impl Repr<AtomicBool> for Ready {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct Offset(i64);

unsafe impl Repr<AtomicI64> for Offset {}
unsafe impl Bits<AtomicI64> for Offset {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct Flags(u64);

unsafe impl Repr<AtomicU64> for Flags {}
unsafe impl Bits<AtomicU64> for Flags {}

/// A raw handle: `Send` but not `Sync`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct Handle(*const u8);

unsafe impl Send for Handle {}
unsafe impl Repr<AtomicUsize> for Handle {}

#[test]
fn supported() {
    #[repr(align(8))]
    struct U64Align8(u64);

    assert!(AtomicCell::<bool, AtomicBool>::SUPPORTED);
    assert!(AtomicCell::<Ready, AtomicBool>::SUPPORTED);
    assert!(AtomicCell::<Fruit, AtomicI32>::SUPPORTED);
    assert!(AtomicCell::<Phase, AtomicU32>::SUPPORTED);
    assert!(AtomicCell::<char, AtomicU32>::SUPPORTED);
    assert!(AtomicCell::<Option<NonZeroU32>, AtomicU32>::SUPPORTED);
    assert!(AtomicCell::<Offset, AtomicI64>::SUPPORTED);
    assert!(AtomicCell::<Flags, AtomicU64>::SUPPORTED);

    assert_eq!(mem::size_of::<U64Align8>(), 8);
    assert!(AtomicCell::<U64Align8, AtomicU64>::SUPPORTED);

    assert!(!AtomicCell::<u128, AtomicU64>::SUPPORTED);
    assert!(!AtomicCell::<u8, AtomicU32>::SUPPORTED);
    assert!(!AtomicCell::<u64, AtomicBool>::SUPPORTED);
}

#[test]
fn cells_are_as_wide_as_their_storage() {
    assert_eq!(mem::size_of::<BoolCell<Ready>>(), mem::size_of::<AtomicBool>());
    assert_eq!(mem::size_of::<Int32Cell<Fruit>>(), 4);
    assert_eq!(mem::size_of::<Uint32Cell<Phase>>(), 4);
    assert_eq!(mem::size_of::<Int64Cell<Offset>>(), 8);
    assert_eq!(mem::size_of::<Uint64Cell<Flags>>(), 8);
}

#[test]
fn zero_value() {
    assert!(!BoolCell::<bool>::default().load());
    assert_eq!(BoolCell::<Ready>::zeroed().load(), Ready(false));
    assert_eq!(Int32Cell::<Fruit>::default().load(), Fruit::APPLE);
    assert_eq!(Uint32Cell::<Phase>::zeroed().load(), Phase::Idle);
    assert_eq!(Uint32Cell::<char>::default().load(), '\0');
    assert_eq!(Uint32Cell::<Option<NonZeroU32>>::default().load(), None);
    assert_eq!(Int64Cell::<Offset>::default().load(), Offset(0));
    assert_eq!(Uint64Cell::<Flags>::zeroed().load(), Flags(0));
}

#[test]
fn zeroed_in_static() {
    static PHASE: Uint32Cell<Phase> = Uint32Cell::zeroed();
    static READY: BoolCell<Ready> = BoolCell::new(Ready(true));

    assert_eq!(PHASE.swap(Phase::Running), Phase::Idle);
    assert!(PHASE.compare_and_swap(Phase::Running, Phase::Done));
    assert_eq!(PHASE.load(), Phase::Done);
    assert_eq!(READY.load(), Ready(true));
}

#[test]
fn bool_cell() {
    let a = BoolCell::new(Ready(false));

    a.store(Ready(true));
    assert_eq!(a.load(), Ready(true));
    assert_eq!(a.swap(Ready(false)), Ready(true));
    assert!(!a.compare_and_swap(Ready(true), Ready(true)));
    assert_eq!(a.load(), Ready(false));
    assert!(a.compare_and_swap(Ready(false), Ready(true)));
    assert_eq!(a.load(), Ready(true));
}

#[test]
fn int32_cell() {
    let a = Int32Cell::new(Fruit::APPLE);

    a.store(Fruit::CHERRY);
    assert_eq!(a.load(), Fruit::CHERRY);
    assert_eq!(a.swap(Fruit::BANANA), Fruit::CHERRY);
    assert!(!a.compare_and_swap(Fruit::APPLE, Fruit::CHERRY));
    assert_eq!(a.load(), Fruit::BANANA);
    assert!(a.compare_and_swap(Fruit::BANANA, Fruit::APPLE));
    assert_eq!(a.load(), Fruit::APPLE);

    assert_eq!(a.add(Fruit(2)), Fruit::CHERRY);
    assert_eq!(a.add(Fruit(-1)), Fruit::BANANA);
    assert_eq!(a.or(Fruit(2)), Fruit::BANANA);
    assert_eq!(a.load(), Fruit(3));
    assert_eq!(a.and(Fruit(2)), Fruit(3));
    assert_eq!(a.load(), Fruit::CHERRY);
}

#[test]
fn int64_cell() {
    let a = Int64Cell::new(Offset(i64::MAX));

    assert_eq!(a.add(Offset(1)), Offset(i64::MIN));
    assert_eq!(a.swap(Offset(-8)), Offset(i64::MIN));
    assert_eq!(a.and(Offset(0xff)), Offset(-8));
    assert_eq!(a.load(), Offset(0xf8));
    assert_eq!(a.or(Offset(-0x100)), Offset(0xf8));
    assert_eq!(a.load(), Offset(-8));
    assert!(a.compare_and_swap(Offset(-8), Offset(8)));
    assert_eq!(a.load(), Offset(8));
}

#[test]
fn uint32_cell() {
    let a = Uint32Cell::new(u32::MAX);

    assert_eq!(a.add(1), 0);
    assert_eq!(a.or(0b0101), 0);
    assert_eq!(a.and(0b0110), 0b0101);
    assert_eq!(a.load(), 0b0100);
    assert!(!a.compare_and_swap(0, 1));
    assert_eq!(a.load(), 0b0100);
}

#[test]
fn uint64_cell() {
    let a = Uint64Cell::new(Flags(0));

    assert_eq!(a.or(Flags(1 << 63)), Flags(0));
    assert_eq!(a.or(Flags(1)), Flags(1 << 63));
    assert_eq!(a.and(Flags(!1)), Flags(1 << 63 | 1));
    assert_eq!(a.load(), Flags(1 << 63));
    assert_eq!(a.add(Flags(1 << 63)), Flags(0));
    assert_eq!(a.swap(Flags(u64::MAX)), Flags(0));
    assert_eq!(a.into_inner(), Flags(u64::MAX));
}

#[test]
fn unnamed_bit_patterns_round_trip() {
    let a = Int32Cell::new(Fruit::APPLE);

    a.store(Fruit(-7));
    assert_eq!(a.load(), Fruit(-7));
    assert_eq!(a.load_raw(), -7);
    assert_eq!(a.swap(Fruit(i32::MIN)), Fruit(-7));
    assert_eq!(a.load_raw(), i32::MIN);
}

#[test]
fn niche_types() {
    let a = Uint32Cell::<Option<NonZeroU32>>::default();

    assert_eq!(a.swap(NonZeroU32::new(5)), None);
    assert_eq!(a.load_raw(), 5);
    assert_eq!(a.add(NonZeroU32::new(u32::MAX - 4)), None);
    assert_eq!(a.or(NonZeroU32::new(3)), None);
    assert_eq!(a.load(), NonZeroU32::new(3));

    let c = Uint32Cell::new('a');
    assert_eq!(c.swap('€'), 'a');
    assert_eq!(c.load_raw(), '€' as u32);
}

#[test]
fn compare_is_bitwise() {
    #[derive(Clone, Copy, Eq, Debug)]
    #[repr(transparent)]
    struct Modular(u32);

    impl PartialEq for Modular {
        fn eq(&self, other: &Modular) -> bool {
            self.0 % 5 == other.0 % 5
        }
    }

    unsafe impl Repr<AtomicU32> for Modular {}

    let a = Uint32Cell::new(Modular(1));

    assert_eq!(a.load(), Modular(11));
    assert!(!a.compare_and_swap(Modular(6), Modular(2)));
    assert_eq!(a.load().0, 1);
    assert!(a.compare_and_swap(Modular(1), Modular(2)));
    assert_eq!(a.load().0, 2);
}

#[test]
fn compare_exchange() {
    let a = Int32Cell::new(Fruit::BANANA);

    assert_eq!(a.compare_exchange(Fruit::APPLE, Fruit::CHERRY), Err(Fruit::BANANA));
    assert_eq!(a.compare_exchange(Fruit::BANANA, Fruit::CHERRY), Ok(Fruit::BANANA));
    assert_eq!(a.load(), Fruit::CHERRY);
}

#[test]
fn fetch_update() {
    let a = Uint32Cell::new(Phase::Idle);

    let advance = |p| match p {
        Phase::Idle => Some(Phase::Running),
        Phase::Running => Some(Phase::Done),
        Phase::Done => None,
    };

    assert_eq!(a.fetch_update(advance), Ok(Phase::Idle));
    assert_eq!(a.fetch_update(advance), Ok(Phase::Running));
    assert_eq!(a.fetch_update(advance), Err(Phase::Done));
    assert_eq!(a.load(), Phase::Done);
}

#[test]
fn exclusive_access() {
    let mut a = Int64Cell::new(Offset(1));

    *a.get_mut() = Offset(40);
    a.get_mut().0 += 2;
    assert_eq!(a.load(), Offset(42));
    assert_eq!(a.into_inner(), Offset(42));

    let mut b = BoolCell::<Ready>::default();
    b.get_mut().0 = true;
    assert_eq!(b.load(), Ready(true));
}

#[test]
fn from_and_debug() {
    let a = Int32Cell::from(Fruit::CHERRY);
    assert_eq!(format!("{:?}", a), "Fruit(2)");

    let b: Uint32Cell<Phase> = Phase::Running.into();
    assert_eq!(format!("{:?}", b), "Running");

    let c: BoolCell = true.into();
    assert_eq!(format!("{:?}", c), "true");
}

#[test]
fn shared_with_send_only_values() {
    fn assert_sync<T: Sync>() {}
    fn assert_send<T: Send>() {}

    assert_sync::<AtomicCell<Handle, AtomicUsize>>();
    assert_send::<AtomicCell<Handle, AtomicUsize>>();

    static BYTE: u8 = 7;
    static HANDLE: AtomicCell<Handle, AtomicUsize> = AtomicCell::<Handle, AtomicUsize>::zeroed();

    assert_eq!(HANDLE.load(), Handle(std::ptr::null()));
    thread::scope(|s| {
        s.spawn(|| HANDLE.store(Handle(&BYTE)));
    });
    assert_eq!(HANDLE.load(), Handle(&BYTE));
    assert_eq!(unsafe { *HANDLE.load().0 }, 7);
}
