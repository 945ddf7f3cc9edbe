//! This crate provides strongly-typed atomic cells.
//!
//! An [`AtomicCell<T, A>`] lets callers load, store, swap and compare-and-swap
//! values of their own type `T`, while the atomic instructions operate on a
//! fixed-width `core` atomic `A`.
//!
//! # How it Works
//!
//! A type opts into a storage width by implementing [`Repr<A>`] for it (e.g.
//! a `#[repr(transparent)]` wrapper around `i32` implements
//! `Repr<AtomicI32>`). Under the hood the value is reinterpreted bit for bit as
//! the base type of the storage, and the atomic operation runs on the
//! storage. A size mismatch between `T` and the storage is a compile error.
//!
//! Arithmetic and bitwise operations (`add`, `and`, `or`) also require
//! [`Bits<A>`], because they can produce values nobody stored.
//!
//! The named aliases [`BoolCell`], [`Int32Cell`], [`Int64Cell`],
//! [`Uint32Cell`] and [`Uint64Cell`] cover the common widths.
//!
//! With the `std` feature (on by default), [`AnyCell`] holds an arbitrary
//! reference-counted value whose concrete type is fixed by the first store
//! and checked on each write.
//!
//! ```
//! use std::thread;
//! use typed_atomic::{atomic::AtomicI32, Int32Cell, Repr};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! #[repr(i32)]
//! enum Fruit {
//!     Apple,
//!     Banana,
//!     Cherry,
//! }
//!
//! // SAFETY: `Fruit` is a fieldless `i32` enum whose zero value is `Apple`
//! unsafe impl Repr<AtomicI32> for Fruit {}
//!
//! static FRUIT: Int32Cell<Fruit> = Int32Cell::zeroed();
//!
//! thread::scope(|s| {
//!     s.spawn(|| FRUIT.store(Fruit::Banana));
//!     s.spawn(|| FRUIT.store(Fruit::Cherry));
//! });
//! assert!(matches!(FRUIT.load(), Fruit::Banana | Fruit::Cherry));
//! ```
//!
//! [`AtomicI32`]: atomic::AtomicI32
#![cfg_attr(not(feature = "std"), no_std)]

pub mod atomic;
mod cell;
pub mod repr;

#[cfg(feature = "std")]
mod any;

pub use cell::{AtomicCell, BoolCell, Int32Cell, Int64Cell, Uint32Cell, Uint64Cell};
pub use repr::{Bits, Repr};

#[cfg(feature = "std")]
pub use any::{AnyCell, Dynamic, TypeTag};
