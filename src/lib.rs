//! ## Intro
//!
//! A contiguous, growable array container built from two layers:
//!
//! - [`RawStorage`] owns one block of uninitialized memory obtained from an
//!   [`Allocator`] strategy. It knows its capacity and nothing else.
//! - [`DynArray`] owns one `RawStorage` and tracks how many of its leading
//!   slots hold live values.
//!
//! Every mutating operation gives a precise guarantee about what happens when
//! it fails, whether the storage could not be obtained or an element
//! constructor or `clone` failed:
//!
//! - obtaining storage either succeeds or leaves the array untouched;
//! - building elements part-way drops exactly the elements that call built,
//!   and the length is restored to the elements that are still valid.
//!
//! ```
//! # use dynarray::{DynArray, dynarray};
//! let mut vec: DynArray<i32> = DynArray::new();
//! for i in 0..5 {
//!     vec.push(i);
//! }
//! assert_eq!(vec.capacity(), 8);
//!
//! vec.insert(1, 99);
//! assert_eq!(vec, [0, 99, 1, 2, 3, 4]);
//!
//! let next = vec.erase(1);
//! assert_eq!(vec[next], 1);
//! ```
//!
//! ## Fallible construction
//!
//! Operations that build elements come in two flavors: the plain one runs a
//! closure that may panic, the `try_` one runs a closure returning a [`Result`]
//! and reports its error as [`EmplaceError::Element`].
//!
//! ```
//! # use dynarray::{dynarray, EmplaceError};
//! let mut vec = dynarray![1, 2, 3];
//! let err = vec.try_emplace_with(1, || "x".parse::<i32>());
//! assert!(matches!(err, Err(EmplaceError::Element(_))));
//! assert_eq!(vec, [1, 2, 3]);
//! ```
//!
//! ## Allocation strategies
//!
//! [`Global`] is the default. Any type implementing [`Allocator`] can stand in,
//! which makes allocation failure observable without running out of memory.
//!
//! ## `no_std` support
//!
//! This crate requires only `core` and `alloc`.
//!
//! ## Optional features
//!
//! ### `std`
//!
//! Implements [`std::io::Write`] for `DynArray<u8, A>`.
//!
//! ### `log`
//!
//! Emits `trace` records (target `dynarray`) through the [`log`] facade when
//! storage is relocated or an allocation is refused.
//!
//! [`std::io::Write`]: https://doc.rust-lang.org/std/io/trait.Write.html
//! [`log`]: https://docs.rs/log
#![no_std]

extern crate alloc;

mod utils;

pub mod allocator;
#[doc(inline)]
pub use allocator::{Allocator, Global};

mod error;
pub use error::{EmplaceError, ReserveError};

pub mod raw_storage;
#[doc(inline)]
pub use raw_storage::RawStorage;

pub mod dyn_array;
#[doc(inline)]
pub use dyn_array::{DynArray, IntoIter};

#[cfg(feature = "std")]
mod std_io;
