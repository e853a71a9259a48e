#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Typed values and structured failures for crossing a call boundary.
//!
//! ## Overview
//!
//! Code on both sides of a call boundary agrees on a single erased value
//! representation, [`Any`], and a single structured error, [`Error`]. Every
//! type that can cross the boundary implements [`AnyCodec`], the protocol that
//! stores a value into an [`Any`] slot and reads it back out.
//!
//! [`Expected<T>`] is the success-or-error container built on top of that
//! protocol. It lets a callee report a failure as data instead of unwinding,
//! and it is transparent to the erasure layer: storing an `Expected<T>` stores
//! whichever branch is active, and reading a slot as `Expected<T>` re-wraps
//! whichever of `T` or [`Error`] it finds.
//!
//! ## Quick Example
//!
//! ```
//! use crossing::{Any, Error, Expected};
//!
//! fn parse(text: &str) -> Expected<i64> {
//!     match text.parse() {
//!         Ok(value) => Expected::success(value),
//!         Err(_) => Expected::failure(Error::new("ValueError", "not a number")),
//!     }
//! }
//!
//! let slot = Any::new(parse("12"));
//! assert_eq!(slot.type_str(), "int");
//! assert_eq!(slot.get::<Expected<i64>>().map(|e| e.value()), Some(12));
//!
//! let slot = Any::new(parse("twelve"));
//! assert_eq!(slot.type_str(), "ffi.Error");
//! assert!(slot.get::<Expected<i64>>().is_some_and(|e| e.is_failure()));
//! ```
//!
//! ## Core Concepts
//!
//! - **[`Any`]**: a fixed-shape slot holding `None`, a `bool`, an integer, a
//!   float, or a reference-counted object such as a string, an [`Error`] or an
//!   [`Array`].
//! - **[`AnyCodec`]**: strict checks, copy/move in and out, best-effort
//!   conversion and introspection (`type_str`, `type_schema`) for one type.
//! - **[`Expected<T>`]**: exactly one of a `T` or an [`Error`]. `T` may not
//!   itself be able to hold an [`Error`]; `Expected<Error>` does not compile.
//! - **[`Function`]**: a type-erased callable. Typed closures are adapted
//!   automatically, and [`Function::call_expected`] is the opt-in calling
//!   convention that turns native failures into the error branch of an
//!   [`Expected<T>`].
//!
//! For the low-level object storage, see the [`crossing-internals`] crate.
//!
//! [`crossing-internals`]: crossing_internals
//!
//! ## Features
//!
//! - `std` (default): catches panics in [`Function::call_expected`], uses
//!   `std::sync` for the global function table and enables
//!   [`Error::raise`].
//! - `backtrace`: errors created by [`ffi_error!`] carry a captured stack
//!   backtrace in their trace.
//! - `compat-anyhow1`, `compat-eyre06`: conversions from [`anyhow`] and
//!   [`eyre`] errors. See [`compat`].
//!
//! [`anyhow`]: https://docs.rs/anyhow
//! [`eyre`]: https://docs.rs/eyre

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod any;
pub mod array;
pub mod codec;
pub mod compat;
pub mod error;
pub mod expected;
pub mod function;
pub mod handlers;
pub mod prelude;

mod util;

pub use self::{
    any::Any,
    array::Array,
    codec::AnyCodec,
    error::Error,
    expected::Expected,
    function::{CallReturn, Function, PackArgs, TypedCallable},
};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    use alloc::{fmt, string::String};
    #[doc(hidden)]
    pub use core::{format_args, result::Result::Err, stringify};

    use crate::Error;

    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    #[track_caller]
    pub fn error_at_caller(kind: &str, args: fmt::Arguments<'_>) -> Error {
        let message = match args.as_str() {
            Some(message) => String::from(message),
            None => fmt::format(args),
        };
        let location = core::panic::Location::caller();

        #[cfg(not(feature = "backtrace"))]
        let trace = alloc::format!("  at {location}");

        #[cfg(feature = "backtrace")]
        let trace = alloc::format!(
            "  at {location}\n{:?}",
            backtrace::Backtrace::new()
        );

        Error::new(kind, message).with_trace(trace)
    }
}
