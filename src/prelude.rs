//! Commonly used items for convenient importing.
//!
//! # Usage
//!
//! ```rust
//! use crossing::prelude::*;
//!
//! fn checked_div(a: i64, b: i64) -> Result<i64, Error> {
//!     if b == 0 {
//!         ffi_bail!(ValueError, "Division by zero");
//!     }
//!     Ok(a / b)
//! }
//!
//! let divide = Function::from_typed(checked_div);
//! let result: Expected<i64> = divide.call_expected((1_i64, 0_i64));
//! assert_eq!(result.error().message(), "Division by zero");
//! ```
//!
//! # What's Included
//!
//! - **[`Any`]**, **[`AnyCodec`]**: the erased value slot and its codec
//!   protocol
//! - **[`Array`]**, **[`Expected`]**: the generic containers
//! - **[`Error`]** and its well-known [`kinds`]
//! - **[`Function`]**
//! - **[`ffi_error!`]** and **[`ffi_bail!`]**: macros for creating and
//!   returning errors

pub use crate::{
    Any, AnyCodec, Array, Error, Expected, Function, error::kinds, ffi_bail, ffi_error,
};
