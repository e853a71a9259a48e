//! Bidirectional integration with the [`anyhow`] 1.x error handling library.
//!
//! This module specifically supports `anyhow` version 1.x. To enable this
//! integration, add the `compat-anyhow1` feature flag to your `Cargo.toml`.
//!
//! # Converting from Anyhow
//!
//! [`Error`] implements `From<anyhow::Error>`, so a typed callable may return
//! [`anyhow::Result<T>`] directly. The [`IntoFfiError`] trait performs the
//! same conversion explicitly:
//!
//! ```
//! use crossing::{Error, compat::IntoFfiError};
//!
//! fn anyhow_function() -> anyhow::Result<String> {
//!     anyhow::bail!("something went wrong");
//! }
//!
//! let error: Error = anyhow_function().into_ffi_error().unwrap_err();
//! assert_eq!(error.kind(), "RuntimeError");
//! assert_eq!(error.message(), "something went wrong");
//! ```
//!
//! Context added with [`anyhow::Context`] ends up in the message:
//!
//! ```
//! use anyhow::Context;
//! use crossing::Error;
//!
//! let result: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
//! let error = Error::from(result.context("failed to load config").unwrap_err());
//! assert_eq!(error.message(), "failed to load config: connection refused");
//! ```
//!
//! # Converting to Anyhow
//!
//! [`Error`] is a standard error type, so `?` already converts it. The
//! [`IntoAnyhow`] trait spells the conversion out, and an [`Error`] wrapped
//! this way is recovered unchanged when converted back:
//!
//! ```
//! use crossing::{Error, compat::anyhow1::IntoAnyhow};
//!
//! let original = Error::new("KeyError", "missing `name`");
//! let wrapped: anyhow::Error = original.clone().into_anyhow();
//! assert_eq!(wrapped.to_string(), "KeyError: missing `name`");
//! assert_eq!(Error::from(wrapped), original);
//! ```

use super::{IntoFfiError, foreign_error};
use crate::Error;

impl From<anyhow::Error> for Error {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<Error>() {
            Ok(error) => error,
            Err(error) => foreign_error(&error),
        }
    }
}

impl IntoFfiError for anyhow::Error {
    type Output = Error;

    #[inline(always)]
    fn into_ffi_error(self) -> Self::Output {
        Error::from(self)
    }
}

impl<T> IntoFfiError for anyhow::Result<T> {
    type Output = Result<T, Error>;

    #[inline(always)]
    fn into_ffi_error(self) -> Self::Output {
        self.map_err(IntoFfiError::into_ffi_error)
    }
}

/// A trait for converting crossing errors into [`anyhow`] errors.
pub trait IntoAnyhow {
    /// The type produced by the conversion.
    ///
    /// - For [`Error`]: produces [`anyhow::Error`]
    /// - For [`Result<T, Error>`]: produces [`anyhow::Result<T>`]
    type Output;

    /// Converts this value into an anyhow type.
    fn into_anyhow(self) -> Self::Output;
}

impl IntoAnyhow for Error {
    type Output = anyhow::Error;

    fn into_anyhow(self) -> Self::Output {
        anyhow::Error::new(self)
    }
}

impl<T> IntoAnyhow for Result<T, Error> {
    type Output = anyhow::Result<T>;

    fn into_anyhow(self) -> Self::Output {
        self.map_err(IntoAnyhow::into_anyhow)
    }
}
