//! Bidirectional integration with the [`eyre`] 0.6.x error handling library.
//!
//! This module specifically supports `eyre` version 0.6.x. To enable this
//! integration, add the `compat-eyre06` feature flag to your `Cargo.toml`.
//!
//! # Converting from Eyre
//!
//! [`Error`] implements `From<eyre::Report>`, so a typed callable may return
//! [`eyre::Result<T>`] directly. The [`IntoFfiError`] trait performs the same
//! conversion explicitly:
//!
//! ```
//! use crossing::{Error, compat::IntoFfiError};
//!
//! fn eyre_function() -> eyre::Result<String> {
//!     eyre::bail!("something went wrong");
//! }
//!
//! let error: Error = eyre_function().into_ffi_error().unwrap_err();
//! assert_eq!(error.kind(), "RuntimeError");
//! assert_eq!(error.message(), "something went wrong");
//! ```
//!
//! # Converting to Eyre
//!
//! ```
//! use crossing::{Error, compat::eyre06::IntoEyre};
//!
//! let original = Error::new("KeyError", "missing `name`");
//! let report: eyre::Report = original.clone().into_eyre();
//! assert_eq!(report.to_string(), "KeyError: missing `name`");
//! assert_eq!(Error::from(report), original);
//! ```

use super::{IntoFfiError, foreign_error};
use crate::Error;

impl From<eyre::Report> for Error {
    fn from(report: eyre::Report) -> Self {
        match report.downcast::<Error>() {
            Ok(error) => error,
            Err(report) => foreign_error(&report),
        }
    }
}

impl IntoFfiError for eyre::Report {
    type Output = Error;

    #[inline(always)]
    fn into_ffi_error(self) -> Self::Output {
        Error::from(self)
    }
}

impl<T> IntoFfiError for eyre::Result<T> {
    type Output = Result<T, Error>;

    #[inline(always)]
    fn into_ffi_error(self) -> Self::Output {
        self.map_err(IntoFfiError::into_ffi_error)
    }
}

/// A trait for converting crossing errors into [`eyre`] reports.
pub trait IntoEyre {
    /// The type produced by the conversion.
    ///
    /// - For [`Error`]: produces [`eyre::Report`]
    /// - For [`Result<T, Error>`]: produces [`eyre::Result<T>`]
    type Output;

    /// Converts this value into an eyre type.
    fn into_eyre(self) -> Self::Output;
}

impl IntoEyre for Error {
    type Output = eyre::Report;

    fn into_eyre(self) -> Self::Output {
        eyre::Report::new(self)
    }
}

impl<T> IntoEyre for Result<T, Error> {
    type Output = eyre::Result<T>;

    fn into_eyre(self) -> Self::Output {
        self.map_err(IntoEyre::into_eyre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kinds;

    #[test]
    fn test_foreign_report_keeps_context_chain() {
        let report = eyre::eyre!("connection refused").wrap_err("failed to load config");
        let error = report.into_ffi_error();
        assert_eq!(error.kind(), kinds::RUNTIME_ERROR);
        assert_eq!(error.message(), "failed to load config: connection refused");
    }

    #[test]
    fn test_wrapped_error_is_recovered() {
        let original = Error::new(kinds::VALUE_ERROR, "bad input");
        let result: Result<(), Error> = Err(original.clone());
        assert_eq!(result.into_eyre().into_ffi_error(), Err(original));
    }
}
