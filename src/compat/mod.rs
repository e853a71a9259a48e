//! Compatibility with other error handling libraries.
//!
//! # Overview
//!
//! A typed [`Function`](crate::Function) may only fail with a crossing
//! [`Error`]. The submodules here convert the errors of popular libraries into
//! that shape, so code written against them can be registered without being
//! rewritten.
//!
//! # Available Integrations
//!
//! - [`anyhow1`] - Integration with the `anyhow` 1.x error handling library
//!   (requires the `compat-anyhow1` feature flag)
//! - [`eyre06`] - Integration with the `eyre` 0.6.x error handling library
//!   (requires the `compat-eyre06` feature flag)
//!
//! Going the other way needs no glue: [`Error`] implements
//! [`core::error::Error`] and is `Send + Sync`, so `?` converts it into an
//! `anyhow::Error` or an `eyre::Report` directly.
//!
//! # Conversion Rules
//!
//! - An external error that wraps a crossing [`Error`] is unwrapped and keeps
//!   its kind, message and trace.
//! - Any other external error becomes a `RuntimeError`. Its message is the
//!   error together with its chain of causes, and its trace is the library's
//!   own debug rendering.
//!
//! # Example
//!
//! ```
//! use crossing::{Function, compat::IntoFfiError};
//!
//! # #[cfg(feature = "compat-anyhow1")] {
//! fn legacy_lookup(key: String) -> anyhow::Result<i64> {
//!     anyhow::ensure!(key == "answer", "unknown key {key}");
//!     Ok(42)
//! }
//!
//! let lookup = Function::from_typed(|key: String| legacy_lookup(key).into_ffi_error());
//! assert_eq!(lookup.call_as::<i64>(("answer".to_string(),)), Ok(42));
//!
//! let failed = lookup.call_expected::<i64>(("question".to_string(),));
//! assert_eq!(failed.error().kind(), "RuntimeError");
//! assert_eq!(failed.error().message(), "unknown key question");
//! # }
//! ```
//!
//! [`Error`]: crate::Error

/// A trait for converting external error types into a crossing [`Error`].
///
/// The trait provides the `.into_ffi_error()` method, which converts both
/// individual error values and `Result` types.
///
/// # Implementations
///
/// - [`anyhow1`] module provides implementations for [`anyhow::Error`] and
///   [`anyhow::Result<T>`]
/// - [`eyre06`] module provides implementations for [`eyre::Report`] and
///   [`eyre::Result<T>`]
///
/// [`anyhow::Error`]: ::anyhow::Error
/// [`anyhow::Result<T>`]: ::anyhow::Result
/// [`eyre::Report`]: ::eyre::Report
/// [`eyre::Result<T>`]: ::eyre::Result
/// [`Error`]: crate::Error
///
/// # Examples
///
/// ```
/// use crossing::{Error, compat::IntoFfiError};
///
/// # #[cfg(feature = "compat-eyre06")] {
/// let report = eyre::eyre!("database connection failed");
/// let error: Error = report.into_ffi_error();
/// assert_eq!(error.kind(), "RuntimeError");
/// assert_eq!(error.message(), "database connection failed");
/// # }
/// ```
pub trait IntoFfiError {
    /// The type produced by the conversion.
    ///
    /// For error types, this is [`Error`]. For `Result` types, this is
    /// `Result<T, Error>`.
    type Output;

    /// Converts this value into a crossing type.
    fn into_ffi_error(self) -> Self::Output;
}

/// Builds the `RuntimeError` for an external error that does not wrap a
/// crossing error.
///
/// `error` must render its chain of causes with the alternate flag, as both
/// `anyhow` and `eyre` do.
#[cfg(any(feature = "compat-anyhow1", feature = "compat-eyre06"))]
fn foreign_error<E>(error: &E) -> crate::Error
where
    E: core::fmt::Display + core::fmt::Debug + ?Sized,
{
    use crate::{Error, error::kinds};

    let message = alloc::format!("{error:#}");
    let trace = alloc::format!("{error:?}");
    tracing::trace!(message = message.as_str(), "converted foreign error");
    if trace == message {
        Error::new(kinds::RUNTIME_ERROR, message)
    } else {
        Error::new(kinds::RUNTIME_ERROR, message).with_trace(trace)
    }
}

#[cfg(feature = "compat-anyhow1")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-anyhow1")))]
pub mod anyhow1;

#[cfg(feature = "compat-eyre06")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-eyre06")))]
pub mod eyre06;
