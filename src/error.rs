//! The structured error carried across call boundaries.
//!
//! An [`Error`] is a plain value made of three strings: a classification
//! (its *kind*), a human-readable message and a textual trace. Errors are
//! compared by field, never by identity, so an error that has been stored in
//! an [`Any`](crate::Any) slot and read back out is equal to the original.
//!
//! # Examples
//!
//! ```
//! use crossing::{Error, error::kinds};
//!
//! let error = Error::new(kinds::VALUE_ERROR, "bad input");
//! assert_eq!(error.kind(), "ValueError");
//! assert_eq!(error.message(), "bad input");
//! assert_eq!(error.to_string(), "ValueError: bad input");
//! ```

use alloc::{format, string::String};
use core::fmt;

/// Well-known error kinds.
///
/// Kinds are free-form strings, these are simply the ones this crate produces
/// itself plus the ones callers reach for most often.
pub mod kinds {
    /// A value had the right type but an unacceptable content.
    pub const VALUE_ERROR: &str = "ValueError";
    /// A value could not be converted to the requested type.
    pub const TYPE_ERROR: &str = "TypeError";
    /// A generic failure with no better classification.
    pub const RUNTIME_ERROR: &str = "RuntimeError";
    /// An index was out of bounds.
    pub const INDEX_ERROR: &str = "IndexError";
    /// A key was missing from a mapping.
    pub const KEY_ERROR: &str = "KeyError";
    /// A named attribute does not exist.
    pub const ATTRIBUTE_ERROR: &str = "AttributeError";
    /// An internal invariant was broken.
    pub const INTERNAL_ERROR: &str = "InternalError";
}

/// A structured error: `{kind, message, trace}`.
///
/// `Error` is the only error representation that crosses a call boundary. It
/// implements [`core::error::Error`], so it composes with `?` and with the
/// wider error-handling ecosystem.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: String,
    message: String,
    trace: String,
}

impl Error {
    /// Creates a new error with an empty trace.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            trace: String::new(),
        }
    }

    /// Replaces the trace of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing::Error;
    ///
    /// let error = Error::new("RuntimeError", "lost").with_trace("  at worker.rs:10");
    /// assert_eq!(error.trace(), "  at worker.rs:10");
    /// ```
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }

    /// The classification of this error, such as `"ValueError"`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The textual trace, which may be empty.
    #[must_use]
    pub fn trace(&self) -> &str {
        &self.trace
    }

    /// Returns `true` if this error has the given kind.
    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Raises this error as a native failure.
    ///
    /// The error becomes the payload of a panic, so a guarded call site such
    /// as [`Function::call_expected`](crate::Function::call_expected) recovers
    /// it with every field intact.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing::{Error, Function};
    ///
    /// let checked = Function::from_typed(|value: i64| -> i64 {
    ///     if value < 0 {
    ///         Error::new("ValueError", "negative").raise();
    ///     }
    ///     value
    /// });
    ///
    /// let result = checked.call_expected::<i64>((-1_i64,));
    /// assert_eq!(result.error().kind(), "ValueError");
    /// ```
    ///
    /// # Panic hook
    ///
    /// Raising is an ordinary panic, so the installed panic hook runs before
    /// any guarded call site sees the error. The default hook prints a
    /// `thread '...' panicked` line to stderr even when the error ends up as
    /// data. A hook that skips [`Error`] payloads keeps stderr quiet while
    /// still reporting every other panic:
    ///
    /// ```
    /// use std::panic;
    ///
    /// use crossing::{Error, Function};
    ///
    /// let default_hook = panic::take_hook();
    /// panic::set_hook(Box::new(move |info| {
    ///     if info.payload().downcast_ref::<Error>().is_none() {
    ///         default_hook(info);
    ///     }
    /// }));
    ///
    /// let checked = Function::from_typed(|value: i64| -> i64 {
    ///     if value < 0 {
    ///         Error::new("ValueError", "negative").raise();
    ///     }
    ///     value
    /// });
    /// let result = checked.call_expected::<i64>((-1_i64,));
    /// assert_eq!(result.error().message(), "negative");
    ///
    /// drop(panic::take_hook());
    /// ```
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    #[cold]
    #[track_caller]
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }

    #[must_use]
    pub(crate) fn type_mismatch(from: &str, to: &str) -> Self {
        Self::new(
            kinds::TYPE_ERROR,
            format!("Cannot convert from type `{from}` to `{to}`"),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() && !self.trace.is_empty() {
            writeln!(f, "{}", self.trace)?;
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl core::error::Error for Error {}
