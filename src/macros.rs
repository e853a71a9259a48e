/// Creates an [`Error`](crate::Error) of the given kind from a format string.
///
/// The first argument is the error kind written as a bare identifier, such as
/// `ValueError` or `TypeError`. The remaining arguments are interpreted in the
/// same way as the [`format!()`] macro and become the error message.
///
/// The trace of the new error records the location where the macro was
/// invoked. With the `backtrace` feature enabled, a stack backtrace captured
/// at the same point is appended to the trace.
///
/// [`format!()`]: alloc::format
///
/// # Examples
///
/// ```
/// use crossing::ffi_error;
///
/// let index = 7;
/// let error = ffi_error!(IndexError, "index {} out of bounds", index);
/// assert_eq!(error.kind(), "IndexError");
/// assert_eq!(error.message(), "index 7 out of bounds");
/// assert!(error.trace().contains(file!()));
/// ```
#[macro_export]
macro_rules! ffi_error {
    ($kind:ident, $($arg:tt)+) => {
        $crate::__private::error_at_caller(
            $crate::__private::stringify!($kind),
            $crate::__private::format_args!($($arg)+),
        )
    };
}

/// Returns early with an error.
///
/// This is equivalent to writing `return Err(ffi_error!(...).into());`, so it
/// works in any function whose error type implements
/// `From<crossing::Error>`.
///
/// # Examples
///
/// ```
/// use crossing::{Error, ffi_bail};
///
/// fn checked_div(a: i64, b: i64) -> Result<i64, Error> {
///     if b == 0 {
///         ffi_bail!(ValueError, "Division by zero");
///     }
///     Ok(a / b)
/// }
///
/// assert_eq!(checked_div(10, 2), Ok(5));
/// assert_eq!(checked_div(1, 0).unwrap_err().message(), "Division by zero");
/// ```
#[macro_export]
macro_rules! ffi_bail {
    ($($args:tt)*) => {
        return $crate::__private::Err($crate::ffi_error!($($args)*).into())
    };
}
