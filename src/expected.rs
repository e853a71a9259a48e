//! A success-or-error value that crosses call boundaries as plain data.
//!
//! [`Expected<T>`] holds either a `T` or an [`Error`], never both and never
//! neither. Inspecting it never unwinds. Only the explicit access methods
//! [`Expected::value`] and [`Expected::unwrap`] panic, and only when misused on
//! the error branch.
//!
//! # Transparent encoding
//!
//! An `Expected<T>` is never boxed as a distinct payload inside an
//! [`Any`] slot. Storing it stores the active branch directly, as a `T` or as
//! an `Error`, and reading a slot as `Expected<T>` re-wraps whichever branch is
//! present:
//!
//! ```
//! use crossing::{Any, Error, Expected};
//!
//! let slot = Any::new(Expected::<i64>::success(42));
//! assert_eq!(slot.cast::<i64>().unwrap(), 42);
//!
//! let slot = Any::new(Expected::<i64>::failure(Error::new("TypeError", "conversion failed")));
//! assert!(slot.is::<Error>());
//!
//! let recovered = slot.cast::<Expected<i64>>().unwrap();
//! assert!(recovered.is_failure());
//! assert_eq!(recovered.error().kind(), "TypeError");
//! ```
//!
//! # Disjointness
//!
//! `T` must never be able to hold an [`Error`] itself, or the two branches
//! could not be told apart. This is checked at compile time through
//! [`AnyCodec::MAY_HOLD_ERROR`]:
//!
//! ```compile_fail
//! use crossing::{Error, Expected};
//!
//! let _ = Expected::<Error>::success(Error::new("ValueError", "ambiguous"));
//! ```
//!
//! ```compile_fail
//! use crossing::{Any, Expected};
//!
//! let _ = Expected::<Any>::success(Any::none());
//! ```

use alloc::string::String;
use core::fmt;

use crate::{Any, AnyCodec, Error, error::kinds, util};

/// A value that is either a success of type `T` or an [`Error`].
///
/// # Examples
///
/// ```
/// use crossing::{Error, Expected};
///
/// fn safe_divide(a: i64, b: i64) -> Expected<i64> {
///     if b == 0 {
///         return Expected::failure(Error::new("ValueError", "Division by zero"));
///     }
///     Expected::success(a / b)
/// }
///
/// let ok = safe_divide(10, 2);
/// assert!(ok.is_success());
/// assert_eq!(ok.value(), 5);
///
/// let err = safe_divide(1, 0);
/// assert!(err.is_failure());
/// assert_eq!(err.error().message(), "Division by zero");
/// assert_eq!(err.value_or(99), 99);
/// ```
#[derive(Clone, PartialEq)]
pub struct Expected<T> {
    branch: Branch<T>,
}

#[derive(Clone, PartialEq)]
enum Branch<T> {
    Success(T),
    Failure(Error),
}

impl<T: AnyCodec> Expected<T> {
    #[inline]
    fn from_branch(branch: Branch<T>) -> Self {
        const {
            assert!(
                !T::MAY_HOLD_ERROR,
                "`Expected<T>` requires a `T` that can never hold an `Error`; use `Error` directly instead"
            );
        }
        Self { branch }
    }

    /// Creates a success-branch value.
    #[must_use]
    pub fn success(value: T) -> Self {
        Self::from_branch(Branch::Success(value))
    }

    /// Creates an error-branch value.
    #[must_use]
    pub fn failure(error: Error) -> Self {
        Self::from_branch(Branch::Failure(error))
    }

    /// Returns `true` if this holds a success value.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.branch, Branch::Success(_))
    }

    /// Alias for [`Expected::is_success`].
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.is_success()
    }

    /// Returns `true` if this holds an error.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.branch, Branch::Failure(_))
    }

    /// Returns a copy of the success value.
    ///
    /// # Panics
    ///
    /// Panics on the error branch. With the `std` feature the panic payload is
    /// a `RuntimeError` [`Error`], so a guarded call site recovers it as data.
    /// The panic hook still runs, as described on [`Error::raise`].
    #[must_use]
    #[track_caller]
    pub fn value(&self) -> T {
        match &self.branch {
            Branch::Success(value) => value.clone(),
            Branch::Failure(_) => bad_access(),
        }
    }

    /// Moves the success value out.
    ///
    /// # Panics
    ///
    /// Panics on the error branch, like [`Expected::value`].
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self.branch {
            Branch::Success(value) => value,
            Branch::Failure(_) => bad_access(),
        }
    }

    /// Returns a copy of the error.
    ///
    /// Callers are expected to check [`Expected::is_failure`] first.
    ///
    /// # Panics
    ///
    /// Panics on the success branch.
    #[must_use]
    #[track_caller]
    pub fn error(&self) -> Error {
        match &self.branch {
            Branch::Failure(error) => error.clone(),
            Branch::Success(_) => not_an_error(),
        }
    }

    /// Moves the error out.
    ///
    /// # Panics
    ///
    /// Panics on the success branch, like [`Expected::error`].
    #[track_caller]
    pub fn unwrap_error(self) -> Error {
        match self.branch {
            Branch::Failure(error) => error,
            Branch::Success(_) => not_an_error(),
        }
    }

    /// Returns a copy of the success value, or `default` on the error branch.
    #[must_use]
    pub fn value_or(&self, default: T) -> T {
        match &self.branch {
            Branch::Success(value) => value.clone(),
            Branch::Failure(_) => default,
        }
    }

    /// Moves the success value out, or returns `default` on the error branch.
    #[must_use]
    pub fn unwrap_or(self, default: T) -> T {
        match self.branch {
            Branch::Success(value) => value,
            Branch::Failure(_) => default,
        }
    }

    /// Converts into a [`Result`].
    ///
    /// # Errors
    ///
    /// Returns the held error on the error branch.
    pub fn into_result(self) -> Result<T, Error> {
        match self.branch {
            Branch::Success(value) => Ok(value),
            Branch::Failure(error) => Err(error),
        }
    }

    /// The success value, if any.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }

    /// The error, if any.
    #[must_use]
    pub fn err(self) -> Option<Error> {
        self.into_result().err()
    }

    /// Maps the success value, leaving an error untouched.
    #[must_use]
    pub fn map<U: AnyCodec>(self, f: impl FnOnce(T) -> U) -> Expected<U> {
        match self.branch {
            Branch::Success(value) => Expected::success(f(value)),
            Branch::Failure(error) => Expected::failure(error),
        }
    }

    /// Re-wraps a slot that passed [`Expected::check_any_strict`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that `any` strictly holds a `T` or an [`Error`].
    unsafe fn rewrap_after_check(any: &Any) -> Self {
        debug_assert!(T::check_any_strict(any) || Error::check_any_strict(any));
        if T::check_any_strict(any) {
            // SAFETY: The strict check for `T` just passed.
            Self::success(unsafe { T::copy_from_any_after_check(any) })
        } else {
            // SAFETY: Our caller guarantees that a slot which does not hold a `T`
            // holds an `Error`.
            Self::failure(unsafe { Error::copy_from_any_after_check(any) })
        }
    }
}

#[cold]
#[track_caller]
fn bad_access() -> ! {
    let error = Error::new(kinds::RUNTIME_ERROR, "Bad expected access: contains error");
    #[cfg(feature = "std")]
    error.raise();
    #[cfg(not(feature = "std"))]
    panic!("{error}");
}

#[cold]
#[track_caller]
fn not_an_error() -> ! {
    panic!("Expected does not contain an error")
}

impl<T: AnyCodec> From<Result<T, Error>> for Expected<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(error),
        }
    }
}

impl<T: AnyCodec> From<Expected<T>> for Result<T, Error> {
    fn from(expected: Expected<T>) -> Self {
        expected.into_result()
    }
}

impl<T: fmt::Debug> fmt::Debug for Expected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Branch::Success(value) => f.debug_tuple("Success").field(value).finish(),
            Branch::Failure(error) => f.debug_tuple("Failure").field(error).finish(),
        }
    }
}

impl<T: AnyCodec> AnyCodec for Expected<T> {
    const MAY_HOLD_ERROR: bool = true;
    const MAY_BE_NONE: bool = T::MAY_BE_NONE;

    fn copy_to_any(&self) -> Any {
        match &self.branch {
            Branch::Success(value) => value.copy_to_any(),
            Branch::Failure(error) => error.copy_to_any(),
        }
    }

    fn move_to_any(self) -> Any {
        match self.branch {
            Branch::Success(value) => value.move_to_any(),
            Branch::Failure(error) => error.move_to_any(),
        }
    }

    fn check_any_strict(any: &Any) -> bool {
        T::check_any_strict(any) || Error::check_any_strict(any)
    }

    unsafe fn copy_from_any_after_check(any: &Any) -> Self {
        // SAFETY: Guaranteed by the caller.
        unsafe { Self::rewrap_after_check(any) }
    }

    unsafe fn move_from_any_after_check(any: &mut Any) -> Self {
        if T::check_any_strict(any) {
            // SAFETY: The strict check for `T` just passed.
            Self::success(unsafe { T::move_from_any_after_check(any) })
        } else {
            debug_assert!(Error::check_any_strict(any));
            // SAFETY: Our caller guarantees that a slot which does not hold a `T`
            // holds an `Error`.
            Self::failure(unsafe { Error::move_from_any_after_check(any) })
        }
    }

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        if let Some(value) = T::try_cast_from_any(any) {
            return Some(Self::success(value));
        }
        Error::try_cast_from_any(any).map(Self::failure)
    }

    fn mismatch_type_info(any: &Any) -> String {
        T::mismatch_type_info(any)
    }

    fn type_str() -> String {
        alloc::format!("Expected<{}>", T::type_str())
    }

    fn type_schema() -> String {
        util::schema_with_args("Expected", &[T::type_schema()])
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString};

    use super::*;
    use crate::Array;

    fn value_error() -> Error {
        Error::new(kinds::VALUE_ERROR, "bad input")
    }

    #[test]
    fn test_branches_are_exclusive() {
        let ok = Expected::success(1_i64);
        let err = Expected::<i64>::failure(value_error());
        for expected in [&ok, &err] {
            assert_ne!(expected.is_success(), expected.is_failure());
            assert_eq!(expected.is_success(), expected.has_value());
        }
        assert!(ok.is_success());
        assert!(err.is_failure());
    }

    #[test]
    fn test_access() {
        let ok = Expected::success("hello".to_string());
        assert_eq!(ok.value(), "hello");
        assert_eq!(ok.value_or("other".to_string()), "hello");
        assert_eq!(ok.clone().unwrap(), "hello");
        assert_eq!(ok.unwrap_or("other".to_string()), "hello");

        let err = Expected::<String>::failure(value_error());
        assert_eq!(err.error(), value_error());
        assert_eq!(err.value_or("fallback".to_string()), "fallback");
        assert_eq!(err.clone().unwrap_or("fallback".to_string()), "fallback");
        assert_eq!(err.unwrap_error(), value_error());
    }

    #[test]
    #[should_panic(expected = "Expected does not contain an error")]
    fn test_error_on_success_panics() {
        let _ = Expected::success(1_i64).error();
    }

    #[test]
    fn test_result_conversions() {
        let ok: Expected<i64> = Ok(3).into();
        assert_eq!(ok.clone().into_result(), Ok(3));
        assert_eq!(ok.clone().ok(), Some(3));
        assert_eq!(ok.clone().err(), None);
        assert_eq!(ok.map(|value| value * 2).value(), 6);

        let err: Expected<i64> = Err(value_error()).into();
        let result: Result<i64, Error> = err.clone().into();
        assert_eq!(result, Err(value_error()));
        assert!(err.map(|value| value.to_string()).is_failure());
    }

    #[test]
    fn test_transparent_encoding() {
        let ok = Expected::success(42_i64).copy_to_any();
        assert!(i64::check_any_strict(&ok));
        assert_eq!(ok.type_str(), "int");

        let err = Expected::<i64>::failure(value_error()).move_to_any();
        assert!(Error::check_any_strict(&err));
        assert_eq!(err.type_str(), "ffi.Error");

        assert!(Expected::<i64>::check_any_strict(&ok));
        assert!(Expected::<i64>::check_any_strict(&err));
        assert!(!Expected::<i64>::check_any_strict(&Any::from("text")));
    }

    #[test]
    fn test_convert_prefers_value_branch() {
        let int = Any::new(2_i64);
        let as_float = Expected::<f64>::try_cast_from_any(&int).expect("ints convert to floats");
        assert!(as_float.is_success());
        assert_eq!(as_float.value(), 2.0);

        let flag = Any::new(true);
        assert_eq!(flag.try_cast::<Expected<i32>>().map(|e| e.value()), Some(1));

        let error = Any::new(value_error());
        let recovered = error.try_cast::<Expected<f64>>().expect("errors convert");
        assert!(recovered.is_failure());

        assert!(Any::from("hello").try_cast::<Expected<i64>>().is_none());
    }

    #[test]
    fn test_move_extraction_empties_slot() {
        let mut slot = Expected::success("payload".to_string()).move_to_any();
        assert!(Expected::<String>::check_any_strict(&slot));
        // SAFETY: The strict check passed.
        let moved = unsafe { Expected::<String>::move_from_any_after_check(&mut slot) };
        assert_eq!(moved.unwrap(), "payload");
        assert!(slot.is_none());
    }

    #[test]
    fn test_nested_types() {
        let absent = Expected::success(Option::<i64>::None);
        assert!(absent.is_success());
        assert_eq!(absent.value(), None);
        let round_trip = Any::new(absent).cast::<Expected<Option<i64>>>().unwrap();
        assert!(round_trip.is_success());
        assert_eq!(round_trip.value(), None);

        let empty = Expected::success(Array::<String>::new());
        let round_trip = Any::new(empty).cast::<Expected<Array<String>>>().unwrap();
        assert!(round_trip.is_success());
        assert!(round_trip.value().is_empty());
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Expected::success(1_i64)), "Success(1)");
        assert_eq!(
            format!("{:?}", Expected::<i64>::failure(Error::new("E", "m"))),
            r#"Failure(Error { kind: "E", message: "m", trace: "" })"#
        );
    }

    #[test]
    fn test_type_info() {
        assert_eq!(Expected::<i64>::type_str(), "Expected<int>");
        assert_eq!(
            Expected::<Array<String>>::type_schema(),
            r#"{"type":"Expected","args":[{"type":"ffi.Array","args":[{"type":"ffi.String"}]}]}"#
        );
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_impl_all!(Expected<i64>: Send, Sync, Clone);
        static_assertions::assert_impl_all!(Expected<Array<String>>: Send, Sync, Clone);
    }
}
