//! The guarded region used by the adapted calling convention.

#[cfg(feature = "std")]
use alloc::{boxed::Box, string::String};

use crate::Error;
#[cfg(feature = "std")]
use crate::error::kinds;

/// Runs `call` and turns a representable panic into an [`Error`].
///
/// A panic payload that is an [`Error`] is returned as is. A `String` or
/// `&'static str` payload becomes a `RuntimeError` with that message. Any
/// other payload resumes unwinding.
#[cfg(feature = "std")]
pub(crate) fn catch_native_failure<R>(call: impl FnOnce() -> R) -> Result<R, Error> {
    std::panic::catch_unwind(core::panic::AssertUnwindSafe(call)).map_err(payload_to_error)
}

/// Without `std` there is no way to catch an unwind, so the call runs
/// unguarded.
#[cfg(not(feature = "std"))]
pub(crate) fn catch_native_failure<R>(call: impl FnOnce() -> R) -> Result<R, Error> {
    Ok(call())
}

#[cfg(feature = "std")]
fn payload_to_error(payload: Box<dyn core::any::Any + Send>) -> Error {
    let payload = match payload.downcast::<Error>() {
        Ok(error) => return *error,
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<String>() {
        Ok(message) => return Error::new(kinds::RUNTIME_ERROR, *message),
        Err(payload) => payload,
    };
    match payload.downcast::<&'static str>() {
        Ok(message) => Error::new(kinds::RUNTIME_ERROR, *message),
        Err(payload) => {
            tracing::debug!("panic payload is not representable as an error, resuming unwind");
            std::panic::resume_unwind(payload)
        }
    }
}
