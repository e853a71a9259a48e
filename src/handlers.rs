//! Object handlers for the heap-backed payloads an [`Any`](crate::Any) slot
//! can hold.
//!
//! Scalars live inline in a slot. Everything else is stored as a
//! reference-counted object, and each object type is paired with a handler
//! that gives it a registered type key and formatting. The type keys are what
//! [`Any::type_str`](crate::Any::type_str) reports for object payloads.

use alloc::string::String;
use core::fmt;

use crossing_internals::handlers::ObjectHandler;

use crate::{Error, array::ArrayStorage};

/// Type key of string objects.
pub const STRING_TYPE_KEY: &str = "ffi.String";
/// Type key of error objects.
pub const ERROR_TYPE_KEY: &str = "ffi.Error";
/// Type key of array objects.
pub const ARRAY_TYPE_KEY: &str = "ffi.Array";

/// Handler for [`String`] payloads.
#[derive(Copy, Clone, Debug)]
pub(crate) struct StringHandler;

impl ObjectHandler<String> for StringHandler {
    fn type_key() -> &'static str {
        STRING_TYPE_KEY
    }

    fn display(value: &String, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(value, formatter)
    }

    fn debug(value: &String, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(value, formatter)
    }
}

/// Handler for [`Error`] payloads.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ErrorHandler;

impl ObjectHandler<Error> for ErrorHandler {
    fn type_key() -> &'static str {
        ERROR_TYPE_KEY
    }

    fn display(value: &Error, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(value, formatter)
    }

    fn debug(value: &Error, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(value, formatter)
    }
}

/// Handler for array storage.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ArrayHandler;

impl ObjectHandler<ArrayStorage> for ArrayHandler {
    fn type_key() -> &'static str {
        ARRAY_TYPE_KEY
    }

    fn display(value: &ArrayStorage, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("[")?;
        for (index, item) in value.items.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            fmt::Display::fmt(item, formatter)?;
        }
        formatter.write_str("]")
    }

    fn debug(value: &ArrayStorage, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(value.items.iter()).finish()
    }
}
