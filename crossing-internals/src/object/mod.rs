//! Module containing the reference-counted object storage

mod data;
mod raw;
mod vtable;

pub use self::raw::{RawObject, RawObjectRef};
