//! The erased value slot.
//!
//! An [`Any`] holds exactly one payload of any type that implements
//! [`AnyCodec`]. Booleans, integers and floats are stored inline. Strings,
//! errors and arrays are stored as reference-counted objects, so copying a
//! slot only bumps a reference count and never deep-copies a payload.

use alloc::string::String;
use core::fmt;

use crossing_internals::{RawObject, RawObjectRef, handlers::ObjectHandler};

use crate::{AnyCodec, Error};

/// The physical contents of an [`Any`] slot.
#[derive(Clone, Default)]
pub(crate) enum Repr {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A heap payload. The payload type is always `Send + Sync`.
    Object(RawObject),
}

/// A type-erased value slot.
///
/// Values enter a slot through their [`AnyCodec`] implementation and leave it
/// either through a strict check ([`Any::get`]) or through a best-effort
/// conversion ([`Any::try_cast`], [`Any::cast`]).
///
/// # Examples
///
/// ```
/// use crossing::Any;
///
/// let slot = Any::new(42_i64);
/// assert!(slot.is::<i64>());
/// assert_eq!(slot.get::<i32>(), Some(42));
///
/// // Integers convert to floats, but are not floats.
/// assert!(!slot.is::<f64>());
/// assert_eq!(slot.try_cast::<f64>(), Some(42.0));
///
/// // Strings never convert to integers.
/// let text = Any::new(String::from("hello"));
/// assert_eq!(text.type_str(), "ffi.String");
/// assert!(text.cast::<i64>().is_err());
/// ```
#[derive(Clone, Default)]
pub struct Any {
    repr: Repr,
}

// SAFETY: The only non-`Send` part of `Repr` is `RawObject`, and objects can
// only be placed in a slot through `Any::from_object`, which requires the
// payload to be `Send + Sync`, or through `Any::from_raw_object`, whose callers
// guarantee the same.
unsafe impl Send for Any {}

// SAFETY: See the `Send` implementation. Shared access to an object only ever
// reads the payload, and payloads are `Sync`.
unsafe impl Sync for Any {}

impl Any {
    /// Creates an empty slot.
    #[must_use]
    pub const fn none() -> Self {
        Self { repr: Repr::None }
    }

    /// Moves `value` into a new slot.
    #[must_use]
    pub fn new<T: AnyCodec>(value: T) -> Self {
        value.move_to_any()
    }

    /// Copies `value` into a new slot.
    #[must_use]
    pub fn from_ref<T: AnyCodec>(value: &T) -> Self {
        value.copy_to_any()
    }

    /// Returns `true` if the slot holds no payload.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self.repr, Repr::None)
    }

    /// Returns `true` if the slot strictly holds a `T`.
    #[must_use]
    pub fn is<T: AnyCodec>(&self) -> bool {
        T::check_any_strict(self)
    }

    /// Copies the payload out if the slot strictly holds a `T`.
    #[must_use]
    pub fn get<T: AnyCodec>(&self) -> Option<T> {
        if T::check_any_strict(self) {
            // SAFETY: The strict check just passed.
            Some(unsafe { T::copy_from_any_after_check(self) })
        } else {
            None
        }
    }

    /// Copies the payload out as a `T`, converting it if the slot holds a
    /// compatible representation. Never fails loudly: an incompatible payload
    /// yields `None`.
    #[must_use]
    pub fn try_cast<T: AnyCodec>(&self) -> Option<T> {
        self.get::<T>().or_else(|| T::try_cast_from_any(self))
    }

    /// Copies the payload out as a `T`, converting it if needed.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the payload is neither a `T` nor convertible to
    /// one.
    pub fn cast<T: AnyCodec>(&self) -> Result<T, Error> {
        self.try_cast::<T>()
            .ok_or_else(|| Error::type_mismatch(&T::mismatch_type_info(self), &T::type_str()))
    }

    /// Moves the payload out as a `T`, converting it if needed.
    ///
    /// This is the consuming variant of [`Any::cast`]: when the slot strictly
    /// holds a `T` that is the only owner of its heap payload, the payload is
    /// moved out rather than copied.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the payload is neither a `T` nor convertible to
    /// one.
    pub fn into_cast<T: AnyCodec>(mut self) -> Result<T, Error> {
        if T::check_any_strict(&self) {
            // SAFETY: The strict check just passed.
            return Ok(unsafe { T::move_from_any_after_check(&mut self) });
        }
        T::try_cast_from_any(&self)
            .ok_or_else(|| Error::type_mismatch(&T::mismatch_type_info(&self), &T::type_str()))
    }

    /// Moves the payload out into a new slot, leaving this slot empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// The runtime type of the held payload: `"None"`, `"bool"`, `"int"`,
    /// `"float"` or the registered type key of an object, such as
    /// `"ffi.String"`.
    #[must_use]
    pub fn type_str(&self) -> &'static str {
        match &self.repr {
            Repr::None => "None",
            Repr::Bool(_) => "bool",
            Repr::Int(_) => "int",
            Repr::Float(_) => "float",
            Repr::Object(object) => object.as_ref().type_key(),
        }
    }

    #[inline]
    pub(crate) const fn from_repr(repr: Repr) -> Self {
        Self { repr }
    }

    #[inline]
    pub(crate) fn repr(&self) -> &Repr {
        &self.repr
    }

    #[inline]
    pub(crate) fn take_repr(&mut self) -> Repr {
        core::mem::take(&mut self.repr)
    }

    /// Wraps `value` in a fresh object formatted by `H`.
    pub(crate) fn from_object<T, H>(value: T) -> Self
    where
        T: Send + Sync + 'static,
        H: ObjectHandler<T>,
    {
        Self::from_repr(Repr::Object(RawObject::new::<T, H>(value)))
    }

    /// Wraps an existing object handle.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the payload of `object` is `Send + Sync`.
    pub(crate) unsafe fn from_raw_object(object: RawObject) -> Self {
        Self::from_repr(Repr::Object(object))
    }

    /// Returns the object handle if the slot holds a heap payload.
    #[inline]
    pub(crate) fn raw_object(&self) -> Option<&RawObject> {
        match &self.repr {
            Repr::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns a reference to the payload if the slot holds an object of type
    /// `T`.
    #[inline]
    pub(crate) fn downcast_object<T: 'static>(&self) -> Option<&T> {
        self.raw_object()
            .and_then(|object| RawObjectRef::downcast::<T>(object.as_ref()))
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::None => f.write_str("None"),
            Repr::Bool(value) => fmt::Display::fmt(value, f),
            Repr::Int(value) => fmt::Display::fmt(value, f),
            Repr::Float(value) => fmt::Debug::fmt(value, f),
            Repr::Object(object) => object.as_ref().display(f),
        }
    }
}

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::None => f.write_str("None"),
            Repr::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Repr::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Repr::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Repr::Object(object) => object.as_ref().debug(f),
        }
    }
}

macro_rules! impl_from_for_any {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Any {
                #[inline]
                fn from(value: $ty) -> Self {
                    Any::new(value)
                }
            }
        )*
    };
}

impl_from_for_any!(bool, i32, i64, f64, String, Error);

impl From<&str> for Any {
    fn from(value: &str) -> Self {
        Any::new(String::from(value))
    }
}
