//! The per-type codec protocol.
//!
//! Every type that can be stored in an [`Any`] slot implements [`AnyCodec`].
//! The trait has one operation per step of a value's trip through a slot:
//!
//! | Step | Operation |
//! |---|---|
//! | store a copy | [`AnyCodec::copy_to_any`] |
//! | store by move | [`AnyCodec::move_to_any`] |
//! | recognize | [`AnyCodec::check_any_strict`] |
//! | load a copy | [`AnyCodec::copy_from_any_after_check`] |
//! | load by move | [`AnyCodec::move_from_any_after_check`] |
//! | convert | [`AnyCodec::try_cast_from_any`] |
//! | introspect | [`AnyCodec::type_str`], [`AnyCodec::type_schema`] |
//!
//! The implementations for [`Array`](crate::Array) and
//! [`Expected`](crate::Expected) live next to those types.

use alloc::string::String;

use crate::{
    Any, Error,
    any::Repr,
    handlers::{ErrorHandler, StringHandler},
    util,
};

/// Conversion protocol between a Rust type and an [`Any`] slot.
///
/// Whatever [`copy_to_any`](AnyCodec::copy_to_any) and
/// [`move_to_any`](AnyCodec::move_to_any) produce must pass
/// [`check_any_strict`](AnyCodec::check_any_strict) for the same type, and
/// [`try_cast_from_any`](AnyCodec::try_cast_from_any) must never panic.
///
/// # Examples
///
/// ```
/// use crossing::{Any, AnyCodec};
///
/// let slot = 5_u8.copy_to_any();
/// assert!(u8::check_any_strict(&slot));
/// assert!(!bool::check_any_strict(&slot));
/// assert_eq!(bool::try_cast_from_any(&slot), Some(true));
/// assert_eq!(u8::type_str(), "int");
/// assert_eq!(Option::<String>::type_schema(), r#"{"type":"Optional","args":[{"type":"ffi.String"}]}"#);
/// ```
pub trait AnyCodec: Clone + Send + Sync + 'static {
    /// Whether a slot holding this type could ever strictly hold an
    /// [`Error`].
    ///
    /// [`Expected<T>`](crate::Expected) rejects any `T` for which this is
    /// `true`, since it could not tell its success branch from its error
    /// branch.
    const MAY_HOLD_ERROR: bool = false;

    /// Whether a slot holding this type can be empty.
    ///
    /// [`Option<T>`] stores `None` as an empty slot, so it rejects any `T` for
    /// which this is `true`: `Some(())` and `None` would otherwise be stored
    /// identically.
    ///
    /// ```compile_fail
    /// use crossing::Any;
    ///
    /// let _ = Any::new(Some(()));
    /// ```
    ///
    /// ```compile_fail
    /// use crossing::Any;
    ///
    /// let _ = Any::new(Some(None::<i64>));
    /// ```
    const MAY_BE_NONE: bool = false;

    /// Stores a copy of `self` in a new slot.
    fn copy_to_any(&self) -> Any;

    /// Stores `self` in a new slot.
    fn move_to_any(self) -> Any {
        self.copy_to_any()
    }

    /// Returns `true` if `any` holds exactly this type, without conversion.
    fn check_any_strict(any: &Any) -> bool;

    /// Copies the value out of `any`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that [`check_any_strict`](AnyCodec::check_any_strict)
    /// returned `true` for `any`.
    unsafe fn copy_from_any_after_check(any: &Any) -> Self;

    /// Moves the value out of `any`, leaving it in a moved-from state.
    ///
    /// # Safety
    ///
    /// The caller must ensure that [`check_any_strict`](AnyCodec::check_any_strict)
    /// returned `true` for `any`.
    unsafe fn move_from_any_after_check(any: &mut Any) -> Self {
        // SAFETY: Guaranteed by the caller.
        let value = unsafe { Self::copy_from_any_after_check(any) };
        *any = Any::none();
        value
    }

    /// Attempts to convert the contents of `any` into this type.
    fn try_cast_from_any(any: &Any) -> Option<Self>;

    /// Describes what `any` holds, for mismatch error messages.
    fn mismatch_type_info(any: &Any) -> String {
        String::from(any.type_str())
    }

    /// The display name of this type, such as `"int"` or `"Array<str>"`.
    fn type_str() -> String;

    /// The structural schema of this type, as compact JSON.
    fn type_schema() -> String;
}

impl AnyCodec for () {
    const MAY_BE_NONE: bool = true;

    fn copy_to_any(&self) -> Any {
        Any::none()
    }

    fn check_any_strict(any: &Any) -> bool {
        any.is_none()
    }

    unsafe fn copy_from_any_after_check(_any: &Any) -> Self {}

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        any.is_none().then_some(())
    }

    fn type_str() -> String {
        String::from("None")
    }

    fn type_schema() -> String {
        util::schema("None")
    }
}

impl AnyCodec for bool {
    fn copy_to_any(&self) -> Any {
        Any::from_repr(Repr::Bool(*self))
    }

    fn check_any_strict(any: &Any) -> bool {
        matches!(any.repr(), Repr::Bool(_))
    }

    unsafe fn copy_from_any_after_check(any: &Any) -> Self {
        match any.repr() {
            Repr::Bool(value) => *value,
            // SAFETY: Our caller checked that the slot holds a `bool`.
            _ => unsafe { util::unchecked_extraction() },
        }
    }

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        match any.repr() {
            Repr::Bool(value) => Some(*value),
            Repr::Int(value) => Some(*value != 0),
            _ => None,
        }
    }

    fn type_str() -> String {
        String::from("bool")
    }

    fn type_schema() -> String {
        util::schema("bool")
    }
}

macro_rules! impl_int_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AnyCodec for $ty {
                fn copy_to_any(&self) -> Any {
                    Any::from_repr(Repr::Int(i64::from(*self)))
                }

                fn check_any_strict(any: &Any) -> bool {
                    matches!(any.repr(), Repr::Int(value) if <$ty>::try_from(*value).is_ok())
                }

                unsafe fn copy_from_any_after_check(any: &Any) -> Self {
                    match any.repr() {
                        Repr::Int(value) => match <$ty>::try_from(*value) {
                            Ok(value) => value,
                            // SAFETY: Our caller checked that the value is in range.
                            Err(_) => unsafe { util::unchecked_extraction() },
                        },
                        // SAFETY: Our caller checked that the slot holds an integer.
                        _ => unsafe { util::unchecked_extraction() },
                    }
                }

                fn try_cast_from_any(any: &Any) -> Option<Self> {
                    match any.repr() {
                        Repr::Int(value) => <$ty>::try_from(*value).ok(),
                        Repr::Bool(value) => Some(<$ty>::from(*value)),
                        _ => None,
                    }
                }

                fn type_str() -> String {
                    String::from("int")
                }

                fn type_schema() -> String {
                    util::schema("int")
                }
            }
        )*
    };
}

impl_int_codec!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_float_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AnyCodec for $ty {
                fn copy_to_any(&self) -> Any {
                    Any::from_repr(Repr::Float(f64::from(*self)))
                }

                fn check_any_strict(any: &Any) -> bool {
                    matches!(any.repr(), Repr::Float(_))
                }

                unsafe fn copy_from_any_after_check(any: &Any) -> Self {
                    match any.repr() {
                        Repr::Float(value) => *value as $ty,
                        // SAFETY: Our caller checked that the slot holds a float.
                        _ => unsafe { util::unchecked_extraction() },
                    }
                }

                fn try_cast_from_any(any: &Any) -> Option<Self> {
                    match any.repr() {
                        Repr::Float(value) => Some(*value as $ty),
                        Repr::Int(value) => Some(*value as $ty),
                        Repr::Bool(value) => Some(<$ty>::from(u8::from(*value))),
                        _ => None,
                    }
                }

                fn type_str() -> String {
                    String::from("float")
                }

                fn type_schema() -> String {
                    util::schema("float")
                }
            }
        )*
    };
}

impl_float_codec!(f32, f64);

impl AnyCodec for String {
    fn copy_to_any(&self) -> Any {
        Any::from_object::<String, StringHandler>(self.clone())
    }

    fn move_to_any(self) -> Any {
        Any::from_object::<String, StringHandler>(self)
    }

    fn check_any_strict(any: &Any) -> bool {
        any.downcast_object::<String>().is_some()
    }

    unsafe fn copy_from_any_after_check(any: &Any) -> Self {
        match any.downcast_object::<String>() {
            Some(value) => value.clone(),
            // SAFETY: Our caller checked that the slot holds a string.
            None => unsafe { util::unchecked_extraction() },
        }
    }

    unsafe fn move_from_any_after_check(any: &mut Any) -> Self {
        // SAFETY: Our caller checked that the slot holds a string object.
        unsafe { move_object_after_check::<String>(any) }
    }

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        any.downcast_object::<String>().cloned()
    }

    fn type_str() -> String {
        String::from("str")
    }

    fn type_schema() -> String {
        util::schema(crate::handlers::STRING_TYPE_KEY)
    }
}

impl AnyCodec for Error {
    const MAY_HOLD_ERROR: bool = true;

    fn copy_to_any(&self) -> Any {
        Any::from_object::<Error, ErrorHandler>(self.clone())
    }

    fn move_to_any(self) -> Any {
        Any::from_object::<Error, ErrorHandler>(self)
    }

    fn check_any_strict(any: &Any) -> bool {
        any.downcast_object::<Error>().is_some()
    }

    unsafe fn copy_from_any_after_check(any: &Any) -> Self {
        match any.downcast_object::<Error>() {
            Some(error) => error.clone(),
            // SAFETY: Our caller checked that the slot holds an error.
            None => unsafe { util::unchecked_extraction() },
        }
    }

    unsafe fn move_from_any_after_check(any: &mut Any) -> Self {
        // SAFETY: Our caller checked that the slot holds an error object.
        unsafe { move_object_after_check::<Error>(any) }
    }

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        any.downcast_object::<Error>().cloned()
    }

    fn type_str() -> String {
        String::from(crate::handlers::ERROR_TYPE_KEY)
    }

    fn type_schema() -> String {
        util::schema(crate::handlers::ERROR_TYPE_KEY)
    }
}

#[inline(always)]
fn assert_some_is_distinguishable<T: AnyCodec>() {
    const {
        assert!(
            !T::MAY_BE_NONE,
            "`Option<T>` requires a `T` that never encodes to an empty slot"
        );
    }
}

impl<T: AnyCodec> AnyCodec for Option<T> {
    const MAY_HOLD_ERROR: bool = T::MAY_HOLD_ERROR;
    const MAY_BE_NONE: bool = true;

    fn copy_to_any(&self) -> Any {
        assert_some_is_distinguishable::<T>();
        match self {
            Some(value) => value.copy_to_any(),
            None => Any::none(),
        }
    }

    fn move_to_any(self) -> Any {
        assert_some_is_distinguishable::<T>();
        match self {
            Some(value) => value.move_to_any(),
            None => Any::none(),
        }
    }

    fn check_any_strict(any: &Any) -> bool {
        assert_some_is_distinguishable::<T>();
        any.is_none() || T::check_any_strict(any)
    }

    unsafe fn copy_from_any_after_check(any: &Any) -> Self {
        if any.is_none() {
            None
        } else {
            // SAFETY: The slot is not empty, so our caller's check passed for `T`.
            Some(unsafe { T::copy_from_any_after_check(any) })
        }
    }

    unsafe fn move_from_any_after_check(any: &mut Any) -> Self {
        if any.is_none() {
            None
        } else {
            // SAFETY: The slot is not empty, so our caller's check passed for `T`.
            Some(unsafe { T::move_from_any_after_check(any) })
        }
    }

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        assert_some_is_distinguishable::<T>();
        if any.is_none() {
            Some(None)
        } else {
            any.try_cast::<T>().map(Some)
        }
    }

    fn mismatch_type_info(any: &Any) -> String {
        T::mismatch_type_info(any)
    }

    fn type_str() -> String {
        alloc::format!("Optional<{}>", T::type_str())
    }

    fn type_schema() -> String {
        util::schema_with_args("Optional", &[T::type_schema()])
    }
}

impl AnyCodec for Any {
    const MAY_HOLD_ERROR: bool = true;
    const MAY_BE_NONE: bool = true;

    fn copy_to_any(&self) -> Any {
        self.clone()
    }

    fn move_to_any(self) -> Any {
        self
    }

    fn check_any_strict(_any: &Any) -> bool {
        true
    }

    unsafe fn copy_from_any_after_check(any: &Any) -> Self {
        any.clone()
    }

    unsafe fn move_from_any_after_check(any: &mut Any) -> Self {
        any.take()
    }

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        Some(any.clone())
    }

    fn type_str() -> String {
        String::from("Any")
    }

    fn type_schema() -> String {
        util::schema("Any")
    }
}

/// Moves an object payload out of a slot, copying it only when the object
/// is shared with another slot.
///
/// # Safety
///
/// The caller must ensure that `any` holds an object whose payload is a `T`.
pub(crate) unsafe fn move_object_after_check<T: Clone + 'static>(any: &mut Any) -> T {
    match any.take_repr() {
        // SAFETY: Our caller guarantees that the payload is a `T`.
        Repr::Object(object) => unsafe { object.into_inner_unchecked::<T>() },
        // SAFETY: Our caller guarantees that the slot holds an object.
        _ => unsafe { util::unchecked_extraction() },
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::error::kinds;

    #[test]
    fn test_int_range_checks() {
        let big = Any::new(300_i64);
        assert!(i64::check_any_strict(&big));
        assert!(i16::check_any_strict(&big));
        assert!(!u8::check_any_strict(&big));
        assert!(!i8::check_any_strict(&big));
        assert_eq!(u8::try_cast_from_any(&big), None);

        let negative = Any::new(-1_i64);
        assert!(!u32::check_any_strict(&negative));
        assert_eq!(i8::try_cast_from_any(&negative), Some(-1));
    }

    #[test]
    fn test_bool_conversions() {
        assert_eq!(bool::try_cast_from_any(&Any::new(0_i64)), Some(false));
        assert_eq!(bool::try_cast_from_any(&Any::new(-5_i64)), Some(true));
        assert_eq!(i32::try_cast_from_any(&Any::new(true)), Some(1));
        assert_eq!(f64::try_cast_from_any(&Any::new(true)), Some(1.0));
        assert_eq!(bool::try_cast_from_any(&Any::new(1.0_f64)), None);
    }

    #[test]
    fn test_float_conversions() {
        let int = Any::new(3_i64);
        assert!(!f64::check_any_strict(&int));
        assert_eq!(f64::try_cast_from_any(&int), Some(3.0));
        assert_eq!(f32::try_cast_from_any(&int), Some(3.0));

        let float = Any::new(0.5_f32);
        assert!(f64::check_any_strict(&float));
        assert_eq!(float.get::<f64>(), Some(0.5));
    }

    #[test]
    fn test_string_and_error_are_strict_only() {
        let text = Any::new("hi".to_string());
        assert_eq!(String::try_cast_from_any(&text).as_deref(), Some("hi"));
        assert_eq!(Error::try_cast_from_any(&text), None);
        assert_eq!(String::try_cast_from_any(&Any::new(1_i64)), None);

        let error = Any::new(Error::new(kinds::VALUE_ERROR, "bad"));
        assert!(Error::check_any_strict(&error));
        assert!(!String::check_any_strict(&error));
        assert_eq!(error.type_str(), "ffi.Error");
    }

    #[test]
    fn test_object_move_does_not_duplicate() {
        let mut slot = Any::new("unique".to_string());
        assert!(String::check_any_strict(&slot));
        // SAFETY: The strict check passed.
        let moved = unsafe { String::move_from_any_after_check(&mut slot) };
        assert_eq!(moved, "unique");
        assert!(slot.is_none());
        assert!(!String::check_any_strict(&slot));
    }

    #[test]
    fn test_option_codec() {
        let none = Option::<i64>::None.copy_to_any();
        assert!(none.is_none());
        assert_eq!(none.get::<Option<i64>>(), Some(None));

        let some = Some(5_i64).move_to_any();
        assert_eq!(some.get::<i64>(), Some(5));
        assert_eq!(some.get::<Option<i64>>(), Some(Some(5)));
        assert_eq!(some.try_cast::<Option<f64>>(), Some(Some(5.0)));
        assert_eq!(Any::from("x").try_cast::<Option<i64>>(), None);
    }

    #[test]
    fn test_any_codec_accepts_everything() {
        let slot = Any::from("inner");
        assert!(Any::check_any_strict(&slot));
        assert_eq!(slot.get::<Any>().map(|any| any.type_str()), Some("ffi.String"));
    }

    #[test]
    fn test_type_strings() {
        assert_eq!(<()>::type_str(), "None");
        assert_eq!(bool::type_str(), "bool");
        assert_eq!(i8::type_str(), "int");
        assert_eq!(f32::type_str(), "float");
        assert_eq!(String::type_str(), "str");
        assert_eq!(Error::type_str(), "ffi.Error");
        assert_eq!(Option::<i64>::type_str(), "Optional<int>");
        assert_eq!(<Any as AnyCodec>::type_str(), "Any");
    }

    #[test]
    fn test_may_hold_error() {
        const {
            assert!(!<i64 as AnyCodec>::MAY_HOLD_ERROR);
            assert!(!<String as AnyCodec>::MAY_HOLD_ERROR);
            assert!(!<Option<String> as AnyCodec>::MAY_HOLD_ERROR);
            assert!(<Error as AnyCodec>::MAY_HOLD_ERROR);
            assert!(<Option<Error> as AnyCodec>::MAY_HOLD_ERROR);
            assert!(<Any as AnyCodec>::MAY_HOLD_ERROR);
        }
    }

    #[test]
    fn test_may_be_none() {
        const {
            assert!(<() as AnyCodec>::MAY_BE_NONE);
            assert!(<Option<i64> as AnyCodec>::MAY_BE_NONE);
            assert!(<Any as AnyCodec>::MAY_BE_NONE);
            assert!(!<i64 as AnyCodec>::MAY_BE_NONE);
            assert!(!<String as AnyCodec>::MAY_BE_NONE);
            assert!(!<Error as AnyCodec>::MAY_BE_NONE);
            assert!(!<crate::Array<Option<i64>> as AnyCodec>::MAY_BE_NONE);
            assert!(!<crate::Expected<i64> as AnyCodec>::MAY_BE_NONE);
            assert!(<crate::Expected<()> as AnyCodec>::MAY_BE_NONE);
        }
    }

    #[test]
    fn test_optional_some_and_none_stay_distinct() {
        let some = Some(String::from("value")).move_to_any();
        let none = None::<String>.move_to_any();
        assert!(!some.is_none());
        assert!(none.is_none());
        assert_eq!(some.cast::<Option<String>>(), Ok(Some(String::from("value"))));
        assert_eq!(none.cast::<Option<String>>(), Ok(None));
    }
}
