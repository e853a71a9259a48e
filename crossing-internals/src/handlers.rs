//! Handlers that name and format type-erased objects.
//!
//! Every object stored behind a [`RawObject`](crate::RawObject) is paired with
//! an [`ObjectHandler`] at construction time. The handler is captured in the
//! object's vtable, so the object can still report its registered type key and
//! format itself after its concrete type has been erased.

/// Trait describing how an object type identifies and formats itself once it
/// has been erased.
///
/// # Examples
///
/// ```
/// use crossing_internals::handlers::ObjectHandler;
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// struct PointHandler;
///
/// impl ObjectHandler<Point> for PointHandler {
///     fn type_key() -> &'static str {
///         "demo.Point"
///     }
///
///     fn display(value: &Point, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         write!(f, "({}, {})", value.x, value.y)
///     }
///
///     fn debug(value: &Point, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         write!(f, "Point {{ x: {}, y: {} }}", value.x, value.y)
///     }
/// }
/// ```
pub trait ObjectHandler<T>: 'static {
    /// The registered type key of the object, such as `"ffi.String"`.
    ///
    /// Type keys are what receivers see when they ask an erased slot what it
    /// holds, so they should be stable across builds and unique per object
    /// type.
    fn type_key() -> &'static str;

    /// Formats the object using display-style formatting.
    fn display(value: &T, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result;

    /// Formats the object using debug-style formatting.
    fn debug(value: &T, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result;
}
