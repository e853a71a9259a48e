//! Internal utility types.

/// Marker type used when type-erasing objects.
///
/// This zero-sized type serves as a placeholder in generic type parameters
/// when the actual concrete type has been erased. For example,
/// `ObjectData<Erased>` represents an object whose concrete type is unknown
/// at the current scope.
pub(crate) struct Erased;
