//! Vtable for type-erased object operations.
//!
//! This module contains the [`ObjectVtable`] which enables calling handler
//! methods and reference-counting operations on objects whose concrete payload
//! type `T` and handler type `H` have been erased. The vtable stores function
//! pointers that dispatch to the correct typed implementations.
//!
//! This module encapsulates the fields of [`ObjectVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameters must match the actual payload type
//! and handler stored in the `ObjectData`**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`ObjectVtable::new`], which pairs the function pointers
//! with specific types `T` and `H` at compile time.

use core::{any::TypeId, ptr::NonNull};

use crate::{
    handlers::ObjectHandler,
    object::{
        data::ObjectData,
        raw::{RawObject, RawObjectRef},
    },
    util::Erased,
};

/// Vtable for type-erased object operations.
///
/// # Safety
///
/// The following safety invariants are guaranteed to be upheld as long as this
/// struct exists:
///
/// * The fields `drop`, `clone_arc`, `strong_count`, `is_unique`, `display` and
///   `debug` all point to the functions defined below
/// * The concrete pointers are all instantiated with the same payload type `T`
///   and handler type `H` that were used to create this `ObjectVtable`.
pub(crate) struct ObjectVtable {
    /// Gets the [`TypeId`] of the payload type that was used to create this
    /// [`ObjectVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the payload type.
    type_name: fn() -> &'static str,
    /// Gets the [`TypeId`] of the handler that was used to create this
    /// [`ObjectVtable`].
    handler_type_id: fn() -> TypeId,
    /// Gets the registered type key from the handler.
    type_key: fn() -> &'static str,
    /// Drops one share of the [`triomphe::Arc<ObjectData<T>>`] pointed to by
    /// this pointer.
    drop: unsafe fn(NonNull<ObjectData<Erased>>),
    /// Clones the `triomphe::Arc<ObjectData<T>>` pointed to by this pointer.
    clone_arc: unsafe fn(NonNull<ObjectData<Erased>>) -> RawObject,
    /// Gets the strong count of the [`triomphe::Arc<ObjectData<T>>`] pointed
    /// to by this pointer.
    strong_count: unsafe fn(NonNull<ObjectData<Erased>>) -> usize,
    /// Checks with `Acquire` ordering whether the
    /// [`triomphe::Arc<ObjectData<T>>`] pointed to by this pointer has exactly
    /// one owner.
    is_unique: unsafe fn(NonNull<ObjectData<Erased>>) -> bool,
    /// Formats the payload using the `display` method on the handler.
    display: unsafe fn(RawObjectRef<'_>, &mut core::fmt::Formatter<'_>) -> core::fmt::Result,
    /// Formats the payload using the `debug` method on the handler.
    debug: unsafe fn(RawObjectRef<'_>, &mut core::fmt::Formatter<'_>) -> core::fmt::Result,
}

impl ObjectVtable {
    /// Creates a new [`ObjectVtable`] for the payload type `T` and the handler
    /// type `H`.
    pub(super) const fn new<T: 'static, H: ObjectHandler<T>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                handler_type_id: TypeId::of::<H>,
                type_key: H::type_key,
                drop: drop::<T>,
                clone_arc: clone_arc::<T>,
                strong_count: strong_count::<T>,
                is_unique: is_unique::<T>,
                display: display::<T, H>,
                debug: debug::<T, H>,
            }
        }
    }

    /// Gets the [`TypeId`] of the payload type that was used to create this
    /// [`ObjectVtable`].
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the payload type.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Gets the [`TypeId`] of the handler that was used to create this
    /// [`ObjectVtable`].
    #[inline]
    pub(super) fn handler_type_id(&self) -> TypeId {
        (self.handler_type_id)()
    }

    /// Gets the registered type key of the payload.
    #[inline]
    pub(super) fn type_key(&self) -> &'static str {
        (self.type_key)()
    }

    /// Drops one share of the `triomphe::Arc<ObjectData<T>>` instance pointed
    /// to by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<ObjectData<T>>`] turned into
    ///    a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`ObjectVtable`] must be a vtable for the payload type stored in
    ///    the [`ObjectData`].
    /// 3. The pointer is not used after calling this method.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<ObjectData<Erased>>) {
        // SAFETY: We know that `self.drop` points to the function `drop::<T>` below.
        // That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }

    /// Clones the [`triomphe::Arc<ObjectData<T>>`] pointed to by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<ObjectData<T>>`] turned into
    ///    a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`ObjectVtable`] must be a vtable for the payload type stored in
    ///    the [`ObjectData`].
    #[inline]
    pub(super) unsafe fn clone_arc(&self, ptr: NonNull<ObjectData<Erased>>) -> RawObject {
        // SAFETY: We know that `self.clone_arc` points to the function `clone_arc::<T>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.clone_arc)(ptr) }
    }

    /// Gets the strong count of the [`triomphe::Arc<ObjectData<T>>`] pointed
    /// to by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<ObjectData<T>>`] turned into
    ///    a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`ObjectVtable`] must be a vtable for the payload type stored in
    ///    the [`ObjectData`].
    #[inline]
    pub(super) unsafe fn strong_count(&self, ptr: NonNull<ObjectData<Erased>>) -> usize {
        // SAFETY: We know that `self.strong_count` points to the function
        // `strong_count::<T>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.strong_count)(ptr) }
    }

    /// Returns `true` if the [`triomphe::Arc<ObjectData<T>>`] pointed to by
    /// this pointer has no other owner.
    ///
    /// Unlike comparing [`Self::strong_count`] against 1, a `true` result
    /// synchronizes with every release of a share on other threads, so the
    /// caller may write to the payload afterwards.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<ObjectData<T>>`] turned into
    ///    a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`ObjectVtable`] must be a vtable for the payload type stored in
    ///    the [`ObjectData`].
    #[inline]
    pub(super) unsafe fn is_unique(&self, ptr: NonNull<ObjectData<Erased>>) -> bool {
        // SAFETY: We know that `self.is_unique` points to the function
        // `is_unique::<T>` below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.is_unique)(ptr) }
    }

    /// Formats the payload using the [`H::display`] function used when creating
    /// this [`ObjectVtable`].
    ///
    /// [`H::display`]: ObjectHandler::display
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`ObjectVtable`] must be a vtable for the payload type stored in
    ///    the [`RawObjectRef`].
    #[inline]
    pub(super) unsafe fn display(
        &self,
        ptr: RawObjectRef<'_>,
        formatter: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        // SAFETY: We know that `self.display` points to the function `display::<T, H>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.display)(ptr, formatter) }
    }

    /// Formats the payload using the [`H::debug`] function used when creating
    /// this [`ObjectVtable`].
    ///
    /// [`H::debug`]: ObjectHandler::debug
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`ObjectVtable`] must be a vtable for the payload type stored in
    ///    the [`RawObjectRef`].
    #[inline]
    pub(super) unsafe fn debug(
        &self,
        ptr: RawObjectRef<'_>,
        formatter: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        // SAFETY: We know that `self.debug` points to the function `debug::<T, H>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.debug)(ptr, formatter) }
    }
}

/// Drops one share of the [`triomphe::Arc<ObjectData<T>>`] pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<ObjectData<T>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The payload type `T` matches the actual payload type stored in the
///    [`ObjectData`]
/// 3. The pointer is not used after calling this method.
unsafe fn drop<T: 'static>(ptr: NonNull<ObjectData<Erased>>) {
    let ptr: NonNull<ObjectData<T>> = ptr.cast();
    let ptr = ptr.as_ptr();
    // SAFETY:
    // 1. The pointer has the correct type and came from `Arc::into_raw` (guaranteed
    //    by caller)
    // 2. After `from_raw`, the pointer is consumed and not accessed again
    let arc = unsafe { triomphe::Arc::from_raw(ptr) };
    core::mem::drop(arc);
}

/// Clones the [`triomphe::Arc<ObjectData<T>>`] pointed to by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<ObjectData<T>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The payload type `T` matches the actual payload type stored in the
///    [`ObjectData`]
unsafe fn clone_arc<T: 'static>(ptr: NonNull<ObjectData<Erased>>) -> RawObject {
    let ptr: *const ObjectData<T> = ptr.cast::<ObjectData<T>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the correct
    // type (guaranteed by the caller), which fulfills the requirements for
    // `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    let arc = arc_borrow.clone_arc();
    RawObject::from_arc(arc)
}

/// Gets the strong count of the [`triomphe::Arc<ObjectData<T>>`] pointed to
/// by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<ObjectData<T>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The payload type `T` matches the actual payload type stored in the
///    [`ObjectData`]
unsafe fn strong_count<T: 'static>(ptr: NonNull<ObjectData<Erased>>) -> usize {
    let ptr: *const ObjectData<T> = ptr.cast::<ObjectData<T>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the correct
    // type (guaranteed by the caller), which fulfills the requirements for
    // `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    triomphe::ArcBorrow::strong_count(&arc_borrow)
}

/// Checks whether the [`triomphe::Arc<ObjectData<T>>`] pointed to by this
/// pointer is uniquely owned.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<ObjectData<T>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The payload type `T` matches the actual payload type stored in the
///    [`ObjectData`]
unsafe fn is_unique<T: 'static>(ptr: NonNull<ObjectData<Erased>>) -> bool {
    let ptr: *const ObjectData<T> = ptr.cast::<ObjectData<T>>().as_ptr();

    // SAFETY: The pointer came from `Arc::into_raw` with the correct type
    // (guaranteed by the caller). Wrapping the rebuilt `Arc` in `ManuallyDrop`
    // leaves the reference count untouched.
    let arc = core::mem::ManuallyDrop::new(unsafe { triomphe::Arc::from_raw(ptr) });

    arc.is_unique()
}

/// Formats a payload using its handler's display implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `T` matches the actual payload type stored in the
///    [`ObjectData`]
unsafe fn display<T: 'static, H: ObjectHandler<T>>(
    ptr: RawObjectRef<'_>,
    formatter: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &T = unsafe { ptr.downcast_unchecked::<T>() };
    H::display(value, formatter)
}

/// Formats a payload using its handler's debug implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `T` matches the actual payload type stored in the
///    [`ObjectData`]
unsafe fn debug<T: 'static, H: ObjectHandler<T>>(
    ptr: RawObjectRef<'_>,
    formatter: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &T = unsafe { ptr.downcast_unchecked::<T>() };
    H::debug(value, formatter)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HandlerI32;
    impl ObjectHandler<i32> for HandlerI32 {
        fn type_key() -> &'static str {
            "test.i32"
        }

        fn display(value: &i32, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Display::fmt(value, formatter)
        }

        fn debug(value: &i32, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Debug::fmt(value, formatter)
        }
    }

    #[test]
    fn test_object_vtable_eq() {
        // Both should be the exact same static instance
        let vtable1 = ObjectVtable::new::<i32, HandlerI32>();
        let vtable2 = ObjectVtable::new::<i32, HandlerI32>();
        assert!(core::ptr::eq(vtable1, vtable2));
    }

    #[test]
    fn test_object_vtable_type_info() {
        let vtable = ObjectVtable::new::<i32, HandlerI32>();
        assert_eq!(vtable.type_id(), TypeId::of::<i32>());
        assert_eq!(vtable.type_name(), "i32");
        assert_eq!(vtable.handler_type_id(), TypeId::of::<HandlerI32>());
        assert_eq!(vtable.type_key(), "test.i32");
    }

    #[test]
    fn test_object_vtable_is_unique() {
        let object = RawObject::new::<i32, HandlerI32>(5);
        let vtable = object.as_ref().vtable();
        let ptr = object.as_ref().as_ptr().cast_mut();
        let ptr = NonNull::new(ptr).expect("object pointers are never null");

        // SAFETY: `ptr` comes from a live `RawObject` holding an `i32`.
        assert!(unsafe { vtable.is_unique(ptr) });

        let shared = object.clone();
        // SAFETY: As above.
        assert!(!unsafe { vtable.is_unique(ptr) });

        core::mem::drop(shared);
        // SAFETY: As above.
        assert!(unsafe { vtable.is_unique(ptr) });
        assert_eq!(object.as_ref().downcast::<i32>(), Some(&5));
    }
}
