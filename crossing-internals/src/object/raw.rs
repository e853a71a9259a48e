//! Type-erased object pointer types.
//!
//! This module encapsulates the `ptr` field of [`RawObject`] and
//! [`RawObjectRef`], ensuring it is only visible within this module. This
//! visibility restriction guarantees the safety invariant: **the pointer always
//! comes from `Arc<ObjectData<T>>`**.
//!
//! # Safety Invariant
//!
//! Since the `ptr` field can only be set via [`RawObject::new`] or
//! [`RawObject::from_arc`] (which create it from `Arc::into_raw`), and cannot
//! be modified afterward (no `pub` or `pub(crate)` fields), the pointer
//! provenance remains valid throughout the value's lifetime.
//!
//! # Type Erasure
//!
//! The concrete type parameter `T` is erased by casting to
//! `ObjectData<Erased>`. The vtable stored within the `ObjectData` provides the
//! runtime type information needed to safely downcast, clone and format
//! objects.
//!
//! # Allocation Strategy
//!
//! Objects use `triomphe::Arc` for storage, so copying a handle only bumps a
//! reference count. Payloads are never mutated while shared; the only mutable
//! access path ([`RawObject::downcast_mut_unique`]) requires the handle to be
//! the unique owner, checked with `Acquire` ordering.

use core::{any::TypeId, ptr::NonNull};

use crate::{handlers::ObjectHandler, object::data::ObjectData, util::Erased};

/// A pointer to an [`ObjectData`] that is guaranteed to point to an
/// initialized instance of an [`ObjectData<T>`] for some specific `T`, though
/// we do not know which actual `T` it is.
///
/// However, the pointer is allowed to transition into a non-initialized state
/// inside the [`RawObject::drop`] method.
///
/// The pointer is guaranteed to have been created using
/// [`triomphe::Arc::into_raw`].
#[repr(transparent)]
pub struct RawObject {
    /// Pointer to the inner object data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<ObjectData<T>>` for some `T` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The pointer retains full provenance over the `Arc` for the entire
    ///    lifetime of this object (i.e., it was not derived from a `&T`)
    /// 3. The pointer will point to the same `ObjectData<T>` for the entire
    ///    lifetime of this object.
    ptr: NonNull<ObjectData<Erased>>,
}

impl RawObject {
    /// Creates a new [`RawObject`] from a [`triomphe::Arc<ObjectData<T>>`].
    #[inline]
    pub(super) fn from_arc<T: 'static>(data: triomphe::Arc<ObjectData<T>>) -> Self {
        let ptr: *const ObjectData<T> = triomphe::Arc::into_raw(data);
        let ptr: *mut ObjectData<Erased> = ptr.cast::<ObjectData<Erased>>().cast_mut();

        // SAFETY:
        // 1. Triomphe guarantees that `Arc::into_raw` returns a non-null pointer.
        let ptr: NonNull<ObjectData<Erased>> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    /// Consumes the [`RawObject`] without decrementing the reference count and
    /// returns the inner pointer.
    #[inline]
    pub(super) fn into_non_null(self) -> NonNull<ObjectData<Erased>> {
        let ptr = self.ptr;
        core::mem::forget(self);
        ptr
    }

    /// Returns a mutable pointer to the [`ObjectData`] instance.
    #[inline]
    pub(super) fn as_mut_ptr(&mut self) -> *mut ObjectData<Erased> {
        self.ptr.as_ptr()
    }

    /// Creates a new [`RawObject`] holding `value`, formatted and named by the
    /// handler `H`.
    ///
    /// The created object has a strong count of 1.
    #[inline]
    pub fn new<T, H>(value: T) -> Self
    where
        T: 'static,
        H: ObjectHandler<T>,
    {
        let data = triomphe::Arc::new(ObjectData::new::<H>(value));
        Self::from_arc(data)
    }

    /// Returns a reference to the [`ObjectData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawObjectRef<'_> {
        RawObjectRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }
}

impl Clone for RawObject {
    #[inline]
    fn clone(&self) -> Self {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the invariants of
        //    `RawObject`)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed to match the
        //    data in the `ObjectData`.
        unsafe { vtable.clone_arc(self.ptr) }
    }
}

impl core::ops::Drop for RawObject {
    #[inline]
    fn drop(&mut self) {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by `RawObject::new`)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed to match the
        //    data in the `ObjectData`.
        // 3. The pointer is not used after this call (we're in the drop function)
        unsafe {
            vtable.drop(self.ptr);
        }
    }
}

/// A lifetime-bound pointer to an [`ObjectData`] that is guaranteed to point
/// to an initialized instance of an [`ObjectData<T>`] for some specific `T`,
/// though we do not know which actual `T` it is.
///
/// We cannot use a [`&'a ObjectData<T>`] directly, because that would require
/// us to know the actual type of the payload, which we do not.
///
/// [`&'a ObjectData<T>`]: ObjectData
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RawObjectRef<'a> {
    /// Pointer to the inner object data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<ObjectData<T>>` for some `T` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The pointer will point to the same `ObjectData<T>` for the entire
    ///    lifetime of this object.
    ptr: NonNull<ObjectData<Erased>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a ObjectData<Erased>`
    _marker: core::marker::PhantomData<&'a ObjectData<Erased>>,
}

impl<'a> RawObjectRef<'a> {
    /// Casts the [`RawObjectRef`] to an [`ObjectData<T>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual payload type stored in the
    ///    [`ObjectData`].
    #[inline]
    pub(super) unsafe fn cast_inner<T>(self) -> &'a ObjectData<T> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable().type_id(), TypeId::of::<T>());

        let this = self.ptr.cast::<ObjectData<T>>();
        // SAFETY: Converting the NonNull pointer to a reference is sound because:
        // - The pointer is non-null, properly aligned, and dereferenceable (guaranteed
        //   by RawObjectRef's type invariants)
        // - The pointee is properly initialized (RawObjectRef's doc comment guarantees
        //   it points to an initialized ObjectData<T> for some T)
        // - The type `T` matches the actual payload type (guaranteed by caller)
        // - Shared access is allowed
        // - The reference lifetime 'a is valid (tied to RawObjectRef<'a>'s lifetime)
        unsafe { this.as_ref() }
    }

    /// Returns a pointer to the [`ObjectData`] instance.
    #[inline]
    pub(super) fn as_ptr(self) -> *const ObjectData<Erased> {
        self.ptr.as_ptr()
    }

    /// Returns the [`TypeId`] of the payload.
    #[inline]
    pub fn payload_type_id(self) -> TypeId {
        self.vtable().type_id()
    }

    /// Returns the [`core::any::type_name`] of the payload.
    #[inline]
    pub fn payload_type_name(self) -> &'static str {
        self.vtable().type_name()
    }

    /// Returns the [`TypeId`] of the handler used to create the object.
    #[inline]
    pub fn handler_type_id(self) -> TypeId {
        self.vtable().handler_type_id()
    }

    /// Returns the registered type key reported by
    /// [`ObjectHandler::type_key`].
    #[inline]
    pub fn type_key(self) -> &'static str {
        self.vtable().type_key()
    }

    /// Formats the payload by using the [`ObjectHandler::display`] method
    /// specified by the handler used to create the [`ObjectData`].
    #[inline]
    pub fn display(self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `ObjectData`.
        unsafe { vtable.display(self, formatter) }
    }

    /// Formats the payload by using the [`ObjectHandler::debug`] method
    /// specified by the handler used to create the [`ObjectData`].
    #[inline]
    pub fn debug(self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `ObjectData`.
        unsafe { vtable.debug(self, formatter) }
    }

    /// Gets the strong count of the inner [`triomphe::Arc`].
    #[inline]
    pub fn strong_count(self) -> usize {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the invariants of
        //    `RawObjectRef`)
        // 2. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `ObjectData`.
        unsafe { vtable.strong_count(self.ptr) }
    }

    /// Returns `true` if no other handle shares the inner [`triomphe::Arc`].
    ///
    /// Use this rather than `strong_count() == 1` before mutating the payload:
    /// the count is read with `Relaxed` ordering and does not order against
    /// clones dropped on other threads.
    #[inline]
    pub fn is_unique(self) -> bool {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the invariants of
        //    `RawObjectRef`)
        // 2. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `ObjectData`.
        unsafe { vtable.is_unique(self.ptr) }
    }

    /// Returns `true` if both references point to the same allocation.
    #[inline]
    pub fn ptr_eq(self, other: RawObjectRef<'_>) -> bool {
        core::ptr::eq(self.as_ptr(), other.as_ptr())
    }
}
