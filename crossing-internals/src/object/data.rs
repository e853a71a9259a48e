//! This module encapsulates the fields of the [`ObjectData`]. Since this is
//! the only place they are visible, this means that the type of the
//! [`ObjectVtable`] is guaranteed to always be in sync with the type of the
//! actual payload. This follows from the fact that they are in sync when
//! created and that the API offers no way to change the [`ObjectVtable`] or
//! payload type after creation.

use core::ptr::NonNull;

use crate::{
    handlers::ObjectHandler,
    object::{
        raw::{RawObject, RawObjectRef},
        vtable::ObjectVtable,
    },
    util::Erased,
};

/// Type-erased object data structure with vtable-based dispatch.
///
/// This struct uses `#[repr(C)]` to enable safe field access in type-erased
/// contexts, allowing access to the vtable even when the concrete payload type
/// `T` is unknown.
#[repr(C)]
pub(super) struct ObjectData<T: 'static> {
    /// Reference to the vtable of this object
    vtable: &'static ObjectVtable,
    /// The payload of this object
    value: T,
}

impl<T: 'static> ObjectData<T> {
    /// Creates a new [`ObjectData`] with the specified handler and payload.
    #[inline]
    pub(super) fn new<H: ObjectHandler<T>>(value: T) -> Self {
        Self {
            vtable: ObjectVtable::new::<T, H>(),
            value,
        }
    }
}

impl RawObject {
    /// Moves the payload out of the object.
    ///
    /// When this handle is the only owner of the allocation the payload is
    /// moved out without copying. Otherwise the payload is cloned and this
    /// handle's share of the allocation is released.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual payload type
    /// stored in the [`ObjectData`].
    #[inline]
    pub unsafe fn into_inner_unchecked<T: Clone + 'static>(self) -> T {
        debug_assert_eq!(
            self.as_ref().payload_type_id(),
            core::any::TypeId::of::<T>(),
            "payload type mismatch in `into_inner_unchecked`"
        );

        let ptr: NonNull<ObjectData<Erased>> = self.into_non_null();
        let ptr: NonNull<ObjectData<T>> = ptr.cast::<ObjectData<T>>();
        let ptr: *const ObjectData<T> = ptr.as_ptr();

        // SAFETY: The requirements of `Arc::from_raw` are:
        // - The given pointer must be a valid pointer to `ObjectData<T>` that came from
        //   `Arc::into_raw`. This is guaranteed by the invariants of `RawObject` and
        //   by our caller, who guarantees that `T` is the right type.
        // - After `from_raw`, the pointer must not be accessed. We consumed `self` via
        //   `into_non_null`, so nothing else refers to this share of the allocation.
        let arc: triomphe::Arc<ObjectData<T>> = unsafe { triomphe::Arc::from_raw(ptr) };

        match triomphe::Arc::try_unique(arc) {
            Ok(unique) => triomphe::UniqueArc::into_inner(unique).value,
            Err(shared) => shared.value.clone(),
        }
    }

    /// Returns a mutable reference to the payload if this handle is the only
    /// owner of the allocation, and `None` otherwise.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual payload type
    /// stored in the [`ObjectData`].
    #[inline]
    pub unsafe fn downcast_mut_unique<T: 'static>(&mut self) -> Option<&mut T> {
        if !self.as_ref().is_unique() {
            return None;
        }

        debug_assert_eq!(self.as_ref().payload_type_id(), core::any::TypeId::of::<T>());

        let ptr: *mut ObjectData<T> = self.as_mut_ptr().cast::<ObjectData<T>>();

        // SAFETY:
        // - The pointer is non-null, aligned and points to an initialized
        //   `ObjectData<T>` (invariants of `RawObject` plus our caller's guarantee
        //   about `T`).
        // - `is_unique` observed a single owner with `Acquire` ordering, so every
        //   access made through handles released on other threads happens before
        //   this write. We hold `&mut self`, so no new handle can be created while
        //   the returned reference is alive.
        let data: &mut ObjectData<T> = unsafe { &mut *ptr };
        Some(&mut data.value)
    }
}

impl<'a> RawObjectRef<'a> {
    /// Returns a reference to the [`ObjectVtable`] of the [`ObjectData`]
    /// instance.
    #[inline]
    pub(super) fn vtable(self) -> &'static ObjectVtable {
        let ptr = self.as_ptr();
        // SAFETY: We don't know the actual payload type, but we do know
        // that it points to an instance of `ObjectData<T>` for some specific `T`.
        // Since `ObjectData<T>` is `#[repr(C)]`, that means that it's
        // safe to create pointers to the fields before the actual payload.
        //
        // We need to take care to avoid creating an actual reference to
        // the `ObjectData` itself though, as that would still be undefined behavior
        // since we don't have the right type.
        let vtable_ptr: *const &'static ObjectVtable = unsafe { &raw const (*ptr).vtable };

        // SAFETY: Dereferencing the pointer and getting out the `&'static
        // ObjectVtable` is valid for the same reasons
        unsafe { *vtable_ptr }
    }

    /// Accesses the payload of the [`ObjectData`] instance as a reference to
    /// the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual payload type
    /// stored in the [`ObjectData`].
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> &'a T {
        // SAFETY: The inner function requires that `T` matches the type stored, but
        // that is guaranteed by our caller.
        let this = unsafe { self.cast_inner::<T>() };
        &this.value
    }

    /// Accesses the payload of the [`ObjectData`] instance as a reference to
    /// the specified type, returning `None` if the payload has a different
    /// type.
    #[inline]
    pub fn downcast<T: 'static>(self) -> Option<&'a T> {
        if self.payload_type_id() == core::any::TypeId::of::<T>() {
            // SAFETY: We just checked that the stored payload has type `T`.
            Some(unsafe { self.downcast_unchecked::<T>() })
        } else {
            None
        }
    }
}
