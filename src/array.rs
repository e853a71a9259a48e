//! A reference-counted, typed sequence.
//!
//! An [`Array<T>`] stores its elements as [`Any`] slots inside a single
//! `ffi.Array` object. Cloning an array shares that object; mutation goes
//! through copy-on-write, so a clone never observes changes made through
//! another handle.

use alloc::{string::String, vec::Vec};
use core::{fmt, iter::FusedIterator, marker::PhantomData};

use crossing_internals::RawObject;

use crate::{Any, AnyCodec, any::Repr, handlers::ArrayHandler, util};

/// The payload of an `ffi.Array` object.
#[derive(Clone, Default)]
pub(crate) struct ArrayStorage {
    pub(crate) items: Vec<Any>,
}

/// A typed, reference-counted sequence of values.
///
/// # Examples
///
/// ```
/// use crossing::{Any, Array};
///
/// let mut numbers: Array<i64> = [1, 2, 3].into_iter().collect();
/// let snapshot = numbers.clone();
///
/// numbers.push(4);
/// assert_eq!(numbers.to_vec(), vec![1, 2, 3, 4]);
/// assert_eq!(snapshot.to_vec(), vec![1, 2, 3]);
///
/// let slot = Any::new(numbers);
/// assert_eq!(slot.type_str(), "ffi.Array");
/// assert_eq!(slot.cast::<Array<i64>>().unwrap().get(3), Some(4));
/// ```
pub struct Array<T> {
    /// Always holds an [`ArrayStorage`] whose elements strictly match `T`.
    storage: RawObject,
    _marker: PhantomData<fn() -> T>,
}

// SAFETY: `ArrayStorage` only contains `Any` slots, which are `Send + Sync`.
unsafe impl<T> Send for Array<T> {}

// SAFETY: See the `Send` implementation.
unsafe impl<T> Sync for Array<T> {}

impl<T> Array<T> {
    fn from_storage(storage: ArrayStorage) -> Self {
        Self {
            storage: RawObject::new::<ArrayStorage, ArrayHandler>(storage),
            _marker: PhantomData,
        }
    }

    fn items(&self) -> &[Any] {
        match self.storage.as_ref().downcast::<ArrayStorage>() {
            Some(storage) => &storage.items,
            None => &[],
        }
    }

    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::from_storage(ArrayStorage::default())
    }

    /// The number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Returns `true` if both arrays share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.storage.as_ref().ptr_eq(other.storage.as_ref())
    }
}

impl<T: AnyCodec> Array<T> {
    /// Returns a copy of the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items().get(index).map(element_after_check::<T>)
    }

    /// Iterates over copies of the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.items().iter(),
            _marker: PhantomData,
        }
    }

    /// Appends an element.
    ///
    /// The element is written in place when this handle is the only owner of
    /// the storage. Otherwise the element handles are copied into fresh
    /// storage first.
    pub fn push(&mut self, value: T) {
        let value = value.move_to_any();
        // SAFETY: The storage object always holds an `ArrayStorage`.
        if let Some(storage) = unsafe { self.storage.downcast_mut_unique::<ArrayStorage>() } {
            storage.items.push(value);
            return;
        }

        let mut items = Vec::with_capacity(self.len() + 1);
        items.extend_from_slice(self.items());
        items.push(value);
        *self = Self::from_storage(ArrayStorage { items });
    }

    /// Copies the elements into a [`Vec`].
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

fn element_after_check<T: AnyCodec>(item: &Any) -> T {
    debug_assert!(T::check_any_strict(item));
    // SAFETY: Every element of an `Array<T>` strictly matches `T`. Elements only
    // enter through `T::move_to_any` or after passing `T::check_any_strict`.
    unsafe { T::copy_from_any_after_check(item) }
}

impl<T> Clone for Array<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items()).finish()
    }
}

impl<T: AnyCodec + PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<T: AnyCodec> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_storage(ArrayStorage {
            items: iter.into_iter().map(AnyCodec::move_to_any).collect(),
        })
    }
}

impl<T: AnyCodec> From<Vec<T>> for Array<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: AnyCodec, const N: usize> From<[T; N]> for Array<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<'a, T: AnyCodec> IntoIterator for &'a Array<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over copies of the elements of an [`Array`].
pub struct Iter<'a, T> {
    inner: core::slice::Iter<'a, Any>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: AnyCodec> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(element_after_check::<T>)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: AnyCodec> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(element_after_check::<T>)
    }
}

impl<T: AnyCodec> ExactSizeIterator for Iter<'_, T> {}

impl<T: AnyCodec> FusedIterator for Iter<'_, T> {}

impl<T: AnyCodec> AnyCodec for Array<T> {
    fn copy_to_any(&self) -> Any {
        // SAFETY: `ArrayStorage` is `Send + Sync`.
        unsafe { Any::from_raw_object(self.storage.clone()) }
    }

    fn move_to_any(self) -> Any {
        // SAFETY: `ArrayStorage` is `Send + Sync`.
        unsafe { Any::from_raw_object(self.storage) }
    }

    fn check_any_strict(any: &Any) -> bool {
        any.downcast_object::<ArrayStorage>()
            .is_some_and(|storage| storage.items.iter().all(T::check_any_strict))
    }

    unsafe fn copy_from_any_after_check(any: &Any) -> Self {
        match any.raw_object() {
            Some(object) => Self {
                storage: object.clone(),
                _marker: PhantomData,
            },
            // SAFETY: Our caller checked that the slot holds an array.
            None => unsafe { util::unchecked_extraction() },
        }
    }

    unsafe fn move_from_any_after_check(any: &mut Any) -> Self {
        match any.take_repr() {
            Repr::Object(storage) => Self {
                storage,
                _marker: PhantomData,
            },
            // SAFETY: Our caller checked that the slot holds an array.
            _ => unsafe { util::unchecked_extraction() },
        }
    }

    fn try_cast_from_any(any: &Any) -> Option<Self> {
        let storage = any.downcast_object::<ArrayStorage>()?;
        if storage.items.iter().all(T::check_any_strict) {
            // SAFETY: The strict check for every element just passed.
            return Some(unsafe { Self::copy_from_any_after_check(any) });
        }
        storage
            .items
            .iter()
            .map(Any::try_cast::<T>)
            .collect::<Option<Array<T>>>()
    }

    fn mismatch_type_info(any: &Any) -> String {
        let mismatch = any.downcast_object::<ArrayStorage>().and_then(|storage| {
            storage
                .items
                .iter()
                .enumerate()
                .find(|(_, item)| !T::check_any_strict(item))
        });
        match mismatch {
            Some((index, item)) => {
                alloc::format!("Array[index {index}: {}]", T::mismatch_type_info(item))
            }
            None => String::from(any.type_str()),
        }
    }

    fn type_str() -> String {
        alloc::format!("Array<{}>", T::type_str())
    }

    fn type_schema() -> String {
        util::schema_with_args(crate::handlers::ARRAY_TYPE_KEY, &[T::type_schema()])
    }
}
