//! The lock-protected name-to-function map behind the global registry.
//!
//! Uses `std::sync::RwLock` when `std` is enabled and `spin::RwLock`
//! otherwise. Every operation takes the lock once, so a lookup never sees a
//! registration half done and a duplicate check cannot race its insert.

use alloc::{string::String, vec::Vec};

use hashbrown::{HashMap, hash_map::Entry};
use rustc_hash::FxBuildHasher;

use super::Function;

#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

type FunctionMap = HashMap<String, Function, FxBuildHasher>;

/// Outcome of [`FunctionTable::register`].
#[derive(Debug)]
pub(crate) enum Registration {
    /// The name was free.
    Added,
    /// The name was taken and `can_override` allowed replacing it. Holds the
    /// previous function.
    Replaced(Function),
    /// The name was taken and the table is unchanged.
    Rejected,
}

pub(crate) struct FunctionTable(impl_::RwLock<FunctionMap>);

impl FunctionTable {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(impl_::RwLock::new(HashMap::with_hasher(FxBuildHasher)))
    }

    #[cfg(feature = "std")]
    fn read(&self) -> impl_::RwLockReadGuard<'_, FunctionMap> {
        // Map updates are single calls into `hashbrown`; a panic elsewhere in the
        // holder cannot leave the map inconsistent.
        self.0.read().unwrap_or_else(impl_::PoisonError::into_inner)
    }

    #[cfg(feature = "std")]
    fn write(&self) -> impl_::RwLockWriteGuard<'_, FunctionMap> {
        self.0.write().unwrap_or_else(impl_::PoisonError::into_inner)
    }

    #[cfg(not(feature = "std"))]
    fn read(&self) -> impl_::RwLockReadGuard<'_, FunctionMap> {
        self.0.read()
    }

    #[cfg(not(feature = "std"))]
    fn write(&self) -> impl_::RwLockWriteGuard<'_, FunctionMap> {
        self.0.write()
    }

    /// Stores `func` under `name` unless the name is taken and
    /// `can_override` is `false`.
    pub(crate) fn register(
        &self,
        name: String,
        func: Function,
        can_override: bool,
    ) -> Registration {
        match self.write().entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(func);
                Registration::Added
            }
            Entry::Occupied(mut slot) if can_override => {
                Registration::Replaced(slot.insert(func))
            }
            Entry::Occupied(_) => Registration::Rejected,
        }
    }

    pub(crate) fn get_cloned(&self, name: &str) -> Option<Function> {
        self.read().get(name).cloned()
    }

    pub(crate) fn remove(&self, name: &str) -> Option<Function> {
        self.write().remove(name)
    }

    pub(crate) fn sorted_keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
