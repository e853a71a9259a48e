//! The process-wide table of named functions.

use alloc::{format, string::String, vec::Vec};
use core::panic::Location;

use super::{
    Function,
    table::{FunctionTable, Registration},
};
use crate::{Error, error::kinds};

static GLOBAL_FUNCTIONS: FunctionTable = FunctionTable::new();

impl Function {
    /// Registers `func` under `name` in the global table.
    ///
    /// # Errors
    ///
    /// Returns a `RuntimeError` if `name` is already registered and
    /// `can_override` is `false`. The existing entry is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing::{Error, Expected, Function};
    ///
    /// let safe_divide = Function::from_typed(|a: i64, b: i64| -> Expected<i64> {
    ///     if b == 0 {
    ///         return Expected::failure(Error::new("ValueError", "Division by zero"));
    ///     }
    ///     Expected::success(a / b)
    /// });
    /// Function::set_global("docs.safe_divide", safe_divide, false).unwrap();
    ///
    /// let found = Function::get_global_required("docs.safe_divide").unwrap();
    /// assert_eq!(found.call_expected::<i64>((10_i64, 2_i64)).value(), 5);
    /// assert!(Function::remove_global("docs.safe_divide"));
    /// ```
    #[track_caller]
    pub fn set_global(
        name: impl Into<String>,
        func: Function,
        can_override: bool,
    ) -> Result<(), Error> {
        let name = name.into();
        let location = Location::caller();

        match GLOBAL_FUNCTIONS.register(name.clone(), func, can_override) {
            Registration::Added => {
                tracing::trace!(
                    name = name.as_str(),
                    file = location.file(),
                    line = location.line(),
                    "registering global function"
                );
                Ok(())
            }
            Registration::Replaced(previous) => {
                tracing::warn!(
                    name = name.as_str(),
                    previous_signature = previous.signature(),
                    file = location.file(),
                    line = location.line(),
                    "overriding registered global function"
                );
                Ok(())
            }
            Registration::Rejected => Err(Error::new(
                kinds::RUNTIME_ERROR,
                format!("Global Function `{name}` is already registered"),
            )),
        }
    }

    /// Looks up a function in the global table.
    #[must_use]
    pub fn get_global(name: &str) -> Option<Function> {
        GLOBAL_FUNCTIONS.get_cloned(name)
    }

    /// Looks up a function in the global table, failing if it is missing.
    ///
    /// # Errors
    ///
    /// Returns a `ValueError` if no function is registered under `name`.
    pub fn get_global_required(name: &str) -> Result<Function, Error> {
        Self::get_global(name).ok_or_else(|| {
            Error::new(
                kinds::VALUE_ERROR,
                format!("Cannot find global function `{name}`"),
            )
        })
    }

    /// Removes a function from the global table. Returns `true` if it was
    /// registered.
    pub fn remove_global(name: &str) -> bool {
        let removed = GLOBAL_FUNCTIONS.remove(name).is_some();
        if removed {
            tracing::trace!(name, "removed global function");
        }
        removed
    }

    /// The names of all registered global functions, sorted.
    #[must_use]
    pub fn list_global_names() -> Vec<String> {
        GLOBAL_FUNCTIONS.sorted_keys()
    }
}
