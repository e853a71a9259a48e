//! Type-erased callables and the call-failure adapter.
//!
//! A [`Function`] takes its arguments as a slice of [`Any`] slots and returns
//! `Result<Any, Error>`. Typed closures are adapted to that convention by
//! [`Function::from_typed`], which decodes each argument through its
//! [`AnyCodec`] and encodes the return value through [`CallReturn`].
//!
//! # Calling conventions
//!
//! - **Default**: [`Function::call`] and [`Function::call_as`]. A failure
//!   stays a failure: a returned error is returned as `Err`, and a panic keeps
//!   unwinding through the caller.
//! - **Adapted**: [`Function::call_expected`]. The call runs inside a guarded
//!   region, and every failure it can represent (a returned error, a panic
//!   carrying an [`Error`] or a message) comes back as the error branch of an
//!   [`Expected<T>`]. Panics with any other payload keep unwinding.
//!
//! Adaptation is chosen per call site. The same function can be called both
//! ways:
//!
//! ```
//! use crossing::{Error, Expected, Function};
//!
//! let safe_divide = Function::from_typed(|a: i64, b: i64| -> Expected<i64> {
//!     if b == 0 {
//!         return Expected::failure(Error::new("ValueError", "Division by zero"));
//!     }
//!     Expected::success(a / b)
//! });
//! assert!(safe_divide.returns_expected());
//! assert_eq!(safe_divide.signature(), Some("(0: int, 1: int) -> Expected<int>"));
//!
//! // Default convention: the error branch becomes `Err`.
//! assert_eq!(safe_divide.call_as::<i64>((10_i64, 2_i64)), Ok(5));
//! assert_eq!(safe_divide.call((10_i64, 0_i64)).unwrap_err().kind(), "ValueError");
//!
//! // Adapted convention: the error branch stays data.
//! let result = safe_divide.call_expected::<i64>((10_i64, 0_i64));
//! assert!(result.is_failure());
//! assert_eq!(result.error().message(), "Division by zero");
//! ```

mod args;
mod guard;
mod registry;
mod table;
mod typed;

use alloc::string::String;
use core::fmt;

use triomphe::Arc;
use unsize::CoerceUnsize;

pub use self::{
    args::PackArgs,
    typed::{CallReturn, TypedCallable},
};
use crate::{Any, AnyCodec, Error, Expected};

/// The packed calling convention shared by every [`Function`].
trait PackedCallable: Send + Sync + 'static {
    fn call_packed(&self, args: &[Any]) -> Result<Any, Error>;

    fn signature(&self) -> Option<&str> {
        None
    }

    fn returns_expected(&self) -> bool {
        false
    }
}

/// A closure that already speaks the packed convention.
struct Packed<F>(F);

impl<F> PackedCallable for Packed<F>
where
    F: Fn(&[Any]) -> Result<Any, Error> + Send + Sync + 'static,
{
    fn call_packed(&self, args: &[Any]) -> Result<Any, Error> {
        (self.0)(args)
    }
}

/// A typed closure together with its rendered signature.
struct Typed<F, Args> {
    func: F,
    signature: String,
    _args: core::marker::PhantomData<fn(Args)>,
}

impl<F, Args> PackedCallable for Typed<F, Args>
where
    F: TypedCallable<Args>,
    Args: 'static,
{
    fn call_packed(&self, args: &[Any]) -> Result<Any, Error> {
        self.func.invoke(args, &self.signature)
    }

    fn signature(&self) -> Option<&str> {
        Some(&self.signature)
    }

    fn returns_expected(&self) -> bool {
        <F::Output as CallReturn>::RETURNS_EXPECTED
    }
}

/// A cheaply clonable, type-erased callable.
#[derive(Clone)]
pub struct Function {
    callable: Arc<dyn PackedCallable>,
}

impl Function {
    /// Creates a function from a closure that takes packed arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing::{Any, Function};
    ///
    /// let count = Function::from_packed(|args: &[Any]| Ok(Any::new(args.len() as i64)));
    /// assert_eq!(count.call_as::<i64>((1_i64, "two".to_string())), Ok(2));
    /// assert_eq!(count.signature(), None);
    /// ```
    #[must_use]
    pub fn from_packed<F>(func: F) -> Self
    where
        F: Fn(&[Any]) -> Result<Any, Error> + Send + Sync + 'static,
    {
        let callable = Arc::new(Packed(func));
        Self {
            callable: callable.unsize(unsize::Coercion!(to dyn PackedCallable)),
        }
    }

    /// Creates a function from a typed closure of up to four arguments.
    ///
    /// Arguments are decoded strictly first and then by best-effort
    /// conversion. An argument that fails both is reported as a `TypeError`
    /// naming its position and the function's signature.
    #[must_use]
    pub fn from_typed<F, Args>(func: F) -> Self
    where
        F: TypedCallable<Args>,
        Args: 'static,
    {
        let signature = typed::render_signature(
            &F::param_type_strs(),
            &<F::Output as CallReturn>::return_type_str(),
        );
        let callable = Arc::new(Typed {
            func,
            signature,
            _args: core::marker::PhantomData,
        });
        Self {
            callable: callable.unsize(unsize::Coercion!(to dyn PackedCallable)),
        }
    }

    /// The signature of a typed function, such as `"(0: int) -> str"`.
    ///
    /// Functions created with [`Function::from_packed`] have no signature.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.callable.signature()
    }

    /// Whether the declared return type of a typed function is
    /// [`Expected<_>`](Expected).
    #[must_use]
    pub fn returns_expected(&self) -> bool {
        self.callable.returns_expected()
    }

    /// Calls the function with already packed arguments.
    ///
    /// # Errors
    ///
    /// Returns any error produced by the function, including argument decoding
    /// errors.
    pub fn call_packed(&self, args: &[Any]) -> Result<Any, Error> {
        self.callable.call_packed(args)
    }

    /// Calls the function using the default convention.
    ///
    /// # Errors
    ///
    /// Returns any error produced by the function, including argument decoding
    /// errors.
    pub fn call(&self, args: impl PackArgs) -> Result<Any, Error> {
        args.with_packed(|packed| self.call_packed(packed))
    }

    /// Calls the function using the default convention and converts the
    /// result to `R`.
    ///
    /// # Errors
    ///
    /// Returns any error produced by the function, or a `TypeError` if the
    /// result is not convertible to `R`.
    pub fn call_as<R: AnyCodec>(&self, args: impl PackArgs) -> Result<R, Error> {
        self.call(args)?.into_cast::<R>()
    }

    /// Calls the function using the adapted convention.
    ///
    /// Failures come back as the error branch instead of propagating:
    ///
    /// - a returned error is kept as is;
    /// - a panic whose payload is an [`Error`] keeps its kind and message;
    /// - a panic with a string message becomes a `RuntimeError`;
    /// - a result that is neither a `T` nor an [`Error`] becomes a
    ///   `TypeError`.
    ///
    /// A panic with any other payload is not representable and resumes
    /// unwinding. Without the `std` feature panics are never caught.
    ///
    /// Caught panics still pass through the process panic hook first, so the
    /// default hook prints them to stderr. See [`Error::raise`] for a hook
    /// that stays quiet for raised errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing::{Function, ffi_error};
    ///
    /// let double = Function::from_typed(|value: i64| -> i64 {
    ///     if value < 0 {
    ///         ffi_error!(ValueError, "Negative value not allowed").raise();
    ///     }
    ///     value * 2
    /// });
    ///
    /// assert_eq!(double.call_expected::<i64>((5_i64,)).value(), 10);
    ///
    /// let failed = double.call_expected::<i64>((-1_i64,));
    /// assert!(failed.is_failure());
    /// assert_eq!(failed.error().kind(), "ValueError");
    /// ```
    pub fn call_expected<T: AnyCodec>(&self, args: impl PackArgs) -> Expected<T> {
        let outcome = args
            .with_packed(|packed| guard::catch_native_failure(|| self.call_packed(packed)))
            .and_then(|result| result);

        match outcome {
            Ok(value) => match value.into_cast::<Expected<T>>() {
                Ok(expected) => expected,
                Err(error) => {
                    tracing::debug!(
                        kind = error.kind(),
                        message = error.message(),
                        "call returned a value outside the expected branches"
                    );
                    Expected::failure(error)
                }
            },
            Err(error) => {
                tracing::debug!(
                    kind = error.kind(),
                    message = error.message(),
                    "call failure translated into an expected failure"
                );
                Expected::failure(error)
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature())
            .field("returns_expected", &self.returns_expected())
            .finish()
    }
}
