//! Adapting typed closures to the packed calling convention.

use alloc::{format, string::String, vec, vec::Vec};

use crate::{Any, AnyCodec, Array, Error, Expected, error::kinds};

/// A typed closure that can back a [`Function`](crate::Function).
///
/// Implemented for every `Fn` of up to four arguments whose parameters
/// implement [`AnyCodec`] and whose return type implements [`CallReturn`].
/// `Args` is the tuple of parameter types; it only exists so that closures of
/// different arities get distinct implementations.
pub trait TypedCallable<Args>: Send + Sync + 'static {
    /// The declared return type.
    type Output: CallReturn;

    /// The display names of the parameter types, in order.
    fn param_type_strs() -> Vec<String>;

    /// Decodes `args`, invokes the closure and encodes its return value.
    ///
    /// `signature` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the arguments do not match the parameters, or
    /// whatever failure the return value carries.
    fn invoke(&self, args: &[Any], signature: &str) -> Result<Any, Error>;
}

/// How a typed return value enters the packed calling convention.
///
/// Plain values are stored in a slot. `Result` and [`Expected`] return types
/// carry failures: their error side becomes the `Err` of the packed call.
pub trait CallReturn: Sized {
    /// Whether this is an [`Expected<_>`](Expected) return type.
    const RETURNS_EXPECTED: bool = false;

    /// The display name of the return type used in signatures.
    fn return_type_str() -> String;

    /// Converts the returned value into the packed convention.
    ///
    /// # Errors
    ///
    /// Returns the failure carried by the value, if any.
    fn into_packed(self) -> Result<Any, Error>;
}

macro_rules! impl_call_return_for_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CallReturn for $ty {
                fn return_type_str() -> String {
                    <$ty as AnyCodec>::type_str()
                }

                fn into_packed(self) -> Result<Any, Error> {
                    Ok(self.move_to_any())
                }
            }
        )*
    };
}

impl_call_return_for_values!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    Error,
    Any
);

impl<T: AnyCodec> CallReturn for Array<T> {
    fn return_type_str() -> String {
        <Self as AnyCodec>::type_str()
    }

    fn into_packed(self) -> Result<Any, Error> {
        Ok(self.move_to_any())
    }
}

impl<T: AnyCodec> CallReturn for Option<T> {
    fn return_type_str() -> String {
        <Self as AnyCodec>::type_str()
    }

    fn into_packed(self) -> Result<Any, Error> {
        Ok(self.move_to_any())
    }
}

impl<T: AnyCodec> CallReturn for Expected<T> {
    const RETURNS_EXPECTED: bool = true;

    fn return_type_str() -> String {
        <Self as AnyCodec>::type_str()
    }

    fn into_packed(self) -> Result<Any, Error> {
        self.into_result().map(AnyCodec::move_to_any)
    }
}

impl<T, E> CallReturn for Result<T, E>
where
    T: AnyCodec,
    E: Into<Error>,
{
    fn return_type_str() -> String {
        T::type_str()
    }

    fn into_packed(self) -> Result<Any, Error> {
        self.map(AnyCodec::move_to_any).map_err(Into::into)
    }
}

/// Renders a signature such as `(0: int, 1: str) -> Expected<int>`.
pub(crate) fn render_signature(params: &[String], ret: &str) -> String {
    let params: Vec<String> = params
        .iter()
        .enumerate()
        .map(|(index, param)| format!("{index}: {param}"))
        .collect();
    format!("({}) -> {ret}", params.join(", "))
}

fn check_arity(args: &[Any], expected: usize, signature: &str) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::new(
            kinds::TYPE_ERROR,
            format!(
                "Mismatched number of arguments when calling: `{signature}`. \
                 Expected {expected} but got {}",
                args.len()
            ),
        ))
    }
}

fn unpack_arg<T: AnyCodec>(arg: &Any, index: usize, signature: &str) -> Result<T, Error> {
    arg.try_cast::<T>().ok_or_else(|| {
        Error::new(
            kinds::TYPE_ERROR,
            format!(
                "Mismatched type on argument #{index} when calling: `{signature}`. \
                 Expected `{}` but got `{}`",
                T::type_str(),
                T::mismatch_type_info(arg)
            ),
        )
    })
}

macro_rules! impl_typed_callable {
    ($arity:literal; $($param:ident $arg:ident $index:tt),*) => {
        impl<F, R, $($param,)*> TypedCallable<($($param,)*)> for F
        where
            F: Fn($($param),*) -> R + Send + Sync + 'static,
            R: CallReturn,
            $($param: AnyCodec,)*
        {
            type Output = R;

            fn param_type_strs() -> Vec<String> {
                vec![$($param::type_str()),*]
            }

            fn invoke(&self, args: &[Any], signature: &str) -> Result<Any, Error> {
                check_arity(args, $arity, signature)?;
                $(let $arg = unpack_arg::<$param>(&args[$index], $index, signature)?;)*
                (self)($($arg),*).into_packed()
            }
        }
    };
}

impl_typed_callable!(0;);
impl_typed_callable!(1; A0 a0 0);
impl_typed_callable!(2; A0 a0 0, A1 a1 1);
impl_typed_callable!(3; A0 a0 0, A1 a1 1, A2 a2 2);
impl_typed_callable!(4; A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
