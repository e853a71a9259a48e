use alloc::vec::Vec;

use crate::{Any, AnyCodec};

/// Arguments that can be packed into [`Any`] slots for a call.
///
/// Tuples of up to four [`AnyCodec`] values are packed element by element.
/// Already packed slices, arrays and vectors of [`Any`] are passed through.
pub trait PackArgs {
    /// Packs the arguments and hands the slots to `f`.
    fn with_packed<R>(self, f: impl FnOnce(&[Any]) -> R) -> R;
}

impl PackArgs for () {
    fn with_packed<R>(self, f: impl FnOnce(&[Any]) -> R) -> R {
        f(&[])
    }
}

macro_rules! impl_pack_args_for_tuple {
    ($($param:ident $index:tt),+) => {
        impl<$($param: AnyCodec),+> PackArgs for ($($param,)+) {
            fn with_packed<R>(self, f: impl FnOnce(&[Any]) -> R) -> R {
                f(&[$(self.$index.move_to_any()),+])
            }
        }
    };
}

impl_pack_args_for_tuple!(A0 0);
impl_pack_args_for_tuple!(A0 0, A1 1);
impl_pack_args_for_tuple!(A0 0, A1 1, A2 2);
impl_pack_args_for_tuple!(A0 0, A1 1, A2 2, A3 3);

impl PackArgs for &[Any] {
    fn with_packed<R>(self, f: impl FnOnce(&[Any]) -> R) -> R {
        f(self)
    }
}

impl<const N: usize> PackArgs for [Any; N] {
    fn with_packed<R>(self, f: impl FnOnce(&[Any]) -> R) -> R {
        f(&self)
    }
}

impl PackArgs for Vec<Any> {
    fn with_packed<R>(self, f: impl FnOnce(&[Any]) -> R) -> R {
        f(&self)
    }
}
