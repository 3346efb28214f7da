//! Argument classification and the per-call argument list.

use core::fmt;

use smallvec::SmallVec;

use crate::{render::Formatter, Error};

/// Arguments up to this count are stored inline; longer lists spill to the
/// heap.
pub const MAX_PACKED_ARGS: usize = 15;

/// One argument's classified type tag and payload.
///
/// Exactly one payload is meaningful, selected by the variant; [`Self::None`]
/// carries none and denotes "argument absent / index out of range".
/// Non-primitive payloads are borrowed from the call site, never copied.
#[derive(Clone, Copy)]
pub enum ArgValue<'a> {
    /// Absent argument.
    None,
    /// Signed integers and code points.
    I64(i64),
    /// Unsigned integers.
    U64(u64),
    /// Booleans.
    Bool(bool),
    /// Floating-point values (`f32` widens).
    F64(f64),
    /// String views.
    Str(&'a str),
    /// Opaque pointers; only `*const ()` / `*mut ()` format.
    Pointer(usize),
    /// A value with a custom renderer bound to it.
    Custom(&'a dyn CustomFormat),
}

/// Coarse classification used when validating a spec against an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgType {
    None,
    SignedInt,
    UnsignedInt,
    Bool,
    Float,
    Str,
    Pointer,
    Custom,
}

impl ArgType {
    /// Integral in the sign/precision rules' sense.
    pub fn is_integral(self) -> bool {
        matches!(self, Self::SignedInt | Self::UnsignedInt | Self::Bool)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::SignedInt | Self::UnsignedInt | Self::Float)
    }
}

impl ArgValue<'_> {
    pub(crate) fn ty(&self) -> ArgType {
        match self {
            Self::None => ArgType::None,
            Self::I64(_) => ArgType::SignedInt,
            Self::U64(_) => ArgType::UnsignedInt,
            Self::Bool(_) => ArgType::Bool,
            Self::F64(_) => ArgType::Float,
            Self::Str(_) => ArgType::Str,
            Self::Pointer(_) => ArgType::Pointer,
            Self::Custom(_) => ArgType::Custom,
        }
    }

    pub(crate) fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Debug for ArgValue<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => formatter.write_str("None"),
            Self::I64(value) => formatter.debug_tuple("I64").field(value).finish(),
            Self::U64(value) => formatter.debug_tuple("U64").field(value).finish(),
            Self::Bool(value) => formatter.debug_tuple("Bool").field(value).finish(),
            Self::F64(value) => formatter.debug_tuple("F64").field(value).finish(),
            Self::Str(value) => formatter.debug_tuple("Str").field(value).finish(),
            Self::Pointer(value) => formatter
                .debug_tuple("Pointer")
                .field(&format_args!("{value:#x}"))
                .finish(),
            Self::Custom(_) => formatter.write_str("Custom(..)"),
        }
    }
}

/// Custom rendering callback bound into an argument via [`custom()`].
///
/// The renderer receives a [`Formatter`] whose write helpers apply the active
/// format spec, so `{:04}` pads a custom renderer's integer output the same
/// way it pads a plain integer argument.
pub trait CustomFormat {
    /// Renders the value into `f`.
    fn format(&self, f: &mut Formatter<'_>) -> Result<(), Error>;
}

/// One bound argument: an optional name plus the classified value.
#[derive(Debug, Clone, Copy)]
pub struct Argument<'a> {
    name: Option<&'a str>,
    value: ArgValue<'a>,
}

impl<'a> Argument<'a> {
    /// The argument's name, if it was supplied via [`named()`].
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// The classified value.
    pub fn value(&self) -> ArgValue<'a> {
        self.value
    }

    pub(crate) const fn absent() -> Self {
        Self {
            name: None,
            value: ArgValue::None,
        }
    }
}

/// Wraps a value with a name so placeholders can reference it by identifier
/// (`{key}`) instead of index.
pub fn named<'a, T: IntoArgument<'a>>(name: &'a str, value: T) -> Argument<'a> {
    Argument {
        name: Some(name),
        value: value.into_argument().value,
    }
}

/// Binds a value with a [`CustomFormat`] renderer as an argument.
pub fn custom<'a, T: CustomFormat>(value: &'a T) -> Argument<'a> {
    Argument {
        name: None,
        value: ArgValue::Custom(value),
    }
}

/// Conversion of an admissible call-site value into an [`Argument`].
///
/// The impls below encode a fixed classification order: booleans stay
/// booleans; signed integers widen to `i64` and unsigned ones to `u64`;
/// floats widen to `f64`; `char` maps to its scalar value (presented via the
/// `c` type); string-likes become views; only opaque pointers are accepted,
/// so a typed raw pointer simply does not satisfy this trait. Values with a
/// custom renderer go through [`custom()`].
pub trait IntoArgument<'a> {
    /// Performs the conversion.
    fn into_argument(self) -> Argument<'a>;
}

impl<'a> IntoArgument<'a> for Argument<'a> {
    fn into_argument(self) -> Argument<'a> {
        self
    }
}

macro_rules! impl_into_argument {
    ($variant:ident: $via:ty => $($ty:ty),+) => {
        $(
        impl IntoArgument<'_> for $ty {
            fn into_argument(self) -> Argument<'static> {
                Argument {
                    name: None,
                    value: ArgValue::$variant(self as $via),
                }
            }
        }
        )+
    };
}

impl_into_argument!(I64: i64 => i8, i16, i32, isize);
impl_into_argument!(U64: u64 => u8, u16, u32, usize);

impl IntoArgument<'_> for i64 {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::I64(self),
        }
    }
}

impl IntoArgument<'_> for u64 {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::U64(self),
        }
    }
}

impl IntoArgument<'_> for f64 {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::F64(self),
        }
    }
}

impl IntoArgument<'_> for f32 {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::F64(f64::from(self)),
        }
    }
}

impl IntoArgument<'_> for bool {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::Bool(self),
        }
    }
}

// Chars go through the signed-integer tag, mirroring their classification as
// arithmetic values; the `c` presentation turns them back into text.
impl IntoArgument<'_> for char {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::I64(i64::from(u32::from(self))),
        }
    }
}

impl<'a> IntoArgument<'a> for &'a str {
    fn into_argument(self) -> Argument<'a> {
        Argument {
            name: None,
            value: ArgValue::Str(self),
        }
    }
}

impl<'a> IntoArgument<'a> for &'a String {
    fn into_argument(self) -> Argument<'a> {
        Argument {
            name: None,
            value: ArgValue::Str(self),
        }
    }
}

impl IntoArgument<'_> for *const () {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::Pointer(self as usize),
        }
    }
}

impl IntoArgument<'_> for *mut () {
    fn into_argument(self) -> Argument<'static> {
        Argument {
            name: None,
            value: ArgValue::Pointer(self as usize),
        }
    }
}

/// The argument list of one formatting call.
///
/// Borrows the call-site values' storage and must not outlive the call. Lists
/// shorter than [`MAX_PACKED_ARGS`] are stored inline on the stack; longer
/// ones spill to a heap allocation.
#[derive(Debug, Clone, Default)]
pub struct Arguments<'a> {
    inner: SmallVec<[Argument<'a>; MAX_PACKED_ARGS]>,
}

impl<'a> Arguments<'a> {
    /// An empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the list from already-converted arguments.
    pub fn from_slice(args: &[Argument<'a>]) -> Self {
        Self {
            inner: SmallVec::from_slice(args),
        }
    }

    /// Number of supplied arguments.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Positional lookup. Any index outside `0..len()` yields the absent
    /// argument, never a panic.
    pub fn get(&self, index: usize) -> Argument<'a> {
        self.inner
            .get(index)
            .copied()
            .unwrap_or(Argument::absent())
    }

    /// Looks up an argument supplied via [`named()`].
    pub fn find_named(&self, name: &str) -> Option<Argument<'a>> {
        self.inner.iter().find(|arg| arg.name == Some(name)).copied()
    }

    #[cfg(test)]
    pub(crate) fn is_inline(&self) -> bool {
        !self.inner.spilled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_signedness() {
        assert!(matches!(42_i32.into_argument().value(), ArgValue::I64(42)));
        assert!(matches!(42_u32.into_argument().value(), ArgValue::U64(42)));
        assert!(matches!((-3_i8).into_argument().value(), ArgValue::I64(-3)));
        assert!(matches!(
            true.into_argument().value(),
            ArgValue::Bool(true)
        ));
        assert!(matches!(1.5_f32.into_argument().value(), ArgValue::F64(_)));
        assert!(matches!("s".into_argument().value(), ArgValue::Str("s")));
        assert!(matches!('X'.into_argument().value(), ArgValue::I64(88)));
    }

    #[test]
    fn out_of_range_index_resolves_to_absent() {
        let args = Arguments::from_slice(&["a".into_argument()]);
        assert!(matches!(args.get(0).value(), ArgValue::Str("a")));
        assert!(args.get(1).value().is_none());
        assert!(args.get(usize::MAX).value().is_none());
    }

    #[test]
    fn named_lookup() {
        let args = Arguments::from_slice(&[named("width", 4_u32), "x".into_argument()]);
        assert!(matches!(
            args.find_named("width").map(|arg| arg.value()),
            Some(ArgValue::U64(4))
        ));
        assert!(args.find_named("height").is_none());
    }

    #[test]
    fn small_lists_stay_inline() {
        let small: Vec<_> = (0..14_i64).map(IntoArgument::into_argument).collect();
        assert!(Arguments::from_slice(&small).is_inline());

        let large: Vec<_> = (0..20_i64).map(IntoArgument::into_argument).collect();
        let args = Arguments::from_slice(&large);
        assert!(!args.is_inline());
        assert!(matches!(args.get(19).value(), ArgValue::I64(19)));
        assert!(args.get(20).value().is_none());
    }
}
