//! Parsed representation of the `:`-section of a placeholder.

use bitflags::bitflags;

/// Alignment requested by a format spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// No alignment was given; each argument type picks its own default
    /// (numbers and pointers align right, text aligns left).
    #[default]
    Default,
    /// `<`
    Left,
    /// `>`
    Right,
    /// `^`
    Center,
    /// `=`: fill is inserted between the sign/base prefix and the digits.
    Numeric,
}

bitflags! {
    /// Sign and alternate-form flags of a format spec.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        /// A sign character is always shown (set by both `+` and a space).
        const SIGN = 1 << 0;
        /// `+`: positive values get an explicit plus.
        const PLUS = 1 << 1;
        /// `-`: only negative values get a sign (the default behavior).
        const MINUS = 1 << 2;
        /// `#`: alternate form (base prefix for integers).
        const HASH = 1 << 3;
    }
}

/// A fully parsed format spec: `[[fill]align][sign][#][0][width][.precision][type]`.
///
/// `width == 0` means "unset"; `precision` distinguishes "unset" (`None`) from
/// an explicit zero. The type character is stored verbatim; its legality is
/// checked against the bound argument separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatSpec {
    /// Fill code point, a single space unless overridden.
    pub fill: char,
    /// Requested alignment.
    pub align: Alignment,
    /// Sign and alternate-form flags.
    pub flags: Flags,
    /// Minimum field width in code points.
    pub width: u32,
    /// Maximum fraction digits (floats) or code points (strings).
    pub precision: Option<u32>,
    /// Presentation type character, e.g. `x` or `f`.
    pub ty: Option<char>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: Alignment::Default,
            flags: Flags::empty(),
            width: 0,
            precision: None,
            ty: None,
        }
    }
}

/// A deferred reference to an argument, resolved against the argument list
/// only when the placeholder using it renders.
///
/// Automatic (`{}`) references are already folded into explicit indices by the
/// parse cursor's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgRef<'a> {
    /// 0-based position.
    Index(usize),
    /// Named argument lookup.
    Name(&'a str),
}

/// A parsed spec whose width and/or precision may still be deferred argument
/// references.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DynamicSpec<'a> {
    pub spec: FormatSpec,
    pub width_ref: Option<ArgRef<'a>>,
    pub precision_ref: Option<ArgRef<'a>>,
}
