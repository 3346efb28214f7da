//! Per-type value rendering and padding.

#![allow(clippy::cast_possible_truncation)] // u32 widths / precisions fit usize

use crate::{
    arg::ArgValue,
    num::{self, NoSep, SepEvery3},
    spec::{Alignment, Flags, FormatSpec},
    Error, ErrorKind, Writer,
};

const INVALID_CODE_POINT: &str = "Invalid code point";

/// Rendering context for one placeholder: the resolved spec plus the output
/// sink.
///
/// Handed to [`CustomFormat`](crate::CustomFormat) implementations; the
/// `write_*` helpers apply the active spec, so a custom renderer formatted
/// with `{:04}` pads its integer output the same way a plain integer argument
/// would be padded.
pub struct Formatter<'a> {
    out: &'a mut dyn Writer,
    spec: FormatSpec,
    src: &'a str,
    offset: usize,
}

impl core::fmt::Debug for Formatter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Formatter")
            .field("spec", &self.spec)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl<'a> Formatter<'a> {
    pub(crate) fn new(
        out: &'a mut dyn Writer,
        spec: FormatSpec,
        src: &'a str,
        offset: usize,
    ) -> Self {
        Self {
            out,
            spec,
            src,
            offset,
        }
    }

    /// The active, fully resolved format spec.
    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    /// Builds an error pointing at this placeholder in the original format
    /// string.
    pub fn error(&self, kind: ErrorKind, message: &'static str) -> Error {
        Error::new(kind, message, self.src, self.offset)
    }

    /// Writes bytes to the sink directly, bypassing the spec.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.out.write(bytes);
    }

    pub(crate) fn write_value(&mut self, value: ArgValue<'_>) -> Result<(), Error> {
        match value {
            // Resolution replaces absent arguments with an error before
            // rendering is reached.
            ArgValue::None => Ok(()),
            ArgValue::I64(value) => self.write_i64(value),
            ArgValue::U64(value) => self.write_u64(value),
            ArgValue::Bool(value) => self.write_bool(value),
            ArgValue::F64(value) => self.write_f64(value),
            ArgValue::Str(value) => self.write_str(value),
            ArgValue::Pointer(value) => self.write_pointer(value),
            ArgValue::Custom(value) => value.format(self),
        }
    }

    /// Writes a signed integer, honoring the spec.
    pub fn write_i64(&mut self, value: i64) -> Result<(), Error> {
        self.write_int(value.unsigned_abs(), value < 0)
    }

    /// Writes an unsigned integer, honoring the spec.
    pub fn write_u64(&mut self, value: u64) -> Result<(), Error> {
        self.write_int(value, false)
    }

    /// Writes a boolean: as text by default, as an integer under a numeric
    /// presentation type.
    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        match self.spec.ty {
            None | Some('s') => {
                let text = if value { "true" } else { "false" };
                self.write_text(text, Alignment::Left);
                Ok(())
            }
            Some(_) => self.write_int(u64::from(value), false),
        }
    }

    /// Writes a string view, clipping to the spec's precision (in code
    /// points) and padding to its width.
    pub fn write_str(&mut self, value: &str) -> Result<(), Error> {
        let clipped = match self.spec.precision {
            Some(max_chars) => clip_chars(value, max_chars as usize),
            None => value,
        };
        self.write_text(clipped, Alignment::Left);
        Ok(())
    }

    /// Writes a floating-point value, honoring the spec.
    pub fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        let spec = self.spec;
        let upper = matches!(spec.ty, Some('F' | 'E' | 'G' | 'A'));
        let negative = value.is_sign_negative() && !value.is_nan();
        let magnitude = value.abs();
        let sign = self.sign_byte(negative);

        if !value.is_finite() {
            let mut body = String::from(match (value.is_nan(), upper) {
                (true, false) => "nan",
                (true, true) => "NAN",
                (false, false) => "inf",
                (false, true) => "INF",
            });
            if spec.ty == Some('%') {
                body.push('%');
            }
            // Zero padding makes no sense for non-numbers; fall back to
            // right alignment, dropping the '0' fill the zero flag set
            // alongside it. An explicit fill with an explicit alignment
            // stays.
            let align = match spec.align {
                Alignment::Default | Alignment::Numeric => Alignment::Right,
                other => other,
            };
            if spec.align == Alignment::Numeric {
                self.spec.fill = ' ';
            }
            let count = usize::from(sign.is_some()) + body.len();
            let (left, right) = pad_counts(align, spec.width as usize, count);
            self.write_fill(left);
            if let Some(sign) = sign {
                self.out.write(&[sign]);
            }
            self.out.write(body.as_bytes());
            self.write_fill(right);
            return Ok(());
        }

        let mut body = float_body(magnitude, spec.ty, spec.precision, upper);
        if spec.ty == Some('%') {
            body.push('%');
        }
        self.write_number(sign, "", body.as_bytes());
        Ok(())
    }

    /// Writes a pointer as `0x`-prefixed lowercase hex.
    pub fn write_pointer(&mut self, addr: usize) -> Result<(), Error> {
        let mut buf = [0_u8; 16];
        let start = num::write_base_pow2(&mut buf, addr as u64, 4, false);
        self.write_number(None, "0x", &buf[start..]);
        Ok(())
    }

    fn write_int(&mut self, magnitude: u64, negative: bool) -> Result<(), Error> {
        let spec = self.spec;
        if spec.ty == Some('c') {
            return self.write_code_point(magnitude, negative);
        }

        let hash = spec.flags.contains(Flags::HASH);
        let mut buf = [0_u8; 64];
        let (start, prefix) = match spec.ty {
            Some('b' | 'B') => {
                let upper = spec.ty == Some('B');
                let start = num::write_base_pow2(&mut buf, magnitude, 1, upper);
                let prefix = match (hash, upper) {
                    (false, _) => "",
                    (true, false) => "0b",
                    (true, true) => "0B",
                };
                (start, prefix)
            }
            Some('o') => {
                let start = num::write_base_pow2(&mut buf, magnitude, 3, false);
                // The octal prefix is a bare zero; a zero value already
                // starts with one.
                (start, if hash && magnitude != 0 { "0" } else { "" })
            }
            Some('x' | 'X') => {
                let upper = spec.ty == Some('X');
                let start = num::write_base_pow2(&mut buf, magnitude, 4, upper);
                let prefix = match (hash, upper) {
                    (false, _) => "",
                    (true, false) => "0x",
                    (true, true) => "0X",
                };
                (start, prefix)
            }
            Some('n') => (
                num::write_decimal(&mut buf, magnitude, SepEvery3::new(b",")),
                "",
            ),
            // `d`, no type, or anything else the validator let through.
            _ => (num::write_decimal(&mut buf, magnitude, NoSep), ""),
        };

        let sign = self.sign_byte(negative);
        self.write_number(sign, prefix, &buf[start..]);
        Ok(())
    }

    /// `c` presentation: the integer value must be a valid Unicode scalar.
    fn write_code_point(&mut self, magnitude: u64, negative: bool) -> Result<(), Error> {
        let scalar = u32::try_from(magnitude).ok().filter(|_| !negative);
        let Some(c) = scalar.and_then(char::from_u32) else {
            return Err(self.error(ErrorKind::TypeMismatch, INVALID_CODE_POINT));
        };
        let mut buf = [0_u8; 4];
        let text: &str = c.encode_utf8(&mut buf);
        let (left, right) = pad_counts(
            resolve_alignment(self.spec.align, Alignment::Left),
            self.spec.width as usize,
            1,
        );
        self.write_fill(left);
        self.out.write(text.as_bytes());
        self.write_fill(right);
        Ok(())
    }

    /// Sign + prefix + ASCII body with numeric-alignment support. Numeric
    /// alignment inserts the fill between the sign/prefix and the body;
    /// every other alignment pads around the whole thing.
    fn write_number(&mut self, sign: Option<u8>, prefix: &str, body: &[u8]) {
        let width = self.spec.width as usize;
        let count = usize::from(sign.is_some()) + prefix.len() + body.len();

        if self.spec.align == Alignment::Numeric {
            if let Some(sign) = sign {
                self.out.write(&[sign]);
            }
            self.out.write(prefix.as_bytes());
            if width > count {
                self.write_fill(width - count);
            }
            self.out.write(body);
        } else {
            let align = resolve_alignment(self.spec.align, Alignment::Right);
            let (left, right) = pad_counts(align, width, count);
            self.write_fill(left);
            if let Some(sign) = sign {
                self.out.write(&[sign]);
            }
            self.out.write(prefix.as_bytes());
            self.out.write(body);
            self.write_fill(right);
        }
    }

    /// Pads `text` (already clipped) to the spec's width in code points.
    fn write_text(&mut self, text: &str, default_align: Alignment) {
        let chars = text.chars().count();
        let align = resolve_alignment(self.spec.align, default_align);
        let (left, right) = pad_counts(align, self.spec.width as usize, chars);
        self.write_fill(left);
        self.out.write(text.as_bytes());
        self.write_fill(right);
    }

    fn write_fill(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let mut buf = [0_u8; 4];
        let encoded = self.spec.fill.encode_utf8(&mut buf).as_bytes();
        for _ in 0..count {
            self.out.write(encoded);
        }
    }

    fn sign_byte(&self, negative: bool) -> Option<u8> {
        if negative {
            Some(b'-')
        } else if self.spec.flags.contains(Flags::PLUS) {
            Some(b'+')
        } else if self.spec.flags.contains(Flags::SIGN) {
            Some(b' ')
        } else {
            None
        }
    }
}

fn resolve_alignment(align: Alignment, default: Alignment) -> Alignment {
    if align == Alignment::Default {
        default
    } else {
        align
    }
}

/// Splits the padding for a field of `width` around `char_count` rendered
/// code points.
fn pad_counts(align: Alignment, width: usize, char_count: usize) -> (usize, usize) {
    if char_count >= width {
        return (0, 0);
    }
    let total = width - char_count;
    match align {
        Alignment::Left => (0, total),
        Alignment::Center => (total / 2, total - total / 2),
        // `Default` and `Numeric` are resolved by the callers.
        _ => (total, 0),
    }
}

/// First `max_chars` code points of `s`; the whole of `s` if it is shorter.
fn clip_chars(s: &str, max_chars: usize) -> &str {
    let mut count = 0;
    for (pos, _) in s.char_indices() {
        if count == max_chars {
            return &s[..pos];
        }
        count += 1;
    }
    s
}

/// Renders a finite non-negative float magnitude without sign or padding.
fn float_body(magnitude: f64, ty: Option<char>, precision: Option<u32>, upper: bool) -> String {
    let precision = precision.map(|p| p as usize);
    match ty {
        // Default presentation: shortest round-trip form, integral values
        // keeping a trailing `.0`; with a precision, significant digits.
        None | Some('n') => match precision {
            Some(p) => general(magnitude, p.max(1), false),
            None => format!("{magnitude:?}"),
        },
        Some('f' | 'F') => format!("{:.*}", precision.unwrap_or(6), magnitude),
        Some('%') => format!("{:.*}", precision.unwrap_or(6), magnitude * 100.0),
        Some('e' | 'E') => scientific(magnitude, precision.unwrap_or(6), upper),
        Some('g' | 'G') => general(magnitude, precision.unwrap_or(6).max(1), upper),
        Some('a' | 'A') => hex_float(magnitude, precision.unwrap_or(6), upper),
        // The validator rejects anything else.
        Some(_) => format!("{magnitude:?}"),
    }
}

/// `e` presentation: fixed fraction digits plus a signed two-digit exponent.
fn scientific(magnitude: f64, fraction_digits: usize, upper: bool) -> String {
    let rendered = format!("{magnitude:.fraction_digits$e}");
    let (mantissa, exp) = split_exponent(&rendered);
    let e = if upper { 'E' } else { 'e' };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{exp_sign}{:02}", exp.unsigned_abs())
}

/// `g` presentation: `significant` significant digits, trailing zeros
/// stripped, switching to scientific notation for very small or large
/// exponents.
fn general(magnitude: f64, significant: usize, upper: bool) -> String {
    let rendered = format!("{:.*e}", significant - 1, magnitude);
    let (mantissa, exp) = split_exponent(&rendered);

    if exp < -4 || exp >= significant as i32 {
        let e = if upper { 'E' } else { 'e' };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        let mantissa = trim_fraction_zeros(mantissa);
        format!("{mantissa}{e}{exp_sign}{:02}", exp.unsigned_abs())
    } else {
        let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
        fixed_from_digits(&digits, exp + 1)
    }
}

/// `a` presentation: C-style hex float, `0x1.<frac>p<exp>`, truncated to
/// `fraction_digits` hex digits.
fn hex_float(magnitude: f64, fraction_digits: usize, upper: bool) -> String {
    const FRAC_BITS: u32 = 52;
    const EXP_BIAS: i32 = 1023;

    let bits = magnitude.to_bits();
    let biased = ((bits >> FRAC_BITS) & 0x7ff) as i32;
    let frac = bits & ((1_u64 << FRAC_BITS) - 1);
    let (lead, exp) = if biased == 0 {
        ('0', if frac == 0 { 0 } else { -(EXP_BIAS - 1) })
    } else {
        ('1', biased - EXP_BIAS)
    };

    let mut out = String::from("0x");
    out.push(lead);
    if fraction_digits > 0 {
        out.push('.');
        for i in 0..fraction_digits {
            let nibble = if i < 13 {
                (frac >> (FRAC_BITS - 4 * (i as u32 + 1))) & 0xf
            } else {
                0
            };
            let digit = char::from_digit(nibble as u32, 16).unwrap_or('0');
            out.push(if upper { digit.to_ascii_uppercase() } else { digit });
        }
    }
    out.push(if upper { 'P' } else { 'p' });
    out.push(if exp < 0 { '-' } else { '+' });
    out.push_str(&exp.unsigned_abs().to_string());
    out
}

/// Splits `<mantissa>e<exp>` produced by the std float formatter.
fn split_exponent(rendered: &str) -> (&str, i32) {
    match rendered.split_once('e') {
        // The exponent always parses; it came out of the formatter.
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (rendered, 0),
    }
}

fn trim_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Places a decimal point after `point_pos` digits of the all-digit string,
/// padding with zeros as needed and stripping a trailing fraction.
fn fixed_from_digits(digits: &str, point_pos: i32) -> String {
    if point_pos <= 0 {
        let mut out = String::from("0.");
        for _ in 0..-point_pos {
            out.push('0');
        }
        out.push_str(digits);
        trim_fraction_zeros(&out).to_owned()
    } else if point_pos as usize >= digits.len() {
        let mut out = String::from(digits);
        for _ in 0..(point_pos as usize - digits.len()) {
            out.push('0');
        }
        out
    } else {
        let (int_part, frac_part) = digits.split_at(point_pos as usize);
        let mut out = format!("{int_part}.{frac_part}");
        out = trim_fraction_zeros(&out).to_owned();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_split() {
        assert_eq!(pad_counts(Alignment::Right, 5, 2), (3, 0));
        assert_eq!(pad_counts(Alignment::Left, 5, 2), (0, 3));
        assert_eq!(pad_counts(Alignment::Center, 5, 2), (1, 2));
        assert_eq!(pad_counts(Alignment::Center, 6, 2), (2, 2));
        // Fields narrower than the content never pad.
        assert_eq!(pad_counts(Alignment::Right, 2, 4), (0, 0));
    }

    #[test]
    fn clipping_counts_code_points() {
        assert_eq!(clip_chars("str", 2), "st");
        assert_eq!(clip_chars("Tℝ💣eßt", 2), "Tℝ");
        assert_eq!(clip_chars("Tℝ💣eßt", 5), "Tℝ💣eß");
        assert_eq!(clip_chars("str", 16), "str");
        assert_eq!(clip_chars("", 3), "");
    }

    #[test]
    fn general_presentation() {
        assert_eq!(general(392.65, 6, false), "392.65");
        assert_eq!(general(392.65, 4, false), "392.6");
        assert_eq!(general(1.2345, 2, false), "1.2");
        assert_eq!(general(0.00123, 3, false), "0.00123");
        assert_eq!(general(0.1, 16, false), "0.1");
        assert_eq!(general(0.0, 6, false), "0");
        assert_eq!(general(1.0e10, 3, false), "1e+10");
        assert_eq!(general(0.000012, 3, false), "1.2e-05");
    }

    #[test]
    fn scientific_presentation() {
        assert_eq!(scientific(392.65, 6, false), "3.926500e+02");
        assert_eq!(scientific(392.65, 6, true), "3.926500E+02");
        assert_eq!(scientific(0.0, 6, false), "0.000000e+00");
        assert_eq!(scientific(0.001, 2, false), "1.00e-03");
    }

    #[test]
    fn hex_float_presentation() {
        assert_eq!(hex_float(42.0, 6, false), "0x1.500000p+5");
        assert_eq!(hex_float(42.0, 6, true), "0x1.500000P+5");
        assert_eq!(hex_float(1.0, 1, false), "0x1.0p+0");
        assert_eq!(hex_float(0.0, 0, false), "0x0p+0");
    }

    #[test]
    fn default_float_body_keeps_trailing_zero() {
        assert_eq!(float_body(42.0, None, None, false), "42.0");
        assert_eq!(float_body(0.0, None, None, false), "0.0");
        assert_eq!(float_body(392.65, None, None, false), "392.65");
        assert_eq!(float_body(1.2345, None, Some(2), false), "1.2");
    }
}
