//! Parse cursor and the placeholder / format-spec grammar.
//!
//! The cursor keeps the full original format string and an absolute byte
//! offset, so every error can point back at the right column of the string
//! the caller wrote even though scanning has advanced past it.

use crate::{
    spec::{Alignment, ArgRef, DynamicSpec, Flags, FormatSpec},
    Error, ErrorKind,
};

pub(crate) const UNMATCHED_BRACE: &str =
    "Unmatched \"}\" in format string; use \"}}\" to escape it";
pub(crate) const CLOSING_BRACE_EXPECTED: &str = "\"}\" expected";

const INVALID_FORMAT_STRING: &str = "Invalid format string";
const ENDED_ABRUPTLY: &str = "Format string ended abruptly";
const COLON_OR_BRACE_EXPECTED: &str = "Expected \":\" or \"}\"";
const INVALID_FILL: &str = "Invalid fill character \"{\"";
const MISSING_PRECISION: &str = "Missing precision specifier";
const MANUAL_TO_AUTO: &str = "Cannot switch from manual to automatic argument indexing";
const AUTO_TO_MANUAL: &str = "Cannot switch from automatic to manual argument indexing";
const WIDTH_TOO_LARGE: &str = "Format width is too large";
const PRECISION_TOO_LARGE: &str = "Format precision is too large";
const ARG_INDEX_TOO_LARGE: &str = "Argument index is too large";

/// Scan state over one format string.
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Next automatic argument index; forced to `-1` once an explicit index
    /// has been used, locking out automatic mode for the rest of the call.
    next_arg_id: i64,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            next_arg_id: 0,
        }
    }

    /// The full original format string, untouched by scanning progress.
    pub fn src(&self) -> &'a str {
        self.src
    }

    /// Absolute byte offset of the scan position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The not-yet-consumed tail of the format string.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn peek(&self) -> Option<u8> {
        self.rest().as_bytes().first().copied()
    }

    pub fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
        debug_assert!(self.src.is_char_boundary(self.pos));
    }

    /// Builds an error pointing at the current position of the original
    /// string.
    pub fn error(&self, kind: ErrorKind, message: &'static str) -> Error {
        Error::new(kind, message, self.src, self.pos)
    }

    /// Returns the next automatic argument index, failing if manual indexing
    /// was already established.
    pub fn next_arg_id(&mut self) -> Result<usize, Error> {
        if self.next_arg_id < 0 {
            return Err(self.error(ErrorKind::IndexingConflict, MANUAL_TO_AUTO));
        }
        let id = self.next_arg_id as usize;
        self.next_arg_id += 1;
        Ok(id)
    }

    /// Marks manual indexing mode, failing if automatic mode already produced
    /// an index. Named references lock neither mode.
    pub fn use_explicit_index(&mut self) -> Result<(), Error> {
        if self.next_arg_id > 0 {
            return Err(self.error(ErrorKind::IndexingConflict, AUTO_TO_MANUAL));
        }
        self.next_arg_id = -1;
        Ok(())
    }

    /// Parses one argument reference: empty means automatic, a leading digit
    /// an explicit index, an identifier start a name.
    pub fn parse_arg_ref(&mut self) -> Result<ArgRef<'a>, Error> {
        match self.peek() {
            None => Err(self.error(ErrorKind::Syntax, INVALID_FORMAT_STRING)),
            Some(b'}' | b':') => Ok(ArgRef::Index(self.next_arg_id()?)),
            Some(byte) if byte.is_ascii_digit() => {
                let index = self.parse_nonnegative_int(ARG_INDEX_TOO_LARGE)?;
                match self.peek() {
                    Some(b'}' | b':') => {
                        self.use_explicit_index()?;
                        Ok(ArgRef::Index(index as usize))
                    }
                    Some(_) => Err(self.error(ErrorKind::Syntax, COLON_OR_BRACE_EXPECTED)),
                    None => Err(self.error(ErrorKind::Syntax, ENDED_ABRUPTLY)),
                }
            }
            Some(byte) if byte == b'_' || byte.is_ascii_alphabetic() => {
                let rest = self.rest();
                let len = rest
                    .bytes()
                    .take_while(|byte| *byte == b'_' || byte.is_ascii_alphanumeric())
                    .count();
                let name = &rest[..len];
                self.advance(len);
                Ok(ArgRef::Name(name))
            }
            Some(_) => Err(self.error(ErrorKind::Syntax, INVALID_FORMAT_STRING)),
        }
    }

    /// Parses the format-spec mini-grammar up to (but not including) the
    /// closing `}`.
    pub fn parse_spec(&mut self) -> Result<DynamicSpec<'a>, Error> {
        let mut out = DynamicSpec::default();
        if matches!(self.peek(), None | Some(b'}')) {
            return Ok(out);
        }

        self.parse_fill_align(&mut out.spec)?;

        match self.peek() {
            Some(b'+') => {
                out.spec.flags |= Flags::SIGN | Flags::PLUS;
                self.advance(1);
            }
            Some(b'-') => {
                out.spec.flags |= Flags::MINUS;
                self.advance(1);
            }
            Some(b' ') => {
                out.spec.flags |= Flags::SIGN;
                self.advance(1);
            }
            _ => {}
        }

        if self.peek() == Some(b'#') {
            out.spec.flags |= Flags::HASH;
            self.advance(1);
        }

        // The zero flag is shorthand for numeric alignment with a '0' fill.
        // It is applied in string order: the alignment stage above has
        // already run, so an alignment character before the zero wins.
        if self.peek() == Some(b'0') {
            out.spec.align = Alignment::Numeric;
            out.spec.fill = '0';
            self.advance(1);
        }

        match self.peek() {
            Some(byte) if byte.is_ascii_digit() => {
                out.spec.width = self.parse_nonnegative_int(WIDTH_TOO_LARGE)?;
            }
            Some(b'{') => {
                self.advance(1);
                out.width_ref = Some(self.parse_arg_ref()?);
                self.expect_closing_brace()?;
            }
            _ => {}
        }

        if self.peek() == Some(b'.') {
            self.advance(1);
            match self.peek() {
                Some(byte) if byte.is_ascii_digit() => {
                    out.spec.precision = Some(self.parse_nonnegative_int(PRECISION_TOO_LARGE)?);
                }
                Some(b'{') => {
                    self.advance(1);
                    out.precision_ref = Some(self.parse_arg_ref()?);
                    self.expect_closing_brace()?;
                }
                _ => return Err(self.error(ErrorKind::Syntax, MISSING_PRECISION)),
            }
        }

        if let Some(ty) = self.rest().chars().next().filter(|c| *c != '}') {
            out.spec.ty = Some(ty);
            self.advance(ty.len_utf8());
        }
        Ok(out)
    }

    /// Fill and alignment: if the second code point is an alignment character
    /// the first is a custom fill; otherwise the first alone may be the
    /// alignment.
    fn parse_fill_align(&mut self, spec: &mut FormatSpec) -> Result<(), Error> {
        let mut chars = self.rest().chars();
        let Some(first) = chars.next() else {
            return Ok(());
        };
        let second = chars.next();

        if let Some(align) = second.and_then(alignment_of) {
            if first == '{' {
                return Err(self.error(ErrorKind::Syntax, INVALID_FILL));
            }
            spec.fill = first;
            spec.align = align;
            // `second` is one of the ASCII alignment characters.
            self.advance(first.len_utf8() + 1);
        } else if let Some(align) = alignment_of(first) {
            spec.align = align;
            self.advance(1);
        }
        Ok(())
    }

    fn expect_closing_brace(&mut self) -> Result<(), Error> {
        if self.peek() == Some(b'}') {
            self.advance(1);
            Ok(())
        } else {
            Err(self.error(ErrorKind::Syntax, CLOSING_BRACE_EXPECTED))
        }
    }

    /// Shared non-negative-integer parser. Accumulates digit by digit against
    /// a precomputed `i32::MAX` threshold so each step detects overflow; on
    /// overflow the remaining digits are still consumed and an [`Overflow`]
    /// error pointing past the run is reported.
    ///
    /// [`Overflow`]: ErrorKind::Overflow
    fn parse_nonnegative_int(&mut self, too_large: &'static str) -> Result<u32, Error> {
        const MAX: u32 = i32::MAX as u32;
        const BIG: u32 = MAX / 10;

        let mut value = 0_u32;
        let mut overflow = false;
        while let Some(byte) = self.peek().filter(u8::is_ascii_digit) {
            let digit = u32::from(byte - b'0');
            if overflow || value > BIG || (value == BIG && digit > MAX % 10) {
                overflow = true;
                value = MAX;
            } else {
                value = value * 10 + digit;
            }
            self.advance(1);
        }
        if overflow {
            return Err(self.error(ErrorKind::Overflow, too_large));
        }
        Ok(value)
    }
}

fn alignment_of(c: char) -> Option<Alignment> {
    match c {
        '<' => Some(Alignment::Left),
        '>' => Some(Alignment::Right),
        '=' => Some(Alignment::Numeric),
        '^' => Some(Alignment::Center),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_of(input: &str) -> FormatSpec {
        let mut parser = Parser::new(input);
        parser.parse_spec().unwrap().spec
    }

    #[test]
    fn indexing_modes_are_mutually_exclusive() {
        let mut parser = Parser::new("");
        assert_eq!(parser.next_arg_id().unwrap(), 0);
        assert_eq!(parser.next_arg_id().unwrap(), 1);
        let err = parser.use_explicit_index().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexingConflict);
    }

    #[test]
    fn explicit_index_on_untouched_counter_is_allowed() {
        let mut parser = Parser::new("");
        parser.use_explicit_index().unwrap();
        parser.use_explicit_index().unwrap();
        let err = parser.next_arg_id().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexingConflict);
    }

    #[test]
    fn fill_and_alignment() {
        let spec = spec_of("*>5}");
        assert_eq!(spec.fill, '*');
        assert_eq!(spec.align, Alignment::Right);
        assert_eq!(spec.width, 5);

        let spec = spec_of("<4}");
        assert_eq!(spec.fill, ' ');
        assert_eq!(spec.align, Alignment::Left);

        // Multi-byte fill code point.
        let spec = spec_of("Ф^6}");
        assert_eq!(spec.fill, 'Ф');
        assert_eq!(spec.align, Alignment::Center);

        let err = Parser::new("{<5}").parse_spec().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.message(), "Invalid fill character \"{\"");
    }

    #[test]
    fn zero_flag_sets_numeric_alignment_and_zero_fill() {
        let spec = spec_of("05}");
        assert_eq!(spec.align, Alignment::Numeric);
        assert_eq!(spec.fill, '0');
        assert_eq!(spec.width, 5);

        // An alignment character parsed earlier is overwritten by the zero
        // flag's side effect; this mirrors the stage order of the grammar.
        let spec = spec_of("<05}");
        assert_eq!(spec.align, Alignment::Numeric);
        assert_eq!(spec.fill, '0');
    }

    #[test]
    fn sign_and_hash_flags() {
        assert_eq!(spec_of("+}").flags, Flags::SIGN | Flags::PLUS);
        assert_eq!(spec_of("-}").flags, Flags::MINUS);
        assert_eq!(spec_of(" }").flags, Flags::SIGN);
        assert_eq!(spec_of("#x}").flags, Flags::HASH);
    }

    #[test]
    fn precision_requires_digits_or_reference() {
        let spec = spec_of(".0}");
        assert_eq!(spec.precision, Some(0));

        let err = Parser::new(".}").parse_spec().unwrap_err();
        assert_eq!(err.message(), "Missing precision specifier");
        let err = Parser::new(".x}").parse_spec().unwrap_err();
        assert_eq!(err.message(), "Missing precision specifier");
    }

    #[test]
    fn width_overflow_is_detected_and_clamped_consumption_continues() {
        let mut parser = Parser::new("999999999999999999}");
        let err = parser.parse_spec().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        // The whole digit run was consumed before reporting.
        assert_eq!(parser.peek(), Some(b'}'));
    }

    #[test]
    fn boundary_width_values() {
        assert_eq!(spec_of("2147483647}").width, i32::MAX as u32);
        let err = Parser::new("2147483648}").parse_spec().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn dynamic_width_and_precision_references() {
        let mut parser = Parser::new("{1}.{2}}");
        parser.use_explicit_index().unwrap();
        let out = parser.parse_spec().unwrap();
        assert_eq!(out.width_ref, Some(ArgRef::Index(1)));
        assert_eq!(out.precision_ref, Some(ArgRef::Index(2)));

        let mut parser = Parser::new("{width}}");
        let out = parser.parse_spec().unwrap();
        assert_eq!(out.width_ref, Some(ArgRef::Name("width")));
    }

    #[test]
    fn type_char_is_stored_verbatim() {
        assert_eq!(spec_of("x}").ty, Some('x'));
        assert_eq!(spec_of("10v}").ty, Some('v'));
        assert_eq!(spec_of("}").ty, None);
    }

    #[test]
    fn error_position_is_absolute() {
        let mut parser = Parser::new("abc{0:x");
        parser.advance(4);
        let err = parser.error(ErrorKind::Syntax, CLOSING_BRACE_EXPECTED);
        assert_eq!(err.offset(), 4);
        assert_eq!(err.format_string(), "abc{0:x");
    }
}
