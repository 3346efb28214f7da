//! Runtime format-string compilation with type-safe argument binding.
//!
//! # What?
//!
//! This crate parses `{}`-style format strings at runtime and renders
//! heterogeneous argument lists against them. Arguments are captured into a
//! small tagged union up front, so one rendering pipeline serves every type
//! and every error, from a stray `}` to a `+` flag on a string argument, is
//! reported as a value instead of a compile failure.
//!
//! Features:
//!
//! - The full format-spec mini-grammar: fill and alignment, `+`/`-`/space
//!   signs, the `#` alternate form, zero padding, width, precision and a
//!   presentation type, all of which may also come from other arguments
//!   (`{:{width}.{precision}}`).
//! - Automatic (`{}`), manual (`{0}`) and named (`{key}`) argument
//!   references, with the automatic/manual conflict detected and reported.
//! - Errors carry the original format string and the absolute byte offset of
//!   the offending character.
//! - ANSI color and emphasis placeholders: `{!RED}`, `{!0;255;0}`, `{!B}`
//!   and friends emit escape sequences without consuming an argument, and a
//!   bare `{!}` resets.
//! - Up to [`MAX_PACKED_ARGS`] arguments are bound without a heap
//!   allocation.
//!
//! # Why?
//!
//! `std::fmt` resolves format strings at compile time; that is the right
//! default, but templates loaded from configuration, translations or user
//! input need the same grammar interpreted at runtime with recoverable
//! errors. This crate covers that case.
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use sprint_fmt::sprint;
//!
//! # fn main() -> Result<(), sprint_fmt::Error> {
//! let message = sprint!("{}, {}!", "Hello", "world")?;
//! assert_eq!(message, "Hello, world!");
//!
//! let padded = sprint!("{:+06.2f}", 3.14159)?;
//! assert_eq!(padded, "+03.14");
//! # Ok(())
//! # }
//! ```
//!
//! ## Named arguments and runtime templates
//!
//! ```
//! use sprint_fmt::{named, sprint};
//!
//! # fn main() -> Result<(), sprint_fmt::Error> {
//! let template = "{greeting}, {name}!"; // e.g. loaded from a file
//! let message = sprint!(template, named("greeting", "Hi"), named("name", "Bob"))?;
//! assert_eq!(message, "Hi, Bob!");
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors point into the format string
//!
//! ```
//! use sprint_fmt::{sprint, ErrorKind};
//!
//! let err = sprint!("ok so far {0:+}", "nope").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::TypeMismatch);
//! assert_eq!(&err.format_string()[err.offset()..], "}");
//! ```
//!
//! See docs for the individual types and macros for more examples.

// Documentation settings.
#![doc(html_root_url = "https://docs.rs/sprint-fmt/0.1.0")]
// Linter settings.
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

mod arg;
mod error;
mod macros;
mod num;
mod parse;
mod render;
mod spec;
mod style;
mod validate;

pub use crate::{
    arg::{
        custom, named, ArgValue, Argument, Arguments, CustomFormat, IntoArgument,
        MAX_PACKED_ARGS,
    },
    error::{Error, ErrorKind},
    render::Formatter,
    spec::{Alignment, Flags, FormatSpec},
    style::{Color, Emphasis, TextStyle},
};

use crate::{
    parse::Parser,
    spec::{ArgRef, DynamicSpec},
};

const ARG_OUT_OF_RANGE: &str = "Argument index out of range";
const NAMED_ARG_NOT_FOUND: &str = "Argument with this name not found";
const NEGATIVE_WIDTH: &str = "Negative width";
const WIDTH_TOO_BIG: &str = "Width value is too big";
const WIDTH_NOT_INT: &str = "Width was not an integer";
const NEGATIVE_PRECISION: &str = "Negative precision";
const PRECISION_TOO_BIG: &str = "Precision value is too big";
const PRECISION_NOT_INT: &str = "Precision was not an integer";

/// Byte sink for rendered output.
///
/// Writes are infallible; sinks that can fail (sockets, files) should buffer
/// and surface failures on their own flush path. Everything this crate
/// writes is valid UTF-8.
pub trait Writer {
    /// Appends `bytes` to the sink.
    fn write(&mut self, bytes: &[u8]);

    /// Flushes buffered output, if the sink buffers. The default does
    /// nothing.
    fn flush(&mut self) {}
}

impl Writer for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Sink that discards output and counts its length in bytes.
///
/// Useful for sizing a buffer before rendering for real.
#[derive(Debug, Default)]
pub struct CountingWriter {
    count: usize,
}

impl CountingWriter {
    /// Creates a writer with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Writer for CountingWriter {
    fn write(&mut self, bytes: &[u8]) {
        self.count += bytes.len();
    }
}

/// Renders `fmt_string` with `args` into a fresh `String`.
///
/// This is the function behind the [`sprint!`] macro; call it directly when
/// the arguments are already collected into an [`Arguments`] list.
pub fn sprint(fmt_string: &str, args: &Arguments<'_>) -> Result<String, Error> {
    let mut buf = Vec::with_capacity(fmt_string.len());
    format_to(&mut buf, fmt_string, args)?;
    match String::from_utf8(buf) {
        Ok(out) => Ok(out),
        // Only reachable when a `CustomFormat` impl pushed invalid UTF-8
        // through `write_raw`.
        Err(err) => Ok(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}

/// Renders `fmt_string` with `args` into `out`.
///
/// Literal text is copied through verbatim, `{{` and `}}` unescape to single
/// braces, and each `{...}` placeholder is parsed, bound to its argument,
/// checked and rendered. A `{!...}` placeholder binds no argument; it emits
/// ANSI color / emphasis escape sequences (see [`TextStyle`]). The first
/// error stops rendering; output written before it stays in the sink.
pub fn format_to(
    out: &mut dyn Writer,
    fmt_string: &str,
    args: &Arguments<'_>,
) -> Result<(), Error> {
    let mut parser = Parser::new(fmt_string);
    loop {
        let rest = parser.rest();
        let Some(brace) = rest.find(['{', '}']) else {
            out.write(rest.as_bytes());
            return Ok(());
        };
        out.write(rest[..brace].as_bytes());
        parser.advance(brace);

        if rest.as_bytes()[brace] == b'}' {
            if rest.as_bytes().get(brace + 1) == Some(&b'}') {
                out.write(b"}");
                parser.advance(2);
            } else {
                return Err(parser.error(ErrorKind::Syntax, parse::UNMATCHED_BRACE));
            }
        } else if rest.as_bytes().get(brace + 1) == Some(&b'{') {
            out.write(b"{");
            parser.advance(2);
        } else if rest.as_bytes().get(brace + 1) == Some(&b'!') {
            parser.advance(2);
            let text_style = style::parse_text_style(&mut parser)?;
            parser.advance(1);
            style::write_ansi(out, &text_style);
        } else {
            let offset = parser.pos();
            parser.advance(1);
            format_placeholder(out, &mut parser, args, offset)?;
        }
    }
}

/// One placeholder, with the cursor just past its opening `{`.
///
/// Binding order determines which error wins when several things are wrong:
/// the referenced argument is resolved before the spec is parsed, and
/// dynamic width / precision references are resolved, converted and range
/// checked before the spec is validated against the argument's type.
fn format_placeholder(
    out: &mut dyn Writer,
    parser: &mut Parser<'_>,
    args: &Arguments<'_>,
    offset: usize,
) -> Result<(), Error> {
    let arg_ref = parser.parse_arg_ref()?;
    let arg = resolve(parser, args, &arg_ref)?;

    let mut dynamic = DynamicSpec::default();
    if parser.peek() == Some(b':') {
        parser.advance(1);
        dynamic = parser.parse_spec()?;
    }
    if parser.peek() != Some(b'}') {
        return Err(parser.error(ErrorKind::Syntax, parse::CLOSING_BRACE_EXPECTED));
    }
    // The cursor stays on the closing brace while dynamic references are
    // resolved and the spec is validated, so those errors point at the end
    // of the offending placeholder.

    let mut spec = dynamic.spec;
    if let Some(width_ref) = &dynamic.width_ref {
        let width = resolve(parser, args, width_ref)?;
        spec.width = resolve_count(parser, width, NEGATIVE_WIDTH, WIDTH_TOO_BIG, WIDTH_NOT_INT)?;
    }
    if let Some(precision_ref) = &dynamic.precision_ref {
        let precision = resolve(parser, args, precision_ref)?;
        spec.precision = Some(resolve_count(
            parser,
            precision,
            NEGATIVE_PRECISION,
            PRECISION_TOO_BIG,
            PRECISION_NOT_INT,
        )?);
    }

    validate::validate(&spec, arg.value().ty(), parser)?;
    parser.advance(1);

    let mut formatter = Formatter::new(out, spec, parser.src(), offset);
    formatter.write_value(arg.value())
}

fn resolve<'v>(
    parser: &Parser<'_>,
    args: &Arguments<'v>,
    arg_ref: &ArgRef<'_>,
) -> Result<Argument<'v>, Error> {
    match arg_ref {
        ArgRef::Index(index) => {
            let arg = args.get(*index);
            if arg.value().is_none() {
                return Err(parser.error(ErrorKind::ArgumentOutOfRange, ARG_OUT_OF_RANGE));
            }
            Ok(arg)
        }
        ArgRef::Name(name) => args
            .find_named(name)
            .ok_or_else(|| parser.error(ErrorKind::ArgumentOutOfRange, NAMED_ARG_NOT_FOUND)),
    }
}

/// Converts a dynamic width / precision argument to a count. Only integer
/// arguments qualify, they must be non-negative and they must fit in `i32`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range-checked first
fn resolve_count(
    parser: &Parser<'_>,
    arg: Argument<'_>,
    negative: &'static str,
    too_big: &'static str,
    not_int: &'static str,
) -> Result<u32, Error> {
    match arg.value() {
        ArgValue::I64(value) => {
            if value < 0 {
                Err(parser.error(ErrorKind::TypeMismatch, negative))
            } else if value > i64::from(i32::MAX) {
                Err(parser.error(ErrorKind::Overflow, too_big))
            } else {
                Ok(value as u32)
            }
        }
        ArgValue::U64(value) => {
            if value > i32::MAX as u64 {
                Err(parser.error(ErrorKind::Overflow, too_big))
            } else {
                Ok(value as u32)
            }
        }
        _ => Err(parser.error(ErrorKind::TypeMismatch, not_int)),
    }
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
