//! Formatting macros.

/// Collects comma-separated values into an [`Arguments`](crate::Arguments)
/// list.
///
/// # Specifying arguments
///
/// Each argument must be of a supported type:
///
/// - Signed and unsigned integers (`u8`, `i8`, `u16`, `i16`, `u32`, `i32`,
///   `u64`, `i64`, `usize`, `isize`)
/// - `f32` / `f64`, `bool` and `char`
/// - Strings (`&str`, `&String`)
/// - Opaque pointers (`*const ()`, `*mut ()`)
/// - Values wrapped with [`named()`](crate::named) or
///   [`custom()`](crate::custom).
///
/// The produced list borrows string and custom arguments, so it cannot
/// outlive them.
///
/// # Examples
///
/// ```
/// use sprint_fmt::{fmt_args, named, sprint};
///
/// # fn main() -> Result<(), sprint_fmt::Error> {
/// let args = fmt_args!(42, "str", named("flag", true));
/// assert_eq!(args.len(), 3);
/// assert_eq!(sprint("{} {} {flag}", &args)?, "42 str true");
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! fmt_args {
    () => { $crate::Arguments::new() };
    ($($arg:expr),+ $(,)?) => {
        $crate::Arguments::from_slice(&[
            $($crate::IntoArgument::into_argument($arg),)+
        ])
    };
}

/// Renders a format string with the given arguments into a `String`.
///
/// Unlike `std::format!`, the format string is an ordinary runtime
/// expression and errors are returned rather than rejected at compile time;
/// the macro expands to a call of [`sprint()`](crate::sprint) and evaluates
/// to `Result<String, Error>`.
///
/// # Examples
///
/// ```
/// use sprint_fmt::sprint;
///
/// # fn main() -> Result<(), sprint_fmt::Error> {
/// assert_eq!(sprint!("{:#06x}", 0x42)?, "0x0042");
/// assert_eq!(sprint!("{0} {0}", "echo")?, "echo echo");
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! sprint {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::sprint($fmt, &$crate::fmt_args!($($arg),*))
    };
}

/// Renders a format string with the given arguments into a
/// [`Writer`](crate::Writer).
///
/// Expands to a call of [`format_to()`](crate::format_to) and evaluates to
/// `Result<(), Error>`.
///
/// # Examples
///
/// ```
/// use sprint_fmt::format_to;
///
/// # fn main() -> Result<(), sprint_fmt::Error> {
/// let mut buf = Vec::new();
/// format_to!(&mut buf, "[{:^7}]", "mid")?;
/// format_to!(&mut buf, "{}", 42)?;
/// assert_eq!(buf, b"[  mid  ]42");
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! format_to {
    ($out:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::format_to($out, $fmt, &$crate::fmt_args!($($arg),*))
    };
}
