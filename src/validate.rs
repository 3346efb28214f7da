//! Cross-checks a parsed spec against the bound argument's classified type.
//!
//! Violations flow through the same error channel as syntax errors; only the
//! kind and message differ.

use crate::{
    arg::ArgType,
    parse::Parser,
    spec::{Alignment, Flags, FormatSpec},
    Error, ErrorKind,
};

const REQUIRES_ARITHMETIC: &str = "Format specifier requires an arithmetic argument";
const REQUIRES_SIGNED: &str = "Format specifier requires a signed integer argument (got unsigned)";
const PRECISION_ON_INT: &str = "Precision is not allowed for integer types";
const PRECISION_ON_POINTER: &str = "Precision is not allowed for pointer type";
const BAD_INT_TYPE: &str = "Invalid type specifier for an integer";
const BAD_FLOAT_TYPE: &str = "Invalid type specifier for a float";
const BAD_STRING_TYPE: &str = "Invalid type specifier for a string";
const BAD_POINTER_TYPE: &str = "Invalid type specifier for a pointer";
const BAD_CODE_POINT_SPEC: &str =
    "Invalid format specifier(s) for code point - code points can't have numeric alignment, signs or #";

/// Rejects spec/type combinations that are semantically invalid for the
/// bound argument. Dynamic width and precision must already be resolved.
/// Custom renderers interpret the spec themselves and are never checked.
pub(crate) fn validate(spec: &FormatSpec, ty: ArgType, cx: &Parser<'_>) -> Result<(), Error> {
    if ty == ArgType::Custom {
        return Ok(());
    }
    debug_assert!(ty != ArgType::None);

    let mismatch = |message| Err(cx.error(ErrorKind::TypeMismatch, message));

    if spec.align == Alignment::Numeric && !ty.is_arithmetic() {
        return mismatch(REQUIRES_ARITHMETIC);
    }

    if spec.flags.intersects(Flags::SIGN | Flags::PLUS | Flags::MINUS) {
        if !ty.is_arithmetic() {
            return mismatch(REQUIRES_ARITHMETIC);
        }
        if ty.is_integral() && ty != ArgType::SignedInt {
            return mismatch(REQUIRES_SIGNED);
        }
    }

    if spec.flags.contains(Flags::HASH) && !ty.is_arithmetic() {
        return mismatch(REQUIRES_ARITHMETIC);
    }

    match ty {
        ArgType::SignedInt | ArgType::UnsignedInt | ArgType::Bool => {
            if let Some(t) = spec.ty {
                // Booleans additionally take `s` for their textual form.
                let bool_text = t == 's' && ty == ArgType::Bool;
                if !bool_text && !matches!(t, 'b' | 'B' | 'd' | 'o' | 'x' | 'X' | 'n' | 'c') {
                    return mismatch(BAD_INT_TYPE);
                }
                if t == 'c' && (spec.align == Alignment::Numeric || !spec.flags.is_empty()) {
                    return mismatch(BAD_CODE_POINT_SPEC);
                }
            }
        }
        ArgType::Float => {
            if let Some(t) = spec.ty {
                if !matches!(t, 'e' | 'E' | 'f' | 'F' | 'g' | 'G' | 'a' | 'A' | 'n' | '%') {
                    return mismatch(BAD_FLOAT_TYPE);
                }
            }
        }
        ArgType::Str => {
            if !matches!(spec.ty, None | Some('s')) {
                return mismatch(BAD_STRING_TYPE);
            }
        }
        ArgType::Pointer => {
            if !matches!(spec.ty, None | Some('p')) {
                return mismatch(BAD_POINTER_TYPE);
            }
        }
        ArgType::None | ArgType::Custom => {}
    }

    if spec.precision.is_some() {
        if ty.is_integral() {
            return mismatch(PRECISION_ON_INT);
        }
        if ty == ArgType::Pointer {
            return mismatch(PRECISION_ON_POINTER);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(spec: &FormatSpec, ty: ArgType) -> Result<(), Error> {
        validate(spec, ty, &Parser::new(""))
    }

    #[test]
    fn sign_flags_require_signed_arithmetic() {
        let spec = FormatSpec {
            flags: Flags::SIGN | Flags::PLUS,
            ..FormatSpec::default()
        };
        assert!(check(&spec, ArgType::SignedInt).is_ok());
        assert!(check(&spec, ArgType::Float).is_ok());

        let err = check(&spec, ArgType::UnsignedInt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), REQUIRES_SIGNED);

        let err = check(&spec, ArgType::Str).unwrap_err();
        assert_eq!(err.message(), REQUIRES_ARITHMETIC);
    }

    #[test]
    fn precision_is_rejected_for_integers_and_pointers() {
        let spec = FormatSpec {
            precision: Some(2),
            ..FormatSpec::default()
        };
        assert!(check(&spec, ArgType::Float).is_ok());
        assert!(check(&spec, ArgType::Str).is_ok());
        assert_eq!(
            check(&spec, ArgType::SignedInt).unwrap_err().message(),
            PRECISION_ON_INT
        );
        assert_eq!(
            check(&spec, ArgType::Pointer).unwrap_err().message(),
            PRECISION_ON_POINTER
        );
    }

    #[test]
    fn code_point_presentation_rejects_numeric_spec_features() {
        let spec = FormatSpec {
            ty: Some('c'),
            flags: Flags::HASH,
            ..FormatSpec::default()
        };
        assert_eq!(
            check(&spec, ArgType::SignedInt).unwrap_err().message(),
            BAD_CODE_POINT_SPEC
        );

        let plain = FormatSpec {
            ty: Some('c'),
            width: 3,
            ..FormatSpec::default()
        };
        assert!(check(&plain, ArgType::SignedInt).is_ok());
    }

    #[test]
    fn type_char_legality_per_argument_type() {
        let spec = |t| FormatSpec {
            ty: Some(t),
            ..FormatSpec::default()
        };
        assert!(check(&spec('x'), ArgType::UnsignedInt).is_ok());
        assert!(check(&spec('d'), ArgType::Bool).is_ok());
        assert_eq!(
            check(&spec('f'), ArgType::SignedInt).unwrap_err().message(),
            BAD_INT_TYPE
        );
        assert!(check(&spec('g'), ArgType::Float).is_ok());
        assert_eq!(
            check(&spec('x'), ArgType::Float).unwrap_err().message(),
            BAD_FLOAT_TYPE
        );
        assert!(check(&spec('s'), ArgType::Str).is_ok());
        assert_eq!(
            check(&spec('d'), ArgType::Str).unwrap_err().message(),
            BAD_STRING_TYPE
        );
        assert!(check(&spec('p'), ArgType::Pointer).is_ok());
        assert_eq!(
            check(&spec('x'), ArgType::Pointer).unwrap_err().message(),
            BAD_POINTER_TYPE
        );
    }

    #[test]
    fn custom_arguments_skip_all_checks() {
        let spec = FormatSpec {
            ty: Some('z'),
            precision: Some(1),
            flags: Flags::SIGN,
            ..FormatSpec::default()
        };
        assert!(check(&spec, ArgType::Custom).is_ok());
    }
}
