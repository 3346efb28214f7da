//! ANSI color and emphasis placeholders.
//!
//! A `{!...}` placeholder consumes no argument; it parses a text style and
//! emits the matching escape sequences straight into the sink. The body is
//! either an `r;g;b` channel triple, a color name (`BLUE`, `tCYAN` for the
//! terminal's own palette), or an emphasis string (`B`, `I`, `U`, `S`), with
//! `;BG` switching a color to the background layer. A bare `{!}` resets.

use bitflags::bitflags;

use crate::{parse::Parser, Error, ErrorKind, Writer};

const INVALID_EMPHASIS: &str = "Invalid emphasis character - \
     valid ones are: B (bold), I (italic), U (underline) and S (strikethrough)";
const CHANNEL_TOO_BIG: &str = "Channel value too big - it must be in the range [0-255]";
const CHANNEL_SEP_EXPECTED: &str = "\";\" expected followed by the next channel value";
const CHANNEL_EXPECTED: &str = "Expected an integer specifying a channel value (3 channels required)";
const STYLE_END_EXPECTED: &str = "\"}\" expected (or \";\" for BG specifier or emphasis)";
const INVALID_COLOR_NAME: &str = "Invalid color name - it must be a valid identifier (without digits)";

bitflags! {
    /// Emphasis requested by a style placeholder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Emphasis: u8 {
        /// `B`
        const BOLD = 1 << 0;
        /// `I`
        const ITALIC = 1 << 1;
        /// `U`
        const UNDERLINE = 1 << 2;
        /// `S`
        const STRIKETHROUGH = 1 << 3;
    }
}

/// Color requested by a style placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// A true-color value, by name or as an explicit `r;g;b` triple.
    Rgb(u8, u8, u8),
    /// One of the 16 palette slots the terminal itself defines (`t`-prefixed
    /// names); 0-7 are the normal colors, 8-15 the bright variants.
    Terminal(u8),
}

/// A fully parsed `{!...}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    /// The color to apply, if any. `None` with empty emphasis is a reset.
    pub color: Option<Color>,
    /// Apply the color to the background instead of the foreground.
    pub background: bool,
    /// Emphasis to apply.
    pub emphasis: Emphasis,
}

/// Parses a style body with the cursor just past `{!`, leaving it on the
/// closing `}`.
pub(crate) fn parse_text_style(parser: &mut Parser<'_>) -> Result<TextStyle, Error> {
    let mut style = TextStyle::default();

    match parser.peek() {
        Some(b'}') => return Ok(style),
        Some(byte) if byte.is_ascii_digit() => {
            style.color = Some(parse_rgb(parser)?);
        }
        Some(_) => {
            let ident = scan_ident(parser);
            // Identifiers never contain digits; a digit right after one is a
            // malformed color name, not a new token.
            if matches!(parser.peek(), Some(byte) if byte.is_ascii_digit()) {
                return Err(parser.error(ErrorKind::Syntax, INVALID_COLOR_NAME));
            }
            match lookup_color(ident) {
                Some(color) => style.color = Some(color),
                None => style.emphasis |= parse_emphasis(parser, ident)?,
            }
        }
        None => return Err(parser.error(ErrorKind::Syntax, STYLE_END_EXPECTED)),
    }

    loop {
        match parser.peek() {
            Some(b'}') => return Ok(style),
            Some(b';') => {
                parser.advance(1);
                let ident = scan_ident(parser);
                if ident == "BG" && style.color.is_some() && !style.background {
                    style.background = true;
                } else {
                    style.emphasis |= parse_emphasis(parser, ident)?;
                }
            }
            _ => return Err(parser.error(ErrorKind::Syntax, STYLE_END_EXPECTED)),
        }
    }
}

/// Emits the escape sequences for `style`: the color first (if any), then one
/// sequence per emphasis flag. A style with neither resets all attributes.
pub(crate) fn write_ansi(out: &mut dyn Writer, style: &TextStyle) {
    if style.color.is_none() && style.emphasis.is_empty() {
        out.write(b"\x1b[0m");
        return;
    }

    match style.color {
        Some(Color::Rgb(r, g, b)) => {
            let layer = if style.background { 48 } else { 38 };
            out.write(format!("\x1b[{layer};2;{r:03};{g:03};{b:03}m").as_bytes());
        }
        Some(Color::Terminal(index)) => {
            let code = match (style.background, index < 8) {
                (false, true) => 30 + u32::from(index),
                (false, false) => 90 + u32::from(index - 8),
                (true, true) => 40 + u32::from(index),
                (true, false) => 100 + u32::from(index - 8),
            };
            out.write(format!("\x1b[{code}m").as_bytes());
        }
        None => {}
    }

    const CODES: [(Emphasis, u8); 4] = [
        (Emphasis::BOLD, 1),
        (Emphasis::ITALIC, 3),
        (Emphasis::UNDERLINE, 4),
        (Emphasis::STRIKETHROUGH, 9),
    ];
    for (flag, code) in CODES {
        if style.emphasis.contains(flag) {
            out.write(format!("\x1b[{code}m").as_bytes());
        }
    }
}

/// Three `;`-separated channel values, each in `[0, 255]`.
fn parse_rgb(parser: &mut Parser<'_>) -> Result<Color, Error> {
    let r = parse_channel(parser)?;
    expect_channel_sep(parser)?;
    let g = parse_channel(parser)?;
    expect_channel_sep(parser)?;
    let b = parse_channel(parser)?;
    Ok(Color::Rgb(r, g, b))
}

fn parse_channel(parser: &mut Parser<'_>) -> Result<u8, Error> {
    if !matches!(parser.peek(), Some(byte) if byte.is_ascii_digit()) {
        return Err(parser.error(ErrorKind::Syntax, CHANNEL_EXPECTED));
    }
    let mut value = 0_u32;
    while let Some(byte) = parser.peek().filter(u8::is_ascii_digit) {
        value = value * 10 + u32::from(byte - b'0');
        if value > 255 {
            return Err(parser.error(ErrorKind::Syntax, CHANNEL_TOO_BIG));
        }
        parser.advance(1);
    }
    #[allow(clippy::cast_possible_truncation)] // bounded above
    Ok(value as u8)
}

fn expect_channel_sep(parser: &mut Parser<'_>) -> Result<(), Error> {
    if parser.peek() == Some(b';') {
        parser.advance(1);
        Ok(())
    } else {
        Err(parser.error(ErrorKind::Syntax, CHANNEL_SEP_EXPECTED))
    }
}

/// Consumes a run of letters and underscores.
fn scan_ident<'a>(parser: &mut Parser<'a>) -> &'a str {
    let rest = parser.rest();
    let len = rest
        .bytes()
        .take_while(|byte| *byte == b'_' || byte.is_ascii_alphabetic())
        .count();
    parser.advance(len);
    &rest[..len]
}

/// An identifier that names no color must be an emphasis string.
fn parse_emphasis(parser: &Parser<'_>, ident: &str) -> Result<Emphasis, Error> {
    let mut emphasis = Emphasis::empty();
    for c in ident.bytes() {
        emphasis |= match c {
            b'B' => Emphasis::BOLD,
            b'I' => Emphasis::ITALIC,
            b'U' => Emphasis::UNDERLINE,
            b'S' => Emphasis::STRIKETHROUGH,
            _ => return Err(parser.error(ErrorKind::Syntax, INVALID_EMPHASIS)),
        };
    }
    if emphasis.is_empty() {
        return Err(parser.error(ErrorKind::Syntax, INVALID_EMPHASIS));
    }
    Ok(emphasis)
}

fn lookup_color(ident: &str) -> Option<Color> {
    if let Some(name) = ident.strip_prefix('t') {
        return terminal_color(name).map(Color::Terminal);
    }
    #[allow(clippy::cast_possible_truncation)] // each channel is one byte
    rgb_color(ident).map(|c| Color::Rgb((c >> 16) as u8, (c >> 8) as u8, c as u8))
}

fn terminal_color(name: &str) -> Option<u8> {
    Some(match name {
        "BLACK" => 0,
        "RED" => 1,
        "GREEN" => 2,
        "YELLOW" => 3,
        "BLUE" => 4,
        "MAGENTA" => 5,
        "CYAN" => 6,
        "WHITE" => 7,
        "BRIGHT_BLACK" => 8,
        "BRIGHT_RED" => 9,
        "BRIGHT_GREEN" => 10,
        "BRIGHT_YELLOW" => 11,
        "BRIGHT_BLUE" => 12,
        "BRIGHT_MAGENTA" => 13,
        "BRIGHT_CYAN" => 14,
        "BRIGHT_WHITE" => 15,
        _ => return None,
    })
}

// The CSS named colors.
#[rustfmt::skip]
fn rgb_color(name: &str) -> Option<u32> {
    Some(match name {
        "ALICE_BLUE" => 0x00F0_F8FF,
        "ANTIQUE_WHITE" => 0x00FA_EBD7,
        "AQUA" => 0x0000_FFFF,
        "AQUAMARINE" => 0x007F_FFD4,
        "AZURE" => 0x00F0_FFFF,
        "BEIGE" => 0x00F5_F5DC,
        "BISQUE" => 0x00FF_E4C4,
        "BLACK" => 0x0000_0000,
        "BLANCHED_ALMOND" => 0x00FF_EBCD,
        "BLUE" => 0x0000_00FF,
        "BLUE_VIOLET" => 0x008A_2BE2,
        "BROWN" => 0x00A5_2A2A,
        "BURLY_WOOD" => 0x00DE_B887,
        "CADET_BLUE" => 0x005F_9EA0,
        "CHARTREUSE" => 0x007F_FF00,
        "CHOCOLATE" => 0x00D2_691E,
        "CORAL" => 0x00FF_7F50,
        "CORNFLOWER_BLUE" => 0x0064_95ED,
        "CORNSILK" => 0x00FF_F8DC,
        "CRIMSON" => 0x00DC_143C,
        "CYAN" => 0x0000_FFFF,
        "DARK_BLUE" => 0x0000_008B,
        "DARK_CYAN" => 0x0000_8B8B,
        "DARK_GOLDEN_ROD" => 0x00B8_860B,
        "DARK_GRAY" => 0x00A9_A9A9,
        "DARK_GREEN" => 0x0000_6400,
        "DARK_KHAKI" => 0x00BD_B76B,
        "DARK_MAGENTA" => 0x008B_008B,
        "DARK_OLIVE_GREEN" => 0x0055_6B2F,
        "DARK_ORANGE" => 0x00FF_8C00,
        "DARK_ORCHID" => 0x0099_32CC,
        "DARK_RED" => 0x008B_0000,
        "DARK_SALMON" => 0x00E9_967A,
        "DARK_SEA_GREEN" => 0x008F_BC8F,
        "DARK_SLATE_BLUE" => 0x0048_3D8B,
        "DARK_SLATE_GRAY" => 0x002F_4F4F,
        "DARK_TURQUOISE" => 0x0000_CED1,
        "DARK_VIOLET" => 0x0094_00D3,
        "DEEP_PINK" => 0x00FF_1493,
        "DEEP_SKY_BLUE" => 0x0000_BFFF,
        "DIM_GRAY" => 0x0069_6969,
        "DODGER_BLUE" => 0x001E_90FF,
        "FIRE_BRICK" => 0x00B2_2222,
        "FLORAL_WHITE" => 0x00FF_FAF0,
        "FOREST_GREEN" => 0x0022_8B22,
        "FUCHSIA" => 0x00FF_00FF,
        "GAINSBORO" => 0x00DC_DCDC,
        "GHOST_WHITE" => 0x00F8_F8FF,
        "GOLD" => 0x00FF_D700,
        "GOLDEN_ROD" => 0x00DA_A520,
        "GRAY" => 0x0080_8080,
        "GREEN" => 0x0000_8000,
        "GREEN_YELLOW" => 0x00AD_FF2F,
        "HONEY_DEW" => 0x00F0_FFF0,
        "HOT_PINK" => 0x00FF_69B4,
        "INDIAN_RED" => 0x00CD_5C5C,
        "INDIGO" => 0x004B_0082,
        "IVORY" => 0x00FF_FFF0,
        "KHAKI" => 0x00F0_E68C,
        "LAVENDER" => 0x00E6_E6FA,
        "LAVENDER_BLUSH" => 0x00FF_F0F5,
        "LAWN_GREEN" => 0x007C_FC00,
        "LEMON_CHIFFON" => 0x00FF_FACD,
        "LIGHT_BLUE" => 0x00AD_D8E6,
        "LIGHT_CORAL" => 0x00F0_8080,
        "LIGHT_CYAN" => 0x00E0_FFFF,
        "LIGHT_GOLDEN_ROD_YELLOW" => 0x00FA_FAD2,
        "LIGHT_GRAY" => 0x00D3_D3D3,
        "LIGHT_GREEN" => 0x0090_EE90,
        "LIGHT_PINK" => 0x00FF_B6C1,
        "LIGHT_SALMON" => 0x00FF_A07A,
        "LIGHT_SEA_GREEN" => 0x0020_B2AA,
        "LIGHT_SKY_BLUE" => 0x0087_CEFA,
        "LIGHT_SLATE_GRAY" => 0x0077_8899,
        "LIGHT_STEEL_BLUE" => 0x00B0_C4DE,
        "LIGHT_YELLOW" => 0x00FF_FFE0,
        "LIME" => 0x0000_FF00,
        "LIME_GREEN" => 0x0032_CD32,
        "LINEN" => 0x00FA_F0E6,
        "MAGENTA" => 0x00FF_00FF,
        "MAROON" => 0x0080_0000,
        "MEDIUM_AQUAMARINE" => 0x0066_CDAA,
        "MEDIUM_BLUE" => 0x0000_00CD,
        "MEDIUM_ORCHID" => 0x00BA_55D3,
        "MEDIUM_PURPLE" => 0x0093_70DB,
        "MEDIUM_SEA_GREEN" => 0x003C_B371,
        "MEDIUM_SLATE_BLUE" => 0x007B_68EE,
        "MEDIUM_SPRING_GREEN" => 0x0000_FA9A,
        "MEDIUM_TURQUOISE" => 0x0048_D1CC,
        "MEDIUM_VIOLET_RED" => 0x00C7_1585,
        "MIDNIGHT_BLUE" => 0x0019_1970,
        "MINT_CREAM" => 0x00F5_FFFA,
        "MISTY_ROSE" => 0x00FF_E4E1,
        "MOCCASIN" => 0x00FF_E4B5,
        "NAVAJO_WHITE" => 0x00FF_DEAD,
        "NAVY" => 0x0000_0080,
        "OLD_LACE" => 0x00FD_F5E6,
        "OLIVE" => 0x0080_8000,
        "OLIVE_DRAB" => 0x006B_8E23,
        "ORANGE" => 0x00FF_A500,
        "ORANGE_RED" => 0x00FF_4500,
        "ORCHID" => 0x00DA_70D6,
        "PALE_GOLDEN_ROD" => 0x00EE_E8AA,
        "PALE_GREEN" => 0x0098_FB98,
        "PALE_TURQUOISE" => 0x00AF_EEEE,
        "PALE_VIOLET_RED" => 0x00DB_7093,
        "PAPAYA_WHIP" => 0x00FF_EFD5,
        "PEACH_PUFF" => 0x00FF_DAB9,
        "PERU" => 0x00CD_853F,
        "PINK" => 0x00FF_C0CB,
        "PLUM" => 0x00DD_A0DD,
        "POWDER_BLUE" => 0x00B0_E0E6,
        "PURPLE" => 0x0080_0080,
        "REBECCA_PURPLE" => 0x0066_3399,
        "RED" => 0x00FF_0000,
        "ROSY_BROWN" => 0x00BC_8F8F,
        "ROYAL_BLUE" => 0x0041_69E1,
        "SADDLE_BROWN" => 0x008B_4513,
        "SALMON" => 0x00FA_8072,
        "SANDY_BROWN" => 0x00F4_A460,
        "SEA_GREEN" => 0x002E_8B57,
        "SEA_SHELL" => 0x00FF_F5EE,
        "SIENNA" => 0x00A0_522D,
        "SILVER" => 0x00C0_C0C0,
        "SKY_BLUE" => 0x0087_CEEB,
        "SLATE_BLUE" => 0x006A_5ACD,
        "SLATE_GRAY" => 0x0070_8090,
        "SNOW" => 0x00FF_FAFA,
        "SPRING_GREEN" => 0x0000_FF7F,
        "STEEL_BLUE" => 0x0046_82B4,
        "TAN" => 0x00D2_B48C,
        "TEAL" => 0x0000_8080,
        "THISTLE" => 0x00D8_BFD8,
        "TOMATO" => 0x00FF_6347,
        "TURQUOISE" => 0x0040_E0D0,
        "VIOLET" => 0x00EE_82EE,
        "WHEAT" => 0x00F5_DEB3,
        "WHITE" => 0x00FF_FFFF,
        "WHITE_SMOKE" => 0x00F5_F5F5,
        "YELLOW" => 0x00FF_FF00,
        "YELLOW_GREEN" => 0x009A_CD32,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<TextStyle, Error> {
        let mut parser = Parser::new(body);
        let style = parse_text_style(&mut parser)?;
        assert_eq!(parser.peek(), Some(b'}'));
        Ok(style)
    }

    #[test]
    fn named_and_rgb_colors() {
        assert_eq!(
            parse("BLUE}").unwrap().color,
            Some(Color::Rgb(0x00, 0x00, 0xFF))
        );
        assert_eq!(
            parse("255;20;30}").unwrap().color,
            Some(Color::Rgb(255, 20, 30))
        );
        let style = parse("tBRIGHT_MAGENTA;BG}").unwrap();
        assert_eq!(style.color, Some(Color::Terminal(13)));
        assert!(style.background);
    }

    #[test]
    fn emphasis_strings() {
        assert_eq!(parse("B}").unwrap().emphasis, Emphasis::BOLD);
        assert_eq!(
            parse("BIUS}").unwrap().emphasis,
            Emphasis::all()
        );
        let style = parse("RED;IU}").unwrap();
        assert_eq!(style.color, Some(Color::Rgb(0xFF, 0, 0)));
        assert_eq!(style.emphasis, Emphasis::ITALIC | Emphasis::UNDERLINE);
    }

    #[test]
    fn bare_style_resets() {
        let style = parse("}").unwrap();
        assert_eq!(style, TextStyle::default());
        let mut out = Vec::new();
        write_ansi(&mut out, &style);
        assert_eq!(out, b"\x1b[0m");
    }

    #[test]
    fn channel_errors() {
        let err = parse("256;0;0}").unwrap_err();
        assert_eq!(err.message(), CHANNEL_TOO_BIG);
        let err = parse("0;0}").unwrap_err();
        assert_eq!(err.message(), CHANNEL_SEP_EXPECTED);
        let err = parse("0;0;}").unwrap_err();
        assert_eq!(err.message(), CHANNEL_EXPECTED);
        let err = parse("0;0;0.}").unwrap_err();
        assert_eq!(err.message(), STYLE_END_EXPECTED);
    }
}
