//! Low-level numeric rendering: unsigned magnitudes into byte buffers.
//!
//! Sign handling is the caller's job; only magnitudes reach this module.

#![allow(clippy::cast_possible_truncation)] // all narrowing casts are masked first

/// ASCII digit pairs for values `0..100`. Fetching two digits per division
/// halves the number of (slow) integer divisions relative to peeling one
/// digit at a time.
const DIGIT_PAIRS: &[u8; 200] = b"\
0001020304050607080910111213141516171819\
2021222324252627282930313233343536373839\
4041424344454647484950515253545556575859\
6061626364656667686970717273747576777879\
8081828384858687888990919293949596979899";

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";
const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Hook invoked after every digit placed into the buffer; may prepend a
/// grouping separator.
pub(crate) trait ThousandsSep {
    fn place(&mut self, buf: &mut [u8], pos: &mut usize);
}

/// No grouping.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NoSep;

impl ThousandsSep for NoSep {
    fn place(&mut self, _buf: &mut [u8], _pos: &mut usize) {}
}

/// Prepends `sep` after every third decimal digit, least significant digit
/// having index 0.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SepEvery3<'a> {
    sep: &'a [u8],
    digit_index: u32,
}

impl<'a> SepEvery3<'a> {
    pub fn new(sep: &'a [u8]) -> Self {
        Self {
            sep,
            digit_index: 0,
        }
    }
}

impl ThousandsSep for SepEvery3<'_> {
    fn place(&mut self, buf: &mut [u8], pos: &mut usize) {
        self.digit_index += 1;
        if self.digit_index % 3 != 0 {
            return;
        }
        *pos -= self.sep.len();
        buf[*pos..*pos + self.sep.len()].copy_from_slice(self.sep);
    }
}

/// Renders `value` in decimal right-to-left into the tail of `buf` and
/// returns the start index of the rendered bytes.
///
/// Peels two digits per division while the remaining value is at least 100,
/// falling back to a single-digit peel below that. `buf` must be large enough
/// for all digits plus any separators the hook inserts.
pub(crate) fn write_decimal<S: ThousandsSep>(buf: &mut [u8], mut value: u64, mut sep: S) -> usize {
    let mut pos = buf.len();
    while value >= 100 {
        let index = ((value % 100) * 2) as usize;
        value /= 100;
        pos -= 1;
        buf[pos] = DIGIT_PAIRS[index + 1];
        sep.place(buf, &mut pos);
        pos -= 1;
        buf[pos] = DIGIT_PAIRS[index];
        sep.place(buf, &mut pos);
    }
    if value >= 10 {
        let index = (value * 2) as usize;
        pos -= 1;
        buf[pos] = DIGIT_PAIRS[index + 1];
        sep.place(buf, &mut pos);
        pos -= 1;
        buf[pos] = DIGIT_PAIRS[index];
    } else {
        pos -= 1;
        buf[pos] = b'0' + value as u8;
    }
    pos
}

/// Renders `value` in a power-of-two base (`bits` per digit) right-to-left
/// into the tail of `buf` and returns the start index.
///
/// The hex alphabet is chosen by the `upper` flag; bases below 16 only ever
/// emit `0`-`9`.
pub(crate) fn write_base_pow2(buf: &mut [u8], mut value: u64, bits: u32, upper: bool) -> usize {
    debug_assert!(matches!(bits, 1 | 3 | 4));
    let alphabet = if upper { HEX_UPPER } else { HEX_LOWER };
    let mask = (1u64 << bits) - 1;
    let mut pos = buf.len();
    loop {
        let digit = (value & mask) as usize;
        pos -= 1;
        buf[pos] = if bits < 4 {
            b'0' + digit as u8
        } else {
            alphabet[digit]
        };
        value >>= bits;
        if value == 0 {
            break;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn decimal(value: u64) -> String {
        let mut buf = [0_u8; 32];
        let pos = write_decimal(&mut buf, value, NoSep);
        String::from_utf8(buf[pos..].to_vec()).unwrap()
    }

    fn grouped(value: u64) -> String {
        let mut buf = [0_u8; 32];
        let pos = write_decimal(&mut buf, value, SepEvery3::new(b","));
        String::from_utf8(buf[pos..].to_vec()).unwrap()
    }

    #[test]
    fn decimal_digits_for_small_values() {
        for value in 0..=1_000_u64 {
            assert_eq!(decimal(value), value.to_string());
        }
    }

    #[test]
    fn decimal_digits_for_random_values() {
        const RNG_SEED: u64 = 123;
        const SAMPLE_COUNT: usize = 100_000;

        let mut rng = StdRng::seed_from_u64(RNG_SEED);
        for _ in 0..SAMPLE_COUNT {
            let value: u64 = rng.gen();
            assert_eq!(
                decimal(value),
                value.to_string(),
                "Rendered incorrectly: {value}"
            );
        }
        assert_eq!(decimal(u64::MAX), u64::MAX.to_string());
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(grouped(0), "0");
        assert_eq!(grouped(123), "123");
        assert_eq!(grouped(1_234), "1,234");
        assert_eq!(grouped(123_456), "123,456");
        assert_eq!(grouped(1_234_567), "1,234,567");
        assert_eq!(grouped(4_294_967_295), "4,294,967,295");
        assert_eq!(
            grouped(u64::MAX),
            "18,446,744,073,709,551,615"
        );
    }

    #[test]
    fn power_of_two_bases() {
        let render = |value, bits, upper| {
            let mut buf = [0_u8; 64];
            let pos = write_base_pow2(&mut buf, value, bits, upper);
            String::from_utf8(buf[pos..].to_vec()).unwrap()
        };

        assert_eq!(render(0, 1, false), "0");
        assert_eq!(render(42, 1, false), "101010");
        assert_eq!(render(0o12345670, 3, false), "12345670");
        assert_eq!(render(0x90ab_cdef, 4, false), "90abcdef");
        assert_eq!(render(0x90AB_CDEF, 4, true), "90ABCDEF");
        assert_eq!(render(u64::MAX, 4, false), "ffffffffffffffff");
        assert_eq!(render(u64::MAX, 1, false), "1".repeat(64));
    }
}
