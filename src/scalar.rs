//! Textual scalar parsing, modeled on `strtol`/`strtoul`/`strtof`/`strtod`
//! rather than Rust's `FromStr`: base auto-detection for integers, leading
//! whitespace tolerance, and "leave the cursor alone on failure" semantics
//! that `str::parse` doesn't offer.

use crate::error::ScalarParseError;

/// A read-only cursor over a `&str`, tracking a byte offset.
///
/// `parse` advances the cursor past whatever it consumes on success and
/// leaves it untouched on failure, matching the source's `const char*&`
/// in/out parameter.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Cursor { text, pos: 0 }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_leading_whitespace(&self) -> &'a str {
        self.remaining().trim_start()
    }
}

/// Implemented for every scalar type the core can parse. `parse` is the
/// primary, boolean-flag API (SPEC_FULL §4.1, §7); `parse_err` is additive
/// diagnostic sugar for callers who want to know *why* parsing failed.
pub trait ParseScalar: Sized {
    fn parse(cursor: &mut Cursor<'_>) -> Option<Self>;
}

fn leading_ws_len(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

/// Splits off the maximal valid prefix for signed/unsigned integers with
/// base auto-detection (`0x`/`0X` → 16, leading `0` followed by more digits →
/// 8, otherwise 10), the way `strtol`/`strtoul` do.
fn split_int_prefix(s: &str) -> Option<(&str, u32, bool, usize)> {
    let mut rest = s;
    let mut consumed = 0usize;
    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            consumed += 1;
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            consumed += 1;
            false
        }
        _ => false,
    };

    let (base, prefix_len) = if rest.starts_with("0x") || rest.starts_with("0X") {
        (16, 2)
    } else if rest.starts_with('0') && rest.len() > 1 && rest.as_bytes()[1].is_ascii_digit() {
        (8, 1)
    } else {
        (10, 0)
    };
    rest = &rest[prefix_len..];
    consumed += prefix_len;

    let digit_len = rest
        .as_bytes()
        .iter()
        .take_while(|b| (**b as char).is_digit(base))
        .count();
    if digit_len == 0 {
        // `0` alone, or a bare base prefix with no digits following, is
        // still a valid zero literal when a `0` was present.
        if prefix_len > 0 || rest.is_empty() {
            return Some(("0", 10, negative, consumed));
        }
        return None;
    }
    let digits = &rest[..digit_len];
    Some((digits, base, negative, consumed + digit_len))
}

macro_rules! impl_signed_int {
    ($ty:ty, $wide:ty) => {
        impl ParseScalar for $ty {
            fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
                let ws = leading_ws_len(cursor.remaining());
                let trimmed = cursor.skip_leading_whitespace();
                let (digits, base, negative, consumed) = split_int_prefix(trimmed)?;
                let magnitude = <$wide>::from_str_radix(digits, base).ok()?;
                let value: $wide = if negative { magnitude.checked_neg()? } else { magnitude };
                let clamped = <$ty>::try_from(value).ok()?;
                cursor.advance(ws + consumed);
                Some(clamped)
            }
        }
    };
}

macro_rules! impl_unsigned_int {
    ($ty:ty, $wide:ty) => {
        impl ParseScalar for $ty {
            fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
                let ws = leading_ws_len(cursor.remaining());
                let trimmed = cursor.skip_leading_whitespace();
                let (digits, base, negative, consumed) = split_int_prefix(trimmed)?;
                if negative {
                    return None;
                }
                let magnitude = <$wide>::from_str_radix(digits, base).ok()?;
                let clamped = <$ty>::try_from(magnitude).ok()?;
                cursor.advance(ws + consumed);
                Some(clamped)
            }
        }
    };
}

impl_signed_int!(i32, i64);
impl_signed_int!(isize, i128);
impl_unsigned_int!(u32, u64);
impl_unsigned_int!(usize, u128);

impl ParseScalar for char {
    fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
        let c = cursor.remaining().chars().next()?;
        cursor.advance(c.len_utf8());
        Some(c)
    }
}

fn split_float_prefix(s: &str) -> Option<(&str, usize)> {
    let bytes = s.as_bytes();
    let mut i = 0usize;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let start_digits = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut saw_digits = i > start_digits;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        saw_digits |= i > frac_start;
    }
    if !saw_digits {
        return None;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some((&s[..i], i))
}

macro_rules! impl_float {
    ($ty:ty) => {
        impl ParseScalar for $ty {
            fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
                let ws = leading_ws_len(cursor.remaining());
                let trimmed = cursor.skip_leading_whitespace();
                let (token, consumed) = split_float_prefix(trimmed)?;
                let value: $ty = token.parse().ok()?;
                cursor.advance(ws + consumed);
                Some(value)
            }
        }
    };
}

impl_float!(f32);
impl_float!(f64);

/// Models the source's `long double` as `f64`: Rust has no portable
/// extended-precision float type, so this is a documented narrowing rather
/// than an attempt to pull in a platform-specific 80-bit float crate for a
/// single scalar variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtendedPrecision(pub f64);

impl ParseScalar for ExtendedPrecision {
    fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
        f64::parse(cursor).map(ExtendedPrecision)
    }
}

/// Boolean-flag entry point matching SPEC_FULL §4.1/§7: `out` is written
/// only on success, and the cursor is left untouched on failure.
pub fn parse<T: ParseScalar + Default + Copy>(cursor: &mut Cursor<'_>, out: &mut T) -> bool {
    let before = *cursor;
    match T::parse(cursor) {
        Some(v) => {
            *out = v;
            true
        }
        None => {
            *cursor = before;
            *out = T::default();
            false
        }
    }
}

/// Diagnostic variant of [`parse`] for callers who want to know why parsing
/// failed (SPEC_FULL §4.11). The boolean [`parse`] remains the primary API.
pub fn parse_err<T: ParseScalar>(cursor: &mut Cursor<'_>) -> Result<T, ScalarParseError> {
    let before = *cursor;
    if before.at_end() {
        return Err(ScalarParseError::EmptyInput);
    }
    match T::parse(cursor) {
        Some(v) => Ok(v),
        None => {
            *cursor = before;
            Err(ScalarParseError::NoProgress {
                at: before.position(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_u32() {
        let mut c = Cursor::new("42 rest");
        let mut out = 0u32;
        assert!(parse(&mut c, &mut out));
        assert_eq!(out, 42);
        assert_eq!(c.remaining(), " rest");
    }

    #[test]
    fn parses_hex_with_prefix() {
        let mut c = Cursor::new("0x1F");
        let mut out = 0i32;
        assert!(parse(&mut c, &mut out));
        assert_eq!(out, 31);
    }

    #[test]
    fn parses_octal_with_leading_zero() {
        let mut c = Cursor::new("017");
        let mut out = 0i32;
        assert!(parse(&mut c, &mut out));
        assert_eq!(out, 15);
    }

    #[test]
    fn failure_leaves_cursor_untouched() {
        let mut c = Cursor::new("abc");
        let mut out = 0u32;
        assert!(!parse(&mut c, &mut out));
        assert_eq!(out, 0);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn rejects_out_of_range_for_32_bit() {
        let mut c = Cursor::new("9999999999");
        let mut out = 0i32;
        assert!(!parse(&mut c, &mut out));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn parses_float_with_exponent() {
        let mut c = Cursor::new("-1.5e3tail");
        let mut out = 0f64;
        assert!(parse(&mut c, &mut out));
        assert_eq!(out, -1500.0);
        assert_eq!(c.remaining(), "tail");
    }

    #[test]
    fn rejects_negative_unsigned() {
        let mut c = Cursor::new("-5");
        let mut out = 0u32;
        assert!(!parse(&mut c, &mut out));
        assert_eq!(c.position(), 0);
    }
}
