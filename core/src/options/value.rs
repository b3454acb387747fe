//! Typed parsing of raw option strings
//!
//! Hosts hand back plain strings. Numbers are read with prefix semantics: a
//! value such as `"42xyz"` or `"150%"` yields the leading numeral, while a
//! string with no leading numeral at all is rejected. Parsing never depends on
//! the process locale.

/// A type that can be read from and written to a raw option string.
pub trait OptionValue: Sized {
    /// Parse a raw host value. `None` means the caller's default applies.
    fn parse_option(raw: &str) -> Option<Self>;

    /// Render the value the way the host expects to see it.
    fn format_option(&self) -> String;
}

impl OptionValue for bool {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw {
            "enabled" | "true" | "1" => Some(true),
            "disabled" | "false" | "0" => Some(false),
            _ => None,
        }
    }

    fn format_option(&self) -> String {
        let raw = if *self { "enabled" } else { "disabled" };
        raw.to_string()
    }
}

impl OptionValue for String {
    fn parse_option(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn format_option(&self) -> String {
        self.clone()
    }
}

macro_rules! impl_integer_option {
    ($($ty:ty),*) => {
        $(
            impl OptionValue for $ty {
                fn parse_option(raw: &str) -> Option<Self> {
                    parse_integer_prefix(raw).and_then(|v| <$ty>::try_from(v).ok())
                }

                fn format_option(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer_option!(i32, i64, u32, u64, usize);

impl OptionValue for f64 {
    fn parse_option(raw: &str) -> Option<Self> {
        parse_float_prefix(raw)
    }

    fn format_option(&self) -> String {
        self.to_string()
    }
}

impl OptionValue for f32 {
    fn parse_option(raw: &str) -> Option<Self> {
        parse_float_prefix(raw).map(|v| v as f32)
    }

    fn format_option(&self) -> String {
        self.to_string()
    }
}

/// Byte length of the run of ASCII digits at the start of `s`.
fn digit_run(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Length of an optional leading `+`/`-`.
fn sign_len(s: &[u8]) -> usize {
    usize::from(matches!(s.first(), Some(b'+' | b'-')))
}

/// Parse the longest base-10 integer prefix (after leading whitespace).
pub fn parse_integer_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let digits = digit_run(&bytes[sign..]);
    if digits == 0 {
        return None;
    }
    // Out-of-range values are rejected rather than saturated.
    s[..sign + digits].parse().ok()
}

/// Parse the longest decimal floating-point prefix (after leading whitespace).
///
/// Accepts `[sign] digits [. digits] [e [sign] digits]` where at least one
/// mantissa digit is present. An exponent marker without digits is not part
/// of the prefix.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();

    let mut end = sign_len(bytes);
    let int_digits = digit_run(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digit_run(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_sign = sign_len(&bytes[end + 1..]);
        let exp_digits = digit_run(&bytes[end + 1 + exp_sign..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_literals() {
        for raw in ["enabled", "true", "1"] {
            assert_eq!(bool::parse_option(raw), Some(true), "{raw}");
        }
        for raw in ["disabled", "false", "0"] {
            assert_eq!(bool::parse_option(raw), Some(false), "{raw}");
        }
        assert_eq!(bool::parse_option("yes"), None);
        assert_eq!(bool::parse_option("Enabled"), None);
    }

    #[test]
    fn test_integer_prefix() {
        assert_eq!(parse_integer_prefix("42"), Some(42));
        assert_eq!(parse_integer_prefix("42xyz"), Some(42));
        assert_eq!(parse_integer_prefix("  -7 apples"), Some(-7));
        assert_eq!(parse_integer_prefix("+3"), Some(3));
        assert_eq!(parse_integer_prefix("abc"), None);
        assert_eq!(parse_integer_prefix("-"), None);
        assert_eq!(parse_integer_prefix(""), None);
    }

    #[test]
    fn test_integer_out_of_range_rejected() {
        assert_eq!(u32::parse_option("-1"), None);
        assert_eq!(i32::parse_option("4294967296"), None);
        assert_eq!(u32::parse_option("48000"), Some(48000));
    }

    #[test]
    fn test_float_prefix() {
        assert_eq!(parse_float_prefix("1.5"), Some(1.5));
        assert_eq!(parse_float_prefix("150%"), Some(150.0));
        assert_eq!(parse_float_prefix(".25x"), Some(0.25));
        assert_eq!(parse_float_prefix("2."), Some(2.0));
        assert_eq!(parse_float_prefix("1e3hz"), Some(1000.0));
        assert_eq!(parse_float_prefix("1e"), Some(1.0));
        assert_eq!(parse_float_prefix("-0.5"), Some(-0.5));
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("x1"), None);
    }

    #[test]
    fn test_format_roundtrip_for_bool() {
        assert_eq!(true.format_option(), "enabled");
        assert_eq!(false.format_option(), "disabled");
    }
}
