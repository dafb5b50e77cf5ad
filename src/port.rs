//! Integer conversion of the `--port` string.

use std::fmt;

/// A port as requested on the command line, after integer conversion.
///
/// Conversion is lenient: leading whitespace and an optional sign are
/// accepted, leading decimal digits are consumed and anything after them is
/// ignored. A string without leading digits becomes [`Port::NaN`]. The
/// launcher forwards either variant unchanged; range checks belong to the
/// server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Number(i64),
    NaN,
}

impl Port {
    pub fn parse(s: &str) -> Self {
        let s = s.trim_start();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Port::NaN;
        }

        // Saturate instead of failing on absurdly long digit runs.
        let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
        Port::Number(if negative { -magnitude } else { magnitude })
    }

    /// The port as a bindable TCP port, if it is one.
    pub fn as_u16(self) -> Option<u16> {
        match self {
            Port::Number(n) => u16::try_from(n).ok(),
            Port::NaN => None,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Number(n) => write!(f, "{}", n),
            Port::NaN => f.write_str("NaN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_number() {
        assert_eq!(Port::parse("3000"), Port::Number(3000));
    }

    #[test]
    fn parse_non_numeric_is_nan() {
        assert_eq!(Port::parse("abc"), Port::NaN);
        assert_eq!(Port::parse(""), Port::NaN);
        assert_eq!(Port::parse("-"), Port::NaN);
    }

    #[test]
    fn parse_ignores_trailing_garbage() {
        assert_eq!(Port::parse("8080abc"), Port::Number(8080));
        assert_eq!(Port::parse("80.5"), Port::Number(80));
    }

    #[test]
    fn parse_accepts_whitespace_and_sign() {
        assert_eq!(Port::parse("  42"), Port::Number(42));
        assert_eq!(Port::parse("+42"), Port::Number(42));
        assert_eq!(Port::parse("-1"), Port::Number(-1));
    }

    #[test]
    fn as_u16_rejects_out_of_range() {
        assert_eq!(Port::Number(4000).as_u16(), Some(4000));
        assert_eq!(Port::Number(-1).as_u16(), None);
        assert_eq!(Port::Number(70000).as_u16(), None);
        assert_eq!(Port::NaN.as_u16(), None);
    }

    #[test]
    fn display_matches_input_form() {
        assert_eq!(Port::Number(4000).to_string(), "4000");
        assert_eq!(Port::NaN.to_string(), "NaN");
    }
}
