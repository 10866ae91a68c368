//! Numeric-constant classification
//!
//! Takes the spelling of a `numeric_constant` token and classifies it as an
//! integer or floating literal, validating radix prefixes, digits, digit
//! separators, and suffixes. Integer values are extracted into an
//! arbitrary-precision unsigned; floating values are converted on demand with
//! an overflow/underflow status so the parser can apply its own range policy.
//!
//! Supported forms:
//! - integers: decimal, `0x`/`0X` hex, `0b`/`0B` binary, leading-zero octal,
//!   with `u`/`l`/`ll` suffixes in either order (case-insensitive, but `ll`
//!   must not mix case)
//! - floats: decimal with optional fraction and `e`-exponent, hexadecimal
//!   with mandatory `p`-exponent, with `f` (IEEE single) and `l` (long
//!   double, converted as double) suffixes
//! - C++14 `'` digit separators between digits

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;

/// Lexical error produced while classifying a numeric constant.
#[derive(Debug, Clone)]
pub struct LiteralError {
    pub message: String,
}

impl LiteralError {
    fn new(message: impl Into<String>) -> Self {
        LiteralError {
            message: message.into(),
        }
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LiteralError {}

/// An integer constant: exact value plus radix and suffix flags.
#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub value: BigUint,
    pub radix: u32,
    pub is_unsigned: bool,
    pub is_long: bool,
    pub is_long_long: bool,
}

/// A floating constant, kept in component form until conversion.
#[derive(Debug, Clone)]
pub struct FloatLiteral {
    /// `f`/`F` suffix present: convert to IEEE single.
    pub is_single: bool,
    radix: u32,
    int_digits: String,
    frac_digits: String,
    exponent_negative: bool,
    exponent_digits: String,
}

/// Result of converting a [`FloatLiteral`] to the target format.
///
/// `underflow` is set for any result the target format cannot represent at
/// full precision (zero or subnormal from a nonzero spelling); the caller
/// decides whether a denormal result is acceptable.
#[derive(Debug, Clone, Copy)]
pub struct FloatConversion {
    pub value: f64,
    pub overflow: bool,
    pub underflow: bool,
}

/// A classified numeric constant.
#[derive(Debug, Clone)]
pub enum NumericLiteral {
    Integer(IntegerLiteral),
    Float(FloatLiteral),
}

impl FloatLiteral {
    /// Convert to the format selected by the suffix. For `f`-suffixed
    /// literals the value is rounded through IEEE single before being
    /// widened back to double.
    pub fn value(&self) -> FloatConversion {
        let (value, nonzero) = if self.radix == 16 {
            self.hex_value()
        } else {
            self.decimal_value()
        };

        if self.is_single {
            let single = value as f32;
            FloatConversion {
                value: single as f64,
                overflow: single.is_infinite(),
                underflow: (single == 0.0 || single.is_subnormal()) && nonzero,
            }
        } else {
            FloatConversion {
                value,
                overflow: value.is_infinite(),
                underflow: (value == 0.0 || value.is_subnormal()) && nonzero,
            }
        }
    }

    /// Convert a decimal literal via the standard library float parser, which
    /// saturates to infinity/zero out of range. Returns the value and whether
    /// the written significand is nonzero.
    fn decimal_value(&self) -> (f64, bool) {
        let mut text = self.int_digits.clone();
        text.push('.');
        text.push_str(&self.frac_digits);
        if !self.exponent_digits.is_empty() {
            text.push('e');
            if self.exponent_negative {
                text.push('-');
            }
            text.push_str(&self.exponent_digits);
        }

        // The classifier guarantees a well-formed significand, so this parse
        // cannot fail.
        let value: f64 = text.parse().unwrap_or_default();
        let nonzero = self
            .int_digits
            .chars()
            .chain(self.frac_digits.chars())
            .any(|c| c != '0');
        (value, nonzero)
    }

    /// Convert a hexadecimal literal: accumulate the significand into 128
    /// bits, then scale by the binary exponent. Significands longer than 32
    /// hex digits round at the accumulator boundary.
    fn hex_value(&self) -> (f64, bool) {
        let mut mantissa: u128 = 0;
        let mut exp: i64 = 0;
        let mut significant = 0u32;
        let mut nonzero = false;

        for ch in self.int_digits.chars() {
            let digit = ch.to_digit(16).unwrap_or(0) as u128;
            nonzero |= digit != 0;
            if mantissa == 0 && digit == 0 {
                continue;
            }
            if significant < 32 {
                mantissa = mantissa * 16 + digit;
                significant += 1;
            } else {
                exp += 4;
            }
        }
        for ch in self.frac_digits.chars() {
            let digit = ch.to_digit(16).unwrap_or(0) as u128;
            nonzero |= digit != 0;
            if mantissa == 0 && digit == 0 {
                exp -= 4;
                continue;
            }
            if significant < 32 {
                mantissa = mantissa * 16 + digit;
                significant += 1;
                exp -= 4;
            }
        }

        let mut written_exp: i64 = 0;
        for ch in self.exponent_digits.chars() {
            let digit = ch.to_digit(10).unwrap_or(0) as i64;
            written_exp = (written_exp * 10 + digit).min(1_000_000);
        }
        if self.exponent_negative {
            written_exp = -written_exp;
        }
        exp += written_exp;

        (scale_by_power_of_two(mantissa as f64, exp), nonzero)
    }
}

/// `value * 2^exp`, stepping the scale so intermediates cannot spuriously
/// saturate before the final result does.
fn scale_by_power_of_two(mut value: f64, exp: i64) -> f64 {
    let mut exp = exp.clamp(-4096, 4096) as i32;
    while exp > 0 {
        let step = exp.min(1000);
        value *= 2f64.powi(step);
        exp -= step;
    }
    while exp < 0 {
        let step = (-exp).min(1000);
        value /= 2f64.powi(step);
        exp += step;
    }
    value
}

/// Classify the spelling of a `numeric_constant` token.
pub fn classify(spelling: &str) -> Result<NumericLiteral, LiteralError> {
    let bytes = spelling.as_bytes();
    let mut pos = 0usize;

    let mut radix = if bytes.starts_with(b"0x") || bytes.starts_with(b"0X") {
        pos = 2;
        16
    } else if bytes.starts_with(b"0b") || bytes.starts_with(b"0B") {
        pos = 2;
        2
    } else if bytes.first() == Some(&b'0') {
        8
    } else {
        10
    };

    let int_digits = scan_digits(bytes, &mut pos, radix)?;

    let mut is_float = false;
    let mut frac_digits = String::new();
    let mut exponent_negative = false;
    let mut exponent_digits = String::new();

    if bytes.get(pos) == Some(&b'.') {
        is_float = true;
        pos += 1;
        frac_digits = scan_digits(bytes, &mut pos, radix)?;
    }

    let exponent_letter: &[u8] = if radix == 16 { b"pP" } else { b"eE" };
    if bytes.get(pos).is_some_and(|b| exponent_letter.contains(b)) {
        is_float = true;
        pos += 1;
        match bytes.get(pos) {
            Some(b'+') => pos += 1,
            Some(b'-') => {
                exponent_negative = true;
                pos += 1;
            }
            _ => {}
        }
        exponent_digits = scan_digits(bytes, &mut pos, 10)?;
        if exponent_digits.is_empty() {
            return Err(LiteralError::new("exponent has no digits"));
        }
    }

    let suffix = &spelling[pos..];

    if is_float {
        if radix == 2 {
            return Err(LiteralError::new(
                "binary literal cannot be a floating constant",
            ));
        }
        if radix == 16 && exponent_digits.is_empty() {
            return Err(LiteralError::new(
                "hexadecimal floating literal requires an exponent",
            ));
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(LiteralError::new("floating constant has no digits"));
        }
        // Octal-looking "01.5" is an ordinary decimal floating constant.
        if radix == 8 {
            radix = 10;
        }

        let is_single = parse_float_suffix(suffix)?;
        return Ok(NumericLiteral::Float(FloatLiteral {
            is_single,
            radix,
            int_digits,
            frac_digits,
            exponent_negative,
            exponent_digits,
        }));
    }

    if int_digits.is_empty() {
        return Err(LiteralError::new(format!(
            "integer constant has no digits after '{}'",
            &spelling[..pos]
        )));
    }

    let (is_unsigned, is_long, is_long_long) = parse_integer_suffix(suffix)?;
    let value = extract_integer_value(&int_digits, radix)?;

    Ok(NumericLiteral::Integer(IntegerLiteral {
        value,
        radix,
        is_unsigned,
        is_long,
        is_long_long,
    }))
}

/// Scan a digit run, stripping digit separators. A separator must sit
/// between two digits. Decimal digits are accepted for every radix below 16
/// so that out-of-radix digits fail later with a precise message.
fn scan_digits(bytes: &[u8], pos: &mut usize, radix: u32) -> Result<String, LiteralError> {
    let is_digit = |b: u8| {
        if radix == 16 {
            b.is_ascii_hexdigit()
        } else {
            b.is_ascii_digit()
        }
    };

    let mut digits = String::new();
    while let Some(&b) = bytes.get(*pos) {
        if is_digit(b) {
            digits.push(b as char);
            *pos += 1;
        } else if b == b'\'' {
            if digits.is_empty() || !bytes.get(*pos + 1).copied().is_some_and(is_digit) {
                return Err(LiteralError::new("digit separator must be between digits"));
            }
            *pos += 1;
        } else {
            break;
        }
    }
    Ok(digits)
}

/// Parse an integer suffix: `u` and `l`/`ll` in either order. Returns
/// `(is_unsigned, is_long, is_long_long)`.
fn parse_integer_suffix(suffix: &str) -> Result<(bool, bool, bool), LiteralError> {
    let invalid = || {
        LiteralError::new(format!(
            "invalid suffix '{}' on integer constant",
            suffix
        ))
    };

    let mut is_unsigned = false;
    let mut is_long = false;
    let mut is_long_long = false;

    let bytes = suffix.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'u' | b'U' if !is_unsigned => {
                is_unsigned = true;
                i += 1;
            }
            b'l' | b'L' if !is_long && !is_long_long => {
                // "ll"/"LL" only; mixed case is rejected.
                if bytes.get(i + 1) == Some(&bytes[i]) {
                    is_long_long = true;
                    i += 2;
                } else {
                    is_long = true;
                    i += 1;
                }
            }
            _ => return Err(invalid()),
        }
    }

    Ok((is_unsigned, is_long, is_long_long))
}

/// Parse a floating suffix: `f` (single) or `l` (long double, converted as
/// double). Returns whether the literal is IEEE single.
fn parse_float_suffix(suffix: &str) -> Result<bool, LiteralError> {
    let mut is_single = false;
    let mut is_long_double = false;

    for &b in suffix.as_bytes() {
        match b {
            b'f' | b'F' if !is_single && !is_long_double => is_single = true,
            b'l' | b'L' if !is_single && !is_long_double => is_long_double = true,
            _ => {
                return Err(LiteralError::new(format!(
                    "invalid suffix '{}' on floating constant",
                    suffix
                )))
            }
        }
    }

    Ok(is_single)
}

/// Fold a separator-free digit run into an arbitrary-precision unsigned,
/// validating each digit against the radix.
fn extract_integer_value(digits: &str, radix: u32) -> Result<BigUint, LiteralError> {
    let radix_name = match radix {
        2 => "binary",
        8 => "octal",
        16 => "hexadecimal",
        _ => "decimal",
    };

    let mut value = BigUint::zero();
    for ch in digits.chars() {
        match ch.to_digit(16) {
            Some(digit) if digit < radix => {
                value *= radix;
                value += digit;
            }
            _ => {
                return Err(LiteralError::new(format!(
                    "invalid digit '{}' in {} constant",
                    ch, radix_name
                )))
            }
        }
    }
    Ok(value)
}
