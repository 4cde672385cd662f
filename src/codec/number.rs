//! Oracle NUMBER codec.
//!
//! NUMBER is a variable-length vendor format: the first byte carries a
//! biased exponent (sign in the high bit), the remaining bytes are base-100
//! mantissa digits. Decoding goes through a decimal string so no precision
//! is lost before the caller picks an integer or floating destination.

use crate::error::{Error, Result};

/// Decode vendor NUMBER bytes to a decimal string.
///
/// The string preserves full precision; parse it as `i64` or `f64` as the
/// destination requires.
pub fn decode_number(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Ok("0".to_string());
    }

    let exp_byte = bytes[0];
    let is_positive = (exp_byte & 0x80) != 0;

    // Negative numbers store the exponent with all bits inverted.
    let exponent: i16 = if is_positive {
        exp_byte as i16 - 193
    } else {
        (!exp_byte) as i16 - 193
    };

    // Position of the decimal point within the digit string, counted in
    // decimal digits from the left. Adjusted below for leading zeros.
    let mut point: i16 = exponent * 2 + 2;

    // Single byte: zero, or the negative sentinel -1e126.
    if bytes.len() == 1 {
        if is_positive {
            return Ok("0".to_string());
        }
        return Ok("-1e126".to_string());
    }

    // Negative mantissas carry a trailing terminator byte of 102.
    let mantissa_end = if !is_positive && bytes[bytes.len() - 1] == 102 {
        bytes.len() - 1
    } else {
        bytes.len()
    };

    let mut digits: Vec<u8> = Vec::with_capacity((mantissa_end - 1) * 2);

    for (i, &byte) in bytes.iter().enumerate().take(mantissa_end).skip(1) {
        let pair = if is_positive {
            byte.wrapping_sub(1)
        } else {
            101u8.wrapping_sub(byte)
        };
        if pair > 100 {
            return Err(Error::invalid_payload(
                "NUMBER",
                format!("mantissa byte {byte:#04x} out of range"),
            ));
        }

        let hi = pair / 10;
        let lo = pair % 10;

        if digits.is_empty() && hi == 0 {
            // Leading zero shifts the decimal point left.
            point -= 1;
            if lo != 0 || i < mantissa_end - 1 {
                digits.push(lo);
            } else {
                point -= 1;
            }
        } else if hi == 10 {
            // Carry pair (99 + 1 = 100).
            digits.push(1);
            digits.push(0);
            point += 1;
        } else {
            digits.push(hi);
            if lo != 0 || i < mantissa_end - 1 {
                digits.push(lo);
            }
        }
    }

    while digits.last() == Some(&0) {
        digits.pop();
    }
    if digits.is_empty() {
        return Ok("0".to_string());
    }

    let mut out = String::new();
    if !is_positive {
        out.push('-');
    }

    let len = digits.len() as i16;
    if point <= 0 {
        out.push_str("0.");
        for _ in point..0 {
            out.push('0');
        }
        for d in &digits {
            out.push((b'0' + d) as char);
        }
    } else if point >= len {
        for d in &digits {
            out.push((b'0' + d) as char);
        }
        for _ in len..point {
            out.push('0');
        }
    } else {
        for (i, d) in digits.iter().enumerate() {
            if i as i16 == point {
                out.push('.');
            }
            out.push((b'0' + d) as char);
        }
    }

    Ok(out)
}

/// Encode a plain decimal string (`-?digits(.digits)?`) as vendor NUMBER
/// bytes. Inverse of [`decode_number`].
pub fn encode_number(text: &str) -> Result<Vec<u8>> {
    let t = text.trim();
    let (negative, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let (int_part, frac_part) = match t.split_once('.') {
        Some((i, f)) => (i, f),
        None => (t, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::invalid_payload("NUMBER", format!("empty literal {text:?}")));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::invalid_payload(
            "NUMBER",
            format!("not a decimal literal: {text:?}"),
        ));
    }

    // Normalize to a digit string plus a decimal-point index, stripping
    // leading zeros of the integer part and trailing zeros overall.
    let int_digits = int_part.trim_start_matches('0');
    let mut point: i32;
    let mut digits: Vec<u8>;
    if int_digits.is_empty() {
        let trimmed = frac_part.trim_start_matches('0');
        point = -((frac_part.len() - trimmed.len()) as i32);
        digits = trimmed.bytes().map(|b| b - b'0').collect();
    } else {
        point = int_digits.len() as i32;
        digits = int_digits
            .bytes()
            .chain(frac_part.bytes())
            .map(|b| b - b'0')
            .collect();
    }
    while digits.last() == Some(&0) {
        digits.pop();
    }
    if digits.is_empty() {
        // Zero is a single byte regardless of sign.
        return Ok(vec![0x80]);
    }

    // Base-100 pairs must align on the decimal point: force an even point
    // index by padding a leading zero digit.
    if point.rem_euclid(2) == 1 {
        digits.insert(0, 0);
        point += 1;
    }
    if digits.len() % 2 == 1 {
        digits.push(0);
    }

    let exponent = point / 2 - 1;
    if !(-64..=62).contains(&exponent) {
        return Err(Error::invalid_payload(
            "NUMBER",
            format!("exponent out of range for {text:?}"),
        ));
    }

    let mut out = Vec::with_capacity(1 + digits.len() / 2 + 1);
    let biased = (exponent + 193) as u8;
    out.push(if negative { !biased } else { biased });
    for pair in digits.chunks(2) {
        let v = pair[0] * 10 + pair[1];
        out.push(if negative { 101 - v } else { v + 1 });
    }
    if negative && out.len() < 21 {
        out.push(102);
    }
    Ok(out)
}

/// Encode an `i64` as vendor NUMBER bytes.
pub fn encode_i64(value: i64) -> Vec<u8> {
    // An i64 always fits the NUMBER range.
    encode_number(&value.to_string()).expect("i64 literal is always a valid NUMBER")
}

/// Encode an `f64` as vendor NUMBER bytes.
///
/// Fails for NaN and infinities, which have no NUMBER representation.
pub fn encode_f64(value: f64) -> Result<Vec<u8>> {
    if !value.is_finite() {
        return Err(Error::invalid_payload(
            "NUMBER",
            format!("{value} has no NUMBER representation"),
        ));
    }
    encode_number(&value.to_string())
}
