//! Amount coercion for `debt` / `credit`
//!
//! Upstream sends numbers, numeric strings, or nothing at all. Parsing is
//! lenient in the way float parsers usually are: surrounding whitespace is
//! ignored and the longest leading numeric prefix is used. Anything that
//! still does not yield a number becomes zero.
//!
//! Values beyond the `Decimal` range saturate at `Decimal::MAX` or
//! `Decimal::MIN` and are logged; magnitudes too small to represent round
//! toward zero.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

/// Coerce an optional JSON amount to a decimal, defaulting to zero.
pub fn coerce_amount(value: Option<&Value>) -> Decimal {
    let parsed = match value {
        Some(Value::Number(number)) => parse_amount(&number.to_string()),
        Some(Value::String(text)) => parse_amount(text),
        _ => None,
    };
    parsed.unwrap_or(Decimal::ZERO)
}

fn parse_amount(text: &str) -> Option<Decimal> {
    let normalized = numeric_prefix(text.trim())?;
    let exact = if normalized.contains('e') {
        Decimal::from_scientific(&normalized)
    } else {
        Decimal::from_str(&normalized)
    };
    exact.ok().or_else(|| saturate(text, &normalized))
}

/// Fallback for prefixes the decimal parser rejects on range grounds.
fn saturate(text: &str, normalized: &str) -> Option<Decimal> {
    let value: f64 = normalized.parse().ok()?;
    if value.abs() < 1.0 {
        return Some(Decimal::from_f64(value).unwrap_or(Decimal::ZERO));
    }
    let clamped = if value.is_sign_negative() { Decimal::MIN } else { Decimal::MAX };
    warn!(amount = text, clamped = %clamped, "Amount outside decimal range");
    Some(clamped)
}

/// Leading `[sign] digits [. digits] [e [sign] digits]`, normalized so the
/// decimal parser accepts it (`.5` becomes `0.5`, `5.` becomes `5`).
fn numeric_prefix(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut out = String::with_capacity(text.len() + 1);

    if let Some(&sign @ (b'+' | b'-')) = bytes.first() {
        if sign == b'-' {
            out.push('-');
        }
        pos = 1;
    }

    let int_start = pos;
    pos = skip_digits(bytes, pos);
    let int_digits = &text[int_start..pos];

    let mut frac_digits = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        pos = skip_digits(bytes, frac_start);
        frac_digits = &text[frac_start..pos];
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    out.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(frac_digits);
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp_pos = pos + 1;
        let negative = bytes.get(exp_pos) == Some(&b'-');
        if matches!(bytes.get(exp_pos), Some(b'+' | b'-')) {
            exp_pos += 1;
        }
        let exp_end = skip_digits(bytes, exp_pos);
        if exp_end > exp_pos {
            out.push('e');
            if negative {
                out.push('-');
            }
            out.push_str(&text[exp_pos..exp_end]);
        }
    }

    Some(out)
}

fn skip_digits(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    pos
}
