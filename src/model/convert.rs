//! ECMAScript-style conversion and comparison rules
//!
//! Stateless, total functions over [`Value`]: every input has a defined
//! output, so coercions inside user expressions can never take the
//! evaluator down. The rules track JavaScript semantics closely — the
//! trickiest ones (empty containers are truthy, `NaN` never equals itself,
//! numeric-string parsing with Unicode whitespace) are pinned by tests.

use std::cmp::Ordering;

use super::Value;

/// ECMAScript `ToString`.
///
/// Arrays join their elements' string forms with commas (an empty array is
/// the empty string); objects render as the literal `[object Object]`.
pub fn to_string_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(to_string_value).collect();
            parts.join(",")
        }
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Format a number the way `Number.prototype.toString` does.
///
/// Integral values print without a decimal point, `NaN` and the infinities
/// print by name, and very large or very small magnitudes switch to
/// exponential notation at the same thresholds JavaScript uses (1e21 and
/// 1e-6).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Covers -0.0 as well
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 {
        return with_exponent_sign(format!("{n:e}"));
    }
    if abs < 1e-6 {
        return with_exponent_sign(format!("{n:e}"));
    }
    if n.fract() == 0.0 {
        return format!("{n:.0}");
    }
    format!("{n}")
}

// Rust's exponential formatter writes `1e21`; JavaScript writes `1e+21`.
fn with_exponent_sign(formatted: String) -> String {
    if let Some(pos) = formatted.find('e') {
        let exponent = &formatted[pos + 1..];
        if !exponent.starts_with('-') && !exponent.starts_with('+') {
            return format!("{}e+{}", &formatted[..pos], exponent);
        }
    }
    formatted
}

/// ECMAScript `ToNumber`.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::String(s) => parse_numeric_string(s),
        // Arrays follow the single-element shortcut of ToPrimitive: an empty
        // array is 0, a one-element array converts its element, anything
        // longer is NaN.
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => to_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// Parse a string per the ECMAScript numeric-string grammar.
///
/// Surrounding whitespace (including Unicode space characters, line
/// terminators and the BOM) is trimmed first. An empty remainder is 0;
/// `0x`/`0o`/`0b` prefixes parse as unsigned integers; signed `Infinity`
/// literals are honored; anything else that fails the decimal grammar is
/// `NaN`.
pub fn parse_numeric_string(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_ecmascript_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }

    // Radix-prefixed integer forms take no sign in the grammar
    for (prefix_lower, prefix_upper, radix) in
        [("0x", "0X", 16), ("0o", "0O", 8), ("0b", "0B", 2)]
    {
        if let Some(digits) = trimmed
            .strip_prefix(prefix_lower)
            .or_else(|| trimmed.strip_prefix(prefix_upper))
        {
            return u128::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }

    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if body == "Infinity" {
        return sign * f64::INFINITY;
    }

    // Reject Rust-specific spellings ("inf", "nan") the JS grammar excludes
    if body
        .chars()
        .any(|c| c.is_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }

    body.parse::<f64>().map(|v| sign * v).unwrap_or(f64::NAN)
}

fn is_ecmascript_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// ECMAScript `ToBoolean`.
///
/// Falsy values are exactly `null`/`undefined`, `false`, `±0`, `NaN` and the
/// empty string. Every array and object is truthy, **including empty ones**.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Sentinel returned by [`to_array_index`] for values that cannot index an
/// array.
pub const NOT_AN_INDEX: i64 = -1;

/// Convert a value to a non-negative array index.
///
/// Accepts integral numbers and numeric strings in the 32-bit signed range;
/// everything else (negative, fractional, out of range, non-numeric) yields
/// [`NOT_AN_INDEX`] so callers can treat it as "not indexable" instead of
/// erroring.
pub fn to_array_index(value: &Value) -> i64 {
    let n = match value {
        Value::Number(n) => *n,
        Value::String(s) => parse_numeric_string(s),
        _ => return NOT_AN_INDEX,
    };
    if n.is_finite() && n.fract() == 0.0 && n >= 0.0 && n <= i32::MAX as f64 {
        n as i64
    } else {
        NOT_AN_INDEX
    }
}

/// Strict equality (`===`).
///
/// Requires identical type tags; numbers compare numerically with `NaN`
/// never equal to anything, itself included. Arrays and objects compare
/// structurally (deep equality) — the engine has no notion of reference
/// identity.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| strict_equals(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, l)| match y.get(k) {
                    Some(r) => strict_equals(l, r),
                    None => false,
                })
        }
        _ => false,
    }
}

/// Loose equality (`==`) with one level of cross-type coercion:
/// number↔string and boolean↔anything coerce through `ToNumber`, and
/// `null == undefined` holds (both map to `Null` here). Containers never
/// loosely equal primitives.
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(_), _) => loose_equals(&Value::Number(to_number(a)), b),
        (_, Value::Bool(_)) => loose_equals(a, &Value::Number(to_number(b))),
        (Value::Number(x), Value::String(_)) => *x == to_number(b),
        (Value::String(_), Value::Number(y)) => to_number(a) == *y,
        _ if a.type_name() == b.type_name() => strict_equals(a, b),
        _ => false,
    }
}

/// Relational comparison backing `<`, `<=`, `>`, `>=`.
///
/// Two strings compare lexicographically; every other pairing converts both
/// sides through `ToNumber`. `None` means an operand was `NaN`, in which
/// case all relational operators are false.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Some(x.cmp(y));
    }
    let (x, y) = (to_number(a), to_number(b));
    if x.is_nan() || y.is_nan() {
        return None;
    }
    x.partial_cmp(&y)
}
