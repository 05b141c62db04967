//! Scalar-to-text conversion for XML output
//!
//! Floats render in fixed scientific notation: one integer digit, nine
//! fractional digits, `E`, and a signed two-digit exponent
//! (`-0.004` becomes `-4.000000000E-03`). Everything else uses its
//! canonical string form: integers as plain decimal, strings as-is,
//! booleans as `true`/`false`, null as the empty string.

use crate::tree::Scalar;

/// Fractional digits in the default scientific pattern
pub const DEFAULT_PRECISION: usize = 9;

/// Format a float with `prec` fractional digits and a signed exponent of
/// at least two digits. Non-finite values use the printf spellings
/// `INF`, `-INF` and `NAN`.
pub fn scientific_float(value: f64, prec: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NAN".to_string()
        } else if value > 0.0 {
            "INF".to_string()
        } else {
            "-INF".to_string()
        };
    }
    let raw = format!("{:.*E}", prec, value);
    // std renders the exponent as `E-3` / `E4`; widen to `E-03` / `E+04`
    match raw.split_once('E') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exp),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => raw,
    }
}

/// Canonical textual form of a scalar, with floats in the default
/// scientific pattern. Pure function.
pub fn scientific_format(value: &Scalar) -> String {
    scientific_format_prec(value, DEFAULT_PRECISION)
}

/// Same as [`scientific_format`] with a configurable float precision
pub fn scientific_format_prec(value: &Scalar, prec: usize) -> String {
    match value {
        Scalar::Float(f) => scientific_float(*f, prec),
        Scalar::Str(s) => s.clone(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Null => String::new(),
    }
}
