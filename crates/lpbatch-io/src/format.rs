//! Numeric rendering for ledger cells.
//!
//! Floats use C-style `%.17e`: 17 digits after the point, signed exponent
//! with at least two digits (`-4.64753142857142830e+02`). The exact text is
//! what downstream tooling diffs and re-parses, so it must not depend on
//! locale or on Rust's own exponent style (`e2`).

/// Render `value` as `%.17e`. Non-finite values become `nan`, `inf`, `-inf`.
pub fn scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let rendered = format!("{:.17e}", value);
    let (mantissa, exponent) = match rendered.split_once('e') {
        Some(parts) => parts,
        None => return rendered,
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(rest) => ('-', rest),
        None => ('+', exponent),
    };
    if digits.len() < 2 {
        format!("{mantissa}e{sign}0{digits}")
    } else {
        format!("{mantissa}e{sign}{digits}")
    }
}

pub fn integer(value: u64) -> String {
    value.to_string()
}
