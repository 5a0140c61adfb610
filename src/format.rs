//! Value formatting and range helpers used by step assertions.

use chrono::DateTime;

use crate::error::{Error, Result};

/// Replaces every literal occurrence of `term`. An empty term changes nothing.
pub fn replace_all(s: &str, term: &str, replacement: &str) -> String {
    if term.is_empty() {
        return s.to_string();
    }
    s.replace(term, replacement)
}

/// Formats epoch milliseconds as a `dd/mm/yyyy` UTC date.
pub fn date_from_epoch(epoch_millis: i64) -> Result<String> {
    let date = DateTime::from_timestamp_millis(epoch_millis).ok_or_else(|| {
        Error::InvalidInput(format!("epoch timestamp {} is out of range", epoch_millis))
    })?;
    Ok(date.format("%d/%m/%Y").to_string())
}

/// Rounds to the nearest integer with halves going toward positive infinity,
/// like `Math.round` in browsers.
fn js_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Inserts `,` thousands separators into a plain decimal string.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Rounds to `decimals` places and formats with thousands separators.
///
/// `1234.5` with 2 decimals becomes `"1,234.50"`.
pub fn round_of_decimal(value: f64, decimals: usize) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!("cannot round {}", value)));
    }
    Ok(group_thousands(&format!("{:.*}", decimals, value)))
}

/// Rounds to an integer, or to one decimal when the integer would be zero.
///
/// `1234.4` becomes `"1,234"`, `0.26` becomes `"0.3"`.
pub fn round_to_nearest_tenth_or_int(num: f64) -> String {
    let rounded = js_round(num);
    if rounded == 0.0 {
        // Adding +0.0 turns a negative zero into a positive one.
        let tenth = (num * 10.0).round() / 10.0 + 0.0;
        return tenth.to_string();
    }
    group_thousands(&format!("{:.0}", rounded))
}

/// Checks that `min <= value <= max`.
///
/// Outside the range this is an error, unless `soft` is set, in which case
/// it returns `Ok(false)`.
pub fn verify_value_in_between(value: f64, min: f64, max: f64, soft: bool) -> Result<bool> {
    if !(value.is_finite() && min.is_finite() && max.is_finite()) {
        return Err(Error::InvalidInput(
            "value, min and max must be finite numbers".into(),
        ));
    }

    if value < min || value > max {
        if soft {
            return Ok(false);
        }
        return Err(Error::OutOfRange { value, min, max });
    }

    tracing::info!(value, min, max, "value is within range");
    Ok(true)
}

/// Returns the rounded `(min, max)` band of `percentage` percent around `value`.
pub fn find_min_and_max(value: f64, percentage: f64) -> Result<(i64, i64)> {
    if !value.is_finite() || !percentage.is_finite() || percentage < 0.0 {
        return Err(Error::InvalidInput(format!(
            "invalid value {} or percentage {}",
            value, percentage
        )));
    }
    let spread = percentage / 100.0 * value;
    Ok((js_round(value - spread) as i64, js_round(value + spread) as i64))
}

/// Truncates to `len` characters, optionally appending `...` when cut.
pub fn char_wrap(s: &str, len: usize, ellipsis: bool) -> String {
    if s.chars().count() <= len {
        return s.to_string();
    }
    let cut: String = s.chars().take(len).collect();
    if ellipsis {
        format!("{}...", cut)
    } else {
        cut
    }
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize_first_word(s: &str) -> String {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out: String = first.to_uppercase().collect();
    out.push_str(&chars.as_str().to_lowercase());
    out
}
