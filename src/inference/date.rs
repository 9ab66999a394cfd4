//! Serial date numbers and date-format detection.
//!
//! Spreadsheet hosts store dates as a day count with the time of day in the fractional part,
//! and only the cell's number-format code tells a date apart from a plain number.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::{DatasetError, DatasetResult};

/// Day offset between the host's serial epoch and the Unix epoch, as applied by the decoder.
pub const EPOCH_OFFSET_DAYS: f64 = 25568.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Added to the fractional day before truncating to whole seconds.
const FRACTION_EPSILON: f64 = 1e-7;

/// Tokens whose presence in a format code marks it as a date/time format (lowercase).
const DATE_TOKENS: &[&str] = &["yy", "m", "d", "h", "s", "am/pm", "a/p"];

/// Decode a serial date number into a zone-less calendar date-time.
///
/// The integral part selects the calendar day (`floor(num - 25568)` days after 1970-01-01);
/// the fractional part, plus `1e-7`, is truncated to whole seconds of that day. A fraction that
/// rounds up to a full day rolls over to the next midnight.
///
/// ```
/// use lupa_dataset::inference::decode_serial;
///
/// let dt = decode_serial(44000.5).unwrap();
/// assert_eq!(dt.to_string(), "2020-06-19 12:00:00");
/// ```
pub fn decode_serial(num: f64) -> DatasetResult<NaiveDateTime> {
    let out_of_range = || DatasetError::DateOutOfRange { serial: num };
    if !num.is_finite() {
        return Err(out_of_range());
    }

    let utc_days = (num - EPOCH_OFFSET_DAYS).floor();
    let utc_seconds = utc_days * SECONDS_PER_DAY;
    if utc_seconds.abs() >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    let date = DateTime::from_timestamp(utc_seconds as i64, 0)
        .ok_or_else(out_of_range)?
        .date_naive();

    let fractional_day = (num - num.floor()) + FRACTION_EPSILON;
    let total_seconds = (SECONDS_PER_DAY * fractional_day).floor() as i64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    date.and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::seconds(hours * 3600 + minutes * 60 + seconds))
        .ok_or_else(out_of_range)
}

/// Returns true if a number-format code displays its value as a date and/or time.
///
/// Quoted literals, escaped characters and bracketed sections such as `[Red]` or `[$-409]` are
/// ignored; elapsed-time sections (`[h]`, `[mm]`, `[ss]`) count as time tokens. Matching is
/// case-insensitive.
pub fn is_date_format(code: &str) -> bool {
    let visible = strip_literals(code).to_ascii_lowercase();
    DATE_TOKENS.iter().any(|token| visible.contains(token))
}

fn strip_literals(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            // `\x` escapes, `_x` pads by the width of x, `*x` repeats x.
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut section = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    section.push(b);
                }
                if is_elapsed_time_section(&section) {
                    out.push_str(&section);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_elapsed_time_section(section: &str) -> bool {
    let mut chars = section.chars().map(|c| c.to_ascii_lowercase());
    match chars.next() {
        Some(first @ ('h' | 'm' | 's')) => chars.all(|c| c == first),
        _ => false,
    }
}
