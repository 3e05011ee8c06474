//! Date format handling for `DATE_VALIDATION`.
//!
//! Rule documents use the pattern letters operators already know
//! (`yyyy-MM-dd`, `dd/MM/yyyy HH:mm`). Any format containing `%` is taken as a
//! raw strftime pattern.

use chrono::{NaiveDate, NaiveDateTime};

const TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
];

/// Translate a pattern-letter format to strftime.
#[must_use]
pub fn to_strftime(format: &str) -> String {
    if format.contains('%') {
        return format.to_string();
    }
    let mut out = String::with_capacity(format.len() + 4);
    let mut rest = format;
    'outer: while !rest.is_empty() {
        for (token, directive) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(directive);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

/// Parse `value` with a pattern-letter or strftime format.
///
/// Date-only formats parse as dates; formats carrying a time parse as
/// date-times and keep the calendar date.
#[must_use]
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let fmt = to_strftime(format);
    let value = value.trim();
    NaiveDate::parse_from_str(value, &fmt)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, &fmt)
                .ok()
                .map(|dt| dt.date())
        })
}
