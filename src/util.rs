// Utility helpers for parsing, formatting and chart labels.
//
// This module centralizes the "dirty" number handling so the rest of the
// code can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Line-break marker understood by the chart front end.
pub const LABEL_BREAK: &str = "<br>";

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_f64_safe(Some(s)).map(|f| f.round() as i64))
}

pub fn days_diff(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Break `label` into lines of at most `width` characters, joined with
/// [`LABEL_BREAK`].
pub fn wrap_label(label: &str, width: usize) -> String {
    wrap_label_with(label, width, LABEL_BREAK)
}

/// Greedy word wrap at whitespace boundaries.
///
/// Words are never split: a word longer than `width` gets a line of its own.
/// The whitespace between two words on the same line is kept as written; at a
/// break it is replaced by `marker`. A label that fits is returned unchanged.
pub fn wrap_label_with(label: &str, width: usize, marker: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut line_len = 0usize;
    let mut line_has_word = false;
    let mut rest = label;
    while !rest.is_empty() {
        let word_start = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        let (sep, tail) = rest.split_at(word_start);
        let word_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let (word, tail) = tail.split_at(word_end);
        if word.is_empty() {
            out.push_str(sep);
            break;
        }
        let sep_len = sep.chars().count();
        let word_len = word.chars().count();
        if !line_has_word || line_len + sep_len + word_len <= width {
            out.push_str(sep);
            line_len += sep_len + word_len;
        } else {
            out.push_str(marker);
            line_len = word_len;
        }
        out.push_str(word);
        line_has_word = true;
        rest = tail;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_strips_thousands_separators() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_i64_accepts_float_text() {
        assert_eq!(parse_i64_safe(Some("7")), Some(7));
        assert_eq!(parse_i64_safe(Some("3.0")), Some(3));
        assert_eq!(parse_i64_safe(Some("three")), None);
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 1), "-42.0");
        assert_eq!(format_number(0.0, 0), "0");
    }

    #[test]
    fn wrap_headphones_label_at_22() {
        let label = "Wireless Bluetooth Over-Ear Headphones";
        let wrapped = wrap_label(label, 22);
        let lines: Vec<&str> = wrapped.split(LABEL_BREAK).collect();
        assert_eq!(lines, vec!["Wireless Bluetooth", "Over-Ear Headphones"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 22));
        assert_eq!(lines.join(" "), label);
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        let wrapped = wrap_label_with("Ultra-Mega-Extended-Cable x2", 10, "\n");
        assert_eq!(wrapped, "Ultra-Mega-Extended-Cable\nx2");
    }

    #[test]
    fn wrap_short_label_is_unchanged() {
        assert_eq!(wrap_label("Stapler", 22), "Stapler");
        assert_eq!(wrap_label("", 22), "");
    }

    #[test]
    fn wrap_keeps_original_spacing() {
        assert_eq!(wrap_label("Pen  Set", 22), "Pen  Set");
        assert_eq!(wrap_label("Pen\tSet ", 22), "Pen\tSet ");
        assert_eq!(
            wrap_label_with("Desk  Organizer Tray", 10, "|"),
            "Desk|Organizer|Tray"
        );
    }
}
