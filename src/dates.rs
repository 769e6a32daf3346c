// Date coercion for columns that may hold real dates, spreadsheet serial
// numbers, durations or free text.
use crate::error::DashboardError;
use crate::table::Cell;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Day zero of the legacy spreadsheet date system.
pub fn spreadsheet_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// Convert a (fractional) day count since 1899-12-30 to a date-time.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // 2_958_465 is 9999-12-31, the last date spreadsheets can hold.
    if !serial.is_finite() || serial.abs() > 2_958_465.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round();
    spreadsheet_epoch().checked_add_signed(Duration::milliseconds(millis as i64))
}

/// Convert a day count since 1899-12-30 to a calendar date; the time of day
/// is dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    serial_to_datetime(serial).map(|dt| dt.date())
}

pub fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Generic text date parsing; `None` when no known format matches.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    parse_datetime_text(s).map(|dt| dt.date())
}

/// How a whole column is interpreted, decided from its non-empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    DateTime,
    Serial,
    Duration,
    Mixed,
}

pub fn detect_kind<'a, I>(cells: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a Cell>,
{
    let (mut dates, mut numbers, mut durations, mut other) = (0usize, 0usize, 0usize, 0usize);
    for cell in cells {
        match cell {
            c if c.is_empty() => {}
            Cell::DateTime(_) => dates += 1,
            Cell::Duration(_) => durations += 1,
            Cell::Number(_) => numbers += 1,
            Cell::Text(s) if crate::util::parse_f64_safe(Some(s)).is_some() => numbers += 1,
            _ => other += 1,
        }
    }
    match (dates, numbers, durations, other) {
        (d, 0, 0, 0) if d > 0 => ColumnKind::DateTime,
        (0, n, 0, 0) if n > 0 => ColumnKind::Serial,
        (0, 0, u, 0) if u > 0 => ColumnKind::Duration,
        _ => ColumnKind::Mixed,
    }
}

fn coerce_cell(cell: &Cell, kind: ColumnKind) -> Option<NaiveDate> {
    match (kind, cell) {
        (_, c) if c.is_empty() => None,
        (_, Cell::DateTime(dt)) => Some(dt.date()),
        (ColumnKind::Serial, c) => c.as_f64().and_then(serial_to_date),
        (_, Cell::Duration(days)) => serial_to_date(*days),
        (_, Cell::Text(s)) => parse_date_text(s),
        _ => None,
    }
}

/// Coerce a column into calendar dates.
///
/// Pure date-times pass through, all-numeric columns are spreadsheet serials,
/// durations are added to the same epoch, and anything else is parsed as text.
/// Cells that cannot be read become `None`.
pub fn coerce_column<'a, I>(cells: I) -> Vec<Option<NaiveDate>>
where
    I: IntoIterator<Item = &'a Cell> + Clone,
{
    let kind = detect_kind(cells.clone());
    debug!("Coercing date column as {:?}", kind);
    cells.into_iter().map(|c| coerce_cell(c, kind)).collect()
}

/// Like [`coerce_column`], but a column where no non-empty cell could be read
/// is an error: the dashboard cannot run without its date axis.
pub fn coerce_required<'a, I>(name: &str, cells: I) -> Result<Vec<Option<NaiveDate>>, DashboardError>
where
    I: IntoIterator<Item = &'a Cell> + Clone,
{
    let non_empty = cells.clone().into_iter().filter(|c| !c.is_empty()).count();
    let coerced = coerce_column(cells);
    let parsed = coerced.iter().filter(|d| d.is_some()).count();
    if (non_empty > 0 && parsed == 0) || (non_empty == 0 && !coerced.is_empty()) {
        return Err(DashboardError::DateCoercion(name.to_string()));
    }
    if parsed < non_empty {
        warn!(
            "{} value(s) in '{}' could not be read as dates",
            non_empty - parsed,
            name
        );
    }
    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_one_is_last_day_of_1899() {
        assert_eq!(serial_to_date(1.0), Some(ymd(1899, 12, 31)));
        assert_eq!(serial_to_date(0.0), Some(ymd(1899, 12, 30)));
        assert_eq!(serial_to_date(45292.0), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn serial_fraction_is_time_of_day() {
        assert_eq!(serial_to_date(45292.75), Some(ymd(2024, 1, 1)));
        assert_eq!(serial_to_date(f64::NAN), None);
        assert_eq!(serial_to_date(1e12), None);
    }

    #[test]
    fn numeric_column_is_read_as_serials() {
        let cells = vec![Cell::Number(1.0), Cell::Text("45292".into()), Cell::Empty];
        assert_eq!(detect_kind(&cells), ColumnKind::Serial);
        assert_eq!(
            coerce_column(&cells),
            vec![Some(ymd(1899, 12, 31)), Some(ymd(2024, 1, 1)), None]
        );
    }

    #[test]
    fn datetime_column_passes_through() {
        let dt = ymd(2023, 5, 17).and_hms_opt(13, 45, 0).unwrap();
        let cells = vec![Cell::DateTime(dt)];
        assert_eq!(detect_kind(&cells), ColumnKind::DateTime);
        assert_eq!(coerce_column(&cells), vec![Some(ymd(2023, 5, 17))]);
    }

    #[test]
    fn durations_are_added_to_epoch() {
        let cells = vec![Cell::Duration(2.0)];
        assert_eq!(detect_kind(&cells), ColumnKind::Duration);
        assert_eq!(coerce_column(&cells), vec![Some(ymd(1900, 1, 1))]);
    }

    #[test]
    fn invalid_text_becomes_none_and_valid_text_survives() {
        let cells = vec![
            Cell::Text("2024-03-01".into()),
            Cell::Text("not a date".into()),
            Cell::Text("2024-03-05T10:00:00".into()),
        ];
        assert_eq!(
            coerce_column(&cells),
            vec![Some(ymd(2024, 3, 1)), None, Some(ymd(2024, 3, 5))]
        );
    }

    #[test]
    fn text_formats_are_tried_in_order() {
        assert_eq!(parse_date_text("2024/02/29"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date_text("11/08/2016"), Some(ymd(2016, 11, 8)));
        assert_eq!(parse_date_text("25/12/2020"), Some(ymd(2020, 12, 25)));
        assert_eq!(parse_date_text("March 3, 2021"), Some(ymd(2021, 3, 3)));
        assert_eq!(parse_date_text("2021-06-01T08:00:00Z"), Some(ymd(2021, 6, 1)));
        assert_eq!(parse_date_text("soon"), None);
    }

    #[test]
    fn unreadable_required_column_is_fatal() {
        let cells = vec![Cell::Text("tbd".into()), Cell::Text("n/a".into())];
        let err = coerce_required("Order Date", &cells).unwrap_err();
        assert!(matches!(err, DashboardError::DateCoercion(ref c) if c == "Order Date"));
    }

    #[test]
    fn partially_readable_required_column_is_kept() {
        let cells = vec![Cell::Text("2024-01-02".into()), Cell::Text("tbd".into())];
        let dates = coerce_required("Order Date", &cells).unwrap();
        assert_eq!(dates, vec![Some(ymd(2024, 1, 2)), None]);
    }
}
