// Raw spreadsheet access.
//
// Reads the first worksheet of a workbook (or a CSV file) into a header row
// plus rows of typed cells. No column names are interpreted here.
use crate::dates;
use crate::error::DashboardError;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use log::debug;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// One spreadsheet cell after reading, before any column typing.
#[derive(Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    /// Duration in (fractional) days.
    Duration(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell; numeric text counts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => crate::util::parse_f64_safe(Some(s)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Number(n) => Some(n.round() as i64),
            Cell::Text(s) => crate::util::parse_i64_safe(Some(s)),
            _ => None,
        }
    }

    /// Text view of the cell, trimmed. Whole numbers print without `.0`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Duration(d) => format!("{}", d),
        }
    }
}

// Rows are deduplicated by full equality, so floats compare by bit pattern.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Empty, Cell::Empty) => true,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => a.to_bits() == b.to_bits(),
            (Cell::DateTime(a), Cell::DateTime(b)) => a == b,
            (Cell::Duration(a), Cell::Duration(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Empty => {}
            Cell::Text(s) => s.hash(state),
            Cell::Number(n) | Cell::Duration(n) => n.to_bits().hash(state),
            Cell::DateTime(dt) => dt.hash(state),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Text(b.to_string()),
            // calamine applies the workbook's 1900/1904 date system here.
            Data::DateTime(dt) => {
                if dt.is_duration() {
                    match dt.as_duration() {
                        Some(d) => Cell::Duration(d.num_milliseconds() as f64 / 86_400_000.0),
                        None => Cell::Number(dt.as_f64()),
                    }
                } else {
                    match dt.as_datetime() {
                        Some(v) => Cell::DateTime(v),
                        None => Cell::Number(dt.as_f64()),
                    }
                }
            }
            Data::DateTimeIso(s) => match dates::parse_datetime_text(s) {
                Some(v) => Cell::DateTime(v),
                None => Cell::Text(s.clone()),
            },
            Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// Header row plus data rows; every row is padded to the header width.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + Clone + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }
}

/// Read the source file into a [`RawTable`], choosing the reader by extension.
pub fn read_table(path: &Path) -> Result<RawTable, DashboardError> {
    if !path.exists() {
        return Err(DashboardError::FileNotFound(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        _ => Err(DashboardError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read_workbook(path: &Path) -> Result<RawTable, DashboardError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::EmptySheet(path.to_path_buf()))??;

    let mut row_iter = range.rows();
    let header_row = row_iter
        .next()
        .ok_or_else(|| DashboardError::EmptySheet(path.to_path_buf()))?;
    let headers: Vec<String> = header_row.iter().map(|c| Cell::from(c).as_text()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::EmptySheet(path.to_path_buf()));
    }

    let rows: Vec<Vec<Cell>> = row_iter
        .map(|row| row.iter().map(Cell::from).collect::<Vec<_>>())
        .filter(|row: &Vec<Cell>| !row.iter().all(Cell::is_empty))
        .collect();
    debug!("Read {} rows from workbook {}", rows.len(), path.display());
    Ok(RawTable::new(headers, rows))
}

fn read_csv(path: &Path) -> Result<RawTable, DashboardError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DashboardError::EmptySheet(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Vec<Cell> = record
            .iter()
            .map(|v| {
                if v.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }
    debug!("Read {} rows from CSV {}", rows.len(), path.display());
    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;

    #[test]
    fn rows_are_padded_to_header_width() {
        let table = RawTable::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![vec![Cell::Text("x".into())]],
        );
        assert_eq!(table.rows[0].len(), 3);
        assert!(table.rows[0][2].is_empty());
    }

    #[test]
    fn whole_numbers_print_without_fraction() {
        assert_eq!(Cell::Number(42.0).as_text(), "42");
        assert_eq!(Cell::Number(2.5).as_text(), "2.5");
        assert_eq!(Cell::Text("  CA-1 ".into()).as_text(), "CA-1");
    }

    #[test]
    fn numeric_text_reads_as_number() {
        assert_eq!(Cell::Text("1,200.50".into()).as_f64(), Some(1200.5));
        assert_eq!(Cell::Number(3.0).as_i64(), Some(3));
        assert_eq!(Cell::Text("West".into()).as_f64(), None);
    }

    #[test]
    fn cells_compare_by_value() {
        assert_eq!(Cell::Number(1.5), Cell::Number(1.5));
        assert_ne!(Cell::Number(1.0), Cell::Text("1".into()));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_table(Path::new("does/not/exist.xlsx")).unwrap_err();
        assert!(matches!(err, DashboardError::FileNotFound(_)));
    }

    #[test]
    fn calamine_cells_convert() {
        let cell = Cell::from(&Data::Float(2.0));
        assert_eq!(cell, Cell::Number(2.0));
        let cell = Cell::from(&Data::Empty);
        assert!(cell.is_empty());
    }

    #[test]
    fn date_cells_follow_the_workbook_epoch() {
        let base_1900 = ExcelDateTime::new(45351.0, ExcelDateTimeType::DateTime, false);
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::from(&Data::DateTime(base_1900)), Cell::DateTime(expected));

        let base_1904 = ExcelDateTime::new(0.0, ExcelDateTimeType::DateTime, true);
        let expected = NaiveDate::from_ymd_opt(1904, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::from(&Data::DateTime(base_1904)), Cell::DateTime(expected));
    }

    #[test]
    fn time_delta_cells_become_day_durations() {
        let delta = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(Cell::from(&Data::DateTime(delta)), Cell::Duration(1.5));
    }
}
