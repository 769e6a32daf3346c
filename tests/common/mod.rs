#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::{tempdir, TempDir};

/// A spreadsheet cell for fixture building.
pub enum Value<'a> {
    Text(&'a str),
    Number(f64),
    /// Date cell (year, month, day) with a date number format.
    Date(u16, u8, u8),
    Blank,
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a single-sheet workbook with `headers` in the first row.
    pub fn write_xlsx(&self, name: &str, headers: &[&str], rows: &[Vec<Value>]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_string(0, col as u16, *header)
                .expect("write header");
        }
        for (r, row) in rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, value) in row.iter().enumerate() {
                let c = c as u16;
                match value {
                    Value::Text(s) => {
                        sheet.write_string(r, c, *s).expect("write text");
                    }
                    Value::Number(n) => {
                        sheet.write_number(r, c, *n).expect("write number");
                    }
                    Value::Date(y, m, d) => {
                        let date = ExcelDateTime::from_ymd(*y, *m, *d).expect("valid date");
                        sheet
                            .write_datetime_with_format(r, c, &date, &date_format)
                            .expect("write date");
                    }
                    Value::Blank => {}
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}
