use crate::error::ForelResult;
use csv::{ReaderBuilder, StringRecord};
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A delimited file with a header row, kept as raw text.
///
/// Numeric conversion happens later, only for the columns a
/// [`crate::distances::FeatureSpace`] selects.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Reads a delimited file from disk.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> ForelResult<Self> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_reader(file, delimiter)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.headers.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> ForelResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Raw text of a cell; short rows read as blank.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or("")
    }
}

/// Parses a numeric cell: the first comma is read as the decimal separator
/// and blanks become zero. Returns `None` when the text is not a finite
/// number, so `NaN` and `inf` cells are treated like any other non-numeric text.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
