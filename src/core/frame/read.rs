use std::path::Path;

use chrono::NaiveDate;

use crate::{Frame, FrameError, Index};

/// Parse a daily index cell such as `2023-01-03` or `2023-01-03 00:00:00-05:00`.
///
/// Cells with a time other than midnight are not dates; intraday rows keep
/// their full text as labels.
fn parse_index_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    let date = NaiveDate::parse_from_str(cell.get(..10)?, "%Y-%m-%d").ok()?;

    let time = cell.get(10..)?.trim_start_matches([' ', 'T']);
    let Some(offset) = time.strip_prefix("00:00:00") else {
        return time.is_empty().then_some(date);
    };
    (offset.is_empty() || offset.starts_with(['+', '-', 'Z'])).then_some(date)
}

/// Read a CSV file with a header row into a [`Frame`].
///
/// The first column becomes the index: dates when every cell parses as a
/// date, text labels otherwise. All other columns are numeric; empty or
/// unparseable cells become `NaN`.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Frame, FrameError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.len() < 2 {
        return Err(FrameError::NoColumns);
    }

    let mut index_cells = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); headers.len() - 1];
    let mut unparsed = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(FrameError::Parse {
                line: row + 2,
                reason: format!("expected {} fields, found {}", headers.len(), record.len()),
            });
        }

        index_cells.push(record[0].trim().to_string());
        for (col, cell) in record.iter().skip(1).enumerate() {
            let cell = cell.trim();
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>().unwrap_or_else(|_| {
                    unparsed += 1;
                    f64::NAN
                })
            };
            values[col].push(value);
        }
    }

    if index_cells.is_empty() {
        return Err(FrameError::Empty);
    }
    if unparsed > 0 {
        log::warn!("{} non-numeric cells read as NaN in {}", unparsed, path.as_ref().display());
    }

    let dates: Option<Vec<NaiveDate>> = index_cells.iter().map(|c| parse_index_date(c)).collect();
    let index = match dates {
        Some(dates) => Index::Dates(dates),
        None => Index::Labels(index_cells),
    };

    let columns = headers.into_iter().skip(1).zip(values).collect();
    Frame::from_columns(index, columns)
}
