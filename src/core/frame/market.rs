use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;

use crate::{Frame, FrameError, Index};

fn parse_err(line: usize, reason: impl Into<String>) -> FrameError {
    FrameError::Parse {
        line,
        reason: reason.into(),
    }
}

/// Split a `YYYYMMDD ...` line into its date and the remaining fields.
fn split_dated_line(line: &str, line_num: usize) -> Result<(NaiveDate, Vec<&str>), FrameError> {
    if line.len() < 8 {
        return Err(parse_err(line_num, "line too short"));
    }

    let (Some(date_str), Some(rest)) = (line.get(..8), line.get(8..)) else {
        return Err(parse_err(line_num, "invalid date"));
    };
    if !date_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(parse_err(line_num, "invalid date"));
    }
    let date = NaiveDate::parse_from_str(date_str, "%Y%m%d")
        .map_err(|e| parse_err(line_num, format!("invalid date {}: {}", date_str, e)))?;

    let fields = rest
        .split([' ', '\t', ','])
        .filter(|s| !s.is_empty())
        .collect();

    Ok((date, fields))
}

fn parse_price(field: &str, what: &str, line_num: usize) -> Result<f64, FrameError> {
    field
        .parse::<f64>()
        .map_err(|_| parse_err(line_num, format!("invalid {} '{}'", what, field)))
}

/// Read a market history file with one price per line (`YYYYMMDD Price`).
///
/// The prices land in a `Close` column of a date-indexed frame.
pub fn read_price_file<P: AsRef<Path>>(filename: P) -> Result<Frame, FrameError> {
    let reader = BufReader::new(File::open(filename.as_ref())?);
    let mut dates = Vec::new();
    let mut close = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        let (date, fields) = split_dated_line(&line, line_num + 1)?;
        let price_str = fields
            .first()
            .ok_or_else(|| parse_err(line_num + 1, "no price found"))?;
        let price = parse_price(price_str, "price", line_num + 1)?;
        if price <= 0.0 {
            return Err(parse_err(line_num + 1, "non-positive price"));
        }

        dates.push(date);
        close.push(price);
    }

    if close.is_empty() {
        return Err(FrameError::Empty);
    }

    Frame::new(Index::Dates(dates)).with_column("Close", close)
}

/// Read a market history file in `YYYYMMDD Open High Low Close [Volume]` format.
///
/// Prices are kept raw. A `Volume` column is produced only when every line
/// carries a fifth field.
pub fn read_ohlc_file<P: AsRef<Path>>(filename: P) -> Result<Frame, FrameError> {
    let reader = BufReader::new(File::open(filename.as_ref())?);
    let mut dates = Vec::new();
    let mut open = Vec::new();
    let mut high = Vec::new();
    let mut low = Vec::new();
    let mut close = Vec::new();
    let mut volume = Vec::new();
    let mut volume_complete = true;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        let line_num = line_num + 1;
        let (date, parts) = split_dated_line(&line, line_num)?;
        if parts.len() < 4 {
            return Err(parse_err(line_num, "insufficient price data"));
        }

        let o = parse_price(parts[0], "open price", line_num)?;
        let h = parse_price(parts[1], "high price", line_num)?;
        let l = parse_price(parts[2], "low price", line_num)?;
        let c = parse_price(parts[3], "close price", line_num)?;

        if l > o || l > c || h < o || h < c {
            return Err(parse_err(line_num, "invalid open/high/low/close relationship"));
        }
        if o <= 0.0 || h <= 0.0 || l <= 0.0 || c <= 0.0 {
            return Err(parse_err(line_num, "non-positive price"));
        }

        match parts.get(4) {
            Some(v) => volume.push(parse_price(v, "volume", line_num)?),
            None => volume_complete = false,
        }

        dates.push(date);
        open.push(o);
        high.push(h);
        low.push(l);
        close.push(c);
    }

    if open.is_empty() {
        return Err(FrameError::Empty);
    }

    let mut frame = Frame::new(Index::Dates(dates))
        .with_column("Open", open)?
        .with_column("High", high)?
        .with_column("Low", low)?
        .with_column("Close", close)?;

    if volume_complete {
        frame.insert_column("Volume", volume)?;
    } else if !volume.is_empty() {
        log::warn!("volume present on only some lines, dropping Volume column");
    }

    log::debug!("read {} bars from {}", frame.len(), filename.as_ref().display());
    Ok(frame)
}
