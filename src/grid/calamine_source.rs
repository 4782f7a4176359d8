//! calamine-backed sheet source (.xlsx, .xlsm, .xlsb, .xls, .ods)

use super::{unnamed_column, Sheet, SheetSource, SourceOpener};
use crate::error::{ExdError, ExdResult};
use crate::types::Cell;
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Opens workbooks with calamine's format auto-detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineOpener;

impl SourceOpener for CalamineOpener {
    fn open(&self, path: &Path) -> ExdResult<Box<dyn SheetSource>> {
        Ok(Box::new(CalamineSource::open(path)?))
    }
}

/// An opened workbook
pub struct CalamineSource {
    workbook: Sheets<BufReader<File>>,
    names: Vec<String>,
}

impl CalamineSource {
    pub fn open<P: AsRef<Path>>(path: P) -> ExdResult<Self> {
        let path = path.as_ref();
        let workbook = open_workbook_auto(path).map_err(|e| {
            ExdError::NotFound(format!(
                "Failed to open workbook \"{}\": {}",
                path.display(),
                e
            ))
        })?;
        let names = workbook.sheet_names().to_vec();
        debug!(path = %path.display(), sheets = names.len(), "opened workbook");
        Ok(Self { workbook, names })
    }
}

impl SheetSource for CalamineSource {
    fn sheet_names(&self) -> &[String] {
        &self.names
    }

    fn read_sheet(&mut self, index: usize) -> ExdResult<Sheet> {
        let name = self
            .names
            .get(index)
            .cloned()
            .ok_or_else(|| ExdError::OutOfRange(format!("Invalid group id {}!", index)))?;
        let range = self
            .workbook
            .worksheet_range_at(index)
            .ok_or_else(|| ExdError::OutOfRange(format!("Invalid group id {}!", index)))??;
        Ok(range_to_sheet(name, &range))
    }
}

/// Split a worksheet range into header names and typed rows
fn range_to_sheet(name: String, range: &Range<Data>) -> Sheet {
    let mut rows = range.rows();
    let header = match rows.next() {
        Some(first) => header_names(first),
        None => Vec::new(),
    };
    let rows = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    Sheet::new(name, header, rows)
}

/// Column names from the first row. Blank cells become `Unnamed: N` and
/// repeated names get a `.1`, `.2`, ... suffix.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    row.iter()
        .enumerate()
        .map(|(col, cell)| {
            let base = match cell {
                Data::Empty => unnamed_column(col),
                Data::String(s) if s.trim().is_empty() => unnamed_column(col),
                Data::String(s) => s.clone(),
                other => convert_cell(other).to_string(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::String(s.clone()),
        Data::Int(i) => Cell::LongLong(*i),
        Data::Float(f) => float_cell(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => excel_datetime_to_cell(dt),
        Data::DateTimeIso(s) => parse_iso_datetime(s),
        Data::DurationIso(s) => Cell::String(s.clone()),
        // error cells keep their display text (#DIV/0!, #N/A, ...)
        other => Cell::String(other.to_string()),
    }
}

/// xlsx stores every number as a float; whole numbers read back as integers.
fn float_cell(f: f64) -> Cell {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Cell::LongLong(f as i64)
    } else {
        Cell::Double(f)
    }
}

/// Decode a date/time cell with millisecond resolution.
///
/// Serials below one day carry only a time of day in either date system.
/// Elapsed-time cells (`[h]:mm`) are durations, not dates, and become
/// `h:mm:ss` text.
fn excel_datetime_to_cell(dt: &ExcelDateTime) -> Cell {
    let serial = dt.as_f64();
    if !serial.is_finite() {
        return Cell::Double(serial);
    }
    if dt.is_duration() {
        return duration_text(serial);
    }
    if serial >= 0.0 {
        let total_ms = (serial * MS_PER_DAY).round() as i64;
        if total_ms < MS_PER_DAY as i64 {
            if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(
                (total_ms / 1000) as u32,
                ((total_ms % 1000) * 1_000_000) as u32,
            ) {
                return Cell::Time(time);
            }
        }
    }
    match dt.as_datetime() {
        Some(value) => Cell::DateTime(round_to_millis(value)),
        None => Cell::Double(serial),
    }
}

fn round_to_millis(value: NaiveDateTime) -> NaiveDateTime {
    let sub_ms = i64::from(value.nanosecond() % 1_000_000);
    let truncated = value
        .checked_sub_signed(Duration::nanoseconds(sub_ms))
        .unwrap_or(value);
    if sub_ms >= 500_000 {
        truncated
            .checked_add_signed(Duration::milliseconds(1))
            .unwrap_or(truncated)
    } else {
        truncated
    }
}

fn duration_text(serial_days: f64) -> Cell {
    let total_ms = (serial_days * MS_PER_DAY).round() as i64;
    let sign = if total_ms < 0 { "-" } else { "" };
    let ms = total_ms.unsigned_abs();
    let hours = ms / 3_600_000;
    let minutes = ms % 3_600_000 / 60_000;
    let seconds = ms % 60_000 / 1000;
    let millis = ms % 1000;
    let text = if millis == 0 {
        format!("{}{}:{:02}:{:02}", sign, hours, minutes, seconds)
    } else {
        format!("{}{}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, millis)
    };
    Cell::String(text)
}

fn parse_iso_datetime(raw: &str) -> Cell {
    let s = raw.trim().trim_end_matches('Z');
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Cell::DateTime(dt);
    }
    if let Some(dt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Cell::DateTime(dt);
    }
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S%.f") {
        return Cell::Time(t);
    }
    Cell::String(raw.to_string())
}
