//! Row-range slicing and conversion to wire arrays

use super::analyzer::DataBlock;
use crate::error::{ExdError, ExdResult};
use crate::types::{CanonicalType, Cell, ValueArray};
use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp layout on the wire: `YYYYMMDDhhmmssffffff`
pub const DATE_FORMAT: &str = "%Y%m%d%H%M%S%6f";

/// Convert rows `[row_start, min(row_start + row_count, total))` of one
/// channel into a typed array.
///
/// A start past the last row is an error; a count running past the end is
/// clamped.
pub fn materialize(
    block: &DataBlock<'_>,
    channel_id: usize,
    row_start: usize,
    row_count: usize,
    canonical_type: CanonicalType,
) -> ExdResult<ValueArray> {
    let total = block.row_count();
    if row_start > total {
        return Err(ExdError::OutOfRange(format!(
            "Channel start index {} out of range!",
            row_start
        )));
    }
    if channel_id >= block.width() {
        return Err(ExdError::OutOfRange(format!(
            "Invalid channel id {}!",
            channel_id
        )));
    }

    let end = row_start.saturating_add(row_count).min(total);
    let column = block.column(channel_id);
    let section = &column[row_start..end];

    Ok(convert(section, canonical_type))
}

/// Convert a column section into the wire array for `canonical_type`.
pub fn convert(section: &[&Cell], canonical_type: CanonicalType) -> ValueArray {
    match canonical_type {
        CanonicalType::Boolean => ValueArray::Boolean(section.iter().map(|c| to_bool(c)).collect()),
        CanonicalType::Byte => ValueArray::Byte(
            section
                .iter()
                .map(|c| c.to_i64().unwrap_or(0) as i8 as u8)
                .collect(),
        ),
        CanonicalType::Short | CanonicalType::Long => ValueArray::Long(
            section
                .iter()
                .map(|c| c.to_i64().unwrap_or(0) as i32)
                .collect(),
        ),
        CanonicalType::LongLong => {
            ValueArray::LongLong(section.iter().map(|c| c.to_i64().unwrap_or(0)).collect())
        }
        CanonicalType::Float => ValueArray::Float(section.iter().map(|c| to_f32(c)).collect()),
        CanonicalType::Double => ValueArray::Double(
            section
                .iter()
                .map(|c| c.to_f64().unwrap_or(f64::NAN))
                .collect(),
        ),
        CanonicalType::Date => ValueArray::String(section.iter().map(|c| format_date(c)).collect()),
        CanonicalType::Complex => ValueArray::Float(
            section
                .iter()
                .flat_map(|c| {
                    let (re, im) = complex_parts(c);
                    [re as f32, im as f32]
                })
                .collect(),
        ),
        CanonicalType::DComplex => ValueArray::Double(
            section
                .iter()
                .flat_map(|c| {
                    let (re, im) = complex_parts(c);
                    [re, im]
                })
                .collect(),
        ),
        CanonicalType::String => ValueArray::String(section.iter().map(|c| c.to_string()).collect()),
        CanonicalType::ByteString => ValueArray::ByteString(section.iter().map(|c| to_bytes(c)).collect()),
    }
}

fn to_bool(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        other => other.to_f64().is_some_and(|v| v != 0.0),
    }
}

fn to_f32(cell: &Cell) -> f32 {
    match cell {
        Cell::Float(v) => *v,
        other => other.to_f64().map_or(f32::NAN, |v| v as f32),
    }
}

/// Format a date cell; time-of-day cells land on 1970-01-01, anything else
/// yields an empty string.
pub fn format_date(cell: &Cell) -> String {
    let datetime: Option<NaiveDateTime> = match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Time(t) => NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(*t)),
        _ => None,
    };
    datetime
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn complex_parts(cell: &Cell) -> (f64, f64) {
    match cell {
        Cell::Complex(c) => (f64::from(c.re), f64::from(c.im)),
        Cell::DComplex(c) => (c.re, c.im),
        other => match other.to_f64() {
            Some(re) => (re, 0.0),
            None => (f64::NAN, f64::NAN),
        },
    }
}

fn to_bytes(cell: &Cell) -> Vec<u8> {
    match cell {
        Cell::Bytes(b) => b.clone(),
        Cell::Empty => Vec::new(),
        other => other.to_string().into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use num_complex::{Complex32, Complex64};

    fn block(rows: &[Vec<Cell>]) -> DataBlock<'_> {
        let width = rows.first().map_or(0, Vec::len);
        DataBlock::new(rows, width)
    }

    fn column(values: Vec<Cell>) -> Vec<Vec<Cell>> {
        values.into_iter().map(|v| vec![v]).collect()
    }

    #[test]
    fn test_double_slice_and_clamp() {
        let rows = column(vec![Cell::Double(1.0), Cell::Double(2.0), Cell::Double(3.0)]);
        let b = block(&rows);
        assert_eq!(
            materialize(&b, 0, 1, 100, CanonicalType::Double).unwrap(),
            ValueArray::Double(vec![2.0, 3.0])
        );
    }

    #[test]
    fn test_start_equal_to_row_count_is_empty() {
        let rows = column(vec![Cell::Double(1.0), Cell::Double(2.0), Cell::Double(3.0)]);
        let b = block(&rows);
        let values = materialize(&b, 0, 3, 10, CanonicalType::Double).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_start_past_row_count_is_out_of_range() {
        let rows = column(vec![Cell::Double(1.0)]);
        let b = block(&rows);
        assert!(matches!(
            materialize(&b, 0, 2, 1, CanonicalType::Double),
            Err(ExdError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_invalid_channel() {
        let rows = column(vec![Cell::Double(1.0)]);
        let b = block(&rows);
        assert!(matches!(
            materialize(&b, 3, 0, 1, CanonicalType::Double),
            Err(ExdError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_huge_count_does_not_overflow() {
        let rows = column(vec![Cell::Double(1.0)]);
        let b = block(&rows);
        assert_eq!(
            materialize(&b, 0, 0, usize::MAX, CanonicalType::Double).unwrap(),
            ValueArray::Double(vec![1.0])
        );
    }

    #[test]
    fn test_complex_interleaved() {
        let cells = [
            Cell::Complex(Complex32::new(1.0, 2.0)),
            Cell::Complex(Complex32::new(3.0, 4.0)),
        ];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            convert(&refs, CanonicalType::Complex),
            ValueArray::Float(vec![1.0, 2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn test_dcomplex_interleaved() {
        let cells = [
            Cell::DComplex(Complex64::new(5.0, 6.0)),
            Cell::DComplex(Complex64::new(7.0, 8.0)),
        ];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            convert(&refs, CanonicalType::DComplex),
            ValueArray::Double(vec![5.0, 6.0, 7.0, 8.0])
        );
    }

    #[test]
    fn test_date_format() {
        let dt = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(11, 22, 33)
            .unwrap();
        assert_eq!(format_date(&Cell::DateTime(dt)), "20230101112233000000");

        let with_ms = NaiveDate::from_ymd_opt(2024, 10, 14)
            .unwrap()
            .and_hms_milli_opt(11, 48, 58, 481)
            .unwrap();
        assert_eq!(format_date(&Cell::DateTime(with_ms)), "20241014114858481000");
    }

    #[test]
    fn test_time_of_day_uses_epoch_date() {
        let t = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert_eq!(format_date(&Cell::Time(t)), "19700101083000000000");
    }

    #[test]
    fn test_blank_date_is_empty_string() {
        assert_eq!(format_date(&Cell::Empty), "");
        assert_eq!(format_date(&Cell::String("x".into())), "");
    }

    #[test]
    fn test_double_coerces_non_numeric_to_nan() {
        let cells = [Cell::String("abc".into()), Cell::String("2.5".into()), Cell::Empty];
        let refs: Vec<&Cell> = cells.iter().collect();
        match convert(&refs, CanonicalType::Double) {
            ValueArray::Double(v) => {
                assert!(v[0].is_nan());
                assert_eq!(v[1], 2.5);
                assert!(v[2].is_nan());
            }
            other => panic!("expected double array, got {:?}", other),
        }
    }

    #[test]
    fn test_longlong_coerces_to_zero() {
        let cells = [Cell::LongLong(7), Cell::String("x".into()), Cell::Empty];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            convert(&refs, CanonicalType::LongLong),
            ValueArray::LongLong(vec![7, 0, 0])
        );
    }

    #[test]
    fn test_short_and_long_share_wire_width() {
        let cells = [Cell::Short(-2), Cell::Short(4)];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(convert(&refs, CanonicalType::Short), ValueArray::Long(vec![-2, 4]));
        assert_eq!(convert(&refs, CanonicalType::Long), ValueArray::Long(vec![-2, 4]));
    }

    #[test]
    fn test_byte_is_raw() {
        let cells = [Cell::Byte(-2), Cell::Byte(4)];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(convert(&refs, CanonicalType::Byte), ValueArray::Byte(vec![0xFE, 4]));
    }

    #[test]
    fn test_strings_and_booleans() {
        let cells = [Cell::String("abc".into()), Cell::Empty];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            convert(&refs, CanonicalType::String),
            ValueArray::String(vec!["abc".to_string(), String::new()])
        );

        let flags = [Cell::Bool(true), Cell::Bool(false)];
        let refs: Vec<&Cell> = flags.iter().collect();
        assert_eq!(
            convert(&refs, CanonicalType::Boolean),
            ValueArray::Boolean(vec![true, false])
        );
    }

    #[test]
    fn test_byte_strings() {
        let cells = [Cell::Bytes(vec![1, 2]), Cell::Empty];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            convert(&refs, CanonicalType::ByteString),
            ValueArray::ByteString(vec![vec![1, 2], vec![]])
        );
    }
}
