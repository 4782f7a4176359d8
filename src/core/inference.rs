//! Column type inference
//!
//! A data-block column is first reduced to one observed kind, the way a
//! columnar reader settles on a column dtype, and the observed kind is then
//! mapped to a [`CanonicalType`] with a fixed priority.

use crate::error::{ExdError, ExdResult};
use crate::types::{CanonicalType, Cell};
use std::cmp::Ordering;

/// Storage kind a whole column settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedKind {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    DateTime,
    Bytes,
    /// No single storage kind fits
    Mixed,
}

#[derive(Debug, Default)]
struct KindCounts {
    blank: usize,
    boolean: usize,
    int8: usize,
    int16: usize,
    int32: usize,
    int64: usize,
    float32: usize,
    float64: usize,
    complex64: usize,
    complex128: usize,
    datetime: usize,
    bytes: usize,
    other: usize,
}

impl KindCounts {
    fn tally<'a, I: IntoIterator<Item = &'a Cell>>(cells: I) -> Self {
        let mut counts = Self::default();
        for cell in cells {
            match cell {
                Cell::Empty => counts.blank += 1,
                Cell::Bool(_) => counts.boolean += 1,
                Cell::Byte(_) => counts.int8 += 1,
                Cell::Short(_) => counts.int16 += 1,
                Cell::Long(_) => counts.int32 += 1,
                Cell::LongLong(_) => counts.int64 += 1,
                Cell::Float(_) => counts.float32 += 1,
                Cell::Double(_) => counts.float64 += 1,
                Cell::Complex(_) => counts.complex64 += 1,
                Cell::DComplex(_) => counts.complex128 += 1,
                Cell::DateTime(_) => counts.datetime += 1,
                Cell::Bytes(_) => counts.bytes += 1,
                Cell::Time(_) | Cell::String(_) => counts.other += 1,
            }
        }
        counts
    }

    fn integers(&self) -> usize {
        self.int8 + self.int16 + self.int32 + self.int64
    }

    fn non_blank(&self) -> usize {
        self.integers()
            + self.boolean
            + self.float32
            + self.float64
            + self.complex64
            + self.complex128
            + self.datetime
            + self.bytes
            + self.other
    }
}

/// Reduce a column to its observed kind.
///
/// Integers only keep their width when the column has no blanks; a blank
/// forces a float column. Booleans and raw bytes likewise need a full
/// column. Floats, complex numbers and dates tolerate blanks.
pub fn observe_column<'a, I: IntoIterator<Item = &'a Cell>>(cells: I) -> ObservedKind {
    let counts = KindCounts::tally(cells);
    let non_blank = counts.non_blank();
    let integers = counts.integers();
    let no_blanks = counts.blank == 0;

    if non_blank == 0 {
        return ObservedKind::Mixed;
    }
    if counts.boolean == non_blank {
        return if no_blanks {
            ObservedKind::Boolean
        } else {
            ObservedKind::Mixed
        };
    }
    if integers == non_blank {
        if !no_blanks {
            return ObservedKind::Float64;
        }
        return if counts.int64 > 0 {
            ObservedKind::Int64
        } else if counts.int32 > 0 {
            ObservedKind::Int32
        } else if counts.int16 > 0 {
            ObservedKind::Int16
        } else {
            ObservedKind::Int8
        };
    }
    if counts.float32 == non_blank {
        return ObservedKind::Float32;
    }
    if integers + counts.float32 + counts.float64 == non_blank {
        return ObservedKind::Float64;
    }
    if counts.complex64 == non_blank {
        return ObservedKind::Complex64;
    }
    if counts.complex64 + counts.complex128 == non_blank {
        return ObservedKind::Complex128;
    }
    if counts.datetime == non_blank {
        return ObservedKind::DateTime;
    }
    if counts.bytes == non_blank && no_blanks {
        return ObservedKind::Bytes;
    }
    ObservedKind::Mixed
}

/// Canonical type of a data-block column.
///
/// 64-bit integers widen to `Double`; values beyond 2^53 lose precision.
pub fn infer_canonical_type(cells: &[&Cell]) -> ExdResult<CanonicalType> {
    if cells.is_empty() {
        return Err(ExdError::TypeInference(
            "column has no data rows".to_string(),
        ));
    }

    let canonical = match observe_column(cells.iter().copied()) {
        ObservedKind::Boolean => CanonicalType::Boolean,
        ObservedKind::Int8 => CanonicalType::Byte,
        ObservedKind::Int16 => CanonicalType::Short,
        ObservedKind::Int32 => CanonicalType::Long,
        ObservedKind::Int64 => CanonicalType::Double,
        ObservedKind::Float32 => CanonicalType::Float,
        ObservedKind::Float64 => CanonicalType::Double,
        ObservedKind::Complex64 => CanonicalType::Complex,
        ObservedKind::Complex128 => CanonicalType::DComplex,
        ObservedKind::DateTime => CanonicalType::Date,
        ObservedKind::Bytes => CanonicalType::ByteString,
        ObservedKind::Mixed => {
            match cells.iter().find(|cell| !cell.is_blank()) {
                Some(Cell::Time(_)) => CanonicalType::Date,
                Some(Cell::String(_)) => CanonicalType::String,
                Some(cell) if cell.is_integer() => CanonicalType::LongLong,
                Some(cell) => {
                    return Err(ExdError::TypeInference(format!(
                        "unsupported mixed column starting with {:?}",
                        cell
                    )))
                }
                None => {
                    return Err(ExdError::TypeInference(
                        "column holds only blank cells".to_string(),
                    ))
                }
            }
        }
    };
    Ok(canonical)
}

fn compare_cells(a: &Cell, b: &Cell) -> Option<Ordering> {
    match (a, b) {
        (Cell::DateTime(x), Cell::DateTime(y)) => Some(x.cmp(y)),
        (Cell::Time(x), Cell::Time(y)) => Some(x.cmp(y)),
        (Cell::String(x), Cell::String(y)) => Some(x.cmp(y)),
        (x, y) if x.is_number() && y.is_number() => x.to_f64()?.partial_cmp(&y.to_f64()?),
        _ => None,
    }
}

/// True when the column is non-decreasing and every pair of neighbours is
/// comparable. Blank cells and NaN break monotonicity.
pub fn is_monotonic_non_decreasing(cells: &[&Cell]) -> bool {
    cells.iter().all(|cell| !cell.is_blank())
        && cells.windows(2).all(|pair| {
            matches!(
                compare_cells(pair[0], pair[1]),
                Some(Ordering::Less | Ordering::Equal)
            )
        })
}
