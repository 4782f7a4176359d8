//! Stable-type-row detection
//!
//! Splits a sheet's raw rows into a leading metadata block (titles, units,
//! descriptions) and the homogeneous data block below it. The data block
//! starts at the first of two consecutive non-blank rows whose cell-kind
//! signatures are equal and not all strings.

use crate::error::{ExdError, ExdResult};
use crate::grid::Sheet;
use crate::types::Cell;
use tracing::debug;

static EMPTY_CELL: Cell = Cell::Empty;

/// Cell kind used when comparing row signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    Numeric,
    Boolean,
    String,
    DateTime,
    Time,
    Complex,
    Bytes,
}

/// Normalize a cell to its comparison kind.
///
/// Every integer width and every float width collapses to `Numeric`, so a
/// column holding `1` in one row and `1.5` in the next still matches. A blank
/// cell inside a non-blank row is a missing number and also reads as
/// `Numeric`.
pub fn comparison_kind(cell: &Cell) -> ComparisonKind {
    match cell {
        Cell::Empty
        | Cell::Byte(_)
        | Cell::Short(_)
        | Cell::Long(_)
        | Cell::LongLong(_)
        | Cell::Float(_)
        | Cell::Double(_) => ComparisonKind::Numeric,
        Cell::Bool(_) => ComparisonKind::Boolean,
        Cell::String(_) => ComparisonKind::String,
        Cell::DateTime(_) => ComparisonKind::DateTime,
        Cell::Time(_) => ComparisonKind::Time,
        Cell::Complex(_) | Cell::DComplex(_) => ComparisonKind::Complex,
        Cell::Bytes(_) => ComparisonKind::Bytes,
    }
}

/// Signature of a row, or `None` when every cell is blank.
pub fn row_signature(row: &[Cell]) -> Option<Vec<ComparisonKind>> {
    if row.iter().all(Cell::is_blank) {
        return None;
    }
    Some(row.iter().map(comparison_kind).collect())
}

/// Index of the first data row, or `None` when no two consecutive rows agree.
pub fn find_stable_boundary(rows: &[Vec<Cell>]) -> Option<usize> {
    let mut previous: Option<Vec<ComparisonKind>> = None;

    for (index, row) in rows.iter().enumerate() {
        let Some(current) = row_signature(row) else {
            // blank row: section break
            previous = None;
            continue;
        };

        if previous.as_ref() == Some(&current) {
            if current.iter().any(|kind| *kind != ComparisonKind::String) {
                return Some(index - 1);
            }
        } else {
            previous = Some(current);
        }
    }

    None
}

/// Rows from the stable boundary onward, re-indexed from zero.
#[derive(Debug, Clone, Copy)]
pub struct DataBlock<'a> {
    rows: &'a [Vec<Cell>],
    width: usize,
}

impl<'a> DataBlock<'a> {
    pub fn new(rows: &'a [Vec<Cell>], width: usize) -> Self {
        Self { rows, width }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &'a [Vec<Cell>] {
        self.rows
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, channel_id: usize) -> Vec<&'a Cell> {
        self.rows
            .iter()
            .map(|row| row.get(channel_id).unwrap_or(&EMPTY_CELL))
            .collect()
    }
}

/// A sheet split at its stable boundary.
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout<'a> {
    pub boundary: usize,
    pub metadata: &'a [Vec<Cell>],
    pub data: DataBlock<'a>,
}

/// Split a sheet into metadata and data blocks.
///
/// A sheet without a stable boundary has no usable data block and fails
/// with `OutOfRange`.
pub fn split_sheet(sheet: &Sheet) -> ExdResult<SheetLayout<'_>> {
    let boundary = find_stable_boundary(&sheet.rows).ok_or_else(|| {
        ExdError::OutOfRange(format!("No stable row found in sheet {}!", sheet.name))
    })?;
    debug!(sheet = %sheet.name, boundary, rows = sheet.height(), "found stable boundary");

    let (metadata, data) = sheet.rows.split_at(boundary);
    Ok(SheetLayout {
        boundary,
        metadata,
        data: DataBlock::new(data, sheet.width()),
    })
}
