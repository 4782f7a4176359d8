//! Grid access layer
//!
//! The file-reading collaborators: something that lists and reads sheets
//! ([`SheetSource`]), something that opens one from a local path
//! ([`SourceOpener`]), and something that turns an identifier URL into that
//! path ([`PathResolver`]).

mod calamine_source;
mod resolver;

pub use calamine_source::{CalamineOpener, CalamineSource};
pub use resolver::FileUrlResolver;

use crate::error::{ExdError, ExdResult};
use crate::types::Cell;
use std::path::{Path, PathBuf};

/// One sheet as read from the file: a header row naming the columns and the
/// raw rows below it, each padded to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Build a sheet from a header and rows, padding short rows with blanks.
    pub fn new(name: impl Into<String>, header: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        let mut header = header;
        while header.len() < width {
            header.push(unnamed_column(header.len()));
        }
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Column name used when the header cell is blank.
pub fn unnamed_column(index: usize) -> String {
    format!("Unnamed: {}", index)
}

/// An opened workbook.
pub trait SheetSource: Send {
    /// Sheet names in file order
    fn sheet_names(&self) -> &[String];

    /// Read one sheet by zero-based index.
    fn read_sheet(&mut self, index: usize) -> ExdResult<Sheet>;

    /// Release the underlying file.
    fn close(self: Box<Self>) {}
}

/// Opens a [`SheetSource`] for a local file.
pub trait SourceOpener: Send + Sync {
    fn open(&self, path: &Path) -> ExdResult<Box<dyn SheetSource>>;
}

/// Maps an identifier URL to a local file path.
pub trait PathResolver: Send + Sync {
    fn resolve_to_local_path(&self, url: &str) -> ExdResult<PathBuf>;
}

/// Sheets held in memory. Used for grids that were built elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    names: Vec<String>,
    sheets: Vec<Sheet>,
}

impl MemorySource {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self {
            names: sheets.iter().map(|s| s.name.clone()).collect(),
            sheets,
        }
    }
}

impl SheetSource for MemorySource {
    fn sheet_names(&self) -> &[String] {
        &self.names
    }

    fn read_sheet(&mut self, index: usize) -> ExdResult<Sheet> {
        self.sheets
            .get(index)
            .cloned()
            .ok_or_else(|| ExdError::OutOfRange(format!("Invalid group id {}!", index)))
    }
}
