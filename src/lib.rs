//! exd-sheets - spreadsheet reader with automatic structure inference
//!
//! Exposes spreadsheet files (xlsx, xlsm, xlsb, xls, ods) as a
//! file → group → channel hierarchy. Each sheet becomes a group. Each
//! column of the sheet's data block becomes a channel with an inferred
//! value type, and optionally a unit and a description read from the rows
//! above the data.
//!
//! # Features
//!
//! - Stable-row detection separating metadata rows from data rows
//! - Unit/description classification of metadata rows
//! - Column type inference into a closed set of canonical types
//! - Typed, row-sliced value extraction
//! - Reference-counted sessions shared across handles
//! - HTTP JSON API (`exd-server`) and a command-line inspector (`exd-sheets`)
//!
//! # Example
//!
//! ```no_run
//! use exd_sheets::reader::ExternalDataReader;
//! use exd_sheets::types::{Identifier, StructureRequest};
//!
//! let reader = ExternalDataReader::default();
//! let handle = reader.open(&Identifier::new("file:///data/measurement.xlsx"))?;
//! let structure = reader.get_structure(&StructureRequest::new(handle.clone()))?;
//!
//! for group in &structure.groups {
//!     println!("{}: {} rows", group.name, group.number_of_rows);
//! }
//!
//! reader.close(&handle)?;
//! # Ok::<(), exd_sheets::error::ExdError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod grid;
pub mod reader;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{ExdError, ExdResult};
pub use reader::ExternalDataReader;
pub use types::{CanonicalType, Cell, Handle, Identifier, ValueArray};
