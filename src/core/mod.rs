//! Structure inference and typed extraction engine

pub mod analyzer;
pub mod classifier;
pub mod inference;
pub mod materializer;

pub use analyzer::{find_stable_boundary, split_sheet, DataBlock, SheetLayout};
pub use classifier::{classify, ColumnAnnotations, MetadataLabel};
pub use inference::{infer_canonical_type, is_monotonic_non_decreasing};
pub use materializer::materialize;
