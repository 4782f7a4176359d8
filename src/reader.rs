//! External-data reader operations
//!
//! Open / Close / GetStructure / GetValues / GetValuesEx over spreadsheet
//! files. Sheets are re-read and re-split on every call, so a structure
//! response and a later values response for the same handle always agree
//! on where the data block starts.

use crate::core::{
    infer_canonical_type, is_monotonic_non_decreasing, materialize, split_sheet,
    ColumnAnnotations,
};
use crate::error::{ExdError, ExdResult};
use crate::grid::Sheet;
use crate::session::SessionRegistry;
use crate::types::{
    Channel, Group, Handle, Identifier, StructureRequest, StructureResult, ValueSlice,
    ValuesExRequest, ValuesRequest, ValuesResult,
};
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// Serves the reader operations for any number of concurrent callers.
#[derive(Default)]
pub struct ExternalDataReader {
    registry: SessionRegistry,
}

impl ExternalDataReader {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Open a resource and return a fresh handle for it.
    pub fn open(&self, identifier: &Identifier) -> ExdResult<Handle> {
        let handle = self.registry.open(identifier)?;
        info!(handle = %handle.id, url = %identifier.url, "open");
        Ok(handle)
    }

    /// Release a handle. Closing the same handle twice is an error.
    pub fn close(&self, handle: &Handle) -> ExdResult<()> {
        self.registry.close(handle)?;
        info!(handle = %handle.id, "close");
        Ok(())
    }

    /// Full file → sheet → column hierarchy.
    pub fn get_structure(&self, request: &StructureRequest) -> ExdResult<StructureResult> {
        if request.is_filtered() {
            warn!(handle = %request.handle.id, "rejected filtered structure request");
            return Err(ExdError::Unimplemented(
                "Structure filtering is not supported.".to_string(),
            ));
        }

        let (identifier, session) = self.registry.resolve(&request.handle)?;
        let groups = session.with_source(|source| {
            let sheet_count = source.sheet_names().len();
            (0..sheet_count)
                .map(|index| {
                    let sheet = source.read_sheet(index)?;
                    build_group(index, &sheet)
                })
                .collect::<ExdResult<Vec<_>>>()
        })?;

        Ok(StructureResult {
            name: resource_name(&identifier.url),
            identifier,
            groups,
        })
    }

    /// Structure of a single group. Other sheets are not read, so a
    /// workbook with unrelated unusable sheets still answers.
    pub fn get_group(&self, handle: &Handle, group_id: i64) -> ExdResult<Group> {
        let sheet = self.read_group_sheet(handle, group_id)?;
        build_group(group_id as usize, &sheet)
    }

    /// Typed values for a row range of selected channels of one sheet.
    ///
    /// Any invalid channel aborts the whole request.
    pub fn get_values(&self, request: &ValuesRequest) -> ExdResult<ValuesResult> {
        let start = usize::try_from(request.start).map_err(|_| {
            ExdError::InvalidArgument(format!("Negative start index {}!", request.start))
        })?;
        let limit = usize::try_from(request.limit).map_err(|_| {
            ExdError::InvalidArgument(format!("Negative row limit {}!", request.limit))
        })?;
        let sheet = self.read_group_sheet(&request.handle, request.group_id)?;

        let layout = split_sheet(&sheet)?;
        let row_count = layout.data.row_count();
        if start > row_count {
            return Err(ExdError::OutOfRange(format!(
                "Channel start index {} out of range!",
                request.start
            )));
        }

        let mut channels = Vec::with_capacity(request.channel_ids.len());
        for &channel_id in &request.channel_ids {
            let column_index = usize::try_from(channel_id)
                .ok()
                .filter(|&c| c < layout.data.width())
                .ok_or_else(|| {
                    ExdError::OutOfRange(format!("Invalid channel id {}!", channel_id))
                })?;

            let data_type = infer_canonical_type(&layout.data.column(column_index))
                .map_err(|e| with_channel_context(e, &sheet, column_index))?;
            let values = materialize(&layout.data, column_index, start, limit, data_type)?;
            debug!(
                group = request.group_id,
                channel = channel_id,
                %data_type,
                len = values.len(),
                "materialized channel"
            );

            channels.push(ValueSlice {
                group_id: request.group_id,
                channel_id,
                data_type,
                values,
            });
        }

        Ok(ValuesResult {
            id: request.group_id,
            channels,
        })
    }

    fn read_group_sheet(&self, handle: &Handle, group_id: i64) -> ExdResult<Sheet> {
        let invalid_group = || ExdError::OutOfRange(format!("Invalid group id {}!", group_id));
        let group_index = usize::try_from(group_id).map_err(|_| invalid_group())?;

        let (_, session) = self.registry.resolve(handle)?;
        session.with_source(|source| {
            if group_index >= source.sheet_names().len() {
                return Err(invalid_group());
            }
            source.read_sheet(group_index)
        })
    }

    /// Virtual group/channel access is not offered.
    pub fn get_values_ex(&self, request: &ValuesExRequest) -> ExdResult<ValuesResult> {
        warn!(handle = %request.handle.id, "rejected values_ex request");
        Err(ExdError::Unimplemented("Method not implemented!".to_string()))
    }
}

/// Describe one sheet as a group.
fn build_group(sheet_index: usize, sheet: &Sheet) -> ExdResult<Group> {
    let layout = split_sheet(sheet)?;
    let annotations = ColumnAnnotations::from_metadata(layout.metadata);

    let channels = (0..layout.data.width())
        .map(|column_index| {
            let cells = layout.data.column(column_index);
            let data_type = infer_canonical_type(&cells)
                .map_err(|e| with_channel_context(e, sheet, column_index))?;
            Ok(Channel {
                id: column_index as i64,
                name: sheet.header[column_index].clone(),
                data_type,
                unit_string: annotations.unit(column_index),
                description: annotations.description(column_index),
                independent: column_index == 0 && is_monotonic_non_decreasing(&cells),
            })
        })
        .collect::<ExdResult<Vec<_>>>()?;

    Ok(Group {
        id: sheet_index as i64,
        name: sheet.name.clone(),
        total_number_of_channels: channels.len() as i64,
        number_of_rows: layout.data.row_count() as i64,
        channels,
    })
}

fn with_channel_context(err: ExdError, sheet: &Sheet, column_index: usize) -> ExdError {
    match err {
        ExdError::TypeInference(msg) => ExdError::TypeInference(format!(
            "channel \"{}\" in sheet \"{}\": {}",
            sheet.header[column_index], sheet.name, msg
        )),
        other => other,
    }
}

/// File name shown as the structure name.
fn resource_name(url: &str) -> String {
    let path = Url::parse(url)
        .ok()
        .filter(|u| u.scheme() == "file")
        .and_then(|u| u.to_file_path().ok())
        .unwrap_or_else(|| Path::new(url).to_path_buf());
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| url.to_string())
}
