use crate::error::{ExdError, ExdResult};
use crate::reader::ExternalDataReader;
use crate::types::{
    CanonicalType, Group, Handle, Identifier, StructureRequest, StructureResult, ValueArray,
    ValuesRequest, ValuesResult,
};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Maximum values printed per channel in human-readable mode
const PREVIEW_LEN: usize = 10;

/// Format a number for display, removing unnecessary decimal places
fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn identifier_for(file: &Path) -> Identifier {
    Identifier::new(file.to_string_lossy())
}

/// Open `file`, run `op` with the handle, and always close it again.
fn with_handle<T>(
    reader: &ExternalDataReader,
    file: &Path,
    op: impl FnOnce(&Handle) -> ExdResult<T>,
) -> ExdResult<T> {
    let handle = reader.open(&identifier_for(file))?;
    let result = op(&handle);
    reader.close(&handle)?;
    result
}

/// Execute the structure command
pub fn structure(file: PathBuf, json: bool) -> ExdResult<()> {
    let reader = ExternalDataReader::default();
    let result = with_handle(&reader, &file, |handle| {
        reader.get_structure(&StructureRequest::new(handle.clone()))
    })?;

    if json {
        println!("{}", to_json(&result)?);
    } else {
        print_structure(&file, &result);
    }
    Ok(())
}

/// Execute the values command
pub fn values(
    file: PathBuf,
    group: i64,
    channels: Vec<i64>,
    start: i64,
    limit: i64,
    json: bool,
) -> ExdResult<()> {
    let reader = ExternalDataReader::default();
    let (result, group_info) = with_handle(&reader, &file, |handle| {
        // all channels needs the group's width; explicit ids go straight to the values call
        let (channel_ids, group_info) = if channels.is_empty() {
            let group_info = reader.get_group(handle, group)?;
            let ids = group_info.channels.iter().map(|c| c.id).collect();
            (ids, Some(group_info))
        } else {
            (channels, None)
        };

        let result = reader.get_values(&ValuesRequest {
            handle: handle.clone(),
            group_id: group,
            channel_ids,
            start,
            limit,
        })?;
        let group_info = group_info.or_else(|| reader.get_group(handle, group).ok());
        Ok((result, group_info))
    })?;

    if json {
        println!("{}", to_json(&result)?);
    } else {
        print_values(&file, group_info.as_ref(), group, start, &result);
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> ExdResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ExdError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

fn print_structure(file: &Path, result: &StructureResult) {
    println!("{}", "exd - File structure".bold().green());
    println!("   File: {}", file.display());
    println!("   Name: {}", result.name.bold());
    println!();

    for group in &result.groups {
        println!(
            "   Group {}: {} ({} channels, {} rows)",
            group.id,
            group.name.bright_blue().bold(),
            group.total_number_of_channels,
            group.number_of_rows
        );
        for channel in &group.channels {
            let mut line = format!(
                "      [{}] {} : {}",
                channel.id,
                channel.name.cyan(),
                channel.data_type.type_name().yellow()
            );
            if let Some(unit) = &channel.unit_string {
                line.push_str(&format!(" [{}]", unit));
            }
            if channel.independent {
                line.push_str(&format!(" {}", "(independent)".green()));
            }
            println!("{}", line);
            if let Some(description) = &channel.description {
                println!("          {}", description.dimmed());
            }
        }
        println!();
    }
}

fn print_values(
    file: &Path,
    group: Option<&Group>,
    group_id: i64,
    start: i64,
    result: &ValuesResult,
) {
    println!("{}", "exd - Channel values".bold().green());
    println!("   File: {}", file.display());
    println!(
        "   Group {}: {} (from row {})",
        group_id,
        group.map_or("?", |g| g.name.as_str()).bright_blue().bold(),
        start
    );
    println!();

    for slice in &result.channels {
        let name = usize::try_from(slice.channel_id)
            .ok()
            .and_then(|c| group?.channels.get(c))
            .map_or("?", |c| c.name.as_str());
        let rendered = render_values(&slice.values, slice.data_type);

        println!(
            "   [{}] {} : {} ({} values)",
            slice.channel_id,
            name.cyan(),
            slice.data_type.type_name().yellow(),
            rendered.len()
        );
        let preview: Vec<&str> = rendered.iter().take(PREVIEW_LEN).map(String::as_str).collect();
        if !preview.is_empty() {
            let ellipsis = if rendered.len() > PREVIEW_LEN { ", ..." } else { "" };
            println!("      {}{}", preview.join(", "), ellipsis);
        }
    }
    println!();
}

/// One display string per row; complex arrays are re-paired.
pub fn render_values(values: &ValueArray, data_type: CanonicalType) -> Vec<String> {
    match values {
        ValueArray::Boolean(v) => v.iter().map(|b| b.to_string()).collect(),
        ValueArray::Byte(v) => v.iter().map(|b| b.to_string()).collect(),
        ValueArray::Long(v) => v.iter().map(|n| n.to_string()).collect(),
        ValueArray::LongLong(v) => v.iter().map(|n| n.to_string()).collect(),
        ValueArray::Float(v) if data_type == CanonicalType::Complex => v
            .chunks(2)
            .map(|p| complex_text(f64::from(p[0]), p.get(1).map_or(0.0, |im| f64::from(*im))))
            .collect(),
        ValueArray::Float(v) => v.iter().map(|n| format_number(f64::from(*n))).collect(),
        ValueArray::Double(v) if data_type == CanonicalType::DComplex => v
            .chunks(2)
            .map(|p| complex_text(p[0], p.get(1).copied().unwrap_or(0.0)))
            .collect(),
        ValueArray::Double(v) => v.iter().map(|n| format_number(*n)).collect(),
        ValueArray::String(v) => v.clone(),
        ValueArray::ByteString(v) => v.iter().map(|b| format!("<{} bytes>", b.len())).collect(),
    }
}

fn complex_text(re: f64, im: f64) -> String {
    format!("({}+{}j)", format_number(re), format_number(im))
}
