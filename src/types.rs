use chrono::{NaiveDateTime, NaiveTime};
use num_complex::{Complex32, Complex64};
use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// Grid Cells
//==============================================================================

/// A single cell as supplied by the file reader, already typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Long(i32),
    LongLong(i64),
    Float(f32),
    Double(f64),
    Complex(Complex32),
    DComplex(Complex64),
    /// Calendar date with time of day
    DateTime(NaiveDateTime),
    /// Time of day without a date
    Time(NaiveTime),
    String(String),
    Bytes(Vec<u8>),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Cell::Byte(_) | Cell::Short(_) | Cell::Long(_) | Cell::LongLong(_)
        )
    }

    pub fn is_number(&self) -> bool {
        self.is_integer() || matches!(self, Cell::Float(_) | Cell::Double(_))
    }

    /// Numeric view of the cell, coercing booleans and numeric text.
    ///
    /// Returns `None` for blanks and for anything that does not read as a number.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Byte(v) => Some(f64::from(*v)),
            Cell::Short(v) => Some(f64::from(*v)),
            Cell::Long(v) => Some(f64::from(*v)),
            Cell::LongLong(v) => Some(*v as f64),
            Cell::Float(v) => Some(f64::from(*v)),
            Cell::Double(v) => Some(*v),
            Cell::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Integer view of the cell; floats truncate toward zero.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Cell::Byte(v) => Some(i64::from(*v)),
            Cell::Short(v) => Some(i64::from(*v)),
            Cell::Long(v) => Some(i64::from(*v)),
            Cell::LongLong(v) => Some(*v),
            Cell::String(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| finite_to_i64(trimmed.parse::<f64>().ok()?))
            }
            other => finite_to_i64(other.to_f64()?),
        }
    }
}

fn finite_to_i64(v: f64) -> Option<i64> {
    if v.is_finite() {
        Some(v.trunc() as i64)
    } else {
        None
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(v) => write!(f, "{}", v),
            Cell::Byte(v) => write!(f, "{}", v),
            Cell::Short(v) => write!(f, "{}", v),
            Cell::Long(v) => write!(f, "{}", v),
            Cell::LongLong(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Double(v) => write!(f, "{}", v),
            Cell::Complex(c) => write!(f, "({}+{}j)", c.re, c.im),
            Cell::DComplex(c) => write!(f, "({}+{}j)", c.re, c.im),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Cell::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Cell::String(s) => f.write_str(s),
            Cell::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

//==============================================================================
// Canonical Value Kinds
//==============================================================================

/// The closed set of value kinds a channel can be reported and delivered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalType {
    #[serde(rename = "DT_BOOLEAN")]
    Boolean,
    #[serde(rename = "DT_BYTE")]
    Byte,
    #[serde(rename = "DT_SHORT")]
    Short,
    #[serde(rename = "DT_LONG")]
    Long,
    #[serde(rename = "DT_LONGLONG")]
    LongLong,
    #[serde(rename = "DT_FLOAT")]
    Float,
    #[serde(rename = "DT_DOUBLE")]
    Double,
    #[serde(rename = "DT_STRING")]
    String,
    #[serde(rename = "DT_DATE")]
    Date,
    #[serde(rename = "DT_COMPLEX")]
    Complex,
    #[serde(rename = "DT_DCOMPLEX")]
    DComplex,
    #[serde(rename = "DT_BYTESTR")]
    ByteString,
}

impl CanonicalType {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            CanonicalType::Boolean => "Boolean",
            CanonicalType::Byte => "Byte",
            CanonicalType::Short => "Short",
            CanonicalType::Long => "Long",
            CanonicalType::LongLong => "LongLong",
            CanonicalType::Float => "Float",
            CanonicalType::Double => "Double",
            CanonicalType::String => "String",
            CanonicalType::Date => "Date",
            CanonicalType::Complex => "Complex",
            CanonicalType::DComplex => "DComplex",
            CanonicalType::ByteString => "ByteString",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

//==============================================================================
// Handles and Identifiers
//==============================================================================

/// Names a backing resource. Not a handle by itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub url: String,
    /// Opaque, reserved for the host platform
    #[serde(default)]
    pub parameters: String,
}

impl Identifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parameters: String::new(),
        }
    }
}

/// Opaque token returned by Open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub id: String,
}

//==============================================================================
// Structure Requests
//==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureRequest {
    pub handle: Handle,
    #[serde(default)]
    pub suppress_channels: bool,
    #[serde(default)]
    pub suppress_attributes: bool,
    #[serde(default)]
    pub channel_names: Vec<String>,
}

impl StructureRequest {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            suppress_channels: false,
            suppress_attributes: false,
            channel_names: Vec::new(),
        }
    }

    /// True when any partial-structure option is set.
    pub fn is_filtered(&self) -> bool {
        self.suppress_channels || self.suppress_attributes || !self.channel_names.is_empty()
    }
}

/// File → sheet → column hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureResult {
    pub identifier: Identifier,
    pub name: String,
    pub groups: Vec<Group>,
}

/// One sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub total_number_of_channels: i64,
    pub number_of_rows: i64,
    pub channels: Vec<Channel>,
}

/// One column of a sheet's data block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub data_type: CanonicalType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub independent: bool,
}

//==============================================================================
// Value Requests
//==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuesRequest {
    pub handle: Handle,
    pub group_id: i64,
    #[serde(default)]
    pub channel_ids: Vec<i64>,
    #[serde(default)]
    pub start: i64,
    pub limit: i64,
}

/// Virtual group/channel selection. Accepted on the wire, never served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuesExRequest {
    pub handle: Handle,
    #[serde(default)]
    pub selection: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesResult {
    /// Group id the slices belong to
    pub id: i64,
    pub channels: Vec<ValueSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSlice {
    pub group_id: i64,
    pub channel_id: i64,
    pub data_type: CanonicalType,
    pub values: ValueArray,
}

/// Homogeneous, wire-ready column values.
///
/// Short and Long share `LongArray`; dates travel as `StringArray`;
/// complex values travel as interleaved real/imaginary float arrays.
/// JSON has no NaN, so blank float cells serialize as `null` and read
/// back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueArray {
    #[serde(rename = "boolean_array")]
    Boolean(Vec<bool>),
    #[serde(rename = "byte_array")]
    Byte(Vec<u8>),
    #[serde(rename = "long_array")]
    Long(Vec<i32>),
    #[serde(rename = "longlong_array")]
    LongLong(Vec<i64>),
    #[serde(rename = "float_array", deserialize_with = "nullable_floats")]
    Float(Vec<f32>),
    #[serde(rename = "double_array", deserialize_with = "nullable_floats")]
    Double(Vec<f64>),
    #[serde(rename = "string_array")]
    String(Vec<String>),
    #[serde(rename = "bytestr_array")]
    ByteString(Vec<Vec<u8>>),
}

/// Float types with a NaN to stand in for `null`.
trait NanFloat: Sized {
    const NAN: Self;
}

impl NanFloat for f32 {
    const NAN: Self = f32::NAN;
}

impl NanFloat for f64 {
    const NAN: Self = f64::NAN;
}

fn nullable_floats<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + NanFloat,
{
    let values: Vec<Option<T>> = Deserialize::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(T::NAN)).collect())
}

impl ValueArray {
    /// Number of wire elements (2 per row for complex arrays)
    pub fn len(&self) -> usize {
        match self {
            ValueArray::Boolean(v) => v.len(),
            ValueArray::Byte(v) => v.len(),
            ValueArray::Long(v) => v.len(),
            ValueArray::LongLong(v) => v.len(),
            ValueArray::Float(v) => v.len(),
            ValueArray::Double(v) => v.len(),
            ValueArray::String(v) => v.len(),
            ValueArray::ByteString(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
