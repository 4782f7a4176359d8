//! Workbook fixtures written with rust_xlsxwriter

#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

/// 2024-10-14 as an Excel serial
pub const BASE_DAY: f64 = 45579.0;

pub fn timestamp_serial(hour: u32, minute: u32, second: u32) -> f64 {
    BASE_DAY + f64::from(hour * 3600 + minute * 60 + second) / 86400.0
}

fn write_header(sheet: &mut Worksheet, names: &[&str]) -> Result<(), XlsxError> {
    for (col, name) in names.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    Ok(())
}

/// One sheet `data_1` with a unit row, a description row and five data rows:
/// time (date), index (number), speed (number), comment (text).
pub fn measurement_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("measurement.xlsx");
    build_measurement(&path).unwrap();
    path
}

fn build_measurement(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let sheet = workbook.add_worksheet();
    sheet.set_name("data_1")?;

    write_header(sheet, &["time", "index", "speed", "comment"])?;

    for (col, unit) in ["s", "-", "m/s", "-"].iter().enumerate() {
        sheet.write_string(1, col as u16, *unit)?;
    }
    for (col, text) in [
        "Time of measurement",
        "Running index",
        "Speed of the vehicle",
        "Free text comment",
    ]
    .iter()
    .enumerate()
    {
        sheet.write_string(2, col as u16, *text)?;
    }

    let comments = ["abc", "def", "ghi", "jkl", "mno"];
    for i in 0..5u32 {
        let row = 3 + i;
        sheet.write_number_with_format(row, 0, timestamp_serial(11, 48, i), &date_format)?;
        sheet.write_number(row, 1, f64::from(i + 1))?;
        sheet.write_number(row, 2, 3.0 + f64::from(i) * 0.5)?;
        sheet.write_string(row, 3, comments[i as usize])?;
    }

    workbook.save(path)
}

/// Two sheets: plain numbers and assorted types.
pub fn multi_sheet_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("multi.xlsx");
    build_multi_sheet(&path).unwrap();
    path
}

fn build_multi_sheet(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let time_format = Format::new().set_num_format("hh:mm:ss");

    let plain = workbook.add_worksheet();
    plain.set_name("plain")?;
    write_header(plain, &["x", "y"])?;
    for i in 0..4u32 {
        plain.write_number(1 + i, 0, f64::from(i))?;
        plain.write_number(1 + i, 1, f64::from(i) * 2.5)?;
    }

    let types = workbook.add_worksheet();
    types.set_name("types")?;
    write_header(types, &["flag", "label", "clock", "gappy"])?;
    for i in 0..3u32 {
        types.write_boolean(1 + i, 0, i % 2 == 0)?;
        types.write_string(1 + i, 1, format!("item{}", i))?;
        types.write_number_with_format(1 + i, 2, f64::from(8 + i) / 24.0, &time_format)?;
        // gappy leaves its middle cell blank
        if i != 1 {
            types.write_number(1 + i, 3, f64::from(i) + 0.5)?;
        }
    }

    workbook.save(path)
}

/// A sheet of text only, which has no data block.
pub fn text_only_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("notes.xlsx");
    build_text_only(&path).unwrap();
    path
}

fn build_text_only(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let notes = workbook.add_worksheet();
    notes.set_name("notes")?;
    write_header(notes, &["text"])?;
    notes.write_string(1, 0, "first")?;
    notes.write_string(2, 0, "second")?;
    workbook.save(path)
}

/// One sheet whose second column switches from numbers to text.
pub fn mixed_column_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("mixed.xlsx");
    build_mixed(&path).unwrap();
    path
}

fn build_mixed(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_header(sheet, &["index", "value"])?;
    sheet.write_number(1, 0, 1.0)?;
    sheet.write_number(1, 1, 1.5)?;
    sheet.write_number(2, 0, 2.0)?;
    sheet.write_number(2, 1, 2.5)?;
    sheet.write_number(3, 0, 3.0)?;
    sheet.write_string(3, 1, "x")?;
    workbook.save(path)
}

/// Integer codes in a column that ends with a text cell.
pub fn integer_codes_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("codes.xlsx");
    build_integer_codes(&path).unwrap();
    path
}

fn build_integer_codes(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_header(sheet, &["index", "code"])?;
    sheet.write_number(1, 0, 1.0)?;
    sheet.write_number(1, 1, 7.0)?;
    sheet.write_number(2, 0, 2.0)?;
    sheet.write_number(2, 1, 8.0)?;
    sheet.write_number(3, 0, 3.0)?;
    sheet.write_string(3, 1, "n/a")?;
    workbook.save(path)
}

/// A numeric first sheet followed by a text-only sheet.
pub fn numbers_and_notes_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("numbers_and_notes.xlsx");
    build_numbers_and_notes(&path).unwrap();
    path
}

fn build_numbers_and_notes(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    let numbers = workbook.add_worksheet();
    numbers.set_name("numbers")?;
    write_header(numbers, &["x", "y"])?;
    for i in 0..3u32 {
        numbers.write_number(1 + i, 0, f64::from(i))?;
        numbers.write_number(1 + i, 1, f64::from(i) + 0.25)?;
    }

    let notes = workbook.add_worksheet();
    notes.set_name("notes")?;
    write_header(notes, &["text"])?;
    notes.write_string(1, 0, "first")?;
    notes.write_string(2, 0, "second")?;

    workbook.save(path)
}

/// Column names of [`all_datatypes_workbook`], in sheet order.
pub const ALL_DATATYPES_COLUMNS: [&str; 15] = [
    "index", "complex64", "complex128", "int8", "uint8", "int16", "uint16", "int32", "uint32",
    "int64", "uint64", "float32", "float64", "string", "date",
];

/// One sheet with two rows covering every column kind a pandas export
/// produces: integers of each width, float32 and float64, complex numbers
/// written as text, strings and timestamps.
pub fn all_datatypes_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("all_datatypes.xlsx");
    build_all_datatypes(&path).unwrap();
    path
}

fn build_all_datatypes(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let sheet = workbook.add_worksheet();
    write_header(sheet, &ALL_DATATYPES_COLUMNS)?;

    let complex64 = ["(1+2j)", "(3+4j)"];
    let complex128 = ["(5+6j)", "(7+8j)"];
    let float32 = [1.100000023841858, 1.200000047683716];
    let float64 = [2.1, 2.2];
    let strings = ["abc", "def"];
    // 2023-01-01 11:22:33 and 2023-01-02 11:22:34
    let dates = [
        44927.0 + f64::from(11 * 3600 + 22 * 60 + 33) / 86400.0,
        44928.0 + f64::from(11 * 3600 + 22 * 60 + 34) / 86400.0,
    ];

    for i in 0..2usize {
        let row = 1 + i as u32;
        sheet.write_number(row, 0, i as f64)?;
        sheet.write_string(row, 1, complex64[i])?;
        sheet.write_string(row, 2, complex128[i])?;
        // signed widths start negative, unsigned ones positive
        for col in 3..11u16 {
            let first = if col % 2 == 1 { -2.0 } else { 2.0 };
            sheet.write_number(row, col, if i == 0 { first } else { 4.0 })?;
        }
        sheet.write_number(row, 11, float32[i])?;
        sheet.write_number(row, 12, float64[i])?;
        sheet.write_string(row, 13, strings[i])?;
        sheet.write_number_with_format(row, 14, dates[i], &date_format)?;
    }

    workbook.save(path)
}
