//! Unit / description detection for metadata rows

use crate::types::Cell;

/// Rows whose strings average fewer characters than this hold units.
pub const UNIT_LENGTH_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataLabel {
    Unit,
    Description,
    Unclassified,
}

/// Mean character length of the non-blank strings in a row.
///
/// `None` if the row holds anything other than strings and blanks, or no
/// strings at all.
pub fn mean_string_length(row: &[Cell]) -> Option<f64> {
    let mut total = 0usize;
    let mut count = 0usize;
    for cell in row {
        match cell {
            Cell::Empty => {}
            Cell::String(s) => {
                total += s.chars().count();
                count += 1;
            }
            _ => return None,
        }
    }
    if count == 0 {
        None
    } else {
        Some(total as f64 / count as f64)
    }
}

/// Label every metadata row, top to bottom.
pub fn classify(rows: &[Vec<Cell>]) -> Vec<MetadataLabel> {
    rows.iter()
        .map(|row| match mean_string_length(row) {
            Some(mean) if mean < UNIT_LENGTH_THRESHOLD => MetadataLabel::Unit,
            Some(_) => MetadataLabel::Description,
            None => MetadataLabel::Unclassified,
        })
        .collect()
}

/// Per-column unit and description text taken from the metadata block.
///
/// When several rows carry the same label the last one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnAnnotations<'a> {
    unit_row: Option<&'a [Cell]>,
    description_row: Option<&'a [Cell]>,
}

impl<'a> ColumnAnnotations<'a> {
    pub fn from_metadata(rows: &'a [Vec<Cell>]) -> Self {
        let mut annotations = Self::default();
        for (row, label) in rows.iter().zip(classify(rows)) {
            match label {
                MetadataLabel::Unit => annotations.unit_row = Some(row.as_slice()),
                MetadataLabel::Description => annotations.description_row = Some(row.as_slice()),
                MetadataLabel::Unclassified => {}
            }
        }
        annotations
    }

    pub fn unit(&self, channel_id: usize) -> Option<String> {
        text_at(self.unit_row, channel_id)
    }

    pub fn description(&self, channel_id: usize) -> Option<String> {
        text_at(self.description_row, channel_id)
    }
}

fn text_at(row: Option<&[Cell]>, channel_id: usize) -> Option<String> {
    match row?.get(channel_id)? {
        Cell::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    Cell::Empty
                } else {
                    Cell::String(v.to_string())
                }
            })
            .collect()
    }

    #[test]
    fn test_mean_length() {
        assert_eq!(mean_string_length(&strings(&["s", "-", "m/s", "-"])), Some(1.5));
        assert_eq!(mean_string_length(&strings(&["ab", "", "abcd"])), Some(3.0));
        assert_eq!(mean_string_length(&strings(&["", ""])), None);
        assert_eq!(
            mean_string_length(&[Cell::String("abc".into()), Cell::Double(1.0)]),
            None
        );
    }

    #[test]
    fn test_mean_length_counts_characters() {
        // 3 characters, 4+ bytes
        assert_eq!(mean_string_length(&strings(&["°C/"])), Some(3.0));
    }

    #[test]
    fn test_threshold_is_exclusive_for_units() {
        assert_eq!(
            classify(&[strings(&["abcd", "abcd"])]),
            vec![MetadataLabel::Unit]
        );
        assert_eq!(
            classify(&[strings(&["abcde", "vwxyz"])]),
            vec![MetadataLabel::Description]
        );
    }

    #[test]
    fn test_numeric_metadata_is_unclassified() {
        let rows = vec![vec![Cell::Double(1.0), Cell::String("x".into())]];
        assert_eq!(classify(&rows), vec![MetadataLabel::Unclassified]);
        let annotations = ColumnAnnotations::from_metadata(&rows);
        assert_eq!(annotations.unit(1), None);
    }

    #[test]
    fn test_unit_and_description_rows() {
        let rows = vec![
            strings(&["s", "-", "m/s", "-"]),
            strings(&["time channel", "index", "Speed of the vehicle", "comment column"]),
        ];
        let annotations = ColumnAnnotations::from_metadata(&rows);
        assert_eq!(annotations.unit(0).as_deref(), Some("s"));
        assert_eq!(annotations.unit(2).as_deref(), Some("m/s"));
        assert_eq!(annotations.description(1).as_deref(), Some("index"));
        assert_eq!(
            annotations.description(2).as_deref(),
            Some("Speed of the vehicle")
        );
    }

    #[test]
    fn test_last_unit_row_wins() {
        let rows = vec![strings(&["s", "m"]), strings(&["ms", ""])];
        let annotations = ColumnAnnotations::from_metadata(&rows);
        assert_eq!(annotations.unit(0).as_deref(), Some("ms"));
        assert_eq!(annotations.unit(1), None);
        assert_eq!(annotations.description(0), None);
    }

    #[test]
    fn test_missing_position_yields_none() {
        let rows = vec![strings(&["s"])];
        let annotations = ColumnAnnotations::from_metadata(&rows);
        assert_eq!(annotations.unit(5), None);
    }
}
