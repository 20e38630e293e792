//! CSV input.

use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::error::SheetError;

/// Read the message column of a CSV file.
///
/// The file must have a header row. The message column is the first column
/// holding at least one non-blank value that does not parse as a number.
/// Blank cells in that column are skipped.
pub fn read_messages(path: &Path) -> Result<Vec<String>, SheetError> {
    if !path.is_file() {
        return Err(SheetError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    info!(columns = ?headers.iter().collect::<Vec<_>>(), "Columns in CSV");

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    if records.is_empty() {
        warn!(path = %path.display(), "CSV has no data rows");
        return Ok(Vec::new());
    }

    let column = message_column(headers.len(), &records)
        .ok_or_else(|| SheetError::NoTextColumn(path.to_path_buf()))?;
    if let Some(name) = headers.get(column) {
        info!(column = name, "Using message column");
    }

    let mut messages = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match record.get(column) {
            Some(cell) if !cell.trim().is_empty() => messages.push(cell.to_string()),
            // Line 1 is the header.
            _ => warn!(line = index + 2, "Skipping blank message cell"),
        }
    }

    Ok(messages)
}

fn message_column(header_len: usize, records: &[StringRecord]) -> Option<usize> {
    let width = records
        .iter()
        .map(StringRecord::len)
        .max()
        .unwrap_or(0)
        .max(header_len);

    (0..width).find(|&column| {
        records
            .iter()
            .filter_map(|record| record.get(column))
            .any(is_text)
    })
}

fn is_text(cell: &str) -> bool {
    let cell = cell.trim();
    !cell.is_empty() && cell.parse::<f64>().is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn csv_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_single_column() {
        let (_dir, path) = csv_file("message\nhola\n\"quiero pan, y leche\"\n");
        let messages = read_messages(&path).unwrap();
        assert_eq!(messages, vec!["hola", "quiero pan, y leche"]);
    }

    #[test]
    fn skips_numeric_id_column() {
        let (_dir, path) = csv_file("id,text\n1,first message\n2,second message\n");
        let messages = read_messages(&path).unwrap();
        assert_eq!(messages, vec!["first message", "second message"]);
    }

    #[test]
    fn blank_cells_are_skipped() {
        let (_dir, path) = csv_file("text\nuno\n\"  \"\ntres\n");
        let messages = read_messages(&path).unwrap();
        assert_eq!(messages, vec!["uno", "tres"]);
    }

    #[test]
    fn multiline_cells_are_kept_whole() {
        let (_dir, path) = csv_file("text\n\"line one\nline two\"\n");
        let messages = read_messages(&path).unwrap();
        assert_eq!(messages, vec!["line one\nline two"]);
    }

    #[test]
    fn header_only_file_is_empty() {
        let (_dir, path) = csv_file("text\n");
        assert!(read_messages(&path).unwrap().is_empty());
    }

    #[test]
    fn numeric_only_file_has_no_text_column() {
        let (_dir, path) = csv_file("a,b\n1,2\n3,4.5\n");
        let err = read_messages(&path).unwrap_err();
        assert!(matches!(err, SheetError::NoTextColumn(_)));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_messages(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, SheetError::NotFound(_)));
    }

    #[test]
    fn text_detection() {
        assert!(is_text("hello"));
        assert!(!is_text("  "));
        assert!(!is_text("42"));
        assert!(!is_text(" -3.5 "));
    }
}
