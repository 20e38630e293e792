//! XLSX output.
//!
//! Every sheet has a bold header row and columns sized to their longest
//! value, capped at [`MAX_COLUMN_WIDTH`].

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use splitscore_core::{EvaluationResult, ScoreMetric, SplitResult};
use tracing::{info, warn};

use crate::error::SheetError;

pub const SPLIT_SHEET: &str = "Extracted Content";
pub const FAILED_SHEET: &str = "Failed Messages";
pub const EVALUATION_SHEET: &str = "Evaluación";

pub const MAX_COLUMN_WIDTH: usize = 100;

/// Longest string an XLSX cell accepts.
const MAX_CELL_CHARS: usize = 32_767;

const SPLIT_HEADERS: [&str; 4] = ["Original Message", "Message Type", "Category", "Content"];
const FAILED_HEADERS: [&str; 3] = ["Original Message", "Error", "Raw Content"];
const COMMENT_HEADER: &str = "comentario";
const ORIGINAL_HEADER: &str = "mensaje_original";

enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn display_len(&self) -> usize {
        match self {
            Cell::Text(s) => s.chars().count(),
            Cell::Number(n) => format!("{n:?}").len(),
        }
    }
}

/// Write split results: one row per content item per category.
///
/// Error-shaped results additionally get a row on a `Failed Messages` sheet.
pub fn write_split_workbook(results: &[SplitResult], path: &Path) -> Result<(), SheetError> {
    let rows = split_rows(results);
    let failed = failed_rows(results);

    let mut workbook = Workbook::new();
    workbook.push_worksheet(build_sheet(SPLIT_SHEET, &SPLIT_HEADERS, &rows)?);
    if !failed.is_empty() {
        warn!(count = failed.len(), "Some messages could not be split");
        workbook.push_worksheet(build_sheet(FAILED_SHEET, &FAILED_HEADERS, &failed)?);
    }
    workbook.save(path)?;

    info!(
        path = %path.display(),
        rows = rows.len(),
        failed = failed.len(),
        "Wrote split results"
    );
    Ok(())
}

/// Write evaluations in fixed column order: message, four scores, mean, comment.
pub fn write_evaluation_workbook(
    results: &[EvaluationResult],
    path: &Path,
) -> Result<(), SheetError> {
    let headers = evaluation_headers();
    let rows: Vec<Vec<Cell>> = results.iter().map(evaluation_row).collect();

    let mut workbook = Workbook::new();
    workbook.push_worksheet(build_sheet(EVALUATION_SHEET, &headers, &rows)?);
    workbook.save(path)?;

    info!(path = %path.display(), rows = rows.len(), "Wrote evaluation results");
    Ok(())
}

fn split_rows(results: &[SplitResult]) -> Vec<Vec<Cell>> {
    let mut rows = Vec::new();
    for result in results {
        let original = result.original_message.as_deref().unwrap_or_default();
        let message_type = result.message_type.as_deref().unwrap_or_default();
        for category in result.categories() {
            for content in &category.content {
                rows.push(vec![
                    Cell::Text(original.to_string()),
                    Cell::Text(message_type.to_string()),
                    Cell::Text(category.keyword.clone()),
                    Cell::Text(content.clone()),
                ]);
            }
        }
    }
    rows
}

fn failed_rows(results: &[SplitResult]) -> Vec<Vec<Cell>> {
    results
        .iter()
        .filter_map(|result| {
            let error = result.error.as_deref()?;
            Some(vec![
                Cell::Text(result.original_message.clone().unwrap_or_default()),
                Cell::Text(error.to_string()),
                Cell::Text(result.raw_content.clone().unwrap_or_default()),
            ])
        })
        .collect()
}

fn evaluation_headers() -> Vec<&'static str> {
    std::iter::once(ORIGINAL_HEADER)
        .chain(ScoreMetric::ALL.iter().map(ScoreMetric::key))
        .chain(std::iter::once(COMMENT_HEADER))
        .collect()
}

fn evaluation_row(result: &EvaluationResult) -> Vec<Cell> {
    std::iter::once(Cell::Text(result.original_message().to_string()))
        .chain(ScoreMetric::ALL.iter().map(|&m| Cell::Number(result.score(m))))
        .chain(std::iter::once(Cell::Text(result.comment().to_string())))
        .collect()
}

fn column_widths(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(Cell::display_len)
                .fold(header.chars().count(), usize::max);
            (longest + 2).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn build_sheet(name: &str, headers: &[&str], rows: &[Vec<Cell>]) -> Result<Worksheet, SheetError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(name)?;

    let bold = Format::new().set_bold();
    for (column, header) in (0u16..).zip(headers) {
        sheet.write_string_with_format(0, column, *header, &bold)?;
    }

    for (row, cells) in (1u32..).zip(rows) {
        for (column, cell) in (0u16..).zip(cells) {
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row, column, cell_text(text))?;
                }
                Cell::Number(value) => {
                    sheet.write_number(row, column, *value)?;
                }
            }
        }
    }

    for (column, width) in (0u16..).zip(column_widths(headers, rows)) {
        sheet.set_column_width(column, width as f64)?;
    }

    Ok(sheet)
}

fn cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(chars = text.chars().count(), "Truncating oversized cell");
            &text[..end]
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitscore_core::{Category, Scores};
    use std::fs;

    fn ok(original: &str) -> SplitResult {
        SplitResult {
            original_message: Some(original.into()),
            message_type: Some("order".into()),
            categories: Some(vec![
                Category::new("items", vec!["bread".into(), "milk".into()]),
                Category::new("empty", vec![]),
                Category::new("when", vec!["friday".into()]),
            ]),
            ..SplitResult::default()
        }
    }

    fn texts(row: &[Cell]) -> Vec<&str> {
        row.iter()
            .map(|c| match c {
                Cell::Text(s) => s.as_str(),
                Cell::Number(_) => "<number>",
            })
            .collect()
    }

    fn assert_xlsx(path: &Path) {
        let bytes = fs::read(path).unwrap();
        // XLSX is a zip container.
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn one_row_per_content_item() {
        let rows = split_rows(&[ok("pan y leche el viernes")]);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            texts(&rows[0]),
            vec!["pan y leche el viernes", "order", "items", "bread"]
        );
        assert_eq!(&texts(&rows[2])[2..], &["when", "friday"]);
    }

    #[test]
    fn failed_results_only_land_on_failed_sheet() {
        let results = vec![
            ok("fine"),
            SplitResult::malformed("broken", "invalid JSON response: eof", "{"),
        ];
        assert_eq!(split_rows(&results).len(), 3);

        let failed = failed_rows(&results);
        assert_eq!(failed.len(), 1);
        assert_eq!(
            texts(&failed[0]),
            vec!["broken", "invalid JSON response: eof", "{"]
        );
    }

    #[test]
    fn evaluation_columns_are_in_fixed_order() {
        assert_eq!(
            evaluation_headers(),
            vec![
                "mensaje_original",
                "precisión_del_tipo_de_mensaje",
                "relevancia_de_la_categoría",
                "exhaustividad_del_contenido",
                "calidad_de_la_extracción",
                "puntuación_media",
                "comentario",
            ]
        );

        let eval = EvaluationResult::new("m", Scores::default(), "c");
        let row = evaluation_row(&eval);
        assert_eq!(row.len(), 7);
        assert!(matches!(row[5], Cell::Number(v) if v == 0.0));
        assert!(matches!(&row[6], Cell::Text(s) if s == "c"));
    }

    #[test]
    fn widths_fit_content_and_are_capped() {
        let rows = vec![
            vec![Cell::Text("abc".into()), Cell::Text("x".repeat(500))],
            vec![Cell::Text("abcdefgh".into()), Cell::Text("y".into())],
        ];
        assert_eq!(column_widths(&["id", "body"], &rows), vec![10, MAX_COLUMN_WIDTH]);
        // Header wins when it is longest; width counts characters, not bytes.
        assert_eq!(column_widths(&["Categoría"], &[vec![Cell::Text("é".into())]]), vec![11]);
    }

    #[test]
    fn oversized_cells_are_truncated() {
        let long = "a".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(cell_text(&long).len(), MAX_CELL_CHARS);
        assert_eq!(cell_text("short"), "short");
    }

    #[test]
    fn writes_split_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("split_input.xlsx");
        let results = vec![ok("uno"), SplitResult::failed("dos", "timeout")];

        write_split_workbook(&results, &path).unwrap();
        assert_xlsx(&path);
    }

    #[test]
    fn writes_evaluation_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluation_input.xlsx");
        let results = vec![
            EvaluationResult::new(
                "uno",
                Scores {
                    type_accuracy: 5.0,
                    category_relevance: 4.0,
                    content_completeness: 4.0,
                    extraction_quality: 3.0,
                },
                "bien",
            ),
            EvaluationResult::fallback("dos", "split failed: timeout"),
        ];

        write_evaluation_workbook(&results, &path).unwrap();
        assert_xlsx(&path);
    }

    #[test]
    fn empty_batches_still_produce_workbooks() {
        let dir = tempfile::tempdir().unwrap();
        let split = dir.path().join("split.xlsx");
        let eval = dir.path().join("eval.xlsx");

        write_split_workbook(&[], &split).unwrap();
        write_evaluation_workbook(&[], &eval).unwrap();
        assert_xlsx(&split);
        assert_xlsx(&eval);
    }
}
