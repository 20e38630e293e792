use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No text column found in {}", .0.display())]
    NoTextColumn(PathBuf),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl From<SheetError> for splitscore_core::Error {
    fn from(err: SheetError) -> Self {
        splitscore_core::Error::Sheet {
            message: err.to_string(),
        }
    }
}
