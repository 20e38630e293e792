//! Spreadsheet I/O for splitscore.
//!
//! Input rows come from a CSV file with a header row; results go out as XLSX
//! workbooks, one for split results and one for evaluations.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::SheetError;
pub use reader::read_messages;
pub use writer::{write_evaluation_workbook, write_split_workbook};
