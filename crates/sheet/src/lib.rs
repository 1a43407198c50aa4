//! Sheet/Book model for groupsheet
//!
//! A small tabular layer: cells, sheets with optional named columns, ordered
//! books of sheets, and an in-memory XLSX codec.
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use groupsheet_sheet::{Sheet, CellValue};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["Category", "Actual"],
//!     vec!["Rent", "100"],
//! ]);
//!
//! sheet.name_columns_by_row(0).unwrap();
//! assert_eq!(sheet.column_position("Actual"), Some(1));
//! assert_eq!(sheet.get_by_name(1, "Category").unwrap(), &CellValue::from("Rent"));
//! ```
//!
//! ## Round-tripping a book through XLSX bytes
//!
//! ```
//! use groupsheet_sheet::{Book, Sheet};
//!
//! let mut book = Book::new();
//! book.add_sheet("Data", Sheet::from_data(vec![vec![1.0, 2.0]])).unwrap();
//!
//! let bytes = book.to_xlsx_bytes().unwrap();
//! let loaded = Book::from_xlsx_bytes(&bytes).unwrap();
//! assert_eq!(loaded.sheet_names(), vec!["Data"]);
//! ```

mod book;
mod cell;
mod error;
mod sheet;
mod xlsx;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export XLSX read options.
pub use xlsx::XlsxReadOptions;
