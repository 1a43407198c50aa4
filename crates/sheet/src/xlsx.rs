use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{Data, Range, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Cursor;

/// Number format applied to `CellValue::DateTime` cells on write
const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Options for reading Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Whether the first row contains headers
    pub has_headers: bool,
}

impl XlsxReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        // Error cells keep their literal text, e.g. "#DIV/0!"
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

fn read_error(e: XlsxError) -> SheetError {
    SheetError::Parse(e.to_string())
}

fn write_error(e: rust_xlsxwriter::XlsxError) -> SheetError {
    SheetError::Serialize(e.to_string())
}

fn range_to_sheet(name: &str, range: &Range<Data>, options: &XlsxReadOptions) -> Result<Sheet> {
    let data: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(data_to_cell_value).collect())
        .collect();

    let mut sheet = Sheet::with_name(name);
    *sheet.data_mut() = data;
    // calamine trims leading empty rows and columns; keep where the data sat
    sheet.set_origin(range.start().unwrap_or((0, 0)));

    if options.has_headers && sheet.row_count() > 0 {
        sheet.name_columns_by_row(0)?;
    }

    Ok(sheet)
}

/// Write sheet data to a worksheet, starting at the sheet's origin
fn write_to_worksheet(sheet: &Sheet, worksheet: &mut Worksheet, date_format: &Format) -> Result<()> {
    let (first_row, first_col) = sheet.origin();

    for (row_idx, row) in sheet.data().iter().enumerate() {
        let row_num = u32::try_from(row_idx)
            .ok()
            .and_then(|r| r.checked_add(first_row))
            .ok_or_else(|| SheetError::Serialize("Row index overflow".to_string()))?;

        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = usize::try_from(first_col)
                .ok()
                .and_then(|c| c.checked_add(col_idx))
                .and_then(|c| u16::try_from(c).ok())
                .ok_or_else(|| SheetError::Serialize("Column index overflow".to_string()))?;

            match cell {
                CellValue::Null => {} // Leave empty
                CellValue::Bool(b) => {
                    worksheet
                        .write_boolean(row_num, col_num, *b)
                        .map_err(write_error)?;
                }
                CellValue::Int(i) => {
                    // Note: Excel stores all numbers as f64, so integers > 2^53
                    // (9,007,199,254,740,992) may lose precision
                    worksheet
                        .write_number(row_num, col_num, *i as f64)
                        .map_err(write_error)?;
                }
                CellValue::Float(f) => {
                    worksheet
                        .write_number(row_num, col_num, *f)
                        .map_err(write_error)?;
                }
                CellValue::DateTime(serial) => {
                    worksheet
                        .write_number_with_format(row_num, col_num, *serial, date_format)
                        .map_err(write_error)?;
                }
                CellValue::String(s) => {
                    worksheet
                        .write_string(row_num, col_num, s)
                        .map_err(write_error)?;
                }
            }
        }
    }

    Ok(())
}

impl Book {
    /// Load a book from in-memory XLSX bytes (all sheets)
    ///
    /// # Errors
    ///
    /// Returns `SheetError::Parse` if the bytes are not a readable workbook.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_xlsx_bytes_with_options(bytes, &XlsxReadOptions::default())
    }

    /// Load a book from in-memory XLSX bytes with options
    ///
    /// # Errors
    ///
    /// Returns `SheetError::Parse` if the bytes are not a readable workbook.
    pub fn from_xlsx_bytes_with_options(bytes: &[u8], options: &XlsxReadOptions) -> Result<Self> {
        let mut workbook: Xlsx<Cursor<&[u8]>> =
            Xlsx::new(Cursor::new(bytes)).map_err(read_error)?;

        let sheet_names: Vec<String> = workbook.sheet_names().iter().map(|s| s.to_string()).collect();
        let mut book = Book::new();

        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name).map_err(read_error)?;
            let sheet = range_to_sheet(&sheet_name, &range, options)?;
            book.add_sheet(&sheet_name, sheet)?;
        }

        Ok(book)
    }

    /// Serialize the book to XLSX bytes, one worksheet per sheet in order
    ///
    /// # Errors
    ///
    /// Returns `SheetError::Serialize` if a sheet name or cell is rejected by
    /// the writer.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format(DATE_TIME_FORMAT);

        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(write_error)?;
            write_to_worksheet(sheet, worksheet, &date_format)?;
        }

        workbook.save_to_buffer().map_err(write_error)
    }
}
