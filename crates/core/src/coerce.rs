//! Lenient cell coercion.
//!
//! Everything here is lossy and never fails: a cell that is not a finite
//! number reads as 0, and every cell has a string form usable as a category.

use groupsheet_sheet::CellValue;

/// Parse a cell as a finite number.
///
/// Integers, floats and numeric text (surrounding whitespace allowed) parse.
/// Booleans, dates, other text, empty cells and NaN/infinite values do not.
pub fn parse_number(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_float(),
    };
    value.filter(|v| v.is_finite())
}

/// Numeric value of a cell, or 0 when it does not parse.
pub fn numeric_or_zero(cell: Option<&CellValue>) -> f64 {
    cell.and_then(parse_number).unwrap_or(0.0)
}

/// Whether coercing this cell loses information, i.e. it holds something
/// that is not a number. Empty cells are not counted.
pub fn is_lossy(cell: Option<&CellValue>) -> bool {
    cell.is_some_and(|c| !c.is_blank() && parse_number(c).is_none())
}

/// String form of a category cell; a missing or empty cell is `""`.
pub fn category_key(cell: Option<&CellValue>) -> String {
    cell.map(CellValue::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_parse() {
        assert_eq!(numeric_or_zero(Some(&CellValue::Float(12.5))), 12.5);
        assert_eq!(numeric_or_zero(Some(&CellValue::Int(-3))), -3.0);
        assert_eq!(numeric_or_zero(Some(&CellValue::from(" 1200 "))), 1200.0);
        assert_eq!(numeric_or_zero(Some(&CellValue::from("1e3"))), 1000.0);
    }

    #[test]
    fn everything_else_is_zero() {
        for cell in [
            CellValue::Null,
            CellValue::from(""),
            CellValue::from("n/a"),
            CellValue::from("1,200"),
            CellValue::from("NaN"),
            CellValue::from("inf"),
            CellValue::Float(f64::NAN),
            CellValue::Bool(true),
            CellValue::DateTime(45_000.0),
        ] {
            assert_eq!(numeric_or_zero(Some(&cell)), 0.0, "{cell:?}");
        }
        assert_eq!(numeric_or_zero(None), 0.0);
    }

    #[test]
    fn lossy_ignores_blanks() {
        assert!(!is_lossy(None));
        assert!(!is_lossy(Some(&CellValue::Null)));
        assert!(!is_lossy(Some(&CellValue::from("  "))));
        assert!(!is_lossy(Some(&CellValue::Float(1.0))));
        assert!(is_lossy(Some(&CellValue::from("TBC"))));
        assert!(is_lossy(Some(&CellValue::Bool(false))));
    }

    #[test]
    fn category_keys() {
        assert_eq!(category_key(Some(&CellValue::from("Rent"))), "Rent");
        assert_eq!(category_key(Some(&CellValue::Float(4010.0))), "4010");
        assert_eq!(category_key(Some(&CellValue::Null)), "");
        assert_eq!(category_key(None), "");
    }
}
