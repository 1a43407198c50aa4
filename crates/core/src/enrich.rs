use crate::coerce::{category_key, is_lossy, numeric_or_zero};
use crate::config::{Months, SheetConfig, PRORATED_BUDGET};
use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::schema::SheetSchema;
use groupsheet_sheet::{CellValue, Sheet};
use std::collections::HashMap;

/// Numeric column of an [`EnrichedTable`] that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    Actual,
    ProratedBudget,
}

impl ValueColumn {
    /// Header naming this column for a given sheet.
    pub fn header(self, config: &SheetConfig) -> &str {
        match self {
            Self::Actual => &config.actual,
            Self::ProratedBudget => PRORATED_BUDGET,
        }
    }
}

fn cell(row: &[CellValue], position: Option<usize>) -> Option<&CellValue> {
    position.and_then(|i| row.get(i))
}

/// Derived, numeric view of one input sheet.
///
/// Rows line up across the three columns. Rows that are entirely empty in
/// the source are not part of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTable {
    name: String,
    schema: SheetSchema,
    categories: Option<Vec<String>>,
    actual: Vec<f64>,
    prorated_budget: Vec<f64>,
}

impl EnrichedTable {
    pub(crate) fn from_sheet(
        sheet: &Sheet,
        config: &SheetConfig,
        months: Months,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let schema = SheetSchema::resolve(sheet, config);
        let rows: Vec<&Vec<CellValue>> = sheet
            .body_rows()
            .filter(|row| !row.iter().all(CellValue::is_blank))
            .collect();

        for (position, column) in [
            (schema.category, &config.category),
            (schema.actual, &config.actual),
            (schema.budget, &config.budget),
        ] {
            if position.is_none() {
                diagnostics.push(
                    &config.name,
                    DiagnosticKind::MissingColumn {
                        column: column.clone(),
                    },
                );
            }
        }

        let categories = schema.category.map(|_| {
            rows.iter()
                .map(|row| category_key(cell(row, schema.category)))
                .collect()
        });

        let mut lossy_actual = 0;
        let mut lossy_budget = 0;
        let mut actual = Vec::with_capacity(rows.len());
        let mut prorated_budget = Vec::with_capacity(rows.len());
        for row in &rows {
            let actual_cell = cell(row, schema.actual);
            let budget_cell = cell(row, schema.budget);
            lossy_actual += usize::from(is_lossy(actual_cell));
            lossy_budget += usize::from(is_lossy(budget_cell));
            actual.push(numeric_or_zero(actual_cell));
            prorated_budget.push(months.prorate(numeric_or_zero(budget_cell)));
        }

        for (count, column) in [(lossy_actual, &config.actual), (lossy_budget, &config.budget)] {
            if count > 0 {
                diagnostics.push(
                    &config.name,
                    DiagnosticKind::NonNumericCells {
                        column: column.clone(),
                        count,
                    },
                );
            }
        }

        tracing::debug!(sheet = %config.name, rows = rows.len(), "enriched sheet");

        Self {
            name: config.name.clone(),
            schema,
            categories,
            actual,
            prorated_budget,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> SheetSchema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }

    /// Category key of each row, `None` when the sheet has no category column.
    pub fn categories(&self) -> Option<&[String]> {
        self.categories.as_deref()
    }

    pub fn values(&self, column: ValueColumn) -> &[f64] {
        match column {
            ValueColumn::Actual => &self.actual,
            ValueColumn::ProratedBudget => &self.prorated_budget,
        }
    }

    /// Per-category sums of a column, accumulated in row order.
    pub fn sum_by_category(&self, column: ValueColumn) -> Option<HashMap<&str, f64>> {
        let categories = self.categories.as_ref()?;
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for (category, value) in categories.iter().zip(self.values(column)) {
            *totals.entry(category.as_str()).or_insert(0.0) += value;
        }
        Some(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(rows: Vec<Vec<CellValue>>) -> Sheet {
        let mut sheet = Sheet::from_data(rows);
        sheet.name_columns_by_row(0).unwrap();
        sheet
    }

    fn header() -> Vec<CellValue> {
        vec!["Category".into(), "Actual".into(), "AnnualBudget".into()]
    }

    fn enrich(sheet: &Sheet, months: u32) -> (EnrichedTable, Vec<crate::Diagnostic>) {
        let mut diagnostics = Diagnostics::default();
        let table = EnrichedTable::from_sheet(
            sheet,
            &SheetConfig::standard("TTW"),
            Months::new(months).unwrap(),
            &mut diagnostics,
        );
        (table, diagnostics.into_vec())
    }

    #[test]
    fn coerces_and_prorates() {
        let sheet = named(vec![
            header(),
            vec!["Rent".into(), 100.0.into(), 1200.0.into()],
            vec!["Wages".into(), "oops".into(), CellValue::Null],
        ]);

        let (table, diagnostics) = enrich(&sheet, 9);
        assert_eq!(table.len(), 2);
        assert_eq!(table.values(ValueColumn::Actual), [100.0, 0.0]);
        assert_eq!(table.values(ValueColumn::ProratedBudget), [900.0, 0.0]);
        assert_eq!(
            diagnostics.iter().map(|d| &d.kind).collect::<Vec<_>>(),
            vec![&DiagnosticKind::NonNumericCells {
                column: "Actual".to_string(),
                count: 1,
            }]
        );
    }

    #[test]
    fn missing_budget_and_actual_read_as_zero() {
        let sheet = named(vec![vec!["Category".into()], vec!["Rent".into()]]);

        let (table, diagnostics) = enrich(&sheet, 6);
        assert_eq!(table.values(ValueColumn::Actual), [0.0]);
        assert_eq!(table.values(ValueColumn::ProratedBudget), [0.0]);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| matches!(d.kind, DiagnosticKind::MissingColumn { .. })));
    }

    #[test]
    fn missing_category_column() {
        let sheet = named(vec![vec!["Actual".into()], vec![5.0.into()]]);

        let (table, _) = enrich(&sheet, 9);
        assert!(table.categories().is_none());
        assert!(table.sum_by_category(ValueColumn::Actual).is_none());
    }

    #[test]
    fn blank_rows_are_skipped() {
        let sheet = named(vec![
            header(),
            vec![CellValue::Null, CellValue::Null, CellValue::Null],
            vec!["Rent".into(), 1.0.into(), 12.0.into()],
        ]);

        let (table, _) = enrich(&sheet, 12);
        assert_eq!(table.categories().unwrap(), ["Rent"]);
        assert_eq!(table.values(ValueColumn::ProratedBudget), [12.0]);
    }

    #[test]
    fn sums_repeat_categories() {
        let sheet = named(vec![
            header(),
            vec!["Rent".into(), 10.0.into(), 0.0.into()],
            vec!["Power".into(), 3.0.into(), 0.0.into()],
            vec!["Rent".into(), 5.5.into(), 0.0.into()],
        ]);

        let (table, _) = enrich(&sheet, 9);
        let totals = table.sum_by_category(ValueColumn::Actual).unwrap();
        assert_eq!(totals["Rent"], 15.5);
        assert_eq!(totals["Power"], 3.0);
    }
}
