use crate::config::GroupConfig;
use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::enrich::{EnrichedTable, ValueColumn};
use groupsheet_sheet::{CellValue, Sheet, SheetError};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};

/// Sorted, deduplicated union of the category keys of every table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    /// Build the set from enriched tables. Tables without a category column
    /// contribute nothing.
    pub fn from_tables<'a>(tables: impl IntoIterator<Item = &'a EnrichedTable>) -> Self {
        let union: BTreeSet<&str> = tables
            .into_iter()
            .filter_map(EnrichedTable::categories)
            .flatten()
            .map(String::as_str)
            .collect();
        Self(union.into_iter().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.binary_search_by(|c| c.as_str().cmp(category)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Sum `column` across `sheets`, grouped by category and reindexed onto
/// `categories` in order. Categories absent from these sheets get 0.
///
/// Each sheet is grouped on its own first and the sheet totals are then
/// added in listing order. A sheet without a category column is skipped
/// with a diagnostic.
pub(crate) fn sum_for(
    tables: &IndexMap<String, EnrichedTable>,
    config: &GroupConfig,
    sheets: &[String],
    column: ValueColumn,
    categories: &CategorySet,
    diagnostics: &mut Diagnostics,
) -> Vec<f64> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for name in sheets {
        // Cluster members are validated against the config before enrichment.
        let (Some(table), Some(sheet_config)) = (tables.get(name), config.sheet(name)) else {
            continue;
        };
        match table.sum_by_category(column) {
            Some(grouped) => {
                for (category, value) in grouped {
                    *totals.entry(category).or_insert(0.0) += value;
                }
            }
            None => diagnostics.push(
                name,
                DiagnosticKind::SkippedInSum {
                    column: column.header(sheet_config).to_string(),
                },
            ),
        }
    }

    categories
        .iter()
        .map(|category| totals.get(category).copied().unwrap_or(0.0))
        .collect()
}

/// The aggregate table: one row per category, an actuals and a budget
/// column per cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTable {
    categories: CategorySet,
    columns: IndexMap<String, Vec<f64>>,
}

impl GroupTable {
    pub(crate) fn build(
        config: &GroupConfig,
        tables: &IndexMap<String, EnrichedTable>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let categories = CategorySet::from_tables(tables.values());
        let mut columns = IndexMap::new();

        for cluster in &config.clusters {
            let actuals = sum_for(
                tables,
                config,
                &cluster.sheets,
                ValueColumn::Actual,
                &categories,
                diagnostics,
            );
            let budget = sum_for(
                tables,
                config,
                &cluster.sheets,
                ValueColumn::ProratedBudget,
                &categories,
                diagnostics,
            );
            columns.insert(cluster.actuals_header(), actuals);
            columns.insert(cluster.budget_header(), budget);
        }

        tracing::info!(
            categories = categories.len(),
            clusters = config.clusters.len(),
            "built group table"
        );

        Self { categories, columns }
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Column values by header, aligned with [`Self::categories`].
    pub fn column(&self, header: &str) -> Option<&[f64]> {
        self.columns.get(header).map(Vec::as_slice)
    }

    /// Headers of the numeric columns in output order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Numeric values of one category's row, in header order.
    pub fn row(&self, category: &str) -> Option<Vec<f64>> {
        let index = self
            .categories
            .as_slice()
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()?;
        Some(self.columns.values().map(|values| values[index]).collect())
    }

    /// Render as a sheet with a header row; categories are written as text.
    pub fn to_sheet(&self, name: &str, category_header: &str) -> Result<Sheet, SheetError> {
        let mut sheet = Sheet::with_name(name);

        let mut header = vec![CellValue::from(category_header)];
        header.extend(self.headers().map(CellValue::from));
        sheet.row_append(header)?;

        for (index, category) in self.categories.iter().enumerate() {
            let mut row = vec![CellValue::from(category)];
            row.extend(self.columns.values().map(|values| CellValue::Float(values[index])));
            sheet.row_append(row)?;
        }

        sheet.name_columns_by_row(0)?;
        Ok(sheet)
    }
}
