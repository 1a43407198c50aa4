use crate::aggregate::GroupTable;
use crate::config::{same_sheet_name, GroupConfig, Months};
use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::enrich::EnrichedTable;
use crate::error::{GroupError, GroupResult};
use groupsheet_sheet::{Book, Sheet, XlsxReadOptions};
use indexmap::IndexMap;

/// Result of enriching a workbook held in memory.
#[derive(Debug, Clone)]
pub struct EnrichedBook {
    /// Original sheets in their original order, then the aggregate sheet.
    pub book: Book,
    pub group: GroupTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of enriching workbook bytes.
#[derive(Debug, Clone)]
pub struct Enrichment {
    /// The output workbook, XLSX encoded.
    pub bytes: Vec<u8>,
    pub group: GroupTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// The aggregation transform bound to a configuration.
///
/// Holds no state between calls; one value can serve any number of
/// invocations, from any thread.
#[derive(Debug, Clone, Default)]
pub struct GroupTransform {
    config: GroupConfig,
}

impl GroupTransform {
    /// Bind the transform to a configuration after checking it is consistent.
    pub fn new(config: GroupConfig) -> GroupResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Parse `input`, append the aggregate sheet and serialize the result.
    ///
    /// # Errors
    ///
    /// `InvalidMonths` outside 1..=12, `Parse` for unreadable bytes,
    /// `MissingSheets` when a required sheet is absent and `Serialize` when
    /// the output cannot be written. No bytes are produced in any of these
    /// cases.
    pub fn apply(&self, input: &[u8], months: u32) -> GroupResult<Enrichment> {
        let months = Months::new(months)?;
        let span = tracing::info_span!("append_group_sheet", months = months.get(), input_len = input.len());
        let _enter = span.enter();

        let book = Book::from_xlsx_bytes_with_options(input, &XlsxReadOptions::default().with_headers(true))
            .map_err(GroupError::Parse)?;
        tracing::debug!(sheets = ?book.sheet_names(), "parsed workbook");

        let EnrichedBook {
            book,
            group,
            diagnostics,
        } = self.enrich_book(&book, months)?;

        let bytes = book.to_xlsx_bytes().map_err(GroupError::Serialize)?;
        tracing::info!(
            output_len = bytes.len(),
            warnings = diagnostics.len(),
            "enriched workbook"
        );

        Ok(Enrichment {
            bytes,
            group,
            diagnostics,
        })
    }

    /// Run the transform on an already parsed book.
    ///
    /// Sheets are expected to have their header row named, as
    /// `XlsxReadOptions::with_headers(true)` does. The input book is left
    /// untouched; the output holds copies of its sheets.
    pub fn enrich_book(&self, book: &Book, months: Months) -> GroupResult<EnrichedBook> {
        let sheets = self.required_sheets(book)?;

        let mut diagnostics = Diagnostics::default();
        let tables: IndexMap<String, EnrichedTable> = self
            .config
            .sheets
            .iter()
            .zip(sheets)
            .map(|(config, sheet)| {
                let table = EnrichedTable::from_sheet(sheet, config, months, &mut diagnostics);
                (config.name.clone(), table)
            })
            .collect();

        let group = GroupTable::build(&self.config, &tables, &mut diagnostics);

        let mut output = Book::with_name(book.name());
        for (name, sheet) in book.sheets() {
            if same_sheet_name(name, &self.config.group_sheet) {
                diagnostics.push(name, DiagnosticKind::ReplacedGroupSheet);
                continue;
            }
            output
                .add_sheet(name, sheet.clone())
                .map_err(GroupError::Serialize)?;
        }
        let group_sheet = group
            .to_sheet(&self.config.group_sheet, &self.config.category_header)
            .map_err(GroupError::Serialize)?;
        output
            .add_sheet(&self.config.group_sheet, group_sheet)
            .map_err(GroupError::Serialize)?;

        Ok(EnrichedBook {
            book: output,
            group,
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// The configured sheets in configuration order, or every missing name.
    fn required_sheets<'b>(&self, book: &'b Book) -> GroupResult<Vec<&'b Sheet>> {
        let mut found = Vec::with_capacity(self.config.sheets.len());
        let mut missing = Vec::new();
        for name in self.config.required_sheets() {
            match book.get_sheet(name) {
                Ok(sheet) => found.push(sheet),
                Err(_) => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(found)
        } else {
            tracing::warn!(?missing, "required sheets missing");
            Err(GroupError::MissingSheets { missing })
        }
    }
}

/// Enrich workbook bytes with the fixed five-sheet configuration.
pub fn append_group_sheet(input: &[u8], months: u32) -> GroupResult<Enrichment> {
    GroupTransform::default().apply(input, months)
}

/// Download name for an enriched upload: `Budget.xlsx` gives
/// `Budget_enriched.xlsx`.
///
/// Directory components are dropped and the stem ends at the first
/// `.xlsx`. An empty stem falls back to `enriched_workbook.xlsx`.
pub fn enriched_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let stem = base.split(".xlsx").next().unwrap_or_default().trim();
    if stem.is_empty() {
        "enriched_workbook.xlsx".to_string()
    } else {
        format!("{stem}_enriched.xlsx")
    }
}
