//! Non-fatal conditions met while enriching a workbook.

use serde::Serialize;
use std::fmt;

/// What went wrong on a sheet, without aborting the transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A configured column is absent from the sheet header. Its values count as 0,
    /// or, for the category column, the sheet contributes no categories.
    MissingColumn { column: String },
    /// Non-empty cells that did not parse as numbers and were read as 0.
    NonNumericCells { column: String, count: usize },
    /// The sheet was left out of a cluster sum.
    SkippedInSum { column: String },
    /// An existing aggregate sheet in the input was replaced.
    ReplacedGroupSheet,
}

/// A non-fatal condition on one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub sheet: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MissingColumn { column } => {
                write!(f, "column '{column}' not found in sheet '{}'", self.sheet)
            }
            DiagnosticKind::NonNumericCells { column, count } => write!(
                f,
                "{count} non-numeric value(s) in column '{column}' of sheet '{}' read as 0",
                self.sheet
            ),
            DiagnosticKind::SkippedInSum { column } => write!(
                f,
                "sheet '{}' skipped when summing '{column}'",
                self.sheet
            ),
            DiagnosticKind::ReplacedGroupSheet => {
                write!(f, "existing sheet '{}' replaced", self.sheet)
            }
        }
    }
}

/// Collects diagnostics, logging each one as it is raised.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub(crate) fn push(&mut self, sheet: &str, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            sheet: sheet.to_string(),
            kind,
        };
        tracing::warn!(sheet, "{diagnostic}");
        self.0.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}
