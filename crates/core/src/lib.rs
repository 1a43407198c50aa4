//! # groupsheet-core
//!
//! The aggregation transform: reads a workbook holding the TTW, MRP, TPO,
//! WFA and PTC sheets, sums actuals and prorated budgets per category across
//! fixed sheet clusters, and appends the result as a `Group` sheet.
//!
//! ```no_run
//! let input = std::fs::read("Budget.xlsx").unwrap();
//! let enrichment = groupsheet_core::append_group_sheet(&input, 9).unwrap();
//! std::fs::write("Budget_enriched.xlsx", enrichment.bytes).unwrap();
//! ```
//!
//! The transform is a pure function of its inputs: no I/O besides the byte
//! buffers, no state shared between calls.

/// Category set, cluster sums and the aggregate table.
pub mod aggregate;
/// Lenient numeric and category coercion.
pub mod coerce;
/// Sheet, column and cluster configuration.
pub mod config;
/// Non-fatal conditions reported by the transform.
pub mod diagnostic;
/// Per-sheet numeric view.
pub mod enrich;
/// Error types and result aliases.
pub mod error;
/// Column positions resolved from a sheet header.
pub mod schema;
/// The end-to-end pipeline.
pub mod transform;

pub use aggregate::{CategorySet, GroupTable};
pub use config::{Cluster, GroupConfig, Months, SheetConfig, PRORATED_BUDGET};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use enrich::{EnrichedTable, ValueColumn};
pub use error::{GroupError, GroupResult};
pub use schema::SheetSchema;
pub use transform::{append_group_sheet, enriched_file_name, EnrichedBook, Enrichment, GroupTransform};
