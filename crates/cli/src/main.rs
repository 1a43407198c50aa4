//! # groupsheet-cli
//!
//! Command-line interface for the group-sheet transform.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use groupsheet_core::{append_group_sheet, enriched_file_name, GroupError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// groupsheet - Append a Group sheet aggregating P&L data from multiple sheets
#[derive(Parser)]
#[command(name = "groupsheet")]
#[command(author, version, about = "Append a Group sheet aggregating P&L sheets", long_about = None)]
struct Cli {
    /// Input workbook containing the TTW, MRP, TPO, WFA and PTC sheets
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Output workbook [default: <input stem>_enriched.xlsx beside the input]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Months year-to-date used to prorate annual budgets (1-12)
    #[arg(short, long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(1..=12))]
    months: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Enrich the input workbook and write the result. Returns the output path.
fn run(cli: &Cli) -> Result<PathBuf> {
    let input = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read file: {}", cli.input.display()))?;

    let enrichment = append_group_sheet(&input, cli.months)?;
    for diagnostic in &enrichment.diagnostics {
        eprintln!("{} {diagnostic}", "warning:".yellow().bold());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));
    std::fs::write(&output, &enrichment.bytes)
        .with_context(|| format!("Failed to write file: {}", output.display()))?;

    println!(
        "{} Group sheet with {} categories written to {}",
        "Done:".green().bold(),
        enrichment.group.categories().len(),
        output.display()
    );
    Ok(output)
}

/// `<dir>/<stem>_enriched.xlsx` for an input at `<dir>/<stem>.xlsx`.
fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(enriched_file_name(&name))
}

fn report(err: &anyhow::Error) {
    if let Some(missing) = err.downcast_ref::<GroupError>().and_then(GroupError::missing_sheets) {
        eprintln!(
            "{} could not process the workbook, missing sheets: {}",
            "Error:".red().bold(),
            missing.join(", ")
        );
        eprintln!("Add the missing sheets to the workbook and try again.");
    } else {
        eprintln!("{} {err:#}", "Error:".red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsheet_sheet::{Book, CellValue, Sheet, XlsxReadOptions};
    use tempfile::tempdir;

    fn workbook(sheets: &[&str]) -> Vec<u8> {
        let mut book = Book::new();
        for name in sheets {
            book.add_sheet(
                name,
                Sheet::from_data(vec![
                    vec![
                        CellValue::from("Category"),
                        CellValue::from("Actual"),
                        CellValue::from("AnnualBudget"),
                    ],
                    vec![
                        CellValue::from("Rent"),
                        CellValue::Float(10.0),
                        CellValue::Float(120.0),
                    ],
                ]),
            )
            .unwrap();
        }
        book.to_xlsx_bytes().unwrap()
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output(Path::new("/data/Budget.xlsx")),
            PathBuf::from("/data/Budget_enriched.xlsx")
        );
        assert_eq!(
            default_output(Path::new("Budget.xlsx")),
            PathBuf::from("Budget_enriched.xlsx")
        );
    }

    #[test]
    fn test_months_range_enforced_by_parser() {
        assert!(Cli::try_parse_from(["groupsheet", "-i", "a.xlsx", "--months", "13"]).is_err());
        assert!(Cli::try_parse_from(["groupsheet", "-i", "a.xlsx", "--months", "0"]).is_err());

        let cli = Cli::try_parse_from(["groupsheet", "-i", "a.xlsx"]).unwrap();
        assert_eq!(cli.months, 9);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_run_writes_enriched_workbook() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Budget.xlsx");
        std::fs::write(&input, workbook(&["TTW", "MRP", "TPO", "WFA", "PTC"])).unwrap();

        let cli = Cli::try_parse_from(["groupsheet", "-i", input.to_str().unwrap(), "-m", "6"]).unwrap();
        let output = run(&cli).unwrap();

        assert_eq!(output, dir.path().join("Budget_enriched.xlsx"));
        let written = std::fs::read(&output).unwrap();
        let book = Book::from_xlsx_bytes_with_options(&written, &XlsxReadOptions::default().with_headers(true))
            .unwrap();
        let group = book.get_sheet("Group").unwrap();
        assert_eq!(group.get_by_name(1, "TTW+MRP Budget").unwrap(), &CellValue::Float(120.0));
    }

    #[test]
    fn test_run_reports_missing_sheets() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Partial.xlsx");
        std::fs::write(&input, workbook(&["TTW", "MRP"])).unwrap();

        let cli = Cli::try_parse_from(["groupsheet", "--input", input.to_str().unwrap()]).unwrap();
        let err = run(&cli).unwrap_err();

        let missing = err
            .downcast_ref::<GroupError>()
            .and_then(GroupError::missing_sheets)
            .unwrap();
        assert_eq!(missing, ["TPO", "WFA", "PTC"]);
        assert!(!dir.path().join("Partial_enriched.xlsx").exists());
    }

    #[test]
    fn test_run_missing_input_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("nope.xlsx");

        let cli = Cli::try_parse_from(["groupsheet", "--input", input.to_str().unwrap()]).unwrap();
        let err = run(&cli).unwrap_err();

        assert!(err.to_string().starts_with("Failed to read file"));
    }
}
