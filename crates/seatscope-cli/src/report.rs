//! Report rendering.
//!
//! Turns the engine's detail and summary output into delimited rows for
//! spreadsheet review, or JSON/JSONL for downstream tooling.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use seatscope_core::{AssociationSummary, AssociationTriple};

/// Error type for report rendering.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while writing the report file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Jsonl,
}

impl ReportFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            "jsonl" => Ok(ReportFormat::Jsonl),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }
}

/// One detail-mode report row.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub org_name: String,
    pub user_name: String,
    pub user_has_org_copilot_seat: bool,
    pub association_type: String,
    pub association: String,
    pub related_copilot_user_name: String,
}

impl From<&AssociationTriple> for DetailRow {
    fn from(triple: &AssociationTriple) -> Self {
        Self {
            org_name: triple.org.clone(),
            user_name: triple.subject.clone(),
            user_has_org_copilot_seat: triple.subject_has_seat,
            association_type: triple.context_kind.to_string(),
            association: triple.context_name.clone(),
            related_copilot_user_name: triple.related.to_string(),
        }
    }
}

/// One summary-mode report row.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub member_name: String,
    pub count_teams: usize,
    pub count_repos: usize,
    pub count_copilot_users: usize,
}

/// Converts aggregated triples into detail rows.
pub fn detail_rows(triples: &[AssociationTriple]) -> Vec<DetailRow> {
    triples.iter().map(DetailRow::from).collect()
}

/// Converts the summary mapping into rows, already sorted by member name.
pub fn summary_rows(summary: &BTreeMap<String, AssociationSummary>) -> Vec<SummaryRow> {
    summary
        .iter()
        .map(|(member, counts)| SummaryRow {
            member_name: member.clone(),
            count_teams: counts.teams,
            count_repos: counts.repositories,
            count_copilot_users: counts.seat_holders,
        })
        .collect()
}

/// Renders detail rows in the requested format.
pub fn render_detail(rows: &[DetailRow], format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        ReportFormat::Jsonl => render_jsonl(rows),
        ReportFormat::Csv => {
            let mut csv = String::new();
            csv.push_str(
                "org_name,user_name,user_has_org_copilot_seat,association_type,association,related_copilot_user_name\n",
            );
            for row in rows {
                let line = format!(
                    "{},{},{},{},{},{}\n",
                    escape_csv_field(&row.org_name),
                    escape_csv_field(&row.user_name),
                    row.user_has_org_copilot_seat,
                    row.association_type,
                    escape_csv_field(&row.association),
                    escape_csv_field(&row.related_copilot_user_name),
                );
                csv.push_str(&line);
            }
            Ok(csv)
        }
    }
}

/// Renders summary rows in the requested format.
pub fn render_summary(rows: &[SummaryRow], format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        ReportFormat::Jsonl => render_jsonl(rows),
        ReportFormat::Csv => {
            let mut csv = String::new();
            csv.push_str("member_name,count_teams,count_repos,count_copilot_users\n");
            for row in rows {
                let line = format!(
                    "{},{},{},{}\n",
                    escape_csv_field(&row.member_name),
                    row.count_teams,
                    row.count_repos,
                    row.count_copilot_users,
                );
                csv.push_str(&line);
            }
            Ok(csv)
        }
    }
}

fn render_jsonl<T: Serialize>(rows: &[T]) -> Result<String, ReportError> {
    let lines: Result<Vec<String>, _> = rows.iter().map(serde_json::to_string).collect();
    Ok(lines?.join("\n"))
}

/// Writes rendered content under the output directory, creating it if needed.
pub fn write_report(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Escapes a string for CSV format.
fn escape_csv_field(field: &str) -> String {
    // If the field contains special characters, quote it
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
