//! JSON and CSV export of stored results
//!
//! JSON output is the stored value pretty-printed with two-space indentation.
//! CSV output quotes every cell, doubles embedded quotes, renders absent
//! optional values as empty cells and joins list values with `" | "`.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::ResultStore;
use crate::types::{AnalysisResult, CombinedResult, ExecutionResult};

/// Separator for list-valued cells
pub const LIST_SEPARATOR: &str = " | ";

pub const ANALYSIS_CSV_HEADER: [&str; 7] = [
    "ID",
    "Title",
    "Type",
    "Priority",
    "Preconditions",
    "Steps",
    "Expected Result",
];

pub const COMBINED_CSV_HEADER: [&str; 12] = [
    "TC ID",
    "Feature",
    "User Role",
    "Type",
    "Priority",
    "Condition",
    "Page URL",
    "Page Title",
    "Form Name",
    "Mapped",
    "Manual Steps",
    "Automation Steps",
];

pub const EXECUTION_CSV_HEADER: [&str; 7] = [
    "TC ID",
    "Condition",
    "Status",
    "Duration (s)",
    "Error Message",
    "Screenshot",
    "Log",
];

/// Which stored result to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    TestCases,
    WebsiteStructure,
    CombinedTestCases,
    ExecutionResults,
}

impl ExportKind {
    fn stem(self) -> &'static str {
        match self {
            ExportKind::TestCases => "test_cases",
            ExportKind::WebsiteStructure => "website_structure",
            ExportKind::CombinedTestCases => "combined_test_cases",
            ExportKind::ExecutionResults => "execution_results",
        }
    }

    pub fn file_name(self, format: ExportFormat) -> String {
        format!("{}.{}", self.stem(), format.extension())
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stem())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// A downloadable export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub contents: String,
}

/// Export a stored result. Returns `Ok(None)` when the source slot is empty.
pub fn export(store: &ResultStore, kind: ExportKind, format: ExportFormat) -> Result<Option<Artifact>> {
    let contents = match (kind, format) {
        (ExportKind::TestCases, ExportFormat::Json) => store.analysis().map(to_json).transpose()?,
        (ExportKind::TestCases, ExportFormat::Csv) => store.analysis().map(analysis_csv),
        (ExportKind::WebsiteStructure, ExportFormat::Json) => store.explorer().map(to_json).transpose()?,
        (ExportKind::CombinedTestCases, ExportFormat::Json) => store.combined().map(to_json).transpose()?,
        (ExportKind::CombinedTestCases, ExportFormat::Csv) => store.combined().map(combined_csv),
        (ExportKind::ExecutionResults, ExportFormat::Json) => store.execution().map(to_json).transpose()?,
        (ExportKind::ExecutionResults, ExportFormat::Csv) => store.execution().map(execution_csv),
        (ExportKind::WebsiteStructure, ExportFormat::Csv) => {
            return Err(Error::UnsupportedExport {
                kind: kind.to_string(),
                format: "CSV".to_string(),
            })
        }
    };

    Ok(contents.map(|contents| Artifact {
        file_name: kind.file_name(format),
        content_type: format.content_type(),
        contents,
    }))
}

/// Pretty JSON with two-space indentation
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Quote a cell, doubling embedded quotes
pub fn csv_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_optional(value: Option<&str>) -> String {
    csv_cell(value.unwrap_or_default())
}

fn csv_list(values: &[String]) -> String {
    csv_cell(&values.join(LIST_SEPARATOR))
}

fn csv_row(cells: Vec<String>) -> String {
    cells.join(",")
}

fn csv_header(columns: &[&str]) -> String {
    csv_row(columns.iter().map(|c| csv_cell(c)).collect())
}

pub fn analysis_csv(result: &AnalysisResult) -> String {
    let mut lines = vec![csv_header(&ANALYSIS_CSV_HEADER)];
    lines.extend(result.test_cases().iter().map(|tc| {
        csv_row(vec![
            csv_cell(&tc.id),
            csv_cell(&tc.title),
            csv_cell(tc.category.as_str()),
            csv_cell(&tc.priority),
            csv_list(&tc.preconditions),
            csv_list(&tc.steps),
            csv_cell(&tc.expected_result),
        ])
    }));
    lines.join("\n")
}

pub fn combined_csv(result: &CombinedResult) -> String {
    let mut lines = vec![csv_header(&COMBINED_CSV_HEADER)];
    lines.extend(result.test_cases.iter().map(|tc| {
        csv_row(vec![
            csv_cell(&tc.tc_id),
            csv_cell(&tc.feature),
            csv_cell(&tc.user_role),
            csv_cell(tc.category.as_str()),
            csv_cell(&tc.priority),
            csv_cell(&tc.condition),
            csv_cell(&tc.page_url),
            csv_cell(&tc.page_title),
            csv_cell(&tc.form_name),
            csv_cell(if tc.mapped { "Yes" } else { "No" }),
            csv_list(&tc.manual_steps),
            csv_list(&tc.automation_steps),
        ])
    }));
    lines.join("\n")
}

pub fn execution_csv(result: &ExecutionResult) -> String {
    let mut lines = vec![csv_header(&EXECUTION_CSV_HEADER)];
    lines.extend(result.results.iter().map(|r| {
        csv_row(vec![
            csv_cell(&r.tc_id),
            csv_cell(&r.condition),
            csv_cell(&r.status.to_string()),
            csv_cell(&format!("{:.2}", r.duration_seconds)),
            csv_optional(r.error_message.as_deref()),
            csv_optional(r.screenshot_path.as_deref()),
            csv_cell(&r.log),
        ])
    }));
    lines.join("\n")
}
