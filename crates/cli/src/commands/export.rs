//! Export Commands

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use qaflow_common::{ExportFormat, ExportKind};

use super::{write_file, Context};
use crate::output::{print_info, print_json, print_success, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Story analysis test cases (test_cases.*)
    TestCases,
    /// Crawled website structure (website_structure.json)
    WebsiteStructure,
    /// Combined test cases (combined_test_cases.*)
    Combined,
    /// Execution results (execution_results.*)
    Execution,
}

impl From<KindArg> for ExportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::TestCases => ExportKind::TestCases,
            KindArg::WebsiteStructure => ExportKind::WebsiteStructure,
            KindArg::Combined => ExportKind::CombinedTestCases,
            KindArg::Execution => ExportKind::ExecutionResults,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum FileFormat {
    #[default]
    Json,
    Csv,
}

impl From<FileFormat> for ExportFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Json => ExportFormat::Json,
            FileFormat::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Result to export
    #[arg(value_enum)]
    pub kind: KindArg,

    /// File format
    #[arg(long = "as", value_enum, default_value = "json")]
    pub file_format: FileFormat,

    /// Output directory (defaults to the configured export_dir)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct Written {
    path: PathBuf,
    content_type: &'static str,
    bytes: usize,
}

pub fn execute(args: ExportArgs, ctx: &Context) -> Result<()> {
    let kind = ExportKind::from(args.kind);
    let Some(artifact) = ctx.controller.export(kind, args.file_format.into())? else {
        // Nothing stored for this kind; no file is written
        if ctx.format != OutputFormat::Json {
            print_info(&format!("No {} results to export.", kind));
        }
        return Ok(());
    };

    let dir = ctx.output_dir(args.out_dir);
    let path = write_file(&dir, &artifact.file_name, artifact.contents.as_bytes())?;
    info!(path = %path.display(), bytes = artifact.contents.len(), "export written");

    match ctx.format {
        OutputFormat::Json => print_json(&Written {
            path,
            content_type: artifact.content_type,
            bytes: artifact.contents.len(),
        }),
        _ => print_success(&format!("Exported {}", path.display())),
    }
    Ok(())
}
