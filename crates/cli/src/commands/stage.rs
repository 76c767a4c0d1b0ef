//! Pipeline stage commands: analyze, explore, combine, execute, report

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use qaflow_common::{ExecRecord, ExplorerResult, PageRecord, Panel, RunOutcome, StageInput};

use super::{cases, write_file, Context};
use crate::output::{
    print_heading, print_info, print_json, print_list, print_success, print_warning, status_label,
    OutputFormat, TableDisplay,
};
use crate::samples;

const REPORT_FILE: &str = "test_report.html";
const PREVIEW_FILE: &str = "report_preview.html";

/// Where the user story comes from
#[derive(Args, Debug, Clone, Default)]
pub struct StorySource {
    /// User story text
    #[arg(short, long)]
    pub story: Option<String>,

    /// Read the user story from a file
    #[arg(long, conflicts_with = "story")]
    pub story_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: StorySource,

    /// Use a built-in example story (login, signup, search)
    #[arg(long)]
    pub example: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExploreArgs {
    /// Website URL to crawl
    #[arg(short, long)]
    pub url: Option<String>,

    /// Crawl depth (0-2)
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Use a built-in example URL (login, signup, search)
    #[arg(long)]
    pub example: Option<String>,
}

#[derive(Args, Debug)]
pub struct CombineArgs {
    #[command(flatten)]
    pub source: StorySource,

    /// Website URL to map the test cases onto
    #[arg(short, long)]
    pub url: Option<String>,

    /// Crawl depth (0-2)
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Use a built-in example story and URL (login, signup, search)
    #[arg(long)]
    pub example: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExecuteArgs {
    /// Show the browser window while tests run
    #[arg(long)]
    pub headed: bool,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Generate the HTML report from the stored execution results
    Generate {
        /// Save the report preview to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the report the backend last generated
    Download {
        /// Directory to save test_report.html into
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

fn example(lookup: fn(&str) -> Option<&'static str>, name: &str) -> Result<&'static str> {
    match lookup(name) {
        Some(value) => Ok(value),
        None => bail!(
            "unknown example '{}' (available: {})",
            name,
            samples::names().join(", ")
        ),
    }
}

/// Resolve the story text; an absent story becomes empty so validation names it
fn resolve_story(source: StorySource, example_name: Option<&str>) -> Result<String> {
    if let Some(story) = source.story {
        return Ok(story);
    }
    if let Some(path) = source.story_file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("reading story from {}", path.display()));
    }
    match example_name {
        Some(name) => Ok(example(samples::story, name)?.to_string()),
        None => Ok(String::new()),
    }
}

fn resolve_url(url: Option<String>, example_name: Option<&str>) -> Result<String> {
    match (url, example_name) {
        (Some(url), _) => Ok(url),
        (None, Some(name)) => Ok(example(samples::url, name)?.to_string()),
        (None, None) => Ok(String::new()),
    }
}

/// Select the stage's panel and run it. Returns false when the stage was
/// already in flight here or in another invocation.
async fn run(ctx: &Context, panel: Panel, input: StageInput) -> Result<bool> {
    ctx.controller.select_stage(panel);
    input.validate()?;
    if !ctx.claim_stage(input.stage())? {
        print_warning(&format!(
            "{} is already running in another qaflow process",
            panel.title()
        ));
        return Ok(false);
    }
    match ctx.controller.run_stage(input).await? {
        RunOutcome::Completed => Ok(true),
        RunOutcome::AlreadyRunning => {
            print_warning(&format!("{} is already running", panel.title()));
            Ok(false)
        }
    }
}

pub async fn analyze(args: AnalyzeArgs, ctx: &Context) -> Result<()> {
    let story = resolve_story(args.source, args.example.as_deref())?;
    if run(ctx, Panel::Story, StageInput::Analyze { story }).await? {
        cases::render_analysis(ctx, None)?;
    }
    Ok(())
}

pub async fn explore(args: ExploreArgs, ctx: &Context) -> Result<()> {
    let url = resolve_url(args.url, args.example.as_deref())?;
    let depth = ctx.config.depth(args.depth);
    if run(ctx, Panel::Url, StageInput::Explore { url, depth }).await? {
        ctx.controller.with_store(|store| {
            if let Some(result) = store.explorer() {
                render_explorer(result, ctx.format);
            }
        });
    }
    Ok(())
}

pub async fn combine(args: CombineArgs, ctx: &Context) -> Result<()> {
    let example_name = args.example.as_deref();
    let story = resolve_story(args.source, example_name)?;
    let url = resolve_url(args.url, example_name)?;
    let depth = ctx.config.depth(args.depth);
    if run(ctx, Panel::Combo, StageInput::Combine { story, url, depth }).await? {
        cases::render_combined(ctx, None)?;
    }
    Ok(())
}

pub async fn execute(args: ExecuteArgs, ctx: &Context) -> Result<()> {
    let headless = !args.headed && ctx.config.headless;
    if run(ctx, Panel::Exec, StageInput::Execute { headless }).await? {
        ctx.controller.with_store(|store| {
            if let Some(result) = store.execution() {
                render_execution(&result.results, ctx.format, || {
                    let s = result.summary;
                    println!(
                        "Total: {}  Passed: {}  Failed: {}  Errors: {}  Pass rate: {:.1}%",
                        s.total,
                        s.passed,
                        s.failed,
                        s.errored,
                        s.pass_rate()
                    );
                });
            }
        });
    }
    Ok(())
}

pub async fn report(cmd: ReportCommands, ctx: &Context) -> Result<()> {
    match cmd {
        ReportCommands::Generate { output } => {
            if !run(ctx, Panel::Report, StageInput::Report).await? {
                return Ok(());
            }
            let Some(html) = ctx.controller.report_preview() else {
                return Ok(());
            };
            let path = match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &html)?;
                    path
                }
                None => write_file(&ctx.config.state_dir, PREVIEW_FILE, html.as_bytes())?,
            };
            print_success(&format!("Report generated ({} bytes)", html.len()));
            print_info(&format!("Preview saved to {}", path.display()));
        }

        ReportCommands::Download { out_dir } => {
            ctx.controller.select_stage(Panel::Report);
            let bytes = ctx.controller.download_report().await?;
            let path = write_file(&ctx.output_dir(out_dir), REPORT_FILE, &bytes)?;
            print_success(&format!("Report saved to {}", path.display()));
        }
    }
    Ok(())
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Serialize)]
pub struct PageDisplay {
    pub url: String,
    pub title: String,
    pub forms: usize,
    pub links: usize,
    pub error: Option<String>,
}

impl From<&PageRecord> for PageDisplay {
    fn from(page: &PageRecord) -> Self {
        Self {
            url: page.url.clone(),
            title: page.title.clone(),
            forms: page.forms.len(),
            links: page.links.len(),
            error: page.error.clone(),
        }
    }
}

impl TableDisplay for PageDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["URL", "Title", "Forms", "Links", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.url.clone(),
            self.title.clone(),
            self.forms.to_string(),
            self.links.to_string(),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

fn render_explorer(result: &ExplorerResult, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(result);
        return;
    }
    print_heading(Panel::Url.title());
    if let Some(start) = &result.start_url {
        println!("Start URL: {}", start);
    }
    println!(
        "Pages: {}  Forms: {}  Links: {}",
        result.pages.len(),
        result.form_count(),
        result.link_count()
    );
    let pages: Vec<PageDisplay> = result.pages.iter().map(PageDisplay::from).collect();
    print_list(&pages, format);
}

#[derive(Serialize)]
pub struct ExecRecordDisplay {
    pub tc_id: String,
    pub condition: String,
    pub status: qaflow_common::ExecStatus,
    pub duration_seconds: f64,
    pub error_message: Option<String>,
}

impl From<&ExecRecord> for ExecRecordDisplay {
    fn from(record: &ExecRecord) -> Self {
        Self {
            tc_id: record.tc_id.clone(),
            condition: record.condition.clone(),
            status: record.status,
            duration_seconds: record.duration_seconds,
            error_message: record.error_message.clone(),
        }
    }
}

impl TableDisplay for ExecRecordDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["TC ID", "Condition", "Status", "Duration", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.tc_id.clone(),
            self.condition.clone(),
            status_label(self.status),
            format!("{:.2}s", self.duration_seconds),
            self.error_message.clone().unwrap_or_default(),
        ]
    }
}

fn render_execution(records: &[ExecRecord], format: OutputFormat, summary: impl FnOnce()) {
    let rows: Vec<ExecRecordDisplay> = records.iter().map(ExecRecordDisplay::from).collect();
    if format != OutputFormat::Json {
        print_heading(Panel::Exec.title());
        summary();
    }
    print_list(&rows, format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_story_sources() {
        let direct = StorySource {
            story: Some("As a user".into()),
            story_file: None,
        };
        assert_eq!(resolve_story(direct, Some("login")).unwrap(), "As a user");

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("story.txt");
        std::fs::write(&path, "As an admin").unwrap();
        let from_file = StorySource {
            story: None,
            story_file: Some(path),
        };
        assert_eq!(resolve_story(from_file, None).unwrap(), "As an admin");

        let sample = resolve_story(StorySource::default(), Some("login")).unwrap();
        assert_eq!(Some(sample.as_str()), samples::story("login"));

        // Left empty so the controller reports the missing field
        assert_eq!(resolve_story(StorySource::default(), None).unwrap(), "");
    }

    #[test]
    fn test_unknown_example_is_rejected() {
        let err = resolve_url(None, Some("checkout")).unwrap_err();
        assert!(err.to_string().contains("login"));
        assert_eq!(
            resolve_url(Some("https://example.com".into()), Some("login")).unwrap(),
            "https://example.com"
        );
    }
}
