//! Test-case cards with category filters

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use qaflow_common::types::priority_badge;
use qaflow_common::{CardView, Category, CombinedTestCase, TestCase, TypeCounts};

use super::Context;
use crate::output::{
    category_label, print_heading, print_info, print_json, print_list, priority_label,
    OutputFormat, TableDisplay,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    /// Test cases from the story analysis
    Analysis,
    /// Test cases mapped onto the website
    Combined,
}

impl From<ViewArg> for CardView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Analysis => CardView::Analysis,
            ViewArg::Combined => CardView::Combined,
        }
    }
}

#[derive(Args, Debug)]
pub struct CasesArgs {
    /// Which collection to list (defaults to combined when available)
    #[arg(long, value_enum)]
    pub view: Option<ViewArg>,

    /// Show only one category: all, Positive, Negative, Boundary, "Edge Case",
    /// or unmapped (combined view only)
    #[arg(short, long)]
    pub filter: Option<String>,
}

pub fn execute(args: CasesArgs, ctx: &Context) -> Result<()> {
    let view = match args.view {
        Some(view) => CardView::from(view),
        None if ctx.controller.with_store(|s| s.combined().is_some()) => CardView::Combined,
        None => CardView::Analysis,
    };
    match view {
        CardView::Analysis => render_analysis(ctx, args.filter.as_deref()),
        CardView::Combined => render_combined(ctx, args.filter.as_deref()),
    }
}

/// Indices of the visible cards after applying `filter`
fn visible_indices(ctx: &Context, view: CardView, filter: Option<&str>) -> Result<Vec<usize>> {
    if let Some(key) = filter {
        ctx.controller.apply_filter(view, key)?;
    }
    Ok(ctx
        .controller
        .with_board(view, |board| board.visible().map(|card| card.index).collect()))
}

fn print_counts(total: usize, by_type: &TypeCounts) {
    let counts: Vec<String> = by_type
        .iter()
        .map(|(category, n)| format!("{}: {}", category_label(&category), n))
        .collect();
    println!("Total: {}  {}", total, counts.join("  "));
}

fn print_shown(shown: usize, total: usize, filter: Option<&str>) {
    if let Some(key) = filter {
        print_info(&format!("Showing {} of {} (filter: {})", shown, total, key));
    }
}

/// Border and badge keys emitted with each card in JSON output
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CardStyleKeys {
    pub border: &'static str,
    pub badge: &'static str,
    pub priority_badge: String,
}

impl CardStyleKeys {
    fn new(category: &Category, priority: &str) -> Self {
        let style = category.style();
        Self {
            border: style.border_key(),
            badge: style.badge_key(),
            priority_badge: priority_badge(priority),
        }
    }
}

// ============================================================================
// Analysis view
// ============================================================================

#[derive(Serialize)]
pub struct TestCaseDisplay {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub priority: String,
    pub steps: usize,
    pub expected_result: String,
    #[serde(flatten)]
    pub style: CardStyleKeys,
}

impl From<&TestCase> for TestCaseDisplay {
    fn from(tc: &TestCase) -> Self {
        Self {
            id: tc.id.clone(),
            title: tc.title.clone(),
            category: tc.category.clone(),
            priority: tc.priority.clone(),
            steps: tc.steps.len(),
            expected_result: tc.expected_result.clone(),
            style: CardStyleKeys::new(&tc.category, &tc.priority),
        }
    }
}

impl TableDisplay for TestCaseDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Title", "Type", "Priority", "Steps", "Expected Result"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            category_label(&self.category),
            priority_label(&self.priority),
            self.steps.to_string(),
            self.expected_result.clone(),
        ]
    }
}

/// Stats panel plus the visible analysis cards
pub fn render_analysis(ctx: &Context, filter: Option<&str>) -> Result<()> {
    let indices = visible_indices(ctx, CardView::Analysis, filter)?;
    let Some(stats) = ctx.controller.analysis_stats() else {
        print_info("No analysis results yet. Run `qaflow analyze` first.");
        return Ok(());
    };

    let (rows, feature, role, conditions) = ctx.controller.with_store(|store| {
        let Some(analysis) = store.analysis() else {
            return (Vec::new(), String::new(), String::new(), Vec::new());
        };
        let cases = analysis.test_cases();
        let rows: Vec<TestCaseDisplay> = indices
            .iter()
            .filter_map(|&i| cases.get(i))
            .map(TestCaseDisplay::from)
            .collect();
        (
            rows,
            analysis.feature().to_string(),
            analysis.user_role().to_string(),
            analysis.conditions().to_vec(),
        )
    });

    if ctx.format == OutputFormat::Json {
        print_json(&rows);
        return Ok(());
    }

    print_heading("Story Analysis");
    println!("Feature:   {}", feature);
    println!("User role: {}", role);
    if !conditions.is_empty() {
        println!("Conditions:");
        for condition in &conditions {
            println!("  • {}", condition);
        }
    }
    println!();
    print_counts(stats.total, &stats.by_type);
    print_list(&rows, ctx.format);
    print_shown(rows.len(), stats.total, filter);
    Ok(())
}

// ============================================================================
// Combined view
// ============================================================================

#[derive(Serialize)]
pub struct CombinedCaseDisplay {
    pub tc_id: String,
    pub condition: String,
    pub page: String,
    pub form_name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub priority: String,
    pub mapped: bool,
    #[serde(flatten)]
    pub style: CardStyleKeys,
}

impl From<&CombinedTestCase> for CombinedCaseDisplay {
    fn from(tc: &CombinedTestCase) -> Self {
        let page = if tc.page_title.is_empty() {
            tc.page_url.clone()
        } else {
            format!("{} ({})", tc.page_title, tc.page_url)
        };
        Self {
            tc_id: tc.tc_id.clone(),
            condition: tc.condition.clone(),
            page,
            form_name: tc.form_name.clone(),
            category: tc.category.clone(),
            priority: tc.priority.clone(),
            mapped: tc.mapped,
            style: CardStyleKeys::new(&tc.category, &tc.priority),
        }
    }
}

impl TableDisplay for CombinedCaseDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["TC ID", "Condition", "Page", "Form", "Type", "Priority", "Mapped"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.tc_id.clone(),
            self.condition.clone(),
            self.page.clone(),
            self.form_name.clone(),
            category_label(&self.category),
            priority_label(&self.priority),
            if self.mapped { "Yes" } else { "No" }.to_string(),
        ]
    }
}

/// Summary panel plus the visible combined cards
pub fn render_combined(ctx: &Context, filter: Option<&str>) -> Result<()> {
    let indices = visible_indices(ctx, CardView::Combined, filter)?;
    let Some((rows, summary)) = ctx.controller.with_store(|store| {
        store.combined().map(|combined| {
            let rows: Vec<CombinedCaseDisplay> = indices
                .iter()
                .filter_map(|&i| combined.test_cases.get(i))
                .map(CombinedCaseDisplay::from)
                .collect();
            (rows, combined.summary)
        })
    }) else {
        print_info("No combined test cases yet. Run `qaflow combine` first.");
        return Ok(());
    };

    if ctx.format == OutputFormat::Json {
        print_json(&rows);
        return Ok(());
    }

    print_heading("Combined Test Cases");
    print_counts(summary.total, &summary.by_type);
    println!("Mapped: {}  Unmapped: {}", summary.mapped, summary.unmapped);
    print_list(&rows, ctx.format);
    print_shown(rows.len(), summary.total, filter);
    Ok(())
}
