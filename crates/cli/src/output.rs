//! Output formatting for CLI

use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use qaflow_common::types::{Category, CategoryStyle, ExecStatus};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() && format != OutputFormat::Json {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = table();
            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        OutputFormat::Json => print_json(items),
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize output: {}", e)),
    }
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", "━".repeat(60).dimmed());
    println!(" {}", title.bold());
    println!("{}", "━".repeat(60).dimmed());
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

/// Terminal colour for a category style
pub fn style_color(style: CategoryStyle) -> Option<Color> {
    match style {
        CategoryStyle::Positive => Some(Color::Green),
        CategoryStyle::Negative => Some(Color::Red),
        CategoryStyle::Boundary => Some(Color::Yellow),
        CategoryStyle::EdgeCase => Some(Color::Magenta),
        CategoryStyle::Default => None,
    }
}

pub fn category_label(category: &Category) -> String {
    match style_color(category.style()) {
        Some(color) => category.as_str().color(color).to_string(),
        None => category.as_str().to_string(),
    }
}

pub fn priority_label(priority: &str) -> String {
    match qaflow_common::types::priority_badge(priority).as_str() {
        "badge-high" => priority.red().bold().to_string(),
        "badge-medium" => priority.yellow().to_string(),
        "badge-low" => priority.green().to_string(),
        _ => priority.to_string(),
    }
}

pub fn status_label(status: ExecStatus) -> String {
    match status {
        ExecStatus::Pass => "✓ Pass".green().to_string(),
        ExecStatus::Fail => "✗ Fail".red().to_string(),
        ExecStatus::Error => "● Error".yellow().to_string(),
    }
}
