//! qaflow CLI - Main Entry Point
//!
//! Drives the test-case pipeline from the terminal: analyze a user story,
//! explore a website, combine both, execute the combined cases and report.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use qaflow_cli::commands::{cases, config, export, session, stage, Context};
use qaflow_cli::config::CliConfig;
use qaflow_cli::output::{self, print_error};

/// qaflow - Test Case Generation Pipeline
#[derive(Parser)]
#[command(name = "qaflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Backend address
    #[arg(long, env = "QAFLOW_BACKEND_URL", global = true)]
    backend_url: Option<String>,

    /// Directory holding the saved session
    #[arg(long, env = "QAFLOW_STATE_DIR", global = true)]
    state_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.qaflow/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test cases from a user story
    Analyze(stage::AnalyzeArgs),

    /// Crawl a website and list its pages and forms
    Explore(stage::ExploreArgs),

    /// Generate test cases mapped onto a website
    Combine(stage::CombineArgs),

    /// Run the combined test cases in a browser
    Execute(stage::ExecuteArgs),

    /// Generate or download the HTML report
    #[command(subcommand)]
    Report(stage::ReportCommands),

    /// List test-case cards
    Cases(cases::CasesArgs),

    /// Export a stored result as JSON or CSV
    Export(export::ExportArgs),

    /// Switch the active panel (story, url, combo, exec, report)
    Select {
        panel: String,
    },

    /// Show stored results and which actions are available
    Status,

    /// Clear all stored results
    Reset,

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Dropping the command future on Ctrl-C releases its stage locks
    let result = tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("interrupted")),
    };

    if let Err(e) = result {
        report_failure(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .unwrap_or_else(qaflow_common::default_config_path);
    let settings = CliConfig::load(&config_path)?.with_overrides(cli.backend_url, cli.state_dir);

    let command = match cli.command {
        Commands::Config(cmd) => return config::execute(cmd, &config_path, &settings, cli.format),
        Commands::Version => {
            println!("qaflow CLI v{}", qaflow_common::VERSION);
            println!("Backend: {}", settings.backend_url);
            return Ok(());
        }
        command => command,
    };

    let ctx = Context::open(settings, cli.format)?;
    let result = match command {
        Commands::Analyze(args) => stage::analyze(args, &ctx).await,
        Commands::Explore(args) => stage::explore(args, &ctx).await,
        Commands::Combine(args) => stage::combine(args, &ctx).await,
        Commands::Execute(args) => stage::execute(args, &ctx).await,
        Commands::Report(cmd) => stage::report(cmd, &ctx).await,
        Commands::Cases(args) => cases::execute(args, &ctx),
        Commands::Export(args) => export::execute(args, &ctx),
        Commands::Select { panel } => session::select(&panel, &ctx),
        Commands::Status => session::status(&ctx).await,
        // Reset deletes the session file; nothing left to save
        Commands::Reset => return session::reset(&ctx),
        Commands::Config(_) | Commands::Version => Ok(()),
    };

    // Failed runs still persist the error banner and panel selection
    let saved = ctx.save();
    result?;
    saved
}

/// Print a failure unless the error banner already showed it
fn report_failure(e: &anyhow::Error) {
    match e.downcast_ref::<qaflow_common::Error>() {
        Some(err) if err.is_operation_error() => {}
        _ => print_error(&format!("{:#}", e)),
    }
}
