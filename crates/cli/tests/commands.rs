use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

use qaflow_cli::commands::cases::{self, CasesArgs, ViewArg};
use qaflow_cli::commands::export::{self, ExportArgs, FileFormat, KindArg};
use qaflow_cli::commands::{session, Context};
use qaflow_cli::output::OutputFormat;
use qaflow_cli::session::Session;
use qaflow_cli::CliConfig;
use qaflow_common::{CombinedResult, CombinedTestCase, Panel, Snapshot, Stage};

fn config_in(dir: &Path) -> CliConfig {
    CliConfig {
        // Nothing in these tests reaches the backend
        backend_url: "http://127.0.0.1:9".into(),
        export_dir: dir.join("exports"),
        state_dir: dir.join("state"),
        ..CliConfig::default()
    }
}

/// Save a session holding two combined cases, one of them unmapped
fn seed_combined(config: &CliConfig) {
    let cases: Vec<CombinedTestCase> = serde_json::from_value(json!([
        {"tc_id": "TC-001", "condition": "valid login", "type": "Positive", "priority": "High", "mapped": true},
        {"tc_id": "TC-002", "condition": "locked account", "type": "Negative", "priority": "Low", "mapped": false}
    ]))
    .unwrap();
    let mut snapshot = Snapshot::default();
    snapshot.store.set_combined(CombinedResult::new(cases));
    Session::new(config.session_path()).save(snapshot).unwrap();
}

#[test]
fn export_writes_combined_csv_into_out_dir() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    seed_combined(&config);
    let ctx = Context::open(config, OutputFormat::Plain).unwrap();

    let out = tmp.path().join("out");
    export::execute(
        ExportArgs {
            kind: KindArg::Combined,
            file_format: FileFormat::Csv,
            out_dir: Some(out.clone()),
        },
        &ctx,
    )
    .unwrap();

    let csv = std::fs::read_to_string(out.join("combined_test_cases.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with(r#""TC ID","Feature""#));
    assert!(lines[2].contains(r#""TC-002""#));
    assert!(lines[2].contains(r#","No","#));
}

#[test]
fn export_defaults_to_configured_dir() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    seed_combined(&config);
    let export_dir = config.export_dir.clone();
    let ctx = Context::open(config, OutputFormat::Json).unwrap();

    export::execute(
        ExportArgs {
            kind: KindArg::Combined,
            file_format: FileFormat::Json,
            out_dir: None,
        },
        &ctx,
    )
    .unwrap();

    let written = std::fs::read_to_string(export_dir.join("combined_test_cases.json")).unwrap();
    let parsed: CombinedResult = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed.summary.total, 2);
    assert_eq!(parsed.summary.unmapped, 1);
}

#[test]
fn export_of_empty_slot_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    seed_combined(&config);
    let ctx = Context::open(config, OutputFormat::Plain).unwrap();

    let out = tmp.path().join("out");
    for (kind, file_format) in [
        (KindArg::Execution, FileFormat::Csv),
        (KindArg::TestCases, FileFormat::Json),
        (KindArg::WebsiteStructure, FileFormat::Json),
    ] {
        export::execute(
            ExportArgs {
                kind,
                file_format,
                out_dir: Some(out.clone()),
            },
            &ctx,
        )
        .unwrap();
    }
    assert!(!out.exists());
}

#[test]
fn cases_filter_and_unknown_keys() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    seed_combined(&config);
    let ctx = Context::open(config, OutputFormat::Json).unwrap();

    cases::execute(
        CasesArgs {
            view: None,
            filter: Some("unmapped".into()),
        },
        &ctx,
    )
    .unwrap();
    assert_eq!(
        ctx.controller
            .with_board(qaflow_common::CardView::Combined, |b| b.visible_count()),
        1
    );

    let err = cases::execute(
        CasesArgs {
            view: Some(ViewArg::Analysis),
            filter: Some("unmapped".into()),
        },
        &ctx,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<qaflow_common::Error>(),
        Some(qaflow_common::Error::UnknownFilter(_))
    ));
}

#[test]
fn saved_selection_survives_to_next_invocation() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    seed_combined(&config);

    let ctx = Context::open(config.clone(), OutputFormat::Plain).unwrap();
    session::select("exec", &ctx).unwrap();
    ctx.save().unwrap();
    drop(ctx);

    let resumed = Context::open(config, OutputFormat::Plain).unwrap();
    assert_eq!(resumed.controller.view().active, Panel::Exec);
    assert!(resumed.controller.gates().can_run);
}

#[test]
fn claimed_stage_is_released_with_the_context() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());

    let first = Context::open(config.clone(), OutputFormat::Plain).unwrap();
    let second = Context::open(config, OutputFormat::Plain).unwrap();
    assert!(first.claim_stage(Stage::Combine).unwrap());
    assert!(!second.claim_stage(Stage::Combine).unwrap());
    assert!(second.claim_stage(Stage::Explore).unwrap());

    drop(first);
    assert!(second.claim_stage(Stage::Combine).unwrap());
}

#[test]
fn reset_removes_the_saved_session() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    seed_combined(&config);
    let session_path = config.session_path();

    let ctx = Context::open(config, OutputFormat::Plain).unwrap();
    session::reset(&ctx).unwrap();
    assert!(!session_path.exists());
    assert!(ctx.controller.with_store(|s| s.is_empty()));
}
