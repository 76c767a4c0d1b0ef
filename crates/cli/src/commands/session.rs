//! Session commands: status, select, reset

use anyhow::Result;
use serde::Serialize;

use qaflow_common::{Gates, Panel, Slot, ViewState};

use super::Context;
use crate::output::{print_heading, print_json, print_success, print_warning, OutputFormat};

#[derive(Serialize)]
struct SlotStatus {
    slot: String,
    present: bool,
    items: usize,
}

#[derive(Serialize)]
struct StatusReport {
    backend_url: String,
    backend_reachable: bool,
    view: ViewState,
    slots: Vec<SlotStatus>,
    gates: Gates,
    run_hint: String,
    report_hint: String,
    report_generated: bool,
}

pub async fn status(ctx: &Context) -> Result<()> {
    let backend_reachable = ctx.backend.health_check().await;
    let gates = ctx.controller.gates();
    let (slots, run_hint, report_hint) = ctx.controller.with_store(|store| {
        let slots = Slot::ALL
            .iter()
            .map(|&slot| SlotStatus {
                slot: slot.to_string(),
                present: store.is_present(slot),
                items: match slot {
                    Slot::Analysis => store.analysis().map_or(0, |a| a.test_cases().len()),
                    Slot::Explorer => store.explorer().map_or(0, |e| e.pages.len()),
                    Slot::Combined => store.combined().map_or(0, |c| c.test_cases.len()),
                    Slot::Execution => store.execution().map_or(0, |e| e.results.len()),
                },
            })
            .collect::<Vec<_>>();
        (slots, gates.run_hint(store), gates.report_hint(store))
    });

    let report = StatusReport {
        backend_url: ctx.backend.base_url().to_string(),
        backend_reachable,
        view: ctx.controller.view(),
        slots,
        gates,
        run_hint,
        report_hint,
        report_generated: ctx.controller.report_preview().is_some(),
    };

    if ctx.format == OutputFormat::Json {
        print_json(&report);
        return Ok(());
    }

    print_heading("qaflow status");
    if report.backend_reachable {
        println!("Backend:  ✅ {}", report.backend_url);
    } else {
        println!("Backend:  ❌ {} (not responding)", report.backend_url);
    }
    println!("Panel:    {}", report.view.active.title());
    if let Some(message) = &report.view.error_banner {
        print_warning(message);
    }
    println!();
    for slot in &report.slots {
        let mark = if slot.present { "●" } else { "○" };
        println!("  {} {:<10} {}", mark, slot.slot, slot.items);
    }
    println!();
    let flag = |open: bool| if open { "enabled" } else { "disabled" };
    println!("Execute: {}  {}", flag(gates.can_run), report.run_hint);
    println!("Report:  {}  {}", flag(gates.can_report), report.report_hint);
    Ok(())
}

/// Switch the active panel
pub fn select(panel: &str, ctx: &Context) -> Result<()> {
    let panel: Panel = panel.parse()?;
    ctx.controller.select_stage(panel);
    print_success(&format!("Switched to {}", panel.title()));
    Ok(())
}

/// Drop all stored results and delete the saved session
pub fn reset(ctx: &Context) -> Result<()> {
    ctx.controller.reset();
    ctx.session().clear()?;
    print_success("Session reset");
    Ok(())
}
