//! Rendering helpers for human-readable artifacts.
//!
//! Markdown for plans and runs, HTML for the evidence binder report.

mod html;

pub use html::{AuditSearch, SCHEDULED_AUDIT_SEARCHES, render_binder_html};

use purviewx_types::apply::ApplyDocument;
use purviewx_types::plan::PlanDocument;
use purviewx_types::run::StepStatus;

pub fn render_plan_md(plan: &PlanDocument) -> String {
    let mut out = String::new();
    out.push_str("# purviewx plan\n\n");
    out.push_str(&format!("- Cloud: {}\n", plan.cloud));
    out.push_str(&format!(
        "- Configuration checksum: `{}`\n",
        plan.config_checksum
    ));
    out.push_str(&format!(
        "- Steps: {} (estimated {:.1}s)\n\n",
        plan.summary.steps_total,
        plan.summary.estimated_ms as f64 / 1000.0
    ));

    if !plan.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for w in &plan.warnings {
            out.push_str(&format!("- {}\n", w));
        }
        out.push('\n');
    }

    out.push_str("## Steps\n\n");
    if plan.steps.is_empty() {
        out.push_str("_No steps planned._\n");
        return out;
    }

    for (i, step) in plan.steps.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, step.title));
        out.push_str(&format!("- Id: `{}`\n", step.id));
        out.push_str(&format!("- Duration: {} ms\n", step.duration_ms));
        out.push_str(&format!("\n{}\n\n", step.details));
    }

    out
}

pub fn render_run_md(apply: &ApplyDocument) -> String {
    let mut out = String::new();
    out.push_str("# purviewx apply\n\n");
    out.push_str(&format!("- Run: `{}`\n", apply.run_id));
    out.push_str(&format!("- State: `{}`\n", apply.state));
    out.push_str(&format!(
        "- Total: {}\n- Completed: {}\n- Failed: {}\n- Pending: {}\n\n",
        apply.summary.total, apply.summary.completed, apply.summary.failed, apply.summary.pending
    ));

    if !apply.errors.is_empty() {
        out.push_str("## Errors\n\n");
        for e in &apply.errors {
            out.push_str(&format!("- {}\n", e));
        }
        out.push('\n');
    }

    out.push_str("## Results\n\n");
    if apply.results.is_empty() {
        out.push_str("_No results._\n");
        return out;
    }

    for (i, r) in apply.results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} `{}` {}\n",
            i + 1,
            status_marker(r.status),
            r.status,
            r.title
        ));
        if let Some(msg) = &r.message {
            out.push_str(&format!("   - {}\n", msg));
        }
    }

    out
}

fn status_marker(s: StepStatus) -> &'static str {
    match s {
        StepStatus::Pending => "[ ]",
        StepStatus::Running => "[~]",
        StepStatus::Completed => "[x]",
        StepStatus::Failed => "[!]",
    }
}
