//! Project brief rendered as a Markdown document

use std::fmt::Write;

use crate::error::{ExportError, ExportResult};
use crate::view::{format_amount, ProjectExportView, DASH};

/// Pipes and newlines would break a table row
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Render the project brief as Markdown
pub fn render_brief_document(view: &ProjectExportView) -> ExportResult<Vec<u8>> {
    let mut out = String::new();
    write_brief(&mut out, view).map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(out.into_bytes())
}

fn write_brief(out: &mut String, view: &ProjectExportView) -> std::fmt::Result {
    let project = &view.project;

    writeln!(out, "# Technical brief: {}", project.title)?;
    writeln!(out)?;
    writeln!(out, "## Project details")?;
    writeln!(out)?;
    writeln!(out, "- **Status:** {}", view.status_name)?;
    writeln!(out, "- **Start date:** {}", project.start_date)?;
    match project.end_date {
        Some(end) => writeln!(out, "- **End date:** {}", end)?,
        None => writeln!(out, "- **End date:** in progress")?,
    }
    writeln!(
        out,
        "- **Planned budget:** {}",
        format_amount(project.planned_budget)
    )?;
    writeln!(out, "- **Project manager:** {}", view.pm_display())?;
    writeln!(out, "- **Customer:** {}", view.customer_display())?;
    writeln!(out)?;

    writeln!(out, "## Description")?;
    writeln!(out)?;
    if project.description.trim().is_empty() {
        writeln!(out, "{}", DASH)?;
    } else {
        writeln!(out, "{}", project.description.trim())?;
    }
    writeln!(out)?;

    writeln!(out, "## Tasks")?;
    writeln!(out)?;
    writeln!(out, "| No | Task | Assignee | Deadline | Status |")?;
    writeln!(out, "|---:|------|----------|----------|--------|")?;
    for (i, task) in view.tasks.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            i + 1,
            cell(&task.title),
            cell(task.assignee_display()),
            task.deadline_display(),
            cell(&task.status_name),
        )?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "_Generated: {}_",
        view.generated_at.format("%d.%m.%Y %H:%M")
    )
}
