//! Budget sheet: project info, one row per task, total line

use csv::WriterBuilder;

use crate::error::{ExportError, ExportResult};
use crate::view::{format_amount, format_money, ProjectExportView};

const TASK_HEADER: [&str; 6] = ["No", "Task", "Assignee", "Deadline", "Status", "Cost"];
const BUDGET_HEADER: [&str; 4] = ["Category", "Planned", "Actual", "Variance"];

/// Render the budget sheet as CSV
pub fn render_budget_sheet(view: &ProjectExportView) -> ExportResult<Vec<u8>> {
    // Sections have different widths
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    let project = &view.project;
    writer.write_record([format!("Project budget: {}", project.title)])?;
    writer.write_record(["Status:", view.status_name.as_str()])?;
    let start_date = project.start_date.to_string();
    writer.write_record(["Start date:", start_date.as_str()])?;
    writer.write_record(["Project manager:", view.pm_display()])?;
    writer.write_record(["Customer:", view.customer_display()])?;
    let planned = format_amount(project.planned_budget);
    writer.write_record(["Planned budget:", planned.as_str()])?;

    writer.write_record(TASK_HEADER)?;
    for (i, task) in view.tasks.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            task.title.clone(),
            task.assignee_display().to_string(),
            task.deadline_display(),
            task.status_name.clone(),
            format_money(task.cost),
        ])?;
    }
    let total = format_money(view.total_cost());
    writer.write_record(["", "", "", "", "Total:", total.as_str()])?;

    if !view.budget_items.is_empty() {
        writer.write_record(BUDGET_HEADER)?;
        for item in &view.budget_items {
            writer.write_record([
                item.category.clone(),
                format_money(item.planned_amount),
                format_money(item.actual_amount),
                format_money(item.planned_amount - item.actual_amount),
            ])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))
}
