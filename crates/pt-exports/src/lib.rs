//! # pt-exports
//!
//! Renders a [`ProjectExportView`] into a downloadable file: a CSV budget
//! sheet or a Markdown project brief. Renderers are pure; loading and access
//! checks happen in the service layer.

pub mod brief;
pub mod budget;
pub mod error;
pub mod view;

pub use brief::render_brief_document;
pub use budget::render_budget_sheet;
pub use error::{ExportError, ExportResult};
pub use view::{BudgetLine, ProjectExportView, TaskLine};

use serde::{Deserialize, Serialize};

/// Export flavours offered per project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    BudgetSheet,
    Brief,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::BudgetSheet => "csv",
            Self::Brief => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::BudgetSheet => "text/csv; charset=utf-8",
            Self::Brief => "text/markdown; charset=utf-8",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::BudgetSheet => "budget",
            Self::Brief => "brief",
        }
    }

    /// `budget_<id>_<slug>.csv` or `brief_<id>_<slug>.md`
    pub fn filename(&self, view: &ProjectExportView) -> String {
        format!(
            "{}_{}_{}.{}",
            self.prefix(),
            view.project.id,
            view.project.file_slug(),
            self.extension()
        )
    }
}

/// A rendered export, ready to send
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render `view` in the requested format
pub fn render(kind: ExportKind, view: &ProjectExportView) -> ExportResult<ExportedFile> {
    let bytes = match kind {
        ExportKind::BudgetSheet => render_budget_sheet(view)?,
        ExportKind::Brief => render_brief_document(view)?,
    };
    Ok(ExportedFile {
        filename: kind.filename(view),
        content_type: kind.mime_type(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filenames() {
        let view = view::fixtures::view();
        assert_eq!(
            ExportKind::BudgetSheet.filename(&view),
            "budget_12_Corporate_website_re.csv"
        );
        assert_eq!(
            ExportKind::Brief.filename(&view),
            "brief_12_Corporate_website_re.md"
        );
    }

    #[test]
    fn test_render_sets_metadata() {
        let file = render(ExportKind::Brief, &view::fixtures::view()).unwrap();
        assert_eq!(file.content_type, "text/markdown; charset=utf-8");
        assert!(file.filename.ends_with(".md"));
        assert!(!file.bytes.is_empty());
    }
}
