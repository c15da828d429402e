use std::path::Path;

use serde::Serialize;

use crate::model::document::TaskDocument;
use crate::model::task::TaskNode;
use crate::parse::links;

/// Structured result from `rq check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    pub valid: bool,
    pub broken: Vec<BrokenLink>,
    pub warnings: Vec<CheckWarning>,
}

/// A link target that does not resolve to an existing filesystem entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLink {
    pub task_id: String,
    pub target: String,
}

/// A non-critical issue worth surfacing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Declaration carries both `[completed]` and `[in_progress]`
    #[serde(rename = "conflicting_status")]
    ConflictingStatus { task_id: String },
}

/// Validate a parsed document and return structured results.
///
/// This is a read-only operation — it does not modify the document.
pub fn check_document(doc: &TaskDocument) -> CheckReport {
    let mut report = CheckReport::default();
    let base_dir = doc
        .file_path
        .parent()
        .unwrap_or(Path::new(""))
        .to_path_buf();

    doc.for_each_task(|task| check_task(task, &base_dir, &mut report));

    report.valid = report.broken.is_empty();
    report
}

fn check_task(task: &TaskNode, base_dir: &Path, report: &mut CheckReport) {
    let scan_text = format!("{}\n{}", task.title, task.body);
    for target in links::broken_targets(&scan_text, base_dir) {
        report.broken.push(BrokenLink {
            task_id: task.id.clone(),
            target,
        });
    }

    if task.completed && task.in_progress {
        report.warnings.push(CheckWarning::ConflictingStatus {
            task_id: task.id.clone(),
        });
    }
}
