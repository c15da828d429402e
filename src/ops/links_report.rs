use indexmap::IndexMap;

use crate::model::document::TaskDocument;
use crate::parse::links::LinkStats;

/// Per-task link stats keyed by identifier, in document order.
pub fn link_report(doc: &TaskDocument) -> IndexMap<String, LinkStats> {
    let mut report = IndexMap::new();
    doc.for_each_task(|task| {
        report.insert(
            task.id.clone(),
            LinkStats {
                count: task.link_count,
                exists: task.link_exists,
            },
        );
    });
    report
}
