use std::fs;
use std::path::{Path, PathBuf};

use crate::io::document_io::{atomic_write, normalize_status_markers};
use crate::model::document::TaskDocument;
use crate::parse::{links, parse_document};

/// What one re-diff tick produced. A tagged result returned to the caller,
/// who decides whether to merge or swap; the tracker never reaches into
/// consumer state.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Nothing changed on disk, and no link counter moved
    Unchanged,
    /// Document bytes are unchanged; only link counters were refreshed,
    /// in place, on this many nodes. Node identity is preserved, so
    /// consumer state keyed by it (selection, in-flight edits) survives.
    LinksUpdated(usize),
    /// Document bytes changed: a full reparse replaced the model wholesale
    Replaced(TaskDocument),
}

enum TrackerState {
    Idle,
    Tracking { path: PathBuf, snapshot: String },
}

/// The re-diff state machine: `Idle` until a document is bound, then
/// `Tracking` with the last-seen content. Each tick compares bytes first,
/// so per-link filesystem probing only happens when the document itself
/// did not move.
pub struct DocumentTracker {
    state: TrackerState,
    normalize_legacy: bool,
}

impl DocumentTracker {
    pub fn new(normalize_legacy: bool) -> Self {
        DocumentTracker {
            state: TrackerState::Idle,
            normalize_legacy,
        }
    }

    /// Bind a document. Rebinding replaces any previous binding: tracking
    /// slots are restarted, never stacked.
    pub fn track(&mut self, path: PathBuf, snapshot: String) {
        self.state = TrackerState::Tracking { path, snapshot };
    }

    pub fn stop(&mut self) {
        self.state = TrackerState::Idle;
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking { .. })
    }

    /// Run one tick against the current on-disk state. A failed read is
    /// swallowed: the tick reports `Unchanged` and the next one retries.
    pub fn tick(&mut self, doc: &mut TaskDocument) -> RefreshOutcome {
        let TrackerState::Tracking { path, snapshot } = &mut self.state else {
            return RefreshOutcome::Unchanged;
        };

        let mut current = match fs::read_to_string(&*path) {
            Ok(text) => text,
            Err(_) => return RefreshOutcome::Unchanged,
        };

        if self.normalize_legacy
            && let Some(normalized) = normalize_status_markers(&current)
        {
            // Converge the file to canonical spellings; a failed write is
            // retried on a later tick
            let _ = atomic_write(path, normalized.as_bytes());
            current = normalized;
        }

        if current != *snapshot {
            let replacement = parse_document(&current, path);
            *snapshot = current;
            return RefreshOutcome::Replaced(replacement);
        }

        let changed = refresh_link_counts(doc);
        if changed > 0 {
            RefreshOutcome::LinksUpdated(changed)
        } else {
            RefreshOutcome::Unchanged
        }
    }
}

/// Recompute `link_count`/`link_exists` for every node against the current
/// filesystem state, mutating only those two counters. Returns how many
/// nodes changed.
pub fn refresh_link_counts(doc: &mut TaskDocument) -> usize {
    let base_dir = doc
        .file_path
        .parent()
        .unwrap_or(Path::new(""))
        .to_path_buf();
    let mut changed = 0;
    doc.for_each_task_mut(|task| {
        let scan_text = format!("{}\n{}", task.title, task.body);
        let stats = links::link_stats(&scan_text, &base_dir);
        if stats.count != task.link_count || stats.exists != task.link_exists {
            task.link_count = stats.count;
            task.link_exists = stats.exists;
            changed += 1;
        }
    });
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_and_load(tmp: &TempDir, source: &str) -> (PathBuf, TaskDocument, DocumentTracker) {
        let path = tmp.path().join("doc.md");
        fs::write(&path, source).unwrap();
        let doc = parse_document(source, &path);
        let mut tracker = DocumentTracker::new(true);
        tracker.track(path.clone(), source.to_string());
        (path, doc, tracker)
    }

    #[test]
    fn test_idle_tick_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let (_, mut doc, mut tracker) = write_and_load(&tmp, "## R1 a\n");
        tracker.stop();
        assert!(matches!(tracker.tick(&mut doc), RefreshOutcome::Unchanged));
    }

    #[test]
    fn test_unchanged_document_and_links() {
        let tmp = TempDir::new().unwrap();
        let (_, mut doc, mut tracker) = write_and_load(&tmp, "## R1 a\nno links here\n");
        assert!(matches!(tracker.tick(&mut doc), RefreshOutcome::Unchanged));
    }

    #[test]
    fn test_content_change_replaces_model() {
        let tmp = TempDir::new().unwrap();
        let (path, mut doc, mut tracker) = write_and_load(&tmp, "## R1 a\n");
        fs::write(&path, "## R1 a\n\n### R1.1 b\n").unwrap();

        match tracker.tick(&mut doc) {
            RefreshOutcome::Replaced(new_doc) => {
                assert_eq!(new_doc.tasks[0].children.len(), 1);
            }
            other => panic!("expected Replaced, got {:?}", other),
        }
        // Snapshot updated: the next tick sees no change
        assert!(matches!(tracker.tick(&mut doc), RefreshOutcome::Unchanged));
    }

    #[test]
    fn test_link_target_appearing_updates_counters_in_place() {
        let tmp = TempDir::new().unwrap();
        let (_, mut doc, mut tracker) =
            write_and_load(&tmp, "## R1 a\nSee [x](./x.md)\n");
        assert_eq!(doc.tasks[0].link_count, 1);
        assert_eq!(doc.tasks[0].link_exists, 0);

        // The document itself is untouched; only the link target appears
        fs::write(tmp.path().join("x.md"), "now exists").unwrap();

        match tracker.tick(&mut doc) {
            RefreshOutcome::LinksUpdated(nodes) => assert_eq!(nodes, 1),
            other => panic!("expected LinksUpdated, got {:?}", other),
        }
        assert_eq!(doc.tasks[0].link_count, 1);
        assert_eq!(doc.tasks[0].link_exists, 1);

        // Counters settled: nothing further to report
        assert!(matches!(tracker.tick(&mut doc), RefreshOutcome::Unchanged));
    }

    #[test]
    fn test_vanished_file_is_swallowed() {
        let tmp = TempDir::new().unwrap();
        let (path, mut doc, mut tracker) = write_and_load(&tmp, "## R1 a\n");
        fs::remove_file(&path).unwrap();
        assert!(matches!(tracker.tick(&mut doc), RefreshOutcome::Unchanged));

        // File comes back with new content: tracking resumes normally
        fs::write(&path, "## R1 a\n## R2 b\n").unwrap();
        assert!(matches!(
            tracker.tick(&mut doc),
            RefreshOutcome::Replaced(_)
        ));
    }

    #[test]
    fn test_legacy_markers_normalized_during_tick() {
        let tmp = TempDir::new().unwrap();
        let (path, mut doc, mut tracker) = write_and_load(&tmp, "## R1 a\n");
        fs::write(&path, "## R1 [Finished] a\n").unwrap();

        match tracker.tick(&mut doc) {
            RefreshOutcome::Replaced(new_doc) => assert!(new_doc.tasks[0].completed),
            other => panic!("expected Replaced, got {:?}", other),
        }
        // The on-disk file converged to the canonical spelling
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "## R1 [completed] a\n"
        );
    }

    #[test]
    fn test_retarget_replaces_binding() {
        let tmp = TempDir::new().unwrap();
        let (_, mut doc_a, mut tracker) = write_and_load(&tmp, "## R1 a\n");

        let path_b = tmp.path().join("other.md");
        fs::write(&path_b, "## R5 b\n").unwrap();
        tracker.track(path_b.clone(), "## R5 b\n".to_string());

        // Ticks now watch the new document only
        fs::write(&path_b, "## R5 b\n## R6 c\n").unwrap();
        assert!(matches!(
            tracker.tick(&mut doc_a),
            RefreshOutcome::Replaced(_)
        ));
    }

    #[test]
    fn test_noop_rewrite_keeps_counters() {
        let tmp = TempDir::new().unwrap();
        let source = "## R1 a\nSee [x](./x.md)\n";
        fs::write(tmp.path().join("x.md"), "content").unwrap();
        let (path, mut doc, mut tracker) = write_and_load(&tmp, source);
        assert_eq!(doc.tasks[0].link_exists, 1);

        // Re-save the same bytes: no structural change, no counter change
        fs::write(&path, source).unwrap();
        assert!(matches!(tracker.tick(&mut doc), RefreshOutcome::Unchanged));
        assert_eq!(doc.tasks[0].link_count, 1);
        assert_eq!(doc.tasks[0].link_exists, 1);
    }
}
