use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::io::document_io::{DocumentError, read_document_text};
use crate::io::rediff::{DocumentTracker, RefreshOutcome};
use crate::model::document::TaskDocument;
use crate::parse::parse_document;

/// Events sent from the re-diff timer thread to the consumer.
#[derive(Debug)]
pub enum TrackEvent {
    /// The document changed on disk; here is the replacement model.
    Replaced(TaskDocument),
    /// Only link counters moved; this many nodes were updated.
    LinksUpdated { nodes: usize },
}

/// Periodic re-diff driver for one tracked document.
///
/// A single background thread owns the tracker and its model copy and runs
/// one tick per interval; at most one tick's work is ever in flight.
/// `poll()` should be called from the consumer's own loop.
pub struct DocumentWatcher {
    stop: Arc<AtomicBool>,
    rx: mpsc::Receiver<TrackEvent>,
    handle: Option<thread::JoinHandle<()>>,
    path: PathBuf,
}

impl DocumentWatcher {
    /// Parse the document and start ticking every `interval`.
    pub fn start(
        path: &Path,
        interval: Duration,
        normalize_legacy: bool,
    ) -> Result<Self, DocumentError> {
        let text = read_document_text(path, normalize_legacy)?;
        let mut doc = parse_document(&text, path);

        let mut tracker = DocumentTracker::new(normalize_legacy);
        tracker.track(path.to_path_buf(), text);

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                thread::sleep(interval);
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                let event = match tracker.tick(&mut doc) {
                    RefreshOutcome::Unchanged => continue,
                    RefreshOutcome::LinksUpdated(nodes) => TrackEvent::LinksUpdated { nodes },
                    RefreshOutcome::Replaced(new_doc) => {
                        doc = new_doc.clone();
                        TrackEvent::Replaced(new_doc)
                    }
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Ok(DocumentWatcher {
            stop,
            rx,
            handle: Some(handle),
            path: path.to_path_buf(),
        })
    }

    /// Non-blocking poll for pending events. Returns all queued events.
    pub fn poll(&self) -> Vec<TrackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point the watcher at a different document. The previous timer is
    /// stopped before the new one starts; timers are never stacked.
    pub fn retarget(
        &mut self,
        path: &Path,
        interval: Duration,
        normalize_legacy: bool,
    ) -> Result<(), DocumentError> {
        self.shutdown();
        *self = DocumentWatcher::start(path, interval, normalize_legacy)?;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DocumentWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
