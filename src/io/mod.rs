pub mod config_io;
pub mod document_io;
pub mod rediff;
pub mod watcher;

pub use config_io::load_config_near;
pub use document_io::{DocumentError, atomic_write, load_document, normalize_status_markers};
pub use rediff::{DocumentTracker, RefreshOutcome, refresh_link_counts};
pub use watcher::{DocumentWatcher, TrackEvent};
