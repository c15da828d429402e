pub mod check;
pub mod links_report;

pub use check::{CheckReport, check_document};
pub use links_report::link_report;
