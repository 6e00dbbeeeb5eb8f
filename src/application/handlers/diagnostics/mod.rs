//! Diagnostic handlers.

mod status_checks;

pub use status_checks::{RecordStatusCheckCommand, StatusCheckHandler, STATUS_CHECK_LIST_LIMIT};
