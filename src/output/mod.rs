//! Output module for session summaries and reports
//!
//! This module handles:
//! - Printing a human-readable summary of a finished session
//! - Writing the machine-readable JSON session report

mod report;

pub use report::{print_summary, render_report, write_report};
