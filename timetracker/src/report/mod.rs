mod fetch_report;
mod format;

pub use fetch_report::*;
pub use format::*;
