mod entry_request;
mod filters;
mod report;
mod time_entry;

pub use entry_request::*;
pub use filters::*;
pub use report::*;
pub use time_entry::*;
