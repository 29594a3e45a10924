pub mod batch;
pub mod load;
pub mod show;

use timetracker::{Hours, TimeTrackerError};

use crate::config::HoursSetting;

/// Hours given on the command line win over the configured default.
pub fn resolve_hours(explicit: Option<&str>, configured: Option<&HoursSetting>) -> Result<Hours, TimeTrackerError> {
    match (explicit, configured) {
        (Some(text), _) => text.parse(),
        (None, Some(setting)) => setting.to_hours(),
        (None, None) => Err(TimeTrackerError::validation(
            "You need to specify hours amount with --hours (-h) or using hours options in config.toml",
        )),
    }
}
