//! Printing results and turning failures into messages a user can act on.

use colored::Colorize;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use timetracker::TimeTrackerError;

pub fn print_success(message: &str) {
    println!("{}", message.green());
}

pub fn print_info(message: &str) {
    println!("{}", message);
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

/// Message for a failed command. Unknown options get a suggestion among the labels the
/// portal offered.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TimeTrackerError>() {
        Some(TimeTrackerError::OptionNotFound {
            requested, available, ..
        }) => match closest_match(requested, available) {
            Some(suggestion) => format!("{:#}\n\nDid you mean \"{}\"?", err, suggestion),
            None => format!("{:#}", err),
        },
        _ => format!("{:#}", err),
    }
}

/// Best scoring label for `requested`, if any label matches at all.
pub fn closest_match<'a>(requested: &str, available: &'a [String]) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default().ignore_case();

    available
        .iter()
        .filter_map(|label| {
            matcher
                .fuzzy_match(label, requested)
                .map(|score| (label.as_str(), score))
        })
        .max_by_key(|(_, score)| *score)
        .map(|(label, _)| label)
}
