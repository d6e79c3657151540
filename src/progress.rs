//! Wait spinner shown while socket owners are resolved
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const OWNER_SPINNER_MESSAGE: &str = "Resolving socket owners, please be patient";

/// Spinner for the ownership stage. A hidden bar keeps machine output clean.
pub fn owner_spinner(visible: bool) -> ProgressBar {
    let spinner = if visible {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };

    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(OWNER_SPINNER_MESSAGE);
    if visible {
        spinner.enable_steady_tick(Duration::from_millis(100));
    }
    spinner
}
