use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";
const COUNT_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {prefix} ({percent}%) {msg}";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .expect("Failed to create progress style")
        .progress_chars("#>-")
}

/// Spinner for scans of unknown length; it ticks on its own
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(style(SPINNER_TEMPLATE));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Bar over a known number of items, labelled with their unit ("files", "entries")
pub fn create_count_progress_bar(total_items: u64, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_items);
    pb.set_style(style(COUNT_TEMPLATE));
    pb.set_prefix(unit.to_string());
    pb
}
