pub mod progress;

use std::time::Duration;

use crate::mac::MacScheme;
use progress::{ProgressManager, templates};

pub fn print_banner() {
    eprintln!("macsim-rs");
}

/// Bar key for a scheme's run.
pub fn bar_id(scheme: MacScheme) -> String {
    format!("{:?}", scheme)
}

pub fn start_run_bar(
    progress_manager: &ProgressManager,
    scheme: MacScheme,
    duration: Duration,
) {
    let id = bar_id(scheme);
    if let Err(err) = progress_manager.create_bar(
        &id,
        duration.as_millis() as u64,
        templates::SIMULATION,
        scheme.label(),
    ) {
        tracing::debug!("Progress bar unavailable: {}", err);
    }
}

pub fn update_progress(
    progress_manager: &ProgressManager,
    scheme: MacScheme,
    elapsed: Duration,
) {
    let _ = progress_manager.set_position(&bar_id(scheme), elapsed.as_millis() as u64);
}

pub fn finish_run_bar(
    progress_manager: &ProgressManager,
    scheme: MacScheme,
    summary: &str,
) {
    let _ = progress_manager.finish(&bar_id(scheme), summary);
}
