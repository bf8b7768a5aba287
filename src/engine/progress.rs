//! Progress bar utilities for displaying cracking status

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::ProgressSnapshot;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " pw"
    )))
}

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " pw"
    )))
}

/// Percentage bar when the total is known and fits, counter otherwise.
pub fn create_attack_bar(total: Option<u128>) -> ProgressBar {
    match total.and_then(|t| usize::try_from(t).ok()) {
        Some(total) if total > 0 => {
            create_progress_bar(ProgressBarConfig::new(total, "Cracking", Animation::Classic))
        }
        _ => create_counter("Cracking"),
    }
}

/// Move the bar to `n` attempts.
/// Uses try_lock to avoid blocking if mutex is contended (non-blocking)
pub fn update_progress_bar_to(pb: &ProgressBar, n: u64) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.update_to(usize::try_from(n).unwrap_or(usize::MAX));
    }
}

/// Force a refresh of the bar (e.g. so the counter shows "0 pw" immediately).
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}

/// Create a progress observer that moves the bar to the snapshot's attempt count.
pub fn progress_callback(bar: &ProgressBar) -> impl FnMut(&ProgressSnapshot) + Send + 'static {
    let bar = Arc::clone(bar);
    move |snapshot: &ProgressSnapshot| update_progress_bar_to(&bar, snapshot.attempts)
}

/// End the bar's line so the report starts on a fresh one.
pub fn finish_bar(pb: &ProgressBar) {
    refresh_bar(pb);
    eprintln!();
}
