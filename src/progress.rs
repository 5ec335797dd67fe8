//! Terminal spinner shown while a repository is being analyzed

use crate::poller::PollObserver;
use crate::render::status_label;
use crate::types::Repository;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Poll observer that drives an indicatif spinner on stderr
pub struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    /// Spinner drawn on stderr, or a hidden one when `visible` is false
    pub fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message("Submitting repository...");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Current spinner message
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Remove the spinner from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for SpinnerObserver {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[async_trait]
impl PollObserver for SpinnerObserver {
    async fn on_update(&self, repository: &Repository, attempt: u32) {
        self.bar.set_message(format!(
            "{} (check {})",
            status_label(&repository.status),
            attempt
        ));
    }
}
