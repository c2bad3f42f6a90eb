//! Progress bars fed by an engine's progress channel.

use indicatif::{ProgressBar, ProgressStyle};
use qsync_core::ProgressReceiver;

const TEMPLATE: &str = "{prefix:>8.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// A bar for one stage run over one sheet.
pub struct StageBar {
    bar: ProgressBar,
}

impl StageBar {
    pub fn new(stage: &str, label: &str, total: u64) -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.set_prefix(stage.to_string());
        bar.set_message(label.to_string());
        Self { bar }
    }

    /// Mirror the channel until the engine closes it.
    pub async fn follow(self, mut progress: ProgressReceiver) {
        while let Some(done) = progress.recv().await {
            if done > self.bar.length().unwrap_or(0) {
                self.bar.set_length(done);
            }
            self.bar.set_position(done);
        }
        self.bar.finish_and_clear();
    }
}
