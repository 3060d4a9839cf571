use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_yellow};

/// Per-run progress bar on stderr.
///
/// `hidden()` gives a bar that draws nothing, for `--quiet` and tests.
pub struct RunProgress {
    pb: ProgressBar,
    visible: bool,
}

impl RunProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        Self { pb, visible: true }
    }

    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
            visible: false,
        }
    }

    pub fn start(&self, total: usize) {
        if self.visible {
            eprintln!("{}  {}", bright("⚙️"), bright("Export").underlined());
        }
        self.pb.set_length(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("  {msg} [{bar:30.cyan/blue}] {pos}/{len} {spinner}")
        {
            self.pb.set_style(style.progress_chars("=> "));
        }
        self.pb
            .set_message(bright_yellow("Fetching runs").to_string());
        self.pb
            .enable_steady_tick(std::time::Duration::from_millis(100));
    }

    pub fn set_run(&self, run_id: u64) {
        self.pb
            .set_message(bright_yellow(format!("Fetching run {run_id}")).to_string());
    }

    pub fn inc(&self) {
        self.pb.inc(1);
    }

    pub fn finish(&self, runs: usize) {
        self.pb
            .finish_with_message(bright_green(format!("Exported {runs} runs ✓")).to_string());
        if self.visible {
            eprintln!();
        }
    }
}

impl Default for RunProgress {
    fn default() -> Self {
        Self::new()
    }
}
