use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Per-stage sample counter shown on stderr when `--progress` is set.
#[derive(Debug)]
pub struct StageProgress {
    progress_bar: Option<ProgressBar>,
    completed: u64,
    finished: bool,
}

impl StageProgress {
    pub fn new(enabled: bool, stage: &str, samples: usize) -> Self {
        let progress_bar = if enabled {
            let bar = ProgressBar::new(samples as u64);
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
            let style = ProgressStyle::with_template(
                "{prefix:.bold} [{bar:30.green}] {pos}/{len} {elapsed_precise} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar.set_prefix(stage.to_string());
            bar.set_message("starting");
            Some(bar)
        } else {
            None
        };

        Self {
            progress_bar,
            completed: 0,
            finished: false,
        }
    }

    pub fn on_sample_started(&self, sample: &str) {
        if let Some(bar) = &self.progress_bar {
            bar.set_message(format!("sample={sample}"));
        }
    }

    pub fn on_sample_done(&mut self) {
        self.completed += 1;
        if let Some(bar) = &self.progress_bar {
            bar.inc(1);
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn finish(&mut self) {
        if let Some(bar) = &self.progress_bar {
            bar.finish_with_message(format!("done samples={}", self.completed));
        }
        self.finished = true;
    }
}

impl Drop for StageProgress {
    fn drop(&mut self) {
        if !self.finished
            && let Some(bar) = &self.progress_bar
        {
            bar.abandon_with_message(format!("stopped after {} samples", self.completed));
        }
    }
}
