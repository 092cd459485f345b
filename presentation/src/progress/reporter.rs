//! Progress reporting for question generation

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use quiz_application::GenerationProgress;
use quiz_domain::{GenerationState, SkippedBlock};
use std::sync::Mutex;
use std::time::Duration;

/// Reports generation progress with a spinner on stderr
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn state_message(state: GenerationState) -> &'static str {
        match state {
            GenerationState::Idle => "Looking for stored questions...",
            GenerationState::Requesting => "Asking the AI for questions...",
            GenerationState::Parsing => "Reading the response...",
            GenerationState::Delivered => "Done",
            GenerationState::Failed => "Failed",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationProgress for ProgressReporter {
    fn on_state(&self, state: GenerationState) {
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };
        let message = Self::state_message(state);

        if state.is_terminal() {
            if let Some(pb) = slot.take() {
                match state {
                    GenerationState::Delivered => {
                        pb.finish_with_message(format!("{}", message.green()))
                    }
                    _ => pb.finish_with_message(format!("{}", message.red())),
                }
            }
            return;
        }

        let pb = slot.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.set_prefix("Quiz");
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        pb.set_message(message);
    }

    fn on_skipped(&self, block: &SkippedBlock) {
        if let Ok(slot) = self.spinner.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.println(format!(
                "  {} block {} skipped: {}",
                "x".yellow(),
                block.block,
                block.reason
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl GenerationProgress for SimpleProgress {
    fn on_state(&self, state: GenerationState) {
        if state != GenerationState::Idle {
            eprintln!(
                "{} {}",
                "->".cyan(),
                ProgressReporter::state_message(state).bold()
            );
        }
    }

    fn on_skipped(&self, block: &SkippedBlock) {
        eprintln!("  {} block {} skipped: {}", "x".yellow(), block.block, block.reason);
    }
}
