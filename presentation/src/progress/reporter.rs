//! Progress reporting for plan execution

use colored::Colorize;
use conductor_application::LifecycleNotifier;
use conductor_domain::{AlternativeKind, ExecutionResult, Plan, Stage, StageReport, StageStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// Reports progress during plan execution with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    plan_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            plan_bar: Mutex::new(None),
        }
    }

    fn plan_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.plan_bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }

    fn status_mark(status: StageStatus) -> colored::ColoredString {
        match status {
            StageStatus::Succeeded => "v".green(),
            StageStatus::Degraded => "~".yellow(),
            _ => "x".red(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleNotifier for ProgressReporter {
    fn on_plan_start(&self, plan: &Plan) {
        let pb = self.multi.add(ProgressBar::new(plan.stages.len() as u64));
        pb.set_style(Self::plan_style());
        pb.set_prefix(format!("{}", plan.task.task_type));
        pb.set_message("Starting...");

        *self.plan_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_stage_start(&self, stage: &Stage, _total_stages: usize) {
        self.with_bar(|pb| pb.set_message(stage.label()));
    }

    fn on_tool_retry(&self, tool_id: &str, attempt: u32, max_attempts: u32, _error: &str) {
        self.with_bar(|pb| {
            pb.set_message(format!(
                "{} {} retry {}/{}",
                "!".yellow(),
                tool_id,
                attempt + 1,
                max_attempts
            ))
        });
    }

    fn on_fallback(&self, tool_id: &str, fallback_id: &str) {
        self.with_bar(|pb| {
            pb.println(format!("  {} {} -> {}", "~".yellow(), tool_id, fallback_id));
        });
    }

    fn on_stage_complete(&self, report: &StageReport, _total_stages: usize) {
        self.with_bar(|pb| {
            pb.set_message(format!(
                "{} stage {} {}",
                Self::status_mark(report.status),
                report.position,
                report.status
            ));
            pb.inc(1);
        });
    }

    fn on_recovery(&self, plan: &Plan, alternative: AlternativeKind, _reason: &str) {
        self.with_bar(|pb| {
            pb.set_length(plan.stages.len() as u64);
            pb.set_position(0);
            pb.set_message(format!("{} switching to {} plan", "!".yellow(), alternative));
        });
    }

    fn on_plan_complete(&self, result: &ExecutionResult) {
        if let Some(pb) = self
            .plan_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let message = if result.success {
                "complete!".green()
            } else {
                "failed".red()
            };
            pb.finish_with_message(message.to_string());
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl LifecycleNotifier for SimpleProgress {
    fn on_plan_start(&self, plan: &Plan) {
        println!(
            "{} {} ({} stages)",
            "->".cyan(),
            plan.task.task_type.to_string().bold(),
            plan.stages.len()
        );
    }

    fn on_stage_complete(&self, report: &StageReport, total_stages: usize) {
        println!(
            "  {} stage {}/{} {}",
            ProgressReporter::status_mark(report.status),
            report.position,
            total_stages,
            report.status
        );
    }

    fn on_fallback(&self, tool_id: &str, fallback_id: &str) {
        println!("  {} {} -> {}", "~".yellow(), tool_id, fallback_id);
    }

    fn on_recovery(&self, _plan: &Plan, alternative: AlternativeKind, reason: &str) {
        println!("  {} {} ({})", "!".yellow(), alternative, reason);
    }

    fn on_plan_complete(&self, _result: &ExecutionResult) {
        println!();
    }
}
