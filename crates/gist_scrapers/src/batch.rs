use std::time::{Duration, Instant};

use gist_core::Result;

use crate::logging::Logger;
use crate::manager::{SummaryOutcome, SummaryPipeline};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

#[derive(Debug)]
pub struct ModelRun {
    pub model: String,
    pub elapsed: Duration,
    pub outcome: std::result::Result<SummaryOutcome, String>,
}

impl ModelRun {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub runs: Vec<ModelRun>,
    pub excluded: Vec<String>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &ModelRun> {
        self.runs.iter().filter(|run| !run.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs the single-article pipeline once per installed model, one model at a time.
pub struct BatchDriver {
    pipeline: SummaryPipeline,
    logger: Logger,
}

impl BatchDriver {
    pub fn new(pipeline: SummaryPipeline, logger: Logger) -> Self {
        Self { pipeline, logger }
    }

    /// Only a failure to list installed models aborts the batch.
    pub async fn run(&self, url: &str) -> Result<BatchReport> {
        let installed = self.pipeline.api().installed_models().await?;
        let exclusions = &self.pipeline.config().exclude_models;

        let mut report = BatchReport::default();
        let mut selected = Vec::new();
        for model in installed {
            if is_excluded(&model.name, exclusions) {
                report.excluded.push(model.name);
            } else {
                selected.push(model.name);
            }
        }

        self.logger.info(&format!(
            "🧪 Testing {} model(s) on {} ({} excluded)",
            selected.len(),
            url,
            report.excluded.len()
        ));
        for name in &report.excluded {
            self.logger.info(&format!("⏭️ Skipping excluded model {}", name));
        }

        for model in selected {
            let logger = self.logger.clone().with_prefix(format!("[{}]", model));
            self.pipeline.unload_resident(&logger).await;

            let started = Instant::now();
            let outcome = self.pipeline.summarize_with(url, &model, &logger).await;
            let elapsed = started.elapsed();

            let outcome = match outcome {
                Ok(outcome) => {
                    logger.info("📝 Summary:");
                    logger.record(&outcome.output);
                    Ok(outcome)
                }
                Err(e) => {
                    logger.error(&format!("❌ Run failed: {}", e));
                    Err(e.to_string())
                }
            };
            logger.info(&format!("⏱️ Elapsed: {}", format_duration(elapsed)));

            report.runs.push(ModelRun {
                model,
                elapsed,
                outcome,
            });
        }

        let failed: Vec<&str> = report.failures().map(|run| run.model.as_str()).collect();
        if failed.is_empty() {
            self.logger
                .info(&format!("✅ All {} model run(s) completed", report.runs.len()));
        } else {
            self.logger.warn(&format!(
                "⚠️ {} of {} model run(s) failed: {}",
                failed.len(),
                report.runs.len(),
                failed.join(", ")
            ));
        }

        Ok(report)
    }
}

/// Case-insensitive substring match against the exclusion list.
pub fn is_excluded(model: &str, exclusions: &[String]) -> bool {
    let model = model.to_lowercase();
    exclusions
        .iter()
        .map(|pattern| pattern.trim().to_lowercase())
        .any(|pattern| !pattern.is_empty() && model.contains(&pattern))
}

/// Human-readable elapsed time: `0.500s`, `5s`, `2m 5s`, `1h 0m 7s`, `1w 0d 0h 0m 1s`.
///
/// Units above the most significant non-zero one are dropped; below it every
/// unit is shown, except that whole minutes print as `2m`.
pub fn format_duration(elapsed: Duration) -> String {
    let total_ms = (elapsed.as_micros() + 500) / 1000;
    let ms = (total_ms % 1000) as u64;
    let total_secs = (total_ms / 1000) as u64;

    let weeks = total_secs / WEEK;
    let days = (total_secs % WEEK) / DAY;
    let hours = (total_secs % DAY) / HOUR;
    let minutes = (total_secs % HOUR) / MINUTE;
    let secs = total_secs % MINUTE;

    let seconds = if ms == 0 {
        format!("{}s", secs)
    } else {
        format!("{}.{:03}s", secs, ms)
    };

    let parts: Vec<String> = if weeks > 0 {
        vec![
            format!("{}w", weeks),
            format!("{}d", days),
            format!("{}h", hours),
            format!("{}m", minutes),
            seconds,
        ]
    } else if days > 0 {
        vec![
            format!("{}d", days),
            format!("{}h", hours),
            format!("{}m", minutes),
            seconds,
        ]
    } else if hours > 0 {
        vec![format!("{}h", hours), format!("{}m", minutes), seconds]
    } else if minutes > 0 && secs == 0 && ms == 0 {
        vec![format!("{}m", minutes)]
    } else if minutes > 0 {
        vec![format!("{}m", minutes), seconds]
    } else {
        vec![seconds]
    };

    parts.join(" ")
}
