use std::path::PathBuf;

use clap::Subcommand;
use gist_core::{Config, InferenceApi, ModelState, Result};
use gist_inference::OllamaClient;

use crate::batch::{format_duration, BatchDriver};
use crate::logging::Logger;
use crate::manager::SummaryPipeline;

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Summarize one article
    Summarize {
        /// Article URL
        url: String,
        /// Model to use (defaults to llama3.2)
        model: Option<String>,
        /// Target summary length in characters (defaults to 257)
        length: Option<usize>,
    },
    /// Summarize one article with every installed model, one after another
    Batch {
        /// Article URL
        url: String,
        /// Target summary length in characters (defaults to 257)
        length: Option<usize>,
        /// Skip models whose name contains this text (repeatable)
        #[arg(long, short = 'x')]
        exclude: Vec<String>,
        /// Transcript file, replaced on every run
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// List installed models and mark the resident ones
    Models,
}

/// Runs a command. `Ok(false)` means it completed but should exit non-zero.
pub async fn handle_command(command: Commands, mut config: Config) -> Result<bool> {
    match command {
        Commands::Summarize { url, model, length } => {
            if let Some(model) = model {
                config = config.with_model(model);
            }
            if let Some(length) = length {
                config = config.with_summary_length(length);
            }
            let pipeline = SummaryPipeline::from_config(config)?;
            let outcome = pipeline.summarize(&url).await?;
            println!("{}", outcome.output);
            Ok(true)
        }
        Commands::Batch {
            url,
            length,
            exclude,
            output,
        } => {
            if let Some(length) = length {
                config = config.with_summary_length(length);
            }
            if let Some(output) = output {
                config.results_path = output;
            }
            config.exclude_models.extend(exclude);

            let logger = Logger::new().with_transcript(&config.results_path)?;
            logger.info(&format!("📄 Writing results to {}", config.results_path.display()));
            let pipeline = SummaryPipeline::from_config(config)?.with_logger(logger.clone());
            let report = BatchDriver::new(pipeline, logger).run(&url).await?;

            for run in &report.runs {
                let status = if run.is_success() { "ok" } else { "FAILED" };
                eprintln!("{:<40} {:>16}  {}", run.model, format_duration(run.elapsed), status);
            }
            Ok(report.is_success())
        }
        Commands::Models => {
            let client = OllamaClient::new(&config)?;
            let installed = client.installed_models().await?;
            let resident = client.resident_models().await?;

            for model in installed {
                let state = if resident.iter().any(|r| r.name == model.name) {
                    ModelState::Resident
                } else {
                    model.state
                };
                let marker = match state {
                    ModelState::Resident => "  (resident)",
                    ModelState::Installed => "",
                };
                println!("{}{}", model.name, marker);
            }
            Ok(true)
        }
    }
}
