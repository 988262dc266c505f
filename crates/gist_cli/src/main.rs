use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use gist_core::config::DEFAULT_HOST;
use gist_core::{Config, OveragePolicy};
use gist_scrapers::cli::{handle_command, Commands};
use gist_scrapers::logging::init_logging;
use tracing::{debug, error, Level};

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| format!("Duration too large: {}", s))?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

/// Summarize web articles with a local Ollama server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Inference server: host, host:port or full URL
    #[arg(long, global = true, default_value = DEFAULT_HOST)]
    host: String,
    /// Directory for cached article text
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    /// Cached text older than this is fetched again (e.g. 24h, 90m, 1d)
    #[arg(long, global = true, default_value = "24h")]
    cache_max_age: HumanDuration,
    /// What to print when a summary is over the target length: warn or reject
    #[arg(long, global = true, default_value = "warn")]
    overage: OveragePolicy,
    /// Debug logging on stderr
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only warnings and errors on stderr
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }

    fn config(&self) -> gist_core::Result<Config> {
        let mut config = Config::default().with_host(&self.host)?;
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir.clone());
        }
        config.cache_max_age = self.cache_max_age.0;
        config.overage_policy = self.overage;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.level());

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!("Using inference server {}", config.host);

    match handle_command(cli.command, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        let cases = [
            ("24h", 86_400),
            ("90m", 5_400),
            ("1d", 86_400),
            ("1h15m30s", 4_530),
            ("45", 45),
            ("1h 30", 3_630),
        ];
        for (input, secs) in cases {
            let parsed: HumanDuration = input.parse().unwrap();
            assert_eq!(parsed.0, Duration::from_secs(secs), "for {}", input);
        }
    }

    #[test]
    fn test_human_duration_errors() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_error() {
        assert!("99999999999999999d".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s 1s".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s1".parse::<HumanDuration>().is_err());
        // Too many digits for u64 at all
        assert!("99999999999999999999999h".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_oversized_cache_age_is_usage_error() {
        let err = Cli::try_parse_from([
            "gist",
            "models",
            "--cache-max-age",
            "99999999999999999d",
        ])
        .unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_parse_summarize_positionals() {
        let cli = Cli::try_parse_from([
            "gist",
            "summarize",
            "https://news.example.com/story",
            "qwen3:8b",
            "120",
        ])
        .unwrap();
        assert_eq!(cli.level(), Level::INFO);
        match cli.command {
            Commands::Summarize { url, model, length } => {
                assert_eq!(url, "https://news.example.com/story");
                assert_eq!(model.as_deref(), Some("qwen3:8b"));
                assert_eq!(length, Some(120));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_build_config() {
        let cli = Cli::try_parse_from([
            "gist",
            "batch",
            "https://news.example.com/story",
            "-x",
            "embed",
            "--host",
            "gpu-box",
            "--cache-max-age",
            "1h",
            "--overage",
            "reject",
            "-q",
        ])
        .unwrap();
        let config = cli.config().unwrap();

        assert_eq!(config.host, "http://gpu-box:11434");
        assert_eq!(config.cache_max_age, Duration::from_secs(3600));
        assert_eq!(config.overage_policy, OveragePolicy::Reject);
        assert_eq!(cli.level(), Level::WARN);
        assert!(matches!(cli.command, Commands::Batch { ref exclude, .. } if exclude == &["embed"]));
    }

    #[test]
    fn test_missing_url_is_usage_error() {
        let err = Cli::try_parse_from(["gist", "summarize"]).unwrap_err();
        assert!(err.use_stderr());
    }
}
