use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use gist_core::Result;
use tracing::Level;

static INIT: Once = Once::new();

/// Prefixed logger. With a transcript attached, every line is also appended to a file.
#[derive(Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
    transcript: Option<Arc<Mutex<File>>>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new transcript at `path`, replacing any previous file.
    pub fn with_transcript(mut self, path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        self.transcript = Some(Arc::new(Mutex::new(file)));
        Ok(self)
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        let prefix = self.prefix();
        tracing::info!("{}{}", prefix, message);
        self.append("INFO", &prefix, message);
    }

    pub fn error(&self, message: &str) {
        let prefix = self.prefix();
        tracing::error!("{}{}", prefix, message);
        self.append("ERROR", &prefix, message);
    }

    pub fn warn(&self, message: &str) {
        let prefix = self.prefix();
        tracing::warn!("{}{}", prefix, message);
        self.append("WARN", &prefix, message);
    }

    /// Transcript only, unprefixed. Used for summary text.
    pub fn record(&self, line: &str) {
        self.write_line(line);
    }

    fn append(&self, level: &str, prefix: &str, message: &str) {
        self.write_line(&format!("[{}] {}{}", level, prefix, message));
    }

    fn write_line(&self, line: &str) {
        let Some(transcript) = &self.transcript else {
            return;
        };
        // A panic elsewhere while holding the lock must not silence the transcript.
        let mut file = transcript.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(file, "{}", line) {
            tracing::warn!("Failed to write transcript: {}", e);
        }
    }
}

/// Installs the stderr subscriber once; stdout stays reserved for summaries.
pub fn init_logging(level: Level) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        });
    }
    Logger::new()
}
