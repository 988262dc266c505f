pub mod batch;
pub mod cli;
pub mod extract;
pub mod fetcher;
pub mod logging;
pub mod manager;

pub use batch::{format_duration, BatchDriver, BatchReport, ModelRun};
pub use cli::{handle_command, Commands};
pub use extract::HtmlTextExtractor;
pub use fetcher::{ContentFetcher, ContentSource, FetchedContent};
pub use logging::Logger;
pub use manager::{SummaryOutcome, SummaryPipeline};
