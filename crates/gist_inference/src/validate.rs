use gist_core::{Config, OveragePolicy, SummaryResult};

/// Printed instead of an empty summary.
pub const EMPTY_SUMMARY_PLACEHOLDER: &str = "Error: no summary was generated.";

#[derive(Debug, Clone, Copy)]
pub struct LengthValidator {
    target_length: usize,
    policy: OveragePolicy,
}

impl LengthValidator {
    pub fn new(target_length: usize, policy: OveragePolicy) -> Self {
        Self {
            target_length,
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.summary_length, config.overage_policy)
    }

    /// Measures a sanitized summary. Never truncates.
    pub fn validate(&self, summary: &str) -> SummaryResult {
        let placeholder = summary.trim().is_empty();
        let text = if placeholder {
            EMPTY_SUMMARY_PLACEHOLDER.to_string()
        } else {
            summary.to_string()
        };

        SummaryResult {
            length: text.chars().count(),
            text,
            target_length: self.target_length,
            placeholder,
        }
    }

    /// What goes to stdout for a result under the configured policy.
    pub fn render(&self, result: &SummaryResult) -> String {
        match self.policy {
            OveragePolicy::Reject if result.exceeds_target() => format!(
                "Reject: summary is {} characters (limit {})",
                result.length, result.target_length
            ),
            _ => result.text.clone(),
        }
    }
}
