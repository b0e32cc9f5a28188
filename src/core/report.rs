//! Aggregated results of a run

use std::time::Duration;

use super::config::{ERROR_MESSAGE_MAX_LENGTH, PATH_DISPLAY_WIDTH};
use super::outcome::{SyncAction, SyncOutcome};

/// Every mirror's outcome from one run, in input order
#[derive(Debug)]
pub struct RunReport {
    outcomes: Vec<SyncOutcome>,
    duration: Duration,
}

impl RunReport {
    pub fn new(outcomes: Vec<SyncOutcome>, duration: Duration) -> Self {
        Self { outcomes, duration }
    }

    pub fn outcomes(&self) -> &[SyncOutcome] {
        &self.outcomes
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True when every mirror synced. An empty run counts as a success.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(SyncOutcome::is_success)
    }

    /// Failed outcomes sorted by configuration then mirror name
    pub fn failures(&self) -> Vec<&SyncOutcome> {
        let mut failures: Vec<&SyncOutcome> =
            self.outcomes.iter().filter(|o| !o.is_success()).collect();
        failures.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        failures
    }

    fn count_action(&self, action: SyncAction) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(a) if a == action))
            .count()
    }

    pub fn cloned_count(&self) -> usize {
        self.count_action(SyncAction::Cloned)
    }

    pub fn updated_count(&self) -> usize {
        self.count_action(SyncAction::Updated)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    /// One-line summary of the run
    pub fn generate_summary(&self) -> String {
        let duration_secs = self.duration.as_secs_f64();
        let total = self.outcomes.len();
        let mirror_word = if total == 1 { "mirror" } else { "mirrors" };
        let failed = self.failed_count();

        if failed > 0 {
            format!(
                "🔴 {} of {} {} failed in {:.1}s • {} cloned • {} updated",
                failed,
                total,
                mirror_word,
                duration_secs,
                self.cloned_count(),
                self.updated_count()
            )
        } else {
            format!(
                "✅ {} {} mirrored in {:.1}s • {} cloned • {} updated",
                total,
                mirror_word,
                duration_secs,
                self.cloned_count(),
                self.updated_count()
            )
        }
    }

    /// Lists failed mirrors with their cause, or an empty string when none failed
    pub fn generate_detailed_summary(&self) -> String {
        let failures = self.failures();
        if failures.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(failures.len() + 1);
        lines.push(format!("🔴 FAILED MIRRORS ({})", failures.len()));
        for (i, outcome) in failures.iter().enumerate() {
            let tree_char = if i == failures.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            let name = format!("{}/{}", outcome.configuration, outcome.mirror);
            let path = outcome
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            let short_path = crate::utils::shorten_path(&path, PATH_DISPLAY_WIDTH);
            let cause = outcome
                .error()
                .map(|e| truncate_message(&e.to_string(), ERROR_MESSAGE_MAX_LENGTH))
                .unwrap_or_default();
            lines.push(format!("   {tree_char} {name:24} {short_path:40} # {cause}"));
        }
        lines.join("\n")
    }
}

/// Truncates long error messages on a character boundary
pub(crate) fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let kept: String = message.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
