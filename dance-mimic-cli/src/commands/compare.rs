use anyhow::{Context, Result};
use clap::Args;
use dance_mimic::models::PoseSequence;
use dance_mimic::services::compare_distance;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Args)]
pub struct CompareCommand {
    /// Sequence holding the live pose
    live: PathBuf,

    /// Timestamp of the live pose
    #[arg(allow_hyphen_values = true)]
    live_timestamp_ms: i64,

    /// Sequence holding the reference pose
    reference: PathBuf,

    /// Timestamp of the reference pose
    #[arg(allow_hyphen_values = true)]
    reference_timestamp_ms: i64,
}

impl CompareCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let live_sequence = PoseSequence::load_from_json_file(&self.live)
            .with_context(|| format!("Failed to load {}", self.live.display()))?;
        let reference_sequence = PoseSequence::load_from_json_file(&self.reference)
            .with_context(|| format!("Failed to load {}", self.reference.display()))?;

        let live = live_sequence
            .closest_at(self.live_timestamp_ms)
            .context("Cannot look up the live pose")?;
        let reference = reference_sequence
            .closest_at(self.reference_timestamp_ms)
            .context("Cannot look up the reference pose")?;

        match compare_distance(live, reference) {
            Some(distance) => println!(
                "Distance: {:.*}",
                config.ui.precision,
                distance
            ),
            None => println!("Distance: no result"),
        }

        Ok(())
    }
}
