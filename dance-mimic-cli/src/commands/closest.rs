use anyhow::{Context, Result};
use clap::Args;
use dance_mimic::models::PoseSequence;
use std::path::PathBuf;

#[derive(Args)]
pub struct ClosestCommand {
    /// Pose sequence file
    file: PathBuf,

    /// Query timestamp in milliseconds
    #[arg(allow_hyphen_values = true)]
    timestamp_ms: i64,
}

impl ClosestCommand {
    pub async fn execute(self) -> Result<()> {
        let sequence = PoseSequence::load_from_json_file(&self.file)
            .with_context(|| format!("Failed to load {}", self.file.display()))?;

        let pose = sequence
            .closest_at(self.timestamp_ms)
            .context("Cannot look up a pose")?;
        let index = sequence
            .iter()
            .position(|candidate| std::ptr::eq(candidate, pose))
            .unwrap_or_default();

        println!(
            "Closest pose to {} ms: #{} at {} ms ({} bodies)",
            self.timestamp_ms,
            index,
            pose.timestamp_ms(),
            pose.body_count()
        );

        Ok(())
    }
}
