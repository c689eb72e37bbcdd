use anyhow::{Context, Result};
use clap::Args;
use dance_mimic::models::PoseSequence;
use dance_mimic::services::replay_offline;
use std::path::PathBuf;
use std::sync::Arc;

use super::format_stars;
use crate::config::Config;

#[derive(Args)]
pub struct ScoreCommand {
    /// Reference dance
    reference: PathBuf,

    /// Recorded performance to score
    performance: PathBuf,
}

impl ScoreCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let reference = PoseSequence::load_from_json_file(&self.reference)
            .with_context(|| format!("Failed to load {}", self.reference.display()))?;
        let performance = PoseSequence::load_from_json_file(&self.performance)
            .with_context(|| format!("Failed to load {}", self.performance.display()))?;

        let summary = replay_offline(Arc::new(reference), &performance, &config.engine)
            .context("Replay failed")?;

        println!("Score Summary");
        println!("────────────────────────────────");
        println!("Frames scored:   {}", summary.frames_scored);
        println!("Frames held:     {}", summary.frames_held_over);
        println!("Batches:         {}", summary.batch_averages.len());
        for (index, average) in summary.batch_averages.iter().enumerate() {
            println!("  batch {:>3}: {:.*}", index + 1, config.ui.precision, average);
        }
        println!();
        println!("Stars: {}", format_stars(summary.stars, config.ui.color));

        Ok(())
    }
}
