use anyhow::{Context, Result};
use clap::Args;
use dance_mimic::models::PoseSequence;
use dance_mimic::services::{create_output_folder, sample_from_timeline};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Args)]
pub struct RecordCommand {
    /// Detector output to sample from
    performance: PathBuf,

    /// Folder that receives the new dance
    output_base: PathBuf,

    /// Name of the new dance
    name: String,
}

impl RecordCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let recording = &config.engine.recording;

        let source = PoseSequence::load_from_json_file(&self.performance)
            .with_context(|| format!("Failed to load {}", self.performance.display()))?;

        let session = sample_from_timeline(source.iter().cloned(), recording.interval_ms);
        let pose_count = session.pose_count();

        let folder = create_output_folder(&self.output_base, &self.name)
            .with_context(|| format!("Failed to create a folder for {}", self.name))?;
        let path = session
            .finish(&folder, &recording.pose_sequence_filename)
            .context("Failed to save recording")?;

        println!(
            "✓ Recorded {} of {} poses to {}",
            pose_count,
            source.len(),
            path.display()
        );

        Ok(())
    }
}
