use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dance_mimic::models::{PoseSequence, Stars};
use dance_mimic::services::{
    CountdownMarker, LatestPoseSlot, PosePublisher, ScoreDisplay, SequencePlayback,
    SessionRunner,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{sleep_until, Duration, Instant};

use super::format_stars;
use crate::config::Config;

#[derive(Args)]
pub struct PlayCommand {
    /// Reference dance
    reference: PathBuf,

    /// Recorded performance fed to the session as live detections
    performance: PathBuf,
}

/// Prints session feedback, skipping repeats
struct TerminalDisplay {
    color: bool,
    precision: usize,
    last_marker: Option<CountdownMarker>,
    last_average: Option<f64>,
}

impl ScoreDisplay for TerminalDisplay {
    fn show_countdown(&mut self, marker: CountdownMarker) {
        if self.last_marker == Some(marker) {
            return;
        }
        self.last_marker = Some(marker);

        match marker {
            CountdownMarker::Seconds(seconds) => println!("{}...", seconds),
            CountdownMarker::Ready if self.color => println!("{}", "Ready!".bold()),
            CountdownMarker::Ready => println!("Ready!"),
        }
    }

    fn show_batch_average(&mut self, average: f64) {
        if self.last_average == Some(average) {
            return;
        }
        self.last_average = Some(average);
        println!("Average distance: {:.*}", self.precision, average);
    }

    fn show_final_score(&mut self, stars: Stars) {
        println!();
        println!("Stars: {}", format_stars(stars, self.color));
    }
}

impl PlayCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let reference = PoseSequence::load_from_json_file(&self.reference)
            .with_context(|| format!("Failed to load {}", self.reference.display()))?;
        let performance = PoseSequence::load_from_json_file(&self.performance)
            .with_context(|| format!("Failed to load {}", self.performance.display()))?;

        let reference = Arc::new(reference);
        let (publisher, reader) = LatestPoseSlot::new();

        let display = TerminalDisplay {
            color: config.ui.color,
            precision: config.ui.precision,
            last_marker: None,
            last_average: None,
        };

        let runner = SessionRunner::new(
            reference.clone(),
            SequencePlayback::new(reference),
            display,
            reader,
            &config.engine,
        )?;

        let countdown = Duration::from_millis(config.engine.session.countdown_ms);
        let detector = tokio::spawn(feed_detections(publisher, performance, countdown));

        let (stars, _display) = runner.run().await?;
        detector.abort();

        tracing::info!("Play finished with {} stars", stars.value());
        Ok(())
    }
}

/// Publish performance poses as if a detector produced them in real time
async fn feed_detections(publisher: PosePublisher, performance: PoseSequence, countdown: Duration) {
    let start = Instant::now() + countdown;
    let origin = performance.time_range_ms().map(|(first, _)| first).unwrap_or(0);

    for pose in performance.iter() {
        let offset = pose.timestamp_ms().saturating_sub(origin).max(0) as u64;
        sleep_until(start + Duration::from_millis(offset)).await;
        publisher.publish(pose.clone());
    }
}
