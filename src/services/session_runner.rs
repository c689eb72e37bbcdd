use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

use crate::config::Settings;
use crate::models::{PoseSequence, Stars};
use crate::services::latest_pose_slot::PoseReader;
use crate::services::play_session_service::{
    PlaySession, ReferenceMedia, ScoreDisplay, SessionUpdate,
};

/// Runs a play session in real time.
///
/// Ticks at the configured frame rate, reads the newest detector result from
/// the pose slot and forwards every update to the display.
pub struct SessionRunner<M, D> {
    session: PlaySession,
    media: M,
    display: D,
    reader: PoseReader,
    frame_interval: Duration,
}

impl<M, D> SessionRunner<M, D>
where
    M: ReferenceMedia,
    D: ScoreDisplay,
{
    pub fn new(
        reference: Arc<PoseSequence>,
        media: M,
        display: D,
        reader: PoseReader,
        settings: &Settings,
    ) -> Result<Self> {
        let session = PlaySession::new(reference, settings)
            .context("Failed to start play session")?;

        Ok(Self {
            session,
            media,
            display,
            reader,
            frame_interval: Duration::from_millis(settings.frame_interval_ms()),
        })
    }

    /// Tick until the reference media ends. Returns the final rating and the display.
    pub async fn run(mut self) -> Result<(Stars, D)> {
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let started = Instant::now();

        tracing::info!(
            "Session runner started, ticking every {} ms",
            self.frame_interval.as_millis()
        );

        loop {
            ticker.tick().await;

            let now_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
            let live = self.reader.latest();

            let update = self
                .session
                .tick(now_ms, live.as_deref(), &mut self.media)
                .context("Play session tick failed")?;

            match update {
                SessionUpdate::Countdown(marker) => self.display.show_countdown(marker),
                SessionUpdate::Active {
                    current_average, ..
                } => self.display.show_batch_average(current_average),
                SessionUpdate::Finished(stars) => {
                    self.display.show_final_score(stars);
                    return Ok((stars, self.display));
                }
            }
        }
    }
}
