/// Play Session Service
///
/// Drives one attempt at a dance through its phases:
/// - Countdown: a fixed timer, with a ready marker during its final stretch
/// - Active: every tick seeks the reference media to the time elapsed since
///   the dance started and scores the latest live pose against the reference
///   pose nearest that time
/// - Scored: terminal, holds the final star rating
///
/// The session never reads a clock itself. Callers pass `now_ms` on every
/// tick, which keeps offline replays deterministic.

use std::sync::Arc;

use crate::config::Settings;
use crate::errors::Result;
use crate::models::{Pose, PoseSequence, Stars};
use crate::services::scoring_service::{FrameOutcome, ScoringEngine};

/// Source of reference frames, such as a video player
pub trait ReferenceMedia {
    type Frame;

    /// Move playback to `timestamp_ms` from the start of the content
    fn seek(&mut self, timestamp_ms: i64);

    /// Frame at the current position, if one is available
    fn read_frame(&mut self) -> Option<Self::Frame>;

    fn has_ended(&self) -> bool;

    fn position_ms(&self) -> i64;
}

/// Receives what the player should see
pub trait ScoreDisplay {
    fn show_countdown(&mut self, marker: CountdownMarker);

    fn show_batch_average(&mut self, average: f64);

    fn show_final_score(&mut self, stars: Stars);
}

/// Plays a pose sequence as its own reference media.
///
/// Each frame is the pose nearest the playback position. Content ends once the
/// position passes the last pose by one recording interval.
#[derive(Debug, Clone)]
pub struct SequencePlayback {
    sequence: Arc<PoseSequence>,
    position_ms: i64,
    end_ms: i64,
}

impl SequencePlayback {
    pub fn new(sequence: Arc<PoseSequence>) -> Self {
        let last = sequence.time_range_ms().map(|(_, end)| end).unwrap_or(0);
        let end_ms = last.saturating_add(millis_to_i64(sequence.time_between_poses_ms()));

        Self {
            sequence,
            position_ms: 0,
            end_ms,
        }
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }
}

impl ReferenceMedia for SequencePlayback {
    type Frame = Pose;

    fn seek(&mut self, timestamp_ms: i64) {
        self.position_ms = timestamp_ms;
    }

    fn read_frame(&mut self) -> Option<Pose> {
        if self.has_ended() {
            return None;
        }
        self.sequence.closest_at(self.position_ms).ok().cloned()
    }

    fn has_ended(&self) -> bool {
        self.sequence.is_empty() || self.position_ms > self.end_ms
    }

    fn position_ms(&self) -> i64 {
        self.position_ms
    }
}

/// What the countdown shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownMarker {
    Seconds(u64),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Countdown,
    Active,
    Scored(Stars),
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate<F> {
    Countdown(CountdownMarker),
    Active {
        elapsed_ms: i64,
        current_average: f64,
        /// `None` when no live pose was available this tick
        outcome: Option<FrameOutcome>,
        reference_frame: Option<F>,
    },
    Finished(Stars),
}

/// One play-through of a dance
#[derive(Debug, Clone)]
pub struct PlaySession {
    engine: ScoringEngine,
    countdown_ms: i64,
    ready_marker_ms: i64,
    phase: SessionPhase,
    started_at_ms: Option<i64>,
    active_since_ms: i64,
}

impl PlaySession {
    /// Fails with `EmptySequence` when the reference has no poses
    pub fn new(reference: Arc<PoseSequence>, settings: &Settings) -> Result<Self> {
        let engine = ScoringEngine::new(reference, &settings.scoring)?;

        Ok(Self {
            engine,
            countdown_ms: millis_to_i64(settings.session.countdown_ms),
            ready_marker_ms: millis_to_i64(settings.session.ready_marker_ms),
            phase: SessionPhase::Countdown,
            started_at_ms: None,
            active_since_ms: 0,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Advance the session to `now_ms`. The first tick starts the countdown.
    pub fn tick<M: ReferenceMedia>(
        &mut self,
        now_ms: i64,
        live: Option<&Pose>,
        media: &mut M,
    ) -> Result<SessionUpdate<M::Frame>> {
        let started_at = *self.started_at_ms.get_or_insert(now_ms);

        match self.phase {
            SessionPhase::Scored(stars) => return Ok(SessionUpdate::Finished(stars)),
            SessionPhase::Countdown => {
                let remaining = self.countdown_ms.saturating_sub(now_ms - started_at);
                if remaining > 0 {
                    return Ok(SessionUpdate::Countdown(self.countdown_marker(remaining)));
                }

                self.active_since_ms = started_at.saturating_add(self.countdown_ms);
                self.phase = SessionPhase::Active;
                tracing::info!("Countdown finished, dance started");
            }
            SessionPhase::Active => {}
        }

        let elapsed_ms = now_ms - self.active_since_ms;
        media.seek(elapsed_ms);

        if media.has_ended() {
            let stars = self.engine.final_score();
            self.phase = SessionPhase::Scored(stars);
            tracing::info!(
                "Session scored {} stars over {} batches",
                stars.value(),
                self.engine.batch_averages().len()
            );
            return Ok(SessionUpdate::Finished(stars));
        }

        let outcome = match live {
            Some(pose) => Some(self.engine.update(pose, elapsed_ms)?),
            None => None,
        };
        let reference_frame = media.read_frame();

        Ok(SessionUpdate::Active {
            elapsed_ms,
            current_average: self.engine.current_average(),
            outcome,
            reference_frame,
        })
    }

    fn countdown_marker(&self, remaining_ms: i64) -> CountdownMarker {
        if remaining_ms <= self.ready_marker_ms {
            return CountdownMarker::Ready;
        }

        let whole_seconds = remaining_ms / 1000 + i64::from(remaining_ms % 1000 != 0);
        CountdownMarker::Seconds((whole_seconds - 1).max(0) as u64)
    }
}

/// Config durations beyond the i64 range saturate instead of wrapping negative
fn millis_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Outcome of replaying a recorded performance
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub stars: Stars,
    pub batch_averages: Vec<f64>,
    pub frames_scored: usize,
    pub frames_held_over: usize,
}

/// Replay `performance` against `reference` on a simulated clock.
///
/// Ticks advance by the configured frame interval. The live pose on each
/// active tick is the performance pose nearest the elapsed dance time,
/// measured from the performance's first timestamp.
pub fn replay_offline(
    reference: Arc<PoseSequence>,
    performance: &PoseSequence,
    settings: &Settings,
) -> Result<ReplaySummary> {
    let mut session = PlaySession::new(reference.clone(), settings)?;
    let mut media = SequencePlayback::new(reference);
    let step_ms = millis_to_i64(settings.frame_interval_ms());
    let origin_ms = performance.time_range_ms().map(|(first, _)| first).unwrap_or(0);

    let mut frames_scored = 0;
    let mut frames_held_over = 0;
    let mut now_ms: i64 = 0;

    loop {
        let dance_time_ms = now_ms.saturating_sub(session.countdown_ms);
        let live = if dance_time_ms >= 0 {
            performance
                .closest_at(origin_ms.saturating_add(dance_time_ms))
                .ok()
        } else {
            None
        };

        match session.tick(now_ms, live, &mut media)? {
            SessionUpdate::Finished(stars) => {
                return Ok(ReplaySummary {
                    stars,
                    batch_averages: session.engine().batch_averages().to_vec(),
                    frames_scored,
                    frames_held_over,
                });
            }
            SessionUpdate::Active {
                outcome: Some(outcome),
                ..
            } => {
                frames_scored += 1;
                if outcome.held_over {
                    frames_held_over += 1;
                }
            }
            _ => {}
        }

        now_ms = now_ms.saturating_add(step_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Landmark;
    use assert_matches::assert_matches;

    fn pose_at(timestamp_ms: i64, points: &[(f32, f32, f32)]) -> Pose {
        let body = points
            .iter()
            .map(|&(x, y, z)| Landmark::new(x, y, z, 1.0, 1.0))
            .collect();
        Pose::new(vec![body], timestamp_ms)
    }

    fn reference(len: i64) -> Arc<PoseSequence> {
        let mut sequence = PoseSequence::new(50);
        for index in 0..len {
            sequence.add(pose_at(index * 50, &[(0.5, 0.2, 0.1), (0.4, 0.6, 0.0)]));
        }
        Arc::new(sequence)
    }

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.scoring.batch_size = 2;
        settings
    }

    #[test]
    fn test_countdown_markers() {
        let mut session = PlaySession::new(reference(4), &settings()).unwrap();
        let mut media = SequencePlayback::new(reference(4));

        let markers: Vec<_> = [0, 999, 1000, 2500, 3000, 3999]
            .iter()
            .map(|&now| session.tick(now, None, &mut media).unwrap())
            .collect();

        assert_eq!(
            markers,
            vec![
                SessionUpdate::Countdown(CountdownMarker::Seconds(3)),
                SessionUpdate::Countdown(CountdownMarker::Seconds(3)),
                SessionUpdate::Countdown(CountdownMarker::Seconds(2)),
                SessionUpdate::Countdown(CountdownMarker::Seconds(1)),
                SessionUpdate::Countdown(CountdownMarker::Ready),
                SessionUpdate::Countdown(CountdownMarker::Ready),
            ]
        );
        assert_eq!(session.phase(), SessionPhase::Countdown);
    }

    #[test]
    fn test_active_elapsed_starts_after_countdown() {
        let mut session = PlaySession::new(reference(4), &settings()).unwrap();
        let mut media = SequencePlayback::new(reference(4));

        session.tick(1000, None, &mut media).unwrap();
        let update = session.tick(5100, None, &mut media).unwrap();

        assert_matches!(
            update,
            SessionUpdate::Active { elapsed_ms: 100, outcome: None, reference_frame: Some(_), .. }
        );
        assert_eq!(media.position_ms(), 100);
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn test_missing_live_pose_accumulates_nothing() {
        let mut session = PlaySession::new(reference(4), &settings()).unwrap();
        let mut media = SequencePlayback::new(reference(4));

        session.tick(0, None, &mut media).unwrap();
        for now in [4000, 4020, 4040] {
            session.tick(now, None, &mut media).unwrap();
        }

        assert!(session.engine().batch_averages().is_empty());
        assert_eq!(session.engine().current_average(), 20.0);
    }

    #[test]
    fn test_end_of_media_scores_session() {
        let reference = reference(2);
        let live = reference.poses()[0].clone();
        let mut session = PlaySession::new(reference.clone(), &settings()).unwrap();
        let mut media = SequencePlayback::new(reference);

        session.tick(0, None, &mut media).unwrap();
        session.tick(4000, Some(&live), &mut media).unwrap();
        session.tick(4050, Some(&live), &mut media).unwrap();

        let update = session.tick(4101, Some(&live), &mut media).unwrap();
        let stars = Stars::new(3).unwrap();
        assert_eq!(update, SessionUpdate::Finished(stars));
        assert_eq!(session.phase(), SessionPhase::Scored(stars));

        let again = session.tick(9000, Some(&live), &mut media).unwrap();
        assert_eq!(again, SessionUpdate::Finished(stars));
    }

    #[test]
    fn test_sequence_playback_end() {
        let mut media = SequencePlayback::new(reference(3));
        assert_eq!(media.end_ms(), 150);

        media.seek(150);
        assert!(!media.has_ended());
        assert_eq!(media.read_frame().unwrap().timestamp_ms(), 100);

        media.seek(151);
        assert!(media.has_ended());
        assert!(media.read_frame().is_none());
    }

    #[test]
    fn test_replay_of_reference_against_itself() {
        let reference = reference(40);
        let summary = replay_offline(reference.clone(), &reference, &settings()).unwrap();

        assert_eq!(summary.stars.value(), 3);
        assert!(!summary.batch_averages.is_empty());
        assert!(summary.frames_scored > 0);
        assert_eq!(summary.frames_held_over, 0);
    }

    #[test]
    fn test_huge_countdown_does_not_wrap() {
        let mut settings = settings();
        settings.session.countdown_ms = u64::MAX;

        let mut session = PlaySession::new(reference(4), &settings).unwrap();
        let mut media = SequencePlayback::new(reference(4));

        let update = session.tick(0, None, &mut media).unwrap();
        assert_matches!(update, SessionUpdate::Countdown(CountdownMarker::Seconds(_)));
        assert_eq!(session.phase(), SessionPhase::Countdown);
    }

    #[test]
    fn test_replay_with_tiny_fps_terminates() {
        let mut settings = settings();
        settings.display.fps = 1e-300;

        let reference = reference(4);
        let summary = replay_offline(reference.clone(), &reference, &settings).unwrap();
        assert_eq!(summary.stars, Stars::zero());
    }

    #[test]
    fn test_replay_of_empty_performance_scores_zero() {
        let summary =
            replay_offline(reference(10), &PoseSequence::new(50), &settings()).unwrap();

        assert_eq!(summary.stars, Stars::zero());
        assert_eq!(summary.frames_scored, 0);
    }
}
