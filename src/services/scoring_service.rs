/// Scoring Service
///
/// Turns a stream of per-frame distances into a live feedback value and a
/// final star rating:
/// - Distances are collected into fixed-size batches
/// - Each completed batch contributes its mean to the history and becomes the
///   displayed average; partial batches never touch the display
/// - The final rating classifies the mean of all batch averages against fixed
///   cutoffs tied to the cumulative DTW metric

use std::sync::Arc;

use crate::config::ScoringSettings;
use crate::errors::{PoseError, Result};
use crate::models::{Pose, PoseSequence, Stars};
use crate::services::pose_comparison_service::compare_distance;

/// Mean batch distance below which a session earns three stars
pub const THREE_STAR_CUTOFF: f64 = 0.4;
/// Mean batch distance below which a session earns two stars
pub const TWO_STAR_CUTOFF: f64 = 0.9;
/// Mean batch distance below which a session earns one star
pub const ONE_STAR_CUTOFF: f64 = 1.6;

/// Star rating for a mean batch distance
pub fn stars_for_distance(mean_distance: f64) -> Stars {
    let value = if mean_distance < THREE_STAR_CUTOFF {
        3
    } else if mean_distance < TWO_STAR_CUTOFF {
        2
    } else if mean_distance < ONE_STAR_CUTOFF {
        1
    } else {
        0
    };

    Stars::new(value).unwrap_or_default()
}

/// Rating for a full history of batch averages. No history scores zero.
pub fn final_score(batch_averages: &[f64]) -> Stars {
    if batch_averages.is_empty() {
        return Stars::zero();
    }

    let mean = batch_averages.iter().sum::<f64>() / batch_averages.len() as f64;
    stars_for_distance(mean)
}

/// Batches per-frame distances and keeps the history of batch averages
#[derive(Debug, Clone)]
pub struct ScoreAccumulator {
    batch_size: usize,
    pending: Vec<f64>,
    batch_averages: Vec<f64>,
    current_average: f64,
}

impl ScoreAccumulator {
    /// `initial_average` is displayed until the first batch completes.
    /// A batch size of zero is treated as one.
    pub fn new(batch_size: usize, initial_average: f64) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            pending: Vec::with_capacity(batch_size),
            batch_averages: Vec::new(),
            current_average: initial_average,
        }
    }

    /// Add one frame's distance. Returns the batch average if this frame completed a batch.
    pub fn push(&mut self, distance: f64) -> Option<f64> {
        self.pending.push(distance);
        if self.pending.len() < self.batch_size {
            return None;
        }

        let average = self.pending.iter().sum::<f64>() / self.pending.len() as f64;
        self.pending.clear();
        self.batch_averages.push(average);
        self.current_average = average;

        tracing::debug!(
            "Batch {} completed with average distance {:.4}",
            self.batch_averages.len(),
            average
        );

        Some(average)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Last completed batch average, or the initial value before any batch
    pub fn current_average(&self) -> f64 {
        self.current_average
    }

    pub fn batch_averages(&self) -> &[f64] {
        &self.batch_averages
    }

    /// Frames collected since the last completed batch
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn final_score(&self) -> Stars {
        final_score(&self.batch_averages)
    }
}

/// What happened to one live pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Distance that was accumulated for this frame
    pub distance: f64,
    /// True when the comparison failed and the previous distance was reused
    pub held_over: bool,
    /// Set when this frame completed a batch
    pub completed_batch: Option<f64>,
}

/// Scores live poses against a reference sequence
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    reference: Arc<PoseSequence>,
    accumulator: ScoreAccumulator,
    last_distance: f64,
}

impl ScoringEngine {
    /// Fails with `EmptySequence` so lookups can never hit an empty reference
    pub fn new(reference: Arc<PoseSequence>, settings: &ScoringSettings) -> Result<Self> {
        if reference.is_empty() {
            return Err(PoseError::EmptySequence);
        }

        Ok(Self {
            reference,
            accumulator: ScoreAccumulator::new(settings.batch_size, settings.initial_distance),
            last_distance: settings.initial_distance,
        })
    }

    pub fn reference(&self) -> &PoseSequence {
        &self.reference
    }

    /// Compare `live` with the reference pose nearest `reference_timestamp_ms` and accumulate
    pub fn update(&mut self, live: &Pose, reference_timestamp_ms: i64) -> Result<FrameOutcome> {
        let reference_pose = self.reference.closest_at(reference_timestamp_ms)?;

        let (distance, held_over) = match compare_distance(live, reference_pose) {
            Some(distance) => {
                self.last_distance = distance;
                (distance, false)
            }
            None => {
                tracing::debug!(
                    "No comparison at {} ms, holding distance {:.4}",
                    reference_timestamp_ms,
                    self.last_distance
                );
                (self.last_distance, true)
            }
        };

        let completed_batch = self.accumulator.push(distance);

        Ok(FrameOutcome {
            distance,
            held_over,
            completed_batch,
        })
    }

    pub fn current_average(&self) -> f64 {
        self.accumulator.current_average()
    }

    pub fn batch_averages(&self) -> &[f64] {
        self.accumulator.batch_averages()
    }

    pub fn last_distance(&self) -> f64 {
        self.last_distance
    }

    pub fn final_score(&self) -> Stars {
        self.accumulator.final_score()
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

    fn reference() -> Arc<PoseSequence> {
        let mut sequence = PoseSequence::new(50);
        sequence.add(pose_at(0, &[(1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]));
        sequence.add(pose_at(50, &[(0.0, 1.0, 0.0), (1.0, 0.0, 0.0)]));
        Arc::new(sequence)
    }

    fn settings(batch_size: usize) -> ScoringSettings {
        ScoringSettings {
            batch_size,
            initial_distance: 20.0,
        }
    }

    #[test]
    fn test_final_score_table() {
        assert_eq!(final_score(&[0.1, 0.2]).value(), 3);
        assert_eq!(final_score(&[0.5, 0.6]).value(), 2);
        assert_eq!(final_score(&[1.0, 1.5]).value(), 1);
        assert_eq!(final_score(&[2.0]).value(), 0);
        assert_eq!(final_score(&[]).value(), 0);
    }

    #[test]
    fn test_cutoffs_are_exclusive() {
        assert_eq!(stars_for_distance(0.4).value(), 2);
        assert_eq!(stars_for_distance(0.9).value(), 1);
        assert_eq!(stars_for_distance(1.6).value(), 0);
    }

    #[test]
    fn test_display_waits_for_full_batch() {
        let mut accumulator = ScoreAccumulator::new(4, 20.0);

        for _ in 0..3 {
            assert_eq!(accumulator.push(0.7), None);
            assert_eq!(accumulator.current_average(), 20.0);
        }

        let completed = accumulator.push(0.7).unwrap();
        assert!((completed - 0.7).abs() < 1e-12);
        assert!((accumulator.current_average() - 0.7).abs() < 1e-12);
        assert_eq!(accumulator.batch_averages().len(), 1);
        assert_eq!(accumulator.pending_len(), 0);
    }

    #[test]
    fn test_partial_batch_is_not_scored() {
        let mut accumulator = ScoreAccumulator::new(2, 20.0);
        accumulator.push(0.1);
        accumulator.push(0.1);
        accumulator.push(5.0);

        assert_eq!(accumulator.batch_averages(), &[0.1]);
        assert_eq!(accumulator.final_score().value(), 3);
    }

    #[test]
    fn test_zero_batch_size_behaves_as_one() {
        let mut accumulator = ScoreAccumulator::new(0, 20.0);
        assert_eq!(accumulator.batch_size(), 1);
        assert_eq!(accumulator.push(1.0), Some(1.0));
    }

    #[test]
    fn test_engine_rejects_empty_reference() {
        let result = ScoringEngine::new(Arc::new(PoseSequence::new(50)), &settings(20));
        assert_matches!(result, Err(PoseError::EmptySequence));
    }

    #[test]
    fn test_engine_matches_closest_reference() {
        let mut engine = ScoringEngine::new(reference(), &settings(20)).unwrap();
        let live = pose_at(0, &[(0.0, 1.0, 0.0), (1.0, 0.0, 0.0)]);

        let outcome = engine.update(&live, 45).unwrap();
        assert!(outcome.distance.abs() < 1e-9);
        assert!(!outcome.held_over);

        let outcome = engine.update(&live, 5).unwrap();
        assert!(outcome.distance > 1.0);
    }

    #[test]
    fn test_engine_holds_previous_distance() {
        let mut engine = ScoringEngine::new(reference(), &settings(20)).unwrap();

        let outcome = engine.update(&Pose::empty(0), 0).unwrap();
        assert!(outcome.held_over);
        assert_eq!(outcome.distance, 20.0);

        let live = pose_at(0, &[(1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let matched = engine.update(&live, 0).unwrap().distance;

        let outcome = engine.update(&Pose::empty(0), 0).unwrap();
        assert!(outcome.held_over);
        assert_eq!(outcome.distance, matched);
    }

    #[test]
    fn test_engine_batches_into_final_score() {
        let mut engine = ScoringEngine::new(reference(), &settings(3)).unwrap();
        let live = pose_at(0, &[(1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);

        let outcomes: Vec<_> = (0..3).map(|_| engine.update(&live, 0).unwrap()).collect();
        assert!(outcomes[2].completed_batch.is_some());
        assert_eq!(engine.batch_averages().len(), 1);
        assert_eq!(engine.final_score().value(), 3);
    }
}
