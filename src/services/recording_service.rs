/// Recording Service
///
/// Builds new reference dances from detector output:
/// - Live mode appends one pose per detector result
/// - Video mode samples a timeline of results at a fixed interval
/// - Finished recordings go into a fresh folder under the dance library

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{PoseError, Result};
use crate::models::{LandmarkSet, Pose, PoseSequence};

/// An in-progress recording
#[derive(Debug, Clone)]
pub struct RecordingSession {
    sequence: PoseSequence,
}

impl RecordingSession {
    pub fn new(time_between_poses_ms: u64) -> Self {
        tracing::debug!(
            "Recording session created with {} ms between poses",
            time_between_poses_ms
        );
        Self {
            sequence: PoseSequence::new(time_between_poses_ms),
        }
    }

    /// Append a pose for a detector result. Results with zero bodies are kept.
    ///
    /// Returns false when there was no detector result to record.
    pub fn record(&mut self, detection: Option<Vec<LandmarkSet>>, timestamp_ms: i64) -> bool {
        match detection {
            Some(landmarks) => {
                self.sequence.add(Pose::new(landmarks, timestamp_ms));
                true
            }
            None => false,
        }
    }

    pub fn pose_count(&self) -> usize {
        self.sequence.len()
    }

    pub fn sequence(&self) -> &PoseSequence {
        &self.sequence
    }

    pub fn into_sequence(self) -> PoseSequence {
        self.sequence
    }

    /// Save the recording as `folder/filename`.
    ///
    /// Failures are logged and returned; the recording is lost but nothing panics.
    pub fn finish(self, folder: &Path, filename: &str) -> Result<PathBuf> {
        let path = folder.join(filename);

        match self.sequence.save_to_json_file(&path) {
            Ok(()) => {
                tracing::info!(
                    "Recording finished with {} poses at {}",
                    self.sequence.len(),
                    path.display()
                );
                Ok(path)
            }
            Err(e) => {
                tracing::error!("Failed to save recording to {}: {}", path.display(), e);
                Err(e)
            }
        }
    }
}

/// Record detector results sampled at `interval_ms`.
///
/// The first result is always kept; after that a result is kept once at least
/// `interval_ms` has passed since the last kept one.
pub fn sample_from_timeline<I>(detections: I, interval_ms: u64) -> RecordingSession
where
    I: IntoIterator<Item = Pose>,
{
    let mut session = RecordingSession::new(interval_ms);
    let mut last_kept: Option<i64> = None;

    for pose in detections {
        let timestamp_ms = pose.timestamp_ms();
        let due = match last_kept {
            Some(last) => timestamp_ms.saturating_sub(last) >= i64::try_from(interval_ms).unwrap_or(i64::MAX),
            None => true,
        };

        if due {
            let landmarks = pose.landmarks().to_vec();
            session.record(Some(landmarks), timestamp_ms);
            last_kept = Some(timestamp_ms);
        }
    }

    session
}

/// Create `base/name`, or `base/name_2`, `base/name_3`, ... if already taken
pub fn create_output_folder(base: &Path, name: &str) -> Result<PathBuf> {
    if !base.is_dir() {
        return Err(PoseError::FileNotFound(base.to_path_buf()));
    }

    let mut candidate = base.join(name);
    let mut suffix = 2;
    while candidate.exists() {
        candidate = base.join(format!("{}_{}", name, suffix));
        suffix += 1;
    }

    fs::create_dir(&candidate)?;
    tracing::info!("Created output folder {}", candidate.display());

    Ok(candidate)
}
