/// Pose sequence models
///
/// An append-only, timestamp-indexed recording of poses. Lookup scans every
/// pose so recordings that arrive out of order still resolve correctly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::errors::{PoseError, Result};
use crate::models::pose::{Pose, PoseRecord};

const TIME_BETWEEN_POSES_KEY: &str = "time_between_poses_ms";
const POSES_KEY: &str = "poses";

/// On-disk shape of a pose sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseSequenceRecord {
    pub time_between_poses_ms: u64,
    pub poses: Vec<PoseRecord>,
}

/// Ordered collection of poses with nearest-timestamp retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSequence {
    time_between_poses_ms: u64,
    poses: Vec<Pose>,
}

impl PoseSequence {
    /// Create an empty sequence with the nominal recording interval
    pub fn new(time_between_poses_ms: u64) -> Self {
        Self {
            time_between_poses_ms,
            poses: Vec::new(),
        }
    }

    pub fn time_between_poses_ms(&self) -> u64 {
        self.time_between_poses_ms
    }

    /// Append a pose. Ordering is not enforced.
    pub fn add(&mut self, pose: Pose) {
        self.poses.push(pose);
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pose> {
        self.poses.iter()
    }

    /// Earliest and latest timestamps, regardless of insertion order
    pub fn time_range_ms(&self) -> Option<(i64, i64)> {
        let min = self.poses.iter().map(Pose::timestamp_ms).min()?;
        let max = self.poses.iter().map(Pose::timestamp_ms).max()?;
        Some((min, max))
    }

    /// Span between the earliest and latest pose
    pub fn duration_ms(&self) -> i64 {
        self.time_range_ms()
            .map(|(start, end)| end - start)
            .unwrap_or(0)
    }

    /// Pose whose timestamp is nearest to `timestamp_ms`.
    ///
    /// Ties resolve to the pose inserted first.
    pub fn closest_at(&self, timestamp_ms: i64) -> Result<&Pose> {
        let mut closest: Option<(&Pose, u64)> = None;

        for pose in &self.poses {
            let gap = pose.timestamp_ms().abs_diff(timestamp_ms);
            match closest {
                Some((_, best_gap)) if gap >= best_gap => {}
                _ => closest = Some((pose, gap)),
            }
        }

        closest.map(|(pose, _)| pose).ok_or(PoseError::EmptySequence)
    }

    pub fn to_record(&self) -> PoseSequenceRecord {
        PoseSequenceRecord {
            time_between_poses_ms: self.time_between_poses_ms,
            poses: self.poses.iter().map(Pose::to_record).collect(),
        }
    }

    pub fn from_record(record: PoseSequenceRecord) -> Self {
        Self {
            time_between_poses_ms: record.time_between_poses_ms,
            poses: record.poses.into_iter().map(Pose::from_record).collect(),
        }
    }

    /// Parse a sequence from an untyped JSON value.
    ///
    /// Missing top-level keys fail with `MalformedSequenceData`, a bad pose
    /// entry with `MalformedPoseData`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            PoseError::MalformedSequenceData("expected a JSON object".to_string())
        })?;

        let time_between_poses_ms = object
            .get(TIME_BETWEEN_POSES_KEY)
            .ok_or_else(|| missing_key(TIME_BETWEEN_POSES_KEY))?
            .as_u64()
            .ok_or_else(|| {
                PoseError::MalformedSequenceData(format!(
                    "'{}' must be a non-negative integer",
                    TIME_BETWEEN_POSES_KEY
                ))
            })?;

        let entries = object
            .get(POSES_KEY)
            .ok_or_else(|| missing_key(POSES_KEY))?
            .as_array()
            .ok_or_else(|| {
                PoseError::MalformedSequenceData(format!("'{}' must be an array", POSES_KEY))
            })?;

        let mut sequence = Self::new(time_between_poses_ms);
        for entry in entries {
            sequence.add(Pose::from_value(entry)?);
        }

        Ok(sequence)
    }

    /// Write the sequence as pretty-printed JSON
    pub fn save_to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(&self.to_record())?;
        fs::write(path, contents)?;

        tracing::info!("Saved {} poses to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a sequence written by `save_to_json_file`
    pub fn load_from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PoseError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)
            .map_err(|e| PoseError::MalformedSequenceData(e.to_string()))?;

        let sequence = Self::from_value(&value)?;
        tracing::info!("Loaded {} poses from {}", sequence.len(), path.display());

        Ok(sequence)
    }
}

fn missing_key(key: &str) -> PoseError {
    PoseError::MalformedSequenceData(format!("missing '{}'", key))
}

impl<'a> IntoIterator for &'a PoseSequence {
    type Item = &'a Pose;
    type IntoIter = std::slice::Iter<'a, Pose>;

    fn into_iter(self) -> Self::IntoIter {
        self.poses.iter()
    }
}
