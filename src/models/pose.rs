/// Pose models
///
/// A `Pose` is an immutable snapshot of every body the landmark detector found
/// in one frame. Landmark order inside a body is anatomically fixed: index 0 is
/// the same joint in every pose produced by the same model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{PoseError, Result};

/// Number of decimal digits kept when a pose is written to disk.
pub const STORED_DECIMALS: i32 = 3;

/// A single body keypoint as produced by the landmark detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (normalized, typically 0-1)
    pub x: f32,
    /// Y coordinate (normalized, typically 0-1)
    pub y: f32,
    /// Depth relative to the hips, same scale as x
    pub z: f32,
    /// Confidence that the point is not occluded (0-1)
    pub visibility: f32,
    /// Confidence that the point is inside the frame (0-1)
    pub presence: f32,
}

impl Landmark {
    /// Create a new landmark
    pub fn new(x: f32, y: f32, z: f32, visibility: f32, presence: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
            presence,
        }
    }

    /// Spatial position only, widened for distance math
    pub fn position(&self) -> [f64; 3] {
        [self.x as f64, self.y as f64, self.z as f64]
    }

    /// Copy with every field rounded to the stored precision
    pub fn rounded(&self) -> Self {
        Self {
            x: round_stored(self.x),
            y: round_stored(self.y),
            z: round_stored(self.z),
            visibility: round_stored(self.visibility),
            presence: round_stored(self.presence),
        }
    }
}

fn round_stored(value: f32) -> f32 {
    let scale = 10f64.powi(STORED_DECIMALS);
    ((value as f64 * scale).round() / scale) as f32
}

/// Landmarks of one detected body
pub type LandmarkSet = Vec<Landmark>;

/// On-disk shape of a pose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseRecord {
    pub timestamp_ms: i64,
    pub landmarks: Vec<LandmarkSet>,
}

/// Timestamped snapshot of all detected bodies
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    landmarks: Vec<LandmarkSet>,
    timestamp_ms: i64,
}

impl Pose {
    /// Wrap a detector result. An empty list means nobody was detected.
    pub fn new(landmarks: Vec<LandmarkSet>, timestamp_ms: i64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    /// Pose with no detected body
    pub fn empty(timestamp_ms: i64) -> Self {
        Self::new(Vec::new(), timestamp_ms)
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn landmarks(&self) -> &[LandmarkSet] {
        &self.landmarks
    }

    /// Number of detected bodies
    pub fn body_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn has_detection(&self) -> bool {
        !self.landmarks.is_empty()
    }

    /// Landmarks of the first detected body. Additional bodies are never scored.
    pub fn first_body(&self) -> Option<&LandmarkSet> {
        self.landmarks.first()
    }

    /// Joint count shared by every body, `None` when nothing was detected
    pub fn joint_count(&self) -> Result<Option<usize>> {
        let mut sets = self.landmarks.iter();
        let Some(first) = sets.next() else {
            return Ok(None);
        };

        let expected = first.len();
        for (index, set) in sets.enumerate() {
            if set.len() != expected {
                return Err(PoseError::MalformedPoseData(format!(
                    "body {} has {} landmarks, expected {}",
                    index + 1,
                    set.len(),
                    expected
                )));
            }
        }

        Ok(Some(expected))
    }

    /// Storage record with every landmark field rounded to 3 decimals
    pub fn to_record(&self) -> PoseRecord {
        PoseRecord {
            timestamp_ms: self.timestamp_ms,
            landmarks: self
                .landmarks
                .iter()
                .map(|set| set.iter().map(Landmark::rounded).collect())
                .collect(),
        }
    }

    pub fn from_record(record: PoseRecord) -> Self {
        Self::new(record.landmarks, record.timestamp_ms)
    }

    /// Parse a pose from an untyped JSON value
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PoseError::MalformedPoseData(
                "expected a JSON object".to_string(),
            ));
        }

        let record: PoseRecord = serde_json::from_value(value.clone())
            .map_err(|e| PoseError::MalformedPoseData(e.to_string()))?;

        Ok(Self::from_record(record))
    }
}

impl From<PoseRecord> for Pose {
    fn from(record: PoseRecord) -> Self {
        Self::from_record(record)
    }
}
