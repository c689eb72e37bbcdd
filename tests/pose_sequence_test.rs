use assert_matches::assert_matches;
use dance_mimic::models::{Landmark, LandmarkSet, Pose, PoseSequence};
use dance_mimic::PoseError;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn landmark_strategy() -> impl Strategy<Value = Landmark> {
    (
        -1.0f32..1.0,
        -1.0f32..1.0,
        -1.0f32..1.0,
        0.0f32..1.0,
        0.0f32..1.0,
    )
        .prop_map(|(x, y, z, visibility, presence)| Landmark::new(x, y, z, visibility, presence))
}

fn pose_strategy(joints: usize) -> impl Strategy<Value = Pose> {
    (
        -10_000i64..10_000,
        prop::collection::vec(prop::collection::vec(landmark_strategy(), joints), 0..3),
    )
        .prop_map(|(timestamp_ms, landmarks)| Pose::new(landmarks, timestamp_ms))
}

fn sequence_strategy() -> impl Strategy<Value = PoseSequence> {
    (1u64..200, prop::collection::vec(pose_strategy(4), 1..30)).prop_map(|(interval, poses)| {
        let mut sequence = PoseSequence::new(interval);
        for pose in poses {
            sequence.add(pose);
        }
        sequence
    })
}

#[cfg(test)]
mod closest_at_tests {
    use super::*;

    proptest! {
        #[test]
        fn closest_is_minimal_and_earliest(sequence in sequence_strategy(), query in -20_000i64..20_000) {
            let chosen = sequence.closest_at(query).unwrap();
            let chosen_gap = chosen.timestamp_ms().abs_diff(query);

            // No pose is strictly closer
            for pose in &sequence {
                prop_assert!(pose.timestamp_ms().abs_diff(query) >= chosen_gap);
            }

            // Among equally close poses the first inserted wins
            let first_tied = sequence
                .iter()
                .position(|pose| pose.timestamp_ms().abs_diff(query) == chosen_gap)
                .unwrap();
            prop_assert!(std::ptr::eq(chosen, &sequence.poses()[first_tied]));
        }
    }

    #[test]
    fn test_empty_sequence_lookup_fails() {
        let sequence = PoseSequence::new(50);
        assert_matches!(sequence.closest_at(0), Err(PoseError::EmptySequence));
    }
}

#[cfg(test)]
mod serialization_tests {
    use super::*;

    proptest! {
        #[test]
        fn json_text_round_trip_within_rounding(sequence in sequence_strategy()) {
            let text = serde_json::to_string(&sequence.to_record()).unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            let restored = PoseSequence::from_value(&value).unwrap();

            prop_assert_eq!(restored.len(), sequence.len());
            prop_assert_eq!(restored.time_between_poses_ms(), sequence.time_between_poses_ms());

            for (original, copy) in sequence.iter().zip(restored.iter()) {
                prop_assert_eq!(original.timestamp_ms(), copy.timestamp_ms());
                prop_assert_eq!(original.body_count(), copy.body_count());

                for (body, copied_body) in original.landmarks().iter().zip(copy.landmarks()) {
                    for (a, b) in body.iter().zip(copied_body) {
                        prop_assert!((a.x - b.x).abs() <= 0.0005 + f32::EPSILON);
                        prop_assert!((a.y - b.y).abs() <= 0.0005 + f32::EPSILON);
                        prop_assert!((a.z - b.z).abs() <= 0.0005 + f32::EPSILON);
                        prop_assert!((a.visibility - b.visibility).abs() <= 0.0005 + f32::EPSILON);
                        prop_assert!((a.presence - b.presence).abs() <= 0.0005 + f32::EPSILON);
                    }
                }
            }
        }
    }

    fn sample_sequence() -> PoseSequence {
        let body: LandmarkSet = vec![
            Landmark::new(0.51234, 0.12345, -0.2, 0.99, 0.98),
            Landmark::new(0.45, 0.25678, -0.1, 0.97, 0.96),
        ];

        let mut sequence = PoseSequence::new(50);
        sequence.add(Pose::new(vec![body.clone()], 0));
        sequence.add(Pose::empty(50));
        sequence.add(Pose::new(vec![body], 100));
        sequence
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pose_sequence_data.json");

        let sequence = sample_sequence();
        sequence.save_to_json_file(&path).unwrap();
        let loaded = PoseSequence::load_from_json_file(&path).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.time_between_poses_ms(), 50);
        assert!(!loaded.poses()[1].has_detection());
        assert!((loaded.poses()[0].landmarks()[0][0].x - 0.512).abs() < 1e-6);
    }

    #[test]
    fn test_saved_file_uses_documented_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pose_sequence_data.json");
        sample_sequence().save_to_json_file(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["time_between_poses_ms"], 50);
        assert_eq!(value["poses"][2]["timestamp_ms"], 100);
        let landmark = &value["poses"][0]["landmarks"][0][1];
        for key in ["x", "y", "z", "visibility", "presence"] {
            assert!(landmark.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_missing_poses_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{ "time_between_poses_ms": 50 }"#).unwrap();

        assert_matches!(
            PoseSequence::load_from_json_file(&path),
            Err(PoseError::MalformedSequenceData(_))
        );
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json at all").unwrap();

        assert_matches!(
            PoseSequence::load_from_json_file(&path),
            Err(PoseError::MalformedSequenceData(_))
        );
    }

    #[test]
    fn test_nonexistent_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        assert_matches!(
            PoseSequence::load_from_json_file(&path),
            Err(PoseError::FileNotFound(missing)) if missing == path
        );
    }
}
