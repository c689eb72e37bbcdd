// Matching, scoring and session services

pub mod dance_library_service;
pub mod latest_pose_slot;
pub mod play_session_service;
pub mod pose_comparison_service;
pub mod recording_service;
pub mod scoring_service;
pub mod session_runner;

pub use dance_library_service::DanceLibrary;
pub use latest_pose_slot::{LatestPoseSlot, PosePublisher, PoseReader};
pub use play_session_service::{
    replay_offline, CountdownMarker, PlaySession, ReferenceMedia, ReplaySummary, ScoreDisplay,
    SequencePlayback, SessionPhase, SessionUpdate,
};
pub use pose_comparison_service::compare_distance;
pub use recording_service::{create_output_folder, sample_from_timeline, RecordingSession};
pub use scoring_service::{final_score, FrameOutcome, ScoreAccumulator, ScoringEngine};
pub use session_runner::SessionRunner;
