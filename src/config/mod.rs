use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Engine and game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub scoring: ScoringSettings,

    #[serde(default)]
    pub recording: RecordingSettings,

    #[serde(default)]
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Tick rate of the play loop
    #[serde(default = "default_fps")]
    pub fps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_countdown_ms")]
    pub countdown_ms: u64,

    /// Final stretch of the countdown that shows the ready marker
    #[serde(default = "default_ready_marker_ms")]
    pub ready_marker_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Distance held over before the first successful comparison, also shown
    /// as the live average until the first batch completes
    #[serde(default = "default_initial_distance")]
    pub initial_distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_pose_sequence_filename")]
    pub pose_sequence_filename: String,

    #[serde(default = "default_clean_video_filename")]
    pub clean_video_filename: String,

    #[serde(default = "default_annotated_video_filename")]
    pub annotated_video_filename: String,

    #[serde(default = "default_thumbnail_filename")]
    pub thumbnail_filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySettings {
    #[serde(default = "default_dance_folder")]
    pub dance_folder: PathBuf,
}

// Default value functions
fn default_fps() -> f64 {
    60.0
}

fn default_countdown_ms() -> u64 {
    4000
}

fn default_ready_marker_ms() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    20
}

fn default_initial_distance() -> f64 {
    20.0
}

fn default_interval_ms() -> u64 {
    50
}

fn default_pose_sequence_filename() -> String {
    "pose_sequence_data.json".to_string()
}

fn default_clean_video_filename() -> String {
    "clean_dance_video.mp4".to_string()
}

fn default_annotated_video_filename() -> String {
    "annotated_dance_video.mp4".to_string()
}

fn default_thumbnail_filename() -> String {
    "thumbnail".to_string()
}

fn default_dance_folder() -> PathBuf {
    PathBuf::from("dances")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display: DisplaySettings::default(),
            session: SessionSettings::default(),
            scoring: ScoringSettings::default(),
            recording: RecordingSettings::default(),
            library: LibrarySettings::default(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            countdown_ms: default_countdown_ms(),
            ready_marker_ms: default_ready_marker_ms(),
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            initial_distance: default_initial_distance(),
        }
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            pose_sequence_filename: default_pose_sequence_filename(),
            clean_video_filename: default_clean_video_filename(),
            annotated_video_filename: default_annotated_video_filename(),
            thumbnail_filename: default_thumbnail_filename(),
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            dance_folder: default_dance_folder(),
        }
    }
}

impl Settings {
    /// Override selected values from `DANCE_MIMIC_*` environment variables
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(fps) = parse_env::<f64>("DANCE_MIMIC_FPS") {
            self.display.fps = fps;
        }
        if let Some(batch_size) = parse_env::<usize>("DANCE_MIMIC_BATCH_SIZE") {
            self.scoring.batch_size = batch_size;
        }
        if let Some(countdown_ms) = parse_env::<u64>("DANCE_MIMIC_COUNTDOWN_MS") {
            self.session.countdown_ms = countdown_ms;
        }
        if let Ok(folder) = env::var("DANCE_MIMIC_DANCE_FOLDER") {
            if !folder.is_empty() {
                self.library.dance_folder = PathBuf::from(folder);
            }
        }
        self
    }

    /// Milliseconds between play-loop ticks
    pub fn frame_interval_ms(&self) -> u64 {
        if self.display.fps > 0.0 {
            (1000.0 / self.display.fps).round().max(1.0) as u64
        } else {
            (1000.0 / default_fps()).round() as u64
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value {:?} for {}", raw, key);
            None
        }
    }
}
