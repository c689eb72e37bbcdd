use anyhow::{Context, Result};
use clap::Args;
use dance_mimic::models::PoseSequence;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectCommand {
    /// Pose sequence file
    file: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SequenceSummary {
    poses: usize,
    time_between_poses_ms: u64,
    first_timestamp_ms: Option<i64>,
    last_timestamp_ms: Option<i64>,
    duration_ms: i64,
    poses_with_detection: usize,
    max_bodies: usize,
    joints: Option<usize>,
}

impl SequenceSummary {
    fn from_sequence(sequence: &PoseSequence) -> Result<Self> {
        let mut joints = None;
        for pose in sequence {
            if let Some(count) = pose.joint_count()? {
                joints.get_or_insert(count);
            }
        }

        let range = sequence.time_range_ms();

        Ok(Self {
            poses: sequence.len(),
            time_between_poses_ms: sequence.time_between_poses_ms(),
            first_timestamp_ms: range.map(|(first, _)| first),
            last_timestamp_ms: range.map(|(_, last)| last),
            duration_ms: sequence.duration_ms(),
            poses_with_detection: sequence.iter().filter(|p| p.has_detection()).count(),
            max_bodies: sequence.iter().map(|p| p.body_count()).max().unwrap_or(0),
            joints,
        })
    }
}

impl InspectCommand {
    pub async fn execute(self) -> Result<()> {
        let sequence = PoseSequence::load_from_json_file(&self.file)
            .with_context(|| format!("Failed to load {}", self.file.display()))?;
        let summary = SequenceSummary::from_sequence(&sequence)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!("Pose Sequence: {}", self.file.display());
        println!("────────────────────────────────");
        println!("Poses:              {}", summary.poses);
        println!("Interval:           {} ms", summary.time_between_poses_ms);
        if let (Some(first), Some(last)) = (summary.first_timestamp_ms, summary.last_timestamp_ms) {
            println!("Time range:         {} .. {} ms", first, last);
        }
        println!("Duration:           {} ms", summary.duration_ms);
        println!(
            "With detection:     {}/{}",
            summary.poses_with_detection, summary.poses
        );
        println!("Max bodies:         {}", summary.max_bodies);
        match summary.joints {
            Some(joints) => println!("Joints per body:    {}", joints),
            None => println!("Joints per body:    -"),
        }

        Ok(())
    }
}
