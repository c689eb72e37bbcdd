// Pose data and game models

pub mod dance;
pub mod game_state;
pub mod pose;
pub mod pose_sequence;

pub use dance::*;
pub use game_state::*;
pub use pose::*;
pub use pose_sequence::*;
