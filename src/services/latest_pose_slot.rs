use std::sync::Arc;
use tokio::sync::watch;

use crate::models::Pose;

/// Single-slot, last-writer-wins mailbox between the landmark detector and the play loop.
///
/// The detector side overwrites the slot without waiting; the play loop reads
/// the newest pose without consuming it.
pub struct LatestPoseSlot;

impl LatestPoseSlot {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (PosePublisher, PoseReader) {
        let (tx, rx) = watch::channel(None);
        (PosePublisher { tx }, PoseReader { rx })
    }
}

/// Writing half, owned by the detector
#[derive(Debug)]
pub struct PosePublisher {
    tx: watch::Sender<Option<Arc<Pose>>>,
}

impl PosePublisher {
    /// Replace whatever pose is in the slot
    pub fn publish(&self, pose: Pose) {
        self.tx.send_replace(Some(Arc::new(pose)));
    }

    /// Empty the slot, e.g. when the detector stops
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}

/// Reading half, owned by the play loop
#[derive(Debug, Clone)]
pub struct PoseReader {
    rx: watch::Receiver<Option<Arc<Pose>>>,
}

impl PoseReader {
    /// Newest pose, marking it as seen
    pub fn latest(&mut self) -> Option<Arc<Pose>> {
        self.rx.borrow_and_update().clone()
    }

    /// Newest pose without marking it as seen
    pub fn peek(&self) -> Option<Arc<Pose>> {
        self.rx.borrow().clone()
    }

    /// Whether a pose arrived since the last `latest` call
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}
