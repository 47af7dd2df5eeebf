use std::time::Instant;

use crate::pose::Pose;

#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    #[allow(dead_code)]
    pub timestamp: Instant,
}

/// Output of the detector stage: the frame that was analyzed plus whatever
/// pose (if any) the model found in it. `pose: None` is a normal per-frame
/// outcome, not an error.
#[derive(Clone, Debug)]
pub struct DetectedFrame {
    pub frame: Frame,
    pub pose: Option<Pose>,
}

/// A fully drawn frame ready for display: background video plus the arm
/// sprites (and the debug skeleton when enabled).
#[derive(Clone, Debug)]
pub struct CompositedFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub pose_detected: bool,
}
