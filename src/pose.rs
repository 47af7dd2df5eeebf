/// Landmark indices of the 33-point full-body pose model (MediaPipe ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    /// Which body half a landmark belongs to, used for the debug overlay's
    /// color coding. Apart from the eye block (1-6), odd indices are
    /// left-side and even indices right-side; the nose is neutral.
    pub fn side(self) -> BodySide {
        Self::side_of(self as usize)
    }

    pub fn side_of(index: usize) -> BodySide {
        match index {
            0 => BodySide::Neutral,
            1..=3 => BodySide::Left,
            4..=6 => BodySide::Right,
            i if i % 2 == 1 => BodySide::Left,
            _ => BodySide::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySide {
    Left,
    Right,
    Neutral,
}

/// Minimum visibility score required before a landmark is trusted for drawing.
pub const VISIBILITY_THRESHOLD: f32 = 0.65;

/// A detected body keypoint in normalized `[0,1]` frame coordinates, plus the
/// model's confidence that it is actually visible.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }

    pub fn to_pixel(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

/// One detected pose: all 33 landmarks for a single frame.
#[derive(Debug, Clone)]
pub struct Pose {
    pub landmarks: [Landmark; PoseLandmark::COUNT],
}

impl Pose {
    pub fn new(landmarks: [Landmark; PoseLandmark::COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, index: PoseLandmark) -> &Landmark {
        &self.landmarks[index as usize]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); PoseLandmark::COUNT],
        }
    }
}

/// Standard skeletal connections of the 33-point model, drawn by the debug
/// overlay.
pub const POSE_CONNECTIONS: &[(PoseLandmark, PoseLandmark)] = &[
    // Face
    (PoseLandmark::Nose, PoseLandmark::LeftEyeInner),
    (PoseLandmark::LeftEyeInner, PoseLandmark::LeftEye),
    (PoseLandmark::LeftEye, PoseLandmark::LeftEyeOuter),
    (PoseLandmark::LeftEyeOuter, PoseLandmark::LeftEar),
    (PoseLandmark::Nose, PoseLandmark::RightEyeInner),
    (PoseLandmark::RightEyeInner, PoseLandmark::RightEye),
    (PoseLandmark::RightEye, PoseLandmark::RightEyeOuter),
    (PoseLandmark::RightEyeOuter, PoseLandmark::RightEar),
    (PoseLandmark::MouthLeft, PoseLandmark::MouthRight),
    // Arms
    (PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder),
    (PoseLandmark::LeftShoulder, PoseLandmark::LeftElbow),
    (PoseLandmark::LeftElbow, PoseLandmark::LeftWrist),
    (PoseLandmark::LeftWrist, PoseLandmark::LeftPinky),
    (PoseLandmark::LeftWrist, PoseLandmark::LeftIndex),
    (PoseLandmark::LeftWrist, PoseLandmark::LeftThumb),
    (PoseLandmark::LeftPinky, PoseLandmark::LeftIndex),
    (PoseLandmark::RightShoulder, PoseLandmark::RightElbow),
    (PoseLandmark::RightElbow, PoseLandmark::RightWrist),
    (PoseLandmark::RightWrist, PoseLandmark::RightPinky),
    (PoseLandmark::RightWrist, PoseLandmark::RightIndex),
    (PoseLandmark::RightWrist, PoseLandmark::RightThumb),
    (PoseLandmark::RightPinky, PoseLandmark::RightIndex),
    // Torso
    (PoseLandmark::LeftShoulder, PoseLandmark::LeftHip),
    (PoseLandmark::RightShoulder, PoseLandmark::RightHip),
    (PoseLandmark::LeftHip, PoseLandmark::RightHip),
    // Legs
    (PoseLandmark::LeftHip, PoseLandmark::LeftKnee),
    (PoseLandmark::LeftKnee, PoseLandmark::LeftAnkle),
    (PoseLandmark::LeftAnkle, PoseLandmark::LeftHeel),
    (PoseLandmark::LeftHeel, PoseLandmark::LeftFootIndex),
    (PoseLandmark::LeftAnkle, PoseLandmark::LeftFootIndex),
    (PoseLandmark::RightHip, PoseLandmark::RightKnee),
    (PoseLandmark::RightKnee, PoseLandmark::RightAnkle),
    (PoseLandmark::RightAnkle, PoseLandmark::RightHeel),
    (PoseLandmark::RightHeel, PoseLandmark::RightFootIndex),
    (PoseLandmark::RightAnkle, PoseLandmark::RightFootIndex),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_count() {
        assert_eq!(PoseLandmark::COUNT, 33);
        assert_eq!(PoseLandmark::RightFootIndex as usize, 32);
    }

    #[test]
    fn landmark_visibility() {
        let lm = Landmark::new(0.5, 0.5, 0.7);
        assert!(lm.is_visible(VISIBILITY_THRESHOLD));
        assert!(!lm.is_visible(0.8));
        // The threshold is strict: exactly 0.65 does not qualify.
        let borderline = Landmark::new(0.5, 0.5, VISIBILITY_THRESHOLD);
        assert!(!borderline.is_visible(VISIBILITY_THRESHOLD));
    }

    #[test]
    fn landmark_to_pixel() {
        let lm = Landmark::new(0.5, 0.25, 1.0);
        let (px, py) = lm.to_pixel(640, 480);
        assert_eq!(px, 320.0);
        assert_eq!(py, 120.0);
    }

    #[test]
    fn body_sides() {
        assert_eq!(PoseLandmark::Nose.side(), BodySide::Neutral);
        assert_eq!(PoseLandmark::LeftShoulder.side(), BodySide::Left);
        assert_eq!(PoseLandmark::RightShoulder.side(), BodySide::Right);
        assert_eq!(PoseLandmark::LeftIndex.side(), BodySide::Left);
        assert_eq!(PoseLandmark::RightIndex.side(), BodySide::Right);
    }

    #[test]
    fn pose_get() {
        let mut pose = Pose::default();
        pose.landmarks[PoseLandmark::LeftElbow as usize] = Landmark::new(0.3, 0.6, 0.9);
        let elbow = pose.get(PoseLandmark::LeftElbow);
        assert_eq!(elbow.x, 0.3);
        assert_eq!(elbow.y, 0.6);
    }

    #[test]
    fn connections_stay_in_range() {
        for &(a, b) in POSE_CONNECTIONS {
            assert!((a as usize) < PoseLandmark::COUNT);
            assert!((b as usize) < PoseLandmark::COUNT);
        }
    }
}
