mod common;
mod ort;

use std::{path::PathBuf, thread};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    config::DetectorOptions,
    model_download::default_model_path,
    pose::Pose,
    types::{DetectedFrame, Frame},
};

/// The injected pose-detection capability: accepts a frame, yields the
/// detected landmarks or `None` when no body is found. Test doubles supply
/// synthetic poses without a camera or a model.
pub(crate) trait PoseEngine: Send + 'static {
    fn detect(&mut self, frame: &Frame) -> anyhow::Result<Option<Pose>>;
}

fn run_worker_loop<E: PoseEngine>(
    mut engine: E,
    frame_rx: Receiver<Frame>,
    detected_tx: Sender<DetectedFrame>,
) {
    while let Some(frame) = recv_latest_frame(&frame_rx) {
        let pose = match engine.detect(&frame) {
            Ok(pose) => pose,
            Err(err) => {
                // A failed inference still forwards the frame so the video
                // keeps drawing; the overlay just skips this frame.
                log::warn!("pose inference failed: {err:?}");
                None
            }
        };
        let _ = detected_tx.try_send(DetectedFrame { frame, pose });
    }
}

fn recv_latest_frame(frame_rx: &Receiver<Frame>) -> Option<Frame> {
    let mut frame = frame_rx.recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}

#[derive(Clone, Debug)]
pub struct DetectorBackend {
    model_path: PathBuf,
    options: DetectorOptions,
}

impl DetectorBackend {
    pub fn new(model_path: Option<PathBuf>, options: DetectorOptions) -> Self {
        Self {
            model_path: model_path.unwrap_or_else(default_model_path),
            options,
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_path.clone()
    }

    pub fn label(&self) -> &'static str {
        "ort"
    }
}

pub fn start_detector(
    backend: DetectorBackend,
    frame_rx: Receiver<Frame>,
    detected_tx: Sender<DetectedFrame>,
) -> thread::JoinHandle<()> {
    log::info!("starting pose backend: {}", backend.label());

    ort::start_worker(
        backend.model_path(),
        backend.options.clone(),
        frame_rx,
        detected_tx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, PoseLandmark};
    use crossbeam_channel::bounded;
    use std::time::{Duration, Instant};

    struct StubEngine {
        pose: Option<Pose>,
    }

    impl PoseEngine for StubEngine {
        fn detect(&mut self, _frame: &Frame) -> anyhow::Result<Option<Pose>> {
            Ok(self.pose.clone())
        }
    }

    fn tiny_frame() -> Frame {
        Frame {
            rgba: vec![0u8; 4 * 4 * 4],
            width: 4,
            height: 4,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn worker_pairs_frames_with_poses() {
        let mut pose = Pose::default();
        pose.landmarks[PoseLandmark::LeftWrist as usize] = Landmark::new(0.4, 0.6, 0.9);

        let (frame_tx, frame_rx) = bounded(1);
        let (detected_tx, detected_rx) = bounded(1);
        let handle = std::thread::spawn(move || {
            run_worker_loop(StubEngine { pose: Some(pose) }, frame_rx, detected_tx);
        });

        frame_tx.send(tiny_frame()).unwrap();
        let detected = detected_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let pose = detected.pose.expect("stub engine always finds a pose");
        assert_eq!(pose.get(PoseLandmark::LeftWrist).x, 0.4);

        drop(frame_tx);
        handle.join().unwrap();
    }

    #[test]
    fn worker_forwards_frames_without_a_pose() {
        let (frame_tx, frame_rx) = bounded(1);
        let (detected_tx, detected_rx) = bounded(1);
        let handle = std::thread::spawn(move || {
            run_worker_loop(StubEngine { pose: None }, frame_rx, detected_tx);
        });

        frame_tx.send(tiny_frame()).unwrap();
        let detected = detected_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(detected.pose.is_none());
        assert_eq!(detected.frame.width, 4);

        drop(frame_tx);
        handle.join().unwrap();
    }
}
