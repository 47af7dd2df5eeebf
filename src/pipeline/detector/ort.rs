use std::{path::PathBuf, thread};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, Sender};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{PoseEngine, common, run_worker_loop};
use crate::{
    config::DetectorOptions,
    model_download::ensure_model_ready,
    pose::Pose,
    types::{DetectedFrame, Frame},
};

pub fn start_worker(
    model_path: PathBuf,
    options: DetectorOptions,
    frame_rx: Receiver<Frame>,
    detected_tx: Sender<DetectedFrame>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if let Err(err) = ensure_model_ready(&model_path, |_evt| {}) {
            log::error!(
                "failed to prepare pose model at {}: {err:?}",
                model_path.display()
            );
            return;
        }

        let engine = match OrtEngine::new(&model_path, options) {
            Ok(engine) => {
                log::info!("pose ORT backend ready using {}", model_path.display());
                engine
            }
            Err(err) => {
                log::error!("failed to load ORT pose model: {err:?}");
                return;
            }
        };

        run_worker_loop(engine, frame_rx, detected_tx);
    })
}

struct OrtEngine {
    session: Session,
    options: DetectorOptions,
}

impl OrtEngine {
    fn new(model_path: &PathBuf, options: DetectorOptions) -> Result<Self> {
        // The complexity/smoothing options belong to the upstream tracking
        // graph; the single bundled landmark model only honors the
        // confidence threshold. Log them so a mismatch is at least visible.
        log::debug!(
            "detector options: complexity={} smooth_landmarks={} segmentation={} \
             smooth_segmentation={} min_tracking_confidence={} effect={}",
            options.model_complexity,
            options.smooth_landmarks,
            options.enable_segmentation,
            options.smooth_segmentation,
            options.min_tracking_confidence,
            options.effect
        );

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load ORT session from {}", model_path.display()))?;

        Ok(Self { session, options })
    }
}

impl PoseEngine for OrtEngine {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Pose>> {
        let (input, letterbox) = common::prepare_frame(frame)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run ORT session")?;

        if outputs.len() < 1 {
            return Err(anyhow!("model returned no outputs"));
        }

        // Second output is the pose-presence score; below the configured
        // detection confidence the frame counts as "no pose", not an error.
        let score = if outputs.len() > 1 {
            outputs[1]
                .try_extract_array::<f32>()
                .ok()
                .and_then(|arr| arr.iter().next().copied())
                .map(common::sigmoid)
                .unwrap_or(0.0)
        } else {
            1.0
        };
        if score < self.options.min_detection_confidence {
            return Ok(None);
        }

        let coords = outputs[0].try_extract_array::<f32>()?;
        let flattened: Vec<f32> = coords.iter().copied().collect();
        let pose = common::decode_pose(&flattened, &letterbox)?;

        Ok(Some(pose))
    }
}
