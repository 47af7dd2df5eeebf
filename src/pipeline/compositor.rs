use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crossbeam_channel::{Receiver, Sender};

use super::skeleton;
use crate::overlay::{Anchor, ARM_SEGMENTS, SpriteSet, geometry, sprite};
use crate::pose::{Pose, VISIBILITY_THRESHOLD};
use crate::types::{CompositedFrame, DetectedFrame, Frame};

/// Per-frame drawing routine: background video, optional debug skeleton, then
/// one rotated/scaled sprite per qualifying arm segment. Holds the sprite
/// assets (loaded once) and the debug flag shared with the UI; everything else
/// is per-frame input.
pub struct Compositor {
    sprites: SpriteSet,
    debug_overlay: Arc<AtomicBool>,
}

impl Compositor {
    pub fn new(sprites: SpriteSet, debug_overlay: Arc<AtomicBool>) -> Self {
        Self {
            sprites,
            debug_overlay,
        }
    }

    /// Draw one frame. Synchronous and self-contained: no state survives into
    /// the next call, so a frame with no pose simply reproduces the
    /// background.
    pub fn compose(&self, frame: &Frame, pose: Option<&Pose>) -> CompositedFrame {
        let mut canvas = frame.rgba.clone();

        if let Some(pose) = pose {
            if self.debug_overlay.load(Ordering::Relaxed) {
                skeleton::draw_debug_overlay(&mut canvas, frame.width, frame.height, pose);
            }
            self.draw_arms(&mut canvas, frame.width, frame.height, pose);
        }

        CompositedFrame {
            rgba: canvas,
            width: frame.width,
            height: frame.height,
            pose_detected: pose.is_some(),
        }
    }

    fn draw_arms(&self, canvas: &mut [u8], width: u32, height: u32, pose: &Pose) {
        for segment in ARM_SEGMENTS {
            let p1 = pose.get(segment.from);
            let p2 = pose.get(segment.to);
            if !p1.is_visible(VISIBILITY_THRESHOLD) || !p2.is_visible(VISIBILITY_THRESHOLD) {
                continue;
            }
            // Skip-if-unloaded: a missing asset costs one segment, not a panic.
            let Some(image) = self.sprites.get(segment.sprite) else {
                continue;
            };

            let span = geometry::distance(p1, p2, width, height);
            let placement = geometry::rotation(p1, p2);
            let anchor = match segment.anchor {
                Anchor::Midpoint => (placement.x * width as f32, placement.y * height as f32),
                Anchor::Endpoint => p2.to_pixel(width, height),
            };
            let target = sprite::scaled_size(image, span, segment.sprite);

            // Each blit computes its own transform, so segments never
            // compound rotations or scales.
            sprite::draw_sprite(
                canvas,
                width,
                height,
                image,
                anchor,
                placement.angle,
                target,
                segment.mirrored,
            );
        }
    }
}

/// Worker thread turning detector output into display-ready frames. Frames
/// are forwarded with `try_send` so a slow consumer drops frames instead of
/// stalling the pipeline.
pub fn start_frame_compositor(
    sprites: SpriteSet,
    debug_overlay: Arc<AtomicBool>,
    detected_rx: Receiver<DetectedFrame>,
    composited_tx: Sender<CompositedFrame>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let compositor = Compositor::new(sprites, debug_overlay);
        while let Ok(detected) = detected_rx.recv() {
            let composited = compositor.compose(&detected.frame, detected.pose.as_ref());
            let _ = composited_tx.try_send(composited);
        }
        log::debug!("detector channel closed, compositor stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::SpriteKind;
    use crate::pose::{Landmark, PoseLandmark};
    use image::{Rgba, RgbaImage};
    use std::time::Instant;

    const W: u32 = 160;
    const H: u32 = 120;

    fn gray_frame() -> Frame {
        let mut rgba = vec![128u8; (W * H * 4) as usize];
        for px in rgba.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Frame {
            rgba,
            width: W,
            height: H,
            timestamp: Instant::now(),
        }
    }

    fn full_sprites() -> SpriteSet {
        let mut set = SpriteSet::default();
        for kind in [SpriteKind::UpperArm, SpriteKind::Forearm, SpriteKind::Hand] {
            set.insert(kind, RgbaImage::from_pixel(8, 16, Rgba([255, 0, 0, 255])));
        }
        set
    }

    fn pose_with_right_forearm(visibility: f32) -> Pose {
        let mut pose = Pose::default();
        pose.landmarks[PoseLandmark::RightElbow as usize] = Landmark::new(0.3, 0.5, visibility);
        pose.landmarks[PoseLandmark::RightWrist as usize] = Landmark::new(0.7, 0.5, visibility);
        pose
    }

    fn compositor(sprites: SpriteSet, debug: bool) -> Compositor {
        Compositor::new(sprites, Arc::new(AtomicBool::new(debug)))
    }

    #[test]
    fn no_pose_reproduces_the_background() {
        let frame = gray_frame();
        let out = compositor(full_sprites(), true).compose(&frame, None);
        assert_eq!(out.rgba, frame.rgba);
        assert!(!out.pose_detected);
    }

    #[test]
    fn low_visibility_segment_is_skipped() {
        let frame = gray_frame();
        let pose = pose_with_right_forearm(0.5);
        let out = compositor(full_sprites(), false).compose(&frame, Some(&pose));
        assert_eq!(out.rgba, frame.rgba);
        assert!(out.pose_detected);
    }

    #[test]
    fn threshold_is_strict() {
        let frame = gray_frame();
        let pose = pose_with_right_forearm(VISIBILITY_THRESHOLD);
        let out = compositor(full_sprites(), false).compose(&frame, Some(&pose));
        assert_eq!(out.rgba, frame.rgba);
    }

    #[test]
    fn visible_segment_draws_its_sprite() {
        let frame = gray_frame();
        let pose = pose_with_right_forearm(0.9);
        let out = compositor(full_sprites(), false).compose(&frame, Some(&pose));

        // The forearm sprite is anchored at the pair midpoint (0.5, 0.5).
        let idx = ((H / 2 * W + W / 2) as usize) * 4;
        assert_eq!(&out.rgba[idx..idx + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn unloaded_sprite_skips_the_segment() {
        let frame = gray_frame();
        let pose = pose_with_right_forearm(0.9);
        let out = compositor(SpriteSet::default(), false).compose(&frame, Some(&pose));
        assert_eq!(out.rgba, frame.rgba);
    }

    #[test]
    fn debug_flag_only_adds_skeleton_drawing() {
        let frame = gray_frame();
        let pose = pose_with_right_forearm(0.9);

        // With no sprites loaded, the debug flag is the only source of
        // drawing, so off means untouched and on means changed.
        let off = compositor(SpriteSet::default(), false).compose(&frame, Some(&pose));
        assert_eq!(off.rgba, frame.rgba);
        let on = compositor(SpriteSet::default(), true).compose(&frame, Some(&pose));
        assert_ne!(on.rgba, frame.rgba);
    }

    #[test]
    fn toggling_debug_between_frames_does_not_move_sprites() {
        let frame = gray_frame();
        let pose = pose_with_right_forearm(0.9);
        let debug = Arc::new(AtomicBool::new(false));
        let compositor = Compositor::new(full_sprites(), debug.clone());

        let first = compositor.compose(&frame, Some(&pose));
        debug.store(true, Ordering::Relaxed);
        let second = compositor.compose(&frame, Some(&pose));

        // The sprite anchor pixel is identical across the toggle: the flag
        // affects only the skeleton drawing underneath.
        let idx = ((H / 2 * W + W / 2) as usize) * 4;
        assert_eq!(&first.rgba[idx..idx + 4], &[255, 0, 0, 255]);
        assert_eq!(&second.rgba[idx..idx + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn worker_forwards_composited_frames() {
        let (detected_tx, detected_rx) = crossbeam_channel::bounded(1);
        let (composited_tx, composited_rx) = crossbeam_channel::bounded(1);
        let handle = start_frame_compositor(
            full_sprites(),
            Arc::new(AtomicBool::new(false)),
            detected_rx,
            composited_tx,
        );

        detected_tx
            .send(DetectedFrame {
                frame: gray_frame(),
                pose: Some(pose_with_right_forearm(0.9)),
            })
            .unwrap();
        let out = composited_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert!(out.pose_detected);
        assert_eq!(out.width, W);

        drop(detected_tx);
        handle.join().unwrap();
    }
}
