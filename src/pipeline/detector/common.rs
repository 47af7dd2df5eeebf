use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use ndarray::Array4;
use rayon::prelude::*;

use crate::pose::{Landmark, Pose, PoseLandmark};
use crate::types::Frame;

/// Input side length of the pose-landmark model.
pub const INPUT_SIZE: u32 = 256;
/// The model emits 5 values per landmark: x, y, z, visibility, presence.
pub const VALUES_PER_LANDMARK: usize = 5;

/// How the frame was letterboxed into the square model input, so raw model
/// coordinates can be projected back onto the original frame.
#[derive(Clone, Debug)]
pub struct LetterboxInfo {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_w: u32,
    pub orig_h: u32,
}

/// Resize the frame to fit the square model input (preserving aspect ratio,
/// black padding) and normalize to `[0,1]` RGB planes in NHWC order.
pub fn prepare_frame(frame: &Frame) -> Result<(Array4<f32>, LetterboxInfo)> {
    let expected_len = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.rgba.len() != expected_len {
        return Err(anyhow!(
            "frame buffer size mismatch: got {}, expected {}",
            frame.rgba.len(),
            expected_len
        ));
    }

    let scale = INPUT_SIZE as f32 / (frame.width.max(frame.height) as f32);
    let new_w = (frame.width as f32 * scale).round().max(1.0) as u32;
    let new_h = (frame.height as f32 * scale).round().max(1.0) as u32;

    let src_image = fir::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.rgba.clone(),
        fir::PixelType::U8x4,
    )?;
    let mut dst_image = fir::images::Image::new(new_w, new_h, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&resize_options))
        .context("fast resize failed")?;
    let resized = dst_image.into_vec();

    let pad_x = ((INPUT_SIZE as i64 - new_w as i64) / 2).max(0) as usize;
    let pad_y = ((INPUT_SIZE as i64 - new_h as i64) / 2).max(0) as usize;
    let mut canvas = vec![0u8; (INPUT_SIZE as usize) * (INPUT_SIZE as usize) * 4];
    for px in canvas.chunks_mut(4) {
        px[3] = 255;
    }
    let dst_stride = INPUT_SIZE as usize * 4;
    let src_stride = new_w as usize * 4;
    for row in 0..(new_h as usize) {
        let dst_offset = (pad_y + row) * dst_stride + pad_x * 4;
        let src_offset = row * src_stride;
        canvas[dst_offset..dst_offset + src_stride]
            .copy_from_slice(&resized[src_offset..src_offset + src_stride]);
    }

    let normalized: Vec<f32> = canvas
        .par_chunks_exact(4)
        .flat_map_iter(|px| {
            [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            ]
        })
        .collect();
    let input = Array4::<f32>::from_shape_vec(
        (1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3),
        normalized,
    )
    .map_err(|err| anyhow!("failed to build input tensor: {err}"))?;

    let letterbox = LetterboxInfo {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
        orig_w: frame.width,
        orig_h: frame.height,
    };

    Ok((input, letterbox))
}

/// Decode the model's flat landmark output into a `Pose` with coordinates
/// normalized to the original frame. Raw x/y are in model-input pixels; the
/// raw visibility is a logit and goes through a sigmoid. The model appends
/// auxiliary landmarks after the 33 body points; those are ignored.
pub fn decode_pose(flat: &[f32], letterbox: &LetterboxInfo) -> Result<Pose> {
    let needed = PoseLandmark::COUNT * VALUES_PER_LANDMARK;
    if flat.len() < needed {
        return Err(anyhow!(
            "unexpected landmarks length: got {}, need at least {}",
            flat.len(),
            needed
        ));
    }

    let mut landmarks = [Landmark::default(); PoseLandmark::COUNT];
    for (i, chunk) in flat
        .chunks_exact(VALUES_PER_LANDMARK)
        .take(PoseLandmark::COUNT)
        .enumerate()
    {
        let px = (chunk[0] - letterbox.pad_x) / letterbox.scale;
        let py = (chunk[1] - letterbox.pad_y) / letterbox.scale;
        landmarks[i] = Landmark::new(
            px / letterbox.orig_w.max(1) as f32,
            py / letterbox.orig_h.max(1) as f32,
            sigmoid(chunk[3]),
        );
    }

    Ok(Pose::new(landmarks))
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
