use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::pose::PoseLandmark;

/// Sprite height relative to the landmark-pair pixel distance.
pub const LIMB_ENLARGEMENT: f32 = 1.3;
/// Hands get doubled on top of the limb enlargement.
pub const HAND_ENLARGEMENT: f32 = 2.0;

#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("failed to read sprite {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode sprite {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    UpperArm,
    Forearm,
    Hand,
}

impl SpriteKind {
    pub fn file_name(self) -> &'static str {
        match self {
            SpriteKind::UpperArm => "upper_arm.png",
            SpriteKind::Forearm => "forearm.png",
            SpriteKind::Hand => "hand.png",
        }
    }
}

/// Where the sprite is pinned along the landmark pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Centered on the pair's midpoint (limb segments).
    Midpoint,
    /// Centered on the distal landmark (hand segments).
    Endpoint,
}

/// One statically defined limb segment: which landmark pair drives it, which
/// sprite it draws, and how. Never mutated at runtime.
#[derive(Debug, Clone, Copy)]
pub struct ArmSegment {
    pub from: PoseLandmark,
    pub to: PoseLandmark,
    pub sprite: SpriteKind,
    pub anchor: Anchor,
    pub mirrored: bool,
}

/// The six drawable segments, three per arm. The model's "right" landmarks
/// appear on the viewer's left in selfie view, so that side uses the
/// unmirrored artwork and the other side mirrors it.
pub const ARM_SEGMENTS: &[ArmSegment] = &[
    ArmSegment {
        from: PoseLandmark::RightShoulder,
        to: PoseLandmark::RightElbow,
        sprite: SpriteKind::UpperArm,
        anchor: Anchor::Midpoint,
        mirrored: false,
    },
    ArmSegment {
        from: PoseLandmark::RightElbow,
        to: PoseLandmark::RightWrist,
        sprite: SpriteKind::Forearm,
        anchor: Anchor::Midpoint,
        mirrored: false,
    },
    ArmSegment {
        from: PoseLandmark::RightWrist,
        to: PoseLandmark::RightIndex,
        sprite: SpriteKind::Hand,
        anchor: Anchor::Endpoint,
        mirrored: false,
    },
    ArmSegment {
        from: PoseLandmark::LeftShoulder,
        to: PoseLandmark::LeftElbow,
        sprite: SpriteKind::UpperArm,
        anchor: Anchor::Midpoint,
        mirrored: true,
    },
    ArmSegment {
        from: PoseLandmark::LeftElbow,
        to: PoseLandmark::LeftWrist,
        sprite: SpriteKind::Forearm,
        anchor: Anchor::Midpoint,
        mirrored: true,
    },
    ArmSegment {
        from: PoseLandmark::LeftWrist,
        to: PoseLandmark::LeftIndex,
        sprite: SpriteKind::Hand,
        anchor: Anchor::Endpoint,
        mirrored: true,
    },
];

/// The three bitmap assets, loaded once at startup and reused for every frame.
/// A sprite that failed to load stays `None` and its segments are skipped at
/// draw time instead of producing garbage.
#[derive(Debug, Default)]
pub struct SpriteSet {
    upper_arm: Option<RgbaImage>,
    forearm: Option<RgbaImage>,
    hand: Option<RgbaImage>,
}

impl SpriteSet {
    pub fn load(assets_dir: &Path) -> Self {
        let mut set = SpriteSet::default();
        for kind in [SpriteKind::UpperArm, SpriteKind::Forearm, SpriteKind::Hand] {
            match load_sprite(&assets_dir.join(kind.file_name())) {
                Ok(image) => set.insert(kind, image),
                Err(err) => {
                    log::warn!("{err:#}, segments using it will be skipped");
                }
            }
        }
        set
    }

    pub fn insert(&mut self, kind: SpriteKind, image: RgbaImage) {
        match kind {
            SpriteKind::UpperArm => self.upper_arm = Some(image),
            SpriteKind::Forearm => self.forearm = Some(image),
            SpriteKind::Hand => self.hand = Some(image),
        }
    }

    pub fn get(&self, kind: SpriteKind) -> Option<&RgbaImage> {
        match kind {
            SpriteKind::UpperArm => self.upper_arm.as_ref(),
            SpriteKind::Forearm => self.forearm.as_ref(),
            SpriteKind::Hand => self.hand.as_ref(),
        }
    }
}

fn load_sprite(path: &Path) -> Result<RgbaImage, SpriteError> {
    let bytes = std::fs::read(path).map_err(|source| SpriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| SpriteError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Sprite dimensions in pixels for a landmark pair `span` pixels apart. The
/// height follows the span times the enlargement factor; the width follows the
/// sprite's own aspect ratio.
pub fn scaled_size(sprite: &RgbaImage, span: f32, kind: SpriteKind) -> (f32, f32) {
    let mut height = span * LIMB_ENLARGEMENT;
    if kind == SpriteKind::Hand {
        height *= HAND_ENLARGEMENT;
    }
    let width = height * sprite.width() as f32 / sprite.height() as f32;
    (width, height)
}

/// Blit `sprite` onto the RGBA `canvas`, centered on `center` (pixels),
/// rotated by `angle` and scaled to `target` (width, height). Mirroring flips
/// the sprite across its own vertical axis before rotation. Each destination
/// pixel is inverse-mapped into sprite space, sampled bilinearly, and
/// source-over blended, so the canvas outside the sprite's footprint is left
/// untouched.
pub fn draw_sprite(
    canvas: &mut [u8],
    width: u32,
    height: u32,
    sprite: &RgbaImage,
    center: (f32, f32),
    angle: f32,
    target: (f32, f32),
    mirrored: bool,
) {
    let (target_w, target_h) = target;
    if width == 0 || height == 0 || target_w <= 0.0 || target_h <= 0.0 {
        return;
    }

    let (sin, cos) = angle.sin_cos();
    let radius = 0.5 * (target_w * target_w + target_h * target_h).sqrt();
    let x_min = ((center.0 - radius).floor() as i64).max(0) as u32;
    let x_max = ((center.0 + radius).ceil() as i64).clamp(0, width as i64 - 1) as u32;
    let y_min = ((center.1 - radius).floor() as i64).max(0) as u32;
    let y_max = ((center.1 + radius).ceil() as i64).clamp(0, height as i64 - 1) as u32;
    if x_min > x_max || y_min > y_max {
        return;
    }

    let sprite_w = sprite.width() as f32;
    let sprite_h = sprite.height() as f32;

    for y in y_min..=y_max {
        let dy = y as f32 + 0.5 - center.1;
        for x in x_min..=x_max {
            let dx = x as f32 + 0.5 - center.0;
            // Inverse rotation back into the sprite's local space.
            let mut local_x = dx * cos + dy * sin;
            let local_y = -dx * sin + dy * cos;
            if mirrored {
                local_x = -local_x;
            }

            let u = (local_x / target_w + 0.5) * sprite_w;
            let v = (local_y / target_h + 0.5) * sprite_h;
            if u < 0.0 || v < 0.0 || u >= sprite_w || v >= sprite_h {
                continue;
            }

            let src = sample_rgba(sprite, u, v);
            if src[3] == 0.0 {
                continue;
            }
            blend_pixel(canvas, width, x, y, src);
        }
    }
}

fn sample_rgba(sprite: &RgbaImage, u: f32, v: f32) -> [f32; 4] {
    let x0 = (u - 0.5).floor();
    let y0 = (v - 0.5).floor();
    let fx = u - 0.5 - x0;
    let fy = v - 0.5 - y0;

    let (w, h) = (sprite.width() as i64, sprite.height() as i64);
    let fetch = |cx: f32, cy: f32| -> [f32; 4] {
        let ix = cx as i64;
        let iy = cy as i64;
        if ix < 0 || iy < 0 || ix >= w || iy >= h {
            // Transparent outside the sprite so edges fade instead of smearing.
            return [0.0; 4];
        }
        let px = sprite.get_pixel(ix as u32, iy as u32).0;
        [px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32]
    };

    let c00 = fetch(x0, y0);
    let c10 = fetch(x0 + 1.0, y0);
    let c01 = fetch(x0, y0 + 1.0);
    let c11 = fetch(x0 + 1.0, y0 + 1.0);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let mut out = [0.0; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = lerp(lerp(c00[i], c10[i], fx), lerp(c01[i], c11[i], fx), fy);
    }
    out
}

fn blend_pixel(canvas: &mut [u8], width: u32, x: u32, y: u32, src: [f32; 4]) {
    let idx = ((y * width + x) as usize) * 4;
    if idx + 3 >= canvas.len() {
        return;
    }
    let alpha = (src[3] / 255.0).clamp(0.0, 1.0);
    for channel in 0..3 {
        let dst = canvas[idx + channel] as f32;
        let blended = src[channel] * alpha + dst * (1.0 - alpha);
        canvas[idx + channel] = blended.round().clamp(0.0, 255.0) as u8;
    }
    canvas[idx + 3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::f32::consts::FRAC_PI_2;

    fn solid_sprite(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    fn blank_canvas(w: u32, h: u32) -> Vec<u8> {
        let mut canvas = vec![0u8; (w * h * 4) as usize];
        for px in canvas.chunks_exact_mut(4) {
            px[3] = 255;
        }
        canvas
    }

    fn pixel(canvas: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) as usize) * 4;
        canvas[idx..idx + 4].try_into().unwrap()
    }

    #[test]
    fn scaled_size_preserves_aspect_ratio() {
        let wide = solid_sprite(100, 50, [255, 0, 0, 255]);
        let (w, h) = scaled_size(&wide, 100.0, SpriteKind::Forearm);
        assert!((h - 130.0).abs() < 1e-3);
        assert!((w / h - 2.0).abs() < 1e-4);

        let (hw, hh) = scaled_size(&wide, 100.0, SpriteKind::Hand);
        assert!((hh - 260.0).abs() < 1e-3);
        assert!((hw / hh - 2.0).abs() < 1e-4);
    }

    #[test]
    fn unrotated_blit_covers_expected_box() {
        let (w, h) = (100u32, 100u32);
        let mut canvas = blank_canvas(w, h);
        let sprite = solid_sprite(10, 20, [200, 10, 10, 255]);

        draw_sprite(
            &mut canvas,
            w,
            h,
            &sprite,
            (50.0, 50.0),
            0.0,
            (20.0, 40.0),
            false,
        );

        assert_eq!(pixel(&canvas, w, 50, 50), [200, 10, 10, 255]);
        assert_eq!(pixel(&canvas, w, 45, 35), [200, 10, 10, 255]);
        // Just outside the 20x40 box around (50, 50).
        assert_eq!(pixel(&canvas, w, 50, 25), [0, 0, 0, 255]);
        assert_eq!(pixel(&canvas, w, 75, 50), [0, 0, 0, 255]);
    }

    #[test]
    fn quarter_turn_swaps_the_long_axis() {
        let (w, h) = (100u32, 100u32);
        let mut canvas = blank_canvas(w, h);
        let sprite = solid_sprite(10, 20, [10, 200, 10, 255]);

        draw_sprite(
            &mut canvas,
            w,
            h,
            &sprite,
            (50.0, 50.0),
            FRAC_PI_2,
            (20.0, 40.0),
            false,
        );

        // Long axis now horizontal: a point 15px left of center is covered,
        // 15px above is not.
        assert_eq!(pixel(&canvas, w, 35, 50), [10, 200, 10, 255]);
        assert_eq!(pixel(&canvas, w, 50, 35), [0, 0, 0, 255]);
    }

    #[test]
    fn mirroring_flips_the_sprite_horizontally() {
        let (w, h) = (60u32, 60u32);
        // Left half red, right half blue.
        let mut sprite = solid_sprite(20, 20, [0, 0, 255, 255]);
        for y in 0..20 {
            for x in 0..10 {
                sprite.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }

        let mut plain = blank_canvas(w, h);
        draw_sprite(
            &mut plain,
            w,
            h,
            &sprite,
            (30.0, 30.0),
            0.0,
            (20.0, 20.0),
            false,
        );
        let mut flipped = blank_canvas(w, h);
        draw_sprite(
            &mut flipped,
            w,
            h,
            &sprite,
            (30.0, 30.0),
            0.0,
            (20.0, 20.0),
            true,
        );

        assert_eq!(pixel(&plain, w, 25, 30), [255, 0, 0, 255]);
        assert_eq!(pixel(&plain, w, 35, 30), [0, 0, 255, 255]);
        assert_eq!(pixel(&flipped, w, 25, 30), [0, 0, 255, 255]);
        assert_eq!(pixel(&flipped, w, 35, 30), [255, 0, 0, 255]);
    }

    #[test]
    fn transparent_sprite_leaves_canvas_untouched() {
        let (w, h) = (40u32, 40u32);
        let mut canvas = blank_canvas(w, h);
        let before = canvas.clone();
        let sprite = solid_sprite(8, 8, [255, 255, 255, 0]);

        draw_sprite(
            &mut canvas,
            w,
            h,
            &sprite,
            (20.0, 20.0),
            0.3,
            (16.0, 16.0),
            false,
        );

        assert_eq!(canvas, before);
    }

    #[test]
    fn zero_sized_canvas_is_a_no_op() {
        let sprite = solid_sprite(8, 8, [255, 255, 255, 255]);
        let mut canvas: Vec<u8> = Vec::new();
        draw_sprite(&mut canvas, 0, 0, &sprite, (4.0, 4.0), 0.0, (8.0, 8.0), false);
        draw_sprite(&mut canvas, 0, 10, &sprite, (4.0, 4.0), 0.0, (8.0, 8.0), false);
        assert!(canvas.is_empty());
    }

    #[test]
    fn missing_sprite_file_is_an_error_not_a_panic() {
        let err = load_sprite(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, SpriteError::Io { .. }));
    }

    #[test]
    fn segment_table_covers_both_arms() {
        assert_eq!(ARM_SEGMENTS.len(), 6);
        assert_eq!(ARM_SEGMENTS.iter().filter(|s| s.mirrored).count(), 3);
        assert_eq!(
            ARM_SEGMENTS
                .iter()
                .filter(|s| s.anchor == Anchor::Endpoint)
                .count(),
            2
        );
        for segment in ARM_SEGMENTS {
            if segment.sprite == SpriteKind::Hand {
                assert_eq!(segment.anchor, Anchor::Endpoint);
            } else {
                assert_eq!(segment.anchor, Anchor::Midpoint);
            }
        }
    }
}
