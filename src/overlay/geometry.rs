use std::f32::consts::FRAC_PI_2;

use crate::pose::Landmark;

/// Where and how to draw a sprite for one landmark pair: the anchor point in
/// normalized coordinates and the rotation that aligns the sprite's long axis
/// with the `p1 -> p2` vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Euclidean pixel distance between two normalized points, after scaling each
/// axis by the corresponding frame dimension.
pub fn distance(p1: &Landmark, p2: &Landmark, width: u32, height: u32) -> f32 {
    let dx = (p1.x - p2.x) * width as f32;
    let dy = (p1.y - p2.y) * height as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Midpoint of the pair in normalized coordinates, plus the angle (radians)
/// that rotates a sprite drawn "pointing up" onto the `p1 -> p2` direction.
/// `atan2` measures from the "pointing right" baseline, hence the `- PI/2`.
pub fn rotation(p1: &Landmark, p2: &Landmark) -> Placement {
    Placement {
        x: (p1.x + p2.x) / 2.0,
        y: (p1.y + p2.y) / 2.0,
        angle: (p2.y - p1.y).atan2(p2.x - p1.x) - FRAC_PI_2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 1.0)
    }

    #[test]
    fn distance_is_symmetric() {
        let a = lm(0.1, 0.8);
        let b = lm(0.7, 0.2);
        assert_eq!(distance(&a, &b, 640, 480), distance(&b, &a, 640, 480));
    }

    #[test]
    fn distance_of_point_to_itself_is_zero() {
        let p = lm(0.33, 0.66);
        assert_eq!(distance(&p, &p, 1920, 1080), 0.0);
    }

    #[test]
    fn distance_scales_each_axis_independently() {
        // Same normalized offset on both axes, but a non-square frame.
        let a = lm(0.0, 0.0);
        let b = lm(0.1, 0.1);
        let d = distance(&a, &b, 1000, 500);
        let expected = (100.0f32 * 100.0 + 50.0 * 50.0).sqrt();
        assert!((d - expected).abs() < 1e-3);
    }

    #[test]
    fn rotation_aligns_up_vector_with_segment() {
        // Rotating the unit "up" vector (0, 1) by the returned angle must
        // point in the same direction as p2 - p1.
        let cases = [
            (lm(0.2, 0.2), lm(0.8, 0.8)),
            (lm(0.5, 0.9), lm(0.5, 0.1)),
            (lm(0.9, 0.4), lm(0.1, 0.6)),
        ];
        for (p1, p2) in cases {
            let placement = rotation(&p1, &p2);
            let (sin, cos) = placement.angle.sin_cos();
            // Counter-clockwise rotation applied to (0, 1).
            let rotated = (-sin, cos);
            let seg = (p2.x - p1.x, p2.y - p1.y);
            let len = (seg.0 * seg.0 + seg.1 * seg.1).sqrt();
            let dir = (seg.0 / len, seg.1 / len);
            assert!((rotated.0 - dir.0).abs() < 1e-5, "{rotated:?} vs {dir:?}");
            assert!((rotated.1 - dir.1).abs() < 1e-5, "{rotated:?} vs {dir:?}");
        }
    }

    #[test]
    fn horizontal_segment_end_to_end() {
        // Worked example: 0.2 of a 1000px-wide frame is 200px, the midpoint
        // sits halfway, and a horizontal segment is a quarter turn from the
        // vertical sprite baseline.
        let p1 = lm(0.4, 0.5);
        let p2 = lm(0.6, 0.5);
        assert!((distance(&p1, &p2, 1000, 500) - 200.0).abs() < 1e-3);
        let placement = rotation(&p1, &p2);
        assert!((placement.x - 0.5).abs() < 1e-6);
        assert!((placement.y - 0.5).abs() < 1e-6);
        assert!((placement.angle - (-PI / 2.0)).abs() < 1e-6);
    }
}
