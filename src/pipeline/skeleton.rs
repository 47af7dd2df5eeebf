use crate::pose::{BodySide, POSE_CONNECTIONS, Pose, VISIBILITY_THRESHOLD};

const CONNECTION_COLOR: [u8; 4] = [255, 255, 255, 255];
const LEFT_POINT_COLOR: [u8; 4] = [255, 138, 0, 255];
const RIGHT_POINT_COLOR: [u8; 4] = [0, 217, 231, 255];
const NEUTRAL_POINT_COLOR: [u8; 4] = [255, 255, 255, 255];

const LINE_THICKNESS: i32 = 3;
const POINT_RADIUS: i32 = 5;

/// Draw the standard skeletal connections plus every landmark point over the
/// frame buffer, color-coded by body side. Landmarks below the visibility
/// threshold are left out, matching the sprite-drawing rule.
pub fn draw_debug_overlay(buffer: &mut [u8], width: u32, height: u32, pose: &Pose) {
    for &(a, b) in POSE_CONNECTIONS {
        let pa = pose.get(a);
        let pb = pose.get(b);
        if !pa.is_visible(VISIBILITY_THRESHOLD) || !pb.is_visible(VISIBILITY_THRESHOLD) {
            continue;
        }
        draw_line(
            buffer,
            width,
            height,
            pa.to_pixel(width, height),
            pb.to_pixel(width, height),
            CONNECTION_COLOR,
            LINE_THICKNESS,
        );
    }

    for (index, landmark) in pose.landmarks.iter().enumerate() {
        if !landmark.is_visible(VISIBILITY_THRESHOLD) {
            continue;
        }
        let color = match crate::pose::PoseLandmark::side_of(index) {
            BodySide::Left => LEFT_POINT_COLOR,
            BodySide::Right => RIGHT_POINT_COLOR,
            BodySide::Neutral => NEUTRAL_POINT_COLOR,
        };
        let (px, py) = landmark.to_pixel(width, height);
        draw_circle(
            buffer,
            width,
            height,
            (px as i32, py as i32),
            POINT_RADIUS,
            color,
        );
    }
}

fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    p0: (f32, f32),
    p1: (f32, f32),
    color: [u8; 4],
    thickness: i32,
) {
    let (mut x0, mut y0) = (p0.0 as i32, p0.1 as i32);
    let (x1, y1) = (p1.0 as i32, p1.1 as i32);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        put_pixel_safe(buffer, width, height, x0, y0, color);
        if radius > 0 {
            for ox in -radius..=radius {
                for oy in -radius..=radius {
                    if ox == 0 && oy == 0 {
                        continue;
                    }
                    if ox.abs() + oy.abs() <= radius {
                        put_pixel_safe(buffer, width, height, x0 + ox, y0 + oy, color);
                    }
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= width || uy >= height {
        return;
    }
    let idx = ((uy * width + ux) as usize) * 4;
    if idx + 3 < buffer.len() {
        buffer[idx..idx + 4].copy_from_slice(&color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, PoseLandmark};

    fn blank(w: u32, h: u32) -> Vec<u8> {
        vec![0u8; (w * h * 4) as usize]
    }

    #[test]
    fn invisible_pose_draws_nothing() {
        let mut buffer = blank(64, 64);
        let before = buffer.clone();
        draw_debug_overlay(&mut buffer, 64, 64, &Pose::default());
        assert_eq!(buffer, before);
    }

    #[test]
    fn visible_landmark_gets_a_point() {
        let mut buffer = blank(64, 64);
        let mut pose = Pose::default();
        pose.landmarks[PoseLandmark::LeftShoulder as usize] = Landmark::new(0.5, 0.5, 0.9);
        draw_debug_overlay(&mut buffer, 64, 64, &pose);

        let idx = ((32 * 64 + 32) as usize) * 4;
        assert_eq!(&buffer[idx..idx + 4], &LEFT_POINT_COLOR);
    }

    #[test]
    fn connection_needs_both_endpoints_visible() {
        let mut buffer = blank(64, 64);
        let mut pose = Pose::default();
        // Shoulder visible, elbow hidden: no connecting line in between.
        pose.landmarks[PoseLandmark::LeftShoulder as usize] = Landmark::new(0.1, 0.5, 0.9);
        pose.landmarks[PoseLandmark::LeftElbow as usize] = Landmark::new(0.9, 0.5, 0.1);
        draw_debug_overlay(&mut buffer, 64, 64, &pose);

        let midway = ((32 * 64 + 32) as usize) * 4;
        assert_eq!(&buffer[midway..midway + 4], &[0, 0, 0, 0]);
    }
}
