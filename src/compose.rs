use hairfit_align::{FaceGeometry, OverlayTransform, Point};
use image::{Rgba, RgbaImage};

const EYES_MARKER: Rgba<u8> = Rgba([0, 255, 180, 230]);
const ANCHOR_MARKER: Rgba<u8> = Rgba([255, 200, 0, 230]);

/// Draw `overlay` onto `frame` as the transform describes: centered on the
/// anchor, scaled to `width_px` with its aspect ratio kept, rotated about its
/// own center. A hidden transform leaves the frame untouched.
pub fn composite(frame: &mut RgbaImage, overlay: &RgbaImage, transform: &OverlayTransform) {
    let Some(placement) = transform.placement() else {
        return;
    };
    let (ow, oh) = overlay.dimensions();
    if ow == 0 || oh == 0 || placement.width_px <= 0.0 {
        return;
    }

    let scale = placement.width_px / ow as f32;
    let half_w = ow as f32 * scale / 2.0;
    let half_h = oh as f32 * scale / 2.0;
    let (sin, cos) = placement.rotation_degrees.to_radians().sin_cos();
    let center = placement.center();

    // Axis-aligned bounds of the rotated overlay, clamped to the frame
    let extent_x = (half_w * cos).abs() + (half_h * sin).abs();
    let extent_y = (half_w * sin).abs() + (half_h * cos).abs();
    let (fw, fh) = frame.dimensions();
    let x0 = (center.x - extent_x).floor().max(0.0) as u32;
    let y0 = (center.y - extent_y).floor().max(0.0) as u32;
    let x1 = ((center.x + extent_x).ceil().max(0.0) as u32).min(fw);
    let y1 = ((center.y + extent_y).ceil().max(0.0) as u32).min(fh);

    for out_y in y0..y1 {
        for out_x in x0..x1 {
            // Invert rotate-then-translate to find the overlay texel under
            // this pixel's center
            let dx = out_x as f32 + 0.5 - center.x;
            let dy = out_y as f32 + 0.5 - center.y;
            let ux = dx * cos + dy * sin;
            let uy = -dx * sin + dy * cos;
            let src_x = ux / scale + ow as f32 / 2.0;
            let src_y = uy / scale + oh as f32 / 2.0;

            if src_x < 0.0 || src_x >= ow as f32 || src_y < 0.0 || src_y >= oh as f32 {
                continue;
            }

            let texel = sample_bilinear(overlay, src_x - 0.5, src_y - 0.5);
            blend(frame.get_pixel_mut(out_x, out_y), texel);
        }
    }
}

/// Mark the eyes midpoint and the chosen anchor, as filled dots.
pub fn draw_markers(frame: &mut RgbaImage, geometry: &FaceGeometry) {
    draw_dot(frame, geometry.eyes_midpoint, 3.0, EYES_MARKER);
    draw_dot(frame, geometry.anchor, 4.0, ANCHOR_MARKER);
}

fn draw_dot(frame: &mut RgbaImage, center: Point, radius: f32, color: Rgba<u8>) {
    let (fw, fh) = frame.dimensions();
    let x0 = (center.x - radius).floor().max(0.0) as u32;
    let y0 = (center.y - radius).floor().max(0.0) as u32;
    let x1 = ((center.x + radius).ceil().max(0.0) as u32).min(fw);
    let y1 = ((center.y + radius).ceil().max(0.0) as u32).min(fh);
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= radius * radius {
                blend(frame.get_pixel_mut(x, y), [
                    color[0] as f32,
                    color[1] as f32,
                    color[2] as f32,
                    color[3] as f32,
                ]);
            }
        }
    }
}

/// Bilinear RGBA sample with edge clamping. Coordinates are texel centers.
fn sample_bilinear(img: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let (w, h) = img.dimensions();
    let x = x.clamp(0.0, (w - 1) as f32);
    let y = y.clamp(0.0, (h - 1) as f32);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = img.get_pixel(x0, y0);
    let p10 = img.get_pixel(x1, y0);
    let p01 = img.get_pixel(x0, y1);
    let p11 = img.get_pixel(x1, y1);

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    let mut out = [0.0f32; 4];
    for (c, v) in out.iter_mut().enumerate() {
        *v = p00[c] as f32 * w00 + p10[c] as f32 * w10 + p01[c] as f32 * w01 + p11[c] as f32 * w11;
    }
    out
}

/// Source-over blend of a straight-alpha texel onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: [f32; 4]) {
    let a = src[3] / 255.0;
    if a <= 0.0 {
        return;
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = a + dst_a * (1.0 - a);
    for c in 0..3 {
        let mixed = (src[c] * a + dst[c] as f32 * dst_a * (1.0 - a)) / out_a;
        dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hairfit_align::{AnchorMode, Placement};

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn shown(cx: f32, cy: f32, width: f32, degrees: f32) -> OverlayTransform {
        OverlayTransform::shown(Placement {
            center_x: cx,
            center_y: cy,
            width_px: width,
            rotation_degrees: degrees,
        })
    }

    #[test]
    fn hidden_transform_leaves_frame_alone() {
        let mut frame = RgbaImage::from_pixel(8, 8, BLACK);
        let overlay = RgbaImage::from_pixel(2, 2, RED);
        composite(&mut frame, &overlay, &OverlayTransform::hidden());
        assert!(frame.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn overlay_is_scaled_around_center() {
        let mut frame = RgbaImage::from_pixel(10, 10, BLACK);
        let overlay = RgbaImage::from_pixel(2, 2, RED);
        composite(&mut frame, &overlay, &shown(5.0, 5.0, 4.0, 0.0));

        assert_eq!(*frame.get_pixel(5, 5), RED);
        assert_eq!(*frame.get_pixel(3, 3), RED);
        assert_eq!(*frame.get_pixel(6, 6), RED);
        assert_eq!(*frame.get_pixel(2, 5), BLACK);
        assert_eq!(*frame.get_pixel(7, 5), BLACK);
        assert_eq!(*frame.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn rotation_turns_wide_overlay_tall() {
        let mut frame = RgbaImage::from_pixel(20, 20, BLACK);
        // 4x2 overlay drawn 8x4, then turned a quarter
        let overlay = RgbaImage::from_pixel(4, 2, RED);
        composite(&mut frame, &overlay, &shown(10.0, 10.0, 8.0, 90.0));

        assert_eq!(*frame.get_pixel(10, 13), RED);
        assert_eq!(*frame.get_pixel(10, 6), RED);
        assert_eq!(*frame.get_pixel(13, 10), BLACK);
        assert_eq!(*frame.get_pixel(6, 10), BLACK);
    }

    #[test]
    fn transparent_texels_keep_frame() {
        let mut frame = RgbaImage::from_pixel(6, 6, BLACK);
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        composite(&mut frame, &overlay, &shown(3.0, 3.0, 6.0, 0.0));
        assert!(frame.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn overlay_outside_frame_is_clipped() {
        let mut frame = RgbaImage::from_pixel(6, 6, BLACK);
        let overlay = RgbaImage::from_pixel(2, 2, RED);
        composite(&mut frame, &overlay, &shown(-50.0, 120.0, 4.0, 30.0));
        assert!(frame.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn markers_land_on_geometry() {
        let mut frame = RgbaImage::from_pixel(40, 40, BLACK);
        let geometry = FaceGeometry {
            anchor_mode: AnchorMode::Nose,
            left_eye: Point::new(5.0, 10.0),
            right_eye: Point::new(15.0, 10.0),
            eyes_midpoint: Point::new(10.0, 10.0),
            roll_degrees: 0.0,
            face_width: 10.0,
            anchor: Point::new(30.0, 30.0),
        };
        draw_markers(&mut frame, &geometry);
        assert_ne!(*frame.get_pixel(10, 10), BLACK);
        assert_ne!(*frame.get_pixel(30, 30), BLACK);
        assert_eq!(*frame.get_pixel(20, 20), BLACK);
    }
}
