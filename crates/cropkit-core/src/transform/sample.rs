//! Bilinear sampling restricted to a source sub-rectangle.
//!
//! The compositor maps every output pixel back into the source (inverse
//! mapping) and samples there. Samples are clamped to the crop rectangle so
//! pixels outside the selection never bleed into the edges.

use image::RgbaImage;

use crate::crop::PixelRect;

/// Sample `image` at continuous pixel coordinates `(x, y)`.
///
/// Integer coordinates address pixel centers, so `(3.0, 4.0)` returns pixel
/// `(3, 4)` exactly. Coordinates outside `bounds` are clamped to its edge.
pub(crate) fn sample_bilinear(image: &RgbaImage, bounds: &PixelRect, x: f64, y: f64) -> [u8; 4] {
    let max_x = bounds.x + bounds.width - 1;
    let max_y = bounds.y + bounds.height - 1;

    let x = x.clamp(bounds.x as f64, max_x as f64);
    let y = y.clamp(bounds.y as f64, max_y as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut result = [0u8; 4];
    for (i, out) in result.iter_mut().enumerate() {
        let v = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
        *out = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}
