//! Roberts cross edge detection.
//!
//! Produces the gradient magnitude of a tile using the 2x2 Roberts
//! operator:
//!
//! ```text
//! gx = p(x, y) - p(x+1, y+1)
//! gy = p(x+1, y) - p(x, y+1)
//! |g| = sqrt(gx² + gy²)
//! ```
//!
//! Reads past the right and bottom borders are clamped to the last
//! column/row. On a classified raster the output is non-zero exactly on
//! class boundaries, which makes it the terminal stage of edge mode.

use crate::types::IndexImage;

/// Pixels of context the operator reads beyond the output pixel.
pub const CONTEXT: u32 = 1;

/// Compute the Roberts cross gradient magnitude.
#[must_use = "returns the edge map"]
pub fn roberts(tile: &IndexImage) -> IndexImage {
    let (w, h) = tile.dimensions();
    if w == 0 || h == 0 {
        return tile.clone();
    }
    let at = |x: u32, y: u32| tile.get_pixel(x.min(w - 1), y.min(h - 1)).0[0];
    IndexImage::from_fn(w, h, |x, y| {
        let gx = at(x, y) - at(x + 1, y + 1);
        let gy = at(x + 1, y) - at(x, y + 1);
        image::Luma([gx.hypot(gy)])
    })
}
