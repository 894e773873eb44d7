//! Hysteresis thresholding of the water index into land, marginal and
//! water levels.
//!
//! The classifier is an interpolated lookup table: output levels are
//! linearly interpolated between strictly increasing breakpoints. Steps
//! are encoded as a pair of breakpoints `x` and `x⁺`, where `x⁺` is the
//! next representable `f32` above `x`. No `f32` lies strictly between
//! the pair, so interpolation never produces an intermediate level and
//! the table behaves as an exact step function on index values:
//!
//! ```text
//! tolerance = 0:  (0, L) (T, L) (T⁺, W) (1, W)
//! tolerance > 0:  (0, L) (T-δ, L) ((T-δ)⁺, M) (T+δ, M) ((T+δ)⁺, W) (1, W)
//! ```
//!
//! Band ends outside the index range are clamped to `[0, 1⁻]`, so the
//! table always closes with `(1, W)`. Inputs below the first breakpoint
//! clamp to land, inputs above the last clamp to water, and NaN maps to
//! land.

use crate::config::ColorCoding;
use crate::types::{ConfigError, IndexImage};

/// One lookup table entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Index value.
    pub input: f32,
    /// Output level at `input`.
    pub output: f32,
}

/// Interpolated lookup table mapping index values to class levels.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    entries: Vec<Breakpoint>,
}

impl LevelTable {
    /// Build the table for `threshold` +- `tolerance`.
    ///
    /// A zero tolerance yields a two-level table (no marginal band). The
    /// band is clamped to the index range: `T - δ` below 0 merges into
    /// the first breakpoint and `T + δ` at or above 1 ends just below 1,
    /// so that 1 itself always maps to water.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ToleranceBand`] if either end of the band is
    /// not finite.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(threshold: f64, tolerance: f64, colors: ColorCoding) -> Result<Self, ConfigError> {
        let land = f32::from(colors.land);
        let marginal = f32::from(colors.marginal);
        let water = f32::from(colors.water);
        let low = (threshold - tolerance) as f32;
        let high = (threshold + tolerance) as f32;
        if !low.is_finite() || !high.is_finite() || high < low {
            return Err(ConfigError::ToleranceBand {
                low: threshold - tolerance,
                high: threshold + tolerance,
            });
        }
        let top = 1.0f32.next_down();
        let low = low.clamp(0.0, top);
        let high = high.clamp(low, top);

        let mut entries = Vec::with_capacity(6);
        push_merged(&mut entries, 0.0, land);
        push_merged(&mut entries, low, land);
        if high > low {
            push_merged(&mut entries, low.next_up(), marginal);
            push_merged(&mut entries, high, marginal);
            push_merged(&mut entries, high.next_up(), water);
        } else {
            push_merged(&mut entries, low.next_up(), water);
        }
        push_merged(&mut entries, 1.0, water);
        Ok(Self { entries })
    }

    /// The breakpoints in increasing input order.
    #[must_use]
    pub fn entries(&self) -> &[Breakpoint] {
        &self.entries
    }

    /// Map one index value to its output level.
    #[must_use]
    pub fn level(&self, v: f32) -> f32 {
        let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) else {
            return v;
        };
        if v.is_nan() || v <= first.input {
            return first.output;
        }
        if v >= last.input {
            return last.output;
        }
        // First entry whose input is >= v; v > first.input so idx >= 1.
        let idx = self.entries.partition_point(|e| e.input < v);
        let hi = self.entries[idx];
        let lo = self.entries[idx - 1];
        let t = (v - lo.input) / (hi.input - lo.input);
        t.mul_add(hi.output - lo.output, lo.output)
    }

    /// Apply the table to every pixel of a tile.
    #[must_use = "returns the classified tile"]
    pub fn apply(&self, tile: &IndexImage) -> IndexImage {
        IndexImage::from_fn(tile.width(), tile.height(), |x, y| {
            image::Luma([self.level(tile.get_pixel(x, y).0[0])])
        })
    }
}

/// Append a breakpoint, dropping it when it repeats the previous entry
/// (same input and same output), e.g. `T - δ = 0` or `(T+δ)⁺ = 1`.
fn push_merged(entries: &mut Vec<Breakpoint>, input: f32, output: f32) {
    let point = Breakpoint { input, output };
    if entries.last() != Some(&point) {
        entries.push(point);
    }
}
