//! Tile grid covering a raster for the full-extent production pass.

use log::debug;

use crate::types::{Dimensions, PixelRect};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Row-major grid of square tiles over a raster. Edge tiles are cropped
/// to the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    dims: Dimensions,
    tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
}

impl TileGrid {
    /// Build a grid over `dims`. A zero `tile_size` is treated as 1.
    #[must_use]
    pub fn new(dims: Dimensions, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let tiles_x = dims.width.div_ceil(tile_size);
        let tiles_y = dims.height.div_ceil(tile_size);
        debug!(
            "tile grid: {}x{} raster, tile_size={tile_size} -> {tiles_x}x{tiles_y} tiles",
            dims.width, dims.height
        );
        Self {
            dims,
            tile_size,
            tiles_x,
            tiles_y,
        }
    }

    /// Number of tiles in the grid.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize
    }

    /// Returns `true` if the raster is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rectangle of tile `index` in row-major order, or `None` past the end.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn tile(&self, index: usize) -> Option<PixelRect> {
        if index >= self.len() {
            return None;
        }
        // index < tiles_x * tiles_y, both u32.
        let col = (index % self.tiles_x as usize) as u32;
        let row = (index / self.tiles_x as usize) as u32;
        let x = col * self.tile_size;
        let y = row * self.tile_size;
        Some(PixelRect::new(
            x,
            y,
            self.tile_size.min(self.dims.width - x),
            self.tile_size.min(self.dims.height - y),
        ))
    }

    /// Iterate over every tile rectangle.
    pub fn iter(&self) -> impl Iterator<Item = PixelRect> + '_ {
        (0..self.len()).filter_map(|i| self.tile(i))
    }
}
