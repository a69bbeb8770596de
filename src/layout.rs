//! Tile layout - decomposes a planar extent into bounded sub-tiles

use crate::error::{PixelError, Result};

/// Largest sub-tile edge requested from a raw data source, in pixels
pub const MAX_TILE_EDGE: usize = 5000;

/// One sub-tile of a [`TileGrid`], relative to the grid origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTile {
    /// Position in request order
    pub index: usize,
    /// X offset from the grid origin
    pub rel_x: usize,
    /// Y offset from the grid origin
    pub rel_y: usize,
    pub width: usize,
    pub height: usize,
}

impl SubTile {
    pub fn sample_count(&self) -> usize {
        self.width * self.height
    }
}

/// Grid of sub-tiles covering a `width x height` rectangle
///
/// Tiles are at most `max_edge` pixels along either axis; the last column and
/// row are trimmed to the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    max_edge: usize,
}

impl TileGrid {
    /// Create a new tile grid
    pub fn new(width: usize, height: usize, max_edge: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PixelError::InvalidDimensions(format!(
                "Tile extent must be non-empty, got {}x{}",
                width, height
            )));
        }
        if max_edge == 0 {
            return Err(PixelError::Configuration(
                "Maximum tile edge must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            max_edge,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_edge(&self) -> usize {
        self.max_edge
    }

    /// Number of tiles along (X, Y)
    pub fn tile_count(&self) -> (usize, usize) {
        (
            self.width.div_ceil(self.max_edge),
            self.height.div_ceil(self.max_edge),
        )
    }

    /// Total number of tiles
    pub fn total_tiles(&self) -> usize {
        let (cols, rows) = self.tile_count();
        cols * rows
    }

    /// The tile at grid column `col` and row `row`
    pub fn tile_at(&self, col: usize, row: usize) -> SubTile {
        let (_, rows) = self.tile_count();
        let rel_x = col * self.max_edge;
        let rel_y = row * self.max_edge;
        SubTile {
            index: col * rows + row,
            rel_x,
            rel_y,
            width: self.max_edge.min(self.width - rel_x),
            height: self.max_edge.min(self.height - rel_y),
        }
    }

    /// Tiles in request order: X columns outermost, Y rows innermost.
    pub fn tiles(&self) -> impl Iterator<Item = SubTile> + '_ {
        let (cols, rows) = self.tile_count();
        (0..cols).flat_map(move |col| (0..rows).map(move |row| self.tile_at(col, row)))
    }
}
