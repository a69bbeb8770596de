//! Tile fetching - reads one plane rectangle through a raw data source
//!
//! A requested `width x height` rectangle is split by [`TileGrid`] into
//! sub-tiles no larger than the configured edge. Sub-tiles are requested one
//! at a time, in grid order, and each is written into the destination through
//! a [`TileSink`]. The first failing sub-tile aborts the whole plane.

use crate::error::{PixelError, Result};
use crate::io::{PlaneSelector, PlaneTile, RawDataSource};
use crate::layout::{SubTile, TileGrid};
use crate::types::Coordinate;
use ndarray::{Array2, ArrayViewMut2};
use tracing::{trace, warn};

/// Destination of decoded or raw sub-tiles
pub trait TileSink {
    /// Copy `tile`, fetched for `sub`, into the destination
    fn write_tile(&mut self, tile: &PlaneTile, sub: &SubTile) -> Result<()>;
}

fn check_tile(tile: &PlaneTile, sub: &SubTile, bpp: usize) -> Result<()> {
    if tile.width() != sub.width || tile.height() != sub.height {
        return Err(PixelError::InvalidTile(format!(
            "Expected {}x{} tile, got {}x{}",
            sub.width,
            sub.height,
            tile.width(),
            tile.height()
        )));
    }
    let needed = sub.sample_count() * bpp;
    if tile.as_bytes().len() < needed {
        return Err(PixelError::InvalidTile(format!(
            "Tile payload holds {} bytes, {} required",
            tile.as_bytes().len(),
            needed
        )));
    }
    Ok(())
}

/// Writes decoded samples into a `(Y, X)` plane
pub struct SampleSink<'a> {
    plane: ArrayViewMut2<'a, f64>,
}

impl<'a> SampleSink<'a> {
    pub fn new(plane: ArrayViewMut2<'a, f64>) -> Self {
        Self { plane }
    }
}

impl TileSink for SampleSink<'_> {
    fn write_tile(&mut self, tile: &PlaneTile, sub: &SubTile) -> Result<()> {
        check_tile(tile, sub, tile.pixel_type().bytes_per_pixel())?;
        let (rows, cols) = self.plane.dim();
        if sub.rel_y + sub.height > rows || sub.rel_x + sub.width > cols {
            return Err(PixelError::OutOfBounds(format!(
                "Sub-tile at ({}, {}) exceeds {}x{} plane",
                sub.rel_x, sub.rel_y, cols, rows
            )));
        }
        for y in 0..sub.height {
            for x in 0..sub.width {
                self.plane[[sub.rel_y + y, sub.rel_x + x]] = tile.pixel_value(x, y);
            }
        }
        Ok(())
    }
}

/// Writes raw bytes into a packed plane, `bpp` bytes per sample
pub struct PackedSink<'a> {
    data: &'a mut [u8],
    width: usize,
    bpp: usize,
}

impl<'a> PackedSink<'a> {
    /// `data` holds a packed plane `width` samples wide
    pub fn new(data: &'a mut [u8], width: usize, bpp: usize) -> Result<Self> {
        if bpp == 0 {
            return Err(PixelError::InvalidBytesPerPixel(bpp));
        }
        Ok(Self { data, width, bpp })
    }
}

impl TileSink for PackedSink<'_> {
    fn write_tile(&mut self, tile: &PlaneTile, sub: &SubTile) -> Result<()> {
        check_tile(tile, sub, self.bpp)?;
        let src = tile.as_bytes();
        let row_bytes = sub.width * self.bpp;
        for y in 0..sub.height {
            let dst_start = ((sub.rel_y + y) * self.width + sub.rel_x) * self.bpp;
            let src_start = y * row_bytes;
            let dst = self
                .data
                .get_mut(dst_start..dst_start + row_bytes)
                .ok_or_else(|| {
                    PixelError::OutOfBounds(format!(
                        "Sub-tile row {} at ({}, {}) exceeds packed plane",
                        y, sub.rel_x, sub.rel_y
                    ))
                })?;
            dst.copy_from_slice(&src[src_start..src_start + row_bytes]);
        }
        Ok(())
    }
}

/// Split a plane position into its selector and non-negative (x, y) origin.
pub fn plane_origin(position: &Coordinate) -> Result<(PlaneSelector, usize, usize)> {
    let index = |value: i64, name: &str| {
        usize::try_from(value).map_err(|_| {
            PixelError::OutOfBounds(format!("Negative {} in position {}", name, position))
        })
    };
    let plane = PlaneSelector::new(
        index(position.z, "z")?,
        index(position.t, "t")?,
        index(position.c, "c")?,
    );
    Ok((plane, index(position.x, "x")?, index(position.y, "y")?))
}

/// Fetch the `width x height` rectangle at `position` into `sink`.
///
/// Returns the number of sub-tiles requested.
pub async fn fetch_plane_tile<S>(
    source: &dyn RawDataSource,
    position: Coordinate,
    width: usize,
    height: usize,
    max_edge: usize,
    sink: &mut S,
) -> Result<usize>
where
    S: TileSink + ?Sized,
{
    let (plane, origin_x, origin_y) = plane_origin(&position)?;
    let grid = TileGrid::new(width, height, max_edge)?;

    for sub in grid.tiles() {
        let x = origin_x + sub.rel_x;
        let y = origin_y + sub.rel_y;
        trace!(%plane, x, y, width = sub.width, height = sub.height, "Requesting sub-tile {}", sub.index);

        let tile = source
            .get_tile(plane, x, y, sub.width, sub.height)
            .await
            .map_err(|source| {
                warn!(%plane, x, y, tile = sub.index, "Sub-tile fetch failed: {}", source);
                PixelError::Access {
                    plane,
                    x,
                    y,
                    width: sub.width,
                    height: sub.height,
                    source,
                }
            })?;
        sink.write_tile(&tile, &sub)?;
    }

    Ok(grid.total_tiles())
}

/// Fetch a plane rectangle as decoded samples, indexed `[[y, x]]`.
pub async fn fetch_plane_samples(
    source: &dyn RawDataSource,
    position: Coordinate,
    width: usize,
    height: usize,
    max_edge: usize,
) -> Result<Array2<f64>> {
    let mut plane = Array2::<f64>::zeros((height, width));
    let mut sink = SampleSink::new(plane.view_mut());
    fetch_plane_tile(source, position, width, height, max_edge, &mut sink).await?;
    Ok(plane)
}

/// Fetch a plane rectangle as packed bytes, `bpp` bytes per sample.
pub async fn fetch_plane_bytes(
    source: &dyn RawDataSource,
    position: Coordinate,
    width: usize,
    height: usize,
    bpp: usize,
    max_edge: usize,
) -> Result<Vec<u8>> {
    let len = [width, height]
        .iter()
        .try_fold(bpp, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| {
            PixelError::InvalidDimensions(format!(
                "Tile {}x{} with {} bytes per pixel overflows",
                width, height, bpp
            ))
        })?;
    let mut data = vec![0u8; len];
    let mut sink = PackedSink::new(&mut data, width, bpp)?;
    fetch_plane_tile(source, position, width, height, max_edge, &mut sink).await?;
    Ok(data)
}
