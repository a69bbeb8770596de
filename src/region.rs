//! Region assembly - reads every (c, z, t) plane of resolved bounds
//!
//! Planes are fetched sequentially with T outermost and C innermost, so the
//! first failing tile of identical requests is always the same one. Results
//! are only returned once the whole region is assembled.

use crate::bounds::Bounds;
use crate::buffer::RawPixels;
use crate::error::Result;
use crate::io::RawDataSource;
use crate::tile::{fetch_plane_tile, PackedSink, SampleSink};
use crate::types::Coordinate;
use crate::utils::format_bytes;
use ndarray::{s, Array5};
use tracing::debug;

/// Position of `plane` relative to the start of `bounds`, as (t, z, c).
fn relative_plane(bounds: &Bounds, plane: &Coordinate) -> (usize, usize, usize) {
    let start = bounds.start();
    (
        (plane.t - start.t) as usize,
        (plane.z - start.z) as usize,
        (plane.c - start.c) as usize,
    )
}

/// Fetch all samples within `bounds`, indexed `[[t, z, c, y, x]]` from the bounds start.
pub async fn fetch_region_samples(
    source: &dyn RawDataSource,
    bounds: &Bounds,
    max_edge: usize,
) -> Result<Array5<f64>> {
    let [size_x, size_y, size_c, size_z, size_t] = bounds.dims();
    debug!(
        start = %bounds.start(),
        size = %bounds.size(),
        planes = bounds.plane_count(),
        "Fetching region samples"
    );

    let mut region = Array5::<f64>::zeros((size_t, size_z, size_c, size_y, size_x));
    let mut tiles = 0;
    for plane in bounds.planes() {
        let (t, z, c) = relative_plane(bounds, &plane);
        let mut sink = SampleSink::new(region.slice_mut(s![t, z, c, .., ..]));
        tiles += fetch_plane_tile(source, plane, size_x, size_y, max_edge, &mut sink).await?;
    }

    debug!(
        tiles,
        size = %format_bytes(region.len() * std::mem::size_of::<f64>()),
        "Region samples assembled"
    );
    Ok(region)
}

/// Fetch all samples within `bounds` as packed bytes, `bpp` bytes per sample.
pub async fn fetch_region_raw(
    source: &dyn RawDataSource,
    bounds: &Bounds,
    bpp: usize,
    max_edge: usize,
) -> Result<RawPixels> {
    let [size_x, size_y, size_c, size_z, size_t] = bounds.dims();
    debug!(
        start = %bounds.start(),
        size = %bounds.size(),
        planes = bounds.plane_count(),
        bpp,
        "Fetching raw region"
    );

    let mut region = RawPixels::zeroed([size_t, size_z, size_c, size_y, size_x], bpp)?;
    let mut tiles = 0;
    for plane in bounds.planes() {
        let (t, z, c) = relative_plane(bounds, &plane);
        let mut sink = PackedSink::new(region.plane_mut(t, z, c), size_x, bpp)?;
        tiles += fetch_plane_tile(source, plane, size_x, size_y, max_edge, &mut sink).await?;
    }

    debug!(
        tiles,
        size = %format_bytes(region.len()),
        "Raw region assembled"
    );
    Ok(region)
}
