//! Pixelset - region retrieval for remote 5D pixel sets
//!
//! Fetches rectangular sub-regions of a large, remotely stored pixel set with
//! axes X, Y, C (channel), Z and T (time) and assembles them into dense
//! in-memory buffers, either as decoded `f64` samples or as packed raw bytes.
//!
//! # Features
//!
//! - Permissive bounds resolution: out-of-range requests are clamped, never rejected
//! - Planes are read in sub-tiles no larger than a configurable edge (5000 px by default)
//! - Deterministic (T, Z, C) plane order and grid-ordered sub-tile requests
//! - Scoped raw data handles, shared across calls by holding a [`RawDataGuard`]
//! - An in-memory store for tests and demos (implement [`PixelClient`] for remote stores)
//!
//! # Example
//!
//! ```rust,ignore
//! use pixelset::{PixelSet, Region};
//!
//! # async fn example(client: &dyn pixelset::PixelClient, pixels: PixelSet) -> pixelset::Result<()> {
//! // Channels 0-1 of the first time point, all of X/Y/Z
//! let region = Region::full().with_c(0, 1).with_t(0, 0);
//! let samples = pixels.get_all_pixels_in(client, &region).await?;
//! println!("{:?}", samples.dim()); // (T, Z, C, Y, X)
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod bounds;
pub mod buffer;
pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod memory;
pub mod metadata;
pub mod region;
pub mod tile;
pub mod types;
pub mod utils;

// Re-exports
pub use access::{PixelSet, RawDataGuard};
pub use bounds::{resolve, Axis, AxisRange, Bounds, Extents, Region};
pub use buffer::RawPixels;
pub use config::FetchConfig;
pub use error::{PixelError, Result, SourceError};
pub use io::{PixelClient, PlaneSelector, PlaneTile, RawDataSource};
pub use layout::{SubTile, TileGrid, MAX_TILE_EDGE};
pub use memory::{InMemoryClient, SourceStats};
pub use metadata::{PixelSetDescriptor, PlaneInfo};
pub use types::{Coordinate, PhysicalLength, PixelType};

/// Version of the pixelset crate
pub const PIXELSET_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!PIXELSET_VERSION.is_empty());
    }
}
