//! Interfaces to the remote pixel store
//!
//! The store itself (sessions, connection management) lives outside this crate.
//! Retrieval only needs two things from it: a [`PixelClient`] able to hand out a
//! raw data handle for a pixel set, and the [`RawDataSource`] handle that serves
//! rectangular tiles of a single plane.

use crate::error::SourceError;
use crate::metadata::{PixelSetDescriptor, PlaneInfo};
use crate::types::PixelType;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Selects one (z, t, c) plane of a pixel set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneSelector {
    pub z: usize,
    pub t: usize,
    pub c: usize,
}

impl PlaneSelector {
    pub const fn new(z: usize, t: usize, c: usize) -> Self {
        Self { z, t, c }
    }
}

impl fmt::Display for PlaneSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plane (z={}, t={}, c={})", self.z, self.t, self.c)
    }
}

/// A tile of one plane as served by a raw data source
///
/// Samples are stored row-major and big-endian in `pixel_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneTile {
    pixel_type: PixelType,
    width: usize,
    height: usize,
    data: Bytes,
}

impl PlaneTile {
    pub fn new(pixel_type: PixelType, width: usize, height: usize, data: impl Into<Bytes>) -> Self {
        Self {
            pixel_type,
            width,
            height,
            data: data.into(),
        }
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decoded sample at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the payload does not hold the sample.
    pub fn pixel_value(&self, x: usize, y: usize) -> f64 {
        let bpp = self.pixel_type.bytes_per_pixel();
        let offset = (y * self.width + x) * bpp;
        self.pixel_type.decode_be(&self.data[offset..offset + bpp])
    }

    /// Byte `index` of the raw payload.
    ///
    /// # Panics
    /// Panics if `index` is past the payload.
    pub fn raw_value(&self, index: usize) -> u8 {
        self.data[index]
    }
}

/// Handle serving plane tiles of one pixel set
#[async_trait]
pub trait RawDataSource: Send + Sync {
    /// Read the `width x height` tile at `(x, y)` of `plane`
    async fn get_tile(
        &self,
        plane: PlaneSelector,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<PlaneTile, SourceError>;

    /// Release the resources held by this handle
    fn close(&self) {}
}

/// Client of the pixel store
#[async_trait]
pub trait PixelClient: Send + Sync {
    /// Create a raw data handle for a pixel set
    async fn raw_data(
        &self,
        pixels: &PixelSetDescriptor,
    ) -> Result<Arc<dyn RawDataSource>, SourceError>;

    /// Per-plane acquisition metadata of a pixel set
    async fn plane_infos(&self, pixels: &PixelSetDescriptor) -> Result<Vec<PlaneInfo>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_tile_values() {
        let mut data = Vec::new();
        for v in [1u16, 2, 3, 400, 500, 600] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        let tile = PlaneTile::new(PixelType::UInt16, 3, 2, data);
        assert_eq!(tile.pixel_value(0, 0), 1.0);
        assert_eq!(tile.pixel_value(2, 0), 3.0);
        assert_eq!(tile.pixel_value(1, 1), 500.0);
        assert_eq!(tile.raw_value(7), (400u16.to_be_bytes())[1]);
        assert_eq!(tile.as_bytes().len(), 12);
    }

    #[test]
    fn test_plane_selector_display() {
        assert_eq!(PlaneSelector::new(0, 4, 2).to_string(), "plane (z=0, t=4, c=2)");
    }
}
