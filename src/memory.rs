//! In-memory pixel store
//!
//! Serves a pixel set held in an `ndarray` through the same client and raw data
//! interfaces as a remote store, encoding tiles big-endian in the declared
//! pixel type. Useful for tests, demos and benchmarks.

use crate::error::{PixelError, Result, SourceError};
use crate::io::{PixelClient, PlaneSelector, PlaneTile, RawDataSource};
use crate::metadata::{PixelSetDescriptor, PlaneInfo};
use crate::types::PixelType;
use crate::utils::encode_sample;
use async_trait::async_trait;
use ndarray::{s, Array5};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Counters of handle and tile activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Raw data handles created
    pub acquired: usize,
    /// Raw data handles closed
    pub released: usize,
    /// Tiles requested, successful or not
    pub tile_requests: usize,
}

/// Client serving one pixel set from memory
pub struct InMemoryClient {
    descriptor: PixelSetDescriptor,
    samples: Arc<Array5<f64>>,
    planes_info: Vec<PlaneInfo>,
    stats: Arc<Mutex<SourceStats>>,
}

impl InMemoryClient {
    /// Serve `samples`, shaped `(T, Z, C, Y, X)`, as the pixel set `descriptor`.
    ///
    /// Every sample must be representable in the descriptor's pixel type.
    pub fn new(descriptor: PixelSetDescriptor, samples: Array5<f64>) -> Result<Self> {
        let extents = descriptor.extents;
        let expected = (
            extents.size_t(),
            extents.size_z(),
            extents.size_c(),
            extents.size_y(),
            extents.size_x(),
        );
        if samples.dim() != expected {
            return Err(PixelError::InvalidDimensions(format!(
                "Samples shaped {:?}, extents require {:?}",
                samples.dim(),
                expected
            )));
        }

        let mut scratch = Vec::with_capacity(8);
        for &value in samples.iter() {
            scratch.clear();
            encode_sample(value, descriptor.pixel_type, &mut scratch)?;
        }

        Ok(Self {
            descriptor,
            samples: Arc::new(samples),
            planes_info: Vec::new(),
            stats: Arc::new(Mutex::new(SourceStats::default())),
        })
    }

    /// Serve `f(x, y, c, z, t)` at every coordinate.
    pub fn from_fn<F>(descriptor: PixelSetDescriptor, f: F) -> Result<Self>
    where
        F: Fn(usize, usize, usize, usize, usize) -> f64,
    {
        let extents = descriptor.extents;
        let samples = Array5::from_shape_fn(
            (
                extents.size_t(),
                extents.size_z(),
                extents.size_c(),
                extents.size_y(),
                extents.size_x(),
            ),
            |(t, z, c, y, x)| f(x, y, c, z, t),
        );
        Self::new(descriptor, samples)
    }

    /// Plane metadata returned by [`PixelClient::plane_infos`]
    pub fn with_planes_info(mut self, planes_info: Vec<PlaneInfo>) -> Self {
        self.planes_info = planes_info;
        self
    }

    pub fn descriptor(&self) -> &PixelSetDescriptor {
        &self.descriptor
    }

    /// Snapshot of the activity counters
    pub fn stats(&self) -> SourceStats {
        *self.stats.lock()
    }

    fn check_pixels(&self, pixels: &PixelSetDescriptor) -> std::result::Result<(), SourceError> {
        if pixels.id != self.descriptor.id {
            return Err(SourceError::NotFound(format!("pixels {}", pixels.id)));
        }
        Ok(())
    }
}

#[async_trait]
impl PixelClient for InMemoryClient {
    async fn raw_data(
        &self,
        pixels: &PixelSetDescriptor,
    ) -> std::result::Result<Arc<dyn RawDataSource>, SourceError> {
        self.check_pixels(pixels)?;
        self.stats.lock().acquired += 1;
        Ok(Arc::new(InMemorySource {
            pixel_type: self.descriptor.pixel_type,
            samples: Arc::clone(&self.samples),
            stats: Arc::clone(&self.stats),
            closed: AtomicBool::new(false),
        }))
    }

    async fn plane_infos(
        &self,
        pixels: &PixelSetDescriptor,
    ) -> std::result::Result<Vec<PlaneInfo>, SourceError> {
        self.check_pixels(pixels)?;
        Ok(self.planes_info.clone())
    }
}

/// Raw data handle created by [`InMemoryClient`]
pub struct InMemorySource {
    pixel_type: PixelType,
    samples: Arc<Array5<f64>>,
    stats: Arc<Mutex<SourceStats>>,
    closed: AtomicBool,
}

#[async_trait]
impl RawDataSource for InMemorySource {
    async fn get_tile(
        &self,
        plane: PlaneSelector,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> std::result::Result<PlaneTile, SourceError> {
        self.stats.lock().tile_requests += 1;
        if self.closed.load(Ordering::Acquire) {
            return Err(SourceError::Unavailable("raw data handle is closed".to_string()));
        }

        let (size_t, size_z, size_c, size_y, size_x) = self.samples.dim();
        if plane.t >= size_t
            || plane.z >= size_z
            || plane.c >= size_c
            || x + width > size_x
            || y + height > size_y
        {
            return Err(SourceError::Io(format!(
                "Tile {}x{} at ({}, {}) of {} is outside the pixel set",
                width, height, x, y, plane
            )));
        }

        let view = self
            .samples
            .slice(s![plane.t, plane.z, plane.c, y..y + height, x..x + width]);
        let mut data = Vec::with_capacity(width * height * self.pixel_type.bytes_per_pixel());
        for &value in view.iter() {
            encode_sample(value, self.pixel_type, &mut data)
                .map_err(|e| SourceError::Other(e.to_string()))?;
        }
        Ok(PlaneTile::new(self.pixel_type, width, height, data))
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.stats.lock().released += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Extents;

    fn descriptor(pixel_type: PixelType) -> PixelSetDescriptor {
        PixelSetDescriptor::new(3, Extents::new(5, 4, 1, 2, 1).unwrap(), pixel_type)
    }

    #[tokio::test]
    async fn test_tile_contents() {
        let client =
            InMemoryClient::from_fn(descriptor(PixelType::Int16), |x, y, _, z, _| {
                x as f64 - 10.0 * y as f64 + 100.0 * z as f64
            })
            .unwrap();
        let source = client.raw_data(client.descriptor()).await.unwrap();
        let tile = source
            .get_tile(PlaneSelector::new(1, 0, 0), 1, 2, 3, 2)
            .await
            .unwrap();
        assert_eq!(tile.width(), 3);
        assert_eq!(tile.pixel_value(0, 0), 1.0 - 20.0 + 100.0);
        assert_eq!(tile.pixel_value(2, 1), 3.0 - 30.0 + 100.0);
        assert_eq!(client.stats().tile_requests, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_tile() {
        let client = InMemoryClient::from_fn(descriptor(PixelType::UInt8), |_, _, _, _, _| 0.0)
            .unwrap();
        let source = client.raw_data(client.descriptor()).await.unwrap();
        let err = source
            .get_tile(PlaneSelector::new(0, 0, 0), 3, 0, 3, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[tokio::test]
    async fn test_closed_handle() {
        let client = InMemoryClient::from_fn(descriptor(PixelType::UInt8), |_, _, _, _, _| 1.0)
            .unwrap();
        let source = client.raw_data(client.descriptor()).await.unwrap();
        source.close();
        source.close();
        assert_eq!(client.stats().released, 1);
        assert!(matches!(
            source.get_tile(PlaneSelector::new(0, 0, 0), 0, 0, 1, 1).await,
            Err(SourceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_pixels() {
        let client = InMemoryClient::from_fn(descriptor(PixelType::UInt8), |_, _, _, _, _| 1.0)
            .unwrap();
        let mut other = client.descriptor().clone();
        other.id = 99;
        assert!(matches!(
            client.raw_data(&other).await,
            Err(SourceError::NotFound(_))
        ));
        assert_eq!(client.stats().acquired, 0);
    }

    #[test]
    fn test_unrepresentable_samples_rejected() {
        let result = InMemoryClient::from_fn(descriptor(PixelType::UInt8), |x, _, _, _, _| {
            x as f64 * 100.0
        });
        assert!(result.is_err());

        let wrong_shape = Array5::<f64>::zeros((1, 1, 1, 1, 1));
        assert!(matches!(
            InMemoryClient::new(descriptor(PixelType::Double), wrong_shape),
            Err(PixelError::InvalidDimensions(_))
        ));
    }
}
