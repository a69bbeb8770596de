//! Pixel set access - main API for retrieving pixel regions
//!
//! A [`PixelSet`] caches at most one raw data handle. Retrieval calls obtain it
//! through [`PixelSet::open_raw_data`], which returns a [`RawDataGuard`]:
//!
//! - if no handle was cached, one is acquired from the client and the guard owns
//!   it; dropping the guard releases the handle, whatever the outcome of the call
//! - if a handle was already cached, the guard only borrows it and leaves it open
//!
//! Holding a guard across several calls therefore shares one handle between them.

use crate::bounds::{Bounds, Extents, Region};
use crate::buffer::RawPixels;
use crate::config::FetchConfig;
use crate::error::{PixelError, Result};
use crate::io::{PixelClient, RawDataSource};
use crate::metadata::{self, PixelSetDescriptor, PlaneInfo};
use crate::region::{fetch_region_raw, fetch_region_samples};
use crate::tile::{fetch_plane_bytes, fetch_plane_samples};
use crate::types::{Coordinate, PhysicalLength, PixelType};
use ndarray::{Array2, Array5};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

type HandleSlot = Arc<Mutex<Option<Arc<dyn RawDataSource>>>>;

/// Scoped access to the raw data handle of a [`PixelSet`]
pub struct RawDataGuard {
    handle: Arc<dyn RawDataSource>,
    slot: HandleSlot,
    owned: bool,
}

impl RawDataGuard {
    /// The raw data source
    pub fn source(&self) -> &dyn RawDataSource {
        self.handle.as_ref()
    }

    /// Whether dropping this guard releases the handle
    pub fn is_owner(&self) -> bool {
        self.owned
    }
}

impl Drop for RawDataGuard {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        {
            let mut slot = self.slot.lock();
            if slot
                .as_ref()
                .is_some_and(|cached| Arc::ptr_eq(cached, &self.handle))
            {
                *slot = None;
            }
        }
        self.handle.close();
        debug!("Raw data handle released");
    }
}

/// A remote pixel set and its retrieval operations
///
/// Not meant for concurrent retrievals on the same instance; use one instance
/// per concurrent caller.
pub struct PixelSet {
    descriptor: PixelSetDescriptor,
    config: FetchConfig,
    planes_info: Vec<PlaneInfo>,
    raw_data: HandleSlot,
}

impl PixelSet {
    /// Wrap a pixel set descriptor with the default configuration
    pub fn new(descriptor: PixelSetDescriptor) -> Self {
        Self {
            descriptor,
            config: FetchConfig::default(),
            planes_info: Vec::new(),
            raw_data: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the retrieval configuration
    pub fn with_config(mut self, config: FetchConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn descriptor(&self) -> &PixelSetDescriptor {
        &self.descriptor
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn pixel_type(&self) -> PixelType {
        self.descriptor.pixel_type
    }

    pub fn extents(&self) -> Extents {
        self.descriptor.extents
    }

    pub fn size_x(&self) -> usize {
        self.descriptor.extents.size_x()
    }

    pub fn size_y(&self) -> usize {
        self.descriptor.extents.size_y()
    }

    pub fn size_c(&self) -> usize {
        self.descriptor.extents.size_c()
    }

    pub fn size_z(&self) -> usize {
        self.descriptor.extents.size_z()
    }

    pub fn size_t(&self) -> usize {
        self.descriptor.extents.size_t()
    }

    pub fn pixel_size_x(&self) -> Option<&PhysicalLength> {
        self.descriptor.physical_size_x.as_ref()
    }

    pub fn pixel_size_y(&self) -> Option<&PhysicalLength> {
        self.descriptor.physical_size_y.as_ref()
    }

    pub fn pixel_size_z(&self) -> Option<&PhysicalLength> {
        self.descriptor.physical_size_z.as_ref()
    }

    /// Time increment between time points, in seconds
    pub fn time_increment(&self) -> Option<f64> {
        self.descriptor.time_increment
    }

    /// Whether a raw data handle is currently cached
    pub fn has_raw_data(&self) -> bool {
        self.raw_data.lock().is_some()
    }

    /// Get the cached raw data handle, acquiring one from `client` if needed.
    pub async fn open_raw_data(&self, client: &dyn PixelClient) -> Result<RawDataGuard> {
        let cached = self.raw_data.lock().clone();
        if let Some(handle) = cached {
            return Ok(RawDataGuard {
                handle,
                slot: Arc::clone(&self.raw_data),
                owned: false,
            });
        }

        let handle = client
            .raw_data(&self.descriptor)
            .await
            .map_err(PixelError::ResourceAcquisition)?;

        let mut slot = self.raw_data.lock();
        if let Some(existing) = slot.clone() {
            // Another call cached a handle while this one was being created.
            handle.close();
            return Ok(RawDataGuard {
                handle: existing,
                slot: Arc::clone(&self.raw_data),
                owned: false,
            });
        }
        *slot = Some(Arc::clone(&handle));
        debug!(pixels = self.descriptor.id, "Raw data handle acquired");

        Ok(RawDataGuard {
            handle,
            slot: Arc::clone(&self.raw_data),
            owned: true,
        })
    }

    /// Resolve `region` against the extents of this pixel set
    pub fn bounds(&self, region: &Region) -> Bounds {
        region.resolve(&self.descriptor.extents)
    }

    /// All samples, indexed `[[t, z, c, y, x]]`
    pub async fn get_all_pixels(&self, client: &dyn PixelClient) -> Result<Array5<f64>> {
        self.get_all_pixels_in(client, &Region::full()).await
    }

    /// Samples within `region`, indexed `[[t, z, c, y, x]]` from the resolved start
    pub async fn get_all_pixels_in(
        &self,
        client: &dyn PixelClient,
        region: &Region,
    ) -> Result<Array5<f64>> {
        let guard = self.open_raw_data(client).await?;
        let bounds = self.bounds(region);
        fetch_region_samples(guard.source(), &bounds, self.config.max_tile_edge).await
    }

    /// All samples as packed bytes, `bpp` bytes per sample
    pub async fn get_raw_pixels(&self, client: &dyn PixelClient, bpp: usize) -> Result<RawPixels> {
        self.get_raw_pixels_in(client, &Region::full(), bpp).await
    }

    /// All samples as packed bytes in the native sample width
    pub async fn get_raw_pixels_native(&self, client: &dyn PixelClient) -> Result<RawPixels> {
        self.get_raw_pixels(client, self.pixel_type().bytes_per_pixel())
            .await
    }

    /// Samples within `region` as packed bytes, `bpp` bytes per sample
    pub async fn get_raw_pixels_in(
        &self,
        client: &dyn PixelClient,
        region: &Region,
        bpp: usize,
    ) -> Result<RawPixels> {
        if bpp == 0 {
            return Err(PixelError::InvalidBytesPerPixel(bpp));
        }
        let guard = self.open_raw_data(client).await?;
        let bounds = self.bounds(region);
        fetch_region_raw(guard.source(), &bounds, bpp, self.config.max_tile_edge).await
    }

    /// The `width x height` rectangle of one plane at `position`, indexed `[[y, x]]`
    pub async fn get_tile(
        &self,
        client: &dyn PixelClient,
        position: Coordinate,
        width: usize,
        height: usize,
    ) -> Result<Array2<f64>> {
        let guard = self.open_raw_data(client).await?;
        fetch_plane_samples(
            guard.source(),
            position,
            width,
            height,
            self.config.max_tile_edge,
        )
        .await
    }

    /// The `width x height` rectangle of one plane at `position`, packed `bpp` bytes per sample
    pub async fn get_raw_tile(
        &self,
        client: &dyn PixelClient,
        position: Coordinate,
        width: usize,
        height: usize,
        bpp: usize,
    ) -> Result<Vec<u8>> {
        if bpp == 0 {
            return Err(PixelError::InvalidBytesPerPixel(bpp));
        }
        let guard = self.open_raw_data(client).await?;
        fetch_plane_bytes(
            guard.source(),
            position,
            width,
            height,
            bpp,
            self.config.max_tile_edge,
        )
        .await
    }

    /// Load per-plane acquisition metadata
    pub async fn load_planes_info(&mut self, client: &dyn PixelClient) -> Result<()> {
        self.planes_info = client
            .plane_infos(&self.descriptor)
            .await
            .map_err(PixelError::PlanesInfo)?;
        debug!(
            pixels = self.descriptor.id,
            planes = self.planes_info.len(),
            "Planes info loaded"
        );
        Ok(())
    }

    /// Loaded plane metadata (empty until [`load_planes_info`](Self::load_planes_info))
    pub fn planes_info(&self) -> &[PlaneInfo] {
        &self.planes_info
    }

    /// Mean interval between time points, in seconds
    pub fn mean_time_interval(&self) -> Option<f64> {
        metadata::mean_time_interval(&self.planes_info, self.size_t())
    }

    /// Mean exposure time of `channel`, in seconds
    pub fn mean_exposure_time(&self, channel: usize) -> Option<f64> {
        metadata::mean_exposure_time(&self.planes_info, channel)
    }

    /// Smallest X stage position, in the unit of the X pixel size (µm by default)
    pub fn position_x(&self) -> Option<PhysicalLength> {
        let unit = metadata::position_unit(self.pixel_size_x());
        metadata::min_position(&self.planes_info, |p| p.position_x.as_ref(), unit)
    }

    /// Smallest Y stage position, in the unit of the Y pixel size (µm by default)
    pub fn position_y(&self) -> Option<PhysicalLength> {
        let unit = metadata::position_unit(self.pixel_size_y());
        metadata::min_position(&self.planes_info, |p| p.position_y.as_ref(), unit)
    }

    /// Smallest Z stage position, in the unit of the Z pixel size (µm by default)
    pub fn position_z(&self) -> Option<PhysicalLength> {
        let unit = metadata::position_unit(self.pixel_size_z());
        metadata::min_position(&self.planes_info, |p| p.position_z.as_ref(), unit)
    }
}
