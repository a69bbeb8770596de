//! Pixel set metadata structures

use crate::bounds::Extents;
use crate::error::Result;
use crate::types::{PhysicalLength, PixelType, MICROMETER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only description of a remote pixel set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelSetDescriptor {
    /// Identifier of the pixel set in the store
    pub id: i64,

    /// Extent along X, Y, C, Z, T
    pub extents: Extents,

    /// Sample encoding
    pub pixel_type: PixelType,

    /// Physical size of one pixel along X
    pub physical_size_x: Option<PhysicalLength>,

    /// Physical size of one pixel along Y
    pub physical_size_y: Option<PhysicalLength>,

    /// Physical size of one pixel along Z
    pub physical_size_z: Option<PhysicalLength>,

    /// Time increment between time points, in seconds
    pub time_increment: Option<f64>,
}

impl PixelSetDescriptor {
    /// Create new metadata
    pub fn new(id: i64, extents: Extents, pixel_type: PixelType) -> Self {
        Self {
            id,
            extents,
            pixel_type,
            physical_size_x: None,
            physical_size_y: None,
            physical_size_z: None,
            time_increment: None,
        }
    }

    /// Set physical pixel sizes
    pub fn with_physical_sizes(
        mut self,
        x: Option<PhysicalLength>,
        y: Option<PhysicalLength>,
        z: Option<PhysicalLength>,
    ) -> Self {
        self.physical_size_x = x;
        self.physical_size_y = y;
        self.physical_size_z = z;
        self
    }

    /// Set time increment
    pub fn with_time_increment(mut self, seconds: f64) -> Self {
        self.time_increment = Some(seconds);
        self
    }

    /// Bytes occupied by the whole pixel set in its native encoding
    pub fn total_size_bytes(&self) -> usize {
        self.extents.total_samples() * self.pixel_type.bytes_per_pixel()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Acquisition metadata for a single (c, z, t) plane
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneInfo {
    pub the_c: usize,
    pub the_z: usize,
    pub the_t: usize,

    /// Time since acquisition start, in seconds
    pub delta_t: Option<f64>,

    /// Exposure time, in seconds
    pub exposure_time: Option<f64>,

    pub position_x: Option<PhysicalLength>,
    pub position_y: Option<PhysicalLength>,
    pub position_z: Option<PhysicalLength>,
}

impl PlaneInfo {
    pub fn new(the_c: usize, the_z: usize, the_t: usize) -> Self {
        Self {
            the_c,
            the_z,
            the_t,
            ..Self::default()
        }
    }

    pub fn with_delta_t(mut self, seconds: f64) -> Self {
        self.delta_t = Some(seconds);
        self
    }

    pub fn with_exposure_time(mut self, seconds: f64) -> Self {
        self.exposure_time = Some(seconds);
        self
    }

    pub fn with_position(
        mut self,
        x: Option<PhysicalLength>,
        y: Option<PhysicalLength>,
        z: Option<PhysicalLength>,
    ) -> Self {
        self.position_x = x;
        self.position_y = y;
        self.position_z = z;
        self
    }
}

/// Mean interval between successive time points.
///
/// Each time point below `size_t` is stamped with the earliest `delta_t` among
/// its planes. Returns `None` when fewer than two time points are stamped.
pub fn mean_time_interval(planes: &[PlaneInfo], size_t: usize) -> Option<f64> {
    let mut stamps: BTreeMap<usize, f64> = BTreeMap::new();
    for plane in planes.iter().filter(|p| p.the_t < size_t) {
        if let Some(delta_t) = plane.delta_t {
            stamps
                .entry(plane.the_t)
                .and_modify(|v| *v = v.min(delta_t))
                .or_insert(delta_t);
        }
    }

    let values: Vec<f64> = stamps.into_values().collect();
    if values.len() < 2 {
        return None;
    }
    let total: f64 = values.windows(2).map(|w| w[1] - w[0]).sum();
    Some(total / (values.len() - 1) as f64)
}

/// Mean exposure time over the planes of `channel` that record one.
pub fn mean_exposure_time(planes: &[PlaneInfo], channel: usize) -> Option<f64> {
    let exposures: Vec<f64> = planes
        .iter()
        .filter(|p| p.the_c == channel)
        .filter_map(|p| p.exposure_time)
        .collect();
    if exposures.is_empty() {
        None
    } else {
        Some(exposures.iter().sum::<f64>() / exposures.len() as f64)
    }
}

/// Smallest stage position across planes, expressed in `unit`.
///
/// Positions in units that cannot be converted are ignored.
pub fn min_position<F>(planes: &[PlaneInfo], position: F, unit: &str) -> Option<PhysicalLength>
where
    F: Fn(&PlaneInfo) -> Option<&PhysicalLength>,
{
    planes
        .iter()
        .filter_map(|p| position(p))
        .filter_map(|length| length.to_unit(unit))
        .min_by(|a, b| a.value.total_cmp(&b.value))
}

/// Unit used to report stage positions along an axis with pixel size `size`.
pub(crate) fn position_unit(size: Option<&PhysicalLength>) -> &str {
    size.map(|s| s.unit.as_str()).unwrap_or(MICROMETER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> PixelSetDescriptor {
        PixelSetDescriptor::new(7, Extents::new(64, 32, 2, 3, 4).unwrap(), PixelType::UInt16)
    }

    #[test]
    fn test_descriptor_json() {
        let metadata = descriptor()
            .with_physical_sizes(Some(PhysicalLength::micrometers(0.65)), None, None)
            .with_time_increment(2.0);
        let json = metadata.to_json().unwrap();
        let parsed = PixelSetDescriptor::from_json(&json).unwrap();
        assert_eq!(parsed, metadata);
        assert_eq!(parsed.total_size_bytes(), 64 * 32 * 2 * 3 * 4 * 2);
    }

    #[test]
    fn test_mean_time_interval() {
        let planes = vec![
            PlaneInfo::new(0, 0, 0).with_delta_t(0.0),
            PlaneInfo::new(1, 0, 0).with_delta_t(0.5),
            PlaneInfo::new(0, 0, 1).with_delta_t(2.0),
            PlaneInfo::new(0, 0, 2).with_delta_t(4.5),
            PlaneInfo::new(0, 0, 9).with_delta_t(100.0),
        ];
        let mean = mean_time_interval(&planes, 3).unwrap();
        assert!((mean - 2.25).abs() < 1e-12);

        assert_eq!(mean_time_interval(&planes[..2], 3), None);
    }

    #[test]
    fn test_mean_exposure_time() {
        let planes = vec![
            PlaneInfo::new(0, 0, 0).with_exposure_time(0.1),
            PlaneInfo::new(0, 1, 0).with_exposure_time(0.3),
            PlaneInfo::new(1, 0, 0).with_exposure_time(5.0),
            PlaneInfo::new(0, 2, 0),
        ];
        let mean = mean_exposure_time(&planes, 0).unwrap();
        assert!((mean - 0.2).abs() < 1e-12);
        assert_eq!(mean_exposure_time(&planes, 2), None);
    }

    #[test]
    fn test_min_position() {
        let planes = vec![
            PlaneInfo::new(0, 0, 0).with_position(Some(PhysicalLength::new(1.5, "mm")), None, None),
            PlaneInfo::new(0, 1, 0).with_position(Some(PhysicalLength::micrometers(900.0)), None, None),
            PlaneInfo::new(0, 2, 0).with_position(Some(PhysicalLength::new(1.0, "parsec")), None, None),
        ];
        let min = min_position(&planes, |p| p.position_x.as_ref(), MICROMETER).unwrap();
        assert!((min.value - 900.0).abs() < 1e-9);
        assert!(min_position(&planes, |p| p.position_y.as_ref(), MICROMETER).is_none());
    }
}
