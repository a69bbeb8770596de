//! Bounds resolution - clamps caller ranges against the pixel set extents
//!
//! Resolution is deliberately permissive: an out-of-range lower bound falls back
//! to `0` and an out-of-range upper bound falls back to the last index of the
//! axis. Requests are never rejected for bad ranges.

use crate::error::{PixelError, Result};
use crate::types::Coordinate;
use serde::{Deserialize, Serialize};

/// Axes of a pixel set, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    C,
    Z,
    T,
}

impl Axis {
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::C, Axis::Z, Axis::T];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Extent of a pixel set along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[usize; 5]", into = "[usize; 5]")]
pub struct Extents {
    dims: [usize; 5],
}

impl Extents {
    /// Create extents; every axis must hold at least one sample.
    pub fn new(size_x: usize, size_y: usize, size_c: usize, size_z: usize, size_t: usize) -> Result<Self> {
        let dims = [size_x, size_y, size_c, size_z, size_t];
        for (axis, &size) in Axis::ALL.iter().zip(dims.iter()) {
            if size == 0 {
                return Err(PixelError::InvalidDimensions(format!(
                    "Axis {:?} has no samples",
                    axis
                )));
            }
            if i64::try_from(size).is_err() {
                return Err(PixelError::InvalidDimensions(format!(
                    "Axis {:?} is too large: {}",
                    axis, size
                )));
            }
        }
        Ok(Self { dims })
    }

    pub fn get(&self, axis: Axis) -> usize {
        self.dims[axis.index()]
    }

    pub fn size_x(&self) -> usize {
        self.dims[0]
    }

    pub fn size_y(&self) -> usize {
        self.dims[1]
    }

    pub fn size_c(&self) -> usize {
        self.dims[2]
    }

    pub fn size_z(&self) -> usize {
        self.dims[3]
    }

    pub fn size_t(&self) -> usize {
        self.dims[4]
    }

    /// Total number of samples
    pub fn total_samples(&self) -> usize {
        self.dims.iter().product()
    }

    /// Total number of (c, z, t) planes
    pub fn plane_count(&self) -> usize {
        self.size_c() * self.size_z() * self.size_t()
    }
}

impl TryFrom<[usize; 5]> for Extents {
    type Error = PixelError;

    fn try_from(dims: [usize; 5]) -> Result<Self> {
        Self::new(dims[0], dims[1], dims[2], dims[3], dims[4])
    }
}

impl From<Extents> for [usize; 5] {
    fn from(extents: Extents) -> Self {
        extents.dims
    }
}

/// An inclusive `[lo, hi]` index range requested along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub lo: i64,
    pub hi: i64,
}

impl AxisRange {
    pub const fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    /// Clamp this range (or the full axis when `None`) against `extent`.
    pub fn resolve(range: Option<AxisRange>, extent: usize) -> AxisRange {
        let max = extent as i64 - 1;
        match range {
            None => AxisRange::new(0, max),
            Some(requested) => {
                let lo = if (0..=max).contains(&requested.lo) {
                    requested.lo
                } else {
                    0
                };
                let hi = if (lo..=max).contains(&requested.hi) {
                    requested.hi
                } else {
                    max
                };
                AxisRange::new(lo, hi)
            }
        }
    }

    /// Number of indices covered
    pub fn len(&self) -> i64 {
        self.hi - self.lo + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

impl From<[i64; 2]> for AxisRange {
    fn from(pair: [i64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<(i64, i64)> for AxisRange {
    fn from((lo, hi): (i64, i64)) -> Self {
        Self::new(lo, hi)
    }
}

/// A caller's region request: an optional range per axis, `None` meaning the full axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: Option<AxisRange>,
    pub y: Option<AxisRange>,
    pub c: Option<AxisRange>,
    pub z: Option<AxisRange>,
    pub t: Option<AxisRange>,
}

impl Region {
    /// The whole pixel set
    pub fn full() -> Self {
        Self::default()
    }

    pub fn with_x(mut self, lo: i64, hi: i64) -> Self {
        self.x = Some(AxisRange::new(lo, hi));
        self
    }

    pub fn with_y(mut self, lo: i64, hi: i64) -> Self {
        self.y = Some(AxisRange::new(lo, hi));
        self
    }

    pub fn with_c(mut self, lo: i64, hi: i64) -> Self {
        self.c = Some(AxisRange::new(lo, hi));
        self
    }

    pub fn with_z(mut self, lo: i64, hi: i64) -> Self {
        self.z = Some(AxisRange::new(lo, hi));
        self
    }

    pub fn with_t(mut self, lo: i64, hi: i64) -> Self {
        self.t = Some(AxisRange::new(lo, hi));
        self
    }

    pub fn get(&self, axis: Axis) -> Option<AxisRange> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::C => self.c,
            Axis::Z => self.z,
            Axis::T => self.t,
        }
    }

    /// Resolve this request against the declared extents.
    pub fn resolve(&self, extents: &Extents) -> Bounds {
        let mut start = [0i64; 5];
        let mut size = [0i64; 5];
        for axis in Axis::ALL {
            let range = AxisRange::resolve(self.get(axis), extents.get(axis));
            start[axis.index()] = range.lo;
            size[axis.index()] = range.len();
        }
        Bounds {
            start: Coordinate::from_array(start),
            size: Coordinate::from_array(size),
        }
    }
}

/// Clamp optional per-axis ranges against `extents`.
///
/// Equivalent to building a [`Region`] and calling [`Region::resolve`].
pub fn resolve(
    x: Option<AxisRange>,
    y: Option<AxisRange>,
    c: Option<AxisRange>,
    z: Option<AxisRange>,
    t: Option<AxisRange>,
    extents: &Extents,
) -> Bounds {
    Region { x, y, c, z, t }.resolve(extents)
}

/// An axis-aligned hyper-rectangle in 5D index space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    start: Coordinate,
    size: Coordinate,
}

impl Bounds {
    /// Create bounds from inclusive start and end corners.
    pub fn new(start: Coordinate, end: Coordinate) -> Result<Self> {
        let lo = start.to_array();
        let hi = end.to_array();
        let mut size = [0i64; 5];
        for (i, axis) in Axis::ALL.iter().enumerate() {
            if hi[i] < lo[i] {
                return Err(PixelError::InvalidDimensions(format!(
                    "End {} precedes start {} on axis {:?}",
                    hi[i], lo[i], axis
                )));
            }
            size[i] = hi[i] - lo[i] + 1;
        }
        Ok(Self {
            start,
            size: Coordinate::from_array(size),
        })
    }

    /// Inclusive lower corner
    pub fn start(&self) -> Coordinate {
        self.start
    }

    /// Inclusive upper corner
    pub fn end(&self) -> Coordinate {
        let start = self.start.to_array();
        let size = self.size.to_array();
        let mut end = [0i64; 5];
        for i in 0..5 {
            end[i] = start[i] + size[i] - 1;
        }
        Coordinate::from_array(end)
    }

    /// Extent per axis
    pub fn size(&self) -> Coordinate {
        self.size
    }

    /// Extent per axis as unsigned lengths, in (x, y, c, z, t) order
    pub fn dims(&self) -> [usize; 5] {
        self.size.to_array().map(|s| s as usize)
    }

    /// Number of (c, z, t) planes covered
    pub fn plane_count(&self) -> usize {
        let [_, _, c, z, t] = self.dims();
        c * z * t
    }

    /// Number of samples covered
    pub fn sample_count(&self) -> usize {
        self.dims().iter().product()
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        let lo = self.start.to_array();
        let hi = self.end().to_array();
        coord
            .to_array()
            .iter()
            .enumerate()
            .all(|(i, &v)| v >= lo[i] && v <= hi[i])
    }

    /// Plane origins in (T, Z, C) nested order: T outermost, C innermost.
    pub fn planes(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let start = self.start;
        let size = self.size;
        (0..size.t).flat_map(move |t| {
            (0..size.z).flat_map(move |z| {
                (0..size.c).map(move |c| {
                    Coordinate::new(start.x, start.y, start.c + c, start.z + z, start.t + t)
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extents() -> Extents {
        Extents::new(10, 20, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_full_axis_when_unspecified() {
        let bounds = Region::full().resolve(&extents());
        assert_eq!(bounds.start(), Coordinate::new(0, 0, 0, 0, 0));
        assert_eq!(bounds.end(), Coordinate::new(9, 19, 2, 3, 4));
        assert_eq!(bounds.size(), Coordinate::new(10, 20, 3, 4, 5));
    }

    #[test]
    fn test_negative_lower_bound_becomes_zero() {
        let bounds = Region::full().with_x(-5, 3).resolve(&extents());
        assert_eq!(bounds.start().x, 0);
        assert_eq!(bounds.end().x, 3);
        assert_eq!(bounds.size().x, 4);
    }

    #[test]
    fn test_lower_bound_past_extent_becomes_zero() {
        let range = AxisRange::resolve(Some(AxisRange::new(10, 4)), 10);
        assert_eq!(range, AxisRange::new(0, 4));
    }

    #[test]
    fn test_upper_bound_past_extent_becomes_max() {
        let range = AxisRange::resolve(Some(AxisRange::new(2, 99)), 10);
        assert_eq!(range, AxisRange::new(2, 9));
    }

    #[test]
    fn test_inverted_range_widens_to_max() {
        let range = AxisRange::resolve(Some(AxisRange::new(6, 2)), 10);
        assert_eq!(range, AxisRange::new(6, 9));
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn test_sizes_always_within_extent() {
        let extents = extents();
        let samples = [-100, -1, 0, 1, 2, 3, 4, 9, 10, 19, 20, 100];
        for &lo in &samples {
            for &hi in &samples {
                let region = Region::full()
                    .with_x(lo, hi)
                    .with_y(lo, hi)
                    .with_c(lo, hi)
                    .with_z(lo, hi)
                    .with_t(lo, hi);
                let bounds = region.resolve(&extents);
                for axis in Axis::ALL {
                    let size = bounds.dims()[axis.index()];
                    assert!(size >= 1, "{:?} empty for [{}, {}]", axis, lo, hi);
                    assert!(size <= extents.get(axis));
                }
                assert_eq!(bounds, region.resolve(&extents));
            }
        }
    }

    #[test]
    fn test_bounds_from_corners() {
        let bounds = Bounds::new(Coordinate::new(1, 2, 0, 0, 0), Coordinate::new(4, 2, 1, 0, 2)).unwrap();
        assert_eq!(bounds.size(), Coordinate::new(4, 1, 2, 1, 3));
        assert_eq!(bounds.end(), Coordinate::new(4, 2, 1, 0, 2));
        assert_eq!(bounds.plane_count(), 6);
        assert!(bounds.contains(&Coordinate::new(4, 2, 1, 0, 2)));
        assert!(!bounds.contains(&Coordinate::new(5, 2, 1, 0, 2)));

        assert!(Bounds::new(Coordinate::new(3, 0, 0, 0, 0), Coordinate::new(2, 0, 0, 0, 0)).is_err());
    }

    #[test]
    fn test_plane_order() {
        let bounds = Region::full()
            .with_c(1, 2)
            .with_z(0, 1)
            .with_t(3, 3)
            .resolve(&extents());
        let planes: Vec<(i64, i64, i64)> = bounds.planes().map(|p| (p.t, p.z, p.c)).collect();
        assert_eq!(planes, vec![(3, 0, 1), (3, 0, 2), (3, 1, 1), (3, 1, 2)]);
    }

    #[test]
    fn test_zero_extent_rejected() {
        assert!(matches!(
            Extents::new(10, 0, 1, 1, 1),
            Err(PixelError::InvalidDimensions(_))
        ));
        let parsed: std::result::Result<Extents, _> = serde_json::from_str("[1, 1, 0, 1, 1]");
        assert!(parsed.is_err());
    }
}
