//! Packed byte buffers for raw pixel retrieval

use crate::error::{PixelError, Result};
use std::ops::Range;

/// Raw samples of a region, packed `bpp` bytes per sample
///
/// Planes are laid out in (T, Z, C) order, each plane row-major in (Y, X):
///
/// ```text
/// offset(t, z, c, y, x) = ((t * Z + z) * C + c) * Y * X * bpp + (y * X + x) * bpp
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPixels {
    data: Vec<u8>,
    shape: [usize; 5],
    bpp: usize,
}

impl RawPixels {
    /// Zeroed buffer of shape `[T, Z, C, Y, X]`
    pub fn zeroed(shape: [usize; 5], bpp: usize) -> Result<Self> {
        if bpp == 0 {
            return Err(PixelError::InvalidBytesPerPixel(bpp));
        }
        let len = shape
            .iter()
            .try_fold(bpp, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| {
                PixelError::InvalidDimensions(format!(
                    "Region {:?} with {} bytes per pixel overflows",
                    shape, bpp
                ))
            })?;
        Ok(Self {
            data: vec![0u8; len],
            shape,
            bpp,
        })
    }

    /// Shape as `[T, Z, C, Y, X]`
    pub fn shape(&self) -> [usize; 5] {
        self.shape
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bpp
    }

    /// Bytes in one (Y, X) plane
    pub fn plane_len(&self) -> usize {
        self.shape[3] * self.shape[4] * self.bpp
    }

    pub fn plane_count(&self) -> usize {
        self.shape[0] * self.shape[1] * self.shape[2]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte offset of sample `(t, z, c, y, x)`
    pub fn offset(&self, t: usize, z: usize, c: usize, y: usize, x: usize) -> usize {
        let [_, size_z, size_c, size_y, size_x] = self.shape;
        ((t * size_z + z) * size_c + c) * size_y * size_x * self.bpp + (y * size_x + x) * self.bpp
    }

    fn plane_range(&self, t: usize, z: usize, c: usize) -> Range<usize> {
        let start = self.offset(t, z, c, 0, 0);
        start..start + self.plane_len()
    }

    /// Packed plane `(t, z, c)`
    ///
    /// # Panics
    /// Panics if the plane is outside the buffer.
    pub fn plane(&self, t: usize, z: usize, c: usize) -> &[u8] {
        &self.data[self.plane_range(t, z, c)]
    }

    /// Mutable packed plane `(t, z, c)`
    ///
    /// # Panics
    /// Panics if the plane is outside the buffer.
    pub fn plane_mut(&mut self, t: usize, z: usize, c: usize) -> &mut [u8] {
        let range = self.plane_range(t, z, c);
        &mut self.data[range]
    }

    /// The `bpp` bytes of sample `(t, z, c, y, x)`
    ///
    /// # Panics
    /// Panics if the sample is outside the buffer.
    pub fn sample(&self, t: usize, z: usize, c: usize, y: usize, x: usize) -> &[u8] {
        let offset = self.offset(t, z, c, y, x);
        &self.data[offset..offset + self.bpp]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
