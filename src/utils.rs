//! Utility functions

use crate::error::{PixelError, Result};
use crate::types::PixelType;
use num_traits::{cast, NumCast};

fn cast_sample<T: NumCast>(value: f64, pixel_type: PixelType) -> Result<T> {
    cast::<f64, T>(value).ok_or_else(|| {
        PixelError::OutOfBounds(format!(
            "Value {} cannot be represented as {}",
            value, pixel_type
        ))
    })
}

/// Append `value` to `out` as one big-endian sample of `pixel_type`
pub fn encode_sample(value: f64, pixel_type: PixelType, out: &mut Vec<u8>) -> Result<()> {
    match pixel_type {
        PixelType::Bit => out.push((value != 0.0) as u8),
        PixelType::Int8 => out.extend_from_slice(&cast_sample::<i8>(value, pixel_type)?.to_be_bytes()),
        PixelType::UInt8 => out.push(cast_sample::<u8>(value, pixel_type)?),
        PixelType::Int16 => {
            out.extend_from_slice(&cast_sample::<i16>(value, pixel_type)?.to_be_bytes())
        }
        PixelType::UInt16 => {
            out.extend_from_slice(&cast_sample::<u16>(value, pixel_type)?.to_be_bytes())
        }
        PixelType::Int32 => {
            out.extend_from_slice(&cast_sample::<i32>(value, pixel_type)?.to_be_bytes())
        }
        PixelType::UInt32 => {
            out.extend_from_slice(&cast_sample::<u32>(value, pixel_type)?.to_be_bytes())
        }
        PixelType::Float => {
            out.extend_from_slice(&cast_sample::<f32>(value, pixel_type)?.to_be_bytes())
        }
        PixelType::Double => out.extend_from_slice(&value.to_be_bytes()),
    }
    Ok(())
}

/// Format byte size in human-readable form
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sample() {
        let mut out = Vec::new();
        encode_sample(258.0, PixelType::UInt16, &mut out).unwrap();
        encode_sample(-1.0, PixelType::Int8, &mut out).unwrap();
        encode_sample(3.0, PixelType::Bit, &mut out).unwrap();
        assert_eq!(out, vec![0x01, 0x02, 0xFF, 0x01]);

        for pixel_type in [PixelType::Int32, PixelType::Float, PixelType::Double] {
            let mut out = Vec::new();
            encode_sample(-42.0, pixel_type, &mut out).unwrap();
            assert_eq!(out.len(), pixel_type.bytes_per_pixel());
            assert_eq!(pixel_type.decode_be(&out), -42.0);
        }
    }

    #[test]
    fn test_encode_bit() {
        let mut out = Vec::new();
        for value in [0.0, 1.0, -2.5] {
            encode_sample(value, PixelType::Bit, &mut out).unwrap();
        }
        assert_eq!(out, vec![0, 1, 1]);
    }

    #[test]
    fn test_encode_out_of_range() {
        let mut out = Vec::new();
        assert!(encode_sample(300.0, PixelType::UInt8, &mut out).is_err());
        assert!(encode_sample(-1.0, PixelType::UInt16, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }
}
