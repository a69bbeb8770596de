//! Core data types for pixel sets

use crate::error::PixelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sample encodings supported by the pixel store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PixelType {
    /// 1-bit mask, stored as full bytes
    Bit = 0,
    /// Signed 8-bit integer
    Int8 = 1,
    /// Unsigned 8-bit integer
    UInt8 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Unsigned 16-bit integer
    UInt16 = 4,
    /// Signed 32-bit integer
    Int32 = 5,
    /// Unsigned 32-bit integer
    UInt32 = 6,
    /// 32-bit floating point
    Float = 7,
    /// 64-bit floating point
    Double = 8,
}

impl PixelType {
    /// Size in bytes of one sample
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelType::Bit => 1,
            PixelType::Int8 | PixelType::UInt8 => 1,
            PixelType::Int16 | PixelType::UInt16 => 2,
            PixelType::Int32 | PixelType::UInt32 | PixelType::Float => 4,
            PixelType::Double => 8,
        }
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, PixelType::Float | PixelType::Double)
    }

    /// Check if this is a signed type
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            PixelType::Int8 | PixelType::Int16 | PixelType::Int32 | PixelType::Float | PixelType::Double
        )
    }

    /// Name used by the pixel store
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelType::Bit => "bit",
            PixelType::Int8 => "int8",
            PixelType::UInt8 => "uint8",
            PixelType::Int16 => "int16",
            PixelType::UInt16 => "uint16",
            PixelType::Int32 => "int32",
            PixelType::UInt32 => "uint32",
            PixelType::Float => "float",
            PixelType::Double => "double",
        }
    }

    /// Decode one big-endian sample.
    ///
    /// `bytes` must hold exactly [`bytes_per_pixel`](Self::bytes_per_pixel) bytes.
    pub(crate) fn decode_be(&self, bytes: &[u8]) -> f64 {
        match self {
            PixelType::Bit => f64::from(u8::from(bytes[0] != 0)),
            PixelType::Int8 => f64::from(bytes[0] as i8),
            PixelType::UInt8 => f64::from(bytes[0]),
            PixelType::Int16 => f64::from(i16::from_be_bytes([bytes[0], bytes[1]])),
            PixelType::UInt16 => f64::from(u16::from_be_bytes([bytes[0], bytes[1]])),
            PixelType::Int32 => {
                f64::from(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            PixelType::UInt32 => {
                f64::from(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            PixelType::Float => {
                f64::from(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            PixelType::Double => f64::from_be_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelType {
    type Err = PixelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bit" => Ok(PixelType::Bit),
            "int8" => Ok(PixelType::Int8),
            "uint8" => Ok(PixelType::UInt8),
            "int16" => Ok(PixelType::Int16),
            "uint16" => Ok(PixelType::UInt16),
            "int32" => Ok(PixelType::Int32),
            "uint32" => Ok(PixelType::UInt32),
            "float" => Ok(PixelType::Float),
            "double" => Ok(PixelType::Double),
            other => Err(PixelError::UnsupportedPixelType(other.to_string())),
        }
    }
}

/// A point in 5D pixel-index space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
    pub c: i64,
    pub z: i64,
    pub t: i64,
}

impl Coordinate {
    pub const fn new(x: i64, y: i64, c: i64, z: i64, t: i64) -> Self {
        Self { x, y, c, z, t }
    }

    /// Components in (x, y, c, z, t) order
    pub fn to_array(&self) -> [i64; 5] {
        [self.x, self.y, self.c, self.z, self.t]
    }

    pub fn from_array(values: [i64; 5]) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4])
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x={}, y={}, c={}, z={}, t={})",
            self.x, self.y, self.c, self.z, self.t
        )
    }
}

/// A physical length with its unit symbol (e.g. "µm")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalLength {
    pub value: f64,
    pub unit: String,
}

impl PhysicalLength {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Micrometers, the store's default length unit
    pub fn micrometers(value: f64) -> Self {
        Self::new(value, MICROMETER)
    }

    /// Express this length in `unit`; `None` if either unit is unknown.
    pub fn to_unit(&self, unit: &str) -> Option<PhysicalLength> {
        let from = meters_per_unit(&self.unit)?;
        let to = meters_per_unit(unit)?;
        Some(PhysicalLength::new(self.value * from / to, unit))
    }
}

/// Symbol of the store's default length unit
pub const MICROMETER: &str = "µm";

fn meters_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "pm" => Some(1e-12),
        "Å" | "angstrom" => Some(1e-10),
        "nm" => Some(1e-9),
        "µm" | "um" | "micron" => Some(1e-6),
        "mm" => Some(1e-3),
        "cm" => Some(1e-2),
        "m" => Some(1.0),
        _ => None,
    }
}

impl fmt::Display for PhysicalLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
