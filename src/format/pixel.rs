//! Pixel sample reconstruction.
//!
//! Raw frame bytes are turned into a typed sample array according to the
//! stored encoding:
//!
//! | bits allocated | pixel representation | samples                      |
//! |----------------|----------------------|------------------------------|
//! | 8              | any                  | `u8`, one per byte           |
//! | 16             | 0 (unsigned)         | `u16`, little-endian pairs   |
//! | 16             | 1 (signed)           | `i16`, little-endian pairs   |
//!
//! Any other width is rejected with `UnsupportedEncoding`. Multi-channel
//! frames are reconstructed interleaved, exactly as stored.

use crate::error::LoadError;

/// Little-endian `low | (high << 8)`.
#[inline]
fn read_u16_le(pair: &[u8]) -> u16 {
    u16::from_le_bytes([pair[0], pair[1]])
}

// =============================================================================
// Sample Encoding
// =============================================================================

/// Storage type of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Unsigned8,
    Unsigned16,
    Signed16,
}

impl SampleEncoding {
    /// Select the encoding for a `bits_allocated` / `pixel_representation` pair.
    ///
    /// 8-bit samples are always unsigned.
    pub fn from_attributes(
        bits_allocated: u16,
        pixel_representation: u16,
    ) -> Result<Self, LoadError> {
        match (bits_allocated, pixel_representation) {
            (8, _) => Ok(Self::Unsigned8),
            (16, 1) => Ok(Self::Signed16),
            (16, _) => Ok(Self::Unsigned16),
            _ => Err(LoadError::UnsupportedEncoding { bits_allocated }),
        }
    }

    #[inline]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Unsigned8 => 1,
            Self::Unsigned16 | Self::Signed16 => 2,
        }
    }
}

// =============================================================================
// PixelData
// =============================================================================

/// Typed sample array for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
}

impl PixelData {
    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the sample array in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len() * 2,
            Self::I16(v) => v.len() * 2,
        }
    }

    /// Typed-array name the host framework expects.
    pub fn data_type(&self) -> &'static str {
        match self {
            Self::U8(_) => "Uint8Array",
            Self::U16(_) => "Uint16Array",
            Self::I16(_) => "Int16Array",
        }
    }

    /// Sample at `index`, widened to `i32`.
    pub fn get(&self, index: usize) -> Option<i32> {
        match self {
            Self::U8(v) => v.get(index).map(|&s| i32::from(s)),
            Self::U16(v) => v.get(index).map(|&s| i32::from(s)),
            Self::I16(v) => v.get(index).map(|&s| i32::from(s)),
        }
    }

    /// Iterate samples widened to `i32`.
    pub fn iter(&self) -> Box<dyn Iterator<Item = i32> + '_> {
        match self {
            Self::U8(v) => Box::new(v.iter().map(|&s| i32::from(s))),
            Self::U16(v) => Box::new(v.iter().map(|&s| i32::from(s))),
            Self::I16(v) => Box::new(v.iter().map(|&s| i32::from(s))),
        }
    }

    /// Minimum and maximum sample, or `None` for an empty array.
    pub fn extrema(&self) -> Option<(i32, i32)> {
        fn scan<T: Copy + Ord + Into<i32>>(samples: &[T]) -> Option<(i32, i32)> {
            let (&first, rest) = samples.split_first()?;
            let (min, max) = rest
                .iter()
                .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));
            Some((min.into(), max.into()))
        }

        match self {
            Self::U8(v) => scan(v),
            Self::U16(v) => scan(v),
            Self::I16(v) => scan(v),
        }
    }

    /// Samples serialized back to little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::U8(v) => v.clone(),
            Self::U16(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
            Self::I16(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }
}

// =============================================================================
// Reconstruction
// =============================================================================

/// Reconstructed samples with their raw (pre-rescale) extrema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedPixels {
    pub data: PixelData,
    pub min_pixel_value: i32,
    pub max_pixel_value: i32,
}

/// Convert raw frame bytes into typed samples.
///
/// 16-bit samples are read in little-endian pairs; a trailing odd byte is
/// ignored. Signed 16-bit values above 32767 wrap to `value - 65536`.
pub fn reconstruct_samples(bytes: &[u8], encoding: SampleEncoding) -> PixelData {
    match encoding {
        SampleEncoding::Unsigned8 => PixelData::U8(bytes.to_vec()),
        SampleEncoding::Unsigned16 => {
            PixelData::U16(bytes.chunks_exact(2).map(read_u16_le).collect())
        }
        SampleEncoding::Signed16 => PixelData::I16(
            bytes
                .chunks_exact(2)
                .map(|pair| read_u16_le(pair) as i16)
                .collect(),
        ),
    }
}

/// Reconstruct a frame and scan its extrema.
///
/// An empty frame reports `0` for both extrema.
pub fn reconstruct(
    bytes: &[u8],
    bits_allocated: u16,
    pixel_representation: u16,
) -> Result<ReconstructedPixels, LoadError> {
    let encoding = SampleEncoding::from_attributes(bits_allocated, pixel_representation)?;
    let data = reconstruct_samples(bytes, encoding);
    let (min_pixel_value, max_pixel_value) = data.extrema().unwrap_or((0, 0));

    Ok(ReconstructedPixels {
        data,
        min_pixel_value,
        max_pixel_value,
    })
}
