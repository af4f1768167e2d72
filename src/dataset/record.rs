//! Dataset record: one ingested multi-frame dataset.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// =============================================================================
// Photometric Interpretation
// =============================================================================

/// Sample semantics declared by the source encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhotometricInterpretation {
    /// Grayscale, minimum sample displayed as white
    Monochrome1,
    /// Grayscale, minimum sample displayed as black
    #[default]
    Monochrome2,
    Rgb,
    PaletteColor,
    YbrFull,
    YbrFull422,
    YbrPartial422,
    YbrIct,
    YbrRct,
    /// Any tag value not listed above, kept verbatim
    Other(String),
}

impl PhotometricInterpretation {
    /// Parse a tag value. Surrounding whitespace and NUL padding are ignored.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        match trimmed {
            "MONOCHROME1" => Self::Monochrome1,
            "MONOCHROME2" => Self::Monochrome2,
            "RGB" => Self::Rgb,
            "PALETTE COLOR" => Self::PaletteColor,
            "YBR_FULL" => Self::YbrFull,
            "YBR_FULL_422" => Self::YbrFull422,
            "YBR_PARTIAL_422" => Self::YbrPartial422,
            "YBR_ICT" => Self::YbrIct,
            "YBR_RCT" => Self::YbrRct,
            other => Self::Other(other.to_string()),
        }
    }

    /// Tag value as it appears in the source encoding.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Monochrome1 => "MONOCHROME1",
            Self::Monochrome2 => "MONOCHROME2",
            Self::Rgb => "RGB",
            Self::PaletteColor => "PALETTE COLOR",
            Self::YbrFull => "YBR_FULL",
            Self::YbrFull422 => "YBR_FULL_422",
            Self::YbrPartial422 => "YBR_PARTIAL_422",
            Self::YbrIct => "YBR_ICT",
            Self::YbrRct => "YBR_RCT",
            Self::Other(value) => value,
        }
    }

    /// Whether samples are true color (RGB or one of the YBR encodings).
    ///
    /// Palette color is stored as single-channel indices and is not counted.
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            Self::Rgb
                | Self::YbrFull
                | Self::YbrFull422
                | Self::YbrPartial422
                | Self::YbrIct
                | Self::YbrRct
        )
    }

    /// Whether the grayscale display is inverted.
    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::Monochrome1)
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PhotometricInterpretation {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for PhotometricInterpretation {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<PhotometricInterpretation> for String {
    fn from(value: PhotometricInterpretation) -> Self {
        value.as_str().to_string()
    }
}

// =============================================================================
// Descriptive Attributes
// =============================================================================

/// Descriptive fields only consulted by the metadata resolver.
///
/// Every field is optional; the resolver substitutes a documented default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DescriptiveAttributes {
    pub modality: Option<String>,
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    #[serde(rename = "studyInstanceUID")]
    pub study_instance_uid: Option<String>,
    pub study_date: Option<String>,
    pub study_time: Option<String>,
    #[serde(rename = "seriesInstanceUID")]
    pub series_instance_uid: Option<String>,
    pub series_number: Option<i32>,
}

// =============================================================================
// DatasetRecord
// =============================================================================

/// One ingested multi-frame dataset.
///
/// Records are shared as `Arc<DatasetRecord>` once stored and are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRecord {
    /// Key the record is stored under
    pub source_id: String,

    /// All frames' raw samples, contiguous
    pub buffer: Bytes,

    /// Byte offset in `buffer` where frame 0 begins
    pub pixel_data_offset: usize,

    pub number_of_frames: u32,
    pub rows: u32,
    pub columns: u32,

    /// Physical spacing as `[row, column]`
    pub pixel_spacing: [f64; 2],

    pub slice_thickness: f64,

    /// Candidate window from the source metadata, if any
    pub window_center: Option<f64>,
    pub window_width: Option<f64>,

    pub rescale_slope: f64,
    pub rescale_intercept: f64,

    /// Storage width per sample, 8 or 16
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub high_bit: u16,

    /// 0 = unsigned, 1 = signed
    pub pixel_representation: u16,

    pub photometric_interpretation: PhotometricInterpretation,
    pub samples_per_pixel: u16,

    /// Planar configuration element, when the source carried one
    pub planar_configuration: Option<u16>,

    pub descriptive: DescriptiveAttributes,
}

impl DatasetRecord {
    /// Create a single-channel MONOCHROME2 record with neutral defaults.
    ///
    /// Spacing and thickness default to 1.0, rescale to identity, and
    /// bits stored / high bit follow `bits_allocated`.
    pub fn new(
        source_id: impl Into<String>,
        buffer: impl Into<Bytes>,
        rows: u32,
        columns: u32,
        number_of_frames: u32,
        bits_allocated: u16,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            buffer: buffer.into(),
            pixel_data_offset: 0,
            number_of_frames,
            rows,
            columns,
            pixel_spacing: [1.0, 1.0],
            slice_thickness: 1.0,
            window_center: None,
            window_width: None,
            rescale_slope: 1.0,
            rescale_intercept: 0.0,
            bits_allocated,
            bits_stored: bits_allocated,
            high_bit: bits_allocated.saturating_sub(1),
            pixel_representation: 0,
            photometric_interpretation: PhotometricInterpretation::Monochrome2,
            samples_per_pixel: 1,
            planar_configuration: None,
            descriptive: DescriptiveAttributes::default(),
        }
    }

    /// Set the byte offset of frame 0.
    pub fn with_pixel_data_offset(mut self, offset: usize) -> Self {
        self.pixel_data_offset = offset;
        self
    }

    /// Set the candidate window.
    pub fn with_window(mut self, center: f64, width: f64) -> Self {
        self.window_center = Some(center);
        self.window_width = Some(width);
        self
    }

    /// Set the modality rescale transform.
    pub fn with_rescale(mut self, slope: f64, intercept: f64) -> Self {
        self.rescale_slope = slope;
        self.rescale_intercept = intercept;
        self
    }

    /// Mark samples as signed (pixel representation 1) or unsigned (0).
    pub fn with_signed_samples(mut self, signed: bool) -> Self {
        self.pixel_representation = u16::from(signed);
        self
    }

    pub fn with_photometric_interpretation(
        mut self,
        interpretation: impl Into<PhotometricInterpretation>,
    ) -> Self {
        self.photometric_interpretation = interpretation.into();
        self
    }

    pub fn with_samples_per_pixel(mut self, samples: u16) -> Self {
        self.samples_per_pixel = samples;
        self
    }

    pub fn with_pixel_spacing(mut self, row: f64, column: f64) -> Self {
        self.pixel_spacing = [row, column];
        self
    }

    pub fn with_slice_thickness(mut self, thickness: f64) -> Self {
        self.slice_thickness = thickness;
        self
    }

    pub fn with_descriptive(mut self, descriptive: DescriptiveAttributes) -> Self {
        self.descriptive = descriptive;
        self
    }

    /// Whether samples are two's-complement signed.
    #[inline]
    pub fn is_signed(&self) -> bool {
        self.pixel_representation == 1
    }

    /// Whether frames should be treated as color.
    pub fn is_color(&self) -> bool {
        self.photometric_interpretation.is_color() || self.samples_per_pixel > 1
    }
}
