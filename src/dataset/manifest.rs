//! Descriptor-based dataset ingestion.
//!
//! A manifest is a JSON document describing an already-parsed dataset: the path
//! to a raw buffer file plus the encoding attributes a [`DatasetRecord`] needs.
//! This is the ingestion side of the store contract; it reads bytes and
//! attributes as given and does not interpret any DICOM structure.
//!
//! ```json
//! {
//!   "sourceId": "ct-chest",
//!   "buffer": "ct-chest.raw",
//!   "pixelDataOffset": 1024,
//!   "numberOfFrames": 120,
//!   "rows": 512,
//!   "columns": 512,
//!   "pixelSpacing": [0.7, 0.7],
//!   "sliceThickness": 1.25,
//!   "windowCenter": 40,
//!   "windowWidth": 400,
//!   "rescaleSlope": 1,
//!   "rescaleIntercept": -1024,
//!   "bitsAllocated": 16,
//!   "bitsStored": 12,
//!   "highBit": 11,
//!   "pixelRepresentation": 1,
//!   "photometricInterpretation": "MONOCHROME2",
//!   "samplesPerPixel": 1,
//!   "modality": "CT"
//! }
//! ```
//!
//! A relative `buffer` path is resolved against the manifest's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::ManifestError;

use super::record::{DatasetRecord, DescriptiveAttributes, PhotometricInterpretation};
use super::store::DatasetStore;

fn default_spacing() -> [f64; 2] {
    [1.0, 1.0]
}

fn default_one() -> f64 {
    1.0
}

fn default_samples_per_pixel() -> u16 {
    1
}

/// On-disk description of one dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetManifest {
    pub source_id: String,

    /// Raw buffer file, relative to the manifest unless absolute
    pub buffer: PathBuf,

    #[serde(default)]
    pub pixel_data_offset: usize,

    pub number_of_frames: u32,
    pub rows: u32,
    pub columns: u32,

    #[serde(default = "default_spacing")]
    pub pixel_spacing: [f64; 2],

    #[serde(default = "default_one")]
    pub slice_thickness: f64,

    #[serde(default)]
    pub window_center: Option<f64>,

    #[serde(default)]
    pub window_width: Option<f64>,

    #[serde(default = "default_one")]
    pub rescale_slope: f64,

    #[serde(default)]
    pub rescale_intercept: f64,

    pub bits_allocated: u16,

    #[serde(default)]
    pub bits_stored: Option<u16>,

    #[serde(default)]
    pub high_bit: Option<u16>,

    #[serde(default)]
    pub pixel_representation: u16,

    #[serde(default)]
    pub photometric_interpretation: PhotometricInterpretation,

    #[serde(default = "default_samples_per_pixel")]
    pub samples_per_pixel: u16,

    #[serde(default)]
    pub planar_configuration: Option<u16>,

    #[serde(flatten)]
    pub descriptive: DescriptiveAttributes,
}

impl DatasetManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str, path: &Path) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse a manifest file.
    pub async fn read(path: &Path) -> Result<Self, ManifestError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ManifestError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_json(&json, path)
    }

    /// Check the attributes a record cannot do without.
    ///
    /// Encoding support (bits allocated) is left to the loader, which reports
    /// it per frame.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.source_id.is_empty() {
            return Err(ManifestError::InvalidAttribute {
                field: "sourceId",
                message: "must not be empty".to_string(),
            });
        }
        if self.source_id.contains(':') {
            return Err(ManifestError::InvalidAttribute {
                field: "sourceId",
                message: "must not contain ':'".to_string(),
            });
        }
        for (field, value) in [
            ("numberOfFrames", self.number_of_frames),
            ("rows", self.rows),
            ("columns", self.columns),
            ("samplesPerPixel", u32::from(self.samples_per_pixel)),
        ] {
            if value == 0 {
                return Err(ManifestError::InvalidAttribute {
                    field,
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if self.pixel_spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ManifestError::InvalidAttribute {
                field: "pixelSpacing",
                message: format!("must be positive, got {:?}", self.pixel_spacing),
            });
        }
        if self.pixel_representation > 1 {
            return Err(ManifestError::InvalidAttribute {
                field: "pixelRepresentation",
                message: format!("must be 0 or 1, got {}", self.pixel_representation),
            });
        }
        Ok(())
    }

    /// Build a record around an already-read buffer.
    pub fn into_record(self, buffer: Vec<u8>) -> DatasetRecord {
        let bits_stored = self.bits_stored.unwrap_or(self.bits_allocated);
        DatasetRecord {
            source_id: self.source_id,
            buffer: buffer.into(),
            pixel_data_offset: self.pixel_data_offset,
            number_of_frames: self.number_of_frames,
            rows: self.rows,
            columns: self.columns,
            pixel_spacing: self.pixel_spacing,
            slice_thickness: self.slice_thickness,
            window_center: self.window_center,
            window_width: self.window_width,
            rescale_slope: self.rescale_slope,
            rescale_intercept: self.rescale_intercept,
            bits_allocated: self.bits_allocated,
            bits_stored,
            high_bit: self.high_bit.unwrap_or(bits_stored.saturating_sub(1)),
            pixel_representation: self.pixel_representation,
            photometric_interpretation: self.photometric_interpretation,
            samples_per_pixel: self.samples_per_pixel,
            planar_configuration: self.planar_configuration,
            descriptive: self.descriptive,
        }
    }
}

/// Resolve the buffer path of a manifest found at `manifest_path`.
fn resolve_buffer_path(manifest_path: &Path, buffer: &Path) -> PathBuf {
    if buffer.is_absolute() {
        return buffer.to_path_buf();
    }
    manifest_path
        .parent()
        .map(|dir| dir.join(buffer))
        .unwrap_or_else(|| buffer.to_path_buf())
}

/// Read a manifest and its buffer into a [`DatasetRecord`].
pub async fn load_manifest(path: &Path) -> Result<DatasetRecord, ManifestError> {
    let manifest = DatasetManifest::read(path).await?;
    manifest.validate()?;

    let buffer_path = resolve_buffer_path(path, &manifest.buffer);
    let buffer = tokio::fs::read(&buffer_path)
        .await
        .map_err(|e| ManifestError::Io {
            path: buffer_path.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(manifest.into_record(buffer))
}

/// Load a manifest and put the resulting record into `store`.
///
/// Returns the source id the record was stored under.
pub async fn ingest_manifest(store: &DatasetStore, path: &Path) -> Result<String, ManifestError> {
    let record = load_manifest(path).await?;
    let source_id = record.source_id.clone();

    info!(
        source_id = %source_id,
        frames = record.number_of_frames,
        rows = record.rows,
        columns = record.columns,
        bits_allocated = record.bits_allocated,
        manifest = %path.display(),
        "Ingested dataset"
    );

    store.put(source_id.clone(), record);
    Ok(source_id)
}
