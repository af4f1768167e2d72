//! Metadata resolver: projects stored datasets into module shapes.

use std::sync::Arc;

use crate::dataset::{DatasetRecord, DatasetStore};
use crate::format::FrameImageId;

use super::modules::{
    GeneralImageModule, GeneralSeriesModule, GeneralStudyModule, ImagePixelModule,
    ImagePlaneModule, MetadataValue, ModalityLutModule, ModuleType, PatientModule, VoiLutModule,
};

/// Direction cosines of an axial slice: row along +x, column along +y.
pub const AXIAL_ORIENTATION: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

pub const DEFAULT_MODALITY: &str = "CT";
pub const DEFAULT_SERIES_NUMBER: i32 = 1;
pub const DEFAULT_PATIENT_NAME: &str = "Anonymous";
pub const DEFAULT_PATIENT_ID: &str = "Unknown";
pub const PIXEL_ASPECT_RATIO: &str = "1:1";
pub const RESCALE_TYPE: &str = "HU";

/// Answers metadata queries for `multiframe:` image ids.
///
/// Never fails: anything it cannot answer yields [`MetadataValue::NotApplicable`].
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    store: Arc<DatasetStore>,
}

impl MetadataResolver {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }

    /// Resolve a module by its host name for an image id string.
    pub fn resolve(&self, module_type: &str, image_id: &str) -> MetadataValue {
        let Ok(id) = FrameImageId::parse(image_id) else {
            return MetadataValue::NotApplicable;
        };
        let Some(record) = self.store.get(&id.source_id) else {
            return MetadataValue::NotApplicable;
        };
        match ModuleType::parse(module_type) {
            Some(module) => project(&record, module, &id),
            None => MetadataValue::NotApplicable,
        }
    }

    /// Resolve a typed module for a parsed id.
    pub fn resolve_module(&self, module: ModuleType, id: &FrameImageId) -> MetadataValue {
        match self.store.get(&id.source_id) {
            Some(record) => project(&record, module, id),
            None => MetadataValue::NotApplicable,
        }
    }
}

/// Treat empty or whitespace-only strings as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Project a record into one module for the frame `id` names.
///
/// Derived UIDs use the source id of `id`, which is the store key.
pub fn project(record: &DatasetRecord, module: ModuleType, id: &FrameImageId) -> MetadataValue {
    let d = &record.descriptive;
    let frame_index = id.frame_index;
    match module {
        ModuleType::ImagePixel => MetadataValue::ImagePixel(ImagePixelModule {
            samples_per_pixel: record.samples_per_pixel,
            photometric_interpretation: record.photometric_interpretation.to_string(),
            rows: record.rows,
            columns: record.columns,
            bits_allocated: record.bits_allocated,
            bits_stored: record.bits_stored,
            high_bit: record.high_bit,
            pixel_representation: record.pixel_representation,
            planar_configuration: record.planar_configuration,
            pixel_aspect_ratio: PIXEL_ASPECT_RATIO.to_string(),
        }),
        ModuleType::ModalityLut => MetadataValue::ModalityLut(ModalityLutModule {
            rescale_intercept: record.rescale_intercept,
            rescale_slope: record.rescale_slope,
            rescale_type: RESCALE_TYPE.to_string(),
        }),
        ModuleType::VoiLut => MetadataValue::VoiLut(VoiLutModule {
            window_center: vec![record.window_center],
            window_width: vec![record.window_width],
        }),
        ModuleType::ImagePlane => {
            let z = frame_index as f64 * record.slice_thickness;
            MetadataValue::ImagePlane(ImagePlaneModule {
                pixel_spacing: record.pixel_spacing,
                slice_thickness: record.slice_thickness,
                slice_location: z,
                image_position_patient: [0.0, 0.0, z],
                image_orientation_patient: AXIAL_ORIENTATION,
                columns: record.columns,
                rows: record.rows,
            })
        }
        ModuleType::GeneralImage => MetadataValue::GeneralImage(GeneralImageModule {
            instance_number: frame_index.saturating_add(1),
        }),
        ModuleType::GeneralSeries => MetadataValue::GeneralSeries(GeneralSeriesModule {
            modality: non_empty(&d.modality)
                .unwrap_or(DEFAULT_MODALITY)
                .to_string(),
            series_instance_uid: non_empty(&d.series_instance_uid)
                .map(str::to_string)
                .unwrap_or_else(|| format!("series_{}", id.source_id)),
            series_number: d
                .series_number
                .filter(|n| *n != 0)
                .unwrap_or(DEFAULT_SERIES_NUMBER),
        }),
        ModuleType::GeneralStudy => MetadataValue::GeneralStudy(GeneralStudyModule {
            study_instance_uid: non_empty(&d.study_instance_uid)
                .map(str::to_string)
                .unwrap_or_else(|| format!("study_{}", id.source_id)),
            study_date: non_empty(&d.study_date).unwrap_or_default().to_string(),
            study_time: non_empty(&d.study_time).unwrap_or_default().to_string(),
        }),
        ModuleType::Patient => MetadataValue::Patient(PatientModule {
            patient_name: non_empty(&d.patient_name)
                .unwrap_or(DEFAULT_PATIENT_NAME)
                .to_string(),
            patient_id: non_empty(&d.patient_id)
                .unwrap_or(DEFAULT_PATIENT_ID)
                .to_string(),
        }),
    }
}
