//! Fixed-shape metadata modules.
//!
//! Field names serialize in the camelCase form the rendering host reads.

use std::fmt;

use serde::Serialize;

/// Kinds of metadata module the host may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleType {
    ImagePixel,
    ModalityLut,
    VoiLut,
    ImagePlane,
    GeneralImage,
    GeneralSeries,
    GeneralStudy,
    Patient,
}

impl ModuleType {
    pub const ALL: [ModuleType; 8] = [
        ModuleType::ImagePixel,
        ModuleType::ModalityLut,
        ModuleType::VoiLut,
        ModuleType::ImagePlane,
        ModuleType::GeneralImage,
        ModuleType::GeneralSeries,
        ModuleType::GeneralStudy,
        ModuleType::Patient,
    ];

    /// Parse a host module name such as `imagePlaneModule`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImagePixel => "imagePixelModule",
            Self::ModalityLut => "modalityLutModule",
            Self::VoiLut => "voiLutModule",
            Self::ImagePlane => "imagePlaneModule",
            Self::GeneralImage => "generalImageModule",
            Self::GeneralSeries => "generalSeriesModule",
            Self::GeneralStudy => "generalStudyModule",
            Self::Patient => "patientModule",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePixelModule {
    pub samples_per_pixel: u16,
    pub photometric_interpretation: String,
    pub rows: u32,
    pub columns: u32,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub high_bit: u16,
    pub pixel_representation: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planar_configuration: Option<u16>,
    pub pixel_aspect_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalityLutModule {
    pub rescale_intercept: f64,
    pub rescale_slope: f64,
    pub rescale_type: String,
}

/// Single-element window lists; an absent candidate serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiLutModule {
    pub window_center: Vec<Option<f64>>,
    pub window_width: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePlaneModule {
    pub pixel_spacing: [f64; 2],
    pub slice_thickness: f64,
    pub slice_location: f64,
    pub image_position_patient: [f64; 3],
    pub image_orientation_patient: [f64; 6],
    pub columns: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralImageModule {
    pub instance_number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSeriesModule {
    pub modality: String,
    #[serde(rename = "seriesInstanceUID")]
    pub series_instance_uid: String,
    pub series_number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStudyModule {
    #[serde(rename = "studyInstanceUID")]
    pub study_instance_uid: String,
    pub study_date: String,
    pub study_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientModule {
    pub patient_name: String,
    pub patient_id: String,
}

/// Answer to a metadata query.
///
/// `NotApplicable` means "no opinion": the id is not ours, the source is not
/// stored, or the module type is not one this resolver projects. It
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    ImagePixel(ImagePixelModule),
    ModalityLut(ModalityLutModule),
    VoiLut(VoiLutModule),
    ImagePlane(ImagePlaneModule),
    GeneralImage(GeneralImageModule),
    GeneralSeries(GeneralSeriesModule),
    GeneralStudy(GeneralStudyModule),
    Patient(PatientModule),
    NotApplicable,
}

impl MetadataValue {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    /// Module type this value answers, `None` for `NotApplicable`.
    pub fn module_type(&self) -> Option<ModuleType> {
        match self {
            Self::ImagePixel(_) => Some(ModuleType::ImagePixel),
            Self::ModalityLut(_) => Some(ModuleType::ModalityLut),
            Self::VoiLut(_) => Some(ModuleType::VoiLut),
            Self::ImagePlane(_) => Some(ModuleType::ImagePlane),
            Self::GeneralImage(_) => Some(ModuleType::GeneralImage),
            Self::GeneralSeries(_) => Some(ModuleType::GeneralSeries),
            Self::GeneralStudy(_) => Some(ModuleType::GeneralStudy),
            Self::Patient(_) => Some(ModuleType::Patient),
            Self::NotApplicable => None,
        }
    }
}
