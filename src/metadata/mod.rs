//! Per-frame metadata provider.
//!
//! The rendering host probes many module types speculatively for every image
//! id it sees. [`MetadataResolver`] answers the ones it knows for stored
//! `multiframe:` ids and returns [`MetadataValue::NotApplicable`] for the rest,
//! so lower-priority providers get their turn.
//!
//! | module                | fields                                                     |
//! |-----------------------|------------------------------------------------------------|
//! | `imagePixelModule`    | encoding attributes, planar configuration, aspect `1:1`    |
//! | `modalityLutModule`   | rescale slope/intercept, type `HU`                         |
//! | `voiLutModule`        | candidate window center/width as one-element lists         |
//! | `imagePlaneModule`    | spacing, thickness, per-frame location, axial orientation  |
//! | `generalImageModule`  | instance number = frame index + 1                          |
//! | `generalSeriesModule` | modality, series UID, series number                        |
//! | `generalStudyModule`  | study UID, date, time                                      |
//! | `patientModule`       | patient name and id                                        |

mod modules;
mod resolver;

pub use modules::{
    GeneralImageModule, GeneralSeriesModule, GeneralStudyModule, ImagePixelModule,
    ImagePlaneModule, MetadataValue, ModalityLutModule, ModuleType, PatientModule, VoiLutModule,
};
pub use resolver::{
    project, MetadataResolver, AXIAL_ORIENTATION, DEFAULT_MODALITY, DEFAULT_PATIENT_ID,
    DEFAULT_PATIENT_NAME, DEFAULT_SERIES_NUMBER, PIXEL_ASPECT_RATIO, RESCALE_TYPE,
};
