//! Metadata provider tests through the host registry.
//!
//! Tests verify:
//! - Per-frame geometry projected for stored ids
//! - "No opinion" for foreign schemes, unknown sources and unknown modules
//! - Priority ordering against a lower-priority fallback provider

use std::sync::Arc;

use multiframe_loader::metadata::{ImagePlaneModule, ModuleType, PatientModule};
use multiframe_loader::{
    cleanup_multiframe_loader, register_multiframe_loader, DatasetStore, DescriptiveAttributes,
    ImageLoaderRegistry, MetadataProvider, MetadataRegistry, MetadataValue, TruncationPolicy,
};

use super::test_utils::ct_volume;

struct Fallback;

impl MetadataProvider for Fallback {
    fn metadata(&self, module_type: &str, _image_id: &str) -> MetadataValue {
        match module_type {
            "patientModule" => MetadataValue::Patient(PatientModule {
                patient_name: "Fallback".into(),
                patient_id: "F".into(),
            }),
            _ => MetadataValue::NotApplicable,
        }
    }
}

fn host() -> (Arc<DatasetStore>, MetadataRegistry) {
    let store = Arc::new(DatasetStore::new());
    let loaders = ImageLoaderRegistry::new();
    let metadata = MetadataRegistry::new();
    metadata.add_provider(Arc::new(Fallback), 0);
    register_multiframe_loader(
        Arc::clone(&store),
        TruncationPolicy::default(),
        &loaders,
        &metadata,
    );
    (store, metadata)
}

#[test]
fn test_foreign_scheme_falls_through() {
    let (store, metadata) = host();
    store.put("x", ct_volume("x"));

    for module in ModuleType::ALL {
        let value = metadata.get(module.as_str(), "unknownscheme:x:0");
        if module == ModuleType::Patient {
            assert_eq!(
                value,
                MetadataValue::Patient(PatientModule {
                    patient_name: "Fallback".into(),
                    patient_id: "F".into(),
                })
            );
        } else {
            assert_eq!(value, MetadataValue::NotApplicable);
        }
    }
}

#[test]
fn test_multiframe_provider_wins_for_own_ids() {
    let (store, metadata) = host();
    store.put("ct", ct_volume("ct"));

    assert_eq!(
        metadata.get("patientModule", "multiframe:ct:0"),
        MetadataValue::Patient(PatientModule {
            patient_name: "Anonymous".into(),
            patient_id: "Unknown".into(),
        })
    );
}

#[test]
fn test_image_plane_tracks_frame_index() {
    let (store, metadata) = host();
    store.put("ct", ct_volume("ct"));

    let locations: Vec<f64> = (0..3)
        .map(|i| match metadata.get("imagePlaneModule", &format!("multiframe:ct:{}", i)) {
            MetadataValue::ImagePlane(ImagePlaneModule { slice_location, .. }) => slice_location,
            other => panic!("expected image plane, got {:?}", other),
        })
        .collect();
    assert_eq!(locations, vec![0.0, 2.0, 4.0]);
}

#[test]
fn test_metadata_beyond_frame_count_still_projected() {
    let (store, metadata) = host();
    store.put("ct", ct_volume("ct"));

    let value = metadata.get("generalImageModule", "multiframe:ct:10");
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json["instanceNumber"], 11);
}

#[test]
fn test_json_shapes() {
    let (store, metadata) = host();
    let record = ct_volume("ct").with_descriptive(DescriptiveAttributes {
        modality: Some("CT".into()),
        study_instance_uid: Some("1.2.3".into()),
        ..Default::default()
    });
    store.put("ct", record);

    let pixel = serde_json::to_value(metadata.get("imagePixelModule", "multiframe:ct:0")).unwrap();
    assert_eq!(pixel["bitsAllocated"], 16);
    assert_eq!(pixel["pixelRepresentation"], 1);
    assert_eq!(pixel["photometricInterpretation"], "MONOCHROME2");

    let plane = serde_json::to_value(metadata.get("imagePlaneModule", "multiframe:ct:1")).unwrap();
    assert_eq!(plane["imagePositionPatient"], serde_json::json!([0.0, 0.0, 2.0]));
    assert_eq!(
        plane["imageOrientationPatient"],
        serde_json::json!([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    );

    let study =
        serde_json::to_value(metadata.get("generalStudyModule", "multiframe:ct:0")).unwrap();
    assert_eq!(study["studyInstanceUID"], "1.2.3");
    assert_eq!(study["studyDate"], "");

    let voi = serde_json::to_value(metadata.get("voiLutModule", "multiframe:ct:0")).unwrap();
    assert_eq!(voi["windowCenter"], serde_json::json!([40.0]));
    assert_eq!(voi["windowWidth"], serde_json::json!([400.0]));
}

#[test]
fn test_cleanup_withdraws_answers() {
    let (store, metadata) = host();
    store.put("ct", ct_volume("ct"));
    assert!(metadata.get("voiLutModule", "multiframe:ct:0").is_applicable());

    cleanup_multiframe_loader(&store);

    assert_eq!(
        metadata.get("voiLutModule", "multiframe:ct:0"),
        MetadataValue::NotApplicable
    );
}
