//! Loader pipeline tests: ingestion through decoded frames.
//!
//! Tests verify:
//! - Frame extraction, sample reconstruction and windowing end to end
//! - Error taxonomy surfaced by the load promise
//! - Truncation behavior under both policies
//! - Manifest ingestion feeding the loader

use std::sync::Arc;

use multiframe_loader::format::FrameLayout;
use multiframe_loader::{
    ingest_manifest, register_multiframe_loader, store_dicom_data, DatasetRecord, DatasetStore,
    ImageLoaderRegistry, LoadError, LoaderFacade, MetadataRegistry, PhotometricInterpretation,
    PixelData, TruncationPolicy,
};

use super::test_utils::{
    ct_sample, ct_volume, ct_volume_bytes, mono8_volume, store_with, ManifestFixture,
};

// =============================================================================
// Decoding
// =============================================================================

#[tokio::test]
async fn test_every_frame_decodes_to_its_own_samples() {
    let loader = LoaderFacade::new(store_with(vec![ct_volume("ct")]));

    for frame_index in 0..3usize {
        let frame = loader
            .load_frame(&format!("multiframe:ct:{}", frame_index))
            .await
            .unwrap();

        let expected: Vec<i16> = (0..16).map(|p| ct_sample(frame_index, p)).collect();
        assert_eq!(frame.pixel_data(), &PixelData::I16(expected));
        assert_eq!(frame.min_pixel_value, i32::from(ct_sample(frame_index, 0)));
        assert_eq!(frame.max_pixel_value, i32::from(ct_sample(frame_index, 15)));
    }
}

#[tokio::test]
async fn test_frame_length_matches_geometry() {
    let record = DatasetRecord::new("rgb", vec![9u8; 3 * 2 * 5 * 3], 3, 5, 2, 8)
        .with_photometric_interpretation(PhotometricInterpretation::Rgb)
        .with_samples_per_pixel(3);
    let layout = FrameLayout::for_frame(&record, 1).unwrap();
    assert_eq!(layout.frame_byte_length, 3 * 5 * 3);
    assert_eq!(layout.frame_offset, 3 * 5 * 3);

    let loader = LoaderFacade::new(store_with(vec![record]));
    let frame = loader.load_frame("multiframe:rgb:1").await.unwrap();
    assert_eq!(frame.pixel_data().len(), 45);
    assert!(frame.color);
}

#[tokio::test]
async fn test_pixel_data_offset_respected() {
    let mut bytes = vec![0xAAu8; 128];
    bytes.extend(ct_volume_bytes(4, 4, 3));
    let record = DatasetRecord::new("ct", bytes, 4, 4, 3, 16)
        .with_signed_samples(true)
        .with_pixel_data_offset(128);
    let loader = LoaderFacade::new(store_with(vec![record]));

    let frame = loader.load_frame("multiframe:ct:1").await.unwrap();
    assert_eq!(frame.pixel_data().get(0), Some(i32::from(ct_sample(1, 0))));
}

#[tokio::test]
async fn test_unsigned_16bit_reading() {
    let bytes: Vec<u8> = [0u16, 65535, 4096, 12]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let loader = LoaderFacade::new(store_with(vec![DatasetRecord::new("u16", bytes, 2, 2, 1, 16)]));

    let frame = loader.load_frame("multiframe:u16:0").await.unwrap();
    assert_eq!(frame.pixel_data(), &PixelData::U16(vec![0, 65535, 4096, 12]));
    assert_eq!(frame.data_type, "Uint16Array");
    assert_eq!(frame.max_pixel_value, 65535);
}

#[tokio::test]
async fn test_window_kept_for_ct_volume() {
    // Every frame spans 1500 units; 40/400 stays plausible throughout
    let loader = LoaderFacade::new(store_with(vec![ct_volume("ct")]));
    for index in 0..3 {
        let frame = loader
            .load_frame(&format!("multiframe:ct:{}", index))
            .await
            .unwrap();
        assert!(!frame.window_recomputed);
        assert_eq!((frame.window_center, frame.window_width), (40.0, 400.0));
    }
}

#[tokio::test]
async fn test_implausible_window_recomputed() {
    // Frame 0 spans [-1024, 476]; a center of 5000 is past 476 + 1500
    let record = ct_volume("ct").with_window(5000.0, 400.0);
    let loader = LoaderFacade::new(store_with(vec![record]));
    let frame = loader.load_frame("multiframe:ct:0").await.unwrap();

    assert!(frame.window_recomputed);
    assert_eq!(frame.window_center, -274.0);
    assert!((frame.window_width - 1800.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_monochrome1_inverts() {
    let record = mono8_volume("m1", 2, 2, 1)
        .with_photometric_interpretation(PhotometricInterpretation::parse("MONOCHROME1"));
    let loader = LoaderFacade::new(store_with(vec![record]));

    let frame = loader.load_frame("multiframe:m1:0").await.unwrap();
    assert!(frame.invert);
    assert!(!frame.color);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_malformed_ids() {
    let loader = LoaderFacade::new(store_with(vec![ct_volume("ct")]));

    for id in [
        "multiframe:abc",
        "other:abc:0",
        "multiframe:ct:0:1",
        "multiframe:ct:first",
        "",
    ] {
        let err = loader.load_frame(id).await.unwrap_err();
        assert!(
            matches!(err, LoadError::InvalidImageId { .. }),
            "{:?} should be invalid, got {:?}",
            id,
            err
        );
    }
}

#[tokio::test]
async fn test_out_of_range_frames() {
    let loader = LoaderFacade::new(store_with(vec![ct_volume("src1")]));

    for index in ["3", "5", "-1"] {
        let err = loader
            .load_frame(&format!("multiframe:src1:{}", index))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::FrameIndexOutOfRange {
                number_of_frames: 3,
                ..
            }
        ));
    }
}

#[tokio::test]
async fn test_missing_pixel_buffer() {
    let loader = LoaderFacade::new(store_with(vec![DatasetRecord::new(
        "empty",
        Vec::<u8>::new(),
        2,
        2,
        1,
        8,
    )]));
    let err = loader.load_frame("multiframe:empty:0").await.unwrap_err();
    assert_eq!(
        err,
        LoadError::MissingPixelBuffer {
            source_id: "empty".into()
        }
    );
}

#[tokio::test]
async fn test_unsupported_bits() {
    let loader = LoaderFacade::new(store_with(vec![DatasetRecord::new(
        "b12",
        vec![0u8; 8],
        2,
        2,
        1,
        12,
    )]));
    let err = loader.load_frame("multiframe:b12:0").await.unwrap_err();
    assert_eq!(err, LoadError::UnsupportedEncoding { bits_allocated: 12 });
}

// =============================================================================
// Truncation
// =============================================================================

#[tokio::test]
async fn test_short_buffer_zero_filled() {
    // Drop the last 6 bytes of frame 2
    let mut bytes = ct_volume_bytes(4, 4, 3);
    bytes.truncate(bytes.len() - 6);
    let record = DatasetRecord::new("ct", bytes, 4, 4, 3, 16).with_signed_samples(true);
    let loader = LoaderFacade::new(store_with(vec![record]));

    let frame = loader.load_frame("multiframe:ct:2").await.unwrap();
    assert_eq!(frame.pixel_data().len(), 16);
    assert_eq!(frame.size_in_bytes, 32);
    assert_eq!(frame.pixel_data().get(12), Some(i32::from(ct_sample(2, 12))));
    for p in 13..16 {
        assert_eq!(frame.pixel_data().get(p), Some(0));
    }
}

#[tokio::test]
async fn test_frame_entirely_past_buffer() {
    // numberOfFrames says 3 but only one frame is present
    let record = mono8_volume("m", 2, 2, 1);
    let record = DatasetRecord {
        number_of_frames: 3,
        ..record
    };
    let loader = LoaderFacade::new(store_with(vec![record]));

    let frame = loader.load_frame("multiframe:m:2").await.unwrap();
    assert_eq!(frame.pixel_data(), &PixelData::U8(vec![0; 4]));
}

#[tokio::test]
async fn test_strict_policy_rejects_short_frame() {
    let mut bytes = ct_volume_bytes(4, 4, 3);
    bytes.truncate(bytes.len() - 6);
    let record = DatasetRecord::new("ct", bytes, 4, 4, 3, 16).with_signed_samples(true);
    let loader = LoaderFacade::with_policy(store_with(vec![record]), TruncationPolicy::Strict);

    assert!(loader.load_frame("multiframe:ct:1").await.is_ok());
    let err = loader.load_frame("multiframe:ct:2").await.unwrap_err();
    assert_eq!(
        err,
        LoadError::FrameTruncated {
            frame_index: 2,
            offset: 64,
            required: 32,
            available: 26,
        }
    );
}

// =============================================================================
// Ingestion and Host Registration
// =============================================================================

#[tokio::test]
async fn test_manifest_ingestion_feeds_loader() {
    let dir = tempfile::tempdir().unwrap();
    let buffer = ct_volume_bytes(4, 4, 3);
    let path = ManifestFixture::new("disk", &buffer, 4, 4, 3)
        .with_bits_allocated(16)
        .with_extra(r#", "pixelRepresentation": 1, "rescaleIntercept": -1024, "modality": "CT""#)
        .write(dir.path());

    let store = Arc::new(DatasetStore::new());
    let source_id = ingest_manifest(&store, &path).await.unwrap();
    assert_eq!(source_id, "disk");

    let loader = LoaderFacade::new(Arc::clone(&store));
    let frame = loader.load_frame("multiframe:disk:2").await.unwrap();
    assert_eq!(frame.pixel_data().get(0), Some(i32::from(ct_sample(2, 0))));
    assert_eq!(frame.rescale_intercept, -1024.0);
}

#[tokio::test]
async fn test_host_registration_round_trip() {
    let store = Arc::new(DatasetStore::new());
    let loaders = ImageLoaderRegistry::new();
    let metadata = MetadataRegistry::new();
    register_multiframe_loader(
        Arc::clone(&store),
        TruncationPolicy::default(),
        &loaders,
        &metadata,
    );

    // Datasets stored after registration are visible to the loader
    store_dicom_data(&store, "late", mono8_volume("late", 2, 2, 2));

    let frame = loaders
        .load("multiframe:late:1")
        .unwrap()
        .resolve()
        .await
        .unwrap();
    assert_eq!(frame.pixel_data(), &PixelData::U8(vec![2; 4]));
}

#[tokio::test]
async fn test_replacing_a_source() {
    let store = store_with(vec![mono8_volume("s", 2, 2, 1)]);
    let loader = LoaderFacade::new(Arc::clone(&store));
    assert_eq!(
        loader.load_frame("multiframe:s:0").await.unwrap().max_pixel_value,
        1
    );

    let replacement = DatasetRecord::new("s", vec![200u8; 4], 2, 2, 1, 8);
    store.put("s", replacement);
    assert_eq!(
        loader.load_frame("multiframe:s:0").await.unwrap().max_pixel_value,
        200
    );
}
