//! API integration tests for frame and metadata retrieval.
//!
//! Tests verify:
//! - Raw frame responses and their headers
//! - Frame descriptions and metadata modules as JSON
//! - Error responses for each load failure
//! - Source listing and teardown

use axum::http::StatusCode;
use http_body_util::BodyExt;
use tower::ServiceExt;

use multiframe_loader::{DatasetRecord, TruncationPolicy};

use super::test_utils::{
    ct_sample, ct_volume, delete, get, mono8_volume, store_with, test_router,
    test_router_with_policy,
};

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Health and Sources
// =============================================================================

#[tokio::test]
async fn test_health() {
    let router = test_router(store_with(vec![]));
    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_sources_listing_sorted() {
    let router = test_router(store_with(vec![ct_volume("b"), mono8_volume("a", 2, 2, 5)]));
    let response = router.oneshot(get("/sources")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let sources = json["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["source_id"], "a");
    assert_eq!(sources[0]["number_of_frames"], 5);
    assert_eq!(sources[1]["source_id"], "b");
    assert_eq!(sources[1]["bits_allocated"], 16);
}

#[tokio::test]
async fn test_delete_sources_tears_down() {
    let store = store_with(vec![ct_volume("ct")]);
    let router = test_router(store.clone());

    let response = router.clone().oneshot(delete("/sources")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["cleared"], 1);
    assert!(store.is_empty());

    let response = router.oneshot(get("/frames/multiframe:ct:0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Frames
// =============================================================================

#[tokio::test]
async fn test_frame_bytes_and_headers() {
    let router = test_router(store_with(vec![ct_volume("ct")]));
    let response = router.oneshot(get("/frames/multiframe:ct:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/octet-stream");
    assert!(headers.contains_key("cache-control"));
    assert_eq!(headers["x-frame-rows"], "4");
    assert_eq!(headers["x-frame-columns"], "4");
    assert_eq!(headers["x-frame-data-type"], "Int16Array");
    assert_eq!(headers["x-frame-window-center"], "40");
    assert_eq!(headers["x-frame-window-width"], "400");
    assert_eq!(headers["x-frame-invert"], "false");
    assert_eq!(
        headers["x-frame-min-pixel-value"],
        ct_sample(1, 0).to_string().as_str()
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.len(), 32);
    let first = i16::from_le_bytes([body[0], body[1]]);
    assert_eq!(first, ct_sample(1, 0));
}

#[tokio::test]
async fn test_frame_info_json() {
    let router = test_router(store_with(vec![ct_volume("ct")]));
    let response = router
        .oneshot(get("/frames/multiframe:ct:2/info"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["imageId"], "multiframe:ct:2");
    assert_eq!(json["width"], 4);
    assert_eq!(json["columnPixelSpacing"], 0.7);
    assert_eq!(json["sliceThickness"], 2.0);
    assert_eq!(json["voiLutFunction"], "LINEAR");
    assert_eq!(json["color"], false);
    assert_eq!(json["sizeInBytes"], 32);
    assert!(json.get("pixelData").is_none());
}

#[tokio::test]
async fn test_frame_errors() {
    let store = store_with(vec![
        ct_volume("ct"),
        DatasetRecord::new("b32", vec![0u8; 16], 2, 2, 1, 32),
        DatasetRecord::new("empty", Vec::<u8>::new(), 2, 2, 1, 8),
    ]);
    let router = test_router(store);

    let cases = [
        ("/frames/multiframe:ct", StatusCode::BAD_REQUEST, "invalid_image_id"),
        ("/frames/other:ct:0", StatusCode::BAD_REQUEST, "invalid_image_id"),
        ("/frames/multiframe:nope:0", StatusCode::NOT_FOUND, "not_found"),
        ("/frames/multiframe:ct:5", StatusCode::BAD_REQUEST, "frame_out_of_range"),
        (
            "/frames/multiframe:b32:0",
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_encoding",
        ),
        (
            "/frames/multiframe:empty:0",
            StatusCode::INTERNAL_SERVER_ERROR,
            "missing_pixel_data",
        ),
    ];

    for (uri, status, error_type) in cases {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), status, "{}", uri);

        let json = json_body(response).await;
        assert_eq!(json["error"], error_type, "{}", uri);
        assert_eq!(json["status"], status.as_u16());
    }
}

#[tokio::test]
async fn test_strict_policy_over_http() {
    let record = DatasetRecord::new("t", vec![1u8, 2, 3, 4, 5, 6], 2, 2, 2, 8);

    let lenient = test_router(store_with(vec![record.clone()]));
    let response = lenient.oneshot(get("/frames/multiframe:t:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], &[5, 6, 0, 0]);

    let strict = test_router_with_policy(store_with(vec![record]), TruncationPolicy::Strict);
    let response = strict.oneshot(get("/frames/multiframe:t:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "frame_truncated");
}

// =============================================================================
// Metadata
// =============================================================================

#[tokio::test]
async fn test_metadata_module() {
    let router = test_router(store_with(vec![ct_volume("ct")]));
    let response = router
        .oneshot(get("/metadata/imagePlaneModule/multiframe:ct:2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["sliceLocation"], 4.0);
    assert_eq!(json["pixelSpacing"], serde_json::json!([0.7, 0.7]));
}

#[tokio::test]
async fn test_metadata_not_applicable() {
    let router = test_router(store_with(vec![ct_volume("ct")]));

    for uri in [
        "/metadata/imagePlaneModule/unknownscheme:x:0",
        "/metadata/imagePlaneModule/multiframe:missing:0",
        "/metadata/overlayModule/multiframe:ct:0",
    ] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json_body(response).await["error"], "not_applicable");
    }
}
