//! HTTP request handlers for the frame and metadata API.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /sources` - List stored datasets
//! - `DELETE /sources` - Drop every stored dataset
//! - `GET /frames/{image_id}` - Raw little-endian samples of one frame
//! - `GET /frames/{image_id}/info` - Frame description as JSON
//! - `GET /metadata/{module_type}/{image_id}` - One metadata module

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::dataset::DatasetStore;
use crate::error::LoadError;
use crate::format::TruncationPolicy;
use crate::loader::{
    cleanup_multiframe_loader, register_multiframe_loader, DecodedFrame, ImageLoaderRegistry,
    MetadataRegistry,
};
use crate::metadata::MetadataValue;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// The server plays the rendering host: it owns the loader and metadata
/// registries and dispatches every request through them.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DatasetStore>,
    pub loaders: Arc<ImageLoaderRegistry>,
    pub metadata: Arc<MetadataRegistry>,

    /// Cache-Control max-age in seconds for frame responses
    pub cache_max_age: u32,
}

impl AppState {
    /// Create state with the multi-frame loader registered against `store`.
    pub fn new(store: Arc<DatasetStore>, policy: TruncationPolicy) -> Self {
        let loaders = Arc::new(ImageLoaderRegistry::new());
        let metadata = Arc::new(MetadataRegistry::new());
        register_multiframe_loader(Arc::clone(&store), policy, &loaders, &metadata);

        Self {
            store,
            loaders,
            metadata,
            cache_max_age: 3600,
        }
    }

    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    async fn load(&self, image_id: &str) -> Result<DecodedFrame, LoadError> {
        self.loaders.load(image_id)?.resolve().await
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_image_id")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Summary of one stored dataset.
#[derive(Debug, Serialize)]
pub struct SourceSummary {
    pub source_id: String,
    pub number_of_frames: u32,
    pub rows: u32,
    pub columns: u32,
    pub bits_allocated: u16,
    pub photometric_interpretation: String,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub sources: Vec<SourceSummary>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    /// Number of datasets dropped
    pub cleared: usize,
}

// =============================================================================
// Error Mapping
// =============================================================================

fn log_and_respond(status: StatusCode, error_type: &str, message: String) -> Response {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else if status == StatusCode::NOT_FOUND {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Resource not found: {}",
            message
        );
    } else {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }

    let error_response = ErrorResponse::with_status(error_type, message, status);
    (status, Json(error_response)).into_response()
}

impl IntoResponse for LoadError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            LoadError::InvalidImageId { .. } => (StatusCode::BAD_REQUEST, "invalid_image_id"),
            LoadError::UnknownSource { .. } => (StatusCode::NOT_FOUND, "not_found"),
            LoadError::FrameIndexOutOfRange { .. } => {
                (StatusCode::BAD_REQUEST, "frame_out_of_range")
            }
            LoadError::UnsupportedEncoding { .. } => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_encoding")
            }
            LoadError::MissingPixelBuffer { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "missing_pixel_data")
            }
            LoadError::FrameTruncated { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "frame_truncated")
            }
        };
        log_and_respond(status, error_type, self.to_string())
    }
}

/// Metadata query no provider could answer.
#[derive(Debug)]
pub struct MetadataNotApplicable {
    pub module_type: String,
    pub image_id: String,
}

impl IntoResponse for MetadataNotApplicable {
    fn into_response(self) -> Response {
        log_and_respond(
            StatusCode::NOT_FOUND,
            "not_applicable",
            format!(
                "No {} metadata for image id: {}",
                self.module_type, self.image_id
            ),
        )
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /sources`
pub async fn sources_handler(State(state): State<AppState>) -> Json<SourcesResponse> {
    let sources = state
        .store
        .source_ids()
        .into_iter()
        .filter_map(|id| state.store.get(&id))
        .map(|record| SourceSummary {
            source_id: record.source_id.clone(),
            number_of_frames: record.number_of_frames,
            rows: record.rows,
            columns: record.columns,
            bits_allocated: record.bits_allocated,
            photometric_interpretation: record.photometric_interpretation.to_string(),
        })
        .collect();

    Json(SourcesResponse { sources })
}

/// `DELETE /sources`
///
/// Teardown hook for a disposed view.
pub async fn clear_sources_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.store.len();
    cleanup_multiframe_loader(&state.store);
    Json(ClearResponse { cleared })
}

/// `GET /frames/{image_id}`
///
/// # Response
///
/// - `200 OK`: raw samples, `Content-Type: application/octet-stream`
/// - `400 Bad Request`: malformed id or frame index out of range
/// - `404 Not Found`: source not stored
/// - `415 Unsupported Media Type`: bits allocated not 8 or 16
/// - `422 Unprocessable Entity`: frame truncated under strict mode
///
/// # Headers
///
/// `X-Frame-*` headers carry dimensions, the sample type, extrema, the
/// resolved window, the rescale and the color/invert flags.
pub async fn frame_handler(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response, LoadError> {
    let frame = state.load(&image_id).await?;

    let mut headers = frame_headers(&frame);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    insert_header(
        &mut headers,
        header::CACHE_CONTROL,
        format!("public, max-age={}", state.cache_max_age),
    );

    let body = frame.into_pixel_data().to_le_bytes();
    Ok((StatusCode::OK, headers, body).into_response())
}

/// `GET /frames/{image_id}/info`
pub async fn frame_info_handler(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<DecodedFrame>, LoadError> {
    Ok(Json(state.load(&image_id).await?))
}

/// `GET /metadata/{module_type}/{image_id}`
///
/// `404 not_applicable` when no provider answers.
pub async fn metadata_handler(
    State(state): State<AppState>,
    Path((module_type, image_id)): Path<(String, String)>,
) -> Result<Json<MetadataValue>, MetadataNotApplicable> {
    match state.metadata.get(&module_type, &image_id) {
        MetadataValue::NotApplicable => Err(MetadataNotApplicable {
            module_type,
            image_id,
        }),
        value => Ok(Json(value)),
    }
}

// =============================================================================
// Frame Headers
// =============================================================================

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: impl Display) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}

fn frame_headers(frame: &DecodedFrame) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let mut put = |name: &'static str, value: &dyn Display| {
        insert_header(&mut headers, HeaderName::from_static(name), value);
    };

    put("x-frame-image-id", &frame.image_id);
    put("x-frame-rows", &frame.rows);
    put("x-frame-columns", &frame.columns);
    put("x-frame-components", &frame.number_of_components);
    put("x-frame-data-type", &frame.data_type);
    put("x-frame-min-pixel-value", &frame.min_pixel_value);
    put("x-frame-max-pixel-value", &frame.max_pixel_value);
    put("x-frame-window-center", &frame.window_center);
    put("x-frame-window-width", &frame.window_width);
    put("x-frame-window-recomputed", &frame.window_recomputed);
    put("x-frame-rescale-slope", &frame.rescale_slope);
    put("x-frame-rescale-intercept", &frame.rescale_intercept);
    put("x-frame-color", &frame.color);
    put("x-frame-invert", &frame.invert);

    headers
}
