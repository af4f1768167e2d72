//! Test utilities for integration tests.
//!
//! Builders for synthetic multi-frame datasets and manifest files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;

use multiframe_loader::{
    create_router, AppState, DatasetRecord, DatasetStore, RouterConfig, TruncationPolicy,
};

// =============================================================================
// Synthetic Datasets
// =============================================================================

/// Value stored at `(frame, pixel)` in [`ct_volume`].
pub fn ct_sample(frame: usize, pixel: usize) -> i16 {
    (frame as i16) * 1000 - 1024 + (pixel as i16) * 100
}

/// Little-endian bytes of a signed 16-bit CT-like volume.
///
/// Frame `f`, pixel `p` holds `f * 1000 - 1024 + p * 100`.
pub fn ct_volume_bytes(rows: u32, columns: u32, frames: u32) -> Vec<u8> {
    let pixels = (rows * columns) as usize;
    (0..frames as usize)
        .flat_map(|f| (0..pixels).map(move |p| ct_sample(f, p)))
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

/// A 4x4, 3-frame signed CT volume with a plausible soft-tissue window.
pub fn ct_volume(source_id: &str) -> DatasetRecord {
    DatasetRecord::new(source_id, ct_volume_bytes(4, 4, 3), 4, 4, 3, 16)
        .with_signed_samples(true)
        .with_rescale(1.0, 0.0)
        .with_window(40.0, 400.0)
        .with_pixel_spacing(0.7, 0.7)
        .with_slice_thickness(2.0)
}

/// An 8-bit single-channel dataset where frame `f` is filled with `f + 1`.
pub fn mono8_volume(source_id: &str, rows: u32, columns: u32, frames: u32) -> DatasetRecord {
    let pixels = (rows * columns) as usize;
    let bytes: Vec<u8> = (0..frames as usize)
        .flat_map(|f| std::iter::repeat(f as u8 + 1).take(pixels))
        .collect();
    DatasetRecord::new(source_id, bytes, rows, columns, frames, 8)
}

/// Store holding the given records under their own source ids.
pub fn store_with(records: Vec<DatasetRecord>) -> Arc<DatasetStore> {
    let store = Arc::new(DatasetStore::new());
    for record in records {
        store.put(record.source_id.clone(), record);
    }
    store
}

// =============================================================================
// Router Helpers
// =============================================================================

pub fn test_router(store: Arc<DatasetStore>) -> Router {
    test_router_with_policy(store, TruncationPolicy::ZeroFill)
}

pub fn test_router_with_policy(store: Arc<DatasetStore>, policy: TruncationPolicy) -> Router {
    create_router(
        AppState::new(store, policy),
        RouterConfig::new().with_tracing(false),
    )
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// Manifest Files
// =============================================================================

/// A raw buffer plus the manifest describing it, written into a directory.
pub struct ManifestFixture<'a> {
    pub source_id: &'a str,
    pub buffer: &'a [u8],
    pub rows: u32,
    pub columns: u32,
    pub frames: u32,
    pub bits_allocated: u16,
    extra: &'a str,
}

impl<'a> ManifestFixture<'a> {
    pub fn new(source_id: &'a str, buffer: &'a [u8], rows: u32, columns: u32, frames: u32) -> Self {
        Self {
            source_id,
            buffer,
            rows,
            columns,
            frames,
            bits_allocated: 8,
            extra: "",
        }
    }

    pub fn with_bits_allocated(mut self, bits_allocated: u16) -> Self {
        self.bits_allocated = bits_allocated;
        self
    }

    /// Extra fields spliced into the manifest object; must start with a comma.
    pub fn with_extra(mut self, extra: &'a str) -> Self {
        self.extra = extra;
        self
    }

    /// Write the buffer and manifest into `dir`, returning the manifest path.
    pub fn write(&self, dir: &Path) -> PathBuf {
        let buffer_name = format!("{}.raw", self.source_id);
        std::fs::write(dir.join(&buffer_name), self.buffer).unwrap();

        let manifest = format!(
            r#"{{
                "sourceId": "{}",
                "buffer": "{}",
                "numberOfFrames": {},
                "rows": {},
                "columns": {},
                "bitsAllocated": {}{}
            }}"#,
            self.source_id,
            buffer_name,
            self.frames,
            self.rows,
            self.columns,
            self.bits_allocated,
            self.extra
        );
        let path = dir.join(format!("{}.json", self.source_id));
        std::fs::write(&path, manifest).unwrap();
        path
    }
}
