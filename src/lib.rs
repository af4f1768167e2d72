//! # multiframe-loader
//!
//! Decodes individual frames of multi-frame medical image datasets and derives
//! per-frame metadata for an external rendering host.
//!
//! A collaborator parses the source file and stores a [`DatasetRecord`] (the
//! packed pixel buffer plus its encoding attributes). The host then pulls
//! frames by id, `multiframe:<sourceId>:<frameIndex>`, and queries metadata
//! modules for the same ids.
//!
//! ## Architecture
//!
//! - [`dataset`] - Dataset records, the shared store and manifest ingestion
//! - [`mod@format`] - Image ids, frame extraction, sample reconstruction, windowing
//! - [`metadata`] - Metadata modules and the resolver
//! - [`loader`] - Loader facade, load objects and host registries
//! - [`server`] - Axum HTTP adapter
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use multiframe_loader::{DatasetRecord, DatasetStore, LoaderFacade};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(DatasetStore::new());
//!     let pixels = vec![0u8; 512 * 512 * 2 * 10];
//!     store.put(
//!         "ct",
//!         DatasetRecord::new("ct", pixels, 512, 512, 10, 16).with_signed_samples(true),
//!     );
//!
//!     let loader = LoaderFacade::new(store);
//!     let frame = loader.load_frame("multiframe:ct:3").await.unwrap();
//!     println!("{} samples", frame.pixel_data().len());
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod loader;
pub mod metadata;
pub mod server;

pub use config::{Cli, Command, InspectConfig, ServeConfig};
pub use dataset::{
    ingest_manifest, load_manifest, DatasetManifest, DatasetRecord, DatasetStore,
    DescriptiveAttributes, PhotometricInterpretation,
};
pub use error::{LoadError, ManifestError};
pub use format::{FrameExtractor, FrameImageId, PixelData, TruncationPolicy, MULTIFRAME_SCHEME};
pub use loader::{
    cleanup_multiframe_loader, register_multiframe_loader, store_dicom_data, DecodedFrame,
    ImageLoadObject, ImageLoader, ImageLoaderRegistry, LoaderFacade, MetadataProvider,
    MetadataRegistry, METADATA_PROVIDER_PRIORITY,
};
pub use metadata::{MetadataResolver, MetadataValue, ModuleType};
pub use server::{create_router, AppState, RouterConfig};
