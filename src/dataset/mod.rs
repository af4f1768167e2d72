//! Dataset layer.
//!
//! Holds ingested multi-frame datasets for the loader and metadata resolver.
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │ ingestion (manifest) │──put──▶│     DatasetStore     │
//! └──────────────────────┘        │ source_id → Arc<Rec> │
//!                                 └──────────┬───────────┘
//!                                            │ get
//!                           ┌────────────────┴────────────────┐
//!                           ▼                                 ▼
//!                    LoaderFacade                     MetadataResolver
//! ```

mod manifest;
mod record;
mod store;

pub use manifest::{ingest_manifest, load_manifest, DatasetManifest};
pub use record::{DatasetRecord, DescriptiveAttributes, PhotometricInterpretation};
pub use store::DatasetStore;
