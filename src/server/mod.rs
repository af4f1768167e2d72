//! HTTP host adapter.
//!
//! Exposes the loader and metadata provider over HTTP so a viewer can pull
//! frames and modules by image id.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /frames/{image_id}   GET /metadata/{module}/{image_id}    │
//! │                                                                 │
//! │  ┌─────────────┐  ┌──────────────────────┐  ┌───────────────┐   │
//! │  │  handlers   │  │  AppState registries │  │    routes     │   │
//! │  │ (requests)  │  │  (loader, metadata)  │  │ (cors, trace) │   │
//! │  └─────────────┘  └──────────────────────┘  └───────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    clear_sources_handler, frame_handler, frame_info_handler, health_handler, metadata_handler,
    sources_handler, AppState, ClearResponse, ErrorResponse, HealthResponse, MetadataNotApplicable,
    SourceSummary, SourcesResponse,
};
pub use routes::{create_router, RouterConfig};
