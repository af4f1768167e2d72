//! Host-side registries for image loaders and metadata providers.
//!
//! ```text
//!   ImageLoaderRegistry                 MetadataRegistry
//!   ┌──────────────┬──────────────┐     ┌──────────┬────────────────────┐
//!   │ "multiframe" │ LoaderFacade │     │ 10000    │ MetadataResolver   │
//!   │ ...          │ ...          │     │ lower    │ other providers    │
//!   └──────────────┴──────────────┘     └──────────┴────────────────────┘
//!   dispatch on the id's scheme         first applicable answer wins
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::dataset::{DatasetRecord, DatasetStore};
use crate::error::LoadError;
use crate::format::{TruncationPolicy, MULTIFRAME_SCHEME};
use crate::metadata::{MetadataResolver, MetadataValue};

use super::facade::{ImageLoadObject, LoaderFacade};

/// Priority the multi-frame metadata provider is registered at.
pub const METADATA_PROVIDER_PRIORITY: i32 = 10000;

// =============================================================================
// Contracts
// =============================================================================

/// Something that turns an image id into a pending frame.
pub trait ImageLoader: Send + Sync {
    fn load_image(&self, image_id: &str) -> ImageLoadObject;
}

/// Something that answers `(moduleType, imageId)` metadata queries.
pub trait MetadataProvider: Send + Sync {
    fn metadata(&self, module_type: &str, image_id: &str) -> MetadataValue;
}

impl ImageLoader for LoaderFacade {
    fn load_image(&self, image_id: &str) -> ImageLoadObject {
        self.load(image_id)
    }
}

impl MetadataProvider for MetadataResolver {
    fn metadata(&self, module_type: &str, image_id: &str) -> MetadataValue {
        self.resolve(module_type, image_id)
    }
}

// =============================================================================
// Image Loader Registry
// =============================================================================

/// Image loaders keyed by id scheme.
#[derive(Default)]
pub struct ImageLoaderRegistry {
    loaders: RwLock<HashMap<String, Arc<dyn ImageLoader>>>,
}

impl ImageLoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `loader` for `scheme`, replacing any previous one.
    pub fn register(&self, scheme: impl Into<String>, loader: Arc<dyn ImageLoader>) {
        let scheme = scheme.into();
        debug!(scheme = %scheme, "Registering image loader");
        self.loaders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scheme, loader);
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.loaders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(scheme)
    }

    /// Dispatch `image_id` to the loader for its scheme.
    ///
    /// # Errors
    /// `InvalidImageId` when no loader handles the scheme.
    pub fn load(&self, image_id: &str) -> Result<ImageLoadObject, LoadError> {
        let scheme = image_id.split(':').next().unwrap_or_default();
        let loader = self
            .loaders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scheme)
            .cloned()
            .ok_or_else(|| LoadError::InvalidImageId {
                image_id: image_id.to_owned(),
            })?;
        Ok(loader.load_image(image_id))
    }
}

// =============================================================================
// Metadata Registry
// =============================================================================

/// Metadata providers consulted in descending priority order.
#[derive(Default)]
pub struct MetadataRegistry {
    providers: RwLock<Vec<(i32, Arc<dyn MetadataProvider>)>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider. Equal priorities keep registration order.
    pub fn add_provider(&self, provider: Arc<dyn MetadataProvider>, priority: i32) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let at = providers.partition_point(|(p, _)| *p >= priority);
        providers.insert(at, (priority, provider));
    }

    pub fn len(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First applicable answer, or `NotApplicable` if every provider declines.
    pub fn get(&self, module_type: &str, image_id: &str) -> MetadataValue {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        providers
            .iter()
            .map(|(_, provider)| provider.metadata(module_type, image_id))
            .find(MetadataValue::is_applicable)
            .unwrap_or(MetadataValue::NotApplicable)
    }
}

// =============================================================================
// Registration and teardown
// =============================================================================

/// Handles created by [`register_multiframe_loader`].
#[derive(Debug, Clone)]
pub struct MultiframeLoader {
    pub loader: LoaderFacade,
    pub metadata: MetadataResolver,
}

/// Register the `multiframe` loader and its metadata provider with the host.
pub fn register_multiframe_loader(
    store: Arc<DatasetStore>,
    policy: TruncationPolicy,
    loaders: &ImageLoaderRegistry,
    metadata: &MetadataRegistry,
) -> MultiframeLoader {
    let loader = LoaderFacade::with_policy(Arc::clone(&store), policy);
    let resolver = MetadataResolver::new(store);

    loaders.register(MULTIFRAME_SCHEME, Arc::new(loader.clone()));
    metadata.add_provider(Arc::new(resolver.clone()), METADATA_PROVIDER_PRIORITY);

    info!(
        scheme = MULTIFRAME_SCHEME,
        priority = METADATA_PROVIDER_PRIORITY,
        ?policy,
        "Registered multi-frame loader"
    );

    MultiframeLoader {
        loader,
        metadata: resolver,
    }
}

/// Hand a parsed dataset to the loader.
pub fn store_dicom_data(store: &DatasetStore, source_id: impl Into<String>, record: DatasetRecord) {
    store.put(source_id, record);
}

/// Teardown on view disposal: drop every stored dataset.
pub fn cleanup_multiframe_loader(store: &DatasetStore) {
    store.clear();
}
