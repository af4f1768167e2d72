//! Pull-based loader contract for the rendering host.
//!
//! The host asks for a frame by id and gets back an [`ImageLoadObject`] whose
//! promise resolves to a [`DecodedFrame`]. Metadata for the same ids is
//! served by a [`MetadataResolver`](crate::metadata::MetadataResolver)
//! registered alongside the loader.

mod facade;
mod frame;
mod registry;

pub use facade::{FrameFuture, HostCallback, ImageLoadObject, LoaderFacade};
pub use frame::{DecodedFrame, VOI_LUT_FUNCTION};
pub use registry::{
    cleanup_multiframe_loader, register_multiframe_loader, store_dicom_data, ImageLoader,
    ImageLoaderRegistry, MetadataProvider, MetadataRegistry, MultiframeLoader,
    METADATA_PROVIDER_PRIORITY,
};
