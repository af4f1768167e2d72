//! Loader facade: image id in, decoded frame out.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::dataset::{DatasetRecord, DatasetStore};
use crate::error::LoadError;
use crate::format::{
    reconstruct, resolve_window, FrameExtractor, FrameImageId, Rescale, TruncationPolicy,
};

use super::frame::{DecodedFrame, VOI_LUT_FUNCTION};

/// Boxed future resolving to one decoded frame.
pub type FrameFuture = Pin<Box<dyn Future<Output = Result<DecodedFrame, LoadError>> + Send>>;

/// Host-side callback slot.
pub type HostCallback = Box<dyn FnOnce() + Send>;

/// What a loader hands back to the host for one request.
///
/// `cancel_fn` and `decache` are always `None`: an accepted request runs to
/// completion and frames are not cached here.
pub struct ImageLoadObject {
    pub promise: FrameFuture,
    pub cancel_fn: Option<HostCallback>,
    pub decache: Option<HostCallback>,
}

impl ImageLoadObject {
    pub fn new(promise: FrameFuture) -> Self {
        Self {
            promise,
            cancel_fn: None,
            decache: None,
        }
    }

    /// Await the frame.
    pub async fn resolve(self) -> Result<DecodedFrame, LoadError> {
        self.promise.await
    }
}

impl fmt::Debug for ImageLoadObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLoadObject")
            .field("cancel_fn", &self.cancel_fn.is_some())
            .field("decache", &self.decache.is_some())
            .finish_non_exhaustive()
    }
}

/// Decodes `multiframe:` image ids against a shared [`DatasetStore`].
#[derive(Debug, Clone)]
pub struct LoaderFacade {
    store: Arc<DatasetStore>,
    extractor: FrameExtractor,
}

impl LoaderFacade {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self::with_policy(store, TruncationPolicy::default())
    }

    pub fn with_policy(store: Arc<DatasetStore>, policy: TruncationPolicy) -> Self {
        Self {
            store,
            extractor: FrameExtractor::new(policy),
        }
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    pub fn truncation_policy(&self) -> TruncationPolicy {
        self.extractor.policy()
    }

    /// Start loading `image_id`.
    ///
    /// Nothing is decoded until the returned promise is polled; once it is,
    /// the decode runs to completion without yielding.
    pub fn load(&self, image_id: &str) -> ImageLoadObject {
        let loader = self.clone();
        let image_id = image_id.to_owned();
        ImageLoadObject::new(Box::pin(async move { loader.decode(&image_id) }))
    }

    /// Load and await a frame.
    pub async fn load_frame(&self, image_id: &str) -> Result<DecodedFrame, LoadError> {
        self.load(image_id).resolve().await
    }

    /// Decode synchronously.
    pub fn decode(&self, image_id: &str) -> Result<DecodedFrame, LoadError> {
        let started = Instant::now();
        let id = FrameImageId::parse(image_id)?;
        let record = self
            .store
            .get(&id.source_id)
            .ok_or_else(|| LoadError::UnknownSource {
                source_id: id.source_id.clone(),
            })?;

        let decode_started = Instant::now();
        let mut frame = self.decode_record(image_id, &record, id.frame_index)?;
        frame.set_timing(started.elapsed(), decode_started.elapsed());
        Ok(frame)
    }

    /// Decode frame `frame_index` of `record`.
    pub fn decode_record(
        &self,
        image_id: &str,
        record: &DatasetRecord,
        frame_index: i64,
    ) -> Result<DecodedFrame, LoadError> {
        let extracted = self.extractor.extract(record, frame_index)?;
        let pixels = reconstruct(
            &extracted.bytes,
            record.bits_allocated,
            record.pixel_representation,
        )?;

        let resolved = resolve_window(
            record.window_center,
            record.window_width,
            Rescale::new(record.rescale_slope, record.rescale_intercept),
            f64::from(pixels.min_pixel_value),
            f64::from(pixels.max_pixel_value),
        );
        if resolved.recomputed {
            warn!(
                image_id,
                candidate_center = ?record.window_center,
                candidate_width = ?record.window_width,
                center = resolved.window.center,
                width = resolved.window.width,
                "Window missing or implausible, recomputed from sample range"
            );
        }

        debug!(
            image_id,
            frame_index = extracted.layout.frame_index,
            bytes = extracted.layout.frame_byte_length,
            min = pixels.min_pixel_value,
            max = pixels.max_pixel_value,
            data_type = pixels.data.data_type(),
            "Decoded frame"
        );

        Ok(DecodedFrame {
            image_id: image_id.to_owned(),
            min_pixel_value: pixels.min_pixel_value,
            max_pixel_value: pixels.max_pixel_value,
            rescale_slope: record.rescale_slope,
            rescale_intercept: record.rescale_intercept,
            window_center: resolved.window.center,
            window_width: resolved.window.width,
            window_recomputed: resolved.recomputed,
            voi_lut_function: VOI_LUT_FUNCTION,
            rows: record.rows,
            columns: record.columns,
            width: record.columns,
            height: record.rows,
            // Host convention: column spacing is read from the first entry
            column_pixel_spacing: record.pixel_spacing[0],
            row_pixel_spacing: record.pixel_spacing[1],
            slice_thickness: record.slice_thickness,
            color: record.is_color(),
            rgba: false,
            invert: record.photometric_interpretation.is_inverted(),
            number_of_components: record.samples_per_pixel,
            data_type: pixels.data.data_type(),
            size_in_bytes: pixels.data.byte_len(),
            load_time_ms: 0.0,
            decode_time_ms: 0.0,
            pixel_data: pixels.data,
        })
    }
}
