//! Frame byte-range extraction.
//!
//! Frames are packed back to back after the pixel data offset:
//!
//! ```text
//! bytes_per_sample  = bits_allocated / 8
//! frame_byte_length = rows * columns * bytes_per_sample * samples_per_pixel
//! frame_offset      = pixel_data_offset + frame_index * frame_byte_length
//! ```
//!
//! The extracted frame always has exactly `frame_byte_length` bytes. Under the
//! default [`TruncationPolicy::ZeroFill`] any part of the range past the end of
//! the buffer is left as zero bytes instead of failing.

use tracing::warn;

use crate::dataset::DatasetRecord;
use crate::error::LoadError;

/// What to do when a frame's byte range runs past the end of the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Copy what exists and leave the rest zero
    #[default]
    ZeroFill,
    /// Fail with `FrameTruncated`
    Strict,
}

/// Byte range of one frame within a dataset buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub frame_index: u32,
    pub bytes_per_sample: usize,
    pub frame_byte_length: usize,
    pub frame_offset: usize,
}

impl FrameLayout {
    /// Compute the layout of `frame_index` after checking it is in range.
    pub fn for_frame(record: &DatasetRecord, frame_index: i64) -> Result<Self, LoadError> {
        let frame_index = check_frame_index(record, frame_index)?;

        let bytes_per_sample = usize::from(record.bits_allocated) / 8;
        let frame_byte_length = (record.rows as usize)
            .saturating_mul(record.columns as usize)
            .saturating_mul(bytes_per_sample)
            .saturating_mul(usize::from(record.samples_per_pixel));
        let frame_offset = record
            .pixel_data_offset
            .saturating_add((frame_index as usize).saturating_mul(frame_byte_length));

        Ok(Self {
            frame_index,
            bytes_per_sample,
            frame_byte_length,
            frame_offset,
        })
    }

    /// Number of bytes of this frame actually present in a buffer of `buffer_len`.
    #[inline]
    pub fn available_in(&self, buffer_len: usize) -> usize {
        buffer_len
            .saturating_sub(self.frame_offset)
            .min(self.frame_byte_length)
    }
}

/// Validate a frame index against `[0, number_of_frames)`.
pub fn check_frame_index(record: &DatasetRecord, frame_index: i64) -> Result<u32, LoadError> {
    if frame_index < 0 || frame_index >= i64::from(record.number_of_frames) {
        return Err(LoadError::FrameIndexOutOfRange {
            frame_index,
            number_of_frames: record.number_of_frames,
        });
    }
    Ok(frame_index as u32)
}

/// Raw bytes of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFrame {
    pub layout: FrameLayout,

    /// Exactly `layout.frame_byte_length` bytes
    pub bytes: Vec<u8>,

    /// Bytes that were past the end of the buffer and left zero
    pub missing_bytes: usize,
}

/// Slices frames out of dataset buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameExtractor {
    policy: TruncationPolicy,
}

impl FrameExtractor {
    pub fn new(policy: TruncationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TruncationPolicy {
        self.policy
    }

    /// Copy the bytes of `frame_index` into a fresh buffer.
    ///
    /// # Errors
    /// - `FrameIndexOutOfRange` if the index is outside the dataset
    /// - `MissingPixelBuffer` if the record has no buffer
    /// - `FrameTruncated` if the range runs past the buffer under the strict policy
    pub fn extract(
        &self,
        record: &DatasetRecord,
        frame_index: i64,
    ) -> Result<ExtractedFrame, LoadError> {
        let layout = FrameLayout::for_frame(record, frame_index)?;

        let buffer = &record.buffer;
        if buffer.is_empty() {
            return Err(LoadError::MissingPixelBuffer {
                source_id: record.source_id.clone(),
            });
        }

        let available = layout.available_in(buffer.len());
        let missing_bytes = layout.frame_byte_length - available;

        if missing_bytes > 0 {
            if self.policy == TruncationPolicy::Strict {
                return Err(LoadError::FrameTruncated {
                    frame_index: layout.frame_index,
                    offset: layout.frame_offset,
                    required: layout.frame_byte_length,
                    available,
                });
            }
            warn!(
                source_id = %record.source_id,
                frame_index = layout.frame_index,
                missing_bytes,
                "Pixel data truncated, zero-filling frame"
            );
        }

        let mut bytes = vec![0u8; layout.frame_byte_length];
        if available > 0 {
            let start = layout.frame_offset;
            bytes[..available].copy_from_slice(&buffer[start..start + available]);
        }

        Ok(ExtractedFrame {
            layout,
            bytes,
            missing_bytes,
        })
    }
}
