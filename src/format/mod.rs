//! Binary frame decoding.
//!
//! The decode pipeline for one frame:
//!
//! ```text
//! "multiframe:<sourceId>:<frameIndex>"
//!            │ FrameImageId::parse
//!            ▼
//!   FrameExtractor::extract     (byte range → zero-filled Vec<u8>)
//!            │
//!            ▼
//!   pixel::reconstruct          (bytes → u8 / u16 / i16 samples, extrema)
//!            │
//!            ▼
//!   window::resolve_window      (candidate window → validated window)
//! ```

pub mod frame;
pub mod image_id;
pub mod pixel;
pub mod window;

pub use frame::{check_frame_index, ExtractedFrame, FrameExtractor, FrameLayout, TruncationPolicy};
pub use image_id::{frame_image_ids, FrameImageId, MULTIFRAME_SCHEME};
pub use pixel::{reconstruct, reconstruct_samples, PixelData, ReconstructedPixels, SampleEncoding};
pub use window::{resolve_window, Rescale, ResolvedWindow, Window};
