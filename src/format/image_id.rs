//! Frame image identifiers.
//!
//! A frame is addressed by `multiframe:<sourceId>:<frameIndex>`. The grammar is
//! exactly three colon-delimited components; anything else is rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::LoadError;

/// Scheme prefix the loader is registered under.
pub const MULTIFRAME_SCHEME: &str = "multiframe";

/// Parsed `(source_id, frame_index)` pair.
///
/// The frame index is kept signed so a negative index can be reported as out
/// of range against the dataset rather than as a malformed id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameImageId {
    pub source_id: String,
    pub frame_index: i64,
}

impl FrameImageId {
    pub fn new(source_id: impl Into<String>, frame_index: i64) -> Self {
        Self {
            source_id: source_id.into(),
            frame_index,
        }
    }

    /// Parse an image id string.
    ///
    /// # Errors
    /// `InvalidImageId` if the id does not have three components, the scheme
    /// is not `multiframe`, or the frame component is not a base-10 integer.
    pub fn parse(image_id: &str) -> Result<Self, LoadError> {
        let invalid = || LoadError::InvalidImageId {
            image_id: image_id.to_string(),
        };

        let parts: Vec<&str> = image_id.split(':').collect();
        let [scheme, source_id, frame] = parts.as_slice() else {
            return Err(invalid());
        };
        if *scheme != MULTIFRAME_SCHEME {
            return Err(invalid());
        }

        let frame_index = frame.parse::<i64>().map_err(|_| invalid())?;

        Ok(Self::new(*source_id, frame_index))
    }
}

impl fmt::Display for FrameImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            MULTIFRAME_SCHEME, self.source_id, self.frame_index
        )
    }
}

impl FromStr for FrameImageId {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Image ids for every frame of a dataset, in frame order.
pub fn frame_image_ids(source_id: &str, number_of_frames: u32) -> Vec<String> {
    (0..i64::from(number_of_frames))
        .map(|i| FrameImageId::new(source_id, i).to_string())
        .collect()
}
