use thiserror::Error;

/// Errors that can occur while loading a single frame.
///
/// Every variant is surfaced as the rejected outcome of a load; there are no
/// retries and no partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// Image id does not match `multiframe:<sourceId>:<frameIndex>`
    #[error("Invalid imageId format: {image_id}")]
    InvalidImageId { image_id: String },

    /// No dataset has been stored under this source id
    #[error("Dataset not found for source: {source_id}")]
    UnknownSource { source_id: String },

    /// Frame index outside `[0, number_of_frames)`
    #[error("Invalid frame index: {frame_index} (total frames: {number_of_frames})")]
    FrameIndexOutOfRange {
        frame_index: i64,
        number_of_frames: u32,
    },

    /// Bits allocated is neither 8 nor 16
    #[error("Unsupported bits allocated: {bits_allocated}")]
    UnsupportedEncoding { bits_allocated: u16 },

    /// Dataset record has no backing pixel buffer
    #[error("No pixel data buffer found for source: {source_id}")]
    MissingPixelBuffer { source_id: String },

    /// Frame runs past the end of the buffer (strict truncation only)
    #[error(
        "Frame {frame_index} truncated: needs {required} bytes at offset {offset}, buffer holds {available}"
    )]
    FrameTruncated {
        frame_index: u32,
        offset: usize,
        required: usize,
        available: usize,
    },
}

/// Errors raised while ingesting a dataset from a manifest file.
#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    /// Manifest or buffer file could not be read
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    /// Manifest is not valid JSON for the expected shape
    #[error("Invalid manifest {path}: {message}")]
    Parse { path: String, message: String },

    /// Manifest parsed but describes an unusable dataset
    #[error("Invalid dataset attribute {field}: {message}")]
    InvalidAttribute {
        field: &'static str,
        message: String,
    },
}
