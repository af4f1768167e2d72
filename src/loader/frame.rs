//! Decoded frame handed to the rendering host.

use std::time::Duration;

use serde::Serialize;

use crate::format::PixelData;

/// VOI LUT function reported for every frame.
pub const VOI_LUT_FUNCTION: &str = "LINEAR";

/// One fully decoded frame.
///
/// Serializes as the frame description (everything except the samples);
/// samples are reachable through [`DecodedFrame::pixel_data`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedFrame {
    pub image_id: String,

    /// Raw sample extrema before rescale
    pub min_pixel_value: i32,
    pub max_pixel_value: i32,

    #[serde(rename = "slope")]
    pub rescale_slope: f64,
    #[serde(rename = "intercept")]
    pub rescale_intercept: f64,

    pub window_center: f64,
    pub window_width: f64,
    /// Whether the candidate window was replaced by one derived from the samples
    pub window_recomputed: bool,
    pub voi_lut_function: &'static str,

    pub rows: u32,
    pub columns: u32,
    pub width: u32,
    pub height: u32,

    pub column_pixel_spacing: f64,
    pub row_pixel_spacing: f64,
    pub slice_thickness: f64,

    pub color: bool,
    pub rgba: bool,
    pub invert: bool,
    pub number_of_components: u16,

    pub data_type: &'static str,
    pub size_in_bytes: usize,

    #[serde(rename = "loadTimeInMS")]
    pub load_time_ms: f64,
    #[serde(rename = "decodeTimeInMS")]
    pub decode_time_ms: f64,

    #[serde(skip)]
    pub pixel_data: PixelData,
}

impl DecodedFrame {
    pub fn pixel_data(&self) -> &PixelData {
        &self.pixel_data
    }

    /// Consume the frame, keeping only the samples.
    pub fn into_pixel_data(self) -> PixelData {
        self.pixel_data
    }

    pub(crate) fn set_timing(&mut self, load: Duration, decode: Duration) {
        self.load_time_ms = load.as_secs_f64() * 1000.0;
        self.decode_time_ms = decode.as_secs_f64() * 1000.0;
    }
}
