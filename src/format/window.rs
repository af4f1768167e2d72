//! Display window resolution.
//!
//! The candidate window from the dataset is kept when it is plausible for the
//! frame's rescaled sample range; otherwise a window covering the range with
//! 20% padding is substituted:
//!
//! ```text
//! rescaled_min   = min * slope + intercept
//! rescaled_max   = max * slope + intercept
//! rescaled_range = rescaled_max - rescaled_min
//!
//! valid = center and width present
//!         and width  <= 3 * rescaled_range
//!         and center >= rescaled_min - rescaled_range
//!         and center <= rescaled_max + rescaled_range
//!
//! otherwise: center = (rescaled_min + rescaled_max) / 2
//!            width  = rescaled_range * 1.2
//! ```
//!
//! A legitimate but very narrow clinical window on a frame with a wide sample
//! range can be overridden by this rule.

/// Padding factor applied to the sample range of a recomputed window.
pub const RECOMPUTED_WIDTH_FACTOR: f64 = 1.2;

/// Largest width, as a multiple of the rescaled range, still accepted.
pub const MAX_WIDTH_TO_RANGE_RATIO: f64 = 3.0;

/// Linear modality transform from stored values to physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Rescale {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.slope + self.intercept
    }
}

impl Default for Rescale {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

/// Display window center/width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub center: f64,
    pub width: f64,
}

/// Outcome of window resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWindow {
    pub window: Window,

    /// Whether the candidate was replaced
    pub recomputed: bool,
}

fn is_present(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// Resolve the window for a frame with raw sample extrema `min`/`max`.
///
/// A candidate value counts as present when it is `Some`, finite and non-zero.
/// A negative width is never displayable and also triggers recomputation.
pub fn resolve_window(
    center: Option<f64>,
    width: Option<f64>,
    rescale: Rescale,
    min_pixel_value: f64,
    max_pixel_value: f64,
) -> ResolvedWindow {
    let rescaled_min = rescale.apply(min_pixel_value);
    let rescaled_max = rescale.apply(max_pixel_value);
    let rescaled_range = rescaled_max - rescaled_min;

    let candidate = match (center, width) {
        (Some(c), Some(w)) if is_present(c) && is_present(w) && w > 0.0 => Some(Window {
            center: c,
            width: w,
        }),
        _ => None,
    };

    if let Some(window) = candidate {
        let plausible = window.width <= MAX_WIDTH_TO_RANGE_RATIO * rescaled_range
            && window.center >= rescaled_min - rescaled_range
            && window.center <= rescaled_max + rescaled_range;
        if plausible {
            return ResolvedWindow {
                window,
                recomputed: false,
            };
        }
    }

    ResolvedWindow {
        window: Window {
            center: (rescaled_min + rescaled_max) / 2.0,
            width: rescaled_range * RECOMPUTED_WIDTH_FACTOR,
        },
        recomputed: true,
    }
}
