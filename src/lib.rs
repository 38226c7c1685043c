//! Modified median cut quantization (MMCQ).
//!
//! Reduces a set of RGB pixels to a small palette by repeatedly splitting
//! boxes of a 5-bit-per-channel color histogram, then answers "which palette
//! color does this pixel belong to" queries.
//!
//! ```
//! use mmcq::ColorMap;
//! use rgb::RGB8;
//!
//! let pixels = [
//!     RGB8::new(190, 197, 190),
//!     RGB8::new(202, 204, 200),
//!     RGB8::new(207, 214, 210),
//!     RGB8::new(211, 214, 211),
//!     RGB8::new(205, 207, 207),
//! ];
//! let map = ColorMap::build(&pixels, 4)?;
//! assert!(map.size() <= 4);
//! let color = map.map(RGB8::new(190, 197, 190));
//! assert!(color.is_some());
//! # Ok::<(), mmcq::QuantizeError>(())
//! ```
#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod histogram;
pub mod median_cut;
pub mod palette;
pub mod queue;
pub mod remap;
pub mod vbox;

pub use error::QuantizeError;
pub use histogram::Histogram;
pub use palette::{ColorMap, NearestSelection};
pub use rgb::RGB8;
pub use vbox::{Bounds, VBox};

/// Smallest accepted palette size.
pub const MIN_COLORS: u32 = 2;
/// Largest accepted palette size.
pub const MAX_COLORS: u32 = 256;

/// Configuration for palette extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizeConfig {
    /// Maximum number of palette colors (2..=256).
    pub max_colors: u32,
    /// Nearest-color rule used when a pixel falls outside every box.
    pub nearest: NearestSelection,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            max_colors: MAX_COLORS,
            nearest: NearestSelection::Exact,
        }
    }
}

impl QuantizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_colors(mut self, n: u32) -> Self {
        self.max_colors = n;
        self
    }

    pub fn nearest(mut self, selection: NearestSelection) -> Self {
        self.nearest = selection;
        self
    }
}

/// Build a color map for `pixels`.
///
/// The whole pixel set is read up front; both refinement phases run before
/// this returns.
pub fn quantize(pixels: &[RGB8], config: &QuantizeConfig) -> Result<ColorMap, QuantizeError> {
    validate_inputs(pixels.len(), config)?;

    let boxes = median_cut::median_cut(pixels, config.max_colors)?;
    log::debug!(
        "{} pixels quantized to {} colors (max {})",
        pixels.len(),
        boxes.len(),
        config.max_colors
    );

    Ok(ColorMap::from_boxes(boxes, config.nearest))
}

fn validate_inputs(pixel_count: usize, config: &QuantizeConfig) -> Result<(), QuantizeError> {
    if pixel_count == 0 {
        return Err(QuantizeError::EmptyInput);
    }
    if !(MIN_COLORS..=MAX_COLORS).contains(&config.max_colors) {
        return Err(QuantizeError::InvalidMaxColors(config.max_colors));
    }
    Ok(())
}
