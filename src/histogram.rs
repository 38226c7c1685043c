use alloc::vec;
use alloc::vec::Vec;

use rgb::RGB8;

use crate::vbox::{Bounds, VBox};

/// Significant bits kept per channel in the reduced color space.
pub const SIGBITS: u32 = 5;
/// Right shift that maps an 8-bit channel into the reduced space.
pub const RSHIFT: u32 = 8 - SIGBITS;
/// Number of buckets in the reduced color space (32 × 32 × 32).
pub const HISTOGRAM_SIZE: usize = 1 << (3 * SIGBITS);
/// Largest reduced channel value.
pub const MAX_REDUCED: u8 = (1 << SIGBITS) - 1;

/// Reduce an 8-bit channel value to its 5-bit bucket.
#[inline]
pub fn reduce(channel: u8) -> u8 {
    channel >> RSHIFT
}

/// Pack three reduced channel values into one 15-bit histogram index.
#[inline]
pub fn color_index(r: u8, g: u8, b: u8) -> usize {
    ((r as usize) << (2 * SIGBITS)) | ((g as usize) << SIGBITS) | b as usize
}

/// Pixel counts over the reduced color space.
///
/// Built once from the full pixel set and only read afterwards; every
/// [`VBox`] derives its statistics from the same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u32>,
}

impl Histogram {
    /// Count pixels per reduced color code.
    pub fn from_pixels(pixels: &[RGB8]) -> Self {
        let mut counts = vec![0u32; HISTOGRAM_SIZE];
        for p in pixels {
            let index = color_index(reduce(p.r), reduce(p.g), reduce(p.b));
            counts[index] = counts[index].saturating_add(1);
        }
        Self { counts }
    }

    /// Pixel count of one reduced cell.
    #[inline]
    pub fn get(&self, r: u8, g: u8, b: u8) -> u32 {
        self.counts[color_index(r, g, b)]
    }

    /// Number of non-empty buckets.
    pub fn distinct_colors(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Total number of pixels counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Raw bucket counts, indexed by [`color_index`].
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }
}

/// Build the histogram and the tightest box enclosing every pixel.
///
/// Returns `None` for an empty pixel set.
pub fn build_histogram(pixels: &[RGB8]) -> Option<(Histogram, VBox)> {
    if pixels.is_empty() {
        return None;
    }

    let histogram = Histogram::from_pixels(pixels);

    let mut bounds = Bounds {
        r1: MAX_REDUCED,
        r2: 0,
        g1: MAX_REDUCED,
        g2: 0,
        b1: MAX_REDUCED,
        b2: 0,
    };
    for p in pixels {
        let (r, g, b) = (reduce(p.r), reduce(p.g), reduce(p.b));
        bounds.r1 = bounds.r1.min(r);
        bounds.r2 = bounds.r2.max(r);
        bounds.g1 = bounds.g1.min(g);
        bounds.g2 = bounds.g2.max(g);
        bounds.b1 = bounds.b1.min(b);
        bounds.b2 = bounds.b2.max(b);
    }

    let vbox = VBox::new(bounds, &histogram);
    Some((histogram, vbox))
}
