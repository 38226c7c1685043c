use alloc::vec::Vec;

use rgb::RGB8;

use crate::error::QuantizeError;
use crate::vbox::VBox;

/// How [`ColorMap::nearest`] picks among palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NearestSelection {
    /// Smallest Euclidean distance; the first entry wins ties.
    #[default]
    Exact,
    /// Compatibility mode: the running minimum starts at zero and zero is
    /// read as "no candidate yet". An exact match (distance 0) therefore
    /// never sticks, and the following candidate replaces it.
    Legacy,
}

/// The final set of color boxes and the palette derived from them.
#[derive(Debug, Clone)]
pub struct ColorMap {
    boxes: Vec<VBox>,
    palette: Vec<RGB8>,
    selection: NearestSelection,
}

impl ColorMap {
    /// Quantize `pixels` down to at most `max_colors` colors with default
    /// settings. Shorthand for [`crate::quantize`].
    pub fn build(pixels: &[RGB8], max_colors: u32) -> Result<Self, QuantizeError> {
        crate::quantize(pixels, &crate::QuantizeConfig::new().max_colors(max_colors))
    }

    pub(crate) fn from_boxes(boxes: Vec<VBox>, selection: NearestSelection) -> Self {
        let palette = boxes.iter().map(VBox::average).collect();
        Self {
            boxes,
            palette,
            selection,
        }
    }

    /// Average color of every box, in final priority order.
    pub fn palette(&self) -> &[RGB8] {
        &self.palette
    }

    /// The boxes behind [`Self::palette`], same order.
    pub fn boxes(&self) -> &[VBox] {
        &self.boxes
    }

    /// Number of palette entries.
    pub fn size(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn selection(&self) -> NearestSelection {
        self.selection
    }

    /// Palette color for `pixel`: the average of the first box containing it,
    /// or the nearest palette entry if none does.
    pub fn map(&self, pixel: RGB8) -> Option<RGB8> {
        self.map_index(pixel).map(|i| self.palette[i])
    }

    /// Palette index chosen by [`Self::map`].
    pub fn map_index(&self, pixel: RGB8) -> Option<usize> {
        self.boxes
            .iter()
            .position(|b| b.contains(pixel))
            .or_else(|| self.nearest_index(pixel))
    }

    /// Palette entry closest to `pixel` in RGB space.
    pub fn nearest(&self, pixel: RGB8) -> Option<RGB8> {
        self.nearest_index(pixel).map(|i| self.palette[i])
    }

    /// Index of the entry returned by [`Self::nearest`].
    pub fn nearest_index(&self, pixel: RGB8) -> Option<usize> {
        let distances = self
            .palette
            .iter()
            .map(|&entry| distance_sq(pixel, entry))
            .enumerate();

        match self.selection {
            NearestSelection::Exact => distances.min_by_key(|&(_, d)| d).map(|(i, _)| i),
            NearestSelection::Legacy => {
                let mut min = 0;
                let mut best = None;
                for (i, d) in distances {
                    if d < min || min == 0 {
                        min = d;
                        best = Some(i);
                    }
                }
                best
            }
        }
    }
}

/// Squared Euclidean distance between two colors.
#[inline]
pub fn distance_sq(a: RGB8, b: RGB8) -> u32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}
