use alloc::vec::Vec;

use rgb::RGB8;

use crate::palette::ColorMap;

/// Map every pixel to its palette index using [`ColorMap::map_index`].
///
/// Palettes hold at most 256 entries, so indices fit in a byte. An empty
/// color map maps everything to index 0.
pub fn remap_pixels(pixels: &[RGB8], map: &ColorMap) -> Vec<u8> {
    pixels
        .iter()
        .map(|&p| map.map_index(p).unwrap_or(0) as u8)
        .collect()
}

/// Count the number of runs in an index stream.
pub fn count_runs(indices: &[u8]) -> usize {
    if indices.is_empty() {
        return 0;
    }
    1 + indices.windows(2).filter(|w| w[0] != w[1]).count()
}
