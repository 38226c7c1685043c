use rgb::RGB8;

use crate::histogram::{Histogram, RSHIFT, reduce};

/// A channel axis of the reduced color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Red,
    Green,
    Blue,
}

/// Inclusive per-channel bounds in the reduced color space.
///
/// `r1 <= r2`, `g1 <= g2` and `b1 <= b2` hold for every box the crate builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub r1: u8,
    pub r2: u8,
    pub g1: u8,
    pub g2: u8,
    pub b1: u8,
    pub b2: u8,
}

impl Bounds {
    /// Bounds covering exactly one reduced cell.
    pub fn cell(r: u8, g: u8, b: u8) -> Self {
        Self {
            r1: r,
            r2: r,
            g1: g,
            g2: g,
            b1: b,
            b2: b,
        }
    }

    /// Inclusive `(min, max)` along an axis.
    pub fn range(&self, axis: Axis) -> (u8, u8) {
        match axis {
            Axis::Red => (self.r1, self.r2),
            Axis::Green => (self.g1, self.g2),
            Axis::Blue => (self.b1, self.b2),
        }
    }

    /// Number of reduced values spanned along an axis.
    pub fn extent(&self, axis: Axis) -> u32 {
        let (lo, hi) = self.range(axis);
        (hi - lo) as u32 + 1
    }

    /// Axis with the largest extent. Ties favor red, then green.
    pub fn widest_axis(&self) -> Axis {
        let (rw, gw, bw) = (
            self.extent(Axis::Red),
            self.extent(Axis::Green),
            self.extent(Axis::Blue),
        );
        let max = rw.max(gw).max(bw);
        if rw == max {
            Axis::Red
        } else if gw == max {
            Axis::Green
        } else {
            Axis::Blue
        }
    }

    /// Copy with the upper bound on `axis` lowered to `value`.
    pub fn with_upper(mut self, axis: Axis, value: u8) -> Self {
        match axis {
            Axis::Red => self.r2 = value,
            Axis::Green => self.g2 = value,
            Axis::Blue => self.b2 = value,
        }
        self
    }

    /// Copy with the lower bound on `axis` raised to `value`.
    pub fn with_lower(mut self, axis: Axis, value: u8) -> Self {
        match axis {
            Axis::Red => self.r1 = value,
            Axis::Green => self.g1 = value,
            Axis::Blue => self.b1 = value,
        }
        self
    }

    /// Whether a reduced cell lies inside these bounds.
    #[inline]
    pub fn contains_cell(&self, r: u8, g: u8, b: u8) -> bool {
        (self.r1..=self.r2).contains(&r)
            && (self.g1..=self.g2).contains(&g)
            && (self.b1..=self.b2).contains(&b)
    }
}

/// A color box (vbox): a rectangular region of the reduced color space
/// together with its statistics over the shared histogram.
///
/// Bounds never change once a box exists, so count, volume and average are
/// computed when the box is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VBox {
    bounds: Bounds,
    count: u64,
    volume: u32,
    average: RGB8,
}

impl VBox {
    /// Build a box over `histogram` and derive its statistics.
    pub fn new(bounds: Bounds, histogram: &Histogram) -> Self {
        let mult = 1u64 << RSHIFT;

        let mut count = 0u64;
        let mut r_sum = 0u64;
        let mut g_sum = 0u64;
        let mut b_sum = 0u64;

        for r in bounds.r1..=bounds.r2 {
            for g in bounds.g1..=bounds.g2 {
                for b in bounds.b1..=bounds.b2 {
                    let h = histogram.get(r, g, b) as u64;
                    if h == 0 {
                        continue;
                    }
                    count += h;
                    r_sum += h * r as u64 * mult;
                    g_sum += h * g as u64 * mult;
                    b_sum += h * b as u64 * mult;
                }
            }
        }

        let average = if count > 0 {
            RGB8::new(
                (r_sum / count + mult / 2) as u8,
                (g_sum / count + mult / 2) as u8,
                (b_sum / count + mult / 2) as u8,
            )
        } else {
            // Empty box: geometric midpoint.
            RGB8::new(
                (mult * (bounds.r1 as u64 + bounds.r2 as u64 + 1) / 2) as u8,
                (mult * (bounds.g1 as u64 + bounds.g2 as u64 + 1) / 2) as u8,
                (mult * (bounds.b1 as u64 + bounds.b2 as u64 + 1) / 2) as u8,
            )
        };

        let volume =
            bounds.extent(Axis::Red) * bounds.extent(Axis::Green) * bounds.extent(Axis::Blue);

        Self {
            bounds,
            count,
            volume,
            average,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of pixels inside the box.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of reduced cells spanned by the box.
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// Histogram-weighted mean color, scaled back to 8 bits per channel.
    pub fn average(&self) -> RGB8 {
        self.average
    }

    /// Whether an 8-bit pixel falls inside the box after reduction.
    pub fn contains(&self, pixel: RGB8) -> bool {
        self.bounds.contains_cell(reduce(pixel.r), reduce(pixel.g), reduce(pixel.b))
    }
}
