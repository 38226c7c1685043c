use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use log::{debug, trace, warn};
use rgb::RGB8;

use crate::error::QuantizeError;
use crate::histogram::{Histogram, build_histogram};
use crate::queue::SortedQueue;
use crate::vbox::{Axis, Bounds, VBox};

/// Iteration cap for each refinement phase.
pub const MAX_ITERATIONS: usize = 1000;
/// Share of the requested colors produced by the population-ordered phase.
pub const FRACT_BY_POPULATION: f64 = 0.75;

/// Outcome of cutting one box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cut {
    /// The box holds no pixels; nothing to cut.
    Empty,
    /// The box cannot be divided (one pixel, or one reduced cell).
    Whole(VBox),
    /// Both halves hold pixels.
    Pair(VBox, VBox),
    /// One half was empty and has been absorbed; the populated half is
    /// strictly smaller than the input.
    Shrunk(VBox),
}

/// Ordering used by a refinement phase. Highest priority sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Pixel count.
    Population,
    /// Pixel count × volume.
    PopulationVolume,
}

impl Priority {
    pub fn key(self, vbox: &VBox) -> u64 {
        match self {
            Self::Population => vbox.count(),
            Self::PopulationVolume => vbox.count() * vbox.volume() as u64,
        }
    }

    fn queue(self) -> SortedQueue<VBox> {
        match self {
            Self::Population => SortedQueue::new(by_population),
            Self::PopulationVolume => SortedQueue::new(by_population_volume),
        }
    }
}

fn by_population(a: &VBox, b: &VBox) -> Ordering {
    Priority::Population.key(b).cmp(&Priority::Population.key(a))
}

fn by_population_volume(a: &VBox, b: &VBox) -> Ordering {
    Priority::PopulationVolume.key(b).cmp(&Priority::PopulationVolume.key(a))
}

/// Pixel population of every plane along `axis`, from the lower bound up.
fn plane_populations(histogram: &Histogram, bounds: Bounds, axis: Axis) -> Vec<u64> {
    let (lo, hi) = bounds.range(axis);
    let mut planes = vec![0u64; (hi - lo) as usize + 1];

    for r in bounds.r1..=bounds.r2 {
        for g in bounds.g1..=bounds.g2 {
            for b in bounds.b1..=bounds.b2 {
                let plane = match axis {
                    Axis::Red => r,
                    Axis::Green => g,
                    Axis::Blue => b,
                };
                planes[(plane - lo) as usize] += histogram.get(r, g, b) as u64;
            }
        }
    }

    planes
}

/// Split a box at the population median of its widest axis.
pub fn split_box(histogram: &Histogram, vbox: &VBox) -> Result<Cut, QuantizeError> {
    if vbox.count() == 0 {
        return Ok(Cut::Empty);
    }
    if vbox.count() == 1 || vbox.volume() == 1 {
        return Ok(Cut::Whole(vbox.clone()));
    }

    let bounds = vbox.bounds();
    let axis = bounds.widest_axis();
    let (lo, hi) = bounds.range(axis);
    let (lo, hi) = (lo as i32, hi as i32);

    // Cumulative population up to and including each plane.
    let mut partial_sum = plane_populations(histogram, bounds, axis);
    let mut total = 0u64;
    for sum in partial_sum.iter_mut() {
        total += *sum;
        *sum = total;
    }
    let lookahead_sum: Vec<u64> = partial_sum
        .iter()
        .map(|&p| if p > 0 { total - p } else { 0 })
        .collect();
    let at = |plane: i32| (plane - lo) as usize;

    let Some(i) = (lo..=hi).find(|&plane| partial_sum[at(plane)] > total / 2) else {
        warn!("no median plane in a box of {total} pixels");
        return Err(QuantizeError::InvariantViolation("median plane not found"));
    };

    let left = i - lo;
    let right = hi - i;
    let mut d2 = if left <= right {
        (hi - 1).min(i + right / 2)
    } else {
        lo.max(i - 1 - left / 2)
    };

    // Avoid zero-population children.
    while d2 < hi && partial_sum[at(d2)] == 0 {
        d2 += 1;
    }
    let mut count2 = lookahead_sum[at(d2)];
    while count2 == 0 && d2 > lo && partial_sum[at(d2 - 1)] > 0 {
        d2 -= 1;
        count2 = lookahead_sum[at(d2)];
    }
    // All pixels on the top plane: cut just below it.
    let d2 = d2.min(hi - 1) as u8;

    let first = VBox::new(bounds.with_upper(axis, d2), histogram);
    let second = VBox::new(bounds.with_lower(axis, d2 + 1), histogram);
    trace!(
        "split {:?} on {:?} at {}: {} + {} pixels",
        bounds,
        axis,
        d2,
        first.count(),
        second.count()
    );

    match (first.count() > 0, second.count() > 0) {
        (true, true) => Ok(Cut::Pair(first, second)),
        (true, false) => Ok(Cut::Shrunk(first)),
        (false, true) => Ok(Cut::Shrunk(second)),
        (false, false) => {
            warn!("split of {bounds:?} lost all {total} pixels");
            Err(QuantizeError::InvariantViolation("split produced two empty boxes"))
        }
    }
}

/// Repeatedly split the highest-priority box until the queue holds `target`
/// boxes, nothing is left to split, or the iteration cap is hit.
///
/// Boxes that cannot be split are set aside for the rest of the phase and
/// return to the queue before it ends. Returns the iterations used.
fn refine(
    histogram: &Histogram,
    queue: &mut SortedQueue<VBox>,
    target: f64,
) -> Result<usize, QuantizeError> {
    let mut settled = Vec::new();
    let mut ncolors = queue.len();
    let mut iterations = 0;

    while (ncolors as f64) < target && iterations < MAX_ITERATIONS {
        let Some(vbox) = queue.pop_highest() else {
            break;
        };
        iterations += 1;

        if vbox.count() == 0 {
            settled.push(vbox);
            continue;
        }

        match split_box(histogram, &vbox)? {
            Cut::Empty => {
                warn!("populated box {:?} produced no children", vbox.bounds());
                return Err(QuantizeError::InvariantViolation(
                    "populated box produced no children",
                ));
            }
            Cut::Whole(vbox) => settled.push(vbox),
            Cut::Shrunk(vbox) => queue.insert_front(vbox),
            Cut::Pair(first, second) => {
                queue.insert_front(first);
                queue.insert_front(second);
                ncolors += 1;
            }
        }
    }

    for vbox in settled {
        queue.insert_front(vbox);
    }
    Ok(iterations)
}

enum Phase {
    BuildInitial(VBox),
    Population(SortedQueue<VBox>),
    PopulationVolume(SortedQueue<VBox>),
    Done(SortedQueue<VBox>),
}

/// Run modified median cut over `pixels`, producing at most `max_colors` boxes.
///
/// The first phase splits by population until three quarters of the target
/// is reached; the second re-ranks every box by population × volume and
/// splits up to the full target. Returns the final boxes in the second
/// phase's priority order.
///
/// `max_colors` is not validated here; see [`crate::quantize`].
pub fn median_cut(pixels: &[RGB8], max_colors: u32) -> Result<Vec<VBox>, QuantizeError> {
    let Some((histogram, initial)) = build_histogram(pixels) else {
        return Err(QuantizeError::EmptyInput);
    };
    let mut phase = Phase::BuildInitial(initial);

    loop {
        phase = match phase {
            Phase::BuildInitial(initial) => {
                let distinct = histogram.distinct_colors();
                if distinct <= max_colors as usize {
                    // No shortcut: the general splitting path still runs.
                    debug!("{distinct} distinct reduced colors, already within {max_colors}");
                }
                let mut queue = Priority::Population.queue();
                queue.insert_front(initial);
                Phase::Population(queue)
            }
            Phase::Population(mut queue) => {
                let target = FRACT_BY_POPULATION * max_colors as f64;
                let iterations = refine(&histogram, &mut queue, target)?;
                debug!(
                    "population phase: {} boxes after {iterations} iterations (target {target})",
                    queue.len()
                );
                let mut next = Priority::PopulationVolume.queue();
                next.merge_from(queue);
                Phase::PopulationVolume(next)
            }
            Phase::PopulationVolume(mut queue) => {
                let iterations = refine(&histogram, &mut queue, max_colors as f64)?;
                debug!(
                    "population × volume phase: {} boxes after {iterations} iterations",
                    queue.len()
                );
                Phase::Done(queue)
            }
            Phase::Done(queue) => return Ok(queue.into_sorted_vec()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(r: (u8, u8), g: (u8, u8), b: (u8, u8)) -> Bounds {
        Bounds {
            r1: r.0,
            r2: r.1,
            g1: g.0,
            g2: g.1,
            b1: b.0,
            b2: b.1,
        }
    }

    /// Pixel whose reduced cell is `(r, g, b)`.
    fn cell(r: u8, g: u8, b: u8) -> RGB8 {
        RGB8::new(r << 3, g << 3, b << 3)
    }

    #[test]
    fn empty_box_has_no_children() {
        let hist = Histogram::from_pixels(&[cell(31, 31, 31)]);
        let vbox = VBox::new(bounds((0, 3), (0, 3), (0, 3)), &hist);
        assert_eq!(split_box(&hist, &vbox), Ok(Cut::Empty));
    }

    #[test]
    fn single_pixel_is_whole() {
        let hist = Histogram::from_pixels(&[cell(1, 2, 3)]);
        let vbox = VBox::new(bounds((0, 5), (0, 5), (0, 5)), &hist);
        assert_eq!(split_box(&hist, &vbox), Ok(Cut::Whole(vbox.clone())));
    }

    #[test]
    fn single_cell_is_whole() {
        let hist = Histogram::from_pixels(&[cell(4, 4, 4); 10]);
        let vbox = VBox::new(Bounds::cell(4, 4, 4), &hist);
        assert_eq!(split_box(&hist, &vbox), Ok(Cut::Whole(vbox.clone())));
    }

    #[test]
    fn splits_at_population_median() {
        // Along red: planes 0..=3 with populations 1, 1, 2, 1.
        let pixels = vec![
            cell(0, 0, 0),
            cell(1, 0, 0),
            cell(2, 0, 0),
            cell(2, 0, 0),
            cell(3, 0, 0),
        ];
        let hist = Histogram::from_pixels(&pixels);
        let vbox = VBox::new(bounds((0, 3), (0, 0), (0, 0)), &hist);

        // total 5, median plane 2; left 2 > right 1 so d2 = max(0, 2 - 1 - 1) = 0.
        let Ok(Cut::Pair(first, second)) = split_box(&hist, &vbox) else {
            panic!("expected two populated halves");
        };
        assert_eq!(first.bounds(), bounds((0, 0), (0, 0), (0, 0)));
        assert_eq!(second.bounds(), bounds((1, 3), (0, 0), (0, 0)));
        assert_eq!(first.count() + second.count(), 5);
    }

    #[test]
    fn cut_biased_toward_larger_remainder() {
        // Median on plane 0 of a wide axis: d2 = min(30, 0 + 31 / 2) = 15.
        let pixels = vec![cell(0, 0, 0), cell(0, 0, 0), cell(31, 0, 0)];
        let hist = Histogram::from_pixels(&pixels);
        let vbox = VBox::new(bounds((0, 31), (0, 0), (0, 0)), &hist);
        let Ok(Cut::Pair(first, second)) = split_box(&hist, &vbox) else {
            panic!("expected two populated halves");
        };
        assert_eq!(first.bounds().range(Axis::Red), (0, 15));
        assert_eq!(second.bounds().range(Axis::Red), (16, 31));
        assert_eq!(first.count(), 2);
        assert_eq!(second.count(), 1);
    }

    #[test]
    fn single_plane_population_shrinks() {
        let pixels = vec![cell(0, 0, 0), cell(0, 0, 0)];
        let hist = Histogram::from_pixels(&pixels);
        let vbox = VBox::new(bounds((0, 15), (0, 0), (0, 0)), &hist);
        let Ok(Cut::Shrunk(child)) = split_box(&hist, &vbox) else {
            panic!("expected the empty half to be absorbed");
        };
        assert_eq!(child.count(), 2);
        assert!(child.volume() < vbox.volume());
    }

    #[test]
    fn population_on_top_plane_shrinks() {
        let pixels = vec![cell(5, 0, 0), cell(5, 0, 0)];
        let hist = Histogram::from_pixels(&pixels);
        let vbox = VBox::new(bounds((0, 5), (0, 0), (0, 0)), &hist);
        let Ok(Cut::Shrunk(child)) = split_box(&hist, &vbox) else {
            panic!("expected the empty half to be absorbed");
        };
        assert_eq!(child.bounds().range(Axis::Red), (5, 5));
        assert_eq!(child.count(), 2);
    }

    #[test]
    fn widest_axis_is_cut() {
        let pixels = vec![cell(0, 0, 0), cell(0, 20, 0), cell(1, 10, 1)];
        let hist = Histogram::from_pixels(&pixels);
        let vbox = VBox::new(bounds((0, 1), (0, 20), (0, 1)), &hist);
        let Ok(Cut::Pair(first, second)) = split_box(&hist, &vbox) else {
            panic!("expected two populated halves");
        };
        assert_eq!(first.bounds().range(Axis::Red), (0, 1));
        assert_eq!(first.bounds().range(Axis::Blue), (0, 1));
        assert_eq!(first.bounds().g2 + 1, second.bounds().g1);
    }

    #[test]
    fn priorities() {
        let pixels = vec![cell(0, 0, 0); 3];
        let hist = Histogram::from_pixels(&pixels);
        let vbox = VBox::new(bounds((0, 1), (0, 1), (0, 0)), &hist);
        assert_eq!(Priority::Population.key(&vbox), 3);
        assert_eq!(Priority::PopulationVolume.key(&vbox), 12);
    }

    #[test]
    fn empty_pixels_rejected() {
        assert_eq!(median_cut(&[], 4), Err(QuantizeError::EmptyInput));
    }

    #[test]
    fn two_colors_two_boxes() {
        let mut pixels = vec![RGB8::new(0, 0, 0); 10];
        pixels.extend(vec![RGB8::new(255, 255, 255); 10]);
        let boxes = median_cut(&pixels, 2).unwrap();
        assert_eq!(boxes.len(), 2);
        let total: u64 = boxes.iter().map(|b| b.count()).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn stops_at_distinct_cell_count() {
        let pixels = vec![
            cell(0, 0, 0),
            cell(0, 0, 0),
            cell(10, 3, 7),
            cell(31, 31, 31),
        ];
        let boxes = median_cut(&pixels, 16).unwrap();
        assert_eq!(boxes.len(), 3);
        assert!(boxes.iter().all(|b| b.count() > 0));
    }

    #[test]
    fn one_color_stays_one_box() {
        let pixels = vec![RGB8::new(12, 200, 99); 50];
        let boxes = median_cut(&pixels, 8).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].count(), 50);
    }

    #[test]
    fn final_boxes_in_priority_order() {
        let pixels: Vec<RGB8> = (0..=255u8).map(|v| RGB8::new(v, 255 - v, v / 2)).collect();
        let boxes = median_cut(&pixels, 12).unwrap();
        assert!(boxes.len() <= 12);
        for pair in boxes.windows(2) {
            assert!(
                Priority::PopulationVolume.key(&pair[0]) >= Priority::PopulationVolume.key(&pair[1])
            );
        }
    }
}
