use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Comparator placing the highest-priority element first.
pub type Compare<T> = fn(&T, &T) -> Ordering;

/// A priority queue that sorts lazily.
///
/// Inserts only mark the queue dirty; the contents are re-sorted (stable)
/// the next time an ordered read happens. The comparator is fixed for the
/// lifetime of the queue.
#[derive(Debug, Clone)]
pub struct SortedQueue<T> {
    contents: VecDeque<T>,
    compare: Compare<T>,
    sorted: bool,
}

impl<T> SortedQueue<T> {
    pub fn new(compare: Compare<T>) -> Self {
        Self {
            contents: VecDeque::new(),
            compare,
            sorted: true,
        }
    }

    fn sort_if_dirty(&mut self) {
        if !self.sorted {
            let compare = self.compare;
            self.contents.make_contiguous().sort_by(compare);
            self.sorted = true;
        }
    }

    /// Insert at the front without sorting.
    pub fn insert_front(&mut self, item: T) {
        self.contents.push_front(item);
        self.sorted = false;
    }

    /// Remove and return the highest-priority element.
    pub fn pop_highest(&mut self) -> Option<T> {
        self.sort_if_dirty();
        self.contents.pop_front()
    }

    /// Element at `index` in priority order.
    pub fn get(&mut self, index: usize) -> Option<&T> {
        self.sort_if_dirty();
        self.contents.get(index)
    }

    /// All elements in priority order.
    pub fn contents_ordered(&mut self) -> &[T] {
        self.sort_if_dirty();
        self.contents.make_contiguous()
    }

    /// Take over every element of `other`. Ranking is redone under this
    /// queue's comparator on the next ordered read.
    pub fn merge_from(&mut self, other: SortedQueue<T>) {
        if other.contents.is_empty() {
            return;
        }
        self.contents.extend(other.contents);
        self.sorted = false;
    }

    /// Consume the queue, returning its elements in priority order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        self.sort_if_dirty();
        self.contents.into()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}
