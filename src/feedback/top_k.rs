//! Bounded selection of the highest-scoring candidates.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Keeps the `capacity` highest-scoring keys seen so far.
///
/// Ordering is total and deterministic: a higher score ranks first, and among
/// equal scores the smaller key ranks first. The entry evicted on overflow is
/// therefore the lowest score, largest key.
#[derive(Debug)]
pub struct TopKSelector<K: Ord> {
    capacity: usize,
    /// Min-heap: the worst retained candidate is at the top.
    heap: BinaryHeap<Candidate<K>>,
}

#[derive(Debug, Clone)]
struct Candidate<K> {
    key: K,
    score: f64,
}

impl<K: Ord> Candidate<K> {
    /// `Less` means "ranks before".
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl<K: Ord> PartialEq for Candidate<K> {
    fn eq(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Candidate<K> {}

impl<K: Ord> PartialOrd for Candidate<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for Candidate<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // The max of the heap is the candidate ranked last.
        self.rank_cmp(other)
    }
}

impl<K: Ord> TopKSelector<K> {
    /// Create a selector retaining at most `capacity` entries.
    ///
    /// A capacity of zero retains nothing.
    pub fn new(capacity: usize) -> Self {
        TopKSelector {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1).min(4096)),
        }
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer a candidate, evicting the worst entry once over capacity.
    pub fn insert(&mut self, key: K, score: f64) {
        if self.capacity == 0 {
            return;
        }
        let candidate = Candidate { key, score };
        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
            return;
        }
        if let Some(worst) = self.heap.peek() {
            if candidate.rank_cmp(worst) == Ordering::Less {
                self.heap.pop();
                self.heap.push(candidate);
            }
        }
    }

    /// Best retained entry.
    pub fn best(&self) -> Option<(&K, f64)> {
        self.heap
            .iter()
            .min_by(|a, b| a.rank_cmp(b))
            .map(|c| (&c.key, c.score))
    }

    /// Take the retained entries, best first.
    pub fn drain(&mut self) -> Vec<(K, f64)> {
        let mut candidates: Vec<Candidate<K>> = self.heap.drain().collect();
        candidates.sort_by(|a, b| a.rank_cmp(b));
        candidates.into_iter().map(|c| (c.key, c.score)).collect()
    }

    /// Consume the selector, returning the retained entries best first.
    pub fn into_sorted_vec(mut self) -> Vec<(K, f64)> {
        self.drain()
    }
}

impl<K: Ord> Extend<(K, f64)> for TopKSelector<K> {
    fn extend<T: IntoIterator<Item = (K, f64)>>(&mut self, iter: T) {
        for (key, score) in iter {
            self.insert(key, score);
        }
    }
}
