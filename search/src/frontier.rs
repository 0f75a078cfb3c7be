//! Min-cost frontier for uniform-cost search.
//!
//! `BinaryHeap` is a max-heap, so entries are keyed by
//! `Reverse<FrontierKey>` to pop the lowest cost first. Equal costs pop in
//! push order: the key carries a monotonically increasing creation counter.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Ordering key: `(cost, creation_order)`, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrontierKey {
    pub cost: u32,
    pub creation_order: u64,
}

#[derive(Debug)]
struct FrontierEntry<T> {
    key: Reverse<FrontierKey>,
    item: T,
}

impl<T> PartialEq for FrontierEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for FrontierEntry<T> {}

impl<T> PartialOrd for FrontierEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for FrontierEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Priority queue of items keyed by accumulated cost.
#[derive(Debug)]
pub struct CostFrontier<T> {
    heap: BinaryHeap<FrontierEntry<T>>,
    next_order: u64,
    high_water: u64,
}

impl<T> CostFrontier<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_order: 0,
            high_water: 0,
        }
    }

    /// Push `item` at `cost`. Returns the key it was filed under.
    pub fn push(&mut self, cost: u32, item: T) -> FrontierKey {
        let key = FrontierKey {
            cost,
            creation_order: self.next_order,
        };
        self.next_order += 1;
        self.heap.push(FrontierEntry {
            key: Reverse(key),
            item,
        });
        self.high_water = self.high_water.max(self.heap.len() as u64);
        key
    }

    /// Remove the cheapest item, oldest first among equal costs.
    pub fn pop(&mut self) -> Option<(u32, T)> {
        self.heap.pop().map(|entry| (entry.key.0.cost, entry.item))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Largest size the frontier has reached.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }
}

impl<T> Default for CostFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}
