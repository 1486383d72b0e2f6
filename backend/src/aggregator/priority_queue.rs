//! Index-Addressable Priority Queue
//!
//! A binary min-heap over jump indices keyed by next fire time. The index set
//! is fixed at construction: there is exactly one entry per jump for the whole
//! run, and entries are only ever re-keyed.
//!
//! # Layout
//!
//! - `times[jump]`: current key of each jump
//! - `heap[slot]`: jump stored in each heap slot
//! - `slots[jump]`: heap slot of each jump (inverse of `heap`)
//!
//! # Complexity
//!
//! - Construction: O(N) (bottom-up heapify)
//! - `peek_min`: O(1)
//! - `update`: O(log N)
//!
//! # Determinism
//!
//! Equal times are ordered by jump index, so the minimum is unique.

use std::cmp::Ordering;

/// Min-heap of `(time, jump)` entries addressable by jump index
#[derive(Debug, Clone)]
pub struct IndexedPriorityQueue {
    times: Vec<f64>,
    heap: Vec<usize>,
    slots: Vec<usize>,
}

impl IndexedPriorityQueue {
    /// Build a queue holding one entry per jump, `times[jump]` being its key
    ///
    /// # Example
    /// ```
    /// use jump_simulator_core_rs::aggregator::IndexedPriorityQueue;
    ///
    /// let mut queue = IndexedPriorityQueue::from_times(vec![3.0, 1.0, 2.0]);
    /// assert_eq!(queue.peek_min(), Some((1.0, 1)));
    ///
    /// queue.update(1, 5.0);
    /// assert_eq!(queue.peek_min(), Some((2.0, 2)));
    /// ```
    pub fn from_times(times: Vec<f64>) -> Self {
        let n = times.len();
        let mut queue = Self {
            times,
            heap: (0..n).collect(),
            slots: (0..n).collect(),
        };
        for slot in (0..n / 2).rev() {
            queue.sift_down(slot);
        }
        queue
    }

    /// The entry with the smallest time (ties broken by smallest jump index)
    pub fn peek_min(&self) -> Option<(f64, usize)> {
        self.heap.first().map(|&jump| (self.times[jump], jump))
    }

    /// Re-key `jump`, returning its previous time (`None` for an unknown jump)
    pub fn update(&mut self, jump: usize, time: f64) -> Option<f64> {
        let previous = std::mem::replace(self.times.get_mut(jump)?, time);
        let slot = self.slots[jump];
        match time.total_cmp(&previous) {
            Ordering::Less => self.sift_up(slot),
            Ordering::Greater => self.sift_down(slot),
            Ordering::Equal => {}
        }
        Some(previous)
    }

    /// Current time of `jump`
    pub fn get(&self, jump: usize) -> Option<f64> {
        self.times.get(jump).copied()
    }

    /// All current times, indexed by jump
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    // Strict ordering on jumps: by time, then by index
    fn precedes(&self, a: usize, b: usize) -> bool {
        match self.times[a].total_cmp(&self.times[b]) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => a < b,
        }
    }

    fn swap_slots(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.slots[self.heap[i]] = i;
        self.slots[self.heap[j]] = j;
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.precedes(self.heap[slot], self.heap[parent]) {
                break;
            }
            self.swap_slots(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < n && self.precedes(self.heap[left], self.heap[smallest]) {
                smallest = left;
            }
            if right < n && self.precedes(self.heap[right], self.heap[smallest]) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap_slots(slot, smallest);
            slot = smallest;
        }
    }
}
