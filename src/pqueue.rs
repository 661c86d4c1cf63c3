//! Array-backed binary min-heap ordered by an injected comparator.
//!
//! The queue knows nothing about Huffman nodes: any element type works as long
//! as the caller supplies a total preorder over it. Ties are allowed and are
//! resolved by heap position only, so callers that need a stable order must
//! fold a secondary key into the comparator.

use std::cmp::Ordering;

use log::trace;

use crate::error::{HuffmanError, Result};

const INITIAL_CAPACITY: usize = 10;

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn left(i: usize) -> usize {
    2 * i + 1
}

fn right(i: usize) -> usize {
    2 * i + 2
}

pub struct PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    data: Vec<T>,
    capacity: usize,
    compare: F,
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn new(compare: F) -> Self {
        Self::with_capacity(INITIAL_CAPACITY, compare)
    }

    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        let capacity = capacity.max(1);
        PriorityQueue {
            data: Vec::with_capacity(capacity),
            capacity,
            compare,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of slots reserved before the next doubling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// Inserts `item` and sifts it up while it compares less than its parent.
    pub fn push(&mut self, item: T) {
        if self.data.len() == self.capacity {
            self.capacity *= 2;
            self.data.reserve_exact(self.capacity - self.data.len());
            trace!("priority queue grown to {} slots", self.capacity);
        }

        self.data.push(item);
        let mut child = self.data.len() - 1;
        while child > 0 {
            let p = parent(child);
            if (self.compare)(&self.data[child], &self.data[p]) != Ordering::Less {
                break;
            }
            self.data.swap(child, p);
            child = p;
        }
    }

    /// Removes and returns the minimal element.
    ///
    /// The last element takes the root slot and is sifted down, swapping with
    /// the smaller child for as long as that child compares less.
    pub fn pop_min(&mut self) -> Result<T> {
        if self.data.is_empty() {
            return Err(HuffmanError::EmptyQueue);
        }

        let min = self.data.swap_remove(0);
        let len = self.data.len();
        let mut i = 0;
        loop {
            let l = left(i);
            if l >= len {
                break;
            }
            let r = right(i);
            let mut smaller = l;
            if r < len && (self.compare)(&self.data[r], &self.data[l]) == Ordering::Less {
                smaller = r;
            }
            if (self.compare)(&self.data[smaller], &self.data[i]) != Ordering::Less {
                break;
            }
            self.data.swap(i, smaller);
            i = smaller;
        }

        Ok(min)
    }

    /// True when no element compares less than its heap parent.
    pub fn is_heap(&self) -> bool {
        (1..self.data.len())
            .all(|i| (self.compare)(&self.data[i], &self.data[parent(i)]) != Ordering::Less)
    }
}
