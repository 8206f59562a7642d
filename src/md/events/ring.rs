/*
    mission-geometry, frame transformations and event location for mission analysis
    Copyright (C) 2024-onwards the mission-geometry developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

/// Fixed capacity circular buffer: once full, each insertion overwrites the oldest entry.
///
/// This bounds the memory used by the event history regardless of how long the trajectory is.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    data: Vec<T>,
    capacity: usize,
    next: usize,
    fill: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer; a capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            next: 0,
            fill: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.data.len() < self.capacity {
            self.data.push(item);
        } else {
            self.data[self.next] = item;
        }
        self.next = (self.next + 1) % self.capacity;
        self.fill = (self.fill + 1).min(self.capacity);
    }

    /// Number of stored items, saturates at the capacity.
    pub fn len(&self) -> usize {
        self.fill
    }

    pub fn is_empty(&self) -> bool {
        self.fill == 0
    }

    pub fn is_full(&self) -> bool {
        self.fill == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the n-th most recent item, `nth_latest(0)` being the last one pushed.
    pub fn nth_latest(&self, n: usize) -> Option<&T> {
        if n >= self.fill {
            return None;
        }
        let idx = (self.next + self.capacity - 1 - n) % self.capacity;
        self.data.get(idx)
    }

    pub fn latest(&self) -> Option<&T> {
        self.nth_latest(0)
    }

    /// The two most recent items, as (previous, latest).
    pub fn latest_pair(&self) -> Option<(&T, &T)> {
        Some((self.nth_latest(1)?, self.nth_latest(0)?))
    }

    /// Iterates from the oldest to the most recent item.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = if self.fill < self.capacity { 0 } else { self.next };
        (0..self.fill).map(move |i| &self.data[(start + i) % self.capacity])
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.next = 0;
        self.fill = 0;
    }
}
