use std::collections::VecDeque;

use crate::ids::Tick;
use crate::record::Ticked;

/// Bounded FIFO of tick-stamped records (§2, §3).
///
/// Entries must be pushed in strictly increasing tick order; an
/// older-or-equal tick is rejected. Capacity is fixed at construction —
/// once full, the oldest entry is dropped to make room for the newest,
/// matching `SnapshotBuffer`'s and `PhysicsHistory`'s ring-array eviction.
#[derive(Debug)]
pub struct RingHistory<T: Ticked> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T: Ticked> RingHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns `false` (and drops the entry) if `tick` is not strictly
    /// greater than the newest entry already stored.
    pub fn push(&mut self, entry: T) -> bool {
        if let Some(last) = self.entries.back() {
            if entry.tick() <= last.tick() {
                return false;
            }
        }
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn get(&self, tick: Tick) -> Option<&T> {
        self.entries.iter().find(|e| e.tick() == tick)
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Drops every entry with `tick <= watermark`.
    pub fn retain_after(&mut self, watermark: Tick) {
        self.entries.retain(|e| e.tick() > watermark);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Removes and returns, in tick order, every entry with `tick >
    /// watermark`; clears the rest. Used by reconciliation replay (§4.2
    /// step 5): after this call the history is empty and ready to be
    /// repopulated tick-by-tick as the caller re-simulates.
    pub fn take_after(&mut self, watermark: Tick) -> Vec<T>
    where
        T: Clone,
    {
        let tail: Vec<T> = self
            .entries
            .iter()
            .filter(|e| e.tick() > watermark)
            .cloned()
            .collect();
        self.entries.clear();
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Rec(Tick);
    impl Ticked for Rec {
        fn tick(&self) -> Tick {
            self.0
        }
    }

    #[test]
    fn rejects_non_increasing_ticks() {
        let mut h: RingHistory<Rec> = RingHistory::new(4);
        assert!(h.push(Rec(1)));
        assert!(!h.push(Rec(1)));
        assert!(!h.push(Rec(0)));
        assert!(h.push(Rec(2)));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut h: RingHistory<Rec> = RingHistory::new(3);
        for t in 1..=5u32 {
            h.push(Rec(t));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.oldest().unwrap().0, 3);
        assert_eq!(h.latest().unwrap().0, 5);
    }

    #[test]
    fn take_after_drains_tail_and_clears() {
        let mut h: RingHistory<Rec> = RingHistory::new(8);
        for t in 1..=5u32 {
            h.push(Rec(t));
        }
        let tail = h.take_after(2);
        assert_eq!(tail, vec![Rec(3), Rec(4), Rec(5)]);
        assert!(h.is_empty());
    }

    #[test]
    fn monotonic_capacity_invariant() {
        let mut h: RingHistory<Rec> = RingHistory::new(128);
        for t in 1..=200u32 {
            h.push(Rec(t));
        }
        assert!(h.len() <= 128);
        let ticks: Vec<Tick> = h.iter().map(|r| r.0).collect();
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }
}
