//! Write-once store of solved positions.

use crate::model::{GameState, Points};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Values of solved states, keyed by the full position.
///
/// Entries are never evicted: the reachable state space is finite and heavily
/// shared between sibling subtrees.
#[derive(Debug, Default)]
pub struct TranspositionCache {
    entries: HashMap<GameState, Points>,
    hits: u64,
    misses: u64,
}

impl TranspositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Lookup that counts towards hit/miss statistics.
    pub fn get(&mut self, state: &GameState) -> Option<Points> {
        match self.entries.get(state) {
            Some(&value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn peek(&self, state: &GameState) -> Option<Points> {
        self.entries.get(state).copied()
    }

    /// Records a solved value. The first write for a state wins.
    pub fn insert(&mut self, state: GameState, value: Points) {
        let stored = *self.entries.entry(state).or_insert(value);
        debug_assert_eq!(stored, value, "conflicting values for one state");
    }

    /// Folds in the entries of a cache filled by another worker.
    pub fn merge(&mut self, other: TranspositionCache) {
        self.hits += other.hits;
        self.misses += other.misses;
        if self.entries.is_empty() {
            self.entries = other.entries;
            return;
        }
        for (state, value) in other.entries {
            self.insert(state, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BidLevel;

    fn state(money: u32) -> GameState {
        GameState::new(money, 8, [5, 4], BidLevel::Open)
    }

    #[test]
    fn get_tracks_hits_and_misses() {
        let mut cache = TranspositionCache::new();
        assert_eq!(cache.get(&state(1)), None);
        cache.insert(state(1), 4);
        assert_eq!(cache.get(&state(1)), Some(4));
        assert_eq!(cache.peek(&state(2)), None);
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn first_write_is_kept() {
        let mut cache = TranspositionCache::new();
        cache.insert(state(3), 6);
        cache.insert(state(3), 6);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek(&state(3)), Some(6));
    }

    #[test]
    fn merge_combines_disjoint_workers() {
        let mut left = TranspositionCache::new();
        left.insert(state(1), 4);
        let _ = left.get(&state(1));
        let mut right = TranspositionCache::new();
        right.insert(state(1), 4);
        right.insert(state(2), 5);
        let _ = right.get(&state(9));

        left.merge(right);
        assert_eq!(left.len(), 2);
        assert_eq!(left.peek(&state(2)), Some(5));
        assert_eq!(left.stats().hits, 1);
        assert_eq!(left.stats().misses, 1);

        left.clear();
        assert!(left.is_empty());
        assert_eq!(left.stats(), CacheStats::default());
    }
}
