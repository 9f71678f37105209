use std::collections::hash_map::DefaultHasher;
use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};

pub const DEFAULT_DEDUP_CAPACITY: usize = 4096;

/// Exactly-once admission of message texts, bounded by evicting the oldest entry.
#[derive(Debug)]
pub struct SeenTexts {
    capacity: usize,
    order: VecDeque<u64>,
    seen: HashSet<u64>,
}

impl Default for SeenTexts {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEDUP_CAPACITY)
    }
}

impl SeenTexts {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains(&text_hash(text))
    }

    /// Returns false if `text` was already admitted.
    pub fn admit(&mut self, text: &str) -> bool {
        let hash = text_hash(text);
        if !self.seen.insert(hash) {
            return false;
        }
        self.order.push_back(hash);
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.seen.remove(&old);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }
}

fn text_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_once() {
        let mut seen = SeenTexts::default();
        assert!(seen.admit("#n1 ✅"));
        assert!(!seen.admit("#n1 ✅"));
        assert!(seen.contains("#n1 ✅"));
        assert!(seen.admit("#n1 ✅ "));
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut seen = SeenTexts::with_capacity(2);
        seen.admit("a");
        seen.admit("b");
        seen.admit("c");
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains("a"));
        assert!(seen.contains("b"));
        assert!(seen.admit("a"));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut seen = SeenTexts::with_capacity(8);
        seen.admit("a");
        seen.clear();
        assert!(seen.is_empty());
        assert!(seen.admit("a"));
    }
}
