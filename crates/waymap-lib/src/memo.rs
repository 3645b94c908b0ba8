//! Single-slot memoization for derived render layers.

use std::sync::Arc;

/// Single-slot cache remembering the last value and the inputs it was built from.
///
/// `get_or_compute` only runs the computation when the key differs from the
/// stored one; otherwise the shared value is handed back.
#[derive(Debug)]
pub struct Memo<K, V> {
    slot: Option<(K, Arc<V>)>,
    computations: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            slot: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some((cached_key, value)) = &self.slot {
            if *cached_key == key {
                return Arc::clone(value);
            }
        }
        let value = Arc::new(compute());
        self.computations += 1;
        self.slot = Some((key, Arc::clone(&value)));
        value
    }

    /// Number of times the computation has run.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
