use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin pool of backend credentials
///
/// Every call to [`KeyRing::next_key`] advances the cursor, wrapping modulo
/// the pool size. The cursor is owned by the ring, so two pipelines never
/// share rotation state.
#[derive(Debug)]
pub(crate) struct KeyRing {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRing {
    /// Creates a ring from a non-empty credential list
    ///
    /// Returns `None` if `keys` is empty.
    pub(crate) fn new(keys: Vec<String>) -> Option<Self> {
        if keys.is_empty() {
            return None;
        }

        Some(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the next credential in rotation
    pub(crate) fn next_key(&self) -> &str {
        let position = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        &self.keys[position]
    }

    /// Number of credentials in the pool
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}
