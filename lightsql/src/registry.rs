///
/// Process-wide registry of named shared in-memory databases.
///
/// A `Locator::SharedMemory(name)` session attaches to the engine's shared
/// cache under a URI derived from `name`. The engine drops the store when
/// its last connection closes; the registry mirrors that lifetime with a
/// reference count per name so callers can see which stores are alive.
///

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use tracing::debug;

static REGISTRY: LazyLock<MemoryRegistry> = LazyLock::new(MemoryRegistry::new);

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    stores: Mutex<HashMap<String, usize>>,
}

impl MemoryRegistry {
    fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static MemoryRegistry {
        &REGISTRY
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of open sessions attached to `name`; 0 once torn down.
    pub fn session_count(&self, name: &str) -> usize {
        self.lock().get(name).copied().unwrap_or(0)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn acquire(&self, name: &str) -> usize {
        let mut stores = self.lock();
        let count = stores.entry(name.to_string()).or_insert(0);
        *count += 1;
        debug!(store = name, sessions = *count, "shared memory store attached");
        *count
    }

    pub(crate) fn release(&self, name: &str) -> usize {
        let mut stores = self.lock();
        let Some(count) = stores.get_mut(name) else {
            return 0;
        };
        if *count > 1 {
            *count -= 1;
            return *count;
        }
        stores.remove(name);
        debug!(store = name, "shared memory store torn down");
        0
    }

    pub(crate) fn uri(name: &str) -> String {
        let mut escaped = String::with_capacity(name.len());
        for ch in name.chars() {
            match ch {
                '%' => escaped.push_str("%25"),
                '?' => escaped.push_str("%3f"),
                '#' => escaped.push_str("%23"),
                '&' => escaped.push_str("%26"),
                '/' => escaped.push_str("%2f"),
                other => escaped.push(other),
            }
        }
        format!("file:{escaped}?mode=memory&cache=shared")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_counting() {
        let registry = MemoryRegistry::new();
        assert_eq!(registry.acquire("a"), 1);
        assert_eq!(registry.acquire("a"), 2);
        assert_eq!(registry.session_count("a"), 2);
        assert_eq!(registry.release("a"), 1);
        assert_eq!(registry.release("a"), 0);
        assert_eq!(registry.session_count("a"), 0);
        assert!(registry.names().is_empty());
        assert_eq!(registry.release("never"), 0);
    }

    #[test]
    fn test_uri_escapes_reserved_characters() {
        assert_eq!(
            MemoryRegistry::uri("memdb1"),
            "file:memdb1?mode=memory&cache=shared"
        );
        assert_eq!(
            MemoryRegistry::uri("a?b#c"),
            "file:a%3fb%23c?mode=memory&cache=shared"
        );
    }
}
