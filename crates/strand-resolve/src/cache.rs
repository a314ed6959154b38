//! Content cache keyed by `(fetchable, digest?)`. Entries are immutable once
//! published; a writer populating a key currently being computed by another caller
//! synchronizes so only one fetch per key ever runs ("single-flight").

use std::collections::HashMap;
use std::sync::Mutex;

use strand_syntax::{Expr, Fetchable};

use crate::error::{Error, ErrorKind};

type CacheKey = (Fetchable, Option<[u8; 32]>);

/// What actually lives in a published slot. Errors are flattened to a message plus
/// whether `?` may catch them since the original error's
/// sources are not necessarily `Clone`, and a cache hit has no fetch to redo anyway.
type Slot = std::sync::Arc<Mutex<Option<Result<Expr, (String, bool)>>>>;

/// Single-flight cache over resolved import expressions. Concurrent readers of a
/// published entry never block each other or the writer; a concurrent miss on the
/// same key blocks behind the in-flight computation rather than repeating it, since
/// each key gets its own `Mutex` and the computation runs while that mutex is held.
#[derive(Default)]
pub struct ImportCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl ImportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`; on a miss, runs `compute` while holding the per-key lock so a
    /// second caller racing on the exact same key waits for (and then reuses) this
    /// call's result instead of fetching twice.
    pub fn get_or_try_insert_with(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<Expr, Error>,
    ) -> Result<Expr, Error> {
        let slot = {
            let mut slots = self.slots.lock().unwrap();
            slots.entry(key).or_default().clone()
        };

        let mut guard = slot.lock().unwrap();
        if let Some(result) = &*guard {
            return result.clone().map_err(|(message, catchable)| Error {
                kind: ErrorKind::Cached { message, catchable },
                chain: Vec::new(),
            });
        }
        match compute() {
            Ok(expr) => {
                *guard = Some(Ok(expr.clone()));
                Ok(expr)
            }
            Err(err) => {
                let cached = err.into_cached();
                let replay = Error {
                    kind: ErrorKind::Cached { message: cached.0.clone(), catchable: cached.1 },
                    chain: Vec::new(),
                };
                *guard = Some(Err(cached));
                Err(replay)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn single_flight_computes_once_per_key() {
        let cache = ImportCache::new();
        let calls = AtomicU32::new(0);
        let key = (Fetchable::Missing, None);

        for _ in 0..3 {
            let _ = cache.get_or_try_insert_with(key.clone(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Expr::text("cached"))
            });
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_slots() {
        let cache = ImportCache::new();
        let _ = cache.get_or_try_insert_with((Fetchable::Missing, None), || Ok(Expr::text("a")));
        let _ = cache.get_or_try_insert_with(
            (Fetchable::Missing, Some([1; 32])),
            || Ok(Expr::text("b")),
        );
        assert_eq!(cache.len(), 2);
    }
}
