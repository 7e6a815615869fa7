use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::input::resolver::{Resolution, Resolver};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

pub trait Resolve {
    fn resolve(&self) -> Resolution;
}

impl Resolve for Resolver {
    fn resolve(&self) -> Resolution {
        Resolver::resolve(self)
    }
}

#[derive(Debug, Clone)]
struct Memo {
    value: Arc<Resolution>,
    fetched_at: Instant,
}

/// Time-gated memoization of the resolved dataset. A stale entry is
/// recomputed on the caller's thread and swapped in as a whole value.
pub struct DatasetCache<R> {
    resolver: R,
    ttl: Duration,
    memo: RwLock<Option<Memo>>,
}

impl<R: Resolve> DatasetCache<R> {
    pub fn new(resolver: R, ttl: Duration) -> Self {
        Self {
            resolver,
            ttl,
            memo: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self) -> Arc<Resolution> {
        self.get_at(Instant::now())
    }

    pub fn get_at(&self, now: Instant) -> Arc<Resolution> {
        {
            let guard = self.memo.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(memo) = guard.as_ref().filter(|m| self.is_fresh(m, now)) {
                return Arc::clone(&memo.value);
            }
        }

        let mut guard = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have refreshed while we waited for the lock.
        if let Some(memo) = guard.as_ref().filter(|m| self.is_fresh(m, now)) {
            return Arc::clone(&memo.value);
        }

        tracing::debug!(ttl_secs = self.ttl.as_secs(), "dataset cache expired, resolving");
        let value = Arc::new(self.resolver.resolve());
        *guard = if value.error.is_none() {
            Some(Memo {
                value: Arc::clone(&value),
                fetched_at: now,
            })
        } else {
            None
        };
        value
    }

    pub fn invalidate(&self) {
        let mut guard = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    fn is_fresh(&self, memo: &Memo, now: Instant) -> bool {
        now.saturating_duration_since(memo.fetched_at) < self.ttl
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/ttl.rs"]
mod tests;
