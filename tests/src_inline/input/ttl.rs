use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::input::SourceError;
use crate::model::dataset::{Dataset, Provenance};
use crate::model::record::{RawRecord, StudyRecord};

struct CountingResolver {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingResolver {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolve for CountingResolver {
    fn resolve(&self) -> Resolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Resolution {
                dataset: Dataset::empty(),
                skipped_rows: 0,
                warning: None,
                error: Some(SourceError::NotConfigured),
            };
        }
        let record = StudyRecord {
            raw: RawRecord {
                study_code: Some("001.001.24".to_string()),
                total_batches: 1,
                ..RawRecord::default()
            },
            year: Some("2024".to_string()),
            company_name: Some("ACME".to_string()),
            last_update: None,
        };
        Resolution {
            dataset: Dataset::new(vec![record], Provenance::Local),
            skipped_rows: 0,
            warning: None,
            error: None,
        }
    }
}

#[test]
fn test_default_ttl_is_five_minutes() {
    assert_eq!(DEFAULT_TTL, Duration::from_secs(300));
}

#[test]
fn test_reuses_value_within_ttl() {
    let cache = DatasetCache::new(CountingResolver::new(false), Duration::from_secs(60));
    let t0 = Instant::now();
    let a = cache.get_at(t0);
    let b = cache.get_at(t0 + Duration::from_secs(59));
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.resolver.calls(), 1);
}

#[test]
fn test_resolves_again_after_ttl() {
    let cache = DatasetCache::new(CountingResolver::new(false), Duration::from_secs(60));
    let t0 = Instant::now();
    let a = cache.get_at(t0);
    let b = cache.get_at(t0 + Duration::from_secs(60));
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(cache.resolver.calls(), 2);
}

#[test]
fn test_failures_are_not_memoized() {
    let cache = DatasetCache::new(CountingResolver::new(true), Duration::from_secs(60));
    let t0 = Instant::now();
    assert!(cache.get_at(t0).error.is_some());
    assert!(cache.get_at(t0 + Duration::from_secs(1)).error.is_some());
    assert_eq!(cache.resolver.calls(), 2);
}

#[test]
fn test_invalidate_forces_refresh() {
    let cache = DatasetCache::new(CountingResolver::new(false), Duration::from_secs(60));
    let t0 = Instant::now();
    cache.get_at(t0);
    cache.invalidate();
    cache.get_at(t0 + Duration::from_secs(1));
    assert_eq!(cache.resolver.calls(), 2);
}

#[test]
fn test_concurrent_readers_share_one_resolution() {
    let cache = DatasetCache::new(CountingResolver::new(false), Duration::from_secs(60));
    let t0 = Instant::now();
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                let res = cache.get_at(t0);
                assert_eq!(res.dataset.len(), 1);
            });
        }
    });
    assert_eq!(cache.resolver.calls(), 1);
}
