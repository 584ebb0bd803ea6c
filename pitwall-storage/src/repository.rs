//! ## pitwall-storage::repository
//! **Retention- and capacity-bounded sample store**
//!
//! Samples are kept ordered by timestamp, ties in insertion order. Every
//! `add` runs insert, cap enforcement and window eviction under one write
//! lock, so readers never see a half-applied append.

use std::collections::VecDeque;

use parking_lot::RwLock;
use tracing::{debug, trace};

use pitwall_config::StorageConfig;
use pitwall_core::sample::DEFAULT_MAX_GEAR;
use pitwall_core::{QueryError, Sample};

use crate::cursor;
use crate::query::{QueryPage, QueryParams};

/// Limits applied by one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub retention_ms: u64,
    pub max_samples: usize,
    pub default_limit: u32,
    pub max_limit: u32,
    /// Highest gear accepted by sample validation.
    pub max_gear: u8,
}

impl RepositoryOptions {
    pub fn from_config(config: &StorageConfig, max_gear: u8) -> Self {
        Self {
            retention_ms: config.retention_ms,
            max_samples: config.max_samples,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
            max_gear,
        }
    }
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default(), DEFAULT_MAX_GEAR)
    }
}

pub struct Repository {
    options: RepositoryOptions,
    samples: RwLock<VecDeque<Sample>>,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new(RepositoryOptions::default())
    }
}

impl Repository {
    pub fn new(options: RepositoryOptions) -> Self {
        Self {
            options,
            samples: RwLock::new(VecDeque::new()),
        }
    }

    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    /// Stores `sample`. Invalid samples are ignored and `false` is returned.
    pub fn add(&self, sample: Sample) -> bool {
        if let Err(error) = sample.validate(self.options.max_gear) {
            debug!(%error, timestamp = sample.timestamp, "rejecting invalid sample");
            return false;
        }
        let timestamp = sample.timestamp;

        let mut samples = self.samples.write();
        let position = samples.partition_point(|s| s.timestamp <= timestamp);
        samples.insert(position, sample);

        let excess = samples.len().saturating_sub(self.options.max_samples);
        if excess > 0 {
            samples.drain(..excess);
            trace!(excess, "dropped samples over capacity");
        }

        // Keyed off the newest stored sample, so a late arrival cannot
        // reopen the window behind it.
        let newest = samples.back().map_or(timestamp, |s| s.timestamp);
        let cutoff = newest.saturating_sub(self.options.retention_ms);
        let expired = samples.partition_point(|s| s.timestamp < cutoff);
        if expired > 0 {
            samples.drain(..expired);
            debug!(expired, cutoff, "evicted samples outside retention window");
        }
        true
    }

    /// Returns one page of samples with `from <= timestamp < to`.
    pub fn query(&self, params: &QueryParams) -> Result<QueryPage, QueryError> {
        let limit = params.limit.unwrap_or(self.options.default_limit);
        if !(1..=self.options.max_limit).contains(&limit) {
            return Err(QueryError::InvalidLimit {
                value: limit.to_string(),
                max: self.options.max_limit,
            });
        }
        let offset = params.cursor.as_deref().map_or(0, cursor::decode);

        let samples = self.samples.read();
        let start = params
            .from
            .map_or(0, |from| samples.partition_point(|s| s.timestamp < from));
        let end = params
            .to
            .map_or(samples.len(), |to| samples.partition_point(|s| s.timestamp < to))
            .max(start);
        let total_available = end - start;

        let offset = usize::try_from(offset).unwrap_or(usize::MAX).min(total_available);
        let page: Vec<Sample> = samples
            .range(start..end)
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect();

        let next_cursor = if page.is_empty() {
            None
        } else {
            Some(cursor::encode((offset + page.len()) as u64))
        };

        Ok(QueryPage {
            samples: page,
            next_cursor,
            total_available,
        })
    }

    pub fn size(&self) -> usize {
        self.samples.read().len()
    }

    pub fn clear(&self) {
        self.samples.write().clear();
    }

    /// Newest stored sample.
    pub fn latest(&self) -> Option<Sample> {
        self.samples.read().back().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::TireTemps;
    use proptest::prelude::*;

    fn sample(timestamp: u64) -> Sample {
        Sample {
            timestamp,
            vehicle_id: "car-1".into(),
            speed_kph: 100.0,
            rpm: 6_000.0,
            gear: 3,
            throttle_pct: 50.0,
            brake_pct: 0.0,
            steering_deg: 0.0,
            coolant_c: 90.0,
            oil_c: 98.0,
            battery_v: 12.8,
            state_of_charge: 75.0,
            tire_temps: TireTemps::uniform(80.0),
            latitude: 0.0,
            longitude: 0.0,
            lap: 0,
            sector: 0,
        }
    }

    fn repository(retention_ms: u64, max_samples: usize) -> Repository {
        Repository::new(RepositoryOptions {
            retention_ms,
            max_samples,
            ..RepositoryOptions::default()
        })
    }

    fn timestamps(page: &QueryPage) -> Vec<u64> {
        page.samples.iter().map(|s| s.timestamp).collect()
    }

    #[test]
    fn retention_window_evicts_old_samples() {
        let repo = repository(1_000, 100);
        assert!(repo.add(sample(0)));
        assert!(repo.add(sample(500)));
        assert!(repo.add(sample(1_500)));
        assert_eq!(repo.size(), 2);
        let page = repo.query(&QueryParams::default()).unwrap();
        assert_eq!(timestamps(&page), [500, 1_500]);
    }

    #[test]
    fn hard_cap_drops_oldest() {
        let repo = repository(u64::MAX, 3);
        for t in 0..5 {
            repo.add(sample(t));
        }
        assert_eq!(repo.size(), 3);
        let page = repo.query(&QueryParams::default()).unwrap();
        assert_eq!(timestamps(&page), [2, 3, 4]);
    }

    #[test]
    fn invalid_samples_are_ignored() {
        let repo = Repository::default();
        let bad = Sample {
            throttle_pct: 140.0,
            ..sample(0)
        };
        assert!(!repo.add(bad));
        let bad_gear = Sample {
            gear: 9,
            ..sample(0)
        };
        assert!(!repo.add(bad_gear));
        assert_eq!(repo.size(), 0);
    }

    #[test]
    fn late_samples_insert_after_equal_timestamps() {
        let repo = Repository::default();
        let tagged = |t, lap| Sample { lap, ..sample(t) };
        repo.add(tagged(10, 1));
        repo.add(tagged(30, 2));
        repo.add(tagged(20, 3));
        repo.add(tagged(20, 4));
        let page = repo.query(&QueryParams::default()).unwrap();
        let laps: Vec<u32> = page.samples.iter().map(|s| s.lap).collect();
        assert_eq!(laps, [1, 3, 4, 2]);
        assert_eq!(repo.latest().map(|s| s.lap), Some(2));
    }

    #[test]
    fn late_sample_outside_window_is_not_kept() {
        let repo = repository(1_000, 100);
        assert!(repo.add(sample(5_000)));
        repo.add(sample(0));
        repo.add(sample(4_500));
        let page = repo.query(&QueryParams::default()).unwrap();
        assert_eq!(timestamps(&page), [4_500, 5_000]);
        let latest = repo.latest().unwrap().timestamp;
        assert!(page.samples.iter().all(|s| s.timestamp >= latest - 1_000));
    }

    #[test]
    fn concurrent_readers_never_see_a_torn_append() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let max_samples = 200;
        let repo = repository(1_000, max_samples);
        let done = AtomicBool::new(false);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while !done.load(Ordering::Acquire) {
                        assert!(repo.size() <= max_samples);
                        let page = repo.query(&QueryParams::with_limit(500)).unwrap();
                        assert!(page.samples.len() <= max_samples);
                        assert_eq!(page.total_available, page.samples.len());
                        assert!(page.samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
                        if let (Some(first), Some(last)) = (page.samples.first(), page.samples.last()) {
                            assert!(first.timestamp >= last.timestamp.saturating_sub(1_000));
                        }
                    }
                });
            }

            scope.spawn(|| {
                // Some samples arrive slightly late, a few far outside the window.
                for t in 0..20_000u64 {
                    let timestamp = match t {
                        t if t % 50 == 0 => (t * 3).saturating_sub(1_500),
                        t if t % 3 == 0 => (t * 3).saturating_sub(20),
                        t => t * 3,
                    };
                    repo.add(sample(timestamp));
                }
                done.store(true, Ordering::Release);
            });
        });

        assert!(repo.size() <= max_samples);
    }

    #[test]
    fn range_is_half_open() {
        let repo = Repository::default();
        for t in [100, 200, 300, 400] {
            repo.add(sample(t));
        }
        let params = QueryParams {
            from: Some(200),
            to: Some(400),
            ..QueryParams::default()
        };
        let page = repo.query(&params).unwrap();
        assert_eq!(timestamps(&page), [200, 300]);
        assert_eq!(page.total_available, 2);
        assert!(page.next_cursor.is_some());
    }

    #[test]
    fn limit_one_pages_through_three_samples() {
        let repo = Repository::default();
        for t in [1, 2, 3] {
            repo.add(sample(t));
        }
        let mut params = QueryParams::with_limit(1);
        for expected in [1, 2, 3] {
            let page = repo.query(&params).unwrap();
            assert_eq!(timestamps(&page), [expected]);
            assert_eq!(page.total_available, 3);
            params = params.after(page.next_cursor.as_deref().unwrap());
        }
        let last = repo.query(&params).unwrap();
        assert!(last.samples.is_empty());
        assert!(last.next_cursor.is_none());
    }

    #[test]
    fn malformed_cursor_starts_over() {
        let repo = Repository::default();
        repo.add(sample(1));
        let params = QueryParams {
            cursor: Some("not-a-cursor".into()),
            ..QueryParams::default()
        };
        assert_eq!(timestamps(&repo.query(&params).unwrap()), [1]);
    }

    #[test]
    fn limit_outside_range_is_an_error() {
        let repo = Repository::default();
        repo.add(sample(1));
        for limit in [0, 501] {
            assert!(matches!(
                repo.query(&QueryParams::with_limit(limit)),
                Err(QueryError::InvalidLimit { max: 500, .. })
            ));
        }
    }

    #[test]
    fn clear_empties_the_store() {
        let repo = Repository::default();
        repo.add(sample(1));
        repo.clear();
        assert_eq!(repo.size(), 0);
        assert!(repo.latest().is_none());
    }

    proptest! {
        #[test]
        fn following_cursors_yields_the_filtered_set(
            stamps in proptest::collection::vec(0u64..1_000, 0..120),
            from in proptest::option::of(0u64..1_000),
            to in proptest::option::of(0u64..1_000),
            limit in 1u32..20,
        ) {
            let repo = Repository::default();
            for t in &stamps {
                repo.add(sample(*t));
            }
            let mut expected: Vec<u64> = stamps
                .iter()
                .copied()
                .filter(|t| from.map_or(true, |f| *t >= f) && to.map_or(true, |e| *t < e))
                .collect();
            expected.sort_unstable();

            let mut params = QueryParams { from, to, limit: Some(limit), cursor: None };
            let mut seen = Vec::new();
            loop {
                let page = repo.query(&params).unwrap();
                prop_assert_eq!(page.total_available, expected.len());
                prop_assert!(page.samples.len() <= limit as usize);
                seen.extend(timestamps(&page));
                match page.next_cursor {
                    Some(next) => params = params.after(&next),
                    None => break,
                }
            }
            prop_assert_eq!(seen, expected);
        }
    }
}
