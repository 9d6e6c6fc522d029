use std::sync::Mutex;

use crate::domain::UsageRecord;

/// Append-only, process-lifetime log of usage records.
///
/// Insertion order is arrival order and is never disturbed; records are
/// never mutated or deleted. The lock makes the count returned by
/// [`UsageStore::append`] the appending caller's own position in the log,
/// monotonically increasing under concurrent writers.
#[derive(Debug, Default)]
pub struct UsageStore {
    records: Mutex<Vec<UsageRecord>>,
}

impl UsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns the new total count.
    pub fn append(&self, record: UsageRecord) -> usize {
        let mut records = self.records.lock().expect("usage store lock poisoned");
        records.push(record);
        records.len()
    }

    /// Returns the last `limit` records in arrival order.
    ///
    /// A `limit` at or above the stored count returns everything; zero or
    /// negative returns nothing.
    pub fn tail(&self, limit: i64) -> Vec<UsageRecord> {
        if limit <= 0 {
            return Vec::new();
        }
        let records = self.records.lock().expect("usage store lock poisoned");
        let skip = records.len().saturating_sub(limit as usize);
        records[skip..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("usage store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hour: u8, energy_kwh: f64) -> UsageRecord {
        UsageRecord {
            timestamp: format!("2025-07-22T{hour:02}:00:00Z"),
            energy_kwh,
            device_id: "METER_MAIN".to_string(),
        }
    }

    #[test]
    fn append_returns_running_count() {
        let store = UsageStore::new();
        assert_eq!(store.append(record(0, 1.0)), 1);
        assert_eq!(store.append(record(1, 1.0)), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn tail_returns_most_recent_in_arrival_order() {
        let store = UsageStore::new();
        store.append(record(0, 1.0));
        store.append(record(6, 1.5));
        store.append(record(17, 2.5));

        let tail = store.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0], record(6, 1.5));
        assert_eq!(tail[1], record(17, 2.5));
    }

    #[test]
    fn tail_beyond_count_returns_everything() {
        let store = UsageStore::new();
        store.append(record(0, 1.0));
        assert_eq!(store.tail(100).len(), 1);
    }

    #[test]
    fn tail_with_non_positive_limit_is_empty() {
        let store = UsageStore::new();
        store.append(record(0, 1.0));
        assert!(store.tail(0).is_empty());
        assert!(store.tail(-3).is_empty());
    }

    #[test]
    fn tail_is_idempotent_between_appends() {
        let store = UsageStore::new();
        store.append(record(0, 1.0));
        store.append(record(1, 2.0));
        assert_eq!(store.tail(10), store.tail(10));
    }

    #[test]
    fn concurrent_appends_keep_counts_distinct() {
        use std::sync::Arc;

        let store = Arc::new(UsageStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                (0u8..50).map(|h| store.append(record(h % 24, 1.0))).collect::<Vec<_>>()
            }));
        }

        let mut counts: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        counts.sort_unstable();

        // Every append observed a unique, gap-free position.
        assert_eq!(counts, (1..=400).collect::<Vec<_>>());
        assert_eq!(store.len(), 400);
    }
}
