use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use visitor_counter_core::contract::{CounterRecord, COUNTER_KEY, DEFAULT_TABLE_NAME};
use visitor_counter_core::error::CounterError;

use crate::adapters::record_store::CounterStore;

/// Process-local counter store mirroring DynamoDB's `ADD` semantics.
///
/// Adding to an absent record creates it unless `require_existing` is set.
#[derive(Debug)]
pub struct InMemoryCounterStore {
    table: String,
    key: String,
    count: Mutex<Option<u64>>,
    require_existing: bool,
    available: bool,
    queries: AtomicUsize,
    adds: AtomicUsize,
}

impl InMemoryCounterStore {
    pub fn empty() -> Self {
        Self {
            table: DEFAULT_TABLE_NAME.to_string(),
            key: COUNTER_KEY.to_string(),
            count: Mutex::new(None),
            require_existing: false,
            available: true,
            queries: AtomicUsize::new(0),
            adds: AtomicUsize::new(0),
        }
    }

    pub fn with_count(visitors: u64) -> Self {
        Self {
            count: Mutex::new(Some(visitors)),
            ..Self::empty()
        }
    }

    /// A store whose every call fails as if the service were unreachable.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::empty()
        }
    }

    pub fn require_existing(mut self) -> Self {
        self.require_existing = true;
        self
    }

    pub fn current(&self) -> Result<Option<u64>, CounterError> {
        Ok(*self.lock()?)
    }

    pub fn query_calls(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn add_calls(&self) -> usize {
        self.adds.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<u64>>, CounterError> {
        self.count
            .lock()
            .map_err(|_| CounterError::dependency_unavailable("in-memory counter lock poisoned"))
    }

    fn ensure_available(&self) -> Result<(), CounterError> {
        if self.available {
            Ok(())
        } else {
            Err(CounterError::dependency_unavailable(format!(
                "table '{}' is unreachable",
                self.table
            )))
        }
    }
}

impl CounterStore for InMemoryCounterStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn counter_key(&self) -> &str {
        &self.key
    }

    fn query_records(&self) -> Result<Vec<CounterRecord>, CounterError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let count = *self.lock()?;
        Ok(count
            .map(|visitors| vec![CounterRecord::new(self.key.clone(), visitors)])
            .unwrap_or_default())
    }

    fn add_to_count(&self, amount: u64) -> Result<u64, CounterError> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let mut count = self.lock()?;
        let updated = match *count {
            Some(visitors) => visitors.checked_add(amount).ok_or_else(|| {
                CounterError::malformed_record(format!(
                    "adding {amount} to {visitors} overflows the count"
                ))
            })?,
            None if self.require_existing => {
                return Err(CounterError::missing_record(&self.table, &self.key));
            }
            None => amount,
        };
        *count = Some(updated);
        Ok(updated)
    }
}
