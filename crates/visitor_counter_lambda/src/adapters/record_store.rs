use visitor_counter_core::contract::CounterRecord;
use visitor_counter_core::error::CounterError;

/// Point lookup and atomic increment against the counter record.
///
/// Implementations are keyed by a fixed identifier chosen at construction time,
/// so neither operation takes a key.
pub trait CounterStore {
    fn table_name(&self) -> &str;

    fn counter_key(&self) -> &str;

    fn query_records(&self) -> Result<Vec<CounterRecord>, CounterError>;

    /// Atomically adds `amount` to the stored count and returns the new value.
    fn add_to_count(&self, amount: u64) -> Result<u64, CounterError>;
}

