use std::time::Instant;

use serde_json::json;
use visitor_counter_core::contract::{read_response, ApiGatewayResponse, ResponseEncoding};
use visitor_counter_core::error::CounterError;

use crate::adapters::record_store::CounterStore;

use super::{log_handler_error, log_handler_info};

const COMPONENT: &str = "reader";

/// Reads the visitor count from the first record the store returns.
///
/// An empty result is a missing record; the reader never falls back to zero.
pub fn handle_read(
    store: &impl CounterStore,
    encoding: ResponseEncoding,
) -> Result<ApiGatewayResponse, CounterError> {
    let started_at = Instant::now();
    match read_count(store) {
        Ok(count) => {
            log_handler_info(
                COMPONENT,
                "count_read",
                json!({
                    "visitors": count,
                    "duration_ms": started_at.elapsed().as_millis(),
                }),
            );
            Ok(read_response(count, encoding))
        }
        Err(error) => {
            log_handler_error(
                COMPONENT,
                "count_read_failed",
                &error,
                started_at.elapsed().as_millis(),
            );
            Err(error)
        }
    }
}

fn read_count(store: &impl CounterStore) -> Result<u64, CounterError> {
    let records = store.query_records()?;
    records
        .into_iter()
        .next()
        .map(|record| record.visitors)
        .ok_or_else(|| CounterError::missing_record(store.table_name(), store.counter_key()))
}
