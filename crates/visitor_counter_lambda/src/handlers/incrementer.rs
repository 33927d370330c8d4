use std::time::Instant;

use serde_json::json;
use visitor_counter_core::contract::{
    increment_response, ApiGatewayResponse, ResponseEncoding, INCREMENT_STEP,
};
use visitor_counter_core::error::CounterError;

use crate::adapters::record_store::CounterStore;

use super::{log_handler_error, log_handler_info};

const COMPONENT: &str = "incrementer";

/// Applies exactly one atomic add to the counter.
///
/// Concurrent invocations are serialized by the store's increment primitive;
/// nothing here reads the count before writing it.
pub fn handle_increment(
    store: &impl CounterStore,
    encoding: ResponseEncoding,
) -> Result<ApiGatewayResponse, CounterError> {
    let started_at = Instant::now();
    match store.add_to_count(INCREMENT_STEP) {
        Ok(updated_count) => {
            log_handler_info(
                COMPONENT,
                "count_incremented",
                json!({
                    "visitors": updated_count,
                    "duration_ms": started_at.elapsed().as_millis(),
                }),
            );
            Ok(increment_response(updated_count, encoding))
        }
        Err(error) => {
            log_handler_error(
                COMPONENT,
                "count_increment_failed",
                &error,
                started_at.elapsed().as_millis(),
            );
            Err(error)
        }
    }
}
