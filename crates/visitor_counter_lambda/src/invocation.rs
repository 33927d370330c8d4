//! Glue between the Lambda invocation convention and the counter handlers.
//!
//! The event payload and context are not consulted by the reader or the
//! incrementer; only the combined runtime inspects the payload to pick one.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use visitor_counter_core::contract::{preflight_response, ApiGatewayResponse, ResponseEncoding};

use crate::adapters::record_store::CounterStore;
use crate::handlers::incrementer::handle_increment;
use crate::handlers::reader::handle_read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Read,
    Increment,
    Preflight,
}

pub async fn respond_to_read(
    _event: LambdaEvent<Value>,
    store: &impl CounterStore,
    encoding: ResponseEncoding,
) -> Result<ApiGatewayResponse, Error> {
    handle_read(store, encoding).map_err(Error::from)
}

pub async fn respond_to_increment(
    _event: LambdaEvent<Value>,
    store: &impl CounterStore,
    encoding: ResponseEncoding,
) -> Result<ApiGatewayResponse, Error> {
    handle_increment(store, encoding).map_err(Error::from)
}

pub async fn respond_to_routed(
    event: LambdaEvent<Value>,
    store: &impl CounterStore,
    encoding: ResponseEncoding,
) -> Result<ApiGatewayResponse, Error> {
    respond_to_payload(&event.payload, store, encoding)
}

fn respond_to_payload(
    payload: &Value,
    store: &impl CounterStore,
    encoding: ResponseEncoding,
) -> Result<ApiGatewayResponse, Error> {
    match route_for_event(payload) {
        Route::Read => handle_read(store, encoding).map_err(Error::from),
        Route::Increment => handle_increment(store, encoding).map_err(Error::from),
        Route::Preflight => Ok(preflight_response()),
    }
}

/// Picks a handler from an API Gateway proxy event's HTTP method.
///
/// REST APIs carry `httpMethod`; HTTP APIs carry `requestContext.http.method`.
/// Events without a recognizable method are treated as reads.
pub fn route_for_event(event: &Value) -> Route {
    let method = event
        .get("httpMethod")
        .and_then(Value::as_str)
        .or_else(|| {
            event
                .get("requestContext")
                .and_then(|context| context.get("http"))
                .and_then(|http| http.get("method"))
                .and_then(Value::as_str)
        })
        .map(str::to_ascii_uppercase);

    match method.as_deref() {
        Some("POST" | "PUT" | "PATCH") => Route::Increment,
        Some("OPTIONS") => Route::Preflight,
        _ => Route::Read,
    }
}
