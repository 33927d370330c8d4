use serde_json::json;
use visitor_counter_core::error::CounterError;

pub mod incrementer;
pub mod reader;

fn log_handler_info(component: &str, event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_handler_error(component: &str, event: &str, error: &CounterError, elapsed_ms: u128) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": {
                "error_code": error.code(),
                "error": error.to_string(),
                "duration_ms": elapsed_ms,
            },
        })
    );
}
