use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_TABLE_NAME: &str = "cloud-resume-challenge";
pub const KEY_ATTRIBUTE: &str = "ID";
pub const COUNTER_KEY: &str = "Count";
pub const COUNT_ATTRIBUTE: &str = "Visitors";
pub const INCREMENT_STEP: u64 = 1;
pub const SUCCESS_STATUS_CODE: u16 = 200;

pub type Headers = BTreeMap<String, String>;

/// The single persisted entity holding the visitor count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Visitors")]
    pub visitors: u64,
}

impl CounterRecord {
    pub fn new(id: impl Into<String>, visitors: u64) -> Self {
        Self {
            id: id.into(),
            visitors,
        }
    }
}

/// How handler bodies are rendered.
///
/// `Raw` reproduces the deployed functions: the reader returns the count as a
/// bare JSON number and the incrementer returns no body at all. `Json` renders
/// the body as a string, which is what proxy integrations expect, and echoes the
/// post-increment count back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseEncoding {
    #[default]
    Raw,
    Json,
}

impl ResponseEncoding {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

pub fn cors_headers() -> Headers {
    Headers::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Access-Control-Allow-Headers".to_string(), "*".to_string()),
        (
            "Access-Control-Allow-Credentials".to_string(),
            "*".to_string(),
        ),
        ("Content-Type".to_string(), "application/json".to_string()),
    ])
}

pub fn read_response(count: u64, encoding: ResponseEncoding) -> ApiGatewayResponse {
    let body = match encoding {
        ResponseEncoding::Raw => Value::from(count),
        ResponseEncoding::Json => Value::String(count.to_string()),
    };
    success_response(Some(body))
}

pub fn increment_response(updated_count: u64, encoding: ResponseEncoding) -> ApiGatewayResponse {
    let body = match encoding {
        ResponseEncoding::Raw => None,
        ResponseEncoding::Json => Some(Value::String(
            json!({ COUNT_ATTRIBUTE: updated_count }).to_string(),
        )),
    };
    success_response(body)
}

pub fn preflight_response() -> ApiGatewayResponse {
    success_response(None)
}

fn success_response(body: Option<Value>) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: SUCCESS_STATUS_CODE,
        headers: cors_headers(),
        body,
    }
}
