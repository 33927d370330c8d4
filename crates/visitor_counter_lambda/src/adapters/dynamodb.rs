use std::collections::HashMap;
use std::future::Future;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tokio::sync::OnceCell;
use visitor_counter_core::config::CounterConfig;
use visitor_counter_core::contract::{CounterRecord, COUNT_ATTRIBUTE, KEY_ATTRIBUTE};
use visitor_counter_core::error::CounterError;

use crate::adapters::record_store::CounterStore;

pub type Item = HashMap<String, AttributeValue>;

const KEY_CONDITION: &str = "#id = :id";
const ADD_EXPRESSION: &str = "ADD #visitors :incr";
const RECORD_EXISTS_CONDITION: &str = "attribute_exists(#id)";

/// Counter store backed by a DynamoDB table.
///
/// The SDK client is built on first use and reused for the lifetime of the
/// store, which in a Lambda process is the lifetime of the execution
/// environment.
pub struct DynamoCounterStore {
    table_name: String,
    counter_key: String,
    consistent_read: bool,
    require_existing_record: bool,
    client: OnceCell<Client>,
}

impl DynamoCounterStore {
    pub fn new(config: &CounterConfig) -> Self {
        Self {
            table_name: config.table_name.clone(),
            counter_key: config.counter_key.clone(),
            consistent_read: config.consistent_read,
            require_existing_record: config.require_existing_record,
            client: OnceCell::new(),
        }
    }

    /// Uses an already-built client, e.g. one pointed at a local endpoint.
    pub fn with_client(config: &CounterConfig, client: Client) -> Self {
        Self {
            client: OnceCell::from(client),
            ..Self::new(config)
        }
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let sdk_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                Client::new(&sdk_config)
            })
            .await
    }

    async fn query(&self) -> Result<Vec<CounterRecord>, CounterError> {
        let output = self
            .client()
            .await
            .query()
            .table_name(&self.table_name)
            .key_condition_expression(KEY_CONDITION)
            .expression_attribute_names("#id", KEY_ATTRIBUTE)
            .expression_attribute_values(":id", AttributeValue::S(self.counter_key.clone()))
            .consistent_read(self.consistent_read)
            .send()
            .await
            .map_err(|error| {
                CounterError::dependency_unavailable(format!(
                    "failed to query counter record: {}",
                    DisplayErrorContext(&error)
                ))
            })?;

        output
            .items
            .unwrap_or_default()
            .iter()
            .map(decode_record)
            .collect()
    }

    async fn add(&self, amount: u64) -> Result<u64, CounterError> {
        let mut request = self
            .client()
            .await
            .update_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, AttributeValue::S(self.counter_key.clone()))
            .update_expression(ADD_EXPRESSION)
            .expression_attribute_names("#visitors", COUNT_ATTRIBUTE)
            .expression_attribute_values(":incr", AttributeValue::N(amount.to_string()))
            .return_values(ReturnValue::UpdatedNew);
        if self.require_existing_record {
            request = request
                .condition_expression(RECORD_EXISTS_CONDITION)
                .expression_attribute_names("#id", KEY_ATTRIBUTE);
        }

        let output = request.send().await.map_err(|error| {
            let conditional_failed = error
                .as_service_error()
                .map(|service| service.is_conditional_check_failed_exception())
                .unwrap_or(false);
            if conditional_failed {
                CounterError::missing_record(&self.table_name, &self.counter_key)
            } else {
                CounterError::dependency_unavailable(format!(
                    "failed to increment counter record: {}",
                    DisplayErrorContext(&error)
                ))
            }
        })?;

        let attributes = output.attributes.unwrap_or_default();
        decode_count(&attributes)
    }
}

impl CounterStore for DynamoCounterStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn counter_key(&self) -> &str {
        &self.counter_key
    }

    fn query_records(&self) -> Result<Vec<CounterRecord>, CounterError> {
        block_on_current(self.query())
    }

    fn add_to_count(&self, amount: u64) -> Result<u64, CounterError> {
        block_on_current(self.add(amount))
    }
}

fn block_on_current<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

pub fn decode_record(item: &Item) -> Result<CounterRecord, CounterError> {
    let id = match item.get(KEY_ATTRIBUTE) {
        Some(AttributeValue::S(id)) => id.clone(),
        Some(_) => {
            return Err(CounterError::malformed_record(format!(
                "attribute '{KEY_ATTRIBUTE}' is not a string"
            )))
        }
        None => {
            return Err(CounterError::malformed_record(format!(
                "attribute '{KEY_ATTRIBUTE}' is missing"
            )))
        }
    };

    Ok(CounterRecord {
        id,
        visitors: decode_count(item)?,
    })
}

pub fn decode_count(attributes: &Item) -> Result<u64, CounterError> {
    match attributes.get(COUNT_ATTRIBUTE) {
        Some(AttributeValue::N(number)) => number.trim().parse::<u64>().map_err(|_| {
            CounterError::malformed_record(format!(
                "attribute '{COUNT_ATTRIBUTE}' is not a non-negative integer: '{number}'"
            ))
        }),
        Some(_) => Err(CounterError::malformed_record(format!(
            "attribute '{COUNT_ATTRIBUTE}' is not a number"
        ))),
        None => Err(CounterError::malformed_record(format!(
            "attribute '{COUNT_ATTRIBUTE}' is missing"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
    use aws_smithy_types::body::SdkBody;
    use serde_json::{json, Value};

    use super::*;

    fn item(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn decodes_provisioned_counter_item() {
        let record = decode_record(&item(&[
            ("ID", AttributeValue::S("Count".to_string())),
            ("Visitors", AttributeValue::N("41".to_string())),
        ]))
        .expect("item should decode");

        assert_eq!(record, CounterRecord::new("Count", 41));
    }

    #[test]
    fn decodes_updated_new_attributes() {
        let count = decode_count(&item(&[("Visitors", AttributeValue::N("42".to_string()))]))
            .expect("count should decode");
        assert_eq!(count, 42);
    }

    #[test]
    fn rejects_count_stored_as_string() {
        let error = decode_count(&item(&[("Visitors", AttributeValue::S("42".to_string()))]))
            .expect_err("string count should fail");
        assert_eq!(error.code(), "malformed_record");
    }

    #[test]
    fn rejects_negative_and_fractional_counts() {
        for raw in ["-1", "4.5"] {
            let error = decode_count(&item(&[("Visitors", AttributeValue::N(raw.to_string()))]))
                .expect_err("count should fail");
            assert!(error.to_string().contains(raw));
        }
    }

    #[test]
    fn rejects_item_without_count() {
        let error = decode_record(&item(&[("ID", AttributeValue::S("Count".to_string()))]))
            .expect_err("item without count should fail");
        assert_eq!(
            error.to_string(),
            "malformed counter record: attribute 'Visitors' is missing"
        );
    }

    #[test]
    fn empty_updated_attributes_are_malformed() {
        let error = decode_count(&Item::new()).expect_err("empty attributes should fail");
        assert_eq!(error.code(), "malformed_record");
    }

    #[test]
    fn store_takes_table_settings_from_config() {
        let config = CounterConfig {
            table_name: "visitors-prod".to_string(),
            consistent_read: true,
            require_existing_record: true,
            ..CounterConfig::default()
        };
        let store = DynamoCounterStore::new(&config);

        assert_eq!(store.table_name(), "visitors-prod");
        assert_eq!(store.counter_key(), "Count");
        assert!(store.consistent_read);
        assert!(store.require_existing_record);
        assert!(store.client.get().is_none());
    }

    fn replay_client(status: u16, response_body: &str) -> (Client, StaticReplayClient) {
        let http_client = StaticReplayClient::new(vec![ReplayEvent::new(
            http::Request::builder()
                .uri("https://dynamodb.us-east-1.amazonaws.com/")
                .body(SdkBody::empty())
                .expect("request should build"),
            http::Response::builder()
                .status(status)
                .body(SdkBody::from(response_body.to_string()))
                .expect("response should build"),
        )]);
        let sdk_config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::for_tests())
            .http_client(http_client.clone())
            .build();
        (Client::from_conf(sdk_config), http_client)
    }

    fn sent_bodies(http_client: &StaticReplayClient) -> Vec<Value> {
        http_client
            .actual_requests()
            .map(|request| {
                let bytes = request.body().bytes().expect("request body should be buffered");
                serde_json::from_slice(bytes).expect("request body should be json")
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn query_sends_key_condition_and_decodes_items() {
        let (client, http_client) = replay_client(
            200,
            r#"{"Items":[{"ID":{"S":"Count"},"Visitors":{"N":"41"}}],"Count":1}"#,
        );
        let config = CounterConfig {
            consistent_read: true,
            ..CounterConfig::default()
        };
        let store = DynamoCounterStore::with_client(&config, client);

        let records = store.query_records().expect("query should succeed");
        assert_eq!(records, vec![CounterRecord::new("Count", 41)]);

        let bodies = sent_bodies(&http_client);
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["TableName"], json!("cloud-resume-challenge"));
        assert_eq!(body["KeyConditionExpression"], json!("#id = :id"));
        assert_eq!(body["ExpressionAttributeNames"], json!({ "#id": "ID" }));
        assert_eq!(
            body["ExpressionAttributeValues"],
            json!({ ":id": { "S": "Count" } })
        );
        assert_eq!(body["ConsistentRead"], json!(true));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn query_without_items_returns_no_records() {
        let (client, _http_client) = replay_client(200, r#"{"Items":[],"Count":0}"#);
        let store = DynamoCounterStore::with_client(&CounterConfig::default(), client);

        assert!(store
            .query_records()
            .expect("query should succeed")
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn add_sends_unconditional_atomic_update() {
        let (client, http_client) =
            replay_client(200, r#"{"Attributes":{"Visitors":{"N":"42"}}}"#);
        let store = DynamoCounterStore::with_client(&CounterConfig::default(), client);

        assert_eq!(store.add_to_count(1).expect("add should succeed"), 42);

        let bodies = sent_bodies(&http_client);
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["TableName"], json!("cloud-resume-challenge"));
        assert_eq!(body["Key"], json!({ "ID": { "S": "Count" } }));
        assert_eq!(body["UpdateExpression"], json!("ADD #visitors :incr"));
        assert_eq!(body["ReturnValues"], json!("UPDATED_NEW"));
        assert_eq!(
            body["ExpressionAttributeNames"],
            json!({ "#visitors": "Visitors" })
        );
        assert_eq!(
            body["ExpressionAttributeValues"],
            json!({ ":incr": { "N": "1" } })
        );
        assert!(body.get("ConditionExpression").is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn add_requires_existing_record_when_configured() {
        let (client, http_client) =
            replay_client(200, r#"{"Attributes":{"Visitors":{"N":"42"}}}"#);
        let config = CounterConfig {
            require_existing_record: true,
            ..CounterConfig::default()
        };
        let store = DynamoCounterStore::with_client(&config, client);

        store.add_to_count(1).expect("add should succeed");

        let body = &sent_bodies(&http_client)[0];
        assert_eq!(body["ConditionExpression"], json!("attribute_exists(#id)"));
        assert_eq!(
            body["ExpressionAttributeNames"],
            json!({ "#visitors": "Visitors", "#id": "ID" })
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_condition_is_missing_record() {
        let (client, _http_client) = replay_client(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException","message":"The conditional request failed"}"#,
        );
        let config = CounterConfig {
            require_existing_record: true,
            ..CounterConfig::default()
        };
        let store = DynamoCounterStore::with_client(&config, client);

        let error = store.add_to_count(1).expect_err("add should fail");
        assert_eq!(
            error,
            CounterError::missing_record("cloud-resume-challenge", "Count")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn other_service_errors_are_dependency_failures() {
        let (client, _http_client) = replay_client(
            400,
            r#"{"__type":"com.amazon.coral.validate#ValidationException","message":"Requested resource not found"}"#,
        );
        let store = DynamoCounterStore::with_client(&CounterConfig::default(), client);

        let error = store.query_records().expect_err("query should fail");
        assert_eq!(error.code(), "dependency_unavailable");
    }
}
