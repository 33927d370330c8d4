use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use visitor_counter_core::config::CounterConfig;
use visitor_counter_lambda::adapters::dynamodb::DynamoCounterStore;
use visitor_counter_lambda::invocation::respond_to_increment;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = CounterConfig::from_env()?;
    let store = DynamoCounterStore::new(&config);

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        respond_to_increment(event, &store, config.encoding)
    }))
    .await
}
