use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use license_tracking_lambdas::aws::SsmAutomation;
use license_tracking_lambdas::trigger::{trigger_license_tracking, TriggerResponse};
use serde_json::Value;

async fn handle(
    executor: &SsmAutomation,
    event: LambdaEvent<Value>,
) -> Result<TriggerResponse, Error> {
    Ok(trigger_license_tracking(executor, event.payload).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let executor = SsmAutomation::new(aws_sdk_ssm::Client::new(&config));

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle(&executor, event)
    }))
    .await
}
