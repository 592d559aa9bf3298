use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use license_tracking_lambdas::aws::{OrganizationsDirectory, SsmDocumentShare};
use license_tracking_lambdas::share_sync::{sync_document_permissions, SyncConfig};
use serde_json::{json, Value};

async fn handle(
    directory: &OrganizationsDirectory,
    share: &SsmDocumentShare,
    config: &SyncConfig,
    _event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    sync_document_permissions(directory, share, config).await?;
    Ok(json!({}))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let directory = OrganizationsDirectory::new(aws_sdk_organizations::Client::new(&config));
    let share = SsmDocumentShare::new(aws_sdk_ssm::Client::new(&config));
    let sync_config = SyncConfig::default();

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle(&directory, &share, &sync_config, event)
    }))
    .await
}
