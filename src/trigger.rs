use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{HandlerError, LICENSE_TRACKING_DOCUMENT};

/// Flat invocation event, every field required.
///
/// `accountId` and `region` are part of the event contract but do not flow
/// into the automation request; the document resolves targets from the
/// target-location block instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    pub instance_id: String,
    pub account_id: String,
    pub tag_key: String,
    pub tag_value: String,
    pub region: String,
    #[serde(rename = "sqlServerEELicenseConfig")]
    pub sql_server_ee_license_config: String,
    #[serde(rename = "sqlServerSTDLicenseConfig")]
    pub sql_server_std_license_config: String,
    #[serde(rename = "sqlServerEXPLicenseConfig")]
    pub sql_server_exp_license_config: String,
    #[serde(rename = "sqlServerWEBLicenseConfig")]
    pub sql_server_web_license_config: String,
    #[serde(rename = "sqlServerDEVLicenseConfig")]
    pub sql_server_dev_license_config: String,
    pub accounts: String,
    pub regions: String,
    pub automation_assume_role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetSelector {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetScope {
    pub accounts: Vec<String>,
    pub regions: Vec<String>,
    pub max_concurrency: String,
    pub max_errors: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutomationRequest {
    pub document_name: String,
    pub parameters: Vec<(String, Vec<String>)>,
    pub target_parameter_name: String,
    pub target: TargetSelector,
    pub location: TargetScope,
}

#[async_trait]
pub trait AutomationExecutor: Send + Sync {
    async fn start_automation(
        &self,
        request: AutomationRequest,
    ) -> Result<Option<String>, HandlerError>;
}

pub fn build_automation_request(event: &TriggerEvent) -> AutomationRequest {
    // A wildcard instance id means "everything carrying the tag".
    let target = if event.instance_id == "*" {
        TargetSelector {
            key: format!("tag:{}", event.tag_key),
            values: vec![event.tag_value.clone()],
        }
    } else {
        TargetSelector {
            key: String::from("ParameterValues"),
            values: vec![event.instance_id.clone()],
        }
    };

    let parameters = vec![
        ("InstanceId", &event.instance_id),
        ("TagKey", &event.tag_key),
        ("TagValue", &event.tag_value),
        (
            "SQLServerEELicenseConfiguration",
            &event.sql_server_ee_license_config,
        ),
        (
            "SQLServerSTDLicenseConfiguration",
            &event.sql_server_std_license_config,
        ),
        (
            "SQLServerEXPLicenseConfiguration",
            &event.sql_server_exp_license_config,
        ),
        (
            "SQLServerWEBLicenseConfiguration",
            &event.sql_server_web_license_config,
        ),
        (
            "SQLServerDEVLicenseConfiguration",
            &event.sql_server_dev_license_config,
        ),
        ("AutomationAssumeRole", &event.automation_assume_role),
    ]
    .into_iter()
    .map(|(name, value)| (String::from(name), vec![value.clone()]))
    .collect();

    AutomationRequest {
        document_name: String::from(LICENSE_TRACKING_DOCUMENT),
        parameters,
        target_parameter_name: String::from("InstanceId"),
        target,
        location: TargetScope {
            accounts: vec![event.accounts.clone()],
            regions: vec![event.regions.clone()],
            max_concurrency: String::from("4"),
            max_errors: String::from("4"),
        },
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TriggerResponse {
    pub message: String,
}

pub async fn trigger_license_tracking(
    executor: &dyn AutomationExecutor,
    payload: Value,
) -> Result<TriggerResponse, HandlerError> {
    let event: TriggerEvent = serde_json::from_value(payload)
        .map_err(|e| HandlerError::InvalidEvent(e.to_string()))?;

    let request = build_automation_request(&event);
    let execution_id = executor.start_automation(request).await?;

    match execution_id {
        Some(id) if !id.is_empty() => {
            let message = format!(
                "{} has been successfully invoked. Check AutomationExecutionId - {} for more details",
                LICENSE_TRACKING_DOCUMENT, id
            );
            info!("{}", message);
            Ok(TriggerResponse { message })
        }
        _ => Err(HandlerError::AutomationNotStarted),
    }
}
