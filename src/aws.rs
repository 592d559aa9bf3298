//! SDK-backed implementations of the handler collaborator traits.

use async_trait::async_trait;
use aws_sdk_ssm::error::SdkError;
use aws_sdk_ssm::operation::modify_document_permission::{
    ModifyDocumentPermissionError, ModifyDocumentPermissionOutput,
};
use aws_sdk_ssm::types::{DocumentPermissionType, Target, TargetLocation};

use crate::share_sync::{AccountDirectory, DocumentShare, ModifyShareOutcome};
use crate::trigger::{AutomationExecutor, AutomationRequest};
use crate::HandlerError;

pub struct SsmAutomation {
    client: aws_sdk_ssm::Client,
}

impl SsmAutomation {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AutomationExecutor for SsmAutomation {
    async fn start_automation(
        &self,
        request: AutomationRequest,
    ) -> Result<Option<String>, HandlerError> {
        let mut call = self
            .client
            .start_automation_execution()
            .document_name(request.document_name)
            .target_parameter_name(request.target_parameter_name)
            .targets(
                Target::builder()
                    .key(request.target.key)
                    .set_values(Some(request.target.values))
                    .build(),
            )
            .target_locations(
                TargetLocation::builder()
                    .set_accounts(Some(request.location.accounts))
                    .set_regions(Some(request.location.regions))
                    .target_location_max_concurrency(request.location.max_concurrency)
                    .target_location_max_errors(request.location.max_errors)
                    .build(),
            );
        for (name, values) in request.parameters {
            call = call.parameters(name, values);
        }

        let output = call
            .send()
            .await
            .map_err(|e| HandlerError::Sdk(format!("Start Automation Error: {:?}", e)))?;

        Ok(output.automation_execution_id)
    }
}

pub struct SsmDocumentShare {
    client: aws_sdk_ssm::Client,
}

impl SsmDocumentShare {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

// A non-2xx response surfaces as a service error on this side of the SDK, so
// the status the handler inspects is recovered from the raw response.
fn modify_outcome(
    result: Result<ModifyDocumentPermissionOutput, SdkError<ModifyDocumentPermissionError>>,
) -> Result<ModifyShareOutcome, HandlerError> {
    match result {
        Ok(_) => Ok(ModifyShareOutcome {
            http_status: Some(200),
        }),
        Err(SdkError::ServiceError(context)) => Ok(ModifyShareOutcome {
            http_status: Some(context.raw().status().as_u16()),
        }),
        Err(e) => Err(HandlerError::Sdk(format!(
            "Modify Document Permission Error: {:?}",
            e
        ))),
    }
}

#[async_trait]
impl DocumentShare for SsmDocumentShare {
    async fn shared_account_ids(&self, document_name: &str) -> Result<Vec<String>, HandlerError> {
        let output = self
            .client
            .describe_document_permission()
            .name(document_name)
            .permission_type(DocumentPermissionType::Share)
            .send()
            .await
            .map_err(|e| {
                HandlerError::Sdk(format!("Describe Document Permission Error: {:?}", e))
            })?;

        Ok(output.account_ids().to_vec())
    }

    async fn remove_shared_accounts(
        &self,
        document_name: &str,
        account_ids: &[String],
    ) -> Result<ModifyShareOutcome, HandlerError> {
        let result = self
            .client
            .modify_document_permission()
            .name(document_name)
            .permission_type(DocumentPermissionType::Share)
            .set_account_ids_to_remove(Some(account_ids.to_vec()))
            .send()
            .await;

        modify_outcome(result)
    }

    async fn add_shared_accounts(
        &self,
        document_name: &str,
        account_ids: &[String],
    ) -> Result<ModifyShareOutcome, HandlerError> {
        let result = self
            .client
            .modify_document_permission()
            .name(document_name)
            .permission_type(DocumentPermissionType::Share)
            .set_account_ids_to_add(Some(account_ids.to_vec()))
            .send()
            .await;

        modify_outcome(result)
    }
}

pub struct OrganizationsDirectory {
    client: aws_sdk_organizations::Client,
}

impl OrganizationsDirectory {
    pub fn new(client: aws_sdk_organizations::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountDirectory for OrganizationsDirectory {
    async fn list_account_ids(&self) -> Result<Vec<String>, HandlerError> {
        let output = self
            .client
            .list_accounts()
            .send()
            .await
            .map_err(|e| HandlerError::Sdk(format!("List Accounts Error: {:?}", e)))?;

        let account_ids = output
            .accounts()
            .iter()
            .filter_map(|account| account.id().map(String::from))
            .collect();

        Ok(account_ids)
    }
}
