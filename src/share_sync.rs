//! Reconciles the "Share" permission list of the license-tracking document
//! against the organization's account list. Remove-then-add is not atomic;
//! the share list may be transiently empty mid-run, and concurrent runs race.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{HandlerError, LICENSE_TRACKING_DOCUMENT};

/// What to do when the organization lookup returns no accounts.
///
/// `ClearAll` replaces the share list unconditionally, so an empty lookup
/// wipes it. `PreserveExisting` treats an empty lookup as "leave the current
/// share list alone" and skips both mutation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyOrgPolicy {
    ClearAll,
    PreserveExisting,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub document_name: String,
    pub empty_org_policy: EmptyOrgPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            document_name: String::from(LICENSE_TRACKING_DOCUMENT),
            empty_org_policy: EmptyOrgPolicy::ClearAll,
        }
    }
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn list_account_ids(&self) -> Result<Vec<String>, HandlerError>;
}

/// HTTP status of the modify call, when the response carried one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyShareOutcome {
    pub http_status: Option<u16>,
}

#[async_trait]
pub trait DocumentShare: Send + Sync {
    async fn shared_account_ids(&self, document_name: &str) -> Result<Vec<String>, HandlerError>;

    async fn remove_shared_accounts(
        &self,
        document_name: &str,
        account_ids: &[String],
    ) -> Result<ModifyShareOutcome, HandlerError>;

    async fn add_shared_accounts(
        &self,
        document_name: &str,
        account_ids: &[String],
    ) -> Result<ModifyShareOutcome, HandlerError>;
}

pub async fn sync_document_permissions(
    directory: &dyn AccountDirectory,
    share: &dyn DocumentShare,
    config: &SyncConfig,
) -> Result<(), HandlerError> {
    let account_ids = directory.list_account_ids().await?;
    if account_ids.is_empty() {
        warn!("no account ids found in this organization");
        if config.empty_org_policy == EmptyOrgPolicy::PreserveExisting {
            info!(
                "leaving {} share permissions untouched",
                config.document_name
            );
            return Ok(());
        }
    }

    let current = share.shared_account_ids(&config.document_name).await?;
    if !current.is_empty() {
        share
            .remove_shared_accounts(&config.document_name, &current)
            .await?;
    }

    let outcome = share
        .add_shared_accounts(&config.document_name, &account_ids)
        .await?;
    match outcome.http_status {
        Some(200) => {
            info!(
                "successfully modified {} permissions to be shared with these accounts: {}",
                config.document_name,
                account_ids.join(",")
            );
            Ok(())
        }
        Some(status) => Err(HandlerError::ShareSyncFailed(format!(
            "modify permission call for {} returned status {}",
            config.document_name, status
        ))),
        None => Err(HandlerError::ShareSyncFailed(format!(
            "modify permission call for {} returned no response metadata",
            config.document_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum ShareCall {
        Remove(Vec<String>),
        Add(Vec<String>),
    }

    struct FakeDirectory {
        account_ids: Vec<String>,
    }

    impl FakeDirectory {
        fn with(account_ids: &[&str]) -> Self {
            Self {
                account_ids: account_ids.iter().map(|id| String::from(*id)).collect(),
            }
        }
    }

    #[async_trait]
    impl AccountDirectory for FakeDirectory {
        async fn list_account_ids(&self) -> Result<Vec<String>, HandlerError> {
            Ok(self.account_ids.clone())
        }
    }

    struct FakeShare {
        permitted: Mutex<Vec<String>>,
        calls: Mutex<Vec<ShareCall>>,
        add_status: Option<u16>,
    }

    impl FakeShare {
        fn sharing(account_ids: &[&str]) -> Self {
            Self {
                permitted: Mutex::new(account_ids.iter().map(|id| String::from(*id)).collect()),
                calls: Mutex::new(Vec::new()),
                add_status: Some(200),
            }
        }

        fn with_add_status(mut self, status: Option<u16>) -> Self {
            self.add_status = status;
            self
        }

        fn calls(&self) -> Vec<ShareCall> {
            self.calls.lock().expect("poisoned mutex").clone()
        }

        fn permitted(&self) -> Vec<String> {
            self.permitted.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl DocumentShare for FakeShare {
        async fn shared_account_ids(
            &self,
            document_name: &str,
        ) -> Result<Vec<String>, HandlerError> {
            assert_eq!(document_name, "test-document");
            Ok(self.permitted())
        }

        async fn remove_shared_accounts(
            &self,
            document_name: &str,
            account_ids: &[String],
        ) -> Result<ModifyShareOutcome, HandlerError> {
            assert_eq!(document_name, "test-document");
            self.permitted
                .lock()
                .expect("poisoned mutex")
                .retain(|id| !account_ids.contains(id));
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push(ShareCall::Remove(account_ids.to_vec()));
            Ok(ModifyShareOutcome {
                http_status: Some(200),
            })
        }

        async fn add_shared_accounts(
            &self,
            document_name: &str,
            account_ids: &[String],
        ) -> Result<ModifyShareOutcome, HandlerError> {
            assert_eq!(document_name, "test-document");
            self.permitted
                .lock()
                .expect("poisoned mutex")
                .extend(account_ids.iter().cloned());
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push(ShareCall::Add(account_ids.to_vec()));
            Ok(ModifyShareOutcome {
                http_status: self.add_status,
            })
        }
    }

    fn config(policy: EmptyOrgPolicy) -> SyncConfig {
        SyncConfig {
            document_name: String::from("test-document"),
            empty_org_policy: policy,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|id| String::from(*id)).collect()
    }

    #[tokio::test]
    async fn removes_stale_accounts_then_adds_fresh_list() {
        let directory = FakeDirectory::with(&["111", "222"]);
        let share = FakeShare::sharing(&["999"]);

        sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::ClearAll))
            .await
            .expect("sync should succeed");

        assert_eq!(
            share.calls(),
            vec![
                ShareCall::Remove(ids(&["999"])),
                ShareCall::Add(ids(&["111", "222"])),
            ]
        );
        assert_eq!(share.permitted(), ids(&["111", "222"]));
    }

    #[tokio::test]
    async fn skips_removal_when_nothing_is_shared() {
        let directory = FakeDirectory::with(&["111", "222"]);
        let share = FakeShare::sharing(&[]);

        sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::ClearAll))
            .await
            .expect("sync should succeed");

        assert_eq!(share.calls(), vec![ShareCall::Add(ids(&["111", "222"]))]);
    }

    #[tokio::test]
    async fn empty_organization_clears_share_list_under_reference_policy() {
        let directory = FakeDirectory::with(&[]);
        let share = FakeShare::sharing(&["999"]);

        sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::ClearAll))
            .await
            .expect("sync should succeed");

        assert_eq!(
            share.calls(),
            vec![ShareCall::Remove(ids(&["999"])), ShareCall::Add(ids(&[]))]
        );
        assert!(share.permitted().is_empty());
    }

    #[tokio::test]
    async fn empty_organization_leaves_share_list_under_preserving_policy() {
        let directory = FakeDirectory::with(&[]);
        let share = FakeShare::sharing(&["999"]);

        sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::PreserveExisting))
            .await
            .expect("sync should succeed");

        assert!(share.calls().is_empty());
        assert_eq!(share.permitted(), ids(&["999"]));
    }

    #[tokio::test]
    async fn non_success_status_raises_fault() {
        let directory = FakeDirectory::with(&["111"]);
        let share = FakeShare::sharing(&[]).with_add_status(Some(403));

        let error =
            sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::ClearAll))
                .await
                .expect_err("403 should fail");

        assert!(matches!(error, HandlerError::ShareSyncFailed(_)));
    }

    #[tokio::test]
    async fn missing_response_metadata_raises_fault() {
        let directory = FakeDirectory::with(&["111"]);
        let share = FakeShare::sharing(&[]).with_add_status(None);

        let error =
            sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::ClearAll))
                .await
                .expect_err("missing metadata should fail");

        assert!(matches!(error, HandlerError::ShareSyncFailed(_)));
    }

    #[tokio::test]
    async fn running_twice_is_idempotent() {
        let directory = FakeDirectory::with(&["111", "222"]);
        let share = FakeShare::sharing(&["999"]);

        sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::ClearAll))
            .await
            .expect("first sync should succeed");
        let after_first = share.permitted();

        sync_document_permissions(&directory, &share, &config(EmptyOrgPolicy::ClearAll))
            .await
            .expect("second sync should succeed");

        assert_eq!(share.permitted(), after_first);
        assert_eq!(share.permitted(), ids(&["111", "222"]));
    }
}
