// Pipeline that turns a validated content plan into a shared document.
// This module has no Google or HTTP types in it: the provider is a trait
// (port) implemented by the infra layer, which keeps the whole pipeline
// testable with a stubbed provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::planning::{format_plan, ContentPlan, EditOperation, PlanError};

/// Errors raised by a document provider implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider API error: {0}")]
    Api(String),
    #[error("provider authentication error: {0}")]
    Auth(String),
}

/// Errors raised by the provisioning pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid content plan: {0}")]
    InvalidPlan(#[from] PlanError),

    #[error("recipient email must not be empty")]
    MissingRecipient,

    /// Document creation or batch formatting failed at the provider.
    /// `document_id` is present when creation succeeded but formatting did
    /// not; the document then exists orphaned and unformatted.
    #[error("document provisioning failed: {message}")]
    Provision {
        message: String,
        document_id: Option<String>,
    },
}

/// Outcome of a successful pipeline run. `permission_granted: false` is
/// still a success: the document exists and is usable by the credential
/// owner even when sharing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub document_id: String,
    pub share_link: String,
    pub permission_granted: bool,
}

/// Trait describing the minimal document operations needed by the pipeline.
#[async_trait]
pub trait DocsProvider: Send + Sync {
    /// Create a new empty document and return its provider-assigned id.
    async fn create_document(&self, title: &str) -> Result<String, ProviderError>;

    /// Apply the ordered operations in one atomic batch. The provider must
    /// either apply them all or fail the whole batch; operations are never
    /// submitted one by one.
    async fn apply_edits(
        &self,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), ProviderError>;

    /// Grant the recipient editor-level access, with the provider's own
    /// notification email suppressed.
    async fn grant_editor(&self, document_id: &str, email: &str) -> Result<(), ProviderError>;
}

/// Orchestrates format -> create -> batch update -> share for one request.
/// Invocations are independent and stateless; the service holds only the
/// provider, which is immutable after construction.
pub struct ProvisioningService<P: DocsProvider> {
    provider: P,
}

impl<P: DocsProvider> ProvisioningService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    #[cfg(test)]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Stable shareable reference, derived deterministically from the id.
    pub fn share_link(document_id: &str) -> String {
        format!("https://docs.google.com/document/d/{document_id}/edit")
    }

    pub async fn create_plan_document(
        &self,
        plan: &ContentPlan,
        recipient_email: &str,
    ) -> Result<ProvisionResult, PipelineError> {
        let recipient = recipient_email.trim();
        if recipient.is_empty() {
            return Err(PipelineError::MissingRecipient);
        }

        // Validation happens before any provider call so configuration and
        // plan problems never leave side effects behind.
        let operations = format_plan(plan)?;

        let document_id = self
            .provider
            .create_document(&plan.document_title())
            .await
            .map_err(|err| PipelineError::Provision {
                message: err.to_string(),
                document_id: None,
            })?;

        self.provider
            .apply_edits(&document_id, &operations)
            .await
            .map_err(|err| PipelineError::Provision {
                message: err.to_string(),
                document_id: Some(document_id.clone()),
            })?;

        // Sharing is independently observable: a failure here is reported in
        // the result, never as an overall pipeline failure.
        let permission_granted = match self.provider.grant_editor(&document_id, recipient).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(document_id = %document_id, "failed to grant editor access: {err}");
                false
            }
        };

        Ok(ProvisionResult {
            share_link: Self::share_link(&document_id),
            document_id,
            permission_granted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::planning::Scene;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubProvider {
        create_calls: AtomicUsize,
        edit_calls: AtomicUsize,
        grant_calls: AtomicUsize,
        fail_create: bool,
        fail_edits: bool,
        fail_grant: bool,
    }

    #[async_trait]
    impl DocsProvider for StubProvider {
        async fn create_document(&self, _title: &str) -> Result<String, ProviderError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(ProviderError::Api("creation denied".to_string()));
            }
            Ok("doc-123".to_string())
        }

        async fn apply_edits(
            &self,
            _document_id: &str,
            operations: &[EditOperation],
        ) -> Result<(), ProviderError> {
            self.edit_calls.fetch_add(1, Ordering::SeqCst);
            assert!(!operations.is_empty(), "batch must never be empty");
            if self.fail_edits {
                return Err(ProviderError::Api("batch rejected".to_string()));
            }
            Ok(())
        }

        async fn grant_editor(&self, _document_id: &str, email: &str) -> Result<(), ProviderError> {
            self.grant_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_grant {
                return Err(ProviderError::Api(format!("cannot share with {email}")));
            }
            Ok(())
        }
    }

    fn sample_plan() -> ContentPlan {
        ContentPlan {
            topic: Some("AI trends".to_string()),
            scenes: vec![Scene {
                scene_number: Some(1),
                narration: Some("Hello".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn end_to_end_success() {
        let service = ProvisioningService::new(StubProvider::default());
        let result = service
            .create_plan_document(&sample_plan(), "user@example.com")
            .await
            .unwrap();

        assert_eq!(result.document_id, "doc-123");
        assert_eq!(
            result.share_link,
            "https://docs.google.com/document/d/doc-123/edit"
        );
        assert!(result.permission_granted);
        assert_eq!(service.provider.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.provider.edit_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.provider.grant_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn grant_failure_is_partial_success() {
        let service = ProvisioningService::new(StubProvider {
            fail_grant: true,
            ..Default::default()
        });

        let result = service
            .create_plan_document(&sample_plan(), "not-an-email")
            .await
            .unwrap();

        assert_eq!(result.document_id, "doc-123");
        assert!(!result.permission_granted);
    }

    #[tokio::test]
    async fn missing_topic_makes_no_provider_calls() {
        let service = ProvisioningService::new(StubProvider::default());
        let plan = ContentPlan {
            scenes: Vec::new(),
            ..Default::default()
        };

        let err = service
            .create_plan_document(&plan, "user@example.com")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::InvalidPlan(PlanError::MissingTopic)
        ));
        assert_eq!(service.provider.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.provider.edit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.provider.grant_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_recipient_makes_no_provider_calls() {
        let service = ProvisioningService::new(StubProvider::default());
        let err = service
            .create_plan_document(&sample_plan(), "  ")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::MissingRecipient));
        assert_eq!(service.provider.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn batch_failure_surfaces_orphaned_document_id() {
        let service = ProvisioningService::new(StubProvider {
            fail_edits: true,
            ..Default::default()
        });

        let err = service
            .create_plan_document(&sample_plan(), "user@example.com")
            .await
            .unwrap_err();

        match err {
            PipelineError::Provision { document_id, .. } => {
                assert_eq!(document_id.as_deref(), Some("doc-123"));
            }
            other => panic!("expected provision error, got {other:?}"),
        }
        // No grant is attempted once provisioning has failed.
        assert_eq!(service.provider.grant_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_failure_carries_no_document_id() {
        let service = ProvisioningService::new(StubProvider {
            fail_create: true,
            ..Default::default()
        });

        let err = service
            .create_plan_document(&sample_plan(), "user@example.com")
            .await
            .unwrap_err();

        match err {
            PipelineError::Provision { document_id, .. } => assert_eq!(document_id, None),
            other => panic!("expected provision error, got {other:?}"),
        }
        assert_eq!(service.provider.edit_calls.load(Ordering::SeqCst), 0);
    }
}
