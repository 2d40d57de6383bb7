use async_trait::async_trait;
use tracing::warn;
use warden_core::{AppResult, UserId};
use warden_domain::AuditAction;

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Actor that performed the action; `None` for bootstrap and CLI runs.
    pub actor: Option<UserId>,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Appends an event describing a mutation that has already committed.
///
/// Append failures are logged and never returned to the caller.
pub(crate) async fn record_committed(repository: &dyn AuditRepository, event: AuditEvent) {
    let action = event.action.as_str();
    let resource_id = event.resource_id.clone();

    if let Err(error) = repository.append_event(event).await {
        warn!(
            action,
            resource_id = resource_id.as_str(),
            %error,
            "audit append failed after committed mutation"
        );
    }
}
