//! Audit recording service.
//!
//! The write path for audit entries that accompany no entity write of their
//! own (sign-in events, administrative notes). Entries that do accompany an
//! entity write are appended inside that write's transaction by the
//! repositories instead.

use domain::models::{
    AuditEntry, AuditResourceType, CreateAuditEntryInput, ListAuditEntriesQuery, RequestOrigin,
};
use domain::services::audit_helpers;
use persistence::repositories::AuditEntryRepository;
use uuid::Uuid;

use crate::error::EngineError;

/// Service exposing the durable audit append and the read paths.
#[derive(Clone)]
pub struct AuditRecorder {
    entries: AuditEntryRepository,
}

impl AuditRecorder {
    pub fn new(entries: AuditEntryRepository) -> Self {
        Self { entries }
    }

    /// Append one audit entry, synchronously and durably.
    ///
    /// The action this entry describes must be treated as committed only
    /// when this returns Ok; on Err the caller must consider the action
    /// failed. Once issued the write is not cancellable. Identical calls
    /// append distinct entries; appends are never merged.
    pub async fn record(&self, input: CreateAuditEntryInput) -> Result<AuditEntry, EngineError> {
        let entry = self.entries.append(&input).await?;
        Ok(entry)
    }

    /// Record a successful sign-in.
    pub async fn record_login(
        &self,
        user_id: Uuid,
        origin: RequestOrigin,
    ) -> Result<AuditEntry, EngineError> {
        self.record(audit_helpers::login(user_id, origin)).await
    }

    /// Record a failed sign-in attempt against a known account.
    pub async fn record_login_failed(
        &self,
        user_id: Uuid,
        origin: RequestOrigin,
    ) -> Result<AuditEntry, EngineError> {
        self.record(audit_helpers::login_failed(user_id, origin))
            .await
    }

    /// Fetch a single entry.
    pub async fn entry(&self, id: Uuid) -> Result<Option<AuditEntry>, EngineError> {
        let entry = self.entries.find_by_id(id).await?;
        Ok(entry)
    }

    /// Filtered, paginated listing, newest first. Returns the page and the
    /// total match count.
    pub async fn list(
        &self,
        query: &ListAuditEntriesQuery,
    ) -> Result<(Vec<AuditEntry>, i64), EngineError> {
        let page = self.entries.list(query).await?;
        Ok(page)
    }

    /// Full history of one resource in write order.
    pub async fn history(
        &self,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> Result<Vec<AuditEntry>, EngineError> {
        let entries = self
            .entries
            .list_by_resource(resource_type, resource_id)
            .await?;
        Ok(entries)
    }
}
