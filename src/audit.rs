//! Append-only audit trail: one event per terminal provisioning state.

use serde::Serialize;
use wasm_bindgen::JsValue;
use worker::D1Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Committed,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub attempt_id: String,
    /// Raw candidate, recorded even when it failed validation.
    pub identifier: String,
    pub outcome: Outcome,
    pub error_kind: Option<&'static str>,
    pub files_created: Vec<String>,
    pub paths_remaining: Vec<String>,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("audit sink: {0}")]
pub struct AuditError(pub String);

#[allow(async_fn_in_trait)]
pub trait AuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes audit events to the `provisioning_audit` D1 table.
pub struct D1AuditSink {
    db: D1Database,
}

impl D1AuditSink {
    pub fn new(db: D1Database) -> Self {
        Self { db }
    }

    async fn insert(&self, event: &AuditEvent) -> worker::Result<()> {
        let files_created = serde_json::to_string(&event.files_created)
            .map_err(|e| worker::Error::RustError(format!("serialize files_created: {e}")))?;
        let paths_remaining = serde_json::to_string(&event.paths_remaining)
            .map_err(|e| worker::Error::RustError(format!("serialize paths_remaining: {e}")))?;

        self.db
            .prepare(
                "INSERT INTO provisioning_audit (attempt_id, identifier, outcome, error_kind, files_created, paths_remaining, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&[
                JsValue::from_str(&event.attempt_id),
                JsValue::from_str(&event.identifier),
                JsValue::from_str(event.outcome.as_str()),
                match event.error_kind {
                    Some(kind) => JsValue::from_str(kind),
                    None => JsValue::NULL,
                },
                JsValue::from_str(&files_created),
                JsValue::from_str(&paths_remaining),
                JsValue::from_str(&event.recorded_at),
            ])?
            .run()
            .await?;

        Ok(())
    }
}

impl AuditSink for D1AuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.insert(event)
            .await
            .map_err(|err| AuditError(err.to_string()))
    }
}
