use crate::error::{LookupError, ProvisionError};
use serde::{Deserialize, Serialize};

// ── Provisioning ────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProvisionRequest {
    pub identifier: String,
    #[serde(default = "default_true")]
    pub create_default_files: bool,
}

fn default_true() -> bool {
    true
}

/// Result of a committed provisioning attempt. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreationResult {
    pub identifier: String,
    pub message: String,
    pub files_created: Vec<String>,
    /// ISO-8601 UTC; also the `created_at` embedded in every default file.
    pub timestamp: String,
}

// ── Response envelope ───────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisionResponse {
    Success {
        identifier: String,
        message: String,
        files_created: Vec<String>,
        timestamp: String,
    },
    Error {
        error: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        paths_remaining: Option<Vec<String>>,
    },
}

impl ProvisionResponse {
    /// Map a terminal outcome to `(http status, body)`.
    pub fn from_outcome(outcome: Result<CreationResult, ProvisionError>) -> (u16, Self) {
        match outcome {
            Ok(result) => (201, result.into()),
            Err(err) => (err.status_code(), (&err).into()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Error {
            error: "Invalid request body".into(),
            message: message.into(),
            paths_remaining: None,
        }
    }
}

impl From<CreationResult> for ProvisionResponse {
    fn from(result: CreationResult) -> Self {
        Self::Success {
            identifier: result.identifier,
            message: result.message,
            files_created: result.files_created,
            timestamp: result.timestamp,
        }
    }
}

impl From<&ProvisionError> for ProvisionResponse {
    fn from(err: &ProvisionError) -> Self {
        Self::Error {
            error: err.kind().into(),
            message: err.to_string(),
            paths_remaining: err.paths_remaining().map(<[_]>::to_vec),
        }
    }
}

// ── Lookups ─────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub status: String,
    pub error: String,
    pub message: String,
}

impl From<&LookupError> for ErrorBody {
    fn from(err: &LookupError) -> Self {
        let error = match err {
            LookupError::Validation(_) => "Invalid identifier format",
            LookupError::UnknownFile { .. } => "unknown file",
            LookupError::Store(_) => "storage_error",
        };
        Self {
            status: "error".into(),
            error: error.into(),
            message: err.to_string(),
        }
    }
}

// ── Health ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub service: &'a str,
    pub status: &'a str,
}
