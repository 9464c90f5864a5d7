use crate::identifier::ValidationError;
use crate::storage::StoreError;

/// Terminal failures of a provisioning attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    /// Bad identifier. Nothing was touched.
    #[error("identifier must be 3-64 characters of letters, digits, '.', '_' or '-'")]
    Validation(#[from] ValidationError),

    /// The namespace is already reserved.
    #[error("identifier '{identifier}' is already provisioned")]
    Conflict { identifier: String },

    /// A write failed and every compensating delete succeeded.
    #[error("provisioning '{identifier}' failed and was rolled back: {source}")]
    Write {
        identifier: String,
        source: StoreError,
    },

    /// A write failed and rollback could not confirm removal of
    /// `paths_remaining`. Needs reconciliation before a retry.
    #[error(
        "provisioning '{identifier}' failed ({source}); rollback left {} object(s) behind",
        .paths_remaining.len()
    )]
    PartialFailure {
        identifier: String,
        paths_remaining: Vec<String>,
        source: StoreError,
    },
}

impl ProvisionError {
    /// Stable value of the response `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid identifier format",
            Self::Conflict { .. } => "identifier already exists",
            Self::Write { .. } => "write_error",
            Self::PartialFailure { .. } => "partial_failure",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Conflict { .. } => 409,
            Self::Write { .. } | Self::PartialFailure { .. } => 500,
        }
    }

    pub fn paths_remaining(&self) -> Option<&[String]> {
        match self {
            Self::PartialFailure {
                paths_remaining, ..
            } => Some(paths_remaining),
            _ => None,
        }
    }

    /// Whether the caller may simply retry. Only a partial failure needs
    /// manual reconciliation first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

/// Failures of the read-only namespace endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("invalid identifier format")]
    Validation(#[from] ValidationError),
    #[error("unknown namespace file '{name}'")]
    UnknownFile { name: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LookupError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::UnknownFile { .. } => 400,
            Self::Store(_) => 500,
        }
    }
}
