//! Object storage seam.
//!
//! Provisioning only needs four single-key primitives. `create_if_absent`
//! is the one call that must be atomic in the backend; everything else is
//! plain last-writer-wins.

use crate::clock::Timer;
use futures_util::future::{select, Either};
use std::fmt;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Create,
    Put,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Put => "put",
            Self::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// `create_if_absent` lost: an object already exists at `key`.
    #[error("object {key} already exists")]
    AlreadyExists { key: String },
    #[error("{op} {key} timed out after {after_ms}ms")]
    Timeout {
        op: StoreOp,
        key: String,
        after_ms: u64,
    },
    #[error("{op} {key} failed: {message}")]
    Backend {
        op: StoreOp,
        key: String,
        message: String,
    },
}

impl StoreError {
    pub fn backend(op: StoreOp, key: &str, message: impl fmt::Display) -> Self {
        Self::Backend {
            op,
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Individually addressed object storage.
///
/// Futures are not required to be `Send`; worker bindings never are.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Fetch an object body, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Create `key` only if nothing exists there. Fails with
    /// [`StoreError::AlreadyExists`] otherwise.
    async fn create_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;

    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Wraps a store so every call is raced against a per-call timeout.
///
/// A call that loses the race is dropped, not cancelled in the backend.
pub struct BoundedStore<'a, S, T> {
    store: &'a S,
    timer: &'a T,
    timeout: Duration,
}

impl<'a, S: ObjectStore, T: Timer> BoundedStore<'a, S, T> {
    pub fn new(store: &'a S, timer: &'a T, timeout: Duration) -> Self {
        Self {
            store,
            timer,
            timeout,
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.bounded(StoreOp::Get, key, self.store.get(key)).await
    }

    pub async fn create_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.bounded(StoreOp::Create, key, self.store.create_if_absent(key, body))
            .await
    }

    pub async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.bounded(StoreOp::Put, key, self.store.put(key, body)).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.bounded(StoreOp::Delete, key, self.store.delete(key)).await
    }

    async fn bounded<R, F>(&self, op: StoreOp, key: &str, call: F) -> Result<R, StoreError>
    where
        F: Future<Output = Result<R, StoreError>>,
    {
        let call = pin!(call);
        let deadline = pin!(self.timer.sleep(self.timeout));
        match select(call, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                let after_ms = self.timeout.as_millis() as u64;
                log::warn!("event=storage_timeout op={op} key={key} after_ms={after_ms}");
                Err(StoreError::Timeout {
                    op,
                    key: key.to_string(),
                    after_ms,
                })
            }
        }
    }
}
