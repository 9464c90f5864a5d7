//! Namespace Writer: reserve the marker, write default files, and roll
//! back on failure.
//!
//! The marker's conditional create is the only atomic step. Losing it means
//! conflict and nothing else is touched. Winning it commits this attempt to
//! either populate every default file or compensate by deleting what it
//! wrote, marker last.

use crate::clock::Timer;
use crate::content::{generate, marker_attempt_id, marker_body};
use crate::namespace::{FileKind, Namespace};
use crate::storage::{BoundedStore, ObjectStore, StoreError};

/// How a write attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFailure {
    /// Another attempt holds the marker.
    Conflict,
    /// Every compensating delete succeeded; nothing persisted.
    RolledBack { cause: StoreError },
    /// `paths_remaining` exist after the rollback, or their state could not
    /// be read. A marker whose ownership could not be read back is listed
    /// without being deleted, since it may belong to another attempt.
    Partial {
        cause: StoreError,
        paths_remaining: Vec<String>,
    },
}

pub struct NamespaceWriter<'s, 'a, S, T> {
    store: &'s BoundedStore<'a, S, T>,
}

impl<'s, 'a, S: ObjectStore, T: Timer> NamespaceWriter<'s, 'a, S, T> {
    pub fn new(store: &'s BoundedStore<'a, S, T>) -> Self {
        Self { store }
    }

    /// Create the marker, then each of `files` in order. Returns the created
    /// default-file paths; the marker is not listed.
    pub async fn create_all(
        &self,
        namespace: &Namespace,
        files: &[FileKind],
        now: &str,
        attempt_id: &str,
    ) -> Result<Vec<String>, WriteFailure> {
        let identifier = namespace.identifier();
        let marker = namespace.marker_path();

        match self
            .store
            .create_if_absent(&marker, marker_body(identifier, attempt_id, now))
            .await
        {
            Ok(()) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                log::info!("event=marker_conflict identifier={identifier}");
                return Err(WriteFailure::Conflict);
            }
            Err(cause) => return Err(self.resolve_marker(&marker, attempt_id, cause).await),
        }

        let mut written = Vec::with_capacity(files.len());
        for &kind in files {
            let path = namespace.file_path(kind);
            let body = generate(kind, identifier, now);
            if let Err(cause) = self.store.put(&path, body).await {
                log::warn!(
                    "event=default_file_write_failed identifier={identifier} path={path} error={cause}"
                );
                // A failed put may still have landed, so it is compensated too.
                let mut touched = Vec::with_capacity(written.len() + 2);
                touched.push(marker);
                touched.extend(written);
                touched.push(path);
                return Err(self.roll_back(touched, cause).await);
            }
            written.push(path);
        }

        Ok(written)
    }

    /// The marker create failed without a definite conflict. Read the
    /// marker back to learn whether this attempt owns it.
    ///
    /// An absent marker is still deleted: a backend may hold a reservation
    /// for the key without the object, and only a delete frees it.
    async fn resolve_marker(&self, marker: &str, attempt_id: &str, cause: StoreError) -> WriteFailure {
        match self.store.get(marker).await {
            Ok(None) => self.roll_back(vec![marker.to_string()], cause).await,
            Ok(Some(body)) if marker_attempt_id(&body).as_deref() == Some(attempt_id) => {
                self.roll_back(vec![marker.to_string()], cause).await
            }
            Ok(Some(_)) => WriteFailure::Conflict,
            Err(err) => {
                log::error!("event=marker_unresolved path={marker} error={err}");
                WriteFailure::Partial {
                    cause,
                    paths_remaining: vec![marker.to_string()],
                }
            }
        }
    }

    /// Best-effort delete of `touched` (creation order) in reverse. Every
    /// delete is attempted even after one fails. A path whose delete failed
    /// is only reported if a read shows it still exists, or cannot tell.
    async fn roll_back(&self, touched: Vec<String>, cause: StoreError) -> WriteFailure {
        let mut remaining = Vec::new();
        for path in touched.into_iter().rev() {
            if let Err(err) = self.store.delete(&path).await {
                log::error!("event=rollback_delete_failed path={path} error={err}");
                if self.still_present(&path).await {
                    remaining.push(path);
                }
            }
        }

        if remaining.is_empty() {
            WriteFailure::RolledBack { cause }
        } else {
            remaining.reverse();
            WriteFailure::Partial {
                cause,
                paths_remaining: remaining,
            }
        }
    }

    async fn still_present(&self, path: &str) -> bool {
        match self.store.get(path).await {
            Ok(found) => found.is_some(),
            Err(err) => {
                log::warn!("event=rollback_check_failed path={path} error={err}");
                true
            }
        }
    }
}
