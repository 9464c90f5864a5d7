//! Existence checks against a namespace's canonical objects.
//!
//! These reads are advisory. Under concurrent writers only the marker's
//! conditional create decides who provisions a namespace.

use crate::clock::Timer;
use crate::namespace::{Namespace, DEFAULT_FILES};
use crate::storage::{BoundedStore, ObjectStore, StoreError};
use serde::Serialize;

/// Whether the namespace's marker object exists. One `get`, no listing.
pub async fn exists<S: ObjectStore, T: Timer>(
    store: &BoundedStore<'_, S, T>,
    namespace: &Namespace,
) -> Result<bool, StoreError> {
    Ok(store.get(&namespace.marker_path()).await?.is_some())
}

/// Snapshot of which canonical objects are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceStatus {
    pub identifier: String,
    /// Marker present.
    pub provisioned: bool,
    /// Every default file present.
    pub populated: bool,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

pub async fn inspect<S: ObjectStore, T: Timer>(
    store: &BoundedStore<'_, S, T>,
    namespace: &Namespace,
) -> Result<NamespaceStatus, StoreError> {
    let provisioned = exists(store, namespace).await?;

    let mut present = Vec::new();
    let mut missing = Vec::new();
    for kind in DEFAULT_FILES {
        let path = namespace.file_path(kind);
        if store.get(&path).await?.is_some() {
            present.push(path);
        } else {
            missing.push(path);
        }
    }

    Ok(NamespaceStatus {
        identifier: namespace.identifier().to_string(),
        provisioned,
        populated: missing.is_empty(),
        present,
        missing,
    })
}
