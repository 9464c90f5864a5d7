//! R2-backed [`ObjectStore`].
//!
//! R2 puts here are unconditional, so create-if-absent is a D1 claim row
//! (`INSERT ... ON CONFLICT DO NOTHING`) taken before the object is written.
//! Deleting a key releases its claim. Claim timestamps come from the
//! injected [`Clock`].

use crate::clock::{Clock, WorkerClock};
use crate::storage::{ObjectStore, StoreError, StoreOp};
use wasm_bindgen::JsValue;
use worker::*;

pub struct R2Store<C = WorkerClock> {
    bucket: Bucket,
    claims: D1Database,
    clock: C,
}

/// Row inserted into `object_claims`.
struct Claim<'k> {
    key: &'k str,
    claimed_at: String,
}

impl<'k> Claim<'k> {
    fn new(key: &'k str, clock: &impl Clock) -> Self {
        Self {
            key,
            claimed_at: clock.now(),
        }
    }
}

impl<C: Clock> R2Store<C> {
    pub fn new(bucket: Bucket, claims: D1Database, clock: C) -> Self {
        Self {
            bucket,
            claims,
            clock,
        }
    }

    /// Returns `true` when this call inserted the claim.
    async fn claim(&self, key: &str) -> Result<bool> {
        let claim = Claim::new(key, &self.clock);
        let result: D1Result = self
            .claims
            .prepare("INSERT INTO object_claims (key, claimed_at) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING")
            .bind(&[
                JsValue::from_str(claim.key),
                JsValue::from_str(&claim.claimed_at),
            ])?
            .run()
            .await?;

        let changed = result
            .meta()?
            .map(|m| m.changes.unwrap_or(0) > 0)
            .unwrap_or(false);
        Ok(changed)
    }

    async fn release(&self, key: &str) -> Result<()> {
        self.claims
            .prepare("DELETE FROM object_claims WHERE key = ?1")
            .bind(&[JsValue::from_str(key)])?
            .run()
            .await?;
        Ok(())
    }

    async fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let obj = self.bucket.get(key).execute().await?;
        match obj {
            Some(obj) => match obj.body() {
                Some(body) => {
                    let bytes = body.bytes().await?;
                    Ok(Some(bytes))
                }
                None => Ok(Some(Vec::new())),
            },
            None => Ok(None),
        }
    }
}

impl<C: Clock> ObjectStore for R2Store<C> {
    async fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
        self.get_blob(key)
            .await
            .map_err(|err| StoreError::backend(StoreOp::Get, key, err))
    }

    async fn create_if_absent(&self, key: &str, body: Vec<u8>) -> std::result::Result<(), StoreError> {
        let claimed = self
            .claim(key)
            .await
            .map_err(|err| StoreError::backend(StoreOp::Create, key, err))?;
        if !claimed {
            return Err(StoreError::AlreadyExists {
                key: key.to_string(),
            });
        }

        if let Err(err) = self.bucket.put(key, body).execute().await {
            // The object never landed; free the key for a later attempt.
            if let Err(release_err) = self.release(key).await {
                log::error!("event=claim_release_failed key={key} error={release_err}");
            }
            return Err(StoreError::backend(StoreOp::Create, key, err));
        }
        Ok(())
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> std::result::Result<(), StoreError> {
        self.bucket
            .put(key, body)
            .execute()
            .await
            .map(|_| ())
            .map_err(|err| StoreError::backend(StoreOp::Put, key, err))
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), StoreError> {
        self.bucket
            .delete(key)
            .await
            .map_err(|err| StoreError::backend(StoreOp::Delete, key, err))?;
        self.release(key)
            .await
            .map_err(|err| StoreError::backend(StoreOp::Delete, key, err))
    }
}
