//! In-memory collaborators with fault injection, for unit tests.

use crate::audit::{AuditError, AuditEvent, AuditSink};
use crate::clock::{Clock, Timer};
use crate::storage::{ObjectStore, StoreError, StoreOp};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Return a backend error without touching state.
    Fail,
    /// Never complete.
    Hang,
    /// Apply the operation, then never complete.
    HangAfterApply,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: RefCell<BTreeMap<String, Vec<u8>>>,
    faults: RefCell<HashMap<(StoreOp, String), Fault>>,
    calls: RefCell<Vec<(StoreOp, String)>>,
    yield_each_call: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend once before every call so concurrent attempts interleave.
    pub fn interleaved() -> Self {
        let store = Self::default();
        store.yield_each_call.set(true);
        store
    }

    pub fn inject(&self, op: StoreOp, key: &str, fault: Fault) {
        self.faults.borrow_mut().insert((op, key.to_string()), fault);
    }

    pub fn clear_faults(&self) {
        self.faults.borrow_mut().clear();
    }

    pub fn fail_put(&self, key: &str) {
        self.inject(StoreOp::Put, key, Fault::Fail);
    }

    pub fn fail_delete(&self, key: &str) {
        self.inject(StoreOp::Delete, key, Fault::Fail);
    }

    pub fn hang_on(&self, key: &str) {
        for op in [StoreOp::Get, StoreOp::Create, StoreOp::Put, StoreOp::Delete] {
            self.inject(op, key, Fault::Hang);
        }
    }

    pub fn seed(&self, key: &str, body: &[u8]) {
        self.objects
            .borrow_mut()
            .insert(key.to_string(), body.to_vec());
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.borrow().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<(StoreOp, String)> {
        self.calls.borrow().clone()
    }

    /// Calls that could change state.
    pub fn mutations(&self) -> Vec<(StoreOp, String)> {
        self.calls()
            .into_iter()
            .filter(|(op, _)| *op != StoreOp::Get)
            .collect()
    }

    async fn enter(&self, op: StoreOp, key: &str) -> Result<Option<Fault>, StoreError> {
        self.calls.borrow_mut().push((op, key.to_string()));
        if self.yield_each_call.get() {
            YieldNow(false).await;
        }
        let fault = self.faults.borrow().get(&(op, key.to_string())).copied();
        match fault {
            Some(Fault::Fail) => Err(StoreError::backend(op, key, "injected failure")),
            Some(Fault::Hang) => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            other => Ok(other),
        }
    }

    async fn finish(fault: Option<Fault>) {
        if fault == Some(Fault::HangAfterApply) {
            futures::future::pending::<()>().await;
        }
    }
}

impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let fault = self.enter(StoreOp::Get, key).await?;
        let body = self.object(key);
        Self::finish(fault).await;
        Ok(body)
    }

    async fn create_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let fault = self.enter(StoreOp::Create, key).await?;
        {
            let mut objects = self.objects.borrow_mut();
            if objects.contains_key(key) {
                return Err(StoreError::AlreadyExists {
                    key: key.to_string(),
                });
            }
            objects.insert(key.to_string(), body);
        }
        Self::finish(fault).await;
        Ok(())
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let fault = self.enter(StoreOp::Put, key).await?;
        self.objects.borrow_mut().insert(key.to_string(), body);
        Self::finish(fault).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let fault = self.enter(StoreOp::Delete, key).await?;
        self.objects.borrow_mut().remove(key);
        Self::finish(fault).await;
        Ok(())
    }
}

/// Store whose create-if-absent takes a claim first and writes the object
/// second, releasing the claim only on delete or on a reported write error.
/// A dropped create leaves the claim behind, like a timed-out D1 insert.
#[derive(Default)]
pub struct ClaimStore {
    claims: RefCell<BTreeSet<String>>,
    objects: RefCell<BTreeMap<String, Vec<u8>>>,
    hanging_writes: RefCell<BTreeSet<String>>,
}

impl ClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The object write behind a claim on `key` never completes.
    pub fn hang_object_write(&self, key: &str) {
        self.hanging_writes.borrow_mut().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.hanging_writes.borrow_mut().clear();
    }

    pub fn claims(&self) -> Vec<String> {
        self.claims.borrow().iter().cloned().collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }
}

impl ObjectStore for ClaimStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.objects.borrow().get(key).cloned())
    }

    async fn create_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        if !self.claims.borrow_mut().insert(key.to_string()) {
            return Err(StoreError::AlreadyExists {
                key: key.to_string(),
            });
        }
        if self.hanging_writes.borrow().contains(key) {
            futures::future::pending::<()>().await;
        }
        self.objects.borrow_mut().insert(key.to_string(), body);
        Ok(())
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.objects.borrow_mut().insert(key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.objects.borrow_mut().remove(key);
        self.claims.borrow_mut().remove(key);
        Ok(())
    }
}

struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub struct FixedClock(pub &'static str);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.to_string()
    }
}

/// Deadline that either fires at once or never.
pub struct TestTimer {
    fires: bool,
}

impl TestTimer {
    pub fn immediate() -> Self {
        Self { fires: true }
    }

    pub fn never() -> Self {
        Self { fires: false }
    }
}

impl Timer for TestTimer {
    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> {
        let fires = self.fires;
        async move {
            if !fires {
                futures::future::pending::<()>().await;
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryAudit {
    events: RefCell<Vec<AuditEvent>>,
    failing: Cell<bool>,
}

impl MemoryAudit {
    pub fn failing() -> Self {
        let audit = Self::default();
        audit.failing.set(true);
        audit
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.borrow().clone()
    }
}

impl AuditSink for MemoryAudit {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        if self.failing.get() {
            return Err(AuditError("injected failure".into()));
        }
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}
