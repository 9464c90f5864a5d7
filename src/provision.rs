//! Orchestrator: `Validating -> Probing -> Writing -> Committed | Failed`.
//!
//! The probe is a cheap pre-check that answers the common repeat request
//! with a conflict without writing. Correctness under races comes from the
//! Writer's conditional marker create, so a failed probe is not fatal.

use crate::audit::{AuditEvent, AuditSink, Outcome};
use crate::clock::{Clock, Timer};
use crate::config::ProvisionConfig;
use crate::error::{LookupError, ProvisionError};
use crate::identifier::validate;
use crate::models::{CreationResult, ProvisionRequest};
use crate::namespace::{FileKind, Namespace, DEFAULT_FILES};
use crate::probe::{self, NamespaceStatus};
use crate::storage::{BoundedStore, ObjectStore};
use crate::writer::{NamespaceWriter, WriteFailure};

#[derive(Debug)]
enum State {
    Validating,
    Probing(Namespace),
    Writing(Namespace),
    Committed(CreationResult),
    Failed(ProvisionError),
}

/// Provisions namespaces against injected collaborators. Holds no
/// per-request state, so one instance may serve concurrent requests.
pub struct Provisioner<S, C, T, A> {
    store: S,
    clock: C,
    timer: T,
    audit: A,
    config: ProvisionConfig,
}

impl<S, C, T, A> Provisioner<S, C, T, A>
where
    S: ObjectStore,
    C: Clock,
    T: Timer,
    A: AuditSink,
{
    pub fn new(store: S, clock: C, timer: T, audit: A, config: ProvisionConfig) -> Self {
        Self {
            store,
            clock,
            timer,
            audit,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    fn bounded(&self) -> BoundedStore<'_, S, T> {
        BoundedStore::new(&self.store, &self.timer, self.config.call_timeout)
    }

    /// Run one provisioning attempt to a terminal state and audit it.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
        attempt_id: &str,
    ) -> Result<CreationResult, ProvisionError> {
        let now = self.clock.now();
        let store = self.bounded();
        let mut state = State::Validating;

        let outcome = loop {
            state = match state {
                State::Validating => match validate(&request.identifier) {
                    Ok(identifier) => {
                        State::Probing(Namespace::new(&self.config.prefix, identifier))
                    }
                    Err(err) => State::Failed(err.into()),
                },
                State::Probing(namespace) => match probe::exists(&store, &namespace).await {
                    Ok(true) => State::Failed(ProvisionError::Conflict {
                        identifier: namespace.identifier().to_string(),
                    }),
                    Ok(false) => State::Writing(namespace),
                    Err(err) => {
                        log::warn!(
                            "event=probe_unknown identifier={} error={err}",
                            namespace.identifier()
                        );
                        State::Writing(namespace)
                    }
                },
                State::Writing(namespace) => {
                    self.write(&store, namespace, request.create_default_files, &now, attempt_id)
                        .await
                }
                State::Committed(result) => break Ok(result),
                State::Failed(err) => break Err(err),
            };
        };

        self.record(attempt_id, &request.identifier, &outcome, &now)
            .await;
        outcome
    }

    async fn write(
        &self,
        store: &BoundedStore<'_, S, T>,
        namespace: Namespace,
        create_default_files: bool,
        now: &str,
        attempt_id: &str,
    ) -> State {
        let files: &[FileKind] = if create_default_files {
            &DEFAULT_FILES
        } else {
            &[]
        };
        let identifier = namespace.identifier().to_string();

        match NamespaceWriter::new(store)
            .create_all(&namespace, files, now, attempt_id)
            .await
        {
            Ok(files_created) => {
                let message = if files_created.is_empty() {
                    format!("Identifier '{identifier}' reserved without default files")
                } else {
                    format!(
                        "Namespace '{identifier}' created with {} default files",
                        files_created.len()
                    )
                };
                State::Committed(CreationResult {
                    identifier,
                    message,
                    files_created,
                    timestamp: now.to_string(),
                })
            }
            Err(WriteFailure::Conflict) => State::Failed(ProvisionError::Conflict { identifier }),
            Err(WriteFailure::RolledBack { cause }) => State::Failed(ProvisionError::Write {
                identifier,
                source: cause,
            }),
            Err(WriteFailure::Partial {
                cause,
                paths_remaining,
            }) => State::Failed(ProvisionError::PartialFailure {
                identifier,
                paths_remaining,
                source: cause,
            }),
        }
    }

    async fn record(
        &self,
        attempt_id: &str,
        identifier: &str,
        outcome: &Result<CreationResult, ProvisionError>,
        now: &str,
    ) {
        let event = match outcome {
            Ok(result) => {
                log::info!(
                    "event=namespace_provisioned identifier={identifier} files={}",
                    result.files_created.len()
                );
                AuditEvent {
                    attempt_id: attempt_id.to_string(),
                    identifier: identifier.to_string(),
                    outcome: Outcome::Committed,
                    error_kind: None,
                    files_created: result.files_created.clone(),
                    paths_remaining: Vec::new(),
                    recorded_at: now.to_string(),
                }
            }
            Err(err) => {
                match err {
                    ProvisionError::PartialFailure { .. } => {
                        log::error!("event=namespace_partial_failure identifier={identifier} error={err}")
                    }
                    ProvisionError::Write { .. } => {
                        log::warn!("event=namespace_rolled_back identifier={identifier} error={err}")
                    }
                    _ => log::info!(
                        "event=namespace_rejected identifier={identifier} kind={}",
                        err.kind()
                    ),
                }
                AuditEvent {
                    attempt_id: attempt_id.to_string(),
                    identifier: identifier.to_string(),
                    outcome: Outcome::Failed,
                    error_kind: Some(err.kind()),
                    files_created: Vec::new(),
                    paths_remaining: err.paths_remaining().map(<[_]>::to_vec).unwrap_or_default(),
                    recorded_at: now.to_string(),
                }
            }
        };

        if let Err(err) = self.audit.record(&event).await {
            log::error!("event=audit_failed attempt_id={attempt_id} error={err}");
        }
    }

    /// Report which canonical objects of a namespace exist.
    pub async fn inspect(&self, identifier: &str) -> Result<NamespaceStatus, LookupError> {
        let namespace = Namespace::new(&self.config.prefix, validate(identifier)?);
        Ok(probe::inspect(&self.bounded(), &namespace).await?)
    }

    /// Read one default file. `Ok(None)` when it does not exist.
    pub async fn read_file(
        &self,
        identifier: &str,
        file_name: &str,
    ) -> Result<Option<Vec<u8>>, LookupError> {
        let namespace = Namespace::new(&self.config.prefix, validate(identifier)?);
        let kind = FileKind::from_file_name(file_name).ok_or_else(|| LookupError::UnknownFile {
            name: file_name.to_string(),
        })?;
        Ok(self.bounded().get(&namespace.file_path(kind)).await?)
    }
}
