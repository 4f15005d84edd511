//! # Single-instance enforcement
//!
//! Only one process per application id may run at a time, machine/session
//! wide. The claim is a Unix socket named after the application id inside
//! the runtime directory: binding it is the atomic compare-and-set that
//! serializes concurrent claims.
//!
//! [`claim`] probes the socket first. A live listener means a primary
//! already exists, so the caller receives [`InstanceClaim::Secondary`] with
//! an [`ActivationForwarder`]: forward the activation request and exit. A
//! dead socket file (connection refused) is reclaimed; a successful bind
//! makes this process the primary, and every `activate` request accepted
//! afterwards is re-emitted locally as
//! [`SystemEvent::ActivationRequested`].

pub mod error;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

use crate::event::{SharedEventDispatcher, SystemEvent};
use crate::instance::error::InstanceError;
use crate::ipc;

/// Opcode of the activation request on the instance socket.
const OP_ACTIVATE: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ActivateRequest {
    component: String,
}

/// Which side of the singleton this process ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRole {
    /// This process owns the identity and runs the event loop.
    Primary,
    /// Another process owns the identity; forward activation and exit.
    Secondary,
}

/// Outcome of [`claim`].
#[derive(Debug)]
pub enum InstanceClaim {
    Primary(SingleInstanceGuard),
    Secondary(ActivationForwarder),
}

impl InstanceClaim {
    pub fn role(&self) -> InstanceRole {
        match self {
            InstanceClaim::Primary(_) => InstanceRole::Primary,
            InstanceClaim::Secondary(_) => InstanceRole::Secondary,
        }
    }
}

/// Socket path for `application_id` under `runtime_dir`.
fn socket_path(runtime_dir: &Path, application_id: &str) -> PathBuf {
    runtime_dir.join(format!("{application_id}.sock"))
}

/// Claims the singleton identity `application_id`.
///
/// `runtime_dir` is usually [`ipc::default_runtime_dir`]; tests point it at
/// a scratch directory. The dispatcher is where accepted activation
/// requests surface as events when this process becomes the primary.
pub async fn claim(
    application_id: &str,
    runtime_dir: &Path,
    events: SharedEventDispatcher,
) -> Result<InstanceClaim, InstanceError> {
    let path = socket_path(runtime_dir, application_id);

    match UnixStream::connect(&path).await {
        Ok(stream) => {
            log::info!("instance '{application_id}' already running, claim yields secondary");
            return Ok(InstanceClaim::Secondary(ActivationForwarder {
                application_id: application_id.to_string(),
                stream,
            }));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            // Socket file left behind by a dead holder; reclaim it.
            log::debug!("removing stale instance socket '{}'", path.display());
            let _ = tokio::fs::remove_file(&path).await;
        }
        Err(source) => return Err(InstanceError::Probe { path, source }),
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| InstanceError::Claim {
                path: path.clone(),
                source,
            })?;
    }

    let listener = match UnixListener::bind(&path) {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            // Lost the race to a concurrent claimant; it is the primary now.
            let stream = UnixStream::connect(&path)
                .await
                .map_err(|source| InstanceError::Probe {
                    path: path.clone(),
                    source,
                })?;
            log::info!("instance '{application_id}' claimed concurrently, claim yields secondary");
            return Ok(InstanceClaim::Secondary(ActivationForwarder {
                application_id: application_id.to_string(),
                stream,
            }));
        }
        Err(source) => return Err(InstanceError::Claim { path, source }),
    };

    log::info!("claimed instance '{application_id}' at '{}'", path.display());
    let accept_task = tokio::spawn(accept_loop(
        listener,
        events,
        application_id.to_string(),
    ));

    Ok(InstanceClaim::Primary(SingleInstanceGuard {
        application_id: application_id.to_string(),
        socket_path: path,
        accept_task: Some(accept_task),
        released: false,
    }))
}

async fn accept_loop(
    listener: UnixListener,
    events: SharedEventDispatcher,
    application_id: String,
) {
    loop {
        match listener.accept().await {
            Ok((mut stream, _addr)) => match ipc::read_frame(&mut stream).await {
                Ok((OP_ACTIVATE, payload)) => {
                    match serde_json::from_str::<ActivateRequest>(&payload) {
                        Ok(request) => log::info!(
                            "instance '{application_id}': activation forwarded by '{}'",
                            request.component
                        ),
                        Err(e) => log::debug!(
                            "instance '{application_id}': unreadable activation payload: {e}"
                        ),
                    }
                    events
                        .queue_event(Box::new(SystemEvent::ActivationRequested))
                        .await;
                }
                Ok((opcode, _)) => {
                    log::debug!("instance '{application_id}': ignoring request with opcode {opcode}");
                }
                Err(e) => {
                    log::debug!("instance '{application_id}': dropped connection: {e}");
                }
            },
            Err(e) => {
                log::warn!("instance '{application_id}': accept failed: {e}");
                break;
            }
        }
    }
}

/// Holds the primary claim for one application id.
///
/// [`release`](SingleInstanceGuard::release) unlinks the socket so a
/// successor can claim immediately. Dropping without releasing also cleans
/// up, and even an unclean exit only leaves a stale socket file that the
/// next claim reclaims.
#[derive(Debug)]
pub struct SingleInstanceGuard {
    application_id: String,
    socket_path: PathBuf,
    accept_task: Option<JoinHandle<()>>,
    released: bool,
}

impl SingleInstanceGuard {
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Gives the identity up: stops accepting activation requests and
    /// unlinks the socket.
    pub async fn release(mut self) -> Result<(), InstanceError> {
        self.released = true;
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        log::info!("released instance '{}'", self.application_id);
        match tokio::fs::remove_file(&self.socket_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(InstanceError::Release {
                path: self.socket_path.clone(),
                source,
            }),
        }
    }
}

impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Secondary-side handle: forwards the activation request to the running
/// primary, after which the process is expected to exit.
#[derive(Debug)]
pub struct ActivationForwarder {
    application_id: String,
    stream: UnixStream,
}

impl ActivationForwarder {
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub async fn forward_activation(mut self) -> Result<(), InstanceError> {
        let payload = serde_json::to_string(&ActivateRequest {
            component: self.application_id.clone(),
        })?;
        ipc::write_frame(&mut self.stream, OP_ACTIVATE, &payload)
            .await
            .map_err(|source| InstanceError::Forward { source })?;
        self.stream
            .shutdown()
            .await
            .map_err(|source| InstanceError::Forward { source })?;
        log::info!(
            "forwarded activation to the running '{}' instance",
            self.application_id
        );
        Ok(())
    }
}
