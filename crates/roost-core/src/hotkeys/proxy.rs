use std::path::{Path, PathBuf};

use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::event::{SharedEventDispatcher, SystemEvent};
use crate::hotkeys::error::HotkeyError;
use crate::hotkeys::protocol::{
    HotkeyActivated, RegisterRequest, RegisterResponse, SetHotkeyRequest, OP_HOTKEY_ACTIVATED,
    OP_REGISTER, OP_REGISTERED, OP_SET_HOTKEY,
};
use crate::ipc;

/// Client side of one broker session.
///
/// Created by registering with the manager; owns the broker connection
/// exclusively. After the connection drops, [`set_hotkey`] calls degrade to
/// logged no-ops — hotkeys are an enhancement, not a correctness-critical
/// path for the host component.
///
/// [`set_hotkey`]: BrokerProxy::set_hotkey
#[derive(Debug)]
pub struct BrokerProxy {
    broker_socket: PathBuf,
    writer: Mutex<OwnedWriteHalf>,
    notification_task: JoinHandle<()>,
}

impl BrokerProxy {
    /// Registers with the manager at `manager_socket` and opens the
    /// per-session broker connection it hands back.
    ///
    /// Broker notifications are re-emitted on `events` as
    /// [`SystemEvent::HotkeyActivated`], in arrival order.
    pub async fn connect(
        manager_socket: &Path,
        component_id: &str,
        events: SharedEventDispatcher,
    ) -> Result<Self, HotkeyError> {
        let mut manager = UnixStream::connect(manager_socket).await.map_err(|source| {
            HotkeyError::ManagerUnreachable {
                path: manager_socket.to_path_buf(),
                source,
            }
        })?;

        let request = serde_json::to_string(&RegisterRequest {
            component: component_id.to_string(),
        })
        .map_err(HotkeyError::Encode)?;
        ipc::write_frame(&mut manager, OP_REGISTER, &request)
            .await
            .map_err(|source| HotkeyError::Protocol {
                operation: "register".to_string(),
                source,
            })?;

        let (opcode, payload) =
            ipc::read_frame(&mut manager)
                .await
                .map_err(|source| HotkeyError::Protocol {
                    operation: "register".to_string(),
                    source,
                })?;
        if opcode != OP_REGISTERED {
            return Err(HotkeyError::UnexpectedReply { opcode });
        }
        let response: RegisterResponse =
            serde_json::from_str(&payload).map_err(HotkeyError::MalformedReply)?;

        let broker = UnixStream::connect(&response.broker_socket)
            .await
            .map_err(|source| HotkeyError::BrokerUnreachable {
                path: response.broker_socket.clone(),
                source,
            })?;
        let (read_half, write_half) = broker.into_split();
        let notification_task = tokio::spawn(notification_loop(read_half, events));

        log::debug!(
            "component '{component_id}': hotkey broker session open at '{}'",
            response.broker_socket.display()
        );
        Ok(Self {
            broker_socket: response.broker_socket,
            writer: Mutex::new(write_half),
            notification_task,
        })
    }

    pub fn broker_socket(&self) -> &Path {
        &self.broker_socket
    }

    /// Pushes one binding to the broker.
    ///
    /// Failures are soft: a dropped connection logs a warning and the call
    /// returns normally.
    pub async fn set_hotkey(&self, action: &str, binding: &str) {
        let request = SetHotkeyRequest {
            action: action.to_string(),
            binding: binding.to_string(),
        };
        let payload = match serde_json::to_string(&request) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("could not encode hotkey binding for '{action}': {e}");
                return;
            }
        };

        let mut writer = self.writer.lock().await;
        if let Err(e) = ipc::write_frame(&mut *writer, OP_SET_HOTKEY, &payload).await {
            log::warn!("hotkey broker did not take the binding for '{action}': {e}");
        }
    }

    /// Ends the session: stops the notification reader and drops the
    /// connection. The manager tears the session down on disconnect; no
    /// explicit release call exists.
    pub async fn shutdown(self) {
        self.notification_task.abort();
    }
}

async fn notification_loop(mut reader: OwnedReadHalf, events: SharedEventDispatcher) {
    loop {
        match ipc::read_frame(&mut reader).await {
            Ok((OP_HOTKEY_ACTIVATED, payload)) => {
                match serde_json::from_str::<HotkeyActivated>(&payload) {
                    Ok(notification) => {
                        log::debug!("hotkey activated: '{}'", notification.action);
                        events
                            .queue_event(Box::new(SystemEvent::HotkeyActivated {
                                action: notification.action,
                            }))
                            .await;
                    }
                    Err(e) => log::debug!("malformed hotkey notification: {e}"),
                }
            }
            Ok((opcode, _)) => {
                log::debug!("ignoring broker frame with opcode {opcode}");
            }
            Err(e) => {
                log::debug!("hotkey broker connection closed: {e}");
                break;
            }
        }
    }
}
