//! Operation-level contract with the hotkey manager service.
//!
//! The manager listens on a well-known socket; `register` hands back the
//! path of a per-session broker socket. The broker connection is
//! bidirectional: the client pushes `set_hotkey` requests and the broker
//! pushes `hotkey_activated` notifications, each as one frame (see
//! [`crate::ipc`] for the envelope).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ipc;

/// Client -> manager: obtain a broker session.
pub const OP_REGISTER: u32 = 0;
/// Manager -> client: broker session granted.
pub const OP_REGISTERED: u32 = 1;
/// Client -> broker: bind `action` to `binding`.
pub const OP_SET_HOTKEY: u32 = 2;
/// Broker -> client: a bound hotkey was pressed.
pub const OP_HOTKEY_ACTIVATED: u32 = 3;

/// Directory under the runtime dir where the manager lives.
pub const MANAGER_SOCKET_DIR: &str = "roost-hotkeyd";
/// File name of the manager's well-known socket.
pub const MANAGER_SOCKET_NAME: &str = "manager.sock";

/// The well-known manager socket path for this session.
pub fn default_manager_socket() -> PathBuf {
    ipc::default_runtime_dir()
        .join(MANAGER_SOCKET_DIR)
        .join(MANAGER_SOCKET_NAME)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Application id of the registering component.
    pub component: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Socket of the dedicated per-session broker.
    pub broker_socket: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetHotkeyRequest {
    pub action: String,
    pub binding: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HotkeyActivated {
    pub action: String,
}
