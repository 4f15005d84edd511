//! Error types for the hotkey broker client.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    /// The well-known manager socket could not be reached. Recoverable: the
    /// feature degrades to a broker-less state.
    #[error("hotkey manager unreachable at '{path}': {source}", path = .path.display())]
    ManagerUnreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hotkey broker unreachable at '{path}': {source}", path = .path.display())]
    BrokerUnreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hotkey protocol failure during '{operation}': {source}")]
    Protocol {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected reply from the hotkey manager (opcode {opcode})")]
    UnexpectedReply { opcode: u32 },

    #[error("malformed reply from the hotkey manager: {0}")]
    MalformedReply(#[source] serde_json::Error),

    #[error("could not encode hotkey request: {0}")]
    Encode(#[source] serde_json::Error),
}
