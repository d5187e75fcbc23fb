//! IPC message protocol for texpaint
//!
//! Defines the messages exchanged between the paint subsystem and the UI:
//! brush/projection commands going in, save notifications coming out.

mod commands;
mod error;
mod messages;

pub use commands::PaintCommand;
pub use error::IpcError;
pub use messages::PaintNotification;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serialize a message for the UI bridge
pub fn to_json<T: Serialize>(message: &T) -> Result<String, IpcError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a message received from the UI bridge
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}
