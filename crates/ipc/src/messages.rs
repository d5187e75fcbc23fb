//! Notifications from the paint subsystem to the UI.

use serde::{Deserialize, Serialize};

/// Outcome of a paint commit, surfaced to the owning application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaintNotification {
    /// The painted texture was written and registered on the object
    AssetSaved { owner_id: String, path: String },

    /// Writing the texture failed; the object's attachments are unchanged
    SaveFailed { owner_id: String, message: String },

    /// The buffer could not be encoded; nothing was written
    ExportFailed { owner_id: String, message: String },
}

impl PaintNotification {
    /// Id of the scene object the notification is about
    pub fn owner_id(&self) -> &str {
        match self {
            Self::AssetSaved { owner_id, .. }
            | Self::SaveFailed { owner_id, .. }
            | Self::ExportFailed { owner_id, .. } => owner_id,
        }
    }

    /// Whether the notification reports a failure
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::AssetSaved { .. })
    }
}
