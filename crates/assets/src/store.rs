//! Scene object store boundary

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use texpaint_painting::ObjectId;

use crate::error::AssetError;

/// Partial update of a scene object's properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_attachment_ids: Option<Vec<String>>,
}

/// The application's store of scene objects
pub trait SceneStore: Send + Sync {
    /// Asset references attached to `owner`
    fn attachments(&self, owner: &ObjectId) -> Result<Vec<String>, AssetError>;

    fn update_object(&self, owner: &ObjectId, patch: ObjectPatch) -> Result<(), AssetError>;
}

impl<S: SceneStore + ?Sized> SceneStore for Arc<S> {
    fn attachments(&self, owner: &ObjectId) -> Result<Vec<String>, AssetError> {
        (**self).attachments(owner)
    }

    fn update_object(&self, owner: &ObjectId, patch: ObjectPatch) -> Result<(), AssetError> {
        (**self).update_object(owner, patch)
    }
}

/// Thread-safe in-process [`SceneStore`]
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: RwLock<HashMap<ObjectId, Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or reset) an object with the given attachments
    pub fn insert_object(&self, owner: ObjectId, attachments: Vec<String>) -> Result<(), AssetError> {
        self.objects
            .write()
            .map_err(|e| AssetError::Store(e.to_string()))?
            .insert(owner, attachments);
        Ok(())
    }

    pub fn contains(&self, owner: &ObjectId) -> bool {
        self.objects.read().is_ok_and(|objects| objects.contains_key(owner))
    }
}

impl SceneStore for InMemoryStore {
    fn attachments(&self, owner: &ObjectId) -> Result<Vec<String>, AssetError> {
        let objects = self.objects.read().map_err(|e| AssetError::Store(e.to_string()))?;
        objects
            .get(owner)
            .cloned()
            .ok_or_else(|| AssetError::UnknownObject(owner.clone()))
    }

    fn update_object(&self, owner: &ObjectId, patch: ObjectPatch) -> Result<(), AssetError> {
        let mut objects = self.objects.write().map_err(|e| AssetError::Store(e.to_string()))?;
        let attachments = objects
            .get_mut(owner)
            .ok_or_else(|| AssetError::UnknownObject(owner.clone()))?;
        if let Some(ids) = patch.image_attachment_ids {
            *attachments = ids;
        }
        Ok(())
    }
}
