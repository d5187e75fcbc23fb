//! Deterministic layout of painted texture files

use std::path::{Component, Path, PathBuf};

use texpaint_config::{AssetsConfig, DEFAULT_ASSET_SUFFIX, DEFAULT_ASSETS_SUBDIR};
use texpaint_painting::ObjectId;

use crate::error::AssetError;

/// Where an object's painted texture lives, on disk and in its attachment list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// Project-relative, `/`-separated
    pub assets_subdir: String,
    pub suffix: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            assets_subdir: DEFAULT_ASSETS_SUBDIR.to_string(),
            suffix: DEFAULT_ASSET_SUFFIX.to_string(),
        }
    }
}

impl From<&AssetsConfig> for AssetPaths {
    fn from(config: &AssetsConfig) -> Self {
        Self {
            assets_subdir: config.subdir.trim_matches('/').to_string(),
            suffix: config.suffix.clone(),
        }
    }
}

impl AssetPaths {
    /// `<owner><suffix>.<ext>`
    pub fn file_name(&self, owner: &ObjectId, extension: &str) -> String {
        format!("{}{}.{}", owner, self.suffix, extension)
    }

    /// `<project_root>/<assets_subdir>/<owner><suffix>.<ext>`
    ///
    /// Fails for owners that would name anything but a file inside the assets directory.
    pub fn destination(
        &self,
        project_root: &Path,
        owner: &ObjectId,
        extension: &str,
    ) -> Result<PathBuf, AssetError> {
        check_owner(owner)?;
        let mut path = project_root.to_path_buf();
        path.extend(self.subdir_components());
        path.push(self.file_name(owner, extension));
        Ok(path)
    }

    /// Project-relative reference recorded on the owning object
    pub fn reference(&self, owner: &ObjectId, extension: &str) -> String {
        let file_name = self.file_name(owner, extension);
        if self.subdir_components().next().is_none() {
            return file_name;
        }
        format!("{}/{}", self.subdir_components().collect::<Vec<_>>().join("/"), file_name)
    }

    /// Whether `reference` occupies `owner`'s painted texture slot, whatever its extension
    pub fn is_slot_reference(&self, owner: &ObjectId, reference: &str) -> bool {
        let stem = self.reference(owner, "");
        reference
            .strip_prefix(stem.as_str())
            .is_some_and(|ext| !ext.is_empty() && !ext.contains(['/', '.']))
    }

    fn subdir_components(&self) -> impl Iterator<Item = &str> {
        self.assets_subdir.split('/').filter(|c| !c.is_empty())
    }
}

/// An owner id must be exactly one plain path component
fn check_owner(owner: &ObjectId) -> Result<(), AssetError> {
    let id = owner.0.as_str();
    let mut components = Path::new(id).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single && !id.contains(['/', '\\', '\0']) {
        Ok(())
    } else {
        Err(AssetError::InvalidOwner(owner.clone()))
    }
}
