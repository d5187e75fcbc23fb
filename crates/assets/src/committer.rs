//! Writing exported textures into the project and attaching them to their object

use std::path::{Path, PathBuf};

use texpaint_painting::{CommitRequest, ObjectId};
use tracing::{debug, info};

use crate::error::AssetError;
use crate::fs::AssetFs;
use crate::paths::AssetPaths;
use crate::store::{ObjectPatch, SceneStore};

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedAsset {
    /// File written on disk
    pub path: PathBuf,
    /// Project-relative reference attached to the owner
    pub reference: String,
    /// Whether the owner's attachment list had to change
    pub registered: bool,
}

/// Persists painted textures under a project root.
///
/// Each object owns one texture slot: committing again overwrites the same
/// file, and a commit in another format replaces the slot's reference.
pub struct AssetCommitter<F, S> {
    fs: F,
    store: S,
    paths: AssetPaths,
    project_root: PathBuf,
}

impl<F: AssetFs, S: SceneStore> AssetCommitter<F, S> {
    pub fn new(fs: F, store: S, paths: AssetPaths, project_root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            store,
            paths,
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// Write `request` to its deterministic location and attach it to the owner.
    ///
    /// The owner is looked up first so nothing is written for an unknown
    /// object. A failed write leaves the store untouched.
    pub async fn commit(&self, request: &CommitRequest) -> Result<CommittedAsset, AssetError> {
        let owner = &request.owner;
        let extension = request.image.format.extension();
        let attachments = self.store.attachments(owner)?;

        let path = self.paths.destination(&self.project_root, owner, extension)?;
        if let Some(dir) = path.parent() {
            self.fs
                .ensure_dir(dir)
                .await
                .map_err(|source| AssetError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
        self.fs
            .write_file(&path, &request.image.bytes)
            .await
            .map_err(|source| AssetError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(
            "Wrote {} ({}x{}, {} bytes)",
            path.display(),
            request.image.width,
            request.image.height,
            request.image.bytes.len()
        );

        let reference = self.paths.reference(owner, extension);
        let registered = self.register(owner, attachments, &reference)?;
        if registered {
            info!("Attached {} to object {}", reference, owner);
        }

        Ok(CommittedAsset {
            path,
            reference,
            registered,
        })
    }

    fn register(
        &self,
        owner: &ObjectId,
        attachments: Vec<String>,
        reference: &str,
    ) -> Result<bool, AssetError> {
        let stale = attachments
            .iter()
            .any(|a| a != reference && self.paths.is_slot_reference(owner, a));
        if !stale && attachments.iter().any(|a| a == reference) {
            return Ok(false);
        }

        let mut updated: Vec<String> = attachments
            .into_iter()
            .filter(|a| !self.paths.is_slot_reference(owner, a))
            .collect();
        updated.push(reference.to_string());

        self.store.update_object(
            owner,
            ObjectPatch {
                image_attachment_ids: Some(updated),
            },
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;

    use texpaint_painting::{EncodedImage, ExportFormat};

    use super::*;
    use crate::fs::TokioFs;
    use crate::store::InMemoryStore;

    fn request(owner: &str, format: ExportFormat, bytes: &[u8]) -> CommitRequest {
        CommitRequest {
            owner: ObjectId::from(owner),
            image: EncodedImage {
                format,
                width: 2,
                height: 2,
                bytes: bytes.to_vec(),
            },
        }
    }

    fn store_with(owner: &str, attachments: &[&str]) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_object(
                ObjectId::from(owner),
                attachments.iter().map(|a| a.to_string()).collect(),
            )
            .unwrap();
        store
    }

    struct FailingFs;

    impl AssetFs for FailingFs {
        async fn ensure_dir(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }

        async fn write_file(&self, _path: &Path, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[tokio::test]
    async fn test_commit_writes_and_attaches() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with("abc", &[]);
        let committer = AssetCommitter::new(TokioFs, store.clone(), AssetPaths::default(), dir.path());

        let committed = committer
            .commit(&request("abc", ExportFormat::Png, b"png bytes"))
            .await
            .unwrap();

        let expected = dir.path().join("models").join("images").join("abc-texture.png");
        assert_eq!(committed.path, expected);
        assert_eq!(committed.reference, "models/images/abc-texture.png");
        assert!(committed.registered);
        assert_eq!(std::fs::read(&expected).unwrap(), b"png bytes");
        assert_eq!(
            store.attachments(&ObjectId::from("abc")).unwrap(),
            vec!["models/images/abc-texture.png"]
        );
    }

    #[tokio::test]
    async fn test_repeated_commit_keeps_single_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with("abc", &["notes/ref.jpg"]);
        let committer = AssetCommitter::new(TokioFs, store.clone(), AssetPaths::default(), dir.path());

        committer
            .commit(&request("abc", ExportFormat::Png, b"first"))
            .await
            .unwrap();
        let second = committer
            .commit(&request("abc", ExportFormat::Png, b"second"))
            .await
            .unwrap();

        assert!(!second.registered);
        assert_eq!(std::fs::read(&second.path).unwrap(), b"second");
        assert_eq!(
            store.attachments(&ObjectId::from("abc")).unwrap(),
            vec!["notes/ref.jpg", "models/images/abc-texture.png"]
        );
    }

    #[tokio::test]
    async fn test_format_change_replaces_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with("abc", &["models/images/other-texture.png", "notes/ref.jpg"]);
        let committer = AssetCommitter::new(TokioFs, store.clone(), AssetPaths::default(), dir.path());

        committer
            .commit(&request("abc", ExportFormat::Png, b"png"))
            .await
            .unwrap();
        let jpeg = committer
            .commit(&request("abc", ExportFormat::Jpeg { quality: 90 }, b"jpg"))
            .await
            .unwrap();

        assert!(jpeg.registered);
        assert_eq!(jpeg.reference, "models/images/abc-texture.jpg");
        assert_eq!(
            store.attachments(&ObjectId::from("abc")).unwrap(),
            vec![
                "models/images/other-texture.png",
                "notes/ref.jpg",
                "models/images/abc-texture.jpg"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let store = store_with("abc", &["notes/ref.jpg"]);
        let committer = AssetCommitter::new(FailingFs, store.clone(), AssetPaths::default(), "/project");

        let err = committer
            .commit(&request("abc", ExportFormat::Png, b"png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::Write { .. }));
        assert_eq!(
            store.attachments(&ObjectId::from("abc")).unwrap(),
            vec!["notes/ref.jpg"]
        );
    }

    #[tokio::test]
    async fn test_unknown_owner_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with("abc", &[]);
        let committer = AssetCommitter::new(TokioFs, store, AssetPaths::default(), dir.path());

        let err = committer
            .commit(&request("ghost", ExportFormat::Png, b"png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::UnknownObject(_)));
        assert!(!dir.path().join("models").exists());
    }

    #[tokio::test]
    async fn test_path_like_owner_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        let store = store_with("../escape", &[]);
        let committer = AssetCommitter::new(TokioFs, store.clone(), AssetPaths::default(), &root);

        let err = committer
            .commit(&request("../escape", ExportFormat::Png, b"png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::InvalidOwner(_)));
        assert!(!root.exists());
        assert!(!dir.path().join("models").exists());
        assert!(store.attachments(&ObjectId::from("../escape")).unwrap().is_empty());
    }
}
