//! texpaint asset persistence
//!
//! Painted textures are written to `<project>/<assets_subdir>/<object><suffix>.<ext>`
//! and attached to their object exactly once. Writes run on a background
//! tokio task fed by [`CommitWorker`], which plugs into the interaction
//! controller as its [`texpaint_painting::CommitSink`].

mod committer;
mod error;
mod fs;
mod paths;
mod store;
mod worker;

pub use committer::{AssetCommitter, CommittedAsset};
pub use error::AssetError;
pub use fs::{AssetFs, TokioFs};
pub use paths::AssetPaths;
pub use store::{InMemoryStore, ObjectPatch, SceneStore};
pub use worker::{CommitReport, CommitWorker};
