use std::path::PathBuf;

use texpaint_painting::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Object id {0:?} is not a valid file name")]
    InvalidOwner(ObjectId),

    #[error("Unknown scene object: {0}")]
    UnknownObject(ObjectId),

    #[error("Scene store unavailable: {0}")]
    Store(String),
}
