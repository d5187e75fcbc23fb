//! Hand-off of exported textures to persistence

use crate::error::PaintError;
use crate::types::{EncodedImage, ObjectId};

/// An exported texture waiting to be written for `owner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub owner: ObjectId,
    pub image: EncodedImage,
}

/// Accepts commit requests without blocking the caller.
///
/// Completion (or failure) of the write is reported elsewhere; `submit` only
/// fails when the sink can no longer accept work.
pub trait CommitSink {
    fn submit(&mut self, request: CommitRequest) -> Result<(), PaintError>;
}

impl CommitSink for Vec<CommitRequest> {
    fn submit(&mut self, request: CommitRequest) -> Result<(), PaintError> {
        self.push(request);
        Ok(())
    }
}

/// What happened when a stroke session ended
#[derive(Debug)]
pub enum CommitOutcome {
    /// The exported texture was queued for persistence
    Submitted,
    /// No texture is seeded, so there was nothing to export
    NothingToCommit,
    /// Export or submission failed; the painted buffer is kept in memory
    Failed(PaintError),
}

impl CommitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}
