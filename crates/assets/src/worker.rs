//! Background commit queue
//!
//! Commits are written on a tokio task so the interaction thread never waits
//! on the filesystem. Requests are processed in submission order.

use texpaint_painting::{CommitRequest, CommitSink, ObjectId, PaintError};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::committer::{AssetCommitter, CommittedAsset};
use crate::error::AssetError;
use crate::fs::AssetFs;
use crate::store::SceneStore;

/// Completion of one queued commit
#[derive(Debug)]
pub struct CommitReport {
    pub owner: ObjectId,
    pub result: Result<CommittedAsset, AssetError>,
}

/// Handle to the commit task
pub struct CommitWorker {
    requests: mpsc::UnboundedSender<CommitRequest>,
    reports: mpsc::UnboundedReceiver<CommitReport>,
    task: JoinHandle<()>,
}

impl CommitWorker {
    /// Start processing commits for `committer` on `handle`
    pub fn spawn<F, S>(handle: &Handle, committer: AssetCommitter<F, S>) -> Self
    where
        F: AssetFs + 'static,
        S: SceneStore + 'static,
    {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<CommitRequest>();
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        let task = handle.spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let result = committer.commit(&request).await;
                if let Err(e) = &result {
                    warn!("Commit for object {} failed: {}", request.owner, e);
                }
                // Reports are optional; keep writing if nobody listens
                let _ = report_tx.send(CommitReport {
                    owner: request.owner,
                    result,
                });
            }
        });

        Self {
            requests: request_tx,
            reports: report_rx,
            task,
        }
    }

    /// Try to receive a finished commit (non-blocking)
    pub fn try_recv_report(&mut self) -> Option<CommitReport> {
        self.reports.try_recv().ok()
    }

    /// Wait for the next finished commit
    pub async fn recv_report(&mut self) -> Option<CommitReport> {
        self.reports.recv().await
    }

    /// Stop accepting requests and wait for queued ones to finish
    pub async fn shutdown(self) -> Vec<CommitReport> {
        let Self {
            requests,
            mut reports,
            task,
        } = self;
        drop(requests);
        if let Err(e) = task.await {
            warn!("Commit task ended abnormally: {}", e);
        }
        let mut remaining = Vec::new();
        while let Ok(report) = reports.try_recv() {
            remaining.push(report);
        }
        remaining
    }
}

impl CommitSink for CommitWorker {
    fn submit(&mut self, request: CommitRequest) -> Result<(), PaintError> {
        self.requests
            .send(request)
            .map_err(|_| PaintError::CommitClosed)
    }
}
