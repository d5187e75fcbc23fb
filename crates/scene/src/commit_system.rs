//! Persistence of finished strokes and UI-facing paint messages
//!
//! Strokes are committed on a dedicated tokio runtime. Completion reports are
//! drained every frame into [`PaintNotifications`], which the application
//! forwards to its UI.

use std::sync::Arc;

use bevy::ecs::message::Message;
use bevy::prelude::*;
use tokio::runtime::Runtime;

use texpaint_assets::{
    AssetCommitter, AssetPaths, CommitReport, CommitWorker, InMemoryStore, TokioFs,
};
use texpaint_config::PaintConfig;
use texpaint_ipc::{PaintCommand, PaintNotification};
use texpaint_painting::{CommitOutcome, CommitRequest, CommitSink, ObjectId, PaintError};

use crate::paintable::ImagePainter;

/// The application's scene objects and their attachments
#[derive(Resource, Clone, Default)]
pub struct SceneObjects(pub Arc<InMemoryStore>);

/// Queue of notifications for the UI.
/// The application should drain this and forward it.
#[derive(Resource, Default)]
pub struct PaintNotifications {
    pub messages: Vec<PaintNotification>,
}

impl PaintNotifications {
    pub fn send(&mut self, notification: PaintNotification) {
        self.messages.push(notification);
    }

    /// Take all queued notifications, leaving the queue empty
    pub fn drain(&mut self) -> Vec<PaintNotification> {
        std::mem::take(&mut self.messages)
    }
}

/// A UI command for the paint subsystem
#[derive(Message, Debug, Clone)]
pub struct PaintCommandMessage(pub PaintCommand);

/// Background committer for finished strokes
#[derive(Resource)]
pub struct PaintCommits {
    worker: Option<CommitWorker>,
    runtime: Option<Runtime>,
}

impl PaintCommits {
    /// Start the commit worker for the configured project
    pub fn start(config: &PaintConfig, store: Arc<InMemoryStore>) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("texpaint-commit")
            .build();

        match runtime {
            Ok(runtime) => {
                let committer = AssetCommitter::new(
                    TokioFs,
                    store,
                    AssetPaths::from(&config.assets),
                    config.assets.project_root.clone(),
                );
                let worker = CommitWorker::spawn(runtime.handle(), committer);
                info!(
                    "Committing painted textures under {}",
                    config.assets.project_root.display()
                );
                Self {
                    worker: Some(worker),
                    runtime: Some(runtime),
                }
            }
            Err(e) => {
                error!("Failed to start commit runtime: {}", e);
                Self::unavailable()
            }
        }
    }

    /// A committer that rejects every request
    pub fn unavailable() -> Self {
        Self {
            worker: None,
            runtime: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.worker.is_some()
    }

    /// Try to receive a finished commit (non-blocking)
    pub fn try_recv_report(&mut self) -> Option<CommitReport> {
        self.worker.as_mut()?.try_recv_report()
    }
}

impl CommitSink for PaintCommits {
    fn submit(&mut self, request: CommitRequest) -> Result<(), PaintError> {
        match self.worker.as_mut() {
            Some(worker) => worker.submit(request),
            None => Err(PaintError::CommitClosed),
        }
    }
}

impl Drop for PaintCommits {
    fn drop(&mut self) {
        // Finish queued writes before the runtime goes away
        if let (Some(worker), Some(runtime)) = (self.worker.take(), self.runtime.take()) {
            let pending = runtime.block_on(worker.shutdown());
            if !pending.is_empty() {
                info!("Flushed {} pending texture commits", pending.len());
            }
        }
    }
}

/// Surface a failed stroke commit to the UI
pub(crate) fn report_outcome(
    owner: &ObjectId,
    outcome: Option<CommitOutcome>,
    notifications: &mut PaintNotifications,
) {
    let Some(CommitOutcome::Failed(error)) = outcome else {
        return;
    };

    let owner_id = owner.to_string();
    let message = error.to_string();
    notifications.send(match error {
        PaintError::CommitClosed => PaintNotification::SaveFailed { owner_id, message },
        _ => PaintNotification::ExportFailed { owner_id, message },
    });
}

/// Plugin for stroke persistence and paint commands
pub struct CommitSystemPlugin;

impl Plugin for CommitSystemPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneObjects>()
            .init_resource::<PaintNotifications>()
            .add_message::<PaintCommandMessage>()
            .add_systems(Startup, start_commit_worker)
            .add_systems(Update, (apply_paint_commands, drain_commit_reports));
    }
}

fn start_commit_worker(
    mut commands: Commands,
    config: Res<PaintConfig>,
    objects: Res<SceneObjects>,
) {
    commands.insert_resource(PaintCommits::start(&config, objects.0.clone()));
}

/// Turn finished commits into UI notifications
fn drain_commit_reports(
    mut commits: ResMut<PaintCommits>,
    mut notifications: ResMut<PaintNotifications>,
) {
    while let Some(report) = commits.try_recv_report() {
        let owner_id = report.owner.to_string();
        match report.result {
            Ok(asset) => {
                info!("Saved {} for {}", asset.reference, owner_id);
                notifications.send(PaintNotification::AssetSaved {
                    owner_id,
                    path: asset.reference,
                });
            }
            Err(e) => {
                warn!("Failed to save texture for {}: {}", owner_id, e);
                notifications.send(PaintNotification::SaveFailed {
                    owner_id,
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Apply UI commands to the configuration and every painter
fn apply_paint_commands(
    mut messages: MessageReader<PaintCommandMessage>,
    mut config: ResMut<PaintConfig>,
    mut painters: Query<&mut ImagePainter>,
) {
    for PaintCommandMessage(command) in messages.read() {
        match *command {
            PaintCommand::SetBrushMode { mode } => {
                config.brush.kind = mode;
                for mut painter in painters.iter_mut() {
                    painter.controller.set_brush_mode(mode.into());
                }
            }
            PaintCommand::SetBrushSize { size } => {
                if !size.is_finite() || size <= 0.0 {
                    warn!("Ignoring brush size {}", size);
                    continue;
                }
                config.brush.size = size;
                for mut painter in painters.iter_mut() {
                    painter.controller.brush_settings_mut().size = size;
                }
            }
            PaintCommand::SetBrushColor { color } => {
                let color = color.map(|c| c.clamp(0.0, 1.0));
                config.brush.color = color;
                for mut painter in painters.iter_mut() {
                    painter.controller.brush_settings_mut().color = color;
                }
            }
            PaintCommand::SetProjectionMode { mode } => {
                config.projection = mode;
                for mut painter in painters.iter_mut() {
                    painter.controller.set_projection_mode(mode.into());
                }
            }
        }
        debug!("Applied paint command {:?}", command);
    }
}
