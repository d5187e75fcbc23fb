//! A full paint session persisted through the background commit worker

use std::sync::Arc;

use glam::{Quat, Vec3};
use image::{Rgba, RgbaImage};
use texpaint_assets::{AssetCommitter, AssetPaths, CommitWorker, InMemoryStore, SceneStore, TokioFs};
use texpaint_painting::{
    Collaborators, ExportFormat, InputRouter, InteractionPhase, ListenerKind, ListenerToken,
    MeshRaycastData, MeshTarget, ObjectId, PaintInteractionController, PaintSettings,
    PaintableTexture, PerspectiveCamera, TransformGizmo, WorldTransform, billboard_scale,
    decode_image,
};
use tokio::runtime::Handle;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Default)]
struct Gizmo {
    holder: Option<(ObjectId, bool)>,
}

impl TransformGizmo for Gizmo {
    fn attach(&mut self, owner: &ObjectId, enabled: bool) {
        self.holder = Some((owner.clone(), enabled));
    }

    fn suspend(&mut self, _owner: &ObjectId) {
        self.holder = None;
    }

    fn detach(&mut self, _owner: &ObjectId) {
        self.holder = None;
    }
}

#[derive(Default)]
struct Input {
    next_id: u64,
}

impl InputRouter for Input {
    fn register(&mut self, owner: &ObjectId, kind: ListenerKind) -> ListenerToken {
        self.next_id += 1;
        ListenerToken::new(self.next_id, owner.clone(), kind)
    }

    fn unregister(&mut self, _token: ListenerToken) {}
}

struct Session {
    mesh: MeshRaycastData,
    transform: WorldTransform,
    camera: PerspectiveCamera,
    texture: PaintableTexture<()>,
    controller: PaintInteractionController,
    gizmo: Gizmo,
    input: Input,
}

impl Session {
    fn new(owner: &ObjectId) -> Self {
        let source = RgbaImage::from_pixel(32, 32, WHITE);
        let mut texture = PaintableTexture::new(ExportFormat::Png);
        texture.seed_from(&source).unwrap();

        Self {
            mesh: MeshRaycastData::quad(),
            transform: WorldTransform::from_scale_rotation_translation(
                billboard_scale(1.0, source.width(), source.height()),
                Quat::IDENTITY,
                Vec3::ZERO,
            ),
            camera: PerspectiveCamera::looking_at(Vec3::new(0.0, 0.0, 2.5), Vec3::ZERO, Vec3::Y, 1.0, 1.0),
            texture,
            controller: PaintInteractionController::new(owner.clone(), PaintSettings::default()),
            gizmo: Gizmo::default(),
            input: Input::default(),
        }
    }

    /// Select, hold the modifier, drag across the middle row and release
    fn stroke(&mut self, worker: &mut CommitWorker) {
        let ctx = &mut Collaborators {
            gizmo: &mut self.gizmo,
            input: &mut self.input,
            commits: worker,
        };
        if self.controller.phase() == InteractionPhase::Idle {
            self.controller.selection_changed(true, &mut self.texture, ctx);
        }
        self.controller.modifier_pressed(ctx);

        let target = MeshTarget::new(&self.mesh, self.transform);
        for i in 0..=8 {
            let u = 0.2 + 0.6 * i as f32 / 8.0;
            let world = self.transform.transform_point(Vec3::new(u - 0.5, 0.0, 0.0));
            let sample = self.camera.world_to_ndc(world).unwrap();
            self.controller
                .pointer_moved(sample, &target, &self.camera, &mut self.texture);
        }

        let outcome = self.controller.modifier_released(&mut self.texture, ctx).unwrap();
        assert!(outcome.is_submitted());
    }
}

#[tokio::test]
async fn committed_stroke_lands_on_disk_and_is_attached_once() {
    let dir = tempfile::tempdir().unwrap();
    let owner = ObjectId::from("billboard-1");
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_object(owner.clone(), vec!["models/images/billboard-1.png".to_string()])
        .unwrap();

    let committer = AssetCommitter::new(TokioFs, store.clone(), AssetPaths::default(), dir.path());
    let mut worker = CommitWorker::spawn(&Handle::current(), committer);
    let mut session = Session::new(&owner);

    session.stroke(&mut worker);
    assert_eq!(session.gizmo.holder, Some((owner.clone(), true)));

    let first = worker.recv_report().await.unwrap();
    let first = first.result.unwrap();
    assert!(first.registered);
    assert_eq!(first.reference, "models/images/billboard-1-texture.png");

    let written = decode_image(&std::fs::read(&first.path).unwrap()).unwrap();
    assert_eq!(written.dimensions(), (32, 32));
    assert_ne!(*written.get_pixel(16, 16), WHITE);
    assert_eq!(*written.get_pixel(1, 1), WHITE);

    // A second stroke rewrites the same slot
    session.stroke(&mut worker);
    let second = worker.recv_report().await.unwrap().result.unwrap();
    assert_eq!(second.path, first.path);
    assert!(!second.registered);

    assert_eq!(
        store.attachments(&owner).unwrap(),
        vec![
            "models/images/billboard-1.png".to_string(),
            "models/images/billboard-1-texture.png".to_string(),
        ]
    );
}
