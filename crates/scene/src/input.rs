//! Per-object input listeners
//!
//! Keyboard and pointer events are only delivered to objects that hold a
//! listener of the matching kind. Listeners are handed out as
//! [`ListenerToken`]s and die when the token is returned.

use bevy::prelude::*;
use texpaint_config::ModifierKey;
use texpaint_painting::{InputRouter, ListenerKind, ListenerToken, ObjectId};

#[derive(Debug)]
struct Listener {
    id: u64,
    owner: ObjectId,
    kind: ListenerKind,
}

/// Resource implementing [`InputRouter`] for the scene
#[derive(Resource, Debug, Default)]
pub struct InputRegistry {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl InputRegistry {
    pub fn is_listening(&self, owner: &ObjectId, kind: ListenerKind) -> bool {
        self.listeners
            .iter()
            .any(|l| l.kind == kind && &l.owner == owner)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl InputRouter for InputRegistry {
    fn register(&mut self, owner: &ObjectId, kind: ListenerKind) -> ListenerToken {
        self.next_id += 1;
        self.listeners.push(Listener {
            id: self.next_id,
            owner: owner.clone(),
            kind,
        });
        ListenerToken::new(self.next_id, owner.clone(), kind)
    }

    fn unregister(&mut self, token: ListenerToken) {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != token.id());
        if self.listeners.len() == before {
            warn!(
                "Unknown {:?} listener {} for {}",
                token.kind(),
                token.id(),
                token.owner()
            );
        }
    }
}

/// Physical keys for a configured modifier
pub fn modifier_key_codes(key: ModifierKey) -> [KeyCode; 2] {
    match key {
        ModifierKey::Shift => [KeyCode::ShiftLeft, KeyCode::ShiftRight],
        ModifierKey::Control => [KeyCode::ControlLeft, KeyCode::ControlRight],
        ModifierKey::Alt => [KeyCode::AltLeft, KeyCode::AltRight],
    }
}
