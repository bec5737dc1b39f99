// Collision detection and response for 2D game objects
//
// Owners register colliders with a `CollisionSystem`; each tick the system
// pulls owner positions, tests layer-compatible pairs, pushes solid bodies
// apart and notifies the owners involved. `PhysicsWorld` wraps it with a
// fixed timestep and body integration.

pub mod body;
pub mod bounds;
pub mod collider;
pub mod collision;
pub mod debug;
pub mod handler;
pub mod layer;
pub mod narrow;
pub mod owner;
pub mod system;
pub mod world;

pub use body::{BodyBuilder, PhysicsComponent};
pub use bounds::Bounds;
pub use collider::{Collider, ColliderBuilder, Shape, ShapeKind};
pub use collision::{Collision, CollisionResult};
pub use debug::{DebugLines, DebugVertex};
pub use handler::{CollisionHandler, CollisionPair, Contact, HandlerRegistry};
pub use layer::{CollisionLayer, LayerId, LayerRegistry};
pub use owner::{
    share, CollisionObserver, CollisionOwner, OwnerId, OwnerRef, PhysicsObject, PositionProvider,
};
pub use system::{ColliderHandle, CollisionConfig, CollisionSystem};
pub use world::{PhysicsSettings, PhysicsWorld};

/// Setup-time physics errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("Invalid {what}: {value} (must be finite and positive)")]
    InvalidDimension { what: &'static str, value: f32 },

    #[error("Invalid mass: {0} (must be finite and positive)")]
    InvalidMass(f32),

    #[error("Unknown layer id: {0}")]
    UnknownLayer(LayerId),

    #[error("Unknown layer: {0}")]
    UnknownLayerName(String),

    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_error_display() {
        let err = PhysicsError::InvalidDimension {
            what: "circle radius",
            value: -1.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid circle radius: -1 (must be finite and positive)"
        );
        assert_eq!(
            PhysicsError::UnknownLayer(LayerId(7)).to_string(),
            "Unknown layer id: 7"
        );
        assert_eq!(
            PhysicsError::DuplicateLayer("Player".to_string()).to_string(),
            "Layer already exists: Player"
        );
    }
}
