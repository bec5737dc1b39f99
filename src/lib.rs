//! 2D collision engine for games
//!
//! Register colliders for your game objects, tick a [`CollisionSystem`] (or
//! a [`PhysicsWorld`] for fixed-rate stepping with body integration) and
//! receive contact notifications.

pub mod core;
pub mod engine;

pub use engine::game_loop::{FixedTimestep, FIXED_TIMESTEP, MAX_PHYSICS_STEPS};
pub use engine::physics::{
    BodyBuilder, Bounds, Collider, ColliderBuilder, ColliderHandle, Collision, CollisionConfig,
    CollisionObserver, CollisionOwner, CollisionResult, CollisionSystem, LayerId, LayerRegistry,
    OwnerId, OwnerRef, PhysicsComponent, PhysicsError, PhysicsObject, PhysicsSettings,
    PhysicsWorld, PositionProvider, ShapeKind,
};
