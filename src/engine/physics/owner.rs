// Capabilities the collision engine needs from the game objects it tracks
//
// The engine never sees how entities are stored. Every registered owner
// provides a position; observing collisions and taking part in resolution
// are optional and discovered through the accessor methods below.

use glam::Vec2;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::collision::CollisionResult;
use super::world::PhysicsSettings;

/// Identity of a game object, as reported by the owner itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(pub u64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Shared handle to a registered owner
pub type OwnerRef = Arc<Mutex<dyn CollisionOwner>>;

/// Position provider: every owner must expose where it currently is.
///
/// Owners living in 3D space report their x/y projection.
pub trait PositionProvider {
    fn position(&self) -> Vec2;
}

/// Optional notifications about contacts involving this owner.
///
/// `other` is the owner on the far side of the contact and `result` is
/// oriented from this owner's perspective.
pub trait CollisionObserver {
    /// A solid contact was detected this tick
    fn on_collision(&mut self, _other: OwnerId, _result: &CollisionResult) {}

    /// One of this owner's trigger colliders overlaps `other`
    fn on_trigger_enter(&mut self, _other: OwnerId, _result: &CollisionResult) {}

    /// A trigger contact from the previous tick has ended.
    /// Only emitted when `CollisionConfig::trigger_exit_events` is enabled.
    fn on_trigger_exit(&mut self, _other: OwnerId) {}
}

/// Optional participation in collision resolution and integration
pub trait PhysicsObject {
    /// Mass in arbitrary units, always > 0
    fn mass(&self) -> f32;

    /// Static objects are never moved by resolution
    fn is_static(&self) -> bool;

    /// Change velocity by `impulse / mass`
    fn apply_impulse(&mut self, impulse: Vec2);

    /// Advance the object by one fixed step
    fn integrate(&mut self, _dt: f32, _settings: &PhysicsSettings) {}
}

/// A game object that can own colliders
pub trait CollisionOwner: PositionProvider + Send {
    fn id(&self) -> OwnerId;

    fn observer(&mut self) -> Option<&mut dyn CollisionObserver> {
        None
    }

    fn physics(&self) -> Option<&dyn PhysicsObject> {
        None
    }

    fn physics_mut(&mut self) -> Option<&mut dyn PhysicsObject> {
        None
    }
}

/// Wrap an owner for registration
pub fn share<T: CollisionOwner + 'static>(owner: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(owner))
}

/// Mass and static flag as seen by the resolver.
///
/// Owners without the physics capability count as immovable unit-mass
/// obstacles: they weigh 1.0 in the split but never receive an impulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MassProfile {
    pub mass: f32,
    pub is_static: bool,
    pub has_physics: bool,
}

impl MassProfile {
    pub const IMMOVABLE: MassProfile = MassProfile {
        mass: 1.0,
        is_static: false,
        has_physics: false,
    };

    pub fn of(owner: &dyn CollisionOwner) -> Self {
        match owner.physics() {
            Some(physics) => Self {
                mass: physics.mass(),
                is_static: physics.is_static(),
                has_physics: true,
            },
            None => Self::IMMOVABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rock;

    impl PositionProvider for Rock {
        fn position(&self) -> Vec2 {
            Vec2::new(3.0, 4.0)
        }
    }

    impl CollisionOwner for Rock {
        fn id(&self) -> OwnerId {
            OwnerId(7)
        }
    }

    struct Ball {
        velocity: Vec2,
    }

    impl PositionProvider for Ball {
        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
    }

    impl PhysicsObject for Ball {
        fn mass(&self) -> f32 {
            2.0
        }

        fn is_static(&self) -> bool {
            false
        }

        fn apply_impulse(&mut self, impulse: Vec2) {
            self.velocity += impulse / self.mass();
        }
    }

    impl CollisionOwner for Ball {
        fn id(&self) -> OwnerId {
            OwnerId(8)
        }

        fn physics(&self) -> Option<&dyn PhysicsObject> {
            Some(self)
        }

        fn physics_mut(&mut self) -> Option<&mut dyn PhysicsObject> {
            Some(self)
        }
    }

    #[test]
    fn test_owner_without_capabilities_is_immovable() {
        let mut rock = Rock;
        assert!(rock.observer().is_none());
        assert!(rock.physics_mut().is_none());
        assert_eq!(MassProfile::of(&rock), MassProfile::IMMOVABLE);
    }

    #[test]
    fn test_physics_capability_is_discovered() {
        let ball = Ball {
            velocity: Vec2::ZERO,
        };
        let profile = MassProfile::of(&ball);
        assert_eq!(profile.mass, 2.0);
        assert!(profile.has_physics);
        assert!(!profile.is_static);
    }

    #[test]
    fn test_shared_owner_coerces_to_owner_ref() {
        let ball = share(Ball {
            velocity: Vec2::ZERO,
        });
        let owner: OwnerRef = ball.clone();
        owner
            .lock()
            .unwrap()
            .physics_mut()
            .unwrap()
            .apply_impulse(Vec2::new(4.0, 0.0));
        assert_eq!(ball.lock().unwrap().velocity, Vec2::new(2.0, 0.0));
        assert_eq!(OwnerId(8).to_string(), "owner#8");
    }
}
