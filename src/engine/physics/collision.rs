use glam::Vec2;

use super::owner::OwnerId;
use super::system::ColliderHandle;

/// Outcome of a pairwise shape test
///
/// The normal and contact point are expressed from the perspective of the
/// first collider passed to the test. A non-colliding result has zero depth
/// and a zero normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub colliding: bool,
    pub normal: Vec2,
    pub depth: f32,
    pub contact_point: Vec2,
}

impl CollisionResult {
    /// The non-colliding result
    pub const NONE: CollisionResult = CollisionResult {
        colliding: false,
        normal: Vec2::ZERO,
        depth: 0.0,
        contact_point: Vec2::ZERO,
    };

    pub fn none() -> Self {
        Self::NONE
    }

    /// A colliding result; negative depths are clamped to zero
    pub fn hit(normal: Vec2, depth: f32, contact_point: Vec2) -> Self {
        Self {
            colliding: true,
            normal,
            depth: depth.max(0.0),
            contact_point,
        }
    }

    /// Same contact seen from the other collider
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            ..*self
        }
    }

    /// Minimum translation vector: `normal * depth`
    pub fn mtv(&self) -> Vec2 {
        self.normal * self.depth
    }
}

impl Default for CollisionResult {
    fn default() -> Self {
        Self::NONE
    }
}

/// A colliding pair found during one tick
///
/// Collisions are reported by `CollisionSystem::update` and are not kept by
/// the system afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub owner_a: OwnerId,
    pub owner_b: OwnerId,
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
    pub result: CollisionResult,
    /// Either side was a trigger, so no resolution happened
    pub is_trigger: bool,
}

impl Collision {
    /// Whether `owner` took part in this collision
    pub fn involves(&self, owner: OwnerId) -> bool {
        self.owner_a == owner || self.owner_b == owner
    }

    /// The result oriented from `owner`'s side, if it took part
    pub fn result_for(&self, owner: OwnerId) -> Option<CollisionResult> {
        if owner == self.owner_a {
            Some(self.result)
        } else if owner == self.owner_b {
            Some(self.result.flipped())
        } else {
            None
        }
    }
}
