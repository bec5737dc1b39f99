use glam::Vec2;

use super::collider::{Collider, ColliderBuilder};
use super::layer::LayerId;
use super::owner::PhysicsObject;
use super::world::PhysicsSettings;
use super::PhysicsError;
use crate::core::math::is_positive_finite;

/// Simple point-mass integrator owned by a game object
///
/// Forces accumulate during the tick and are cleared after `integrate`.
/// Damping is applied as `velocity *= 1 - friction * dt`; when
/// `friction * dt > 1` this flips the velocity's sign.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsComponent {
    mass: f32,
    is_static: bool,
    velocity: Vec2,
    force: Vec2,
    friction: f32,
    gravity_scale: f32,
    use_gravity: bool,
}

impl PhysicsComponent {
    /// Dynamic component with the given mass (must be finite and > 0)
    pub fn new(mass: f32) -> Result<Self, PhysicsError> {
        BodyBuilder::new_dynamic().mass(mass).build()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Force accumulated so far this tick
    pub fn force(&self) -> Vec2 {
        self.force
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    pub fn uses_gravity(&self) -> bool {
        self.use_gravity
    }

    pub fn set_use_gravity(&mut self, use_gravity: bool) {
        self.use_gravity = use_gravity;
    }

    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
        if is_static {
            self.velocity = Vec2::ZERO;
            self.force = Vec2::ZERO;
        }
    }

    /// Advance `position` by one step of `dt` seconds
    pub fn integrate(&mut self, position: &mut Vec2, dt: f32, settings: &PhysicsSettings) {
        if self.is_static {
            self.force = Vec2::ZERO;
            return;
        }

        if self.use_gravity {
            self.force.y += settings.gravity * self.gravity_scale * self.mass;
        }

        let acceleration = self.force / self.mass;
        self.velocity += acceleration * dt;
        self.velocity *= 1.0 - self.friction * dt;
        *position += self.velocity * dt;

        self.force = Vec2::ZERO;
    }
}

impl PhysicsObject for PhysicsComponent {
    fn mass(&self) -> f32 {
        self.mass
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn apply_impulse(&mut self, impulse: Vec2) {
        if self.is_static {
            return;
        }
        self.velocity += impulse / self.mass;
    }
}

/// Builder for physics components with common configurations
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    mass: f32,
    is_static: bool,
    velocity: Vec2,
    friction: f32,
    gravity_scale: f32,
    use_gravity: bool,
}

impl BodyBuilder {
    /// Create a new dynamic body (moved by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self {
            mass: 1.0,
            is_static: false,
            velocity: Vec2::ZERO,
            friction: 0.0,
            gravity_scale: 1.0,
            use_gravity: false,
        }
    }

    /// Create a new static body (never moves)
    pub fn new_static() -> Self {
        Self {
            is_static: true,
            gravity_scale: 0.0,
            ..Self::new_dynamic()
        }
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set the initial velocity
    pub fn velocity(mut self, x: f32, y: f32) -> Self {
        self.velocity = Vec2::new(x, y);
        self
    }

    /// Linear damping per second
    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the gravity scale (1.0 = normal gravity, 0.0 = no gravity)
    pub fn gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Enable gravity (off by default for top-down play)
    pub fn use_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    /// Validate and build the component
    pub fn build(self) -> Result<PhysicsComponent, PhysicsError> {
        if !is_positive_finite(self.mass) {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(PhysicsError::InvalidDimension {
                what: "friction",
                value: self.friction,
            });
        }

        Ok(PhysicsComponent {
            mass: self.mass,
            is_static: self.is_static,
            velocity: if self.is_static {
                Vec2::ZERO
            } else {
                self.velocity
            },
            force: Vec2::ZERO,
            friction: self.friction,
            gravity_scale: self.gravity_scale,
            use_gravity: self.use_gravity,
        })
    }
}

/// Common body and collider configurations for game objects
pub mod presets {
    use super::*;

    /// Player body: dynamic, light damping so movement settles
    pub fn player_body() -> Result<PhysicsComponent, PhysicsError> {
        BodyBuilder::new_dynamic().mass(1.0).friction(8.0).build()
    }

    /// Player collider: a circle centered on the sprite's middle
    pub fn player_collider(size: f32, layer: LayerId) -> Result<Collider, PhysicsError> {
        ColliderBuilder::circle(size / 2.0)
            .offset(size / 2.0, size / 2.0)
            .layer(layer)
            .build()
    }

    /// Wall tile body (static)
    pub fn wall_body() -> Result<PhysicsComponent, PhysicsError> {
        BodyBuilder::new_static().mass(1000.0).build()
    }

    /// Wall tile collider covering one tile
    pub fn wall_collider(tile_size: f32, layer: LayerId) -> Result<Collider, PhysicsError> {
        ColliderBuilder::box_shape(tile_size, tile_size)
            .layer(layer)
            .build()
    }

    /// Projectile body: light and undamped
    pub fn projectile_body(vel_x: f32, vel_y: f32) -> Result<PhysicsComponent, PhysicsError> {
        BodyBuilder::new_dynamic()
            .mass(0.1)
            .velocity(vel_x, vel_y)
            .build()
    }

    /// Projectile collider (circle)
    pub fn projectile_collider(radius: f32, layer: LayerId) -> Result<Collider, PhysicsError> {
        ColliderBuilder::circle(radius).layer(layer).build()
    }

    /// Pickup zone: detects overlap but never blocks
    pub fn pickup_sensor(size: f32, layer: LayerId) -> Result<Collider, PhysicsError> {
        ColliderBuilder::box_shape(size, size)
            .layer(layer)
            .trigger(true)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn settings() -> PhysicsSettings {
        PhysicsSettings {
            gravity: 10.0,
            ..PhysicsSettings::default()
        }
    }

    #[test]
    fn test_body_builder_dynamic() {
        let body = BodyBuilder::new_dynamic()
            .mass(2.0)
            .velocity(5.0, 0.0)
            .build()
            .unwrap();

        assert_eq!(body.mass(), 2.0);
        assert!(!body.is_static());
        assert_eq!(body.velocity(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_invalid_mass_is_rejected() {
        assert_eq!(PhysicsComponent::new(0.0), Err(PhysicsError::InvalidMass(0.0)));
        assert!(PhysicsComponent::new(-1.0).is_err());
        assert!(PhysicsComponent::new(f32::NAN).is_err());
        assert!(BodyBuilder::new_dynamic().friction(-1.0).build().is_err());
    }

    #[test]
    fn test_force_integration_clears_accumulator() {
        let mut body = PhysicsComponent::new(2.0).unwrap();
        let mut position = Vec2::ZERO;
        body.add_force(Vec2::new(4.0, 0.0));

        body.integrate(&mut position, 0.5, &settings());

        // a = 2, v = 1, x = 0.5
        assert_relative_eq!(body.velocity().x, 1.0);
        assert_relative_eq!(position.x, 0.5);
        assert_eq!(body.force(), Vec2::ZERO);
    }

    #[test]
    fn test_gravity_scales_with_mass() {
        let mut body = BodyBuilder::new_dynamic()
            .mass(3.0)
            .gravity_scale(0.5)
            .use_gravity(true)
            .build()
            .unwrap();
        let mut position = Vec2::ZERO;

        body.integrate(&mut position, 1.0, &settings());

        // force = 10 * 0.5 * 3 = 15, a = 5
        assert_relative_eq!(body.velocity().y, 5.0);
        assert_relative_eq!(position.y, 5.0);
    }

    #[test]
    fn test_friction_damps_velocity() {
        let mut body = BodyBuilder::new_dynamic()
            .friction(0.5)
            .velocity(10.0, 0.0)
            .build()
            .unwrap();
        let mut position = Vec2::ZERO;

        body.integrate(&mut position, 1.0, &settings());
        assert_relative_eq!(body.velocity().x, 5.0);
        assert_relative_eq!(position.x, 5.0);
    }

    #[test]
    fn test_large_friction_step_inverts_velocity() {
        let mut body = BodyBuilder::new_dynamic()
            .friction(3.0)
            .velocity(1.0, 0.0)
            .build()
            .unwrap();
        let mut position = Vec2::ZERO;

        body.integrate(&mut position, 1.0, &settings());
        assert_relative_eq!(body.velocity().x, -2.0);
    }

    #[test]
    fn test_impulse_divides_by_mass() {
        let mut body = PhysicsComponent::new(4.0).unwrap();
        body.apply_impulse(Vec2::new(8.0, -4.0));
        assert_eq!(body.velocity(), Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_static_body_ignores_impulse_and_integration() {
        let mut body = BodyBuilder::new_static().use_gravity(true).build().unwrap();
        let mut position = Vec2::new(1.0, 1.0);
        body.add_force(Vec2::new(100.0, 0.0));
        body.apply_impulse(Vec2::new(5.0, 5.0));
        body.integrate(&mut position, 1.0, &settings());

        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(position, Vec2::new(1.0, 1.0));
        assert_eq!(body.force(), Vec2::ZERO);
    }

    #[test]
    fn test_presets() {
        let player = presets::player_collider(2.0, LayerId(1)).unwrap();
        assert_eq!(player.offset(), Vec2::new(1.0, 1.0));
        assert_eq!(player.layer(), LayerId(1));

        let pickup = presets::pickup_sensor(1.0, LayerId::DEFAULT).unwrap();
        assert!(pickup.is_trigger());

        assert!(presets::wall_body().unwrap().is_static());
        assert_eq!(presets::projectile_body(3.0, 0.0).unwrap().velocity().x, 3.0);
        assert!(presets::player_body().is_ok());
        assert!(presets::wall_collider(16.0, LayerId::DEFAULT).is_ok());
        assert!(presets::projectile_collider(0.25, LayerId::DEFAULT).is_ok());
    }
}
