use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec2;
use log::info;

use rusted_collision::engine::physics::body::presets;
use rusted_collision::engine::physics::layer::names;
use rusted_collision::engine::physics::owner::share;
use rusted_collision::{
    ColliderBuilder, CollisionConfig, CollisionObserver, CollisionOwner, CollisionResult,
    LayerRegistry, OwnerId, PhysicsComponent, PhysicsObject, PhysicsSettings, PhysicsWorld,
    PositionProvider,
};

const TILE: f32 = 32.0;
const FRAMES: u32 = 90;

/// Demo game object with an optional body
struct Entity {
    id: OwnerId,
    name: &'static str,
    position: Vec2,
    body: Option<PhysicsComponent>,
}

impl Entity {
    fn new(id: u64, name: &'static str, position: Vec2, body: Option<PhysicsComponent>) -> Self {
        Self {
            id: OwnerId(id),
            name,
            position,
            body,
        }
    }
}

impl PositionProvider for Entity {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl CollisionObserver for Entity {
    fn on_collision(&mut self, other: OwnerId, result: &CollisionResult) {
        log::debug!(
            "{} hit {} (depth {:.2}, normal {:?})",
            self.name,
            other,
            result.depth,
            result.normal
        );
    }

    fn on_trigger_enter(&mut self, other: OwnerId, _result: &CollisionResult) {
        info!("{} touched by {}", self.name, other);
    }

    fn on_trigger_exit(&mut self, other: OwnerId) {
        info!("{} left by {}", self.name, other);
    }
}

impl PhysicsObject for Entity {
    fn mass(&self) -> f32 {
        self.body.as_ref().map_or(1.0, |b| b.mass())
    }

    fn is_static(&self) -> bool {
        self.body.as_ref().map_or(true, |b| b.is_static())
    }

    fn apply_impulse(&mut self, impulse: Vec2) {
        if let Some(body) = self.body.as_mut() {
            body.apply_impulse(impulse);
        }
    }

    fn integrate(&mut self, dt: f32, settings: &PhysicsSettings) {
        if let Some(body) = self.body.as_mut() {
            body.integrate(&mut self.position, dt, settings);
        }
    }
}

impl CollisionOwner for Entity {
    fn id(&self) -> OwnerId {
        self.id
    }

    fn observer(&mut self) -> Option<&mut dyn CollisionObserver> {
        Some(self)
    }

    fn physics(&self) -> Option<&dyn PhysicsObject> {
        self.body.as_ref().map(|_| self as &dyn PhysicsObject)
    }

    fn physics_mut(&mut self) -> Option<&mut dyn PhysicsObject> {
        if self.body.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting collision demo...");

    let layers = LayerRegistry::with_default_layers();
    let player_layer = layers
        .id_of(names::PLAYER)
        .context("missing player layer")?;
    let platform_layer = layers
        .id_of(names::PLATFORM)
        .context("missing platform layer")?;
    let pickup_layer = layers
        .id_of(names::PICKUP)
        .context("missing pickup layer")?;

    let settings = PhysicsSettings {
        gravity: 600.0,
        ..PhysicsSettings::default()
    };
    let config = CollisionConfig::default()
        .with_response_strength(0.8)
        .with_trigger_exit_events(true);
    let mut world = PhysicsWorld::with_settings(settings, layers, config);

    // Player drops onto a floor, passing a coin on the way
    let mut player_body = presets::player_body()?;
    player_body.set_use_gravity(true);
    let player = share(Entity::new(
        1,
        "player",
        Vec2::new(TILE * 2.0, 0.0),
        Some(player_body),
    ));
    let floor = share(Entity::new(
        2,
        "floor",
        Vec2::new(0.0, TILE * 6.0),
        Some(presets::wall_body()?),
    ));
    let coin = share(Entity::new(3, "coin", Vec2::new(TILE * 2.0, TILE * 3.0), None));

    let collisions = world.collisions_mut();
    collisions.register(player.clone(), presets::player_collider(TILE, player_layer)?);
    for tile in 0..5 {
        let collider = ColliderBuilder::box_shape(TILE, TILE)
            .offset(tile as f32 * TILE, 0.0)
            .layer(platform_layer)
            .build()?;
        collisions.register(floor.clone(), collider);
    }
    collisions.register(coin.clone(), presets::pickup_sensor(TILE, pickup_layer)?);
    info!("Registered {} colliders", world.collisions().len());

    let frame = Duration::from_secs_f32(1.0 / 60.0);
    let mut contacts = 0;
    for _ in 0..FRAMES {
        let hits = world.advance(frame);
        contacts += hits.iter().filter(|c| !c.is_trigger).count();
    }

    let resting = player
        .lock()
        .map_err(|_| anyhow::anyhow!("player lock poisoned"))?
        .position;
    info!(
        "Done after {} frames: {} solid contacts, player at ({:.1}, {:.1})",
        FRAMES, contacts, resting.x, resting.y
    );

    Ok(())
}
