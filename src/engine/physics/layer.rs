use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use super::PhysicsError;

/// Identifier of a collision layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LayerId(pub u32);

impl LayerId {
    /// The layer every collider starts on
    pub const DEFAULT: LayerId = LayerId(0);
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named group of colliders and the layers it may interact with
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionLayer {
    name: String,
    id: LayerId,
    collides_with: BTreeSet<LayerId>,
}

impl CollisionLayer {
    fn new(name: &str, id: LayerId) -> Self {
        Self {
            name: name.to_string(),
            id,
            collides_with: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn can_collide_with(&self, other: LayerId) -> bool {
        self.collides_with.contains(&other)
    }

    /// Layers this one interacts with, in id order
    pub fn collides_with(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.collides_with.iter().copied()
    }
}

/// Symmetric matrix of which layers may interact
///
/// Both sides of the relation are always updated together, so
/// `can_collide(a, b) == can_collide(b, a)` for every pair of ids.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    layers: BTreeMap<LayerId, CollisionLayer>,
    by_name: HashMap<String, LayerId>,
    next_id: u32,
}

impl LayerRegistry {
    /// Registry holding only the `Default` layer, which collides with itself
    pub fn new() -> Self {
        let mut registry = Self {
            layers: BTreeMap::new(),
            by_name: HashMap::new(),
            next_id: 0,
        };
        registry.insert_layer("Default");
        registry.link(LayerId::DEFAULT, LayerId::DEFAULT, true);
        registry
    }

    /// Registry preloaded with the arena layers and their interaction matrix
    pub fn with_default_layers() -> Self {
        let mut registry = Self::new();
        let default = LayerId::DEFAULT;
        let player = registry.insert_layer(names::PLAYER);
        let projectile = registry.insert_layer(names::PROJECTILE);
        let platform = registry.insert_layer(names::PLATFORM);
        let hazard = registry.insert_layer(names::HAZARD);
        let pickup = registry.insert_layer(names::PICKUP);
        let ability = registry.insert_layer(names::ABILITY_EFFECT);
        let sensor = registry.insert_layer(names::SENSOR);

        let all: Vec<LayerId> = registry.layers.keys().copied().collect();

        // Default and sensor zones see everything
        for &id in &all {
            registry.link(default, id, true);
            registry.link(sensor, id, true);
        }

        // Players do not block each other
        for other in [platform, hazard, pickup, ability] {
            registry.link(player, other, true);
        }
        for other in [player, platform, projectile] {
            registry.link(projectile, other, true);
        }
        registry.link(platform, platform, true);
        registry.link(platform, hazard, true);
        registry.link(ability, projectile, true);

        registry
    }

    /// Add a new layer. It collides with nothing until configured.
    pub fn add_layer(&mut self, name: &str) -> Result<LayerId, PhysicsError> {
        if self.by_name.contains_key(name) {
            return Err(PhysicsError::DuplicateLayer(name.to_string()));
        }
        Ok(self.insert_layer(name))
    }

    pub fn get(&self, id: LayerId) -> Option<&CollisionLayer> {
        self.layers.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&CollisionLayer> {
        self.by_name.get(name).and_then(|id| self.layers.get(id))
    }

    pub fn id_of(&self, name: &str) -> Option<LayerId> {
        self.by_name.get(name).copied()
    }

    /// Allow or forbid interaction between two layers (in both directions)
    pub fn set_layer_collision(
        &mut self,
        a: LayerId,
        b: LayerId,
        enabled: bool,
    ) -> Result<(), PhysicsError> {
        for id in [a, b] {
            if !self.layers.contains_key(&id) {
                return Err(PhysicsError::UnknownLayer(id));
            }
        }
        self.link(a, b, enabled);
        log::debug!(
            "Layer collision {:?} <-> {:?} {}",
            a,
            b,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// Name-based variant of [`set_layer_collision`](Self::set_layer_collision)
    pub fn set_layer_collision_by_name(
        &mut self,
        a: &str,
        b: &str,
        enabled: bool,
    ) -> Result<(), PhysicsError> {
        let a = self
            .id_of(a)
            .ok_or_else(|| PhysicsError::UnknownLayerName(a.to_string()))?;
        let b = self
            .id_of(b)
            .ok_or_else(|| PhysicsError::UnknownLayerName(b.to_string()))?;
        self.set_layer_collision(a, b, enabled)
    }

    /// Whether colliders on `a` and `b` may interact. Unknown ids never do.
    pub fn can_collide(&self, a: LayerId, b: LayerId) -> bool {
        match (self.layers.get(&a), self.layers.contains_key(&b)) {
            (Some(layer), true) => layer.can_collide_with(b),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionLayer> {
        self.layers.values()
    }

    fn insert_layer(&mut self, name: &str) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, CollisionLayer::new(name, id));
        self.by_name.insert(name.to_string(), id);
        id
    }

    // Callers guarantee both ids exist
    fn link(&mut self, a: LayerId, b: LayerId, enabled: bool) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(layer) = self.layers.get_mut(&from) {
                if enabled {
                    layer.collides_with.insert(to);
                } else {
                    layer.collides_with.remove(&to);
                }
            }
        }
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Names of the layers created by [`LayerRegistry::with_default_layers`]
pub mod names {
    pub const DEFAULT: &str = "Default";
    pub const PLAYER: &str = "Player";
    pub const PROJECTILE: &str = "Projectile";
    pub const PLATFORM: &str = "Platform";
    pub const HAZARD: &str = "Hazard";
    pub const PICKUP: &str = "Pickup";
    pub const ABILITY_EFFECT: &str = "AbilityEffect";
    pub const SENSOR: &str = "Sensor";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_symmetric(registry: &LayerRegistry) {
        for a in registry.iter() {
            for b in registry.iter() {
                assert_eq!(
                    registry.can_collide(a.id(), b.id()),
                    registry.can_collide(b.id(), a.id()),
                    "{} / {} must be symmetric",
                    a.name(),
                    b.name()
                );
            }
        }
    }

    #[test]
    fn test_default_layer_collides_with_itself() {
        let registry = LayerRegistry::new();
        assert!(registry.can_collide(LayerId::DEFAULT, LayerId::DEFAULT));
        assert_eq!(registry.by_name(names::DEFAULT).unwrap().id(), LayerId::DEFAULT);
    }

    #[test]
    fn test_set_layer_collision_is_symmetric() {
        let mut registry = LayerRegistry::new();
        let walls = registry.add_layer("Walls").unwrap();
        let bats = registry.add_layer("Bats").unwrap();
        assert!(!registry.can_collide(walls, bats));

        registry.set_layer_collision(walls, bats, true).unwrap();
        assert!(registry.can_collide(walls, bats));
        assert!(registry.can_collide(bats, walls));
        assert!(registry.get(bats).unwrap().can_collide_with(walls));

        registry.set_layer_collision(bats, walls, false).unwrap();
        assert!(!registry.can_collide(walls, bats));
        assert!(!registry.can_collide(bats, walls));
    }

    #[test]
    fn test_unknown_layers_never_collide() {
        let mut registry = LayerRegistry::new();
        let ghost = LayerId(99);
        assert!(!registry.can_collide(ghost, LayerId::DEFAULT));
        assert!(!registry.can_collide(LayerId::DEFAULT, ghost));
        assert_eq!(
            registry.set_layer_collision(LayerId::DEFAULT, ghost, true),
            Err(PhysicsError::UnknownLayer(ghost))
        );
        assert_symmetric(&registry);
    }

    #[test]
    fn test_duplicate_layer_name_is_rejected() {
        let mut registry = LayerRegistry::new();
        registry.add_layer("Water").unwrap();
        assert_eq!(
            registry.add_layer("Water"),
            Err(PhysicsError::DuplicateLayer("Water".to_string()))
        );
    }

    #[test]
    fn test_lookup_by_name() {
        let mut registry = LayerRegistry::new();
        let water = registry.add_layer("Water").unwrap();
        registry
            .set_layer_collision_by_name("Water", names::DEFAULT, true)
            .unwrap();
        assert_eq!(registry.id_of("Water"), Some(water));
        assert!(registry.can_collide(water, LayerId::DEFAULT));
        assert!(registry
            .set_layer_collision_by_name("Lava", names::DEFAULT, true)
            .is_err());
    }

    #[test]
    fn test_arena_matrix() {
        let registry = LayerRegistry::with_default_layers();
        let id = |name| registry.id_of(name).unwrap();

        assert_eq!(registry.len(), 8);
        assert!(!registry.can_collide(id(names::PLAYER), id(names::PLAYER)));
        assert!(registry.can_collide(id(names::PROJECTILE), id(names::PLAYER)));
        assert!(!registry.can_collide(id(names::HAZARD), id(names::PICKUP)));
        assert!(registry.can_collide(id(names::SENSOR), id(names::PICKUP)));
        assert_symmetric(&registry);
    }
}
