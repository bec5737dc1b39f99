use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use super::collider::{Collider, ShapeKind};
use super::collision::{Collision, CollisionResult};
use super::debug::DebugLines;
use super::handler::HandlerRegistry;
use super::layer::LayerRegistry;
use super::owner::{CollisionObserver, CollisionOwner, MassProfile, OwnerId, OwnerRef};
use crate::core::math::{clamp_unit, is_positive_finite};

/// Handle returned when a collider is registered
///
/// Handles are handed out in increasing order and never reused, which makes
/// pair enumeration order stable from tick to tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderHandle(pub u64);

impl fmt::Display for ColliderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collider#{}", self.0)
    }
}

/// Collision system settings
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionConfig {
    /// Fraction of the penetration corrected per tick, in [0, 1]
    response_strength: f32,
    /// Reserved for a swept solver; not read by the resolver
    continuous_detection: bool,
    /// Reserved for an iterative solver; not read by the resolver
    max_iterations: u32,
    /// Rebuild debug line geometry after every tick
    debug_draw: bool,
    /// Track trigger contacts across ticks and report when they end
    trigger_exit_events: bool,
}

/// Settings used by [`CollisionSystem::new`]
pub const BASE_CONFIG: CollisionConfig = CollisionConfig {
    response_strength: 1.0,
    continuous_detection: false,
    max_iterations: 1,
    debug_draw: false,
    trigger_exit_events: false,
};

impl Default for CollisionConfig {
    fn default() -> Self {
        BASE_CONFIG
    }
}

impl CollisionConfig {
    pub fn response_strength(&self) -> f32 {
        self.response_strength
    }

    /// Clamped into [0, 1]; NaN becomes 0
    pub fn set_response_strength(&mut self, strength: f32) {
        let clamped = clamp_unit(strength);
        if clamped != strength {
            log::warn!(
                "Response strength {} out of range, clamped to {}",
                strength,
                clamped
            );
        }
        self.response_strength = clamped;
    }

    pub fn with_response_strength(mut self, strength: f32) -> Self {
        self.set_response_strength(strength);
        self
    }

    pub fn continuous_detection(&self) -> bool {
        self.continuous_detection
    }

    pub fn with_continuous_detection(mut self, enabled: bool) -> Self {
        self.continuous_detection = enabled;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations.max(1);
        self
    }

    pub fn debug_draw(&self) -> bool {
        self.debug_draw
    }

    pub fn with_debug_draw(mut self, enabled: bool) -> Self {
        self.debug_draw = enabled;
        self
    }

    pub fn trigger_exit_events(&self) -> bool {
        self.trigger_exit_events
    }

    pub fn with_trigger_exit_events(mut self, enabled: bool) -> Self {
        self.trigger_exit_events = enabled;
        self
    }
}

struct Registration {
    owner: Weak<Mutex<dyn CollisionOwner>>,
    owner_id: OwnerId,
    collider: Collider,
}

/// Trigger overlap remembered for exit events
struct TriggerContact {
    owner_a: Weak<Mutex<dyn CollisionOwner>>,
    owner_b: Weak<Mutex<dyn CollisionOwner>>,
    id_a: OwnerId,
    id_b: OwnerId,
    a_is_trigger: bool,
    b_is_trigger: bool,
}

/// Collision detection and resolution for every registered collider
///
/// Each call to [`update`](Self::update) runs, in order: position refresh,
/// broad phase (active flag and layer matrix, every pair), narrow phase
/// (handler dispatch), trigger classification, resolution and notification.
pub struct CollisionSystem {
    config: CollisionConfig,
    layers: LayerRegistry,
    handlers: HandlerRegistry,
    registrations: BTreeMap<ColliderHandle, Registration>,
    next_handle: u64,
    trigger_contacts: BTreeMap<(ColliderHandle, ColliderHandle), TriggerContact>,
    debug_lines: Option<DebugLines>,
}

impl CollisionSystem {
    /// Create a system with the default layer and settings
    pub fn new() -> Self {
        Self::with_config(LayerRegistry::new(), BASE_CONFIG)
    }

    pub fn with_config(layers: LayerRegistry, config: CollisionConfig) -> Self {
        let debug_lines = config.debug_draw.then(DebugLines::new);
        Self {
            config,
            layers,
            handlers: HandlerRegistry::new(),
            registrations: BTreeMap::new(),
            next_handle: 0,
            trigger_contacts: BTreeMap::new(),
            debug_lines,
        }
    }

    /// Attach a collider to an owner. The collider is placed at the owner's
    /// current position right away.
    pub fn register(&mut self, owner: OwnerRef, mut collider: Collider) -> ColliderHandle {
        let owner_id = match owner.lock() {
            Ok(guard) => {
                collider.update_position(&*guard);
                guard.id()
            }
            Err(poisoned) => {
                let owner_id = poisoned.into_inner().id();
                log::warn!("{} is poisoned, placing its collider at the origin", owner_id);
                collider.place_at(Vec2::ZERO);
                owner_id
            }
        };

        let handle = ColliderHandle(self.next_handle);
        self.next_handle += 1;

        log::debug!(
            "Registered {} ({:?}) for {}",
            handle,
            collider.kind(),
            owner_id
        );

        self.registrations.insert(
            handle,
            Registration {
                owner: Arc::downgrade(&owner),
                owner_id,
                collider,
            },
        );
        handle
    }

    /// Detach a collider; it takes no part in the next tick
    pub fn unregister(&mut self, handle: ColliderHandle) -> Option<Collider> {
        let removed = self.registrations.remove(&handle)?;
        log::debug!("Unregistered {} of {}", handle, removed.owner_id);
        Some(removed.collider)
    }

    /// Detach every collider belonging to `owner`, returning how many were removed
    pub fn unregister_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|_, r| r.owner_id != owner);
        let removed = before - self.registrations.len();
        if removed > 0 {
            log::debug!("Unregistered {} collider(s) of {}", removed, owner);
        }
        removed
    }

    /// Remove everything, keeping layers, handlers and settings
    pub fn clear(&mut self) {
        self.registrations.clear();
        self.trigger_contacts.clear();
        if let Some(lines) = self.debug_lines.as_mut() {
            lines.clear();
        }
    }

    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.registrations.contains_key(&handle)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.registrations.get(&handle).map(|r| &r.collider)
    }

    /// Mutable access, e.g. to toggle `active` or `trigger`
    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.registrations.get_mut(&handle).map(|r| &mut r.collider)
    }

    pub fn owner_of(&self, handle: ColliderHandle) -> Option<OwnerId> {
        self.registrations.get(&handle).map(|r| r.owner_id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerRegistry {
        &mut self.layers
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Register a custom test for an ordered pair of shape kinds
    pub fn register_handler<F>(&mut self, first: ShapeKind, second: ShapeKind, handler: F)
    where
        F: Fn(&Collider, &Collider) -> CollisionResult + Send + Sync + 'static,
    {
        self.handlers.register(first, second, handler);
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn set_response_strength(&mut self, strength: f32) {
        self.config.set_response_strength(strength);
    }

    /// Enable or disable debug line generation
    pub fn set_debug_enabled(&mut self, enabled: bool) {
        self.config.debug_draw = enabled;
        if enabled {
            self.debug_lines.get_or_insert_with(DebugLines::new);
        } else {
            self.debug_lines = None;
        }
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.config.debug_draw
    }

    /// Debug geometry from the last tick, when enabled
    pub fn debug_lines(&self) -> Option<&DebugLines> {
        self.debug_lines.as_ref()
    }

    pub fn set_trigger_exit_events(&mut self, enabled: bool) {
        self.config.trigger_exit_events = enabled;
        if !enabled {
            self.trigger_contacts.clear();
        }
    }

    /// Run one collision tick and report every colliding pair
    pub fn update(&mut self) -> Vec<Collision> {
        let owners = self.refresh();
        let candidates = self.broad_phase();

        let strength = self.config.response_strength;
        let mut collisions = Vec::new();
        let mut touching_triggers = BTreeMap::new();

        for (handle_a, handle_b) in candidates {
            let (Some(reg_a), Some(reg_b)) = (
                self.registrations.get(&handle_a),
                self.registrations.get(&handle_b),
            ) else {
                continue;
            };
            let (Some(owner_a), Some(owner_b)) = (owners.get(&handle_a), owners.get(&handle_b))
            else {
                continue;
            };

            let contact = self.handlers.contact(&reg_a.collider, &reg_b.collider);
            let result = contact.result;
            if !result.colliding {
                continue;
            }

            let a_is_trigger = reg_a.collider.is_trigger();
            let b_is_trigger = reg_b.collider.is_trigger();
            let is_trigger = a_is_trigger || b_is_trigger;

            log::trace!(
                "{} x {}: depth {} normal {:?}{}",
                handle_a,
                handle_b,
                result.depth,
                result.normal,
                if is_trigger { " (trigger)" } else { "" }
            );

            if is_trigger {
                if a_is_trigger {
                    notify(owner_a, |o| o.on_trigger_enter(reg_b.owner_id, &result));
                }
                if b_is_trigger {
                    notify(owner_b, |o| {
                        o.on_trigger_enter(reg_a.owner_id, &result.flipped())
                    });
                }
                touching_triggers.insert(
                    (handle_a, handle_b),
                    TriggerContact {
                        owner_a: reg_a.owner.clone(),
                        owner_b: reg_b.owner.clone(),
                        id_a: reg_a.owner_id,
                        id_b: reg_b.owner_id,
                        a_is_trigger,
                        b_is_trigger,
                    },
                );
            } else {
                if strength > 0.0 && result.depth > 0.0 {
                    resolve(owner_a, owner_b, &result, strength, contact.toward_b());
                }
                notify(owner_a, |o| o.on_collision(reg_b.owner_id, &result));
                notify(owner_b, |o| o.on_collision(reg_a.owner_id, &result.flipped()));
            }

            collisions.push(Collision {
                owner_a: reg_a.owner_id,
                owner_b: reg_b.owner_id,
                collider_a: handle_a,
                collider_b: handle_b,
                result,
                is_trigger,
            });
        }

        if self.config.trigger_exit_events {
            self.emit_trigger_exits(touching_triggers);
        }

        if self.debug_lines.is_some() {
            self.rebuild_debug_lines(&collisions);
        }

        collisions
    }

    /// Live owners, one entry per owner in registration order
    pub(crate) fn live_owners(&self) -> Vec<OwnerRef> {
        let mut seen = BTreeSet::new();
        self.registrations
            .values()
            .filter(|r| seen.insert(r.owner_id))
            .filter_map(|r| r.owner.upgrade())
            .collect()
    }

    /// Pull owner positions into their colliders, dropping registrations
    /// whose owner no longer exists
    fn refresh(&mut self) -> BTreeMap<ColliderHandle, OwnerRef> {
        let mut live = BTreeMap::new();
        let mut dead = Vec::new();

        for (&handle, registration) in self.registrations.iter_mut() {
            let Some(owner) = registration.owner.upgrade() else {
                dead.push(handle);
                continue;
            };

            match owner.lock() {
                Ok(guard) => registration.collider.update_position(&*guard),
                Err(_) => {
                    log::warn!(
                        "{} is poisoned, placing {} at the origin",
                        registration.owner_id,
                        handle
                    );
                    registration.collider.place_at(Vec2::ZERO);
                }
            }
            live.insert(handle, owner);
        }

        for handle in dead {
            if let Some(registration) = self.registrations.remove(&handle) {
                log::debug!(
                    "Pruned {} of dropped {}",
                    handle,
                    registration.owner_id
                );
            }
        }

        live
    }

    /// Every unordered pair of active colliders on different owners whose
    /// layers may interact, in handle order
    fn broad_phase(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        let active: Vec<(ColliderHandle, &Registration)> = self
            .registrations
            .iter()
            .filter(|(_, r)| r.collider.is_active())
            .map(|(&h, r)| (h, r))
            .collect();

        let mut pairs = Vec::new();
        for (i, (handle_a, a)) in active.iter().enumerate() {
            for (handle_b, b) in active.iter().skip(i + 1) {
                if a.owner_id == b.owner_id {
                    continue;
                }
                if !self
                    .layers
                    .can_collide(a.collider.layer(), b.collider.layer())
                {
                    continue;
                }
                pairs.push((*handle_a, *handle_b));
            }
        }
        pairs
    }

    fn emit_trigger_exits(
        &mut self,
        touching: BTreeMap<(ColliderHandle, ColliderHandle), TriggerContact>,
    ) {
        let previous = std::mem::replace(&mut self.trigger_contacts, touching);
        for (key, contact) in previous {
            if self.trigger_contacts.contains_key(&key) {
                continue;
            }
            if contact.a_is_trigger {
                if let Some(owner) = contact.owner_a.upgrade() {
                    notify(&owner, |o| o.on_trigger_exit(contact.id_b));
                }
            }
            if contact.b_is_trigger {
                if let Some(owner) = contact.owner_b.upgrade() {
                    notify(&owner, |o| o.on_trigger_exit(contact.id_a));
                }
            }
        }
    }

    fn rebuild_debug_lines(&mut self, collisions: &[Collision]) {
        let colliding: BTreeSet<ColliderHandle> = collisions
            .iter()
            .flat_map(|c| [c.collider_a, c.collider_b])
            .collect();

        if let Some(lines) = self.debug_lines.as_mut() {
            lines.clear();
            for (handle, registration) in &self.registrations {
                lines.add_collider(&registration.collider, colliding.contains(handle));
            }
        }
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollisionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionSystem")
            .field("config", &self.config)
            .field("colliders", &self.registrations.len())
            .field("layers", &self.layers.len())
            .field("handlers", &self.handlers)
            .finish()
    }
}

/// Call the owner's observer, if it has one
fn notify(owner: &OwnerRef, f: impl FnOnce(&mut dyn CollisionObserver)) {
    if let Ok(mut guard) = owner.lock() {
        if let Some(observer) = guard.observer() {
            f(observer);
        }
    }
}

fn mass_profile(owner: &OwnerRef) -> MassProfile {
    let profile = match owner.lock() {
        Ok(guard) => MassProfile::of(&*guard),
        Err(_) => MassProfile::IMMOVABLE,
    };
    if is_positive_finite(profile.mass) {
        profile
    } else {
        MassProfile {
            mass: 1.0,
            ..profile
        }
    }
}

/// Push two owners apart along the contact normal
///
/// The MTV is split by inverse mass; a static owner takes no share. The
/// direction is chosen so that B moves away from A along `toward_b`, the
/// vector between the parts that touched, so handlers may report the normal
/// either way round.
fn resolve(
    owner_a: &OwnerRef,
    owner_b: &OwnerRef,
    result: &CollisionResult,
    strength: f32,
    toward_b: Vec2,
) {
    let a = mass_profile(owner_a);
    let b = mass_profile(owner_b);
    if a.is_static && b.is_static {
        return;
    }

    let mtv = result.mtv() * strength;
    let push = if mtv.dot(toward_b) < 0.0 { -mtv } else { mtv };

    let inv_a = if a.is_static { 0.0 } else { 1.0 / a.mass };
    let inv_b = if b.is_static { 0.0 } else { 1.0 / b.mass };
    let total = inv_a + inv_b;

    if a.has_physics && inv_a > 0.0 {
        apply_impulse(owner_a, -push * (inv_a / total));
    }
    if b.has_physics && inv_b > 0.0 {
        apply_impulse(owner_b, push * (inv_b / total));
    }
}

fn apply_impulse(owner: &OwnerRef, impulse: Vec2) {
    if let Ok(mut guard) = owner.lock() {
        if let Some(physics) = guard.physics_mut() {
            physics.apply_impulse(impulse);
        }
    }
}
