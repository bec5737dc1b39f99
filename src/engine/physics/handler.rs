use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;

use super::bounds::Bounds;
use super::collider::{Collider, ShapeKind};
use super::collision::CollisionResult;
use super::narrow;

/// Custom narrow-phase test for an ordered pair of shape kinds
///
/// Receives the colliders in the order the handler was registered for and
/// reports the contact from the first collider's perspective.
pub type CollisionHandler = Arc<dyn Fn(&Collider, &Collider) -> CollisionResult + Send + Sync>;

/// Handler lookup key: an ordered pair of shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    pub first: ShapeKind,
    pub second: ShapeKind,
}

impl CollisionPair {
    pub fn new(first: ShapeKind, second: ShapeKind) -> Self {
        Self { first, second }
    }

    pub fn reversed(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }
}

/// Dispatch table for shape tests
///
/// Lookup order for `(a, b)`: a handler registered for exactly that pair,
/// then one registered for the reversed pair (whose normal is flipped), then
/// the built-in box and circle tests. Compounds without a handler are tested
/// child by child. Anything else is silently non-colliding.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<CollisionPair, CollisionHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `first` vs `second`
    pub fn register<F>(&mut self, first: ShapeKind, second: ShapeKind, handler: F)
    where
        F: Fn(&Collider, &Collider) -> CollisionResult + Send + Sync + 'static,
    {
        let pair = CollisionPair::new(first, second);
        if self.handlers.insert(pair, Arc::new(handler)).is_some() {
            log::debug!("Replaced collision handler for {:?}", pair);
        }
    }

    /// Remove the handler for exactly this ordered pair
    pub fn unregister(&mut self, first: ShapeKind, second: ShapeKind) -> bool {
        self.handlers
            .remove(&CollisionPair::new(first, second))
            .is_some()
    }

    pub fn has_handler(&self, first: ShapeKind, second: ShapeKind) -> bool {
        self.handlers
            .contains_key(&CollisionPair::new(first, second))
    }

    /// Test two colliders, reporting from `a`'s perspective
    pub fn test(&self, a: &Collider, b: &Collider) -> CollisionResult {
        self.contact(a, b).result
    }

    /// Test two colliders and report which parts of them touched.
    ///
    /// For compounds the parts are the children that produced the deepest
    /// hit, so a caller orienting the MTV by centers uses the pieces that
    /// actually overlap rather than the union of every child.
    pub fn contact(&self, a: &Collider, b: &Collider) -> Contact {
        let pair = CollisionPair::new(a.kind(), b.kind());

        if let Some(handler) = self.handlers.get(&pair) {
            return Contact::whole(handler(a, b), a, b);
        }
        if let Some(handler) = self.handlers.get(&pair.reversed()) {
            return Contact::whole(handler(b, a).flipped(), a, b);
        }
        self.builtin(a, b)
    }

    fn builtin(&self, a: &Collider, b: &Collider) -> Contact {
        use ShapeKind::*;

        let result = match (a.kind(), b.kind()) {
            (Compound, _) => {
                return deepest(a.children().iter().map(|child| self.contact(child, b)));
            }
            (_, Compound) => {
                return deepest(b.children().iter().map(|child| self.contact(a, child)));
            }
            (Box, Box) => narrow::box_box(&a.bounds(), &b.bounds()),
            (Circle, Circle) => match (a.as_circle(), b.as_circle()) {
                (Some((ca, ra)), Some((cb, rb))) => narrow::circle_circle(ca, ra, cb, rb),
                _ => CollisionResult::none(),
            },
            (Box, Circle) => match b.as_circle() {
                Some((center, radius)) => narrow::box_circle(&a.bounds(), center, radius),
                None => CollisionResult::none(),
            },
            (Circle, Box) => match a.as_circle() {
                Some((center, radius)) => narrow::circle_box(center, radius, &b.bounds()),
                None => CollisionResult::none(),
            },
            _ => CollisionResult::none(),
        };
        Contact::whole(result, a, b)
    }
}

/// Outcome of a pair test with the extents of the parts that touched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub result: CollisionResult,
    pub part_a: Bounds,
    pub part_b: Bounds,
}

impl Contact {
    fn whole(result: CollisionResult, a: &Collider, b: &Collider) -> Self {
        Self {
            result,
            part_a: a.bounds(),
            part_b: b.bounds(),
        }
    }

    /// Direction from the touching part of A to the touching part of B
    pub fn toward_b(&self) -> Vec2 {
        self.part_b.center() - self.part_a.center()
    }
}

fn deepest(contacts: impl Iterator<Item = Contact>) -> Contact {
    let mut best: Option<Contact> = None;
    for contact in contacts.filter(|c| c.result.colliding) {
        match best {
            Some(current) if current.result.depth >= contact.result.depth => {}
            _ => best = Some(contact),
        }
    }
    best.unwrap_or(Contact {
        result: CollisionResult::none(),
        part_a: Bounds::default(),
        part_b: Bounds::default(),
    })
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("pairs", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
