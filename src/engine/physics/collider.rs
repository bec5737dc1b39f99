use glam::Vec2;

use super::bounds::Bounds;
use super::layer::LayerId;
use super::owner::PositionProvider;
use super::PhysicsError;
use crate::core::math::is_positive_finite;

/// Tag identifying a collider's geometry, used for handler lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    Box,
    Circle,
    Compound,
    /// Game-defined shape only understood by registered handlers
    Custom(u16),
}

/// Geometry of a collider
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box; the collider position is its top-left corner
    Box { size: Vec2 },
    /// Circle; the collider position is its center
    Circle { radius: f32 },
    /// Ordered group of child colliders sharing layer, trigger and active state
    Compound { children: Vec<Collider> },
    /// Tagged box-shaped proxy for game-specific geometry (slopes, one-way tiles)
    Custom { kind: u16, size: Vec2 },
}

/// A shape attached to an owner
///
/// The position is refreshed from the owner at the start of every tick;
/// `offset` is fixed for the collider's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    position: Vec2,
    offset: Vec2,
    layer: LayerId,
    is_trigger: bool,
    is_active: bool,
    shape: Shape,
}

impl Collider {
    fn from_shape(shape: Shape) -> Self {
        Self {
            position: Vec2::ZERO,
            offset: Vec2::ZERO,
            layer: LayerId::DEFAULT,
            is_trigger: false,
            is_active: true,
            shape,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match &self.shape {
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Compound { .. } => ShapeKind::Compound,
            Shape::Custom { kind, .. } => ShapeKind::Custom(*kind),
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// World position: the owner position plus the offset as of the last refresh
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_layer(&mut self, layer: LayerId) {
        self.layer = layer;
        for child in self.children_mut() {
            child.set_layer(layer);
        }
    }

    pub fn set_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
        for child in self.children_mut() {
            child.set_trigger(is_trigger);
        }
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
        for child in self.children_mut() {
            child.set_active(is_active);
        }
    }

    /// Child colliders of a compound (empty for every other shape)
    pub fn children(&self) -> &[Collider] {
        match &self.shape {
            Shape::Compound { children } => children,
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> &mut [Collider] {
        match &mut self.shape {
            Shape::Compound { children } => children,
            _ => &mut [],
        }
    }

    /// Pull the owner's position and apply the offset
    pub fn update_position<P: PositionProvider + ?Sized>(&mut self, owner: &P) {
        self.place_at(owner.position());
    }

    /// Position the collider for an owner standing at `origin`.
    /// Compound children are placed relative to the compound.
    pub fn place_at(&mut self, origin: Vec2) {
        self.position = origin + self.offset;
        let anchor = self.position;
        for child in self.children_mut() {
            child.place_at(anchor);
        }
    }

    /// Axis-aligned bounds at the current position
    pub fn bounds(&self) -> Bounds {
        match &self.shape {
            Shape::Box { size } | Shape::Custom { size, .. } => {
                Bounds::new(self.position.x, self.position.y, size.x, size.y)
            }
            Shape::Circle { radius } => Bounds::new(
                self.position.x - radius,
                self.position.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
            Shape::Compound { children } => {
                let mut iter = children.iter().map(Collider::bounds);
                match iter.next() {
                    Some(first) => iter.fold(first, |acc, b| acc.union(&b)),
                    None => Bounds::point(self.position),
                }
            }
        }
    }

    /// Circle center and radius, if this is a circle
    pub fn as_circle(&self) -> Option<(Vec2, f32)> {
        match self.shape {
            Shape::Circle { radius } => Some((self.position, radius)),
            _ => None,
        }
    }

    /// Box bounds, if this is a box
    pub fn as_box(&self) -> Option<Bounds> {
        match self.shape {
            Shape::Box { .. } => Some(self.bounds()),
            _ => None,
        }
    }
}

/// Builder for colliders with setup-time validation
#[derive(Debug, Clone)]
pub struct ColliderBuilder {
    shape: Shape,
    offset: Vec2,
    layer: LayerId,
    is_trigger: bool,
    is_active: bool,
}

impl ColliderBuilder {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            offset: Vec2::ZERO,
            layer: LayerId::DEFAULT,
            is_trigger: false,
            is_active: true,
        }
    }

    /// Create a box-shaped collider
    pub fn box_shape(width: f32, height: f32) -> Self {
        Self::new(Shape::Box {
            size: Vec2::new(width, height),
        })
    }

    /// Create a circle-shaped collider
    pub fn circle(radius: f32) -> Self {
        Self::new(Shape::Circle { radius })
    }

    /// Create a compound collider from already built children
    pub fn compound(children: Vec<Collider>) -> Self {
        Self::new(Shape::Compound { children })
    }

    /// Create a game-specific shape handled by a registered handler
    pub fn custom(kind: u16, width: f32, height: f32) -> Self {
        Self::new(Shape::Custom {
            kind,
            size: Vec2::new(width, height),
        })
    }

    /// Fixed offset from the owner's position
    pub fn offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    pub fn layer(mut self, layer: LayerId) -> Self {
        self.layer = layer;
        self
    }

    /// Make this a trigger (detects overlap but is never resolved)
    pub fn trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Validate dimensions and build the collider
    pub fn build(self) -> Result<Collider, PhysicsError> {
        validate_shape(&self.shape)?;
        if !self.offset.is_finite() {
            return Err(PhysicsError::InvalidDimension {
                what: "offset",
                value: if self.offset.x.is_finite() {
                    self.offset.y
                } else {
                    self.offset.x
                },
            });
        }

        let mut collider = Collider::from_shape(self.shape);
        collider.offset = self.offset;
        // Setters so compound children inherit the state
        collider.set_layer(self.layer);
        collider.set_trigger(self.is_trigger);
        collider.set_active(self.is_active);
        collider.place_at(Vec2::ZERO);
        Ok(collider)
    }
}

fn validate_shape(shape: &Shape) -> Result<(), PhysicsError> {
    let check = |what: &'static str, value: f32| {
        if is_positive_finite(value) {
            Ok(())
        } else {
            Err(PhysicsError::InvalidDimension { what, value })
        }
    };

    match shape {
        Shape::Box { size } => {
            check("box width", size.x)?;
            check("box height", size.y)
        }
        Shape::Circle { radius } => check("circle radius", *radius),
        Shape::Custom { size, .. } => {
            check("custom width", size.x)?;
            check("custom height", size.y)
        }
        // Children were validated when they were built
        Shape::Compound { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct At(Vec2);

    impl PositionProvider for At {
        fn position(&self) -> Vec2 {
            self.0
        }
    }

    #[test]
    fn test_box_bounds_follow_owner() {
        let mut collider = ColliderBuilder::box_shape(10.0, 4.0)
            .offset(1.0, 2.0)
            .build()
            .unwrap();
        collider.update_position(&At(Vec2::new(5.0, 5.0)));

        assert_eq!(collider.kind(), ShapeKind::Box);
        assert_eq!(collider.position(), Vec2::new(6.0, 7.0));
        assert_eq!(collider.bounds(), Bounds::new(6.0, 7.0, 10.0, 4.0));
    }

    #[test]
    fn test_circle_bounds_are_enclosing_square() {
        let mut collider = ColliderBuilder::circle(3.0).build().unwrap();
        collider.update_position(&At(Vec2::new(10.0, 10.0)));
        assert_eq!(collider.bounds(), Bounds::new(7.0, 7.0, 6.0, 6.0));
        assert_eq!(collider.as_circle(), Some((Vec2::new(10.0, 10.0), 3.0)));
    }

    #[test]
    fn test_compound_bounds_are_union_of_children() {
        let left = ColliderBuilder::box_shape(2.0, 2.0).build().unwrap();
        let right = ColliderBuilder::circle(1.0).offset(6.0, 1.0).build().unwrap();
        let mut compound = ColliderBuilder::compound(vec![left, right])
            .offset(1.0, 0.0)
            .build()
            .unwrap();
        compound.update_position(&At(Vec2::new(10.0, 0.0)));

        assert_eq!(compound.children()[0].position(), Vec2::new(11.0, 0.0));
        assert_eq!(compound.children()[1].position(), Vec2::new(17.0, 1.0));
        assert_eq!(compound.bounds(), Bounds::new(11.0, 0.0, 7.0, 2.0));
    }

    #[test]
    fn test_empty_compound_is_point_at_own_position() {
        let mut compound = ColliderBuilder::compound(Vec::new()).build().unwrap();
        compound.update_position(&At(Vec2::new(4.0, -3.0)));
        assert_eq!(compound.bounds(), Bounds::new(4.0, -3.0, 0.0, 0.0));
    }

    #[test]
    fn test_compound_propagates_state() {
        let child = ColliderBuilder::box_shape(1.0, 1.0).build().unwrap();
        let mut compound = ColliderBuilder::compound(vec![child.clone(), child])
            .layer(LayerId(3))
            .trigger(true)
            .build()
            .unwrap();
        assert!(compound.children().iter().all(|c| c.layer() == LayerId(3)));
        assert!(compound.children().iter().all(Collider::is_trigger));

        compound.set_active(false);
        compound.set_trigger(false);
        assert!(compound.children().iter().all(|c| !c.is_active()));
        assert!(compound.children().iter().all(|c| !c.is_trigger()));
    }

    #[test]
    fn test_invalid_dimensions_are_rejected() {
        assert_eq!(
            ColliderBuilder::box_shape(0.0, 1.0).build(),
            Err(PhysicsError::InvalidDimension {
                what: "box width",
                value: 0.0
            })
        );
        assert!(ColliderBuilder::circle(-1.0).build().is_err());
        assert!(ColliderBuilder::circle(f32::NAN).build().is_err());
        assert!(ColliderBuilder::custom(1, 2.0, f32::INFINITY).build().is_err());
        assert!(ColliderBuilder::box_shape(1.0, 1.0)
            .offset(f32::NAN, 0.0)
            .build()
            .is_err());
    }
}
