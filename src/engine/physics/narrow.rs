// Narrow-phase shape tests
//
// Every test is a pure function of the two shapes' current extents and
// describes the contact from the first argument's point of view.

use glam::Vec2;

use super::bounds::Bounds;
use super::collision::CollisionResult;

/// Box vs box: separate along the axis of least overlap
///
/// Ties favor X. The normal points toward the side the first box has to
/// move to: negative when its center is before the second box's center.
pub fn box_box(a: &Bounds, b: &Bounds) -> CollisionResult {
    let overlap_x = a.right().min(b.right()) - a.left().max(b.left());
    let overlap_y = a.bottom().min(b.bottom()) - a.top().max(b.top());
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return CollisionResult::none();
    }

    let center_a = a.center();
    let center_b = b.center();

    let (normal, depth) = if overlap_x <= overlap_y {
        let dir = if center_a.x < center_b.x { -1.0 } else { 1.0 };
        (Vec2::new(dir, 0.0), overlap_x)
    } else {
        let dir = if center_a.y < center_b.y { -1.0 } else { 1.0 };
        (Vec2::new(0.0, dir), overlap_y)
    };

    // Midpoint of the centers, not a true contact manifold
    let contact = (center_a + center_b) * 0.5;
    CollisionResult::hit(normal, depth, contact)
}

/// Circle vs circle; touching circles do not collide
pub fn circle_circle(
    center_a: Vec2,
    radius_a: f32,
    center_b: Vec2,
    radius_b: f32,
) -> CollisionResult {
    let delta = center_b - center_a;
    let radius_sum = radius_a + radius_b;
    let dist_sq = delta.length_squared();
    if dist_sq >= radius_sum * radius_sum {
        return CollisionResult::none();
    }

    let distance = dist_sq.sqrt();
    let normal = if distance > 0.0 {
        delta / distance
    } else {
        // Coincident centers: any axis separates them
        Vec2::X
    };
    let depth = radius_sum - distance;
    let contact = center_a + normal * (radius_a - depth * 0.5);
    CollisionResult::hit(normal, depth, contact)
}

/// Box vs circle, normal pointing from the box toward the circle
pub fn box_circle(a: &Bounds, center: Vec2, radius: f32) -> CollisionResult {
    let closest = center.clamp(a.min(), a.max());
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 0.0 {
        if dist_sq >= radius * radius {
            return CollisionResult::none();
        }
        let distance = dist_sq.sqrt();
        return CollisionResult::hit(delta / distance, radius - distance, closest);
    }

    // Center is inside the box (or on its edge): push out through the
    // nearest edge, checked in left, right, top, bottom order.
    let edges = [
        (center.x - a.left(), Vec2::NEG_X),
        (a.right() - center.x, Vec2::X),
        (center.y - a.top(), Vec2::NEG_Y),
        (a.bottom() - center.y, Vec2::Y),
    ];
    let mut nearest = edges[0];
    for edge in &edges[1..] {
        if edge.0 < nearest.0 {
            nearest = *edge;
        }
    }

    let (distance, normal) = nearest;
    let contact = center + normal * distance;
    CollisionResult::hit(normal, distance + radius, contact)
}

/// Circle vs box: the box/circle test with roles swapped
pub fn circle_box(center: Vec2, radius: f32, b: &Bounds) -> CollisionResult {
    box_circle(b, center, radius).flipped()
}
