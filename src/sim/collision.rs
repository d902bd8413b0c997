//! Contact generation between collision shapes
//!
//! The tricky part of a coin pusher: a disc resting flat on a box must come
//! to rest at exactly box-top + half-thickness, and a disc wedged against a
//! wall must push out laterally by its radius. Both fall out of one idea:
//! the penetration along a contact normal is the cylinder's support radius
//! in that direction minus the actual separation.
//!
//! All normals point from body `a` toward body `b`. Boxes are assumed
//! axis-aligned: nothing in this cabinet ever rotates a box.

use glam::Vec3;

use super::body::{RigidBody, Shape};

/// Axis-aligned bounding volume for broadphase pruning
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn overlaps(&self, other: &Aabb, margin: f32) -> bool {
        self.min.x - margin <= other.max.x
            && self.max.x + margin >= other.min.x
            && self.min.y - margin <= other.max.y
            && self.max.y + margin >= other.min.y
            && self.min.z - margin <= other.max.z
            && self.max.z + margin >= other.min.z
    }
}

/// One contact point between two bodies, indices into the world's body vec.
/// Valid only for the substep that generated it.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub a: usize,
    pub b: usize,
    pub point: Vec3,
    /// Unit normal pointing from `a` toward `b`
    pub normal: Vec3,
    pub penetration: f32,
}

/// Support radius of a cylinder along a unit direction: how far the surface
/// extends from the center when measured along `dir`.
pub fn cylinder_support(axis: Vec3, radius: f32, half_height: f32, dir: Vec3) -> f32 {
    let along = dir.dot(axis);
    half_height * along.abs() + radius * (dir - axis * along).length()
}

/// Exact narrowphase for one shape pair. Returns `None` for pairs this
/// cabinet never produces (box-box, plane-box, plane-plane).
pub fn test_pair(a_idx: usize, b_idx: usize, a: &RigidBody, b: &RigidBody) -> Option<Contact> {
    match (&a.shape, &b.shape) {
        (Shape::Box { .. }, Shape::Cylinder { .. }) => box_cylinder(a_idx, b_idx, a, b),
        (Shape::Cylinder { .. }, Shape::Box { .. }) => box_cylinder(b_idx, a_idx, b, a),
        (Shape::Cylinder { .. }, Shape::Cylinder { .. }) => cylinder_cylinder(a_idx, b_idx, a, b),
        (Shape::Plane { .. }, Shape::Cylinder { .. }) => plane_cylinder(a_idx, b_idx, a, b),
        (Shape::Cylinder { .. }, Shape::Plane { .. }) => plane_cylinder(b_idx, a_idx, b, a),
        _ => None,
    }
}

/// Box (a) vs cylinder (b); normal points from the box toward the cylinder.
fn box_cylinder(
    box_idx: usize,
    cyl_idx: usize,
    box_body: &RigidBody,
    cyl_body: &RigidBody,
) -> Option<Contact> {
    let Shape::Box { half_extents } = box_body.shape else { return None };
    let Shape::Cylinder { radius, half_height } = cyl_body.shape else { return None };

    let axis = cyl_body.cylinder_axis();
    let local = cyl_body.position - box_body.position;
    let clamped = local.clamp(-half_extents, half_extents);

    if local != clamped {
        // Center outside the box: closest surface point and the direction
        // from it give the contact normal.
        let delta = local - clamped;
        let dist = delta.length();
        let normal = delta / dist;
        let penetration = cylinder_support(axis, radius, half_height, normal) - dist;
        if penetration <= 0.0 {
            return None;
        }
        Some(Contact {
            a: box_idx,
            b: cyl_idx,
            point: box_body.position + clamped,
            normal,
            penetration,
        })
    } else {
        // Center is inside the box (tunneled); push out through the nearest
        // face rather than letting the coin sit buried.
        let depths = half_extents - local.abs();
        let (face_depth, normal) = if depths.x <= depths.y && depths.x <= depths.z {
            (depths.x, Vec3::X * local.x.signum())
        } else if depths.y <= depths.z {
            (depths.y, Vec3::Y * local.y.signum())
        } else {
            (depths.z, Vec3::Z * local.z.signum())
        };
        let penetration = face_depth + cylinder_support(axis, radius, half_height, normal);
        Some(Contact {
            a: box_idx,
            b: cyl_idx,
            point: cyl_body.position,
            normal,
            penetration,
        })
    }
}

/// Cylinder vs cylinder, support radii summed along the center line. Slightly
/// rounds the rim-to-rim case, which reads as coins jostling rather than
/// catching edges; good enough and cheap.
fn cylinder_cylinder(
    a_idx: usize,
    b_idx: usize,
    a: &RigidBody,
    b: &RigidBody,
) -> Option<Contact> {
    let Shape::Cylinder { radius: ra, half_height: ha } = a.shape else { return None };
    let Shape::Cylinder { radius: rb, half_height: hb } = b.shape else { return None };

    let delta = b.position - a.position;
    let dist = delta.length();
    // Exactly coincident centers: arbitrary but deterministic separation axis
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::Y };

    let support_a = cylinder_support(a.cylinder_axis(), ra, ha, normal);
    let support_b = cylinder_support(b.cylinder_axis(), rb, hb, normal);
    let penetration = support_a + support_b - dist;
    if penetration <= 0.0 {
        return None;
    }
    Some(Contact {
        a: a_idx,
        b: b_idx,
        point: a.position + normal * (support_a - penetration * 0.5),
        normal,
        penetration,
    })
}

/// Plane (a) vs cylinder (b); the plane's normal is the contact normal.
fn plane_cylinder(
    plane_idx: usize,
    cyl_idx: usize,
    plane_body: &RigidBody,
    cyl_body: &RigidBody,
) -> Option<Contact> {
    let Shape::Plane { normal, offset } = plane_body.shape else { return None };
    let Shape::Cylinder { radius, half_height } = cyl_body.shape else { return None };

    let dist = cyl_body.position.dot(normal) - offset;
    let penetration = cylinder_support(cyl_body.cylinder_axis(), radius, half_height, normal) - dist;
    if penetration <= 0.0 {
        return None;
    }
    Some(Contact {
        a: plane_idx,
        b: cyl_idx,
        point: cyl_body.position - normal * dist,
        normal,
        penetration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::MaterialTag;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn flat_coin(position: Vec3) -> RigidBody {
        let mut coin = RigidBody::new_dynamic(
            Shape::Cylinder { radius: 0.35, half_height: 0.05 },
            0.2,
            MaterialTag::Coin,
        );
        coin.orientation = Quat::from_rotation_x(-FRAC_PI_2);
        coin.position = position;
        coin
    }

    fn shelf(position: Vec3) -> RigidBody {
        let mut shelf = RigidBody::new_kinematic(
            Shape::Box { half_extents: Vec3::new(2.0, 0.15, 1.0) },
            MaterialTag::Actuator,
        );
        shelf.position = position;
        shelf
    }

    #[test]
    fn test_coin_resting_on_box_top() {
        let shelf = shelf(Vec3::new(0.0, 1.0, 0.0));
        // Shelf top at y = 1.15; coin center 0.02 below the rest height
        let coin = flat_coin(Vec3::new(0.0, 1.18, 0.0));

        let contact = test_pair(0, 1, &shelf, &coin).expect("expected contact");
        assert_eq!(contact.a, 0);
        assert_eq!(contact.b, 1);
        assert!((contact.normal - Vec3::Y).length() < 1e-5);
        // penetration = half_thickness - (1.18 - 1.15) = 0.02
        assert!((contact.penetration - 0.02).abs() < 1e-4);
    }

    #[test]
    fn test_coin_above_box_no_contact() {
        let shelf = shelf(Vec3::new(0.0, 1.0, 0.0));
        let coin = flat_coin(Vec3::new(0.0, 2.0, 0.0));
        assert!(test_pair(0, 1, &shelf, &coin).is_none());
    }

    #[test]
    fn test_coin_against_wall_uses_radius() {
        // Tall thin wall to the coin's +x, coin edge overlapping by 0.05
        let mut wall = RigidBody::new_static(
            Shape::Box { half_extents: Vec3::new(0.1, 3.0, 4.0) },
            MaterialTag::Wall,
        );
        wall.position = Vec3::new(3.0, 3.0, 0.0);
        let coin = flat_coin(Vec3::new(2.6, 3.0, 0.0));

        let contact = test_pair(0, 1, &wall, &coin).expect("expected contact");
        // Normal from wall toward coin: -x
        assert!((contact.normal - Vec3::NEG_X).length() < 1e-5);
        // gap = 2.9 - 2.6 = 0.3, support along x = radius 0.35
        assert!((contact.penetration - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_tunneled_coin_pushed_through_nearest_face() {
        let shelf = shelf(Vec3::new(0.0, 1.0, 0.0));
        // Coin center just inside the top face
        let coin = flat_coin(Vec3::new(0.0, 1.1, 0.0));

        let contact = test_pair(0, 1, &shelf, &coin).expect("expected contact");
        assert!((contact.normal - Vec3::Y).length() < 1e-5);
        assert!(contact.penetration > 0.05);
    }

    #[test]
    fn test_stacked_coins_overlap() {
        let bottom = flat_coin(Vec3::new(0.0, 1.0, 0.0));
        let top = flat_coin(Vec3::new(0.0, 1.08, 0.0));

        let contact = test_pair(0, 1, &bottom, &top).expect("expected contact");
        assert!((contact.normal - Vec3::Y).length() < 1e-5);
        // supports 0.05 + 0.05 against a gap of 0.08
        assert!((contact.penetration - 0.02).abs() < 1e-4);
    }

    #[test]
    fn test_separated_coins_no_contact() {
        let a = flat_coin(Vec3::new(0.0, 1.0, 0.0));
        let b = flat_coin(Vec3::new(1.0, 1.0, 0.0));
        assert!(test_pair(0, 1, &a, &b).is_none());
    }

    #[test]
    fn test_coin_on_plane() {
        let plane = RigidBody::new_static(
            Shape::Plane { normal: Vec3::Y, offset: 0.0 },
            MaterialTag::Wall,
        );
        let coin = flat_coin(Vec3::new(0.0, 0.03, 0.0));

        let contact = test_pair(0, 1, &plane, &coin).expect("expected contact");
        assert!((contact.normal - Vec3::Y).length() < 1e-5);
        assert!((contact.penetration - 0.02).abs() < 1e-4);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb { min: Vec3::ZERO, max: Vec3::ONE };
        let b = Aabb { min: Vec3::splat(0.9), max: Vec3::splat(2.0) };
        let c = Aabb { min: Vec3::splat(1.2), max: Vec3::splat(2.0) };
        assert!(a.overlaps(&b, 0.0));
        assert!(!a.overlaps(&c, 0.0));
        assert!(a.overlaps(&c, 0.3));
    }
}
