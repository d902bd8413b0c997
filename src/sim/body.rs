//! Rigid bodies and their collision shapes
//!
//! Three mass classes, three shapes. Walls are static, the actuator is
//! kinematic (position prescribed each step, never solved for), coins are
//! dynamic. The class decides the inverse mass the solver sees.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Stable body identity. Ids are handed out monotonically by the world, so a
/// body vec ordered by insertion is also ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Material tag looked up in the contact policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaterialTag {
    Wall,
    Actuator,
    Coin,
}

/// How the solver treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable, zero velocity forever
    Static,
    /// Moved by an explicit rule each step; pushes others, is never pushed
    Kinematic,
    /// Fully simulated
    Dynamic,
}

/// Collision volume. The cylinder's height axis is local z (the convention
/// of the mesh primitives this maps onto); spawning code applies a one-time
/// corrective rotation so a coin's flat faces end up horizontal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { half_extents: Vec3 },
    Cylinder { radius: f32, half_height: f32 },
    Plane { normal: Vec3, offset: f32 },
}

/// One rigid body. Owned exclusively by the [`PhysicsWorld`].
///
/// [`PhysicsWorld`]: super::world::PhysicsWorld
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub id: BodyId,
    pub shape: Shape,
    pub kind: BodyKind,
    /// 0 for static and kinematic bodies, > 0 for dynamic
    pub mass: f32,
    pub inv_mass: f32,
    /// Scalar inverse inertia (mean of the principal moments). Squat discs
    /// do not need the full tensor to settle believably.
    pub inv_inertia: f32,
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub material: MaterialTag,
}

impl RigidBody {
    fn new(shape: Shape, kind: BodyKind, mass: f32, material: MaterialTag) -> Self {
        let (inv_mass, inv_inertia) = match kind {
            BodyKind::Dynamic => (1.0 / mass, inverse_inertia(&shape, mass)),
            BodyKind::Static | BodyKind::Kinematic => (0.0, 0.0),
        };
        Self {
            id: BodyId(0), // assigned by the world on insertion
            shape,
            kind,
            mass,
            inv_mass,
            inv_inertia,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
            material,
        }
    }

    pub fn new_static(shape: Shape, material: MaterialTag) -> Self {
        Self::new(shape, BodyKind::Static, 0.0, material)
    }

    pub fn new_kinematic(shape: Shape, material: MaterialTag) -> Self {
        Self::new(shape, BodyKind::Kinematic, 0.0, material)
    }

    pub fn new_dynamic(shape: Shape, mass: f32, material: MaterialTag) -> Self {
        debug_assert!(mass > 0.0);
        Self::new(shape, BodyKind::Dynamic, mass, material)
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// World-space height axis of a cylinder (local z through the orientation)
    pub fn cylinder_axis(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Local recovery for non-finite state: zero the velocities and leave the
    /// body where it last was. The rest of the world continues unaffected.
    pub fn freeze(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Axis-aligned bounding volume for the broadphase
    pub fn aabb(&self) -> super::collision::Aabb {
        use super::collision::Aabb;
        match self.shape {
            Shape::Box { half_extents } => Aabb {
                min: self.position - half_extents,
                max: self.position + half_extents,
            },
            Shape::Cylinder { radius, half_height } => {
                let axis = self.cylinder_axis();
                // Per-axis extent of an oriented cylinder
                let extent = Vec3::new(
                    cylinder_axis_extent(axis.x, radius, half_height),
                    cylinder_axis_extent(axis.y, radius, half_height),
                    cylinder_axis_extent(axis.z, radius, half_height),
                );
                Aabb {
                    min: self.position - extent,
                    max: self.position + extent,
                }
            }
            // Planes are unbounded; the narrowphase filters them
            Shape::Plane { .. } => Aabb {
                min: Vec3::splat(f32::MIN),
                max: Vec3::splat(f32::MAX),
            },
        }
    }
}

fn cylinder_axis_extent(axis_component: f32, radius: f32, half_height: f32) -> f32 {
    let a = axis_component.clamp(-1.0, 1.0);
    half_height * a.abs() + radius * (1.0 - a * a).max(0.0).sqrt()
}

fn inverse_inertia(shape: &Shape, mass: f32) -> f32 {
    let mean_moment = match *shape {
        Shape::Cylinder { radius, half_height } => {
            let h = 2.0 * half_height;
            let axial = 0.5 * mass * radius * radius;
            let lateral = mass * (3.0 * radius * radius + h * h) / 12.0;
            (axial + 2.0 * lateral) / 3.0
        }
        Shape::Box { half_extents } => {
            let d = half_extents * 2.0;
            let ix = mass * (d.y * d.y + d.z * d.z) / 12.0;
            let iy = mass * (d.x * d.x + d.z * d.z) / 12.0;
            let iz = mass * (d.x * d.x + d.y * d.y) / 12.0;
            (ix + iy + iz) / 3.0
        }
        Shape::Plane { .. } => return 0.0,
    };
    if mean_moment > 0.0 { 1.0 / mean_moment } else { 0.0 }
}
