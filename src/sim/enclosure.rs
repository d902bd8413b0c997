//! Static cabinet geometry
//!
//! Floor, back wall and two side walls, built once from configuration. Each
//! piece is one static body whose collision volume matches its configured
//! bounds exactly: a gap leaks coins through a corner, an overlap makes the
//! stack jitter. The front face is deliberately absent; that opening is the
//! collection channel, and its plane coordinate is what the score evaluator
//! checks against.

use glam::Vec3;

use crate::config::EnclosureConfig;

use super::body::{BodyId, MaterialTag, RigidBody, Shape};
use super::world::PhysicsWorld;

pub struct Enclosure {
    walls: Vec<BodyId>,
    boundary_z: f32,
    lateral_half_width: f32,
    dead_zone_y: f32,
}

impl Enclosure {
    /// Build the cabinet into the world. Wall layout follows the classic
    /// cabinet: floor slab centered at y = 0, back wall at -z, side walls at
    /// +-x, optional low lip across the open front.
    pub fn build(config: &EnclosureConfig, world: &mut PhysicsWorld) -> Self {
        let half_width = config.width / 2.0;
        let half_depth = config.depth / 2.0;
        let half_height = config.height / 2.0;
        let t = config.wall_thickness;

        let mut walls = Vec::new();
        let mut add_wall = |world: &mut PhysicsWorld, half_extents: Vec3, position: Vec3| {
            let mut wall = RigidBody::new_static(Shape::Box { half_extents }, MaterialTag::Wall);
            wall.position = position;
            walls.push(world.add_body(wall));
        };

        // Floor
        add_wall(
            world,
            Vec3::new(half_width, t / 2.0, half_depth),
            Vec3::ZERO,
        );
        // Back wall
        add_wall(
            world,
            Vec3::new(half_width, half_height, t / 2.0),
            Vec3::new(0.0, half_height, -half_depth),
        );
        // Left and right walls
        add_wall(
            world,
            Vec3::new(t / 2.0, half_height, half_depth),
            Vec3::new(-half_width, half_height, 0.0),
        );
        add_wall(
            world,
            Vec3::new(t / 2.0, half_height, half_depth),
            Vec3::new(half_width, half_height, 0.0),
        );
        // Optional lip across the open front
        if config.front_lip_height > 0.0 {
            add_wall(
                world,
                Vec3::new(half_width, config.front_lip_height / 2.0, t / 2.0),
                Vec3::new(0.0, t / 2.0 + config.front_lip_height / 2.0, half_depth),
            );
        }

        Self {
            walls,
            boundary_z: half_depth,
            lateral_half_width: half_width,
            dead_zone_y: config.dead_zone_y,
        }
    }

    /// Plane coordinate of the open front; crossing it scores a coin
    pub fn boundary_z(&self) -> f32 {
        self.boundary_z
    }

    /// Falling below this y is a loss, not a score
    pub fn dead_zone_y(&self) -> f32 {
        self.dead_zone_y
    }

    /// Half-width of the playfield, for leak checks
    pub fn lateral_half_width(&self) -> f32 {
        self.lateral_half_width
    }

    pub fn wall_ids(&self) -> &[BodyId] {
        &self.walls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::body::BodyKind;

    fn build() -> (PhysicsWorld, Enclosure) {
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.82, 0.0), SIM_DT);
        let enclosure = Enclosure::build(&EnclosureConfig::default(), &mut world);
        (world, enclosure)
    }

    #[test]
    fn test_wall_count_without_lip() {
        let (world, enclosure) = build();
        assert_eq!(enclosure.wall_ids().len(), 4);
        assert_eq!(world.bodies().len(), 4);
    }

    #[test]
    fn test_front_lip_is_optional() {
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.82, 0.0), SIM_DT);
        let config = EnclosureConfig { front_lip_height: 0.4, ..Default::default() };
        let enclosure = Enclosure::build(&config, &mut world);
        assert_eq!(enclosure.wall_ids().len(), 5);
    }

    #[test]
    fn test_walls_are_static_and_massless() {
        let (world, enclosure) = build();
        for id in enclosure.wall_ids() {
            let wall = world.body(*id).unwrap();
            assert_eq!(wall.kind, BodyKind::Static);
            assert_eq!(wall.mass, 0.0);
            assert_eq!(wall.linear_velocity, Vec3::ZERO);
            assert_eq!(wall.material, MaterialTag::Wall);
        }
    }

    #[test]
    fn test_boundary_plane_is_open_front() {
        let (world, enclosure) = build();
        let config = EnclosureConfig::default();
        assert_eq!(enclosure.boundary_z(), config.depth / 2.0);
        // No wall occupies the front plane
        for id in enclosure.wall_ids() {
            let wall = world.body(*id).unwrap();
            let near_front = (wall.position.z - enclosure.boundary_z()).abs() < 0.5;
            assert!(!near_front, "front must stay open");
        }
    }
}
