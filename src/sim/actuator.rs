//! The reciprocating pusher shelf
//!
//! One kinematic body advanced by an explicit motion rule each fixed step.
//! Moving the position alone would give visible motion with no physical
//! push, so `advance` also writes the instantaneous velocity to the body;
//! friction at the actuator-coin contact does the rest.

use glam::Vec3;

use crate::config::{ActuatorConfig, MotionRule};

use super::body::{BodyId, MaterialTag, RigidBody, Shape};
use super::world::PhysicsWorld;

pub struct Actuator {
    body: BodyId,
    rule: MotionRule,
    /// Current position along the travel axis (z)
    position: f32,
    /// +1 toward limit_max, -1 toward limit_min (linear rule)
    direction: f32,
    /// Sinusoidal rule state
    phase: f32,
    base: Vec3,
}

impl Actuator {
    /// Create the kinematic shelf body and register it with the world. The
    /// collision half-depth extends past the visible half-depth by the
    /// configured margin so no coin can slip behind the shelf at either
    /// extreme of travel.
    pub fn build(config: &ActuatorConfig, world: &mut PhysicsWorld) -> Self {
        let collision_half_extents = Vec3::new(
            config.half_extents.x,
            config.half_extents.y,
            config.half_extents.z + config.collision_depth_margin,
        );
        let position = match config.motion {
            MotionRule::Linear { limit_min, .. } => limit_min,
            MotionRule::Sinusoidal { center, .. } => center,
        };

        let mut body = RigidBody::new_kinematic(
            Shape::Box { half_extents: collision_half_extents },
            MaterialTag::Actuator,
        );
        let base = Vec3::new(0.0, config.height, 0.0);
        body.position = base + Vec3::Z * position;
        let id = world.add_body(body);

        Self {
            body: id,
            rule: config.motion,
            position,
            direction: 1.0,
            phase: 0.0,
            base,
        }
    }

    pub fn body_id(&self) -> BodyId {
        self.body
    }

    /// Position along the travel axis
    pub fn position(&self) -> f32 {
        self.position
    }

    /// World-space center of the shelf, spawn origin for coins
    pub fn center(&self, world: &PhysicsWorld) -> Vec3 {
        world
            .body(self.body)
            .map(|b| b.position)
            .unwrap_or(self.base)
    }

    /// Advance one fixed step: update the travel position per the motion
    /// rule, then write both position and instantaneous velocity to the
    /// body so the following physics step sees a moving surface.
    pub fn advance(&mut self, dt: f32, world: &mut PhysicsWorld) {
        let old = self.position;
        match self.rule {
            MotionRule::Linear { limit_min, limit_max, speed } => {
                let mut next = self.position + speed * dt * self.direction;
                // Hard reversal: clamp exactly to the limit, never overshoot
                if next >= limit_max {
                    next = limit_max;
                    self.direction = -1.0;
                } else if next <= limit_min {
                    next = limit_min;
                    self.direction = 1.0;
                }
                self.position = next;
            }
            MotionRule::Sinusoidal { center, amplitude, angular_speed } => {
                // Wrapped so long sessions keep full sin precision
                self.phase = (self.phase + angular_speed * dt)
                    .rem_euclid(std::f32::consts::TAU);
                self.position = center + amplitude * self.phase.sin();
            }
        }

        let velocity = if dt > 0.0 { (self.position - old) / dt } else { 0.0 };
        if let Some(body) = world.body_mut(self.body) {
            body.position = self.base + Vec3::Z * self.position;
            body.linear_velocity = Vec3::Z * velocity;
        }
    }
}
