//! Coin lifecycle: spawn, track, remove
//!
//! The factory owns the active set; the world owns the rigid bodies. The two
//! must stay paired: every live coin has exactly one body, and removal always
//! detaches both sides. `remove` is idempotent and safe to call while the
//! score evaluator walks the set, which is why coins carry an `alive` flag
//! and compaction is deferred to frame end.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::config::CoinConfig;

use super::body::{BodyId, BodyKind, MaterialTag, RigidBody, Shape};
use super::world::PhysicsWorld;

/// Spawn refused; no state was mutated
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("world has no actuator yet; coins need a shelf to land on")]
    WorldNotReady,
    #[error("active coin limit reached ({0})")]
    ActiveLimit(usize),
}

/// Wrapper for one live coin in the active set
#[derive(Debug, Clone, Copy)]
pub struct Coin {
    pub id: BodyId,
    pub spawned_tick: u64,
    pub alive: bool,
}

pub struct CoinFactory {
    config: CoinConfig,
    rng: Pcg32,
    active: Vec<Coin>,
}

impl CoinFactory {
    pub fn new(config: CoinConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            active: Vec::new(),
        }
    }

    /// Spawn one coin near `origin` (the point above the actuator chosen by
    /// the session). Lateral jitter keeps consecutive coins from starting in
    /// an exactly stacked, numerically degenerate contact; a small random
    /// spin makes them settle instead of balancing on edge.
    pub fn spawn(
        &mut self,
        world: &mut PhysicsWorld,
        origin: Vec3,
        tick: u64,
    ) -> Result<BodyId, SpawnError> {
        // Ready means somewhere to land: the kinematic shelf must exist
        // before any coin does. Walls alone are not enough.
        let has_shelf = world.bodies().iter().any(|b| b.kind == BodyKind::Kinematic);
        if !has_shelf {
            return Err(SpawnError::WorldNotReady);
        }
        if self.alive_count() >= self.config.max_active {
            return Err(SpawnError::ActiveLimit(self.config.max_active));
        }

        let j = self.config.spawn_jitter;
        let jitter = if j > 0.0 {
            Vec3::new(
                self.rng.random_range(-j..=j),
                0.0,
                self.rng.random_range(-j..=j),
            )
        } else {
            Vec3::ZERO
        };
        let s = self.config.spawn_spin;
        let spin = if s > 0.0 {
            Vec3::new(
                self.rng.random_range(-s..=s),
                self.rng.random_range(-s..=s),
                self.rng.random_range(-s..=s),
            )
        } else {
            Vec3::ZERO
        };

        let mut body = RigidBody::new_dynamic(
            Shape::Cylinder {
                radius: self.config.radius,
                half_height: self.config.half_thickness,
            },
            self.config.mass,
            MaterialTag::Coin,
        );
        // The cylinder primitive's height axis is local z; rotate it onto
        // world y once at creation so the flat faces land horizontal.
        body.orientation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        body.position = origin + jitter;
        body.angular_velocity = spin;
        body.linear_damping = self.config.linear_damping;
        body.angular_damping = self.config.angular_damping;

        let id = world.add_body(body);
        self.active.push(Coin { id, spawned_tick: tick, alive: true });
        log::debug!("spawned coin {:?} at {} (tick {})", id, origin + jitter, tick);
        Ok(id)
    }

    /// Detach the body from the world and mark the wrapper dead. Idempotent:
    /// removing an already-dead or unknown coin is a no-op, never an error.
    /// Returns whether anything changed.
    pub fn remove(&mut self, world: &mut PhysicsWorld, id: BodyId) -> bool {
        let Some(coin) = self.active.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if !coin.alive {
            return false;
        }
        coin.alive = false;
        world.remove_body(id);
        true
    }

    /// Drop dead wrappers. Called between frames, never during evaluation.
    pub fn compact(&mut self) {
        self.active.retain(|c| c.alive);
    }

    /// The active set in spawn order, dead entries included until compaction
    pub fn active(&self) -> &[Coin] {
        &self.active
    }

    pub fn alive_count(&self) -> usize {
        self.active.iter().filter(|c| c.alive).count()
    }

    pub fn config(&self) -> &CoinConfig {
        &self.config
    }
}
