//! The simulation context object
//!
//! One `Session` owns the world, enclosure, actuator, coin factory and score
//! evaluator: no module-level globals, so independent instances can run side
//! by side (and under test). `frame` is the single mutator; everything runs
//! on one thread, strictly in order: advance actuator, step world, evaluate
//! score, once per fixed substep. `spawn_coin` is the only entry point meant
//! for outside callers (user input) and is synchronous: the coin is fully
//! registered before the call returns and is visible to the next step.

use crate::config::{ConfigError, PusherConfig};

use super::actuator::Actuator;
use super::body::{BodyId, RigidBody};
use super::coins::{CoinFactory, SpawnError};
use super::enclosure::Enclosure;
use super::policy::ContactPolicy;
use super::score::{ScoreEvaluator, ScoreState};
use super::world::PhysicsWorld;

/// What one frame did
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameReport {
    pub substeps: u32,
    pub scored: u64,
    pub lost: u64,
}

pub struct Session {
    config: PusherConfig,
    world: PhysicsWorld,
    enclosure: Enclosure,
    actuator: Actuator,
    factory: CoinFactory,
    evaluator: ScoreEvaluator,
    spawn_height: f32,
    time_ticks: u64,
}

impl Session {
    /// Validate the configuration and build the whole cabinet. The only
    /// fatal failure in the crate: bad config refuses to start, everything
    /// later recovers locally.
    pub fn new(config: PusherConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = PhysicsWorld::new(config.gravity, config.fixed_dt);
        world.set_frame_limits(config.max_frame_dt, config.max_substeps);
        world.set_solver_iterations(config.solver_iterations);
        world.set_contact_policy(ContactPolicy::from_config(&config.contacts));

        let enclosure = Enclosure::build(&config.enclosure, &mut world);
        let actuator = Actuator::build(&config.actuator, &mut world);
        let factory = CoinFactory::new(config.coin, config.seed);
        let evaluator = ScoreEvaluator::new(enclosure.boundary_z(), enclosure.dead_zone_y());

        let spawn_height =
            config.actuator.height + config.actuator.half_extents.y + config.coin.drop_height;

        log::info!(
            "session ready: {}x{}x{} cabinet, boundary z {}, seed {}",
            config.enclosure.width,
            config.enclosure.height,
            config.enclosure.depth,
            enclosure.boundary_z(),
            config.seed,
        );

        Ok(Self {
            config,
            world,
            enclosure,
            actuator,
            factory,
            evaluator,
            spawn_height,
            time_ticks: 0,
        })
    }

    /// Advance by one frame of real time. Internally runs whole fixed steps
    /// only; each one advances the actuator, steps the world, then evaluates
    /// the score so a fast coin cannot cross the boundary unseen between
    /// checks.
    pub fn frame(&mut self, real_dt: f32) -> FrameReport {
        let substeps = self.world.begin_frame(real_dt);
        let dt = self.world.fixed_dt();
        let mut report = FrameReport { substeps, ..Default::default() };

        for _ in 0..substeps {
            self.actuator.advance(dt, &mut self.world);
            self.world.step_once();
            self.time_ticks += 1;
            let pass = self.evaluator.evaluate(&mut self.world, &mut self.factory);
            report.scored += pass.scored.len() as u64;
            report.lost += pass.lost.len() as u64;
        }

        self.factory.compact();
        report
    }

    /// Drop one coin above the actuator (user input). Synchronous; the new
    /// body is registered before this returns.
    pub fn spawn_coin(&mut self) -> Result<BodyId, SpawnError> {
        let mut origin = self.actuator.center(&self.world);
        origin.x = 0.0;
        origin.y = self.spawn_height;
        self.factory.spawn(&mut self.world, origin, self.time_ticks)
    }

    /// Read-only body access for render sync
    pub fn bodies(&self) -> &[RigidBody] {
        self.world.bodies()
    }

    pub fn score(&self) -> ScoreState {
        self.evaluator.state()
    }

    pub fn coins_in_play(&self) -> usize {
        self.factory.alive_count()
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn actuator_position(&self) -> f32 {
        self.actuator.position()
    }

    pub fn boundary_z(&self) -> f32 {
        self.enclosure.boundary_z()
    }

    pub fn config(&self) -> &PusherConfig {
        &self.config
    }
}
