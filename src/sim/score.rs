//! Boundary-crossing detection
//!
//! Runs every fixed step, right after the world step. Source variants that
//! polled on a coarse wall-clock timer could miss a fast coin entirely or
//! count it twice; coupling evaluation to the fixed step closes that gap,
//! and the dead flag on each coin makes every outcome exactly-once.

use serde::{Deserialize, Serialize};

use super::body::BodyId;
use super::coins::CoinFactory;
use super::world::PhysicsWorld;

/// Running totals. `score` is monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub lost: u64,
}

/// Outcome of one evaluation pass
#[derive(Debug, Clone, Default)]
pub struct EvalReport {
    pub scored: Vec<BodyId>,
    pub lost: Vec<BodyId>,
}

pub struct ScoreEvaluator {
    boundary_z: f32,
    dead_zone_y: f32,
    state: ScoreState,
}

impl ScoreEvaluator {
    pub fn new(boundary_z: f32, dead_zone_y: f32) -> Self {
        Self { boundary_z, dead_zone_y, state: ScoreState::default() }
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    /// Walk the active set in spawn order; score coins past the boundary
    /// plane, drop coins below the dead zone. Each coin resolves at most
    /// once per lifetime: removal marks it dead, and dead coins are skipped,
    /// so repeated calls with no new crossings change nothing.
    pub fn evaluate(&mut self, world: &mut PhysicsWorld, factory: &mut CoinFactory) -> EvalReport {
        let mut report = EvalReport::default();

        for coin in factory.active() {
            if !coin.alive {
                continue;
            }
            let Some(body) = world.body(coin.id) else { continue };
            if body.position.z > self.boundary_z {
                report.scored.push(coin.id);
            } else if body.position.y < self.dead_zone_y {
                report.lost.push(coin.id);
            }
        }

        for &id in &report.scored {
            if factory.remove(world, id) {
                self.state.score += 1;
                log::debug!("coin {:?} scored (total {})", id, self.state.score);
            }
        }
        for &id in &report.lost {
            if factory.remove(world, id) {
                self.state.lost += 1;
                log::debug!("coin {:?} lost to the dead zone", id);
            }
        }

        report
    }
}
