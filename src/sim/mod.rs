//! Deterministic simulation module
//!
//! All gameplay-relevant physics lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (bodies by insertion id, coins by spawn order)
//! - No rendering or platform dependencies

pub mod actuator;
pub mod body;
pub mod coins;
pub mod collision;
pub mod enclosure;
pub mod policy;
pub mod score;
pub mod session;
pub mod world;

pub use actuator::Actuator;
pub use body::{BodyId, BodyKind, MaterialTag, RigidBody, Shape};
pub use coins::{Coin, CoinFactory, SpawnError};
pub use collision::{Aabb, Contact};
pub use enclosure::Enclosure;
pub use policy::ContactPolicy;
pub use score::{EvalReport, ScoreEvaluator, ScoreState};
pub use session::{FrameReport, Session};
pub use world::PhysicsWorld;
