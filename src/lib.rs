//! Coin Pusher - a deterministic rigid-body coin-pusher simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics world, actuator, coins, scoring)
//! - `config`: Data-driven tuning, validated once at startup
//!
//! Rendering, input wiring and score display are external collaborators: they
//! read body transforms and the running score between frames and call
//! [`sim::Session::spawn_coin`] on user input. Nothing in this crate draws.

pub mod config;
pub mod sim;

pub use config::{ConfigError, PusherConfig};
pub use sim::{FrameReport, Session};

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for stable stacking contacts)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Clamp on a single frame's real delta before it feeds the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum fixed substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Cabinet dimensions
    pub const CABINET_WIDTH: f32 = 6.0;
    pub const CABINET_DEPTH: f32 = 8.0;
    pub const CABINET_HEIGHT: f32 = 6.0;
    pub const WALL_THICKNESS: f32 = 0.2;

    /// Coin defaults
    pub const COIN_RADIUS: f32 = 0.35;
    pub const COIN_HALF_THICKNESS: f32 = 0.05;
    pub const COIN_MASS: f32 = 0.2;

    /// Default cap on live coins
    pub const MAX_ACTIVE_COINS: usize = 128;

    /// Below a head-on contact speed of this, restitution is ignored so
    /// resting stacks settle instead of micro-bouncing
    pub const REST_VELOCITY_THRESHOLD: f32 = 0.5;
}
