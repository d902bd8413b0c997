//! Data-driven simulation tuning
//!
//! One [`PusherConfig`] is supplied at startup and validated once; nothing in
//! here hot-reloads. All the magic numbers the hand-tuned variants of this
//! cabinet disagreed on (dimensions, travel, friction) live here as data.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Configuration rejected at startup. Nothing recovers from these; the
/// session refuses to construct.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("actuator travel limits invalid: min {min} >= max {max}")]
    TravelLimits { min: f32, max: f32 },
    #[error("spawn jitter {jitter} would drop coins outside the enclosure")]
    JitterOutOfBounds { jitter: f32 },
    #[error("fixed timestep {fixed_dt} exceeds the frame clamp {max_frame_dt}")]
    TimestepExceedsClamp { fixed_dt: f32, max_frame_dt: f32 },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Friction/restitution for one material pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactParams {
    pub friction: f32,
    pub restitution: f32,
}

impl ContactParams {
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self { friction, restitution }
    }
}

/// The full contact table. Restitution stays near zero everywhere: the
/// mechanic depends on coins staying where they are pushed. Friction at the
/// coin-actuator pair is the sole mechanism that moves resting coins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContactTableConfig {
    pub coin_actuator: ContactParams,
    pub coin_coin: ContactParams,
    pub coin_wall: ContactParams,
    /// Fallback for any unregistered pair, so every contact resolves
    pub default: ContactParams,
}

impl Default for ContactTableConfig {
    fn default() -> Self {
        Self {
            coin_actuator: ContactParams::new(0.9, 0.0),
            coin_coin: ContactParams::new(0.4, 0.0),
            coin_wall: ContactParams::new(0.5, 0.0),
            default: ContactParams::new(0.2, 0.1),
        }
    }
}

/// Static cabinet geometry. The front face (+z) is intentionally absent:
/// that opening is the collection channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnclosureConfig {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub wall_thickness: f32,
    /// Height of a low lip across the open front; 0 disables it
    pub front_lip_height: f32,
    /// Coins falling below this y are lost, not scored
    pub dead_zone_y: f32,
}

impl Default for EnclosureConfig {
    fn default() -> Self {
        Self {
            width: CABINET_WIDTH,
            depth: CABINET_DEPTH,
            height: CABINET_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            front_lip_height: 0.0,
            dead_zone_y: -5.0,
        }
    }
}

/// How the actuator reciprocates along its travel axis (z)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionRule {
    /// Constant speed, hard reversal at each limit
    Linear { limit_min: f32, limit_max: f32, speed: f32 },
    /// `center + amplitude * sin(phase)`, phase advancing at `angular_speed`
    Sinusoidal { center: f32, amplitude: f32, angular_speed: f32 },
}

impl MotionRule {
    /// Travel bounds implied by the rule
    pub fn limits(&self) -> (f32, f32) {
        match *self {
            MotionRule::Linear { limit_min, limit_max, .. } => (limit_min, limit_max),
            MotionRule::Sinusoidal { center, amplitude, .. } => {
                (center - amplitude, center + amplitude)
            }
        }
    }
}

/// The reciprocating shelf
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Visible half extents (x across the cabinet, y thin, z along travel)
    pub half_extents: Vec3,
    /// Center height of the shelf
    pub height: f32,
    /// Extra collision half-depth beyond the visible volume, closing the gap
    /// a coin could slip through at the extremes of travel
    pub collision_depth_margin: f32,
    pub motion: MotionRule,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(
                CABINET_WIDTH / 2.0 - WALL_THICKNESS,
                0.15,
                1.0,
            ),
            height: 1.0,
            collision_depth_margin: 0.5,
            motion: MotionRule::Linear {
                limit_min: -2.0,
                limit_max: 0.0,
                speed: 1.5,
            },
        }
    }
}

/// Dynamic disc bodies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoinConfig {
    pub radius: f32,
    pub half_thickness: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Bounded lateral offset applied at spawn so coins never start in an
    /// exactly stacked, numerically degenerate contact
    pub spawn_jitter: f32,
    /// Bound on the random initial angular velocity (rad/s per axis)
    pub spawn_spin: f32,
    /// Drop height above the actuator top
    pub drop_height: f32,
    pub max_active: usize,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self {
            radius: COIN_RADIUS,
            half_thickness: COIN_HALF_THICKNESS,
            mass: COIN_MASS,
            linear_damping: 0.3,
            angular_damping: 0.3,
            spawn_jitter: 0.25,
            spawn_spin: 1.0,
            drop_height: 1.5,
            max_active: MAX_ACTIVE_COINS,
        }
    }
}

/// Complete simulation configuration, supplied once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PusherConfig {
    /// Seed for spawn jitter; same seed + same inputs = same run
    pub seed: u64,
    pub gravity: Vec3,
    pub fixed_dt: f32,
    pub max_frame_dt: f32,
    pub max_substeps: u32,
    pub solver_iterations: u32,
    pub enclosure: EnclosureConfig,
    pub actuator: ActuatorConfig,
    pub coin: CoinConfig,
    pub contacts: ContactTableConfig,
}

impl Default for PusherConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            gravity: Vec3::new(0.0, -9.82, 0.0),
            fixed_dt: SIM_DT,
            max_frame_dt: MAX_FRAME_DT,
            max_substeps: MAX_SUBSTEPS,
            solver_iterations: 10,
            enclosure: EnclosureConfig::default(),
            actuator: ActuatorConfig::default(),
            coin: CoinConfig::default(),
            contacts: ContactTableConfig::default(),
        }
    }
}

impl PusherConfig {
    /// Parse from a JSON document; absent fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that would make the simulation unrunnable. Called by
    /// `Session::new`; nothing else recovers from these.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::NonPositive { field, value })
            }
        }

        positive("fixed_dt", self.fixed_dt)?;
        if self.max_frame_dt < self.fixed_dt {
            return Err(ConfigError::TimestepExceedsClamp {
                fixed_dt: self.fixed_dt,
                max_frame_dt: self.max_frame_dt,
            });
        }
        positive("solver_iterations", self.solver_iterations as f32)?;

        let e = &self.enclosure;
        positive("enclosure.width", e.width)?;
        positive("enclosure.depth", e.depth)?;
        positive("enclosure.height", e.height)?;
        positive("enclosure.wall_thickness", e.wall_thickness)?;

        let a = &self.actuator;
        positive("actuator.half_extents.x", a.half_extents.x)?;
        positive("actuator.half_extents.y", a.half_extents.y)?;
        positive("actuator.half_extents.z", a.half_extents.z)?;
        match a.motion {
            MotionRule::Linear { limit_min, limit_max, speed } => {
                if limit_min >= limit_max {
                    return Err(ConfigError::TravelLimits { min: limit_min, max: limit_max });
                }
                if speed < 0.0 || !speed.is_finite() {
                    return Err(ConfigError::NonPositive { field: "actuator.speed", value: speed });
                }
            }
            MotionRule::Sinusoidal { amplitude, angular_speed, .. } => {
                positive("actuator.amplitude", amplitude)?;
                if angular_speed < 0.0 || !angular_speed.is_finite() {
                    return Err(ConfigError::NonPositive {
                        field: "actuator.angular_speed",
                        value: angular_speed,
                    });
                }
            }
        }

        let c = &self.coin;
        positive("coin.radius", c.radius)?;
        positive("coin.half_thickness", c.half_thickness)?;
        positive("coin.mass", c.mass)?;
        if c.spawn_jitter < 0.0
            || c.spawn_jitter + c.radius > e.width / 2.0 - e.wall_thickness
        {
            return Err(ConfigError::JitterOutOfBounds { jitter: c.spawn_jitter });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        PusherConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn test_inverted_travel_limits_rejected() {
        let mut config = PusherConfig::default();
        config.actuator.motion = MotionRule::Linear {
            limit_min: 1.0,
            limit_max: -1.0,
            speed: 1.0,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TravelLimits { .. })
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut config = PusherConfig::default();
        config.enclosure.width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "enclosure.width", .. })
        ));
    }

    #[test]
    fn test_excessive_jitter_rejected() {
        let mut config = PusherConfig::default();
        config.coin.spawn_jitter = 10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::JitterOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = PusherConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = PusherConfig::from_json(&json).unwrap();
        assert_eq!(parsed.coin.radius, config.coin.radius);
        assert_eq!(parsed.actuator.motion, config.actuator.motion);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = PusherConfig::from_json(r#"{"seed": 7}"#).unwrap();
        assert_eq!(parsed.seed, 7);
        assert_eq!(parsed.enclosure.width, CABINET_WIDTH);
    }
}
