//! Per-material-pair contact parameters
//!
//! Friction is the whole game here: it is what lets the actuator carry
//! resting coins instead of sliding under them. Source variants that nudged
//! coin velocities near the actuator were papering over an under-tuned pair
//! in this table; the nudge is deliberately not reproduced.

use std::collections::HashMap;

use crate::config::{ContactParams, ContactTableConfig};

use super::body::MaterialTag;

/// Table of friction/restitution per unordered material pair, with a default
/// entry so every contact resolves. Registered into the world before the
/// simulation starts; lookup only, never iterated, so the map cannot affect
/// determinism.
#[derive(Debug, Clone)]
pub struct ContactPolicy {
    pairs: HashMap<(MaterialTag, MaterialTag), ContactParams>,
    default: ContactParams,
}

impl ContactPolicy {
    pub fn new(default: ContactParams) -> Self {
        Self { pairs: HashMap::new(), default }
    }

    /// Register a pair in either order
    pub fn register(&mut self, a: MaterialTag, b: MaterialTag, params: ContactParams) {
        self.pairs.insert(Self::key(a, b), params);
    }

    /// Parameters for a colliding pair; unregistered pairs get the default
    pub fn lookup(&self, a: MaterialTag, b: MaterialTag) -> ContactParams {
        self.pairs.get(&Self::key(a, b)).copied().unwrap_or(self.default)
    }

    fn key(a: MaterialTag, b: MaterialTag) -> (MaterialTag, MaterialTag) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Build the policy from the configured table
    pub fn from_config(config: &ContactTableConfig) -> Self {
        let mut policy = Self::new(config.default);
        policy.register(MaterialTag::Coin, MaterialTag::Actuator, config.coin_actuator);
        policy.register(MaterialTag::Coin, MaterialTag::Coin, config.coin_coin);
        policy.register(MaterialTag::Coin, MaterialTag::Wall, config.coin_wall);
        policy
    }
}

impl Default for ContactPolicy {
    fn default() -> Self {
        Self::from_config(&ContactTableConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_order_independent() {
        let policy = ContactPolicy::default();
        let ab = policy.lookup(MaterialTag::Coin, MaterialTag::Actuator);
        let ba = policy.lookup(MaterialTag::Actuator, MaterialTag::Coin);
        assert_eq!(ab, ba);
        assert!(ab.friction >= 0.6, "coin-actuator pair must be high friction");
    }

    #[test]
    fn test_unregistered_pair_falls_back_to_default() {
        let policy = ContactPolicy::default();
        // Wall-wall is never registered; walls do not collide with each other
        // in practice, but the default must still cover the pair.
        let params = policy.lookup(MaterialTag::Wall, MaterialTag::Wall);
        assert_eq!(params, ContactTableConfig::default().default);
    }

    #[test]
    fn test_restitution_near_zero_for_registered_pairs() {
        let policy = ContactPolicy::default();
        for (a, b) in [
            (MaterialTag::Coin, MaterialTag::Actuator),
            (MaterialTag::Coin, MaterialTag::Coin),
            (MaterialTag::Coin, MaterialTag::Wall),
        ] {
            assert!(policy.lookup(a, b).restitution <= 0.1);
        }
    }
}
