//! Fixed-timestep physics world
//!
//! Owns every rigid body and advances them deterministically: variable real
//! time is clamped and folded into an accumulator, and only whole fixed steps
//! ever run. Bodies are kept in insertion order (ids are monotonic, so the
//! vec is always sorted by id) and every pipeline stage iterates that order;
//! given the same insertion sequence and inputs, two runs produce the same
//! sequence of states.

use glam::{Quat, Vec3};

use crate::consts::REST_VELOCITY_THRESHOLD;

use super::body::{BodyId, RigidBody};
use super::collision::{Aabb, Contact, test_pair};
use super::policy::ContactPolicy;

/// Penetration tolerated before positional correction kicks in
const PENETRATION_SLOP: f32 = 0.005;
/// Fraction of remaining penetration corrected per step
const POSITION_CORRECTION: f32 = 0.2;
/// Broadphase AABB inflation
const CONTACT_MARGIN: f32 = 0.01;

pub struct PhysicsWorld {
    gravity: Vec3,
    fixed_dt: f32,
    max_frame_dt: f32,
    max_substeps: u32,
    solver_iterations: u32,
    accumulator: f32,
    next_id: u32,
    bodies: Vec<RigidBody>,
    policy: ContactPolicy,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3, fixed_dt: f32) -> Self {
        Self {
            gravity,
            fixed_dt,
            max_frame_dt: crate::consts::MAX_FRAME_DT,
            max_substeps: crate::consts::MAX_SUBSTEPS,
            solver_iterations: 10,
            accumulator: 0.0,
            next_id: 1,
            bodies: Vec::new(),
            policy: ContactPolicy::default(),
        }
    }

    /// Register the material-pair table. Call before simulation starts.
    pub fn set_contact_policy(&mut self, policy: ContactPolicy) {
        self.policy = policy;
    }

    pub fn set_frame_limits(&mut self, max_frame_dt: f32, max_substeps: u32) {
        self.max_frame_dt = max_frame_dt;
        self.max_substeps = max_substeps;
    }

    pub fn set_solver_iterations(&mut self, iterations: u32) {
        self.solver_iterations = iterations.max(1);
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Take ownership of a body, assign its id, return it
    pub fn add_body(&mut self, mut body: RigidBody) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        body.id = id;
        self.bodies.push(body);
        id
    }

    /// Detach a body; `false` if the id is unknown (already removed)
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.bodies.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.index_of(id).map(|i| &mut self.bodies[i])
    }

    /// All bodies in insertion order. Render consumers read position and
    /// orientation from here; they never write.
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    /// Clamp and accumulate a frame's real delta; returns how many fixed
    /// steps the caller should run. Split from [`step`](Self::step) so the
    /// session can interleave actuator advance and score evaluation with
    /// each fixed step.
    pub fn begin_frame(&mut self, real_dt: f32) -> u32 {
        if real_dt <= 0.0 || !real_dt.is_finite() {
            return 0;
        }
        self.accumulator += real_dt.min(self.max_frame_dt);
        let substeps = (self.accumulator / self.fixed_dt) as u32;
        if substeps > self.max_substeps {
            // A slow frame; drop the backlog rather than spiral. The next
            // frame starts from zero so no phantom step runs unbacked by
            // real time.
            self.accumulator = 0.0;
            self.max_substeps
        } else {
            self.accumulator -= substeps as f32 * self.fixed_dt;
            substeps
        }
    }

    /// Advance by real time: accumulate, then run whole fixed steps.
    /// Zero or negative `real_dt` is a no-op. Returns the steps run.
    pub fn step(&mut self, real_dt: f32) -> u32 {
        let substeps = self.begin_frame(real_dt);
        for _ in 0..substeps {
            self.step_once();
        }
        substeps
    }

    /// One fixed step: integrate, collide, resolve
    pub fn step_once(&mut self) {
        let dt = self.fixed_dt;
        self.integrate(dt);
        let contacts = self.generate_contacts();
        self.resolve_contacts(&contacts);
    }

    fn integrate(&mut self, dt: f32) {
        for body in &mut self.bodies {
            // Kinematic positions are prescribed externally each step;
            // integrating them here would double-move the actuator.
            if !body.is_dynamic() {
                continue;
            }

            body.linear_velocity += self.gravity * dt;
            body.linear_velocity /= 1.0 + dt * body.linear_damping;
            body.angular_velocity /= 1.0 + dt * body.angular_damping;

            let new_position = body.position + body.linear_velocity * dt;
            let w = body.angular_velocity;
            let spin = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * body.orientation;
            let new_orientation = (body.orientation + spin * (0.5 * dt)).normalize();

            if new_position.is_finite()
                && new_orientation.is_finite()
                && body.linear_velocity.is_finite()
                && body.angular_velocity.is_finite()
            {
                body.position = new_position;
                body.orientation = new_orientation;
            } else {
                // Local recovery: one bad body must not corrupt contact
                // resolution for everyone else.
                log::warn!("body {:?} went non-finite; freezing it in place", body.id);
                body.freeze();
            }
        }
    }

    /// Broadphase AABB pruning in index order, then exact narrowphase.
    /// Pair order (i < j, ascending) is what keeps resolution deterministic.
    fn generate_contacts(&self) -> Vec<Contact> {
        let aabbs: Vec<Aabb> = self.bodies.iter().map(RigidBody::aabb).collect();
        let mut contacts = Vec::new();
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                if !a.is_dynamic() && !b.is_dynamic() {
                    continue;
                }
                if !aabbs[i].overlaps(&aabbs[j], CONTACT_MARGIN) {
                    continue;
                }
                if let Some(contact) = test_pair(i, j, a, b) {
                    contacts.push(contact);
                }
            }
        }
        contacts
    }

    fn resolve_contacts(&mut self, contacts: &[Contact]) {
        for _ in 0..self.solver_iterations {
            for contact in contacts {
                self.resolve_velocity(contact);
            }
        }
        for contact in contacts {
            self.correct_positions(contact);
        }
    }

    /// Normal impulse plus Coulomb friction clamped by it, applied at the
    /// contact point so friction also spins the bodies.
    fn resolve_velocity(&mut self, contact: &Contact) {
        let params = {
            let (a, b) = (&self.bodies[contact.a], &self.bodies[contact.b]);
            self.policy.lookup(a.material, b.material)
        };
        let (a, b) = pair_mut(&mut self.bodies, contact.a, contact.b);
        let n = contact.normal;
        let ra = contact.point - a.position;
        let rb = contact.point - b.position;

        let relative = |a: &RigidBody, b: &RigidBody| {
            (b.linear_velocity + b.angular_velocity.cross(rb))
                - (a.linear_velocity + a.angular_velocity.cross(ra))
        };

        let vn = relative(a, b).dot(n);
        if vn >= 0.0 {
            return; // already separating
        }

        // Slow head-on contacts settle instead of bouncing
        let e = if -vn < REST_VELOCITY_THRESHOLD { 0.0 } else { params.restitution };

        let denom_n = a.inv_mass
            + b.inv_mass
            + a.inv_inertia * ra.cross(n).length_squared()
            + b.inv_inertia * rb.cross(n).length_squared();
        if denom_n <= 0.0 {
            return;
        }
        let jn = -(1.0 + e) * vn / denom_n;
        apply_impulse(a, b, ra, rb, n * jn);

        // Friction against the updated relative velocity. This is the only
        // mechanism that transfers actuator motion to resting coins.
        let rel = relative(a, b);
        let tangential = rel - n * rel.dot(n);
        let speed = tangential.length();
        if speed < 1e-6 {
            return;
        }
        let t = tangential / speed;
        let denom_t = a.inv_mass
            + b.inv_mass
            + a.inv_inertia * ra.cross(t).length_squared()
            + b.inv_inertia * rb.cross(t).length_squared();
        if denom_t <= 0.0 {
            return;
        }
        let jt = (speed / denom_t).min(params.friction * jn);
        apply_impulse(a, b, ra, rb, -t * jt);
    }

    /// Split positional pushout weighted by inverse mass, with slop so
    /// resting contacts do not jitter
    fn correct_positions(&mut self, contact: &Contact) {
        let (a, b) = pair_mut(&mut self.bodies, contact.a, contact.b);
        let total_inv_mass = a.inv_mass + b.inv_mass;
        if total_inv_mass <= 0.0 {
            return;
        }
        let magnitude =
            (contact.penetration - PENETRATION_SLOP).max(0.0) * POSITION_CORRECTION / total_inv_mass;
        a.position -= contact.normal * (magnitude * a.inv_mass);
        b.position += contact.normal * (magnitude * b.inv_mass);
    }
}

fn apply_impulse(a: &mut RigidBody, b: &mut RigidBody, ra: Vec3, rb: Vec3, impulse: Vec3) {
    a.linear_velocity -= impulse * a.inv_mass;
    a.angular_velocity -= ra.cross(impulse) * a.inv_inertia;
    b.linear_velocity += impulse * b.inv_mass;
    b.angular_velocity += rb.cross(impulse) * b.inv_inertia;
}

/// Two disjoint mutable borrows out of the body vec
fn pair_mut(bodies: &mut [RigidBody], i: usize, j: usize) -> (&mut RigidBody, &mut RigidBody) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = bodies.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::body::{MaterialTag, Shape};
    use std::f32::consts::FRAC_PI_2;

    const GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(GRAVITY, SIM_DT)
    }

    fn coin_at(position: Vec3) -> RigidBody {
        let mut coin = RigidBody::new_dynamic(
            Shape::Cylinder { radius: 0.35, half_height: 0.05 },
            0.2,
            MaterialTag::Coin,
        );
        coin.orientation = glam::Quat::from_rotation_x(-FRAC_PI_2);
        coin.position = position;
        coin
    }

    #[test]
    fn test_free_fall() {
        let mut world = world();
        let id = world.add_body(coin_at(Vec3::new(0.0, 10.0, 0.0)));

        for _ in 0..120 {
            world.step_once();
        }
        let body = world.body(id).unwrap();
        assert!(body.linear_velocity.y < -9.0);
        assert!(body.position.y < 6.0);
    }

    #[test]
    fn test_zero_and_negative_dt_are_noops() {
        let mut world = world();
        let id = world.add_body(coin_at(Vec3::new(0.0, 10.0, 0.0)));

        assert_eq!(world.step(0.0), 0);
        assert_eq!(world.step(-1.0), 0);
        let body = world.body(id).unwrap();
        assert_eq!(body.position.y, 10.0);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_substep_cap_bounds_slow_frames() {
        let mut world = world();
        world.add_body(coin_at(Vec3::new(0.0, 10.0, 0.0)));
        // A ten second stall must not trigger runaway catch-up
        assert_eq!(world.step(10.0), crate::consts::MAX_SUBSTEPS);
    }

    #[test]
    fn test_overloaded_frame_leaves_no_backlog() {
        let mut world = world();
        world.add_body(coin_at(Vec3::new(0.0, 10.0, 0.0)));

        assert_eq!(world.step(10.0), crate::consts::MAX_SUBSTEPS);
        // The dropped backlog must really be gone: a near-zero frame right
        // after a stall has no real time to spend, so no step runs.
        assert_eq!(world.step(1e-9), 0);
        // Simulated time resumes only once real time covers a full step
        assert_eq!(world.step(SIM_DT), 1);
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let mut world = world();
        assert_eq!(world.step(SIM_DT * 1.5), 1);
        // 0.5 left over, plus 0.6 crosses the threshold
        assert_eq!(world.step(SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_nonfinite_body_is_frozen_not_fatal() {
        let mut world = world();
        let bad = world.add_body(coin_at(Vec3::new(1.0, 5.0, 0.0)));
        let good = world.add_body(coin_at(Vec3::new(-1.0, 5.0, 0.0)));

        world.body_mut(bad).unwrap().linear_velocity = Vec3::new(0.0, f32::NAN, 0.0);
        world.step_once();

        let bad = world.body(bad).unwrap();
        assert_eq!(bad.linear_velocity, Vec3::ZERO);
        assert!(bad.position.is_finite());

        // The rest of the world keeps simulating
        let good = world.body(good).unwrap();
        assert!(good.linear_velocity.y < 0.0);
    }

    #[test]
    fn test_lookup_after_removal() {
        let mut world = world();
        let a = world.add_body(coin_at(Vec3::new(0.0, 1.0, 0.0)));
        let b = world.add_body(coin_at(Vec3::new(2.0, 1.0, 0.0)));
        let c = world.add_body(coin_at(Vec3::new(4.0, 1.0, 0.0)));

        assert!(world.remove_body(b));
        assert!(!world.remove_body(b), "second removal is a no-op");
        assert!(world.body(a).is_some());
        assert!(world.body(b).is_none());
        assert_eq!(world.body(c).unwrap().id, c);
    }

    #[test]
    fn test_coin_settles_on_static_floor() {
        let mut world = world();
        let mut floor = RigidBody::new_static(
            Shape::Box { half_extents: Vec3::new(3.0, 0.1, 4.0) },
            MaterialTag::Wall,
        );
        floor.position = Vec3::ZERO;
        world.add_body(floor);
        let id = world.add_body(coin_at(Vec3::new(0.0, 0.5, 0.0)));

        for _ in 0..600 {
            world.step_once();
        }
        let coin = world.body(id).unwrap();
        // Floor top 0.1 plus half thickness 0.05
        assert!((coin.position.y - 0.15).abs() < 0.02, "rest height {}", coin.position.y);
        assert!(coin.linear_velocity.length() < 0.05);
    }

    #[test]
    fn test_static_bodies_never_move() {
        let mut world = world();
        let mut floor = RigidBody::new_static(
            Shape::Box { half_extents: Vec3::new(3.0, 0.1, 4.0) },
            MaterialTag::Wall,
        );
        floor.position = Vec3::ZERO;
        let floor_id = world.add_body(floor);
        world.add_body(coin_at(Vec3::new(0.0, 0.3, 0.0)));

        for _ in 0..240 {
            world.step_once();
        }
        let floor = world.body(floor_id).unwrap();
        assert_eq!(floor.position, Vec3::ZERO);
        assert_eq!(floor.linear_velocity, Vec3::ZERO);
    }
}
