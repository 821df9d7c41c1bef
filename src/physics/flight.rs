//! Rigid-body flight model for the player ship.
//!
//! The orientation is stored as three explicit basis vectors (right/up/front)
//! that are re-orthonormalized every tick; consumers get a quaternion derived
//! from the basis with a 180° yaw correction to match the render convention.
//! Yaw is the only steered axis, roll is derived from it for the banked-turn
//! feel and thrust is the only modeled force besides exponential damping.

use bevy_ecs::prelude::*;
use glam::{Mat3, Quat, Vec3};

use crate::config::FlightConfig;
use crate::input::ControlSnapshot;
use crate::physics::collision::{resolve_quad, CollisionData};

/// Player ship rigid body.
#[derive(Component, Debug, Clone)]
pub struct FlightBody {
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,

    right: Vec3,
    up: Vec3,
    front: Vec3,
    forward: Vec3,
    world_up: Vec3,

    yaw_vel: f32,
    roll_vel: f32,
    thrust_magnitude: f32,

    mass: f32,
    radius: f32,
    thrust_max: f32,
    thrust_rise_rate: f32,
    thrust_fall_rate: f32,
    rotation_speed: f32,
    damping: f32,
    roll_coupling: f32,
}

impl FlightBody {
    /// Creates a body at `position` with the default tunables.
    pub fn new(position: Vec3, mass: f32, radius: f32) -> Self {
        let config = FlightConfig {
            mass,
            radius,
            ..FlightConfig::default()
        };
        Self::from_config(&config, position)
    }

    /// Creates a body at `position` from a full tunable set.
    pub fn from_config(config: &FlightConfig, position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            right: Vec3::X,
            up: Vec3::Y,
            front: Vec3::Z,
            forward: Vec3::Z,
            world_up: Vec3::Y,
            yaw_vel: 0.0,
            roll_vel: 0.0,
            thrust_magnitude: 0.0,
            mass: config.mass,
            radius: config.radius,
            thrust_max: config.thrust_max,
            thrust_rise_rate: config.thrust_rise_rate,
            thrust_fall_rate: config.thrust_fall_rate,
            rotation_speed: config.rotation_speed,
            damping: config.damping,
            roll_coupling: config.roll_coupling,
        }
    }

    /// Advances the body by `dt` seconds: input, integration, then collision
    /// against every surface in order. Call at most once per frame.
    pub fn update(&mut self, controls: &ControlSnapshot, dt: f32, surfaces: &[&CollisionData]) {
        self.process_input(controls, dt);
        self.process_velocities(dt);
        for surface in surfaces {
            self.process_collision(surface);
        }
    }

    fn process_input(&mut self, controls: &ControlSnapshot, dt: f32) {
        if controls.steer_left {
            self.yaw_vel -= self.rotation_speed * dt;
        }
        if controls.steer_right {
            self.yaw_vel += self.rotation_speed * dt;
        }
        if controls.forward {
            self.thrust_magnitude =
                (self.thrust_magnitude + self.thrust_rise_rate * dt).min(self.thrust_max);
        } else {
            self.thrust_magnitude = (self.thrust_magnitude - self.thrust_fall_rate * dt).max(0.0);
        }
    }

    fn process_velocities(&mut self, dt: f32) {
        // Banking: roll follows yaw, it is never steered directly.
        self.roll_vel = self.yaw_vel * self.roll_coupling;

        let yaw_rotation = Quat::from_axis_angle(self.world_up, self.yaw_vel * dt);
        self.forward = (yaw_rotation * self.forward).normalize();
        let world_right = (self.world_up.cross(self.forward)).normalize();
        self.front = yaw_rotation * self.front;
        self.right = Quat::from_axis_angle(self.forward, self.roll_vel * dt) * world_right;
        self.up = self.front.cross(self.right).normalize();

        let thrust = self.forward * self.thrust_magnitude;
        let force = thrust;
        self.acceleration = force / self.mass;

        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;

        let damping = self.damping.powf(dt);
        self.velocity *= damping;
        self.yaw_vel *= damping;
        self.roll_vel *= damping;
    }

    fn process_collision(&mut self, surface: &CollisionData) {
        for quad in &surface.quads {
            if let Some(contact) = resolve_quad(quad, self.position, self.velocity, self.radius) {
                self.position = contact.position;
                self.velocity = contact.velocity;
            }
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation as a quaternion. The basis faces +Z while the ship mesh
    /// faces -Z, hence the 180° yaw correction.
    pub fn orientation(&self) -> Quat {
        let basis = Quat::from_mat3(&Mat3::from_cols(self.right, self.up, self.front));
        basis * Quat::from_rotation_y(std::f32::consts::PI)
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn thrust(&self) -> f32 {
        self.thrust_magnitude
    }

    pub fn thrust_max(&self) -> f32 {
        self.thrust_max
    }

    /// Thrust as a fraction of the maximum, in [0, 1]. Drives the exhaust
    /// emitter and the host's audio pitch.
    pub fn thrust_fraction(&self) -> f32 {
        if self.thrust_max > 0.0 {
            self.thrust_magnitude / self.thrust_max
        } else {
            0.0
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn held_forward() -> ControlSnapshot {
        ControlSnapshot {
            forward: true,
            ..Default::default()
        }
    }

    fn assert_orthonormal(body: &FlightBody) {
        assert!((body.right().length() - 1.0).abs() < 1e-4, "|right| = {}", body.right().length());
        assert!((body.up().length() - 1.0).abs() < 1e-4, "|up| = {}", body.up().length());
        assert!((body.front().length() - 1.0).abs() < 1e-4, "|front| = {}", body.front().length());
        assert!(body.right().dot(body.up()).abs() < 1e-4);
        assert!(body.right().dot(body.front()).abs() < 1e-4);
        assert!(body.up().dot(body.front()).abs() < 1e-4);
    }

    #[test]
    fn test_initial_basis() {
        let body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        assert_eq!(body.right(), Vec3::X);
        assert_eq!(body.up(), Vec3::Y);
        assert_eq!(body.front(), Vec3::Z);
        assert_eq!(body.velocity(), Vec3::ZERO);
        assert_eq!(body.thrust(), 0.0);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut body = FlightBody::new(Vec3::new(1.0, 2.0, 3.0), 1.0, 0.1);
        body.update(&held_forward(), 0.0, &[]);
        assert_eq!(body.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.velocity(), Vec3::ZERO);
        assert_eq!(body.thrust(), 0.0);
    }

    #[test]
    fn test_thrust_ramp_up_and_decay() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);

        // Hold forward for one second: +100 units.
        for _ in 0..60 {
            body.process_input(&held_forward(), DT);
        }
        assert!((body.thrust() - 100.0).abs() < 0.5);

        // Release for half a second: -100 units (double rate).
        for _ in 0..30 {
            body.process_input(&ControlSnapshot::RELEASED, DT);
        }
        assert!(body.thrust().abs() < 0.5);

        // Never below zero.
        body.process_input(&ControlSnapshot::RELEASED, 1.0);
        assert_eq!(body.thrust(), 0.0);
    }

    #[test]
    fn test_thrust_clamped_to_max() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        body.process_input(&held_forward(), 100.0);
        assert_eq!(body.thrust(), body.thrust_max());
    }

    #[test]
    fn test_full_thrust_accelerates_along_forward() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);

        let mut last_speed = 0.0f32;
        for _ in 0..60 {
            body.update(&held_forward(), DT, &[]);
            let speed = body.velocity().length();
            assert!(speed >= last_speed, "speed must rise monotonically");
            last_speed = speed;
        }

        // Straight flight: all motion along the initial +Z forward axis.
        assert!(body.position().z > 0.0);
        assert!(body.position().x.abs() < 1e-4);
        assert!(body.position().y.abs() < 1e-4);
        // Damping keeps the speed strictly under the undamped bound.
        assert!(last_speed < body.thrust_max() / body.mass());
    }

    #[test]
    fn test_yaw_input_turns_and_banks() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        let steer = ControlSnapshot {
            steer_right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            body.update(&steer, DT, &[]);
        }
        // Forward has rotated away from +Z about world up.
        assert!(body.forward().x.abs() > 1e-3);
        assert!((body.forward().length() - 1.0).abs() < 1e-5);
        // Banking tilts right off the horizontal plane.
        assert!(body.right().y.abs() > 1e-5);
        assert_orthonormal(&body);
    }

    #[test]
    fn test_basis_stays_orthonormal_under_mixed_input() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        let inputs = [
            ControlSnapshot { forward: true, steer_left: true, steer_right: false },
            ControlSnapshot { forward: true, steer_left: false, steer_right: true },
            ControlSnapshot { forward: false, steer_left: true, steer_right: true },
            ControlSnapshot::RELEASED,
        ];
        for i in 0..600 {
            body.update(&inputs[i % inputs.len()], DT, &[]);
        }
        assert_orthonormal(&body);
    }

    #[test]
    fn test_velocity_decays_without_thrust() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        for _ in 0..30 {
            body.update(&held_forward(), DT, &[]);
        }
        let initial_speed = body.velocity().length();
        assert!(initial_speed > 0.0);

        // damping^t with damping = 0.05 collapses speed fast once thrust is
        // gone; three simulated seconds is far beyond -ln(1e-3)/-ln(0.05).
        for _ in 0..180 {
            body.update(&ControlSnapshot::RELEASED, DT, &[]);
        }
        assert!(body.velocity().length() < initial_speed * 1e-3);
    }

    #[test]
    fn test_orientation_unit_quaternion() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        let steer = ControlSnapshot {
            forward: true,
            steer_left: true,
            steer_right: false,
        };
        for _ in 0..45 {
            body.update(&steer, DT, &[]);
        }
        assert!((body.orientation().length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_orientation_yaw_correction_at_rest() {
        // Identity basis must map to a pure 180° yaw.
        let body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        let expected = Quat::from_rotation_y(std::f32::consts::PI);
        let q = body.orientation();
        assert!(q.dot(expected).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn test_descent_onto_floor_slides() {
        use crate::physics::collision::CollisionQuad;

        let floor = CollisionData::new(vec![CollisionQuad {
            vertices: [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 10.0),
            ],
            normal: Vec3::Y,
        }]);

        let mut body = FlightBody::new(Vec3::new(5.0, 0.5, 5.0), 1.0, 0.1);
        // Descend through the plane in one tick.
        body.velocity = Vec3::new(0.0, -48.0, 0.0);
        body.update(&ControlSnapshot::RELEASED, DT, &[&floor]);

        assert!((body.position().y - 0.1).abs() < 0.01);
        assert!(body.velocity().y.abs() < 1e-5);
    }

    #[test]
    fn test_thrust_fraction_range() {
        let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
        assert_eq!(body.thrust_fraction(), 0.0);
        body.process_input(&held_forward(), 100.0);
        assert_eq!(body.thrust_fraction(), 1.0);
    }
}
