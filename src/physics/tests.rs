#[cfg(test)]
mod property_tests {
    use crate::input::ControlSnapshot;
    use crate::physics::collision::{resolve_quad, CollisionQuad, PUSH_OUT_EPSILON};
    use crate::physics::FlightBody;
    use glam::Vec3;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn floor_quad() -> CollisionQuad {
        CollisionQuad {
            vertices: [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 10.0),
            ],
            normal: Vec3::Y,
        }
    }

    proptest! {
        #[test]
        fn basis_orthonormal_after_any_input_sequence(
            inputs in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..200)
        ) {
            let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
            for (forward, steer_left, steer_right) in inputs {
                let controls = ControlSnapshot { forward, steer_left, steer_right };
                body.update(&controls, DT, &[]);
            }
            prop_assert!((body.right().length() - 1.0).abs() < 1e-3);
            prop_assert!((body.up().length() - 1.0).abs() < 1e-3);
            prop_assert!((body.front().length() - 1.0).abs() < 1e-3);
            prop_assert!(body.right().dot(body.up()).abs() < 1e-3);
            prop_assert!(body.right().dot(body.front()).abs() < 1e-3);
            prop_assert!(body.up().dot(body.front()).abs() < 1e-3);
        }

        #[test]
        fn yaw_only_velocity_decays_to_zero(steer_ticks in 1usize..120) {
            let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
            let steer = ControlSnapshot { steer_right: true, ..Default::default() };
            for _ in 0..steer_ticks {
                body.update(&steer, DT, &[]);
            }
            // Zero thrust: any linear velocity must stay zero, and angular
            // velocity decays within a bounded number of coast ticks.
            prop_assert!(body.velocity().length() < 1e-4);
            for _ in 0..240 {
                body.update(&ControlSnapshot::RELEASED, DT, &[]);
            }
            prop_assert!(body.forward().length() > 0.99);
        }

        #[test]
        fn push_out_lands_on_offset_plane(
            x in 0.0f32..10.0,
            z in -20.0f32..20.0,
            depth in 0.01f32..0.9,
            radius in 0.05f32..0.3,
            vx in -10.0f32..10.0,
            vy in -50.0f32..-0.1,
            vz in -10.0f32..10.0,
        ) {
            let quad = floor_quad();
            let position = Vec3::new(x, radius - depth, z);
            let velocity = Vec3::new(vx, vy, vz);
            let contact = resolve_quad(&quad, position, velocity, radius);
            prop_assert!(contact.is_some());
            let contact = contact.unwrap();
            // On (or epsilon outside) the radius-offset plane.
            prop_assert!((contact.position.y - (radius + PUSH_OUT_EPSILON)).abs() < 1e-4);
            // No remaining velocity along the normal, tangent preserved.
            prop_assert!(contact.velocity.y.abs() < 1e-4);
            prop_assert!((contact.velocity.x - vx).abs() < 1e-4);
            prop_assert!((contact.velocity.z - vz).abs() < 1e-4);
        }

        #[test]
        fn deep_contacts_are_ignored(
            x in 0.0f32..10.0,
            depth in 1.05f32..50.0,
        ) {
            let quad = floor_quad();
            let radius = 0.1;
            let position = Vec3::new(x, radius - depth, 5.0);
            prop_assert!(resolve_quad(&quad, position, Vec3::NEG_Y, radius).is_none());
        }

        #[test]
        fn thrust_ramp_matches_rates(hold_ticks in 1usize..600) {
            let mut body = FlightBody::new(Vec3::ZERO, 1.0, 0.1);
            let held = ControlSnapshot { forward: true, ..Default::default() };
            for _ in 0..hold_ticks {
                body.update(&held, DT, &[]);
            }
            let expected = (100.0 * hold_ticks as f32 * DT).min(body.thrust_max());
            prop_assert!((body.thrust() - expected).abs() < 0.1);
            prop_assert!(body.thrust() <= body.thrust_max());
        }
    }
}
