use crate::components::{DriveControls, Heading, PlayerControlled};
use crate::race::RaceSession;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

pub const MAX_SPEED: f32 = 400.0;
pub const THRUST_RATE: f32 = 600.0;
pub const TURN_RATE: f32 = 3.0;
// Braking thrust is weaker than forward thrust.
pub const BRAKE_FACTOR: f32 = 0.5;

/// Steering and thrust for the local car.
///
/// This only shapes the velocity vector; integration, wall collisions and
/// ambient drag are rapier's job (linear damping on the rigid body).
pub fn steer_player_system(
    time: Res<Time>,
    session: Res<RaceSession>,
    mut query: Query<
        (&DriveControls, &mut Heading, &mut Velocity, &mut Transform),
        With<PlayerControlled>,
    >,
) {
    if !session.is_racing() || session.is_paused() {
        return;
    }

    let dt = time.delta_secs();
    for (controls, mut heading, mut velocity, mut transform) in query.iter_mut() {
        apply_drive_controls(&mut heading, &mut velocity.linvel, controls, dt);
        transform.rotation = Quat::from_rotation_z(heading.angle);
    }
}

/// One tick of the control model, on plain values so it can be exercised
/// without an `App`.
pub fn apply_drive_controls(
    heading: &mut Heading,
    velocity: &mut Vec2,
    controls: &DriveControls,
    dt: f32,
) {
    if controls.turn_left {
        heading.angle += TURN_RATE * dt;
    }
    if controls.turn_right {
        heading.angle -= TURN_RATE * dt;
    }

    let forward = heading.forward_vector();

    if controls.accelerate {
        *velocity += forward * THRUST_RATE * dt;
        *velocity = velocity.clamp_length_max(MAX_SPEED);
    }

    if controls.brake {
        *velocity -= forward * THRUST_RATE * BRAKE_FACTOR * dt;
        *velocity = velocity.clamp_length_max(MAX_SPEED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_no_input_leaves_velocity_untouched() {
        let mut heading = Heading::new(1.0);
        let mut velocity = Vec2::new(120.0, -40.0);

        apply_drive_controls(&mut heading, &mut velocity, &DriveControls::default(), DT);

        assert_eq!(velocity, Vec2::new(120.0, -40.0));
        assert_eq!(heading.angle, 1.0);
    }

    #[test]
    fn test_turning_moves_heading_by_rate_times_dt() {
        let mut heading = Heading::new(0.0);
        let mut velocity = Vec2::ZERO;

        let left = DriveControls {
            turn_left: true,
            ..Default::default()
        };
        apply_drive_controls(&mut heading, &mut velocity, &left, DT);
        assert!((heading.angle - TURN_RATE * DT).abs() < 1e-6);

        let right = DriveControls {
            turn_right: true,
            ..Default::default()
        };
        apply_drive_controls(&mut heading, &mut velocity, &right, DT);
        assert!(heading.angle.abs() < 1e-6);
    }

    #[test]
    fn test_thrust_follows_the_heading() {
        let mut heading = Heading::new(std::f32::consts::FRAC_PI_2);
        let mut velocity = Vec2::ZERO;

        let accelerate = DriveControls {
            accelerate: true,
            ..Default::default()
        };
        apply_drive_controls(&mut heading, &mut velocity, &accelerate, DT);

        assert!(velocity.x.abs() < 1e-3);
        assert!(velocity.y > 0.0);
    }

    #[test]
    fn test_no_input_combination_exceeds_the_speed_cap() {
        let combos = [
            DriveControls {
                accelerate: true,
                ..Default::default()
            },
            DriveControls {
                accelerate: true,
                brake: true,
                ..Default::default()
            },
            DriveControls {
                accelerate: true,
                turn_left: true,
                ..Default::default()
            },
            DriveControls {
                accelerate: true,
                turn_right: true,
                brake: true,
                ..Default::default()
            },
        ];

        for controls in &combos {
            let mut heading = Heading::new(0.3);
            let mut velocity = Vec2::ZERO;
            for _ in 0..10_000 {
                apply_drive_controls(&mut heading, &mut velocity, controls, DT);
                assert!(velocity.length() <= MAX_SPEED + 1e-3);
            }
        }
    }

    #[test]
    fn test_braking_pushes_against_the_heading() {
        let mut heading = Heading::new(0.0);
        let mut velocity = Vec2::new(200.0, 0.0);

        let brake = DriveControls {
            brake: true,
            ..Default::default()
        };
        apply_drive_controls(&mut heading, &mut velocity, &brake, DT);

        assert!(velocity.x < 200.0);
        assert_eq!(velocity.y, 0.0);
    }
}
