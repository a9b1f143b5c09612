use crate::components::{AiDriver, Heading};
use crate::race::RaceSession;
use crate::resources::TrackLayout;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

pub const AI_BASE_SPEED: f32 = 200.0;
/// Speed gap between consecutive rivals on the grid.
pub const AI_SPEED_STEP: f32 = 20.0;

/// Memoryless pursuit: every rival drives straight at the checkpoint the
/// session currently expects, at its own fixed speed. No path planning,
/// no avoidance; bumping into walls or cars is resolved by rapier.
pub fn ai_steering_system(
    session: Res<RaceSession>,
    track: Res<TrackLayout>,
    mut query: Query<(&AiDriver, &mut Heading, &mut Velocity, &mut Transform)>,
) {
    if !session.is_racing() || session.is_paused() {
        return;
    }

    let target = track.checkpoints[session.next_checkpoint()].center;

    for (driver, mut heading, mut velocity, mut transform) in query.iter_mut() {
        let position = transform.translation.truncate();
        let pursuit = pursuit_velocity(position, target, AI_BASE_SPEED + driver.speed_offset);

        if pursuit != Vec2::ZERO {
            heading.angle = pursuit.y.atan2(pursuit.x);
        }
        velocity.linvel = pursuit;
        transform.rotation = Quat::from_rotation_z(heading.angle);
    }
}

/// Velocity of magnitude `speed` along the bearing from `position` to
/// `target`. Zero when the two coincide.
pub fn pursuit_velocity(position: Vec2, target: Vec2, speed: f32) -> Vec2 {
    (target - position).normalize_or_zero() * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_differentiate_speeds_but_not_bearings() {
        let position = Vec2::new(0.0, 0.0);
        let target = Vec2::new(300.0, 400.0);

        let velocities: Vec<Vec2> = [0.0, 20.0, 40.0]
            .iter()
            .map(|offset| pursuit_velocity(position, target, AI_BASE_SPEED + offset))
            .collect();

        assert!((velocities[0].length() - 200.0).abs() < 1e-3);
        assert!((velocities[1].length() - 220.0).abs() < 1e-3);
        assert!((velocities[2].length() - 240.0).abs() < 1e-3);

        let bearing = (target - position).normalize();
        for velocity in &velocities {
            assert!(velocity.normalize().distance(bearing) < 1e-5);
        }
    }

    #[test]
    fn test_pursuit_from_the_target_itself_is_zero() {
        let position = Vec2::new(50.0, -20.0);
        assert_eq!(pursuit_velocity(position, position, 240.0), Vec2::ZERO);
    }
}
