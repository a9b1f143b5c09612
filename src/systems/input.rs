use crate::components::{DriveControls, PlayerControlled};
use crate::race::RaceSession;
use bevy::prelude::*;

pub fn player_input_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut DriveControls, With<PlayerControlled>>,
) {
    if let Ok(mut controls) = query.get_single_mut() {
        controls.turn_left =
            keyboard_input.pressed(KeyCode::KeyA) || keyboard_input.pressed(KeyCode::ArrowLeft);
        controls.turn_right =
            keyboard_input.pressed(KeyCode::KeyD) || keyboard_input.pressed(KeyCode::ArrowRight);
        controls.accelerate =
            keyboard_input.pressed(KeyCode::KeyW) || keyboard_input.pressed(KeyCode::ArrowUp);
        controls.brake =
            keyboard_input.pressed(KeyCode::KeyS) || keyboard_input.pressed(KeyCode::ArrowDown);
    }
}

// Escape gates the session's own tick processing; rapier and rendering
// keep running underneath.
pub fn pause_input_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<RaceSession>,
) {
    if keyboard_input.just_pressed(KeyCode::Escape) {
        let paused = !session.is_paused();
        session.set_paused(paused);
        if paused {
            info!("Race paused");
        } else {
            info!("Race resumed");
        }
    }
}
