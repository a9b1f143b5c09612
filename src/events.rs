use bevy::prelude::*;

use crate::race::RaceResult;

// Fired once per completed lap, as the player wraps back to gate 0.
#[derive(Event)]
pub struct LapCompleted {
    pub lap: u32,
    pub elapsed_secs: f32,
}

// Fired exactly once, when the lap target is reached.
#[derive(Event)]
pub struct RaceFinished {
    pub result: RaceResult,
}
