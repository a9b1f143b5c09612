//! Race session: countdown, checkpoint ordering, lap counting, finish.

use bevy::prelude::*;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Delay between session creation and the green light.
pub const COUNTDOWN_SECS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    Pending,
    Racing,
    Finished,
}

/// Configuration problems caught when a session is created.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    NoCheckpoints,
    ZeroLapTarget,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoCheckpoints => write!(f, "track has no checkpoints"),
            SessionError::ZeroLapTarget => write!(f, "lap target must be at least 1"),
        }
    }
}

impl Error for SessionError {}

/// Progress reported back to the caller as the session advances.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Started,
    LapCompleted { lap: u32, elapsed_secs: f32 },
    Finished { laps: u32, elapsed_secs: f32 },
}

/// Final record for a finished race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub elapsed_secs: f32,
    pub laps: u32,
    pub placement: u32,
}

/// One race from countdown to finish.
///
/// Only entering the checkpoint whose index equals `next_checkpoint`
/// advances progress; anything else is ignored. The session holds no
/// reference to entities or track geometry, so several can live side by
/// side and the whole thing is testable without an `App`.
#[derive(Debug, Resource)]
pub struct RaceSession {
    checkpoint_count: usize,
    lap_target: u32,
    phase: RacePhase,
    next_checkpoint: usize,
    lap: u32,
    elapsed_secs: f32,
    countdown: Timer,
    paused: bool,
}

impl RaceSession {
    pub fn new(checkpoint_count: usize, lap_target: u32) -> Result<Self, SessionError> {
        if checkpoint_count == 0 {
            return Err(SessionError::NoCheckpoints);
        }
        if lap_target == 0 {
            return Err(SessionError::ZeroLapTarget);
        }

        Ok(Self {
            checkpoint_count,
            lap_target,
            phase: RacePhase::Pending,
            next_checkpoint: 0,
            lap: 0,
            elapsed_secs: 0.0,
            countdown: Timer::from_seconds(COUNTDOWN_SECS, TimerMode::Once),
            paused: false,
        })
    }

    /// Advance the session clock by one frame. While paused this is a no-op.
    pub fn tick(&mut self, delta: Duration) -> Option<Progress> {
        if self.paused {
            return None;
        }

        match self.phase {
            RacePhase::Pending => {
                self.countdown.tick(delta);
                if self.countdown.just_finished() {
                    self.phase = RacePhase::Racing;
                    return Some(Progress::Started);
                }
                None
            }
            RacePhase::Racing => {
                self.elapsed_secs += delta.as_secs_f32();
                None
            }
            RacePhase::Finished => None,
        }
    }

    /// Record that the local player entered checkpoint `index`.
    ///
    /// Out-of-order entries never change state. Callers must report an
    /// entry only once per occupancy (see `GateMembership`); this method
    /// trusts that each call is a fresh crossing.
    pub fn enter_checkpoint(&mut self, index: usize) -> Vec<Progress> {
        if self.paused || self.phase != RacePhase::Racing || index != self.next_checkpoint {
            return Vec::new();
        }

        self.next_checkpoint = (self.next_checkpoint + 1) % self.checkpoint_count;
        if self.next_checkpoint != 0 {
            return Vec::new();
        }

        // Wrapped back to the first gate: one full lap done.
        self.lap += 1;
        let mut progress = vec![Progress::LapCompleted {
            lap: self.lap,
            elapsed_secs: self.elapsed_secs,
        }];

        if self.lap >= self.lap_target {
            self.phase = RacePhase::Finished;
            progress.push(Progress::Finished {
                laps: self.lap,
                elapsed_secs: self.elapsed_secs,
            });
        }

        progress
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn is_racing(&self) -> bool {
        self.phase == RacePhase::Racing
    }

    pub fn next_checkpoint(&self) -> usize {
        self.next_checkpoint
    }

    pub fn lap(&self) -> u32 {
        self.lap
    }

    pub fn lap_target(&self) -> u32 {
        self.lap_target
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoint_count
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }
}
