// resources.rs
use bevy::prelude::*;
use std::collections::VecDeque;

/// Axis-aligned checkpoint gate.
#[derive(Clone, Copy, Debug)]
pub struct CheckpointRegion {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl CheckpointRegion {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let delta = point - self.center;
        delta.x.abs() < self.half_extents.x && delta.y.abs() < self.half_extents.y
    }
}

/// Circuit geometry: a rectangular corridor between the outer walls and a
/// central island, with gates placed around it in driving order.
#[derive(Resource, Clone)]
pub struct TrackLayout {
    pub arena_half: Vec2,
    pub island_half: Vec2,
    pub checkpoints: Vec<CheckpointRegion>,
    pub player_start: Vec2,
    pub rival_starts: Vec<Vec2>,
    pub start_heading: f32,
}

impl Default for TrackLayout {
    fn default() -> Self {
        // Corridor is the ring between the 1200x680 arena and the 600x300
        // island; gates span the full corridor width so a car cannot slip
        // past one. Driving order is counterclockwise from the bottom
        // straight, so the lap closes on gate 5.
        Self {
            arena_half: Vec2::new(600.0, 340.0),
            island_half: Vec2::new(300.0, 150.0),
            checkpoints: vec![
                CheckpointRegion::new(Vec2::new(250.0, -245.0), Vec2::new(50.0, 95.0)),
                CheckpointRegion::new(Vec2::new(450.0, 0.0), Vec2::new(150.0, 50.0)),
                CheckpointRegion::new(Vec2::new(250.0, 245.0), Vec2::new(50.0, 95.0)),
                CheckpointRegion::new(Vec2::new(-250.0, 245.0), Vec2::new(50.0, 95.0)),
                CheckpointRegion::new(Vec2::new(-450.0, 0.0), Vec2::new(150.0, 50.0)),
                CheckpointRegion::new(Vec2::new(-250.0, -245.0), Vec2::new(50.0, 95.0)),
            ],
            player_start: Vec2::new(0.0, -245.0),
            rival_starts: vec![
                Vec2::new(-70.0, -215.0),
                Vec2::new(-70.0, -275.0),
                Vec2::new(-140.0, -245.0),
            ],
            start_heading: 0.0,
        }
    }
}

/// One record for the notification sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

/// FIFO handed to the presentation layer; this core only produces the
/// records, it never renders them.
#[derive(Resource, Default)]
pub struct Notifications {
    pending: VecDeque<Notification>,
}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        self.pending.push_back(notification);
    }

    pub fn pop(&mut self) -> Option<Notification> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_containment() {
        let region = CheckpointRegion::new(Vec2::new(100.0, 0.0), Vec2::new(50.0, 95.0));

        assert!(region.contains(Vec2::new(100.0, 0.0)));
        assert!(region.contains(Vec2::new(140.0, -90.0)));
        assert!(!region.contains(Vec2::new(151.0, 0.0)));
        assert!(!region.contains(Vec2::new(100.0, 96.0)));
    }

    #[test]
    fn test_default_layout_is_a_valid_circuit() {
        let layout = TrackLayout::default();

        assert!(!layout.checkpoints.is_empty());
        // Every gate sits inside the arena and outside the island.
        for gate in &layout.checkpoints {
            assert!(gate.center.x.abs() <= layout.arena_half.x);
            assert!(gate.center.y.abs() <= layout.arena_half.y);
            assert!(
                gate.center.x.abs() > layout.island_half.x
                    || gate.center.y.abs() > layout.island_half.y
            );
        }
    }
}
