use std::collections::VecDeque;

use nav_core::Vec3;
use nav_mesh::Corridor;
use serde::{Deserialize, Serialize};

use crate::config::{FollowerConfig, OvershootPolicy};

/// What a single `PathFollower::advance` call did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "waypoint", rename_all = "snake_case")]
pub enum FollowStep {
    /// Nothing to follow, or the step inputs were unusable.
    Idle,
    /// Moved toward the head waypoint.
    Moving,
    /// Consumed a waypoint; more remain.
    Reached(Vec3),
    /// Consumed the final waypoint.
    Arrived(Vec3),
}

/// Consumes a corridor one waypoint at a time, moving a position toward the head.
///
/// A tick either moves or consumes, never both. Replacing the corridor swaps the whole
/// waypoint queue, so a tick always sees either the old corridor or the new one.
#[derive(Debug, Clone, Default)]
pub struct PathFollower {
    config: FollowerConfig,
    waypoints: VecDeque<Vec3>,
}

impl PathFollower {
    pub fn new(config: FollowerConfig) -> Self {
        Self {
            config,
            waypoints: VecDeque::new(),
        }
    }

    pub fn config(&self) -> FollowerConfig {
        self.config
    }

    /// Take ownership of a corridor, discarding whatever was left of the previous one.
    pub fn set_corridor(&mut self, corridor: Corridor) {
        self.waypoints = corridor.points.into();
    }

    pub fn set_waypoints(&mut self, waypoints: impl IntoIterator<Item = Vec3>) {
        self.waypoints = waypoints.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    pub fn head(&self) -> Option<Vec3> {
        self.waypoints.front().copied()
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.waypoints.iter().copied()
    }

    /// Move `position` toward the head waypoint by `speed * dt`, or consume the head if it is
    /// already within the arrival threshold.
    ///
    /// Non-positive or non-finite `dt` and `speed` leave everything untouched.
    pub fn advance(&mut self, position: &mut Vec3, dt: f32, speed: f32) -> FollowStep {
        let Some(head) = self.head() else {
            return FollowStep::Idle;
        };
        if !(dt.is_finite() && speed.is_finite() && dt > 0.0 && speed > 0.0) {
            return FollowStep::Idle;
        }

        let to_head = head - *position;
        let dist_sq = to_head.length_squared();
        if dist_sq <= self.config.arrival_threshold_sq() {
            self.waypoints.pop_front();
            return if self.waypoints.is_empty() {
                FollowStep::Arrived(head)
            } else {
                FollowStep::Reached(head)
            };
        }

        let mut step = speed * dt;
        if self.config.overshoot == OvershootPolicy::Clamp {
            step = step.min(dist_sq.sqrt());
        }
        *position += to_head.normalize_or_zero() * step;
        FollowStep::Moving
    }
}
