//! Tunables for following and directing paths.

use nav_mesh::NavMeshConfig;
use serde::{Deserialize, Serialize};

/// What to do when one tick's step is longer than the distance left to the head waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvershootPolicy {
    /// Stop on the waypoint. Arrival is guaranteed for any `speed * dt`.
    #[default]
    Clamp,
    /// Take the full step and correct on the next tick. Large steps can orbit a waypoint
    /// without ever getting within the arrival threshold.
    Uncapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    /// Distance below which a waypoint counts as reached.
    pub arrival_threshold: f32,
    pub overshoot: OvershootPolicy,
}

impl FollowerConfig {
    pub fn arrival_threshold_sq(&self) -> f32 {
        self.arrival_threshold * self.arrival_threshold
    }
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 0.05,
            overshoot: OvershootPolicy::Clamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// Minimum seconds between two searches for the same watched pair.
    #[serde(default = "default_replan_interval")]
    pub replan_interval: f64,

    /// How far either endpoint of a watched pair must move before it is searched again.
    #[serde(default = "default_min_target_delta")]
    pub min_target_delta: f32,

    /// Seconds between successive slots of a staggered display.
    #[serde(default = "default_display_stagger")]
    pub display_stagger: f64,
}

fn default_replan_interval() -> f64 {
    0.25
}
fn default_min_target_delta() -> f32 {
    0.1
}
fn default_display_stagger() -> f64 {
    2.0
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            replan_interval: default_replan_interval(),
            min_target_delta: default_min_target_delta(),
            display_stagger: default_display_stagger(),
        }
    }
}

/// Everything a simulation needs, as loaded from a scenario file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub mesh: NavMeshConfig,
    pub follower: FollowerConfig,
    pub director: DirectorConfig,
}
