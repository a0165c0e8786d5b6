//! Visualization seam for corridors.
//!
//! The navigation core only tells a visualizer what to draw; how it is drawn is up to the
//! implementation. `RecordingVisualizer` keeps the command stream for tests and CLI output.

use nav_core::Vec3;
use serde::{Deserialize, Serialize};

pub trait PathVisualizer {
    /// Forget everything drawn so far.
    fn reset(&mut self);
    fn set_player_position(&mut self, position: Vec3);
    fn set_target_position(&mut self, position: Vec3);
    fn set_path(&mut self, path: &[Vec3]);
}

impl<V: PathVisualizer + ?Sized> PathVisualizer for Box<V> {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn set_player_position(&mut self, position: Vec3) {
        (**self).set_player_position(position);
    }

    fn set_target_position(&mut self, position: Vec3) {
        (**self).set_target_position(position);
    }

    fn set_path(&mut self, path: &[Vec3]) {
        (**self).set_path(path);
    }
}

/// Draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisualizer;

impl PathVisualizer for NullVisualizer {
    fn reset(&mut self) {}
    fn set_player_position(&mut self, _position: Vec3) {}
    fn set_target_position(&mut self, _position: Vec3) {}
    fn set_path(&mut self, _path: &[Vec3]) {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum VizCommand {
    Reset,
    PlayerPosition(Vec3),
    TargetPosition(Vec3),
    Path(Vec<Vec3>),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingVisualizer {
    pub commands: Vec<VizCommand>,
}

impl RecordingVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<VizCommand> {
        std::mem::take(&mut self.commands)
    }

    /// The path currently on screen: the last one set since the last reset.
    pub fn current_path(&self) -> Option<&[Vec3]> {
        for cmd in self.commands.iter().rev() {
            match cmd {
                VizCommand::Path(path) => return Some(path),
                VizCommand::Reset => return None,
                _ => {}
            }
        }
        None
    }

    pub fn reset_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, VizCommand::Reset))
            .count()
    }
}

impl PathVisualizer for RecordingVisualizer {
    fn reset(&mut self) {
        self.commands.push(VizCommand::Reset);
    }

    fn set_player_position(&mut self, position: Vec3) {
        self.commands.push(VizCommand::PlayerPosition(position));
    }

    fn set_target_position(&mut self, position: Vec3) {
        self.commands.push(VizCommand::TargetPosition(position));
    }

    fn set_path(&mut self, path: &[Vec3]) {
        self.commands.push(VizCommand::Path(path.to_vec()));
    }
}
