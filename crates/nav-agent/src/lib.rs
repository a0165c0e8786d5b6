//! Path queries, path following and multi-agent path direction.

#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod director;
pub mod driver;
pub mod follower;
pub mod query;
pub mod schedule;
pub mod viz;

pub use config::{DirectorConfig, FollowerConfig, NavConfig, OvershootPolicy};
pub use context::{Agent, SimulationContext};
pub use director::{ActiveDisplay, PathDirector, PathSlot, SlotId, SlotPath};
pub use driver::{AgentReport, FrameDriver, FrameReport, SlotReport};
pub use follower::{FollowStep, PathFollower};
pub use query::{PathQuery, QueryOutcome};
pub use schedule::{EventId, EventQueue};
pub use viz::{NullVisualizer, PathVisualizer, RecordingVisualizer, VizCommand};
