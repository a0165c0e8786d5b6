//! Deterministic, engine-agnostic navigation primitives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod error;
pub mod math;
pub mod tick;

pub use agent::AgentId;
pub use error::{GeometryError, NavError};
pub use math::{Vec2, Vec3};
pub use tick::TickContext;
