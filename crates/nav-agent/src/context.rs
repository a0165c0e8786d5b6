use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use nav_core::{AgentId, NavError, Vec3};
use nav_mesh::{WalkableGeometry, ZoneRegistry};

use crate::config::FollowerConfig;
use crate::follower::PathFollower;

/// A moving entity: where it is, how fast it goes, and the corridor it is consuming.
#[derive(Debug, Clone)]
pub struct Agent {
    pub position: Vec3,
    pub speed: f32,
    pub follower: PathFollower,
}

impl Agent {
    pub fn new(position: Vec3, speed: f32, config: FollowerConfig) -> Self {
        Self {
            position,
            speed,
            follower: PathFollower::new(config),
        }
    }
}

/// The state navigation runs against: the zone registry, the active zone and its agents.
///
/// Passed explicitly to every component that needs it.
#[derive(Debug)]
pub struct SimulationContext {
    pub registry: ZoneRegistry,
    zone: String,
    follower_config: FollowerConfig,
    agents: BTreeMap<AgentId, Agent>,
}

impl SimulationContext {
    pub fn new(
        registry: ZoneRegistry,
        zone: impl Into<String>,
        follower_config: FollowerConfig,
    ) -> Self {
        Self {
            registry,
            zone: zone.into(),
            follower_config,
            agents: BTreeMap::new(),
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn set_zone(&mut self, zone: impl Into<String>) {
        self.zone = zone.into();
    }

    /// Register `geometry` as the active zone.
    pub fn register_active_zone(&mut self, geometry: &WalkableGeometry) -> Result<(), NavError> {
        self.registry.register_zone(self.zone.clone(), geometry)
    }

    /// Add an agent, replacing any existing agent with the same id.
    pub fn spawn(&mut self, id: AgentId, position: Vec3, speed: f32) -> &mut Agent {
        let agent = Agent::new(position, speed, self.follower_config);
        match self.agents.entry(id) {
            Entry::Occupied(mut slot) => {
                tracing::debug!(agent = %id, "Respawned agent");
                slot.insert(agent);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(agent),
        }
    }

    pub fn despawn(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(&id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn position(&self, id: AgentId) -> Option<Vec3> {
        self.agents.get(&id).map(|a| a.position)
    }

    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &Agent)> + '_ {
        self.agents.iter().map(|(&id, agent)| (id, agent))
    }

    pub fn agents_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut Agent)> + '_ {
        self.agents.iter_mut().map(|(&id, agent)| (id, agent))
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}
