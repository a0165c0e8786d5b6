use nav_core::{AgentId, TickContext, Vec3};
use serde::{Deserialize, Serialize};

use crate::context::SimulationContext;
use crate::director::{ActiveDisplay, PathDirector, SlotId};
use crate::follower::FollowStep;
use crate::viz::PathVisualizer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReport {
    pub id: AgentId,
    pub position: Vec3,
    pub step: FollowStep,
    pub remaining_waypoints: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotReport {
    pub id: SlotId,
    pub from: AgentId,
    pub to: AgentId,
    pub path: Option<Vec<Vec3>>,
}

/// What one frame produced, in agent id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub tick: u64,
    pub elapsed_seconds: f64,
    pub agents: Vec<AgentReport>,
    pub slots: Vec<SlotReport>,
    pub active: Option<ActiveDisplay>,
}

impl FrameReport {
    pub fn agent(&self, id: AgentId) -> Option<&AgentReport> {
        self.agents.iter().find(|a| a.id == id)
    }
}

/// Runs one frame at a time: timeline, then the director, then every follower.
#[derive(Debug, Default)]
pub struct FrameDriver {
    director: PathDirector,
    clock: Option<TickContext>,
}

impl FrameDriver {
    pub fn new(director: PathDirector) -> Self {
        Self {
            director,
            clock: None,
        }
    }

    pub fn director(&self) -> &PathDirector {
        &self.director
    }

    pub fn director_mut(&mut self) -> &mut PathDirector {
        &mut self.director
    }

    /// The last frame's timing, if any frame has run.
    pub fn clock(&self) -> Option<TickContext> {
        self.clock
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.map_or(0.0, |c| c.elapsed_seconds)
    }

    pub fn pick<V: PathVisualizer + ?Sized>(
        &mut self,
        ctx: &mut SimulationContext,
        agent: AgentId,
        target: Vec3,
        viz: &mut V,
    ) -> bool {
        self.director.on_pick(ctx, agent, target, viz)
    }

    /// Stagger the display of `slots` starting at the current point on the timeline.
    pub fn stagger_display(&mut self, slots: &[SlotId]) {
        let now = self.elapsed_seconds();
        self.director.stagger_display(slots, now);
    }

    pub fn tick<V: PathVisualizer + ?Sized>(
        &mut self,
        ctx: &mut SimulationContext,
        dt: f32,
        viz: &mut V,
    ) -> FrameReport {
        let tick = match self.clock {
            Some(prev) => prev.next(dt),
            None => TickContext::first(dt),
        };
        self.clock = Some(tick);

        self.director.update(ctx, &tick, viz);

        let mut agents = Vec::with_capacity(ctx.agent_count());
        for (id, agent) in ctx.agents_mut() {
            let step = agent
                .follower
                .advance(&mut agent.position, tick.dt_seconds, agent.speed);
            match step {
                FollowStep::Reached(waypoint) => {
                    tracing::trace!(agent = %id, ?waypoint, "Reached waypoint");
                }
                FollowStep::Arrived(waypoint) => {
                    tracing::debug!(agent = %id, ?waypoint, tick = tick.tick, "Arrived");
                }
                FollowStep::Idle | FollowStep::Moving => {}
            }
            agents.push(AgentReport {
                id,
                position: agent.position,
                step,
                remaining_waypoints: agent.follower.remaining(),
            });
        }

        let slots = self
            .director
            .slots()
            .map(|(id, slot)| SlotReport {
                id,
                from: slot.from,
                to: slot.to,
                path: slot.path().map(|p| p.corridor.points.clone()),
            })
            .collect();

        FrameReport {
            tick: tick.tick,
            elapsed_seconds: tick.elapsed_seconds,
            agents,
            slots,
            active: self.director.active(),
        }
    }
}
