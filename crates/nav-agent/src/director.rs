//! Decides when corridors are computed and which one is on screen.
//!
//! Two policies share one director:
//! - reactive: `on_pick` searches once for an agent and hands the corridor to its follower;
//! - recurring: watched pairs are searched again whenever their replan timer has run out and
//!   one of the two endpoints has actually moved.
//!
//! Display switching between watched pairs goes through a time-keyed queue so a staggered
//! display fires on the simulation timeline rather than on frame counts.

use nav_core::{AgentId, TickContext, Vec3};
use nav_mesh::Corridor;
use serde::{Deserialize, Serialize};

use crate::config::DirectorConfig;
use crate::context::SimulationContext;
use crate::query::PathQuery;
use crate::schedule::EventQueue;
use crate::viz::PathVisualizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub usize);

/// What the visualizer is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ActiveDisplay {
    Slot(SlotId),
    Pick(AgentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayEvent {
    Show(SlotId),
}

/// The last corridor found for a watched pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPath {
    /// The `from` agent snapped onto the mesh.
    pub origin: Vec3,
    pub target: Vec3,
    pub corridor: Corridor,
}

#[derive(Debug, Clone)]
pub struct PathSlot {
    pub from: AgentId,
    pub to: AgentId,
    path: Option<SlotPath>,
    last_attempt: Option<(Vec3, Vec3)>,
    next_due: f64,
}

impl PathSlot {
    fn new(from: AgentId, to: AgentId) -> Self {
        Self {
            from,
            to,
            path: None,
            last_attempt: None,
            next_due: f64::NEG_INFINITY,
        }
    }

    pub fn path(&self) -> Option<&SlotPath> {
        self.path.as_ref()
    }

    fn is_dirty(&self, from: Vec3, to: Vec3, min_delta: f32) -> bool {
        match self.last_attempt {
            None => true,
            Some((last_from, last_to)) => {
                last_from.distance(from) > min_delta || last_to.distance(to) > min_delta
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PathDirector {
    config: DirectorConfig,
    slots: Vec<PathSlot>,
    display: EventQueue<DisplayEvent>,
    active: Option<ActiveDisplay>,
    needs_redraw: bool,
    reported_missing_zone: bool,
}

impl PathDirector {
    pub fn new(config: DirectorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> DirectorConfig {
        self.config
    }

    pub fn active(&self) -> Option<ActiveDisplay> {
        self.active
    }

    pub fn slot(&self, id: SlotId) -> Option<&PathSlot> {
        self.slots.get(id.0)
    }

    pub fn slots(&self) -> impl Iterator<Item = (SlotId, &PathSlot)> + '_ {
        self.slots.iter().enumerate().map(|(i, s)| (SlotId(i), s))
    }

    pub fn pending_display_switches(&self) -> usize {
        self.display.len()
    }

    /// Search once from `agent` to `target`, give the corridor to the agent's follower and
    /// redraw the visualizer.
    ///
    /// On failure nothing changes: the follower keeps its corridor and the screen keeps
    /// whatever it was showing. A successful pick cancels pending display switches.
    pub fn on_pick<V: PathVisualizer + ?Sized>(
        &mut self,
        ctx: &mut SimulationContext,
        agent: AgentId,
        target: Vec3,
        viz: &mut V,
    ) -> bool {
        let Some(position) = ctx.position(agent) else {
            tracing::warn!(agent = %agent, "Pick for unknown agent");
            return false;
        };
        let Some(outcome) = PathQuery::query(&ctx.registry, ctx.zone(), position, target) else {
            return false;
        };

        draw(viz, outcome.start, target, &outcome.corridor.points);

        let cancelled = self.display.len();
        if cancelled > 0 {
            self.display.clear();
            tracing::debug!(cancelled, "Pick cancelled pending display switches");
        }
        self.active = Some(ActiveDisplay::Pick(agent));
        self.needs_redraw = false;

        tracing::debug!(
            agent = %agent,
            waypoints = outcome.corridor.len(),
            "Assigned corridor"
        );
        if let Some(agent) = ctx.agent_mut(agent) {
            agent.follower.set_corridor(outcome.corridor);
        }
        true
    }

    /// Keep a corridor from `from` to `to` up to date. It is first searched on the next update.
    pub fn watch_pair(&mut self, from: AgentId, to: AgentId) -> SlotId {
        let id = SlotId(self.slots.len());
        self.slots.push(PathSlot::new(from, to));
        id
    }

    /// Show `id` from the next update on, dropping pending display switches.
    pub fn show_slot(&mut self, id: SlotId) {
        self.display.clear();
        self.set_active(ActiveDisplay::Slot(id));
    }

    /// Show `slots[0]` from the next update on and each following slot `display_stagger`
    /// seconds after the previous one. Replaces any earlier schedule.
    pub fn stagger_display(&mut self, slots: &[SlotId], now: f64) {
        self.display.clear();
        let Some((&first, rest)) = slots.split_first() else {
            return;
        };
        self.set_active(ActiveDisplay::Slot(first));
        for (k, &id) in rest.iter().enumerate() {
            let delay = self.config.display_stagger * (k + 1) as f64;
            self.display
                .schedule_after(now, delay, DisplayEvent::Show(id));
        }
    }

    /// Force every watched pair to be searched again on the next update.
    pub fn invalidate(&mut self) {
        for slot in &mut self.slots {
            slot.last_attempt = None;
            slot.next_due = f64::NEG_INFINITY;
        }
    }

    pub fn update<V: PathVisualizer + ?Sized>(
        &mut self,
        ctx: &SimulationContext,
        tick: &TickContext,
        viz: &mut V,
    ) {
        if !ctx.registry.is_registered(ctx.zone()) {
            if !self.reported_missing_zone {
                tracing::debug!(zone = ctx.zone(), "Zone not registered yet, skipping path updates");
                self.reported_missing_zone = true;
            }
            return;
        }
        self.reported_missing_zone = false;

        let now = tick.elapsed_seconds;
        for event in self.display.drain_due(now) {
            match event {
                DisplayEvent::Show(id) => self.set_active(ActiveDisplay::Slot(id)),
            }
        }

        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if now < slot.next_due {
                continue;
            }
            slot.next_due = now + self.config.replan_interval;

            let (Some(from), Some(to)) = (ctx.position(slot.from), ctx.position(slot.to)) else {
                tracing::debug!(from = %slot.from, to = %slot.to, "Watched pair has a missing agent");
                continue;
            };
            if !slot.is_dirty(from, to, self.config.min_target_delta) {
                continue;
            }
            slot.last_attempt = Some((from, to));

            if let Some(outcome) = PathQuery::query(&ctx.registry, ctx.zone(), from, to) {
                slot.path = Some(SlotPath {
                    origin: outcome.start,
                    target: to,
                    corridor: outcome.corridor,
                });
                if self.active == Some(ActiveDisplay::Slot(SlotId(idx))) {
                    self.needs_redraw = true;
                }
            }
        }

        if !self.needs_redraw {
            return;
        }
        match self.active {
            Some(ActiveDisplay::Slot(id)) => {
                // A slot without a corridor yet stays pending until its first search succeeds.
                if let Some(path) = self.slots.get(id.0).and_then(PathSlot::path) {
                    draw(viz, path.origin, path.target, &path.corridor.points);
                    self.needs_redraw = false;
                }
            }
            _ => self.needs_redraw = false,
        }
    }

    fn set_active(&mut self, display: ActiveDisplay) {
        if self.active != Some(display) {
            self.active = Some(display);
            self.needs_redraw = true;
        }
    }
}

fn draw<V: PathVisualizer + ?Sized>(viz: &mut V, origin: Vec3, target: Vec3, path: &[Vec3]) {
    viz.reset();
    viz.set_player_position(origin);
    viz.set_target_position(target);
    viz.set_path(path);
}
