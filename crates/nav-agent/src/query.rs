//! One-shot path queries against a registered zone.

use nav_core::{NavError, Vec3};
use nav_mesh::{Corridor, GroupId, ZoneRegistry};
use tracing::Level;

/// A successful query: the corridor plus how the agent was placed on the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub group: GroupId,
    /// The agent's position snapped onto its group. The corridor starts here.
    pub start: Vec3,
    pub corridor: Corridor,
}

/// Path queries from an agent position to a target inside one zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathQuery;

impl PathQuery {
    /// Resolve the agent's group, snap it onto that group, then search to `target`.
    ///
    /// Every failure is an error; see `PathQuery::query` for the logging variant.
    pub fn try_query(
        registry: &ZoneRegistry,
        zone: &str,
        agent_position: Vec3,
        target: Vec3,
    ) -> Result<QueryOutcome, NavError> {
        let group = registry.resolve_group(zone, agent_position)?;
        let start = registry.nearest_point(zone, agent_position, group)?;
        let corridor = registry
            .find_corridor(zone, start, target, group)?
            .ok_or_else(|| NavError::NoCorridorFound {
                zone: zone.to_string(),
            })?;

        tracing::trace!(
            zone,
            group = group.0,
            waypoints = corridor.len(),
            "Found corridor"
        );
        Ok(QueryOutcome {
            group,
            start,
            corridor,
        })
    }

    /// Like `try_query`, but failures are logged and swallowed.
    pub fn query(
        registry: &ZoneRegistry,
        zone: &str,
        agent_position: Vec3,
        target: Vec3,
    ) -> Option<QueryOutcome> {
        match Self::try_query(registry, zone, agent_position, target) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                log_failure(&err, agent_position, target);
                None
            }
        }
    }
}

pub(crate) fn log_failure(err: &NavError, from: Vec3, to: Vec3) {
    let level = err.severity();
    if level == Level::DEBUG {
        tracing::debug!(error = %err, ?from, ?to, "Path query deferred");
    } else if level == Level::WARN {
        tracing::warn!(error = %err, ?from, ?to, "Path query failed");
    } else {
        tracing::error!(error = %err, ?from, ?to, "Path query failed");
    }
}
