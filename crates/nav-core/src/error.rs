use thiserror::Error;
use tracing::Level;

/// Reasons walkable geometry cannot become a zone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("walkable geometry has no vertices or no triangles")]
    Empty,

    #[error("{buffer} buffer length {len} is not a multiple of 3")]
    MalformedBuffer { buffer: &'static str, len: usize },

    #[error("triangle {triangle} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("every triangle in the walkable geometry has zero area")]
    NoWalkableTriangles,
}

/// Navigation failures.
///
/// Only `DegenerateGeometry` is fatal. The rest are expected per-tick outcomes that callers
/// absorb and log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("zone `{zone}` is not registered")]
    UnregisteredZone { zone: String },

    #[error("position lies outside every group of zone `{zone}`")]
    UnresolvedGroup { zone: String },

    #[error("no corridor connects the endpoints in zone `{zone}`")]
    NoCorridorFound { zone: String },

    #[error("degenerate walkable geometry: {0}")]
    DegenerateGeometry(#[from] GeometryError),
}

impl NavError {
    /// A zone that hasn't finished loading yet; retry on a later tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, NavError::UnregisteredZone { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, NavError::DegenerateGeometry(_))
    }

    /// Log level a caller should report this failure at.
    pub fn severity(&self) -> Level {
        match self {
            NavError::UnregisteredZone { .. } => Level::DEBUG,
            NavError::UnresolvedGroup { .. } | NavError::NoCorridorFound { .. } => Level::WARN,
            NavError::DegenerateGeometry(_) => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_degenerate_geometry_is_fatal() {
        let zone = "level1".to_string();
        assert!(!NavError::UnregisteredZone { zone: zone.clone() }.is_fatal());
        assert!(NavError::UnregisteredZone { zone: zone.clone() }.is_transient());
        assert!(!NavError::NoCorridorFound { zone: zone.clone() }.is_transient());
        assert_eq!(
            NavError::UnresolvedGroup { zone }.severity(),
            Level::WARN
        );
        assert!(NavError::from(GeometryError::Empty).is_fatal());
    }

    #[test]
    fn messages_name_the_zone() {
        let err = NavError::NoCorridorFound {
            zone: "level1".to_string(),
        };
        assert!(err.to_string().contains("level1"));
    }
}
