use std::collections::BTreeMap;
use std::fmt;

use nav_core::{NavError, Vec3};

use crate::{Corridor, GroupId, NavMesh, NavMeshConfig, Navigator, WalkableGeometry, ZoneStats};

/// Named zones, each backed by a navigation-query backend.
///
/// A zone name that hasn't been registered yet is a normal state while assets are still loading;
/// queries against it fail with `NavError::UnregisteredZone`.
pub struct ZoneRegistry {
    config: NavMeshConfig,
    zones: BTreeMap<String, Box<dyn Navigator>>,
}

impl ZoneRegistry {
    pub fn new(config: NavMeshConfig) -> Self {
        Self {
            config,
            zones: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> NavMeshConfig {
        self.config
    }

    /// Build a `NavMesh` from `geometry` and store it under `name`, replacing any previous zone.
    ///
    /// Degenerate geometry leaves the registry untouched.
    pub fn register_zone(
        &mut self,
        name: impl Into<String>,
        geometry: &WalkableGeometry,
    ) -> Result<(), NavError> {
        let name = name.into();
        let mesh = match NavMesh::from_geometry(geometry, self.config) {
            Ok(mesh) => mesh,
            Err(err) => {
                tracing::error!(zone = %name, error = %err, "Rejected zone geometry");
                return Err(err.into());
            }
        };

        tracing::info!(
            zone = %name,
            triangles = mesh.triangle_count(),
            groups = mesh.group_count(),
            "Registered zone"
        );
        self.insert(name, Box::new(mesh));
        Ok(())
    }

    /// Store an already-built backend under `name`.
    pub fn register_navigator(&mut self, name: impl Into<String>, navigator: impl Navigator + 'static) {
        let name = name.into();
        tracing::info!(zone = %name, "Registered zone backend");
        self.insert(name, Box::new(navigator));
    }

    fn insert(&mut self, name: String, navigator: Box<dyn Navigator>) {
        if self.zones.insert(name.clone(), navigator).is_some() {
            tracing::info!(zone = %name, "Replaced previously registered zone");
        }
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.zones.remove(name).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.zones.contains_key(name)
    }

    pub fn zone_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.zones.keys().map(String::as_str)
    }

    pub fn stats(&self, name: &str) -> Result<Option<ZoneStats>, NavError> {
        Ok(self.zone(name)?.stats())
    }

    pub fn resolve_group(&self, name: &str, position: Vec3) -> Result<GroupId, NavError> {
        self.zone(name)?
            .resolve_group(position)
            .ok_or_else(|| NavError::UnresolvedGroup {
                zone: name.to_string(),
            })
    }

    pub fn nearest_point(
        &self,
        name: &str,
        position: Vec3,
        group: GroupId,
    ) -> Result<Vec3, NavError> {
        self.zone(name)?
            .nearest_point(position, group)
            .ok_or_else(|| NavError::UnresolvedGroup {
                zone: name.to_string(),
            })
    }

    /// `Ok(None)` is the ordinary "no path" answer, not a failure of the registry.
    pub fn find_corridor(
        &self,
        name: &str,
        from: Vec3,
        to: Vec3,
        group: GroupId,
    ) -> Result<Option<Corridor>, NavError> {
        Ok(self.zone(name)?.find_corridor(from, to, group))
    }

    fn zone(&self, name: &str) -> Result<&dyn Navigator, NavError> {
        self.zones
            .get(name)
            .map(|z| z.as_ref())
            .ok_or_else(|| NavError::UnregisteredZone {
                zone: name.to_string(),
            })
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new(NavMeshConfig::default())
    }
}

impl fmt::Debug for ZoneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneRegistry")
            .field("config", &self.config)
            .field("zones", &self.zones.keys().collect::<Vec<_>>())
            .finish()
    }
}
