//! Scenario files: one zone, its agents, and what to do with them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use nav_agent::NavConfig;
use nav_core::{AgentId, Vec2, Vec3};
use nav_mesh::WalkableGeometry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_zone")]
    pub zone: String,

    #[serde(default)]
    pub config: NavConfig,

    /// Written as single-key maps (`plane: {..}`, `merge: [..]`) rather than YAML tags.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub geometry: GeometrySource,

    #[serde(default)]
    pub agents: Vec<AgentSpec>,

    /// Reactive picks, applied when the timeline reaches `at`.
    #[serde(default)]
    pub picks: Vec<PickSpec>,

    /// Watched pairs, kept up to date every frame.
    #[serde(default)]
    pub pairs: Vec<PairSpec>,

    /// Pair indices to show one after another, `config.director.display_stagger` apart.
    #[serde(default)]
    pub display: Vec<usize>,

    #[serde(default)]
    pub run: RunSpec,

    /// Directory relative geometry paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_zone() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySource {
    Plane {
        min: [f32; 2],
        max: [f32; 2],
        #[serde(default)]
        height: f32,
        #[serde(default = "default_cells")]
        cells: u32,
    },
    Buffers {
        positions: Vec<f32>,
        indices: Vec<u32>,
    },
    /// A JSON geometry file.
    File(PathBuf),
    Merge(Vec<GeometrySource>),
}

fn default_cells() -> u32 {
    1
}

/// On-disk geometry: either the structured form or raw buffers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeometryFile {
    Structured(WalkableGeometry),
    Buffers { positions: Vec<f32>, indices: Vec<u32> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: u64,
    pub position: [f32; 3],
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 {
    3.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickSpec {
    #[serde(default)]
    pub at: f64,
    pub agent: u64,
    pub target: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSpec {
    pub from: u64,
    pub to: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunSpec {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_dt")]
    pub dt: f32,
}

fn default_ticks() -> u64 {
    300
}
fn default_dt() -> f32 {
    1.0 / 30.0
}

impl Default for RunSpec {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            dt: default_dt(),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        let mut scenario = Self::parse(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))?;
        scenario.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(scenario)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(content)?;
        scenario.check()?;
        Ok(scenario)
    }

    /// Reject references that can't be satisfied before anything runs.
    fn check(&self) -> Result<()> {
        let known = |id: u64| self.agents.iter().any(|a| a.id == id);
        for pick in &self.picks {
            if !known(pick.agent) {
                bail!("pick at {}s refers to unknown agent {}", pick.at, pick.agent);
            }
        }
        for pair in &self.pairs {
            if !known(pair.from) || !known(pair.to) {
                bail!("pair {} -> {} refers to an unknown agent", pair.from, pair.to);
            }
        }
        if let Some(&slot) = self.display.iter().find(|&&i| i >= self.pairs.len()) {
            bail!("display refers to pair {slot}, but only {} are declared", self.pairs.len());
        }
        Ok(())
    }

    pub fn geometry(&self) -> Result<WalkableGeometry> {
        self.geometry.resolve(&self.base_dir)
    }

    pub fn agents(&self) -> impl Iterator<Item = (AgentId, Vec3, f32)> + '_ {
        self.agents
            .iter()
            .map(|a| (AgentId(a.id), Vec3::from(a.position), a.speed))
    }
}

impl GeometrySource {
    pub fn resolve(&self, base_dir: &Path) -> Result<WalkableGeometry> {
        match self {
            Self::Plane {
                min,
                max,
                height,
                cells,
            } => Ok(WalkableGeometry::plane(
                Vec2::new(min[0], min[1]),
                Vec2::new(max[0], max[1]),
                *height,
                *cells,
            )),
            Self::Buffers { positions, indices } => {
                Ok(WalkableGeometry::from_buffers(positions, indices)?)
            }
            Self::File(path) => {
                let path = base_dir.join(path);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read geometry from {}", path.display()))?;
                let file: GeometryFile = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse geometry from {}", path.display()))?;
                match file {
                    GeometryFile::Structured(geometry) => Ok(geometry),
                    GeometryFile::Buffers { positions, indices } => {
                        Ok(WalkableGeometry::from_buffers(&positions, &indices)?)
                    }
                }
            }
            Self::Merge(parts) => {
                let mut merged = WalkableGeometry::default();
                for part in parts {
                    merged.merge(&part.resolve(base_dir)?);
                }
                Ok(merged)
            }
        }
    }
}
