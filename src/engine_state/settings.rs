//! # World Settings
//!
//! Loading and resolving the JSON world definition.
//!
//! A world definition has three sections, all optional:
//!
//! ```json
//! {
//!   "engine":  { "load_radius": 9, "render_radius": 8, "water_tick_interval_ms": 1000 },
//!   "blocks":  [ { "name": "stone", "side": "stone" } ],
//!   "terrain": { "noise": { "seed": 1 }, "layers": [ { "block": "stone", "min_threshold": 0.5 } ] }
//! }
//! ```
//!
//! Blocks are referred to by name everywhere in the file. [`WorldDefinition::build`]
//! validates the definition, assigns block ids and produces the immutable
//! [`WorldResources`] the engine runs on.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use log::info;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use super::error::{ConfigError, ConfigResult};
use super::voxels::block::catalog::{BlockCatalog, BlockDefinition};
use super::voxels::block::texture_table::BlockTextureTable;
use super::voxels::block::{BlockId, AIR};
use super::voxels::terrain::{BlockNoise, NoiseSettings, TerrainConfig, TreeSettings};

/// The world definition bundled with the crate.
pub const BUILTIN_WORLD: &str = include_str!("../../assets/default_world.json");

fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Runtime parameters of the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Chunks within this many chunks of the observer stay loaded.
    pub load_radius: i32,
    /// Chunks within this many chunks of the observer are meshed.
    pub render_radius: i32,
    pub water_tick_interval_ms: u64,
    /// Worker threads; 0 runs every job on the calling thread.
    pub worker_count: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            load_radius: 9,
            render_radius: 8,
            water_tick_interval_ms: 1000,
            worker_count: default_worker_count(),
        }
    }
}

impl EngineSettings {
    pub fn water_tick_interval(&self) -> Duration {
        Duration::from_millis(self.water_tick_interval_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.load_radius < 0 || self.render_radius < 0 {
            return Err(ConfigError::InvalidEngine(format!(
                "radii must not be negative (load {}, render {})",
                self.load_radius, self.render_radius
            )));
        }
        if self.render_radius > self.load_radius {
            return Err(ConfigError::RenderRadiusTooLarge {
                render: self.render_radius,
                load: self.load_radius,
            });
        }
        Ok(())
    }
}

/// One row of the density table, by block name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub block: String,
    pub min_threshold: f64,
}

/// Tree parameters, by block name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeDefinition {
    pub log_block: String,
    pub leaf_block: String,
    pub surface_block: String,
    pub min_trunk_height: i32,
    pub max_trunk_height: i32,
    pub min_leaf_radius: i32,
    pub max_leaf_radius: i32,
    pub spawn_threshold: f64,
    pub cell_frequency: f64,
    pub min_surface_y: i32,
}

impl Default for TreeDefinition {
    fn default() -> Self {
        Self {
            log_block: "log".into(),
            leaf_block: "leaves".into(),
            surface_block: "grass".into(),
            min_trunk_height: 4,
            max_trunk_height: 6,
            min_leaf_radius: 2,
            max_leaf_radius: 3,
            spawn_threshold: 0.06,
            cell_frequency: 0.1,
            min_surface_y: -64,
        }
    }
}

/// The `terrain` section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainDefinition {
    pub noise: NoiseSettings,
    pub layers: Vec<LayerDefinition>,
    /// Block used where no layer matches; Air when absent.
    pub fallback_block: Option<String>,
    pub trees: Option<TreeDefinition>,
}

/// Root of a world definition file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldDefinition {
    pub engine: EngineSettings,
    pub blocks: Vec<BlockDefinition>,
    pub terrain: TerrainDefinition,
}

/// Everything the engine needs from a resolved world definition.
#[derive(Clone, Debug)]
pub struct WorldResources {
    pub settings: EngineSettings,
    pub catalog: Arc<BlockCatalog>,
    pub textures: Arc<BlockTextureTable>,
    pub terrain: Arc<TerrainConfig>,
}

impl WorldDefinition {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a world definition from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The world definition bundled with the crate.
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_json_str(BUILTIN_WORLD)
    }

    /// Validates the definition and resolves it into shared resources.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for invalid engine settings, an invalid catalog, a
    /// block name the catalog does not define, or inconsistent terrain settings.
    pub fn build(&self) -> ConfigResult<WorldResources> {
        self.engine.validate()?;

        let catalog = BlockCatalog::new(self.blocks.clone())?;
        let textures = BlockTextureTable::from_catalog(&catalog);
        let terrain = self.resolve_terrain(&catalog)?;

        info!(
            "World definition: {} blocks, {} textures, {} terrain layers, trees {}, load radius {}, render radius {}, {} workers",
            catalog.len(),
            textures.texture_names().len(),
            terrain.layers().len(),
            if terrain.trees.is_some() { "on" } else { "off" },
            self.engine.load_radius,
            self.engine.render_radius,
            self.engine.worker_count
        );

        Ok(WorldResources {
            settings: self.engine.clone(),
            catalog: Arc::new(catalog),
            textures: Arc::new(textures),
            terrain: Arc::new(terrain),
        })
    }

    fn resolve_terrain(&self, catalog: &BlockCatalog) -> ConfigResult<TerrainConfig> {
        let definition = &self.terrain;
        let block = |name: &str| -> ConfigResult<BlockId> {
            catalog
                .id_of(name)
                .ok_or_else(|| ConfigError::UnknownBlock(name.to_string()))
        };

        if definition.noise.octaves == 0 {
            return Err(ConfigError::InvalidTerrain("octaves must be at least 1".into()));
        }

        let layers = definition
            .layers
            .iter()
            .map(|layer| {
                Ok(BlockNoise {
                    block: block(&layer.block)?,
                    min_threshold: layer.min_threshold,
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        let fallback_block = match &definition.fallback_block {
            Some(name) => block(name)?,
            None => AIR,
        };

        let trees = match &definition.trees {
            Some(trees) => Some(Self::resolve_trees(trees, &block)?),
            None => None,
        };

        Ok(TerrainConfig::new(
            definition.noise.clone(),
            layers,
            fallback_block,
            trees,
        ))
    }

    fn resolve_trees(
        trees: &TreeDefinition,
        block: &impl Fn(&str) -> ConfigResult<BlockId>,
    ) -> ConfigResult<TreeSettings> {
        if trees.min_trunk_height < 1 || trees.min_trunk_height > trees.max_trunk_height {
            return Err(ConfigError::InvalidTerrain(format!(
                "trunk height range {}..={} is empty or starts below 1",
                trees.min_trunk_height, trees.max_trunk_height
            )));
        }
        // Leaf radii must form a non-empty range starting at zero or above.
        if trees.min_leaf_radius < 0 || trees.min_leaf_radius > trees.max_leaf_radius {
            return Err(ConfigError::InvalidTerrain(format!(
                "leaf radius range {}..={} is empty or negative",
                trees.min_leaf_radius, trees.max_leaf_radius
            )));
        }
        if !(trees.cell_frequency.is_finite() && trees.cell_frequency > 0.0) {
            return Err(ConfigError::InvalidTerrain(format!(
                "tree cell frequency must be positive, got {}",
                trees.cell_frequency
            )));
        }

        Ok(TreeSettings {
            log_block: block(&trees.log_block)?,
            leaf_block: block(&trees.leaf_block)?,
            surface_block: block(&trees.surface_block)?,
            min_trunk_height: trees.min_trunk_height,
            max_trunk_height: trees.max_trunk_height,
            min_leaf_radius: trees.min_leaf_radius,
            max_leaf_radius: trees.max_leaf_radius,
            spawn_threshold: trees.spawn_threshold,
            cell_frequency: trees.cell_frequency,
            min_surface_y: trees.min_surface_y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_world_builds() {
        let definition = WorldDefinition::builtin().unwrap();
        assert_eq!(definition.engine.load_radius, 9);
        assert!(definition.engine.worker_count >= 1);

        let resources = definition.build().unwrap();
        assert_eq!(resources.catalog.id_of("stone"), Some(1));
        let thresholds: Vec<f64> = resources.terrain.layers().iter().map(|l| l.min_threshold).collect();
        assert_eq!(thresholds, vec![0.6, 0.45, 0.35]);
        let trees = resources.terrain.trees.as_ref().unwrap();
        assert_eq!(trees.surface_block, resources.catalog.id_of("grass").unwrap());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let definition = WorldDefinition::from_json_str("{}").unwrap();
        assert_eq!(definition.engine.render_radius, 8);
        assert_eq!(definition.engine.water_tick_interval(), Duration::from_secs(1));
        let resources = definition.build().unwrap();
        assert!(resources.catalog.is_empty());
        assert_eq!(resources.terrain.fallback_block, AIR);
    }

    #[test]
    fn test_unknown_block_is_rejected() {
        let json = r#"{
            "blocks": [ { "name": "stone", "side": "stone" } ],
            "terrain": { "layers": [ { "block": "granite", "min_threshold": 0.5 } ] }
        }"#;
        let err = WorldDefinition::from_json_str(json).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBlock(name) if name == "granite"));
    }

    #[test]
    fn test_render_radius_must_fit_load_radius() {
        let json = r#"{ "engine": { "load_radius": 2, "render_radius": 3 } }"#;
        let err = WorldDefinition::from_json_str(json).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::RenderRadiusTooLarge { render: 3, load: 2 }));
    }

    #[test]
    fn test_bad_tree_ranges_are_rejected() {
        let mut definition = WorldDefinition::builtin().unwrap();
        if let Some(trees) = definition.terrain.trees.as_mut() {
            trees.min_leaf_radius = 4;
        }
        assert!(matches!(definition.build(), Err(ConfigError::InvalidTerrain(_))));
    }

    #[test]
    fn test_canopy_wider_than_trunk_is_accepted() {
        let mut definition = WorldDefinition::builtin().unwrap();
        if let Some(trees) = definition.terrain.trees.as_mut() {
            trees.min_trunk_height = 1;
            trees.max_trunk_height = 1;
            trees.min_leaf_radius = 3;
            trees.max_leaf_radius = 3;
        }
        let resources = definition.build().unwrap();
        let trees = resources.terrain.trees.as_ref().unwrap();
        assert_eq!((trees.max_trunk_height, trees.max_leaf_radius), (1, 3));
    }

    #[test]
    fn test_malformed_json_and_missing_file() {
        assert!(matches!(
            WorldDefinition::from_json_str("{ \"engine\": 3 }"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            WorldDefinition::from_path("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
