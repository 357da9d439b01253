//! # Terrain Generation
//!
//! Procedural voxel content as a pure function of world coordinates.
//!
//! ## Base Terrain
//!
//! Every voxel samples a fractal sum of 3D Perlin noise:
//!
//! ```text
//! density = Σ perlin(p · frequency · lacunarityⁱ) · amplitude · persistenceⁱ
//!         + density_offset
//!         - max(y, 0) · height_falloff
//! density = max(density, 0)
//! ```
//!
//! The falloff pulls density down with altitude, which turns the noise field into a
//! ground surface with overhangs and caves below it. The block is the first entry of a
//! descending threshold table whose threshold the density meets, or the fallback block.
//!
//! ## Trees
//!
//! A second pass in [`trees`] stamps trees found by a 2D Worley test. Each chunk scans
//! a border of columns wide enough to catch every canopy that can reach it and writes
//! only its own voxels. Since the test and the tree shape depend on nothing but world
//! coordinates and the config, neighboring chunks agree on every tree without ever
//! communicating.
//!
//! ## Determinism
//!
//! Nothing here reads other chunks, the clock, or a shared random source. Regenerating
//! a chunk always yields the same bytes.

use std::sync::Arc;

use cgmath::Point3;
use noise::{core::worley::ReturnType, NoiseFn, Perlin, Worley};
use serde::{Deserialize, Serialize};

use super::block::{BlockId, AIR};
use super::chunk::{chunk_origin, CHUNK_DIMENSION, CHUNK_SIZE};
use super::voxel::Voxel;

pub mod trees;

/// Highest y the surface search will ever start from.
pub const MAX_SURFACE_SEARCH_Y: i32 = 512;

/// Fractal noise parameters for base terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub seed: u32,
    pub frequency: f64,
    pub amplitude: f64,
    pub lacunarity: f64,
    pub persistence: f64,
    pub octaves: u32,
    /// Constant added to the noise sum before the height falloff.
    pub density_offset: f64,
    /// Density removed per voxel of altitude above y = 0.
    pub height_falloff: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 0.01,
            amplitude: 1.0,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 4,
            density_offset: 0.5,
            height_falloff: 0.02,
        }
    }
}

impl NoiseSettings {
    /// Upper bound of the noise sum before offset and falloff.
    pub fn peak_amplitude(&self) -> f64 {
        (0..self.octaves)
            .map(|octave| (self.amplitude * self.persistence.powi(octave as i32)).abs())
            .sum()
    }
}

/// One row of the density-to-material table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockNoise {
    pub block: BlockId,
    pub min_threshold: f64,
}

/// Resolved tree parameters. Block references are ids.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeSettings {
    pub log_block: BlockId,
    pub leaf_block: BlockId,
    /// Trees only grow on columns whose top block is this one.
    pub surface_block: BlockId,
    pub min_trunk_height: i32,
    pub max_trunk_height: i32,
    pub min_leaf_radius: i32,
    pub max_leaf_radius: i32,
    /// Worley distance, normalized to 0..1, below which a column spawns a tree.
    pub spawn_threshold: f64,
    /// Worley cells per voxel.
    pub cell_frequency: f64,
    /// Lowest surface height a tree may stand on.
    pub min_surface_y: i32,
}

/// Immutable terrain parameters shared by every terrain job.
#[derive(Clone, Debug)]
pub struct TerrainConfig {
    pub noise: NoiseSettings,
    /// Sorted by descending threshold.
    layers: Vec<BlockNoise>,
    pub fallback_block: BlockId,
    pub trees: Option<TreeSettings>,
}

impl TerrainConfig {
    /// Builds a config, sorting `layers` so the highest threshold is tested first.
    pub fn new(
        noise: NoiseSettings,
        mut layers: Vec<BlockNoise>,
        fallback_block: BlockId,
        trees: Option<TreeSettings>,
    ) -> Self {
        layers.sort_by(|a, b| b.min_threshold.total_cmp(&a.min_threshold));
        Self {
            noise,
            layers,
            fallback_block,
            trees,
        }
    }

    pub fn layers(&self) -> &[BlockNoise] {
        &self.layers
    }

    /// First layer whose threshold `density` meets, else the fallback.
    pub fn block_for_density(&self, density: f64) -> BlockId {
        self.layers
            .iter()
            .find(|layer| density >= layer.min_threshold)
            .map_or(self.fallback_block, |layer| layer.block)
    }

    /// A y above which base terrain is guaranteed to be Air.
    ///
    /// Density can never exceed `peak + offset - y · falloff`, so above the height where
    /// that bound drops below the lowest non-air threshold nothing is solid. Configs with
    /// no falloff, a solid fallback or a zero threshold have no such height and use
    /// [`MAX_SURFACE_SEARCH_Y`].
    pub fn surface_search_ceiling(&self) -> i32 {
        let lowest = self
            .layers
            .iter()
            .filter(|layer| layer.block != AIR)
            .map(|layer| layer.min_threshold)
            .fold(f64::INFINITY, f64::min);

        if self.fallback_block != AIR || self.noise.height_falloff <= 0.0 || lowest <= 0.0 {
            return MAX_SURFACE_SEARCH_Y;
        }
        if !lowest.is_finite() {
            // No solid material at all.
            return 0;
        }

        let peak = self.noise.peak_amplitude() + self.noise.density_offset;
        let height = ((peak - lowest) / self.noise.height_falloff).ceil() + 1.0;
        height.clamp(0.0, MAX_SURFACE_SEARCH_Y as f64) as i32
    }
}

/// Samples the terrain function. Construct one per job: `Worley` is not `Send`.
pub struct TerrainGenerator {
    config: Arc<TerrainConfig>,
    perlin: Perlin,
    worley: Worley,
    ceiling: i32,
}

impl TerrainGenerator {
    pub fn new(config: Arc<TerrainConfig>) -> Self {
        let perlin = Perlin::new(config.noise.seed);
        let worley = Worley::new(config.noise.seed.wrapping_add(1)).set_return_type(ReturnType::Distance);
        let ceiling = config.surface_search_ceiling();
        Self {
            config,
            perlin,
            worley,
            ceiling,
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Clamped density at a world voxel.
    pub fn density(&self, x: i32, y: i32, z: i32) -> f64 {
        let noise = &self.config.noise;
        let mut frequency = noise.frequency;
        let mut amplitude = noise.amplitude;
        let mut value = 0.0;

        for _ in 0..noise.octaves {
            let sample = self.perlin.get([
                x as f64 * frequency,
                y as f64 * frequency,
                z as f64 * frequency,
            ]);
            value += sample * amplitude;
            frequency *= noise.lacunarity;
            amplitude *= noise.persistence;
        }

        value += noise.density_offset;
        value -= y.max(0) as f64 * noise.height_falloff;
        value.max(0.0)
    }

    /// Base-terrain block at a world voxel, ignoring trees.
    pub fn base_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.config.block_for_density(self.density(x, y, z))
    }

    /// Normalized 2D Worley distance at a column, in 0..1.
    pub fn feature_distance(&self, x: i32, z: i32, cell_frequency: f64) -> f64 {
        let raw = self
            .worley
            .get([x as f64 * cell_frequency, z as f64 * cell_frequency]);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Highest solid base-terrain voxel of a column at or above `min_y`.
    ///
    /// # Returns
    /// The surface y and the block found there, or `None` if the column is open down to
    /// `min_y`.
    pub fn surface_at(&self, x: i32, z: i32, min_y: i32) -> Option<(i32, BlockId)> {
        (min_y..=self.ceiling)
            .rev()
            .map(|y| (y, self.base_block(x, y, z)))
            .find(|(_, block)| *block != AIR)
    }

    pub fn surface_search_ceiling(&self) -> i32 {
        self.ceiling
    }

    /// Generates the full voxel buffer of a chunk.
    pub fn generate(&self, position: Point3<i32>) -> Vec<Voxel> {
        let origin = chunk_origin(position);
        let mut voxels = Vec::with_capacity(CHUNK_SIZE as usize);

        // Loop order matches the buffer layout, so voxels are pushed in index order.
        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let block = self.base_block(origin.x + x, origin.y + y, origin.z + z);
                    voxels.push(Voxel::new(block));
                }
            }
        }
        debug_assert_eq!(voxels.len(), CHUNK_SIZE as usize);

        if let Some(tree_settings) = &self.config.trees {
            trees::place_trees(self, tree_settings, origin, &mut voxels);
        }

        voxels
    }
}
