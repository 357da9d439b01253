//! Deterministic tree placement.
//!
//! Every chunk independently rediscovers every tree that can touch it: it scans its own
//! columns plus a border as wide as the largest canopy, re-derives each candidate's
//! surface from the base terrain function, and stamps only the voxels that land inside
//! its bounds. Columns are visited in ascending world (x, z) order in every chunk, so
//! where two canopies overlap the later tree wins everywhere. Leaves never replace logs.

use cgmath::Point3;

use crate::engine_state::voxels::block::AIR;
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION};
use crate::engine_state::voxels::voxel::Voxel;

use super::{TerrainGenerator, TreeSettings};

/// A tree fully described by its column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeShape {
    pub x: i32,
    pub z: i32,
    /// y of the block the trunk stands on.
    pub surface_y: i32,
    pub trunk_height: i32,
    pub leaf_radius: i32,
}

impl TreeShape {
    pub fn canopy_center(&self) -> Point3<i32> {
        Point3::new(self.x, self.surface_y + self.trunk_height, self.z)
    }

    /// `true` for offsets inside the rounded canopy sphere.
    pub fn in_canopy(&self, dx: i32, dy: i32, dz: i32) -> bool {
        let r = self.leaf_radius;
        dx * dx + dy * dy + dz * dz <= r * r + r / 2
    }

    /// Highest y the tree occupies.
    pub fn top(&self) -> i32 {
        self.surface_y + self.trunk_height + self.leaf_radius
    }

    /// Lowest y the tree occupies. A canopy wider than its trunk is tall hangs below
    /// the first log.
    pub fn bottom(&self) -> i32 {
        (self.canopy_center().y - self.leaf_radius).min(self.surface_y + 1)
    }
}

/// Seed for a column's private random stream.
pub fn column_seed(seed: u32, x: i32, z: i32) -> u64 {
    let mut h = (seed as u64) << 32
        ^ (x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (z as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    // splitmix64 finalizer
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

/// The tree rooted at a column, if any.
pub fn tree_at(generator: &TerrainGenerator, settings: &TreeSettings, x: i32, z: i32) -> Option<TreeShape> {
    if generator.feature_distance(x, z, settings.cell_frequency) >= settings.spawn_threshold {
        return None;
    }

    let (surface_y, block) = generator.surface_at(x, z, settings.min_surface_y)?;
    if block != settings.surface_block {
        return None;
    }

    let mut rng = fastrand::Rng::with_seed(column_seed(generator.config().noise.seed, x, z));
    let trunk_height = rng.i32(settings.min_trunk_height..=settings.max_trunk_height);
    let leaf_radius = rng.i32(settings.min_leaf_radius..=settings.max_leaf_radius);

    Some(TreeShape {
        x,
        z,
        surface_y,
        trunk_height,
        leaf_radius,
    })
}

/// Stamps every tree that reaches the chunk at `origin` into `voxels`.
pub fn place_trees(
    generator: &TerrainGenerator,
    settings: &TreeSettings,
    origin: Point3<i32>,
    voxels: &mut [Voxel],
) {
    let ceiling = generator.surface_search_ceiling();
    let lowest_tree_voxel =
        settings.min_surface_y + (settings.min_trunk_height - settings.max_leaf_radius).min(1);
    let highest_tree_voxel = ceiling + settings.max_trunk_height + settings.max_leaf_radius;
    if origin.y + CHUNK_DIMENSION <= lowest_tree_voxel || origin.y > highest_tree_voxel {
        return;
    }

    let padding = settings.max_leaf_radius;
    for x in origin.x - padding..origin.x + CHUNK_DIMENSION + padding {
        for z in origin.z - padding..origin.z + CHUNK_DIMENSION + padding {
            let Some(tree) = tree_at(generator, settings, x, z) else {
                continue;
            };
            if !reaches_chunk(&tree, origin) {
                continue;
            }
            stamp_tree(generator, settings, &tree, origin, voxels);
        }
    }
}

fn reaches_chunk(tree: &TreeShape, origin: Point3<i32>) -> bool {
    tree.top() >= origin.y && tree.bottom() < origin.y + CHUNK_DIMENSION
}

fn stamp_tree(
    generator: &TerrainGenerator,
    settings: &TreeSettings,
    tree: &TreeShape,
    origin: Point3<i32>,
    voxels: &mut [Voxel],
) {
    let log_block = settings.log_block;
    let mut write = |world: Point3<i32>, block, over_logs: bool| {
        let (x, y, z) = (world.x - origin.x, world.y - origin.y, world.z - origin.z);
        if !Chunk::contains_local(x, y, z) {
            return;
        }
        let slot = &mut voxels[Chunk::index(x, y, z)];
        if over_logs || slot.block_id() != log_block {
            *slot = Voxel::new(block);
        }
    };

    let center = tree.canopy_center();
    let r = tree.leaf_radius;
    for dy in -r..=r {
        for dz in -r..=r {
            for dx in -r..=r {
                if !tree.in_canopy(dx, dy, dz) {
                    continue;
                }
                let leaf = Point3::new(center.x + dx, center.y + dy, center.z + dz);
                let in_trunk = dx == 0 && dz == 0 && leaf.y <= center.y;
                if in_trunk || generator.base_block(leaf.x, leaf.y, leaf.z) != AIR {
                    continue;
                }
                write(leaf, settings.leaf_block, false);
            }
        }
    }

    for y in tree.surface_y + 1..=tree.surface_y + tree.trunk_height {
        write(Point3::new(tree.x, y, tree.z), settings.log_block, true);
    }
}
