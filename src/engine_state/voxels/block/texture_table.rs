//! # Block Texture Table
//!
//! Maps every block id to the atlas tiles used for its top, side and bottom faces.
//!
//! Textures are packed into a square atlas whose edge, in tiles, is the next power of
//! two that fits every unique texture referenced by the catalog. Texture index `i`
//! lives at tile `(i % size, i / size)`. The table is built once and shared with
//! meshing jobs behind an `Arc`.

use std::collections::HashMap;

use super::block_side::BlockSide;
use super::catalog::BlockCatalog;
use super::BlockId;

/// Integer coordinates of a tile in the atlas.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AtlasTile {
    pub x: u32,
    pub y: u32,
}

/// Atlas tiles for the three kinds of face a block has.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockTextures {
    pub top: AtlasTile,
    pub side: AtlasTile,
    pub bottom: AtlasTile,
}

impl BlockTextures {
    /// Picks the tile for a face: top on +Y, bottom on -Y, side otherwise.
    pub fn for_side(&self, side: BlockSide) -> AtlasTile {
        match side {
            BlockSide::TOP => self.top,
            BlockSide::BOTTOM => self.bottom,
            _ => self.side,
        }
    }
}

/// Dense, read-only per-block texture lookup.
#[derive(Clone, Debug)]
pub struct BlockTextureTable {
    /// Indexed by block id. Entry 0 is Air and is never drawn.
    entries: Vec<BlockTextures>,
    /// Atlas edge length in tiles.
    atlas_size: u32,
    texture_names: Vec<String>,
}

impl BlockTextureTable {
    /// Builds the table from a validated catalog.
    pub fn from_catalog(catalog: &BlockCatalog) -> Self {
        let mut texture_indices: HashMap<String, u32> = HashMap::new();
        let mut texture_names: Vec<String> = Vec::new();

        let mut intern = |name: Option<&str>| -> Option<u32> {
            let name = name?;
            if let Some(index) = texture_indices.get(name) {
                return Some(*index);
            }
            let index = texture_names.len() as u32;
            texture_indices.insert(name.to_string(), index);
            texture_names.push(name.to_string());
            Some(index)
        };

        let mut indexed = Vec::with_capacity(catalog.len());
        for (_, definition) in catalog.iter() {
            let top = intern(definition.top_texture());
            let side = intern(definition.side_texture());
            let bottom = intern(definition.bottom_texture());
            indexed.push((top, side, bottom));
        }

        let atlas_size = Self::atlas_size_for(texture_names.len());
        let tile = |index: Option<u32>| match index {
            Some(index) => AtlasTile {
                x: index % atlas_size,
                y: index / atlas_size,
            },
            None => AtlasTile::default(),
        };

        let mut entries = Vec::with_capacity(indexed.len() + 1);
        entries.push(BlockTextures::default());
        entries.extend(indexed.into_iter().map(|(top, side, bottom)| BlockTextures {
            top: tile(top),
            side: tile(side),
            bottom: tile(bottom),
        }));

        log::info!(
            "Built texture table: {} blocks, {} textures, {}x{} atlas",
            catalog.len(),
            texture_names.len(),
            atlas_size,
            atlas_size
        );

        Self {
            entries,
            atlas_size,
            texture_names,
        }
    }

    /// Smallest power-of-two square that holds `texture_count` tiles.
    pub fn atlas_size_for(texture_count: usize) -> u32 {
        let side = (texture_count as f64).sqrt().ceil() as u32;
        side.max(1).next_power_of_two()
    }

    pub fn atlas_size(&self) -> u32 {
        self.atlas_size
    }

    /// Unique texture names in atlas order.
    pub fn texture_names(&self) -> &[String] {
        &self.texture_names
    }

    /// Number of entries, Air included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Textures for a block id. Unknown ids use tile (0, 0) everywhere.
    pub fn textures(&self, id: BlockId) -> BlockTextures {
        self.entries.get(id as usize).copied().unwrap_or_default()
    }

    /// Tile for one face of one block.
    pub fn tile(&self, id: BlockId, side: BlockSide) -> AtlasTile {
        self.textures(id).for_side(side)
    }

    /// Normalized atlas offset of a tile, written to the second UV channel.
    pub fn tile_offset(&self, tile: AtlasTile) -> [f32; 2] {
        let scale = self.tile_scale();
        [tile.x as f32 * scale, tile.y as f32 * scale]
    }

    /// Width of one tile in normalized atlas units.
    pub fn tile_scale(&self) -> f32 {
        1.0 / self.atlas_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::super::catalog::BlockDefinition;
    use super::*;

    fn definition(name: &str, top: Option<&str>, side: Option<&str>) -> BlockDefinition {
        BlockDefinition {
            name: name.into(),
            solid: true,
            top: top.map(String::from),
            side: side.map(String::from),
            bottom: None,
        }
    }

    #[test]
    fn test_atlas_size_is_power_of_two() {
        assert_eq!(BlockTextureTable::atlas_size_for(0), 1);
        assert_eq!(BlockTextureTable::atlas_size_for(1), 1);
        assert_eq!(BlockTextureTable::atlas_size_for(2), 2);
        assert_eq!(BlockTextureTable::atlas_size_for(4), 2);
        assert_eq!(BlockTextureTable::atlas_size_for(5), 4);
        assert_eq!(BlockTextureTable::atlas_size_for(17), 8);
    }

    #[test]
    fn test_tiles_follow_first_seen_order() {
        let catalog = BlockCatalog::new(vec![
            definition("stone", None, Some("stone")),
            definition("grass", Some("grass_top"), Some("grass_side")),
            definition("dirt", None, Some("dirt")),
            definition("glass", None, None),
        ])
        .unwrap();
        let table = BlockTextureTable::from_catalog(&catalog);

        // stone, grass_top, grass_side, dirt
        assert_eq!(table.atlas_size(), 2);
        assert_eq!(table.texture_names().len(), 4);

        let grass = table.textures(2);
        assert_eq!(grass.top, AtlasTile { x: 1, y: 0 });
        assert_eq!(grass.side, AtlasTile { x: 0, y: 1 });
        assert_eq!(grass.bottom, AtlasTile { x: 0, y: 1 });
        assert_eq!(table.tile(3, BlockSide::TOP), AtlasTile { x: 1, y: 1 });
        assert_eq!(table.tile(4, BlockSide::LEFT), AtlasTile::default());
        assert_eq!(table.tile(999, BlockSide::LEFT), AtlasTile::default());
        assert_eq!(table.tile_offset(AtlasTile { x: 1, y: 1 }), [0.5, 0.5]);
    }
}
