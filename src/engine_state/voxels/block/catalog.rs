//! # Block Catalog
//!
//! The ordered list of block definitions a world is built from. Order matters: the
//! definition at position `i` receives block id `i + 1`, since id `0` is Air.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine_state::error::CatalogError;
use crate::engine_state::voxels::voxel::MAX_BLOCK_ID;

use super::BlockId;

/// A single block type as it appears in a world definition.
///
/// `top` and `bottom` fall back to `side` when omitted, so a block that looks the same
/// from every direction only needs `side`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    #[serde(default = "default_solid")]
    pub solid: bool,
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
}

fn default_solid() -> bool {
    true
}

impl BlockDefinition {
    /// Texture name for the top face.
    pub fn top_texture(&self) -> Option<&str> {
        self.top.as_deref().or(self.side.as_deref())
    }

    /// Texture name for the four side faces.
    pub fn side_texture(&self) -> Option<&str> {
        self.side.as_deref()
    }

    /// Texture name for the bottom face.
    pub fn bottom_texture(&self) -> Option<&str> {
        self.bottom.as_deref().or(self.side.as_deref())
    }
}

/// Ordered block definitions plus a name index.
#[derive(Clone, Debug, Default)]
pub struct BlockCatalog {
    definitions: Vec<BlockDefinition>,
    ids_by_name: HashMap<String, BlockId>,
}

impl BlockCatalog {
    /// Builds a catalog, assigning ids in order.
    ///
    /// # Errors
    /// Fails if the catalog would need an id above [`MAX_BLOCK_ID`], if a name repeats,
    /// or if a definition tries to redefine `air`.
    pub fn new(definitions: Vec<BlockDefinition>) -> Result<Self, CatalogError> {
        if definitions.len() > MAX_BLOCK_ID as usize {
            return Err(CatalogError::TooManyBlocks {
                count: definitions.len(),
                max: MAX_BLOCK_ID,
            });
        }

        let mut ids_by_name = HashMap::with_capacity(definitions.len());
        for (index, definition) in definitions.iter().enumerate() {
            if definition.name.eq_ignore_ascii_case("air") {
                return Err(CatalogError::ReservedName);
            }
            // Length was checked above, so `index + 1` fits.
            let id = (index + 1) as BlockId;
            if ids_by_name.insert(definition.name.clone(), id).is_some() {
                return Err(CatalogError::DuplicateName(definition.name.clone()));
            }
            if !definition.solid {
                log::warn!(
                    "block `{}` is declared non-solid; every non-air block is meshed as solid",
                    definition.name
                );
            }
        }

        Ok(Self {
            definitions,
            ids_by_name,
        })
    }

    /// Number of non-air blocks.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Looks up a block id by name. `air` always resolves to id 0.
    pub fn id_of(&self, name: &str) -> Option<BlockId> {
        if name.eq_ignore_ascii_case("air") {
            return Some(super::AIR);
        }
        self.ids_by_name.get(name).copied()
    }

    /// Returns the definition for an id, or `None` for Air and unknown ids.
    pub fn definition(&self, id: BlockId) -> Option<&BlockDefinition> {
        (id as usize)
            .checked_sub(1)
            .and_then(|index| self.definitions.get(index))
    }

    /// Iterates `(id, definition)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(index, definition)| ((index + 1) as BlockId, definition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(name: &str) -> BlockDefinition {
        BlockDefinition {
            name: name.to_string(),
            solid: true,
            top: None,
            side: Some(format!("{name}_side")),
            bottom: None,
        }
    }

    #[test]
    fn test_ids_follow_order() {
        let catalog = BlockCatalog::new(vec![block("stone"), block("dirt")]).unwrap();
        assert_eq!(catalog.id_of("air"), Some(0));
        assert_eq!(catalog.id_of("stone"), Some(1));
        assert_eq!(catalog.id_of("dirt"), Some(2));
        assert_eq!(catalog.id_of("lava"), None);
        assert_eq!(catalog.definition(2).map(|d| d.name.as_str()), Some("dirt"));
        assert!(catalog.definition(0).is_none());
    }

    #[test]
    fn test_oversized_catalog_is_rejected() {
        let definitions = (0..=MAX_BLOCK_ID as usize)
            .map(|i| block(&format!("b{i}")))
            .collect();
        assert!(matches!(
            BlockCatalog::new(definitions),
            Err(CatalogError::TooManyBlocks { count: 4096, .. })
        ));
    }

    #[test]
    fn test_largest_catalog_fits() {
        let definitions = (0..MAX_BLOCK_ID as usize)
            .map(|i| block(&format!("b{i}")))
            .collect();
        let catalog = BlockCatalog::new(definitions).unwrap();
        assert_eq!(catalog.id_of("b4094"), Some(4095));
    }

    #[test]
    fn test_duplicate_and_reserved_names() {
        assert!(matches!(
            BlockCatalog::new(vec![block("stone"), block("stone")]),
            Err(CatalogError::DuplicateName(name)) if name == "stone"
        ));
        assert!(matches!(
            BlockCatalog::new(vec![block("Air")]),
            Err(CatalogError::ReservedName)
        ));
    }

    #[test]
    fn test_face_textures_fall_back_to_side() {
        let mut grass = block("grass");
        grass.top = Some("grass_top".into());
        assert_eq!(grass.top_texture(), Some("grass_top"));
        assert_eq!(grass.side_texture(), Some("grass_side"));
        assert_eq!(grass.bottom_texture(), Some("grass_side"));
    }
}
