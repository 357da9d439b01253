//! Error types for world construction.
//!
//! Everything that can go wrong happens at startup, while the block catalog and the
//! world definition are turned into immutable resources. Once the pipeline is running
//! there are no recoverable errors.

use std::path::PathBuf;

use thiserror::Error;

use super::voxels::block::BlockId;

/// Errors raised while building the block texture table from a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog needs more ids than a voxel can store.
    #[error("block catalog has {count} entries but at most {max} non-air block ids fit in a voxel")]
    TooManyBlocks {
        /// Number of definitions in the catalog.
        count: usize,
        /// Largest id a voxel can hold.
        max: BlockId,
    },

    /// Two definitions share a name.
    #[error("block `{0}` is defined more than once")]
    DuplicateName(String),

    /// `air` is implicit and may not be redefined.
    #[error("block name `air` is reserved for id 0")]
    ReservedName,
}

/// Errors raised while loading or resolving a world definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The definition file could not be read.
    #[error("failed to read world definition {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The definition is not valid JSON for the expected schema.
    #[error("malformed world definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Terrain settings name a block the catalog does not define.
    #[error("terrain config references unknown block `{0}`")]
    UnknownBlock(String),

    #[error("render radius {render} exceeds load radius {load}")]
    RenderRadiusTooLarge {
        /// Configured render radius.
        render: i32,
        /// Configured load radius.
        load: i32,
    },

    #[error("invalid engine setting: {0}")]
    InvalidEngine(String),

    #[error("invalid terrain setting: {0}")]
    InvalidTerrain(String),
}

/// Result alias for world construction.
pub type ConfigResult<T> = Result<T, ConfigError>;
