//! # Block Module
//!
//! Block identity and block appearance.
//!
//! Blocks are data-driven: a [`catalog::BlockCatalog`] lists block definitions in order,
//! each definition receives a dense integer id, and a [`texture_table::BlockTextureTable`]
//! is built once from the catalog and then read concurrently by meshing jobs.
//!
//! Id `0` is always Air and never appears in a catalog.

pub mod block_side;
pub mod catalog;
pub mod texture_table;

/// Dense integer id of a block type. Only the low 12 bits are stored in a voxel.
pub type BlockId = u16;

/// The id reserved for Air.
pub const AIR: BlockId = 0;
