//! # Voxel World
//!
//! Everything that describes or changes voxel content.
//!
//! ## Architecture
//!
//! * **Voxel**: a packed `u32` carrying block id, water level, rotation, tint and flags
//! * **Block**: the block catalog and the texture table built from it at startup
//! * **Chunk**: fixed 32x32x32 buffers plus the lifecycle flags the pipeline reads
//! * **World**: the sparse coordinate-to-chunk store
//! * **Streaming**: keeps the loaded set equal to a sphere around the observer
//! * **Terrain**: deterministic density noise and tree placement
//! * **Water**: the two-phase gravity simulation
//! * **Tasks**: worker jobs for terrain generation and water flow
//!
//! ## Thread Safety
//!
//! Chunks are shared as `MtResource<Chunk>` handles. Jobs lock only the chunk they
//! work on; anything they need from a neighbor is either read-locked for the job's
//! duration or copied on the coordinating thread before the job is published.

pub mod block;
pub mod chunk;
pub mod streaming;
pub mod tasks;
pub mod terrain;
pub mod voxel;
pub mod water;
pub mod world;
