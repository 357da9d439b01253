//! Rendering side of the voxel engine.
//!
//! Everything between a chunk's voxels and the consumer of its geometry: greedy
//! meshing, the background mesh job, and the finalizer boundary through which finished
//! meshes leave the engine. Drawing itself is the finalizer's business.

pub mod finalizer;
pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use finalizer::{MeshFinalizer, MeshHandoff, MeshStore};
pub use vertex::Vertex;
