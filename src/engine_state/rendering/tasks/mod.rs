//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Generates terrain and water meshes for a chunk

pub mod chunk_mesh_generation_task;
