//! # Core Module
//!
//! Shared primitives used by every stage of the voxel pipeline.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted handle with read-write locking. Chunks are
//!   stored in the world as `MtResource<Chunk>` so worker jobs can hold a chunk alive and
//!   borrow it for the duration of a stage without the store itself being locked.
//!
//! ## Usage
//! ```rust
//! use voxel_world::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
