//! # Voxel World Entry Point
//!
//! Runs the headless demo: an observer walks through the bundled world while the
//! pipeline streams, generates, simulates and meshes around it.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! VOXEL_WORLD_DEFINITION=my_world.json cargo run --release
//! ```

fn main() {
    voxel_world::run();
}
