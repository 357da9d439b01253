//! Greedy meshing is lossless and culls exactly the hidden faces.

use std::collections::HashSet;

use voxel_world::engine_state::rendering::meshing::mesh::{terrain_quads, Quad};
use voxel_world::engine_state::voxels::block::block_side::BlockSide;
use voxel_world::engine_state::voxels::chunk::neighborhood::ChunkNeighborhood;
use voxel_world::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION, CHUNK_SIZE};
use voxel_world::engine_state::voxels::voxel::Voxel;

type Face = (BlockSide, i32, i32, i32);

fn empty_chunk() -> Vec<Voxel> {
    vec![Voxel::AIR; CHUNK_SIZE as usize]
}

/// A lumpy chunk with three block types and plenty of holes.
fn noisy_chunk(seed: u64) -> Vec<Voxel> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut voxels = empty_chunk();
    for y in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let fill = if y < 12 { 85 } else { 30 };
                if rng.u8(0..100) < fill {
                    voxels[Chunk::index(x, y, z)] = Voxel::new(rng.u16(1..=3));
                }
            }
        }
    }
    voxels
}

/// Every (solid voxel, air-adjacent side) pair, with outside the chunk reading as Air.
fn naive_faces(voxels: &[Voxel]) -> HashSet<Face> {
    let mut faces = HashSet::new();
    for y in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                if !voxels[Chunk::index(x, y, z)].is_solid() {
                    continue;
                }
                for side in BlockSide::all() {
                    let offset = side.offset();
                    let (nx, ny, nz) = (x + offset.x, y + offset.y, z + offset.z);
                    let covered =
                        Chunk::contains_local(nx, ny, nz) && voxels[Chunk::index(nx, ny, nz)].is_solid();
                    if !covered {
                        faces.insert((side, x, y, z));
                    }
                }
            }
        }
    }
    faces
}

fn expand(quads: &[Quad]) -> Vec<Face> {
    quads
        .iter()
        .flat_map(|quad| quad.unit_faces().map(move |(x, y, z)| (quad.side, x, y, z)))
        .collect()
}

#[test]
fn test_isolated_chunk_merge_is_lossless() {
    for seed in [1, 2, 3] {
        let voxels = noisy_chunk(seed);
        let naive = naive_faces(&voxels);
        let quads = terrain_quads(&ChunkNeighborhood::isolated(&voxels));

        assert!(quads.len() <= naive.len());
        let expanded = expand(&quads);
        let unique: HashSet<Face> = expanded.iter().copied().collect();
        assert_eq!(expanded.len(), unique.len(), "quads overlap");
        assert_eq!(unique, naive);

        for quad in &quads {
            for (x, y, z) in quad.unit_faces() {
                assert_eq!(voxels[Chunk::index(x, y, z)].block_id(), quad.value);
            }
        }
    }
}

#[test]
fn test_boundary_face_between_two_chunks() {
    let mut solid = empty_chunk();
    solid[Chunk::index(CHUNK_DIMENSION - 1, 4, 9)] = Voxel::new(1);
    let air = empty_chunk();

    // Left chunk solid at its +X edge, right chunk empty.
    let mut left_neighbors = [None; 6];
    left_neighbors[BlockSide::RIGHT as usize] = Some(air.as_slice());
    let left_quads = terrain_quads(&ChunkNeighborhood::new(&solid, left_neighbors));

    let mut right_neighbors = [None; 6];
    right_neighbors[BlockSide::LEFT as usize] = Some(solid.as_slice());
    let right_quads = terrain_quads(&ChunkNeighborhood::new(&air, right_neighbors));

    let shared_face = |left: &[Quad], right: &[Quad]| {
        let left = left
            .iter()
            .filter(|quad| quad.side == BlockSide::RIGHT && quad.plane() == CHUNK_DIMENSION);
        let right = right
            .iter()
            .filter(|quad| quad.side == BlockSide::LEFT && quad.plane() == 0);
        left.chain(right).copied().collect::<Vec<Quad>>()
    };

    let faces = shared_face(&left_quads, &right_quads);
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].side, BlockSide::RIGHT);
    assert!(right_quads.is_empty());

    // Swapped: the right chunk holds the voxel at its -X edge.
    let mut solid = empty_chunk();
    solid[Chunk::index(0, 4, 9)] = Voxel::new(1);

    let mut left_neighbors = [None; 6];
    left_neighbors[BlockSide::RIGHT as usize] = Some(solid.as_slice());
    let left_quads = terrain_quads(&ChunkNeighborhood::new(&air, left_neighbors));

    let mut right_neighbors = [None; 6];
    right_neighbors[BlockSide::LEFT as usize] = Some(air.as_slice());
    let right_quads = terrain_quads(&ChunkNeighborhood::new(&solid, right_neighbors));

    assert!(left_quads.is_empty());
    let faces = shared_face(&left_quads, &right_quads);
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].side, BlockSide::LEFT);
    assert_eq!((faces[0].width, faces[0].height), (1, 1));
}

#[test]
fn test_solid_neighbor_hides_boundary_face() {
    let mut left = empty_chunk();
    left[Chunk::index(CHUNK_DIMENSION - 1, 0, 0)] = Voxel::new(1);
    let mut right = empty_chunk();
    right[Chunk::index(0, 0, 0)] = Voxel::new(2);

    let mut neighbors = [None; 6];
    neighbors[BlockSide::RIGHT as usize] = Some(right.as_slice());
    let quads = terrain_quads(&ChunkNeighborhood::new(&left, neighbors));

    assert_eq!(quads.len(), 5);
    assert!(quads.iter().all(|quad| quad.side != BlockSide::RIGHT));
}
