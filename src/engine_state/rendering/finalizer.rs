//! # Mesh Finalizer
//!
//! The boundary where finished chunk meshes leave the engine.
//!
//! The engine hands every freshly built mesh to a [`MeshFinalizer`] exactly once, with
//! ownership of the buffers, and tells it to release a chunk's resources when the chunk
//! is unloaded, leaves render range, or meshes to nothing. What the finalizer does with
//! the geometry (GPU upload, physics colliders) is up to the implementation.
//!
//! [`MeshStore`] is the in-crate implementation: it packs vertices, computes flat
//! normals, bounds and collider triangles, and keeps everything keyed by chunk.

use std::collections::HashMap;

use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::voxels::chunk::chunk_origin;

use super::meshing::{ChunkMeshBuffers, MeshData};
use super::vertex::Vertex;

/// One chunk's finished meshes, moved into the finalizer.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshHandoff {
    /// Chunk coordinate the meshes belong to.
    pub position: Point3<i32>,
    /// World-space voxel coordinate that mesh positions are relative to.
    pub anchor: Point3<i32>,
    /// `None` when the chunk has no visible solid faces.
    pub terrain: Option<MeshData>,
    /// `None` when the chunk has no visible water faces.
    pub water: Option<MeshData>,
}

impl MeshHandoff {
    /// Wraps a chunk's buffers, turning empty meshes into `None`.
    pub fn new(position: Point3<i32>, buffers: ChunkMeshBuffers) -> Self {
        let non_empty = |mesh: MeshData| (!mesh.is_empty()).then_some(mesh);
        Self {
            position,
            anchor: chunk_origin(position),
            terrain: non_empty(buffers.terrain),
            water: non_empty(buffers.water),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terrain.is_none() && self.water.is_none()
    }
}

/// Consumer of finished chunk meshes.
pub trait MeshFinalizer {
    /// Takes ownership of a chunk's new meshes, replacing any it already had.
    fn finalize(&mut self, handoff: MeshHandoff);

    /// Drops everything held for a chunk. Releasing an unknown chunk is a no-op.
    fn release(&mut self, position: Point3<i32>);
}

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = [f32; 3]>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = Point3::from(points.next()?);
        let mut bounds = Aabb {
            min: first,
            max: first,
        };
        for [x, y, z] in points {
            bounds.min = Point3::new(bounds.min.x.min(x), bounds.min.y.min(y), bounds.min.z.min(z));
            bounds.max = Point3::new(bounds.max.x.max(x), bounds.max.y.max(y), bounds.max.z.max(z));
        }
        Some(bounds)
    }

    pub fn contains(&self, point: Point3<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }
}

/// A mesh packed for upload.
#[derive(Clone, Debug)]
pub struct UploadedMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// World-space bounds.
    pub bounds: Aabb,
}

impl UploadedMesh {
    /// Packs a chunk-local mesh into world-space vertices with flat normals.
    ///
    /// Returns `None` for an empty mesh.
    pub fn pack(mesh: MeshData, anchor: Point3<i32>) -> Option<Self> {
        let offset = Vector3::new(anchor.x as f32, anchor.y as f32, anchor.z as f32);
        let mut vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .enumerate()
            .map(|(index, position)| Vertex {
                position: (Vector3::from(*position) + offset).into(),
                normal: [0.0; 3],
                tex_coords: mesh.uv0.get(index).copied().unwrap_or_default(),
                tile_offset: mesh.uv1.get(index).copied().unwrap_or_default(),
            })
            .collect();

        for triangle in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
                .map(|index| Vector3::from(vertices[index as usize].position));
            let normal = (b - a).cross(c - a);
            if normal.magnitude2() == 0.0 {
                continue;
            }
            let normal: [f32; 3] = normal.normalize().into();
            for index in triangle {
                vertices[*index as usize].normal = normal;
            }
        }

        let bounds = Aabb::from_points(vertices.iter().map(|vertex| vertex.position))?;
        Some(Self {
            vertices,
            indices: mesh.indices,
            bounds,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes in [`Vertex`] layout.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes, little-endian on every supported target.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// World-space triangles for a physics collider.
    pub fn collider_triangles(&self) -> Vec<[Point3<f32>; 3]> {
        self.indices
            .chunks_exact(3)
            .map(|triangle| {
                [triangle[0], triangle[1], triangle[2]]
                    .map(|index| Point3::from(self.vertices[index as usize].position))
            })
            .collect()
    }
}

/// Everything the store holds for one chunk.
#[derive(Clone, Debug)]
pub struct ChunkResources {
    pub anchor: Point3<i32>,
    pub terrain: Option<UploadedMesh>,
    pub water: Option<UploadedMesh>,
    /// Terrain only; water does not collide.
    pub collider: Vec<[Point3<f32>; 3]>,
}

/// In-memory [`MeshFinalizer`] that keeps packed meshes and colliders per chunk.
#[derive(Debug, Default)]
pub struct MeshStore {
    chunks: HashMap<Point3<i32>, ChunkResources>,
    uploads: usize,
    releases: usize,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position: Point3<i32>) -> Option<&ChunkResources> {
        self.chunks.get(&position)
    }

    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Number of chunks currently holding meshes.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of handoffs accepted so far.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Number of chunks released so far.
    pub fn releases(&self) -> usize {
        self.releases
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        self.chunks.keys().copied()
    }

    /// Terrain and water triangles across every chunk.
    pub fn triangle_count(&self) -> usize {
        self.chunks
            .values()
            .flat_map(|chunk| [chunk.terrain.as_ref(), chunk.water.as_ref()])
            .flatten()
            .map(UploadedMesh::triangle_count)
            .sum()
    }

    /// Bytes held in packed vertex and index buffers.
    pub fn byte_size(&self) -> usize {
        self.chunks
            .values()
            .flat_map(|chunk| [chunk.terrain.as_ref(), chunk.water.as_ref()])
            .flatten()
            .map(|mesh| mesh.vertex_bytes().len() + mesh.index_bytes().len())
            .sum()
    }
}

impl MeshFinalizer for MeshStore {
    fn finalize(&mut self, handoff: MeshHandoff) {
        let anchor = handoff.anchor;
        let terrain = handoff.terrain.and_then(|mesh| UploadedMesh::pack(mesh, anchor));
        let water = handoff.water.and_then(|mesh| UploadedMesh::pack(mesh, anchor));
        let collider = terrain
            .as_ref()
            .map(UploadedMesh::collider_triangles)
            .unwrap_or_default();

        self.chunks.insert(
            handoff.position,
            ChunkResources {
                anchor,
                terrain,
                water,
                collider,
            },
        );
        self.uploads += 1;
    }

    fn release(&mut self, position: Point3<i32>) {
        if self.chunks.remove(&position).is_some() {
            self.releases += 1;
        }
    }
}
