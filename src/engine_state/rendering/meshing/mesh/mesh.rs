//! Mesh data structures and operations for voxel rendering.
//!
//! This module turns merged quads into flat vertex and index buffers. Positions are
//! chunk-local; the finalizer places a mesh in the world through the chunk anchor.

use crate::engine_state::voxels::block::block_side::{Axis, BlockSide};
use crate::engine_state::voxels::block::texture_table::BlockTextureTable;

use super::face::Quad;
use super::water::surface_height;

/// Index pattern of one quad: two triangles sharing the A-C diagonal.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Geometry of one mesh, split into parallel attribute streams.
///
/// Every quad contributes four entries to each vertex stream and six indices. `uv1` is
/// only filled for terrain, where it carries the atlas offset of the quad's tile; it is
/// left empty for water.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Per-vertex tiling coordinates, one unit per voxel.
    pub uv0: Vec<[f32; 2]>,
    /// Per-vertex atlas tile offset.
    pub uv1: Vec<[f32; 2]>,
}

impl MeshData {
    /// Creates an empty mesh with room for `quads` quads.
    pub fn with_quad_capacity(quads: usize, atlas_offsets: bool) -> Self {
        Self {
            positions: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
            uv0: Vec::with_capacity(quads * 4),
            uv1: Vec::with_capacity(if atlas_offsets { quads * 4 } else { 0 }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Appends one quad. `corners` must already be in counter-clockwise order as seen
    /// from the side the face points to.
    pub fn push_quad(&mut self, corners: [[f32; 3]; 4], uvs: [[f32; 2]; 4], atlas_offset: Option<[f32; 2]>) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.uv0.extend_from_slice(&uvs);
        if let Some(offset) = atlas_offset {
            self.uv1.extend_from_slice(&[offset; 4]);
        }
        self.indices.extend(QUAD_INDICES.iter().map(|index| base + index));
    }

    /// Builds the terrain mesh of a set of quads. Quad values are block ids.
    pub fn from_terrain_quads(quads: &[Quad], textures: &BlockTextureTable) -> Self {
        let mut mesh = Self::with_quad_capacity(quads.len(), true);
        for quad in quads {
            let tile = textures.tile(quad.value, quad.side);
            let (corners, uvs) = quad_geometry(quad, quad.plane() as f32);
            mesh.push_quad(corners, uvs, Some(textures.tile_offset(tile)));
        }
        mesh
    }

    /// Builds the water mesh of a set of quads. Top quad values are water levels.
    pub fn from_water_quads(quads: &[Quad]) -> Self {
        let mut mesh = Self::with_quad_capacity(quads.len(), false);
        for quad in quads {
            let plane = if quad.side == BlockSide::TOP {
                quad.layer as f32 + surface_height(quad.value as u8)
            } else {
                quad.plane() as f32
            };
            let (corners, uvs) = quad_geometry(quad, plane);
            mesh.push_quad(corners, uvs, None);
        }
        mesh
    }
}

/// Sign of `e_u × e_v` along the face axis for the mapping in [`Axis::compose`].
fn basis_orientation(axis: Axis) -> i32 {
    match axis {
        Axis::Y => -1,
        Axis::X | Axis::Z => 1,
    }
}

fn compose(axis: Axis, plane: f32, u: f32, v: f32) -> [f32; 3] {
    match axis {
        Axis::Y => [u, plane, v],
        Axis::X => [plane, u, v],
        Axis::Z => [u, v, plane],
    }
}

/// Texture coordinates of a corner, given its offset from the quad origin.
///
/// Side faces map the vertical extent to the texture's second axis, so textures stay
/// upright on X faces as well as Z faces.
fn tiling(axis: Axis, du: f32, dv: f32) -> [f32; 2] {
    match axis {
        Axis::Y | Axis::Z => [du, dv],
        Axis::X => [dv, du],
    }
}

/// Corner positions and tiling coordinates of a quad on the given plane, wound
/// counter-clockwise around the face's outward normal.
fn quad_geometry(quad: &Quad, plane: f32) -> ([[f32; 3]; 4], [[f32; 2]; 4]) {
    let axis = quad.side.axis();
    let (u0, v0) = (quad.u as f32, quad.v as f32);
    let (w, h) = (quad.width as f32, quad.height as f32);

    let offsets = if quad.side.direction() == basis_orientation(axis) {
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
    } else {
        [(0.0, 0.0), (0.0, h), (w, h), (w, 0.0)]
    };

    let corners = offsets.map(|(du, dv)| compose(axis, plane, u0 + du, v0 + dv));
    let uvs = offsets.map(|(du, dv)| tiling(axis, du, dv));
    (corners, uvs)
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;
    use crate::engine_state::voxels::block::catalog::{BlockCatalog, BlockDefinition};

    fn quad(side: BlockSide) -> Quad {
        Quad {
            side,
            layer: 3,
            u: 1,
            v: 2,
            width: 4,
            height: 2,
            value: 1,
        }
    }

    fn textures() -> BlockTextureTable {
        let catalog = BlockCatalog::new(vec![BlockDefinition {
            name: "grass".into(),
            solid: true,
            top: Some("grass_top".into()),
            side: Some("grass_side".into()),
            bottom: Some("dirt".into()),
        }])
        .unwrap();
        BlockTextureTable::from_catalog(&catalog)
    }

    fn triangle_normal(mesh: &MeshData, triangle: usize) -> Vector3<f32> {
        let [a, b, c] = [0, 1, 2].map(|k| Vector3::from(mesh.positions[mesh.indices[triangle * 3 + k] as usize]));
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn test_winding_faces_outward_on_every_side() {
        let textures = textures();
        for side in BlockSide::all() {
            let mesh = MeshData::from_terrain_quads(&[quad(side)], &textures);
            for triangle in 0..mesh.triangle_count() {
                let normal = triangle_normal(&mesh, triangle);
                assert!((normal - side.normal()).magnitude() < 1e-5, "{side:?} wound inward");
            }
        }
    }

    #[test]
    fn test_buffers_stay_parallel() {
        let textures = textures();
        let quads: Vec<Quad> = BlockSide::all().into_iter().map(quad).collect();
        let mesh = MeshData::from_terrain_quads(&quads, &textures);
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.uv0.len(), 24);
        assert_eq!(mesh.uv1.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|index| (*index as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_tiling_spans_quad_extent_and_uses_side_tile() {
        let textures = textures();
        let mesh = MeshData::from_terrain_quads(&[quad(BlockSide::RIGHT), quad(BlockSide::TOP)], &textures);

        // RIGHT: u runs along y (height 4 voxels), v along z; texture x follows z.
        let max_s = mesh.uv0[..4].iter().map(|uv| uv[0]).fold(0.0, f32::max);
        let max_t = mesh.uv0[..4].iter().map(|uv| uv[1]).fold(0.0, f32::max);
        assert_eq!((max_s, max_t), (2.0, 4.0));

        let side_tile = textures.tile(1, BlockSide::RIGHT);
        let top_tile = textures.tile(1, BlockSide::TOP);
        assert_ne!(side_tile, top_tile);
        assert_eq!(mesh.uv1[0], textures.tile_offset(side_tile));
        assert_eq!(mesh.uv1[4], textures.tile_offset(top_tile));
    }

    #[test]
    fn test_positive_faces_sit_one_plane_out() {
        let textures = textures();
        let mesh = MeshData::from_terrain_quads(&[quad(BlockSide::TOP)], &textures);
        assert!(mesh.positions.iter().all(|p| p[1] == 4.0));
        let mesh = MeshData::from_terrain_quads(&[quad(BlockSide::BOTTOM)], &textures);
        assert!(mesh.positions.iter().all(|p| p[1] == 3.0));
    }

    #[test]
    fn test_water_top_height_follows_level() {
        let mut top = quad(BlockSide::TOP);
        top.value = 7;
        let mut low = quad(BlockSide::TOP);
        low.value = 1;
        let side = quad(BlockSide::FRONT);

        let mesh = MeshData::from_water_quads(&[top, low, side]);
        assert!(mesh.uv1.is_empty());
        assert!((mesh.positions[0][1] - 3.9).abs() < 1e-5);
        assert!((mesh.positions[4][1] - (3.0 + 1.0 / 7.0)).abs() < 1e-5);
        // Side faces use the full voxel bounds.
        assert!(mesh.positions[8..].iter().all(|p| p[2] == 4.0));
        let normal = triangle_normal(&mesh, 0);
        assert!((normal - BlockSide::TOP.normal()).magnitude() < 1e-5);
    }
}
