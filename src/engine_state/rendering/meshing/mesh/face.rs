use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

/// A merged rectangle of coplanar unit faces.
///
/// A quad lives on one face plane of the chunk. `layer` is the coordinate, along the
/// face axis, of the voxels the faces belong to; `u`, `v`, `width` and `height` give the
/// rectangle on that plane using the axis mapping of
/// [`Axis::compose`](crate::engine_state::voxels::block::block_side::Axis::compose).
///
/// `value` is whatever the mask held: a block id for terrain, a water level for water.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad {
    /// Which side of the voxels this face represents
    pub side: BlockSide,
    pub layer: i32,
    pub u: i32,
    pub v: i32,
    pub width: i32,
    pub height: i32,
    pub value: u16,
}

impl Quad {
    /// Face-plane slice, in `0..=CHUNK_DIMENSION`. Faces lie between voxels, so the
    /// positive face of layer `n` sits on plane `n + 1`.
    pub fn plane(&self) -> i32 {
        if self.side.is_positive() {
            self.layer + 1
        } else {
            self.layer
        }
    }

    /// Number of unit faces this quad covers.
    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Chunk-local coordinates of every voxel whose face this quad covers.
    pub fn unit_faces(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let axis = self.side.axis();
        (self.v..self.v + self.height).flat_map(move |v| {
            (self.u..self.u + self.width).map(move |u| axis.compose(self.layer, u, v))
        })
    }

    /// `true` if the quad lies on the chunk boundary facing outward.
    pub fn is_on_boundary(&self) -> bool {
        self.plane() == 0 || self.plane() == CHUNK_DIMENSION
    }
}
