//! # Block Side Module
//!
//! The six faces of a voxel and the three axes they sit on. Meshing walks faces axis by
//! axis, and neighbor lookup uses the same enum to pick which adjacent chunk a coordinate
//! falls into.

use cgmath::Vector3;

/// One of the three world axes.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Maps a (layer, u, v) triple on this axis to chunk-local (x, y, z).
    ///
    /// * Y: u runs along x, v along z
    /// * X: u runs along y, v along z
    /// * Z: u runs along x, v along y
    #[inline]
    pub fn compose(self, layer: i32, u: i32, v: i32) -> (i32, i32, i32) {
        match self {
            Axis::Y => (u, layer, v),
            Axis::X => (layer, u, v),
            Axis::Z => (u, v, layer),
        }
    }

    /// Inverse of [`Axis::compose`], returning (layer, u, v).
    #[inline]
    pub fn decompose(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        match self {
            Axis::Y => (y, x, z),
            Axis::X => (x, y, z),
            Axis::Z => (z, x, y),
        }
    }
}

/// Represents the six faces of a voxel block.
///
/// The discriminant doubles as an index into per-side arrays, such as the neighbor
/// table of a chunk neighborhood.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns all six faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The order in which the mesher visits faces: axis Y, then X, then Z, with the
    /// positive direction before the negative one.
    pub fn meshing_order() -> [BlockSide; 6] {
        [
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::RIGHT,
            BlockSide::LEFT,
            BlockSide::FRONT,
            BlockSide::BACK,
        ]
    }

    pub fn axis(self) -> Axis {
        match self {
            BlockSide::FRONT | BlockSide::BACK => Axis::Z,
            BlockSide::BOTTOM | BlockSide::TOP => Axis::Y,
            BlockSide::LEFT | BlockSide::RIGHT => Axis::X,
        }
    }

    /// `true` if the outward normal points along the positive axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::FRONT | BlockSide::TOP | BlockSide::RIGHT)
    }

    /// +1 or -1 along the face axis.
    pub fn direction(self) -> i32 {
        if self.is_positive() {
            1
        } else {
            -1
        }
    }

    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Unit offset to the neighboring cell (or chunk) across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vector3<f32> {
        let offset = self.offset();
        Vector3::new(offset.x as f32, offset.y as f32, offset.z as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_round_trips() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let (x, y, z) = axis.compose(3, 5, 7);
            assert_eq!(axis.decompose(x, y, z), (3, 5, 7));
        }
    }

    #[test]
    fn test_offsets_match_axis_and_direction() {
        for side in BlockSide::all() {
            let offset = side.offset();
            let (layer, u, v) = side.axis().decompose(offset.x, offset.y, offset.z);
            assert_eq!((layer, u, v), (side.direction(), 0, 0));
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.opposite().offset(), -offset);
        }
    }

    #[test]
    fn test_meshing_order_covers_every_side() {
        let order = BlockSide::meshing_order();
        for side in BlockSide::all() {
            assert_eq!(order.iter().filter(|s| **s == side).count(), 1);
        }
        assert_eq!(order[0].axis(), Axis::Y);
        assert_eq!(order[2].axis(), Axis::X);
        assert_eq!(order[4].axis(), Axis::Z);
    }
}
