//! # Voxel Module
//!
//! A voxel is a single packed `u32` holding everything the pipeline knows about one
//! cell of the world.
//!
//! ## Bit Layout
//!
//! ```text
//!  31      25 24    19 18   15 14  12 11          0
//! +----------+--------+-------+------+-------------+
//! |  state   |  tint  |  rot  | water|  block id   |
//! +----------+--------+-------+------+-------------+
//!     7 bits   6 bits  4 bits  3 bits    12 bits
//! ```
//!
//! * **block id**: index into the block texture table, `0` is Air
//! * **water**: water level, `0` dry through `7` full
//! * **rotation**: facing of the block, `0..=15`
//! * **tint**: R2G2B2 packed color
//! * **state**: free bit flags for stateful blocks (doors, switches)
//!
//! A voxel is solid if and only if its block id is non-zero. Water may share a cell
//! with Air.

use bytemuck::{Pod, Zeroable};

use super::block::BlockId;

const ID_BITS: u32 = 12;
const WATER_BITS: u32 = 3;
const ROTATION_BITS: u32 = 4;
const TINT_BITS: u32 = 6;
const STATE_BITS: u32 = 7;

const ID_SHIFT: u32 = 0;
const WATER_SHIFT: u32 = ID_SHIFT + ID_BITS;
const ROTATION_SHIFT: u32 = WATER_SHIFT + WATER_BITS;
const TINT_SHIFT: u32 = ROTATION_SHIFT + ROTATION_BITS;
const STATE_SHIFT: u32 = TINT_SHIFT + TINT_BITS;

const ID_MASK: u32 = (1 << ID_BITS) - 1;
const WATER_MASK: u32 = (1 << WATER_BITS) - 1;
const ROTATION_MASK: u32 = (1 << ROTATION_BITS) - 1;
const TINT_MASK: u32 = (1 << TINT_BITS) - 1;
const STATE_MASK: u32 = (1 << STATE_BITS) - 1;

/// Highest block id that fits in the id field.
pub const MAX_BLOCK_ID: BlockId = ID_MASK as BlockId;
/// Water level of a full cell.
pub const MAX_WATER_LEVEL: u8 = WATER_MASK as u8;

/// A single packed voxel.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Voxel(u32);

impl Voxel {
    /// An empty, dry cell.
    pub const AIR: Voxel = Voxel(0);

    /// Creates a voxel of the given block id with every other field cleared.
    pub fn new(block_id: BlockId) -> Self {
        Self::AIR.with_block_id(block_id)
    }

    /// Reinterprets raw bits as a voxel.
    pub const fn from_bits(bits: u32) -> Self {
        Voxel(bits)
    }

    /// Returns the raw packed bits.
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    #[inline]
    fn field(self, shift: u32, mask: u32) -> u32 {
        (self.0 >> shift) & mask
    }

    #[inline]
    fn with_field(self, shift: u32, mask: u32, value: u32) -> Self {
        debug_assert!(value <= mask, "value {value} does not fit in a {mask:#x} field");
        Voxel((self.0 & !(mask << shift)) | ((value & mask) << shift))
    }

    #[inline]
    pub fn block_id(self) -> BlockId {
        self.field(ID_SHIFT, ID_MASK) as BlockId
    }

    #[inline]
    pub fn with_block_id(self, block_id: BlockId) -> Self {
        self.with_field(ID_SHIFT, ID_MASK, block_id as u32)
    }

    #[inline]
    pub fn water_level(self) -> u8 {
        self.field(WATER_SHIFT, WATER_MASK) as u8
    }

    #[inline]
    pub fn with_water_level(self, level: u8) -> Self {
        self.with_field(WATER_SHIFT, WATER_MASK, level as u32)
    }

    #[inline]
    pub fn rotation(self) -> u8 {
        self.field(ROTATION_SHIFT, ROTATION_MASK) as u8
    }

    #[inline]
    pub fn with_rotation(self, rotation: u8) -> Self {
        self.with_field(ROTATION_SHIFT, ROTATION_MASK, rotation as u32)
    }

    /// Packed R2G2B2 tint.
    #[inline]
    pub fn tint(self) -> u8 {
        self.field(TINT_SHIFT, TINT_MASK) as u8
    }

    #[inline]
    pub fn with_tint(self, tint: u8) -> Self {
        self.with_field(TINT_SHIFT, TINT_MASK, tint as u32)
    }

    /// Packs three 2-bit channels into the tint field.
    pub fn with_tint_channels(self, r: u8, g: u8, b: u8) -> Self {
        self.with_tint(((r & 3) << 4) | ((g & 3) << 2) | (b & 3))
    }

    /// Expands the tint to 8 bits per channel (each 2-bit step is 85).
    pub fn tint_rgb(self) -> [u8; 3] {
        let tint = self.tint();
        [((tint >> 4) & 3) * 85, ((tint >> 2) & 3) * 85, (tint & 3) * 85]
    }

    #[inline]
    pub fn state_flags(self) -> u8 {
        self.field(STATE_SHIFT, STATE_MASK) as u8
    }

    #[inline]
    pub fn with_state_flags(self, flags: u8) -> Self {
        self.with_field(STATE_SHIFT, STATE_MASK, flags as u32)
    }

    /// Solid means "not Air". Solidity never depends on water.
    #[inline]
    pub fn is_solid(self) -> bool {
        self.block_id() != 0
    }

    #[inline]
    pub fn has_water(self) -> bool {
        self.water_level() > 0
    }
}

impl std::fmt::Debug for Voxel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voxel")
            .field("block_id", &self.block_id())
            .field("water", &self.water_level())
            .field("rotation", &self.rotation())
            .field("tint", &self.tint())
            .field("state", &self.state_flags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_independent() {
        let voxel = Voxel::new(4095)
            .with_water_level(7)
            .with_rotation(15)
            .with_tint(63)
            .with_state_flags(127);
        assert_eq!(voxel.to_bits(), u32::MAX);

        let cleared = voxel.with_water_level(0);
        assert_eq!(cleared.block_id(), 4095);
        assert_eq!(cleared.rotation(), 15);
        assert_eq!(cleared.tint(), 63);
        assert_eq!(cleared.state_flags(), 127);
        assert_eq!(cleared.water_level(), 0);
    }

    #[test]
    fn test_layout_matches_shifts() {
        assert_eq!(Voxel::new(1).to_bits(), 1);
        assert_eq!(Voxel::AIR.with_water_level(1).to_bits(), 1 << 12);
        assert_eq!(Voxel::AIR.with_rotation(1).to_bits(), 1 << 15);
        assert_eq!(Voxel::AIR.with_tint(1).to_bits(), 1 << 19);
        assert_eq!(Voxel::AIR.with_state_flags(1).to_bits(), 1 << 25);
    }

    #[test]
    fn test_solidity_ignores_water() {
        assert!(!Voxel::AIR.with_water_level(7).is_solid());
        assert!(Voxel::AIR.with_water_level(7).has_water());
        assert!(Voxel::new(3).is_solid());
    }

    #[test]
    fn test_tint_expansion() {
        let voxel = Voxel::AIR.with_tint_channels(3, 1, 0);
        assert_eq!(voxel.tint(), 0b11_01_00);
        assert_eq!(voxel.tint_rgb(), [255, 85, 0]);
    }
}
