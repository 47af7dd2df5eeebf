pub mod geometry;
pub mod sprite;

pub use geometry::{Placement, distance, rotation};
pub use sprite::{ARM_SEGMENTS, Anchor, ArmSegment, SpriteKind, SpriteSet};
