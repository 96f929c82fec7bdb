//! # UV Atlas
//!
//! Where each face of each body segment lives within the skin texture.
//!
//! Every segment of the model is a cuboid, and every cuboid is unwrapped into the texture with the same
//! cross-shaped net, anchored at a per-segment origin:
//! ```text
//!          u   u+d   u+d+w  u+2d+w  u+2d+2w
//!    v     .   [top] [bottom]
//!    v+d [right][front][left][back]
//!    v+d+h
//! ```
//! There are two layers: the base body, and a slightly inflated overlay (hat, jacket, sleeves, pants)
//! packed elsewhere in the same texture.
//!
//! The whole table is built at compile time and is total over [`Segment`] x [`Layer`] x [`Face`],
//! so lookups cannot fail.

use crate::coord::{HEIGHT, WIDTH};

#[derive(
    strum::AsRefStr, strum::EnumIter, strum::EnumCount, PartialEq, Eq, Copy, Clone, Hash, Debug,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Segment {
    Head,
    Torso,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}
#[derive(
    strum::AsRefStr, strum::EnumIter, strum::EnumCount, PartialEq, Eq, Copy, Clone, Hash, Debug,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Layer {
    Base,
    /// Decorative outer layer, drawn over the base without changing its silhouette.
    Overlay,
}
#[derive(
    strum::AsRefStr, strum::EnumIter, strum::EnumCount, PartialEq, Eq, Copy, Clone, Hash, Debug,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Face {
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// The character's right side, -X.
    Right,
    /// +Z, facing the viewer.
    Front,
    /// The character's left side, +X.
    Left,
    /// -Z
    Back,
}

/// Size of a segment's cuboid, in texture cells. This doubles as its size in model units.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Cuboid {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// A rectangle of texture cells.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
impl PixelRect {
    const EMPTY: Self = Self::new(0, 0, 0, 0);
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
    /// Whether two rects share any cell.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x..self.x + self.width).contains(&x) && (self.y..self.y + self.height).contains(&y)
    }
    /// Normalize into `[0, 1]` texture space.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized(&self) -> UvRect {
        let (w, h) = (WIDTH as f32, HEIGHT as f32);
        UvRect {
            u0: self.x as f32 / w,
            v0: self.y as f32 / h,
            u1: (self.x + self.width) as f32 / w,
            v1: (self.y + self.height) as f32 / h,
        }
    }
}

/// A normalized texture-space rectangle. `v` grows downward, matching texture row order.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}
impl UvRect {
    /// Quad corners in the order top-left, top-right, bottom-right, bottom-left.
    #[must_use]
    pub fn corners(&self) -> [ultraviolet::Vec2; 4] {
        use ultraviolet::Vec2;
        [
            Vec2::new(self.u0, self.v0),
            Vec2::new(self.u1, self.v0),
            Vec2::new(self.u1, self.v1),
            Vec2::new(self.u0, self.v1),
        ]
    }
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.u0)
            && unit.contains(&self.v0)
            && unit.contains(&self.u1)
            && unit.contains(&self.v1)
            && self.u0 <= self.u1
            && self.v0 <= self.v1
    }
}

const HEAD: Cuboid = Cuboid {
    width: 8,
    height: 8,
    depth: 8,
};
const TORSO: Cuboid = Cuboid {
    width: 8,
    height: 12,
    depth: 4,
};
const LIMB: Cuboid = Cuboid {
    width: 4,
    height: 12,
    depth: 4,
};

/// Indexed by `Segment`.
const CUBOIDS: [Cuboid; 6] = [HEAD, TORSO, LIMB, LIMB, LIMB, LIMB];
/// Texture origin of each net, indexed by `[Segment][Layer]`.
const ORIGINS: [[(u32, u32); 2]; 6] = [
    [(0, 0), (32, 0)],
    [(16, 16), (16, 32)],
    [(40, 16), (40, 32)],
    [(32, 48), (48, 48)],
    [(0, 16), (0, 32)],
    [(16, 48), (0, 48)],
];

/// Unwrap a cuboid at `(u, v)`, indexed by `Face`.
const fn unfold(u: u32, v: u32, cuboid: Cuboid) -> [PixelRect; 6] {
    let Cuboid {
        width: w,
        height: h,
        depth: d,
    } = cuboid;
    [
        PixelRect::new(u + d, v, w, d),
        PixelRect::new(u + d + w, v, w, d),
        PixelRect::new(u, v + d, d, h),
        PixelRect::new(u + d, v + d, w, h),
        PixelRect::new(u + d + w, v + d, d, h),
        PixelRect::new(u + 2 * d + w, v + d, w, h),
    ]
}

const fn build_atlas() -> [[[PixelRect; 6]; 2]; 6] {
    let mut table = [[[PixelRect::EMPTY; 6]; 2]; 6];
    let mut segment = 0;
    while segment < 6 {
        let mut layer = 0;
        while layer < 2 {
            let (u, v) = ORIGINS[segment][layer];
            table[segment][layer] = unfold(u, v, CUBOIDS[segment]);
            layer += 1;
        }
        segment += 1;
    }
    table
}

static ATLAS: [[[PixelRect; 6]; 2]; 6] = build_atlas();

/// Cuboid dimensions of a segment. Both layers share the same net size.
#[must_use]
pub fn cuboid(segment: Segment) -> Cuboid {
    CUBOIDS[segment as usize]
}
/// The texture cells covering a face.
#[must_use]
pub fn pixel_rect_for(segment: Segment, layer: Layer, face: Face) -> PixelRect {
    ATLAS[segment as usize][layer as usize][face as usize]
}
/// The normalized texture rectangle covering a face.
#[must_use]
pub fn uv_for(segment: Segment, layer: Layer, face: Face) -> UvRect {
    pixel_rect_for(segment, layer, face).normalized()
}
/// Every `(segment, layer, face)` triple in the table.
pub fn all_faces() -> impl Iterator<Item = (Segment, Layer, Face)> {
    use strum::IntoEnumIterator;
    Segment::iter().flat_map(|segment| {
        Layer::iter().flat_map(move |layer| Face::iter().map(move |face| (segment, layer, face)))
    })
}
