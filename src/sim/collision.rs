//! Axis-aligned collision geometry
//!
//! Everything in the world is a box. Entities may report a collision box
//! that differs from the box they are drawn with; obstacles use this to
//! shrink their hitboxes by type and to swap in a blast radius while a
//! bomb explodes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// World-space rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// A box with no area; never overlaps anything
    pub const EMPTY: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the box has no area
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open AABB overlap; touching edges do not count, empty boxes never overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Same box grown by `margin` on every side
    pub fn expand(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Square of side `size` centered on this box's center
    pub fn centered_square(&self, size: f32) -> Rect {
        let c = self.center();
        Rect::new(c.x - size / 2.0, c.y - size / 2.0, size, size)
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Anything that occupies space in the world
pub trait HasCollisionBox {
    /// Nominal (drawn) box
    fn bounds(&self) -> Rect;

    /// Box used for collision; defaults to the nominal box
    fn collision_box(&self) -> Rect {
        self.bounds()
    }
}

impl HasCollisionBox for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// Overlap test that always prefers each side's collision box
#[inline]
pub fn collides<A, B>(a: &A, b: &B) -> bool
where
    A: HasCollisionBox + ?Sized,
    B: HasCollisionBox + ?Sized,
{
    a.collision_box().overlaps(&b.collision_box())
}
