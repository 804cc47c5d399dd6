// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 2D points, quadratic Béziers, and axis-aligned rectangles in glyph units.

use std::ops::{Add, Mul, Neg, Sub};

/// A 2D point or vector with 32-bit floating point coordinates, in font-design units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub fn new(x: f32, y: f32) -> Vec2 {
        Vec2 { x, y }
    }

    #[inline]
    pub fn splat(v: f32) -> Vec2 {
        Vec2 { x: v, y: v }
    }

    #[inline]
    pub fn zero() -> Vec2 {
        Vec2 { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn min(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    #[inline]
    pub fn max(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// The 2D cross product (determinant), `self.x * other.y - self.y * other.x`.
    #[inline]
    pub fn det(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn scale(&self, factor: f32) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }

    #[inline]
    pub fn scale_xy(&self, factors: Vec2) -> Vec2 {
        Vec2::new(self.x * factors.x, self.y * factors.y)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.dot(*self).sqrt()
    }

    #[inline]
    pub fn floor(&self) -> Vec2 {
        Vec2::new(self.x.floor(), self.y.floor())
    }

    #[inline]
    pub fn ceil(&self) -> Vec2 {
        Vec2::new(self.x.ceil(), self.y.ceil())
    }

    #[inline]
    pub fn lerp(&self, other: Vec2, t: f32) -> Vec2 {
        *self + (other - *self).scale(t)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, factor: f32) -> Vec2 {
        self.scale(factor)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// A quadratic Bézier curve `B(t) = (1-t)²·e0 + 2(1-t)t·c + t²·e1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bezier2 {
    pub e0: Vec2,
    pub c: Vec2,
    pub e1: Vec2,
}

impl Bezier2 {
    #[inline]
    pub fn new(e0: Vec2, c: Vec2, e1: Vec2) -> Bezier2 {
        Bezier2 { e0, c, e1 }
    }

    /// A degenerate quadratic representing a straight line, used for on-curve runs
    /// and the implicit segment between two consecutive on-curve TrueType points.
    #[inline]
    pub fn line(e0: Vec2, e1: Vec2) -> Bezier2 {
        Bezier2 { e0, c: e0.lerp(e1, 0.5), e1 }
    }

    #[inline]
    pub fn eval(&self, t: f32) -> Vec2 {
        let one_minus_t = 1.0 - t;
        self.e0.scale(one_minus_t * one_minus_t)
            + self.c.scale(2.0 * one_minus_t * t)
            + self.e1.scale(t * t)
    }

    /// Derivative `B'(t)`, useful for tangents and for locating axis extrema.
    #[inline]
    pub fn tangent(&self, t: f32) -> Vec2 {
        (self.c - self.e0).scale(2.0 * (1.0 - t)) + (self.e1 - self.c).scale(2.0 * t)
    }

    /// The exact axis-aligned bounding box: extrema occur at the endpoints and at
    /// whichever interior `t` zeroes the derivative along each axis.
    pub fn bounding_box(&self) -> Rect {
        let mut min = self.e0.min(self.e1);
        let mut max = self.e0.max(self.e1);

        for t in self.axis_extrema_x().into_iter().chain(self.axis_extrema_y()) {
            let p = self.eval(t);
            min = min.min(p);
            max = max.max(p);
        }

        Rect::from_points(min, max)
    }

    fn axis_extrema(&self, e0: f32, c: f32, e1: f32) -> Option<f32> {
        let denom = e0 - 2.0 * c + e1;
        if denom == 0.0 {
            return None;
        }
        let t = (e0 - c) / denom;
        if t > 0.0 && t < 1.0 {
            Some(t)
        } else {
            None
        }
    }

    fn axis_extrema_x(&self) -> Option<f32> {
        self.axis_extrema(self.e0.x, self.c.x, self.e1.x)
    }

    fn axis_extrema_y(&self) -> Option<f32> {
        self.axis_extrema(self.e0.y, self.c.y, self.e1.y)
    }

    /// Solves `y(t) = y0` for `t ∈ [0, 1)`, used by the mid-inside ray cast.
    ///
    /// Returns up to two roots of the quadratic `(e0.y - 2c.y + e1.y)t² + 2(c.y -
    /// e0.y)t + e0.y - y0 = 0`. `t == 1` is never returned: the caller discounts the
    /// shared endpoint with the following segment to avoid double-counting at joins.
    pub fn solve_for_y(&self, y0: f32) -> SmallVecT {
        quadratic_roots(self.e0.y, self.c.y, self.e1.y, y0, false)
    }

    /// Solves `x(t) = x0` for `t ∈ [0, 1]`, used by the cell-incidence test.
    pub fn solve_for_x(&self, x0: f32) -> SmallVecT {
        quadratic_roots(self.e0.x, self.c.x, self.e1.x, x0, true)
    }

    /// Solves `y(t) = y0` for `t ∈ [0, 1]`, used by the cell-incidence test.
    pub fn solve_for_y_inclusive(&self, y0: f32) -> SmallVecT {
        quadratic_roots(self.e0.y, self.c.y, self.e1.y, y0, true)
    }
}

fn quadratic_roots(e0: f32, c: f32, e1: f32, target: f32, inclusive: bool) -> SmallVecT {
    let a = e0 - 2.0 * c + e1;
    let b = 2.0 * (c - e0);
    let k = e0 - target;

    let mut roots = SmallVecT::new();
    let in_range = |t: f32| t >= 0.0 && if inclusive { t <= 1.0 } else { t < 1.0 };

    if a.abs() < 1e-9 {
        if b.abs() < 1e-9 {
            return roots;
        }
        let t = -k / b;
        if in_range(t) {
            roots.push(t);
        }
        return roots;
    }

    let disc = b * b - 4.0 * a * k;
    if disc < 0.0 {
        return roots;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    for t in [t0, t1] {
        if in_range(t) {
            roots.push(t);
        }
    }
    roots
}

/// Up to two roots; most cells see zero or one ray-cast intersection per curve.
pub type SmallVecT = smallvec::SmallVec<[f32; 2]>;

/// An axis-aligned rectangle, `origin` inclusive and `lower_right` exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub fn new(origin: Vec2, size: Vec2) -> Rect {
        Rect { origin, size }
    }

    #[inline]
    pub fn from_points(origin: Vec2, lower_right: Vec2) -> Rect {
        Rect { origin, size: lower_right - origin }
    }

    #[inline]
    pub fn lower_right(&self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.lower_right().x
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.lower_right().y
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }
}
