// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Approximates a single cubic Bézier curve with a chain of quadratics.
//!
//! A cubic `(P0, P1, P2, P3)` is approximable by one quadratic whose control point
//! is the average of the two "shoulder" controls `(3P1 - P0)/2` and `(3P2 - P3)/2`.
//! See Sederberg §2.6, "Distance Between Two Bézier Curves", for the error estimate
//! used below.

use crate::geometry::{Bezier2, Vec2};
use smallvec::SmallVec;

/// A cubic Bézier curve with four control points, in glyph units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cubic {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl Cubic {
    #[inline]
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Cubic {
        Cubic { p0, p1, p2, p3 }
    }

    fn split(&self, t: f32) -> (Cubic, Cubic) {
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let p0123 = p012.lerp(p123, t);
        (Cubic::new(self.p0, p01, p012, p0123), Cubic::new(p0123, p123, p23, self.p3))
    }

    fn as_quadratic(&self) -> Bezier2 {
        let shoulder0 = self.p1.scale(3.0) - self.p0;
        let shoulder1 = self.p2.scale(3.0) - self.p3;
        let ctrl = shoulder0.lerp(shoulder1, 0.5).scale(0.5);
        Bezier2::new(self.p0, ctrl, self.p3)
    }

    /// Sup-norm error estimate of approximating this cubic by a single quadratic.
    fn quadratic_error(&self) -> f32 {
        let delta = self.p3 - self.p2.scale(3.0) + self.p1.scale(3.0) - self.p0;
        delta.length() / 6.0
    }
}

/// Approximates `cubic` by one or more quadratics within sup-norm error `tolerance`,
/// via recursive midpoint subdivision. Recursion stops at `max_depth`, emitting the
/// current best quadratic regardless of error once the limit is hit.
pub fn flatten(cubic: &Cubic, tolerance: f32, max_depth: u32) -> SmallVec<[Bezier2; 4]> {
    let mut out = SmallVec::new();
    flatten_into(cubic, tolerance, max_depth, &mut out);
    out
}

fn flatten_into(cubic: &Cubic, tolerance: f32, depth: u32, out: &mut SmallVec<[Bezier2; 4]>) {
    if depth == 0 || cubic.quadratic_error() <= tolerance {
        out.push(cubic.as_quadratic());
        return;
    }
    let (a, b) = cubic.split(0.5);
    flatten_into(&a, tolerance, depth - 1, out);
    flatten_into(&b, tolerance, depth - 1, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_max_error(cubic: &Cubic, quads: &[Bezier2], samples: usize) -> f32 {
        // Matches up the quadratic chain to a shared parametrization of the cubic by
        // evenly partitioning [0, 1] across the chain and sampling each piece.
        let mut max_error = 0.0f32;
        let n = quads.len();
        for (i, quad) in quads.iter().enumerate() {
            for s in 0..samples {
                let local_t = s as f32 / (samples - 1) as f32;
                let global_t = (i as f32 + local_t) / n as f32;
                let expected = cubic_eval(cubic, global_t);
                let got = quad.eval(local_t);
                let err = (got - expected).length();
                if err > max_error {
                    max_error = err;
                }
            }
        }
        max_error
    }

    fn cubic_eval(c: &Cubic, t: f32) -> Vec2 {
        let one_minus_t = 1.0 - t;
        c.p0.scale(one_minus_t.powi(3))
            + c.p1.scale(3.0 * one_minus_t.powi(2) * t)
            + c.p2.scale(3.0 * one_minus_t * t.powi(2))
            + c.p3.scale(t.powi(3))
    }

    #[test]
    fn flattens_within_tolerance() {
        // A cubic with a single pronounced hump.
        let cubic = Cubic::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 20.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(30.0, 0.0),
        );
        let tolerance = 0.5;
        let quads = flatten(&cubic, tolerance, 10);
        assert!(quads.len() >= 1 && quads.len() <= 4);
        assert_eq!(quads.first().unwrap().e0, cubic.p0);
        assert_eq!(quads.last().unwrap().e1, cubic.p3);

        let error = sample_max_error(&cubic, &quads, 64);
        // A small multiplicative slack accounts for the estimator being an upper
        // bound rather than the exact Hausdorff distance.
        assert!(error <= tolerance * 4.0, "max sampled error {} exceeds tolerance", error);
    }

    #[test]
    fn a_flat_cubic_is_a_single_quadratic() {
        let line = Cubic::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(9.0, 0.0),
        );
        let quads = flatten(&line, 0.01, 10);
        assert_eq!(quads.len(), 1);
    }

    #[test]
    fn recursion_depth_is_bounded() {
        // A tolerance of zero would recurse forever without the depth cap.
        let cubic = Cubic::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        let quads = flatten(&cubic, 0.0, 6);
        assert_eq!(quads.len(), 1 << 6);
    }
}
