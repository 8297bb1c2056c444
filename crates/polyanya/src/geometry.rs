//! Planar geometry kernel shared by the mesh and the search.
//!
//! Policy
//! - One fixed tolerance, [`EPSILON`], for every predicate. Near-degenerate
//!   inputs are absorbed by it rather than rejected.
//! - Points are plain `nalgebra` vectors; tolerant equality is the free
//!   function [`approx_eq`] so that `PartialEq` stays exact.

use std::fmt;

use nalgebra::Vector2;

/// A point (or free vector) in the plane.
pub type Point = Vector2<f64>;

/// Tolerance used by all geometric comparisons.
pub const EPSILON: f64 = 1e-8;

/// Z component of the cross product `a × b`.
#[inline]
pub fn cross(a: &Point, b: &Point) -> f64 {
    a.perp(b)
}

/// Both coordinates differ by less than [`EPSILON`].
#[inline]
pub fn approx_eq(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

#[inline]
pub fn distance_sq(a: &Point, b: &Point) -> f64 {
    (a - b).norm_squared()
}

#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    (a - b).norm()
}

/// Turn direction of the polyline `a → b → c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Ccw,
    Collinear,
    Cw,
}

#[inline]
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let z = cross(&(b - a), &(c - b));
    if z.abs() < EPSILON {
        Orientation::Collinear
    } else if z > 0.0 {
        Orientation::Ccw
    } else {
        Orientation::Cw
    }
}

#[inline]
pub fn is_collinear(a: &Point, b: &Point, c: &Point) -> bool {
    cross(&(b - a), &(c - b)).abs() < EPSILON
}

/// `a + (b - a) * t`.
#[inline]
pub fn get_point_on_line(a: &Point, b: &Point, t: f64) -> Point {
    a + (b - a) * t
}

/// Intersection parameters of the lines `ab` and `cd`.
///
/// Returns `(ab_num, cd_num, denom)` such that
/// `ab(ab_num / denom) == cd(cd_num / denom)`. Parallel lines (|denom| < ε)
/// report `denom = 0` and both numerators `1`.
pub fn line_intersect_time(a: &Point, b: &Point, c: &Point, d: &Point) -> (f64, f64, f64) {
    let denom = cross(&(b - a), &(d - c));
    if denom.abs() < EPSILON {
        return (1.0, 1.0, 0.0);
    }
    let ac = c - a;
    let ab_num = cross(&ac, &(d - a));
    let cd_num = cross(&ac, &(b - c));
    debug_assert!(approx_eq(
        &get_point_on_line(a, b, ab_num / denom),
        &get_point_on_line(c, d, cd_num / denom)
    ));
    (ab_num, cd_num, denom)
}

/// Intersection of the lines `ab` and `cd`, parametrised along `ab`.
///
/// Pre: the lines are not parallel.
#[inline]
pub fn line_intersect(a: &Point, b: &Point, c: &Point, d: &Point) -> Point {
    let ab = b - a;
    a + ab * (cross(&(c - a), &(d - a)) / cross(&ab, &(d - c)))
}

/// Where `num / denom` falls relative to the unit interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroOnePos {
    LtZero,
    EqZero,
    InRange,
    EqOne,
    GtOne,
}

/// Classifies `num / denom` against `[0, 1]` without dividing.
///
/// The `EqOne` test compares `|num - denom|` against ε directly, which
/// assumes `|denom|` stays well below `1/ε`.
pub fn line_intersect_bound_check(num: f64, denom: f64) -> ZeroOnePos {
    if num.abs() < EPSILON {
        return ZeroOnePos::EqZero;
    }
    if (num - denom).abs() < EPSILON {
        return ZeroOnePos::EqOne;
    }
    if denom > 0.0 {
        if num < 0.0 {
            return ZeroOnePos::LtZero;
        }
        if num > denom {
            return ZeroOnePos::GtOne;
        }
    } else {
        if num > 0.0 {
            return ZeroOnePos::LtZero;
        }
        if num < denom {
            return ZeroOnePos::GtOne;
        }
    }
    ZeroOnePos::InRange
}

/// Mirror image of `p` across the line through `l` and `r`.
///
/// Degenerates to a point reflection through `l` when `l ≈ r`.
pub fn reflect_point(p: &Point, l: &Point, r: &Point) -> Point {
    let denom = distance_sq(r, l);
    if denom.abs() < EPSILON {
        return l * 2.0 - p;
    }
    let numer = cross(&(r - p), &(l - p));
    // r - l rotated a quarter turn counterclockwise.
    let delta_rotated = Point::new(l.y - r.y, r.x - l.x);
    debug_assert_eq!(
        orientation(l, &(p + delta_rotated * (numer / denom)), r),
        Orientation::Collinear
    );
    p + delta_rotated * (2.0 * numer / denom)
}

/// `(x, y)` formatting for points in logs and driver output.
#[derive(Clone, Copy, Debug)]
pub struct Coords(pub Point);

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}
