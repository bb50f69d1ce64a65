use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// The exact scalar field. All predicates run over rationals; conversion to
/// f64 happens only at the output boundary and for path-length weights.
pub type R = BigRational;

pub fn rat(v: i64) -> R {
    BigRational::from_integer(BigInt::from(v))
}

/// A point or vector over the exact field. The derived `Ord` is
/// lexicographic (x, then y), which is exactly the sweep event order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rv2 {
    pub x: R,
    pub y: R,
}

impl Rv2 {
    pub fn new(x: R, y: R) -> Self {
        Self { x, y }
    }

    pub fn from_pixel(x: i32, y: i32) -> Self {
        Self {
            x: rat(x as i64),
            y: rat(y as i64),
        }
    }

    pub fn sub(&self, other: &Rv2) -> Rv2 {
        Rv2 {
            x: &self.x - &other.x,
            y: &self.y - &other.y,
        }
    }

    pub fn cross(&self, other: &Rv2) -> R {
        &self.x * &other.y - &self.y * &other.x
    }

    pub fn dot(&self, other: &Rv2) -> R {
        &self.x * &other.x + &self.y * &other.y
    }

    /// Squared Euclidean norm.
    pub fn norm2(&self) -> R {
        &self.x * &self.x + &self.y * &self.y
    }

    pub fn dist2(&self, other: &Rv2) -> R {
        self.sub(other).norm2()
    }

    /// The point `self + (other - self) * num/den`.
    pub fn lerp(&self, other: &Rv2, num: i64, den: i64) -> Rv2 {
        let t = BigRational::new(BigInt::from(num), BigInt::from(den));
        Rv2 {
            x: &self.x + (&other.x - &self.x) * &t,
            y: &self.y + (&other.y - &self.y) * &t,
        }
    }

    pub fn to_f64(&self) -> (f64, f64) {
        (
            self.x.to_f64().unwrap_or(f64::NAN),
            self.y.to_f64().unwrap_or(f64::NAN),
        )
    }

    pub fn dist_f64(&self, other: &Rv2) -> f64 {
        self.dist2(other).to_f64().unwrap_or(f64::NAN).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orient {
    Ccw,
    Cw,
    Collinear,
}

/// Orientation of c relative to the directed line a -> b.
pub fn orient(a: &Rv2, b: &Rv2, c: &Rv2) -> Orient {
    let cross = b.sub(a).cross(&c.sub(a));
    if cross.is_zero() {
        Orient::Collinear
    } else if cross.is_positive() {
        Orient::Ccw
    } else {
        Orient::Cw
    }
}

/// True when p lies on the closed segment [a, b].
pub fn on_segment(p: &Rv2, a: &Rv2, b: &Rv2) -> bool {
    if orient(a, b, p) != Orient::Collinear {
        return false;
    }
    let (lo_x, hi_x) = if a.x <= b.x { (&a.x, &b.x) } else { (&b.x, &a.x) };
    let (lo_y, hi_y) = if a.y <= b.y { (&a.y, &b.y) } else { (&b.y, &a.y) };
    lo_x <= &p.x && &p.x <= hi_x && lo_y <= &p.y && &p.y <= hi_y
}

/// True when the open segments (a,b) and (c,d) cross in a single point
/// interior to both.
pub fn segments_properly_cross(a: &Rv2, b: &Rv2, c: &Rv2, d: &Rv2) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    o1 != o2
        && o3 != o4
        && o1 != Orient::Collinear
        && o2 != Orient::Collinear
        && o3 != Orient::Collinear
        && o4 != Orient::Collinear
}

/// True when the closed segments [a,b] and [c,d] share any point.
pub fn closed_segments_intersect(a: &Rv2, b: &Rv2, c: &Rv2, d: &Rv2) -> bool {
    if segments_properly_cross(a, b, c, d) {
        return true;
    }
    on_segment(c, a, b) || on_segment(d, a, b) || on_segment(a, c, d) || on_segment(b, c, d)
}

/// If [a,b] and [c,d] are collinear and overlap in a segment of positive
/// length, returns that overlap (endpoints ordered lexicographically).
pub fn collinear_overlap(a: &Rv2, b: &Rv2, c: &Rv2, d: &Rv2) -> Option<(Rv2, Rv2)> {
    if orient(a, b, c) != Orient::Collinear || orient(a, b, d) != Orient::Collinear {
        return None;
    }
    let (s1, e1) = if a <= b { (a, b) } else { (b, a) };
    let (s2, e2) = if c <= d { (c, d) } else { (d, c) };
    let lo = if s1 >= s2 { s1 } else { s2 };
    let hi = if e1 <= e2 { e1 } else { e2 };
    if lo < hi {
        Some((lo.clone(), hi.clone()))
    } else {
        None
    }
}

/// y of the line through a and b at the given x. Requires a.x != b.x.
pub fn y_at(a: &Rv2, b: &Rv2, x: &R) -> R {
    debug_assert!(a.x != b.x);
    &a.y + (x - &a.x) * (&b.y - &a.y) / (&b.x - &a.x)
}

/// Point-in-polygon over the closed region: boundary points count as inside.
pub fn point_in_ring(p: &Rv2, ring: &[Rv2]) -> bool {
    if point_on_ring(p, ring) {
        return true;
    }
    point_strictly_in_ring_no_boundary(p, ring)
}

/// True when p lies on some edge of the ring.
pub fn point_on_ring(p: &Rv2, ring: &[Rv2]) -> bool {
    let n = ring.len();
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        if on_segment(p, a, b) {
            return true;
        }
    }
    false
}

/// True when p is strictly interior to the ring.
pub fn point_strictly_in_ring(p: &Rv2, ring: &[Rv2]) -> bool {
    !point_on_ring(p, ring) && point_strictly_in_ring_no_boundary(p, ring)
}

// Crossing-number test; caller must have excluded boundary points.
fn point_strictly_in_ring_no_boundary(p: &Rv2, ring: &[Rv2]) -> bool {
    let n = ring.len();
    let mut inside = false;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        // half-open rule avoids double-counting vertices
        if (a.y > p.y) != (b.y > p.y) {
            let x_int = &a.x + (&p.y - &a.y) * (&b.x - &a.x) / (&b.y - &a.y);
            if x_int > p.x {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i64, y: i64) -> Rv2 {
        Rv2::new(rat(x), rat(y))
    }

    #[test]
    fn orientation_signs() {
        assert_eq!(orient(&p(0, 0), &p(4, 0), &p(2, 3)), Orient::Ccw);
        assert_eq!(orient(&p(0, 0), &p(4, 0), &p(2, -3)), Orient::Cw);
        assert_eq!(orient(&p(0, 0), &p(4, 0), &p(9, 0)), Orient::Collinear);
    }

    #[test]
    fn lexicographic_point_order() {
        assert!(p(1, 9) < p(2, 0));
        assert!(p(1, 2) < p(1, 3));
    }

    #[test]
    fn on_segment_inclusive() {
        assert!(on_segment(&p(2, 2), &p(0, 0), &p(4, 4)));
        assert!(on_segment(&p(0, 0), &p(0, 0), &p(4, 4)));
        assert!(!on_segment(&p(5, 5), &p(0, 0), &p(4, 4)));
        assert!(!on_segment(&p(2, 1), &p(0, 0), &p(4, 4)));
    }

    #[test]
    fn proper_crossing() {
        assert!(segments_properly_cross(&p(0, 0), &p(4, 4), &p(0, 4), &p(4, 0)));
        // shared endpoint is not a proper crossing
        assert!(!segments_properly_cross(&p(0, 0), &p(4, 4), &p(4, 4), &p(8, 0)));
        // T-touch is not proper
        assert!(!segments_properly_cross(&p(0, 0), &p(4, 0), &p(2, 0), &p(2, 5)));
    }

    #[test]
    fn closed_intersection_catches_touch() {
        assert!(closed_segments_intersect(&p(0, 0), &p(4, 0), &p(2, 0), &p(2, 5)));
        assert!(!closed_segments_intersect(&p(0, 0), &p(4, 0), &p(0, 1), &p(4, 1)));
    }

    #[test]
    fn collinear_overlap_interval() {
        let (lo, hi) = collinear_overlap(&p(0, 0), &p(10, 0), &p(4, 0), &p(20, 0)).unwrap();
        assert_eq!((lo, hi), (p(4, 0), p(10, 0)));
        // touching at one point is not positive-length overlap
        assert!(collinear_overlap(&p(0, 0), &p(4, 0), &p(4, 0), &p(8, 0)).is_none());
        // parallel but offset
        assert!(collinear_overlap(&p(0, 0), &p(4, 0), &p(0, 1), &p(4, 1)).is_none());
    }

    #[test]
    fn y_at_is_exact() {
        let y = y_at(&p(0, 0), &p(3, 1), &rat(1));
        assert_eq!(y, BigRational::new(BigInt::from(1), BigInt::from(3)));
    }

    #[test]
    fn point_in_square() {
        let ring = vec![p(0, 0), p(10, 0), p(10, 10), p(0, 10)];
        assert!(point_in_ring(&p(5, 5), &ring));
        assert!(point_in_ring(&p(0, 5), &ring)); // boundary counts
        assert!(point_in_ring(&p(10, 10), &ring)); // vertex counts
        assert!(!point_in_ring(&p(11, 5), &ring));
        assert!(!point_in_ring(&p(-1, -1), &ring));
        assert!(point_strictly_in_ring(&p(5, 5), &ring));
        assert!(!point_strictly_in_ring(&p(0, 5), &ring));
    }

    #[test]
    fn point_in_concave_ring() {
        // L-shape
        let ring = vec![p(0, 0), p(10, 0), p(10, 5), p(5, 5), p(5, 10), p(0, 10)];
        assert!(point_in_ring(&p(2, 8), &ring));
        assert!(point_in_ring(&p(8, 2), &ring));
        assert!(!point_in_ring(&p(8, 8), &ring));
        assert!(point_in_ring(&p(5, 5), &ring));
    }

    #[test]
    fn lerp_quarters() {
        let q = p(0, 0).lerp(&p(8, 4), 1, 4);
        assert_eq!(q, p(2, 1));
        let m = p(0, 0).lerp(&p(8, 4), 1, 2);
        assert_eq!(m, p(4, 2));
    }

    #[test]
    fn dist_f64_matches() {
        assert_eq!(p(0, 0).dist_f64(&p(3, 4)), 5.0);
    }
}
