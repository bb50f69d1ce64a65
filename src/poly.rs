use std::collections::BTreeSet;

use num_traits::Zero;

use crate::error::PlanError;
use crate::geom::{
    self, Orient, R, Rv2, closed_segments_intersect, collinear_overlap, orient, point_in_ring,
    point_strictly_in_ring,
};

/// A simple closed ring. The closing edge from the last point back to the
/// first is implicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    pub pts: Vec<Rv2>,
}

impl Poly {
    pub fn new(pts: Vec<Rv2>) -> Self {
        Self { pts }
    }

    pub fn from_pixels(pts: &[(i32, i32)]) -> Self {
        Self {
            pts: pts.iter().map(|&(x, y)| Rv2::from_pixel(x, y)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    pub fn edge(&self, i: usize) -> (&Rv2, &Rv2) {
        (&self.pts[i], &self.pts[(i + 1) % self.pts.len()])
    }

    /// Twice the signed shoelace area. Positive for counter-clockwise rings.
    pub fn signed_area2(&self) -> R {
        let n = self.pts.len();
        let mut acc = R::zero();
        for i in 0..n {
            let (a, b) = self.edge(i);
            acc += a.cross(b);
        }
        acc
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area2() > R::zero()
    }

    pub fn reverse(&mut self) {
        self.pts.reverse();
    }

    /// Drops repeated consecutive vertices and merges collinear runs,
    /// including across the ring seam.
    pub fn dedup(&mut self) {
        // consecutive duplicates (with wrap)
        let mut pts: Vec<Rv2> = Vec::with_capacity(self.pts.len());
        for p in self.pts.drain(..) {
            if pts.last() != Some(&p) {
                pts.push(p);
            }
        }
        while pts.len() > 1 && pts.first() == pts.last() {
            pts.pop();
        }

        // collinear middles (with wrap); repeat until stable
        loop {
            let n = pts.len();
            if n < 3 {
                break;
            }
            let mut kept: Vec<Rv2> = Vec::with_capacity(n);
            for i in 0..n {
                let prev = &pts[(i + n - 1) % n];
                let next = &pts[(i + 1) % n];
                if orient(prev, &pts[i], next) != Orient::Collinear {
                    kept.push(pts[i].clone());
                }
            }
            if kept.len() == pts.len() {
                break;
            }
            pts = kept;
        }
        self.pts = pts;
    }

    pub fn bbox(&self) -> Option<(Rv2, Rv2)> {
        let first = self.pts.first()?;
        let mut min = first.clone();
        let mut max = first.clone();
        for p in &self.pts {
            if p.x < min.x {
                min.x = p.x.clone();
            }
            if p.y < min.y {
                min.y = p.y.clone();
            }
            if p.x > max.x {
                max.x = p.x.clone();
            }
            if p.y > max.y {
                max.y = p.y.clone();
            }
        }
        Some((min, max))
    }

    /// Closed containment: boundary points are inside.
    pub fn contains(&self, p: &Rv2) -> bool {
        point_in_ring(p, &self.pts)
    }

    /// Any vertical line meets the ring in at most one connected segment,
    /// i.e. the x-sequence around the ring has exactly one increasing and
    /// one decreasing run.
    pub fn is_x_monotone(&self) -> bool {
        let n = self.pts.len();
        if n < 3 {
            return true;
        }
        let mut signs: Vec<i8> = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = self.edge(i);
            if a.x < b.x {
                signs.push(1);
            } else if a.x > b.x {
                signs.push(-1);
            }
        }
        if signs.is_empty() {
            return true; // degenerate vertical sliver
        }
        let mut changes = 0;
        for i in 0..signs.len() {
            if signs[i] != signs[(i + 1) % signs.len()] {
                changes += 1;
            }
        }
        changes <= 2
    }

    /// Exact squared distance from p to the ring boundary.
    pub fn boundary_dist2(&self, p: &Rv2) -> Option<R> {
        let n = self.pts.len();
        let mut best: Option<R> = None;
        for i in 0..n {
            let (a, b) = self.edge(i);
            let d2 = segment_dist2(p, a, b);
            if best.as_ref().map_or(true, |cur| &d2 < cur) {
                best = Some(d2);
            }
        }
        best
    }
}

/// Exact squared distance from p to the closed segment [a, b].
pub fn segment_dist2(p: &Rv2, a: &Rv2, b: &Rv2) -> R {
    let ab = b.sub(a);
    let ap = p.sub(a);
    let len2 = ab.norm2();
    if len2.is_zero() {
        return ap.norm2();
    }
    let t = ap.dot(&ab) / &len2;
    let t = if t < R::zero() {
        R::zero()
    } else if t > rat_one() {
        rat_one()
    } else {
        t
    };
    let proj = Rv2::new(&a.x + &ab.x * &t, &a.y + &ab.y * &t);
    p.dist2(&proj)
}

fn rat_one() -> R {
    geom::rat(1)
}

/// Outer boundary plus pairwise-disjoint holes strictly inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyWithHoles {
    pub outer: Poly,
    pub holes: Vec<Poly>,
}

impl PolyWithHoles {
    pub fn new(outer: Poly, holes: Vec<Poly>) -> Self {
        Self { outer, holes }
    }

    /// All rings: outer first, then holes.
    pub fn rings(&self) -> impl Iterator<Item = &Poly> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Orients the outer ring counter-clockwise and holes clockwise, and
    /// scrubs duplicate/collinear vertices from every ring.
    pub fn normalize(&mut self) {
        self.outer.dedup();
        if !self.outer.is_ccw() {
            self.outer.reverse();
        }
        for hole in &mut self.holes {
            hole.dedup();
            if hole.is_ccw() {
                hole.reverse();
            }
        }
    }

    /// Closed containment in the free region: inside (or on) the outer ring
    /// and not strictly inside any hole.
    pub fn contains(&self, p: &Rv2) -> bool {
        if !self.outer.contains(p) {
            return false;
        }
        for hole in &self.holes {
            if point_strictly_in_ring(p, &hole.pts) {
                return false;
            }
        }
        true
    }

    /// Rejects everything the decomposer cannot take: under-sized rings,
    /// coincident vertices, self-intersections, ring-to-ring contact and
    /// holes leaking outside the outer boundary.
    pub fn validate(&self) -> Result<(), PlanError> {
        for (ri, ring) in self.rings().enumerate() {
            if ring.len() < 3 {
                return Err(PlanError::DegeneratePolygon(format!(
                    "ring {ri} has {} vertices, need at least 3",
                    ring.len()
                )));
            }
            let n = ring.len();
            for i in 0..n {
                if ring.pts[i] == ring.pts[(i + 1) % n] {
                    return Err(PlanError::DegeneratePolygon(format!(
                        "ring {ri} repeats vertex {i}"
                    )));
                }
            }
        }

        // coincident vertices anywhere reject the whole input
        let mut seen: BTreeSet<&Rv2> = BTreeSet::new();
        for ring in self.rings() {
            for p in &ring.pts {
                if !seen.insert(p) {
                    let (x, y) = p.to_f64();
                    return Err(PlanError::DegeneratePolygon(format!(
                        "coincident vertices at ({x}, {y})"
                    )));
                }
            }
        }

        // pairwise edge tests across all rings
        let rings: Vec<&Poly> = self.rings().collect();
        for ri in 0..rings.len() {
            for rj in ri..rings.len() {
                let (pa, pb) = (rings[ri], rings[rj]);
                let (na, nb) = (pa.len(), pb.len());
                for i in 0..na {
                    let (a1, a2) = pa.edge(i);
                    let j0 = if ri == rj { i + 1 } else { 0 };
                    for j in j0..nb {
                        let (b1, b2) = pb.edge(j);
                        let adjacent = ri == rj
                            && (j == (i + 1) % na || i == (j + 1) % nb);
                        if adjacent {
                            // neighbors may only share their common endpoint
                            if collinear_overlap(a1, a2, b1, b2).is_some() {
                                return Err(PlanError::DegeneratePolygon(format!(
                                    "ring {ri} folds back on itself at edge {i}"
                                )));
                            }
                        } else if closed_segments_intersect(a1, a2, b1, b2) {
                            let what = if ri == rj {
                                format!("ring {ri} self-intersects")
                            } else {
                                format!("ring {rj} touches ring {ri}")
                            };
                            return Err(PlanError::DegeneratePolygon(what));
                        }
                    }
                }
            }
        }

        // holes strictly inside the outer ring, pairwise disjoint
        for (hi, hole) in self.holes.iter().enumerate() {
            for p in &hole.pts {
                if !point_strictly_in_ring(p, &self.outer.pts) {
                    return Err(PlanError::DegeneratePolygon(format!(
                        "hole {hi} is not strictly inside the outer boundary"
                    )));
                }
            }
            for (hj, other) in self.holes.iter().enumerate() {
                if hi != hj && point_strictly_in_ring(&hole.pts[0], &other.pts) {
                    return Err(PlanError::DegeneratePolygon(format!(
                        "holes {hi} and {hj} overlap"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Rotation carrying the sweep direction onto the +y axis, scaled by |d|.
/// Both directions of the map are exact over the rationals, so the
/// decomposition can run in the rotated frame and come back loss-free.
#[derive(Clone, Debug)]
pub struct RotFrame {
    d: Rv2,
    n2: R,
}

impl RotFrame {
    pub fn new(dir: &Rv2) -> Self {
        let n2 = dir.norm2();
        debug_assert!(!n2.is_zero(), "direction must be non-zero");
        Self { d: dir.clone(), n2 }
    }

    /// |d| as f64, for converting true distances into frame distances.
    pub fn scale_f64(&self) -> f64 {
        use num_traits::ToPrimitive;
        self.n2.to_f64().unwrap_or(f64::NAN).sqrt()
    }

    pub fn fwd(&self, p: &Rv2) -> Rv2 {
        Rv2 {
            x: &self.d.y * &p.x - &self.d.x * &p.y,
            y: &self.d.x * &p.x + &self.d.y * &p.y,
        }
    }

    pub fn inv(&self, q: &Rv2) -> Rv2 {
        Rv2 {
            x: (&self.d.y * &q.x + &self.d.x * &q.y) / &self.n2,
            y: (&self.d.y * &q.y - &self.d.x * &q.x) / &self.n2,
        }
    }

    pub fn fwd_poly(&self, poly: &Poly) -> Poly {
        Poly::new(poly.pts.iter().map(|p| self.fwd(p)).collect())
    }

    pub fn inv_poly(&self, poly: &Poly) -> Poly {
        Poly::new(poly.pts.iter().map(|p| self.inv(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::rat;

    fn p(x: i64, y: i64) -> Rv2 {
        Rv2::new(rat(x), rat(y))
    }

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> Poly {
        Poly::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)])
    }

    #[test]
    fn two_vertex_ring_is_degenerate() {
        let pwh = PolyWithHoles::new(Poly::new(vec![p(0, 0), p(10, 0)]), vec![]);
        assert!(matches!(
            pwh.validate(),
            Err(PlanError::DegeneratePolygon(_))
        ));
    }

    #[test]
    fn coincident_vertices_rejected() {
        let pwh = PolyWithHoles::new(
            Poly::new(vec![p(0, 0), p(10, 0), p(10, 10), p(10, 0), p(0, 10)]),
            vec![],
        );
        assert!(matches!(
            pwh.validate(),
            Err(PlanError::DegeneratePolygon(_))
        ));
    }

    #[test]
    fn bowtie_rejected() {
        let pwh = PolyWithHoles::new(
            Poly::new(vec![p(0, 0), p(10, 10), p(10, 0), p(0, 10)]),
            vec![],
        );
        assert!(matches!(
            pwh.validate(),
            Err(PlanError::DegeneratePolygon(_))
        ));
    }

    #[test]
    fn hole_touching_outer_rejected() {
        let pwh = PolyWithHoles::new(
            square(0, 0, 10, 10),
            vec![Poly::new(vec![p(0, 4), p(5, 4), p(5, 6)])],
        );
        assert!(matches!(
            pwh.validate(),
            Err(PlanError::DegeneratePolygon(_))
        ));
    }

    #[test]
    fn square_with_inner_hole_is_valid() {
        let mut pwh = PolyWithHoles::new(square(0, 0, 100, 100), vec![square(40, 40, 60, 60)]);
        pwh.normalize();
        assert!(pwh.validate().is_ok());
        assert!(pwh.outer.is_ccw());
        assert!(!pwh.holes[0].is_ccw());
    }

    #[test]
    fn dedup_merges_collinear_and_duplicates() {
        let mut poly = Poly::new(vec![
            p(0, 0),
            p(5, 0),
            p(5, 0),
            p(10, 0),
            p(10, 10),
            p(0, 10),
        ]);
        poly.dedup();
        assert_eq!(poly.pts, vec![p(0, 0), p(10, 0), p(10, 10), p(0, 10)]);
    }

    #[test]
    fn containment_with_hole() {
        let mut pwh = PolyWithHoles::new(square(0, 0, 100, 100), vec![square(40, 40, 60, 60)]);
        pwh.normalize();
        assert!(pwh.contains(&p(10, 10)));
        assert!(!pwh.contains(&p(50, 50)));
        // hole boundary is still free
        assert!(pwh.contains(&p(40, 50)));
        assert!(!pwh.contains(&p(-1, 50)));
    }

    #[test]
    fn monotonicity() {
        assert!(square(0, 0, 10, 10).is_x_monotone());
        // a plus sign still meets every vertical line in one interval
        let plus = Poly::new(vec![
            p(1, 0),
            p(2, 0),
            p(2, 1),
            p(3, 1),
            p(3, 2),
            p(2, 2),
            p(2, 3),
            p(1, 3),
            p(1, 2),
            p(0, 2),
            p(0, 1),
            p(1, 1),
        ]);
        assert!(plus.is_x_monotone());
        // a U opening rightwards meets x = 2 in two intervals
        let u_shape = Poly::new(vec![
            p(0, 0),
            p(3, 0),
            p(3, 1),
            p(1, 1),
            p(1, 2),
            p(3, 2),
            p(3, 3),
            p(0, 3),
        ]);
        assert!(!u_shape.is_x_monotone());
    }

    #[test]
    fn rot_frame_round_trips_and_aligns() {
        let d = p(3, 4);
        let frame = RotFrame::new(&d);
        let q = frame.fwd(&d);
        assert_eq!(q.x, rat(0));
        assert_eq!(q.y, rat(25));

        let pt = p(7, -2);
        assert_eq!(frame.inv(&frame.fwd(&pt)), pt);
    }

    #[test]
    fn boundary_distance() {
        let sq = square(0, 0, 10, 10);
        assert_eq!(sq.boundary_dist2(&p(5, 5)).unwrap(), rat(25));
        assert_eq!(sq.boundary_dist2(&p(-3, 0)).unwrap(), rat(9));
        assert_eq!(sq.boundary_dist2(&p(5, 0)).unwrap(), rat(0));
    }
}
