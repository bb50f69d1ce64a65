use num_traits::ToPrimitive;

use crate::geom::{R, Rv2};
use crate::poly::Poly;

/// The altitude of a polygon in direction d is the spread of its vertices
/// across the axis orthogonal to d; sweeping along the minimizing direction
/// needs the fewest lines. The minimum is always attained parallel to some
/// edge, so only edge directions are tested. Ties go to the lowest edge
/// index.
///
/// Comparisons are exact: `range_i / |d_i| < range_j / |d_j|` is evaluated as
/// `range_i² · |d_j|² < range_j² · |d_i|²` over the rationals.
pub fn find_best_sweep_dir(poly: &Poly) -> Option<(Rv2, f64)> {
    let n = poly.len();
    if n < 3 {
        return None;
    }

    // (direction, range, |d|²) of the best edge so far
    let mut best: Option<(Rv2, R, R)> = None;

    for i in 0..n {
        let (a, b) = poly.edge(i);
        let d = b.sub(a);
        let n2 = d.norm2();
        if n2 == crate::geom::rat(0) {
            continue;
        }
        let perp = Rv2::new(-d.y.clone(), d.x.clone());

        let mut lo: Option<R> = None;
        let mut hi: Option<R> = None;
        for v in &poly.pts {
            let proj = v.dot(&perp);
            if lo.as_ref().map_or(true, |l| &proj < l) {
                lo = Some(proj.clone());
            }
            if hi.as_ref().map_or(true, |h| &proj > h) {
                hi = Some(proj);
            }
        }
        let range = hi.unwrap() - lo.unwrap();

        let better = match &best {
            None => true,
            Some((_, best_range, best_n2)) => {
                &range * &range * best_n2 < best_range * best_range * &n2
            }
        };
        if better {
            best = Some((d, range, n2));
        }
    }

    best.map(|(d, range, n2)| {
        let alt = range.to_f64().unwrap_or(f64::NAN)
            / n2.to_f64().unwrap_or(f64::NAN).sqrt();
        (d, alt)
    })
}

/// Length-weighted modal edge direction of the outer boundary over 180
/// one-degree bins. Diagnostics only, so f64 trigonometry is fine here.
pub fn main_direction_deg(outer_px: &[(i32, i32)]) -> i32 {
    let mut histogram = [0i64; 180];

    let n = outer_px.len();
    for i in 0..n {
        let (x0, y0) = outer_px[i];
        let (x1, y1) = outer_px[(i + 1) % n];
        let dx = (x1 - x0) as f64;
        let dy = (y1 - y0) as f64;
        let len = (dx * dx + dy * dy).sqrt();
        // y-axis up convention: negate the image-frame dy
        let deg = ((-dy).atan2(dx) / std::f64::consts::PI * 180.0).round() as i32;
        let idx = ((deg + 180) % 180) as usize;
        histogram[idx] += len as i64;
    }

    let mut best = 0;
    for (i, &w) in histogram.iter().enumerate() {
        if w > histogram[best] {
            best = i;
        }
    }
    best as i32
}
