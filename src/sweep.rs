use num_rational::BigRational;

use crate::error::PlanError;
use crate::geom::{R, Rv2, rat, y_at};
use crate::poly::{Poly, RotFrame};
use crate::vis;

/// Clips the vertical line x = const against an x-monotone ring, returning
/// the (bottom, top) endpoints of the single resulting segment.
fn clip_vertical(cell: &Poly, x: &R) -> Option<(Rv2, Rv2)> {
    let mut lo: Option<R> = None;
    let mut hi: Option<R> = None;
    let mut push = |y: R| {
        if lo.as_ref().map_or(true, |l| &y < l) {
            lo = Some(y.clone());
        }
        if hi.as_ref().map_or(true, |h| &y > h) {
            hi = Some(y);
        }
    };

    let n = cell.len();
    for i in 0..n {
        let (a, b) = cell.edge(i);
        let (min_x, max_x) = if a.x <= b.x { (&a.x, &b.x) } else { (&b.x, &a.x) };
        if x < min_x || x > max_x {
            continue;
        }
        if a.x == b.x {
            push(a.y.clone());
            push(b.y.clone());
        } else if *x == a.x {
            push(a.y.clone());
        } else if *x == b.x {
            push(b.y.clone());
        } else {
            push(y_at(a, b, x));
        }
    }

    Some((
        Rv2::new(x.clone(), lo?),
        Rv2::new(x.clone(), hi?),
    ))
}

/// Boustrophedon sweep of one cell.
///
/// In the frame where `dir` points up, sweep lines sit at the centers of
/// Δ-wide strips (`xmin + Δ/2 + kΔ`), so every free point ends up within
/// ⌈Δ/2⌉ of the path. A cell narrower than Δ gets a single central line.
/// `counter_clockwise` starts the first line bottom-to-top; the opposite
/// orientation starts at the top. Transits between lines route through the
/// in-cell shortest path, so the sweep never leaves a non-convex cell.
pub fn compute_sweep(
    cell: &Poly,
    step: i32,
    dir: &Rv2,
    counter_clockwise: bool,
) -> Result<Vec<Rv2>, PlanError> {
    if step <= 0 {
        return Err(PlanError::InvalidParameter(format!(
            "sweep step must be positive, got {step}"
        )));
    }
    if cell.is_empty() {
        return Ok(Vec::new());
    }
    if cell.len() < 3 {
        // a point or segment collapses to its first vertex
        return Ok(vec![cell.pts[0].clone()]);
    }

    let frame = RotFrame::new(dir);
    let rotated = frame.fwd_poly(cell);
    let (min, max) = rotated.bbox().expect("cell is non-empty");
    let (xmin, xmax) = (min.x, max.x);

    // The rotated frame is scaled by |d|, so a true-distance step Δ becomes
    // Δ·|d| there. f64 -> rational conversion is exact, which keeps reruns
    // byte-identical.
    let delta: R = BigRational::from_float(step as f64 * frame.scale_f64())
        .filter(|d| d > &rat(0))
        .ok_or_else(|| {
            PlanError::Decomposition("sweep step does not scale into the cell frame".into())
        })?;

    let span = &xmax - &xmin;
    let mut xs: Vec<R> = Vec::new();
    if span < delta {
        xs.push((&xmin + &xmax) / rat(2));
    } else {
        let mut x = &xmin + &delta / rat(2);
        while x <= xmax {
            xs.push(x.clone());
            x += &delta;
        }
    }

    let mut pts: Vec<Rv2> = Vec::new();
    let mut push = |pts: &mut Vec<Rv2>, p: Rv2| {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    };

    let mut going_up = counter_clockwise;
    for x in &xs {
        let Some((bottom, top)) = clip_vertical(&rotated, x) else {
            continue;
        };
        let (first, second) = if going_up { (bottom, top) } else { (top, bottom) };
        let first = frame.inv(&first);
        let second = frame.inv(&second);

        if pts.is_empty() {
            push(&mut pts, first);
        } else {
            let from = pts.last().expect("pts is non-empty").clone();
            let transit = vis::shortest_path(cell, &from, &first)?;
            for q in transit.into_iter().skip(1) {
                push(&mut pts, q);
            }
        }
        push(&mut pts, second);
        going_up = !going_up;
    }

    Ok(pts)
}
