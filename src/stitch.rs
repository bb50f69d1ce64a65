use crate::cell_graph::{CellGraph, CellIntersections};
use crate::error::PlanError;
use crate::geom::Rv2;
use crate::vis;

/// Sweeping the next cell backwards is cheaper when the current point sits
/// nearer the sweep's far end. Exact squared-distance comparison.
fn reverse_next_sweep(p: &Rv2, sweep: &[Rv2]) -> bool {
    match (sweep.first(), sweep.last()) {
        (Some(front), Some(back)) => p.dist2(back) < p.dist2(front),
        _ => false,
    }
}

fn push(w: &mut Vec<Rv2>, q: Rv2) {
    if w.last() != Some(&q) {
        w.push(q);
    }
}

fn emit_path(w: &mut Vec<Rv2>, path: &[Rv2], include_first: bool, exclude_last: bool) {
    let lo = if include_first { 0 } else { 1.min(path.len()) };
    let hi = if exclude_last {
        path.len().saturating_sub(1)
    } else {
        path.len()
    };
    for q in &path[lo..hi.max(lo)] {
        push(w, q.clone());
    }
}

/// Picks the crossing candidate minimizing straight-line distance current
/// point -> candidate -> preferred endpoint of the next sweep, where the
/// preferred endpoint is chosen by the reversal heuristic evaluated at each
/// candidate, not at the current point. Ties keep the lowest index.
/// Returns the candidate together with its preferred endpoint.
fn pick_candidate<'a>(
    p: &Rv2,
    next_sweep: &'a [Rv2],
    cands: &'a [Rv2],
) -> Option<(&'a Rv2, &'a Rv2)> {
    let mut best: Option<(&Rv2, &Rv2, f64)> = None;
    for c in cands {
        let target = if reverse_next_sweep(c, next_sweep) {
            next_sweep.last()?
        } else {
            next_sweep.first()?
        };
        let cost = p.dist_f64(c) + c.dist_f64(target);
        if best.map_or(true, |(_, _, b)| cost < b) {
            best = Some((c, target, cost));
        }
    }
    best.map(|(c, target, _)| (c, target))
}

/// Walks the traversal order, sweeping each cell once and crossing cleaned
/// cells with an in-cell shortest path, and returns the stitched waypoint
/// list. Owns the only mutable pipeline state: the `cleaned` flags and the
/// growing list.
pub fn stitch(
    graph: &mut CellGraph,
    sweeps: &[Vec<Rv2>],
    inters: &CellIntersections,
    order: &[usize],
    start: &Rv2,
) -> Result<Vec<Rv2>, PlanError> {
    let mut w: Vec<Rv2> = Vec::new();
    let mut p = start.clone();
    let mut first_emit = true;

    for (i, &ci) in order.iter().enumerate() {
        let sweep = &sweeps[ci];
        if sweep.is_empty() {
            eprintln!("warning: cell {ci} yields an empty sweep, skipping it");
            graph.mark_cleaned(ci);
            continue;
        }
        let front = sweep.first().expect("sweep is non-empty");
        let back = sweep.last().expect("sweep is non-empty");

        if !graph.cell(ci).cleaned {
            let reverse = reverse_next_sweep(&p, sweep);
            let endpoint = if reverse { back } else { front };
            let path = vis::shortest_path(&graph.cell(ci).poly, &p, endpoint)?;
            // the endpoint re-appears as the sweep's first point; the very
            // first path also carries the user start point itself
            emit_path(&mut w, &path, first_emit, true);
            first_emit = false;

            if reverse {
                for q in sweep.iter().rev() {
                    push(&mut w, q.clone());
                }
            } else {
                for q in sweep {
                    push(&mut w, q.clone());
                }
            }
            graph.mark_cleaned(ci);
        } else {
            // backtracking: cross the cell without re-sweeping
            let path = vis::shortest_path(&graph.cell(ci).poly, front, back)?;
            let reverse = reverse_next_sweep(&p, sweep);
            if reverse {
                let rev: Vec<Rv2> = path.into_iter().rev().collect();
                emit_path(&mut w, &rev, true, false);
            } else {
                emit_path(&mut w, &path, true, false);
            }
            first_emit = false;
        }
        if let Some(last) = w.last() {
            p = last.clone();
        }

        // route towards the next cell in the order
        if let Some(&cj) = order.get(i + 1) {
            let next_sweep = &sweeps[cj];
            if next_sweep.is_empty() {
                continue;
            }
            let cands = inters.get(&(ci, cj)).ok_or_else(|| {
                PlanError::Decomposition(format!(
                    "traversal steps between non-adjacent cells {ci} and {cj}"
                ))
            })?;
            let Some((cand, target)) = pick_candidate(&p, next_sweep, cands) else {
                continue;
            };

            let through = vis::shortest_path(&graph.cell(ci).poly, &p, cand)?;
            emit_path(&mut w, &through, false, true);
            let into = vis::shortest_path(&graph.cell(cj).poly, cand, target)?;
            emit_path(&mut w, &into, true, true);

            if let Some(last) = w.last() {
                p = last.clone();
            }
        }
    }

    Ok(w)
}

/// Splits every segment of the rounded waypoint list into ⌊L/δ⌋ + 1 equal
/// pieces. δ = 0 disables subdivision.
pub fn subdivide(pts: &[(i32, i32)], delta: u32) -> Vec<(i32, i32)> {
    if delta == 0 || pts.len() < 2 {
        return pts.to_vec();
    }
    let mut out: Vec<(i32, i32)> = vec![pts[0]];
    for seg in pts.windows(2) {
        let (p1, p2) = (seg[0], seg[1]);
        let dx = (p2.0 - p1.0) as f64;
        let dy = (p2.1 - p1.1) as f64;
        let len = (dx * dx + dy * dy).sqrt();
        let interior = (len / delta as f64).floor() as i64;
        let pieces = interior + 1;
        for k in 1..=interior {
            let t = k as f64 / pieces as f64;
            out.push((
                (p1.0 as f64 + dx * t).round() as i32,
                (p1.1 as f64 + dy * t).round() as i32,
            ));
        }
        out.push(p2);
    }
    out
}
