//! Boustrophedon cell decomposition.
//!
//! The polygon-with-holes is rotated so the sweep direction lies along +y,
//! swept with a vertical line moving in +x, and the resulting x-monotone
//! cells are rotated back. Events are the polygon vertices in lexicographic
//! (x, then y) order; the active edge list is kept sorted bottom-to-top and
//! its pairs (floor, ceiling) bound the currently open cells.

use crate::error::PlanError;
use crate::geom::{R, Rv2};
use crate::poly::{Poly, PolyWithHoles, RotFrame};

#[derive(Debug)]
struct Edge {
    /// Lexicographically smaller endpoint.
    lo: Rv2,
    /// Lexicographically greater endpoint.
    hi: Rv2,
}

impl Edge {
    fn new(a: &Rv2, b: &Rv2) -> Self {
        if a <= b {
            Self { lo: a.clone(), hi: b.clone() }
        } else {
            Self { lo: b.clone(), hi: a.clone() }
        }
    }

    fn is_vertical(&self) -> bool {
        self.lo.x == self.hi.x
    }

    fn y_at(&self, x: &R) -> R {
        crate::geom::y_at(&self.lo, &self.hi, x)
    }
}

/// Which side of an open cell an edge bounds; decides which endpoint of a
/// vertical edge is the geometric corner at its own x.
#[derive(Clone, Copy)]
enum Side {
    Floor,
    Ceil,
}

fn corner(edge: &Edge, x: &R, side: Side) -> Rv2 {
    if edge.is_vertical() {
        match side {
            Side::Floor => edge.hi.clone(),
            Side::Ceil => edge.lo.clone(),
        }
    } else {
        Rv2::new(x.clone(), edge.y_at(x))
    }
}

#[derive(Debug)]
struct OpenCell {
    floor_pts: Vec<Rv2>,
    ceil_pts: Vec<Rv2>,
}

impl OpenCell {
    fn emit(self, floor_corner: Rv2, ceil_corner: Rv2, out: &mut Vec<Poly>) {
        let mut ring = self.floor_pts;
        ring.push(floor_corner);
        ring.push(ceil_corner);
        ring.extend(self.ceil_pts.into_iter().rev());
        let mut poly = Poly::new(ring);
        poly.dedup();
        if poly.len() >= 3 {
            out.push(poly);
        }
    }
}

struct Event {
    v: Rv2,
    prev: Rv2,
    next: Rv2,
}

/// Is this active edge strictly below `v` on the sweep line through `v`?
/// `None` means the edge passes through `v`, which a valid input never
/// produces at an OPEN/SPLIT event.
fn strictly_below(edge: &Edge, v: &Rv2) -> Option<bool> {
    if edge.is_vertical() {
        if edge.hi.y < v.y {
            Some(true)
        } else if edge.lo.y > v.y {
            Some(false)
        } else {
            None
        }
    } else {
        let y = edge.y_at(&v.x);
        if y < v.y {
            Some(true)
        } else if y > v.y {
            Some(false)
        } else {
            None
        }
    }
}

fn sweep(pwh: &PolyWithHoles) -> Result<Vec<Poly>, PlanError> {
    let mut events: Vec<Event> = Vec::new();
    for ring in pwh.rings() {
        let n = ring.len();
        for i in 0..n {
            events.push(Event {
                v: ring.pts[i].clone(),
                prev: ring.pts[(i + n - 1) % n].clone(),
                next: ring.pts[(i + 1) % n].clone(),
            });
        }
    }
    events.sort_by(|a, b| a.v.cmp(&b.v));

    let mut active: Vec<Edge> = Vec::new();
    let mut open_cells: Vec<OpenCell> = Vec::new();
    let mut out: Vec<Poly> = Vec::new();

    for ev in &events {
        let v = &ev.v;
        let x = &v.x;
        let prev_right = ev.prev > *v;
        let next_right = ev.next > *v;

        if prev_right && next_right {
            // Two edges start here: OPEN a cell in an uncovered gap, or
            // SPLIT the cell the vertex interrupts.
            let mut pos = 0usize;
            for edge in &active {
                match strictly_below(edge, v) {
                    Some(true) => pos += 1,
                    Some(false) => {}
                    None => {
                        return Err(PlanError::DegeneratePolygon(
                            "boundary touches itself at a sweep event".into(),
                        ));
                    }
                }
            }

            let u1 = ev.prev.sub(v);
            let u2 = ev.next.sub(v);
            let cross = u1.cross(&u2);
            if cross == crate::geom::rat(0) {
                return Err(PlanError::DegeneratePolygon(
                    "overlapping edges at a vertex".into(),
                ));
            }
            let (lower_to, upper_to) = if cross > crate::geom::rat(0) {
                (&ev.prev, &ev.next)
            } else {
                (&ev.next, &ev.prev)
            };
            let lower = Edge::new(v, lower_to);
            let upper = Edge::new(v, upper_to);

            // A vertical edge sorts above everything leaving the same
            // vertex, so only `upper` can be vertical.
            let upper_floor_start = if upper.is_vertical() {
                upper.hi.clone()
            } else {
                v.clone()
            };

            if pos % 2 == 0 {
                // OPEN
                open_cells.insert(
                    pos / 2,
                    OpenCell {
                        floor_pts: vec![v.clone()],
                        ceil_pts: vec![v.clone()],
                    },
                );
                active.insert(pos, lower);
                active.insert(pos + 1, upper);
            } else {
                // SPLIT cell k at the sweep line through v
                let k = (pos - 1) / 2;
                if k >= open_cells.len() {
                    return Err(PlanError::Decomposition(format!(
                        "split event indexes open cell {k} of {}",
                        open_cells.len()
                    )));
                }
                let floor_corner = corner(&active[2 * k], x, Side::Floor);
                let ceil_corner = corner(&active[2 * k + 1], x, Side::Ceil);
                let split = open_cells.remove(k);
                split.emit(floor_corner.clone(), ceil_corner.clone(), &mut out);

                open_cells.insert(
                    k,
                    OpenCell {
                        floor_pts: vec![floor_corner],
                        ceil_pts: vec![v.clone()],
                    },
                );
                open_cells.insert(
                    k + 1,
                    OpenCell {
                        floor_pts: vec![upper_floor_start],
                        ceil_pts: vec![ceil_corner],
                    },
                );
                active.insert(pos, lower);
                active.insert(pos + 1, upper);
            }
        } else if !prev_right && !next_right {
            // Two edges end here: CLOSE one cell or MERGE two.
            let ends: Vec<usize> = active
                .iter()
                .enumerate()
                .filter(|(_, e)| e.hi == *v)
                .map(|(i, _)| i)
                .collect();
            if ends.len() != 2 || ends[1] != ends[0] + 1 {
                return Err(PlanError::Decomposition(format!(
                    "expected two adjacent active edges ending at an event, found {ends:?}"
                )));
            }
            let i = ends[0];

            if i % 2 == 0 {
                // CLOSE cell i/2: floor and ceiling meet at v
                let cell = open_cells.remove(i / 2);
                cell.emit(v.clone(), v.clone(), &mut out);
                active.drain(i..=i + 1);
            } else {
                // MERGE cells k and k+1 into one
                let k = (i - 1) / 2;
                if i + 2 >= active.len() {
                    return Err(PlanError::Decomposition(
                        "merge event at the top of the active list".into(),
                    ));
                }
                let floor_corner = corner(&active[2 * k], x, Side::Floor);
                let lower_ceil_corner = corner(&active[i], x, Side::Ceil);
                let upper_floor_corner = corner(&active[i + 1], x, Side::Floor);
                let ceil_corner = corner(&active[i + 2], x, Side::Ceil);

                let upper = open_cells.remove(k + 1);
                let lower = open_cells.remove(k);
                lower.emit(floor_corner.clone(), lower_ceil_corner, &mut out);
                upper.emit(upper_floor_corner, ceil_corner.clone(), &mut out);

                open_cells.insert(
                    k,
                    OpenCell {
                        floor_pts: vec![floor_corner],
                        ceil_pts: vec![ceil_corner],
                    },
                );
                active.drain(i..=i + 1);
            }
        } else {
            // INFLECTION: one edge ends, its continuation starts.
            let ended = active.iter().position(|e| e.hi == *v).ok_or_else(|| {
                PlanError::Decomposition(
                    "inflection event has no matching active edge".into(),
                )
            })?;
            let starts_to = if prev_right { &ev.prev } else { &ev.next };
            active[ended] = Edge::new(v, starts_to);

            let k = ended / 2;
            if ended % 2 == 0 {
                open_cells[k].floor_pts.push(v.clone());
            } else {
                open_cells[k].ceil_pts.push(v.clone());
            }
        }
    }

    if !active.is_empty() || !open_cells.is_empty() {
        return Err(PlanError::Decomposition(format!(
            "{} active edges and {} open cells left after the sweep",
            active.len(),
            open_cells.len()
        )));
    }

    Ok(out)
}

/// Decomposes into x-monotone cells with sweep lines parallel to `dir`.
/// The returned cells are in the original frame, counter-clockwise, ordered
/// by where the sweep closed them (left to right along the sweep axis).
pub fn decompose(pwh: &PolyWithHoles, dir: &Rv2) -> Result<Vec<Poly>, PlanError> {
    if pwh.outer.is_empty() {
        return Ok(Vec::new());
    }
    pwh.validate()?;
    decompose_validated(pwh, dir)
}

fn decompose_validated(pwh: &PolyWithHoles, dir: &Rv2) -> Result<Vec<Poly>, PlanError> {
    let frame = RotFrame::new(dir);
    let rotated = PolyWithHoles::new(
        frame.fwd_poly(&pwh.outer),
        pwh.holes.iter().map(|h| frame.fwd_poly(h)).collect(),
    );

    let cells = sweep(&rotated)?;

    Ok(cells
        .into_iter()
        .map(|c| {
            let mut cell = frame.inv_poly(&c);
            cell.dedup();
            cell
        })
        .collect())
}

/// Tries a decomposition for every distinct edge direction (modulo π) of the
/// polygon and keeps the one producing the fewest cells; ties go to the
/// lowest edge index.
pub fn decompose_best(pwh: &PolyWithHoles) -> Result<(Vec<Poly>, Rv2), PlanError> {
    if pwh.outer.is_empty() {
        return Ok((Vec::new(), Rv2::from_pixel(1, 0)));
    }
    pwh.validate()?;

    let mut candidates: Vec<Rv2> = Vec::new();
    for ring in pwh.rings() {
        for i in 0..ring.len() {
            let (a, b) = ring.edge(i);
            let mut d = b.sub(a);
            // canonical representative modulo π
            let zero = crate::geom::rat(0);
            if d.x < zero || (d.x == zero && d.y < zero) {
                d = Rv2::new(-d.x, -d.y);
            }
            if !candidates.iter().any(|c| c.cross(&d) == crate::geom::rat(0)) {
                candidates.push(d);
            }
        }
    }

    let mut best: Option<(Vec<Poly>, Rv2)> = None;
    for dir in candidates {
        let cells = decompose_validated(pwh, &dir)?;
        let better = best.as_ref().map_or(true, |(b, _)| cells.len() < b.len());
        if better {
            best = Some((cells, dir));
        }
    }

    best.ok_or_else(|| PlanError::Decomposition("no sweep direction candidates".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::rat;
    use num_traits::Zero;

    fn p(x: i64, y: i64) -> Rv2 {
        Rv2::new(rat(x), rat(y))
    }

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> Poly {
        Poly::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)])
    }

    fn pwh(outer: Poly, holes: Vec<Poly>) -> PolyWithHoles {
        let mut pwh = PolyWithHoles::new(outer, holes);
        pwh.normalize();
        pwh
    }

    fn up() -> Rv2 {
        p(0, 1)
    }

    fn total_area2(cells: &[Poly]) -> R {
        cells.iter().map(|c| c.signed_area2()).sum()
    }

    #[test]
    fn rectangle_is_one_cell() {
        let region = pwh(square(0, 0, 100, 50), vec![]);
        let cells = decompose(&region, &up()).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].signed_area2(), rat(2 * 100 * 50));
        assert!(cells[0].is_ccw());
    }

    #[test]
    fn square_with_hole_splits_into_four_cells() {
        let region = pwh(square(0, 0, 100, 100), vec![square(40, 40, 60, 60)]);
        let cells = decompose(&region, &up()).unwrap();
        assert_eq!(cells.len(), 4);
        // free area is preserved exactly
        assert_eq!(total_area2(&cells), rat(2 * (100 * 100 - 20 * 20)));
        for cell in &cells {
            assert!(cell.is_ccw());
            assert!(cell.is_x_monotone());
        }
    }

    #[test]
    fn l_shape_splits_into_two_cells() {
        let outer = Poly::new(vec![
            p(0, 0),
            p(100, 0),
            p(100, 50),
            p(50, 50),
            p(50, 100),
            p(0, 100),
        ]);
        let region = pwh(outer, vec![]);
        let cells = decompose(&region, &up()).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(total_area2(&cells), rat(2 * (100 * 100 - 50 * 50)));
    }

    #[test]
    fn cells_partition_the_free_region() {
        let region = pwh(square(0, 0, 100, 100), vec![square(40, 40, 60, 60)]);
        let cells = decompose(&region, &up()).unwrap();

        // 10^4-point grid: membership in the free region must equal
        // membership in the cell union, and strict interiors are disjoint.
        for gy in 0..100 {
            for gx in 0..100 {
                let pt = p(gx, gy);
                let in_free = region.contains(&pt);
                let holding: Vec<usize> = (0..cells.len())
                    .filter(|&i| cells[i].contains(&pt))
                    .collect();
                assert_eq!(
                    !holding.is_empty(),
                    in_free,
                    "coverage mismatch at ({gx},{gy})"
                );
                let strict: usize = cells
                    .iter()
                    .filter(|c| crate::geom::point_strictly_in_ring(&pt, &c.pts))
                    .count();
                assert!(strict <= 1, "interiors overlap at ({gx},{gy})");
            }
        }
    }

    #[test]
    fn rotated_direction_yields_monotone_cells_in_that_frame() {
        let outer = Poly::new(vec![
            p(0, 0),
            p(100, 0),
            p(100, 50),
            p(50, 50),
            p(50, 100),
            p(0, 100),
        ]);
        let region = pwh(outer, vec![]);
        let dir = p(1, 1);
        let cells = decompose(&region, &dir).unwrap();
        assert!(!cells.is_empty());
        let frame = RotFrame::new(&dir);
        let area: R = total_area2(&cells);
        assert_eq!(area, rat(2 * (100 * 100 - 50 * 50)));
        for cell in &cells {
            assert!(frame.fwd_poly(cell).is_x_monotone());
        }
    }

    #[test]
    fn horizontal_sweep_direction_on_square_with_hole() {
        let region = pwh(square(0, 0, 100, 100), vec![square(40, 40, 60, 60)]);
        // sweep lines parallel to x: the sweep advances along y
        let cells = decompose(&region, &p(1, 0)).unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(total_area2(&cells), rat(2 * (100 * 100 - 20 * 20)));
    }

    #[test]
    fn two_holes_decompose_cleanly() {
        let region = pwh(
            square(0, 0, 200, 100),
            vec![square(30, 30, 50, 60), square(120, 20, 160, 80)],
        );
        let cells = decompose(&region, &up()).unwrap();
        assert_eq!(
            total_area2(&cells),
            rat(2 * (200 * 100 - 20 * 30 - 40 * 60))
        );
        for cell in &cells {
            assert!(cell.is_x_monotone());
            assert!(!cell.signed_area2().is_zero());
        }
    }

    #[test]
    fn best_direction_minimizes_cell_count() {
        let outer = Poly::new(vec![
            p(0, 0),
            p(100, 0),
            p(100, 50),
            p(50, 50),
            p(50, 100),
            p(0, 100),
        ]);
        let region = pwh(outer, vec![]);
        let (cells, dir) = decompose_best(&region).unwrap();
        // every horizontal line meets the L in one interval, so sweeping
        // across y keeps it a single monotone cell
        assert_eq!(cells.len(), 1);
        assert_eq!(dir.cross(&p(1, 0)), rat(0));
        assert_eq!(total_area2(&cells), rat(2 * (100 * 100 - 50 * 50)));
    }

    #[test]
    fn degenerate_input_is_rejected() {
        let region = PolyWithHoles::new(Poly::new(vec![p(0, 0), p(10, 0)]), vec![]);
        assert!(matches!(
            decompose(&region, &up()),
            Err(PlanError::DegeneratePolygon(_))
        ));
    }

    #[test]
    fn empty_region_gives_empty_output() {
        let region = PolyWithHoles::new(Poly::new(vec![]), vec![]);
        assert!(decompose(&region, &up()).unwrap().is_empty());
    }
}
