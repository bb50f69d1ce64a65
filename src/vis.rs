use num_bigint::BigInt;
use num_rational::BigRational;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::PlanError;
use crate::geom::{R, Rv2, on_segment, segments_properly_cross};
use crate::poly::Poly;

/// True when the closed segment [a, b] stays inside the closed cell.
///
/// No edge may be properly crossed, and every open sub-interval between
/// boundary touch points must have its midpoint inside. The sub-interval
/// check is what keeps a segment from slipping past a reflex vertex.
pub fn segment_in_cell(cell: &Poly, a: &Rv2, b: &Rv2) -> bool {
    if a == b {
        return cell.contains(a);
    }

    let n = cell.len();
    for i in 0..n {
        let (e1, e2) = cell.edge(i);
        if segments_properly_cross(a, b, e1, e2) {
            return false;
        }
    }

    // parameters along a->b where the segment meets boundary vertices
    let ab = b.sub(a);
    let len2 = ab.norm2();
    let mut ts: Vec<R> = vec![rat0(), rat1()];
    for v in &cell.pts {
        if v != a && v != b && on_segment(v, a, b) {
            ts.push(v.sub(a).dot(&ab) / &len2);
        }
    }
    ts.sort();
    ts.dedup();

    for pair in ts.windows(2) {
        let mid_t = (&pair[0] + &pair[1]) / rat2();
        let mid = Rv2::new(&a.x + &ab.x * &mid_t, &a.y + &ab.y * &mid_t);
        if !cell.contains(&mid) {
            return false;
        }
    }
    true
}

fn rat0() -> R {
    BigRational::from_integer(BigInt::from(0))
}
fn rat1() -> R {
    BigRational::from_integer(BigInt::from(1))
}
fn rat2() -> R {
    BigRational::from_integer(BigInt::from(2))
}

/// Shortest path between two points of a cell, via a visibility graph over
/// the cell vertices plus the two query points. Dijkstra is petgraph's
/// astar with a zero estimate; weights are Euclidean lengths.
pub fn shortest_path(cell: &Poly, s: &Rv2, t: &Rv2) -> Result<Vec<Rv2>, PlanError> {
    if s == t {
        return Ok(vec![s.clone()]);
    }
    if segment_in_cell(cell, s, t) {
        return Ok(vec![s.clone(), t.clone()]);
    }

    let mut graph: UnGraph<Rv2, f64> = UnGraph::new_undirected();
    let mut nodes: Vec<NodeIndex> = cell
        .pts
        .iter()
        .map(|p| graph.add_node(p.clone()))
        .collect();
    let s_node = graph.add_node(s.clone());
    let t_node = graph.add_node(t.clone());
    nodes.push(s_node);
    nodes.push(t_node);

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let (pa, pb) = (&graph[nodes[i]], &graph[nodes[j]]);
            if segment_in_cell(cell, pa, pb) {
                let w = pa.dist_f64(pb);
                graph.add_edge(nodes[i], nodes[j], w);
            }
        }
    }

    let (_, path) = astar(
        &graph,
        s_node,
        |n| n == t_node,
        |e| *e.weight(),
        |_| 0.0,
    )
    .ok_or_else(|| {
        PlanError::Decomposition("no in-cell path between query points".into())
    })?;

    Ok(path.into_iter().map(|n| graph[n].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::rat;

    fn p(x: i64, y: i64) -> Rv2 {
        Rv2::new(rat(x), rat(y))
    }

    fn l_shape() -> Poly {
        Poly::new(vec![
            p(0, 0),
            p(100, 0),
            p(100, 50),
            p(50, 50),
            p(50, 100),
            p(0, 100),
        ])
    }

    #[test]
    fn straight_path_in_convex_cell() {
        let cell = Poly::new(vec![p(0, 0), p(10, 0), p(10, 10), p(0, 10)]);
        let path = shortest_path(&cell, &p(1, 1), &p(9, 9)).unwrap();
        assert_eq!(path, vec![p(1, 1), p(9, 9)]);
    }

    #[test]
    fn concave_path_bends_at_reflex_vertex() {
        let path = shortest_path(&l_shape(), &p(90, 25), &p(25, 90)).unwrap();
        assert_eq!(path, vec![p(90, 25), p(50, 50), p(25, 90)]);
    }

    #[test]
    fn path_length_lower_bound() {
        let cell = l_shape();
        let (s, t) = (p(90, 25), p(25, 90));
        let path = shortest_path(&cell, &s, &t).unwrap();
        let len: f64 = path.windows(2).map(|w| w[0].dist_f64(&w[1])).sum();
        assert!(len >= s.dist_f64(&t));
    }

    #[test]
    fn boundary_segment_is_visible() {
        let cell = l_shape();
        assert!(segment_in_cell(&cell, &p(0, 0), &p(100, 0)));
        assert!(segment_in_cell(&cell, &p(50, 50), &p(50, 100)));
    }

    #[test]
    fn segment_through_outside_is_rejected() {
        let cell = l_shape();
        assert!(!segment_in_cell(&cell, &p(90, 25), &p(25, 90)));
        assert!(!segment_in_cell(&cell, &p(40, 80), &p(80, 40)));
        // starts on the boundary, then leaves the cell
        assert!(!segment_in_cell(&cell, &p(50, 60), &p(60, 50)));
    }

    #[test]
    fn segment_touching_reflex_vertex_inside_is_accepted() {
        let cell = l_shape();
        // stays inside, passing exactly through (50,50)
        assert!(segment_in_cell(&cell, &p(40, 60), &p(60, 40)));
    }

    #[test]
    fn same_point_path_is_singleton() {
        let cell = l_shape();
        assert_eq!(shortest_path(&cell, &p(5, 5), &p(5, 5)).unwrap(), vec![p(5, 5)]);
    }
}
