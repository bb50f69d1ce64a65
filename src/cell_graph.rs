use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::PlanError;
use crate::geom::{Rv2, collinear_overlap};
use crate::poly::{Poly, PolyWithHoles};

/// One decomposition cell. `cleaned` is the only mutable state in the whole
/// pipeline besides the waypoint list itself.
#[derive(Debug)]
pub struct Cell {
    pub poly: Poly,
    pub cleaned: bool,
}

/// Arena of cells with undirected adjacency; indices are stable 0..N-1.
#[derive(Debug)]
pub struct CellGraph {
    pub graph: UnGraph<Cell, ()>,
}

/// Candidate crossing points, keyed by ordered cell pair. Keys exist in both
/// directions for every adjacent pair.
pub type CellIntersections = HashMap<(usize, usize), Vec<Rv2>>;

fn shared_overlaps(a: &Poly, b: &Poly) -> Vec<(Rv2, Rv2)> {
    let mut out = Vec::new();
    for i in 0..a.len() {
        let (a1, a2) = a.edge(i);
        for j in 0..b.len() {
            let (b1, b2) = b.edge(j);
            if let Some(seg) = collinear_overlap(a1, a2, b1, b2) {
                if !out.contains(&seg) {
                    out.push(seg);
                }
            }
        }
    }
    out
}

impl CellGraph {
    /// Two cells are adjacent iff their boundaries share a segment of
    /// positive length.
    pub fn build(cells: Vec<Poly>) -> Self {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<NodeIndex> = cells
            .into_iter()
            .map(|poly| graph.add_node(Cell { poly, cleaned: false }))
            .collect();

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let shared = !shared_overlaps(
                    &graph[nodes[i]].poly,
                    &graph[nodes[j]].poly,
                )
                .is_empty();
                if shared {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }

        Self { graph }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn cell(&self, i: usize) -> &Cell {
        &self.graph[NodeIndex::new(i)]
    }

    pub fn mark_cleaned(&mut self, i: usize) {
        self.graph[NodeIndex::new(i)].cleaned = true;
    }

    pub fn all_cleaned(&self) -> bool {
        self.graph.node_weights().all(|c| c.cleaned)
    }

    /// Neighbor indices in ascending order, so every downstream choice is
    /// deterministic.
    pub fn neighbors_sorted(&self, i: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(i))
            .map(|n| n.index())
            .collect();
        out.sort_unstable();
        out
    }

    /// Candidate entry points for every adjacent pair: the endpoints of each
    /// shared segment plus its quarter, half and three-quarter points.
    pub fn cell_intersections(&self) -> CellIntersections {
        let mut out = CellIntersections::new();
        for i in 0..self.len() {
            for j in self.neighbors_sorted(i) {
                if j < i {
                    continue;
                }
                let mut cands: Vec<Rv2> = Vec::new();
                for (a, b) in shared_overlaps(&self.cell(i).poly, &self.cell(j).poly) {
                    for p in [
                        a.clone(),
                        a.lerp(&b, 1, 4),
                        a.lerp(&b, 1, 2),
                        a.lerp(&b, 3, 4),
                        b,
                    ] {
                        if !cands.contains(&p) {
                            cands.push(p);
                        }
                    }
                }
                out.insert((i, j), cands.clone());
                out.insert((j, i), cands);
            }
        }
        out
    }

    /// Depth-first walk from `start`, re-emitting each node on the way back
    /// up, so consecutive entries are always adjacent cells.
    pub fn traversal_order(&self, start: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut visited = vec![false; self.len()];
        self.dfs(start, &mut visited, &mut order);
        order
    }

    fn dfs(&self, u: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        visited[u] = true;
        order.push(u);
        for v in self.neighbors_sorted(u) {
            if !visited[v] {
                self.dfs(v, visited, order);
                order.push(u);
            }
        }
    }
}

/// Index of the cell holding the start point: lowest-index closed
/// containment first; a point inside the free region but on a seam goes to
/// the cell with the nearest boundary; anything outside the region fails.
pub fn locate_start(
    graph: &CellGraph,
    pwh: &PolyWithHoles,
    start: &Rv2,
) -> Result<usize, PlanError> {
    for i in 0..graph.len() {
        if graph.cell(i).poly.contains(start) {
            return Ok(i);
        }
    }

    if pwh.contains(start) {
        let mut best: Option<(usize, crate::geom::R)> = None;
        for i in 0..graph.len() {
            if let Some(d2) = graph.cell(i).poly.boundary_dist2(start) {
                if best.as_ref().map_or(true, |(_, bd)| &d2 < bd) {
                    best = Some((i, d2));
                }
            }
        }
        if let Some((i, _)) = best {
            return Ok(i);
        }
    }

    Err(PlanError::StartOutOfRegion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcd;
    use crate::geom::rat;

    fn p(x: i64, y: i64) -> Rv2 {
        Rv2::new(rat(x), rat(y))
    }

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> Poly {
        Poly::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)])
    }

    fn square_with_hole() -> (CellGraph, PolyWithHoles) {
        let mut region =
            PolyWithHoles::new(square(0, 0, 100, 100), vec![square(40, 40, 60, 60)]);
        region.normalize();
        let cells = bcd::decompose(&region, &p(0, 1)).unwrap();
        (CellGraph::build(cells), region)
    }

    #[test]
    fn hole_cells_form_a_cycle() {
        let (graph, _) = square_with_hole();
        assert_eq!(graph.len(), 4);
        for i in 0..4 {
            assert_eq!(graph.neighbors_sorted(i).len(), 2, "cell {i} degree");
        }
        // the two middle cells flank the hole and never touch each other
        assert_eq!(graph.neighbors_sorted(0), vec![1, 2]);
        assert_eq!(graph.neighbors_sorted(3), vec![1, 2]);
    }

    #[test]
    fn intersections_sample_the_shared_segment() {
        let (graph, _) = square_with_hole();
        let inters = graph.cell_intersections();
        let cands = inters.get(&(0, 1)).expect("cells 0 and 1 are adjacent");
        // endpoints plus three interior points of one shared segment
        assert_eq!(cands.len(), 5);
        for c in cands {
            assert_eq!(c.x, rat(40));
        }
        assert_eq!(inters.get(&(1, 0)), inters.get(&(0, 1)));
        assert!(inters.get(&(1, 2)).is_none());
    }

    #[test]
    fn traversal_visits_every_cell_through_adjacent_steps() {
        let (graph, _) = square_with_hole();
        let order = graph.traversal_order(0);
        for i in 0..4 {
            assert!(order.contains(&i), "cell {i} missing from traversal");
        }
        for w in order.windows(2) {
            assert!(
                graph.neighbors_sorted(w[0]).contains(&w[1]),
                "consecutive cells {w:?} are not adjacent"
            );
        }
        assert_eq!(order[0], 0);
    }

    #[test]
    fn start_lookup_prefers_containing_cell() {
        let (graph, region) = square_with_hole();
        let idx = locate_start(&graph, &region, &p(5, 5)).unwrap();
        assert_eq!(idx, 0);
        // a seam point picks the lowest-index incident cell
        let idx = locate_start(&graph, &region, &p(40, 20)).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn start_outside_region_fails() {
        let (graph, region) = square_with_hole();
        assert!(matches!(
            locate_start(&graph, &region, &p(-5, -5)),
            Err(PlanError::StartOutOfRegion)
        ));
        // strictly inside the hole is outside the free region
        assert!(matches!(
            locate_start(&graph, &region, &p(50, 50)),
            Err(PlanError::StartOutOfRegion)
        ));
    }
}
