use clipper2::{One, Path, Paths, Point};

pub type IntPoint = Point<One>;
pub type IntPath = Path<One>;
pub type IntPaths = Paths<One>;

/// A set of integer rings bridged onto clipper2, used to run its
/// tolerance-based simplification over traced map contours.
#[derive(Clone, Debug)]
pub struct MPoly {
    paths: IntPaths,
}

fn path_from_ring(ring: &[(i32, i32)]) -> IntPath {
    IntPath::new(
        ring.iter()
            .map(|&(x, y)| IntPoint::from_scaled(x as i64, y as i64))
            .collect(),
    )
}

fn ring_from_path(path: &IntPath) -> Vec<(i32, i32)> {
    path.iter()
        .map(|pt| (pt.x_scaled() as i32, pt.y_scaled() as i32))
        .collect()
}

impl MPoly {
    pub fn new(paths: Vec<IntPath>) -> Self {
        Self {
            paths: IntPaths::new(paths),
        }
    }

    pub fn from_rings(rings: &[Vec<(i32, i32)>]) -> Self {
        Self::new(rings.iter().map(|r| path_from_ring(r)).collect())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn simplify(&self, epsilon: f64, preserve_collinear: bool) -> Self {
        Self {
            paths: self.paths.simplify(epsilon, preserve_collinear),
        }
    }

    pub fn rings(&self) -> Vec<Vec<(i32, i32)>> {
        self.paths.iter().map(ring_from_path).collect()
    }
}
