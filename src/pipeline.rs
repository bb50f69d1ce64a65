use std::time::Instant;

use num_rational::BigRational;

use crate::bcd;
use crate::cell_graph::{CellGraph, locate_start};
use crate::config::Params;
use crate::error::PlanError;
use crate::extract;
use crate::geom::Rv2;
use crate::im::core::Lum8Im;
use crate::im::{MaskIm, Roi};
use crate::poly::Poly;
use crate::stitch;
use crate::sweep::compute_sweep;
use crate::sweep_dir::{find_best_sweep_dir, main_direction_deg};

/// Per-cell sweep orientation collaborator. Interactive frontends may ask
/// the user; `None` accepts the best direction.
pub trait AngleProvider {
    fn sweep_angle_deg(&self, cell_idx: usize, best_deg: f64) -> Option<f64>;
}

/// Non-interactive default: every cell sweeps along its best direction.
pub struct BestAngle;

impl AngleProvider for BestAngle {
    fn sweep_angle_deg(&self, _cell_idx: usize, _best_deg: f64) -> Option<f64> {
        None
    }
}

/// Start-point collaborator. Interactive frontends may take a mouse click.
pub trait StartProvider {
    fn start_point(&self, params: &Params) -> (i32, i32);
}

/// Non-interactive default: the configured START_POS, warning when the
/// config asked for mouse selection.
pub struct ConfiguredStart;

impl StartProvider for ConfiguredStart {
    fn start_point(&self, params: &Params) -> (i32, i32) {
        if params.mouse_select_start {
            eprintln!(
                "warning: MOUSE_SELECT_START set but no interactive selector is \
                 available, using START_POS"
            );
        }
        (params.start_x as i32, params.start_y as i32)
    }
}

/// Region-of-interest collaborator: four user points when CROP_REGION is on.
pub trait RoiProvider {
    fn roi_points(&self, params: &Params) -> Option<[(i32, i32); 4]>;
}

/// Non-interactive default: never crops, warning when the config asked to.
pub struct FullFrame;

impl RoiProvider for FullFrame {
    fn roi_points(&self, params: &Params) -> Option<[(i32, i32); 4]> {
        if params.crop_region {
            eprintln!(
                "warning: CROP_REGION set but no interactive selector is \
                 available, using the full frame"
            );
        }
        None
    }
}

#[derive(Debug)]
pub struct Plan {
    /// Exact waypoints, original image frame, before rounding.
    pub waypoints: Vec<Rv2>,
    pub cells: Vec<Poly>,
    pub traversal: Vec<usize>,
    pub outer_px: Vec<(i32, i32)>,
    pub holes_px: Vec<Vec<(i32, i32)>>,
    pub roi: Option<Roi>,
    /// The four selected ROI points, when a crop happened.
    pub roi_points: Option<[(i32, i32); 4]>,
    /// Post-morphology free mask (working frame).
    pub mask: MaskIm,
    pub main_direction_deg: i32,
}

fn angle_to_dir(deg: f64) -> Option<Rv2> {
    let rad = deg.to_radians();
    let (c, s) = (rad.cos(), rad.sin());
    if !c.is_finite() || !s.is_finite() {
        return None;
    }
    // f64 -> rational is exact, so the rotated frame stays exact
    Some(Rv2::new(
        BigRational::from_float(c)?,
        BigRational::from_float(s)?,
    ))
}

/// Runs the whole planar coverage pipeline on a grayscale map.
///
/// All parameters arrive through the immutable `Params`; everything
/// interactive (ROI selection, start selection, per-cell angles) goes
/// through the collaborator traits, whose defaults fall back to the
/// configured values.
pub fn run(
    gray: &Lum8Im,
    params: &Params,
    roi: &dyn RoiProvider,
    start: &dyn StartProvider,
    angles: &dyn AngleProvider,
) -> Result<Plan, PlanError> {
    println!("Pre-processing map image");
    let roi_points = roi.roi_points(params);
    let ext = extract::extract(gray, params, roi_points.as_ref())?;

    let main_deg = main_direction_deg(&ext.outer_px);
    println!("main deg: {main_deg}");

    println!("Performing cell decomposition");
    let t0 = Instant::now();
    let (cells, _bcd_dir) = bcd::decompose_best(&ext.pwh)?;
    println!(
        "Cell decomposition complete in {}s",
        t0.elapsed().as_secs_f64()
    );
    if cells.is_empty() {
        return Err(PlanError::InvalidMap("map has no traversable area".into()));
    }

    let cells_out = cells.clone();
    let mut graph = CellGraph::build(cells);

    let (start_x, start_y) = start.start_point(params);
    let start = Rv2::from_pixel(start_x, start_y);
    let start_cell = locate_start(&graph, &ext.pwh, &start)?;
    let order = graph.traversal_order(start_cell);
    for i in 0..graph.len() {
        if !order.contains(&i) {
            return Err(PlanError::Decomposition(format!(
                "cell {i} is unreachable from the start cell"
            )));
        }
    }
    print!("start");
    for c in &order {
        print!("->{c}");
    }
    println!();
    println!("path length: {}", order.len());

    let mut sweeps: Vec<Vec<Rv2>> = Vec::with_capacity(graph.len());
    for i in 0..graph.len() {
        let poly = &graph.cell(i).poly;
        let Some((best_dir, _altitude)) = find_best_sweep_dir(poly) else {
            eprintln!("warning: cell {i} is degenerate, no sweep generated");
            sweeps.push(Vec::new());
            continue;
        };

        let dir = if params.manual_orientation {
            let (bx, by) = best_dir.to_f64();
            let best_deg = by.atan2(bx).to_degrees();
            match angles.sweep_angle_deg(i, best_deg) {
                Some(deg) if deg.is_finite() => match angle_to_dir(deg) {
                    Some(d) => d,
                    None => {
                        eprintln!(
                            "warning: sweep angle for cell {i} does not form a \
                             direction, using the best direction"
                        );
                        best_dir
                    }
                },
                Some(_) => {
                    eprintln!(
                        "warning: invalid sweep angle for cell {i}, using the best \
                         direction"
                    );
                    best_dir
                }
                None => best_dir,
            }
        } else {
            best_dir
        };

        let sweep = compute_sweep(poly, params.sweep_step, &dir, true)?;
        if sweep.is_empty() {
            eprintln!("warning: sweep for cell {i} returned no points");
        }
        sweeps.push(sweep);
    }

    let inters = graph.cell_intersections();
    let waypoints = stitch::stitch(&mut graph, &sweeps, &inters, &order, &start)?;
    if !graph.all_cleaned() {
        return Err(PlanError::Decomposition(
            "stitching finished with uncleaned cells".into(),
        ));
    }

    Ok(Plan {
        waypoints,
        cells: cells_out,
        traversal: order,
        outer_px: ext.outer_px,
        holes_px: ext.holes_px,
        roi: ext.roi,
        roi_points,
        mask: ext.mask,
        main_direction_deg: main_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_obstacle() -> Lum8Im {
        let mut im = Lum8Im::new(80, 80);
        im.arr.fill(255);
        for y in 34..46 {
            for x in 34..46 {
                im.arr[y * 80 + x] = 0;
            }
        }
        im
    }

    fn params() -> Params {
        Params {
            sweep_step: 10,
            start_x: 5,
            start_y: 5,
            ..Params::default()
        }
    }

    struct FixedStart(i32, i32);

    impl StartProvider for FixedStart {
        fn start_point(&self, _params: &Params) -> (i32, i32) {
            (self.0, self.1)
        }
    }

    #[test]
    fn full_pipeline_covers_the_map() {
        let gray = map_with_obstacle();
        let plan = run(&gray, &params(), &FullFrame, &ConfiguredStart, &BestAngle).unwrap();

        assert!(!plan.waypoints.is_empty());
        assert_eq!(plan.waypoints[0], Rv2::from_pixel(5, 5));
        assert!(plan.cells.len() >= 2);
        assert!(!plan.traversal.is_empty());
        // no waypoint may sit inside the (inflated) obstacle
        for w in &plan.waypoints {
            for hole in &plan.holes_px {
                let ring = Poly::from_pixels(hole);
                assert!(
                    !crate::geom::point_strictly_in_ring(w, &ring.pts),
                    "waypoint {w:?} inside an obstacle"
                );
            }
        }
    }

    #[test]
    fn pipeline_is_deterministic() {
        let gray = map_with_obstacle();
        let a = run(&gray, &params(), &FullFrame, &ConfiguredStart, &BestAngle).unwrap();
        let b = run(&gray, &params(), &FullFrame, &ConfiguredStart, &BestAngle).unwrap();
        assert_eq!(a.waypoints, b.waypoints);
        assert_eq!(a.traversal, b.traversal);
    }

    #[test]
    fn start_outside_map_fails() {
        let gray = map_with_obstacle();
        assert!(matches!(
            run(&gray, &params(), &FullFrame, &FixedStart(-5, -5), &BestAngle),
            Err(PlanError::StartOutOfRegion)
        ));
    }

    struct FixedRoi([(i32, i32); 4]);

    impl RoiProvider for FixedRoi {
        fn roi_points(&self, _params: &Params) -> Option<[(i32, i32); 4]> {
            Some(self.0)
        }
    }

    #[test]
    fn roi_provider_crops_and_reports_its_points() {
        let gray = map_with_obstacle();
        // crop the free top-left corner, well clear of the obstacle
        let pts = [(0, 0), (30, 0), (30, 30), (0, 30)];
        let mut p = params();
        p.crop_region = true;
        let plan = run(&gray, &p, &FixedRoi(pts), &ConfiguredStart, &BestAngle).unwrap();
        assert_eq!(plan.roi_points, Some(pts));
        assert!(plan.holes_px.is_empty());
        assert!(!plan.waypoints.is_empty());
    }

    struct FixedAngle(f64);

    impl AngleProvider for FixedAngle {
        fn sweep_angle_deg(&self, _cell_idx: usize, _best_deg: f64) -> Option<f64> {
            Some(self.0)
        }
    }

    #[test]
    fn manual_orientation_accepts_finite_angles() {
        let gray = map_with_obstacle();
        let mut p = params();
        p.manual_orientation = true;
        let plan = run(&gray, &p, &FullFrame, &ConfiguredStart, &FixedAngle(90.0)).unwrap();
        assert!(!plan.waypoints.is_empty());
    }

    #[test]
    fn degenerate_angle_falls_back_to_best_direction() {
        let gray = map_with_obstacle();
        let mut p = params();
        p.manual_orientation = true;
        let with_nan =
            run(&gray, &p, &FullFrame, &ConfiguredStart, &FixedAngle(f64::NAN)).unwrap();
        p.manual_orientation = false;
        let best = run(&gray, &p, &FullFrame, &ConfiguredStart, &BestAngle).unwrap();
        assert_eq!(with_nan.waypoints, best.waypoints);
    }
}
