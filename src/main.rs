use std::env;
use std::fs;

use rsweep::config;
use rsweep::error::PlanError;
use rsweep::im::core::Lum8Im;
use rsweep::output;
use rsweep::pipeline::{self, BestAngle, ConfiguredStart, FullFrame};
use rsweep::report::{self, PlanReport};

const PARAMETER_FILE_PATH: &str = "config/params.config";
const WAYPOINT_COORDINATE_FILE_PATH: &str = "result/waypoints.txt";
const EXTERNAL_POLYGON_FILE_PATH: &str = "result/ext_polygon_coord.txt";
const REGION_OF_INTEREST_FILE_PATH: &str = "result/roi_points.txt";
const PREPROCESS_IMAGE_PATH: &str = "preprocess_img.png";
const RESULT_IMAGE_PATH: &str = "image_result.png";
const PLAN_REPORT_PATH: &str = "result/plan_report.json";

fn run() -> Result<(), PlanError> {
    let param_path = env::args()
        .nth(1)
        .unwrap_or_else(|| PARAMETER_FILE_PATH.to_string());
    let params = config::load(&param_path)?;

    println!("Parameters loaded:");
    println!("image_path: {}", params.image_path);
    println!(
        "robot_width, robot_height: {} {}",
        params.robot_width, params.robot_height
    );
    println!(
        "open_kernel_width, open_kernel_height: {} {}",
        params.open_kernel_width, params.open_kernel_height
    );
    println!("sweep_step: {}", params.sweep_step);
    println!("show_cells: {}", params.show_cells);

    let gray = Lum8Im::load_gray(&params.image_path)?;
    println!("Read map");

    // This build ships no interactive selectors; the default collaborators
    // fall back to the configured values and warn when the config asked for
    // mouse input.
    let plan = pipeline::run(&gray, &params, &FullFrame, &ConfiguredStart, &BestAngle)?;

    fs::create_dir_all("result")?;
    output::write_ext_polygon(EXTERNAL_POLYGON_FILE_PATH, &plan.outer_px)?;
    if let Some(pts) = &plan.roi_points {
        output::write_roi(REGION_OF_INTEREST_FILE_PATH, pts)?;
    }

    let rounded = output::round_waypoints(&plan.waypoints);
    output::write_waypoints(
        WAYPOINT_COORDINATE_FILE_PATH,
        &rounded,
        gray.h,
        params.subdivision_dist,
    )?;
    println!("Waypoints written to {WAYPOINT_COORDINATE_FILE_PATH}");

    plan.mask.save_png(PREPROCESS_IMAGE_PATH)?;
    let overlay = report::render_overlay(&gray, &plan.cells, &rounded);
    overlay.save_png(RESULT_IMAGE_PATH)?;

    if params.show_cells {
        let rep = PlanReport {
            main_direction_deg: plan.main_direction_deg,
            cell_count: plan.cells.len(),
            traversal: plan.traversal.clone(),
            waypoint_count: plan.waypoints.len(),
        };
        fs::write(PLAN_REPORT_PATH, report::report_json(&rep))?;
        println!("Cell report written to {PLAN_REPORT_PATH}");
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("rsweep: {err}");
        std::process::exit(1);
    }
}
