use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use num_traits::ToPrimitive;

use crate::error::PlanError;
use crate::geom::Rv2;
use crate::stitch;

/// Rounds exact waypoints to integer pixels, half away from zero.
pub fn round_waypoints(pts: &[Rv2]) -> Vec<(i32, i32)> {
    pts.iter()
        .map(|p| {
            (
                p.x.to_f64().unwrap_or(f64::NAN).round() as i32,
                p.y.to_f64().unwrap_or(f64::NAN).round() as i32,
            )
        })
        .collect()
}

/// Writes the waypoint file: one `x y` per line, subdivided when requested,
/// with y flipped into the y-up frame (`y' = 2*(H/2) - y`).
///
/// The writer emits segment endpoints, so fewer than two waypoints produce
/// an empty file.
pub fn write_waypoints<P: AsRef<Path>>(
    path: P,
    pts: &[(i32, i32)],
    img_h: usize,
    subdivision_dist: u32,
) -> Result<(), PlanError> {
    let mut out = BufWriter::new(File::create(path)?);
    if pts.len() >= 2 {
        let y_center = (img_h / 2) as i32;
        for (x, y) in stitch::subdivide(pts, subdivision_dist) {
            writeln!(out, "{} {}", x, 2 * y_center - y)?;
        }
    }
    Ok(())
}

/// External polygon file: vertex count, then one `x y` per line.
pub fn write_ext_polygon<P: AsRef<Path>>(
    path: P,
    ring: &[(i32, i32)],
) -> Result<(), PlanError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", ring.len())?;
    for (x, y) in ring {
        writeln!(out, "{x} {y}")?;
    }
    Ok(())
}

/// ROI file: the four selected points, image coordinates.
pub fn write_roi<P: AsRef<Path>>(
    path: P,
    points: &[(i32, i32); 4],
) -> Result<(), PlanError> {
    let mut out = BufWriter::new(File::create(path)?);
    for (x, y) in points {
        writeln!(out, "{x} {y}")?;
    }
    Ok(())
}
