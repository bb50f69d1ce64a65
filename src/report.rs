use serde::Serialize;

use crate::im::core::Lum8Im;
use crate::im::RGBAIm;
use crate::poly::Poly;

/// Machine-readable run summary, written next to the overlay image when
/// SHOW_CELLS is on. Replaces the interactive cell-display windows.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub main_direction_deg: i32,
    pub cell_count: usize,
    pub traversal: Vec<usize>,
    pub waypoint_count: usize,
}

pub fn report_json(report: &PlanReport) -> String {
    serde_json::to_string_pretty(report).expect("report serialization cannot fail")
}

const CELL_COLOR: [u8; 4] = [255, 0, 255, 255];
const PATH_COLOR: [u8; 4] = [255, 64, 0, 255];

/// Bresenham segment draw, clipped to the image.
pub fn draw_segment(im: &mut RGBAIm, p0: (i32, i32), p1: (i32, i32), rgba: [u8; 4]) {
    let dx = (p1.0 - p0.0).abs();
    let dy = -(p1.1 - p0.1).abs();
    let sx = if p0.0 < p1.0 { 1 } else { -1 };
    let sy = if p0.1 < p1.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = p0.0;
    let mut y = p0.1;

    loop {
        if x >= 0 && x < im.w as i32 && y >= 0 && y < im.h as i32 {
            for ch in 0..4 {
                im.set(x as usize, y as usize, ch, rgba[ch]);
            }
        }
        if x == p1.0 && y == p1.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn round_ring(poly: &Poly) -> Vec<(i32, i32)> {
    crate::output::round_waypoints(&poly.pts)
}

/// Draws the decomposition cells and the final path over the map.
pub fn render_overlay(gray: &Lum8Im, cells: &[Poly], waypoints: &[(i32, i32)]) -> RGBAIm {
    let mut im = RGBAIm::new(gray.w, gray.h);
    for y in 0..gray.h {
        for x in 0..gray.w {
            let v = gray.at(x, y, 0);
            im.set(x, y, 0, v);
            im.set(x, y, 1, v);
            im.set(x, y, 2, v);
            im.set(x, y, 3, 255);
        }
    }

    for cell in cells {
        let ring = round_ring(cell);
        let n = ring.len();
        for i in 0..n {
            draw_segment(&mut im, ring[i], ring[(i + 1) % n], CELL_COLOR);
        }
    }

    for seg in waypoints.windows(2) {
        draw_segment(&mut im, seg[0], seg[1], PATH_COLOR);
    }

    im
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Rv2, rat};

    #[test]
    fn report_serializes_to_json() {
        let report = PlanReport {
            main_direction_deg: 90,
            cell_count: 4,
            traversal: vec![0, 1, 3, 2, 3, 1, 0],
            waypoint_count: 42,
        };
        let json = report_json(&report);
        assert!(json.contains("\"cell_count\": 4"));
        assert!(json.contains("\"main_direction_deg\": 90"));
    }

    #[test]
    fn segment_draw_is_clipped() {
        let mut im = RGBAIm::new(8, 8);
        draw_segment(&mut im, (-5, 3), (12, 3), [255, 0, 0, 255]);
        for x in 0..8 {
            assert_eq!(im.at(x, 3, 0), 255);
        }
        assert_eq!(im.at(0, 0, 0), 0);
    }

    #[test]
    fn overlay_paints_cells_and_path() {
        let mut gray = Lum8Im::new(20, 20);
        gray.arr.fill(200);
        let cell = Poly::new(vec![
            Rv2::new(rat(2), rat(2)),
            Rv2::new(rat(17), rat(2)),
            Rv2::new(rat(17), rat(17)),
            Rv2::new(rat(2), rat(17)),
        ]);
        let im = render_overlay(&gray, &[cell], &[(5, 5), (15, 5)]);
        // cell outline pixel
        assert_eq!(
            [im.at(2, 2, 0), im.at(2, 2, 1), im.at(2, 2, 2)],
            [255, 0, 255]
        );
        // path pixel
        assert_eq!(
            [im.at(10, 5, 0), im.at(10, 5, 1), im.at(10, 5, 2)],
            [255, 64, 0]
        );
        // untouched background keeps the map value
        assert_eq!(im.at(10, 10, 0), 200);
    }
}
