use crate::config::Params;
use crate::error::PlanError;
use crate::im::core::Lum8Im;
use crate::im::{Im, MaskIm, Roi};
use crate::morph::{self, Kernel};
use crate::mpoly::MPoly;
use crate::poly::{Poly, PolyWithHoles};
use crate::trace::trace_contours;

/// Binarization threshold: everything strictly brighter is free space.
const FREE_THRESHOLD: u8 = 250;

/// Douglas–Peucker-style simplification tolerance, in pixels.
const SIMPLIFY_EPS: f64 = 3.0;

#[derive(Debug)]
pub struct Extraction {
    /// The free region, exact, in original-image coordinates.
    pub pwh: PolyWithHoles,
    /// Simplified outer ring in pixels (external polygon file, histogram).
    pub outer_px: Vec<(i32, i32)>,
    pub holes_px: Vec<Vec<(i32, i32)>>,
    /// Post-morphology free mask, in the (possibly cropped) working frame.
    pub mask: MaskIm,
    pub roi: Option<Roi>,
}

fn simplify_ring(ring: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let simplified = MPoly::from_rings(&[ring.to_vec()]).simplify(SIMPLIFY_EPS, false);
    simplified.rings().into_iter().next().unwrap_or_default()
}

fn translate(ring: &mut [(i32, i32)], dx: i32, dy: i32) {
    for p in ring {
        p.0 += dx;
        p.1 += dy;
    }
}

/// Turns the occupancy map into a polygon-with-holes: binarize, erode by the
/// robot footprint, open away speckle, inflate obstacles, trace the contour
/// nesting, keep the largest outer boundary with its direct children, and
/// simplify every ring.
pub fn extract(
    gray: &Lum8Im,
    params: &Params,
    roi_pts: Option<&[(i32, i32); 4]>,
) -> Result<Extraction, PlanError> {
    // Optional ROI crop; the offset is added back at the end so every output
    // lives in the original image frame.
    let roi = roi_pts.map(|pts| Roi::bounding(pts, gray.w, gray.h));
    if let Some(r) = roi {
        if r.w() == 0 || r.h() == 0 {
            return Err(PlanError::InvalidParameter(
                "ROI selection has zero area".into(),
            ));
        }
    }
    let working: Lum8Im = match roi {
        Some(r) => gray.crop(r.l, r.t, r.r, r.b),
        None => gray.clone(),
    };
    if working.w < 2 || working.h < 2 {
        return Err(PlanError::InvalidMap("empty map".into()));
    }

    let mut mask = morph::threshold(&working, FREE_THRESHOLD);

    // Shrink free space by the robot footprint.
    let robot = Kernel::ellipse(params.robot_width as usize, params.robot_height as usize);
    let mut tmp = MaskIm::new(mask.w, mask.h);
    morph::erode(&mask, &mut tmp, &robot);
    std::mem::swap(&mut mask, &mut tmp);

    // Opening removes speckle left by the thresholding.
    let opening = Kernel::rect(
        params.open_kernel_width as usize,
        params.open_kernel_height as usize,
    );
    morph::open(&mask, &mut tmp, &opening);
    std::mem::swap(&mut mask, &mut tmp);

    // Inflate obstacles: invert so walls are foreground, dilate, invert back.
    let inflation = Kernel::ellipse(
        params.dilate_kernel_width as usize,
        params.dilate_kernel_height as usize,
    );
    morph::invert(&mut mask);
    morph::dilate(&mask, &mut tmp, &inflation);
    std::mem::swap(&mut mask, &mut tmp);
    morph::invert(&mut mask);

    // Trace the contour nesting on an i32 scratch copy.
    let mut labels: Im<i32, 1> = Im::new(mask.w, mask.h);
    for (dst, &src) in labels.arr.iter_mut().zip(mask.arr.iter()) {
        *dst = if src != 0 { 1 } else { 0 };
    }
    let contours = trace_contours(&mut labels);
    if contours.iter().all(|c| c.points.len() < 3) {
        return Err(PlanError::InvalidMap("empty map".into()));
    }

    // Largest area wins the outer boundary; its direct children are holes.
    // First maximum, so equal areas resolve to the lowest index.
    let mut ext_idx = 0;
    for i in 1..contours.len() {
        if contours[i].area2().abs() > contours[ext_idx].area2().abs() {
            ext_idx = i;
        }
    }

    let ring_px = |idx: usize| -> Vec<(i32, i32)> {
        contours[idx]
            .points
            .iter()
            .map(|p| (p.x, p.y))
            .collect()
    };

    let mut outer_px = simplify_ring(&ring_px(ext_idx));
    if outer_px.len() < 3 {
        return Err(PlanError::InvalidMap("map has no traversable area".into()));
    }

    let mut holes_px: Vec<Vec<(i32, i32)>> = Vec::new();
    for (i, c) in contours.iter().enumerate() {
        if c.parent == Some(ext_idx) {
            let hole = simplify_ring(&ring_px(i));
            if hole.len() >= 3 {
                holes_px.push(hole);
            }
        }
    }

    if let Some(r) = roi {
        translate(&mut outer_px, r.l as i32, r.t as i32);
        for hole in &mut holes_px {
            translate(hole, r.l as i32, r.t as i32);
        }
    }

    let mut pwh = PolyWithHoles::new(
        Poly::from_pixels(&outer_px),
        holes_px.iter().map(|h| Poly::from_pixels(h)).collect(),
    );
    pwh.normalize();

    Ok(Extraction {
        pwh,
        outer_px,
        holes_px,
        mask,
        roi,
    })
}
