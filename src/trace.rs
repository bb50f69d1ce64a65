use std::collections::HashMap;

use crate::im::Im;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iv2 {
    pub x: i32,
    pub y: i32,
}

/// One traced border. `parent` indexes into the returned contour list;
/// outer borders of nested regions have hole parents and vice versa.
#[derive(Debug)]
pub struct Contour {
    pub id: i32,
    pub is_hole: bool,
    pub parent: Option<usize>,
    pub points: Vec<Iv2>,
}

impl Contour {
    fn new(id: i32, is_hole: bool) -> Self {
        Self {
            id,
            is_hole,
            parent: None,
            points: Vec::new(),
        }
    }

    /// Twice the signed shoelace area of the traced ring.
    pub fn area2(&self) -> i64 {
        let pts = &self.points;
        if pts.len() < 3 {
            return 0;
        }
        let mut acc: i64 = 0;
        let mut prev = pts[pts.len() - 1];
        for &p in pts {
            acc += prev.x as i64 * p.y as i64 - p.x as i64 * prev.y as i64;
            prev = p;
        }
        acc
    }
}

/// Suzuki–Abe contour tracing over a 1-channel i32 image.
///
/// Preconditions:
/// - `im` must be binary-ish (0 vs nonzero); the interior is normalized
///   to {0,1} in place.
/// - Border labels and contour IDs are written into the image.
/// - The outermost 1-pixel frame is forced to 0, so foreground touching the
///   frame is cut off by one pixel.
///
/// Returns contours with parent references as indices into the result.
pub fn trace_contours(im: &mut Im<i32, 1>) -> Vec<Contour> {
    let w = im.w;
    let h = im.h;
    assert!(w >= 2 && h >= 2, "need at least a 1-pixel border");

    let w1 = w - 1;
    let h1 = h - 1;

    // 8-neighborhood LUTs.
    const DIR_TO_DELT_CW: [(i32, i32); 8] = [
        (0, 1),   // 0
        (1, 1),   // 1
        (1, 0),   // 2
        (1, -1),  // 3
        (0, -1),  // 4
        (-1, -1), // 5
        (-1, 0),  // 6
        (-1, 1),  // 7
    ];

    const DELT_PLUS_1_TO_DIR_CW: [i32; 9] = [
        // dy = -1, dx = -1,0,1
        5, 6, 7, // dy = 0, dx = -1,0,1 (0 impossible)
        4, -1, 0, // dy = 1, dx = -1,0,1
        3, 2, 1,
    ];

    const DIR_TO_DELT_CCW: [(i32, i32); 8] = [
        (0, 1),   // 0
        (-1, 1),  // 1
        (-1, 0),  // 2
        (-1, -1), // 3
        (0, -1),  // 4
        (1, -1),  // 5
        (1, 0),   // 6
        (1, 1),   // 7
    ];

    const DELT_PLUS_1_TO_DIR_CCW: [i32; 9] = [
        // dy = -1
        3, 2, 1, // dy = 0
        4, -1, 0, // dy = 1
        5, 6, 7,
    ];

    #[inline]
    fn delt_to_dir_cw(dy: i32, dx: i32) -> i32 {
        DELT_PLUS_1_TO_DIR_CW[((dy + 1) * 3 + (dx + 1)) as usize]
    }
    #[inline]
    fn delt_to_dir_ccw(dy: i32, dx: i32) -> i32 {
        DELT_PLUS_1_TO_DIR_CCW[((dy + 1) * 3 + (dx + 1)) as usize]
    }

    // Border of zeros
    for y in 0..h {
        im.set(0, y, 0, 0);
        im.set(w1, y, 0, 0);
    }
    for x in 0..w {
        im.set(x, 0, 0, 0);
        im.set(x, h1, 0, 0);
    }

    // Normalize interior to {0,1}
    for y in 1..h1 {
        for x in 1..w1 {
            let v = im.at(x, y, 0);
            im.set(x, y, 0, if v == 0 { 0 } else { 1 });
        }
    }

    let mut contours: Vec<Contour> = Vec::new();
    let mut id_to_index: HashMap<i32, usize> = HashMap::new();

    let mut curr_id: i32 = 1;

    // raster scan
    for y0 in 1..h1 {
        let mut last_id: i32 = 1;

        for x0 in 1..w1 {
            let mut skip_to_4 = false;

            let f0 = im.at(x0, y0, 0);
            let mut y2: i32 = 0;
            let mut x2: i32 = 0;

            let mut is_hole = false;

            // outer border start
            if f0 == 1 && im.at(x0 - 1, y0, 0) == 0 {
                is_hole = false;
                curr_id += 1;
                y2 = y0 as i32;
                x2 = (x0 as i32) - 1;
            }
            // hole border start
            else if f0 >= 1 && im.at(x0 + 1, y0, 0) == 0 {
                is_hole = true;
                curr_id += 1;
                y2 = y0 as i32;
                x2 = (x0 as i32) + 1;
                if f0 > 1 {
                    last_id = f0;
                }
            } else {
                skip_to_4 = true;
            }

            if !skip_to_4 {
                // decide parent
                let new_index = contours.len();
                contours.push(Contour::new(curr_id, is_hole));
                id_to_index.insert(curr_id, new_index);

                if let Some(&last_idx) = id_to_index.get(&last_id) {
                    let last_is_hole = contours[last_idx].is_hole;
                    let last_parent = contours[last_idx].parent;

                    let parent = match (last_is_hole, is_hole) {
                        // hole inside hole -> parent's parent
                        (true, true) => last_parent,
                        // contour inside hole
                        (true, false) => Some(last_idx),
                        // hole inside contour
                        (false, true) => Some(last_idx),
                        // contour next to contour
                        (false, false) => last_parent,
                    };
                    contours[new_index].parent = parent;
                }

                // clockwise search around (x0,y0) starting from (x2,y2)
                let (mut y1, mut x1) = (0i32, 0i32);

                let dy = y2 - (y0 as i32);
                let dx = x2 - (x0 as i32);
                let dir0 = delt_to_dir_cw(dy, dx);

                let mut d_found = None;
                for d in 0..8 {
                    let dird = ((dir0 + d + 8) % 8) as usize;
                    let (ddy, ddx) = DIR_TO_DELT_CW[dird];
                    let ny = (y0 as i32) + ddy;
                    let nx = (x0 as i32) + ddx;
                    if im.at(nx as usize, ny as usize, 0) != 0 {
                        y1 = ny;
                        x1 = nx;
                        d_found = Some(d);
                        break;
                    }
                }

                if d_found.is_none() {
                    // singleton pixel
                    im.set(x0, y0, 0, -curr_id);
                    contours[new_index].points.push(Iv2 {
                        x: x0 as i32,
                        y: y0 as i32,
                    });
                    skip_to_4 = true;
                }

                if !skip_to_4 {
                    y2 = y1;
                    x2 = x1;
                    let mut y3: i32 = y0 as i32;
                    let mut x3: i32 = x0 as i32;
                    let start = Iv2 { x: x3, y: y3 };

                    loop {
                        contours[new_index].points.push(Iv2 { x: x3, y: y3 });

                        // counter-clockwise search, starting after (x2,y2)
                        let dy = y2 - y3;
                        let dx = x2 - x3;
                        let dir0 = delt_to_dir_ccw(dy, dx);

                        let mut east_was_examined = false;
                        let (mut y4, mut x4) = (0i32, 0i32);

                        let mut found = false;
                        for d in 0..8 {
                            let dird = ((dir0 + d + 1 + 8) % 8) as usize;
                            let (ddy, ddx) = DIR_TO_DELT_CCW[dird];
                            if ddy == 0 && ddx == 1 {
                                east_was_examined = true;
                            }
                            let ny = y3 + ddy;
                            let nx = x3 + ddx;
                            if im.at(nx as usize, ny as usize, 0) != 0 {
                                y4 = ny;
                                x4 = nx;
                                found = true;
                                break;
                            }
                        }
                        assert!(found, "non-zero pixel must have a non-zero neighbor here");

                        // label current border pixel
                        let ux3 = x3 as usize;
                        let uy3 = y3 as usize;

                        if east_was_examined {
                            let east = im.at(ux3 + 1, uy3, 0);
                            if east == 0 {
                                im.set(ux3, uy3, 0, -curr_id);
                            } else if im.at(ux3, uy3, 0) == 1 {
                                im.set(ux3, uy3, 0, curr_id);
                            }
                        } else if im.at(ux3, uy3, 0) == 1 {
                            im.set(ux3, uy3, 0, curr_id);
                        }

                        // termination: back at the start configuration
                        if y4 == (y0 as i32) && x4 == (x0 as i32) && y3 == y1 && x3 == x1 {
                            break;
                        }

                        y2 = y3;
                        x2 = x3;
                        y3 = y4;
                        x3 = x4;
                    }

                    // repeat the initial pixel
                    contours[new_index].points.push(start);
                }
            }

            // update last_id; plain background and unlabeled pixels leave it
            let v = im.at(x0, y0, 0);
            if v != 0 && v != 1 {
                last_id = v.abs();
            }
        }
    }

    contours
}
