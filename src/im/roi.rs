#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub l: usize,
    pub t: usize,
    /// Exclusive right bound.
    pub r: usize,
    /// Exclusive bottom bound.
    pub b: usize,
}

impl Roi {
    /// Width of the ROI.
    pub fn w(&self) -> usize {
        self.r - self.l
    }

    /// Height of the ROI.
    pub fn h(&self) -> usize {
        self.b - self.t
    }

    /// Axis-aligned bounding rectangle of four user-selected points,
    /// clamped to the image dimensions.
    pub fn bounding(points: &[(i32, i32); 4], max_w: usize, max_h: usize) -> Roi {
        let xs = points.map(|p| p.0);
        let ys = points.map(|p| p.1);
        let l = xs.iter().copied().min().unwrap().max(0) as usize;
        let t = ys.iter().copied().min().unwrap().max(0) as usize;
        let r = (xs.iter().copied().max().unwrap().max(0) as usize).min(max_w);
        let b = (ys.iter().copied().max().unwrap().max(0) as usize).min(max_h);
        Roi {
            l: l.min(r),
            t: t.min(b),
            r,
            b,
        }
    }
}
