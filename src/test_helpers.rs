use crate::im::{Im, MaskIm};

/// Builds a 1-channel i32 image from an ascii grid of digits.
pub fn i32_im_from_ascii(grid: &str) -> Im<i32, 1> {
    let rows: Vec<&str> = grid
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let h = rows.len();
    assert!(h > 0, "grid must have at least one non-empty row");
    let w = rows[0].len();
    assert!(w > 0, "grid rows must be non-empty");
    for r in &rows {
        assert_eq!(r.len(), w, "all rows must have equal length");
    }

    let mut im = Im::<i32, 1>::new(w, h);
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            let v = ch
                .to_digit(10)
                .unwrap_or_else(|| panic!("invalid grid char '{ch}', expected digit"))
                as i32;
            im.arr[y * im.s + x] = v;
        }
    }
    im
}

/// '#' is foreground (255), '.' is background.
pub fn mask_from_ascii(grid: &str) -> MaskIm {
    let rows: Vec<&str> = grid
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let h = rows.len();
    assert!(h > 0, "grid must have at least one non-empty row");
    let w = rows[0].len();

    let mut mask = MaskIm::new(w, h);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), w, "all rows must have equal length");
        for (x, ch) in row.chars().enumerate() {
            mask.arr[y * mask.s + x] = match ch {
                '#' => 255,
                '.' => 0,
                _ => panic!("invalid mask char '{ch}'"),
            };
        }
    }
    mask
}

pub fn mask_to_ascii(mask: &MaskIm) -> String {
    let mut out = String::new();
    for y in 0..mask.h {
        for x in 0..mask.w {
            out.push(if mask.arr[y * mask.s + x] > 0 { '#' } else { '.' });
        }
        out.push('\n');
    }
    out
}
