/*
 *  display/raster.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Integer rasterisation of lines, rectangles and circles
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! None of these routines clip. Points falling off the panel are handed to
//! the sink like any other and the framebuffer drops them.

use crate::display::framebuffer::{Pixel, PixelSink};

/// Bresenham line, both endpoints included exactly once
///
/// Endpoints are put in a canonical order first so that A->B and B->A
/// rasterise to the same pixel set.
pub fn draw_line<S: PixelSink + ?Sized>(sink: &mut S, x0: i32, y0: i32, x1: i32, y1: i32, pixel: Pixel) {
    let ((mut x, mut y), (x_end, y_end)) = if (x0, y0) <= (x1, y1) {
        ((x0, y0), (x1, y1))
    } else {
        ((x1, y1), (x0, y0))
    };

    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let sx = if x < x_end { 1 } else { -1 };
    let sy = if y < y_end { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        sink.set_pixel(x, y, pixel);
        if x == x_end && y == y_end {
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

/// Horizontal span between two columns on row `y`, inclusive
fn draw_span<S: PixelSink + ?Sized>(sink: &mut S, xa: i32, xb: i32, y: i32, pixel: Pixel) {
    for x in xa.min(xb)..=xa.max(xb) {
        sink.set_pixel(x, y, pixel);
    }
}

/// Rectangle outline as four lines; corners may be given in any order
pub fn draw_rectangle<S: PixelSink + ?Sized>(sink: &mut S, x0: i32, y0: i32, x1: i32, y1: i32, pixel: Pixel) {
    let (left, right) = (x0.min(x1), x0.max(x1));
    let (top, bottom) = (y0.min(y1), y0.max(y1));

    draw_line(sink, left, top, right, top, pixel);
    draw_line(sink, left, bottom, right, bottom, pixel);
    draw_line(sink, left, top, left, bottom, pixel);
    draw_line(sink, right, top, right, bottom, pixel);
}

/// Solid rectangle, one span per row
pub fn draw_filled_rectangle<S: PixelSink + ?Sized>(sink: &mut S, x0: i32, y0: i32, x1: i32, y1: i32, pixel: Pixel) {
    for y in y0.min(y1)..=y0.max(y1) {
        draw_span(sink, x0, x1, y, pixel);
    }
}

/// Midpoint circle stepper shared by the outline and the disk
///
/// Calls `plot(x, y)` for each first-octant offset, starting at (0, r) and
/// walking until x meets y. Callers mirror the offsets themselves.
fn walk_octant(r: i32, mut plot: impl FnMut(i32, i32)) {
    let mut f = 1 - r;
    let mut ddf_x = 1;
    let mut ddf_y = -2 * r;
    let mut x = 0;
    let mut y = r;

    plot(x, y);
    while x < y {
        if f >= 0 {
            y -= 1;
            ddf_y += 2;
            f += ddf_y;
        }
        x += 1;
        ddf_x += 2;
        f += ddf_x;
        plot(x, y);
    }
}

/// Circle outline; a radius of zero or less draws nothing
pub fn draw_circle<S: PixelSink + ?Sized>(sink: &mut S, xc: i32, yc: i32, r: i32, pixel: Pixel) {
    if r <= 0 {
        return;
    }
    walk_octant(r, |x, y| {
        sink.set_pixel(xc + x, yc + y, pixel);
        sink.set_pixel(xc - x, yc + y, pixel);
        sink.set_pixel(xc + x, yc - y, pixel);
        sink.set_pixel(xc - x, yc - y, pixel);
        sink.set_pixel(xc + y, yc + x, pixel);
        sink.set_pixel(xc - y, yc + x, pixel);
        sink.set_pixel(xc + y, yc - x, pixel);
        sink.set_pixel(xc - y, yc - x, pixel);
    });
}

/// Filled disk: each octant point pair is joined by a horizontal span
pub fn draw_filled_circle<S: PixelSink + ?Sized>(sink: &mut S, xc: i32, yc: i32, r: i32, pixel: Pixel) {
    if r <= 0 {
        return;
    }
    walk_octant(r, |x, y| {
        draw_span(sink, xc - x, xc + x, yc + y, pixel);
        draw_span(sink, xc - x, xc + x, yc - y, pixel);
        draw_span(sink, xc - y, xc + y, yc + x, pixel);
        draw_span(sink, xc - y, xc + y, yc - x, pixel);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashSet};

    /// Records every plotted point, on or off the panel
    #[derive(Default)]
    struct Recorder {
        points: Vec<(i32, i32)>,
    }

    impl Recorder {
        fn set(&self) -> HashSet<(i32, i32)> {
            self.points.iter().copied().collect()
        }
    }

    impl PixelSink for Recorder {
        fn set_pixel(&mut self, x: i32, y: i32, _pixel: Pixel) {
            self.points.push((x, y));
        }
    }

    #[test]
    fn test_line_direction_symmetry() {
        let cases = [(0, 0, 83, 47), (0, 47, 83, 0), (5, 5, 6, 40), (10, 3, 70, 4), (-10, -3, 90, 60)];
        for (x0, y0, x1, y1) in cases {
            let mut forward = Recorder::default();
            let mut backward = Recorder::default();
            draw_line(&mut forward, x0, y0, x1, y1, Pixel::Set);
            draw_line(&mut backward, x1, y1, x0, y0, Pixel::Set);
            assert_eq!(forward.set(), backward.set(), "line {:?}", (x0, y0, x1, y1));
        }
    }

    #[test]
    fn test_line_endpoints_once() {
        let mut rec = Recorder::default();
        draw_line(&mut rec, 0, 0, 83, 47, Pixel::Set);

        // every pixel visited exactly once
        assert_eq!(rec.points.len(), rec.set().len());
        assert_eq!(rec.points.iter().filter(|&&p| p == (0, 0)).count(), 1);
        assert_eq!(rec.points.iter().filter(|&&p| p == (83, 47)).count(), 1);
        // x-major line: one pixel per column
        assert_eq!(rec.points.len(), 84);
    }

    #[test]
    fn test_line_single_point() {
        let mut rec = Recorder::default();
        draw_line(&mut rec, 7, 7, 7, 7, Pixel::Set);
        assert_eq!(rec.points, vec![(7, 7)]);
    }

    #[test]
    fn test_vertical_and_horizontal_lines() {
        let mut rec = Recorder::default();
        draw_line(&mut rec, 4, 10, 4, 2, Pixel::Set);
        let expected: HashSet<_> = (2..=10).map(|y| (4, y)).collect();
        assert_eq!(rec.set(), expected);

        let mut rec = Recorder::default();
        draw_line(&mut rec, 9, 1, 3, 1, Pixel::Set);
        let expected: HashSet<_> = (3..=9).map(|x| (x, 1)).collect();
        assert_eq!(rec.set(), expected);
    }

    #[test]
    fn test_filled_rectangle_exact() {
        let mut rec = Recorder::default();
        draw_filled_rectangle(&mut rec, 20, 20, 10, 10, Pixel::Set);
        let set = rec.set();
        assert_eq!(set.len(), 121);
        assert!(set.iter().all(|&(x, y)| (10..=20).contains(&x) && (10..=20).contains(&y)));
    }

    #[test]
    fn test_rectangle_outline_normalises_corners() {
        let mut a = Recorder::default();
        let mut b = Recorder::default();
        draw_rectangle(&mut a, 2, 3, 12, 9, Pixel::Set);
        draw_rectangle(&mut b, 12, 9, 2, 3, Pixel::Set);
        assert_eq!(a.set(), b.set());
        // perimeter of an 11x7 box
        assert_eq!(a.set().len(), 2 * 11 + 2 * 5);
        assert!(!a.set().contains(&(5, 5)));
    }

    #[test]
    fn test_circle_symmetry() {
        let (xc, yc) = (40, 24);
        let mut rec = Recorder::default();
        draw_circle(&mut rec, xc, yc, 10, Pixel::Set);
        let set = rec.set();

        for &(x, y) in &set {
            let (dx, dy) = (x - xc, y - yc);
            assert!(set.contains(&(xc - dx, yc + dy)));
            assert!(set.contains(&(xc + dx, yc - dy)));
            assert!(set.contains(&(xc + dy, yc + dx)));
            assert!(set.contains(&(xc - dy, yc - dx)));
        }
        for p in [(50, 24), (30, 24), (40, 34), (40, 14)] {
            assert!(set.contains(&p));
        }
    }

    #[test]
    fn test_non_positive_radius_is_noop() {
        for r in [0, -1, -128] {
            let mut rec = Recorder::default();
            draw_circle(&mut rec, 10, 10, r, Pixel::Set);
            draw_filled_circle(&mut rec, 10, 10, r, Pixel::Set);
            assert!(rec.points.is_empty());
        }
    }

    #[test]
    fn test_filled_circle_is_contiguous_disk() {
        let (xc, yc, r) = (40, 24, 12);
        let mut rec = Recorder::default();
        draw_filled_circle(&mut rec, xc, yc, r, Pixel::Set);
        let set = rec.set();

        let mut rows: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        for &(x, y) in &set {
            rows.entry(y).or_default().push(x);
        }
        // one row per y from top to bottom, no gaps
        assert_eq!(rows.keys().copied().collect::<Vec<_>>(), ((yc - r)..=(yc + r)).collect::<Vec<_>>());
        for (y, xs) in rows.iter_mut() {
            xs.sort_unstable();
            let (lo, hi) = (xs[0], xs[xs.len() - 1]);
            assert_eq!(xs.len() as i32, hi - lo + 1, "gap in row {}", y);
            assert_eq!(xc - lo, hi - xc, "row {} not centred", y);
        }

        // the outline lies inside the disk
        let mut outline = Recorder::default();
        draw_circle(&mut outline, xc, yc, r, Pixel::Set);
        assert!(outline.set().is_subset(&set));
    }
}
