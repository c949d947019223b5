use emath::{Pos2, Vec2};
use itertools::Itertools;
use num_traits::ToPrimitive;

use crate::{Mask, PixelPos, SelectionModifier};

/// Length in pixels of a dot and of the gap after it
const DOT_LENGTH: usize = 2;
/// Radius of the discs marking control points
pub(crate) const CONTROL_POINT_RADIUS: f32 = 3.0;
const GLYPH_RADIUS: f32 = 7.0;
const GLYPH_BAR: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineStyle {
    Solid,
    Dotted,
}

impl LineStyle {
    fn draws_step(self, step: usize) -> bool {
        match self {
            LineStyle::Solid => true,
            LineStyle::Dotted => (step / DOT_LENGTH) % 2 == 0,
        }
    }
}

/// Colors derived from the tool's main color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    pub fill: [u8; 4],
    pub foreground: [u8; 4],
    pub background: [u8; 4],
    pub control_point: [u8; 4],
    pub closing_point: [u8; 4],
}

impl Palette {
    pub fn from_main_color([r, g, b]: [u8; 3]) -> Self {
        Self {
            fill: [r, g, b, 50],
            foreground: [r, g, b, 255],
            background: [r, g, b, 140],
            control_point: [r, g, b, 255],
            closing_point: [r, g, b, 100],
        }
    }
}

fn round_i32(v: f32) -> i32 {
    v.round().to_i32().unwrap_or(if v < 0.0 { i32::MIN } else { i32::MAX })
}

/// Primitive drawing operations on a [`Mask`]. Everything is clipped to the raster.
pub(crate) struct Canvas<'a> {
    mask: &'a mut Mask,
}

impl<'a> Canvas<'a> {
    pub fn new(mask: &'a mut Mask) -> Self {
        Self { mask }
    }

    pub fn width(&self) -> i32 {
        self.mask.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.mask.height() as i32
    }

    /// Fills all pixels between both corners, inclusive
    pub fn fill_rect(&mut self, min: PixelPos, max: PixelPos, color: [u8; 4]) {
        for y in min.y.max(0)..=max.y.min(self.height() - 1) {
            self.mask.fill_span(y, min.x, max.x, color);
        }
    }

    pub fn stroke_rect(&mut self, min: PixelPos, max: PixelPos, color: [u8; 4], style: LineStyle) {
        let top_right = PixelPos::new(max.x, min.y);
        let bottom_left = PixelPos::new(min.x, max.y);
        self.polyline(&[min, top_right, max, bottom_left, min], color, style);
    }

    /// Bresenham line including both endpoints. Dots keep their phase when the line is clipped.
    pub fn line(&mut self, from: PixelPos, to: PixelPos, color: [u8; 4], style: LineStyle) {
        let Some((start, end)) = self.clip_line(from, to) else {
            return;
        };
        let skipped = (i64::from(start.x) - i64::from(from.x))
            .abs()
            .max((i64::from(start.y) - i64::from(from.y)).abs());

        let dx = (end.x - start.x).abs();
        let dy = -(end.y - start.y).abs();
        let sx = if start.x < end.x { 1 } else { -1 };
        let sy = if start.y < end.y { 1 } else { -1 };
        let (mut x, mut y) = (start.x, start.y);
        let mut err = dx + dy;
        let mut step = skipped.to_usize().unwrap_or(0);

        loop {
            if style.draws_step(step) {
                self.mask.put(x, y, color);
            }
            if x == end.x && y == end.y {
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
            step += 1;
        }
    }

    /// Liang-Barsky clipping against the raster bounds
    fn clip_line(&self, from: PixelPos, to: PixelPos) -> Option<(PixelPos, PixelPos)> {
        let (x0, y0) = (f64::from(from.x), f64::from(from.y));
        let (dx, dy) = (f64::from(to.x) - x0, f64::from(to.y) - y0);
        let (x_max, y_max) = (f64::from(self.width() - 1), f64::from(self.height() - 1));

        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        for (p, q) in [(-dx, x0), (dx, x_max - x0), (-dy, y0), (dy, y_max - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else if p < 0.0 {
                t0 = t0.max(q / p);
            } else {
                t1 = t1.min(q / p);
            }
        }
        if t0 > t1 {
            return None;
        }
        let at = |t: f64| {
            PixelPos::new(
                (x0 + t * dx).round().to_i32().unwrap_or(0),
                (y0 + t * dy).round().to_i32().unwrap_or(0),
            )
        };
        Some((at(t0), at(t1)))
    }

    pub fn polyline(&mut self, points: &[PixelPos], color: [u8; 4], style: LineStyle) {
        if let [single] = points {
            self.mask.put(single.x, single.y, color);
        }
        for (a, b) in points.iter().tuple_windows() {
            self.line(*a, *b, color, style);
        }
    }

    pub fn fill_disc(&mut self, center: Pos2, radius: f32, color: [u8; 4]) {
        let top = round_i32((center.y - radius).floor()).max(0);
        let bottom = round_i32((center.y + radius).ceil()).min(self.height() - 1);
        for y in top..=bottom {
            let dy = y as f32 - center.y;
            let sq = radius * radius - dy * dy;
            if sq < 0.0 {
                continue;
            }
            let half = sq.sqrt();
            let start = round_i32((center.x - half).ceil());
            let end = round_i32((center.x + half).floor());
            self.mask.fill_span(y, start, end, color);
        }
    }

    pub fn stroke_circle(&mut self, center: Pos2, radius: f32, color: [u8; 4], style: LineStyle) {
        let steps = (std::f32::consts::TAU * radius).ceil().max(8.0) as usize;
        for step in 0..steps {
            if !style.draws_step(step) {
                continue;
            }
            let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
            let p = center + radius * Vec2::angled(angle);
            self.mask.put(round_i32(p.x), round_i32(p.y), color);
        }
    }

    /// Sweeps a disc of `radius` along the polyline (round caps and joins).
    /// Spans are computed per row and merged, so every pixel is written at most once.
    pub fn stroke_capsules(&mut self, points: &[PixelPos], radius: f32, color: [u8; 4]) {
        let centers = points.iter().map(|p| p.to_pos2()).dedup().collect_vec();
        if let &[single] = centers.as_slice() {
            self.fill_disc(single, radius, color);
            return;
        }

        let height = self.height();
        let mut rows = vec![Vec::new(); height.to_usize().unwrap_or(0)];
        for (a, b) in centers.iter().copied().tuple_windows() {
            let top = round_i32((a.y.min(b.y) - radius).floor()).max(0);
            let bottom = round_i32((a.y.max(b.y) + radius).ceil()).min(height - 1);
            for y in top..=bottom {
                if let Some(span) = capsule_span(a, b, radius, y as f32) {
                    rows[y as usize].push(span);
                }
            }
        }

        for (y, mut spans) in (0..).zip(rows) {
            spans.sort_unstable();
            let merged = spans.into_iter().coalesce(|(s1, e1), (s2, e2)| {
                if s2 <= e1.saturating_add(1) {
                    Ok((s1, e1.max(e2)))
                } else {
                    Err(((s1, e1), (s2, e2)))
                }
            });
            for (start, end) in merged {
                self.mask.fill_span(y, start, end, color);
            }
        }
    }

    /// Scanline fill using the even-odd rule
    pub fn fill_polygon(&mut self, points: &[PixelPos], color: [u8; 4]) {
        let Some((top, bottom)) = points.iter().map(|p| p.y).minmax().into_option() else {
            return;
        };
        let top = top.max(0);
        let bottom = bottom.min(self.height() - 1);

        let edges = points
            .iter()
            .circular_tuple_windows()
            .filter(|(a, b)| a.y != b.y)
            .map(|(a, b)| (*a, *b))
            .collect::<Vec<_>>();

        for y in top..=bottom {
            let crossings = edges
                .iter()
                .filter(|(a, b)| (a.y <= y && y < b.y) || (b.y <= y && y < a.y))
                .map(|(a, b)| {
                    let t = (y as f32 - a.y as f32) / (b.y as f32 - a.y as f32);
                    a.x as f32 + t * (b.x as f32 - a.x as f32)
                })
                .sorted_unstable_by(f32::total_cmp)
                .collect::<Vec<_>>();

            for pair in crossings.chunks_exact(2) {
                let start = round_i32(pair[0].ceil());
                let end = round_i32(pair[1].floor());
                self.mask.fill_span(y, start, end, color);
            }
        }

        // The half-open crossing rule leaves out bottom rows, the outline closes them
        for (a, b) in points.iter().circular_tuple_windows() {
            self.line(*a, *b, color, LineStyle::Solid);
        }
    }

    pub fn control_point(&mut self, pos: PixelPos, color: [u8; 4]) {
        self.fill_disc(pos.to_pos2(), CONTROL_POINT_RADIUS, color);
    }

    /// Plus-circle for [`SelectionModifier::Add`], minus-circle for
    /// [`SelectionModifier::Subtract`] and nothing for replacing selections
    pub fn modifier_glyph(&mut self, center: Pos2, modifier: SelectionModifier, color: [u8; 4]) {
        if modifier == SelectionModifier::Replace {
            return;
        }
        self.stroke_circle(center, GLYPH_RADIUS, color, LineStyle::Solid);

        let c = PixelPos::new(round_i32(center.x), round_i32(center.y));
        self.line(
            PixelPos::new(c.x.saturating_sub(GLYPH_BAR), c.y),
            PixelPos::new(c.x.saturating_add(GLYPH_BAR), c.y),
            color,
            LineStyle::Solid,
        );
        if modifier == SelectionModifier::Add {
            self.line(
                PixelPos::new(c.x, c.y.saturating_sub(GLYPH_BAR)),
                PixelPos::new(c.x, c.y.saturating_add(GLYPH_BAR)),
                color,
                LineStyle::Solid,
            );
        }
    }
}

/// Pixel columns of row `y` within `radius` of the segment `a`..`b`.
/// The capsule is convex, so the union of its end discs and its band is a single span.
fn capsule_span(a: Pos2, b: Pos2, radius: f32, y: f32) -> Option<(i32, i32)> {
    let (start, end) = [disc_span(a, radius, y), disc_span(b, radius, y), band_span(a, b, radius, y)]
        .into_iter()
        .flatten()
        .reduce(|(s1, e1), (s2, e2)| (s1.min(s2), e1.max(e2)))?;
    let (start, end) = (round_i32(start.ceil()), round_i32(end.floor()));
    (start <= end).then_some((start, end))
}

fn disc_span(center: Pos2, radius: f32, y: f32) -> Option<(f32, f32)> {
    let dy = y - center.y;
    let sq = radius * radius - dy * dy;
    (sq >= 0.0).then(|| {
        let half = sq.sqrt();
        (center.x - half, center.x + half)
    })
}

/// Row span of the rectangle swept by the segment's normal
fn band_span(a: Pos2, b: Pos2, radius: f32, y: f32) -> Option<(f32, f32)> {
    let ab = b - a;
    let len = ab.length();
    let along = ab / len;
    let across = along.rot90();
    let dy = y - a.y;

    let (s1, e1) = solve_between(dy * along.y - a.x * along.x, along.x, 0.0, len)?;
    let (s2, e2) = solve_between(dy * across.y - a.x * across.x, across.x, -radius, radius)?;
    let (start, end) = (s1.max(s2), e1.min(e2));
    (start <= end).then_some((start, end))
}

/// All `x` with `lo <= offset + slope * x <= hi`
fn solve_between(offset: f32, slope: f32, lo: f32, hi: f32) -> Option<(f32, f32)> {
    if slope.abs() < f32::EPSILON {
        return (lo..=hi)
            .contains(&offset)
            .then_some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let (x1, x2) = ((lo - offset) / slope, (hi - offset) / slope);
    Some((x1.min(x2), x1.max(x2)))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::ViewportSize;

    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn mask(w: u32, h: u32) -> Mask {
        Mask::transparent(ViewportSize::new(
            NonZeroU32::new(w).unwrap(),
            NonZeroU32::new(h).unwrap(),
        ))
    }

    #[test]
    fn fill_rect_is_inclusive() {
        let mut m = mask(20, 20);
        Canvas::new(&mut m).fill_rect(PixelPos::new(2, 3), PixelPos::new(5, 4), BLACK);
        assert_eq!(8, m.selected_pixel_count());
        assert!(m.is_selected(PixelPos::new(5, 4)));
        assert!(!m.is_selected(PixelPos::new(6, 4)));
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut m = mask(20, 20);
        Canvas::new(&mut m).line(
            PixelPos::new(1, 1),
            PixelPos::new(10, 4),
            BLACK,
            LineStyle::Solid,
        );
        assert!(m.is_selected(PixelPos::new(1, 1)));
        assert!(m.is_selected(PixelPos::new(10, 4)));
        assert_eq!(10, m.selected_pixel_count());
    }

    #[test]
    fn dotted_line_skips_gaps() {
        let mut m = mask(20, 1);
        Canvas::new(&mut m).line(
            PixelPos::new(0, 0),
            PixelPos::new(7, 0),
            BLACK,
            LineStyle::Dotted,
        );
        let drawn = (0..8)
            .map(|x| m.is_selected(PixelPos::new(x, 0)))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![true, true, false, false, true, true, false, false],
            drawn
        );
    }

    #[test]
    fn disc_is_symmetric() {
        let mut m = mask(21, 21);
        Canvas::new(&mut m).fill_disc(emath::pos2(10.0, 10.0), 5.0, BLACK);
        assert!(m.is_selected(PixelPos::new(15, 10)));
        assert!(m.is_selected(PixelPos::new(5, 10)));
        assert!(m.is_selected(PixelPos::new(10, 5)));
        assert!(!m.is_selected(PixelPos::new(15, 15)));
        assert!(!m.is_selected(PixelPos::new(16, 10)));
    }

    #[test]
    fn capsule_covers_segment_neighbourhood() {
        let mut m = mask(40, 20);
        Canvas::new(&mut m).stroke_capsules(
            &[PixelPos::new(5, 10), PixelPos::new(30, 10)],
            3.0,
            BLACK,
        );
        assert!(m.is_selected(PixelPos::new(17, 13)));
        assert!(!m.is_selected(PixelPos::new(17, 14)));
        assert!(m.is_selected(PixelPos::new(2, 10)));
        assert!(!m.is_selected(PixelPos::new(34, 10)));
    }

    #[test]
    fn capsule_spans_match_segment_distance() {
        fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
            let ab = b - a;
            let t = ((p - a).dot(ab) / ab.length_sq()).clamp(0.0, 1.0);
            p.distance(a + t * ab)
        }

        let points = [PixelPos::new(6, 30), PixelPos::new(25, 8), PixelPos::new(50, 20)];
        let radius = 5.5;
        let mut m = mask(60, 40);
        Canvas::new(&mut m).stroke_capsules(&points, radius, BLACK);

        for y in 0..40 {
            for x in 0..60 {
                let p = emath::pos2(x as f32, y as f32);
                let d = points
                    .iter()
                    .tuple_windows()
                    .map(|(a, b)| distance_to_segment(p, a.to_pos2(), b.to_pos2()))
                    .fold(f32::INFINITY, f32::min);
                if (d - radius).abs() > 0.01 {
                    assert_eq!(d < radius, m.is_selected(PixelPos::new(x, y)), "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn repeated_stroke_point_is_a_disc() {
        let mut stroke = mask(30, 30);
        Canvas::new(&mut stroke).stroke_capsules(&[PixelPos::new(15, 15); 3], 4.0, BLACK);
        let mut disc = mask(30, 30);
        Canvas::new(&mut disc).fill_disc(emath::pos2(15.0, 15.0), 4.0, BLACK);
        assert!(!disc.is_empty());
        assert_eq!(disc, stroke);
    }

    #[test]
    fn traced_rectangle_fills_like_rectangle() {
        let mut traced = mask(30, 30);
        Canvas::new(&mut traced).fill_polygon(
            &[
                PixelPos::new(4, 5),
                PixelPos::new(20, 5),
                PixelPos::new(20, 12),
                PixelPos::new(4, 12),
            ],
            BLACK,
        );
        let mut rect = mask(30, 30);
        Canvas::new(&mut rect).fill_rect(PixelPos::new(4, 5), PixelPos::new(20, 12), BLACK);
        assert_eq!(rect, traced);
    }

    #[test]
    fn extreme_coordinates_are_clipped() {
        let mut m = mask(20, 20);
        let mut canvas = Canvas::new(&mut m);
        canvas.line(
            PixelPos::new(i32::MIN, i32::MIN),
            PixelPos::new(i32::MAX, i32::MAX),
            BLACK,
            LineStyle::Solid,
        );
        canvas.modifier_glyph(emath::pos2(f32::MAX, f32::MIN), SelectionModifier::Add, BLACK);
        assert_eq!(20, m.selected_pixel_count());
        assert!(m.is_selected(PixelPos::new(0, 0)));
        assert!(m.is_selected(PixelPos::new(19, 19)));

        let mut m = mask(20, 20);
        Canvas::new(&mut m).fill_rect(
            PixelPos::new(i32::MIN, i32::MIN),
            PixelPos::new(i32::MAX, i32::MAX),
            BLACK,
        );
        assert_eq!(400, m.selected_pixel_count());
    }

    #[test]
    fn line_outside_raster_draws_nothing() {
        let mut m = mask(20, 20);
        Canvas::new(&mut m).line(
            PixelPos::new(-50, -3),
            PixelPos::new(80, -1),
            BLACK,
            LineStyle::Solid,
        );
        assert!(m.is_empty());
    }

    #[test]
    fn triangle_fill_contains_interior_only() {
        let mut m = mask(30, 30);
        Canvas::new(&mut m).fill_polygon(
            &[
                PixelPos::new(0, 0),
                PixelPos::new(20, 0),
                PixelPos::new(0, 20),
            ],
            BLACK,
        );
        assert!(m.is_selected(PixelPos::new(5, 5)));
        assert!(!m.is_selected(PixelPos::new(15, 15)));
    }

    #[test]
    fn polygon_with_duplicate_vertices_still_fills() {
        let mut m = mask(30, 30);
        Canvas::new(&mut m).fill_polygon(
            &[
                PixelPos::new(2, 2),
                PixelPos::new(2, 2),
                PixelPos::new(20, 2),
                PixelPos::new(20, 20),
                PixelPos::new(20, 20),
            ],
            BLACK,
        );
        assert!(m.is_selected(PixelPos::new(15, 10)));
        assert!(!m.is_selected(PixelPos::new(5, 15)));
    }

    #[test]
    fn replace_modifier_has_no_glyph() {
        let mut m = mask(30, 30);
        Canvas::new(&mut m).modifier_glyph(
            emath::pos2(15.0, 15.0),
            SelectionModifier::Replace,
            BLACK,
        );
        assert!(m.is_empty());
    }

    #[test]
    fn add_glyph_has_vertical_bar_subtract_does_not() {
        let mut add = mask(30, 30);
        Canvas::new(&mut add).modifier_glyph(emath::pos2(15.0, 15.0), SelectionModifier::Add, BLACK);
        let mut sub = mask(30, 30);
        Canvas::new(&mut sub).modifier_glyph(
            emath::pos2(15.0, 15.0),
            SelectionModifier::Subtract,
            BLACK,
        );
        assert!(add.is_selected(PixelPos::new(15, 12)));
        assert!(!sub.is_selected(PixelPos::new(15, 12)));
        assert!(sub.is_selected(PixelPos::new(12, 15)));
    }
}
