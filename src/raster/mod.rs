//! Turns the recorded pointer positions of a gesture into the area and shape masks.
//!
//! Rasterization is a pure function of [`RasterInput`]. Every pass starts from
//! transparent masks, so nothing from a previous pass can leak into the next one.

mod canvas;

use emath::{Pos2, Vec2};

use crate::{
    PixelPos, PointerButtons, SelectionMasks, SelectionModifier, SelectionType, ViewportSize,
};
use canvas::{Canvas, LineStyle, Palette};

/// Diameter of the highlighted point of a sample selection
const SAMPLE_POINT_DIAMETER: f32 = 5.0;
/// Offset of the modifier glyph from its anchor
const GLYPH_OFFSET: f32 = 8.0;
/// Distance of the brush glyph from the brush outline
const BRUSH_GLYPH_OFFSET: f32 = 12.0;
/// Half length of the crosshair in the center of a ROI
const ROI_CROSSHAIR: i32 = 15;
/// Manhattan distance between the live point and the first vertex below which a click
/// closes a polygon
pub const POLYGON_CLOSING_DISTANCE: f32 = 20.0;

/// Everything a rasterization pass depends on
#[derive(Debug, Clone, Copy)]
pub struct RasterInput<'a> {
    pub selection_type: SelectionType,
    pub modifier: SelectionModifier,
    pub positions: &'a [PixelPos],
    /// Live pointer position, if the pointer ever entered the viewport
    pub pointer: Option<PixelPos>,
    pub buttons: PointerButtons,
    pub brush_radius: f32,
    pub main_color: [u8; 3],
    pub size: ViewportSize,
}

/// Whether the live point of a polygon is close enough to its first vertex to close it
pub fn polygon_closes(points: &[PixelPos]) -> bool {
    match points {
        [first, .., last] if points.len() > 3 => {
            let distance =
                u64::from(first.x.abs_diff(last.x)) + u64::from(first.y.abs_diff(last.y));
            (distance as f32) < POLYGON_CLOSING_DISTANCE
        }
        _ => false,
    }
}

pub fn rasterize(input: &RasterInput) -> SelectionMasks {
    let mut masks = SelectionMasks::transparent(input.size);
    let palette = Palette::from_main_color(input.main_color);
    let mut area = Canvas::new(&mut masks.area);
    let mut shape = Canvas::new(&mut masks.shape);

    let glyph_anchor = match input.selection_type {
        SelectionType::Rectangle => rectangle(input, &palette, &mut area, &mut shape),
        SelectionType::Brush => brush(input, &palette, &mut area, &mut shape),
        SelectionType::Lasso => polygon(input, &palette, &mut area, &mut shape, false),
        SelectionType::Polygon => polygon(input, &palette, &mut area, &mut shape, true),
        SelectionType::Sample => sample(input, &palette, &mut area, &mut shape),
        SelectionType::Roi => roi(&palette, &mut shape),
    };

    if let Some(anchor) = glyph_anchor {
        if input.selection_type.shows_modifier_glyph() {
            shape.modifier_glyph(anchor, input.modifier, palette.foreground);
        }
    }

    masks
}

fn rectangle(
    input: &RasterInput,
    palette: &Palette,
    area: &mut Canvas,
    shape: &mut Canvas,
) -> Option<Pos2> {
    let &[first, last] = input.positions else {
        return None;
    };
    let min = PixelPos::new(first.x.min(last.x), first.y.min(last.y));
    let max = PixelPos::new(first.x.max(last.x), first.y.max(last.y));

    area.fill_rect(min, max, palette.fill);
    shape.stroke_rect(min, max, palette.foreground, LineStyle::Solid);
    shape.control_point(first, palette.control_point);
    shape.control_point(last, palette.control_point);

    let top_right = emath::pos2(max.x as f32, min.y as f32);
    Some(top_right + emath::vec2(GLYPH_OFFSET, -GLYPH_OFFSET))
}

fn brush(
    input: &RasterInput,
    palette: &Palette,
    area: &mut Canvas,
    shape: &mut Canvas,
) -> Option<Pos2> {
    let radius = input.brush_radius;
    match input.positions {
        [] => {}
        [single] => area.fill_disc(single.to_pos2(), radius, palette.fill),
        stroke => area.stroke_capsules(stroke, radius, palette.fill),
    }

    let center = input.pointer.or_else(|| input.positions.last().copied())?;
    let style = if input.buttons.is_primary_held() {
        LineStyle::Solid
    } else {
        LineStyle::Dotted
    };
    let color = match style {
        LineStyle::Solid => palette.foreground,
        LineStyle::Dotted => palette.background,
    };
    shape.stroke_circle(center.to_pos2(), radius, color, style);
    shape.control_point(center, palette.control_point);

    let angle = 0.75 * std::f32::consts::PI;
    let direction = emath::vec2(angle.sin(), angle.cos());
    Some(center.to_pos2() + (radius + BRUSH_GLYPH_OFFSET) * direction)
}

/// Lasso and polygon share the filled area and differ in their control points
fn polygon(
    input: &RasterInput,
    palette: &Palette,
    area: &mut Canvas,
    shape: &mut Canvas,
    every_vertex: bool,
) -> Option<Pos2> {
    let points = input.positions;
    let (&first, &last) = (points.first()?, points.last()?);
    if points.len() < 2 {
        return None;
    }

    area.fill_polygon(points, palette.fill);

    shape.polyline(points, palette.foreground, LineStyle::Solid);
    shape.line(first, last, palette.background, LineStyle::Dotted);
    if every_vertex {
        if polygon_closes(points) {
            let radius = POLYGON_CLOSING_DISTANCE / 2.0;
            shape.fill_disc(first.to_pos2(), radius, palette.closing_point);
        }
        for p in points {
            shape.control_point(*p, palette.control_point);
        }
    } else {
        shape.control_point(first, palette.control_point);
        shape.control_point(last, palette.control_point);
    }

    Some(first.to_pos2() - Vec2::splat(GLYPH_OFFSET))
}

fn sample(
    input: &RasterInput,
    palette: &Palette,
    area: &mut Canvas,
    shape: &mut Canvas,
) -> Option<Pos2> {
    if let Some(recorded) = input.positions.last() {
        area.fill_disc(recorded.to_pos2(), SAMPLE_POINT_DIAMETER / 2.0, palette.fill);
    }

    let center = input.positions.last().copied().or(input.pointer)?;
    let (color, style) = if input.buttons.is_primary_held() {
        (palette.foreground, LineStyle::Solid)
    } else {
        (palette.background, LineStyle::Dotted)
    };
    let (w, h) = (shape.width(), shape.height());
    shape.line(
        PixelPos::new(center.x, 0),
        PixelPos::new(center.x, h - 1),
        color,
        style,
    );
    shape.line(
        PixelPos::new(0, center.y),
        PixelPos::new(w - 1, center.y),
        color,
        style,
    );
    None
}

fn roi(palette: &Palette, shape: &mut Canvas) -> Option<Pos2> {
    let (w, h) = (shape.width(), shape.height());
    shape.stroke_rect(
        PixelPos::new(0, 0),
        PixelPos::new(w - 1, h - 1),
        palette.background,
        LineStyle::Dotted,
    );

    let c = PixelPos::new(w / 2, h / 2);
    shape.line(
        PixelPos::new(c.x - ROI_CROSSHAIR, c.y),
        PixelPos::new(c.x + ROI_CROSSHAIR, c.y),
        palette.foreground,
        LineStyle::Solid,
    );
    shape.line(
        PixelPos::new(c.x, c.y - ROI_CROSSHAIR),
        PixelPos::new(c.x, c.y + ROI_CROSSHAIR),
        palette.foreground,
        LineStyle::Solid,
    );
    None
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    fn input(selection_type: SelectionType, positions: &[PixelPos]) -> RasterInput<'_> {
        RasterInput {
            selection_type,
            modifier: SelectionModifier::Replace,
            positions,
            pointer: positions.last().copied(),
            buttons: PointerButtons::PRIMARY,
            brush_radius: 10.0,
            main_color: [0, 0, 0],
            size: ViewportSize::new(NonZeroU32::new(100).unwrap(), NonZeroU32::new(80).unwrap()),
        }
    }

    #[test]
    fn degenerate_rectangle_is_empty() {
        let masks = rasterize(&input(SelectionType::Rectangle, &[PixelPos::new(4, 4)]));
        assert!(masks.is_empty());
    }

    #[test]
    fn rectangle_area_matches_corners() {
        let points = [PixelPos::new(40, 30), PixelPos::new(10, 20)];
        let masks = rasterize(&input(SelectionType::Rectangle, &points));
        assert_eq!(31 * 11, masks.area.selected_pixel_count());
        assert!(masks.shape.is_selected(PixelPos::new(25, 20)));
        assert!(!masks.shape.is_selected(PixelPos::new(25, 25)));
    }

    #[test]
    fn rectangle_glyph_follows_modifier() {
        let points = [PixelPos::new(10, 20), PixelPos::new(40, 30)];
        let replace = rasterize(&input(SelectionType::Rectangle, &points));
        let add = rasterize(&RasterInput {
            modifier: SelectionModifier::Add,
            ..input(SelectionType::Rectangle, &points)
        });
        assert_eq!(replace.area, add.area);
        assert!(add.shape.selected_pixel_count() > replace.shape.selected_pixel_count());
        // vertical bar of the plus sign above the top-right corner
        assert!(add.shape.is_selected(PixelPos::new(48, 10)));
    }

    #[test]
    fn single_brush_point_is_a_disc() {
        let masks = rasterize(&input(SelectionType::Brush, &[PixelPos::new(50, 40)]));
        assert!(masks.area.is_selected(PixelPos::new(60, 40)));
        assert!(!masks.area.is_selected(PixelPos::new(61, 40)));
        assert!(masks.shape.is_selected(PixelPos::new(50, 40)));
    }

    #[test]
    fn brush_stroke_covers_path() {
        let points = [PixelPos::new(20, 40), PixelPos::new(80, 40)];
        let masks = rasterize(&input(SelectionType::Brush, &points));
        assert!(masks.area.is_selected(PixelPos::new(50, 49)));
        assert!(!masks.area.is_selected(PixelPos::new(50, 52)));
    }

    #[test]
    fn brush_outline_without_positions_follows_pointer() {
        let masks = rasterize(&RasterInput {
            pointer: Some(PixelPos::new(50, 40)),
            buttons: PointerButtons::NONE,
            ..input(SelectionType::Brush, &[])
        });
        assert!(masks.area.is_empty());
        assert!(!masks.shape.is_empty());
    }

    #[test]
    fn lasso_marks_only_endpoints_polygon_every_vertex() {
        let points = [
            PixelPos::new(10, 10),
            PixelPos::new(60, 10),
            PixelPos::new(60, 60),
            PixelPos::new(10, 60),
        ];
        let lasso = rasterize(&input(SelectionType::Lasso, &points));
        let polygon = rasterize(&input(SelectionType::Polygon, &points));
        assert_eq!(lasso.area, polygon.area);
        assert!(lasso.area.is_selected(PixelPos::new(35, 35)));
        // control point disc extends inside the corner
        assert!(!lasso.shape.is_selected(PixelPos::new(58, 12)));
        assert!(polygon.shape.is_selected(PixelPos::new(58, 12)));
    }

    #[test]
    fn closing_marker_appears_near_first_vertex() {
        let open = [
            PixelPos::new(10, 10),
            PixelPos::new(60, 10),
            PixelPos::new(60, 60),
            PixelPos::new(30, 40),
        ];
        let closing = [
            PixelPos::new(10, 10),
            PixelPos::new(60, 10),
            PixelPos::new(60, 60),
            PixelPos::new(12, 14),
        ];
        assert!(!polygon_closes(&open));
        assert!(polygon_closes(&closing));
        // too few points to close, however near
        assert!(!polygon_closes(&closing[1..]));

        let marker = PixelPos::new(10, 2);
        let open = rasterize(&input(SelectionType::Polygon, &open));
        let closing = rasterize(&input(SelectionType::Polygon, &closing));
        assert!(!open.shape.is_selected(marker));
        assert_eq!(Some([0, 0, 0, 100]), closing.shape.pixel(10, 2));

        let points = [
            PixelPos::new(10, 10),
            PixelPos::new(60, 10),
            PixelPos::new(60, 60),
            PixelPos::new(12, 14),
        ];
        let lasso = rasterize(&input(SelectionType::Lasso, &points));
        assert!(!lasso.shape.is_selected(marker));
    }

    #[test]
    fn lasso_closing_segment_is_dotted() {
        let points = [PixelPos::new(10, 10), PixelPos::new(60, 10), PixelPos::new(60, 60)];
        let masks = rasterize(&input(SelectionType::Lasso, &points));
        let alpha = |x, y| masks.shape.pixel(x, y).map(|[_, _, _, a]| a);

        // polyline is solid in the foreground color
        assert!((20..50).all(|x| alpha(x, 10) == Some(255)));
        // the segment back to the first point alternates dots and gaps in the background color
        let closing = (20..40).map(|i| alpha(i, i)).collect::<Vec<_>>();
        assert!(closing.contains(&Some(140)));
        assert!(closing.contains(&Some(0)));
        assert!(!closing.contains(&Some(255)));
    }

    #[test]
    fn sample_draws_crosshair_through_last_point() {
        let masks = rasterize(&input(SelectionType::Sample, &[PixelPos::new(30, 20)]));
        assert!(masks.area.is_selected(PixelPos::new(30, 20)));
        assert_eq!(21, masks.area.selected_pixel_count());
        assert!(masks.shape.is_selected(PixelPos::new(30, 0)));
        assert!(masks.shape.is_selected(PixelPos::new(30, 79)));
        assert!(masks.shape.is_selected(PixelPos::new(0, 20)));
        assert!(masks.shape.is_selected(PixelPos::new(99, 20)));
    }

    #[test]
    fn roi_has_no_area() {
        let masks = rasterize(&input(SelectionType::Roi, &[]));
        assert!(masks.area.is_empty());
        assert!(masks.shape.is_selected(PixelPos::new(50, 40)));
    }
}
