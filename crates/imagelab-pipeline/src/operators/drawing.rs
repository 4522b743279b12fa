//! Drawing operators. Shapes are painted onto an RGBA copy of the input;
//! anything outside the canvas is clipped.

use std::f32::consts::FRAC_PI_4;

use ab_glyph::{FontVec, PxScale};
use image::Rgba;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut,
    draw_hollow_circle_mut, draw_hollow_ellipse_mut, draw_hollow_rect_mut,
    draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;
use tracing::debug;

use super::{Definition, channel, color, coord, done, extent, float_f32, int_i32, int_u32, rgba};
use crate::operation::OperationKind;
use crate::params::{ParamKind, ParamSet, ParamSpec};
use crate::types::{DynamicImage, OperatorError, RgbaImage};

pub(crate) const DEFINITIONS: &[(OperationKind, Definition)] = &[
    (OperationKind::DrawLine, Definition::new(LINE_PARAMS, draw_line)),
    (OperationKind::DrawEllipse, Definition::new(ELLIPSE_PARAMS, draw_ellipse)),
    (OperationKind::DrawArrowLine, Definition::new(ARROW_PARAMS, draw_arrow_line)),
    (OperationKind::DrawText, Definition::new(TEXT_PARAMS, draw_text)),
    (OperationKind::DrawCircle, Definition::new(CIRCLE_PARAMS, draw_circle)),
    (OperationKind::DrawRectangle, Definition::new(RECT_PARAMS, draw_rectangle)),
];

const RED: ParamSpec = channel("red", 255);
const GREEN: ParamSpec = channel("green", 0);
const BLUE: ParamSpec = channel("blue", 0);
const FILLED: ParamSpec = ParamSpec::new("filled", ParamKind::Bool { default: false });

const LINE_PARAMS: &[ParamSpec] = &[
    coord("start_x", 0),
    coord("start_y", 0),
    coord("end_x", 100),
    coord("end_y", 100),
    RED,
    GREEN,
    BLUE,
];

const ARROW_PARAMS: &[ParamSpec] = &[
    coord("start_x", 0),
    coord("start_y", 0),
    coord("end_x", 100),
    coord("end_y", 100),
    RED,
    GREEN,
    BLUE,
    ParamSpec::new(
        "tip_length",
        ParamKind::Float {
            default: 0.1,
            min: 0.0,
            max: 1.0,
        },
    ),
];

const CIRCLE_PARAMS: &[ParamSpec] = &[
    coord("center_x", 50),
    coord("center_y", 50),
    extent("radius", 25, 10_000),
    RED,
    GREEN,
    BLUE,
    FILLED,
];

const ELLIPSE_PARAMS: &[ParamSpec] = &[
    coord("center_x", 50),
    coord("center_y", 50),
    extent("width_radius", 40, 10_000),
    extent("height_radius", 20, 10_000),
    RED,
    GREEN,
    BLUE,
    FILLED,
];

const RECT_PARAMS: &[ParamSpec] = &[
    coord("x", 10),
    coord("y", 10),
    extent("width", 50, 10_000),
    extent("height", 50, 10_000),
    RED,
    GREEN,
    BLUE,
    FILLED,
];

const TEXT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("text", ParamKind::Text { default: "ImageLab" }),
    coord("x", 10),
    coord("y", 10),
    ParamSpec::new(
        "scale",
        ParamKind::Float {
            default: 24.0,
            min: 1.0,
            max: 500.0,
        },
    ),
    RED,
    GREEN,
    BLUE,
    ParamSpec::new("font_path", ParamKind::Text { default: "" }),
];

fn point(params: &ParamSet, x: &str, y: &str) -> Result<(f32, f32), OperatorError> {
    Ok((float_f32(params, x)?, float_f32(params, y)?))
}

fn center(params: &ParamSet) -> Result<(i32, i32), OperatorError> {
    Ok((int_i32(params, "center_x")?, int_i32(params, "center_y")?))
}

fn draw_line(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let mut canvas = rgba(image);
    let start = point(params, "start_x", "start_y")?;
    let end = point(params, "end_x", "end_y")?;
    draw_line_segment_mut(&mut canvas, start, end, color(params)?);
    done(canvas)
}

/// Line with two head strokes at ±45° from the shaft, each
/// `tip_length` times the shaft length.
fn draw_arrow_line(
    image: &DynamicImage,
    params: &ParamSet,
) -> Result<Option<DynamicImage>, OperatorError> {
    let mut canvas = rgba(image);
    let start = point(params, "start_x", "start_y")?;
    let end = point(params, "end_x", "end_y")?;
    let ink = color(params)?;
    draw_line_segment_mut(&mut canvas, start, end, ink);

    let (dx, dy) = (start.0 - end.0, start.1 - end.1);
    let tip = dx.hypot(dy) * float_f32(params, "tip_length")?;
    let back = dy.atan2(dx);
    for angle in [back + FRAC_PI_4, back - FRAC_PI_4] {
        let barb = (end.0 + tip * angle.cos(), end.1 + tip * angle.sin());
        draw_line_segment_mut(&mut canvas, end, barb, ink);
    }
    done(canvas)
}

fn draw_circle(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let mut canvas = rgba(image);
    let center = center(params)?;
    let radius = int_i32(params, "radius")?;
    let ink = color(params)?;
    if params.flag("filled")? {
        draw_filled_circle_mut(&mut canvas, center, radius, ink);
    } else {
        draw_hollow_circle_mut(&mut canvas, center, radius, ink);
    }
    done(canvas)
}

fn draw_ellipse(
    image: &DynamicImage,
    params: &ParamSet,
) -> Result<Option<DynamicImage>, OperatorError> {
    let mut canvas = rgba(image);
    let center = center(params)?;
    let (rx, ry) = (
        int_i32(params, "width_radius")?,
        int_i32(params, "height_radius")?,
    );
    let ink = color(params)?;
    if params.flag("filled")? {
        draw_filled_ellipse_mut(&mut canvas, center, rx, ry, ink);
    } else {
        draw_hollow_ellipse_mut(&mut canvas, center, rx, ry, ink);
    }
    done(canvas)
}

fn draw_rectangle(
    image: &DynamicImage,
    params: &ParamSet,
) -> Result<Option<DynamicImage>, OperatorError> {
    let mut canvas = rgba(image);
    let rect = Rect::at(int_i32(params, "x")?, int_i32(params, "y")?)
        .of_size(int_u32(params, "width")?, int_u32(params, "height")?);
    let ink = color(params)?;
    if params.flag("filled")? {
        draw_filled_rect_mut(&mut canvas, rect, ink);
    } else {
        draw_hollow_rect_mut(&mut canvas, rect, ink);
    }
    done(canvas)
}

fn load_font(path: &str) -> Result<FontVec, OperatorError> {
    if path.is_empty() {
        return Err(OperatorError::Font("no font_path set".to_owned()));
    }
    let bytes = std::fs::read(path).map_err(|e| OperatorError::Font(format!("{path}: {e}")))?;
    FontVec::try_from_vec(bytes).map_err(|e| OperatorError::Font(format!("{path}: {e}")))
}

/// Render `text` with its top-left corner at (`x`, `y`).
fn draw_text(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let font = load_font(params.text("font_path")?)?;
    let mut canvas: RgbaImage = rgba(image);
    let text = params.text("text")?;
    debug!(text, "drawing text");
    draw_text_mut(
        &mut canvas,
        color(params)?,
        int_i32(params, "x")?,
        int_i32(params, "y")?,
        PxScale::from(float_f32(params, "scale")?),
        &font,
        text,
    );
    done(canvas)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operator::Operator;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const INK: [u8; 4] = [255, 0, 0, 255];

    fn operator(kind: OperationKind) -> super::super::BuiltinOperator {
        DEFINITIONS
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, d)| d.instantiate())
            .unwrap()
    }

    fn blank() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, WHITE))
    }

    fn set_all(op: &mut super::super::BuiltinOperator, values: &[(&str, i64)]) {
        for &(key, value) in values {
            op.set_param(key, value.into()).unwrap();
        }
    }

    fn run(op: &super::super::BuiltinOperator) -> RgbaImage {
        op.compute(&blank()).unwrap().unwrap().to_rgba8()
    }

    #[test]
    fn line_paints_its_row() {
        let mut op = operator(OperationKind::DrawLine);
        set_all(&mut op, &[("start_x", 2), ("start_y", 5), ("end_x", 17), ("end_y", 5)]);
        let out = run(&op);
        for x in 2..=17 {
            assert_eq!(out.get_pixel(x, 5).0, INK, "x={x}");
        }
        assert_eq!(out.get_pixel(10, 6).0, WHITE.0);
    }

    #[test]
    fn line_colour_follows_params() {
        let mut op = operator(OperationKind::DrawLine);
        set_all(
            &mut op,
            &[("start_x", 0), ("start_y", 3), ("end_x", 19), ("end_y", 3), ("red", 0), ("blue", 200)],
        );
        assert_eq!(run(&op).get_pixel(8, 3).0, [0, 0, 200, 255]);
    }

    #[test]
    fn arrow_head_leaves_the_shaft() {
        let mut op = operator(OperationKind::DrawArrowLine);
        set_all(&mut op, &[("start_x", 1), ("start_y", 10), ("end_x", 18), ("end_y", 10)]);
        op.set_param("tip_length", 0.3.into()).unwrap();
        let out = run(&op);
        let off_shaft = out
            .enumerate_pixels()
            .filter(|(_, y, p)| *y != 10 && p.0 == INK)
            .count();
        assert!(off_shaft >= 4, "expected barb pixels, found {off_shaft}");
        // Barbs point back towards the start, never beyond the tip.
        assert!(out
            .enumerate_pixels()
            .all(|(x, y, p)| p.0 != INK || y == 10 || x <= 18));
    }

    #[test]
    fn filled_circle_covers_centre() {
        let mut op = operator(OperationKind::DrawCircle);
        set_all(&mut op, &[("center_x", 10), ("center_y", 10), ("radius", 5)]);
        assert_eq!(run(&op).get_pixel(10, 10).0, WHITE.0);
        op.set_param("filled", true.into()).unwrap();
        assert_eq!(run(&op).get_pixel(10, 10).0, INK);
    }

    #[test]
    fn ellipse_outline_reaches_horizontal_extent() {
        let mut op = operator(OperationKind::DrawEllipse);
        set_all(
            &mut op,
            &[("center_x", 10), ("center_y", 10), ("width_radius", 8), ("height_radius", 4)],
        );
        let out = run(&op);
        assert_eq!(out.get_pixel(18, 10).0, INK);
        assert_eq!(out.get_pixel(10, 10).0, WHITE.0);
    }

    #[test]
    fn rectangle_outline_and_fill() {
        let mut op = operator(OperationKind::DrawRectangle);
        set_all(&mut op, &[("x", 4), ("y", 4), ("width", 10), ("height", 8)]);
        let hollow = run(&op);
        assert_eq!(hollow.get_pixel(4, 4).0, INK);
        assert_eq!(hollow.get_pixel(13, 11).0, INK);
        assert_eq!(hollow.get_pixel(8, 8).0, WHITE.0);

        op.set_param("filled", true.into()).unwrap();
        let filled = run(&op);
        assert_eq!(filled.get_pixel(8, 8).0, INK);
        assert_eq!(filled.get_pixel(14, 8).0, WHITE.0);
    }

    const FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/DejaVuSansMono.ttf");

    fn text_operator(text: &str) -> super::super::BuiltinOperator {
        let mut op = operator(OperationKind::DrawText);
        op.set_param("font_path", FONT.into()).unwrap();
        op.set_param("text", text.into()).unwrap();
        set_all(&mut op, &[("x", 2), ("y", 2)]);
        op.set_param("scale", 14.0.into()).unwrap();
        op
    }

    #[test]
    fn text_renders_ink_near_origin() {
        let out = run(&text_operator("HI"));
        let inked: Vec<_> = out
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != WHITE.0)
            .collect();
        assert!(inked.len() > 10, "expected glyph pixels, found {}", inked.len());
        // Red ink blended over white lowers green and blue only.
        assert!(
            inked
                .iter()
                .all(|(_, _, p)| p.0[0] >= 250 && p.0[1].abs_diff(p.0[2]) <= 1)
        );
        assert!(inked.iter().any(|(_, _, p)| p.0[1] < 128), "no solid stroke");
        // Glyphs hang below and to the right of the anchor.
        assert!(inked.iter().all(|&(x, y, _)| x >= 1 && y >= 1));
    }

    #[test]
    fn empty_text_leaves_canvas_untouched() {
        let out = run(&text_operator(""));
        assert!(out.pixels().all(|p| p.0 == WHITE.0));
    }

    #[test]
    fn text_without_font_is_a_font_error() {
        let op = operator(OperationKind::DrawText);
        assert!(matches!(op.compute(&blank()), Err(OperatorError::Font(_))));
    }

    #[test]
    fn text_with_unreadable_font_is_a_font_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-font.ttf");
        std::fs::write(&path, b"plain bytes").unwrap();
        let mut op = operator(OperationKind::DrawText);
        op.set_param("font_path", path.to_string_lossy().into_owned().into())
            .unwrap();
        assert!(matches!(op.compute(&blank()), Err(OperatorError::Font(_))));
    }
}
