//! Geometric transforms: reflect, rotate, affine warp, scale.
//!
//! Rotation and the affine warp keep the canvas size and fill uncovered
//! pixels with transparent black. An empty canvas passes through both
//! unchanged. Scaling changes the canvas size.

use image::imageops::FilterType;
use image::Rgba;
use imageproc::geometric_transformations::{Interpolation, Projection, rotate_about_center, warp};

use super::{Definition, done, float_f32, rgba};
use crate::operation::OperationKind;
use crate::params::{ParamKind, ParamSet, ParamSpec};
use crate::types::{DynamicImage, OperatorError};

pub(crate) const DEFINITIONS: &[(OperationKind, Definition)] = &[
    (OperationKind::ReflectImage, Definition::new(REFLECT_PARAMS, reflect)),
    (OperationKind::RotateImage, Definition::new(ROTATE_PARAMS, rotate)),
    (OperationKind::AffineImage, Definition::new(AFFINE_PARAMS, affine)),
    (OperationKind::ScaleImage, Definition::new(SCALE_PARAMS, scale)),
];

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

const ANGLE: ParamSpec = ParamSpec::new(
    "angle",
    ParamKind::Float {
        default: 0.0,
        min: -360.0,
        max: 360.0,
    },
);

const fn factor(name: &'static str) -> ParamSpec {
    ParamSpec::new(
        name,
        ParamKind::Float {
            default: 1.0,
            min: 0.01,
            max: 10.0,
        },
    )
}

const fn offset(name: &'static str) -> ParamSpec {
    ParamSpec::new(
        name,
        ParamKind::Float {
            default: 0.0,
            min: -10_000.0,
            max: 10_000.0,
        },
    )
}

const REFLECT_PARAMS: &[ParamSpec] = &[ParamSpec::new(
    "direction",
    ParamKind::Choice {
        options: &["horizontal", "vertical", "both"],
        default: "horizontal",
    },
)];

const ROTATE_PARAMS: &[ParamSpec] = &[ParamSpec::new(
    "angle",
    ParamKind::Float {
        default: 90.0,
        min: -360.0,
        max: 360.0,
    },
)];

const AFFINE_PARAMS: &[ParamSpec] = &[
    ANGLE,
    factor("scale_x"),
    factor("scale_y"),
    offset("translate_x"),
    offset("translate_y"),
];

const SCALE_PARAMS: &[ParamSpec] = &[factor("factor_x"), factor("factor_y")];

/// Mirror across the vertical axis (`horizontal`), the horizontal axis
/// (`vertical`), or both.
fn reflect(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let rgba = rgba(image);
    let out = match params.text("direction")? {
        "vertical" => image::imageops::flip_vertical(&rgba),
        "both" => image::imageops::rotate180(&rgba),
        _ => image::imageops::flip_horizontal(&rgba),
    };
    done(out)
}

fn is_empty(image: &DynamicImage) -> bool {
    image.width() == 0 || image.height() == 0
}

/// Rotate clockwise by `angle` degrees about the centre.
fn rotate(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    if is_empty(image) {
        return done(rgba(image));
    }
    let theta = float_f32(params, "angle")?.to_radians();
    done(rotate_about_center(
        &rgba(image),
        theta,
        Interpolation::Bilinear,
        BACKGROUND,
    ))
}

/// Scale, then rotate, about the centre, then translate.
#[allow(clippy::cast_precision_loss)]
fn affine(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    if is_empty(image) {
        return done(rgba(image));
    }
    let rgba = rgba(image);
    let (cx, cy) = (rgba.width() as f32 / 2.0, rgba.height() as f32 / 2.0);
    let theta = float_f32(params, "angle")?.to_radians();
    let (sx, sy) = (float_f32(params, "scale_x")?, float_f32(params, "scale_y")?);
    let (tx, ty) = (
        float_f32(params, "translate_x")?,
        float_f32(params, "translate_y")?,
    );

    let projection = Projection::translate(cx + tx, cy + ty)
        * Projection::rotate(theta)
        * Projection::scale(sx, sy)
        * Projection::translate(-cx, -cy);
    done(warp(&rgba, &projection, Interpolation::Bilinear, BACKGROUND))
}

/// Resize by per-axis factors. Each side is at least one pixel.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scale(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let fx = params.float("factor_x")?;
    let fy = params.float("factor_y")?;
    let width = (f64::from(image.width()) * fx).round().max(1.0) as u32;
    let height = (f64::from(image.height()) * fy).round().max(1.0) as u32;
    done(image::imageops::resize(
        &rgba(image),
        width,
        height,
        FilterType::Triangle,
    ))
}
