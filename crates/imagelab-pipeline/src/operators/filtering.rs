//! Filters: bilateral, box, image pyramids and morphology.
//!
//! Morphology works on R, G and B with alpha copied through, so an
//! opaque image stays opaque.

use image::imageops::FilterType;
use image::{GrayImage, Luma, Rgba};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, dilate, erode, open};

use super::blurring::{KERNEL_MAX, box_blur_rgba, gaussian_blur_rgba};
use super::channels::{map_channels, map_color_channels};
use super::{Definition, done, extent, float_f32, int_u32, rgba};
use crate::operation::OperationKind;
use crate::params::{ParamError, ParamKind, ParamSet, ParamSpec};
use crate::types::{DynamicImage, OperatorError, RgbaImage};

pub(crate) const DEFINITIONS: &[(OperationKind, Definition)] = &[
    (OperationKind::BilateralFilter, Definition::new(BILATERAL_PARAMS, bilateral)),
    (OperationKind::BoxFilter, Definition::new(BOX_PARAMS, box_sum)),
    (OperationKind::PyramidUp, Definition::new(&[], pyramid_up)),
    (OperationKind::PyramidDown, Definition::new(&[], pyramid_down)),
    (OperationKind::Erosion, Definition::new(MORPH_PARAMS, erosion)),
    (OperationKind::Dilation, Definition::new(MORPH_PARAMS, dilation)),
    (OperationKind::Morphological, Definition::new(COMPOUND_PARAMS, morphological)),
];

/// Smoothing applied around each pyramid resampling.
const PYRAMID_SIGMA: f32 = 1.0;

const fn sigma(name: &'static str) -> ParamSpec {
    ParamSpec::new(
        name,
        ParamKind::Float {
            default: 75.0,
            min: 0.1,
            max: 300.0,
        },
    )
}

const BILATERAL_PARAMS: &[ParamSpec] = &[
    extent("diameter", 9, 31),
    sigma("sigma_color"),
    sigma("sigma_space"),
];

const BOX_PARAMS: &[ParamSpec] = &[
    extent("width", 3, KERNEL_MAX),
    extent("height", 3, KERNEL_MAX),
    ParamSpec::new("normalize", ParamKind::Bool { default: true }),
];

const RADIUS: ParamSpec = extent("radius", 1, 50);

const NORM: ParamSpec = ParamSpec::new(
    "norm",
    ParamKind::Choice {
        options: &["l1", "linf"],
        default: "linf",
    },
);

const MORPH_PARAMS: &[ParamSpec] = &[RADIUS, NORM];

const COMPOUND_PARAMS: &[ParamSpec] = &[
    ParamSpec::new(
        "operation",
        ParamKind::Choice {
            options: &["open", "close", "gradient", "top_hat", "black_hat"],
            default: "open",
        },
    ),
    RADIUS,
    NORM,
];

// ───────────────────────── bilateral ────────────────────────────────

/// Edge-preserving smoothing. Each output pixel is the mean of its
/// `diameter` window weighted by spatial distance and by RGB distance
/// to the centre pixel. Alpha is kept.
#[must_use = "returns the filtered image"]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn bilateral_rgba(
    image: &RgbaImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> RgbaImage {
    let radius = (diameter / 2) as i32;
    let (w, h) = (image.width() as i32, image.height() as i32);
    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let centre = image.get_pixel(x, y).0;
        let mut sum = [0.0f32; 3];
        let mut total = 0.0f32;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if nx < 0 || ny < 0 || nx >= w || ny >= h || dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let p = image.get_pixel(nx as u32, ny as u32).0;
                let color_dist: f32 = (0..3)
                    .map(|c| {
                        let d = f32::from(p[c]) - f32::from(centre[c]);
                        d * d
                    })
                    .sum();
                let weight = ((dx * dx + dy * dy) as f32)
                    .mul_add(space_coeff, color_dist * color_coeff)
                    .exp();
                for c in 0..3 {
                    sum[c] += weight * f32::from(p[c]);
                }
                total += weight;
            }
        }
        // The centre pixel always contributes weight 1.
        let channel = |c: usize| (sum[c] / total).round().clamp(0.0, 255.0) as u8;
        Rgba([channel(0), channel(1), channel(2), centre[3]])
    })
}

fn bilateral(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    done(bilateral_rgba(
        &rgba(image),
        int_u32(params, "diameter")?,
        float_f32(params, "sigma_color")?,
        float_f32(params, "sigma_space")?,
    ))
}

// ───────────────────────── box filter ───────────────────────────────

/// Unnormalised window sum with edge replication, saturating at 255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn window_sum(channel: &GrayImage, x_radius: u32, y_radius: u32) -> GrayImage {
    let (w, h) = (i64::from(channel.width()), i64::from(channel.height()));
    let (rx, ry) = (i64::from(x_radius), i64::from(y_radius));
    GrayImage::from_fn(channel.width(), channel.height(), |x, y| {
        let mut sum = 0u32;
        for ny in (i64::from(y) - ry)..=(i64::from(y) + ry) {
            for nx in (i64::from(x) - rx)..=(i64::from(x) + rx) {
                let (cx, cy) = (nx.clamp(0, w - 1), ny.clamp(0, h - 1));
                sum += u32::from(channel.get_pixel(cx as u32, cy as u32).0[0]);
            }
        }
        Luma([u8::try_from(sum).unwrap_or(u8::MAX)])
    })
}

fn box_sum(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let (rx, ry) = (int_u32(params, "width")? / 2, int_u32(params, "height")? / 2);
    let src = rgba(image);
    if params.flag("normalize")? {
        done(box_blur_rgba(&src, rx, ry))
    } else {
        done(map_channels(&src, |channel| window_sum(channel, rx, ry)))
    }
}

// ───────────────────────── pyramids ─────────────────────────────────

fn pyramid_up(image: &DynamicImage, _: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let src = rgba(image);
    let up = image::imageops::resize(
        &src,
        src.width().saturating_mul(2),
        src.height().saturating_mul(2),
        FilterType::Triangle,
    );
    done(gaussian_blur_rgba(&up, PYRAMID_SIGMA))
}

/// Halve each side, rounding up.
fn pyramid_down(image: &DynamicImage, _: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let smooth = gaussian_blur_rgba(&rgba(image), PYRAMID_SIGMA);
    let (w, h) = (smooth.width().div_ceil(2), smooth.height().div_ceil(2));
    done(image::imageops::resize(&smooth, w, h, FilterType::Triangle))
}

// ───────────────────────── morphology ───────────────────────────────

fn structuring(params: &ParamSet) -> Result<(Norm, u8), ParamError> {
    let norm = match params.text("norm")? {
        "l1" => Norm::L1,
        _ => Norm::LInf,
    };
    let radius = u8::try_from(params.int("radius")?).unwrap_or(u8::MAX);
    Ok((norm, radius))
}

fn difference(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y).0[0].saturating_sub(b.get_pixel(x, y).0[0])])
    })
}

fn erosion(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let (norm, k) = structuring(params)?;
    done(map_color_channels(&rgba(image), |c| erode(c, norm, k)))
}

fn dilation(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let (norm, k) = structuring(params)?;
    done(map_color_channels(&rgba(image), |c| dilate(c, norm, k)))
}

fn morphological(
    image: &DynamicImage,
    params: &ParamSet,
) -> Result<Option<DynamicImage>, OperatorError> {
    let (norm, k) = structuring(params)?;
    let src = rgba(image);
    let out = match params.text("operation")? {
        "close" => map_color_channels(&src, |c| close(c, norm, k)),
        "gradient" => map_color_channels(&src, |c| {
            difference(&dilate(c, norm, k), &erode(c, norm, k))
        }),
        "top_hat" => map_color_channels(&src, |c| difference(c, &open(c, norm, k))),
        "black_hat" => map_color_channels(&src, |c| difference(&close(c, norm, k), c)),
        _ => map_color_channels(&src, |c| open(c, norm, k)),
    };
    done(out)
}
