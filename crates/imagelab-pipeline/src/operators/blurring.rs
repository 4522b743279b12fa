//! Smoothing operators: box blur, Gaussian blur and median blur.
//!
//! Kernel sizes are full widths, as the block palette presents them. A
//! width `k` becomes an `imageproc` radius of `k / 2`, so even widths
//! behave like the next odd one.

use image::GrayImage;
use imageproc::filter::{box_filter, gaussian_blur_f32, median_filter};

use super::channels::map_channels;
use super::{Definition, done, extent, float_f32, int_u32, rgba};
use crate::operation::OperationKind;
use crate::params::{ParamKind, ParamSet, ParamSpec};
use crate::types::{DynamicImage, OperatorError, RgbaImage};

pub(crate) const DEFINITIONS: &[(OperationKind, Definition)] = &[
    (OperationKind::Blur, Definition::new(BLUR_PARAMS, blur)),
    (OperationKind::GaussianBlur, Definition::new(GAUSSIAN_PARAMS, gaussian)),
    (OperationKind::MedianBlur, Definition::new(MEDIAN_PARAMS, median)),
];

pub(crate) const KERNEL_MAX: i64 = 99;

const BLUR_PARAMS: &[ParamSpec] = &[
    extent("width", 3, KERNEL_MAX),
    extent("height", 3, KERNEL_MAX),
];

const GAUSSIAN_PARAMS: &[ParamSpec] = &[ParamSpec::new(
    "sigma",
    ParamKind::Float {
        default: 1.4,
        min: 0.0,
        max: 50.0,
    },
)];

const MEDIAN_PARAMS: &[ParamSpec] = &[extent("kernel_size", 3, KERNEL_MAX)];

/// Normalised box blur, applied to every channel.
#[must_use = "returns the blurred image"]
pub fn box_blur_rgba(image: &RgbaImage, x_radius: u32, y_radius: u32) -> RgbaImage {
    map_channels(image, |channel| box_filter(channel, x_radius, y_radius))
}

/// Gaussian blur of every channel. Non-positive `sigma` returns the
/// image unchanged, since `imageproc` panics on `sigma <= 0.0`.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur_rgba(image: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    map_channels(image, |channel: &GrayImage| gaussian_blur_f32(channel, sigma))
}

fn blur(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let (rx, ry) = (int_u32(params, "width")? / 2, int_u32(params, "height")? / 2);
    done(box_blur_rgba(&rgba(image), rx, ry))
}

fn gaussian(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    done(gaussian_blur_rgba(&rgba(image), float_f32(params, "sigma")?))
}

fn median(image: &DynamicImage, params: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    let radius = int_u32(params, "kernel_size")? / 2;
    done(median_filter(&rgba(image), radius, radius))
}
