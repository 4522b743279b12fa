//! Built-in operators for [`DynamicImage`].
//!
//! Each operator is a [`Definition`]: a static parameter schema plus a
//! plain function from `(image, params)` to the next image. The
//! definitions are grouped the way the block palette groups them and
//! collected by [`definitions`], which [`Registry::builtin`] walks.
//!
//! All operators normalise their output to RGBA8. Pixel work is done by
//! the `image` and `imageproc` crates; where `imageproc` only accepts
//! single-channel input, the work is split per channel (see
//! [`channels`]).
//!
//! [`Registry::builtin`]: crate::Registry::builtin

use crate::operation::OperationKind;
use crate::operator::Operator;
use crate::params::{ParamError, ParamKind, ParamSet, ParamSpec, ParamValue};
use crate::types::{DynamicImage, OperatorError, RgbaImage};

pub mod basic;
pub mod blurring;
pub mod channels;
pub mod drawing;
pub mod filtering;
pub mod geometric;

/// The transform a built-in operator applies.
pub type ApplyFn = fn(&DynamicImage, &ParamSet) -> Result<Option<DynamicImage>, OperatorError>;

/// Schema and transform of one built-in operation.
#[derive(Debug, Clone, Copy)]
pub struct Definition {
    pub specs: &'static [ParamSpec],
    pub apply: ApplyFn,
}

impl Definition {
    #[must_use]
    pub const fn new(specs: &'static [ParamSpec], apply: ApplyFn) -> Self {
        Self { specs, apply }
    }

    /// A fresh operator holding default parameters.
    #[must_use]
    pub fn instantiate(self) -> BuiltinOperator {
        BuiltinOperator {
            params: ParamSet::new(self.specs),
            apply: self.apply,
        }
    }
}

/// An operator built from a [`Definition`].
#[derive(Debug, Clone)]
pub struct BuiltinOperator {
    params: ParamSet,
    apply: ApplyFn,
}

impl Operator<DynamicImage> for BuiltinOperator {
    fn compute(&self, image: &DynamicImage) -> Result<Option<DynamicImage>, OperatorError> {
        (self.apply)(image, &self.params)
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        self.params.set(key, value)
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }
}

/// Every built-in operation, in palette order.
pub fn definitions() -> impl Iterator<Item = (OperationKind, Definition)> {
    [
        basic::DEFINITIONS,
        geometric::DEFINITIONS,
        drawing::DEFINITIONS,
        blurring::DEFINITIONS,
        filtering::DEFINITIONS,
    ]
    .into_iter()
    .flatten()
    .copied()
}

// ───────────────────────── shared parameter helpers ─────────────────

/// Range for pixel coordinates, which may lie outside the canvas.
pub(crate) const COORD_MIN: i64 = -10_000;
pub(crate) const COORD_MAX: i64 = 10_000;

pub(crate) const fn coord(name: &'static str, default: i64) -> ParamSpec {
    ParamSpec::new(
        name,
        ParamKind::Int {
            default,
            min: COORD_MIN,
            max: COORD_MAX,
        },
    )
}

pub(crate) const fn extent(name: &'static str, default: i64, max: i64) -> ParamSpec {
    ParamSpec::new(name, ParamKind::Int { default, min: 1, max })
}

pub(crate) const fn channel(name: &'static str, default: i64) -> ParamSpec {
    ParamSpec::new(name, ParamKind::Int { default, min: 0, max: 255 })
}

/// Read a declared integer as `i32`. Declared ranges keep this lossless.
pub(crate) fn int_i32(params: &ParamSet, key: &str) -> Result<i32, ParamError> {
    let v = params.int(key)?;
    Ok(i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX }))
}

/// Read a declared non-negative integer as `u32`.
pub(crate) fn int_u32(params: &ParamSet, key: &str) -> Result<u32, ParamError> {
    let v = params.int(key)?;
    Ok(u32::try_from(v.max(0)).unwrap_or(u32::MAX))
}

/// Read a declared float as `f32`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn float_f32(params: &ParamSet, key: &str) -> Result<f32, ParamError> {
    Ok(params.float(key)? as f32)
}

/// Read the `red`/`green`/`blue` parameters as an opaque colour.
pub(crate) fn color(params: &ParamSet) -> Result<image::Rgba<u8>, ParamError> {
    let component = |key| -> Result<u8, ParamError> {
        let v = params.int(key)?;
        Ok(u8::try_from(v.clamp(0, 255)).unwrap_or(u8::MAX))
    };
    Ok(image::Rgba([
        component("red")?,
        component("green")?,
        component("blue")?,
        255,
    ]))
}

pub(crate) fn rgba(image: &DynamicImage) -> RgbaImage {
    image.to_rgba8()
}

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn done(image: RgbaImage) -> Result<Option<DynamicImage>, OperatorError> {
    Ok(Some(DynamicImage::ImageRgba8(image)))
}
