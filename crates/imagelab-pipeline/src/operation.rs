//! The closed set of operation identifiers the workspace understands.
//!
//! The UI layer refers to blocks by string identifier. [`OperationKind`]
//! is the typed form of that identifier; [`OperationKind::from_str`]
//! accepts the snake_case wire form case-insensitively, with `-` allowed
//! in place of `_`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one kind of image operation.
///
/// A pipeline block's kind is its identity for lookups: the first block
/// of a given kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Entry block. Must be first in any pipeline that is executed.
    ReadImage,
    /// Save the current image to disk and pass it through.
    WriteImage,
    /// Mirror horizontally, vertically, or both.
    ReflectImage,
    /// Rotate about the image centre.
    RotateImage,
    /// Rotate, scale, and translate in one projective warp.
    AffineImage,
    /// Resize by per-axis factors.
    ScaleImage,
    DrawLine,
    DrawEllipse,
    DrawArrowLine,
    DrawText,
    DrawCircle,
    DrawRectangle,
    /// Normalised box blur.
    Blur,
    GaussianBlur,
    MedianBlur,
    BilateralFilter,
    /// Box filter with optional normalisation.
    BoxFilter,
    PyramidUp,
    PyramidDown,
    Erosion,
    Dilation,
    /// Compound morphology (open, close, gradient, top-hat, black-hat).
    Morphological,
}

impl OperationKind {
    /// The kind that must head every executed pipeline.
    pub const READ: Self = Self::ReadImage;

    /// Every operation kind, in palette order.
    pub const ALL: [Self; 22] = [
        Self::ReadImage,
        Self::WriteImage,
        Self::ReflectImage,
        Self::RotateImage,
        Self::AffineImage,
        Self::ScaleImage,
        Self::DrawLine,
        Self::DrawEllipse,
        Self::DrawArrowLine,
        Self::DrawText,
        Self::DrawCircle,
        Self::DrawRectangle,
        Self::Blur,
        Self::GaussianBlur,
        Self::MedianBlur,
        Self::BilateralFilter,
        Self::BoxFilter,
        Self::PyramidUp,
        Self::PyramidDown,
        Self::Erosion,
        Self::Dilation,
        Self::Morphological,
    ];

    /// The snake_case identifier used on the UI boundary.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadImage => "read_image",
            Self::WriteImage => "write_image",
            Self::ReflectImage => "reflect_image",
            Self::RotateImage => "rotate_image",
            Self::AffineImage => "affine_image",
            Self::ScaleImage => "scale_image",
            Self::DrawLine => "draw_line",
            Self::DrawEllipse => "draw_ellipse",
            Self::DrawArrowLine => "draw_arrow_line",
            Self::DrawText => "draw_text",
            Self::DrawCircle => "draw_circle",
            Self::DrawRectangle => "draw_rectangle",
            Self::Blur => "blur",
            Self::GaussianBlur => "gaussian_blur",
            Self::MedianBlur => "median_blur",
            Self::BilateralFilter => "bilateral_filter",
            Self::BoxFilter => "box_filter",
            Self::PyramidUp => "pyramid_up",
            Self::PyramidDown => "pyramid_down",
            Self::Erosion => "erosion",
            Self::Dilation => "dilation",
            Self::Morphological => "morphological",
        }
    }

    /// Whether this is the designated read kind.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::ReadImage)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation identifier: {0:?}")]
pub struct UnknownOperation(pub String);

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}
