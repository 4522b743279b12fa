//! Shared types for the imagelab operator pipeline.

use crate::operation::OperationKind;
use crate::params::ParamError;

/// Re-export `DynamicImage` so downstream crates can hand images to the
/// controller without depending on `image` directly.
pub use image::DynamicImage;

/// Re-export `RgbaImage`, the working buffer of every built-in operator.
pub use image::RgbaImage;

/// Errors raised by an operator's `compute`.
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// A stored parameter could not be read back as the expected type.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Encoding or writing an image failed.
    #[error("image operation failed: {0}")]
    Image(#[from] image::ImageError),

    /// A font could not be loaded for text drawing.
    #[error("font unavailable: {0}")]
    Font(String),

    /// The operator cannot handle the input it was given.
    #[error("unsupported input: {0}")]
    Unsupported(String),
}

/// Errors raised by [`Controller::compute_all`](crate::Controller::compute_all).
///
/// The first three variants are precondition failures: nothing ran and
/// the processed image is untouched. [`PipelineError::Step`] means the
/// run stopped part way; the processed image holds the output of the
/// last completed step.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No operators have been added.
    #[error("no operators are added to the workspace")]
    EmptyPipeline,

    /// The first operator is not the read kind.
    #[error("read image block is not added first (found {first})")]
    MissingReadOperator {
        /// Kind of the block currently heading the pipeline.
        first: OperationKind,
    },

    /// No source image has been set.
    #[error("source image is not set")]
    ImageNotSet,

    /// An operator failed while computing.
    #[error("step {index} ({kind}) failed: {source}")]
    Step {
        /// Zero-based pipeline position of the failing block.
        index: usize,
        kind: OperationKind,
        #[source]
        source: OperatorError,
    },
}

impl PipelineError {
    /// Whether the run never started (a precondition failed).
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        !matches!(self, Self::Step { .. })
    }
}
