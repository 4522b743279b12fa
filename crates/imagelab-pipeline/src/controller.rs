//! The workspace controller: owns the pipeline, the source image, and
//! the processed image.
//!
//! Every UI gesture maps onto one method:
//!
//! | gesture | method |
//! |---|---|
//! | drop a block into the workspace | [`Controller::add_operator`] |
//! | connect one block under another | [`Controller::arrange_blocks`] |
//! | edit a block's field | [`Controller::change_values_of_blocks`] |
//! | load an image | [`Controller::set_original_image`] |
//! | press run | [`Controller::compute_all`] |
//!
//! Unknown identifiers and kinds that are not in the pipeline are
//! ignored rather than reported as errors; the methods return what they
//! did so a caller can still tell.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::operation::OperationKind;
use crate::params::{ParamError, ParamSet, ParamValue};
use crate::pipeline::{Arrangement, Pipeline};
use crate::registry::Registry;
use crate::types::{DynamicImage, PipelineError};

/// Pipeline state plus the factory that feeds it.
pub struct Controller<I = DynamicImage> {
    registry: Registry<I>,
    pipeline: Pipeline<I>,
    original: Option<Arc<I>>,
    processed: Option<I>,
}

impl Controller<DynamicImage> {
    /// A controller backed by every built-in operator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin())
    }
}

impl Default for Controller<DynamicImage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Controller<I> {
    /// A controller that instantiates operators from `registry`.
    #[must_use]
    pub fn with_registry(registry: Registry<I>) -> Self {
        Self {
            registry,
            pipeline: Pipeline::new(),
            original: None,
            processed: None,
        }
    }

    /// Make the first `child` block run immediately after the first
    /// `parent` block.
    ///
    /// Does nothing when either kind is absent or the order already
    /// holds. See [`Pipeline::arrange`].
    pub fn arrange_blocks(&mut self, parent: OperationKind, child: OperationKind) -> Arrangement {
        let outcome = self.pipeline.arrange(parent, child);
        debug!(%parent, %child, ?outcome, "arrange blocks");
        outcome
    }

    /// Set the image the next run starts from.
    pub fn set_original_image(&mut self, image: impl Into<Arc<I>>) {
        self.original = Some(image.into());
    }

    #[must_use]
    pub const fn original_image(&self) -> Option<&Arc<I>> {
        self.original.as_ref()
    }

    /// Output of the most recently completed step.
    ///
    /// `None` before any step has run, and after a step that produced no
    /// image.
    #[must_use]
    pub const fn processed_image(&self) -> Option<&I> {
        self.processed.as_ref()
    }

    /// Create a block for `identifier` and append it to the pipeline.
    ///
    /// Returns the kind appended, or `None` (leaving the pipeline
    /// untouched) when the identifier names no registered operation.
    pub fn add_operator(&mut self, identifier: &str) -> Option<OperationKind> {
        let Ok(kind) = identifier.parse::<OperationKind>() else {
            debug!(identifier, "ignoring unknown operation");
            return None;
        };
        let Some(block) = self.registry.create(kind) else {
            debug!(%kind, "ignoring unregistered operation");
            return None;
        };
        self.pipeline.push(block);
        debug!(%kind, len = self.pipeline.len(), "operator added");
        Some(kind)
    }

    /// Run the whole pipeline against the source image.
    ///
    /// Each step consumes the previous step's output and its result
    /// becomes the processed image. Once a step produces no image, the
    /// remaining steps are skipped.
    ///
    /// # Errors
    ///
    /// Checked in order before anything runs:
    /// [`PipelineError::EmptyPipeline`],
    /// [`PipelineError::MissingReadOperator`], then
    /// [`PipelineError::ImageNotSet`].
    ///
    /// A failing operator stops the run with [`PipelineError::Step`];
    /// the processed image keeps the output of the last completed step.
    pub fn compute_all(&mut self) -> Result<(), PipelineError> {
        let first = self.pipeline.first().ok_or(PipelineError::EmptyPipeline)?;
        if !first.kind().is_read() {
            return Err(PipelineError::MissingReadOperator {
                first: first.kind(),
            });
        }
        let source = Arc::clone(self.original.as_ref().ok_or(PipelineError::ImageNotSet)?);

        for (index, block) in self.pipeline.iter().enumerate() {
            // Step 0 reads the source; every later step reads the
            // previous output, which is exactly the processed image.
            let input = if index == 0 {
                Some(&*source)
            } else {
                self.processed.as_ref()
            };
            let Some(input) = input else {
                trace!(index, kind = %block.kind(), "skipping step without input");
                continue;
            };

            let output = block.compute(input).map_err(|err| PipelineError::Step {
                index,
                kind: block.kind(),
                source: err,
            })?;
            trace!(index, kind = %block.kind(), produced = output.is_some(), "step computed");
            self.processed = output;
        }
        Ok(())
    }

    /// Set `key` to `value` on the first block of `kind`.
    ///
    /// Returns `Ok(false)` without touching anything when no block of
    /// that kind exists.
    ///
    /// # Errors
    ///
    /// Returns the block's own [`ParamError`] unchanged.
    pub fn change_values_of_blocks(
        &mut self,
        kind: OperationKind,
        key: &str,
        value: impl Into<ParamValue>,
    ) -> Result<bool, ParamError> {
        let Some(block) = self.pipeline.find_mut(kind) else {
            debug!(%kind, key, "ignoring parameter change for absent block");
            return Ok(false);
        };
        let value = value.into();
        debug!(%kind, key, %value, "change parameter");
        block.set_param(key, value)?;
        Ok(true)
    }

    /// Block kinds in execution order.
    #[must_use]
    pub fn blocks(&self) -> Vec<OperationKind> {
        self.pipeline.kinds()
    }

    /// A copy of the parameters of the first block of `kind`.
    #[must_use]
    pub fn block_params(&self, kind: OperationKind) -> Option<ParamSet> {
        self.pipeline.find(kind).map(|block| block.params().clone())
    }

    /// The operations this controller can instantiate.
    #[must_use]
    pub const fn registry(&self) -> &Registry<I> {
        &self.registry
    }

    pub(crate) const fn pipeline(&self) -> &Pipeline<I> {
        &self.pipeline
    }
}
