//! The operator capability and the pipeline block that carries it.
//!
//! This module defines the [`Operator`] trait every pipeline step
//! implements and [`Block`], which pairs an operator with the
//! [`OperationKind`] it was created for.
//!
//! # Image type
//!
//! The trait is generic over the image type `I`. Built-in operators work
//! on [`DynamicImage`](crate::types::DynamicImage); the controller itself
//! never looks inside an image, so any opaque type can flow through it.

use std::fmt;

use crate::operation::OperationKind;
use crate::params::{ParamError, ParamSet, ParamValue};
use crate::types::OperatorError;

/// A single image-processing step.
pub trait Operator<I> {
    /// Transform `image` into the next image of the chain.
    ///
    /// `Ok(None)` means the step produced no image; every later step of
    /// the run is then skipped.
    ///
    /// # Errors
    ///
    /// Returns an [`OperatorError`] when the transform cannot be applied.
    fn compute(&self, image: &I) -> Result<Option<I>, OperatorError>;

    /// Validate `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] for unknown keys, wrong types, or values
    /// outside the declared range. The stored value is then unchanged.
    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError>;

    /// Current parameter values and their schema.
    fn params(&self) -> &ParamSet;
}

/// An operator instance placed in a pipeline.
///
/// The kind is fixed by the factory at construction; lookups by kind use
/// it rather than asking the operator.
pub struct Block<I> {
    kind: OperationKind,
    operator: Box<dyn Operator<I>>,
}

impl<I> Block<I> {
    #[must_use]
    pub fn new(kind: OperationKind, operator: Box<dyn Operator<I>>) -> Self {
        Self { kind, operator }
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// See [`Operator::compute`].
    ///
    /// # Errors
    ///
    /// Propagates the operator's [`OperatorError`].
    pub fn compute(&self, image: &I) -> Result<Option<I>, OperatorError> {
        self.operator.compute(image)
    }

    /// See [`Operator::set_param`].
    ///
    /// # Errors
    ///
    /// Propagates the operator's [`ParamError`] unchanged.
    pub fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        self.operator.set_param(key, value)
    }

    #[must_use]
    pub fn params(&self) -> &ParamSet {
        self.operator.params()
    }
}

impl<I> fmt::Debug for Block<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("kind", &self.kind)
            .field("params", self.params())
            .finish()
    }
}
