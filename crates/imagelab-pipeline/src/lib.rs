//! imagelab-pipeline: the block pipeline behind the ImageLab workspace.
//!
//! A user drops operator blocks into a workspace, connects them, edits
//! their fields and presses run. This crate is everything below that UI:
//!
//! - [`Registry`] turns an operation identifier into an operator block.
//! - [`Pipeline`] keeps the blocks in execution order and supports the
//!   single reorder gesture the UI offers ([`Pipeline::arrange`]).
//! - [`Controller`] validates preconditions and folds the source image
//!   through the pipeline.
//! - [`operators`] holds the built-in operators for [`DynamicImage`].
//! - [`Recipe`] is a serialisable snapshot of a workspace.
//!
//! The controller is generic over the image type. Nothing in it looks at
//! pixels, so any operator set can be plugged in through a custom
//! [`Registry`].

pub mod controller;
pub mod operation;
pub mod operator;
pub mod operators;
pub mod params;
pub mod pipeline;
pub mod recipe;
pub mod registry;
pub mod types;

#[cfg(test)]
mod testing;

pub use controller::Controller;
pub use operation::{OperationKind, UnknownOperation};
pub use operator::{Block, Operator};
pub use params::{ParamError, ParamKind, ParamSet, ParamSpec, ParamValue};
pub use pipeline::{Arrangement, Pipeline};
pub use recipe::{ParamChange, Recipe, RecipeError};
pub use registry::Registry;
pub use types::{DynamicImage, OperatorError, PipelineError, RgbaImage};
