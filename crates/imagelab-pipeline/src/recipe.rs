//! Recipes: a serialisable description of a workspace.
//!
//! ```json
//! {
//!   "blocks": ["read_image", "gaussian_blur"],
//!   "arrange": [["read_image", "gaussian_blur"]],
//!   "params": [{ "block": "gaussian_blur", "key": "sigma", "value": 2.0 }]
//! }
//! ```
//!
//! Applying a recipe replays the same calls the UI would make: add
//! every block, apply every arrangement, then every parameter change.
//! Unlike the controller's own methods, a recipe is strict. A recipe is
//! a user file, so an identifier that names nothing, an arrangement or a
//! parameter for a block that is not there, is an error rather than a
//! no-op.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::Controller;
use crate::operation::{OperationKind, UnknownOperation};
use crate::params::{ParamError, ParamValue};

/// Blocks, arrangements and parameter changes, applied in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub blocks: Vec<String>,
    /// `[parent, child]` pairs for [`Controller::arrange_blocks`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arrange: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamChange>,
}

/// One parameter assignment. `block` addresses the first block of
/// that kind, as [`Controller::change_values_of_blocks`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamChange {
    pub block: String,
    pub key: String,
    pub value: ParamValue,
}

/// Errors raised while loading or applying a [`Recipe`].
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),

    #[error("operation {0} is not available in this workspace")]
    Unregistered(OperationKind),

    #[error("no {block} block to set {key:?} on")]
    MissingBlock { block: OperationKind, key: String },

    #[error("cannot place {child} after {parent}: no {missing} block")]
    MissingArrangeBlock {
        parent: OperationKind,
        child: OperationKind,
        missing: OperationKind,
    },

    #[error("invalid parameter for {block}: {source}")]
    Param {
        block: OperationKind,
        #[source]
        source: ParamError,
    },

    #[error("malformed recipe: {0}")]
    Json(#[from] serde_json::Error),
}

impl Recipe {
    /// Parse a recipe from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Json`] if `text` is not a valid recipe.
    pub fn from_json(text: &str) -> Result<Self, RecipeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialise as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Json`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, RecipeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse(identifier: &str) -> Result<OperationKind, RecipeError> {
    Ok(identifier.parse::<OperationKind>()?)
}

impl<I> Controller<I> {
    /// Append the recipe's blocks, then apply its arrangements and
    /// parameter changes.
    ///
    /// Every identifier is resolved, and every arrangement checked
    /// against the blocks the pipeline will hold, before the pipeline is
    /// touched. A recipe rejected at that stage changes nothing.
    /// Parameter failures can leave earlier changes applied.
    ///
    /// # Errors
    ///
    /// [`RecipeError::UnknownOperation`] or [`RecipeError::Unregistered`]
    /// for an identifier this controller cannot instantiate,
    /// [`RecipeError::MissingArrangeBlock`] for an arrangement naming a
    /// kind that is neither in the pipeline nor among the recipe's blocks,
    /// [`RecipeError::MissingBlock`] for a parameter change addressing an
    /// absent block, and [`RecipeError::Param`] when a block rejects a
    /// value.
    pub fn apply_recipe(&mut self, recipe: &Recipe) -> Result<(), RecipeError> {
        let blocks = recipe
            .blocks
            .iter()
            .map(String::as_str)
            .map(parse)
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(&kind) = blocks.iter().find(|&&kind| !self.registry().contains(kind)) {
            return Err(RecipeError::Unregistered(kind));
        }
        let arrangements = recipe
            .arrange
            .iter()
            .map(|(parent, child)| Ok((parse(parent)?, parse(child)?)))
            .collect::<Result<Vec<_>, RecipeError>>()?;
        let present = |kind: OperationKind| {
            blocks.contains(&kind) || self.pipeline().position(kind).is_some()
        };
        for &(parent, child) in &arrangements {
            if let Some(missing) = [parent, child].into_iter().find(|&k| !present(k)) {
                return Err(RecipeError::MissingArrangeBlock {
                    parent,
                    child,
                    missing,
                });
            }
        }
        let changes = recipe
            .params
            .iter()
            .map(|change| Ok((parse(&change.block)?, change)))
            .collect::<Result<Vec<_>, RecipeError>>()?;

        for kind in blocks {
            self.add_operator(kind.as_str());
        }
        for (parent, child) in arrangements {
            self.arrange_blocks(parent, child);
        }
        for (block, change) in changes {
            let found = self
                .change_values_of_blocks(block, &change.key, change.value.clone())
                .map_err(|source| RecipeError::Param { block, source })?;
            if !found {
                return Err(RecipeError::MissingBlock {
                    block,
                    key: change.key.clone(),
                });
            }
        }
        debug!(blocks = self.pipeline().len(), "recipe applied");
        Ok(())
    }

    /// The current pipeline as a recipe.
    ///
    /// Blocks are listed in execution order, so no arrangements are
    /// needed. Parameters are exported for the first block of each
    /// kind, since that is the block a parameter change addresses.
    #[must_use]
    pub fn recipe(&self) -> Recipe {
        let mut seen = Vec::new();
        let mut params = Vec::new();
        for block in self.pipeline() {
            if seen.contains(&block.kind()) {
                continue;
            }
            seen.push(block.kind());
            params.extend(block.params().iter().map(|(key, value)| ParamChange {
                block: block.kind().to_string(),
                key: key.to_owned(),
                value: value.clone(),
            }));
        }
        Recipe {
            blocks: self.pipeline().kinds().iter().map(ToString::to_string).collect(),
            arrange: Vec::new(),
            params,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{label_controller, labels};
    use crate::types::RgbaImage;

    const JSON: &str = r#"{
        "blocks": ["read_image", "blur", "erosion"],
        "arrange": [["read_image", "erosion"]],
        "params": [{ "block": "blur", "key": "size", "value": 7 }]
    }"#;

    #[test]
    fn parse_and_apply() {
        let recipe = Recipe::from_json(JSON).unwrap();
        let mut controller = label_controller();
        controller.apply_recipe(&recipe).unwrap();

        assert_eq!(
            controller.blocks(),
            [
                OperationKind::ReadImage,
                OperationKind::Erosion,
                OperationKind::Blur
            ]
        );
        let params = controller.block_params(OperationKind::Blur).unwrap();
        assert_eq!(params.get("size"), Some(&ParamValue::Int(7)));

        controller.set_original_image(labels(&["src"]));
        controller.compute_all().unwrap();
        assert_eq!(
            controller.processed_image().unwrap(),
            &labels(&["src", "read_image", "erosion", "blur"])
        );
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let recipe = Recipe::from_json(r#"{ "blocks": ["read_image"] }"#).unwrap();
        assert!(recipe.arrange.is_empty());
        assert!(recipe.params.is_empty());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            Recipe::from_json("{ \"blocks\": 3 }"),
            Err(RecipeError::Json(_))
        ));
    }

    #[test]
    fn unknown_identifier_changes_nothing() {
        let recipe = Recipe {
            blocks: vec!["read_image".into(), "sharpen".into()],
            ..Recipe::default()
        };
        let mut controller = label_controller();
        let err = controller.apply_recipe(&recipe).unwrap_err();
        assert!(matches!(err, RecipeError::UnknownOperation(_)));
        assert!(controller.blocks().is_empty());
    }

    #[test]
    fn unregistered_kind_changes_nothing() {
        // The label registry has no drawing operators.
        let recipe = Recipe {
            blocks: vec!["read_image".into(), "draw_line".into()],
            ..Recipe::default()
        };
        let mut controller = label_controller();
        let err = controller.apply_recipe(&recipe).unwrap_err();
        assert!(matches!(err, RecipeError::Unregistered(OperationKind::DrawLine)));
        assert!(controller.blocks().is_empty());
    }

    #[test]
    fn arrangement_for_absent_block_changes_nothing() {
        let recipe = Recipe {
            blocks: vec!["read_image".into(), "blur".into()],
            arrange: vec![("blur".into(), "erosion".into())],
            ..Recipe::default()
        };
        let mut controller = label_controller();
        let err = controller.apply_recipe(&recipe).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::MissingArrangeBlock {
                parent: OperationKind::Blur,
                child: OperationKind::Erosion,
                missing: OperationKind::Erosion,
            }
        ));
        assert!(controller.blocks().is_empty());
    }

    #[test]
    fn arrangement_may_use_blocks_already_in_the_pipeline() {
        let mut controller = label_controller();
        controller.add_operator("read_image");
        controller.add_operator("erosion");
        let recipe = Recipe {
            blocks: vec!["blur".into()],
            arrange: vec![("read_image".into(), "blur".into())],
            ..Recipe::default()
        };
        controller.apply_recipe(&recipe).unwrap();
        assert_eq!(
            controller.blocks(),
            [
                OperationKind::ReadImage,
                OperationKind::Blur,
                OperationKind::Erosion
            ]
        );
    }

    #[test]
    fn parameter_for_absent_block_is_an_error() {
        let recipe = Recipe {
            blocks: vec!["read_image".into()],
            params: vec![ParamChange {
                block: "blur".into(),
                key: "size".into(),
                value: 3.into(),
            }],
            ..Recipe::default()
        };
        let err = label_controller().apply_recipe(&recipe).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::MissingBlock {
                block: OperationKind::Blur,
                ..
            }
        ));
    }

    #[test]
    fn rejected_value_carries_block() {
        let recipe = Recipe {
            blocks: vec!["read_image".into(), "blur".into()],
            params: vec![ParamChange {
                block: "blur".into(),
                key: "size".into(),
                value: (-3).into(),
            }],
            ..Recipe::default()
        };
        let err = label_controller().apply_recipe(&recipe).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::Param {
                block: OperationKind::Blur,
                source: ParamError::OutOfRange { .. }
            }
        ));
    }

    #[test]
    fn exported_recipe_rebuilds_the_workspace() {
        let mut controller = Controller::new();
        controller
            .apply_recipe(
                &Recipe::from_json(
                    r#"{
                        "blocks": ["read_image", "median_blur", "gaussian_blur"],
                        "arrange": [["read_image", "gaussian_blur"]],
                        "params": [{ "block": "gaussian_blur", "key": "sigma", "value": "2.5" }]
                    }"#,
                )
                .unwrap(),
            )
            .unwrap();

        let exported = controller.recipe();
        assert_eq!(exported.blocks, ["read_image", "gaussian_blur", "median_blur"]);
        assert!(exported.arrange.is_empty());

        let json = exported.to_json().unwrap();
        let mut rebuilt = Controller::new();
        rebuilt.apply_recipe(&Recipe::from_json(&json).unwrap()).unwrap();
        assert_eq!(rebuilt.blocks(), controller.blocks());
        let sigma = rebuilt
            .block_params(OperationKind::GaussianBlur)
            .unwrap()
            .float("sigma")
            .unwrap();
        assert!((sigma - 2.5).abs() < f64::EPSILON, "sigma {sigma}");

        let image = crate::types::DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        rebuilt.set_original_image(image);
        rebuilt.compute_all().unwrap();
        assert!(rebuilt.processed_image().is_some());
    }
}
