//! Test doubles: operators over `Vec<String>` "images" that record the
//! order they ran in.

use crate::controller::Controller;
use crate::operation::OperationKind;
use crate::operator::{Block, Operator};
use crate::params::{ParamError, ParamKind, ParamSet, ParamSpec, ParamValue};
use crate::pipeline::Pipeline;
use crate::registry::Registry;
use crate::types::OperatorError;

pub type Labels = Vec<String>;

static LABEL_PARAMS: &[ParamSpec] = &[ParamSpec::new(
    "size",
    ParamKind::Int {
        default: 1,
        min: 0,
        max: 100,
    },
)];

/// Kinds the label registry maps to plain [`Label`] operators, besides
/// the read kind.
pub const LABEL_KINDS: [OperationKind; 7] = [
    OperationKind::Blur,
    OperationKind::Erosion,
    OperationKind::Dilation,
    OperationKind::BoxFilter,
    OperationKind::PyramidUp,
    OperationKind::PyramidDown,
    OperationKind::ScaleImage,
];

/// Appends its label to the image. Rejects negative sizes.
pub struct Label {
    label: &'static str,
    params: ParamSet,
}

impl Label {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            params: ParamSet::new(LABEL_PARAMS),
        }
    }
}

impl Operator<Labels> for Label {
    fn compute(&self, image: &Labels) -> Result<Option<Labels>, OperatorError> {
        let mut next = image.clone();
        next.push(self.label.to_owned());
        Ok(Some(next))
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        self.params.set(key, value)
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }
}

/// Always fails.
struct Fail(ParamSet);

impl Operator<Labels> for Fail {
    fn compute(&self, _image: &Labels) -> Result<Option<Labels>, OperatorError> {
        Err(OperatorError::Unsupported("label operator always fails".to_owned()))
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        self.0.set(key, value)
    }

    fn params(&self) -> &ParamSet {
        &self.0
    }
}

/// Produces no image.
struct Vanish(ParamSet);

impl Operator<Labels> for Vanish {
    fn compute(&self, _image: &Labels) -> Result<Option<Labels>, OperatorError> {
        Ok(None)
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        self.0.set(key, value)
    }

    fn params(&self) -> &ParamSet {
        &self.0
    }
}

/// Read and [`LABEL_KINDS`] append their identifier, median blur fails,
/// gaussian blur produces nothing. Everything else is unregistered.
pub fn label_registry() -> Registry<Labels> {
    let mut registry = Registry::empty();
    for kind in std::iter::once(OperationKind::ReadImage).chain(LABEL_KINDS) {
        registry.register(kind, move || Box::new(Label::new(kind.as_str())));
    }
    registry.register(OperationKind::MedianBlur, || {
        Box::new(Fail(ParamSet::new(LABEL_PARAMS)))
    });
    registry.register(OperationKind::GaussianBlur, || {
        Box::new(Vanish(ParamSet::new(LABEL_PARAMS)))
    });
    registry
}

pub fn label_controller() -> Controller<Labels> {
    Controller::with_registry(label_registry())
}

pub fn block(kind: OperationKind) -> Block<Labels> {
    Block::new(kind, Box::new(Label::new(kind.as_str())))
}

pub fn kinds_of<I>(pipeline: &Pipeline<I>) -> Vec<OperationKind> {
    pipeline.kinds()
}

pub fn labels(items: &[&str]) -> Labels {
    items.iter().map(|&s| s.to_owned()).collect()
}
