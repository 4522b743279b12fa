//! Entry and exit blocks: read and write.

use tracing::info;

use super::Definition;
use crate::operation::OperationKind;
use crate::params::{ParamKind, ParamSet, ParamSpec};
use crate::types::{DynamicImage, OperatorError};

pub(crate) const DEFINITIONS: &[(OperationKind, Definition)] = &[
    (OperationKind::ReadImage, Definition::new(&[], read_image)),
    (OperationKind::WriteImage, Definition::new(WRITE_PARAMS, write_image)),
];

const WRITE_PARAMS: &[ParamSpec] = &[ParamSpec::new("path", ParamKind::Text { default: "" })];

/// The source image enters the chain unchanged.
#[allow(clippy::unnecessary_wraps)]
fn read_image(image: &DynamicImage, _: &ParamSet) -> Result<Option<DynamicImage>, OperatorError> {
    Ok(Some(image.clone()))
}

/// Save to `path` (format from the extension) and pass the image on.
/// An empty path disables writing.
fn write_image(
    image: &DynamicImage,
    params: &ParamSet,
) -> Result<Option<DynamicImage>, OperatorError> {
    let path = params.text("path")?;
    if !path.is_empty() {
        image.save(path)?;
        info!(path, width = image.width(), height = image.height(), "image written");
    }
    Ok(Some(image.clone()))
}
