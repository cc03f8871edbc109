use crate::path::PathError;
use crate::transform::TransformError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SvgError {
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("expected an <svg> root element, found <{0}>")]
    NotSvg(String),
    #[error("missing attribute \"{attr}\" on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attr: &'static str,
    },
    #[error("invalid length \"{value}\" for \"{attr}\"")]
    InvalidLength { attr: &'static str, value: String },
    #[error("invalid viewBox \"{0}\"")]
    InvalidViewBox(String),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl From<roxmltree::Error> for SvgError {
    fn from(err: roxmltree::Error) -> Self {
        SvgError::Xml(err.to_string())
    }
}
