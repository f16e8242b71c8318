use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid relation name: {0:?}")]
    InvalidRelationName(String),
    #[error("invalid source spec: {0:?}")]
    InvalidSourceSpec(String),
    #[error("file has no usable base name: {0}")]
    NoBaseName(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
