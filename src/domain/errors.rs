// src/domain/errors.rs
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid mapping on `{type_name}.{field}`: {reason}")]
    InvalidMapping {
        type_name: String,
        field: String,
        reason: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn invalid_mapping(
        type_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidMapping {
            type_name: type_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
