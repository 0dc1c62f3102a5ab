use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Arithmetic(String),
}
