use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CardError {
    #[error("Invalid hex string `{0}`")]
    InvalidHex(String),

    #[error("The path {0} not exist")]
    PathNotExist(String),

    #[error("Not support the `{0}`")]
    NotSupport(String),

    #[error("{0}")]
    ValidateFailed(String),
}
