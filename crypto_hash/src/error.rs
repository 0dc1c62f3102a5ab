use std::{error::Error, fmt::Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashError {
    /// 不支持的哈希算法名
    UnknownAlgorithm(String),
}

impl Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashError::UnknownAlgorithm(s) => {
                f.write_fmt(format_args!("unknown hash algorithm `{s}`"))
            }
        }
    }
}

impl Error for HashError {}
