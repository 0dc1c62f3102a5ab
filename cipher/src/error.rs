use encode::EncodeError;
use group::GroupError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// 不合法的参数: 长度, 取值范围, 编码格式等
    #[error("{0}")]
    InvalidArgument(String),

    /// 不合法的密钥长度
    #[error("Invalid key size `{real}` not match to target size {target:?}")]
    InvalidKeySize {
        target: &'static [usize],
        real: usize,
    },

    /// 不合法分组大小
    #[error("Invalid block data size `{real}` not match to target size `{target}`")]
    InvalidBlockSize { target: usize, real: usize },

    // 以下三个错误只有固定的消息, 不携带具体失败原因
    #[error("decipher error")]
    DecipherError,

    #[error("decryption error")]
    DecryptionError,

    #[error("tag mismatch")]
    TagMismatch,

    /// 不可逆元素等运算错误
    #[error("{0}")]
    Arithmetic(String),

    #[error("{0}")]
    ValidateFailed(String),
}

impl From<EncodeError> for CipherError {
    fn from(value: EncodeError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<GroupError> for CipherError {
    fn from(value: GroupError) -> Self {
        match value {
            GroupError::InvalidArgument(s) => Self::InvalidArgument(s),
            GroupError::Arithmetic(s) => Self::Arithmetic(s),
        }
    }
}
