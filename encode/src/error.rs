use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// 数据不足, 需要`need`字节, 实际剩余`real`字节
    Truncated { need: usize, real: usize },
    /// 不合法的标签字段
    InvalidTag(u32),
    /// 不支持或不合法的长度字段
    InvalidLength(u8),
    UnexpectedTag { expect: u32, real: u32 },
    /// 构造类型数据对象中缺少子对象
    MissingTag(u32),
    /// 数据对象之后还有多余的字节
    TrailingBytes(usize),
    NotPrimitive(u32),
    NotConstructed(u32),
    InvalidOid(String),
    InvalidInteger,
    InvalidBitString,
    /// 构造类型嵌套超过上限
    TooDeep(usize),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { need, real } => f.write_fmt(format_args!(
                "Truncated data object, need `{need}` bytes but only `{real}` bytes left"
            )),
            Self::InvalidTag(tag) => f.write_fmt(format_args!("Invalid tag `{tag:#x}`")),
            Self::InvalidLength(b) => f.write_fmt(format_args!("Invalid length field `{b:#04x}`")),
            Self::UnexpectedTag { expect, real } => f.write_fmt(format_args!(
                "Unexpected tag `{real:#x}`, it should be `{expect:#x}`"
            )),
            Self::MissingTag(tag) => f.write_fmt(format_args!("Missing data object `{tag:#x}`")),
            Self::TrailingBytes(n) => {
                f.write_fmt(format_args!("`{n}` trailing bytes after the data object"))
            }
            Self::NotPrimitive(tag) => {
                f.write_fmt(format_args!("Data object `{tag:#x}` is not primitive"))
            }
            Self::NotConstructed(tag) => {
                f.write_fmt(format_args!("Data object `{tag:#x}` is not constructed"))
            }
            Self::InvalidOid(s) => f.write_fmt(format_args!("Invalid object identifier `{s}`")),
            Self::InvalidInteger => f.write_str("Invalid DER INTEGER"),
            Self::InvalidBitString => f.write_str("Invalid DER BIT STRING"),
            Self::TooDeep(n) => {
                f.write_fmt(format_args!("Data objects nested deeper than `{n}` levels"))
            }
        }
    }
}

impl std::error::Error for EncodeError {}
