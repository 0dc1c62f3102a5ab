//! BER-TLV编码
//!
//! - ISO/IEC 7816-4 5.2: BER-TLV数据对象, 标签可以是多字节(如`7F49`), 长度字段为DER定长格式;
//! - ITU-T X.690: 密钥格式所用的ASN.1 DER基本类型见`asn1`;
//!
//! 标签首字节的第6位(`0x20`)置位表示构造类型, 其值域由若干子数据对象组成.

mod error;
pub use error::EncodeError;

mod tlv;
pub use tlv::{Tlv, TlvValue};

pub mod asn1;
