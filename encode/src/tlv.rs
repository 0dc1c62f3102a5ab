use crate::EncodeError;

/// BER-TLV数据对象
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tlv {
    tag: u32,
    value: TlvValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TlvValue {
    Primitive(Vec<u8>),
    Constructed(Vec<Tlv>),
}

impl Tlv {
    pub fn primitive(tag: u32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            value: TlvValue::Primitive(value.into()),
        }
    }

    pub fn constructed(tag: u32, children: Vec<Tlv>) -> Self {
        Self {
            tag,
            value: TlvValue::Constructed(children),
        }
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self.value, TlvValue::Constructed(_))
    }

    pub fn value(&self) -> &TlvValue {
        &self.value
    }

    /// 基本类型数据对象的值域
    pub fn primitive_value(&self) -> Result<&[u8], EncodeError> {
        match &self.value {
            TlvValue::Primitive(v) => Ok(v.as_slice()),
            TlvValue::Constructed(_) => Err(EncodeError::NotPrimitive(self.tag)),
        }
    }

    pub fn children(&self) -> Result<&[Tlv], EncodeError> {
        match &self.value {
            TlvValue::Constructed(c) => Ok(c.as_slice()),
            TlvValue::Primitive(_) => Err(EncodeError::NotConstructed(self.tag)),
        }
    }

    /// 第一个标签为`tag`的子数据对象
    pub fn child(&self, tag: u32) -> Result<&Tlv, EncodeError> {
        self.children()?
            .iter()
            .find(|x| x.tag == tag)
            .ok_or(EncodeError::MissingTag(tag))
    }

    /// 标签不是`tag`时返回错误
    pub fn expect_tag(&self, tag: u32) -> Result<&Self, EncodeError> {
        if self.tag == tag {
            Ok(self)
        } else {
            Err(EncodeError::UnexpectedTag {
                expect: tag,
                real: self.tag,
            })
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        let tag = self.tag.to_be_bytes();
        let skip = tag.iter().take_while(|&&x| x == 0).count().min(3);
        out.extend_from_slice(&tag[skip..]);

        match &self.value {
            TlvValue::Primitive(v) => {
                Self::write_len(v.len(), out);
                out.extend_from_slice(v);
            }
            TlvValue::Constructed(children) => {
                let mut buf = Vec::new();
                for c in children {
                    c.write_to(&mut buf);
                }
                Self::write_len(buf.len(), out);
                out.append(&mut buf);
            }
        }
    }

    fn write_len(len: usize, out: &mut Vec<u8>) {
        if len < 0x80 {
            out.push(len as u8);
        } else {
            let b = (len as u64).to_be_bytes();
            let skip = b.iter().take_while(|&&x| x == 0).count();
            out.push(0x80 | (b.len() - skip) as u8);
            out.extend_from_slice(&b[skip..]);
        }
    }

    /// 解码恰好一个数据对象, 之后不能有多余字节
    pub fn from_bytes(data: &[u8]) -> Result<Self, EncodeError> {
        let (tlv, len) = Self::parse(data)?;
        if len != data.len() {
            Err(EncodeError::TrailingBytes(data.len() - len))
        } else {
            Ok(tlv)
        }
    }

    /// 构造类型数据对象的最大嵌套层数
    pub const MAX_DEPTH: usize = 32;

    /// 从`data`头部解码一个数据对象, 返回该对象及其占用的字节数
    pub fn parse(data: &[u8]) -> Result<(Self, usize), EncodeError> {
        Self::parse_nested(data, 1)
    }

    fn parse_nested(data: &[u8], depth: usize) -> Result<(Self, usize), EncodeError> {
        if depth > Self::MAX_DEPTH {
            return Err(EncodeError::TooDeep(Self::MAX_DEPTH));
        }

        let (tag, mut idx) = Self::parse_tag(data)?;
        let (len, n) = Self::parse_len(&data[idx..])?;
        idx += n;

        let real = data.len() - idx;
        if len > real {
            return Err(EncodeError::Truncated { need: len, real });
        }
        let value = &data[idx..(idx + len)];

        // 标签首字节0x20位表示构造类型
        let tlv = if (tag >> ((Self::tag_len(tag) - 1) * 8)) & 0x20 != 0 {
            let (mut children, mut pos) = (Vec::new(), 0);
            while pos < value.len() {
                let (c, n) = Self::parse_nested(&value[pos..], depth + 1)?;
                children.push(c);
                pos += n;
            }
            Self::constructed(tag, children)
        } else {
            Self::primitive(tag, value)
        };

        Ok((tlv, idx + len))
    }

    fn tag_len(tag: u32) -> usize {
        (4 - (tag.leading_zeros() as usize >> 3)).max(1)
    }

    fn parse_tag(data: &[u8]) -> Result<(u32, usize), EncodeError> {
        let first = *data
            .first()
            .ok_or(EncodeError::Truncated { need: 1, real: 0 })?;
        if first == 0x00 || first == 0xff {
            return Err(EncodeError::InvalidTag(first as u32));
        }

        let mut tag = first as u32;
        if first & 0x1f != 0x1f {
            return Ok((tag, 1));
        }

        // 多字节标签, 后续字节最高位为1表示还有下一个字节
        for (i, &b) in data.iter().enumerate().skip(1) {
            if i > 3 {
                return Err(EncodeError::InvalidTag(tag));
            }
            tag = (tag << 8) | b as u32;
            if b & 0x80 == 0 {
                return Ok((tag, i + 1));
            }
        }

        Err(EncodeError::Truncated {
            need: data.len() + 1,
            real: data.len(),
        })
    }

    fn parse_len(data: &[u8]) -> Result<(usize, usize), EncodeError> {
        let first = *data
            .first()
            .ok_or(EncodeError::Truncated { need: 1, real: 0 })?;
        if first < 0x80 {
            return Ok((first as usize, 1));
        }

        // 0x80是不定长格式, 这里只支持至多4字节的定长格式
        let n = (first & 0x7f) as usize;
        if n == 0 || n > 4 {
            return Err(EncodeError::InvalidLength(first));
        } else if data.len() < n + 1 {
            return Err(EncodeError::Truncated {
                need: n + 1,
                real: data.len(),
            });
        }

        let len = data[1..=n]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        Ok((len, n + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::{Tlv, TlvValue};
    use crate::EncodeError;

    #[test]
    fn nested_multi_byte_tag() {
        let point = vec![0x04u8; 65];
        let tlv = Tlv::constructed(
            0x7f49,
            vec![
                Tlv::primitive(0x06, vec![0x2b, 0x24, 0x03]),
                Tlv::primitive(0x86, point.clone()),
            ],
        );

        let bytes = tlv.to_bytes();
        assert_eq!(&bytes[..3], &[0x7f, 0x49, 0x48]);
        assert_eq!(&bytes[3..8], &[0x06, 0x03, 0x2b, 0x24, 0x03]);
        assert_eq!(&bytes[8..10], &[0x86, 0x41]);

        let decoded = Tlv::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, tlv);
        assert_eq!(decoded.child(0x86).unwrap().primitive_value().unwrap(), point);
        assert_eq!(decoded.child(0x87), Err(EncodeError::MissingTag(0x87)));
    }

    #[test]
    fn long_length() {
        let v = vec![0xabu8; 300];
        let bytes = Tlv::primitive(0x04, v.clone()).to_bytes();
        assert_eq!(&bytes[..4], &[0x04, 0x82, 0x01, 0x2c]);
        let tlv = Tlv::from_bytes(&bytes).unwrap();
        assert_eq!(tlv.value(), &TlvValue::Primitive(v));

        let bytes = Tlv::primitive(0x04, vec![0u8; 0x80]).to_bytes();
        assert_eq!(&bytes[..3], &[0x04, 0x81, 0x80]);
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            Tlv::from_bytes(&[0x04, 0x05, 0x01]),
            Err(EncodeError::Truncated { need: 5, real: 1 })
        ));
        assert_eq!(
            Tlv::from_bytes(&[0x04, 0x01, 0x01, 0x00]),
            Err(EncodeError::TrailingBytes(1))
        );
        assert_eq!(
            Tlv::from_bytes(&[0x30, 0x80, 0x00, 0x00]),
            Err(EncodeError::InvalidLength(0x80))
        );
        assert!(Tlv::from_bytes(&[0x7f]).is_err());
        assert!(Tlv::from_bytes(&[]).is_err());
        // 子对象长度越界
        assert!(Tlv::from_bytes(&[0x30, 0x03, 0x04, 0x05, 0x00]).is_err());
    }

    #[test]
    fn nesting_limit() {
        // 每层`a6 84 <4字节长度>`, 最内层为空的a6
        let nested = |levels: usize| {
            let mut v = Vec::with_capacity(levels * 6);
            for i in 1..levels {
                v.extend([0xa6, 0x84]);
                v.extend((((levels - i) * 6 - 4) as u32).to_be_bytes());
            }
            v.extend([0xa6, 0x00]);
            v
        };

        let ok = Tlv::from_bytes(&nested(Tlv::MAX_DEPTH)).unwrap();
        assert_eq!(ok.tag(), 0xa6);
        assert_eq!(
            Tlv::from_bytes(&nested(Tlv::MAX_DEPTH + 1)),
            Err(EncodeError::TooDeep(Tlv::MAX_DEPTH))
        );
        assert_eq!(
            Tlv::from_bytes(&nested(200_000)),
            Err(EncodeError::TooDeep(Tlv::MAX_DEPTH))
        );
    }

    #[test]
    fn cryptogram_layout() {
        let bytes = hex::decode("a60d06012a7f49038601048e020102").unwrap();
        let tlv = Tlv::from_bytes(&bytes).unwrap();
        assert_eq!(tlv.tag(), 0xa6);
        let pk = tlv.child(0x7f49).unwrap();
        assert!(pk.is_constructed());
        assert_eq!(pk.child(0x86).unwrap().primitive_value().unwrap(), &[0x04]);
        assert_eq!(tlv.child(0x8e).unwrap().primitive_value().unwrap(), &[1, 2]);
        assert_eq!(tlv.to_bytes(), bytes);
    }
}
