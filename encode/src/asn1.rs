//! ASN.1 DER基本类型
//!
//! 密钥格式(PKCS #1, PKCS #8, X.509 SubjectPublicKeyInfo, RFC 5915 ECPrivateKey)只用到
//! INTEGER, BIT STRING, OCTET STRING, NULL, OBJECT IDENTIFIER和SEQUENCE.

use crate::{EncodeError, Tlv};
use num_bigint::BigUint;

pub const INTEGER: u32 = 0x02;
pub const BIT_STRING: u32 = 0x03;
pub const OCTET_STRING: u32 = 0x04;
pub const NULL: u32 = 0x05;
pub const OBJECT_IDENTIFIER: u32 = 0x06;
pub const SEQUENCE: u32 = 0x30;

/// 非负整数的DER INTEGER编码: 最短补码, 最高位为1时前补`0x00`
pub fn integer(x: &BigUint) -> Tlv {
    let mut v = x.to_bytes_be();
    if v[0] & 0x80 != 0 {
        v.insert(0, 0);
    }
    Tlv::primitive(INTEGER, v)
}

/// 解码非负DER INTEGER, 负数返回错误
pub fn to_integer(tlv: &Tlv) -> Result<BigUint, EncodeError> {
    let v = tlv.expect_tag(INTEGER)?.primitive_value()?;
    match v.first() {
        None => Err(EncodeError::InvalidInteger),
        Some(&b) if b & 0x80 != 0 => Err(EncodeError::InvalidInteger),
        Some(_) => Ok(BigUint::from_bytes_be(v)),
    }
}

pub fn small_integer(x: u64) -> Tlv {
    integer(&BigUint::from(x))
}

/// 解码并检查INTEGER等于`expect`(如版本号)
pub fn expect_integer(tlv: &Tlv, expect: u64) -> Result<(), EncodeError> {
    if to_integer(tlv)? == BigUint::from(expect) {
        Ok(())
    } else {
        Err(EncodeError::InvalidInteger)
    }
}

pub fn octet_string(v: impl Into<Vec<u8>>) -> Tlv {
    Tlv::primitive(OCTET_STRING, v)
}

pub fn to_octet_string(tlv: &Tlv) -> Result<&[u8], EncodeError> {
    tlv.expect_tag(OCTET_STRING)?.primitive_value()
}

/// 未使用位数为0的BIT STRING
pub fn bit_string(v: &[u8]) -> Tlv {
    let mut b = Vec::with_capacity(v.len() + 1);
    b.push(0);
    b.extend_from_slice(v);
    Tlv::primitive(BIT_STRING, b)
}

pub fn to_bit_string(tlv: &Tlv) -> Result<&[u8], EncodeError> {
    let v = tlv.expect_tag(BIT_STRING)?.primitive_value()?;
    match v.split_first() {
        Some((&0, rest)) => Ok(rest),
        _ => Err(EncodeError::InvalidBitString),
    }
}

pub fn null() -> Tlv {
    Tlv::primitive(NULL, vec![])
}

pub fn sequence(children: Vec<Tlv>) -> Tlv {
    Tlv::constructed(SEQUENCE, children)
}

/// 检查是SEQUENCE且至少有`min`个元素
pub fn to_sequence(tlv: &Tlv, min: usize) -> Result<&[Tlv], EncodeError> {
    let c = tlv.expect_tag(SEQUENCE)?.children()?;
    if c.len() < min {
        Err(EncodeError::MissingTag(SEQUENCE))
    } else {
        Ok(c)
    }
}

/// 点分十进制形式的OID, 如`1.2.840.10045.2.1`
pub fn oid(dotted: &str) -> Result<Tlv, EncodeError> {
    let err = || EncodeError::InvalidOid(dotted.to_string());
    let arcs = dotted
        .split('.')
        .map(|x| x.parse::<u64>().map_err(|_| err()))
        .collect::<Result<Vec<_>, _>>()?;

    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return Err(err());
    }

    let mut v = Vec::new();
    let first = arcs[0]
        .checked_mul(40)
        .and_then(|x| x.checked_add(arcs[1]))
        .ok_or_else(err)?;
    for arc in std::iter::once(first).chain(arcs.into_iter().skip(2)) {
        // base-128, 除最后一个字节外最高位置1
        let mut tmp = vec![(arc & 0x7f) as u8];
        let mut x = arc >> 7;
        while x != 0 {
            tmp.push(0x80 | (x & 0x7f) as u8);
            x >>= 7;
        }
        v.extend(tmp.into_iter().rev());
    }

    Ok(Tlv::primitive(OBJECT_IDENTIFIER, v))
}

pub fn to_oid(tlv: &Tlv) -> Result<String, EncodeError> {
    let v = tlv.expect_tag(OBJECT_IDENTIFIER)?.primitive_value()?;
    let err = || EncodeError::InvalidOid(format!("{v:02x?}"));
    if v.is_empty() || v.last().is_some_and(|&x| x & 0x80 != 0) {
        return Err(err());
    }

    let (mut arcs, mut x) = (Vec::new(), 0u64);
    for &b in v {
        if x.leading_zeros() < 7 {
            return Err(err());
        }
        x = (x << 7) | (b & 0x7f) as u64;
        if b & 0x80 == 0 {
            arcs.push(x);
            x = 0;
        }
    }

    let first = arcs[0];
    let (a0, a1) = match first {
        0..=39 => (0, first),
        40..=79 => (1, first - 40),
        _ => (2, first - 80),
    };

    let mut s = format!("{a0}.{a1}");
    for arc in arcs.iter().skip(1) {
        s.push('.');
        s.push_str(&arc.to_string());
    }
    Ok(s)
}

/// 检查OID等于`dotted`
pub fn expect_oid(tlv: &Tlv, dotted: &str) -> Result<(), EncodeError> {
    let s = to_oid(tlv)?;
    if s == dotted {
        Ok(())
    } else {
        Err(EncodeError::InvalidOid(s))
    }
}
