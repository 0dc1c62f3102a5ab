//! IntegerCodec: 非负整数与定长大端字节串互转(PKCS #1 I2OSP/OS2IP)

use num_bigint::BigUint;

/// 把`x`编码为`len`字节的大端字节串, 高位补0. <br>
/// `x >= 256^len`时返回`None`.
pub fn i2osp(x: &BigUint, len: usize) -> Option<Vec<u8>> {
    if x.bits() > (len as u64) << 3 {
        return None;
    }

    let bytes = x.to_bytes_be();
    // 0的to_bytes_be是[0]
    let b = &bytes[bytes.len().saturating_sub(len)..];
    let mut out = vec![0u8; len];
    out[len - b.len()..].copy_from_slice(b);
    Some(out)
}

pub fn os2ip(x: &[u8]) -> BigUint {
    BigUint::from_bytes_be(x)
}

/// 长度不同直接返回false, 长度相同时比较耗时与内容无关
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::{ct_eq, i2osp, os2ip};
    use num_bigint::BigUint;

    #[test]
    fn fixed_length() {
        let x = BigUint::from(0x0102u32);
        assert_eq!(i2osp(&x, 4), Some(vec![0, 0, 1, 2]));
        assert_eq!(i2osp(&x, 2), Some(vec![1, 2]));
        assert_eq!(i2osp(&x, 1), None);
        assert_eq!(i2osp(&BigUint::default(), 3), Some(vec![0, 0, 0]));
        assert_eq!(i2osp(&BigUint::default(), 0), Some(vec![]));
        assert_eq!(os2ip(&[0, 0, 1, 2]), x);
    }

    #[test]
    fn compare() {
        assert!(ct_eq(b"abc", b"abc"));
        assert!(!ct_eq(b"abc", b"abd"));
        assert!(!ct_eq(b"abc", b"ab"));
        assert!(ct_eq(b"", b""));
    }
}
