//! 点和域元素的字节串编码(SEC 1 2.3, BSI TR-03111 3.1)
//!
//! - 无穷远点: `00`;
//! - 非压缩: `04 || X || Y`;
//! - 压缩: `02 || X`(y为偶数)或`03 || X`(y为奇数), 仅支持`p ≡ 3 mod 4`;

use crate::{DomainParameters, ECPoint, GroupError};
use num_bigint::BigUint;
use utils::{i2osp, os2ip, BigUintExt};

impl DomainParameters {
    /// 域元素编码为L字节大端序, `x >= p`时返回错误
    pub fn fe2os(&self, x: &BigUint) -> Result<Vec<u8>, GroupError> {
        if x >= self.p() {
            return Err(GroupError::InvalidArgument(
                "field element must be less than p".to_string(),
            ));
        }

        i2osp(x, self.field_len()).ok_or_else(|| {
            GroupError::InvalidArgument("field element too large".to_string())
        })
    }

    /// 字节串解码为域元素, 结果模p约化
    pub fn os2fe(&self, x: &[u8]) -> BigUint {
        os2ip(x) % self.p()
    }

    pub fn encode_point(&self, point: &ECPoint, compressed: bool) -> Result<Vec<u8>, GroupError> {
        let ECPoint::Affine { x, y } = point else {
            return Ok(vec![0x00]);
        };

        let l = self.field_len();
        let mut out = Vec::with_capacity(1 + (l << 1));
        if compressed {
            out.push(if y.bit(0) { 0x03 } else { 0x02 });
            out.extend(self.fe2os(x)?);
        } else {
            out.push(0x04);
            out.extend(self.fe2os(x)?);
            out.extend(self.fe2os(y)?);
        }

        Ok(out)
    }

    /// 解码点, 仿射点必须在曲线上
    pub fn decode_point(&self, data: &[u8]) -> Result<ECPoint, GroupError> {
        let err = |s: &str| GroupError::InvalidArgument(format!("point decode: {s}"));
        let l = self.field_len();

        let point = match data.split_first() {
            Some((&0x00, [])) => return Ok(ECPoint::Infinity),
            Some((&0x04, rest)) if rest.len() == (l << 1) => {
                ECPoint::new(self.os2fe(&rest[..l]), self.os2fe(&rest[l..]))
            }
            Some((&(tag @ (0x02 | 0x03)), rest)) if rest.len() == l => {
                if !self.is_p_3mod4() {
                    return Err(err("compressed points need p ≡ 3 mod 4"));
                }

                let x = self.os2fe(rest);
                let y = BigUintExt(self.curve_rhs(&x))
                    .sqrt_mod(self.p())
                    .ok_or_else(|| err("x is not the abscissa of a curve point"))?;
                let y = if y.bit(0) == (tag == 0x03) {
                    y
                } else if y == BigUint::default() {
                    return Err(err("invalid parity for y = 0"));
                } else {
                    self.p() - y
                };

                ECPoint::new(x, y)
            }
            _ => return Err(err("invalid encoding")),
        };

        if self.is_point_on_curve(&point) {
            Ok(point)
        } else {
            Err(err("point is not on the curve"))
        }
    }
}
