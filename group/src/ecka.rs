use crate::{DomainParameters, ECPoint, GroupError};
use num_bigint::BigUint;
use num_traits::Zero;
use utils::BigUintExt;

impl DomainParameters {
    /// BSI TR-03111 4.3.1 ECKA-DH: `l = h⁻¹ mod n`, `Q = [h]([d·l mod n]W)`, 共享秘密是`x_Q`的L字节编码.
    ///
    /// `Q = O`时返回错误.
    pub fn ecka(&self, d: &BigUint, w: &ECPoint) -> Result<Vec<u8>, GroupError> {
        let n = self.order();
        if d.is_zero() || d >= n {
            return Err(GroupError::InvalidArgument(
                "ecka: private scalar must be in [1, n-1]".to_string(),
            ));
        } else if w.is_infinity() || !self.is_point_on_curve(w) {
            return Err(GroupError::InvalidArgument(
                "ecka: public point is not on the curve".to_string(),
            ));
        }

        let l = BigUintExt(self.cofactor())
            .modinv(n)
            .ok_or_else(|| GroupError::Arithmetic("ecka: cofactor is not invertible".to_string()))?;
        let k = d * l % n;
        let q = self.multiply(&k, w)?;
        let q = self.multiply(self.cofactor(), &q)?;

        match q.x() {
            Some(x) => self.fe2os(x),
            None => Err(GroupError::InvalidArgument(
                "ecka: shared point is the point at infinity".to_string(),
            )),
        }
    }
}
