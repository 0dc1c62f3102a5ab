use crate::{CipherError, Rand};
use group::{DomainParameters, ECPoint, NamedCurve};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use utils::BigUintExt;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PublicKey {
    dp: Arc<DomainParameters>,
    w: ECPoint,
}

/// 构造时即计算公钥`Q = d·G`
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pk: PublicKey,
    d: BigUint,
}

impl PublicKey {
    /// `W`不能是无穷远点且必须在曲线上
    pub fn new(dp: Arc<DomainParameters>, w: ECPoint) -> Result<Self, CipherError> {
        if w.is_infinity() || !dp.is_point_on_curve(&w) {
            return Err(CipherError::InvalidArgument(
                "ec: public point is not on the curve".to_string(),
            ));
        }

        Ok(Self { dp, w })
    }

    /// 从`04 || X || Y`或压缩编码解码
    pub fn from_point_bytes(dp: Arc<DomainParameters>, data: &[u8]) -> Result<Self, CipherError> {
        let w = dp.decode_point(data)?;
        Self::new(dp, w)
    }

    pub fn domain_parameters(&self) -> &Arc<DomainParameters> {
        &self.dp
    }

    pub fn point(&self) -> &ECPoint {
        &self.w
    }

    pub fn to_point_bytes(&self, compressed: bool) -> Result<Vec<u8>, CipherError> {
        Ok(self.dp.encode_point(&self.w, compressed)?)
    }

    pub(super) fn curve_oid(&self) -> Result<&'static str, CipherError> {
        self.dp.oid().ok_or_else(|| {
            CipherError::InvalidArgument("ec: the domain parameters have no identifier".to_string())
        })
    }
}

impl PrivateKey {
    pub fn new(dp: Arc<DomainParameters>, d: BigUint) -> Result<Self, CipherError> {
        if d.is_zero() || &d >= dp.order() {
            return Err(CipherError::InvalidArgument(
                "ec: private scalar must be in [1, n-1]".to_string(),
            ));
        }

        let w = dp.multiply(&d, dp.generator())?;
        let pk = PublicKey::new(dp, w)?;
        Ok(Self { pk, d })
    }

    /// BSI TR-03111 算法2: `c`取bits(n)位随机数, `d = (c mod (n - 1)) + 1`
    pub fn random_scalar<R: Rand>(dp: &DomainParameters, rng: &mut R) -> BigUint {
        let n1 = dp.order() - BigUint::one();
        let c = BigUintExt::<BigUint>::random_bits(dp.order().bits() as usize, rng);
        c % n1 + BigUint::one()
    }

    pub fn generate<R: Rand>(dp: Arc<DomainParameters>, rng: &mut R) -> Result<Self, CipherError> {
        let d = Self::random_scalar(&dp, rng);
        log::debug!("ec: generate key pair on {dp}");
        Self::new(dp, d)
    }

    pub fn generate_on<R: Rand>(curve: NamedCurve, rng: &mut R) -> Result<Self, CipherError> {
        Self::generate(curve.params(), rng)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    pub fn domain_parameters(&self) -> &Arc<DomainParameters> {
        &self.pk.dp
    }

    pub fn scalar(&self) -> &BigUint {
        &self.d
    }

    /// 和对方公钥协商共享秘密, 双方的域参数必须相同
    pub fn ecka(&self, other: &PublicKey) -> Result<Vec<u8>, CipherError> {
        if self.pk.dp != other.dp {
            return Err(CipherError::InvalidArgument(
                "ecka: domain parameters mismatch".to_string(),
            ));
        }

        Ok(self.pk.dp.ecka(&self.d, &other.w)?)
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{curve: {}, W: {}}}", self.dp, self.w)
    }
}

impl Debug for PrivateKey {
    // 不输出私钥标量
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey").field("pk", &self.pk).finish_non_exhaustive()
    }
}
