//! 参考RFC 8017 3.1, 3.2, 5.1
use crate::CipherError;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    // n = p * q
    n: BigUint,
    // public exponent, gcd(e, (p-1)(q-1)) = 1
    e: BigUint,
}

/// 普通私钥`(n, e, d)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    pk: PublicKey,
    // d * e = 1 % lambda(n)
    d: BigUint,
}

/// CRT私钥`(n, e, d, p, q, dP, dQ, qInv)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrtPrivateKey {
    pk: PublicKey,
    d: BigUint,
    p: BigUint,
    q: BigUint,
    // $e \cdot d_p \equiv 1 \mod (p-1)$
    dp: BigUint,
    // $e \cdot d_q \equiv 1 \mod (q-1)$
    dq: BigUint,
    // $q \cdot q_inv \equiv 1 \mod p$
    qinv: BigUint,
}

/// RSA私钥运算, 普通私钥和CRT私钥的计算结果相同
pub trait RsaPrivate {
    fn public_key(&self) -> &PublicKey;

    fn private_exponent(&self) -> &BigUint;

    /// RSADP: `c^d mod n`, 要求`c < n`
    fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError>;

    /// RSASP1与RSADP相同
    fn rsasp1(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        self.rsadp(m)
    }

    fn key_len(&self) -> usize {
        self.public_key().key_len()
    }
}

impl PublicKey {
    /// `n`是大于1的奇数, `1 < e < n`
    pub fn new(n: BigUint, e: BigUint) -> Result<Self, CipherError> {
        if n <= BigUint::one() || !n.bit(0) {
            Err(CipherError::InvalidArgument(
                "rsa: modulus must be an odd integer greater than 1".to_string(),
            ))
        } else if e <= BigUint::one() || e >= n {
            Err(CipherError::InvalidArgument(format!(
                "rsa: public exponent {e:#x} out of range"
            )))
        } else {
            Ok(Self { n, e })
        }
    }

    /// note: not to check the `n` and `e` are right RSA parameters
    pub fn new_uncheck(n: BigUint, e: BigUint) -> Self {
        Self { n, e }
    }

    /// n
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// 模数的位长
    pub fn bits(&self) -> usize {
        self.n.bits() as usize
    }

    /// 模数的字节长度`k`
    pub fn key_len(&self) -> usize {
        (self.bits() + 7) >> 3
    }

    /// RSAEP: RSA Encrypt primitive
    pub fn rsaep(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        if m < &self.n {
            Ok(m.modpow(&self.e, &self.n))
        } else {
            Err(CipherError::InvalidArgument(
                "rsaep: message representative out of range".to_string(),
            ))
        }
    }

    /// RSAVP1与RSAEP相同
    pub fn rsavp1(&self, s: &BigUint) -> Result<BigUint, CipherError> {
        self.rsaep(s)
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "rsa-{} {{e: {:#x}, n: {:#x}}}", self.bits(), self.e, self.n)
    }
}

fn check_private_exponent(pk: &PublicKey, d: &BigUint) -> Result<(), CipherError> {
    if d.is_zero() || d >= &pk.n {
        Err(CipherError::InvalidArgument(
            "rsa: private exponent out of range".to_string(),
        ))
    } else {
        Ok(())
    }
}

impl PrivateKey {
    pub fn new(n: BigUint, e: BigUint, d: BigUint) -> Result<Self, CipherError> {
        let pk = PublicKey::new(n, e)?;
        check_private_exponent(&pk, &d)?;
        Ok(Self { pk, d })
    }

    pub fn new_uncheck(n: BigUint, e: BigUint, d: BigUint) -> Self {
        Self {
            pk: PublicKey::new_uncheck(n, e),
            d,
        }
    }
}

impl RsaPrivate for PrivateKey {
    fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        if c < &self.pk.n {
            Ok(c.modpow(&self.d, &self.pk.n))
        } else {
            Err(CipherError::InvalidArgument(
                "rsadp: ciphertext representative out of range".to_string(),
            ))
        }
    }
}

impl CrtPrivateKey {
    // 模数不小于该位长时并行计算两个半长的模幂
    const PARALLEL_BITS: usize = 2048;

    /// 由全部分量构造, 只检查`n = p·q`和各分量的取值范围; 一致性检查见`check`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        dp: BigUint,
        dq: BigUint,
        qinv: BigUint,
    ) -> Result<Self, CipherError> {
        let pk = PublicKey::new(n, e)?;
        check_private_exponent(&pk, &d)?;
        if p <= BigUint::one() || q <= BigUint::one() || &p * &q != pk.n {
            return Err(CipherError::InvalidArgument(
                "rsa: modulus is not the product of p and q".to_string(),
            ));
        } else if dp >= p || dq >= q || qinv >= p {
            return Err(CipherError::InvalidArgument(
                "rsa: CRT component out of range".to_string(),
            ));
        }

        Ok(Self {
            pk,
            d,
            p,
            q,
            dp,
            dq,
            qinv,
        })
    }

    pub(super) fn new_uncheck(
        pk: PublicKey,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        dp: BigUint,
        dq: BigUint,
        qinv: BigUint,
    ) -> Self {
        Self {
            pk,
            d,
            p,
            q,
            dp,
            dq,
            qinv,
        }
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// d mod (p-1)
    pub fn dp(&self) -> &BigUint {
        &self.dp
    }

    /// d mod (q-1)
    pub fn dq(&self) -> &BigUint {
        &self.dq
    }

    /// q^{-1} mod p
    pub fn qinv(&self) -> &BigUint {
        &self.qinv
    }

    /// 去掉CRT分量
    pub fn to_plain(&self) -> PrivateKey {
        PrivateKey {
            pk: self.pk.clone(),
            d: self.d.clone(),
        }
    }

    // m1 = c^{dp} mod p, m2 = c^{dq} mod q
    // h = (m1 - m2) * qinv % p
    // m = m2 + q * h
    fn rsadp_crt(&self, c: &BigUint) -> BigUint {
        let m1 = || c.modpow(&self.dp, &self.p);
        let m2 = || c.modpow(&self.dq, &self.q);
        let (m1, m2) = if self.pk.bits() >= Self::PARALLEL_BITS {
            rayon::join(m1, m2)
        } else {
            (m1(), m2())
        };

        let p = &self.p;
        let diff = (m1 + p - &m2 % p) % p;
        let h = diff * &self.qinv % p;
        m2 + h * &self.q
    }
}

impl RsaPrivate for CrtPrivateKey {
    fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        if c < &self.pk.n {
            Ok(self.rsadp_crt(c))
        } else {
            Err(CipherError::InvalidArgument(
                "rsadp: ciphertext representative out of range".to_string(),
            ))
        }
    }
}

impl<T: RsaPrivate> RsaPrivate for &T {
    fn public_key(&self) -> &PublicKey {
        (**self).public_key()
    }

    fn private_exponent(&self) -> &BigUint {
        (**self).private_exponent()
    }

    fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        (**self).rsadp(c)
    }
}
