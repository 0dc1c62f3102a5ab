use crate::ecc::{PrivateKey, PublicKey, Signature};
use crate::{CipherError, DefaultRand, Rand, Sign, Verify};
use crypto_hash::HashAlgorithm;
use group::DomainParameters;
use num_bigint::BigUint;
use num_traits::Zero;
use std::cell::RefCell;
use utils::BigUintExt;

/// 使用指定随机数源生成nonce的ECDSA签名方
pub struct ECDSA<R: Rand> {
    key: PrivateKey,
    rng: RefCell<R>,
}

/// bits(n) <= 256: SHA-256, <= 384: SHA-384, 否则SHA-512
pub(super) fn hash_algorithm(dp: &DomainParameters) -> HashAlgorithm {
    match dp.order().bits() {
        0..=256 => HashAlgorithm::Sha256,
        257..=384 => HashAlgorithm::Sha384,
        _ => HashAlgorithm::Sha512,
    }
}

// 摘要截取最左边的bits(n)位
fn hash_msg_to_scalar(dp: &DomainParameters, msg: &[u8]) -> BigUint {
    let h = hash_algorithm(dp).digest(msg);
    let (hbits, nbits) = (h.len() << 3, dp.order().bits() as usize);
    let e = utils::os2ip(&h);
    if hbits > nbits {
        e >> (hbits - nbits)
    } else {
        e
    }
}

impl PrivateKey {
    pub fn sign_ecdsa<R: Rand>(&self, msg: &[u8], rng: &mut R) -> Result<Signature, CipherError> {
        let dp = self.domain_parameters();
        let n = dp.order();
        let e = hash_msg_to_scalar(dp, msg);

        loop {
            let k = Self::random_scalar(dp, rng);
            let point = dp.multiply(&k, dp.generator())?;
            let Some(x) = point.x() else {
                log::trace!("ecdsa: k·G is the point at infinity, retry");
                continue;
            };

            let r = x % n;
            if r.is_zero() {
                log::trace!("ecdsa: r = 0, retry");
                continue;
            }

            let k_inv = BigUintExt(&k).modinv(n).ok_or_else(|| {
                CipherError::Arithmetic("ecdsa: nonce is not invertible".to_string())
            })?;
            // k^(-1) * (e + r * d) mod n
            let s = k_inv * ((&e + &r * self.scalar()) % n) % n;
            if s.is_zero() {
                log::trace!("ecdsa: s = 0, retry");
                continue;
            }

            return Ok(Signature::new(r, s));
        }
    }
}

impl PublicKey {
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        hash_algorithm(self.domain_parameters())
    }

    /// BSI TR-03111 4.2.1.2
    pub fn verify_ecdsa(&self, msg: &[u8], sig: &Signature) -> Result<(), CipherError> {
        let err = |s: &str| Err(CipherError::ValidateFailed(format!("ecdsa: {s}")));
        let dp = self.domain_parameters();
        let n = dp.order();
        let (r, s) = (sig.r(), sig.s());

        if r.is_zero() || r >= n || s.is_zero() || s >= n {
            return err("signature component out of range");
        }

        let Some(s_inv) = BigUintExt(s).modinv(n) else {
            return err("signature s is not invertible");
        };
        let e = hash_msg_to_scalar(dp, msg);
        let (u1, u2) = (&e * &s_inv % n, r * &s_inv % n);

        let q = dp.multiply_add(&u1, dp.generator(), &u2, self.point())?;
        match q.x() {
            Some(x) if &(x % n) == r => Ok(()),
            Some(_) => err("invalid signature"),
            None => err("u1·G + u2·W is the point at infinity"),
        }
    }
}

impl Sign for PrivateKey {
    /// `R || S`, 各`τ`字节
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        let sig = self.sign_ecdsa(msg, &mut DefaultRand::default())?;
        sign.extend(sig.to_bytes(self.domain_parameters().order_len())?);
        Ok(())
    }
}

impl Verify for PublicKey {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        let sig = Signature::from_bytes(sign, self.domain_parameters().order_len())
            .map_err(|e| CipherError::ValidateFailed(e.to_string()))?;
        self.verify_ecdsa(msg, &sig)
    }
}

impl Verify for PrivateKey {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        self.public_key().verify(msg, sign)
    }
}

impl<R: Rand> ECDSA<R> {
    pub fn new(key: PrivateKey, rng: R) -> Self {
        Self {
            key,
            rng: RefCell::new(rng),
        }
    }

    pub fn auto_generate_key(curve: group::NamedCurve, mut rng: R) -> Result<Self, CipherError> {
        let key = PrivateKey::generate_on(curve, &mut rng)?;
        Ok(Self::new(key, rng))
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn sign_signature(&self, msg: &[u8]) -> Result<Signature, CipherError> {
        self.key.sign_ecdsa(msg, &mut *self.rng.borrow_mut())
    }
}

impl<R: Rand> Sign for ECDSA<R> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        let sig = self.sign_signature(msg)?;
        sign.extend(sig.to_bytes(self.key.domain_parameters().order_len())?);
        Ok(())
    }
}

impl<R: Rand> Verify for ECDSA<R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        self.key.public_key().verify(msg, sign)
    }
}
