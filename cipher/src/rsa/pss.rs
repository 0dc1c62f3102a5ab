//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === PSS(Probabilistic Signature Scheme)
//!

use crate::rsa::{mgf1_xor, PublicKey, RsaPrivate};
use crate::{CipherError, Rand, Sign, Verify};
use crypto_hash::HashAlgorithm;
use num_bigint::BigUint;
use std::cell::RefCell;
use std::ops::Range;

#[derive(Clone)]
pub struct PSSVerify {
    key: PublicKey,
    hash: HashAlgorithm,
    // salt len
    slen: usize,
}

pub struct PSSSign<K: RsaPrivate, R: Rand> {
    key: K,
    pss: PSSVerify,
    rng: RefCell<R>,
}

impl<K: RsaPrivate, R: Rand> AsRef<PSSVerify> for PSSSign<K, R> {
    fn as_ref(&self) -> &PSSVerify {
        &self.pss
    }
}

impl PSSVerify {
    /// `salt_len`: salt的字节长度, `None`表示与摘要长度相同
    pub fn new(key: PublicKey, hash: HashAlgorithm, salt_len: Option<usize>) -> Result<Self, CipherError> {
        let (hlen, slen) = (hash.digest_len(), salt_len.unwrap_or(hash.digest_len()));
        let em_len = (key.bits() - 1 + 7) >> 3;
        if em_len < hlen + slen + 2 {
            return Err(CipherError::InvalidArgument(
                "pss: the modulus is too short for the hash and salt length".to_string(),
            ));
        }

        Ok(Self {
            key,
            hash,
            slen,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    pub fn salt_len(&self) -> usize {
        self.slen
    }

    pub fn key_len(&self) -> usize {
        self.key.key_len()
    }

    /// 编码消息的位数
    pub fn em_bits(&self) -> usize {
        self.key.bits() - 1
    }

    pub fn em_len(&self) -> usize {
        (self.em_bits() + 7) >> 3
    }

    // (db_idx, hash_idx)
    fn idx_bound(&self) -> (Range<usize>, Range<usize>) {
        let (em_len, hlen) = (self.em_len(), self.hash.digest_len());
        // em = maskedDB || H || 0xbc
        (0..(em_len - hlen - 1), (em_len - hlen - 1)..(em_len - 1))
    }

    // 最高的`8*emLen - emBits`位
    fn top_mask(&self) -> u8 {
        0xffu8 >> ((self.em_len() << 3) - self.em_bits())
    }

    // H = Hash(0x00 * 8 || Hash(msg) || salt)
    fn m_hash(&self, msg: &[u8], salt: &[u8]) -> Vec<u8> {
        let h_msg = self.hash.digest(msg);
        self.hash.digest_parts(&[&[0u8; 8], &h_msg, salt])
    }

    // em = maskedDB || H || 0xbc
    // db = ps || 0x01 || salt
    // maskedDB = MGF(H, em.len - H.len - 1) ^ db
    fn emsa_pss_encode(&self, msg: &[u8], salt: &[u8]) -> Vec<u8> {
        let (db_idx, h_idx) = self.idx_bound();
        let mut em = vec![0u8; self.em_len()];

        let h = self.m_hash(msg, salt);
        em[h_idx.clone()].copy_from_slice(&h);
        em[h_idx.end] = 0xbc;

        let db = &mut em[db_idx.clone()];
        let salt_start = db.len() - salt.len();
        db[salt_start - 1] = 0x01;
        db[salt_start..].copy_from_slice(salt);
        mgf1_xor(self.hash, &h, db);
        em[0] &= self.top_mask();

        em
    }

    fn emsa_pss_verify(&self, msg: &[u8], em: &mut [u8]) -> bool {
        let (db_idx, h_idx) = self.idx_bound();
        let slen = self.slen;

        if em.len() != self.em_len() || em[em.len() - 1] != 0xbc || em[0] & !self.top_mask() != 0 {
            return false;
        }

        let (db, rest) = em.split_at_mut(db_idx.end);
        let h = &rest[..(h_idx.end - h_idx.start)];
        mgf1_xor(self.hash, h, db);
        db[0] &= self.top_mask();

        let salt_start = db.len() - slen;
        if db[..(salt_start - 1)].iter().any(|&a| a != 0) || db[salt_start - 1] != 0x01 {
            return false;
        }

        let target = self.m_hash(msg, &db[salt_start..]);
        utils::ct_eq(&target, h)
    }
}

impl Verify for PSSVerify {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        let err = || CipherError::ValidateFailed("pss: invalid signature".to_string());
        if sign.len() != self.key_len() {
            return Err(err());
        }

        let m = self
            .key
            .rsavp1(&BigUint::from_bytes_be(sign))
            .map_err(|_| err())?;
        let mut em = utils::i2osp(&m, self.em_len()).ok_or_else(err)?;
        if self.emsa_pss_verify(msg, &mut em) {
            Ok(())
        } else {
            Err(err())
        }
    }
}

impl<K: RsaPrivate, R: Rand> PSSSign<K, R> {
    /// `salt_len`: salt的字节长度, `None`表示与摘要长度相同
    pub fn new(key: K, hash: HashAlgorithm, rng: R, salt_len: Option<usize>) -> Result<Self, CipherError> {
        let pss = PSSVerify::new(key.public_key().clone(), hash, salt_len)?;
        Ok(Self {
            key,
            pss,
            rng: RefCell::new(rng),
        })
    }

    pub fn salt_len(&self) -> usize {
        self.pss.salt_len()
    }

    /// 使用给定的salt签名, 用于复现测试向量
    pub fn sign_with_salt(&self, msg: &[u8], salt: &[u8]) -> Result<Vec<u8>, CipherError> {
        if salt.len() != self.pss.slen {
            return Err(CipherError::InvalidArgument(format!(
                "pss: salt length `{}` should be `{}`",
                salt.len(),
                self.pss.slen
            )));
        }

        let em = self.pss.emsa_pss_encode(msg, salt);
        let s = self.key.rsasp1(&BigUint::from_bytes_be(&em))?;
        utils::i2osp(&s, self.pss.key_len()).ok_or_else(|| {
            CipherError::Arithmetic("pss: signature representative too large".to_string())
        })
    }
}

impl<K: RsaPrivate, R: Rand> Sign for PSSSign<K, R> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        let mut salt = vec![0u8; self.pss.slen];
        self.rng.borrow_mut().rand(&mut salt);
        sign.extend(self.sign_with_salt(msg, &salt)?);
        Ok(())
    }
}

impl<K: RsaPrivate, R: Rand> Verify for PSSSign<K, R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        self.pss.verify(msg, sign)
    }
}

#[cfg(test)]
mod tests {
    use super::{PSSSign, PSSVerify};
    use crate::rsa::{test_keys, CrtPrivateKey, RsaPrivate};
    use crate::{CipherError, DefaultRand, Sign, Verify};
    use crypto_hash::HashAlgorithm;

    #[test]
    fn fixed_salt_vector() {
        let key = test_keys::rsa1024();
        let signer = PSSSign::new(&key, HashAlgorithm::Sha256, DefaultRand::default(), None).unwrap();
        let salt = (1..=32u8).collect::<Vec<_>>();
        let s = signer.sign_with_salt(b"abc", &salt).unwrap();
        assert_eq!(hex::encode(&s), test_keys::PSS_SHA256_SIG);

        signer.verify(b"abc", &s).unwrap();
        assert!(signer.sign_with_salt(b"abc", &salt[1..]).is_err());
    }

    #[test]
    fn round_trip() {
        let mut rng = DefaultRand::default();
        // 模数位长不是8的整数倍时emLen = k - 1
        let keys = [test_keys::rsa1024(), CrtPrivateKey::generate(1023, None, 40, &mut rng).unwrap()];

        for key in keys.iter() {
            for (hash, slen) in [
                (HashAlgorithm::Sha1, None),
                (HashAlgorithm::Sha256, Some(0)),
                (HashAlgorithm::Sha384, Some(20)),
            ] {
                let signer = PSSSign::new(key, hash, DefaultRand::default(), slen).unwrap();
                let verifier = PSSVerify::new(key.public_key().clone(), hash, slen).unwrap();
                let mut s = vec![];
                signer.sign(b"message", &mut s).unwrap();
                assert_eq!(s.len(), key.key_len());
                verifier.verify(b"message", &s).unwrap();

                assert!(verifier.verify(b"Message", &s).is_err());
                let mut bad = s.clone();
                let last = bad.len() - 1;
                bad[last] ^= 1;
                assert!(matches!(verifier.verify(b"message", &bad), Err(CipherError::ValidateFailed(_))));
            }
        }

        // salt太长
        let key = test_keys::rsa1024();
        assert!(PSSVerify::new(key.public_key().clone(), HashAlgorithm::Sha512, Some(64)).is_err());
    }
}
