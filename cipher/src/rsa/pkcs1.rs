//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === PKCS1(Public Key Cryptography Standards v1.5)
//!
//! - 加密: `EM = 0x00 || 0x02 || PS || 0x00 || M`, PS为至少8字节的非零随机数;
//! - 签名: `EM = 0x00 || 0x01 || 0xff..0xff || 0x00 || DigestInfo`;
//!

use crate::rsa::{PublicKey, RsaPrivate};
use crate::{CipherError, Decrypt, Encrypt, Rand, Sign, Verify};
use crypto_hash::HashAlgorithm;
use num_bigint::BigUint;
use std::cell::RefCell;

pub struct PKCS1Encrypt<R: Rand> {
    key: PublicKey,
    rng: RefCell<R>,
}

pub struct PKCS1Decrypt<K: RsaPrivate> {
    key: K,
}

pub struct PKCS1Sign<K: RsaPrivate> {
    key: K,
    hash: HashAlgorithm,
}

#[derive(Clone)]
pub struct PKCS1Verify {
    key: PublicKey,
    hash: HashAlgorithm,
}

impl<R: Rand> PKCS1Encrypt<R> {
    pub fn new(key: PublicKey, rng: R) -> Result<Self, CipherError> {
        if key.key_len() <= 11 {
            return Err(CipherError::InvalidArgument(
                "pkcs1: the public key is too short".to_string(),
            ));
        }

        Ok(Self {
            key,
            rng: RefCell::new(rng),
        })
    }

    /// `k - 11`
    pub fn max_msg_len(&self) -> usize {
        self.key.key_len() - 11
    }
}

impl<R: Rand> Encrypt for PKCS1Encrypt<R> {
    fn encrypt(&self, msg: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        let klen = self.key.key_len();
        if msg.len() > self.max_msg_len() {
            return Err(CipherError::InvalidArgument(
                "pkcs1: message too long".to_string(),
            ));
        }

        let mut em = vec![0u8; klen];
        em[1] = 0x02;
        let ps_end = klen - msg.len() - 1;
        let mut rng = self.rng.borrow_mut();
        for x in em[2..ps_end].iter_mut() {
            while *x == 0 {
                rng.rand(std::slice::from_mut(x));
            }
        }
        em[(ps_end + 1)..].copy_from_slice(msg);

        let c = self.key.rsaep(&BigUint::from_bytes_be(&em))?;
        ciphertext.extend(utils::i2osp(&c, klen).ok_or_else(|| {
            CipherError::Arithmetic("pkcs1: ciphertext representative too large".to_string())
        })?);
        Ok(())
    }
}

impl<K: RsaPrivate> PKCS1Decrypt<K> {
    pub fn new(key: K) -> Result<Self, CipherError> {
        if key.key_len() <= 11 {
            return Err(CipherError::InvalidArgument(
                "pkcs1: the private key is too short".to_string(),
            ));
        }
        Ok(Self { key })
    }
}

impl<K: RsaPrivate> Decrypt for PKCS1Decrypt<K> {
    fn decrypt(&self, ciphertext: &[u8], msg: &mut Vec<u8>) -> Result<(), CipherError> {
        let klen = self.key.key_len();
        if ciphertext.len() != klen {
            return Err(CipherError::DecryptionError);
        }

        let m = self
            .key
            .rsadp(&BigUint::from_bytes_be(ciphertext))
            .map_err(|_| CipherError::DecryptionError)?;
        let em = utils::i2osp(&m, klen).ok_or(CipherError::DecryptionError)?;

        // 所有字节都检查完再判断
        let mut bad = em[0] | (em[1] ^ 0x02);
        let (mut found, mut idx) = (0u8, 0usize);
        for (i, &b) in em.iter().enumerate().skip(2) {
            let first = ((b == 0) as u8) & (found ^ 1);
            idx |= i & (0usize.wrapping_sub(first as usize));
            found |= first;
        }
        // PS至少8字节
        bad |= (found ^ 1) | ((idx < 10) as u8);

        if bad != 0 {
            return Err(CipherError::DecryptionError);
        }

        msg.extend_from_slice(&em[(idx + 1)..]);
        Ok(())
    }
}

/// EMSA-PKCS1-v1_5编码
fn emsa_pkcs1_encode(hash: HashAlgorithm, msg: &[u8], klen: usize) -> Result<Vec<u8>, CipherError> {
    let prefix = hash.digest_info_prefix();
    let tlen = prefix.len() + hash.digest_len();
    if klen < tlen + 11 {
        return Err(CipherError::InvalidArgument(format!(
            "pkcs1: the modulus is too short for {hash}"
        )));
    }

    let mut em = vec![0xffu8; klen];
    em[0] = 0x00;
    em[1] = 0x01;
    em[klen - tlen - 1] = 0x00;
    em[(klen - tlen)..(klen - hash.digest_len())].copy_from_slice(prefix);
    em[(klen - hash.digest_len())..].copy_from_slice(&hash.digest(msg));
    Ok(em)
}

impl<K: RsaPrivate> PKCS1Sign<K> {
    pub fn new(key: K, hash: HashAlgorithm) -> Result<Self, CipherError> {
        emsa_pkcs1_encode(hash, &[], key.key_len())?;
        Ok(Self { key, hash })
    }

    pub fn private_key(&self) -> &K {
        &self.key
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }
}

impl<K: RsaPrivate> Sign for PKCS1Sign<K> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        let klen = self.key.key_len();
        let em = emsa_pkcs1_encode(self.hash, msg, klen)?;
        let s = self.key.rsasp1(&BigUint::from_bytes_be(&em))?;
        sign.extend(utils::i2osp(&s, klen).ok_or_else(|| {
            CipherError::Arithmetic("pkcs1: signature representative too large".to_string())
        })?);
        Ok(())
    }
}

impl PKCS1Verify {
    pub fn new(key: PublicKey, hash: HashAlgorithm) -> Result<Self, CipherError> {
        emsa_pkcs1_encode(hash, &[], key.key_len())?;
        Ok(Self { key, hash })
    }
}

impl Verify for PKCS1Verify {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        let err = || CipherError::ValidateFailed("pkcs1: invalid signature".to_string());
        let klen = self.key.key_len();
        if sign.len() != klen {
            return Err(err());
        }

        let m = self
            .key
            .rsavp1(&BigUint::from_bytes_be(sign))
            .map_err(|_| err())?;
        let em = utils::i2osp(&m, klen).ok_or_else(err)?;
        let target = emsa_pkcs1_encode(self.hash, msg, klen)?;

        if utils::ct_eq(&em, &target) {
            Ok(())
        } else {
            Err(err())
        }
    }
}
