//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === OAEP(Optimal Asymmetric Encryption Padding)
//!
//! `EM = 0x00 || maskedSeed || maskedDB`, `DB = lHash || PS || 0x01 || M`
//!

use crate::rsa::{mgf1_xor, PublicKey, RsaPrivate};
use crate::{CipherError, Decrypt, Encrypt, Rand};
use crypto_hash::HashAlgorithm;
use num_bigint::BigUint;
use std::cell::RefCell;

/// Optimal Asymmetric Encryption Padding
pub struct OAEPEncrypt<R: Rand> {
    key: PublicKey,
    hash: HashAlgorithm,
    rng: RefCell<R>,
    label: Vec<u8>,
}

pub struct OAEPDecrypt<K: RsaPrivate> {
    key: K,
    hash: HashAlgorithm,
    label: Vec<u8>,
}

fn check_key_len(key: &PublicKey, hash: HashAlgorithm) -> Result<(), CipherError> {
    if key.key_len() < (hash.digest_len() << 1) + 2 {
        Err(CipherError::InvalidArgument(format!(
            "oaep: the modulus is too short for {hash}"
        )))
    } else {
        Ok(())
    }
}

impl<R: Rand> OAEPEncrypt<R> {
    /// label: 和消息相关联的标签
    pub fn new(key: PublicKey, hash: HashAlgorithm, rng: R, label: &[u8]) -> Result<Self, CipherError> {
        check_key_len(&key, hash)?;
        Ok(Self {
            key,
            hash,
            rng: RefCell::new(rng),
            label: label.to_vec(),
        })
    }

    pub fn set_label(&mut self, label: &[u8]) {
        self.label.clear();
        self.label.extend_from_slice(label);
    }

    pub fn key_len(&self) -> usize {
        self.key.key_len()
    }

    /// `k - 2hLen - 2`
    pub fn max_msg_len(&self) -> usize {
        self.key_len() - (self.hash.digest_len() << 1) - 2
    }
}

impl<R: Rand> Encrypt for OAEPEncrypt<R> {
    fn encrypt(&self, msg: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        let (klen, hlen) = (self.key_len(), self.hash.digest_len());
        if msg.len() > self.max_msg_len() {
            return Err(CipherError::InvalidArgument(
                "oaep: message too long".to_string(),
            ));
        }

        let mut em = vec![0u8; klen];
        let (seed, db) = em[1..].split_at_mut(hlen);
        self.rng.borrow_mut().rand(seed);

        // db = lHash || ps || 0x01 || M
        db[..hlen].copy_from_slice(&self.hash.digest(&self.label));
        let m_idx = db.len() - msg.len();
        db[m_idx - 1] = 0x01;
        db[m_idx..].copy_from_slice(msg);

        // maskedDB = DB ^ MGF(seed), maskedSeed = seed ^ MGF(maskedDB)
        mgf1_xor(self.hash, seed, db);
        mgf1_xor(self.hash, db, seed);

        let c = self.key.rsaep(&BigUint::from_bytes_be(&em))?;
        ciphertext.extend(utils::i2osp(&c, klen).ok_or_else(|| {
            CipherError::Arithmetic("oaep: ciphertext representative too large".to_string())
        })?);
        Ok(())
    }
}

impl<K: RsaPrivate> OAEPDecrypt<K> {
    pub fn new(key: K, hash: HashAlgorithm, label: &[u8]) -> Result<Self, CipherError> {
        check_key_len(key.public_key(), hash)?;
        Ok(Self {
            key,
            hash,
            label: label.to_vec(),
        })
    }

    // 所有检查都执行完再判断结果, 不提前返回
    fn decode(&self, em: &mut [u8]) -> Option<(usize, usize)> {
        let hlen = self.hash.digest_len();
        let lhash = self.hash.digest(&self.label);

        let (y, rest) = em.split_at_mut(1);
        let (seed, db) = rest.split_at_mut(hlen);
        mgf1_xor(self.hash, db, seed);
        mgf1_xor(self.hash, seed, db);

        let mut bad = y[0];
        bad |= db[..hlen]
            .iter()
            .zip(lhash.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        // 寻找PS之后的0x01, PS中出现其它非零字节即为错误
        let (mut found, mut idx, mut invalid) = (0u8, 0usize, 0u8);
        for (i, &b) in db.iter().enumerate().skip(hlen) {
            let is_one = (b == 0x01) as u8;
            let is_zero = (b == 0x00) as u8;
            let first = is_one & (found ^ 1);
            idx |= i & (0usize.wrapping_sub(first as usize));
            invalid |= (found ^ 1) & (is_one ^ 1) & (is_zero ^ 1);
            found |= is_one;
        }

        if (bad != 0) | (found == 0) | (invalid != 0) {
            None
        } else {
            Some((1 + hlen + idx + 1, em.len()))
        }
    }
}

impl<K: RsaPrivate> Decrypt for OAEPDecrypt<K> {
    fn decrypt(&self, ciphertext: &[u8], msg: &mut Vec<u8>) -> Result<(), CipherError> {
        let klen = self.key.key_len();
        if ciphertext.len() != klen {
            return Err(CipherError::DecryptionError);
        }

        let c = BigUint::from_bytes_be(ciphertext);
        let m = self
            .key
            .rsadp(&c)
            .map_err(|_| CipherError::DecryptionError)?;
        let mut em = utils::i2osp(&m, klen).ok_or(CipherError::DecryptionError)?;

        let (start, end) = self.decode(&mut em).ok_or(CipherError::DecryptionError)?;
        msg.extend_from_slice(&em[start..end]);
        Ok(())
    }
}
