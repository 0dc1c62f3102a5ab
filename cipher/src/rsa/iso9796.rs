//! ISO/IEC 9796-2 可恢复消息的数字签名
//!
//! 消息`M = M1 || M2`, `M1`嵌入签名块中, 验证时从签名中恢复; `M2`需要验证方另外提供.
//!
//! 签名块长度`ℓ = floor(bits(n) / 8)`字节, 最高位为0:
//! - 方案1(DS1): `header || PAD || M1 || H(M) || trailer`, header的高两位为`01`, 第3位表示是否部分恢复;
//! - 方案2/3(DS2/DS3): `maskedDB || H || trailer`,
//!   `H = Hash(C || M1 || Hash(M2) || S)`, `DB = 0x00..0x00 || 0x01 || M1 || S`, `C`为M1位长的8字节编码,
//!   方案3的salt长度为0;
//!
//! trailer为`0xbc`(隐式, 摘要算法由双方约定)或`hashID || 0xcc`(显式).
//!
//! 签名形式: `Minimum`发送`min{s, n - s}`, 验证时根据`J* ≡ 12 (mod 16)`选择`J*`或`n - J*`; `Plain`直接发送`s`.
//!

use crate::rsa::{mgf1_xor, PublicKey, RsaPrivate};
use crate::{CipherError, Rand, Sign, Verify};
use crypto_hash::HashAlgorithm;
use num_bigint::BigUint;
use std::cell::RefCell;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Iso9796Scheme {
    DS1,
    DS2,
    DS3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Trailer {
    /// `0xbc`
    #[default]
    Implicit,
    /// `hashID || 0xcc`
    Explicit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SignatureForm {
    #[default]
    Minimum,
    Plain,
}

impl Trailer {
    const IMPLICIT: u8 = 0xbc;
    const EXPLICIT: u8 = 0xcc;

    const fn len(self) -> usize {
        match self {
            Self::Implicit => 1,
            Self::Explicit => 2,
        }
    }

    fn write(self, hash: HashAlgorithm, out: &mut [u8]) {
        match self {
            Self::Implicit => out[0] = Self::IMPLICIT,
            Self::Explicit => {
                out[0] = hash.hash_id();
                out[1] = Self::EXPLICIT;
            }
        }
    }

    fn check(self, hash: HashAlgorithm, block: &[u8]) -> bool {
        match (self, block) {
            (Self::Implicit, [.., last]) => *last == Self::IMPLICIT,
            (Self::Explicit, [.., id, last]) => *last == Self::EXPLICIT && *id == hash.hash_id(),
            _ => false,
        }
    }
}

impl Iso9796Scheme {
    const fn default_salt_len(self, hash: HashAlgorithm) -> usize {
        match self {
            Self::DS2 => hash.digest_len(),
            Self::DS1 | Self::DS3 => 0,
        }
    }
}

#[derive(Clone)]
pub struct ISO9796Verify {
    key: PublicKey,
    hash: HashAlgorithm,
    scheme: Iso9796Scheme,
    trailer: Trailer,
    form: SignatureForm,
    slen: usize,
}

pub struct ISO9796Sign<K: RsaPrivate, R: Rand> {
    key: K,
    iso: ISO9796Verify,
    rng: RefCell<R>,
}

// 从签名块中解析出的内容
struct Opened {
    m1: Vec<u8>,
    // DS1: H(M); DS2/DS3: H
    h: Vec<u8>,
    salt: Vec<u8>,
    // DS1 header中的部分恢复标志; DS2/DS3由M1长度推断
    partial: bool,
}

impl ISO9796Verify {
    const HEADER_FULL: u8 = 0x40;
    const HEADER_PARTIAL: u8 = 0x60;
    const PAD: u8 = 0xbb;
    const PAD_END: u8 = 0xba;

    pub fn new(
        key: PublicKey,
        hash: HashAlgorithm,
        scheme: Iso9796Scheme,
        trailer: Trailer,
        form: SignatureForm,
    ) -> Result<Self, CipherError> {
        Self::with_salt_len(key, hash, scheme, trailer, form, scheme.default_salt_len(hash))
    }

    /// 只有DS2可以指定非0的salt长度
    pub fn with_salt_len(
        key: PublicKey,
        hash: HashAlgorithm,
        scheme: Iso9796Scheme,
        trailer: Trailer,
        form: SignatureForm,
        salt_len: usize,
    ) -> Result<Self, CipherError> {
        if salt_len != 0 && scheme != Iso9796Scheme::DS2 {
            return Err(CipherError::InvalidArgument(format!(
                "iso9796: {scheme:?} does not use a salt"
            )));
        }

        let iso = Self {
            key,
            hash,
            scheme,
            trailer,
            form,
            slen: salt_len,
        };

        let overhead = hash.digest_len() + salt_len + trailer.len() + 1;
        if iso.block_len() <= overhead {
            return Err(CipherError::InvalidArgument(
                "iso9796: the modulus is too short for the hash and salt length".to_string(),
            ));
        }

        Ok(iso)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    pub fn scheme(&self) -> Iso9796Scheme {
        self.scheme
    }

    pub fn salt_len(&self) -> usize {
        self.slen
    }

    pub fn key_len(&self) -> usize {
        self.key.key_len()
    }

    /// ℓ
    pub fn block_len(&self) -> usize {
        self.key.bits() >> 3
    }

    /// M1的最大字节长度
    pub fn m1_capacity(&self) -> usize {
        self.block_len() - self.hash.digest_len() - self.slen - self.trailer.len() - 1
    }

    // C: M1的位长, 8字节大端
    fn m1_bits(m1: &[u8]) -> [u8; 8] {
        ((m1.len() as u64) << 3).to_be_bytes()
    }

    fn ds23_hash(&self, m1: &[u8], m2: &[u8], salt: &[u8]) -> Vec<u8> {
        let h_m2 = self.hash.digest(m2);
        self.hash
            .digest_parts(&[&Self::m1_bits(m1), m1, &h_m2, salt])
    }

    // 返回签名块和M1的长度
    fn encode(&self, msg: &[u8], salt: &[u8]) -> (Vec<u8>, usize) {
        let (len, hlen, tlen) = (self.block_len(), self.hash.digest_len(), self.trailer.len());
        let m1_len = msg.len().min(self.m1_capacity());
        let (m1, m2) = msg.split_at(m1_len);

        let mut block = vec![0u8; len];
        self.trailer.write(self.hash, &mut block[(len - tlen)..]);
        let h_end = len - tlen;

        match self.scheme {
            Iso9796Scheme::DS1 => {
                let header = if m2.is_empty() {
                    Self::HEADER_FULL
                } else {
                    Self::HEADER_PARTIAL
                };
                let delta = self.m1_capacity() - m1_len;
                if delta > 0 {
                    block[0] = header | 0x0b;
                    block[1..delta].fill(Self::PAD);
                    block[delta] = Self::PAD_END;
                } else {
                    block[0] = header | 0x0a;
                }

                let m1_start = 1 + delta;
                block[m1_start..(m1_start + m1_len)].copy_from_slice(m1);
                block[(h_end - hlen)..h_end].copy_from_slice(&self.hash.digest(msg));
            }
            Iso9796Scheme::DS2 | Iso9796Scheme::DS3 => {
                let h = self.ds23_hash(m1, m2, salt);
                let (db, rest) = block.split_at_mut(h_end - hlen);
                rest[..hlen].copy_from_slice(&h);

                let salt_start = db.len() - salt.len();
                let m1_start = salt_start - m1_len;
                db[m1_start - 1] = 0x01;
                db[m1_start..salt_start].copy_from_slice(m1);
                db[salt_start..].copy_from_slice(salt);
                mgf1_xor(self.hash, &h, db);
            }
        }

        block[0] &= 0x7f;
        (block, m1_len)
    }

    fn open_ds1(&self, block: &[u8]) -> Option<Opened> {
        let (hlen, tlen) = (self.hash.digest_len(), self.trailer.len());
        let h_end = block.len() - tlen;

        let partial = match block[0] & 0xf0 {
            Self::HEADER_FULL => false,
            Self::HEADER_PARTIAL => true,
            _ => return None,
        };

        let m1_start = match block[0] & 0x0f {
            0x0a => 1,
            0x0b => {
                let end = block[1..].iter().position(|&x| x != Self::PAD)? + 1;
                if block[end] != Self::PAD_END {
                    return None;
                }
                end + 1
            }
            _ => return None,
        };

        if m1_start > h_end - hlen {
            return None;
        }

        Some(Opened {
            m1: block[m1_start..(h_end - hlen)].to_vec(),
            h: block[(h_end - hlen)..h_end].to_vec(),
            salt: vec![],
            partial,
        })
    }

    fn open_ds23(&self, block: &mut [u8]) -> Option<Opened> {
        let (hlen, tlen) = (self.hash.digest_len(), self.trailer.len());
        let h_end = block.len() - tlen;

        let (db, rest) = block.split_at_mut(h_end - hlen);
        let h = rest[..hlen].to_vec();
        mgf1_xor(self.hash, &h, db);
        db[0] &= 0x7f;

        let one = db.iter().position(|&x| x != 0)?;
        if db[one] != 0x01 || db.len() - one - 1 < self.slen {
            return None;
        }

        let salt_start = db.len() - self.slen;
        let m1 = db[(one + 1)..salt_start].to_vec();
        let partial = m1.len() == self.m1_capacity();
        Some(Opened {
            m1,
            h,
            salt: db[salt_start..].to_vec(),
            partial,
        })
    }

    // 签名 -> 签名块
    fn representative(&self, sign: &[u8]) -> Option<Vec<u8>> {
        if sign.len() != self.key_len() {
            return None;
        }

        let n = self.key.modulus();
        let j = self.key.rsavp1(&BigUint::from_bytes_be(sign)).ok()?;
        let j = match self.form {
            SignatureForm::Minimum if (&j % 16u8) != BigUint::from(12u8) => n - j,
            _ => j,
        };

        utils::i2osp(&j, self.block_len())
    }

    fn open(&self, sign: &[u8]) -> Option<Opened> {
        let mut block = self.representative(sign)?;
        if block[0] & 0x80 != 0 || !self.trailer.check(self.hash, &block) {
            return None;
        }

        match self.scheme {
            Iso9796Scheme::DS1 => self.open_ds1(&block),
            Iso9796Scheme::DS2 | Iso9796Scheme::DS3 => self.open_ds23(&mut block),
        }
    }

    fn check(&self, opened: &Opened, m2: &[u8]) -> bool {
        // 部分恢复时M1占满容量且M2非空
        let full = opened.m1.len() == self.m1_capacity();
        match self.scheme {
            Iso9796Scheme::DS1 => {
                if opened.partial != !m2.is_empty() || (opened.partial && !full) {
                    return false;
                }
                let h = self.hash.digest_parts(&[&opened.m1, m2]);
                utils::ct_eq(&h, &opened.h)
            }
            Iso9796Scheme::DS2 | Iso9796Scheme::DS3 => {
                if !m2.is_empty() && !opened.partial {
                    return false;
                }
                let h = self.ds23_hash(&opened.m1, m2, &opened.salt);
                utils::ct_eq(&h, &opened.h)
            }
        }
    }

    /// 验证`M1 || m2`的签名, 返回恢复出的`M1`
    pub fn recover(&self, sign: &[u8], m2: &[u8]) -> Result<Vec<u8>, CipherError> {
        match self.open(sign) {
            Some(opened) if self.check(&opened, m2) => Ok(opened.m1),
            _ => Err(Self::invalid()),
        }
    }

    fn invalid() -> CipherError {
        CipherError::ValidateFailed("iso9796: invalid signature".to_string())
    }
}

impl Verify for ISO9796Verify {
    /// `msg`为完整消息`M1 || M2`
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        let opened = self.open(sign).ok_or_else(Self::invalid)?;
        match msg.strip_prefix(opened.m1.as_slice()) {
            Some(m2) if self.check(&opened, m2) => Ok(()),
            _ => Err(Self::invalid()),
        }
    }
}

impl<K: RsaPrivate, R: Rand> ISO9796Sign<K, R> {
    pub fn new(
        key: K,
        hash: HashAlgorithm,
        scheme: Iso9796Scheme,
        trailer: Trailer,
        form: SignatureForm,
        rng: R,
    ) -> Result<Self, CipherError> {
        let iso = ISO9796Verify::new(key.public_key().clone(), hash, scheme, trailer, form)?;
        Ok(Self {
            key,
            iso,
            rng: RefCell::new(rng),
        })
    }

    pub fn with_salt_len(
        key: K,
        hash: HashAlgorithm,
        trailer: Trailer,
        form: SignatureForm,
        salt_len: usize,
        rng: R,
    ) -> Result<Self, CipherError> {
        let iso = ISO9796Verify::with_salt_len(
            key.public_key().clone(),
            hash,
            Iso9796Scheme::DS2,
            trailer,
            form,
            salt_len,
        )?;
        Ok(Self {
            key,
            iso,
            rng: RefCell::new(rng),
        })
    }

    pub fn verifier(&self) -> &ISO9796Verify {
        &self.iso
    }

    /// 使用给定的salt签名, 返回签名和嵌入签名中的M1的长度
    pub fn sign_with_salt(&self, msg: &[u8], salt: &[u8]) -> Result<(Vec<u8>, usize), CipherError> {
        if salt.len() != self.iso.slen {
            return Err(CipherError::InvalidArgument(format!(
                "iso9796: salt length `{}` should be `{}`",
                salt.len(),
                self.iso.slen
            )));
        }

        let (block, m1_len) = self.iso.encode(msg, salt);
        let s = self.key.rsasp1(&BigUint::from_bytes_be(&block))?;
        let s = match self.iso.form {
            SignatureForm::Minimum => {
                let n = self.iso.key.modulus();
                let t = n - &s;
                s.min(t)
            }
            SignatureForm::Plain => s,
        };

        let sign = utils::i2osp(&s, self.iso.key_len()).ok_or_else(|| {
            CipherError::Arithmetic("iso9796: signature representative too large".to_string())
        })?;
        Ok((sign, m1_len))
    }
}

impl<K: RsaPrivate, R: Rand> Sign for ISO9796Sign<K, R> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        let mut salt = vec![0u8; self.iso.slen];
        self.rng.borrow_mut().rand(&mut salt);
        let (s, m1_len) = self.sign_with_salt(msg, &salt)?;
        log::trace!("iso9796: {} of {} message bytes recoverable", m1_len, msg.len());
        sign.extend(s);
        Ok(())
    }
}

impl<K: RsaPrivate, R: Rand> Verify for ISO9796Sign<K, R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        self.iso.verify(msg, sign)
    }
}
