//! 卡片通信用的加密报文
//!
//! 加密方生成接收方曲线上的临时密钥对`(dE, PE)`, `SS = ECKA(dE, W)`:
//! - `K_enc = SHA-256(SS || 00000001)`, `K_mac = SHA-256(SS || 00000002)`;
//! - `IV = AES(K_enc, 0^16)`, `C = AES-CBC(K_enc, IV, ISO7816-4填充(M))`;
//! - `T = CMAC(K_mac, C)`的前8字节;
//!
//! 报文: `A6{06 曲线OID, 7F49{86 PE}, 86 02 || C, 8E T}`. 解密时先验证T, 任何失败都只返回`DecipherError`.

use crate::ecc::{PrivateKey, PublicKey};
use crate::{AesKey, CipherError, Rand};
use crypto_hash::HashAlgorithm;
use encode::{asn1, Tlv};

const TAG_CRYPTOGRAM: u32 = 0xa6;
const TAG_PUBLIC_KEY: u32 = 0x7f49;
const TAG_POINT: u32 = 0x86;
const TAG_CIPHERTEXT: u32 = 0x86;
const TAG_MAC: u32 = 0x8e;
// 填充指示字节: 使用ISO/IEC 7816-4填充
const PADDING_INDICATOR: u8 = 0x02;
const MAC_LEN: usize = 8;

struct SessionKeys {
    enc: AesKey,
    mac: AesKey,
}

impl SessionKeys {
    fn derive(ss: &[u8]) -> Result<Self, CipherError> {
        let k = |counter: u32| HashAlgorithm::Sha256.digest_parts(&[ss, &counter.to_be_bytes()]);
        Ok(Self {
            enc: AesKey::new(&k(1))?,
            mac: AesKey::new(&k(2))?,
        })
    }

    fn iv(&self) -> [u8; 16] {
        self.enc.encrypt_block(&[0u8; 16])
    }
}

impl PublicKey {
    pub fn encipher<R: Rand>(&self, msg: &[u8], rng: &mut R) -> Result<Vec<u8>, CipherError> {
        let oid = self.curve_oid()?;
        let ephemeral = PrivateKey::generate(self.domain_parameters().clone(), rng)?;
        let keys = SessionKeys::derive(&ephemeral.ecka(self)?)?;

        let c = keys.enc.encrypt_cbc(Some(&keys.iv()), &AesKey::pad_iso(msg))?;
        let t = keys.mac.calculate_cmac(&c, MAC_LEN);

        let mut body = Vec::with_capacity(c.len() + 1);
        body.push(PADDING_INDICATOR);
        body.extend(c);

        let tlv = Tlv::constructed(
            TAG_CRYPTOGRAM,
            vec![
                asn1::oid(oid)?,
                Tlv::constructed(
                    TAG_PUBLIC_KEY,
                    vec![Tlv::primitive(TAG_POINT, ephemeral.public_key().to_point_bytes(false)?)],
                ),
                Tlv::primitive(TAG_CIPHERTEXT, body),
                Tlv::primitive(TAG_MAC, t),
            ],
        );
        Ok(tlv.to_bytes())
    }
}

impl PrivateKey {
    pub fn decipher(&self, cryptogram: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.decipher_inner(cryptogram).ok_or(CipherError::DecipherError)
    }

    fn decipher_inner(&self, cryptogram: &[u8]) -> Option<Vec<u8>> {
        let tlv = Tlv::from_bytes(cryptogram).ok()?;
        let tlv = tlv.expect_tag(TAG_CRYPTOGRAM).ok()?;

        let oid = asn1::to_oid(tlv.child(asn1::OBJECT_IDENTIFIER).ok()?).ok()?;
        if Some(oid.as_str()) != self.domain_parameters().oid() {
            return None;
        }

        let pe = tlv
            .child(TAG_PUBLIC_KEY)
            .and_then(|x| x.child(TAG_POINT))
            .and_then(|x| x.primitive_value())
            .ok()?;
        let pe = PublicKey::from_point_bytes(self.domain_parameters().clone(), pe).ok()?;

        let body = tlv.child(TAG_CIPHERTEXT).and_then(|x| x.primitive_value()).ok()?;
        let t = tlv.child(TAG_MAC).and_then(|x| x.primitive_value()).ok()?;
        let (&indicator, c) = body.split_first()?;
        if indicator != PADDING_INDICATOR || t.len() != MAC_LEN {
            return None;
        }

        let keys = SessionKeys::derive(&self.ecka(&pe).ok()?).ok()?;
        if !keys.mac.verify_cmac(c, t) {
            return None;
        }

        let m = keys.enc.decrypt_cbc(Some(&keys.iv()), c).ok()?;
        AesKey::truncate_iso(&m).ok()
    }
}
