//! Keyed-Hashing for Message Authentication (HMAC) <br>
//!
//! - [RFC 2104](https://www.rfc-editor.org/rfc/rfc2104) <br>
//!
//! $$
//! HMAC(K, m) = H((K' \xor opad) || H((K' \xor ipad) || m))
//! $$
//!
//! `K'`: 密钥长度大于哈希分组长度时先做哈希, 再补0到分组长度.

use crate::MAC;
use crypto_hash::HashAlgorithm;
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

#[derive(Clone)]
pub struct HMAC {
    hash: HashAlgorithm,
    ipad_key: Vec<u8>,
    opad_key: Vec<u8>,
}

impl HMAC {
    const IPAD: u8 = 0x36;
    const OPAD: u8 = 0x5c;

    pub fn new(hash: HashAlgorithm, key: &[u8]) -> Self {
        let block_len = hash.block_len();
        let mut k = if key.len() > block_len {
            hash.digest(key)
        } else {
            key.to_vec()
        };
        k.resize(block_len, 0);

        let ipad_key = k.iter().map(|&x| x ^ Self::IPAD).collect();
        let opad_key = k.iter().map(|&x| x ^ Self::OPAD).collect();

        #[cfg(feature = "sec-zeroize")]
        k.zeroize();

        Self {
            hash,
            ipad_key,
            opad_key,
        }
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn do_final(&self, data: &[u8]) -> Vec<u8> {
        let inner = self.hash.digest_parts(&[&self.ipad_key, data]);
        self.hash.digest_parts(&[&self.opad_key, &inner])
    }
}

impl MAC for HMAC {
    fn mac_size(&self) -> usize {
        self.hash.digest_len()
    }

    fn mac(&self, msg: &[u8], mac: &mut Vec<u8>) {
        mac.extend(self.do_final(msg));
    }
}

#[cfg(feature = "sec-zeroize")]
impl Zeroize for HMAC {
    fn zeroize(&mut self) {
        self.ipad_key.zeroize();
        self.opad_key.zeroize();
    }
}

#[cfg(feature = "sec-zeroize")]
impl Drop for HMAC {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::HMAC;
    use crate::MAC;
    use crypto_hash::HashAlgorithm;

    // RFC 4231, RFC 2202
    #[test]
    fn rfc4231() {
        let long_key = vec![0xaau8; 131];
        let long_msg = b"Test Using Larger Than Block-Size Key - Hash Key First";
        let cases: [(HashAlgorithm, &[u8], &[u8], &str); 6] = [
            (HashAlgorithm::Sha256, &[0x0b; 20], b"Hi There", "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"),
            (HashAlgorithm::Sha512, &[0x0b; 20], b"Hi There", "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cdedaa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"),
            (HashAlgorithm::Sha224, b"Jefe", b"what do ya want for nothing?", "a30e01098bc6dbbf45690f3a7e9e6d0f8bbea2a39e6148008fd05e44"),
            (HashAlgorithm::Sha1, b"Jefe", b"what do ya want for nothing?", "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"),
            (HashAlgorithm::Sha256, &long_key, long_msg, "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"),
            (HashAlgorithm::Sha384, &long_key, long_msg, "4ece084485813e9088d2c63a041bc5b44f9ef1012a2b588f3cd11f05033ac4c60c2ef6ab4030fe8296248df163f44952"),
        ];

        for (i, (hash, key, msg, tgt)) in cases.into_iter().enumerate() {
            let hmac = HMAC::new(hash, key);
            let t = hmac.do_final(msg);
            assert_eq!(hex::encode(&t), tgt, "case {i}");
            assert_eq!(hmac.mac_size(), t.len());
            assert!(hmac.verify_mac(msg, &t));
            assert!(!hmac.verify_mac(&msg[1..], &t));
        }
    }
}
