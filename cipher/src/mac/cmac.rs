//! Block Cipher-based Message Authentication Code (CMAC) <br>
//!
//! - [Recommendation for Block Cipher Modes of Operation: The CMAC Mode for Authentication](https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-38b.pdf) <br>
//!
//! - 流程:
//!   - subkey: 子密钥派生, 构造时计算一次;
//!   - MAC生成: 输出长度截断到`[8, 16]`字节;
//!   - MAC验证
//!

use crate::{BlockEncrypt, MAC};
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

#[derive(Clone)]
pub struct CMAC<E> {
    k1: [u8; 16],
    k2: [u8; 16],
    cipher: E,
}

impl<E> CMAC<E> {
    // 128位分组: x^128 + x^7 + x^2 + x + 1
    const RB: u8 = 0x87;

    pub const MIN_MAC_SIZE: usize = 8;
    pub const MAX_MAC_SIZE: usize = 16;

    // 左移1位, 最高位为1时异或Rb
    fn dbl(x: &[u8; 16]) -> [u8; 16] {
        let mut y = [0u8; 16];
        let mut lsb = 0;
        for (a, &b) in y.iter_mut().rev().zip(x.iter().rev()) {
            *a = (b << 1) | lsb;
            lsb = b >> 7;
        }
        if x[0] & 0x80 != 0 {
            y[15] ^= Self::RB;
        }
        y
    }

    /// 把输出长度限制在`[8, 16]`
    pub fn clamp_len(len: usize) -> usize {
        len.clamp(Self::MIN_MAC_SIZE, Self::MAX_MAC_SIZE)
    }
}

impl<E: BlockEncrypt<16>> CMAC<E> {
    pub fn new(cipher: E) -> Self {
        let l = cipher.encrypt_block(&[0u8; 16]);
        let k1 = Self::dbl(&l);
        let k2 = Self::dbl(&k1);
        Self { k1, k2, cipher }
    }

    /// 完整的16字节MAC
    fn full_mac(&self, msg: &[u8]) -> [u8; 16] {
        let n = msg.len().div_ceil(16).max(1);
        let (head, last) = msg.split_at((n - 1) << 4);

        let mut ci = [0u8; 16];
        for chunk in head.chunks_exact(16) {
            ci.iter_mut().zip(chunk).for_each(|(a, &b)| *a ^= b);
            ci = self.cipher.encrypt_block(&ci);
        }

        // 最后一块完整时异或K1, 否则填充`10..0`后异或K2
        let mut mn = [0u8; 16];
        mn[..last.len()].copy_from_slice(last);
        let k = if last.len() == 16 {
            &self.k1
        } else {
            mn[last.len()] = 0x80;
            &self.k2
        };

        ci.iter_mut()
            .zip(mn.iter().zip(k.iter()))
            .for_each(|(a, (&b, &c))| *a ^= b ^ c);
        self.cipher.encrypt_block(&ci)
    }

    /// 输出长度`len`被限制在`[8, 16]`
    pub fn calculate(&self, msg: &[u8], len: usize) -> Vec<u8> {
        let t = self.full_mac(msg);
        t[..Self::clamp_len(len)].to_vec()
    }

    /// `tag`长度不在`[8, 16]`时直接返回false
    pub fn verify(&self, msg: &[u8], tag: &[u8]) -> bool {
        if !(Self::MIN_MAC_SIZE..=Self::MAX_MAC_SIZE).contains(&tag.len()) {
            return false;
        }

        let t = self.full_mac(msg);
        utils::ct_eq(&t[..tag.len()], tag)
    }
}

impl<E: BlockEncrypt<16>> MAC for CMAC<E> {
    fn mac_size(&self) -> usize {
        Self::MAX_MAC_SIZE
    }

    fn mac(&self, msg: &[u8], mac: &mut Vec<u8>) {
        mac.extend(self.full_mac(msg));
    }

    fn verify_mac(&self, msg: &[u8], mac: &[u8]) -> bool {
        self.verify(msg, mac)
    }
}

#[cfg(feature = "sec-zeroize")]
impl<E: Zeroize> Zeroize for CMAC<E> {
    fn zeroize(&mut self) {
        self.cipher.zeroize();
        self.k1.zeroize();
        self.k2.zeroize();
    }
}

#[cfg(feature = "sec-zeroize")]
impl<E> Drop for CMAC<E> {
    fn drop(&mut self) {
        self.k1.zeroize();
        self.k2.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::CMAC;
    use crate::block_cipher::AES;
    use crate::MAC;

    const MSG: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e5130c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710";

    fn cmac() -> CMAC<AES> {
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        CMAC::new(AES::new(&key).unwrap())
    }

    // SP 800-38B D.1
    #[test]
    fn sp800_38b_aes128() {
        let msg = hex::decode(MSG).unwrap();
        let cases = [
            (0, "bb1d6929e95937287fa37d129b756746"),
            (16, "070a16b46b4d4144f79bdd9dd04a287c"),
            (40, "dfa66747de9ae63030ca32611497c827"),
            (64, "51f0bebf7e3b9d92fc49741779363cfe"),
        ];

        let cmac = cmac();
        for (len, tgt) in cases {
            let t = cmac.calculate(&msg[..len], 16);
            assert_eq!(hex::encode(&t), tgt, "len {len}");
            assert!(cmac.verify(&msg[..len], &t));

            let mut buf = vec![];
            cmac.mac(&msg[..len], &mut buf);
            assert_eq!(buf, t);
        }
    }

    #[test]
    fn subkeys() {
        let cmac = cmac();
        assert_eq!(hex::encode(cmac.k1), "fbeed618357133667c85e08f7236a8de");
        assert_eq!(hex::encode(cmac.k2), "f7ddac306ae266ccf90bc11ee46d513b");
    }

    #[test]
    fn clamp_and_verify() {
        let msg = hex::decode(MSG).unwrap();
        let cmac = cmac();
        let full = cmac.calculate(&msg, 16);

        for len in 0..24 {
            let t = cmac.calculate(&msg, len);
            assert_eq!(t.len(), len.clamp(8, 16));
            assert_eq!(t, full[..t.len()]);
            assert!(cmac.verify(&msg, &t));
        }

        let mut t = cmac.calculate(&msg, 8);
        assert!(!cmac.verify(&msg[1..], &t));
        assert!(!cmac.verify(&msg, &t[..7]));
        t[3] ^= 0x40;
        assert!(!cmac.verify(&msg, &t));
    }
}
