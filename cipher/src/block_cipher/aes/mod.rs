//! AES加密<br>
//! FIPS 197  <br>
//! [FIPS 197-upd1](https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.197-upd1.pdf)<br>
//!
//! 查表实现: 每一轮的SubBytes, ShiftRows, MixColumns合并为4次查表和异或.

use crate::{BlockDecrypt, BlockEncrypt, CipherError, Decrypt, Encrypt};
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

mod tables;

/// AES-128/192/256, 由密钥长度决定
#[derive(Clone)]
pub struct AES {
    en_key: Vec<u32>,
    de_key: Vec<u32>,
    // 加密轮数
    nr: usize,
}

impl AES {
    pub const BLOCK_SIZE: usize = 16;
    pub const KEY_SIZES: [usize; 3] = [16, 24, 32];

    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let nr = match key.len() {
            16 => 10,
            24 => 12,
            32 => 14,
            _ => {
                return Err(CipherError::InvalidKeySize {
                    target: &Self::KEY_SIZES,
                    real: key.len(),
                })
            }
        };

        let en_key = Self::expand_key(key, nr);
        let de_key = Self::invert_key(&en_key);
        Ok(Self { en_key, de_key, nr })
    }

    pub fn key_size(&self) -> usize {
        (self.nr - 6) << 2
    }

    #[inline]
    const fn sub_word(w: u32) -> u32 {
        let i = w.to_be_bytes();
        u32::from_be_bytes([
            Self::SBOX0[i[0] as usize],
            Self::SBOX0[i[1] as usize],
            Self::SBOX0[i[2] as usize],
            Self::SBOX0[i[3] as usize],
        ])
    }

    // 密钥扩展
    fn expand_key(key: &[u8], nr: usize) -> Vec<u32> {
        let nk = key.len() >> 2;
        let mut w = Vec::with_capacity((nr + 1) << 2);
        w.extend(
            key.chunks_exact(4)
                .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]])),
        );

        for i in nk..((nr + 1) << 2) {
            let mut t = w[i - 1];
            if i % nk == 0 {
                t = Self::sub_word(t.rotate_left(8)) ^ Self::POWX[i / nk - 1];
            } else if nk > 6 && i % nk == 4 {
                t = Self::sub_word(t);
            }
            w.push(w[i - nk] ^ t);
        }

        w
    }

    // 解密轮密钥: 逆序, 中间轮做InvMixColumns
    fn invert_key(en_key: &[u32]) -> Vec<u32> {
        let n = en_key.len();
        let mut d = vec![0u32; n];
        for i in (0..n).step_by(4) {
            let ei = n - i - 4;
            for j in 0..4 {
                let x = en_key[ei + j];
                d[i + j] = if i > 0 && i + 4 < n {
                    let v = x.to_be_bytes();
                    Self::TD0[Self::SBOX0[v[0] as usize] as usize]
                        ^ Self::TD1[Self::SBOX0[v[1] as usize] as usize]
                        ^ Self::TD2[Self::SBOX0[v[2] as usize] as usize]
                        ^ Self::TD3[Self::SBOX0[v[3] as usize] as usize]
                } else {
                    x
                };
            }
        }
        d
    }

    fn load(data: &[u8; 16], key: &[u32]) -> [u32; 4] {
        let mut s = [0u32; 4];
        for (i, (x, c)) in s.iter_mut().zip(data.chunks_exact(4)).enumerate() {
            *x = u32::from_be_bytes([c[0], c[1], c[2], c[3]]) ^ key[i];
        }
        s
    }

    fn store(s: [u32; 4]) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (c, x) in out.chunks_exact_mut(4).zip(s) {
            c.copy_from_slice(&x.to_be_bytes());
        }
        out
    }

    #[inline]
    const fn byte(x: u32, i: usize) -> usize {
        ((x >> (24 - (i << 3))) & 0xff) as usize
    }

    fn encrypt_block_inner(&self, data: &[u8; 16]) -> [u8; 16] {
        let key = &self.en_key;
        let mut s = Self::load(data, key);

        // SubBytes -> ShiftRows -> MixColumns -> AddRoundKey
        for r in 1..self.nr {
            let k = &key[(r << 2)..];
            s = [0, 1, 2, 3].map(|i| {
                k[i] ^ Self::TE0[Self::byte(s[i], 0)]
                    ^ Self::TE1[Self::byte(s[(i + 1) & 3], 1)]
                    ^ Self::TE2[Self::byte(s[(i + 2) & 3], 2)]
                    ^ Self::TE3[Self::byte(s[(i + 3) & 3], 3)]
            });
        }

        // SubBytes -> ShiftRows -> AddRoundKey
        let k = &key[(self.nr << 2)..];
        let s = [0, 1, 2, 3].map(|i| {
            let b = [0, 1, 2, 3].map(|j| Self::SBOX0[Self::byte(s[(i + j) & 3], j)]);
            u32::from_be_bytes(b) ^ k[i]
        });

        Self::store(s)
    }

    fn decrypt_block_inner(&self, data: &[u8; 16]) -> [u8; 16] {
        let key = &self.de_key;
        let mut s = Self::load(data, key);

        for r in 1..self.nr {
            let k = &key[(r << 2)..];
            s = [0, 1, 2, 3].map(|i| {
                k[i] ^ Self::TD0[Self::byte(s[i], 0)]
                    ^ Self::TD1[Self::byte(s[(i + 3) & 3], 1)]
                    ^ Self::TD2[Self::byte(s[(i + 2) & 3], 2)]
                    ^ Self::TD3[Self::byte(s[(i + 1) & 3], 3)]
            });
        }

        let k = &key[(self.nr << 2)..];
        let s = [0, 1, 2, 3].map(|i| {
            let b = [0, 1, 2, 3].map(|j| Self::SBOX1[Self::byte(s[(i + 4 - j) & 3], j)]);
            u32::from_be_bytes(b) ^ k[i]
        });

        Self::store(s)
    }
}

impl BlockEncrypt<16> for AES {
    fn encrypt_block(&self, plaintext: &[u8; 16]) -> [u8; 16] {
        self.encrypt_block_inner(plaintext)
    }
}

impl BlockDecrypt<16> for AES {
    fn decrypt_block(&self, ciphertext: &[u8; 16]) -> [u8; 16] {
        self.decrypt_block_inner(ciphertext)
    }
}

impl Encrypt for AES {
    /// 单个分组加密(ECB)
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        match <&[u8; 16]>::try_from(plaintext) {
            Ok(block) => {
                ciphertext.extend(self.encrypt_block(block));
                Ok(())
            }
            Err(_) => Err(CipherError::InvalidBlockSize {
                target: Self::BLOCK_SIZE,
                real: plaintext.len(),
            }),
        }
    }
}

impl Decrypt for AES {
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError> {
        match <&[u8; 16]>::try_from(ciphertext) {
            Ok(block) => {
                plaintext.extend(self.decrypt_block(block));
                Ok(())
            }
            Err(_) => Err(CipherError::InvalidBlockSize {
                target: Self::BLOCK_SIZE,
                real: ciphertext.len(),
            }),
        }
    }
}

#[cfg(feature = "sec-zeroize")]
impl Zeroize for AES {
    fn zeroize(&mut self) {
        self.en_key.zeroize();
        self.de_key.zeroize();
    }
}

#[cfg(feature = "sec-zeroize")]
impl Drop for AES {
    fn drop(&mut self) {
        self.zeroize();
    }
}
