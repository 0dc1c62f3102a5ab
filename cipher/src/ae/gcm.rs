use crate::{AuthenticationCipher, BlockEncrypt, CipherError};

/// # Galois/Counter Mode(GCM)
///
/// - [Recommendation for Block Cipher Modes of Operation: GCM and GMAC](https://csrc.nist.gov/pubs/sp/800/38/d/final) <br>
///
/// 记(Nonce, AssociateData, Payload)为`(N, A, P)`, 其字节长度为`(n, a, p)`, 其需要满足如下条件:
/// - `p <= 2^{39} - 256`;
/// - `a <= 2^{64} - 1`;
/// - `1 <= n <= 2^{64} - 1`;
///
/// ## 注意
///
/// - 如果nonce值的uniqueness不能保证, 会减弱GCM的安全性, 此种情况下不应使用该算法;
/// - 加密输出结果格式为`C || MAC`;
/// - MAC长度只能是12, 13, 14, 15, 16字节;
#[derive(Clone)]
pub struct GCM<E> {
    cipher: E,
    mac_size: usize,
    // hash subkey `H = CIPH_K(0^128)`
    h: u128,
}

impl<E> GCM<E> {
    const R: u128 = 0b11100001u128 << 120;

    pub const MAC_SIZES: [usize; 5] = [12, 13, 14, 15, 16];

    // len(x) = l, l >= s
    // inc_s(X) = MSB_{l-s}(x)|| (LSB_s(x) + 1 \mod 2^s)
    const fn inc_s(x: u128, s: usize) -> u128 {
        let y = (1 << s) - 1;
        ((x >> s) << s) | ((x + 1) & y)
    }

    // 定义两个块乘积`X \cdot Y`
    const fn block_mul(x: u128, y: u128) -> u128 {
        let (mut z, mut v, mut i) = (0, y, 0);

        while i < u128::BITS {
            if (x & (1u128 << (u128::BITS - 1 - i))) != 0 {
                z ^= v;
            }
            if (v & 0x1) != 0 {
                v >>= 1;
                v ^= Self::R;
            } else {
                v >>= 1;
            }
            i += 1;
        }

        z
    }

    // x: `x = x_1 || ... || x'_m`, x大小无需是分组大小的整数倍, 内部实现等价于补0对齐
    // `GHASH(pre, X, h) = Y_m`
    // `Y_i = (Y_{i-1} ^ X_i) * h, i = 1...m`
    fn g_hash(&self, pre_hash: u128, x: &[u8]) -> u128 {
        x.chunks(16).fold(pre_hash, |y, chunk| {
            let mut buf = [0u8; 16];
            buf[..chunk.len()].copy_from_slice(chunk);
            Self::block_mul(y ^ u128::from_be_bytes(buf), self.h)
        })
    }

    fn j0(&self, nonce: &[u8]) -> u128 {
        let mut buf = [0u8; 16];
        if nonce.len() == 12 {
            buf[..12].copy_from_slice(nonce);
            buf[15] = 1;
            u128::from_be_bytes(buf)
        } else {
            buf[8..].copy_from_slice(&((nonce.len() as u64) << 3).to_be_bytes());
            let pre = self.g_hash(0, nonce);
            self.g_hash(pre, buf.as_slice())
        }
    }

    fn check_nonce_and_payload(nonce: &[u8], payload: usize) -> Result<(), CipherError> {
        const LIMIT: u64 = (1u64 << 36) - 32;
        if nonce.is_empty() {
            Err(CipherError::InvalidArgument(
                "gcm: nonce length cannot be zero".to_string(),
            ))
        } else if (payload as u64) > LIMIT {
            Err(CipherError::InvalidArgument(format!(
                "gcm: payload length `{payload}` should less or equal than {LIMIT}"
            )))
        } else {
            Ok(())
        }
    }

    // `S = GHASH(A || 0^v || C || 0^u || [len(A)]_64 || [len(C)]_64)`
    fn s_hash(&self, adata: &[u8], c: &[u8]) -> u128 {
        let mut len = [0u8; 16];
        len[..8].copy_from_slice(&((adata.len() as u64) << 3).to_be_bytes());
        len[8..].copy_from_slice(&((c.len() as u64) << 3).to_be_bytes());

        let s = self.g_hash(0, adata);
        let s = self.g_hash(s, c);
        self.g_hash(s, &len)
    }
}

impl<E: BlockEncrypt<16>> GCM<E> {
    pub fn new(cipher: E, mac_size: usize) -> Result<Self, CipherError> {
        if !Self::MAC_SIZES.contains(&mac_size) {
            return Err(CipherError::InvalidArgument(format!(
                "gcm: not support the MAC length `{mac_size}`, it should be in {:?}",
                Self::MAC_SIZES
            )));
        }

        let h = u128::from_be_bytes(cipher.encrypt_block(&[0u8; 16]));
        Ok(Self {
            cipher,
            mac_size,
            h,
        })
    }

    // 从计数块`cb`开始的CTR, x无需是分组大小的整数倍
    fn g_ctr(&self, mut cb: u128, x: &[u8], out: &mut Vec<u8>) {
        for chunk in x.chunks(16) {
            let ks = self.cipher.encrypt_block(&cb.to_be_bytes());
            out.extend(ks.iter().zip(chunk).map(|(&a, &b)| a ^ b));
            cb = Self::inc_s(cb, 32);
        }
    }

    fn tag(&self, j0: u128, adata: &[u8], c: &[u8]) -> [u8; 16] {
        let s = self.s_hash(adata, c);
        let t = self.cipher.encrypt_block(&j0.to_be_bytes());
        (u128::from_be_bytes(t) ^ s).to_be_bytes()
    }
}

impl<E: BlockEncrypt<16>> AuthenticationCipher for GCM<E> {
    fn mac_size(&self) -> usize {
        self.mac_size
    }

    fn auth_encrypt(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), CipherError> {
        Self::check_nonce_and_payload(nonce, plaintext.len())?;

        let j0 = self.j0(nonce);
        let start = out.len();
        self.g_ctr(Self::inc_s(j0, 32), plaintext, out);
        let t = self.tag(j0, associated_data, &out[start..]);
        out.extend_from_slice(&t[..self.mac_size]);

        Ok(())
    }

    fn auth_decrypt(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), CipherError> {
        if ciphertext.len() < self.mac_size {
            return Err(CipherError::TagMismatch);
        }
        let (c, t) = ciphertext.split_at(ciphertext.len() - self.mac_size);
        Self::check_nonce_and_payload(nonce, c.len())?;

        let j0 = self.j0(nonce);
        let tag = self.tag(j0, associated_data, c);
        if !utils::ct_eq(&tag[..self.mac_size], t) {
            return Err(CipherError::TagMismatch);
        }

        self.g_ctr(Self::inc_s(j0, 32), c, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::GCM;
    use crate::block_cipher::AES;
    use crate::{AuthenticationCipher, CipherError};

    const K: &str = "feffe9928665731c6d6a8f9467308308";
    const P: &str = "d9313225f88406e5a55909c5aff5269a86a7a9531534f7da2e4c303d8a318a721c3c0c95956809532fcf0e2449a6b525b16aedf5aa0de657ba637b39";
    const A: &str = "feedfacedeadbeeffeedfacedeadbeefabaddad2";

    fn cases() -> Vec<(Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>)> {
        // (key, nonce, plaintext, adata, C || T)
        [
            (
                "00000000000000000000000000000000",
                "000000000000000000000000",
                "",
                "",
                "58e2fccefa7e3061367f1d57a4e7455a",
            ),
            (
                "00000000000000000000000000000000",
                "000000000000000000000000",
                "00000000000000000000000000000000",
                "",
                "0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf",
            ),
            (
                K,
                "cafebabefacedbaddecaf888",
                P,
                A,
                "42831ec2217774244b7221b784d0d49ce3aa212f2c02a4e035c17e2329aca12e21d514b25466931c7d8f6a5aac84aa051ba30b396a0aac973d58e0915bc94fbc3221a5db94fae95ae7121a47",
            ),
            (
                K,
                "cafebabefacedbad",
                P,
                A,
                "61353b4c2806934a777ff51fa22a4755699b2a714fcdc6f83766e5f97b6c742373806900e49f24b22b097544d4896b424989b5e1ebac0f07c23f45983612d2e79e3b0785561be14aaca2fccb",
            ),
        ]
        .into_iter()
        .map(|(k, n, p, a, c)| {
            let d = |s: &str| hex::decode(s).unwrap();
            (d(k), d(n), d(p), d(a), d(c))
        })
        .collect()
    }

    #[test]
    fn gcm_aes128() {
        for (i, (key, n, p, a, c)) in cases().into_iter().enumerate() {
            let gcm = GCM::new(AES::new(&key).unwrap(), 16).unwrap();
            let mut buf = vec![];
            gcm.auth_encrypt(&n, &a, &p, &mut buf).unwrap();
            assert_eq!(hex::encode(&buf), hex::encode(&c), "case {i}");

            let mut m = vec![];
            gcm.auth_decrypt(&n, &a, &c, &mut m).unwrap();
            assert_eq!(m, p, "case {i}");
        }
    }

    #[test]
    fn truncated_tag() {
        let (key, n, p, a, c) = cases().swap_remove(2);
        let gcm = GCM::new(AES::new(&key).unwrap(), 12).unwrap();
        let mut buf = vec![];
        gcm.auth_encrypt(&n, &a, &p, &mut buf).unwrap();
        assert_eq!(buf, c[..(p.len() + 12)]);

        assert!(GCM::new(AES::new(&key).unwrap(), 11).is_err());
        assert!(GCM::new(AES::new(&key).unwrap(), 17).is_err());
        assert!(gcm.auth_encrypt(&[], &a, &p, &mut vec![]).is_err());
    }

    #[test]
    fn tag_mismatch() {
        let (key, n, _, a, c) = cases().swap_remove(3);
        let gcm = GCM::new(AES::new(&key).unwrap(), 16).unwrap();

        for i in [0, c.len() / 2, c.len() - 1] {
            let mut bad = c.clone();
            bad[i] ^= 0x01;
            let mut m = vec![];
            assert_eq!(
                gcm.auth_decrypt(&n, &a, &bad, &mut m),
                Err(CipherError::TagMismatch)
            );
            assert!(m.is_empty());
        }

        assert_eq!(
            gcm.auth_decrypt(&n, &a[1..], &c, &mut vec![]),
            Err(CipherError::TagMismatch)
        );
        assert_eq!(
            gcm.auth_decrypt(&n, &a, &c[..15], &mut vec![]),
            Err(CipherError::TagMismatch)
        );
    }
}
