use crate::{BlockDecrypt, BlockEncrypt, CipherError, Decrypt, Encrypt};
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

/// Cipher Block Chaining Mode(CBC) <br>
///
/// 不做填充, 数据长度必须是分组长度的整数倍.
pub struct CBC<E, const BLOCK_SIZE: usize> {
    cipher: E,
    iv: [u8; BLOCK_SIZE],
}

impl<E, const N: usize> CBC<E, N> {
    pub fn new(cipher: E, iv: [u8; N]) -> Self {
        Self { cipher, iv }
    }

    /// 全零IV
    pub fn with_zero_iv(cipher: E) -> Self {
        Self::new(cipher, [0u8; N])
    }

    pub fn set_iv(&mut self, iv: [u8; N]) {
        self.iv = iv;
    }

    fn check_len(len: usize) -> Result<(), CipherError> {
        if len % N != 0 {
            Err(CipherError::InvalidArgument(format!(
                "cbc: data length `{len}` is not a multiple of the block size `{N}`"
            )))
        } else {
            Ok(())
        }
    }
}

impl<E: BlockEncrypt<N>, const N: usize> Encrypt for CBC<E, N> {
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        Self::check_len(plaintext.len())?;

        let mut iv = self.iv;
        for chunk in plaintext.chunks_exact(N) {
            iv.iter_mut().zip(chunk).for_each(|(a, &b)| *a ^= b);
            iv = self.cipher.encrypt_block(&iv);
            ciphertext.extend_from_slice(&iv);
        }

        Ok(())
    }
}

impl<E: BlockDecrypt<N>, const N: usize> Decrypt for CBC<E, N> {
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError> {
        Self::check_len(ciphertext.len())?;

        let mut iv = self.iv;
        for chunk in ciphertext.chunks_exact(N) {
            let mut block = [0u8; N];
            block.copy_from_slice(chunk);
            let mut d = self.cipher.decrypt_block(&block);
            d.iter_mut().zip(iv.iter()).for_each(|(a, &b)| *a ^= b);
            plaintext.extend_from_slice(&d);
            iv = block;
        }

        Ok(())
    }
}

#[cfg(feature = "sec-zeroize")]
impl<E: Zeroize, const N: usize> Zeroize for CBC<E, N> {
    fn zeroize(&mut self) {
        self.cipher.zeroize();
        self.iv.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::CBC;
    use crate::block_cipher::AES;
    use crate::{CipherError, Decrypt, Encrypt};

    // SP 800-38A F.2.1, F.2.2
    #[test]
    fn sp800_38a_cbc_aes128() {
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e5130c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710").unwrap();
        let tgt = "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b273bed6b8e3c1743b7116e69e222295163ff1caa1681fac09120eca307586e1a7";

        let cbc: CBC<AES, 16> = CBC::new(AES::new(&key).unwrap(), iv.try_into().unwrap());
        let mut c = vec![];
        cbc.encrypt(&pt, &mut c).unwrap();
        assert_eq!(hex::encode(&c), tgt);

        let mut m = vec![];
        cbc.decrypt(&c, &mut m).unwrap();
        assert_eq!(m, pt);
    }

    #[test]
    fn zero_iv_and_length() {
        let cbc: CBC<_, 16> = CBC::with_zero_iv(AES::new(&[0u8; 16]).unwrap());
        let mut c = vec![];
        cbc.encrypt(&[0u8; 16], &mut c).unwrap();
        assert_eq!(hex::encode(&c), "66e94bd4ef8a2c3b884cfa59ca342b2e");

        assert!(matches!(
            cbc.encrypt(&[0u8; 15], &mut c),
            Err(CipherError::InvalidArgument(_))
        ));
        assert!(cbc.decrypt(&[0u8; 17], &mut c).is_err());

        let mut empty = vec![];
        cbc.encrypt(&[], &mut empty).unwrap();
        assert!(empty.is_empty());
    }
}
