use crate::ae::GCM;
use crate::block_cipher::AES;
use crate::cipher_mode::CBC;
use crate::mac::CMAC;
use crate::{
    AuthenticationCipher, BlockDecrypt, BlockEncrypt, BlockPadding, CipherError, Decrypt, Encrypt,
    ISO7816Padding,
};

/// AES会话密钥
///
/// 一个密钥同时用于CBC加解密, GCM认证加密, CMAC以及单分组(ECB)加解密. CMAC子密钥`K1, K2`在构造时计算一次.
#[derive(Clone)]
pub struct AesKey {
    aes: AES,
    cmac: CMAC<AES>,
}

impl AesKey {
    pub const BLOCK_SIZE: usize = AES::BLOCK_SIZE;

    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let aes = AES::new(key)?;
        let cmac = CMAC::new(aes.clone());
        Ok(Self { aes, cmac })
    }

    /// 密钥字节长度
    pub fn key_len(&self) -> usize {
        self.aes.key_size()
    }

    /// `iv`为`None`时使用全零IV; `data`长度必须是16的整数倍
    pub fn encrypt_cbc(&self, iv: Option<&[u8; 16]>, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut out = Vec::with_capacity(data.len());
        self.cbc(iv).encrypt(data, &mut out)?;
        Ok(out)
    }

    pub fn decrypt_cbc(&self, iv: Option<&[u8; 16]>, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut out = Vec::with_capacity(data.len());
        self.cbc(iv).decrypt(data, &mut out)?;
        Ok(out)
    }

    fn cbc(&self, iv: Option<&[u8; 16]>) -> CBC<&AES, 16> {
        CBC::new(&self.aes, iv.copied().unwrap_or_default())
    }

    fn gcm(&self, tag_bits: usize) -> Result<GCM<&AES>, CipherError> {
        if tag_bits % 8 != 0 {
            return Err(CipherError::InvalidArgument(format!(
                "gcm: tag length `{tag_bits}` bits is not a multiple of 8"
            )));
        }
        GCM::new(&self.aes, tag_bits >> 3)
    }

    /// 输出`C || T`, `tag_bits ∈ {96, 104, 112, 120, 128}`
    pub fn encrypt_gcm(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        data: &[u8],
        tag_bits: usize,
    ) -> Result<Vec<u8>, CipherError> {
        let mut out = Vec::with_capacity(data.len() + (tag_bits >> 3));
        self.gcm(tag_bits)?
            .auth_encrypt(nonce, associated_data, data, &mut out)?;
        Ok(out)
    }

    /// 输入`C || T`, 认证失败时返回`TagMismatch`
    pub fn decrypt_gcm(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        data: &[u8],
        tag_bits: usize,
    ) -> Result<Vec<u8>, CipherError> {
        let mut out = Vec::with_capacity(data.len());
        self.gcm(tag_bits)?
            .auth_decrypt(nonce, associated_data, data, &mut out)?;
        Ok(out)
    }

    /// 输出长度被限制在`[8, 16]`
    pub fn calculate_cmac(&self, data: &[u8], len: usize) -> Vec<u8> {
        self.cmac.calculate(data, len)
    }

    pub fn verify_cmac(&self, data: &[u8], mac: &[u8]) -> bool {
        self.cmac.verify(data, mac)
    }

    pub fn encrypt_block(&self, block: &[u8; 16]) -> [u8; 16] {
        self.aes.encrypt_block(block)
    }

    pub fn decrypt_block(&self, block: &[u8; 16]) -> [u8; 16] {
        self.aes.decrypt_block(block)
    }

    /// ISO/IEC 7816-4填充
    pub fn pad_iso(data: &[u8]) -> Vec<u8> {
        let mut buf = data.to_vec();
        ISO7816Padding::new(Self::BLOCK_SIZE).padding(&mut buf);
        buf
    }

    pub fn truncate_iso(data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut buf = data.to_vec();
        ISO7816Padding::new(Self::BLOCK_SIZE).unpadding(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::AesKey;
    use crate::CipherError;

    #[test]
    fn session_key() {
        let key = AesKey::new(&[0u8; 16]).unwrap();
        assert_eq!(key.key_len(), 16);

        let c = key.encrypt_cbc(None, &[0u8; 16]).unwrap();
        assert_eq!(hex::encode(&c), "66e94bd4ef8a2c3b884cfa59ca342b2e");
        assert_eq!(c, key.encrypt_block(&[0u8; 16]));
        assert_eq!(key.decrypt_block(&c.clone().try_into().unwrap()), [0u8; 16]);
        assert_eq!(key.decrypt_cbc(Some(&[0u8; 16]), &c).unwrap(), vec![0u8; 16]);

        assert!(matches!(
            key.encrypt_cbc(None, &[0u8; 10]),
            Err(CipherError::InvalidArgument(_))
        ));
        assert!(AesKey::new(&[0u8; 20]).is_err());
    }

    #[test]
    fn padded_cbc_round_trip() {
        let key = AesKey::new(&hex::decode("000102030405060708090a0b0c0d0e0f1011121314151617").unwrap()).unwrap();
        let iv = [0x5au8; 16];
        for len in [0usize, 1, 15, 16, 17, 100] {
            let msg = vec![0xa5u8; len];
            let c = key.encrypt_cbc(Some(&iv), &AesKey::pad_iso(&msg)).unwrap();
            assert_eq!(c.len(), (len / 16 + 1) * 16);
            let m = key.decrypt_cbc(Some(&iv), &c).unwrap();
            assert_eq!(AesKey::truncate_iso(&m).unwrap(), msg);
        }
        assert!(AesKey::truncate_iso(&[0u8; 16]).is_err());
    }

    #[test]
    fn gcm_and_cmac() {
        let key = AesKey::new(&hex::decode("feffe9928665731c6d6a8f9467308308").unwrap()).unwrap();
        let nonce = hex::decode("cafebabefacedbaddecaf888").unwrap();
        let msg = b"card to terminal";

        for bits in [96, 104, 112, 120, 128] {
            let c = key.encrypt_gcm(&nonce, b"hdr", msg, bits).unwrap();
            assert_eq!(c.len(), msg.len() + bits / 8);
            assert_eq!(key.decrypt_gcm(&nonce, b"hdr", &c, bits).unwrap(), msg);
            assert_eq!(
                key.decrypt_gcm(&nonce, b"hdx", &c, bits),
                Err(CipherError::TagMismatch)
            );
        }
        for bits in [64, 100, 136] {
            assert!(key.encrypt_gcm(&nonce, b"", msg, bits).is_err());
        }

        let t = key.calculate_cmac(msg, 8);
        assert_eq!(t.len(), 8);
        assert!(key.verify_cmac(msg, &t));
        assert!(!key.verify_cmac(b"card to terminaL", &t));
    }
}
