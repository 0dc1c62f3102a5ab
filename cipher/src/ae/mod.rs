//! # Authenticated Encryption (AE)
//!
//!
//! 认证加密: Authentication + Confidentiality,
//!
use crate::CipherError;

/// 认证加密: 数据加密+消息认证 <br>
pub trait AuthenticationCipher {
    /// MAC字节长度
    fn mac_size(&self) -> usize;

    /// `(nonce, plaintext, associated_data) ---认证加密---> C || MAC` <br>
    /// 写入`out`之前不清空
    fn auth_encrypt(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), CipherError>;

    /// `(nonce, C || MAC, associated_data) ---认证解密---> plaintext` <br>
    /// MAC不一致时不输出任何明文
    fn auth_decrypt(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), CipherError>;
}

mod gcm;
pub use gcm::GCM;
