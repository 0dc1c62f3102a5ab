//! 智能卡密码算法
//!
//! - 对称算法: AES, CBC, GCM, CMAC, ISO/IEC 7816-4填充, AES会话密钥;
//! - 消息认证: CMAC, HMAC;
//! - RSA: 普通/CRT私钥, 密钥生成与检查, OAEP, PKCS #1 v1.5, PSS, ISO/IEC 9796-2;
//! - 椭圆曲线: ECDSA, ECKA, 卡片通信用的加密报文;

mod error;
pub use error::CipherError;

pub use rand::{DefaultRand, Rand};

pub mod block_cipher;
pub use block_cipher::{BlockCipher, BlockDecrypt, BlockEncrypt};

pub mod cipher_mode;
pub use cipher_mode::{BlockPadding, ISO7816Padding};

pub mod mac;
pub use mac::MAC;

pub mod ae;
pub use ae::AuthenticationCipher;

mod aes_key;
pub use aes_key::AesKey;

pub mod ecc;
pub mod rsa;

pub trait Encrypt {
    // 写入ciphertext之前不清空
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Decrypt {
    // 写入plaintext之前不清空
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Cipher: Encrypt + Decrypt {}

impl<T> Cipher for T where T: Encrypt + Decrypt {}

pub trait Sign {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Verify {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError>;
}

pub trait Signer: Sign + Verify {}

impl<T> Signer for T where T: Sign + Verify {}
