//! 素域椭圆曲线上的密钥对
//!
//! - ECDSA: BSI TR-03111 4.2.1, 摘要算法由阶n的位长决定;
//! - ECKA: BSI TR-03111 4.3.1;
//! - 加密报文: 临时密钥对 + ECKA派生AES会话密钥, AES-CBC加密, CMAC认证;
//!

mod key;
pub use key::{PrivateKey, PublicKey};

mod sig;
pub use sig::Signature;

mod ecdsa;
pub use ecdsa::ECDSA;

mod cryptogram;

mod format;
pub use format::{EcPrivateKeyFormat, EcPublicKeyFormat};

pub use group::{DomainParameters, ECPoint, NamedCurve};
