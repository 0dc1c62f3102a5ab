//! 随机数源
//!
//! 密钥生成, 签名nonce以及OAEP/PSS的seed/salt都通过`Rand`获取随机字节.

pub trait Rand {
    fn rand(&mut self, random: &mut [u8]);

    /// 返回`[0, 1)`之间均匀分布的浮点数, 取53位随机数作为尾数
    fn rand_f64(&mut self) -> f64 {
        let mut buf = [0u8; 8];
        self.rand(&mut buf);
        let x = u64::from_be_bytes(buf) >> 11;
        x as f64 / (1u64 << 53) as f64
    }
}

mod default_rand;
pub use default_rand::DefaultRand;

mod fixed_rand;
pub use fixed_rand::FixedRand;

impl<T: xrand::RngCore + xrand::CryptoRng> Rand for T {
    fn rand(&mut self, random: &mut [u8]) {
        self.fill_bytes(random);
    }
}
