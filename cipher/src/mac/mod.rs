/// Message Authentication Code <br>
///
/// 以某个密钥生成指定长度的消息摘要, 用于验证消息的完整性和身份验证(拥有该密钥的身份者才能够生成该摘要)
pub trait MAC {
    /// 输出的MAC字节长度
    fn mac_size(&self) -> usize;

    /// 追加写入`mac`, 写入之前不清空
    fn mac(&self, msg: &[u8], mac: &mut Vec<u8>);

    /// 常量时间比较
    fn verify_mac(&self, msg: &[u8], mac: &[u8]) -> bool {
        let mut buf = Vec::with_capacity(self.mac_size());
        self.mac(msg, &mut buf);
        utils::ct_eq(&buf, mac)
    }
}

mod cmac;
pub use cmac::CMAC;

mod hmac;
pub use hmac::HMAC;
