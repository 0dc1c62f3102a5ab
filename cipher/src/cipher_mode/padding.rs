use crate::CipherError;

pub trait BlockPadding {
    fn padding(&self, buf: &mut Vec<u8>);

    fn unpadding(&self, buf: &mut Vec<u8>) -> Result<(), CipherError>;
}

/// ISO/IEC 7816-4(ISO/IEC 9797-1 method 2): 填充`0x80`, 再补充若干个`0x00`以使得填充后的数据字节长度是分组长度的整数倍. <br>
///
/// 去填充时从尾部最多向前扫描一个分组长度: 跳过`0x00`后必须遇到`0x80`.
#[derive(Copy, Clone, Debug)]
pub struct ISO7816Padding {
    block_size: usize,
}

impl ISO7816Padding {
    pub const fn new(block_size: usize) -> Self {
        Self { block_size }
    }
}

impl Default for ISO7816Padding {
    fn default() -> Self {
        Self::new(16)
    }
}

impl BlockPadding for ISO7816Padding {
    fn padding(&self, buf: &mut Vec<u8>) {
        buf.push(0x80);
        let r = buf.len() % self.block_size;
        if r != 0 {
            buf.resize(buf.len() + self.block_size - r, 0);
        }
    }

    fn unpadding(&self, buf: &mut Vec<u8>) -> Result<(), CipherError> {
        let pos = buf
            .iter()
            .rev()
            .take(self.block_size)
            .position(|&x| x != 0);

        match pos {
            Some(i) if buf[buf.len() - 1 - i] == 0x80 => {
                buf.truncate(buf.len() - 1 - i);
                Ok(())
            }
            _ => Err(CipherError::InvalidArgument(
                "invalid ISO/IEC 7816-4 padding".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockPadding, ISO7816Padding};

    #[test]
    fn pad_and_truncate() {
        let p = ISO7816Padding::default();
        for len in 0..40usize {
            let msg = (0..len).map(|x| x as u8 | 0x01).collect::<Vec<_>>();
            let mut buf = msg.clone();
            p.padding(&mut buf);
            assert_eq!(buf.len() % 16, 0);
            assert!(buf.len() > msg.len() && buf.len() <= msg.len() + 16);
            assert_eq!(buf[msg.len()], 0x80);
            p.unpadding(&mut buf).unwrap();
            assert_eq!(buf, msg);
        }

        // 数据本身以0x80结尾
        let mut buf = vec![0x80u8; 16];
        p.padding(&mut buf);
        assert_eq!(buf.len(), 32);
        p.unpadding(&mut buf).unwrap();
        assert_eq!(buf, vec![0x80u8; 16]);
    }

    #[test]
    fn malformed() {
        let p = ISO7816Padding::default();
        for bad in [vec![], vec![0u8; 16], vec![1u8, 2, 3], vec![0x80, 0x01]] {
            let mut buf = bad.clone();
            assert!(p.unpadding(&mut buf).is_err(), "{bad:?}");
        }

        // 超过一个分组的0x00
        let mut buf = vec![0x80u8];
        buf.extend([0u8; 16]);
        assert!(p.unpadding(&mut buf).is_err());
    }
}
