use crate::Rand;

/// 按顺序回放给定的字节序列, 读完后从头循环. <br>
///
/// 只用于复现已知测试向量(固定的nonce, salt, seed), 不能用于生成密钥.
#[derive(Clone, Debug)]
pub struct FixedRand {
    data: Vec<u8>,
    idx: usize,
}

impl FixedRand {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            idx: 0,
        }
    }
}

impl Rand for FixedRand {
    fn rand(&mut self, random: &mut [u8]) {
        if self.data.is_empty() {
            random.fill(0);
            return;
        }

        for x in random.iter_mut() {
            *x = self.data[self.idx];
            self.idx = (self.idx + 1) % self.data.len();
        }
    }
}
