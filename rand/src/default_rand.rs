use crate::Rand;
use xrand::rngs::OsRng;
use xrand::RngCore;

/// 默认使用OsRng <br>
#[derive(Copy, Clone, Default, Debug)]
pub struct DefaultRand {
    rng: OsRng,
}

impl Rand for DefaultRand {
    fn rand(&mut self, random: &mut [u8]) {
        self.rng.fill_bytes(random);
    }
}

#[cfg(test)]
mod tests {
    use crate::{DefaultRand, Rand};

    #[test]
    fn rand_f64_range() {
        let mut rng = DefaultRand::default();
        for _ in 0..1000 {
            let x = rng.rand_f64();
            assert!((0.0..1.0).contains(&x), "{x} out of [0, 1)");
        }
    }

    #[test]
    fn fill_not_constant() {
        let mut rng = DefaultRand::default();
        let (mut a, mut b) = ([0u8; 32], [0u8; 32]);
        rng.rand(&mut a);
        rng.rand(&mut b);
        assert_ne!(a, b);
    }
}
