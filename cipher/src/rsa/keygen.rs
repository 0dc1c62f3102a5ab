//! CRT私钥生成
//!
//! 先在对数域上确定模数的目标大小: `log2(n) = L - 1 + f, f ∈ [0, 1)`, 再让两个素数的对数相差`ε ∈ [0.1, 30]`:
//! `log2(p) = (log2(n) + ε) / 2`. `p`确定后, `q`在窗口`[ceil(2^{L-1}/p), floor((2^L-1)/p)]`中搜索, 从而`n`的位长恰好是`L`.
//!
//! 每个素数的最高53位取自目标对数, 其余低位随机, 从该奇数开始每次加2搜索; 离开窗口时在窗口内重新随机.

use crate::rsa::{CrtPrivateKey, PublicKey};
use crate::{CipherError, Rand};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use utils::BigUintExt;

/// 模数不超过64位时为3, 否则为65537
pub fn default_exponent(bits: usize) -> BigUint {
    if bits <= 64 {
        BigUint::from(3u8)
    } else {
        BigUint::from(65537u32)
    }
}

impl CrtPrivateKey {
    pub const MIN_BITS: usize = 16;
    /// 默认的素性测试确定度, 合数通过测试的概率不超过`2^{-100}`
    pub const DEFAULT_CERTAINTY: usize = 100;

    /// 生成`bits`位模数的CRT私钥
    ///
    /// - `exponent`: 公钥指数, `None`时使用[`default_exponent`];
    /// - `certainty`: 素性测试确定度;
    pub fn generate<R: Rand>(
        bits: usize,
        exponent: Option<BigUint>,
        certainty: usize,
        rng: &mut R,
    ) -> Result<Self, CipherError> {
        if bits < Self::MIN_BITS {
            return Err(CipherError::InvalidArgument(format!(
                "rsa: modulus bits `{bits}` should be at least {}",
                Self::MIN_BITS
            )));
        }

        let e = exponent.unwrap_or_else(|| default_exponent(bits));
        if e.is_even() || e < BigUint::from(3u8) || e.bits() as usize >= bits {
            return Err(CipherError::InvalidArgument(format!(
                "rsa: invalid public exponent {e:#x}"
            )));
        }

        let mut attempts = 0usize;
        loop {
            attempts += 1;
            if let Some(key) = Self::try_generate(bits, &e, certainty, rng) {
                log::debug!("rsa: generated {bits}-bit key after {attempts} attempt(s)");
                return Ok(key);
            }
            log::trace!("rsa: key generation attempt {attempts} failed, retry");
        }
    }

    fn try_generate<R: Rand>(
        bits: usize,
        e: &BigUint,
        certainty: usize,
        rng: &mut R,
    ) -> Option<Self> {
        let log2_n = (bits - 1) as f64 + rng.rand_f64();
        // 小模数时收窄ε, 保证q至少有4位
        let eps_max = 30f64.min((bits as f64 - 8.0) / 2.0);
        let eps = 0.1 + rng.rand_f64() * (eps_max - 0.1);
        let log2_p = (log2_n + eps) / 2.0;

        let p_bits = log2_p.floor() as usize + 1;
        let (p_lo, p_hi) = (
            BigUint::one() << (p_bits - 1),
            (BigUint::one() << p_bits) - 1u32,
        );
        let p = search_prime(log2_p, &p_lo, &p_hi, e, certainty, rng)?;

        let (n_lo, n_hi) = (
            BigUint::one() << (bits - 1),
            (BigUint::one() << bits) - 1u32,
        );
        let (q_lo, q_hi) = (n_lo.div_ceil(&p), &n_hi / &p);
        if q_lo > q_hi || q_lo < BigUint::from(3u8) {
            return None;
        }

        // 用实际的p修正q的目标, 再推入窗口
        let log2_q = (log2_n - BigUintExt(&p).log2())
            .clamp(BigUintExt(&q_lo).log2(), BigUintExt(&q_hi).log2());
        let q = search_prime(log2_q, &q_lo, &q_hi, e, certainty, rng)?;
        if p == q {
            return None;
        }

        Self::from_primes_with_exponent(p, q, e.clone()).ok()
    }

    /// 由两个素数构造私钥. `exponent`为`None`时从[`default_exponent`]开始每次加2, 直到与`(p-1)(q-1)`互素.
    pub fn from_primes(
        p: BigUint,
        q: BigUint,
        exponent: Option<BigUint>,
    ) -> Result<Self, CipherError> {
        if p == q || p < BigUint::from(3u8) || q < BigUint::from(3u8) {
            return Err(CipherError::InvalidArgument(
                "rsa: p and q must be distinct odd primes".to_string(),
            ));
        }

        let e = match exponent {
            Some(e) => e,
            None => {
                let phi = (&p - 1u32) * (&q - 1u32);
                let mut e = default_exponent((&p * &q).bits() as usize);
                while !e.gcd(&phi).is_one() {
                    e += 2u32;
                }
                e
            }
        };

        Self::from_primes_with_exponent(p, q, e)
    }

    fn from_primes_with_exponent(p: BigUint, q: BigUint, e: BigUint) -> Result<Self, CipherError> {
        let (p1, q1) = (&p - 1u32, &q - 1u32);
        let lambda = p1.lcm(&q1);
        let d = BigUintExt(&e).modinv(&lambda).ok_or_else(|| {
            CipherError::InvalidArgument(format!(
                "rsa: public exponent {e:#x} is not coprime to lcm(p-1, q-1)"
            ))
        })?;
        let qinv = BigUintExt(&q)
            .modinv(&p)
            .ok_or_else(|| CipherError::Arithmetic("rsa: q is not invertible mod p".to_string()))?;

        let n = &p * &q;
        let pk = PublicKey::new(n, e)?;
        let (dp, dq) = (&d % &p1, &d % &q1);
        Ok(Self::new_uncheck(pk, d, p, q, dp, dq, qinv))
    }
}

/// 以`2^{log2}`为起点在`[lo, hi]`中搜索满足`gcd(e, x-1) = 1`的素数, 窗口为空时返回`None`
fn search_prime<R: Rand>(
    log2: f64,
    lo: &BigUint,
    hi: &BigUint,
    e: &BigUint,
    certainty: usize,
    rng: &mut R,
) -> Option<BigUint> {
    if lo > hi {
        return None;
    }

    let mut x = target_from_log2(log2, rng).clamp(lo.clone(), hi.clone()) | BigUint::one();
    let width = BigUintExt(hi - lo + 1u32);
    let (mut tested, mut restarts) = (0usize, 0usize);
    loop {
        if &x > hi {
            // 离开窗口, 在窗口内重新随机
            restarts += 1;
            x = (lo + width.gen_random(rng)) | BigUint::one();
            continue;
        }

        tested += 1;
        if (&x - 1u32).gcd(e).is_one() && BigUintExt(&x).probably_prime(certainty, rng) {
            log::trace!(
                "rsa: found a {}-bit prime after {tested} candidate(s), {restarts} restart(s)",
                x.bits()
            );
            return Some(x);
        }
        x += 2u32;
    }
}

/// 最高53位取自`2^{log2}`, 其余位随机
fn target_from_log2<R: Rand>(log2: f64, rng: &mut R) -> BigUint {
    let bits = log2.floor() as usize + 1;
    // 2^{frac} ∈ [1, 2), 乘以2^52得到最高位为1的53位整数
    let top = (log2.fract().exp2() * (1u64 << 52) as f64) as u64;
    let top = BigUint::from(top.clamp(1 << 52, (1 << 53) - 1));

    if bits <= 53 {
        top >> (53 - bits)
    } else {
        let low = bits - 53;
        (top << low) | BigUintExt::<BigUint>::random_bits(low, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::search_prime;
    use crate::rsa::{default_exponent, CrtPrivateKey, RsaPrivate};
    use crate::{CipherError, DefaultRand};
    use num_bigint::BigUint;
    use num_traits::One;
    use rand::FixedRand;

    #[test]
    fn exact_modulus_bits() {
        let mut rng = DefaultRand::default();
        for bits in [16usize, 17, 31, 64, 65, 127, 256, 512, 521] {
            let key = CrtPrivateKey::generate(bits, None, 40, &mut rng).unwrap();
            let pk = key.public_key();
            assert_eq!(pk.bits(), bits);
            assert_eq!(pk.exponent(), &default_exponent(bits));
            assert!(key.check().is_empty(), "{bits}: {:?}", key.check());

            let m = BigUint::from(5u8);
            assert_eq!(key.rsadp(&pk.rsaep(&m).unwrap()).unwrap(), m);
        }
    }

    #[test]
    fn explicit_exponent() {
        let mut rng = DefaultRand::default();
        let e = BigUint::from(0x10003u32);
        let key = CrtPrivateKey::generate(768, Some(e.clone()), 64, &mut rng).unwrap();
        assert_eq!(key.public_key().exponent(), &e);
        let d = key.private_exponent();
        let lambda = num_integer::Integer::lcm(&(key.p() - 1u32), &(key.q() - 1u32));
        assert!((d * &e % lambda).is_one());

        assert!(matches!(
            CrtPrivateKey::generate(512, Some(BigUint::from(4u8)), 64, &mut rng),
            Err(CipherError::InvalidArgument(_))
        ));
        assert!(CrtPrivateKey::generate(8, None, 64, &mut rng).is_err());
    }

    #[test]
    fn fixed_rand_primes() {
        let seed = hex::decode("8ad64b5cc7507208622a87f31062feff21cd9209178e3355efa24e4842fd124a")
            .unwrap();
        let key = CrtPrivateKey::generate(64, None, 20, &mut FixedRand::new(&seed)).unwrap();
        assert_eq!(key.p(), &BigUint::from(0x240360cdb5u64));
        assert_eq!(key.q(), &BigUint::from(0x52d1845u64));
        assert_eq!(key.public_key().modulus(), &BigUint::from(0xba68e60eae3169c9u64));

        let again = CrtPrivateKey::generate(64, None, 20, &mut FixedRand::new(&seed)).unwrap();
        assert_eq!(again.p(), key.p());
        assert_eq!(again.q(), key.q());
    }

    #[test]
    fn window_restarts() {
        // [200, 230]中与e=3相容的素数只有227, 前100次随机都落在229, 之后离开窗口
        let mut data = vec![29u8; 100];
        data.push(26);
        let mut rng = FixedRand::new(&data);
        let (lo, hi, e) = (BigUint::from(200u8), BigUint::from(230u8), BigUint::from(3u8));
        assert_eq!(search_prime(8.0, &lo, &hi, &e, 20, &mut rng), Some(BigUint::from(227u8)));

        assert_eq!(search_prime(8.0, &hi, &lo, &e, 20, &mut rng), None);
    }

    #[test]
    fn primes_to_key() {
        // gcd(3, 60) != 1, gcd(5, 60) != 1, 7是第一个可用的指数
        let key = CrtPrivateKey::from_primes(BigUint::from(61u8), BigUint::from(53u8), None)
            .unwrap();
        assert_eq!(key.public_key().exponent(), &BigUint::from(7u8));
        assert_eq!(key.public_key().modulus(), &BigUint::from(3233u32));

        let key = CrtPrivateKey::from_primes(
            BigUint::from(61u8),
            BigUint::from(53u8),
            Some(BigUint::from(17u8)),
        )
        .unwrap();
        assert_eq!(key.private_exponent(), &BigUint::from(413u32));
        assert_eq!(key.qinv(), &BigUint::from(38u8));

        assert!(CrtPrivateKey::from_primes(
            BigUint::from(61u8),
            BigUint::from(53u8),
            Some(BigUint::from(3u8))
        )
        .is_err());
        assert!(CrtPrivateKey::from_primes(BigUint::from(61u8), BigUint::from(61u8), None).is_err());
    }
}
