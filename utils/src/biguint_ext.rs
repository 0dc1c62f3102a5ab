use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{Euclid, One, ToPrimitive, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;

/// `BigUint`的扩展运算: 模逆, Legendre/Jacobi符号, 模平方根, 素性测试, 随机数
pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

// 小于256的奇素数, 用于试除
const SMALL_PRIMES: [u8; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// <<算法导论>>
    /// 定理31.23: 若有d=gcd(a, n), 假设对于某些整数x'和y', 有d=ax'+ny'. 如果d|b, 则方程
    /// ax=b(mod n)有一个解的值位x0, 则x0=x'(b/d) mod n;
    /// self * inv = 1 \mod modules
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        if modulus.is_zero() {
            return None;
        }

        let (a, n) = (BigInt::from(self.deref() % modulus), BigInt::from(modulus.clone()));
        let g = a.extended_gcd(&n);
        if g.gcd.is_one() {
            g.x.rem_euclid(&n).to_biguint()
        } else {
            None
        }
    }

    /// 生成`[0, self)`之间均匀分布的随机数, `self`为0时返回0
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> BigUint {
        if self.is_zero() {
            return BigUint::zero();
        }

        let bits = self.bits() as usize;
        loop {
            let r = Self::random_bits(bits, rng);
            if &r < self.deref() {
                return r;
            }
        }
    }

    /// 生成位长不超过`bits`的随机数
    pub fn random_bits<R: Rand>(bits: usize, rng: &mut R) -> BigUint {
        let mut buf = vec![0u8; (bits + 7) >> 3];
        rng.rand(buf.as_mut_slice());
        if bits & 7 != 0 {
            if let Some(x) = buf.first_mut() {
                *x &= (1u8 << (bits & 7)) - 1;
            }
        }
        BigUint::from_bytes_be(buf.as_slice())
    }

    /// Jacobi符号`(self/n)`, `n`需是正奇数, 否则返回`None`. <br>
    /// `n`是素数时即Legendre符号: 1表示二次剩余, -1表示二次非剩余, 0表示整除.
    pub fn jacobi(&self, n: &BigUint) -> Option<i8> {
        if n.is_even() {
            return None;
        }

        let (mut a, mut n) = (self.deref() % n, n.clone());
        let mut t = 1i8;
        while !a.is_zero() {
            let s = a.trailing_zeros().unwrap_or(0);
            a >>= s;
            let r = (&n % 8u32).to_u32().unwrap_or(0);
            if s & 1 == 1 && (r == 3 || r == 5) {
                t = -t;
            }

            std::mem::swap(&mut a, &mut n);
            if (&a % 4u32) == BigUint::from(3u8) && (&n % 4u32) == BigUint::from(3u8) {
                t = -t;
            }
            a %= &n;
        }

        Some(if n.is_one() { t } else { 0 })
    }

    /// 素数`p ≡ 3 mod 4`时的模平方根`self^((p+1)/4) mod p`. <br>
    /// `self`不是二次剩余或`p`不满足条件时返回`None`.
    pub fn sqrt_mod(&self, p: &BigUint) -> Option<BigUint> {
        if (p % 4u32) != BigUint::from(3u8) {
            return None;
        }

        let a = self.deref() % p;
        if a.is_zero() {
            return Some(a);
        }

        if self.jacobi(p)? != 1 {
            return None;
        }

        let y = a.modpow(&((p + 1u32) >> 2), p);
        (&y * &y % p == a).then_some(y)
    }

    /// 以2为底的对数, 取最高53位参与计算
    pub fn log2(&self) -> f64 {
        let bits = self.bits();
        if bits <= 53 {
            return self.to_f64().unwrap_or(0f64).log2();
        }

        let shift = bits - 53;
        let top = (self.deref() >> shift).to_f64().unwrap_or(0f64);
        top.log2() + shift as f64
    }

    /// 概率素性测试: 先用小素数试除, 再做Miller-Rabin测试. <br>
    ///
    /// `certainty`: 合数被误判为素数的概率不超过$2^{-certainty}$, Miller-Rabin每轮出错概率至多$1/4$,
    /// 故测试`ceil(certainty/2)`轮.
    pub fn probably_prime<R: Rand>(&self, certainty: usize, rng: &mut R) -> bool {
        let n = self.deref();
        if n < &BigUint::from(2u8) {
            return false;
        } else if n.is_even() {
            return n == &BigUint::from(2u8);
        }

        for &p in SMALL_PRIMES.iter() {
            let p = BigUint::from(p);
            if n == &p {
                return true;
            } else if (n % &p).is_zero() {
                return false;
            }
        }

        self.miller_rabin(certainty.div_ceil(2).max(1), rng)
    }

    /// `self`是大于256的奇数
    fn miller_rabin<R: Rand>(&self, rounds: usize, rng: &mut R) -> bool {
        let n = self.deref();
        let n_m1 = n - 1u32;
        let s = n_m1.trailing_zeros().unwrap_or(0);
        let r = &n_m1 >> s;
        // a ∈ [2, n-2]
        let range = BigUintExt(n - 3u32);

        'next_round: for _ in 0..rounds {
            let a = range.gen_random(rng) + 2u32;
            let mut y = a.modpow(&r, n);
            if y.is_one() || y == n_m1 {
                continue;
            }

            for _ in 1..s {
                y = &y * &y % n;
                if y == n_m1 {
                    continue 'next_round;
                } else if y.is_one() {
                    return false;
                }
            }

            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use crate::BigUintExt;
    use num_bigint::BigUint;
    use num_traits::Num;
    use rand::DefaultRand;

    #[test]
    fn modinv() {
        let (a, n) = (BigUint::from(17u32), BigUint::from(780u32));
        assert_eq!(BigUintExt(&a).modinv(&n), Some(BigUint::from(413u32)));
        assert_eq!(BigUintExt(BigUint::from(6u32)).modinv(&n), None);
        assert_eq!(BigUintExt(&a).modinv(&BigUint::default()), None);
    }

    #[test]
    fn jacobi_symbol() {
        let p = BigUint::from(23u32);
        let residues = (1u32..23).map(|x| x * x % 23).collect::<Vec<_>>();
        for a in 1u32..23 {
            let tgt = if residues.contains(&a) { 1 } else { -1 };
            assert_eq!(BigUintExt(BigUint::from(a)).jacobi(&p), Some(tgt), "a = {a}");
        }
        assert_eq!(BigUintExt(BigUint::from(46u32)).jacobi(&p), Some(0));
        // (2/15) = (2/3)(2/5) = 1, 但2不是模15的二次剩余
        assert_eq!(BigUintExt(BigUint::from(2u32)).jacobi(&BigUint::from(15u32)), Some(1));
        assert_eq!(BigUintExt(BigUint::from(2u32)).jacobi(&BigUint::from(16u32)), None);
    }

    #[test]
    fn sqrt_mod_p3() {
        let p = BigUint::from(23u32);
        for x in 1u32..23 {
            let a = BigUint::from(x * x % 23);
            let y = BigUintExt(&a).sqrt_mod(&p).unwrap();
            assert_eq!(&y * &y % &p, a);
        }
        assert_eq!(BigUintExt(BigUint::from(5u32)).sqrt_mod(&p), None);
        // 13 ≡ 1 mod 4
        assert_eq!(BigUintExt(BigUint::from(4u32)).sqrt_mod(&BigUint::from(13u32)), None);
    }

    #[test]
    fn log2() {
        assert_eq!(BigUintExt(BigUint::from(1024u32)).log2(), 10f64);
        let x = BigUint::from(1u32) << 1000u32;
        assert!((BigUintExt(&x).log2() - 1000f64).abs() < 1e-9);
        let y = (BigUint::from(3u32) << 999u32) >> 1u32;
        assert!((BigUintExt(&y).log2() - (998f64 + 3f64.log2())).abs() < 1e-9);
    }

    #[test]
    fn random_below() {
        let mut rng = DefaultRand::default();
        let n = BigUint::from(1000u32);
        for _ in 0..200 {
            assert!(BigUintExt(&n).gen_random(&mut rng) < n);
        }
        let x = BigUintExt::<BigUint>::random_bits(13, &mut rng);
        assert!(x.bits() <= 13);
    }

    #[test]
    fn composite_validate() {
        let cases = [
            "0",
            "1",
            "4",
            "3233",
            "21284175091214687912771199898307297748211672914763848041968395774954376176754",
            "6084766654921918907427900243509372380954290099172559290432744450051395395951",
            "84594350493221918389213352992032324280367711247940675652888030554255915464401",
            "82793403787388584738507275144194252681",
            // strong pseudoprime to prime bases 2 through 29
            "1195068768795265792518361315725116351898245581",
            "989",
            "5777",
            "3673744903",
            "80579735209",
        ];

        let mut rng = DefaultRand::default();
        for s in cases {
            let n = BigUint::from_str_radix(s, 10).unwrap();
            assert!(!BigUintExt(n).probably_prime(40, &mut rng), "composite `{s}`");
        }
    }

    #[test]
    fn prime_validate() {
        let cases = [
            "2",
            "3",
            "61",
            "53",
            "251",
            "257",
            "13756265695458089029",
            "18699199384836356663",
            "98920366548084643601728869055592650835572950932266967461790948584315647051443",
            // 2^255-19
            "57896044618658097711785492504343953926634992332820282019728792003956564819949",
            // 2^521-1
            "6864797660130609714981900799081393217269435300143305409394463459185543183397656052122559640661454554977296311391480858037121987999716643812574028291115057151",
        ];

        let mut rng = DefaultRand::default();
        for s in cases {
            let n = BigUint::from_str_radix(s, 10).unwrap();
            assert!(BigUintExt(n).probably_prime(100, &mut rng), "prime `{s}`");
        }
    }
}
