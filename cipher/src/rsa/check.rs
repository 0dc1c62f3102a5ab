//! 密钥检查
//!
//! 两类检查都返回问题描述的列表, 空列表表示通过; 是否拒绝该密钥由调用方决定.
//! - `check`: 各分量之间的数学一致性;
//! - `check_security`: 模数位长, 公钥指数范围以及两个素数的距离;

use crate::rsa::{CrtPrivateKey, PublicKey, RsaPrivate};
use crate::DefaultRand;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use utils::BigUintExt;

impl PublicKey {
    /// - 模数位长不小于`min_bits`;
    /// - `e ∈ [65537, 2^{255})`;
    pub fn check_security(&self, min_bits: usize) -> Vec<String> {
        let mut findings = Vec::new();

        if self.bits() < min_bits {
            findings.push(format!(
                "modulus length {} bits is shorter than {min_bits} bits",
                self.bits()
            ));
        }

        let e = self.exponent();
        if e < &BigUint::from(65537u32) || e.bits() > 255 {
            findings.push(format!(
                "public exponent {e:#x} is not in [65537, 2^255)"
            ));
        }

        findings.iter().for_each(|x| log::warn!("rsa: {x}"));
        findings
    }
}

impl CrtPrivateKey {
    /// - `p, q`是素数且`n = p·q`;
    /// - `d`是`e`模`lcm(p-1, q-1)`的最小逆元;
    /// - `dP = d mod (p-1)`, `dQ = d mod (q-1)`, `q·qInv = 1 mod p`;
    /// - `e`是不小于3的奇数;
    pub fn check(&self) -> Vec<String> {
        let mut findings = Vec::new();
        let mut rng = DefaultRand::default();
        let (pk, p, q) = (self.public_key(), self.p(), self.q());

        if !BigUintExt(p).probably_prime(Self::DEFAULT_CERTAINTY, &mut rng) {
            findings.push("p is not a probable prime".to_string());
        }
        if !BigUintExt(q).probably_prime(Self::DEFAULT_CERTAINTY, &mut rng) {
            findings.push("q is not a probable prime".to_string());
        }
        if &(p * q) != pk.modulus() {
            findings.push("modulus is not p·q".to_string());
        }

        let e = pk.exponent();
        if e.is_even() || e < &BigUint::from(3u8) {
            findings.push(format!("public exponent {e:#x} is not an odd integer >= 3"));
        }

        let (p1, q1) = (p - 1u32, q - 1u32);
        let lambda = p1.lcm(&q1);
        match BigUintExt(e).modinv(&lambda) {
            Some(d) if &d == self.private_exponent() => {}
            Some(_) => findings
                .push("private exponent is not the minimal inverse of e mod lcm(p-1, q-1)".to_string()),
            None => findings.push("public exponent is not invertible mod lcm(p-1, q-1)".to_string()),
        }

        let d = self.private_exponent();
        if &(d % &p1) != self.dp() {
            findings.push("dP is not d mod (p-1)".to_string());
        }
        if &(d % &q1) != self.dq() {
            findings.push("dQ is not d mod (q-1)".to_string());
        }
        if !(self.qinv() * q % p).is_one() {
            findings.push("qInv is not the inverse of q mod p".to_string());
        }

        findings.iter().for_each(|x| log::debug!("rsa check: {x}"));
        findings
    }

    /// 公钥的检查, 以及:
    /// - `|p - q| >= 2^{bitlen(n)/2 - 100}`;
    /// - `|log2(p/q)| <= 30`;
    pub fn check_security(&self, min_bits: usize) -> Vec<String> {
        let pk = self.public_key();
        let mut findings = pk.check_security(min_bits);
        let (p, q) = (self.p(), self.q());

        let diff = if p > q { p - q } else { q - p };
        let half = (pk.bits() / 2).saturating_sub(100);
        if diff < (BigUint::one() << half) {
            let x = format!("|p - q| is less than 2^{half}");
            log::warn!("rsa: {x}");
            findings.push(x);
        }

        let ratio = (BigUintExt(p).log2() - BigUintExt(q).log2()).abs();
        if ratio > 30.0 {
            let x = format!("|log2(p/q)| = {ratio:.2} is greater than 30");
            log::warn!("rsa: {x}");
            findings.push(x);
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use crate::rsa::{test_keys, CrtPrivateKey, RsaPrivate};
    use num_bigint::BigUint;

    #[test]
    fn consistent_keys() {
        assert!(test_keys::toy().check().is_empty());
        assert!(test_keys::rsa1024().check().is_empty());
    }

    #[test]
    fn inconsistent_keys() {
        let key = test_keys::toy();
        let pk = key.public_key();
        let b = |x: u32| BigUint::from(x);

        // d = 413 + 780 仍是逆元, 但不是最小的
        let bad = CrtPrivateKey::new(
            pk.modulus().clone(),
            pk.exponent().clone(),
            b(1193),
            b(61),
            b(53),
            b(53),
            b(49),
            b(38),
        )
        .unwrap();
        let findings = bad.check();
        assert_eq!(findings.len(), 1, "{findings:?}");

        let bad = CrtPrivateKey::new(
            pk.modulus().clone(),
            pk.exponent().clone(),
            b(413),
            b(61),
            b(53),
            b(52),
            b(48),
            b(37),
        )
        .unwrap();
        assert_eq!(bad.check().len(), 3);

        // 3233 = 61·53, 换成非素数的分解
        let bad = CrtPrivateKey::new(b(3233), b(17), b(413), b(3233), b(1), b(0), b(0), b(0));
        assert!(bad.is_err());
    }

    #[test]
    fn security_findings() {
        let key = test_keys::rsa1024();
        assert!(key.check_security(1024).is_empty());
        assert_eq!(key.check_security(2048).len(), 1);
        assert!(key.public_key().check_security(1024).is_empty());

        // 模数太短, e = 17
        let toy = test_keys::toy();
        let findings = toy.check_security(1024);
        assert_eq!(findings.len(), 2, "{findings:?}");

        // p和q的位长相差超过30
        let p = BigUint::parse_bytes(b"10000000000000000000000000000000000000000000000000000000000000129", 16);
        let key = CrtPrivateKey::from_primes(p.unwrap(), BigUint::from(65519u32), None).unwrap();
        let findings = key.check_security(32);
        assert!(findings.iter().any(|x| x.contains("log2(p/q)")), "{findings:?}");
    }
}
