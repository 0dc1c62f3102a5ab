use crate::{curve, ECPoint, GroupError, NamedCurve};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::DefaultRand;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};
use utils::BigUintExt;

/// 椭圆曲线域参数`(p, a, b, G, n, h)`
///
/// - `L = ceil(bitlen(p)/8)`: 域元素的字节长度;
/// - `τ = ceil(bitlen(n)/8)`: 标量和签名分量的字节长度;
pub struct DomainParameters {
    p: BigUint,
    a: BigUint,
    b: BigUint,
    g: ECPoint,
    n: BigUint,
    h: BigUint,
    curve: Option<NamedCurve>,
    l: usize,
    tau: usize,
    p_3mod4: bool,
    // 只由上面不可变的字段计算, 重复计算得到同一个值
    fingerprint: OnceLock<u64>,
}

impl DomainParameters {
    pub(crate) fn new_uncheck(
        p: BigUint,
        a: BigUint,
        b: BigUint,
        g: ECPoint,
        n: BigUint,
        h: BigUint,
        curve: Option<NamedCurve>,
    ) -> Self {
        let l = ((p.bits() + 7) >> 3) as usize;
        let tau = ((n.bits() + 7) >> 3) as usize;
        let p_3mod4 = (&p % 4u32) == BigUint::from(3u8);
        Self {
            p,
            a,
            b,
            g,
            n,
            h,
            curve,
            l,
            tau,
            p_3mod4,
            fingerprint: OnceLock::new(),
        }
    }

    /// 构造域参数. 参数和某条命名曲线相同时返回该曲线的共享实例, 否则做基本的结构检查后返回新实例.
    ///
    /// 结构检查不包含素性测试, 完整检查见[`DomainParameters::validate`].
    pub fn new(
        p: BigUint,
        a: BigUint,
        b: BigUint,
        g: ECPoint,
        n: BigUint,
        h: BigUint,
    ) -> Result<Arc<Self>, GroupError> {
        let dp = Self::new_uncheck(p, a, b, g, n, h, None);
        if let Some(named) = curve::lookup(&dp) {
            return Ok(named);
        }

        dp.check_structure()?;
        log::debug!("unnamed domain parameters with {}-bit prime", dp.p.bits());
        Ok(Arc::new(dp))
    }

    pub fn from_oid(oid: &str) -> Result<Arc<Self>, GroupError> {
        NamedCurve::from_oid(oid)
            .map(NamedCurve::params)
            .ok_or_else(|| GroupError::InvalidArgument(format!("unknown curve oid `{oid}`")))
    }

    fn check_structure(&self) -> Result<(), GroupError> {
        let err = |s: &str| Err(GroupError::InvalidArgument(format!("domain parameters: {s}")));
        if self.p <= BigUint::from(3u8) || self.p.is_even() {
            return err("p must be an odd prime greater than 3");
        } else if self.a >= self.p || self.b >= self.p {
            return err("curve coefficients must be less than p");
        } else if self.discriminant().is_zero() {
            return err("singular curve");
        } else if self.n <= BigUint::one() || self.h.is_zero() {
            return err("invalid order or cofactor");
        } else if self.g.is_infinity() || !self.is_point_on_curve(&self.g) {
            return err("base point is not on the curve");
        }
        Ok(())
    }

    // 4a³ + 27b² mod p
    fn discriminant(&self) -> BigUint {
        let p = &self.p;
        let a3 = self.a.modpow(&BigUint::from(3u8), p);
        let b2 = &self.b * &self.b % p;
        (a3 * 4u32 + b2 * 27u32) % p
    }

    /// 完整检查: p和n是素数, 曲线非奇异, 基点在曲线上且`n·G = O`
    pub fn validate(&self) -> Result<(), GroupError> {
        self.check_structure()?;

        let mut rng = DefaultRand::default();
        if !BigUintExt(&self.p).probably_prime(64, &mut rng) {
            return Err(GroupError::InvalidArgument(
                "domain parameters: p is not prime".to_string(),
            ));
        } else if !BigUintExt(&self.n).probably_prime(64, &mut rng) {
            return Err(GroupError::InvalidArgument(
                "domain parameters: n is not prime".to_string(),
            ));
        }

        if !self.multiply(&self.n, &self.g)?.is_infinity() {
            return Err(GroupError::InvalidArgument(
                "domain parameters: n·G is not the point at infinity".to_string(),
            ));
        }

        Ok(())
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn generator(&self) -> &ECPoint {
        &self.g
    }

    pub fn order(&self) -> &BigUint {
        &self.n
    }

    pub fn cofactor(&self) -> &BigUint {
        &self.h
    }

    pub fn curve(&self) -> Option<NamedCurve> {
        self.curve
    }

    pub fn oid(&self) -> Option<&'static str> {
        self.curve.map(NamedCurve::oid)
    }

    /// L
    pub fn field_len(&self) -> usize {
        self.l
    }

    /// τ
    pub fn order_len(&self) -> usize {
        self.tau
    }

    pub fn is_p_3mod4(&self) -> bool {
        self.p_3mod4
    }

    pub(crate) fn same_parameters(&self, other: &Self) -> bool {
        self.p == other.p
            && self.a == other.a
            && self.b == other.b
            && self.g == other.g
            && self.n == other.n
            && self.h == other.h
    }

    fn fingerprint(&self) -> u64 {
        *self.fingerprint.get_or_init(|| {
            let mut state = DefaultHasher::new();
            self.p.hash(&mut state);
            self.a.hash(&mut state);
            self.b.hash(&mut state);
            self.g.hash(&mut state);
            self.n.hash(&mut state);
            self.h.hash(&mut state);
            state.finish()
        })
    }
}

impl PartialEq for DomainParameters {
    fn eq(&self, other: &Self) -> bool {
        match (self.curve, other.curve) {
            (Some(x), Some(y)) => x == y,
            _ => self.same_parameters(other),
        }
    }
}

impl Eq for DomainParameters {}

impl Hash for DomainParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

impl Debug for DomainParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.curve {
            Some(c) => f.debug_tuple("DomainParameters").field(&c).finish(),
            None => f
                .debug_struct("DomainParameters")
                .field("p", &format_args!("{:x}", self.p))
                .field("a", &format_args!("{:x}", self.a))
                .field("b", &format_args!("{:x}", self.b))
                .field("n", &format_args!("{:x}", self.n))
                .field("h", &self.h)
                .finish(),
        }
    }
}

impl Display for DomainParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.curve {
            Some(c) => write!(f, "{c}"),
            None => write!(f, "unnamed {}-bit curve", self.p.bits()),
        }
    }
}
