use crate::{DomainParameters, GroupError};
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt::{Display, Formatter};
use utils::BigUintExt;

/// 仿射坐标点或无穷远点`O`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ECPoint {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl ECPoint {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Self::Affine { x, y }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Self::Infinity)
    }

    pub fn x(&self) -> Option<&BigUint> {
        match self {
            Self::Affine { x, .. } => Some(x),
            Self::Infinity => None,
        }
    }

    pub fn y(&self) -> Option<&BigUint> {
        match self {
            Self::Affine { y, .. } => Some(y),
            Self::Infinity => None,
        }
    }
}

impl Display for ECPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infinity => f.write_str("O"),
            Self::Affine { x, y } => write!(f, "{{x: {x:x}, y: {y:x}}}"),
        }
    }
}

impl DomainParameters {
    // a - b mod p
    fn fsub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let p = self.p();
        (a % p + p - b % p) % p
    }

    fn finv(&self, a: &BigUint) -> Result<BigUint, GroupError> {
        BigUintExt(a).modinv(self.p()).ok_or_else(|| {
            GroupError::Arithmetic("field element is not invertible".to_string())
        })
    }

    /// `O`合法, 否则坐标小于p且满足`y² = x³ + a·x + b (mod p)`
    pub fn is_point_on_curve(&self, point: &ECPoint) -> bool {
        let ECPoint::Affine { x, y } = point else {
            return true;
        };

        let p = self.p();
        if x >= p || y >= p {
            return false;
        }

        y * y % p == self.curve_rhs(x)
    }

    /// `x³ + a·x + b mod p`
    pub(crate) fn curve_rhs(&self, x: &BigUint) -> BigUint {
        let p = self.p();
        let x2 = x * x % p;
        (x2 * x + self.a() * x + self.b()) % p
    }

    pub fn negate(&self, point: &ECPoint) -> ECPoint {
        match point {
            ECPoint::Infinity => ECPoint::Infinity,
            ECPoint::Affine { x, y } if y.is_zero() => ECPoint::new(x.clone(), y.clone()),
            ECPoint::Affine { x, y } => ECPoint::new(x.clone(), self.p() - y),
        }
    }

    /// BSI TR-03111 2.3.1
    pub fn add(&self, lhs: &ECPoint, rhs: &ECPoint) -> Result<ECPoint, GroupError> {
        let (x1, y1, x2, y2) = match (lhs, rhs) {
            (ECPoint::Infinity, _) => return Ok(rhs.clone()),
            (_, ECPoint::Infinity) => return Ok(lhs.clone()),
            (ECPoint::Affine { x: x1, y: y1 }, ECPoint::Affine { x: x2, y: y2 }) => {
                (x1, y1, x2, y2)
            }
        };

        if x1 == x2 {
            // P = Q 或 P = -Q
            return if y1 == y2 && !y1.is_zero() {
                self.double(lhs)
            } else {
                Ok(ECPoint::Infinity)
            };
        }

        let p = self.p();
        let lambda = self.fsub(y2, y1) * self.finv(&self.fsub(x2, x1))? % p;
        Ok(self.chord(&lambda, x1, y1, x2))
    }

    pub fn double(&self, point: &ECPoint) -> Result<ECPoint, GroupError> {
        let ECPoint::Affine { x, y } = point else {
            return Ok(ECPoint::Infinity);
        };
        if y.is_zero() {
            return Ok(ECPoint::Infinity);
        }

        // λ = (3x² + a) / 2y
        let p = self.p();
        let num = (x * x * 3u32 + self.a()) % p;
        let lambda = num * self.finv(&((y << 1u32) % p))? % p;
        Ok(self.chord(&lambda, x, y, x))
    }

    // x3 = λ² - x1 - x2, y3 = λ(x1 - x3) - y1
    fn chord(&self, lambda: &BigUint, x1: &BigUint, y1: &BigUint, x2: &BigUint) -> ECPoint {
        let p = self.p();
        let l2 = lambda * lambda % p;
        let x3 = self.fsub(&self.fsub(&l2, x1), x2);
        let y3 = self.fsub(&(lambda * self.fsub(x1, &x3) % p), y1);
        ECPoint::new(x3, y3)
    }

    /// 标量乘`k·P`, 要求`k ∈ [1, n]`
    pub fn multiply(&self, k: &BigUint, point: &ECPoint) -> Result<ECPoint, GroupError> {
        if k.is_zero() || k > self.order() {
            return Err(GroupError::InvalidArgument(
                "scalar must be in [1, n]".to_string(),
            ));
        }

        self.mul_inner(k, point)
    }

    fn mul_inner(&self, k: &BigUint, point: &ECPoint) -> Result<ECPoint, GroupError> {
        if point.is_infinity() || k.is_zero() {
            return Ok(ECPoint::Infinity);
        }

        // 从高位到低位double-and-add
        let mut r = ECPoint::Infinity;
        for i in (0..k.bits()).rev() {
            r = self.double(&r)?;
            if k.bit(i) {
                r = self.add(&r, point)?;
            }
        }

        Ok(r)
    }

    /// `k1·P1 + k2·P2`, `k1, k2 ∈ [0, n]`, 同时扫描两个标量的比特位(Shamir's trick)
    pub fn multiply_add(
        &self,
        k1: &BigUint,
        p1: &ECPoint,
        k2: &BigUint,
        p2: &ECPoint,
    ) -> Result<ECPoint, GroupError> {
        if k1 > self.order() || k2 > self.order() {
            return Err(GroupError::InvalidArgument(
                "scalar must be in [0, n]".to_string(),
            ));
        }

        let sum = self.add(p1, p2)?;
        let bits = k1.bits().max(k2.bits());
        let mut r = ECPoint::Infinity;
        for i in (0..bits).rev() {
            r = self.double(&r)?;
            r = match (k1.bit(i), k2.bit(i)) {
                (true, true) => self.add(&r, &sum)?,
                (true, false) => self.add(&r, p1)?,
                (false, true) => self.add(&r, p2)?,
                (false, false) => r,
            };
        }

        Ok(r)
    }
}
