//! 预定义曲线
//!
//! 每条命名曲线只有一个共享的`DomainParameters`实例, 参数与表中某条曲线相同的构造结果都指向该实例.

mod brainpool;
mod secp;

use crate::{DomainParameters, ECPoint, GroupError};
use num_bigint::BigUint;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

pub(crate) struct CurveConsts {
    p: &'static str,
    a: &'static str,
    b: &'static str,
    gx: &'static str,
    gy: &'static str,
    n: &'static str,
    h: u32,
}

fn hex_int(s: &str) -> BigUint {
    // 常量表中的十六进制串, 由测试`named_curves_validate`保证合法
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap_or_default()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedCurve {
    BrainpoolP256r1,
    BrainpoolP384r1,
    BrainpoolP512r1,
    Secp256r1,
    Secp384r1,
    Secp521r1,
}

impl NamedCurve {
    pub const ALL: [NamedCurve; 6] = [
        Self::BrainpoolP256r1,
        Self::BrainpoolP384r1,
        Self::BrainpoolP512r1,
        Self::Secp256r1,
        Self::Secp384r1,
        Self::Secp521r1,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::BrainpoolP256r1 => "brainpoolP256r1",
            Self::BrainpoolP384r1 => "brainpoolP384r1",
            Self::BrainpoolP512r1 => "brainpoolP512r1",
            Self::Secp256r1 => "secp256r1",
            Self::Secp384r1 => "secp384r1",
            Self::Secp521r1 => "secp521r1",
        }
    }

    /// 点分十进制OID
    pub const fn oid(self) -> &'static str {
        match self {
            Self::BrainpoolP256r1 => "1.3.36.3.3.2.8.1.1.7",
            Self::BrainpoolP384r1 => "1.3.36.3.3.2.8.1.1.11",
            Self::BrainpoolP512r1 => "1.3.36.3.3.2.8.1.1.13",
            Self::Secp256r1 => "1.2.840.10045.3.1.7",
            Self::Secp384r1 => "1.3.132.0.34",
            Self::Secp521r1 => "1.3.132.0.35",
        }
    }

    pub fn from_oid(oid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.oid() == oid)
    }

    const fn consts(self) -> &'static CurveConsts {
        match self {
            Self::BrainpoolP256r1 => &brainpool::P256R1,
            Self::BrainpoolP384r1 => &brainpool::P384R1,
            Self::BrainpoolP512r1 => &brainpool::P512R1,
            Self::Secp256r1 => &secp::P256R1,
            Self::Secp384r1 => &secp::P384R1,
            Self::Secp521r1 => &secp::P521R1,
        }
    }

    /// 该曲线共享的域参数实例
    pub fn params(self) -> Arc<DomainParameters> {
        let table = table();
        // `table()`按`ALL`的顺序构造
        Arc::clone(&table[self as usize])
    }
}

fn table() -> &'static [Arc<DomainParameters>] {
    static TABLE: OnceLock<Vec<Arc<DomainParameters>>> = OnceLock::new();
    TABLE.get_or_init(|| {
        NamedCurve::ALL
            .into_iter()
            .map(|c| {
                let k = c.consts();
                let g = ECPoint::new(hex_int(k.gx), hex_int(k.gy));
                Arc::new(DomainParameters::new_uncheck(
                    hex_int(k.p),
                    hex_int(k.a),
                    hex_int(k.b),
                    g,
                    hex_int(k.n),
                    BigUint::from(k.h),
                    Some(c),
                ))
            })
            .collect()
    })
}

/// 参数与某条命名曲线完全相同时返回该曲线的共享实例
pub(crate) fn lookup(dp: &DomainParameters) -> Option<Arc<DomainParameters>> {
    table().iter().find(|x| x.same_parameters(dp)).cloned()
}

impl Display for NamedCurve {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedCurve {
    type Err = GroupError;

    /// 大小写不敏感, 另外接受`P-256`/`prime256v1`这类别名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let c = match lower.as_str() {
            "p-256" | "p256" | "prime256v1" => Self::Secp256r1,
            "p-384" | "p384" => Self::Secp384r1,
            "p-521" | "p521" => Self::Secp521r1,
            _ => {
                return Self::ALL
                    .into_iter()
                    .find(|c| c.name().to_ascii_lowercase() == lower)
                    .ok_or_else(|| GroupError::InvalidArgument(format!("unknown curve `{s}`")))
            }
        };
        Ok(c)
    }
}
