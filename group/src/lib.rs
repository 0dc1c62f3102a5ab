//! 素域上的短Weierstrass曲线`y² = x³ + a·x + b (mod p)`
//!
//! 点运算按BSI TR-03111 2.3.1使用仿射坐标, 大整数运算基于`num-bigint`.

mod error;
pub use error::GroupError;

pub mod curve;
pub use curve::NamedCurve;

mod domain;
pub use domain::DomainParameters;

mod point;
pub use point::ECPoint;

mod codec;
mod ecka;

#[cfg(test)]
mod tests;
