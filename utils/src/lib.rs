//! 大整数运算, 定长字节串编码以及常量时间比较

mod biguint_ext;
pub use biguint_ext::BigUintExt;

mod octets;
pub use octets::{ct_eq, i2osp, os2ip};
