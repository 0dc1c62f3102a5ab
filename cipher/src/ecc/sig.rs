use crate::CipherError;
use encode::{asn1, Tlv};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// ECDSA签名`(R, S)`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// `R || S`, 各`τ`字节大端序
    pub fn to_bytes(&self, tau: usize) -> Result<Vec<u8>, CipherError> {
        let err = || CipherError::InvalidArgument("ecdsa: signature component too large".to_string());
        let mut v = utils::i2osp(&self.r, tau).ok_or_else(err)?;
        v.extend(utils::i2osp(&self.s, tau).ok_or_else(err)?);
        Ok(v)
    }

    pub fn from_bytes(data: &[u8], tau: usize) -> Result<Self, CipherError> {
        if data.len() != (tau << 1) {
            return Err(CipherError::InvalidArgument(format!(
                "ecdsa: signature length `{}` should be `{}`",
                data.len(),
                tau << 1
            )));
        }

        let (r, s) = data.split_at(tau);
        Ok(Self::new(utils::os2ip(r), utils::os2ip(s)))
    }

    /// `ECDSA-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`
    pub fn to_der(&self) -> Vec<u8> {
        asn1::sequence(vec![asn1::integer(&self.r), asn1::integer(&self.s)]).to_bytes()
    }

    pub fn from_der(data: &[u8]) -> Result<Self, CipherError> {
        let tlv = Tlv::from_bytes(data)?;
        let v = asn1::to_sequence(&tlv, 2)?;
        Ok(Self::new(asn1::to_integer(&v[0])?, asn1::to_integer(&v[1])?))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{r: {:x}, s: {:x}}}", self.r, self.s)
    }
}
