//! 椭圆曲线密钥的编解码
//!
//! 私钥:
//! - `Asn1`: RFC 5915 `ECPrivateKey`, 域参数以显式的`SpecifiedECDomain`放在`[0]`中, `[1]`为公钥;
//! - `Iso7816`: `7F48{06 曲线OID, 92 d}`;
//! - `Pkcs1`: `SEQUENCE{1, OCTET STRING d}`, 不含域参数, 解码时需要调用方提供;
//! - `Pkcs8`: `PrivateKeyInfo{0, {id-ecPublicKey, 曲线OID}, OCTET STRING(Pkcs1)}`;
//!
//! 公钥:
//! - `Iso7816`: `7F49{06 曲线OID, 86 04 || X || Y}`;
//! - `X509`: `SubjectPublicKeyInfo{{id-ecPublicKey, 曲线OID}, BIT STRING(04 || X || Y)}`;
//!
//! `d`编码为`τ`字节, 曲线系数编码为`L`字节.

use crate::ecc::{PrivateKey, PublicKey};
use crate::CipherError;
use encode::{asn1, Tlv};
use group::{DomainParameters, ECPoint};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

const ID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const PRIME_FIELD: &str = "1.2.840.10045.1.1";
const TAG_PRIVATE_KEY: u32 = 0x7f48;
const TAG_PUBLIC_KEY: u32 = 0x7f49;
const TAG_SCALAR: u32 = 0x92;
const TAG_POINT: u32 = 0x86;
const TAG_PARAMETERS: u32 = 0xa0;
const TAG_EMBEDDED_PUBLIC_KEY: u32 = 0xa1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EcPrivateKeyFormat {
    Asn1,
    Iso7816,
    Pkcs1,
    Pkcs8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EcPublicKeyFormat {
    Iso7816,
    X509,
}

fn invalid(s: &str) -> CipherError {
    CipherError::InvalidArgument(format!("ec key format: {s}"))
}

fn curve_by_oid(oid: &Tlv) -> Result<Arc<DomainParameters>, CipherError> {
    Ok(DomainParameters::from_oid(&asn1::to_oid(oid)?)?)
}

// 解码得到的域参数和调用方给出的必须一致
fn check_params(
    decoded: Arc<DomainParameters>,
    expect: Option<&Arc<DomainParameters>>,
) -> Result<Arc<DomainParameters>, CipherError> {
    match expect {
        Some(x) if x != &decoded => Err(invalid("domain parameters mismatch")),
        _ => Ok(decoded),
    }
}

fn algorithm_identifier(oid: &str) -> Result<Tlv, CipherError> {
    Ok(asn1::sequence(vec![asn1::oid(ID_EC_PUBLIC_KEY)?, asn1::oid(oid)?]))
}

fn curve_from_algorithm(tlv: &Tlv) -> Result<Arc<DomainParameters>, CipherError> {
    let alg = asn1::to_sequence(tlv, 2)?;
    asn1::expect_oid(&alg[0], ID_EC_PUBLIC_KEY)?;
    curve_by_oid(&alg[1])
}

fn specified_domain(dp: &DomainParameters) -> Result<Tlv, CipherError> {
    Ok(asn1::sequence(vec![
        asn1::small_integer(1),
        asn1::sequence(vec![asn1::oid(PRIME_FIELD)?, asn1::integer(dp.p())]),
        asn1::sequence(vec![
            asn1::octet_string(dp.fe2os(dp.a())?),
            asn1::octet_string(dp.fe2os(dp.b())?),
        ]),
        asn1::octet_string(dp.encode_point(dp.generator(), false)?),
        asn1::integer(dp.order()),
        asn1::integer(dp.cofactor()),
    ]))
}

fn to_specified_domain(tlv: &Tlv) -> Result<Arc<DomainParameters>, CipherError> {
    let v = asn1::to_sequence(tlv, 6)?;
    asn1::expect_integer(&v[0], 1)?;

    let field = asn1::to_sequence(&v[1], 2)?;
    asn1::expect_oid(&field[0], PRIME_FIELD)?;
    let p = asn1::to_integer(&field[1])?;

    let curve = asn1::to_sequence(&v[2], 2)?;
    let (a, b) = (
        utils::os2ip(asn1::to_octet_string(&curve[0])?),
        utils::os2ip(asn1::to_octet_string(&curve[1])?),
    );

    let (n, h) = (asn1::to_integer(&v[4])?, asn1::to_integer(&v[5])?);
    let g = asn1::to_octet_string(&v[3])?;
    let g = match g.split_first() {
        Some((&0x04, xy)) if !xy.is_empty() && xy.len() % 2 == 0 => {
            let (x, y) = xy.split_at(xy.len() >> 1);
            ECPoint::new(utils::os2ip(x), utils::os2ip(y))
        }
        _ => return Err(invalid("base point must be uncompressed")),
    };

    Ok(DomainParameters::new(p, a, b, g, n, h)?)
}

impl PrivateKey {
    fn scalar_octets(&self) -> Result<Vec<u8>, CipherError> {
        utils::i2osp(self.scalar(), self.domain_parameters().order_len())
            .ok_or_else(|| invalid("private scalar too large"))
    }

    fn pkcs1_der(&self) -> Result<Tlv, CipherError> {
        Ok(asn1::sequence(vec![
            asn1::small_integer(1),
            asn1::octet_string(self.scalar_octets()?),
        ]))
    }

    fn from_pkcs1_der(tlv: &Tlv, dp: Arc<DomainParameters>) -> Result<Self, CipherError> {
        let v = asn1::to_sequence(tlv, 2)?;
        asn1::expect_integer(&v[0], 1)?;
        Self::new(dp, utils::os2ip(asn1::to_octet_string(&v[1])?))
    }

    pub fn encode(&self, format: EcPrivateKeyFormat) -> Result<Vec<u8>, CipherError> {
        let dp = self.domain_parameters();
        let tlv = match format {
            EcPrivateKeyFormat::Asn1 => asn1::sequence(vec![
                asn1::small_integer(1),
                asn1::octet_string(self.scalar_octets()?),
                Tlv::constructed(TAG_PARAMETERS, vec![specified_domain(dp)?]),
                Tlv::constructed(
                    TAG_EMBEDDED_PUBLIC_KEY,
                    vec![asn1::bit_string(&self.public_key().to_point_bytes(false)?)],
                ),
            ]),
            EcPrivateKeyFormat::Iso7816 => Tlv::constructed(
                TAG_PRIVATE_KEY,
                vec![
                    asn1::oid(self.public_key().curve_oid()?)?,
                    Tlv::primitive(TAG_SCALAR, self.scalar_octets()?),
                ],
            ),
            EcPrivateKeyFormat::Pkcs1 => self.pkcs1_der()?,
            EcPrivateKeyFormat::Pkcs8 => asn1::sequence(vec![
                asn1::small_integer(0),
                algorithm_identifier(self.public_key().curve_oid()?)?,
                asn1::octet_string(self.pkcs1_der()?.to_bytes()),
            ]),
        };

        Ok(tlv.to_bytes())
    }

    /// `dp`: `Pkcs1`格式必须提供; 其它格式提供时检查与解码出的域参数一致
    pub fn decode(
        data: &[u8],
        format: EcPrivateKeyFormat,
        dp: Option<&Arc<DomainParameters>>,
    ) -> Result<Self, CipherError> {
        let tlv = Tlv::from_bytes(data)?;
        match format {
            EcPrivateKeyFormat::Asn1 => {
                let v = asn1::to_sequence(&tlv, 3)?;
                asn1::expect_integer(&v[0], 1)?;
                let d = utils::os2ip(asn1::to_octet_string(&v[1])?);
                let params = v[2].expect_tag(TAG_PARAMETERS)?.children()?;
                let params = params.first().ok_or_else(|| invalid("missing domain parameters"))?;
                let key = Self::new(check_params(to_specified_domain(params)?, dp)?, d)?;

                if let Some(pk) = v.get(3) {
                    let w = pk.expect_tag(TAG_EMBEDDED_PUBLIC_KEY)?.children()?;
                    let w = w.first().ok_or_else(|| invalid("missing public key"))?;
                    if asn1::to_bit_string(w)? != key.public_key().to_point_bytes(false)? {
                        return Err(invalid("public key does not match the private key"));
                    }
                }
                Ok(key)
            }
            EcPrivateKeyFormat::Iso7816 => {
                let tlv = tlv.expect_tag(TAG_PRIVATE_KEY)?;
                let params = curve_by_oid(tlv.child(asn1::OBJECT_IDENTIFIER)?)?;
                let d = tlv.child(TAG_SCALAR)?.primitive_value()?;
                Self::new(check_params(params, dp)?, utils::os2ip(d))
            }
            EcPrivateKeyFormat::Pkcs1 => {
                let dp = dp.ok_or_else(|| invalid("pkcs1 needs the domain parameters"))?;
                Self::from_pkcs1_der(&tlv, dp.clone())
            }
            EcPrivateKeyFormat::Pkcs8 => {
                let info = asn1::to_sequence(&tlv, 3)?;
                asn1::expect_integer(&info[0], 0)?;
                let params = check_params(curve_from_algorithm(&info[1])?, dp)?;
                let inner = Tlv::from_bytes(asn1::to_octet_string(&info[2])?)?;
                Self::from_pkcs1_der(&inner, params)
            }
        }
    }
}

impl PublicKey {
    pub fn encode(&self, format: EcPublicKeyFormat) -> Result<Vec<u8>, CipherError> {
        let oid = self.curve_oid()?;
        let point = self.to_point_bytes(false)?;
        let tlv = match format {
            EcPublicKeyFormat::Iso7816 => Tlv::constructed(
                TAG_PUBLIC_KEY,
                vec![asn1::oid(oid)?, Tlv::primitive(TAG_POINT, point)],
            ),
            EcPublicKeyFormat::X509 => {
                asn1::sequence(vec![algorithm_identifier(oid)?, asn1::bit_string(&point)])
            }
        };

        Ok(tlv.to_bytes())
    }

    pub fn decode(data: &[u8], format: EcPublicKeyFormat) -> Result<Self, CipherError> {
        let tlv = Tlv::from_bytes(data)?;
        match format {
            EcPublicKeyFormat::Iso7816 => {
                let tlv = tlv.expect_tag(TAG_PUBLIC_KEY)?;
                let dp = curve_by_oid(tlv.child(asn1::OBJECT_IDENTIFIER)?)?;
                Self::from_point_bytes(dp, tlv.child(TAG_POINT)?.primitive_value()?)
            }
            EcPublicKeyFormat::X509 => {
                let spki = asn1::to_sequence(&tlv, 2)?;
                let dp = curve_from_algorithm(&spki[0])?;
                Self::from_point_bytes(dp, asn1::to_bit_string(&spki[1])?)
            }
        }
    }
}

impl Display for EcPrivateKeyFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Asn1 => "asn1",
            Self::Iso7816 => "iso7816",
            Self::Pkcs1 => "pkcs1",
            Self::Pkcs8 => "pkcs8",
        };
        f.write_str(s)
    }
}

impl FromStr for EcPrivateKeyFormat {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asn1" => Ok(Self::Asn1),
            "iso7816" => Ok(Self::Iso7816),
            "pkcs1" => Ok(Self::Pkcs1),
            "pkcs8" => Ok(Self::Pkcs8),
            _ => Err(invalid(&format!("unknown private key format `{s}`"))),
        }
    }
}

impl Display for EcPublicKeyFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iso7816 => f.write_str("iso7816"),
            Self::X509 => f.write_str("x509"),
        }
    }
}

impl FromStr for EcPublicKeyFormat {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iso7816" => Ok(Self::Iso7816),
            "x509" => Ok(Self::X509),
            _ => Err(invalid(&format!("unknown public key format `{s}`"))),
        }
    }
}
