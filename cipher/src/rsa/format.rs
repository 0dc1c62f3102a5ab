//! RSA密钥的编解码
//!
//! - 私钥`Pkcs1`: `RSAPrivateKey ::= SEQUENCE{0, n, e, d, p, q, dP, dQ, qInv}`;
//! - 私钥`Pkcs8`: `PrivateKeyInfo ::= SEQUENCE{0, SEQUENCE{rsaEncryption, NULL}, OCTET STRING(RSAPrivateKey)}`;
//! - 公钥`Iso7816`: `7F49{81 n, 82 e}`;
//! - 公钥`Pkcs1`: `RSAPublicKey ::= SEQUENCE{n, e}`;
//! - 公钥`X509`: `SubjectPublicKeyInfo ::= SEQUENCE{SEQUENCE{rsaEncryption, NULL}, BIT STRING(RSAPublicKey)}`;
//!

use crate::rsa::{CrtPrivateKey, PrivateKey, PublicKey, RsaPrivate};
use crate::CipherError;
use encode::asn1;
use encode::Tlv;
use num_bigint::BigUint;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const TAG_PUBLIC_KEY: u32 = 0x7f49;
const TAG_MODULUS: u32 = 0x81;
const TAG_EXPONENT: u32 = 0x82;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RsaPrivateKeyFormat {
    Pkcs1,
    Pkcs8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RsaPublicKeyFormat {
    Iso7816,
    Pkcs1,
    X509,
}

fn algorithm_identifier() -> Result<Tlv, CipherError> {
    Ok(asn1::sequence(vec![asn1::oid(RSA_ENCRYPTION)?, asn1::null()]))
}

fn expect_algorithm(tlv: &Tlv) -> Result<(), CipherError> {
    let alg = asn1::to_sequence(tlv, 1)?;
    asn1::expect_oid(&alg[0], RSA_ENCRYPTION)?;
    Ok(())
}

impl PublicKey {
    fn pkcs1_der(&self) -> Tlv {
        asn1::sequence(vec![
            asn1::integer(self.modulus()),
            asn1::integer(self.exponent()),
        ])
    }

    fn from_pkcs1_der(tlv: &Tlv) -> Result<Self, CipherError> {
        let s = asn1::to_sequence(tlv, 2)?;
        Self::new(asn1::to_integer(&s[0])?, asn1::to_integer(&s[1])?)
    }

    pub fn encode(&self, format: RsaPublicKeyFormat) -> Result<Vec<u8>, CipherError> {
        let tlv = match format {
            RsaPublicKeyFormat::Iso7816 => Tlv::constructed(
                TAG_PUBLIC_KEY,
                vec![
                    Tlv::primitive(TAG_MODULUS, self.modulus().to_bytes_be()),
                    Tlv::primitive(TAG_EXPONENT, self.exponent().to_bytes_be()),
                ],
            ),
            RsaPublicKeyFormat::Pkcs1 => self.pkcs1_der(),
            RsaPublicKeyFormat::X509 => asn1::sequence(vec![
                algorithm_identifier()?,
                asn1::bit_string(&self.pkcs1_der().to_bytes()),
            ]),
        };

        Ok(tlv.to_bytes())
    }

    pub fn decode(data: &[u8], format: RsaPublicKeyFormat) -> Result<Self, CipherError> {
        let tlv = Tlv::from_bytes(data)?;
        match format {
            RsaPublicKeyFormat::Iso7816 => {
                let tlv = tlv.expect_tag(TAG_PUBLIC_KEY)?;
                let n = tlv.child(TAG_MODULUS)?.primitive_value()?;
                let e = tlv.child(TAG_EXPONENT)?.primitive_value()?;
                Self::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
            }
            RsaPublicKeyFormat::Pkcs1 => Self::from_pkcs1_der(&tlv),
            RsaPublicKeyFormat::X509 => {
                let spki = asn1::to_sequence(&tlv, 2)?;
                expect_algorithm(&spki[0])?;
                let inner = Tlv::from_bytes(asn1::to_bit_string(&spki[1])?)?;
                Self::from_pkcs1_der(&inner)
            }
        }
    }
}

impl CrtPrivateKey {
    fn pkcs1_der(&self) -> Tlv {
        let pk = self.public_key();
        let fields = [
            pk.modulus(),
            pk.exponent(),
            self.private_exponent(),
            self.p(),
            self.q(),
            self.dp(),
            self.dq(),
            self.qinv(),
        ];

        let mut v = Vec::with_capacity(fields.len() + 1);
        v.push(asn1::small_integer(0));
        v.extend(fields.into_iter().map(asn1::integer));
        asn1::sequence(v)
    }

    fn from_pkcs1_der(tlv: &Tlv) -> Result<Self, CipherError> {
        let s = asn1::to_sequence(tlv, 9)?;
        asn1::expect_integer(&s[0], 0)?;
        let x = s[1..9]
            .iter()
            .map(asn1::to_integer)
            .collect::<Result<Vec<_>, _>>()?;
        let [n, e, d, p, q, dp, dq, qinv]: [BigUint; 8] = x
            .try_into()
            .map_err(|_| CipherError::InvalidArgument("rsa: malformed private key".to_string()))?;

        Self::new(n, e, d, p, q, dp, dq, qinv)
    }

    pub fn encode(&self, format: RsaPrivateKeyFormat) -> Result<Vec<u8>, CipherError> {
        let tlv = match format {
            RsaPrivateKeyFormat::Pkcs1 => self.pkcs1_der(),
            RsaPrivateKeyFormat::Pkcs8 => asn1::sequence(vec![
                asn1::small_integer(0),
                algorithm_identifier()?,
                asn1::octet_string(self.pkcs1_der().to_bytes()),
            ]),
        };

        Ok(tlv.to_bytes())
    }

    pub fn decode(data: &[u8], format: RsaPrivateKeyFormat) -> Result<Self, CipherError> {
        let tlv = Tlv::from_bytes(data)?;
        match format {
            RsaPrivateKeyFormat::Pkcs1 => Self::from_pkcs1_der(&tlv),
            RsaPrivateKeyFormat::Pkcs8 => {
                let info = asn1::to_sequence(&tlv, 3)?;
                asn1::expect_integer(&info[0], 0)?;
                expect_algorithm(&info[1])?;
                let inner = Tlv::from_bytes(asn1::to_octet_string(&info[2])?)?;
                Self::from_pkcs1_der(&inner)
            }
        }
    }
}

impl PrivateKey {
    /// 两种格式都需要CRT分量, 非CRT私钥不能编码
    pub fn encode(&self, format: RsaPrivateKeyFormat) -> Result<Vec<u8>, CipherError> {
        Err(CipherError::InvalidArgument(format!(
            "rsa: {format} encoding needs the CRT components"
        )))
    }
}

impl Display for RsaPrivateKeyFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pkcs1 => f.write_str("pkcs1"),
            Self::Pkcs8 => f.write_str("pkcs8"),
        }
    }
}

impl FromStr for RsaPrivateKeyFormat {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pkcs1" => Ok(Self::Pkcs1),
            "pkcs8" => Ok(Self::Pkcs8),
            _ => Err(CipherError::InvalidArgument(format!(
                "unknown rsa private key format `{s}`"
            ))),
        }
    }
}

impl Display for RsaPublicKeyFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iso7816 => f.write_str("iso7816"),
            Self::Pkcs1 => f.write_str("pkcs1"),
            Self::X509 => f.write_str("x509"),
        }
    }
}

impl FromStr for RsaPublicKeyFormat {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iso7816" => Ok(Self::Iso7816),
            "pkcs1" => Ok(Self::Pkcs1),
            "x509" => Ok(Self::X509),
            _ => Err(CipherError::InvalidArgument(format!(
                "unknown rsa public key format `{s}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RsaPrivateKeyFormat, RsaPublicKeyFormat};
    use crate::rsa::{test_keys, CrtPrivateKey, PublicKey, RsaPrivate};
    use crate::CipherError;

    #[test]
    fn private_formats() {
        for key in [test_keys::toy(), test_keys::rsa1024()] {
            for f in [RsaPrivateKeyFormat::Pkcs1, RsaPrivateKeyFormat::Pkcs8] {
                let der = key.encode(f).unwrap();
                let k = CrtPrivateKey::decode(&der, f).unwrap();
                assert_eq!(k.public_key(), key.public_key());
                assert_eq!(k.private_exponent(), key.private_exponent());
                assert_eq!((k.p(), k.q(), k.qinv()), (key.p(), key.q(), key.qinv()));
            }
        }

        let toy = test_keys::toy();
        assert_eq!(
            hex::encode(toy.encode(RsaPrivateKeyFormat::Pkcs1).unwrap()),
            "301d02010002020ca10201110202019d02013d020135020135020131020126"
        );

        // 格式不匹配
        let der = toy.encode(RsaPrivateKeyFormat::Pkcs1).unwrap();
        assert!(CrtPrivateKey::decode(&der, RsaPrivateKeyFormat::Pkcs8).is_err());
        assert!(matches!(
            toy.to_plain().encode(RsaPrivateKeyFormat::Pkcs1),
            Err(CipherError::InvalidArgument(_))
        ));
    }

    #[test]
    fn public_formats() {
        let key = test_keys::rsa1024();
        let pk = key.public_key();
        for f in [RsaPublicKeyFormat::Iso7816, RsaPublicKeyFormat::Pkcs1, RsaPublicKeyFormat::X509] {
            let data = pk.encode(f).unwrap();
            assert_eq!(&PublicKey::decode(&data, f).unwrap(), pk);
        }

        let toy = test_keys::toy();
        let pk = toy.public_key();
        assert_eq!(
            hex::encode(pk.encode(RsaPublicKeyFormat::Iso7816).unwrap()),
            "7f490781020ca1820111"
        );
        assert_eq!(
            hex::encode(pk.encode(RsaPublicKeyFormat::Pkcs1).unwrap()),
            "300702020ca1020111"
        );
        assert_eq!(
            hex::encode(pk.encode(RsaPublicKeyFormat::X509).unwrap()),
            "301b300d06092a864886f70d0101010500030a00300702020ca1020111"
        );

        let iso = pk.encode(RsaPublicKeyFormat::Iso7816).unwrap();
        assert!(PublicKey::decode(&iso, RsaPublicKeyFormat::X509).is_err());
        assert!(PublicKey::decode(&iso[..(iso.len() - 1)], RsaPublicKeyFormat::Iso7816).is_err());
        assert_eq!("X509".parse::<RsaPublicKeyFormat>(), Ok(RsaPublicKeyFormat::X509));
        assert!("der".parse::<RsaPrivateKeyFormat>().is_err());
    }
}
