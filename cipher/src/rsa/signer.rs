use crate::rsa::{
    ISO9796Sign, ISO9796Verify, PKCS1Sign, PKCS1Verify, PSSSign, PSSVerify, PublicKey, RsaPrivate,
};
use crate::{CipherError, Rand, Sign, Verify};

/// RSA签名方案的统一入口
pub enum RsaSigner<K: RsaPrivate, R: Rand> {
    Pkcs1(PKCS1Sign<K>),
    Pss(PSSSign<K, R>),
    Iso9796(ISO9796Sign<K, R>),
}

#[derive(Clone)]
pub enum RsaVerifier {
    Pkcs1(PKCS1Verify),
    Pss(PSSVerify),
    Iso9796(ISO9796Verify),
}

impl<K: RsaPrivate, R: Rand> RsaSigner<K, R> {
    pub fn public_key(&self) -> &PublicKey {
        match self {
            Self::Pkcs1(x) => x.private_key().public_key(),
            Self::Pss(x) => x.as_ref().public_key(),
            Self::Iso9796(x) => x.verifier().public_key(),
        }
    }

    /// 对应的验证方
    pub fn verifier(&self) -> Result<RsaVerifier, CipherError> {
        Ok(match self {
            Self::Pkcs1(x) => RsaVerifier::Pkcs1(PKCS1Verify::new(
                x.private_key().public_key().clone(),
                x.hash(),
            )?),
            Self::Pss(x) => RsaVerifier::Pss(x.as_ref().clone()),
            Self::Iso9796(x) => RsaVerifier::Iso9796(x.verifier().clone()),
        })
    }
}

impl<K: RsaPrivate, R: Rand> Sign for RsaSigner<K, R> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        match self {
            Self::Pkcs1(x) => x.sign(msg, sign),
            Self::Pss(x) => x.sign(msg, sign),
            Self::Iso9796(x) => x.sign(msg, sign),
        }
    }
}

impl<K: RsaPrivate, R: Rand> Verify for RsaSigner<K, R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        self.verifier()?.verify(msg, sign)
    }
}

impl Verify for RsaVerifier {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        match self {
            Self::Pkcs1(x) => x.verify(msg, sign),
            Self::Pss(x) => x.verify(msg, sign),
            Self::Iso9796(x) => x.verify(msg, sign),
        }
    }
}

impl<K: RsaPrivate, R: Rand> From<PKCS1Sign<K>> for RsaSigner<K, R> {
    fn from(value: PKCS1Sign<K>) -> Self {
        Self::Pkcs1(value)
    }
}

impl<K: RsaPrivate, R: Rand> From<PSSSign<K, R>> for RsaSigner<K, R> {
    fn from(value: PSSSign<K, R>) -> Self {
        Self::Pss(value)
    }
}

impl<K: RsaPrivate, R: Rand> From<ISO9796Sign<K, R>> for RsaSigner<K, R> {
    fn from(value: ISO9796Sign<K, R>) -> Self {
        Self::Iso9796(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{RsaSigner, RsaVerifier};
    use crate::rsa::{
        test_keys, ISO9796Sign, Iso9796Scheme, PKCS1Sign, PSSSign, PSSVerify, RsaPrivate,
        SignatureForm, Trailer,
    };
    use crate::{DefaultRand, Sign, Signer, Verify};
    use crypto_hash::HashAlgorithm;

    #[test]
    fn unified_signers() {
        let key = test_keys::rsa1024();
        let hash = HashAlgorithm::Sha256;
        let signers: [RsaSigner<_, DefaultRand>; 3] = [
            PKCS1Sign::new(&key, hash).unwrap().into(),
            PSSSign::new(&key, hash, DefaultRand::default(), None).unwrap().into(),
            ISO9796Sign::new(
                &key,
                hash,
                Iso9796Scheme::DS2,
                Trailer::Explicit,
                SignatureForm::Minimum,
                DefaultRand::default(),
            )
            .unwrap()
            .into(),
        ];

        let mut sigs = vec![];
        for s in signers.iter() {
            assert_eq!(s.public_key(), key.public_key());
            let mut sig = vec![];
            s.sign(b"signer", &mut sig).unwrap();
            s.verify(b"signer", &sig).unwrap();
            s.verifier().unwrap().verify(b"signer", &sig).unwrap();
            assert!(s.verify(b"signed", &sig).is_err());
            sigs.push(sig);
        }

        // 签名方案不同则验证失败
        let v = signers[0].verifier().unwrap();
        assert!(v.verify(b"signer", &sigs[1]).is_err());
        let v = RsaVerifier::Pss(PSSVerify::new(key.public_key().clone(), hash, None).unwrap());
        assert!(v.verify(b"signer", &sigs[0]).is_err());
        v.verify(b"signer", &sigs[1]).unwrap();

        fn assert_signer<T: Signer>(_: &T) {}
        assert_signer(&signers[2]);
    }
}
