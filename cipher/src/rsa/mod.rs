//! RSA
//!
//! - 随机选择两个质数$p$和$q$($p\neq q$), 则模数$n=p*q$. 模数的字节长度$k$满足: $2^{((k-1)*8}\le n \lt 2^{k*8}$;
//! - 公钥指数$e$和$p-1$及$q-1$都是互质关系(公共因子是1);
//! - 那么私钥的指数部分$d$满足: $d*e-1$能被$\lambda(n) = lcm(p-1, q-1)$整除;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $y = x^d \mod n$, CRT私钥用$d_p, d_q, q_{inv}$分别在模$p$和模$q$下计算后合并;
//!
//! 原理: 欧拉定理$a^{\phi(n)} \equiv 1 \mod n$
//! - $x ^ {k(p-1)(q-1)+1} \equiv x \mod n$
//!
//! 填充和签名方案:
//! - RSAES-OAEP, RSAES-PKCS1-v1_5, RSASSA-PSS, RSASSA-PKCS1-v1_5 (RFC 8017);
//! - ISO/IEC 9796-2 数字签名方案1, 2, 3(可恢复消息);
//!

use crypto_hash::HashAlgorithm;

mod key;
pub use key::{CrtPrivateKey, PrivateKey, PublicKey, RsaPrivate};

mod keygen;
pub use keygen::default_exponent;

mod check;

mod oaep;
pub use oaep::{OAEPDecrypt, OAEPEncrypt};

mod pkcs1;
pub use pkcs1::{PKCS1Decrypt, PKCS1Encrypt, PKCS1Sign, PKCS1Verify};

mod pss;
pub use pss::{PSSSign, PSSVerify};

mod iso9796;
pub use iso9796::{ISO9796Sign, ISO9796Verify, Iso9796Scheme, SignatureForm, Trailer};

mod format;
pub use format::{RsaPrivateKeyFormat, RsaPublicKeyFormat};

mod signer;
pub use signer::{RsaSigner, RsaVerifier};

/// MGF1 (RFC 8017 B.2.1): `out ^= MGF1(seed, out.len())`
pub(crate) fn mgf1_xor(hash: HashAlgorithm, seed: &[u8], out: &mut [u8]) {
    let hlen = hash.digest_len();
    for (counter, chunk) in out.chunks_mut(hlen).enumerate() {
        let digest = hash.digest_parts(&[seed, &(counter as u32).to_be_bytes()]);
        chunk.iter_mut().zip(digest).for_each(|(a, b)| *a ^= b);
    }
}

#[cfg(test)]
pub(crate) mod test_keys {
    use super::CrtPrivateKey;
    use num_bigint::BigUint;

    fn from_hex(parts: &[&str]) -> BigUint {
        BigUint::parse_bytes(parts.concat().as_bytes(), 16).unwrap()
    }

    /// p = 61, q = 53, e = 17
    pub fn toy() -> CrtPrivateKey {
        CrtPrivateKey::from_primes(BigUint::from(61u8), BigUint::from(53u8), Some(BigUint::from(17u8)))
            .unwrap()
    }

    pub fn rsa1024() -> CrtPrivateKey {
        CrtPrivateKey::from_primes(from_hex(&P1024), from_hex(&Q1024), None).unwrap()
    }

    pub fn rsa2048() -> CrtPrivateKey {
        CrtPrivateKey::from_primes(from_hex(&P2048), from_hex(&Q2048), None).unwrap()
    }

    const P1024: [&str; 2] = [
        "ceafa5d5042e882826dc74f4c6bf4d54d0445c7e3c399cbb1aa49f6511af2bbc",
        "04e539444cb4e6fef0db788b3956d9a3b000d77d94df15625d235128e6946d29",
    ];

    const Q1024: [&str; 2] = [
        "c446f300c58bbd4490c5dceebcf1a0f5db434c6b62bee2b810980297d42dc068",
        "0373e4fd23d6e0ad8991e1d012b9301ba76916068cb38d75f5551fe8acfea60d",
    ];

    const P2048: [&str; 4] = [
        "f2e69dc149562240c72c0d88e0ebec26d46d4f5c2fa30ea075975a132c8bdeb0",
        "fc48623b0219658baa095fe5472be600ce5d47c7bd1e0b5c8a5cb71201c44159",
        "b4ffa997838581e18e71d9ef709d6ad55cdbd9e050a5a1edafce0410e76cd1c1",
        "e744ffa00c3bd464347b0f4c4b1e51f86c7bccf9ba7d311f4e1449e8241328bf",
    ];

    const Q2048: [&str; 4] = [
        "bfdb3508fed07022942ca60eac88756cf1b9b92adbba47477907d9cba5d90482",
        "e29481eb90b96ef290202d8d847b5ff5a2f2d5495005094eefda703cbe021771",
        "53103cbdd8e765653881d00df6486becc74ea8db314730bbaf1f7ce103f58e8f",
        "b715e8226f2baf1d048f1520b8dc4bb9e02edaecff2e5cc0ebe4c550b339fd05",
    ];

    // RSAES-OAEP(SHA-256, 空label), 明文"smart card"
    pub const OAEP_SHA256_CT: &str = concat!(
        "15c3341a4b1eda4394013a6d4b20e64c41d95cc560dcc3fcba8d23fa7e9d5413",
        "0eb041b12932c1d7b3f22bbd46985959ed878bf98916b53036a8b542ad4d7cf9",
        "f7e9f38eccad20db1f1328dbed5256bba14aabbf958d8f06d943454ec7433fbc",
        "1535fdb83a7f72b30f6c04dc61a809529562796589d41ee81cb066b9f64c339b",
    );

    // RSAES-PKCS1-v1_5, 明文"smart card"
    pub const PKCS1_CT: &str = concat!(
        "4435ac2df52378bb43fcb8910e17e93aa619a4bdb00a31ef2e36a4a7d0c64664",
        "8b2c4511bb327e79ff1b79d7fb3ca33b757d43d1c8b2f3e0d0544b8764a915d6",
        "ab58d083cf468b9563e3e1c0c766e7bc9aec2e7532e82c794a60508caa5b6d55",
        "70cafc3aba8b306eee24baa99edf3275034a7db862560c317c2df93202427088",
    );

    // RSASSA-PKCS1-v1_5(SHA-256), 消息"abc"
    pub const PKCS1_SHA256_SIG: &str = concat!(
        "67d54bdb9b4169c167a38772190582c968d882db1979678624fdc6770f4fecfb",
        "97c397aed168fa9fdde78f5232eb5b9879f54d0fd531c4901452d60973719926",
        "585680dcf1c95446276eb199ef356dd7149a639eed55da80a82b75a27ae9a024",
        "2aeb559c90426f10438b5f394b7da07837fde0d77cc71368970393b4724906d7",
    );

    // RSASSA-PSS(SHA-256), 消息"abc", salt = 01 02 ... 20
    pub const PSS_SHA256_SIG: &str = concat!(
        "8879f9e2efaaeb60746e7e76f217d8ead9c044ae9df4c9624fbdb5e8a2f37ad0",
        "28d33d511f60d52d5fe6e5966e055c4b7311be587a79790a085db98fbcb80a12",
        "0e5bd2c1e1dfa9eaaee208ce45d88b07401cb975e1fe07bab2e30b49b42acd51",
        "dd3bba92441882e9c2988602ddf3a93d8ecb7937c6d35b73436c222951d280f1",
    );

    // ISO/IEC 9796-2 方案1(SHA-1, 0xbc, Plain), 消息"ISO/IEC 9796-2 scheme 1", 完全恢复
    pub const ISO9796_DS1_SHA1_IMPLICIT_SIG: &str = concat!(
        "902a3c84106ae13780f755a0d64316d776ab61f079a3a6f19687d1de53ec6583",
        "c6931dd373cab672b6f0009184f6293fe5fc0dbe686412f993e9a378c59fb039",
        "203450a6bff104767bbd5ecf54768567247123b19e6073927531fa1d4d0a7d0e",
        "401b01ad47ee23d7a94bbe245842c20a75e5b295a976fa83ceca238ebcf4a756",
    );

    // 方案1(SHA-256, 0x34cc, Plain), 消息00 01 .. c7, 部分恢复
    pub const ISO9796_DS1_SHA256_EXPLICIT_SIG: &str = concat!(
        "3bef2a09c818e823a47e8e35f91138dd679c3c88ba34ba5a6aadb270a44d3d06",
        "89260ca2fbebeb040ef83e7d1b5551893ac5812186a8b0d018f5237864558780",
        "0b8b0c8165ae445a3d5f3140ea65e033656ab4bef1141766e397974f9250d51c",
        "bedc5b392064e9e2f65b488473312673003e1a4cb374137533d37de855368a2d",
    );

    // 方案2(SHA-1, 0xbc, Plain), 消息"ISO/IEC 9796-2 scheme 2", salt = 01 02 .. 14
    pub const ISO9796_DS2_SHA1_IMPLICIT_SIG: &str = concat!(
        "8b5203224150ff109d70d17e3d288ca02f67bb2e4e15082e92af77dcd9583ee4",
        "2642ab0e5d3e61c3926fadb4d17d1b2582e34ebcdefd277b5a09d55158ae0cc8",
        "153cc1a3626c10a3e35c1b3f76c25208b38724d95432ec15204a295bfd84ac51",
        "4c2354aa4b6dc6abec04832b3d5a5e7425cad9b0e5da0c7813678f991e5294a0",
    );

    // 方案2(SHA-256, 0x34cc, Plain), 消息00 01 .. c7, salt = 01 02 .. 20
    pub const ISO9796_DS2_SHA256_EXPLICIT_SIG: &str = concat!(
        "4d97f9eec4249e74a2973ad16fc914c711e13915cb68f7edaa5207cbc8c4727e",
        "b6ce2811efc9a33e69faeedd9ef6cae26074d61d83081087a75abee64a81041f",
        "f1efe131367a79df32101644f62a9812c4857f89d3eeb408e6a821156b14c298",
        "5e8827b51028afe141a946584349cdaabfb8e43ad0a4b0f67e7f7ffc6995a825",
    );

    // 方案3(SHA-256, 0xbc, Plain), 消息"ISO/IEC 9796-2 scheme 3"
    pub const ISO9796_DS3_SHA256_IMPLICIT_SIG: &str = concat!(
        "7d3412eda3879328d3485125c906e8b6b3e98f1113576d8f734178a923a27c59",
        "1b1bd2c0f0d7f5ba58c000a482e8cff6e32eaf915cf2d7540117aa33a2c821ee",
        "ecad54652dad239f1396bb1929c799b162c1946cd47d7291bb098d5db86cd4d4",
        "0e4c081a1a1f7a82b16d482732f53ef891d0e04b2f227d8e398ae1886bb76840",
    );

    // 方案3(SHA-1, 0x33cc, Minimum), 消息00 01 .. c7
    pub const ISO9796_DS3_SHA1_EXPLICIT_SIG: &str = concat!(
        "009c5e5bc58cd4a73dab01fd58dc8d6a4c0eba1e92fbb0f763fa391a33fcc457",
        "bd0e282468b1c82a841b4daeb08ce8c13d3f9232b0d25d63e0d1bf81f7923031",
        "2b110744500cd37dc3a1c82754756888dd3ebdf0387509f2d121e2536e793f60",
        "fdbf030694b8e714d5e89ec105700f7482135ab2992bc079df61bcc9eb0f01c0",
    );
}
