use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct CardConfig {
    /// `check rsa`要求的最小模数位长, 也是`key rsa`的默认位长
    pub min_rsa_modulus_bits: usize,

    /// 素性测试确定度
    pub prime_certainty: usize,

    pub default_curve: String,

    /// CMAC输出的字节长度
    pub cmac_len: usize,

    /// RSA公钥指数, 0表示按模数位长选择
    pub rsa_exponent: u64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            min_rsa_modulus_bits: 2048,
            prime_certainty: 100,
            default_curve: "brainpoolP256r1".to_string(),
            cmac_len: 8,
            rsa_exponent: 0,
        }
    }
}

impl CardConfig {
    pub fn config() -> &'static Self {
        Self::config_with_file(None)
    }

    /// 默认值 -> 配置文件 -> `CARDCRYPT_`前缀的环境变量, 只在第一次调用时加载
    pub fn config_with_file(f: Option<&str>) -> &'static Self {
        static CONFIG: OnceLock<CardConfig> = OnceLock::new();

        CONFIG.get_or_init(|| match Self::load(f) {
            Ok(config) => {
                log::trace!("{:?}", config);
                config
            }
            Err(e) => {
                log::warn!("load config failed, use the default: {e}");
                Self::default()
            }
        })
    }

    fn load(f: Option<&str>) -> Result<Self, ConfigError> {
        let default_config = Config::try_from(&CardConfig::default())?;

        let mut config = Config::builder().add_source(default_config);
        if let Some(f) = f {
            config = config.add_source(config::File::with_name(f).required(false));
        }
        config = config.add_source(
            config::Environment::with_prefix("CARDCRYPT")
                .try_parsing(true)
                .separator("__"),
        );

        let mut config: CardConfig = config.build()?.try_deserialize()?;
        config.prime_certainty = config.prime_certainty.max(1);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::CardConfig;
    use std::io::Write;

    #[test]
    fn defaults_and_file() {
        let c = CardConfig::load(None).unwrap();
        assert_eq!(c.prime_certainty, 100);
        assert_eq!(c.default_curve, "brainpoolP256r1");
        assert_eq!(c.cmac_len, 8);

        let p = std::env::temp_dir().join(format!("cardcrypt-config-{}.json", std::process::id()));
        let mut f = std::fs::File::create(&p).unwrap();
        f.write_all(br#"{"cmac_len": 16, "default_curve": "secp384r1"}"#)
            .unwrap();
        drop(f);

        let c = CardConfig::load(p.to_str()).unwrap();
        assert_eq!(c.cmac_len, 16);
        assert_eq!(c.default_curve, "secp384r1");
        assert_eq!(c.min_rsa_modulus_bits, 2048);
        std::fs::remove_file(p).unwrap();
    }
}
