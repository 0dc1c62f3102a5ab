use crate::cmd::{file_arg, from_hex, hash_arg, message, parse_arg, to_hex, Cmd};
use crate::{CardConfig, CardError};
use cipher::mac::HMAC;
use cipher::{AesKey, MAC};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crypto_hash::HashAlgorithm;

fn hex_key_arg() -> Arg {
    Arg::new("key")
        .long("key")
        .short('k')
        .action(ArgAction::Set)
        .required(true)
        .value_parser(value_parser!(String))
        .help("the key in hex")
}

fn verify_arg() -> Arg {
    Arg::new("verify")
        .long("verify")
        .short('v')
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(String))
        .help("the expected MAC in hex, check it instead of printing")
}

fn output(m: &ArgMatches, mac: &[u8], verify: impl FnOnce(&[u8]) -> bool) -> anyhow::Result<()> {
    let Some(expect) = m.get_one::<String>("verify") else {
        println!("{}", to_hex(mac));
        return Ok(());
    };

    if verify(&from_hex(expect)?) {
        println!("Validation success.");
        Ok(())
    } else {
        Err(CardError::ValidateFailed("MAC mismatch".to_string()).into())
    }
}

#[derive(Clone)]
pub struct MACCmd;

impl Cmd for MACCmd {
    const NAME: &'static str = "mac";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("Message Authentication Code")
            .subcommand(
                Command::new("cmac")
                    .about("AES-CMAC")
                    .arg(hex_key_arg())
                    .arg(file_arg())
                    .arg(
                        Arg::new("len")
                            .long("len")
                            .short('l')
                            .action(ArgAction::Set)
                            .required(false)
                            .value_parser(value_parser!(usize))
                            .help("the MAC bytes length, clamped to [8, 16]"),
                    )
                    .arg(verify_arg()),
            )
            .subcommand(
                Command::new("hmac")
                    .about("HMAC")
                    .arg(hex_key_arg())
                    .arg(file_arg())
                    .arg(hash_arg())
                    .arg(verify_arg()),
            )
            .subcommand_required(true)
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let (name, m) = m
            .subcommand()
            .ok_or_else(|| anyhow::anyhow!("need to specify the MAC algorithm"))?;
        let key = from_hex(m.get_one::<String>("key").map(String::as_str).unwrap_or_default())?;
        let msg = message(m)?;

        match name {
            "cmac" => {
                let len = m
                    .get_one::<usize>("len")
                    .copied()
                    .unwrap_or(CardConfig::config().cmac_len);
                let aes = AesKey::new(&key)?;
                let mac = aes.calculate_cmac(&msg, len);
                output(m, &mac, |x| aes.verify_cmac(&msg, x))
            }
            "hmac" => {
                let hash: HashAlgorithm = parse_arg(m, "hash", "sha256")?;
                let hmac = HMAC::new(hash, &key);
                let mut mac = Vec::with_capacity(hash.digest_len());
                hmac.mac(&msg, &mut mac);
                output(m, &mac, |x| hmac.verify_mac(&msg, x))
            }
            other => Err(CardError::NotSupport(other.to_string()).into()),
        }
    }
}
