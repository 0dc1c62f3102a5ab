use crate::cmd::key::{load_ec_private, load_ec_public, load_rsa_private, load_rsa_public};
use crate::cmd::{
    curve_arg, file_arg, format_arg, hash_arg, key_arg, message, output_arg, parse_arg,
    write_to_file_or_stdout, Cmd,
};
use crate::CardError;
use cipher::rsa::{OAEPDecrypt, OAEPEncrypt, PKCS1Decrypt, PKCS1Encrypt};
use cipher::{DefaultRand, Decrypt, Encrypt};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crypto_hash::HashAlgorithm;
use std::path::PathBuf;

fn scheme_arg() -> Arg {
    Arg::new("scheme")
        .value_name("SCHEME")
        .action(ArgAction::Set)
        .required(true)
        .value_parser(["ec", "oaep", "pkcs1"])
        .help("ec: the card cryptogram; oaep, pkcs1: rsa encryption scheme")
}

fn label_arg() -> Arg {
    Arg::new("label")
        .long("label")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(String))
        .help("the OAEP label")
}

fn label(m: &ArgMatches) -> &[u8] {
    m.get_one::<String>("label")
        .map(|x| x.as_bytes())
        .unwrap_or_default()
}

#[derive(Default)]
pub struct EncipherCmd;

impl Cmd for EncipherCmd {
    const NAME: &'static str = "encipher";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("encrypt the message with the public key")
            .arg(scheme_arg())
            .arg(key_arg())
            .arg(format_arg("the public key format, x509 if not specified"))
            .arg(file_arg())
            .arg(hash_arg())
            .arg(label_arg())
            .arg(output_arg())
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let msg = message(m)?;
        let mut rng = DefaultRand::default();

        let mut out = Vec::with_capacity(msg.len() + 256);
        match m.get_one::<String>("scheme").map(String::as_str) {
            Some("ec") => out = load_ec_public(m)?.encipher(&msg, &mut rng)?,
            Some("oaep") => {
                let hash: HashAlgorithm = parse_arg(m, "hash", "sha256")?;
                OAEPEncrypt::new(load_rsa_public(m)?, hash, rng, label(m))?.encrypt(&msg, &mut out)?
            }
            Some("pkcs1") => PKCS1Encrypt::new(load_rsa_public(m)?, rng)?.encrypt(&msg, &mut out)?,
            Some(s) => return Err(CardError::NotSupport(s.to_string()).into()),
            None => anyhow::bail!("need to specify the scheme"),
        }

        write_to_file_or_stdout(m.get_one::<PathBuf>("output"), &out)
    }
}

#[derive(Default)]
pub struct DecipherCmd;

impl Cmd for DecipherCmd {
    const NAME: &'static str = "decipher";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("decrypt the ciphertext with the private key")
            .arg(scheme_arg())
            .arg(key_arg())
            .arg(format_arg(
                "the private key format, asn1 for ec and pkcs1 for rsa if not specified",
            ))
            .arg(curve_arg())
            .arg(file_arg())
            .arg(hash_arg())
            .arg(label_arg())
            .arg(output_arg())
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let data = message(m)?;

        let mut out = Vec::with_capacity(data.len());
        match m.get_one::<String>("scheme").map(String::as_str) {
            Some("ec") => out = load_ec_private(m)?.decipher(&data)?,
            Some("oaep") => {
                let hash: HashAlgorithm = parse_arg(m, "hash", "sha256")?;
                OAEPDecrypt::new(load_rsa_private(m)?, hash, label(m))?.decrypt(&data, &mut out)?
            }
            Some("pkcs1") => PKCS1Decrypt::new(load_rsa_private(m)?)?.decrypt(&data, &mut out)?,
            Some(s) => return Err(CardError::NotSupport(s.to_string()).into()),
            None => anyhow::bail!("need to specify the scheme"),
        }

        write_to_file_or_stdout(m.get_one::<PathBuf>("output"), &out)
    }
}
