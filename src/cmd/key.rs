use crate::cmd::{
    curve_arg, format_arg, key_arg, output_arg, parse_arg, read_file, write_to_file_or_stdout,
    Cmd,
};
use crate::{CardConfig, CardError};
use cipher::ecc::{EcPrivateKeyFormat, EcPublicKeyFormat, NamedCurve, PrivateKey, PublicKey};
use cipher::rsa::{self, CrtPrivateKey, RsaPrivate, RsaPrivateKeyFormat, RsaPublicKeyFormat};
use cipher::DefaultRand;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use num_bigint::BigUint;
use std::path::PathBuf;

fn public_output_arg() -> Arg {
    Arg::new("public")
        .long("public")
        .short('p')
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(PathBuf))
        .help("the output file path to save the public key")
}

fn public_format_arg(help: &'static str) -> Arg {
    Arg::new("public-format")
        .long("public-format")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(String))
        .help(help)
}

pub(crate) fn curve(m: &ArgMatches) -> anyhow::Result<NamedCurve> {
    let default = CardConfig::config().default_curve.as_str();
    parse_arg(m, "curve", default)
}

pub(crate) fn load_ec_private(m: &ArgMatches) -> anyhow::Result<PrivateKey> {
    let format: EcPrivateKeyFormat = parse_arg(m, "format", "asn1")?;
    let data = read_file(key_path(m)?)?;
    // Pkcs1格式不含域参数
    let dp = match m.get_one::<String>("curve") {
        Some(_) => Some(curve(m)?.params()),
        None if format == EcPrivateKeyFormat::Pkcs1 => Some(curve(m)?.params()),
        None => None,
    };
    Ok(PrivateKey::decode(&data, format, dp.as_ref())?)
}

pub(crate) fn load_ec_public(m: &ArgMatches) -> anyhow::Result<PublicKey> {
    let format: EcPublicKeyFormat = parse_arg(m, "format", "x509")?;
    let data = read_file(key_path(m)?)?;
    Ok(PublicKey::decode(&data, format)?)
}

pub(crate) fn load_rsa_private(m: &ArgMatches) -> anyhow::Result<CrtPrivateKey> {
    let format: RsaPrivateKeyFormat = parse_arg(m, "format", "pkcs1")?;
    let data = read_file(key_path(m)?)?;
    Ok(CrtPrivateKey::decode(&data, format)?)
}

pub(crate) fn load_rsa_public(m: &ArgMatches) -> anyhow::Result<rsa::PublicKey> {
    let format: RsaPublicKeyFormat = parse_arg(m, "format", "x509")?;
    let data = read_file(key_path(m)?)?;
    Ok(rsa::PublicKey::decode(&data, format)?)
}

fn key_path(m: &ArgMatches) -> anyhow::Result<&PathBuf> {
    m.get_one::<PathBuf>("key")
        .ok_or_else(|| anyhow::anyhow!("need to specify the key file"))
}

#[derive(Default)]
pub struct KeyCmd;

impl Cmd for KeyCmd {
    const NAME: &'static str = "key";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("generate key pair")
            .subcommand(EcKeyCmd::cmd())
            .subcommand(RsaKeyCmd::cmd())
            .subcommand_required(true)
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        match m.subcommand() {
            Some((EcKeyCmd::NAME, m)) => EcKeyCmd.run(m),
            Some((RsaKeyCmd::NAME, m)) => RsaKeyCmd.run(m),
            Some((other, _m)) => Err(CardError::NotSupport(other.to_string()).into()),
            None => anyhow::bail!("need to specify the key type"),
        }
    }
}

struct EcKeyCmd;

impl Cmd for EcKeyCmd {
    const NAME: &'static str = "ec";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("elliptic curve key pair generate")
            .arg(curve_arg())
            .arg(format_arg("the private key format: asn1, iso7816, pkcs1, pkcs8"))
            .arg(public_format_arg("the public key format: iso7816, x509"))
            .arg(output_arg())
            .arg(public_output_arg())
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let curve = curve(m)?;
        let format: EcPrivateKeyFormat = parse_arg(m, "format", "asn1")?;
        let public_format: EcPublicKeyFormat = parse_arg(m, "public-format", "x509")?;

        let key = PrivateKey::generate_on(curve, &mut DefaultRand::default())?;
        log::info!("generate the key pair on {curve}");

        write_to_file_or_stdout(m.get_one::<PathBuf>("output"), &key.encode(format)?)?;
        write_to_file_or_stdout(
            m.get_one::<PathBuf>("public"),
            &key.public_key().encode(public_format)?,
        )
    }
}

struct RsaKeyCmd;

impl Cmd for RsaKeyCmd {
    const NAME: &'static str = "rsa";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("rsa CRT key pair generate")
            .arg(
                Arg::new("bits")
                    .long("bits")
                    .short('b')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(usize))
                    .help("the modulus bits length"),
            )
            .arg(
                Arg::new("exponent")
                    .long("exponent")
                    .short('e')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(u64))
                    .help("the public exponent, 3 for modulus not exceeding 64 bits otherwise 65537 if not specified"),
            )
            .arg(format_arg("the private key format: pkcs1, pkcs8"))
            .arg(public_format_arg("the public key format: iso7816, pkcs1, x509"))
            .arg(output_arg())
            .arg(public_output_arg())
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let cfg = CardConfig::config();
        let bits = m
            .get_one::<usize>("bits")
            .copied()
            .unwrap_or(cfg.min_rsa_modulus_bits);
        let e = m.get_one::<u64>("exponent").copied().unwrap_or(cfg.rsa_exponent);
        let e = (e != 0).then(|| BigUint::from(e));
        let format: RsaPrivateKeyFormat = parse_arg(m, "format", "pkcs1")?;
        let public_format: RsaPublicKeyFormat = parse_arg(m, "public-format", "x509")?;

        let key = CrtPrivateKey::generate(bits, e, cfg.prime_certainty, &mut DefaultRand::default())?;
        log::info!("generate the {bits}-bit rsa key pair");

        write_to_file_or_stdout(m.get_one::<PathBuf>("output"), &key.encode(format)?)?;
        write_to_file_or_stdout(
            m.get_one::<PathBuf>("public"),
            &key.public_key().encode(public_format)?,
        )
    }
}

#[derive(Default)]
pub struct CheckCmd;

impl Cmd for CheckCmd {
    const NAME: &'static str = "check";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("check the key consistency and security")
            .subcommand(
                Command::new("rsa")
                    .about("check the rsa CRT private key")
                    .arg(key_arg())
                    .arg(format_arg("the private key format: pkcs1, pkcs8")),
            )
            .subcommand_required(true)
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let Some(("rsa", m)) = m.subcommand() else {
            anyhow::bail!("need to specify the key type");
        };

        let key = load_rsa_private(m)?;
        let min_bits = CardConfig::config().min_rsa_modulus_bits;
        let mut findings = key.check();
        findings.extend(key.check_security(min_bits));

        if findings.is_empty() {
            println!("Validation success.");
            Ok(())
        } else {
            findings.iter().for_each(|x| println!("{x}"));
            Err(CardError::ValidateFailed(format!("{} problem(s) found", findings.len())).into())
        }
    }
}
