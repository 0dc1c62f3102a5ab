use crate::cmd::key::{load_ec_private, load_ec_public, load_rsa_private, load_rsa_public};
use crate::cmd::{
    curve_arg, file_arg, format_arg, hash_arg, key_arg, message, output_arg, parse_arg, read_file,
    write_to_file_or_stdout, Cmd,
};
use crate::CardError;
use cipher::rsa::{
    CrtPrivateKey, ISO9796Sign, ISO9796Verify, Iso9796Scheme, PKCS1Sign, PKCS1Verify, PSSSign,
    PSSVerify, PublicKey, RsaSigner, RsaVerifier, SignatureForm, Trailer,
};
use cipher::{CipherError, DefaultRand, Sign, Verify};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crypto_hash::HashAlgorithm;
use std::path::PathBuf;

const SCHEMES: [&str; 6] = ["ecdsa", "pss", "pkcs1", "ds1", "ds2", "ds3"];

fn scheme_arg() -> Arg {
    Arg::new("scheme")
        .value_name("SCHEME")
        .action(ArgAction::Set)
        .required(true)
        .value_parser(SCHEMES)
        .help("the signature scheme")
}

fn salt_arg() -> Arg {
    Arg::new("salt-len")
        .long("salt-len")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(usize))
        .help("the salt length of PSS and ISO/IEC 9796-2 scheme 2, the digest length if not specified")
}

fn iso9796_args(c: Command) -> Command {
    c.arg(
        Arg::new("explicit")
            .long("explicit")
            .action(ArgAction::SetTrue)
            .help("ISO/IEC 9796-2 explicit trailer with the hash identifier"),
    )
    .arg(
        Arg::new("plain")
            .long("plain")
            .action(ArgAction::SetTrue)
            .help("ISO/IEC 9796-2 plain signature instead of min(s, n-s)"),
    )
}

fn iso9796_scheme(scheme: &str) -> Option<Iso9796Scheme> {
    match scheme {
        "ds1" => Some(Iso9796Scheme::DS1),
        "ds2" => Some(Iso9796Scheme::DS2),
        "ds3" => Some(Iso9796Scheme::DS3),
        _ => None,
    }
}

fn iso9796_options(m: &ArgMatches) -> (Trailer, SignatureForm) {
    let trailer = if m.get_flag("explicit") {
        Trailer::Explicit
    } else {
        Trailer::Implicit
    };
    let form = if m.get_flag("plain") {
        SignatureForm::Plain
    } else {
        SignatureForm::Minimum
    };
    (trailer, form)
}

fn rsa_signer(
    m: &ArgMatches,
    scheme: &str,
    key: CrtPrivateKey,
) -> anyhow::Result<RsaSigner<CrtPrivateKey, DefaultRand>> {
    let hash: HashAlgorithm = parse_arg(m, "hash", "sha256")?;
    let salt = m.get_one::<usize>("salt-len").copied();
    let rng = DefaultRand::default();

    let signer: RsaSigner<CrtPrivateKey, DefaultRand> = match (scheme, iso9796_scheme(scheme)) {
        ("pkcs1", _) => PKCS1Sign::new(key, hash)?.into(),
        ("pss", _) => PSSSign::new(key, hash, rng, salt)?.into(),
        (_, Some(s)) => {
            let (trailer, form) = iso9796_options(m);
            match salt {
                Some(salt) if s == Iso9796Scheme::DS2 => {
                    ISO9796Sign::with_salt_len(key, hash, trailer, form, salt, rng)?.into()
                }
                _ => ISO9796Sign::new(key, hash, s, trailer, form, rng)?.into(),
            }
        }
        _ => return Err(CardError::NotSupport(scheme.to_string()).into()),
    };
    Ok(signer)
}

fn rsa_verifier(m: &ArgMatches, scheme: &str, key: PublicKey) -> anyhow::Result<RsaVerifier> {
    let hash: HashAlgorithm = parse_arg(m, "hash", "sha256")?;
    let salt = m.get_one::<usize>("salt-len").copied();

    let verifier = match (scheme, iso9796_scheme(scheme)) {
        ("pkcs1", _) => RsaVerifier::Pkcs1(PKCS1Verify::new(key, hash)?),
        ("pss", _) => RsaVerifier::Pss(PSSVerify::new(key, hash, salt)?),
        (_, Some(s)) => {
            let (trailer, form) = iso9796_options(m);
            let v = match salt {
                Some(salt) if s == Iso9796Scheme::DS2 => {
                    ISO9796Verify::with_salt_len(key, hash, s, trailer, form, salt)?
                }
                _ => ISO9796Verify::new(key, hash, s, trailer, form)?,
            };
            RsaVerifier::Iso9796(v)
        }
        _ => return Err(CardError::NotSupport(scheme.to_string()).into()),
    };
    Ok(verifier)
}

#[derive(Default)]
pub struct SignCmd;

impl Cmd for SignCmd {
    const NAME: &'static str = "sign";

    fn cmd() -> Command {
        let c = Command::new(Self::NAME)
            .about("sign the message with the private key")
            .arg(scheme_arg())
            .arg(key_arg())
            .arg(format_arg(
                "the private key format, asn1 for ecdsa and pkcs1 for rsa if not specified",
            ))
            .arg(curve_arg())
            .arg(file_arg())
            .arg(hash_arg())
            .arg(salt_arg())
            .arg(output_arg());
        iso9796_args(c)
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let scheme = m
            .get_one::<String>("scheme")
            .map(String::as_str)
            .unwrap_or("ecdsa");
        let msg = message(m)?;

        let mut sig = Vec::with_capacity(256);
        if scheme == "ecdsa" {
            load_ec_private(m)?.sign(&msg, &mut sig)?;
        } else {
            let key = load_rsa_private(m)?;
            rsa_signer(m, scheme, key)?.sign(&msg, &mut sig)?;
        }

        write_to_file_or_stdout(m.get_one::<PathBuf>("output"), &sig)
    }
}

#[derive(Default)]
pub struct VerifyCmd;

impl Cmd for VerifyCmd {
    const NAME: &'static str = "verify";

    fn cmd() -> Command {
        let c = Command::new(Self::NAME)
            .about("verify the signature with the public key")
            .arg(scheme_arg())
            .arg(key_arg())
            .arg(format_arg("the public key format, x509 if not specified"))
            .arg(file_arg())
            .arg(
                Arg::new("sig")
                    .long("sig")
                    .short('s')
                    .action(ArgAction::Set)
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("the signature file path"),
            )
            .arg(hash_arg())
            .arg(salt_arg());
        iso9796_args(c)
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()> {
        let scheme = m
            .get_one::<String>("scheme")
            .map(String::as_str)
            .unwrap_or("ecdsa");
        let msg = message(m)?;
        let sig = match m.get_one::<PathBuf>("sig") {
            Some(p) => read_file(p)?,
            None => anyhow::bail!("need to specify the signature file"),
        };

        let res = if scheme == "ecdsa" {
            load_ec_public(m)?.verify(&msg, &sig)
        } else {
            let key = load_rsa_public(m)?;
            rsa_verifier(m, scheme, key)?.verify(&msg, &sig)
        };

        match res {
            Ok(()) => {
                println!("Validation success.");
                Ok(())
            }
            Err(CipherError::ValidateFailed(e)) => Err(CardError::ValidateFailed(e).into()),
            Err(e) => Err(e.into()),
        }
    }
}
