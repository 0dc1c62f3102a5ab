use crate::CardError;
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fs::OpenOptions;
use std::io::Write as IOWrite;
use std::path::{Path, PathBuf};

pub trait Cmd {
    const NAME: &'static str;

    fn cmd() -> Command;

    fn run(&self, m: &ArgMatches) -> anyhow::Result<()>;
}

pub mod config;

mod key;
pub use key::{CheckCmd, KeyCmd};

mod sign;
pub use sign::{SignCmd, VerifyCmd};

mod crypto;
pub use crypto::{DecipherCmd, EncipherCmd};

mod mac;
pub use mac::MACCmd;

pub(crate) fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

pub(crate) fn from_hex(s: &str) -> Result<Vec<u8>, CardError> {
    let t = s.trim();
    let t = t.strip_prefix("0x").unwrap_or(t);
    hex::decode(t).map_err(|_| CardError::InvalidHex(s.to_string()))
}

pub(crate) fn read_file(p: &Path) -> anyhow::Result<Vec<u8>> {
    if !p.exists() {
        return Err(CardError::PathNotExist(p.display().to_string()).into());
    }
    std::fs::read(p).with_context(|| format!("read `{}` failed", p.display()))
}

/// 有输出路径时写入新文件(已存在则失败), 否则以十六进制输出到stdout
pub(crate) fn write_to_file_or_stdout(out: Option<&PathBuf>, data: &[u8]) -> anyhow::Result<()> {
    match out {
        Some(p) => {
            let mut f = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(p)
                .with_context(|| format!("create `{}` failed", p.display()))?;
            f.write_all(data)?;
            log::info!("write {} bytes to `{}`", data.len(), p.display());
        }
        None => println!("{}", to_hex(data)),
    }
    Ok(())
}

/// `--file`指定的消息, 没有指定时为空消息
pub(crate) fn message(m: &ArgMatches) -> anyhow::Result<Vec<u8>> {
    match m.get_one::<PathBuf>("file") {
        Some(p) => read_file(p),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn parse_arg<T>(m: &ArgMatches, name: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s = m
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or(default);
    s.parse::<T>()
        .with_context(|| format!("invalid value `{s}` for `--{name}`"))
}

pub(crate) fn key_arg() -> Arg {
    Arg::new("key")
        .long("key")
        .short('k')
        .action(ArgAction::Set)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("the key file path")
}

pub(crate) fn file_arg() -> Arg {
    Arg::new("file")
        .long("file")
        .short('f')
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(PathBuf))
        .help("the message file path")
}

pub(crate) fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(PathBuf))
        .help("the output file path, print hex to stdout if not specified")
}

pub(crate) fn format_arg(help: &'static str) -> Arg {
    Arg::new("format")
        .long("format")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(String))
        .help(help)
}

pub(crate) fn curve_arg() -> Arg {
    Arg::new("curve")
        .long("curve")
        .action(ArgAction::Set)
        .required(false)
        .value_parser(value_parser!(String))
        .help("the named curve, e.g. brainpoolP256r1, secp256r1")
}

pub(crate) fn hash_arg() -> Arg {
    Arg::new("hash")
        .long("hash")
        .action(ArgAction::Set)
        .default_value("sha256")
        .value_parser(value_parser!(String))
        .help("the hash algorithm: sha1, sha224, sha256, sha384, sha512")
}
