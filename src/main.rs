use cardcrypt::cmd::{
    CheckCmd, Cmd, DecipherCmd, EncipherCmd, KeyCmd, MACCmd, SignCmd, VerifyCmd,
};
use cardcrypt::{log_error, CardConfig};
use clap::{value_parser, Arg, ArgAction, Command};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let version = env!("CARDCRYPT_VERSION_INFO");
    let app = Command::new("cardcrypt")
        .version(version)
        .about("smart card cryptographic toolkit")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .action(ArgAction::Set)
                .required(false)
                .value_parser(value_parser!(PathBuf))
                .help("the configuration file path"),
        )
        .subcommand(KeyCmd::cmd())
        .subcommand(CheckCmd::cmd())
        .subcommand(SignCmd::cmd())
        .subcommand(VerifyCmd::cmd())
        .subcommand(EncipherCmd::cmd())
        .subcommand(DecipherCmd::cmd())
        .subcommand(MACCmd::cmd())
        .get_matches();

    let config = app
        .get_one::<PathBuf>("config")
        .map(|p| p.to_string_lossy().to_string());
    let _config = CardConfig::config_with_file(config.as_deref());

    let Some((name, m)) = app.subcommand() else {
        println!(
            "{} {} {}",
            env!("CARGO_PKG_NAME"),
            version,
            env!("CARDCRYPT_GIT_INFO")
        );
        return ExitCode::SUCCESS;
    };

    let res = match name {
        KeyCmd::NAME => KeyCmd.run(m),
        CheckCmd::NAME => CheckCmd.run(m),
        SignCmd::NAME => SignCmd.run(m),
        VerifyCmd::NAME => VerifyCmd.run(m),
        EncipherCmd::NAME => EncipherCmd.run(m),
        DecipherCmd::NAME => DecipherCmd.run(m),
        MACCmd::NAME => MACCmd.run(m),
        name => Err(anyhow::anyhow!("not support the command `{name}`")),
    };

    match log_error(res) {
        Some(()) => ExitCode::SUCCESS,
        None => ExitCode::FAILURE,
    }
}
