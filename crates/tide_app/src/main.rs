mod app;
mod config;
mod logging;
mod notify;
mod render;

use std::path::PathBuf;

use anyhow::bail;
use tide_engine::{TokenRegistry, TokenStore};

use config::{ShellConfig, DEFAULT_CONFIG_PATH};

const USAGE: &str = "usage: tide_app [run] [CONFIG]\n       tide_app notify PAYLOAD.json [CONFIG]\n       tide_app token VALUE [CONFIG]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run,
    Notify { payload: PathBuf },
    Token { value: String },
}

fn parse_args(args: &[String]) -> anyhow::Result<(Command, PathBuf)> {
    let config_at = |index: usize| {
        args.get(index)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    };
    match args.first().map(String::as_str) {
        None => Ok((Command::Run, config_at(0))),
        Some("run") => Ok((Command::Run, config_at(1))),
        Some("notify") => match args.get(1) {
            Some(payload) => Ok((
                Command::Notify {
                    payload: PathBuf::from(payload),
                },
                config_at(2),
            )),
            None => bail!("notify needs a payload file\n{USAGE}"),
        },
        Some("token") => match args.get(1) {
            Some(value) => Ok((
                Command::Token {
                    value: value.clone(),
                },
                config_at(2),
            )),
            None => bail!("token needs a value\n{USAGE}"),
        },
        Some("-h" | "--help") => bail!("{USAGE}"),
        Some(_) => Ok((Command::Run, config_at(0))),
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, config_path) = parse_args(&args)?;
    let config = ShellConfig::load(&config_path)?;
    logging::initialize(config.log_destination, config.level(), &config.log_file);

    match command {
        Command::Run => app::run(&config),
        Command::Notify { payload } => {
            println!("{}", notify::enrich_payload(&config, &payload)?);
            Ok(())
        }
        Command::Token { value } => {
            // Stands in for the push subsystem delivering a registration token.
            TokenRegistry::new(TokenStore::new(config.cache_dir.clone())).receive(value);
            Ok(())
        }
    }
}
