// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use vidshell_config::{Config, ConfigManager};

mod commands;

fn build_cli() -> Command {
    Command::new("vidshell")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect the playlist folders, resume positions and settings of the video shell")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Use this directory instead of the platform config directory")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("scan")
                .about("List the supported videos of a folder in play order")
                .arg(Arg::new("folder").required(true).value_name("FOLDER").value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("id")
                .about("Print the content id of a video file")
                .arg(Arg::new("file").required(true).value_name("FILE").value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("resume")
                .about("Show the saved resume position of a video file")
                .arg(Arg::new("file").required(true).value_name("FILE").value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("forget")
                .about("Remove the saved resume position of a video file")
                .arg(Arg::new("file").required(true).value_name("FILE").value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file if none exists"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(
                    Command::new("set-speeds")
                        .about("Set the long-press seek speeds")
                        .arg(
                            Arg::new("left")
                                .long("left")
                                .value_name("SPEED")
                                .help("Backward speed, seconds of video per second held")
                                .required(true)
                                .value_parser(value_parser!(f64))
                                .action(ArgAction::Set),
                        )
                        .arg(
                            Arg::new("right")
                                .long("right")
                                .value_name("SPEED")
                                .help("Forward speed, seconds of video per second held")
                                .required(true)
                                .value_parser(value_parser!(f64))
                                .action(ArgAction::Set),
                        ),
                ),
        )
}

fn open_manager(config_dir: Option<&PathBuf>) -> Result<ConfigManager> {
    match config_dir {
        Some(dir) => ConfigManager::with_directory(dir.clone())
            .with_context(|| format!("Failed to use config directory {}", dir.display())),
        None => ConfigManager::new().context("Failed to locate the config directory"),
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = open_manager(matches.get_one::<PathBuf>("config-dir"))?;

    let loaded = manager.load_with_env_overrides();
    let level = loaded
        .as_ref()
        .map(|config| config.app.log_level.to_level_filter())
        .unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env(env_logger::Env::default())
        .init();

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}, using defaults", e);
        Config::default()
    });
    let ctx = commands::CliContext::new(manager, config);

    match matches.subcommand() {
        Some(("scan", sub)) => commands::scan(&ctx, required_path(sub, "folder")?),
        Some(("id", sub)) => commands::show_id(required_path(sub, "file")?),
        Some(("resume", sub)) => commands::show_resume(&ctx, required_path(sub, "file")?),
        Some(("forget", sub)) => commands::forget(&ctx, required_path(sub, "file")?),
        Some(("config", sub)) => match sub.subcommand() {
            Some(("init", _)) => commands::config_init(&ctx),
            Some(("show", _)) => commands::config_show(&ctx),
            Some(("path", _)) => {
                println!("{}", ctx.manager().config_path().display());
                Ok(())
            }
            Some(("set-speeds", speeds)) => {
                let left = *speeds
                    .get_one::<f64>("left")
                    .ok_or_else(|| anyhow::anyhow!("--left is required"))?;
                let right = *speeds
                    .get_one::<f64>("right")
                    .ok_or_else(|| anyhow::anyhow!("--right is required"))?;
                commands::set_speeds(&ctx, left, right)
            }
            _ => print_usage(),
        },
        _ => print_usage(),
    }
}

fn required_path<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .ok_or_else(|| anyhow::anyhow!("<{}> is required", name.to_uppercase()))
}

fn print_usage() -> Result<()> {
    build_cli().print_help()?;
    Ok(())
}
