//! # Command Line Interface
//! 
//! The subcommands are in the `commands` module, the argument definitions are in `cli.rs`.

mod cli;

use env_logger;
use log::error;
use a2disk::commands;
use a2disk::commands::CommandError;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = cli::build_cli().get_matches();

    if let Some(cmd) = matches.subcommand_matches("stat") {
        return commands::stat::stat(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("mkdsk") {
        return commands::mkdsk::mkdsk(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("convert") {
        return commands::mkdsk::convert(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("nibbles") {
        return commands::get_img::nibbles(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("sector") {
        return commands::get_img::sector(cmd);
    }

    error!("No subcommand was found, try `a2disk --help`");
    return Err(Box::new(CommandError::InvalidCommand));
}
