//! # CLI Subcommands
//! 
//! Contains modules that run the subcommands.
//! Each takes the `ArgMatches` of its subcommand, presence of required arguments
//! is already resolved by `clap`.

pub mod mkdsk;
pub mod stat;
pub mod get_img;

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("One of the parameters was out of range")]
    OutOfRange,
    #[error("Input source is not supported")]
    UnsupportedFormat,
    #[error("Input source could not be interpreted")]
    UnknownFormat,
    #[error("File not found")]
    FileNotFound,
    #[error("File already exists")]
    FileExists
}

/// Parse a decimal or `$`/`0x` prefixed hex number and check it against `max`
pub fn parse_num(s: &str,max: usize) -> Result<usize,CommandError> {
    let parsed = match s.strip_prefix('$').or(s.strip_prefix("0x")) {
        Some(hex) => usize::from_str_radix(hex,16),
        None => s.parse::<usize>()
    };
    match parsed {
        Ok(n) if n <= max => Ok(n),
        Ok(n) => {
            log::error!("{} is out of range, maximum is {}",n,max);
            Err(CommandError::OutOfRange)
        },
        Err(_) => {
            log::error!("could not parse `{}`",s);
            Err(CommandError::InvalidCommand)
        }
    }
}

#[test]
fn number_formats() {
    assert_eq!(parse_num("17",34).unwrap(),17);
    assert_eq!(parse_num("$11",34).unwrap(),17);
    assert_eq!(parse_num("0x11",34).unwrap(),17);
    assert!(matches!(parse_num("35",34),Err(CommandError::OutOfRange)));
    assert!(matches!(parse_num("x",34),Err(CommandError::InvalidCommand)));
}
