use clap::{Args, Subcommand};

use crate::config;
use crate::error::Error;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    /// Parse and validate the config file.
    Check,
    /// Print the config file location.
    Path,
}

pub fn run(args: ConfigArgs) -> Result<(), Error> {
    match args.command {
        ConfigSubcommand::Check => {
            let path = config::validate_config()?;
            println!("config OK: {}", path.display());
        }
        ConfigSubcommand::Path => {
            let path = config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
