use mc_config::global_config_path;

use super::{Output, Success};
use crate::{Ctx, error::Error};

#[derive(Debug, clap::Args)]
pub(crate) struct Config {
    #[command(subcommand)]
    command: Commands,
}

impl Config {
    pub(crate) fn run(self, ctx: &Ctx) -> Output {
        match self.command {
            Commands::Show => show(ctx),
            Commands::Path => path(),
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Show the effective configuration.
    #[command(name = "show")]
    Show,

    /// Print the path of the global configuration file.
    #[command(name = "path")]
    Path,
}

fn show(ctx: &Ctx) -> Output {
    let toml = ctx.config().to_toml().map_err(Error::from)?;

    Ok(Success::Message(toml.trim_end().to_owned()))
}

fn path() -> Output {
    let path = global_config_path().ok_or("Could not determine a home directory.")?;

    Ok(path.display().to_string().into())
}
