use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::config::{DEFAULT_CONFIG_PATH, DEFAULT_CONFIG_TEMPLATE};

#[derive(Debug, Parser)]
#[command(
    name = "statusboard",
    version,
    about = "Serves a single-page deployment status dashboard with uptime and memory usage"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "STATUSBOARD_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Write the default configuration template and exit
    #[arg(long)]
    pub init_config: bool,

    /// Print one rendered page to stdout and exit
    #[arg(long, conflicts_with = "init_config")]
    pub render: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    InitConfig(PathBuf),
    RenderOnce(PathBuf),
    RunServer(PathBuf),
}

impl Cli {
    pub fn action(self) -> CliAction {
        if self.init_config {
            CliAction::InitConfig(self.config)
        } else if self.render {
            CliAction::RenderOnce(self.config)
        } else {
            CliAction::RunServer(self.config)
        }
    }
}

pub fn parse_args() -> CliAction {
    Cli::parse().action()
}

pub fn init_config_file(target: &Path) -> Result<()> {
    if target.exists() {
        bail!("{} already exists; refusing to overwrite", target.display());
    }
    std::fs::write(target, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("write {}", target.display()))?;
    println!("Created {}", target.display());
    Ok(())
}
