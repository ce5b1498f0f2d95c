use std::path::PathBuf;

use clap::Parser;
use compulsive_core::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "compulsive", version, about = "Watch a web page and email when it changes")]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "COMPULSIVE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub configuration: PathBuf,

    /// Also write JSON logs, rotated daily, into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}
