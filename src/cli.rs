use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file. Environment variables are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port for the health endpoint, overriding PORT
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
