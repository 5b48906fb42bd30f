//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::StaticConfig;

/// ipgeo - resolve IP addresses to country, region and city
#[derive(Parser, Debug)]
#[command(name = "ipgeo")]
#[command(version)]
#[command(about = "IP geolocation service backed by a local MaxMind database", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Override geoip.database_path
    #[arg(long, short = 'd', global = true)]
    pub database: Option<String>,

    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a sample configuration, or write it to OUTPUT
    GenerateConfig {
        /// Output file path (default: stdout)
        output: Option<String>,
    },

    /// Resolve one IP address and print the result as JSON
    Lookup {
        /// IPv4 or IPv6 address
        ip: String,

        /// Preferred language, same syntax as Accept-Language
        #[arg(long, short = 'l')]
        lang: Option<String>,
    },
}

impl Cli {
    /// 命令行参数覆盖配置文件
    pub fn apply_overrides(&self, config: &mut StaticConfig) {
        if let Some(ref database) = self.database {
            config.geoip.database_path = database.clone();
        }
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
