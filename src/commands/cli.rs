use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::app::StartupOptions;
use crate::domain::config::{DEFAULT_BASE_URL, DEFAULT_VERIFY_TIMEOUT_SECS};
use crate::domain::LinkSettings;

#[derive(Parser, Debug)]
#[command(
    name = "droplink",
    version,
    about = "Copy a verified public link for a file in your public folder",
    long_about = "droplink turns a file inside your cloud-storage public folder into its public URL, \
                  checks that the URL answers, and copies it to the clipboard. \
                  The account id and public folder are asked for once and remembered."
)]
pub struct Cli {
    /// Configuration file (default: droplink.toml next to the executable)
    #[arg(long, global = true, env = "DROPLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Prefix of public links, without the account id
    #[arg(long, global = true, env = "DROPLINK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds to wait for the link check
    #[arg(long, global = true, env = "DROPLINK_TIMEOUT_SECS", default_value_t = DEFAULT_VERIFY_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Ignore HTTP(S)_PROXY environment variables for the link check
    #[arg(long, global = true)]
    pub no_proxy: bool,

    /// Console log level (RUST_LOG overrides, e.g. RUST_LOG=droplink_lib=debug)
    #[arg(long, global = true, env = "DROPLINK_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Also write JSON logs to the platform log directory
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve, verify and copy the public link of a file
    ///
    /// Example: droplink link ~/Dropbox/Public/shots/screen.png
    Link {
        /// The file to link. Exactly one.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Account id, used when no configuration is stored yet
        #[arg(long)]
        account_id: Option<u64>,

        /// Public folder root, used when no configuration is stored yet
        #[arg(long)]
        public_root: Option<PathBuf>,

        /// Print the link without touching the clipboard
        #[arg(long)]
        no_clipboard: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or reset the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the stored account id and public folder
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the configuration file path
    Path,
    /// Delete the stored configuration
    Reset,
}

impl Cli {
    /// Startup options derived from the global flags.
    pub fn startup_options(&self) -> StartupOptions {
        StartupOptions {
            config_path: self.config.clone(),
            settings: LinkSettings {
                base_url: self.base_url.clone(),
                verify_timeout: Duration::from_secs(self.timeout_secs),
                use_system_proxy: !self.no_proxy,
                ..LinkSettings::default()
            },
            log_level: self.log_level.clone(),
            file_logging: self.log_file,
        }
    }
}
