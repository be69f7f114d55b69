use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "ferroftpd",
    about = "An FTP server with a mount-tree virtual filesystem, written in Rust."
)]
pub struct Cli {
    /// Root directory served when no mount file is given [default: .]
    #[arg(long)]
    pub dir: Option<String>,

    /// Control listening port [default: 21]
    #[arg(long)]
    pub port: Option<u16>,

    /// Control listen address [default: 0.0.0.0]
    #[arg(long = "ctrl-addr")]
    pub ctrl_addr: Option<String>,

    /// Data listen address for passive mode [default: 0.0.0.0]
    #[arg(long = "data-addr")]
    pub data_addr: Option<String>,

    /// Auth file path; anonymous read-only access if not present
    #[arg(long = "auth-file")]
    pub auth_file: Option<String>,

    /// Mount file path; mounts the root directory at / if not present
    #[arg(long = "mount-file")]
    pub mount_file: Option<String>,

    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
