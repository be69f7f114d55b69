mod core_auth;
mod core_cli;
mod core_ftpcommand;
mod core_network;
mod core_proto;
mod core_vfs;

use crate::core_auth::{Anonymous, Authenticator, FileAuth};
use crate::core_cli::Cli;
use crate::core_network::Server;
use crate::core_vfs::{tree_from_file, Node, SysFolderNode};
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
struct ServerConfig {
    listen_port: Option<u16>,
    ctrl_address: Option<String>,
    data_address: Option<String>,
    min_data_port: Option<u16>,
    max_data_port: Option<u16>,
    root_dir: Option<String>,
    auth_file: Option<String>,
    mount_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Config {
    #[serde(default)]
    server: ServerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Optional configuration file; CLI flags override its values.
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    let root_dir = args
        .dir
        .or(config.server.root_dir)
        .unwrap_or_else(|| ".".to_string());
    let auth_file = args.auth_file.or(config.server.auth_file);
    let mount_file = args.mount_file.or(config.server.mount_file);

    // An unusable auth file degrades to anonymous read-only access.
    let auth: Arc<dyn Authenticator> = match &auth_file {
        Some(path) => match FileAuth::from_file(path) {
            Ok(auth) => Arc::new(auth),
            Err(e) => {
                warn!("auth file ignored ({}), using anonymous access", e);
                Arc::new(Anonymous)
            }
        },
        None => Arc::new(Anonymous),
    };

    // An unusable mount file degrades to serving the root directory.
    let node: Arc<dyn Node> = match &mount_file {
        Some(path) => match tree_from_file(path) {
            Ok(tree) => Arc::new(tree),
            Err(e) => {
                warn!("mount file ignored ({}), serving \"{}\"", e, root_dir);
                Arc::new(SysFolderNode::new(&root_dir))
            }
        },
        None => Arc::new(SysFolderNode::new(&root_dir)),
    };

    let mut server = Server::new();
    server.port = args.port.or(config.server.listen_port).unwrap_or(21);
    if let Some(addr) = args.ctrl_addr.or(config.server.ctrl_address) {
        server.address = addr;
    }
    if let Some(addr) = args.data_addr.or(config.server.data_address) {
        server.data_address = addr;
    }
    if let Some(min) = config.server.min_data_port {
        server.min_data_port = min;
    }
    if let Some(max) = config.server.max_data_port {
        server.max_data_port = max;
    }
    server.node = Some(node);
    server.auth = Some(auth);

    server.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for interrupt signal")?;

    server.stop().await;
    info!("A graceful shutdown. Thank you.");

    Ok(())
}

fn load_config(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path))?;
    let config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse configuration file: {}", path))?;
    Ok(config)
}
