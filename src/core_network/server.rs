use crate::core_auth::{Anonymous, Authenticator};
use crate::core_network::ports::PortAllocator;
use crate::core_network::session;
use crate::core_vfs::{Node, SysFolderNode};
use anyhow::{ensure, Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};

/// State shared by every session of a running server.
pub struct ServerShared {
    /// Root filesystem node. Read-only once the server runs.
    pub node: Arc<dyn Node>,
    pub auth: Arc<dyn Authenticator>,
    pub ports: PortAllocator,
    /// Listen address for passive data connections; empty or `0.0.0.0`
    /// makes PASV fall back to the control socket's local address.
    pub data_address: String,
    /// How long a passive listener waits for the client to dial in.
    pub data_conn_timeout: Duration,
}

/// An FTP protocol server.
pub struct Server {
    /// Control listening port.
    pub port: u16,
    /// Listen address for control connections.
    pub address: String,
    /// Listen address for data connections in passive mode.
    pub data_address: String,
    /// Passive-mode data port range, inclusive.
    pub min_data_port: u16,
    pub max_data_port: u16,
    /// Timeout for a passive data connection to wait for.
    pub data_conn_timeout: Duration,
    /// Root filesystem node; the current directory if unset.
    pub node: Option<Arc<dyn Node>>,
    /// Authenticator; anonymous read-only if unset.
    pub auth: Option<Arc<dyn Authenticator>>,

    local_addr: Option<SocketAddr>,
    shutdown: Option<Arc<Notify>>,
    accept_task: Option<JoinHandle<()>>,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            port: 21,
            address: "0.0.0.0".to_string(),
            data_address: "0.0.0.0".to_string(),
            min_data_port: 63700,
            max_data_port: 63799,
            data_conn_timeout: Duration::from_secs(3),
            node: None,
            auth: None,
            local_addr: None,
            shutdown: None,
            accept_task: None,
        }
    }
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the control listener and spawns the accept loop.
    ///
    /// Port 0 binds an OS-assigned port; query it with [`local_addr`].
    ///
    /// [`local_addr`]: Server::local_addr
    pub async fn start(&mut self) -> Result<()> {
        ensure!(
            self.min_data_port <= self.max_data_port,
            "start: {}-{} is not a valid data port range",
            self.min_data_port,
            self.max_data_port
        );

        let shared = Arc::new(ServerShared {
            node: self
                .node
                .clone()
                .unwrap_or_else(|| Arc::new(SysFolderNode::new("."))),
            auth: self.auth.clone().unwrap_or_else(|| Arc::new(Anonymous)),
            ports: PortAllocator::new(self.min_data_port, self.max_data_port),
            data_address: self.data_address.clone(),
            data_conn_timeout: self.data_conn_timeout,
        });

        let listener = TcpListener::bind((self.address.as_str(), self.port))
            .await
            .with_context(|| format!("start: cannot listen on {}:{}", self.address, self.port))?;
        self.local_addr = Some(listener.local_addr()?);

        info!(
            "listening on ctrl {}:{}, data [{}]:[{}-{}]",
            self.address, self.port, self.data_address, self.min_data_port, self.max_data_port
        );

        let shutdown = Arc::new(Notify::new());
        self.shutdown = Some(Arc::clone(&shutdown));
        self.accept_task = Some(tokio::spawn(accept_loop(listener, shared, shutdown)));

        Ok(())
    }

    /// The bound control address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Signals the accept loop, closes the control listener and aborts
    /// the remaining sessions.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.notify_one();
        }
        if let Some(task) = self.accept_task.take() {
            let _ = task.await;
        }
        self.local_addr = None;
    }
}

async fn accept_loop(listener: TcpListener, shared: Arc<ServerShared>, shutdown: Arc<Notify>) {
    let mut sessions: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.notified() => break,

            Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                if let Err(e) = finished {
                    if e.is_panic() {
                        error!("listener: session task panicked: {}", e);
                    }
                }
            }

            accepted = listener.accept() => match accepted {
                Ok((socket, addr)) => {
                    info!("listener: connected: {}", addr);
                    let shared = Arc::clone(&shared);
                    sessions.spawn(async move {
                        match session::handle_conn(socket, shared).await {
                            Ok(()) => debug!("listener: connection closed: {}", addr),
                            Err(e) => warn!("listener: connection {} ended: {}", addr, e),
                        }
                    });
                }
                // A transient accept error; the listener itself only goes
                // away through the shutdown branch.
                Err(e) => warn!("listener: accept error: {}", e),
            }
        }
    }

    sessions.shutdown().await;
    info!("listener: closed");
}
