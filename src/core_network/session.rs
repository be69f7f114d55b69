use crate::core_auth::AccessLevel;
use crate::core_ftpcommand::handlers::initialize_command_handlers;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::ports::PortAllocator;
use crate::core_network::server::ServerShared;
use crate::core_proto::reply::send_reply;
use crate::core_proto::scanner::{split_command, CrlfLineReader};
use log::{debug, error};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, Notify};

/// The control-connection write half, shared between the command loop
/// and the transfer task so completion replies serialize with command
/// replies.
pub type ControlWriter = Arc<Mutex<OwnedWriteHalf>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Image,
}

/// FTP control connections are stateful.
pub struct Session {
    /// Current access level; starts with no permission.
    pub access: AccessLevel,
    /// Set by USER, cleared by a successful PASS or by REIN.
    pub pending_username: String,
    /// Virtual working directory, canonical without a trailing slash
    /// except for the root itself.
    pub cwd: String,

    pub transfer_type: TransferType,

    /// Active-mode target parsed from PORT. Stored but never dialed.
    pub active_ip: Option<Ipv4Addr>,
    pub active_port: u16,

    /// Passive-mode data channel state.
    pub pasv_port: Option<u16>,
    pub pasv_listener: Option<TcpListener>,
    pub pasv_conn: Option<TcpStream>,

    /// Raised while a transfer task is running; cleared by that task
    /// last, after the data connection is closed.
    pub in_transfer: Arc<AtomicBool>,
    /// Raised by ABOR so the transfer reports completion as 426.
    pub transfer_error: Arc<AtomicBool>,
    /// Wakes the transfer task to cancel its copy.
    pub abort: Arc<Notify>,

    /// Local address of the control socket; PASV falls back to it when
    /// no data address is configured.
    pub local_ip: IpAddr,

    /// Set by QUIT; the command loop exits after the current command.
    pub closing: bool,
}

impl Session {
    pub fn new(local_ip: IpAddr) -> Self {
        Session {
            access: AccessLevel::None,
            pending_username: String::new(),
            cwd: "/".to_string(),
            transfer_type: TransferType::Image,
            active_ip: None,
            active_port: 0,
            pasv_port: None,
            pasv_listener: None,
            pasv_conn: None,
            in_transfer: Arc::new(AtomicBool::new(false)),
            transfer_error: Arc::new(AtomicBool::new(false)),
            abort: Arc::new(Notify::new()),
            local_ip,
            closing: false,
        }
    }

    /// Resets the session to its login-time defaults (REIN), closing any
    /// passive-mode state and returning a held port to the allocator.
    pub fn reset(&mut self, ports: &PortAllocator) {
        self.release_data_channel(ports);
        self.access = AccessLevel::None;
        self.pending_username.clear();
        self.cwd = "/".to_string();
        self.transfer_type = TransferType::Image;
        self.active_ip = None;
        self.active_port = 0;
        self.in_transfer = Arc::new(AtomicBool::new(false));
        self.transfer_error = Arc::new(AtomicBool::new(false));
        self.abort = Arc::new(Notify::new());
    }

    /// Closes the passive listener and data connection if present and
    /// releases a held passive port.
    pub fn release_data_channel(&mut self, ports: &PortAllocator) {
        self.pasv_listener = None;
        self.pasv_conn = None;
        if let Some(port) = self.pasv_port.take() {
            ports.release(port);
        }
    }
}

/// Runs one control connection to completion.
///
/// The command loop itself runs in a child task so a panic inside a
/// handler is caught here, logged, and still goes through teardown
/// instead of leaking the passive port.
pub async fn handle_conn(socket: TcpStream, shared: Arc<ServerShared>) -> Result<(), std::io::Error> {
    let local_ip = socket.local_addr()?.ip();
    let (read_half, write_half) = socket.into_split();
    let writer: ControlWriter = Arc::new(Mutex::new(write_half));
    let session = Arc::new(Mutex::new(Session::new(local_ip)));

    let run = tokio::spawn(run_command_loop(
        read_half,
        Arc::clone(&writer),
        Arc::clone(&shared),
        Arc::clone(&session),
    ));
    let result = match run.await {
        Ok(result) => result,
        Err(join_err) => {
            if join_err.is_panic() {
                error!("session: command loop panicked: {}", join_err);
            }
            Ok(())
        }
    };

    session.lock().await.release_data_channel(&shared.ports);
    result
}

async fn run_command_loop(
    read_half: OwnedReadHalf,
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    // Hello!
    send_reply(&writer, 220).await?;

    let handlers = initialize_command_handlers();
    let mut lines = CrlfLineReader::new(BufReader::new(read_half));

    while let Some(line) = lines.next_line().await? {
        let (cmd, arg) = split_command(&line);
        debug!("ctrl: line=\"{}\", cmd={}", line, cmd);

        match FtpCommand::from_name(&cmd) {
            None => send_reply(&writer, 500).await?,
            Some(command) => {
                let access = session.lock().await.access;
                if !access.has_access(command.required_access()) {
                    send_reply(&writer, 530).await?;
                } else if let Some(handler) = handlers.get(&command) {
                    (**handler)(
                        Arc::clone(&writer),
                        Arc::clone(&shared),
                        Arc::clone(&session),
                        arg,
                    )
                    .await?;
                } else {
                    send_reply(&writer, 502).await?;
                }
            }
        }

        if session.lock().await.closing {
            break;
        }
    }
    Ok(())
}
