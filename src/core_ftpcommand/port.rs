use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::hostport::parse_host_port;
use crate::core_proto::reply::send_reply;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PORT (Active Mode) FTP command.
///
/// The host-port tuple is parsed and stored, but never dialed: only
/// passive mode carries data. Clients that insist on active mode get a
/// polite 200 and a stalled transfer.
pub async fn handle_port_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let Some((ip, port)) = parse_host_port(&arg) else {
        return send_reply(&writer, 501).await;
    };

    info!("PORT: client offers {}:{}", ip, port);
    let mut session = session.lock().await;
    session.active_ip = Some(ip);
    session.active_port = port;
    drop(session);
    send_reply(&writer, 200).await
}
