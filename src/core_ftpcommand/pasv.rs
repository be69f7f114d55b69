use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::hostport::pack_host_port;
use crate::core_proto::reply::{send_reply, send_reply_with};
use log::{debug, warn};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Handles the PASV FTP command.
///
/// Allocates a data port, opens the listener and answers 227 with the
/// host-port tuple the client should dial. A listener left over from an
/// earlier PASV is closed and its port returned first. Failure to
/// allocate or bind is resource exhaustion: 421, and the control
/// connection closes.
pub async fn handle_pasv_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    // Close the previous passive channel, if any.
    let local_ip = {
        let mut session = session.lock().await;
        session.release_data_channel(&shared.ports);
        session.local_ip
    };

    let addr: IpAddr = if shared.data_address.is_empty() || shared.data_address == "0.0.0.0" {
        local_ip
    } else {
        match shared.data_address.parse() {
            Ok(ip) => ip,
            Err(e) => {
                warn!("PASV: bad data address \"{}\": {}", shared.data_address, e);
                return refuse_service(&writer, &session).await;
            }
        }
    };

    let Some(port) = shared.ports.allocate() else {
        warn!("PASV: no free data port");
        return refuse_service(&writer, &session).await;
    };

    let listener = match TcpListener::bind((addr, port)).await {
        Ok(listener) => listener,
        Err(e) => {
            warn!("PASV: listen error on {}:{}: {}", addr, port, e);
            shared.ports.release(port);
            return refuse_service(&writer, &session).await;
        }
    };
    debug!("PASV: listening on {}:{}", addr, port);

    {
        let mut session = session.lock().await;
        session.pasv_listener = Some(listener);
        session.pasv_port = Some(port);
    }

    send_reply_with(&writer, 227, &pack_host_port(addr, port)).await
}

/// 421 means the service cannot carry data connections right now; the
/// control connection goes down with it.
async fn refuse_service(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    session.lock().await.closing = true;
    send_reply(writer, 421).await
}
