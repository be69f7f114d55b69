use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the REIN (Reinitialize) FTP command: back to the state right
/// after the control connection opened.
pub async fn handle_rein_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    session.lock().await.reset(&shared.ports);
    send_reply(&writer, 200).await
}
