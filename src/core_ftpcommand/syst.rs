use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply_with;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SYST FTP command. "UNIX Type: L8" is what everything
/// answers, whatever it actually runs on.
pub async fn handle_syst_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_reply_with(&writer, 215, "UNIX Type: L8").await
}
