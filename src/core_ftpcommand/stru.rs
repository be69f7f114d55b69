use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the STRU FTP command. Only file structure is supported.
pub async fn handle_stru_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match arg.as_str() {
        "F" => send_reply(&writer, 200).await,
        "R" | "P" => send_reply(&writer, 504).await,
        _ => send_reply(&writer, 501).await,
    }
}
