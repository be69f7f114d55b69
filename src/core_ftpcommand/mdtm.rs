use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::format::ftp_time;
use crate::core_proto::reply::{send_reply, send_reply_with};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MDTM FTP command (RFC 3659): last modification time as
/// `YYYYMMDDhhmmss` in UTC.
pub async fn handle_mdtm_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let path = {
        let session = session.lock().await;
        resolve_path(&session.cwd, &arg)
    };

    match shared.node.stat(&path).await {
        Ok(info) => send_reply_with(&writer, 213, &ftp_time(&info.modified)).await,
        Err(_) => send_reply(&writer, 550).await,
    }
}
