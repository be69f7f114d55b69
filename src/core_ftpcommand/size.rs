use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::{send_reply, send_reply_with};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SIZE FTP command (RFC 3659): file size in bytes.
pub async fn handle_size_command(
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
        Ok(info) => send_reply_with(&writer, 213, &info.size.to_string()).await,
        Err(_) => send_reply(&writer, 550).await,
    }
}
