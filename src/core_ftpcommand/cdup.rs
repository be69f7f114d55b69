use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the CDUP (Change to Parent Directory) FTP command.
/// CDUP at the root replies 550.
pub async fn handle_cdup_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let cwd = session.lock().await.cwd.clone();
    if cwd == "/" {
        return send_reply(&writer, 550).await;
    }

    let parent = match cwd.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => cwd[..idx].to_string(),
    };

    match shared.node.stat(&parent).await {
        Ok(info) if info.is_directory => {
            session.lock().await.cwd = parent;
            send_reply(&writer, 200).await
        }
        _ => {
            warn!("CDUP: folder \"{}\" -> \"{}\" stat failed", cwd, parent);
            send_reply(&writer, 550).await
        }
    }
}
