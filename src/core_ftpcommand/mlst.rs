use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::format::format_mlsx;
use crate::core_proto::reply::{send_raw, send_reply};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MLST FTP command (RFC 3659): machine-readable facts for
/// one path, on the control connection. With no argument it describes
/// the working directory.
pub async fn handle_mlst_command(
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
        Ok(info) => {
            let body = format!(
                "250- Listing starting\r\n {}\r\n250 End\r\n",
                format_mlsx(&info)
            );
            send_raw(&writer, body.as_bytes()).await
        }
        Err(_) => send_reply(&writer, 550).await,
    }
}
