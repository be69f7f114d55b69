use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::dataconn::write_to_data_conn;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::format::format_mlsx;
use crate::core_proto::reply::send_reply;
use crate::core_vfs::VfsError;
use log::warn;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MLSD FTP command (RFC 3659): one machine-readable fact
/// line per directory entry, sent over the data connection.
pub async fn handle_mlsd_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let path = {
        let session = session.lock().await;
        resolve_path(&session.cwd, &arg)
    };

    let files = match shared.node.list(&path).await {
        Ok(files) => files,
        Err(VfsError::NotFolder) => return send_reply(&writer, 501).await,
        Err(e) => {
            warn!("MLSD: \"{}\": {}", path, e);
            return send_reply(&writer, 550).await;
        }
    };

    let mut listing = String::new();
    for file in &files {
        listing.push_str(&format_mlsx(file));
        listing.push_str("\r\n");
    }

    write_to_data_conn(
        Box::new(Cursor::new(listing.into_bytes())),
        writer,
        shared,
        &session,
    )
    .await
}
