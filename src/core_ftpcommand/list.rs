use crate::core_auth::AccessLevel;
use crate::core_network::dataconn::write_to_data_conn;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::format::format_list_line;
use crate::core_proto::reply::send_reply;
use crate::core_vfs::VfsError;
use log::warn;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the LIST FTP command: a Unix `ls -l` style listing of the
/// working directory over the data connection.
///
/// The permission column reflects the session access level, not
/// per-file bits; backends do not carry permission metadata.
pub async fn handle_list_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let (cwd, access) = {
        let session = session.lock().await;
        (session.cwd.clone(), session.access)
    };

    let files = match shared.node.list(&cwd).await {
        Ok(files) => files,
        Err(VfsError::NotFolder) => return send_reply(&writer, 501).await,
        Err(e) => {
            warn!("LIST: \"{}\": {}", cwd, e);
            return send_reply(&writer, 550).await;
        }
    };

    let permstr = match access {
        AccessLevel::ReadWrite => "rw-rw-rw-",
        _ => "r--r--r--",
    };

    let mut listing = String::new();
    for file in &files {
        listing.push_str(&format_list_line(file, permstr));
    }

    write_to_data_conn(
        Box::new(Cursor::new(listing.into_bytes())),
        writer,
        shared,
        &session,
    )
    .await
}
