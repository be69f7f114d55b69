use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::dataconn::read_from_data_conn;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the STOR (Store) FTP command: receives the data connection
/// into a freshly created (or truncated) file.
pub async fn handle_stor_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let path = {
        let session = session.lock().await;
        resolve_path(&session.cwd, &arg)
    };

    match shared.node.write_file(&path).await {
        Ok(sink) => {
            info!("STOR: storing \"{}\"", path);
            read_from_data_conn(sink, writer, shared, &session).await
        }
        Err(e) => {
            warn!("STOR: \"{}\": {}", path, e);
            send_reply(&writer, 550).await
        }
    }
}
