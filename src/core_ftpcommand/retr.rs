use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::dataconn::write_to_data_conn;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the RETR (Retrieve) FTP command: streams a file from the
/// virtual filesystem out over the data connection.
pub async fn handle_retr_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let path = {
        let session = session.lock().await;
        resolve_path(&session.cwd, &arg)
    };

    match shared.node.read_file(&path).await {
        Ok(source) => {
            info!("RETR: sending \"{}\"", path);
            write_to_data_conn(source, writer, shared, &session).await
        }
        Err(e) => {
            warn!("RETR: \"{}\": {}", path, e);
            send_reply(&writer, 550).await
        }
    }
}
