use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_dele_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let path = {
        let session = session.lock().await;
        resolve_path(&session.cwd, &arg)
    };

    match shared.node.delete_file(&path).await {
        Ok(()) => send_reply(&writer, 200).await,
        Err(e) => {
            warn!("DELE: \"{}\": {}", path, e);
            send_reply(&writer, 550).await
        }
    }
}
