use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_quit_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_reply(&writer, 221).await?;
    session.lock().await.closing = true;
    Ok(())
}
