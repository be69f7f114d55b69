use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_noop_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_reply(&writer, 200).await
}
