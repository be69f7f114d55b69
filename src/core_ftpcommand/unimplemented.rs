use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Recognized commands this server does not implement
/// (ACCT, STOU, REST, NLST, SITE, STAT).
pub async fn handle_unimplemented_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_reply(&writer, 502).await
}
