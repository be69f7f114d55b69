use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::{send_raw, FEATURES};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the FEAT FTP command: the multi-line feature advertisement.
pub async fn handle_feat_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let body = format!("211- Features supported\r\n{}211 End\r\n", FEATURES);
    send_raw(&writer, body.as_bytes()).await
}
