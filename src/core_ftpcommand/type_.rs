use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session, TransferType};
use crate::core_proto::reply::send_reply;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the TYPE FTP command.
///
/// ASCII and Image are accepted (neither transforms the byte stream);
/// EBCDIC is known but unsupported (504), anything else is a syntax
/// error (501).
pub async fn handle_type_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match arg.as_str() {
        "A" => {
            session.lock().await.transfer_type = TransferType::Ascii;
            send_reply(&writer, 200).await
        }
        "I" => {
            session.lock().await.transfer_type = TransferType::Image;
            send_reply(&writer, 200).await
        }
        "E" => send_reply(&writer, 504).await,
        _ => send_reply(&writer, 501).await,
    }
}
