use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::info;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Handles the ABOR FTP command.
///
/// With a transfer in flight: flag the transfer as errored, wake its
/// task out of the copy, then wait for `in_transfer` to drop. The
/// transfer task clears it only after the data connection is closed and
/// the 426 has been queued, so the 226 sent here always comes last.
/// With an idle data connection: just close it. Otherwise there is
/// nothing to abort.
pub async fn handle_abor_command(
    writer: ControlWriter,
    _shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let (in_transfer, transfer_error, abort, idle_conn) = {
        let mut session = session.lock().await;
        (
            Arc::clone(&session.in_transfer),
            Arc::clone(&session.transfer_error),
            Arc::clone(&session.abort),
            session.pasv_conn.take(),
        )
    };

    if in_transfer.load(Ordering::SeqCst) {
        info!("ABOR: aborting transfer in flight");
        transfer_error.store(true, Ordering::SeqCst);
        abort.notify_one();
        // Actively wait for the transfer task to finish.
        while in_transfer.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    } else if let Some(conn) = idle_conn {
        info!("ABOR: closing idle data connection");
        drop(conn);
    }

    send_reply(&writer, 226).await
}
