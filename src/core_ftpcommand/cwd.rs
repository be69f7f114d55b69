use crate::core_ftpcommand::utils::resolve_path;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the CWD (Change Working Directory) FTP command.
///
/// The target must stat as a directory in the virtual filesystem; the
/// stored working directory is kept canonical, without a trailing
/// slash except for the root.
pub async fn handle_cwd_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return send_reply(&writer, 501).await;
    }

    let target = {
        let session = session.lock().await;
        resolve_path(&session.cwd, &arg)
    };

    let is_folder = target == "/"
        || matches!(shared.node.stat(&target).await, Ok(info) if info.is_directory);
    if !is_folder {
        warn!("CWD: target folder \"{}\" stat failed", target);
        return send_reply(&writer, 501).await;
    }

    let mut session = session.lock().await;
    session.cwd = if target != "/" {
        target.trim_end_matches('/').to_string()
    } else {
        target
    };
    drop(session);
    send_reply(&writer, 200).await
}
