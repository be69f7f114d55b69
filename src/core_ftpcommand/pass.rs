use crate::core_auth::AccessLevel;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASS FTP command.
///
/// Valid only after USER (503 otherwise). On bad credentials the
/// pending username stays, so the client may retry PASS.
pub async fn handle_pass_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let username = session.lock().await.pending_username.clone();
    if username.is_empty() {
        return send_reply(&writer, 503).await;
    }

    let access = shared.auth.login(&username, &arg);
    if access != AccessLevel::None {
        info!("PASS: user {} logged in as {:?}", username, access);
        let mut session = session.lock().await;
        session.access = access;
        session.pending_username.clear();
        drop(session);
        send_reply(&writer, 230).await
    } else {
        warn!("PASS: login failed for user {}", username);
        send_reply(&writer, 530).await
    }
}
