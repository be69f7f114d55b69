use crate::core_auth::AccessLevel;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the USER FTP command.
///
/// The authenticator is consulted with an empty password so that
/// password-less accounts log in straight away (230); everyone else is
/// asked for a password (331).
pub async fn handle_user_command(
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let access = shared.auth.login(&arg, "");

    let mut session = session.lock().await;
    session.access = access;
    if access != AccessLevel::None {
        info!("USER {}: pre-authorized as {:?}", arg, access);
        session.pending_username.clear();
        drop(session);
        send_reply(&writer, 230).await
    } else {
        session.pending_username = arg;
        drop(session);
        send_reply(&writer, 331).await
    }
}
