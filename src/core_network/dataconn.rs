use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use crate::core_proto::reply::send_reply;
use crate::core_vfs::{ReadStream, WriteStream};
use log::{debug, warn};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, Notify};
use tokio::time::timeout;

/// Produces an open data connection for a transfer, emitting the
/// preliminary reply.
///
/// An already-accepted connection is reused (125). Otherwise the
/// passive listener set up by PASV is awaited (150) for at most the
/// configured timeout; the listener is then discarded and its port
/// released whether or not a client showed up. With no passive channel
/// at all the transfer is refused with 425.
async fn ensure_open(
    writer: &ControlWriter,
    shared: &ServerShared,
    session: &Arc<Mutex<Session>>,
) -> Result<Option<TcpStream>, std::io::Error> {
    let (listener, port) = {
        let mut session = session.lock().await;
        if let Some(conn) = session.pasv_conn.take() {
            drop(session);
            send_reply(writer, 125).await?;
            return Ok(Some(conn));
        }
        match session.pasv_listener.take() {
            Some(listener) => (listener, session.pasv_port.take()),
            None => {
                drop(session);
                send_reply(writer, 425).await?;
                return Ok(None);
            }
        }
    };

    send_reply(writer, 150).await?;

    let accepted = timeout(shared.data_conn_timeout, listener.accept()).await;
    drop(listener);
    if let Some(port) = port {
        shared.ports.release(port);
    }

    match accepted {
        Ok(Ok((conn, addr))) => {
            debug!("data: connection accepted from {}", addr);
            Ok(Some(conn))
        }
        Ok(Err(e)) => {
            warn!("data: accept error: {}", e);
            send_reply(writer, 426).await?;
            Ok(None)
        }
        Err(_) => {
            warn!("data: nobody connected within {:?}", shared.data_conn_timeout);
            send_reply(writer, 426).await?;
            Ok(None)
        }
    }
}

/// Streams `source` out over the data connection.
///
/// The preliminary 150/125 reply is written before this returns; the
/// copy itself runs in a spawned task that writes the 226/426
/// completion reply, closes the data connection and the source, and
/// clears `in_transfer` last.
pub async fn write_to_data_conn(
    source: ReadStream,
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: &Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    let Some(mut conn) = ensure_open(&writer, &shared, session).await? else {
        return Ok(());
    };

    // A fresh abort channel per transfer, so a notification raced
    // against a completing transfer cannot leak into the next one.
    let (in_transfer, transfer_error, abort) = {
        let mut session = session.lock().await;
        session.abort = Arc::new(Notify::new());
        (
            Arc::clone(&session.in_transfer),
            Arc::clone(&session.transfer_error),
            Arc::clone(&session.abort),
        )
    };
    transfer_error.store(false, Ordering::SeqCst);
    in_transfer.store(true, Ordering::SeqCst);

    let mut source = source;
    tokio::spawn(async move {
        let copied = tokio::select! {
            res = tokio::io::copy(&mut source, &mut conn) => Some(res),
            _ = abort.notified() => None,
        };

        match copied {
            Some(Ok(n)) if !transfer_error.load(Ordering::SeqCst) => {
                let _ = conn.shutdown().await;
                debug!("data: sent {} bytes", n);
                let _ = send_reply(&writer, 226).await;
            }
            other => {
                if let Some(Err(e)) = other {
                    warn!("data: send error: {}", e);
                }
                let _ = send_reply(&writer, 426).await;
            }
        }

        drop(conn);
        drop(source);
        in_transfer.store(false, Ordering::SeqCst);
    });

    Ok(())
}

/// Streams the data connection into `sink`. The mirror image of
/// [`write_to_data_conn`]; keep the two in sync.
pub async fn read_from_data_conn(
    sink: WriteStream,
    writer: ControlWriter,
    shared: Arc<ServerShared>,
    session: &Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    let Some(mut conn) = ensure_open(&writer, &shared, session).await? else {
        return Ok(());
    };

    // A fresh abort channel per transfer, so a notification raced
    // against a completing transfer cannot leak into the next one.
    let (in_transfer, transfer_error, abort) = {
        let mut session = session.lock().await;
        session.abort = Arc::new(Notify::new());
        (
            Arc::clone(&session.in_transfer),
            Arc::clone(&session.transfer_error),
            Arc::clone(&session.abort),
        )
    };
    transfer_error.store(false, Ordering::SeqCst);
    in_transfer.store(true, Ordering::SeqCst);

    let mut sink = sink;
    tokio::spawn(async move {
        let copied = tokio::select! {
            res = tokio::io::copy(&mut conn, &mut sink) => Some(res),
            _ = abort.notified() => None,
        };

        match copied {
            Some(Ok(n)) if !transfer_error.load(Ordering::SeqCst) => {
                let _ = sink.shutdown().await;
                debug!("data: received {} bytes", n);
                let _ = send_reply(&writer, 226).await;
            }
            other => {
                if let Some(Err(e)) = other {
                    warn!("data: receive error: {}", e);
                }
                let _ = send_reply(&writer, 426).await;
            }
        }

        drop(conn);
        drop(sink);
        in_transfer.store(false, Ordering::SeqCst);
    });

    Ok(())
}
