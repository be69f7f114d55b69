use crate::core_auth::{Authenticator, FileAuth};
use crate::core_network::server::Server;
use crate::core_vfs::{Node, NodeTree, SysFolderNode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Each test gets its own slice of the data-port space so suites can
/// run in parallel.
static NEXT_DATA_PORT: AtomicU16 = AtomicU16::new(40200);

fn data_port_range() -> (u16, u16) {
    let base = NEXT_DATA_PORT.fetch_add(20, Ordering::SeqCst);
    (base, base + 19)
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ferroftpd-e2e-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

async fn start_server(
    node: Arc<dyn Node>,
    auth: Option<Arc<dyn Authenticator>>,
    data_conn_timeout: Duration,
) -> (Server, SocketAddr) {
    let (min_data_port, max_data_port) = data_port_range();
    let mut server = Server::new();
    server.port = 0;
    server.address = "127.0.0.1".to_string();
    server.data_address = "127.0.0.1".to_string();
    server.min_data_port = min_data_port;
    server.max_data_port = max_data_port;
    server.data_conn_timeout = data_conn_timeout;
    server.node = Some(node);
    server.auth = auth;
    server.start().await.unwrap();
    let addr = server.local_addr().unwrap();
    (server, addr)
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    /// Connects and consumes the 220 greeting.
    async fn connect(addr: SocketAddr) -> Self {
        let socket = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = socket.into_split();
        let mut client = Client {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        let greeting = client.reply().await;
        assert!(greeting.starts_with("220 "), "greeting: {}", greeting);
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn reply(&mut self) -> String {
        let mut line = String::new();
        timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a reply")
            .unwrap();
        line.trim_end_matches("\r\n").to_string()
    }

    async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.reply().await
    }
}

/// Extracts the data port from a `227 Entering Passive Mode (...)` reply.
fn pasv_port(reply: &str) -> u16 {
    let inner = reply
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .unwrap_or_else(|| panic!("no host-port tuple in: {}", reply));
    crate::core_proto::hostport::parse_host_port(inner)
        .unwrap_or_else(|| panic!("bad host-port tuple in: {}", reply))
        .1
}

#[tokio::test]
async fn anonymous_list_over_passive_data() {
    let dir = scratch_dir("list");
    std::fs::write(dir.join("a.txt"), b"Hello, world!").unwrap();
    let (mut server, addr) = start_server(
        Arc::new(SysFolderNode::new(&dir)),
        None,
        Duration::from_secs(3),
    )
    .await;

    let mut c = Client::connect(addr).await;
    assert!(c.cmd("USER anonymous").await.starts_with("331 "));
    assert!(c.cmd("PASS guest").await.starts_with("230 "));

    let pasv = c.cmd("PASV").await;
    assert!(pasv.starts_with("227 "), "PASV: {}", pasv);
    let mut data = TcpStream::connect(("127.0.0.1", pasv_port(&pasv)))
        .await
        .unwrap();

    assert!(c.cmd("LIST").await.starts_with("150 "));
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert!(
        listing.starts_with("-r--r--r-- 1 user group"),
        "listing: {}",
        listing
    );
    assert!(listing.contains(" 13 "));
    assert!(listing.ends_with("a.txt\r\n"));

    assert!(c.reply().await.starts_with("226 "));
    assert!(c.cmd("QUIT").await.starts_with("221 "));
    server.stop().await;
}

#[tokio::test]
async fn read_write_account_uploads_and_navigates() {
    let dir = scratch_dir("stor");
    let auth = FileAuth::parse("alice:secret:rw\n");
    let (mut server, addr) = start_server(
        Arc::new(SysFolderNode::new(&dir)),
        Some(Arc::new(auth)),
        Duration::from_secs(3),
    )
    .await;

    let mut c = Client::connect(addr).await;
    assert!(c.cmd("USER alice").await.starts_with("331 "));
    assert!(c.cmd("PASS secret").await.starts_with("230 "));

    assert!(c.cmd("MKD up").await.starts_with("200 "));
    assert!(c.cmd("CWD up").await.starts_with("200 "));
    assert!(c.cmd("PWD").await.starts_with("257 \"/up\""));

    let pasv = c.cmd("PASV").await;
    let mut data = TcpStream::connect(("127.0.0.1", pasv_port(&pasv)))
        .await
        .unwrap();
    assert!(c.cmd("STOR f.txt").await.starts_with("150 "));
    data.write_all(b"payload").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert!(c.reply().await.starts_with("226 "));
    assert_eq!(std::fs::read(dir.join("up/f.txt")).unwrap(), b"payload");

    // APPE extends what STOR wrote.
    let pasv = c.cmd("PASV").await;
    let mut data = TcpStream::connect(("127.0.0.1", pasv_port(&pasv)))
        .await
        .unwrap();
    assert!(c.cmd("APPE f.txt").await.starts_with("150 "));
    data.write_all(b"-more").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert!(c.reply().await.starts_with("226 "));
    assert_eq!(std::fs::read(dir.join("up/f.txt")).unwrap(), b"payload-more");

    assert!(c.cmd("DELE f.txt").await.starts_with("200 "));
    assert!(c.cmd("CDUP").await.starts_with("200 "));
    assert!(c.cmd("PWD").await.starts_with("257 \"/\""));
    assert!(c.cmd("RMD up").await.starts_with("200 "));
    server.stop().await;
}

#[tokio::test]
async fn mount_tree_facts_and_listings() {
    let dir = scratch_dir("facts");
    std::fs::write(dir.join("f"), vec![b'x'; 42]).unwrap();
    // 2024-01-02T03:04:05Z
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_704_164_645);
    std::fs::File::options()
        .write(true)
        .open(dir.join("f"))
        .unwrap()
        .set_modified(mtime)
        .unwrap();

    let mut tree = NodeTree::new();
    tree.mount("/d", Arc::new(SysFolderNode::new(&dir))).unwrap();
    let (mut server, addr) =
        start_server(Arc::new(tree), None, Duration::from_secs(3)).await;

    let mut c = Client::connect(addr).await;
    assert!(c.cmd("USER anonymous").await.starts_with("331 "));
    assert!(c.cmd("PASS guest").await.starts_with("230 "));

    c.send("MLST /d/f").await;
    assert_eq!(c.reply().await, "250- Listing starting");
    assert_eq!(
        c.reply().await,
        " type=file;size=42;modify=20240102030405; f"
    );
    assert_eq!(c.reply().await, "250 End");

    assert_eq!(c.cmd("SIZE /d/f").await, "213 42");
    assert_eq!(c.cmd("MDTM /d/f").await, "213 20240102030405");

    // The tree branch at / lists its single child as a directory.
    let pasv = c.cmd("PASV").await;
    let mut data = TcpStream::connect(("127.0.0.1", pasv_port(&pasv)))
        .await
        .unwrap();
    assert!(c.cmd("LIST").await.starts_with("150 "));
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert!(listing.starts_with("dr--r--r-- 1 user group"), "{}", listing);
    assert!(listing.ends_with(" d\r\n"));
    assert!(c.reply().await.starts_with("226 "));

    // MLSD of the backend directory carries one fact line per entry.
    let pasv = c.cmd("PASV").await;
    let mut data = TcpStream::connect(("127.0.0.1", pasv_port(&pasv)))
        .await
        .unwrap();
    assert!(c.cmd("MLSD /d").await.starts_with("150 "));
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert_eq!(listing, "type=file;size=42;modify=20240102030405; f\r\n");
    assert!(c.reply().await.starts_with("226 "));

    // MLSD of a file is a parameter error, not a missing file.
    assert!(c.cmd("MLSD /d/f").await.starts_with("501 "));
    server.stop().await;
}

#[tokio::test]
async fn passive_accept_timeout_releases_port() {
    let dir = scratch_dir("timeout");
    std::fs::write(dir.join("a.txt"), b"Hello, world!").unwrap();
    let (mut server, addr) = start_server(
        Arc::new(SysFolderNode::new(&dir)),
        None,
        Duration::from_millis(100),
    )
    .await;

    let mut c = Client::connect(addr).await;
    assert!(c.cmd("USER anonymous").await.starts_with("331 "));
    assert!(c.cmd("PASS guest").await.starts_with("230 "));

    let first = c.cmd("PASV").await;
    let first_port = pasv_port(&first);

    // Nobody dials the data port; the transfer gives up after the
    // accept timeout.
    assert!(c.cmd("RETR a.txt").await.starts_with("150 "));
    assert!(c.reply().await.starts_with("426 "));

    // The port went back to the allocator, so the next PASV picks the
    // same lowest-numbered one.
    let second = c.cmd("PASV").await;
    assert_eq!(pasv_port(&second), first_port);
    server.stop().await;
}

#[tokio::test]
async fn abor_terminates_transfer_in_flight() {
    let dir = scratch_dir("abor");
    std::fs::write(dir.join("big"), vec![0u8; 8 * 1024 * 1024]).unwrap();
    let (mut server, addr) = start_server(
        Arc::new(SysFolderNode::new(&dir)),
        None,
        Duration::from_secs(3),
    )
    .await;

    let mut c = Client::connect(addr).await;
    assert!(c.cmd("USER anonymous").await.starts_with("331 "));
    assert!(c.cmd("PASS guest").await.starts_with("230 "));

    let pasv = c.cmd("PASV").await;
    let data = TcpStream::connect(("127.0.0.1", pasv_port(&pasv)))
        .await
        .unwrap();
    assert!(c.cmd("RETR big").await.starts_with("150 "));

    // Read nothing from the data connection: the copy stalls on
    // backpressure well before 8 MiB fit into socket buffers.
    tokio::time::sleep(Duration::from_millis(50)).await;
    c.send("ABOR").await;

    // The aborted transfer reports 426 first, then ABOR acknowledges
    // with 226 once the transfer task has wound down.
    assert!(c.reply().await.starts_with("426 "));
    assert!(c.reply().await.starts_with("226 "));
    drop(data);
    server.stop().await;
}

#[tokio::test]
async fn control_channel_reply_matrix() {
    let dir = scratch_dir("matrix");
    let (mut server, addr) = start_server(
        Arc::new(SysFolderNode::new(&dir)),
        None,
        Duration::from_secs(3),
    )
    .await;

    let mut c = Client::connect(addr).await;

    // Before login everything gated on access answers 530.
    assert!(c.cmd("LIST").await.starts_with("530 "));
    assert!(c.cmd("CWD /").await.starts_with("530 "));
    assert!(c.cmd("PASS nobody").await.starts_with("503 "));

    // No-auth commands work regardless.
    c.send("FEAT").await;
    assert_eq!(c.reply().await, "211- Features supported");
    assert_eq!(c.reply().await, " UTF8");
    assert_eq!(c.reply().await, " MDTM");
    assert_eq!(c.reply().await, " SIZE");
    assert_eq!(c.reply().await, " TVFS");
    assert_eq!(c.reply().await, " MLST type;size;modify;");
    assert_eq!(c.reply().await, "211 End");
    assert_eq!(c.cmd("SYST").await, "215 UNIX Type: L8");
    assert!(c.cmd("NOOP").await.starts_with("200 "));
    assert!(c.cmd("ALLO").await.starts_with("200 "));
    assert!(c.cmd("ACCT x").await.starts_with("502 "));
    assert!(c.cmd("STAT").await.starts_with("502 "));
    assert!(c.cmd("XYZQ").await.starts_with("500 "));

    assert!(c.cmd("USER anonymous").await.starts_with("331 "));
    assert!(c.cmd("PASS guest").await.starts_with("230 "));

    // Transfer parameter negotiation.
    assert!(c.cmd("TYPE A").await.starts_with("200 "));
    assert!(c.cmd("TYPE I").await.starts_with("200 "));
    assert!(c.cmd("TYPE E").await.starts_with("504 "));
    assert!(c.cmd("TYPE L 8").await.starts_with("501 "));
    assert!(c.cmd("STRU F").await.starts_with("200 "));
    assert!(c.cmd("STRU R").await.starts_with("504 "));
    assert!(c.cmd("STRU X").await.starts_with("501 "));
    assert!(c.cmd("MODE S").await.starts_with("200 "));
    assert!(c.cmd("MODE B").await.starts_with("504 "));
    assert!(c.cmd("MODE X").await.starts_with("501 "));

    // PORT stores the tuple without dialing anywhere.
    assert!(c.cmd("PORT 127,0,0,1,4,1").await.starts_with("200 "));
    assert!(c.cmd("PORT 1,2,3").await.starts_with("501 "));

    // Read-only users cannot write.
    assert!(c.cmd("MKD dir").await.starts_with("530 "));
    assert!(c.cmd("DELE x").await.starts_with("530 "));

    // CDUP at the root fails, ABOR with nothing in flight succeeds.
    assert!(c.cmd("CDUP").await.starts_with("550 "));
    assert!(c.cmd("ABOR").await.starts_with("226 "));

    // REIN drops the login.
    assert!(c.cmd("REIN").await.starts_with("200 "));
    assert!(c.cmd("LIST").await.starts_with("530 "));
    assert!(c.cmd("QUIT").await.starts_with("221 "));
    server.stop().await;
}
