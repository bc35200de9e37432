use std::fs;
use std::net::SocketAddr;

use rax_fs::Server;
use rax_fs::auth::CredentialStore;
use rax_fs::config::ServerConfig;
use rax_fs::protocol::Response;
use rax_fs::storage::FileEngine;
use serde_json::json;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

const TEST_CONFIG: &str = r#"
    [startup]
    bind_address = "127.0.0.1"
    control_port = 0
    server_root = "unused"
    max_clients = 1
"#;

// Helper to start a server over a fresh temp root
async fn start_server() -> (TempDir, SocketAddr) {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(temp.path().join("hello.txt"), "hello world").unwrap();
    fs::create_dir(temp.path().join("docs")).unwrap();

    let config = ServerConfig::from_toml_str(TEST_CONFIG).unwrap();
    let engine = FileEngine::new(temp.path()).unwrap();
    let credentials = CredentialStore::from_pairs(&[("alice", "alice123")]);

    let server = Server::with_engine(engine, credentials, &config.startup)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();

    tokio::spawn(async move {
        server.start().await;
    });

    (temp, addr)
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> (Self, Response) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half),
            writer,
        };
        let greeting = client.receive().await;
        (client, greeting)
    }

    async fn receive(&mut self) -> Response {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    // Helper to send one request line and read the response
    async fn send(&mut self, request: &str) -> Response {
        self.writer
            .write_all(format!("{request}\n").as_bytes())
            .await
            .unwrap();
        self.receive().await
    }

    async fn login(&mut self) {
        let response = self
            .send(r#"{"op":"login","username":"alice","password":"alice123"}"#)
            .await;
        assert_eq!(response.status, 200);
    }
}

#[tokio::test]
async fn test_session_round_trip() {
    let (temp, addr) = start_server().await;
    let (mut client, greeting) = TestClient::connect(addr).await;
    assert_eq!(greeting.status, 200);

    let response = client.send(r#"{"op":"list","path":"."}"#).await;
    assert_eq!(response.status, 401);

    let health = client.send(r#"{"op":"health"}"#).await;
    assert_eq!(health.data.unwrap()["status"], "ok");

    client.login().await;

    let whoami = client.send(r#"{"op":"whoami"}"#).await;
    let data = whoami.data.unwrap();
    assert_eq!(data["logged_in"], true);
    assert_eq!(data["username"], "alice");

    let listing = client.send(r#"{"op":"list","path":"."}"#).await;
    assert_eq!(listing.status, 200);
    let data = listing.data.unwrap();
    assert_eq!(data["files"][0]["name"], "docs");
    assert_eq!(data["files"][0]["type"], "directory");
    assert_eq!(data["files"][1]["name"], "hello.txt");

    let read = client
        .send(r#"{"op":"read","path":"hello.txt"}"#)
        .await;
    assert_eq!(read.data.unwrap()["content"], "hello world");

    let created = client
        .send(r#"{"op":"create_file","path":"docs/new.txt","content":"fresh"}"#)
        .await;
    assert_eq!(created.status, 200);
    assert_eq!(
        fs::read_to_string(temp.path().join("docs/new.txt")).unwrap(),
        "fresh"
    );

    let quit = client.send("QUIT").await;
    assert_eq!(quit.status, 200);
}

#[tokio::test]
async fn test_error_responses() {
    let (_temp, addr) = start_server().await;
    let (mut client, _) = TestClient::connect(addr).await;
    client.login().await;

    let denied = client.send(r#"{"op":"read","path":"../etc/passwd"}"#).await;
    assert_eq!(denied.status, 403);
    assert_eq!(denied.kind.as_deref(), Some("access_denied"));

    let missing = client.send(r#"{"op":"info","path":"nope.txt"}"#).await;
    assert_eq!(missing.status, 404);

    let malformed = client.send("{not json").await;
    assert_eq!(malformed.status, 400);

    let unknown = client.send(r#"{"op":"format_disk"}"#).await;
    assert_eq!(unknown.status, 400);

    let request = json!({ "op": "search", "path": ".", "pattern": "*.TXT" }).to_string();
    let search = client.send(&request).await;
    assert_eq!(search.status, 200);
    assert_eq!(search.data.unwrap()["results"][0]["name"], "hello.txt");
}

#[tokio::test]
async fn test_bad_credentials_are_rejected() {
    let (_temp, addr) = start_server().await;
    let (mut client, _) = TestClient::connect(addr).await;

    let response = client
        .send(r#"{"op":"login","username":"alice","password":"wrong"}"#)
        .await;

    assert_eq!(response.status, 401);
    assert_eq!(response.error.as_deref(), Some("Invalid username or password"));
}

#[tokio::test]
async fn test_connection_limit() {
    let (_temp, addr) = start_server().await;
    let (mut first, _) = TestClient::connect(addr).await;

    let (_second, refused) = TestClient::connect(addr).await;
    assert_eq!(refused.status, 503);

    first.login().await;
}
