use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::auth::CredentialStore;
use crate::client::handle_client;
use crate::config::{ServerConfig, StartupConfig};
use crate::error::ServerError;
use crate::protocol::responses::SERVICE_UNAVAILABLE;
use crate::protocol::{HandlerContext, Response};
use crate::storage::FileEngine;

pub struct Server {
    listener: TcpListener,
    context: Arc<HandlerContext>,
    connection_slots: Arc<Semaphore>,
    max_clients: usize,
    max_command_length: usize,
}

impl Server {
    /// Builds the engine and credential store from `config` and binds the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let root = config.startup.server_root_path();

        if config.startup.create_root {
            if let Err(e) = std::fs::create_dir_all(&root) {
                warn!("Failed to create server root directory: {}", e);
            }
        }

        let engine = if config.engine.restrict_to_root {
            FileEngine::new(&root)?
        } else {
            warn!("Root restriction disabled: file operations may reach the whole filesystem");
            FileEngine::unrestricted()
        }
        .with_settings(config.engine.settings());

        match engine.root() {
            Some(root) => info!("Server root directory: {}", root.display()),
            None => info!("Server running without a root boundary"),
        }

        let credentials = CredentialStore::new(config.users);
        if credentials.is_empty() {
            warn!("No users configured; every file operation will be rejected");
        } else {
            info!("Loaded {} user(s)", credentials.len());
        }

        Self::with_engine(engine, credentials, &config.startup).await
    }

    /// Binds the listener around an already constructed engine.
    pub async fn with_engine(
        engine: FileEngine,
        credentials: CredentialStore,
        startup: &StartupConfig,
    ) -> Result<Self, ServerError> {
        let socket = startup.control_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        info!("Server bound to {}", listener.local_addr()?);

        let context = HandlerContext {
            engine,
            credentials,
            max_username_length: startup.max_username_length,
        };

        Ok(Self {
            listener,
            context: Arc::new(context),
            connection_slots: Arc::new(Semaphore::new(startup.max_clients)),
            max_clients: startup.max_clients,
            max_command_length: startup.max_command_length,
        })
    }

    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop forever.
    pub async fn start(&self) {
        info!(
            "Starting RAX file service on {} (max {} clients)",
            self.local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "<unknown>".into()),
            self.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.dispatch(stream, addr),
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        let permit = match Arc::clone(&self.connection_slots).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Rejecting {}: connection limit of {} reached", addr, self.max_clients);
                tokio::spawn(reject_client(stream));
                return;
            }
        };

        info!("Client connected: {}", addr);

        let context = Arc::clone(&self.context);
        let max_command_length = self.max_command_length;

        // Spawn a task for each client so the accept loop doesn't block
        tokio::spawn(async move {
            handle_client(stream, addr, context, max_command_length, permit).await;
        });
    }
}

async fn reject_client(mut stream: TcpStream) {
    let reply = Response::error(
        SERVICE_UNAVAILABLE,
        "too_many_connections",
        "Too many connections. Try again later.",
    )
    .to_line();
    let _ = stream.write_all(reply.as_bytes()).await;
    let _ = stream.shutdown().await;
}
