use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::OwnedSemaphorePermit;

use crate::client::Client;
use crate::error::ProtocolError;
use crate::protocol::responses::INTERNAL_ERROR;
use crate::protocol::{CommandStatus, HandlerContext, Response, handle_command, parse_command};

/// Serves one client connection until it quits or disconnects.
///
/// - Reads one request per line, bounded by `max_command_length`.
/// - Runs each command on the blocking pool so filesystem work never stalls
///   the runtime.
/// - Holds `_permit` for its whole lifetime, which is what caps concurrent clients.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    context: Arc<HandlerContext>,
    max_command_length: usize,
    _permit: OwnedSemaphorePermit,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    let mut client = Client::new(client_addr);

    if let Err(e) = write_half
        .write_all(Response::message("RAX file service ready").to_line().as_bytes())
        .await
    {
        warn!("Failed to greet {}: {}", client_addr, e);
        return;
    }

    // One byte over the limit is enough to know the line is too long.
    let read_limit = max_command_length.saturating_add(2) as u64;

    loop {
        line.clear();
        match (&mut reader).take(read_limit).read_line(&mut line).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(_) => {
                if !line.ends_with('\n') && line.len() as u64 >= read_limit {
                    // The rest of the oversized line is still unread; resync
                    // is not possible, so reply and drop the connection.
                    let err = ProtocolError::RequestTooLong {
                        length: line.len(),
                        max: max_command_length,
                    };
                    warn!("Client {}: {}", client_addr, err);
                    let _ = write_half
                        .write_all(Response::from_protocol_error(&err).to_line().as_bytes())
                        .await;
                    break;
                }

                if line.trim().is_empty() {
                    continue;
                }

                let command = match parse_command(&line, max_command_length) {
                    Ok(command) => command,
                    Err(e) => {
                        warn!("Bad request from {}: {}", client_addr, e);
                        let reply = Response::from_protocol_error(&e).to_line();
                        if write_half.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                info!("Received from {}: {}", client_addr, command.name());

                let ctx = Arc::clone(&context);
                let task = tokio::task::spawn_blocking(move || {
                    let result = handle_command(&mut client, command, &ctx);
                    (client, result)
                });

                let result = match task.await {
                    Ok((returned, result)) => {
                        client = returned;
                        result
                    }
                    Err(e) => {
                        error!("Request handler for {} failed: {}", client_addr, e);
                        let reply =
                            Response::error(INTERNAL_ERROR, "internal_error", "request failed")
                                .to_line();
                        let _ = write_half.write_all(reply.as_bytes()).await;
                        break;
                    }
                };

                if let Err(e) = write_half
                    .write_all(result.response.to_line().as_bytes())
                    .await
                {
                    error!("Failed to write to {}: {}", client_addr, e);
                    break;
                }

                match result.status {
                    CommandStatus::CloseConnection => {
                        info!("Client {} requested to quit", client_addr);
                        break;
                    }
                    CommandStatus::Success => {
                        debug!("Sent {} to {}", result.response.status, client_addr);
                    }
                    CommandStatus::Failure(reason) => {
                        debug!("Request from {} failed: {}", client_addr, reason);
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    let _ = write_half.shutdown().await;
    info!("Client {} disconnected", client_addr);
}
