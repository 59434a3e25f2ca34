//! Per-connection request handling
//!
//! Reads one bounded, timed-out request line, translates it into hub calls,
//! and either answers with a single response line or turns the connection
//! into a long-lived subscriber push stream.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::hub::MessageHub;
use crate::protocol::{Request, Response};
use crate::server::config::ServerConfig;

/// One client connection
///
/// Generic over the transport so it can be driven by a `TcpStream` in
/// production and an in-memory duplex stream in tests.
pub(crate) struct Connection<S> {
    session_id: u64,
    stream: S,
    peer_addr: SocketAddr,
    config: ServerConfig,
    hub: Arc<MessageHub>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub(crate) fn new(
        session_id: u64,
        stream: S,
        peer_addr: SocketAddr,
        config: ServerConfig,
        hub: Arc<MessageHub>,
    ) -> Self {
        Self {
            session_id,
            stream,
            peer_addr,
            config,
            hub,
        }
    }

    /// Serve the connection to completion
    pub(crate) async fn run(self) -> Result<()> {
        let Connection {
            session_id,
            stream,
            peer_addr,
            config,
            hub,
        } = self;

        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);

        let line = match timeout(
            config.request_timeout,
            read_request_line(&mut reader, config.max_request_line),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(session_id, peer = %peer_addr, "Request line timed out");
                return Err(Error::Protocol("request line timed out".into()));
            }
        };

        match Request::parse(&line) {
            Ok(Request::Subscribe) => {
                serve_subscriber(session_id, hub, reader, write_half).await
            }
            Ok(Request::Publish(body)) => {
                let response = match hub.publish(&body.text, &body.sender) {
                    Ok(receipt) => {
                        tracing::debug!(
                            session_id,
                            queue_position = receipt.queue_position,
                            "Publish accepted"
                        );
                        Response::published(receipt.queue_position)
                    }
                    Err(e) => {
                        tracing::warn!(session_id, peer = %peer_addr, error = %e, "Publish rejected");
                        Response::rejected(e.to_string())
                    }
                };
                write_half.write_all(&response.encode()).await?;
                write_half.shutdown().await?;
                Ok(())
            }
            Ok(Request::Clear) => {
                hub.clear();
                write_half.write_all(&Response::accepted().encode()).await?;
                write_half.shutdown().await?;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session_id, peer = %peer_addr, error = %e, "Bad request");
                write_half
                    .write_all(&Response::rejected(e.to_string()).encode())
                    .await?;
                write_half.shutdown().await?;
                Ok(())
            }
        }
    }
}

/// Drive one subscriber until it disconnects or a write fails
///
/// The read half is watched for EOF so a client that hangs up is
/// deregistered promptly; the hub prunes the channel either way once the
/// stream is dropped.
async fn serve_subscriber<R, W>(
    session_id: u64,
    hub: Arc<MessageHub>,
    mut reader: R,
    mut writer: W,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stream = hub.subscribe();
    tracing::debug!(session_id, subscriber_id = stream.id(), "Subscriber attached");

    loop {
        tokio::select! {
            frame = stream.recv() => match frame {
                Some(frame) => {
                    writer.write_all(&frame).await?;
                    writer.flush().await?;
                }
                None => break,
            },
            closed = wait_for_disconnect(&mut reader) => {
                closed?;
                tracing::debug!(session_id, subscriber_id = stream.id(), "Subscriber hung up");
                break;
            }
        }
    }

    Ok(())
}

async fn wait_for_disconnect<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<()> {
    let mut buf = [0u8; 512];
    loop {
        // Subscribers send nothing after the request line; any read of zero
        // bytes means the peer closed.
        if reader.read(&mut buf).await? == 0 {
            return Ok(());
        }
    }
}

async fn read_request_line<R>(reader: &mut R, max_len: usize) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    use tokio::io::AsyncBufReadExt;

    let mut line = String::new();
    let n = reader
        .take(max_len as u64)
        .read_line(&mut line)
        .await?;

    if n == 0 {
        return Err(Error::Protocol("connection closed before request".into()));
    }
    if !line.ends_with('\n') && line.len() >= max_len {
        return Err(Error::Protocol("request line too long".into()));
    }

    Ok(line)
}
