use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::time::{timeout, Duration};
use triex_codec::{decode_request, encode_reply, read_frame, write_frame};
use triex_core::{DispatcherHandle, Reply, Result, ServerConfig, TrieXError};

/// Per-connection I/O bounds.
#[derive(Debug, Clone)]
pub struct ConnectionLimits {
    /// Longest wait for the next request frame.
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_frame_len: u64,
}

impl From<&ServerConfig> for ConnectionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
            max_frame_len: config.max_frame_len,
        }
    }
}

/// Serves one persistent client connection.
///
/// Each frame is decoded, queued on the dispatcher and answered in order.
/// A malformed payload is answered in-band and the connection stays up.
/// Returns the number of requests answered once the peer leaves, goes idle
/// past the read timeout, or shutdown is signalled.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    dispatcher: DispatcherHandle,
    limits: ConnectionLimits,
    mut shutdown: watch::Receiver<bool>,
) -> Result<u64>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut served = 0u64;
    tracing::debug!("Connection: {} opened", peer);

    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown_signalled(&mut shutdown) => {
                tracing::debug!("Connection: {} closing for shutdown", peer);
                break;
            }
            read = timeout(limits.read_timeout, read_frame(&mut stream, limits.max_frame_len)) => {
                match read {
                    Err(_) => {
                        tracing::debug!("Connection: {} idle for {:?}, closing", peer, limits.read_timeout);
                        break;
                    }
                    Ok(Ok(None)) => break,
                    Ok(Ok(Some(frame))) => frame,
                    Ok(Err(e)) => return Err(e),
                }
            }
        };

        let reply = match decode_request(&frame) {
            Ok(request) => {
                tracing::debug!("Connection: {} -> {}", peer, request.operation());
                match dispatcher.submit(request).await {
                    Ok(reply) => reply,
                    Err(e) => Reply::Failed(e.to_string()),
                }
            }
            Err(TrieXError::MalformedRequest(reason)) => {
                tracing::warn!("Connection: {} sent a malformed request: {}", peer, reason);
                Reply::Malformed(reason)
            }
            Err(e) => Reply::Malformed(e.to_string()),
        };

        timeout(limits.write_timeout, write_frame(&mut stream, &encode_reply(&reply)))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "response write timed out"))??;
        served += 1;

        if dispatcher.is_closed() {
            break;
        }
    }

    Ok(served)
}

async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
