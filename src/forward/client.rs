//! Persistent TCP session to a Fluent Forward receiver.

use std::io::ErrorKind;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};

use crate::config::ForwardConfig;
use crate::forward::protocol::OutboundMessage;
use crate::forward::{ForwardError, Forwarder};

/// Forward-protocol client shared by every request handler.
///
/// The socket sits behind an async mutex: each message is written whole
/// while the lock is held, so concurrent senders never interleave bytes.
/// Once the session breaks, at most one reconnect is attempted per
/// `reconnect_backoff`; sends in between fail with
/// [`ForwardError::NotConnected`] without touching the network.
pub struct ForwardClient {
    config: ForwardConfig,
    session: Mutex<Session>,
}

#[derive(Default)]
struct Session {
    stream: Option<TcpStream>,
    /// Earliest instant the next reconnect may start.
    retry_at: Option<Instant>,
}

impl ForwardClient {
    pub fn new(config: ForwardConfig) -> Self {
        Self {
            config,
            session: Mutex::new(Session::default()),
        }
    }

    /// Establish the session, replacing any existing one.
    pub async fn connect(&self) -> Result<(), ForwardError> {
        let stream = self.open().await?;
        let mut session = self.session.lock().await;
        session.stream = Some(stream);
        session.retry_at = None;

        tracing::info!(target_addr = %self.config.address, "connected to forward receiver");
        Ok(())
    }

    /// Flush and close the session. A no-op when not connected.
    pub async fn disconnect(&self) -> Result<(), ForwardError> {
        let mut session = self.session.lock().await;
        if let Some(mut stream) = session.stream.take() {
            stream.shutdown().await.map_err(ForwardError::Write)?;
            tracing::info!(
                target_addr = %self.config.address,
                "disconnected from forward receiver"
            );
        }
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.stream.is_some()
    }

    /// Reopen a broken session, unless an attempt already ran inside the
    /// current backoff window. The lock is not held while dialing.
    async fn reconnect(&self) -> Result<(), ForwardError> {
        {
            let mut session = self.session.lock().await;
            if session.stream.is_some() {
                return Ok(());
            }
            let now = Instant::now();
            if session.retry_at.is_some_and(|at| now < at) {
                return Err(ForwardError::NotConnected);
            }
            session.retry_at = Some(now + self.config.reconnect_backoff());
        }

        let stream = self.open().await?;
        let mut session = self.session.lock().await;
        if session.stream.is_none() {
            session.stream = Some(stream);
            tracing::info!(
                target_addr = %self.config.address,
                "re-established forward session"
            );
        }
        Ok(())
    }

    async fn open(&self) -> Result<TcpStream, ForwardError> {
        let stream = match timeout(
            self.config.connect_timeout(),
            TcpStream::connect(&self.config.address),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ForwardError::ConnectionFailed {
                    target: self.config.address.clone(),
                    source: e,
                });
            }
            Err(_) => {
                return Err(ForwardError::ConnectionFailed {
                    target: self.config.address.clone(),
                    source: std::io::Error::new(ErrorKind::TimedOut, "connection timed out"),
                });
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "failed to set TCP_NODELAY");
        }
        Ok(stream)
    }
}

#[async_trait]
impl Forwarder for ForwardClient {
    async fn send(&self, message: &OutboundMessage) -> Result<(), ForwardError> {
        let frame = message.encode()?;

        if !self.is_connected().await {
            self.reconnect().await?;
        }

        let mut session = self.session.lock().await;
        let Some(stream) = session.stream.as_mut() else {
            return Err(ForwardError::NotConnected);
        };

        let written = timeout(self.config.write_timeout(), async {
            stream.write_all(&frame).await?;
            stream.flush().await
        })
        .await;

        match written {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                session.stream = None;
                Err(ForwardError::Write(e))
            }
            Err(_) => {
                // A partial frame may be on the wire; the session is unusable.
                session.stream = None;
                Err(ForwardError::Timeout)
            }
        }
    }
}
