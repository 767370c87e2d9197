use crate::config::{SignalingConfig, SignalingMode};
use crate::error::{Result, SessionError};
use crate::signaling::signaling_channel::SignalingChannel;
use async_trait::async_trait;
use ballsync_core::{SessionDescription, SignalMessage};
use std::io::ErrorKind;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Longest signaling line accepted from the peer, newline included.
pub const MAX_SIGNAL_LINE: usize = 256 * 1024;

/// Newline-delimited JSON signaling over a single TCP connection.
pub struct TcpSignaling {
    config: SignalingConfig,
    reader: Option<BufReader<OwnedReadHalf>>,
    writer: Option<OwnedWriteHalf>,
}

impl TcpSignaling {
    pub fn new(config: SignalingConfig) -> Self {
        Self {
            config,
            reader: None,
            writer: None,
        }
    }

    async fn dial(&self) -> std::io::Result<TcpStream> {
        TcpStream::connect(self.config.addr()).await
    }

    async fn listen(&self) -> Result<TcpStream> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| SessionError::Unreachable {
                addr: addr.clone(),
                source,
            })?;
        info!("Waiting for signaling peer on {}", addr);

        let (stream, peer) = listener.accept().await?;
        debug!("Signaling peer connected from {}", peer);
        Ok(stream)
    }

    async fn write_message(&mut self, msg: &SignalMessage) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState("signaling is not connected".to_owned()))?;

        let mut line = serde_json::to_string(msg)?;
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SessionError::Disconnected(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| SessionError::Disconnected(e.to_string()))
    }
}

#[async_trait]
impl SignalingChannel for TcpSignaling {
    async fn connect(&mut self) -> Result<()> {
        let addr = self.config.addr();
        let stream = match self.config.mode {
            SignalingMode::Listen => self.listen().await?,
            SignalingMode::Dial => self
                .dial()
                .await
                .map_err(|source| SessionError::Unreachable { addr, source })?,
            SignalingMode::Auto => match self.dial().await {
                Ok(stream) => stream,
                Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                    debug!("Nobody listens on {}, listening instead", addr);
                    self.listen().await?
                }
                Err(source) => return Err(SessionError::Unreachable { addr, source }),
            },
        };
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        self.reader = Some(BufReader::new(read_half));
        self.writer = Some(write_half);
        Ok(())
    }

    async fn send(&mut self, desc: &SessionDescription) -> Result<()> {
        self.write_message(&SignalMessage::from(desc.clone())).await
    }

    async fn receive(&mut self) -> Result<SessionDescription> {
        let timeout = self.config.receive_timeout;
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState("signaling is not connected".to_owned()))?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            let mut limited = (&mut *reader).take(MAX_SIGNAL_LINE as u64);
            let n = tokio::time::timeout(timeout, limited.read_until(b'\n', &mut buf))
                .await
                .map_err(|_| SessionError::Timeout("remote session description".to_owned()))?
                .map_err(|e| SessionError::Disconnected(e.to_string()))?;

            if n == 0 {
                return Err(SessionError::Disconnected(
                    "peer closed the connection".to_owned(),
                ));
            }
            if buf.last() != Some(&b'\n') {
                if n >= MAX_SIGNAL_LINE {
                    return Err(SessionError::Protocol(format!(
                        "signaling message exceeds {MAX_SIGNAL_LINE} bytes"
                    )));
                }
                return Err(SessionError::Disconnected(
                    "peer closed the connection mid-message".to_owned(),
                ));
            }

            let line = std::str::from_utf8(&buf)
                .map_err(|e| SessionError::Protocol(format!("signaling message is not utf-8: {e}")))?;
            if line.trim().is_empty() {
                continue;
            }

            let msg: SignalMessage = serde_json::from_str(line)
                .map_err(|e| SessionError::Protocol(format!("malformed signaling message: {e}")))?;

            return msg
                .into_description()
                .ok_or_else(|| SessionError::Disconnected("peer said bye".to_owned()));
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.reader = None;
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        let mut bye = serde_json::to_string(&SignalMessage::Bye)?;
        bye.push('\n');
        if let Err(e) = writer.write_all(bye.as_bytes()).await {
            debug!("Could not say bye to signaling peer: {}", e);
        }
        if let Err(e) = writer.shutdown().await {
            warn!("Signaling shutdown failed: {}", e);
        }
        Ok(())
    }
}
