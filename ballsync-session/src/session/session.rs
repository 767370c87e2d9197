use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::session::behavior::{SessionBehavior, SessionContext};
use crate::session::consumer::ConsumerBehavior;
use crate::session::producer::ProducerBehavior;
use crate::session::state::{SessionState, SessionStateMachine};
use crate::signaling::{SignalingChannel, negotiate};
use crate::transport::{PeerTransport, TransportEvent};
use ballsync_core::{Role, SessionId};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The local shutdown signal fired.
    Interrupted,
    /// The remote peer went away.
    PeerClosed,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub role: Role,
    pub reason: CloseReason,
    /// Whether media ever flowed.
    pub streamed: bool,
    pub elapsed: Duration,
}

/// One signaling exchange and one peer connection, from connect to close.
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    signaling: Box<dyn SignalingChannel>,
    behavior: Box<dyn SessionBehavior>,
    state: SessionStateMachine,
    transport: Option<PeerTransport>,
    tasks: JoinSet<Result<()>>,
    event_tx: mpsc::Sender<TransportEvent>,
    event_rx: mpsc::Receiver<TransportEvent>,
    streamed: bool,
}

impl Session {
    /// Builds a session whose behavior follows `config.role`.
    pub fn new(config: SessionConfig, signaling: impl SignalingChannel + 'static) -> Result<Self> {
        config.validate()?;
        let behavior: Box<dyn SessionBehavior> = match config.role {
            Role::Offerer => Box::new(ProducerBehavior::new(config.media.clone())),
            Role::Answerer => Box::new(ConsumerBehavior::new(&config.media)?),
        };
        Self::with_behavior(config, signaling, behavior)
    }

    pub fn with_behavior(
        config: SessionConfig,
        signaling: impl SignalingChannel + 'static,
        behavior: Box<dyn SessionBehavior>,
    ) -> Result<Self> {
        config.validate()?;
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

        Ok(Self {
            id: SessionId::new(),
            config,
            signaling: Box::new(signaling),
            behavior,
            state: SessionStateMachine::new(),
            transport: None,
            tasks: JoinSet::new(),
            event_tx,
            event_rx,
            streamed: false,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Drives the session until `shutdown` resolves, the peer leaves, or a
    /// component fails. Teardown runs on every path.
    pub async fn run<F>(mut self, shutdown: F) -> Result<SessionReport>
    where
        F: Future<Output = ()> + Send,
    {
        let started = Instant::now();
        tokio::pin!(shutdown);
        info!("Session {} started as {}", self.id, self.config.role);

        let outcome = self.drive(shutdown.as_mut()).await;
        if let Err(e) = &outcome {
            error!("Session {} failed: {}", self.id, e);
        }

        self.enter(SessionState::Closing);
        let teardown = self.teardown().await;
        self.enter(SessionState::Closed);

        let reason = outcome?;
        teardown?;
        info!("Session {} closed ({:?})", self.id, reason);

        Ok(SessionReport {
            session_id: self.id,
            role: self.config.role,
            reason,
            streamed: self.streamed,
            elapsed: started.elapsed(),
        })
    }

    async fn drive<F>(&mut self, mut shutdown: Pin<&mut F>) -> Result<CloseReason>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::select! {
            _ = shutdown.as_mut() => return Ok(CloseReason::Interrupted),
            connected = self.signaling.connect() => connected?,
        }
        self.state.advance(SessionState::SignalingConnected)?;
        info!("Signaling connected");

        let transport = PeerTransport::new(
            self.id,
            self.config.transport.clone(),
            self.event_tx.clone(),
        )
        .await?;
        let transport = &*self.transport.insert(transport);
        self.behavior.prepare(transport).await?;

        tokio::select! {
            _ = shutdown.as_mut() => return Ok(CloseReason::Interrupted),
            negotiated = negotiate(self.config.role, transport, self.signaling.as_mut()) => negotiated?,
        }
        self.state.advance(SessionState::DescriptionsExchanged)?;
        info!("Offer and answer exchanged");

        let mut ctx = SessionContext {
            transport,
            tasks: &mut self.tasks,
            events: self.event_tx.clone(),
        };
        self.behavior.on_negotiated(&mut ctx).await?;

        loop {
            tokio::select! {
                _ = shutdown.as_mut() => {
                    info!("Shutdown requested");
                    return Ok(CloseReason::Interrupted);
                }

                Some(joined) = self.tasks.join_next() => self.handle_task_exit(joined)?,

                evt = self.event_rx.recv() => {
                    let Some(evt) = evt else {
                        return Err(SessionError::InvalidState(
                            "transport event stream ended".to_owned(),
                        ));
                    };
                    if let Some(reason) = self.handle_transport_event(evt).await? {
                        return Ok(reason);
                    }
                }
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) -> Result<Option<CloseReason>> {
        match event {
            TransportEvent::TrackAdded(track) => {
                let transport = self.transport.as_ref().ok_or_else(|| {
                    SessionError::InvalidState("track arrived without a transport".to_owned())
                })?;
                let mut ctx = SessionContext {
                    transport,
                    tasks: &mut self.tasks,
                    events: self.event_tx.clone(),
                };
                self.behavior.on_track(track, &mut ctx).await?;
            }

            TransportEvent::DataChannelOpened(channel) => {
                self.behavior.on_channel_open(channel).await?;
            }

            TransportEvent::MessageReceived(channel, data) => {
                self.mark_streaming()?;
                self.behavior.on_message(channel, data).await?;
            }

            TransportEvent::MediaFlowing => self.mark_streaming()?,

            TransportEvent::ConnectionClosed(RTCPeerConnectionState::Failed) => {
                return Err(SessionError::Media("peer connection failed".to_owned()));
            }

            TransportEvent::ConnectionClosed(state) => {
                info!("Peer connection {}", state);
                return Ok(Some(CloseReason::PeerClosed));
            }
        }
        Ok(None)
    }

    fn handle_task_exit(&self, joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
        match joined {
            Ok(Ok(())) => {
                debug!("Media task finished");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(SessionError::Media(format!("media task panicked: {e}"))),
        }
    }

    fn mark_streaming(&mut self) -> Result<()> {
        if self.streamed {
            return Ok(());
        }
        self.state.advance(SessionState::Streaming)?;
        self.streamed = true;
        info!("Media is flowing");
        Ok(())
    }

    /// Media tasks, peer connection, signaling, then the behavior.
    async fn teardown(&mut self) -> Result<()> {
        self.tasks.abort_all();
        while let Some(joined) = self.tasks.join_next().await {
            if let Ok(Err(e)) = joined {
                debug!("Media task ended with error during teardown: {}", e);
            }
        }

        let mut first_error = None;

        if let Some(transport) = self.transport.take() {
            debug!("Closing peer connection ({})", transport.connection_state());
            if let Err(e) = transport.close().await {
                warn!("Failed to close peer connection: {}", e);
                first_error = first_error.or(Some(e));
            }
        }

        if let Err(e) = self.signaling.close().await {
            warn!("Failed to close signaling: {}", e);
            first_error = first_error.or(Some(e));
        }

        if let Err(e) = self.behavior.shutdown().await {
            error!("Behavior shutdown failed: {}", e);
            first_error = first_error.or(Some(e));
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn enter(&self, next: SessionState) {
        if let Err(e) = self.state.advance(next) {
            warn!("{}", e);
        }
    }
}
