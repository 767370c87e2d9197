use crate::error::{Result, SessionError};
use crate::transport::TransportConfig;
use ballsync_core::{CoordinatePair, Role};
use std::time::Duration;

/// How the TCP signaling channel is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingMode {
    /// Connect to the peer; fail if nobody listens.
    Dial,
    /// Bind and wait for exactly one peer.
    Listen,
    /// Dial first and fall back to listening when the connection is refused.
    Auto,
}

#[derive(Debug, Clone)]
pub struct SignalingConfig {
    pub host: String,
    pub port: u16,
    pub mode: SignalingMode,
    /// Upper bound on a single `receive()`.
    pub receive_timeout: Duration,
}

impl SignalingConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 12345,
            mode: SignalingMode::Auto,
            receive_timeout: Duration::from_secs(60),
        }
    }
}

/// Scene, pacing and analysis parameters.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub width: u32,
    pub height: u32,
    pub radius: u32,
    pub start: CoordinatePair,
    pub velocity: CoordinatePair,
    /// Physics advances once every this many rendered frames.
    pub physics_divisor: u32,
    pub frame_rate: u32,
    pub queue_capacity: usize,
    pub threshold: u8,
}

impl MediaConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            radius: 20,
            start: CoordinatePair::new(0, 0),
            velocity: CoordinatePair::new(3, 3),
            physics_divisor: 10,
            frame_rate: 30,
            queue_capacity: 10,
            threshold: 127,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub role: Role,
    pub signaling: SignalingConfig,
    pub transport: TransportConfig,
    pub media: MediaConfig,
}

impl SessionConfig {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            signaling: SignalingConfig::default(),
            transport: TransportConfig::default(),
            media: MediaConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let media = &self.media;
        if media.width == 0 || media.height == 0 {
            return Err(SessionError::InvalidConfig(
                "canvas must be at least 1x1".to_owned(),
            ));
        }
        if media.width > i32::MAX as u32 || media.height > i32::MAX as u32 {
            return Err(SessionError::InvalidConfig("canvas is too large".to_owned()));
        }
        if media.frame_rate == 0 {
            return Err(SessionError::InvalidConfig(
                "frame rate must be positive".to_owned(),
            ));
        }
        if media.physics_divisor == 0 {
            return Err(SessionError::InvalidConfig(
                "physics divisor must be positive".to_owned(),
            ));
        }
        if media.queue_capacity == 0 {
            return Err(SessionError::InvalidConfig(
                "frame queue needs room for at least one frame".to_owned(),
            ));
        }
        let inside = |p: CoordinatePair| {
            (0..=media.width as i32).contains(&p.x) && (0..=media.height as i32).contains(&p.y)
        };
        if !inside(media.start) {
            return Err(SessionError::InvalidConfig(format!(
                "start position {} is outside the canvas",
                media.start
            )));
        }
        if self.signaling.receive_timeout.is_zero() {
            return Err(SessionError::InvalidConfig(
                "receive timeout must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
