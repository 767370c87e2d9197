use anyhow::{Context, Result, bail};
use ballsync_core::{CoordinatePair, Role};
use ballsync_session::{MediaConfig, SessionConfig, SessionState, TransportConfig};
use std::time::Duration;
use tokio::sync::watch;

/// Timeout for reaching a session state (ms).
pub const STATE_TIMEOUT_MS: u64 = 15000;

/// Timeout for the first coordinate report (ms).
pub const REPORT_TIMEOUT_MS: u64 = 15000;

/// Same-host configuration with a small, fast scene.
pub fn local_config(role: Role) -> SessionConfig {
    SessionConfig {
        transport: TransportConfig::local(),
        media: MediaConfig {
            width: 200,
            height: 200,
            radius: 15,
            start: CoordinatePair::new(60, 80),
            frame_rate: 30,
            ..MediaConfig::default()
        },
        ..SessionConfig::new(role)
    }
}

/// Waits until the session publishes `target`.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<SessionState>,
    target: SessionState,
    timeout_ms: u64,
) -> Result<()> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), rx.wait_for(|s| *s == target))
        .await
        .with_context(|| format!("session did not reach {target} within {timeout_ms}ms"))?
        .context("session dropped its state channel")?;
    Ok(())
}

/// Polls `condition` until it returns true.
pub async fn eventually(timeout_ms: u64, mut condition: impl FnMut() -> bool) -> Result<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            bail!("condition not met within {timeout_ms}ms");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Ok(())
}
