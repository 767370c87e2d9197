pub mod handshake_tests;
pub mod session_tests;

use ballsync_session::{PeerTransport, TransportConfig, TransportEvent};
use ballsync_core::SessionId;
use tokio::sync::mpsc;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn create_local_transport() -> (PeerTransport, mpsc::Receiver<TransportEvent>) {
    let (event_tx, event_rx) = mpsc::channel(256);
    let transport = PeerTransport::new(SessionId::new(), TransportConfig::local(), event_tx)
        .await
        .expect("Failed to create peer transport");
    (transport, event_rx)
}
